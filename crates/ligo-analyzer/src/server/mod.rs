pub(crate) mod convert;
pub(crate) mod handler;
pub(crate) mod state;

pub use state::{LigoLanguageServer, LookupKind};
