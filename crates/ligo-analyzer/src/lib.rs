pub mod config;
pub mod definition;
pub mod document;
pub mod search;
pub mod server;
pub mod symbols;
pub mod text_pos;

pub use config::ServerSettings;
pub use definition::{DefinitionProvider, ResolvedLocation, UsageShape};
pub use search::{BuiltinBackend, ConfiguredSearch, GitGrepBackend, RawHit, SearchBackend, SearchError, SearchRequest};
pub use server::LigoLanguageServer;
pub use symbols::{WorkspaceSymbol, WorkspaceSymbolProvider};
