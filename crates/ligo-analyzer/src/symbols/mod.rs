mod provider;

pub use provider::{WorkspaceSymbol, WorkspaceSymbolProvider};
