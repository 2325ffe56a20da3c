use std::{
    fmt,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_lsp::{
    Client,
    lsp_types::{Url, WorkspaceFolder},
};
use tracing::debug;

use crate::{
    config::ServerSettings,
    definition::DefinitionProvider,
    document::DocumentStore,
    search::{ConfiguredSearch, SearchBackend},
    symbols::WorkspaceSymbolProvider,
};

/// Request families that each keep at most one lookup in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Definition,
    Declaration,
    WorkspaceSymbol,
}

impl fmt::Display for LookupKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Definition => "goto-def",
            Self::Declaration => "goto-decl",
            Self::WorkspaceSymbol => "workspace-symbol",
        };
        f.write_str(name)
    }
}

/// The ligo-analyzer backend that implements the Language Server Protocol.
pub struct LigoLanguageServer {
    /// Handle for notifications back to the editor.
    pub(crate) client: Client,

    pub(crate) document_store: Arc<DocumentStore>,

    /// Workspace root directories, populated during `initialize` and kept in
    /// sync with folder change notifications.
    pub(crate) workspace_roots: RwLock<Vec<PathBuf>>,

    /// Runtime settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,

    /// Search backend built from the current settings.
    search: RwLock<Arc<dyn SearchBackend>>,

    /// Fixed backend that settings changes never replace.
    pinned_search: Option<Arc<dyn SearchBackend>>,

    /// Newest lookup per request family, keyed by generation so a finished
    /// lookup only clears its own entry.
    in_flight: DashMap<LookupKind, (u64, CancellationToken)>,

    lookup_generation: AtomicU64,
}

/// Handle for one running lookup.
pub(crate) struct LookupTicket {
    pub(crate) kind: LookupKind,
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
}

impl LigoLanguageServer {
    /// Create a server wired to the given LSP client.
    pub fn new(client: Client) -> Self {
        let settings = ServerSettings::default();
        let search: Arc<dyn SearchBackend> = Arc::new(ConfiguredSearch::from_settings(&settings.search));
        Self::build(client, settings, search, None)
    }

    /// Create a server that always searches through `backend`, whatever the
    /// search settings say.
    pub fn with_search_backend(
        client: Client,
        backend: Arc<dyn SearchBackend>,
    ) -> Self {
        Self::build(client, ServerSettings::default(), Arc::clone(&backend), Some(backend))
    }

    fn build(
        client: Client,
        settings: ServerSettings,
        search: Arc<dyn SearchBackend>,
        pinned_search: Option<Arc<dyn SearchBackend>>,
    ) -> Self {
        Self {
            client,
            document_store: Arc::new(DocumentStore::new()),
            workspace_roots: RwLock::new(Vec::new()),
            settings: Arc::new(RwLock::new(settings)),
            search: RwLock::new(search),
            pinned_search,
            in_flight: DashMap::new(),
            lookup_generation: AtomicU64::new(0),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        if self.pinned_search.is_none() {
            let search: Arc<dyn SearchBackend> = Arc::new(ConfiguredSearch::from_settings(&settings.search));
            *self.search.write().await = search;
        }
        *self.settings.write().await = settings;
    }

    pub(crate) async fn roots_snapshot(&self) -> Vec<PathBuf> {
        self.workspace_roots.read().await.clone()
    }

    pub(crate) async fn set_workspace_folders(
        &self,
        folders: &[WorkspaceFolder],
    ) {
        let roots = folders.iter().filter_map(|folder| folder_path(&folder.uri)).collect();
        *self.workspace_roots.write().await = roots;
    }

    pub(crate) async fn change_workspace_folders(
        &self,
        added: &[WorkspaceFolder],
        removed: &[WorkspaceFolder],
    ) {
        let mut roots = self.workspace_roots.write().await;
        let removed: Vec<PathBuf> = removed.iter().filter_map(|folder| folder_path(&folder.uri)).collect();
        roots.retain(|root| !removed.contains(root));
        for path in added.iter().filter_map(|folder| folder_path(&folder.uri)) {
            if !roots.contains(&path) {
                roots.push(path);
            }
        }
    }

    pub(crate) async fn definition_provider(&self) -> DefinitionProvider {
        DefinitionProvider::new(Arc::clone(&*self.search.read().await))
    }

    pub(crate) async fn symbol_provider(&self) -> WorkspaceSymbolProvider {
        let max_results = self.settings.read().await.search.max_workspace_symbols;
        WorkspaceSymbolProvider::new(Arc::clone(&*self.search.read().await), max_results)
    }

    /// Start a lookup of `kind`, cancelling the one still running for it.
    pub(crate) fn begin_lookup(
        &self,
        kind: LookupKind,
    ) -> LookupTicket {
        let generation = self.lookup_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        if let Some((previous, token)) = self.in_flight.insert(kind, (generation, cancel.clone())) {
            debug!("[{kind}] #{previous} superseded by #{generation}");
            token.cancel();
        }
        LookupTicket {
            kind,
            generation,
            cancel,
        }
    }

    pub(crate) fn finish_lookup(
        &self,
        ticket: &LookupTicket,
    ) {
        self.in_flight.remove_if(&ticket.kind, |_, (generation, _)| *generation == ticket.generation);
    }

    pub(crate) fn cancel_all_lookups(&self) {
        for entry in self.in_flight.iter() {
            entry.value().1.cancel();
        }
        self.in_flight.clear();
    }
}

fn folder_path(uri: &Url) -> Option<PathBuf> {
    uri.to_file_path().ok()
}

#[cfg(test)]
#[path = "../../tests/src/server/state_tests.rs"]
mod tests;
