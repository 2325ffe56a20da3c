use std::{panic::AssertUnwindSafe, time::Instant};

use futures::FutureExt;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info};

use crate::{
    config::ServerSettings,
    server::{
        convert::{definition_response, workspace_symbol_to_lsp},
        state::{LigoLanguageServer, LookupKind},
    },
};

const CLIENT_NOTIFICATION_PREFIX: &str = "ligo-analyzer:";

#[tower_lsp::async_trait]
impl LanguageServer for LigoLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing ligo-analyzer...");

        let initial_settings = ServerSettings::from_lsp_payload(params.initialization_options.as_ref());
        self.apply_settings(initial_settings).await;

        if let Some(folders) = params.workspace_folders {
            self.set_workspace_folders(&folders).await;
        } else if let Some(root) = params.root_uri {
            self.set_workspace_folders(&[WorkspaceFolder {
                uri: root,
                name: "root".to_string(),
            }])
            .await;
        }
        let roots = self.roots_snapshot().await;
        info!("Workspace roots: {roots:?}");

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                definition_provider: Some(OneOf::Left(true)),
                declaration_provider: Some(DeclarationCapability::Simple(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "ligo-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        let settings = self.settings_snapshot().await;
        info!("ligo-analyzer initialized (search backend: {:?})", settings.search.backend);
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }
        self.apply_settings(merged).await;
        info!("Applied updated ligo-analyzer settings");
    }

    async fn did_change_workspace_folders(
        &self,
        params: DidChangeWorkspaceFoldersParams,
    ) {
        self.change_workspace_folders(&params.event.added, &params.event.removed).await;
        debug!("Workspace roots now {:?}", self.roots_snapshot().await);
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down ligo-analyzer");
        self.cancel_all_lookups();
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        let filename = short_name(&uri);

        info!("Opened {filename} (v{version}, {} bytes)", text.len());
        if self.settings_snapshot().await.logging.level.allows_info() {
            let _ = AssertUnwindSafe(
                self.client.log_message(MessageType::INFO, prefixed_client_message(format!("Opened {filename}"))),
            )
            .catch_unwind()
            .await;
        }

        self.document_store.open(uri, text, version);
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        self.document_store.apply_changes(&uri, params.content_changes, params.text_document.version);
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        self.document_store.close(&params.text_document.uri);
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        Ok(self.resolve_definition(params.text_document_position_params, LookupKind::Definition).await)
    }

    async fn goto_declaration(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        Ok(self.resolve_definition(params.text_document_position_params, LookupKind::Declaration).await)
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        let roots = self.roots_snapshot().await;
        let provider = self.symbol_provider().await;
        let ticket = self.begin_lookup(LookupKind::WorkspaceSymbol);

        let start = Instant::now();
        let symbols = provider.provide(&roots, &params.query, &ticket.cancel).await;
        self.finish_lookup(&ticket);
        debug!("workspace-symbol '{}' → {} symbols ({:?})", params.query, symbols.len(), start.elapsed());

        Ok(Some(symbols.iter().filter_map(workspace_symbol_to_lsp).collect()))
    }
}

impl LigoLanguageServer {
    /// Shared pipeline of definition and declaration requests.
    async fn resolve_definition(
        &self,
        params: TextDocumentPositionParams,
        kind: LookupKind,
    ) -> Option<GotoDefinitionResponse> {
        let uri = params.text_document.uri;
        let position = params.position;
        let filename = short_name(&uri);

        let Some(line_text) = self.document_store.line_text(&uri, position.line) else {
            debug!("{kind} {filename}: document not open or line {} missing", position.line + 1);
            return None;
        };
        let roots = self.roots_snapshot().await;
        let provider = self.definition_provider().await;
        let ticket = self.begin_lookup(kind);

        let start = Instant::now();
        let locations = provider.provide(&roots, &line_text, position, &ticket.cancel).await;
        self.finish_lookup(&ticket);
        let elapsed = start.elapsed();

        let response = definition_response(&locations);
        let target = match &response {
            Some(GotoDefinitionResponse::Scalar(loc)) => {
                format!("{}:{}", short_path(loc.uri.path()), loc.range.start.line + 1)
            },
            Some(GotoDefinitionResponse::Array(locs)) => format!("{} locations", locs.len()),
            Some(GotoDefinitionResponse::Link(links)) => format!("{} links", links.len()),
            None => "none".to_string(),
        };
        debug!("{kind} {filename}:{}:{} → {target} ({elapsed:?})", position.line + 1, position.character + 1);
        response
    }
}

fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}

fn short_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}
