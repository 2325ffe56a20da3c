use tower_lsp::lsp_types::{GotoDefinitionResponse, Location, Position, Range, SymbolInformation, SymbolKind, Url};

use crate::{definition::ResolvedLocation, symbols::WorkspaceSymbol};

pub fn resolved_location_to_lsp(location: &ResolvedLocation) -> Option<Location> {
    let uri = Url::from_file_path(&location.file_path).ok()?;
    Some(Location {
        uri,
        range: Range::new(
            Position::new(location.line, location.start_column),
            Position::new(location.line, location.end_column),
        ),
    })
}

/// One location answers as a scalar, several as an array, none as `null`.
pub fn definition_response(locations: &[ResolvedLocation]) -> Option<GotoDefinitionResponse> {
    let mut lsp_locations: Vec<Location> = locations.iter().filter_map(resolved_location_to_lsp).collect();
    match lsp_locations.len() {
        0 => None,
        1 => lsp_locations.pop().map(GotoDefinitionResponse::Scalar),
        _ => Some(GotoDefinitionResponse::Array(lsp_locations)),
    }
}

pub fn workspace_symbol_to_lsp(symbol: &WorkspaceSymbol) -> Option<SymbolInformation> {
    let location = resolved_location_to_lsp(&symbol.location)?;
    #[allow(deprecated)]
    Some(SymbolInformation {
        name: symbol.name.clone(),
        kind: SymbolKind::FUNCTION,
        tags: None,
        deprecated: None,
        location,
        container_name: Some(symbol.container_name.clone()),
    })
}

#[cfg(test)]
#[path = "../../tests/src/server/convert_tests.rs"]
mod tests;
