use std::{
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::search::{LineMatcher, RawHit, SearchError, SearchRequest};

/// Serves canned repository lines, filtered by the requested pattern.
struct CannedRepo {
    lines: Vec<RawHit>,
    calls: AtomicUsize,
}

impl CannedRepo {
    fn new(lines: &[(&str, u32, &str)]) -> Arc<Self> {
        Arc::new(Self {
            lines: lines
                .iter()
                .map(|(path, line, text)| RawHit {
                    path: PathBuf::from(path),
                    line: *line,
                    text: text.to_string(),
                })
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[tower_lsp::async_trait]
impl SearchBackend for CannedRepo {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn search(
        &self,
        request: SearchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        let matcher = LineMatcher::new(&request)?;
        Ok(self.lines.iter().filter(|hit| matcher.is_match(&hit.text)).cloned().collect())
    }
}

fn roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/repo")]
}

#[test]
fn analyze_builds_function_pattern_for_lowercase_call() {
    let lookup = analyze("foo(1)", 1).unwrap();
    assert_eq!(lookup.token.text, "foo");
    assert_eq!(lookup.shape, UsageShape::FunctionCall);
    assert_eq!(lookup.pattern.regex, r"function\s+foo\s*[(]");
}

#[test]
fn analyze_builds_constructor_pattern_for_uppercase_call() {
    let lookup = analyze("let x = Some(x)", 9).unwrap();
    assert_eq!(lookup.shape, UsageShape::ConstructorCall);
    assert_eq!(lookup.pattern.regex, r"[|]\s+Some");
}

#[test]
fn analyze_converts_utf16_columns() {
    let lookup = analyze("(* é *) s.owner", 11).unwrap();
    assert_eq!(lookup.token.text, "owner");
    assert_eq!(lookup.shape, UsageShape::FieldAccess);
}

#[test]
fn analyze_without_identifier_is_none() {
    assert!(analyze("  (  ) ", 3).is_none());
}

#[tokio::test]
async fn resolves_function_call_to_declaration() {
    let repo = CannedRepo::new(&[
        ("lib/a.ligo", 1, "// helpers"),
        ("lib/a.ligo", 3, "function foo(x) = x"),
        ("lib/b.ligo", 9, "let y = foo(2)"),
    ]);
    let provider = DefinitionProvider::new(repo.clone());

    let locations = provider.provide(&roots(), "foo(1)", Position::new(0, 0), &CancellationToken::new()).await;
    assert_eq!(
        locations,
        vec![ResolvedLocation {
            file_path: PathBuf::from("/repo/lib/a.ligo"),
            line: 2,
            start_column: 9,
            end_column: 12,
        }]
    );
}

#[tokio::test]
async fn resolves_constructor_to_variant() {
    let repo = CannedRepo::new(&[
        ("types.mligo", 2, "  | Something of nat"),
        ("types.mligo", 4, "  | Some of int"),
        ("x.mligo", 1, "function Some(x) = x"),
    ]);
    let provider = DefinitionProvider::new(repo);

    let locations = provider.provide(&roots(), "match Some(x) with", Position::new(7, 7), &CancellationToken::new()).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].file_path, Path::new("/repo/types.mligo"));
    assert_eq!(locations[0].line, 3);
    assert_eq!((locations[0].start_column, locations[0].end_column), (4, 8));
}

#[tokio::test]
async fn resolves_view_reference_to_tagged_view() {
    let repo = CannedRepo::new(&[
        ("views.ligo", 10, "[@view] function get_balance(p, s) is s.balance"),
        ("other.ligo", 2, "function get_balance(p, s) is 0n"),
    ]);
    let provider = DefinitionProvider::new(repo);
    let line = r#"const r = Tezos.call_view("get_balance", unit, addr)"#;
    let character = line.find("get_balance").unwrap() as u32;

    let locations = provider.provide(&roots(), line, Position::new(0, character), &CancellationToken::new()).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].file_path, Path::new("/repo/views.ligo"));
}

#[tokio::test]
async fn duplicate_roots_do_not_duplicate_locations() {
    let repo = CannedRepo::new(&[("a.ligo", 1, "type storage = nat")]);
    let provider = DefinitionProvider::new(repo);
    let roots = vec![PathBuf::from("/repo"), PathBuf::from("/repo")];

    let locations = provider.provide(&roots, "x : storage", Position::new(0, 5), &CancellationToken::new()).await;
    assert_eq!(locations.len(), 1);
}

#[tokio::test]
async fn no_roots_means_no_search() {
    let repo = CannedRepo::new(&[("a.ligo", 1, "function foo(x) = x")]);
    let provider = DefinitionProvider::new(repo.clone());

    let locations = provider.provide(&[], "foo(1)", Position::new(0, 0), &CancellationToken::new()).await;
    assert!(locations.is_empty());
    assert_eq!(repo.calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn cursor_off_identifier_means_no_search() {
    let repo = CannedRepo::new(&[("a.ligo", 1, "function foo(x) = x")]);
    let provider = DefinitionProvider::new(repo.clone());

    let locations = provider.provide(&roots(), "  ;  ", Position::new(0, 2), &CancellationToken::new()).await;
    assert!(locations.is_empty());
    assert_eq!(repo.calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn cancelled_lookup_is_empty() {
    let repo = CannedRepo::new(&[("a.ligo", 1, "function foo(x) = x")]);
    let provider = DefinitionProvider::new(repo);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let locations = provider.provide(&roots(), "foo(1)", Position::new(0, 0), &cancel).await;
    assert!(locations.is_empty());
}

#[tokio::test]
async fn type_reference_skips_identifiers_ending_in_type() {
    let repo = CannedRepo::new(&[("a.ligo", 1, "subtype storage = nat"), ("b.ligo", 5, "type storage = int")]);
    let provider = DefinitionProvider::new(repo);

    let locations = provider.provide(&roots(), "x : storage", Position::new(0, 5), &CancellationToken::new()).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].file_path, Path::new("/repo/b.ligo"));
    assert_eq!(locations[0].line, 4);
}
