use std::path::Path;

use super::*;

fn hit(
    path: &str,
    line: u32,
    text: &str,
) -> RawHit {
    RawHit {
        path: PathBuf::from(path),
        line,
        text: text.to_string(),
    }
}

fn covered<'a>(
    text: &'a str,
    location: &ResolvedLocation,
) -> &'a str {
    &text[location.start_column as usize..location.end_column as usize]
}

#[test]
fn locate_spans_first_occurrence_on_zero_based_line() {
    let hit = hit("lib/a.ligo", 3, "function foo(x) = x");
    let location = locate(Path::new("/repo"), &hit, "foo").unwrap();
    assert_eq!(location.file_path, Path::new("/repo/lib/a.ligo"));
    assert_eq!(location.line, 2);
    assert_eq!((location.start_column, location.end_column), (9, 12));
    assert_eq!(covered(&hit.text, &location), "foo");
}

#[test]
fn locate_round_trips_highlight_text() {
    for (line, word) in [("  | Some of int", "Some"), (" owner  : address;", "owner"), ("type storage = nat", "storage")] {
        let hit = hit("a.ligo", 1, line);
        let location = locate(Path::new("/repo"), &hit, word).unwrap();
        assert_eq!(covered(line, &location), word);
    }
}

#[test]
fn locate_uses_utf16_columns() {
    let hit = hit("a.ligo", 1, "(* é *) type storage = nat");
    let location = locate(Path::new("/repo"), &hit, "storage").unwrap();
    assert_eq!(location.start_column, 13);
    assert_eq!(location.end_column, 20);
}

#[test]
fn locate_skips_hits_without_the_token() {
    let hit = hit("a.ligo", 1, "type other = nat");
    assert!(locate(Path::new("/repo"), &hit, "storage").is_none());
    assert!(locate(Path::new("/repo"), &hit, "").is_none());
}

#[test]
fn locate_rejects_line_zero() {
    let hit = hit("a.ligo", 0, "type storage = nat");
    assert!(locate(Path::new("/repo"), &hit, "storage").is_none());
}

#[test]
fn fuzzy_recovers_full_identifier() {
    let hit = hit("src/bank.mligo", 5, "function computeBalance(x) = x");
    let symbol = FuzzyLocator::new("bal").locate(Path::new("/repo"), &hit).unwrap();
    assert_eq!(symbol.name, "computeBalance");
    assert_eq!(symbol.location.line, 4);
    assert_eq!(covered(&hit.text, &symbol.location), "computeBalance");
    assert_eq!(symbol.location.file_path, Path::new("/repo/src/bank.mligo"));
}

#[test]
fn fuzzy_ignores_occurrences_before_function_keyword() {
    let hit = hit("a.ligo", 1, "(* global *) function get_total(s) = s");
    let symbol = FuzzyLocator::new("tot").locate(Path::new("/repo"), &hit).unwrap();
    assert_eq!(symbol.name, "get_total");

    let hit2 = RawHit {
        text: "(* total *) function get_total(s) = s".to_string(),
        ..hit
    };
    let symbol = FuzzyLocator::new("tot").locate(Path::new("/repo"), &hit2).unwrap();
    assert_eq!(symbol.name, "get_total");
}

#[test]
fn fuzzy_empty_query_names_the_declared_function() {
    let hit = hit("a.ligo", 1, "function  main (p, s) = s");
    let symbol = FuzzyLocator::new("").locate(Path::new("/repo"), &hit).unwrap();
    assert_eq!(symbol.name, "main");
}

#[test]
fn fuzzy_query_that_is_not_a_regex_matches_literally() {
    let hit = hit("a.ligo", 1, "function weird(x) = x");
    let locator = FuzzyLocator::new("ird(");
    let symbol = locator.locate(Path::new("/repo"), &hit).unwrap();
    assert_eq!(symbol.name, "weird");
}

#[test]
fn fuzzy_without_match_is_none() {
    let hit = hit("a.ligo", 1, "function foo(x) = x");
    assert!(FuzzyLocator::new("bar").locate(Path::new("/repo"), &hit).is_none());
}
