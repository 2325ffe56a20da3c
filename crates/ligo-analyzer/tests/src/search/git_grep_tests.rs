use std::path::Path;

use super::*;

fn backend() -> GitGrepBackend {
    GitGrepBackend::new("git", vec!["*.ligo".to_string(), "*.mligo".to_string()], 1024 * 1024)
}

fn has_git() -> bool {
    std::process::Command::new("git").arg("--version").output().is_ok_and(|output| output.status.success())
}

fn init_repo(root: &Path) -> bool {
    std::process::Command::new("git")
        .args(["init", "-q"])
        .current_dir(root)
        .output()
        .is_ok_and(|output| output.status.success())
}

#[test]
fn args_search_untracked_files_with_extended_regex() {
    let request = SearchRequest::new(Path::new("/repo"), r"function\s+foo\s*[(]");
    let args = backend().args(&request);
    assert_eq!(
        args,
        vec![
            "-c",
            "core.quotepath=off",
            "grep",
            "-n",
            "-I",
            "-E",
            "--untracked",
            "--no-color",
            "-e",
            r"function\s+foo\s*[(]",
            "--",
            "*.ligo",
            "*.mligo",
        ]
    );
}

#[test]
fn args_add_case_flag_but_never_word_flag() {
    let request = SearchRequest::new(Path::new("/repo"), r"[|]\s+Some").ignoring_case().whole_words();
    let args = backend().args(&request);
    assert!(args.contains(&"-i".to_string()));
    assert!(!args.contains(&"-w".to_string()));
}

#[tokio::test]
async fn finds_untracked_definitions() {
    if !has_git() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    if !init_repo(dir.path()) {
        return;
    }
    std::fs::create_dir_all(dir.path().join("lib")).unwrap();
    std::fs::write(dir.path().join("lib/a.ligo"), "// util\n\nfunction foo(x) = x\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "function foo(x) = x\n").unwrap();

    let hits = backend()
        .search(SearchRequest::new(dir.path(), r"function\s+foo\s*[(]"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, Path::new("lib/a.ligo"));
    assert_eq!(hits[0].line, 3);
    assert_eq!(hits[0].text, "function foo(x) = x");
}

#[tokio::test]
async fn whole_word_requests_drop_longer_identifiers() {
    if !has_git() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    if !init_repo(dir.path()) {
        return;
    }
    std::fs::write(dir.path().join("types.mligo"), "type t =\n  | Something of nat\n  | Some of int\n").unwrap();
    std::fs::write(dir.path().join("b.ligo"), "subtype storage = nat\ntype storage = int\n").unwrap();

    let constructors = SearchRequest::new(dir.path(), r"[|]\s+Some").whole_words();
    let hits = backend().search(constructors, &CancellationToken::new()).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, 3);

    let types = SearchRequest::new(dir.path(), r"type\s+storage ").whole_words();
    let hits = backend().search(types, &CancellationToken::new()).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, Path::new("b.ligo"));
    assert_eq!(hits[0].line, 2);
}

#[tokio::test]
async fn no_match_is_empty_not_error() {
    if !has_git() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    if !init_repo(dir.path()) {
        return;
    }
    std::fs::write(dir.path().join("a.ligo"), "type storage = nat\n").unwrap();

    let hits = backend()
        .search(SearchRequest::new(dir.path(), r"type\s+parameter "), &CancellationToken::new())
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn oversized_output_is_an_error() {
    if !has_git() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    if !init_repo(dir.path()) {
        return;
    }
    let body = "type storage = nat\n".repeat(200);
    std::fs::write(dir.path().join("a.ligo"), body).unwrap();

    let small = GitGrepBackend::new("git", vec!["*.ligo".to_string()], 256);
    let result = small.search(SearchRequest::new(dir.path(), "storage"), &CancellationToken::new()).await;
    assert!(matches!(result, Err(SearchError::OutputTooLarge { limit_bytes: 256 })));
}

#[tokio::test]
async fn missing_command_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = GitGrepBackend::new("definitely-not-a-git-binary", vec!["*.ligo".to_string()], 1024);
    let result = missing.search(SearchRequest::new(dir.path(), "storage"), &CancellationToken::new()).await;
    assert!(matches!(result, Err(SearchError::CommandNotFound(_))));
    assert!(result.unwrap_err().allows_fallback());
}

#[tokio::test]
async fn missing_root_is_rejected() {
    let result = backend()
        .search(SearchRequest::new(Path::new("/definitely/not/here"), "storage"), &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(SearchError::InvalidRoot(_))));
}

#[tokio::test]
async fn cancelled_search_returns_promptly() {
    if !has_git() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = backend().search(SearchRequest::new(dir.path(), "storage"), &cancel).await;
    assert!(matches!(result, Err(SearchError::Cancelled)));
}
