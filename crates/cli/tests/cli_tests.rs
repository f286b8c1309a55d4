//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("webtome")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_file_input_html_output() {
    let out = TempDir::new().unwrap();

    cmd()
        .args(["-f", "html", "-o"])
        .arg(out.path())
        .arg(get_fixture_path("article.html"))
        .assert()
        .success();

    let written = out.path().join("Field_Notes_on_Lighthouses.html");
    assert!(written.exists());

    let html = std::fs::read_to_string(written).unwrap();
    assert!(html.contains("interlocking"));
    assert!(!html.contains("Subscribe to our newsletter"));
}

#[test]
fn test_cli_file_input_epub_output() {
    let out = TempDir::new().unwrap();

    cmd()
        .args(["-f", "epub", "-o"])
        .arg(out.path())
        .arg(get_fixture_path("article.html"))
        .assert()
        .success()
        .stderr(predicate::str::contains("epub written to"));

    assert!(out.path().join("Field_Notes_on_Lighthouses.epub").exists());
}

#[test]
fn test_cli_title_override() {
    let out = TempDir::new().unwrap();

    cmd()
        .args(["-f", "html", "-t", "Custom Name", "-o"])
        .arg(out.path())
        .arg(get_fixture_path("article.html"))
        .assert()
        .success();

    assert!(out.path().join("Custom_Name.html").exists());
}

#[test]
fn test_cli_content_selector() {
    let out = TempDir::new().unwrap();

    cmd()
        .args(["-f", "html", "--content-selector", "article", "-o"])
        .arg(out.path())
        .arg(get_fixture_path("article.html"))
        .assert()
        .success();
}

#[test]
fn test_cli_accepts_kebab_case_flags() {
    let out = TempDir::new().unwrap();

    cmd()
        .args([
            "-f",
            "html",
            "--no-cover",
            "--drop-empty-pages",
            "--exclude-selector",
            ".ads",
            "--user-agent",
            "test-agent",
            "--max-pages",
            "5",
            "-o",
        ])
        .arg(out.path())
        .arg(get_fixture_path("article.html"))
        .assert()
        .success();
}

#[test]
fn test_cli_crawl_rejects_file_input() {
    cmd()
        .args(["--crawl", &get_fixture_path("article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a URL"));
}

#[test]
fn test_cli_rejects_unknown_format() {
    cmd()
        .args(["-f", "pdf", &get_fixture_path("article.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_rejects_zero_max_pages() {
    cmd()
        .args(["--max-pages", "0", "https://example.com/"])
        .assert()
        .failure();
}

#[test]
fn test_cli_missing_file() {
    cmd()
        .arg("no-such-file.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_invalid_url() {
    cmd().arg("https://").assert().failure();
}

#[test]
fn test_cli_missing_pattern_file() {
    cmd()
        .args(["--exclude-file", "/nonexistent/patterns.txt", &get_fixture_path("article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("patterns"));
}
