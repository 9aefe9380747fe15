use std::fs;

use assert_cmd::Command;
use codesample_core::{CodeFile, CodeFragment, Language};
use codesample_sync::store::json;
use predicates::prelude::*;
use tempfile::TempDir;

fn codesample() -> Command {
    let mut cmd = Command::cargo_bin("codesample").expect("codesample binary");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn diff_reports_each_change_class() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("old.json");
    let new = dir.path().join("new.json");
    fs::write(
        &old,
        r#"[
            {"codename":"intro_curl","content":"curl -X GET\n","language":"curl"},
            {"codename":"gone_java","content":"x","language":"java"}
        ]"#,
    )
    .unwrap();
    fs::write(
        &new,
        r#"{"path":"docs/intro.md","fragments":[
            {"codename":"intro_curl","content":"curl -X POST\n","language":"curl"},
            {"codename":"fresh_ruby","content":"y","language":"ruby"}
        ]}"#,
    )
    .unwrap();

    codesample()
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("+ fresh_ruby[ruby]"))
        .stdout(predicate::str::contains("~ intro_curl[curl]"))
        .stdout(predicate::str::contains("+curl -X POST"))
        .stdout(predicate::str::contains("- gone_java[java]"))
        .stdout(predicate::str::contains("1 added, 1 modified, 1 removed"));
}

#[test]
fn diff_of_identical_lists_reports_nothing() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("list.json");
    fs::write(
        &list,
        r#"[{"codename":"intro_curl","content":"X","language":"curl"}]"#,
    )
    .unwrap();

    codesample()
        .arg("diff")
        .arg(&list)
        .arg(&list)
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences."));
}

#[test]
fn diff_rejects_unknown_language() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("list.json");
    fs::write(
        &list,
        r#"[{"codename":"intro_cobol","content":"X","language":"cobol"}]"#,
    )
    .unwrap();

    codesample()
        .arg("diff")
        .arg(&list)
        .arg(&list)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a fragment list or code file"));
}

#[test]
fn render_json_emits_full_records() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("list.json");
    fs::write(
        &list,
        r#"[
            {"codename":"code_samples_test_curl","content":"curl","language":"curl"},
            {"codename":"code_samples_test_php","content":"<?php","language":"php"}
        ]"#,
    )
    .unwrap();

    let output = codesample()
        .arg("render")
        .arg(&list)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items.as_array().map(Vec::len), Some(1));
    assert_eq!(items[0]["codename"], "code_samples_test");
    assert_eq!(items[0]["name"], "Code Samples Test");
    assert_eq!(items[0]["record"]["curl"], "curl");
    assert_eq!(items[0]["record"]["php"], "<?php");
    assert_eq!(items[0]["record"]["swift"], "");
}

#[test]
fn render_table_lists_bundles() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("list.json");
    fs::write(
        &list,
        r#"[
            {"codename":"intro_curl","content":"a","language":"curl"},
            {"codename":"intro_java","content":"b","language":"java"}
        ]"#,
    )
    .unwrap();

    codesample()
        .arg("render")
        .arg(&list)
        .assert()
        .success()
        .stdout(predicate::str::contains("intro"))
        .stdout(predicate::str::contains("curl, java"));
}

#[test]
fn debug_logging_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("list.json");
    fs::write(
        &list,
        r#"[{"codename":"intro_curl","content":"a","language":"curl"}]"#,
    )
    .unwrap();

    codesample()
        .env("RUST_LOG", "debug")
        .arg("render")
        .arg(&list)
        .assert()
        .success()
        .stderr(predicate::str::contains("read fragment input"))
        .stdout(predicate::str::contains("read fragment input").not());
}

#[test]
fn changes_prints_net_paths() {
    let dir = TempDir::new().unwrap();
    let payload = dir.path().join("push.json");
    fs::write(
        &payload,
        r#"{"commits":[
            {"added":["docs/a.md","docs/tmp.md"],"modified":["docs/b.md"],"removed":[]},
            {"added":[],"modified":[],"removed":["docs/tmp.md","docs/c.md"]}
        ]}"#,
    )
    .unwrap();

    codesample()
        .arg("changes")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("A docs/a.md"))
        .stdout(predicate::str::contains("M docs/b.md"))
        .stdout(predicate::str::contains("D docs/c.md"))
        .stdout(predicate::str::contains("docs/tmp.md").not());
}

#[test]
fn snapshot_shows_active_and_archived_files() {
    let store = TempDir::new().unwrap();
    let file = CodeFile::new(
        "docs/intro.md",
        vec![CodeFragment::new("intro_curl", Language::Curl, "curl\n-X GET\n")],
    );
    json::store_at(store.path(), &file).unwrap();

    codesample()
        .args(["snapshot", "docs/intro.md", "--store"])
        .arg(store.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("docs/intro.md (1 fragment(s))"))
        .stdout(predicate::str::contains("intro_curl[curl]  2 line(s)"));

    json::archive_at(store.path(), "docs/intro.md").unwrap();

    codesample()
        .args(["snapshot", "docs/intro.md", "--store"])
        .arg(store.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("is not tracked"));

    codesample()
        .args(["snapshot", "docs/intro.md", "--archived", "--store"])
        .arg(store.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("archived at"));
}

#[test]
fn snapshot_reads_store_root_from_config() {
    let store = TempDir::new().unwrap();
    let cfg_dir = TempDir::new().unwrap();
    let cfg = cfg_dir.path().join("codesample.yaml");
    fs::write(
        &cfg,
        format!("store:\n  root: {}\n", store.path().display()),
    )
    .unwrap();
    json::store_at(
        store.path(),
        &CodeFile::new("a.md", vec![CodeFragment::new("a_curl", Language::Curl, "x")]),
    )
    .unwrap();

    codesample()
        .args(["snapshot", "a.md", "--json", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"codename\": \"a_curl\""));
}
