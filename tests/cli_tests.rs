//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn repo_flatten() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("repo-flatten"))
}

struct TestRepo {
    temp: TempDir,
}

impl TestRepo {
    fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path().join("demo");
        fs::create_dir_all(root.join("src")).expect("mkdir src");
        fs::create_dir_all(root.join("node_modules/pkg")).expect("mkdir node_modules");
        fs::create_dir_all(root.join("docs")).expect("mkdir docs");

        fs::write(root.join("README.md"), "# Demo\n").expect("write readme");
        fs::write(root.join("src/main.py"), "print('hi')\n").expect("write main.py");
        fs::write(root.join("node_modules/pkg/index.js"), "module.exports = 1;\n")
            .expect("write index.js");
        fs::write(root.join("docs/guide.md"), "# Guide\n").expect("write guide");
        fs::write(root.join("LICENSE"), "MIT\n").expect("write license");
        fs::write(root.join("Cargo.lock"), "# lock\n").expect("write lock");

        Self { temp }
    }

    fn root(&self) -> std::path::PathBuf {
        self.temp.path().join("demo")
    }

    fn workdir(&self) -> &Path {
        self.temp.path()
    }
}

#[test]
fn test_cli_version() {
    let mut cmd = repo_flatten();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("repo-flatten"));
}

#[test]
fn test_cli_help() {
    let mut cmd = repo_flatten();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("flatten"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_export_requires_path_or_repo() {
    let work = TempDir::new().expect("temp dir");
    let mut cmd = repo_flatten();
    cmd.current_dir(work.path()).arg("export");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Either --path or --repo must be specified"));
}

#[test]
fn test_export_rejects_both_path_and_repo() {
    let mut cmd = repo_flatten();
    cmd.args(["export", "--path", ".", "--repo", "https://github.com/test/test"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cannot specify both --path and --repo"));
}

#[test]
fn test_export_writes_artifact_with_default_config() {
    let repo = TestRepo::new();
    let out = repo.workdir().join("out");

    let mut cmd = repo_flatten();
    cmd.current_dir(repo.workdir()).args([
        "export",
        "--path",
        repo.root().to_str().expect("utf8 path"),
        "--download-dir",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Flatten complete!"))
        .stdout(predicate::str::contains("Files visited:   6"))
        .stdout(predicate::str::contains("Files included:  3"));

    let artifact = fs::read_to_string(out.join("demo.txt")).expect("artifact");
    let sep = "=".repeat(60);
    assert!(artifact.starts_with(&format!("\n{sep}\nFILE: README.md\n{sep}\n# Demo\n\n")));
    assert!(artifact.contains("FILE: docs/guide.md\n"));
    assert!(artifact.contains("FILE: src/main.py\n"));
    assert!(!artifact.contains("node_modules"));
    assert!(!artifact.contains("FILE: LICENSE"));
    assert!(!artifact.contains("Cargo.lock"));
}

#[test]
fn test_export_honors_output_exclude_and_report() {
    let repo = TestRepo::new();
    let out = repo.workdir().join("out");
    let report = repo.workdir().join("report.json");

    let mut cmd = repo_flatten();
    cmd.current_dir(repo.workdir()).args([
        "export",
        "--path",
        repo.root().to_str().expect("utf8 path"),
        "--download-dir",
        out.to_str().expect("utf8 path"),
        "--output",
        "nested/flat.txt",
        "--exclude",
        "docs,src",
        "--report",
        report.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();

    let artifact = fs::read_to_string(out.join("flat.txt")).expect("artifact");
    assert!(artifact.contains("FILE: README.md\n"));
    assert!(!artifact.contains("FILE: docs/"));
    assert!(!artifact.contains("FILE: src/"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(report["stats"]["total_files"], serde_json::json!(6));
    assert_eq!(report["stats"]["included_files"], serde_json::json!(1));
    assert_eq!(report["stats"]["files_skipped"]["folder"], serde_json::json!(3));
    assert_eq!(report["stats"]["files_skipped"]["name"], serde_json::json!(1));
    assert_eq!(report["stats"]["files_skipped"]["extension"], serde_json::json!(1));
}

#[test]
fn test_export_reads_config_file() {
    let repo = TestRepo::new();
    let out = repo.workdir().join("out");
    fs::write(
        repo.workdir().join("config.json"),
        r#"{"extensions": [".lock"], "skip_folders": [], "skip_files": []}"#,
    )
    .expect("write config");

    let mut cmd = repo_flatten();
    cmd.current_dir(repo.workdir()).args([
        "export",
        "--path",
        repo.root().to_str().expect("utf8 path"),
        "--download-dir",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();

    let artifact = fs::read_to_string(out.join("demo.txt")).expect("artifact");
    assert!(artifact.contains("FILE: Cargo.lock\n"));
    assert!(artifact.contains("FILE: LICENSE\n"));
    assert!(!artifact.contains("FILE: README.md"));
}

#[test]
fn test_export_skips_download_dir_inside_root() {
    let repo = TestRepo::new();
    let out = repo.root().join("repos");

    for _ in 0..2 {
        let mut cmd = repo_flatten();
        cmd.current_dir(repo.workdir()).args([
            "export",
            "--path",
            repo.root().to_str().expect("utf8 path"),
            "--download-dir",
            out.to_str().expect("utf8 path"),
            "--include-ext",
            "md,txt",
        ]);
        cmd.assert().success();
    }

    let artifact = fs::read_to_string(out.join("demo.txt")).expect("artifact");
    assert!(!artifact.contains("FILE: repos/"));
}

#[test]
fn test_info_matches_export_when_download_dir_is_inside_root() {
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().join("proj");
    fs::create_dir_all(root.join("src")).expect("mkdir src");
    fs::write(root.join("src/a.py"), "print('a')\n").expect("write a.py");

    let mut export = repo_flatten();
    export.current_dir(&root).args(["export", "--path", "."]);
    export.assert().success();
    assert!(root.join("repos/proj.txt").exists());

    let mut info = repo_flatten();
    info.current_dir(&root).args(["info", "--path", ".", "--json"]);
    info.assert()
        .success()
        .stdout(predicate::str::contains("\"total_files\": 2"))
        .stdout(predicate::str::contains("\"included_files\": 1"))
        .stdout(predicate::str::contains("\"folder\": 1"))
        .stdout(predicate::str::contains("\"extension\": 0"));
}

#[test]
fn test_info_prints_statistics_without_writing() {
    let repo = TestRepo::new();
    let out = repo.workdir().join("out");

    let mut cmd = repo_flatten();
    cmd.current_dir(repo.workdir()).args([
        "info",
        "--path",
        repo.root().to_str().expect("utf8 path"),
        "--download-dir",
        out.to_str().expect("utf8 path"),
        "--json",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"included_files\": 3"))
        .stdout(predicate::str::contains("\"total_files\": 6"));

    assert!(!out.join("demo.txt").exists());
}

#[test]
fn test_missing_config_file_warns_and_continues() {
    let repo = TestRepo::new();
    let mut cmd = repo_flatten();
    cmd.current_dir(repo.workdir()).args([
        "info",
        "--path",
        repo.root().to_str().expect("utf8 path"),
        "--config",
        "nope.json",
    ]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("config file not found"))
        .stdout(predicate::str::contains("Statistics:"));
}

#[test]
fn test_completions_are_generated() {
    let mut cmd = repo_flatten();
    cmd.args(["completions", "bash"]);
    cmd.assert().success().stdout(predicate::str::contains("repo-flatten"));
}
