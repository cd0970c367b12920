use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

fn commit_as(dir: &Path, name: &str, content: &str, author: (&str, &str), date: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();

    git(dir, &["add", "."]);
    commit_staged(dir, &format!("add {name}"), author, date);
}

fn commit_staged(dir: &Path, message: &str, author: (&str, &str), date: &str) {
    assert!(Command::new("git")
        .args(["commit", "-m", message])
        .env("GIT_AUTHOR_NAME", author.0)
        .env("GIT_AUTHOR_EMAIL", author.1)
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

/// Command with an empty config file so user configuration never leaks in.
fn gitmetrics(repo: &Path, config_dir: &TempDir) -> Command {
    let config = config_dir.path().join("config.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::cargo_bin("gitmetrics").unwrap();
    cmd.current_dir(repo)
        .env("GITMETRICS_CONFIG", &config)
        .env_remove("RUST_LOG")
        .arg("--repo")
        .arg(repo);
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

fn find_env<'a>(rows: &'a Value, env: &str) -> &'a Value {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|row| row["environment"] == env)
        .unwrap_or_else(|| panic!("no {env} row in {rows}"))
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

const ANN: (&str, &str) = ("Ann", "ann@x.com");
const BOB: (&str, &str) = ("Bob", "bob@x.com");

#[test]
fn commit_on_two_branches_counts_in_both_environments() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "one\ntwo\n", ANN, "2024-01-02T10:00:00+00:00");
    git(dir.path(), &["checkout", "-b", "develop"]);
    commit_as(dir.path(), "b.txt", "x\ny\nz\n", ANN, "2024-01-03T10:00:00+00:00");

    let v = json_stdout(
        gitmetrics(dir.path(), &cfg).args(["analyze", "--json", "--no-xlsx", "-a", "ann@x.com"]),
    );

    let envs = &v["data"]["environments"];
    let prd = find_env(envs, "PRD");
    assert_eq!(prd["commits"], 1);
    assert_eq!(prd["insertions"], 2);
    assert_eq!(prd["branches"], 1);

    let hml = find_env(envs, "HML");
    assert_eq!(hml["commits"], 2);
    assert_eq!(hml["insertions"], 5);
    assert_eq!(hml["branches"], 1);

    let summary = v["data"]["author_summary"].as_array().unwrap();
    assert_eq!(summary.len(), 2);
    assert!(summary.iter().all(|row| row["author_email"] == "ann@x.com"));
    assert_eq!(v["metadata"]["authors"][0]["email"], "ann@x.com");
}

#[test]
fn latest_name_wins_for_an_email() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ("Ann Old", "ann@x.com"), "2024-01-02T10:00:00+00:00");
    commit_as(dir.path(), "b.txt", "b\n", ("Ann New", "ann@x.com"), "2024-02-01T10:00:00+00:00");

    let v = json_stdout(
        gitmetrics(dir.path(), &cfg).args(["analyze", "--json", "--no-xlsx", "-a", "ann@x.com"]),
    );

    let daily = v["data"]["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 2);
    assert!(daily.iter().all(|row| row["author_name"] == "Ann New"));
    assert_eq!(v["metadata"]["authors"][0]["name"], "Ann New");

    let monthly = v["data"]["monthly_totals"].as_array().unwrap();
    assert_eq!(monthly[0]["month"], "2024-02");
    assert_eq!(monthly[1]["month"], "2024-01");
}

#[test]
fn since_and_until_are_inclusive_dates() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ANN, "2024-01-01T08:00:00+00:00");
    commit_as(dir.path(), "b.txt", "b\n", ANN, "2024-01-05T23:30:00+00:00");
    commit_as(dir.path(), "c.txt", "c\n", ANN, "2024-01-09T08:00:00+00:00");

    let v = json_stdout(gitmetrics(dir.path(), &cfg).args([
        "analyze",
        "--json",
        "--no-xlsx",
        "--since",
        "2024-01-05",
        "--until",
        "2024-01-05",
    ]));

    let daily = v["data"]["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["date"], "2024-01-05");
}

#[test]
fn all_authors_and_default_recent_author() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ANN, "2024-01-02T10:00:00+00:00");
    commit_as(dir.path(), "b.txt", "b\n", BOB, "2024-01-03T10:00:00+00:00");

    let recent = json_stdout(gitmetrics(dir.path(), &cfg).args(["analyze", "--json", "--no-xlsx"]));
    let summary = recent["data"]["author_summary"].as_array().unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0]["author_email"], "bob@x.com");

    let all = json_stdout(
        gitmetrics(dir.path(), &cfg).args(["analyze", "--json", "--no-xlsx", "--all-authors"]),
    );
    assert_eq!(all["data"]["author_summary"].as_array().unwrap().len(), 2);
    assert_eq!(all["metadata"]["authors"].as_array().unwrap().len(), 2);
}

#[test]
fn partial_author_term_selects_known_author() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ANN, "2024-01-02T10:00:00+00:00");
    commit_as(dir.path(), "b.txt", "b\n", BOB, "2024-01-03T10:00:00+00:00");

    let v = json_stdout(gitmetrics(dir.path(), &cfg).args(["analyze", "--json", "--no-xlsx", "-a", "ann"]));
    let summary = v["data"]["author_summary"].as_array().unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0]["author_email"], "ann@x.com");
}

#[test]
fn analyze_writes_spreadsheet_and_json_export() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    let reports = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ANN, "2024-01-02T10:00:00+00:00");

    gitmetrics(dir.path(), &cfg)
        .args(["analyze", "--export-json", "-a", "ann@x.com", "--reports-dir"])
        .arg(reports.path())
        .assert()
        .success();

    let files = files_in(reports.path());
    assert_eq!(files.len(), 2);
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert!(names[0].starts_with("git_metrics_") && names[0].ends_with("_ann.json"));
    assert!(names[1].starts_with("git_report_") && names[1].ends_with("_ann.xlsx"));
    assert!(fs::read(&files[1]).unwrap().starts_with(b"PK"));
}

#[test]
fn no_matching_commits_writes_nothing() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    let reports = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ANN, "2024-01-02T10:00:00+00:00");

    let out_dir = reports.path().join("out");
    let out = gitmetrics(dir.path(), &cfg)
        .args(["analyze", "-a", "nobody@x.com", "--reports-dir"])
        .arg(&out_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert!(String::from_utf8_lossy(&out).contains("No commits found"));
    assert!(!out_dir.exists());
}

#[test]
fn authors_lists_commit_counts() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ANN, "2024-01-02T10:00:00+00:00");
    commit_as(dir.path(), "b.txt", "b\n", ANN, "2024-01-03T10:00:00+00:00");
    commit_as(dir.path(), "c.txt", "c\n", BOB, "2024-01-04T10:00:00+00:00");

    let v = json_stdout(gitmetrics(dir.path(), &cfg).args(["authors", "--json"]));
    let authors = v.as_array().unwrap();
    assert_eq!(authors.len(), 2);

    let ann = authors.iter().find(|a| a["email"] == "ann@x.com").unwrap();
    assert_eq!(ann["commits"], 2);
    assert_eq!(ann["name"], "Ann");
}

#[test]
fn check_rejects_plain_directory() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();

    let out = gitmetrics(dir.path(), &cfg)
        .arg("check")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("Not a git repository"));
}

#[test]
fn check_accepts_repository() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\n", ANN, "2024-01-02T10:00:00+00:00");

    let out = gitmetrics(dir.path(), &cfg)
        .arg("check")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("1 local branch"));
}

#[test]
fn save_copies_report() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    let report = dir.path().join("git_report_test.xlsx");
    fs::write(&report, b"PK").unwrap();
    let dest = dir.path().join("saved");

    gitmetrics(dir.path(), &cfg)
        .arg("save")
        .arg("--report")
        .arg(&report)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success();

    assert!(dest.join("git_report_test.xlsx").is_file());
}

#[test]
fn rename_and_modification_match_numstat() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "one\ntwo\nthree\n", ANN, "2024-01-02T10:00:00+00:00");
    git(dir.path(), &["mv", "a.txt", "b.txt"]);
    commit_staged(dir.path(), "rename a to b", ANN, "2024-01-03T10:00:00+00:00");
    commit_as(dir.path(), "b.txt", "one\nTWO\nthree\nfour\n", ANN, "2024-01-04T10:00:00+00:00");

    let v = json_stdout(gitmetrics(dir.path(), &cfg).args(["analyze", "--json", "--no-xlsx"]));
    let daily = v["data"]["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 3);

    // git diff --numstat --no-renames: "0 3 a.txt" and "3 0 b.txt"
    let renamed = &daily[1];
    assert_eq!(renamed["date"], "2024-01-03");
    assert_eq!(renamed["files_changed"], 2);
    assert_eq!(renamed["insertions"], 3);
    assert_eq!(renamed["deletions"], 3);

    let modified = &daily[2];
    assert_eq!(modified["date"], "2024-01-04");
    assert_eq!(modified["files_changed"], 1);
    assert_eq!(modified["insertions"], 2);
    assert_eq!(modified["deletions"], 1);
}

#[test]
fn unreadable_branch_is_skipped() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_as(dir.path(), "a.txt", "a\nb\n", ANN, "2024-01-02T10:00:00+00:00");
    fs::write(
        dir.path().join(".git/refs/heads/broken"),
        "0123456789abcdef0123456789abcdef01234567\n",
    )
    .unwrap();

    let v = json_stdout(
        gitmetrics(dir.path(), &cfg).args(["analyze", "--json", "--no-xlsx", "--all-authors"]),
    );

    let by_branch = v["data"]["by_branch"].as_array().unwrap();
    assert_eq!(by_branch.len(), 1);
    assert_eq!(by_branch[0]["branch"], "main");
    assert_eq!(by_branch[0]["commits"], 1);
    assert_eq!(find_env(&v["data"]["environments"], "PRD")["insertions"], 2);
}

#[test]
fn repository_without_commits_has_no_data() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    let reports = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());

    let out_dir = reports.path().join("out");
    let out = gitmetrics(dir.path(), &cfg)
        .args(["analyze", "--reports-dir"])
        .arg(&out_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert!(String::from_utf8_lossy(&out).contains("No commits found"));
    assert!(!out_dir.exists());
}

#[test]
fn analyze_rejects_plain_directory() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();
    let reports = tempdir().unwrap();

    let out_dir = reports.path().join("out");
    let out = gitmetrics(dir.path(), &cfg)
        .args(["analyze", "--reports-dir"])
        .arg(&out_dir)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    assert!(String::from_utf8_lossy(&out).contains("Not a git repository"));
    assert!(!out_dir.exists());
}
