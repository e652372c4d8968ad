use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bitstore_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_bitstore_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitstore").expect("Failed to find bitstore binary");
    cmd.current_dir(dir);
    cmd.env_remove("BIT_DEFAULT_BRANCH");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// `commit-tree` with a fixed author so ids are reproducible
pub fn bitstore_commit_tree(dir: &Path, tree: &str, parents: &[&str], message: &str) -> Command {
    let mut cmd = run_bitstore_command(dir, &["commit-tree", tree]);
    for parent in parents {
        cmd.args(["-p", parent]);
    }
    cmd.args(["-m", message]);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", "fake_user"),
        ("GIT_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd.env_remove("GIT_COMMITTER_NAME");
    cmd
}

/// Run a command that prints an object id and return it
pub fn output_oid(mut cmd: Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output)
        .expect("stdout is utf-8")
        .trim()
        .to_string()
}
