use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", "/nonexistent/bookshelf-config")
        .env_remove("BOOKSHELF_ENV")
        .env_remove("BOOKSHELF_AUTH__TOKEN_SECRET");
    cmd
}

fn run(args: &[&str]) -> (bool, String, String) {
    let output = cli().args(args).output().unwrap();
    (
        output.status.success(),
        String::from_utf8(output.stdout).unwrap(),
        String::from_utf8(output.stderr).unwrap(),
    )
}

#[test]
fn help_lists_subcommands() {
    let (ok, stdout, _) = run(&["--help"]);
    assert!(ok);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("token"));
}

#[test]
fn issued_token_verifies() {
    let (ok, stdout, _) = run(&["token", "issue", "--username", "admin"]);
    assert!(ok);
    let token = stdout.trim().to_owned();

    let (ok, stdout, _) = run(&["token", "verify", &token]);
    assert!(ok);
    assert!(stdout.contains(r#""username":"admin""#));
}

#[test]
fn garbage_token_is_rejected() {
    let (ok, _, stderr) = run(&["token", "verify", "not-a-token"]);
    assert!(!ok);
    assert!(stderr.contains("token rejected"));
}

#[test]
fn unknown_auth_mode_is_a_usage_error() {
    cli()
        .args(["serve", "--auth", "sometimes"])
        .assert()
        .failure();
}
