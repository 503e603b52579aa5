//! Runs the `todo` binary against a live mock store.
//!
//! # Design
//! Every test starts its own mock store on a random port, so state never
//! leaks between tests, then drives the real binary with `std::process` and
//! checks stdout, stderr and the exit status.

use std::process::{Command, Output};

use mock_store::Credentials;

const USAGE: &str = "\
usage:
  todo list [TERM]   list items, optionally matching a given term
  todo add ITEM      add an item to the list
  todo check TERM    check items that match a given term
  todo clear         clear all items
";

/// Start a mock store on a random port and return its base URL.
fn start_store(credentials: Option<Credentials>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_store::run(listener, credentials).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A `todo` invocation with a clean environment pointing at `url`.
fn todo_cmd(url: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_todo"));
    for var in [
        "TODO_ES_USER",
        "TODO_ES_PASSWORD",
        "TODO_ES_INDEX",
        "TODO_ES_TIMEOUT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("TODO_ES_URL", url);
    cmd
}

fn todo(url: &str, args: &[&str]) -> Output {
    todo_cmd(url).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "exit {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        stdout(output),
        stderr(output)
    );
}

// --- dispatcher ---

#[test]
fn no_arguments_prints_usage() {
    let out = todo("http://127.0.0.1:1", &[]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), USAGE);
}

#[test]
fn unknown_command_exits_1() {
    let out = todo("http://127.0.0.1:1", &["frobnicate"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "Unknown command\n");
}

#[test]
fn unknown_leading_flag_is_an_unknown_command() {
    let out = todo("http://127.0.0.1:1", &["--frob"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "Unknown command\n");
}

#[test]
fn add_without_item_prints_usage_and_exits_0() {
    let out = todo("http://127.0.0.1:1", &["add"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "usage: todo add ITEM\n");
}

#[test]
fn check_without_term_prints_usage_and_exits_0() {
    let out = todo("http://127.0.0.1:1", &["check"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "usage: todo check TERM\n");
}

#[test]
fn invalid_settings_exit_2() {
    let out = todo("localhost:9200", &["list"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("store URL must start with"));
}

// --- store round trips ---

#[test]
fn add_list_check_scenario() {
    let url = start_store(None);

    let out = todo(&url, &["add", "buy milk"]);
    assert_ok(&out);
    assert!(stdout(&out).is_empty());

    let out = todo(&url, &["list", "milk"]);
    assert_ok(&out);
    assert_eq!(stdout(&out), "[ ] buy milk\n");

    let out = todo(&url, &["check", "milk"]);
    assert_ok(&out);

    let out = todo(&url, &["list", "milk"]);
    assert_ok(&out);
    assert_eq!(stdout(&out), "[X] buy milk\n");
}

#[test]
fn check_with_no_matches_changes_nothing() {
    let url = start_store(None);
    assert_ok(&todo(&url, &["add", "walk dog"]));

    let out = todo(&url, &["check", "milk"]);
    assert_ok(&out);

    assert_eq!(stdout(&todo(&url, &["list"])), "[ ] walk dog\n");
}

#[test]
fn check_twice_is_idempotent() {
    let url = start_store(None);
    assert_ok(&todo(&url, &["add", "buy milk"]));
    assert_ok(&todo(&url, &["check", "milk"]));
    assert_ok(&todo(&url, &["check", "milk"]));

    assert_eq!(stdout(&todo(&url, &["list", "milk"])), "[X] buy milk\n");
}

#[test]
fn list_without_term_shows_every_item() {
    let url = start_store(None);
    assert_ok(&todo(&url, &["add", "buy milk"]));
    assert_ok(&todo(&url, &["add", "walk", "dog"]));
    assert_ok(&todo(&url, &["check", "dog"]));

    let out = todo(&url, &["list"]);
    assert_ok(&out);
    assert_eq!(stdout(&out), "[ ] buy milk\n[X] walk dog\n");
}

#[test]
fn extra_words_and_hyphenated_text_are_accepted() {
    let url = start_store(None);
    assert_ok(&todo(&url, &["add", "-1 coffee"]));
    assert_ok(&todo(&url, &["add", "buy milk"]));

    assert_ok(&todo(&url, &["check", "milk", "now"]));

    let out = todo(&url, &["list", "coffee", "extra"]);
    assert_ok(&out);
    assert_eq!(stdout(&out), "[ ] -1 coffee\n");
    assert_eq!(stdout(&todo(&url, &["list", "milk"])), "[X] buy milk\n");
}

#[test]
fn duplicates_are_allowed() {
    let url = start_store(None);
    assert_ok(&todo(&url, &["add", "buy milk"]));
    assert_ok(&todo(&url, &["add", "buy milk"]));

    assert_eq!(
        stdout(&todo(&url, &["list", "milk"])),
        "[ ] buy milk\n[ ] buy milk\n"
    );
}

#[test]
fn list_limit_caps_output() {
    let url = start_store(None);
    for item in ["one", "two", "three"] {
        assert_ok(&todo(&url, &["add", item]));
    }

    let out = todo(&url, &["list", "--limit", "2"]);
    assert_ok(&out);
    assert_eq!(stdout(&out), "[ ] one\n[ ] two\n");
}

#[test]
fn clear_removes_everything() {
    let url = start_store(None);
    assert_ok(&todo(&url, &["add", "one"]));
    assert_ok(&todo(&url, &["add", "two"]));

    assert_ok(&todo(&url, &["clear"]));

    let out = todo(&url, &["list"]);
    assert_ok(&out);
    assert!(stdout(&out).is_empty());
}

#[test]
fn custom_index_is_isolated() {
    let url = start_store(None);
    assert_ok(&todo(&url, &["add", "home chore"]));
    assert_ok(&todo(&url, &["--index", "work", "add", "work chore"]));

    assert_eq!(stdout(&todo(&url, &["list"])), "[ ] home chore\n");
    assert_eq!(
        stdout(&todo(&url, &["list", "--index", "work"])),
        "[ ] work chore\n"
    );
}

// --- failures ---

#[test]
fn missing_index_reports_store_error() {
    let url = start_store(None);

    let out = todo(&url, &["list", "milk"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("Error 404\n"), "{err}");
    assert!(err.contains("  type: \"index_not_found_exception\"\n"), "{err}");
    assert!(err.contains("  reason: \"no such index [todo]\"\n"), "{err}");
    let keys: Vec<&str> = err
        .lines()
        .skip(1)
        .filter_map(|line| line.trim_start().split(':').next())
        .collect();
    assert_eq!(keys, ["root_cause", "type", "reason", "index"]);
    assert!(stdout(&out).is_empty());
}

#[test]
fn credentials_come_from_the_environment() {
    let url = start_store(Some(Credentials::new("elastic", "changeme")));

    let out = todo_cmd(&url)
        .env("TODO_ES_USER", "elastic")
        .env("TODO_ES_PASSWORD", "changeme")
        .args(["add", "secured"])
        .output()
        .unwrap();
    assert_ok(&out);

    let out = todo_cmd(&url)
        .env("TODO_ES_USER", "elastic")
        .env("TODO_ES_PASSWORD", "changeme")
        .args(["list"])
        .output()
        .unwrap();
    assert_ok(&out);
    assert_eq!(stdout(&out), "[ ] secured\n");
}

#[test]
fn wrong_credentials_report_401() {
    let url = start_store(Some(Credentials::new("elastic", "changeme")));

    let out = todo(&url, &["--user", "elastic", "--password", "nope", "list"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("Error 401\n"), "{err}");
    assert!(err.contains("  type: \"security_exception\"\n"), "{err}");
}

#[test]
fn unreachable_store_reports_transport_error() {
    // Grab a free port, then close it so nothing is listening.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{port}");

    let out = todo(&url, &["add", "buy milk"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(
        err.starts_with(&format!("Error: POST {url}/todo/_doc?refresh=true failed")),
        "{err}"
    );
    assert!(err.contains("Caused by:"), "{err}");
}
