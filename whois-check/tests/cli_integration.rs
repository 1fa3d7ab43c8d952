// whois-check/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Command isolated from the user's config files and `WC_*` environment.
fn whois_check(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("whois-check").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    for var in [
        "WC_CONCURRENCY",
        "WC_CONNECT_TIMEOUT",
        "WC_READ_TIMEOUT",
        "WC_HTTP_TIMEOUT",
        "WC_REGISTRY",
        "WC_REGISTRY_OVERRIDE",
        "WC_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// A port nothing listens on.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Serve `connections` WHOIS queries, answering with `response`.
fn spawn_whois_server(response: &'static str, connections: usize) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        for stream in listener.incoming().take(connections) {
            let Ok(mut stream) = stream else { continue };
            let mut query = String::new();
            let _ = BufReader::new(&stream).read_line(&mut query);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    port
}

fn write_registry(dir: &Path, whois_port: u16) -> PathBuf {
    let path = dir.join("catalog.json");
    fs::write(
        &path,
        format!(
            r#"[{{"extensions": ".test", "uri": "socket://127.0.0.1:{}", "available": "No match for"}}]"#,
            whois_port
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_help_shows_flags() {
    let home = TempDir::new().unwrap();
    whois_check(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--registry"))
        .stdout(predicate::str::contains("--list-tlds"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_requires_domains() {
    let home = TempDir::new().unwrap();
    whois_check(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_rejects_invalid_concurrency() {
    let home = TempDir::new().unwrap();
    whois_check(home.path())
        .args(["example.com", "-c", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Concurrency must be between 1 and 100"));
}

#[test]
fn test_list_tlds_uses_bundled_catalog() {
    let home = TempDir::new().unwrap();
    whois_check(home.path())
        .arg("--list-tlds")
        .assert()
        .success()
        .stdout(predicate::str::contains(".com"))
        .stdout(predicate::str::contains(".es"))
        .stdout(predicate::str::contains("HTTP"));
}

#[test]
fn test_list_tlds_json() {
    let home = TempDir::new().unwrap();
    let output = whois_check(home.path())
        .args(["--list-tlds", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let tlds: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert!(tlds.contains(&".com".to_string()));
    assert!(tlds.contains(&".co.uk".to_string()));
}

#[test]
fn test_unknown_tld_is_unsupported() {
    let home = TempDir::new().unwrap();
    whois_check(home.path())
        .arg("example.nosuchtld")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.nosuchtld"))
        .stdout(predicate::str::contains("UNSUPPORTED"));
}

#[test]
fn test_available_domain_from_custom_registry() {
    let home = TempDir::new().unwrap();
    let port = spawn_whois_server("No match for \"FREE.TEST\".\r\n", 1);
    let registry = write_registry(home.path(), port);

    whois_check(home.path())
        .arg("free.test")
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("free.test"))
        .stdout(predicate::str::contains("AVAILABLE"));
}

#[test]
fn test_taken_domain_shows_info() {
    let home = TempDir::new().unwrap();
    let port = spawn_whois_server("Domain Name: TAKEN.TEST\r\nRegistrar: <Acme>\r\n", 1);
    let registry = write_registry(home.path(), port);

    whois_check(home.path())
        .args(["taken.test", "--info"])
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("TAKEN"))
        .stdout(predicate::str::contains("Registrar: <Acme>"));
}

#[test]
fn test_connection_failure_is_reported_not_fatal() {
    let home = TempDir::new().unwrap();
    let registry = write_registry(home.path(), closed_port());

    whois_check(home.path())
        .arg("example.test")
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("ERROR"));
}

#[test]
fn test_json_output_keeps_input_order() {
    let home = TempDir::new().unwrap();
    let registry = write_registry(home.path(), closed_port());

    let output = whois_check(home.path())
        .args(["example.test", "example.nosuchtld", "--json"])
        .arg("--registry")
        .arg(&registry)
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["domain"], "example.test");
    assert_eq!(results[0]["status"], "error");
    assert_eq!(results[0]["method_used"], "socket");
    assert_eq!(results[1]["domain"], "example.nosuchtld");
    assert_eq!(results[1]["status"], "unsupported");
    assert_eq!(results[1]["tld_known"], false);
}

#[test]
fn test_file_input_with_tld_expansion() {
    let home = TempDir::new().unwrap();
    let domains = home.path().join("domains.txt");
    fs::write(&domains, "# candidates\nalpha\nbeta.nosuchtld\n").unwrap();

    let output = whois_check(home.path())
        .args(["--json", "-t", "nosuchtld,othertld", "-f"])
        .arg(&domains)
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = results
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["domain"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["alpha.nosuchtld", "alpha.othertld", "beta.nosuchtld"]
    );
}

#[test]
fn test_missing_registry_is_fatal() {
    let home = TempDir::new().unwrap();
    whois_check(home.path())
        .args(["example.com", "--registry", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_registry_from_environment() {
    let home = TempDir::new().unwrap();
    whois_check(home.path())
        .env("WC_REGISTRY", "/definitely/not/here.json")
        .arg("example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TLD catalog not found"));
}

#[test]
fn test_registry_from_local_config_file() {
    let home = TempDir::new().unwrap();
    let port = spawn_whois_server("No match for \"FREE.TEST\".\r\n", 1);
    write_registry(home.path(), port);
    fs::write(
        home.path().join("whois-check.toml"),
        "[registry]\nbase = \"catalog.json\"\n",
    )
    .unwrap();

    whois_check(home.path())
        .arg("free.test")
        .assert()
        .success()
        .stdout(predicate::str::contains("AVAILABLE"));
}
