//! Host runner tests against real `sh` children.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};
use stdio_exchange::host::Runner;
use stdio_exchange::script::Script;
use stdio_exchange::{ExchangeError, Framing};

/// Child that echoes the token line and then its remaining input.
fn echo_child() -> Runner {
    Runner::new("sh").args(["-c", r#"IFS= read -r t; printf '%s\n' "$t"; cat"#])
}

#[tokio::test]
async fn test_framed_round_trip() {
    let input = json!({"temp": 10.0, "description": "cold"});
    let exchange = echo_child().call::<_, Value>(&input).await.unwrap();

    assert_eq!(exchange.output, input);
    assert!(exchange.status.success());
    assert!(exchange.stderr.is_empty());
}

#[tokio::test]
async fn test_unframed_round_trip() {
    let exchange = Runner::new("cat")
        .framing(Framing::Unframed)
        .call::<_, Vec<i32>>(&[3, 1, 2])
        .await
        .unwrap();
    assert_eq!(exchange.output, vec![3, 1, 2]);
}

#[tokio::test]
async fn test_stderr_is_captured() {
    let exchange = Runner::new("sh")
        .args(["-c", r#"IFS= read -r t; echo note >&2; printf '%s\n' "$t"; cat"#])
        .call::<_, Value>(&json!(1))
        .await
        .unwrap();
    assert_eq!(exchange.stderr, "note\n");
}

#[tokio::test]
async fn test_missing_token_detected() {
    let err = Runner::new("sh")
        .args(["-c", "cat >/dev/null; printf '[1]'"])
        .call::<_, Value>(&json!([]))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::MissingToken));
}

#[tokio::test]
async fn test_non_zero_exit_reports_stderr() {
    let err = Runner::new("sh")
        .args(["-c", "echo boom >&2; exit 3"])
        .call::<_, Value>(&json!({}))
        .await
        .unwrap_err();

    match err {
        ExchangeError::ChildFailed { status, stderr } => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(stderr, "boom\n");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_child_output() {
    let err = Runner::new("sh")
        .args(["-c", r#"IFS= read -r t; printf '%s\n{oops' "$t""#])
        .call::<_, Value>(&json!(null))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::MalformedInput(_)));
}

#[tokio::test]
async fn test_timeout_kills_child() {
    let err = Runner::new("sh")
        .args(["-c", "exec sleep 5"])
        .timeout(Duration::from_millis(100))
        .call::<_, Value>(&json!(null))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Timeout(d) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_call_no_output() {
    let elapsed = Runner::new("sh")
        .args(["-c", "cat >/dev/null"])
        .call_no_output(&json!({"ignored": true}))
        .await
        .unwrap();
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_version_check() {
    let version = Runner::new("echo").version().await.unwrap();
    assert!(!version.is_empty());
    assert!(!Runner::new("no-such-program-for-version").is_available().await);
}

#[tokio::test]
async fn test_output_only_sends_empty_payload() {
    // The child echoes whatever payload it was given.
    let exchange = echo_child().call_output_only::<String>().await.unwrap();
    assert_eq!(exchange.output, "");
}

#[tokio::test]
async fn test_output_only_child_ignoring_stdin() {
    let exchange = Runner::new("sh")
        .args(["-c", r#"IFS= read -r t; printf '%s\n[[0.5,1],[2,3]]' "$t""#])
        .call_output_only::<Vec<Vec<f64>>>()
        .await
        .unwrap();
    assert_eq!(exchange.output, vec![vec![0.5, 1.0], vec![2.0, 3.0]]);
}

#[tokio::test]
async fn test_silent_call() {
    let elapsed = Runner::new("sh")
        .args(["-c", r#"IFS= read -r t; rest=$(cat); [ "$rest" = '""' ]"#])
        .call_silent()
        .await
        .unwrap();
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_silent_call_reports_failure() {
    let err = Runner::new("sh")
        .args(["-c", "exit 7"])
        .call_silent()
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::ChildFailed { .. }));
}

/// Script glue for `sh`: read the token, echo it, pass the input through.
fn sh_script(body: &str, dir: &Path) -> Script {
    Script::new(body)
        .prologue(r#"IFS= read -r t; echo "$0" >&2"#)
        .on_input(r#"input=$(cat)"#)
        .on_output(r#"printf '%s\n%s' "$t" "$output""#)
        .suffix(".sh")
        .dir(dir)
}

fn script_path(stderr: &str) -> PathBuf {
    PathBuf::from(stderr.lines().next().expect("script path on stderr"))
}

#[tokio::test]
async fn test_script_runs_and_is_removed() {
    let dir = tempfile::TempDir::new().unwrap();
    let runner = Runner::script("sh", sh_script(r#"output="$input""#, dir.path()));

    let exchange = runner.call::<_, Value>(&json!({"k": [1, 2]})).await.unwrap();
    assert_eq!(exchange.output, json!({"k": [1, 2]}));

    let path = script_path(&exchange.stderr);
    assert!(path.starts_with(dir.path()));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_script_output_only_skips_input_lines() {
    let dir = tempfile::TempDir::new().unwrap();
    // With the input lines skipped, `$input` stays unset.
    let runner = Runner::script("sh", sh_script(r#"output="[\"${input:-none}\"]""#, dir.path()));

    let exchange = runner.call_output_only::<Vec<String>>().await.unwrap();
    assert_eq!(exchange.output, vec!["none".to_string()]);
}

#[tokio::test]
async fn test_script_removed_after_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let runner = Runner::script("sh", sh_script("exit 4", dir.path()));

    let err = runner.call::<_, Value>(&json!(1)).await.unwrap_err();
    match err {
        ExchangeError::ChildFailed { status, stderr } => {
            assert_eq!(status.code(), Some(4));
            assert!(!script_path(&stderr).exists());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_script_removed_after_timeout() {
    let dir = tempfile::TempDir::new().unwrap();
    let runner = Runner::script("sh", sh_script("exec sleep 5", dir.path()))
        .timeout(Duration::from_millis(100));

    let err = runner.call::<_, Value>(&json!(1)).await.unwrap_err();
    assert!(matches!(err, ExchangeError::Timeout(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
