mod support;

use std::io::Write;
use std::process::{Command, Stdio};

fn sqlnorm() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sqlnorm"))
}

#[test]
fn cli_normalizes_files_to_stdout() {
    let temp = support::unique_temp_dir("sqlnorm_cli_file");
    let input_path = temp.join("input.sql");
    std::fs::write(&input_path, "SELECT * FROM t WHERE id = 42;\n").expect("should write input");

    let output = sqlnorm()
        .arg(&input_path)
        .output()
        .expect("should run sqlnorm binary");

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT * FROM t WHERE id = $1;\n"
    );
}

#[test]
fn cli_reads_stdin_when_no_files_are_given() {
    let mut child = sqlnorm()
        .args(["--numbering", "script"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("should spawn sqlnorm binary");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"SELECT 1; SELECT 2")
        .expect("should write stdin");
    let output = child.wait_with_output().expect("should wait for sqlnorm");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "SELECT $1; SELECT $2\n");
}

#[test]
fn cli_config_file_and_flags_are_combined() {
    let temp = support::unique_temp_dir("sqlnorm_cli_config");
    let input_path = temp.join("input.sql");
    let config_path = temp.join("options.json");
    std::fs::write(
        &input_path,
        "SELECT lower('A') FROM t GROUP BY lower('B'); DO $$BEGIN END$$",
    )
    .expect("should write input");
    std::fs::write(&config_path, r#"{"keep_routine_bodies": true}"#).expect("should write config");

    let output = sqlnorm()
        .arg(&input_path)
        .arg("--config")
        .arg(&config_path)
        .arg("--match-group-by")
        .output()
        .expect("should run sqlnorm binary");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT lower($1) FROM t GROUP BY lower($1); DO $$BEGIN END$$\n"
    );
}

#[test]
fn cli_parse_error_exits_with_usage_code() {
    let temp = support::unique_temp_dir("sqlnorm_cli_parse_err");
    let input_path = temp.join("invalid.sql");
    std::fs::write(&input_path, "SELEC 1").expect("should write invalid sql file");

    let output = sqlnorm()
        .arg(&input_path)
        .output()
        .expect("should run sqlnorm binary");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SQL parse error: syntax error at or near \"SELEC\""),
        "unexpected stderr: {stderr}"
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn cli_rejects_invalid_config() {
    let temp = support::unique_temp_dir("sqlnorm_cli_bad_config");
    let input_path = temp.join("input.sql");
    let config_path = temp.join("options.json");
    std::fs::write(&input_path, "SELECT 1").expect("should write input");
    std::fs::write(&config_path, r#"{"numbering": "global"}"#).expect("should write config");

    let output = sqlnorm()
        .arg(&input_path)
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("should run sqlnorm binary");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error parsing config"));
}

#[test]
fn cli_per_line_reports_failures_with_exit_code_one() {
    let temp = support::unique_temp_dir("sqlnorm_cli_per_line");
    let input_path = temp.join("queries.log");
    std::fs::write(
        &input_path,
        "SELECT 1\n\nSELECT 'open\nUPDATE t SET a = 2\n",
    )
    .expect("should write input");

    let output = sqlnorm()
        .arg(&input_path)
        .arg("--per-line")
        .output()
        .expect("should run sqlnorm binary");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT $1\nUPDATE t SET a = $1\n"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("queries.log:3"), "unexpected stderr: {stderr}");
}

#[test]
fn cli_writes_json_to_output_file() {
    let temp = support::unique_temp_dir("sqlnorm_cli_json");
    let input_path = temp.join("input.sql");
    let output_path = temp.join("out").join("report.json");
    std::fs::write(&input_path, "FETCH 10 FROM c").expect("should write input");

    let status = sqlnorm()
        .arg(&input_path)
        .args(["--format", "json", "--output"])
        .arg(&output_path)
        .status()
        .expect("should run sqlnorm binary");
    assert_eq!(status.code(), Some(0));

    let json = std::fs::read_to_string(&output_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", output_path.display()));
    let value: serde_json::Value = serde_json::from_str(&json).expect("output should be JSON");
    assert_eq!(value[0]["normalized"], "FETCH 10 FROM c");
    assert_eq!(value[0]["statements"][0]["preserved"][0]["site"], "fetch_count");
}
