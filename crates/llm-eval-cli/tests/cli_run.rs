use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Integration tests for the `llm-eval` binary.
///
/// The conversation engine is a small shell script that ignores its input
/// and answers with a one-message transcript.
const ENGINE_SCRIPT: &str = r#"cat >/dev/null; echo 'ai: hello' >&2; echo '{"messages":[{"speaker":"ai","text":"hello"}]}'"#;

fn write_fixture(root: &Path) -> Result<()> {
    let a = root.join("instr_a");
    let b = root.join("instr_b");
    fs::create_dir_all(&a)?;
    fs::create_dir_all(&b)?;
    fs::write(a.join("01.txt"), "You are a careful agent.")?;
    fs::write(a.join("02.txt"), "You are a hasty agent.")?;
    fs::write(b.join("01.txt"), "You are a demanding client.")?;

    fs::write(
        root.join("party.yaml"),
        r"
attendees:
  - role: agent
    instruction:
      text: placeholder
  - role: client
    instruction:
      text: placeholder
",
    )?;
    fs::write(root.join("exp.yaml"), "num_rounds: 1\n")?;
    fs::write(
        root.join("suites.yaml"),
        format!(
            r#"
- init instr dirs: ["{}", "{}"]
  party conf: "{}"
  exp conf: "{}"
"#,
            a.display(),
            b.display(),
            root.join("party.yaml").display(),
            root.join("exp.yaml").display()
        ),
    )?;
    Ok(())
}

fn llm_eval(args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_llm-eval"))
        .args(args)
        .arg("--color")
        .arg("never")
        .output()?)
}

fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

#[test]
fn test_dry_run_lists_combinations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixture(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let output = llm_eval(&[
        "run",
        "-c",
        &temp_dir.path().join("suites.yaml").to_string_lossy(),
        "-o",
        &out_dir.to_string_lossy(),
        "--dry-run",
    ])?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Combinations: 2"));
    assert!(stdout.contains("Total combinations: 2"));
    assert!(stdout.contains("01.txt"));

    // Nothing is written in a dry run
    assert!(!out_dir.exists());
    Ok(())
}

#[test]
fn test_run_writes_artifacts_per_round() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixture(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let output = llm_eval(&[
        "run",
        "-c",
        &temp_dir.path().join("suites.yaml").to_string_lossy(),
        "-o",
        &out_dir.to_string_lossy(),
        "--engine",
        "sh",
        "--engine-arg=-c",
        "--engine-arg",
        ENGINE_SCRIPT,
    ])?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    // Two combinations, one round each, two files per round
    let names = file_names(&out_dir)?;
    assert_eq!(names.len(), 4, "unexpected artifacts: {names:?}");
    assert_eq!(names.iter().filter(|n| n.starts_with("chat_history_")).count(), 2);
    assert_eq!(names.iter().filter(|n| n.starts_with("party_conf_")).count(), 2);

    let history = names
        .iter()
        .find(|n| n.starts_with("chat_history_"))
        .map(|n| out_dir.join(n))
        .ok_or_else(|| anyhow::anyhow!("no chat history written"))?;
    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(history)?)?;
    assert_eq!(record["messages"][0]["text"], "hello");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Experiment suites complete"));
    assert!(stdout.contains("Combinations: 2"));
    Ok(())
}

#[test]
fn test_missing_exp_conf_key_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixture(temp_dir.path())?;
    fs::write(
        temp_dir.path().join("suites.yaml"),
        "- init instr dirs: [instr_a]\n  party conf: party.yaml\n",
    )?;
    let out_dir = temp_dir.path().join("out");

    let output = llm_eval(&[
        "run",
        "-c",
        &temp_dir.path().join("suites.yaml").to_string_lossy(),
        "-o",
        &out_dir.to_string_lossy(),
        "--engine",
        "sh",
        "--engine-arg=-c",
        "--engine-arg",
        ENGINE_SCRIPT,
    ])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required keys: exp conf"));
    assert!(!out_dir.exists());
    Ok(())
}

#[test]
fn test_run_requires_engine() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixture(temp_dir.path())?;

    let output = llm_eval(&[
        "run",
        "-c",
        &temp_dir.path().join("suites.yaml").to_string_lossy(),
        "-o",
        &temp_dir.path().join("out").to_string_lossy(),
    ])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--engine"));
    Ok(())
}

#[test]
fn test_session_subcommand() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixture(temp_dir.path())?;
    let out_dir = temp_dir.path().join("session_out");
    fs::write(temp_dir.path().join("exp.yaml"), "num_rounds: 2\n")?;

    let output = llm_eval(&[
        "session",
        "-p",
        &temp_dir.path().join("party.yaml").to_string_lossy(),
        "-t",
        &temp_dir.path().join("exp.yaml").to_string_lossy(),
        "-i",
        &temp_dir.path().join("instr_a").to_string_lossy(),
        "-o",
        &out_dir.to_string_lossy(),
        "--engine",
        "sh",
        "--engine-arg=-c",
        "--engine-arg",
        ENGINE_SCRIPT,
    ])?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(file_names(&out_dir)?.len(), 4);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Round 1"));
    assert!(stdout.contains("Round 2"));
    Ok(())
}

#[test]
fn test_engine_output_streams_only_when_verbose() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixture(temp_dir.path())?;
    let suites = temp_dir.path().join("suites.yaml");

    let run = |verbose: bool, out: &str| -> Result<Output> {
        let out_dir = temp_dir.path().join(out);
        let mut args = vec![
            "run".to_string(),
            "-c".to_string(),
            suites.to_string_lossy().into_owned(),
            "-o".to_string(),
            out_dir.to_string_lossy().into_owned(),
            "--engine".to_string(),
            "sh".to_string(),
            "--engine-arg=-c".to_string(),
            "--engine-arg".to_string(),
            ENGINE_SCRIPT.to_string(),
        ];
        if verbose {
            args.push("-v".to_string());
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        llm_eval(&args)
    };

    let quiet = run(false, "quiet_out")?;
    assert!(quiet.status.success(), "{}", String::from_utf8_lossy(&quiet.stderr));
    assert!(!String::from_utf8_lossy(&quiet.stdout).contains("ai: hello"));

    let verbose = run(true, "verbose_out")?;
    assert!(verbose.status.success(), "{}", String::from_utf8_lossy(&verbose.stderr));
    let stdout = String::from_utf8_lossy(&verbose.stdout);
    assert_eq!(stdout.matches("ai: hello").count(), 2);
    Ok(())
}
