use std::fs;
use std::path::Path;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn xenly(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xenly"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run xenly")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn dumpversion_prints_the_bare_version() {
    let dir = tempfile::tempdir().unwrap();
    for flag in ["--dumpversion", "-dv"] {
        let output = xenly(dir.path(), &[flag]);
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), env!("CARGO_PKG_VERSION"));
    }
}

#[test]
fn machine_and_os_flags_print_something() {
    let dir = tempfile::tempdir().unwrap();
    for flag in ["-dm", "--dumpmachine", "-os", "--operatingsystem", "--author", "--help"] {
        let output = xenly(dir.path(), &[flag]);
        assert!(output.status.success(), "{}", flag);
        assert!(!stdout(&output).trim().is_empty(), "{}", flag);
    }
}

#[test]
fn create_project_writes_a_runnable_main() {
    let dir = tempfile::tempdir().unwrap();

    let output = xenly(dir.path(), &["--create-project", "demo"]);
    assert!(output.status.success());
    let main = dir.path().join("demo_project").join("main.xe");
    assert_eq!(fs::read_to_string(&main).unwrap(), xenly::project::DEFAULT_SOURCE);

    let run = xenly(dir.path(), &[main.to_str().unwrap()]);
    assert!(run.status.success());
    assert_eq!(stdout(&run), "Hello, World!\n8\n");

    let again = xenly(dir.path(), &["--create-project", "demo"]);
    assert!(!again.status.success());
}

#[test]
fn init_uses_the_default_project_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = xenly(dir.path(), &["--init"]);
    assert!(output.status.success());
    assert!(dir.path().join("xenly_project").join("main.xe").is_file());
}

#[test]
fn failing_program_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("bad.xe");
    fs::write(&script, "print(1)\nprint(10 / 0)\nprint(2)\n").unwrap();

    let output = xenly(dir.path(), &[script.to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "1\n");
}

#[test]
fn max_depth_flag_limits_nesting() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("deep.xe");
    fs::write(&script, format!("print({}1{})\n", "(".repeat(10), ")".repeat(10))).unwrap();

    let shallow = xenly(dir.path(), &["--max-depth", "4", script.to_str().unwrap()]);
    assert!(!shallow.status.success());

    let deep = xenly(dir.path(), &[script.to_str().unwrap()]);
    assert!(deep.status.success());
    assert_eq!(stdout(&deep), "1\n");
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = xenly(dir.path(), &["does_not_exist.xe"]);
    assert!(!output.status.success());
}

#[test]
fn max_depth_must_be_positive() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("one.xe");
    fs::write(&script, "print(1)\n").unwrap();

    let zero = xenly(dir.path(), &["--max-depth", "0", script.to_str().unwrap()]);
    assert!(!zero.status.success());

    let one = xenly(dir.path(), &["--max-depth", "1", script.to_str().unwrap()]);
    assert!(one.status.success());
    assert_eq!(stdout(&one), "1\n");
}

#[test]
fn interactive_flag_starts_the_repl() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_xenly"))
        .arg("-i")
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run xenly");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"var x = 20\nprint(x + 22)\nexit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("42"), "{}", text);
    assert!(text.contains("Goodbye!"), "{}", text);
}

#[test]
fn interactive_flag_conflicts_with_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("main.xe");
    fs::write(&script, "print(1)\n").unwrap();

    let output = xenly(dir.path(), &["-i", script.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
}
