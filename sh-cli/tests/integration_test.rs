//! End-to-end tests driving the real `sh3` binary: each one feeds a script
//! on stdin and checks stdout/exit status, the way a user invoking the
//! shell non-interactively would see it.

use std::io::Write as _;
use std::process::{Command, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_sh3");

fn subject() -> Command {
    let mut command = Command::new(BIN);
    command.env_clear();
    if let Some(path) = std::env::var_os("PATH") {
        command.env("PATH", path);
    }
    command
}

fn run(script: &str) -> std::process::Output {
    let mut child = subject().stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped()).spawn().unwrap();
    child.stdin.take().unwrap().write_all(script.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &std::process::Output) -> &str {
    std::str::from_utf8(&output.stdout).unwrap()
}

#[test]
fn arithmetic_expansion_in_a_sum() {
    let output = run("x=1; y=2; echo $((x+y))\n");
    assert_eq!(stdout(&output), "3\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn for_loop_over_a_word_list() {
    let output = run("for f in a b c; do echo $f; done\n");
    assert_eq!(stdout(&output), "a\nb\nc\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn local_shadows_a_global_only_inside_the_function() {
    let output = run("f() { local n=$1; echo \"n=$n\"; }; n=outer; f inner; echo $n\n");
    assert_eq!(stdout(&output), "n=inner\nouter\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn colon_dash_default_does_not_assign() {
    let output = run("echo ${UNSET:-fallback}; echo ${UNSET:-still}\n");
    assert_eq!(stdout(&output), "fallback\nstill\n");
}

#[test]
fn bare_equals_default_assigns_the_variable() {
    let output = run("echo ${UNSET=set}; echo $UNSET\n");
    assert_eq!(stdout(&output), "set\nset\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn and_or_list_picks_the_matching_branch() {
    let output = run("true && echo ok || echo no\n");
    assert_eq!(stdout(&output), "ok\n");

    let output = run("false && echo ok || echo no\n");
    assert_eq!(stdout(&output), "no\n");
}

#[test]
fn exit_code_mapping_is_visible_through_dollar_question() {
    let output = run("(exit 47); echo $?\n");
    assert_eq!(stdout(&output), "47\n");
}

#[test]
fn background_job_is_tracked_and_waited_for() {
    let output = run("sleep 0.1 & jobs\nwait\necho done\n");
    let text = stdout(&output);
    assert!(text.contains("sleep 0.1"), "{text:?}");
    assert!(text.trim_end().ends_with("done"), "{text:?}");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn dash_c_runs_a_command_string() {
    let output = subject().arg("-c").arg("echo from -c").output().unwrap();
    assert_eq!(stdout(&output), "from -c\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn positional_parameters_after_the_script_name() {
    let output = subject().arg("-c").arg("echo $1 $2").arg("myname").arg("a").arg("b").output().unwrap();
    assert_eq!(stdout(&output), "a b\n");
}

#[test]
fn a_syntax_error_exits_with_status_two() {
    let output = run("if true\n");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn nounset_reports_an_unset_variable() {
    let output = run("set -u\necho $UNSET_VAR\n");
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn unknown_command_exits_127() {
    let output = run("this-command-does-not-exist-anywhere\n");
    assert_eq!(output.status.code(), Some(127));
}
