//! `bg`, `fg`, `jobs`, and `wait`: inspecting and resuming the job table.
//!
//! Resuming a stopped job here only sends it `SIGCONT`; it does not hand it
//! the controlling terminal the way a job-control-complete `fg` would, since
//! this environment has no terminal process-group plumbing wired up to
//! `bg`/`fg` yet. `wait`'s blocking-for-completion behavior is unaffected.

use crate::common;
use nix::sys::signal::Signal;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::job::{JobId, WaitStatus};
use sh_env::Env;
use sh_semantics::job as job_exec;

/// Resolves a `%N`/bare-`N`/`%%`/`%+`/`%-` job spec to a job ID, or the
/// current job if no operand was given at all.
fn resolve_job(env: &Env, spec: Option<&str>) -> Option<JobId> {
    match spec {
        None | Some("%%") | Some("%+") => env.jobs.current_job(),
        Some("%-") => env.jobs.previous_job(),
        Some(spec) => spec.trim_start_matches('%').parse::<JobId>().ok(),
    }
}

fn status_text(status: WaitStatus) -> &'static str {
    match status {
        WaitStatus::Exited(_, 0) => "Done",
        WaitStatus::Exited(..) => "Done(exit)",
        WaitStatus::Signaled(..) => "Terminated",
        WaitStatus::Stopped(..) => "Stopped",
        _ => "Running",
    }
}

/// `jobs`: lists every tracked background or stopped job.
pub fn jobs(env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    job_exec::reap_finished(env);
    for (id, job) in env.jobs.iter() {
        println!("[{id}]  {}  {}", status_text(job.status), job.name);
    }
    common::ok()
}

/// `bg [%job]`: resumes a stopped job in the background by sending it
/// `SIGCONT`.
pub fn bg(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let Some(id) = resolve_job(env, rest.first().map(|f| f.value.as_str())) else {
        return common::error(name, "no such job", 1);
    };
    let Some(job) = env.jobs.get(id) else {
        return common::error(name, "no such job", 1);
    };
    let pid = job.pid;
    if let Err(e) = env.system.kill(pid, Some(Signal::SIGCONT)) {
        return common::error(name, e, 1);
    }
    if let Some(job) = env.jobs.get_mut(id) {
        job.status = WaitStatus::StillAlive;
    }
    println!("[{id}] {pid}");
    common::ok()
}

/// `fg [%job]`: resumes a stopped job and waits for it to finish or stop
/// again.
pub fn fg(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let Some(id) = resolve_job(env, rest.first().map(|f| f.value.as_str())) else {
        return common::error(name, "no such job", 1);
    };
    let Some(job) = env.jobs.get(id) else {
        return common::error(name, "no such job", 1);
    };
    let pid = job.pid;
    println!("{}", job.name);
    if env.system.kill(pid, Some(Signal::SIGCONT)).is_err() {
        // Job may already be running; continuing is best-effort.
    }
    let status = job_exec::wait_for(env, pid);
    env.jobs.remove(id);
    BuiltinResult::new(status)
}

/// `wait [pid_or_job...]`: blocks until the named jobs (or, with no
/// operand, every known background job) finish, returning the last one's
/// exit status.
pub fn wait(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    if rest.is_empty() {
        let ids: Vec<JobId> = env.jobs.iter().map(|(id, _)| id).collect();
        let mut status = 0;
        for id in ids {
            if let Some(job) = env.jobs.get(id) {
                let pid = job.pid;
                status = job_exec::wait_for(env, pid);
                env.jobs.remove(id);
            }
        }
        return BuiltinResult::new(status);
    }

    let mut status = 0;
    for field in rest {
        let pid = if let Some(id) = resolve_job(env, Some(field.value.as_str())) {
            env.jobs.get(id).map(|j| j.pid)
        } else {
            field.value.parse::<i32>().ok().map(nix::unistd::Pid::from_raw)
        };
        let Some(pid) = pid else {
            return common::error(name, format_args!("{}: no such job", field.value), 1);
        };
        status = job_exec::wait_for(env, pid);
        if let Some(id) = env.jobs.find_by_pid(pid) {
            env.jobs.remove(id);
        }
    }
    BuiltinResult::new(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};
    use sh_env::job::Job;

    fn add_job(e: &mut Env, pid: i32, name: &str) -> JobId {
        e.jobs.add(Job::new(nix::unistd::Pid::from_raw(pid), name.to_owned()))
    }

    #[test]
    fn resolve_job_with_no_spec_is_the_current_job() {
        let mut e = env();
        let id = add_job(&mut e, 123, "sleep 10");
        assert_eq!(resolve_job(&e, None), Some(id));
    }

    #[test]
    fn resolve_job_accepts_percent_n_notation() {
        let mut e = env();
        let id = add_job(&mut e, 123, "sleep 10");
        assert_eq!(resolve_job(&e, Some(&format!("%{id}"))), Some(id));
    }

    #[test]
    fn jobs_lists_every_tracked_job() {
        let mut e = env();
        add_job(&mut e, 1, "sleep 10");
        add_job(&mut e, 2, "cat");
        let result = jobs(&mut e, fields(&["jobs"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn bg_sends_sigcont_and_marks_the_job_running() {
        let mut e = env();
        let id = add_job(&mut e, 55, "sleep 10");
        if let Some(job) = e.jobs.get_mut(id) {
            job.status = WaitStatus::Stopped(nix::unistd::Pid::from_raw(55), nix::sys::signal::Signal::SIGTSTP);
        }
        let spec = format!("%{id}");
        let result = bg(&mut e, fields(&["bg", spec.as_str()]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(e.jobs.get(id).unwrap().status, WaitStatus::StillAlive);
    }

    #[test]
    fn bg_with_no_such_job_is_an_error() {
        let mut e = env();
        let result = bg(&mut e, fields(&["bg", "%9"]));
        assert_eq!(result.exit_status, 1);
    }

    #[test]
    fn wait_on_an_unknown_job_spec_is_an_error() {
        let mut e = env();
        let result = wait(&mut e, fields(&["wait", "%9"]));
        assert_eq!(result.exit_status, 1);
    }
}
