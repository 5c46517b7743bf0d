//! Background jobs: registering an asynchronously started pipeline, and
//! reaping the ones that have since changed state.

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use sh_env::job::{Job, JobId};
use sh_env::Env;

/// Registers a newly forked background process as a job and as `$!`.
pub fn add_background(env: &mut Env, pid: Pid, name: String) -> JobId {
    env.last_async_pid = Some(pid);
    env.jobs.set_last_async_pid(pid);
    env.jobs.add(Job::new(pid, name))
}

/// Reaps every job whose process has changed state without blocking,
/// updating its recorded status. Meant to be called at the safe points
/// between top-level commands, the way a real shell reports job changes
/// right before it prints its next prompt.
pub fn reap_finished(env: &mut Env) {
    loop {
        let status = match env.system.wait(None) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(status) => status,
        };
        let Some(pid) = status_pid(status) else { break };
        if let Some(id) = env.jobs.find_by_pid(pid) {
            if let Some(job) = env.jobs.get_mut(id) {
                job.status = status;
            }
        }
    }
}

fn status_pid(status: WaitStatus) -> Option<Pid> {
    match status {
        WaitStatus::Exited(pid, _)
        | WaitStatus::Signaled(pid, _, _)
        | WaitStatus::Stopped(pid, _)
        | WaitStatus::Continued(pid)
        | WaitStatus::PtraceEvent(pid, _, _)
        | WaitStatus::PtraceSyscall(pid) => Some(pid),
        WaitStatus::StillAlive => None,
    }
}

/// Blocks until `pid` exits, returning its exit status (or 128+signal if it
/// was killed by one), the way a foreground pipeline or the `wait` builtin
/// needs to.
pub fn wait_for(env: &mut Env, pid: Pid) -> i32 {
    loop {
        match env.system.wait(Some(pid)) {
            Ok(WaitStatus::Exited(p, status)) if p == pid => return status,
            Ok(WaitStatus::Signaled(p, signal, _)) if p == pid => return 128 + signal as i32,
            Ok(_) => std::thread::sleep(std::time::Duration::from_millis(1)),
            Err(_) => return 127,
        }
    }
}
