//! Type definitions for job management.

#[doc(no_inline)]
pub use nix::sys::wait::WaitStatus;
#[doc(no_inline)]
pub use nix::unistd::Pid;

/// One process (or process group) started to run a pipeline.
///
/// The shell tracks one process per job; if the pipeline had more than one
/// command, only the last one's exit status is observed directly, but all
/// of the pipeline's process IDs share the job's process group when job
/// control is active.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    /// Process ID of the job's process group leader.
    pub pid: Pid,
    /// Whether the job runs in its own process group.
    pub job_controlled: bool,
    /// Most recently observed wait status.
    pub status: WaitStatus,
    /// Text shown by the `jobs` builtin, e.g. `"sleep 10 | cat"`.
    pub name: String,
}

impl Job {
    #[must_use]
    pub fn new(pid: Pid, name: String) -> Self {
        Job {
            pid,
            job_controlled: false,
            status: WaitStatus::StillAlive,
            name,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.status, WaitStatus::StillAlive | WaitStatus::Stopped(..))
    }
}

/// 1-based index into a [`JobSet`], as printed by `jobs`/`%1` notation.
pub type JobId = usize;

/// The shell's table of background and suspended jobs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JobSet {
    jobs: Vec<Option<Job>>,
    current: Option<JobId>,
    previous: Option<JobId>,
    last_async_pid: Option<Pid>,
}

impl JobSet {
    /// Adds a job, returning its 1-based job ID.
    pub fn add(&mut self, job: Job) -> JobId {
        self.jobs.push(Some(job));
        let id = self.jobs.len();
        self.previous = self.current;
        self.current = Some(id);
        id
    }

    #[must_use]
    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(id.checked_sub(1)?)?.as_ref()
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.get_mut(id.checked_sub(1)?)?.as_mut()
    }

    /// Removes a job once it has been reported and reaped ("disowned").
    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        let slot = self.jobs.get_mut(id.checked_sub(1)?)?;
        slot.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobId, &Job)> {
        self.jobs
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.as_ref().map(|j| (i + 1, j)))
    }

    pub fn find_by_pid(&self, pid: Pid) -> Option<JobId> {
        self.iter().find(|(_, j)| j.pid == pid).map(|(id, _)| id)
    }

    #[must_use]
    pub fn current_job(&self) -> Option<JobId> {
        self.current
    }

    #[must_use]
    pub fn previous_job(&self) -> Option<JobId> {
        self.previous
    }

    /// The process ID to substitute for `$!`.
    #[must_use]
    pub fn last_async_pid(&self) -> Pid {
        self.last_async_pid.unwrap_or_else(|| Pid::from_raw(0))
    }

    pub fn set_last_async_pid(&mut self, pid: Pid) {
        self.last_async_pid = Some(pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_sequential_ids() {
        let mut jobs = JobSet::default();
        let a = jobs.add(Job::new(Pid::from_raw(100), "a".into()));
        let b = jobs.add(Job::new(Pid::from_raw(200), "b".into()));
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(jobs.get(a).unwrap().pid, Pid::from_raw(100));
    }

    #[test]
    fn remove_leaves_a_hole() {
        let mut jobs = JobSet::default();
        let a = jobs.add(Job::new(Pid::from_raw(1), "a".into()));
        jobs.remove(a);
        assert!(jobs.get(a).is_none());
        assert_eq!(jobs.iter().count(), 0);
    }

    #[test]
    fn find_by_pid() {
        let mut jobs = JobSet::default();
        let pid = Pid::from_raw(42);
        let id = jobs.add(Job::new(pid, "sleep".into()));
        assert_eq!(jobs.find_by_pid(pid), Some(id));
    }
}
