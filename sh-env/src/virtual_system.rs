//! In-memory [`System`] double used by unit tests.
//!
//! Unlike a full simulated filesystem and process tree,
//! [`RecordingSystem`] only fakes the pieces
//! the expansion pipeline and executor actually branch on (file contents
//! for redirections/command substitution, a fixed pid/cwd, signal
//! dispositions) and records everything else (fork/exec/wait/kill calls)
//! so a test can assert on what the shell attempted without truly forking.

use crate::system::{Disposition, Result, System};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::Signal;
use nix::sys::stat::Mode;
use nix::sys::wait::WaitStatus;
use nix::unistd::{ForkResult, Pid};
use sh_syntax::Fd;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One call the test double observed, for assertions like
/// `assert_matches!(&system.calls[0], Call::Execve { path, .. } if path == "/bin/echo")`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    Fork,
    Execve { path: CString, args: Vec<CString> },
    Wait,
    Kill { pid: Pid, signal: Option<Signal> },
}

/// An in-memory file, keyed by path, for redirections and command
/// substitution in tests that don't want to touch the real filesystem.
#[derive(Clone, Debug, Default)]
pub struct VirtualFile {
    pub content: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct RecordingSystem {
    pub calls: Vec<Call>,
    pub files: HashMap<PathBuf, VirtualFile>,
    pub cwd: PathBuf,
    pub pid: Pid,
    pub dispositions: HashMap<Signal, Disposition>,
    /// Signals a test wants `take_caught_signals` to report, standing in
    /// for what a real `sigaction` handler would have recorded.
    pub pending_signals: Vec<Signal>,
    next_fd: i32,
    open_files: HashMap<i32, PathBuf>,
    clock: SystemTime,
}

impl RecordingSystem {
    #[must_use]
    pub fn new() -> Self {
        RecordingSystem {
            cwd: PathBuf::from("/"),
            pid: Pid::from_raw(1000),
            next_fd: 10,
            clock: SystemTime::UNIX_EPOCH,
            ..Default::default()
        }
    }
}

impl System for RecordingSystem {
    unsafe fn fork(&mut self) -> Result<ForkResult> {
        self.calls.push(Call::Fork);
        Ok(ForkResult::Parent { child: Pid::from_raw(self.pid.as_raw() + 1) })
    }

    fn execve(&mut self, path: &CStr, args: &[CString], _envs: &[CString]) -> Result<std::convert::Infallible> {
        self.calls.push(Call::Execve { path: path.into(), args: args.to_vec() });
        Err(Errno::ENOENT)
    }

    fn exit(&mut self, _status: i32) -> ! {
        panic!("RecordingSystem::exit called in a test; this would terminate the test process for real")
    }

    fn wait(&mut self, _pid: Option<Pid>) -> Result<WaitStatus> {
        self.calls.push(Call::Wait);
        Ok(WaitStatus::StillAlive)
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let read = self.next_fd;
        let write = self.next_fd + 1;
        self.next_fd += 2;
        Ok((Fd(read), Fd(write)))
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        self.open_files.remove(&fd.0);
        Ok(())
    }

    fn dup(&mut self, fd: Fd, min_fd: Fd, _cloexec: bool) -> Result<Fd> {
        let new_fd = self.next_fd.max(min_fd.0);
        self.next_fd = new_fd + 1;
        if let Some(path) = self.open_files.get(&fd.0).cloned() {
            self.open_files.insert(new_fd, path);
        }
        Ok(Fd(new_fd))
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        if let Some(path) = self.open_files.get(&from.0).cloned() {
            self.open_files.insert(to.0, path);
        }
        Ok(to)
    }

    fn open(&mut self, path: &CStr, _flags: OFlag, _mode: Mode) -> Result<Fd> {
        let fd = self.next_fd;
        self.next_fd += 1;
        let path = PathBuf::from(path.to_string_lossy().into_owned());
        self.files.entry(path.clone()).or_default();
        self.open_files.insert(fd, path);
        Ok(Fd(fd))
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        let Some(path) = self.open_files.get(&fd.0) else {
            return Err(Errno::EBADF);
        };
        let file = self.files.get(path).ok_or(Errno::ENOENT)?;
        let n = buffer.len().min(file.content.len());
        buffer[..n].copy_from_slice(&file.content[..n]);
        Ok(n)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        let Some(path) = self.open_files.get(&fd.0).cloned() else {
            return Err(Errno::EBADF);
        };
        let file = self.files.entry(path).or_default();
        file.content.extend_from_slice(buffer);
        Ok(buffer.len())
    }

    fn isatty(&self, _fd: Fd) -> bool {
        false
    }

    fn getcwd(&self) -> io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn chdir(&mut self, path: &Path) -> Result<()> {
        self.cwd = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        Ok(())
    }

    fn is_executable_file(&self, _path: &CStr) -> bool {
        true
    }

    fn getpid(&self) -> Pid {
        self.pid
    }

    fn getppid(&self) -> Pid {
        Pid::from_raw(1)
    }

    fn setpgid(&mut self, _pid: Pid, _pgid: Pid) -> Result<()> {
        Ok(())
    }

    fn tcgetpgrp(&self, _fd: Fd) -> Result<Pid> {
        Ok(self.pid)
    }

    fn tcsetpgrp(&mut self, _fd: Fd, _pgid: Pid) -> Result<()> {
        Ok(())
    }

    fn kill(&mut self, pid: Pid, signal: Option<Signal>) -> Result<()> {
        self.calls.push(Call::Kill { pid, signal });
        Ok(())
    }

    fn sigaction(&mut self, signal: Signal, disposition: Disposition) -> Result<Disposition> {
        Ok(self.dispositions.insert(signal, disposition).unwrap_or(Disposition::Default))
    }

    fn take_caught_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.pending_signals)
    }

    fn now(&self) -> SystemTime {
        self.clock
    }

    fn shell_path(&self) -> CString {
        CString::new("/bin/sh").unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_execve_attempt() {
        let mut system = RecordingSystem::new();
        let path = CString::new("/bin/echo").unwrap();
        let args = vec![CString::new("echo").unwrap()];
        let _ = system.execve(&path, &args, &[]);
        assert_eq!(system.calls.len(), 1);
        assert_eq!(system.calls[0], Call::Execve { path, args });
    }

    #[test]
    fn write_then_read_round_trips_through_a_path() {
        let mut system = RecordingSystem::new();
        let path = CString::new("/tmp/out").unwrap();
        let fd = system.open(&path, OFlag::O_WRONLY, Mode::empty()).unwrap();
        system.write(fd, b"hi").unwrap();
        let read_fd = system.open(&path, OFlag::O_RDONLY, Mode::empty()).unwrap();
        let mut buf = [0u8; 2];
        let n = system.read(read_fd, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hi");
    }

    #[test]
    fn chdir_relative_joins_cwd() {
        let mut system = RecordingSystem::new();
        system.chdir(Path::new("home")).unwrap();
        assert_eq!(system.getcwd().unwrap(), PathBuf::from("/home"));
    }
}
