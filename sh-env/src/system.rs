//! Abstraction over the parts of the operating system the shell touches.
//!
//! [`System`] is the seam between the executor/builtins and the actual
//! kernel: [`RealSystem`](crate::real_system::RealSystem) implements it with
//! real syscalls, [`VirtualSystem`](crate::virtual_system::VirtualSystem)
//! implements it in memory for tests. Everything above this trait (the
//! expansion pipeline, the executor, every builtin) is written against
//! `&mut dyn System` and never calls `nix`/`libc` directly.

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::Signal;
use nix::sys::stat::Mode;
use nix::sys::wait::WaitStatus;
use nix::unistd::ForkResult;
pub use nix::unistd::Pid;
use sh_syntax::Fd;
use std::ffi::{CStr, CString};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub type Result<T> = std::result::Result<T, Errno>;

/// How a signal is currently handled, mirroring `sigaction(2)`'s
/// `SIG_DFL`/`SIG_IGN`/a real handler, without exposing the handler itself
/// (the shell only ever installs its own catch-all handler).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    Default,
    Ignore,
    Catch,
}

/// System interface used by [`crate::trap::TrapSet`] to actually install
/// signal dispositions.
pub trait SignalSystem {
    fn set_disposition(&mut self, signal: Signal, disposition: Disposition) -> Result<Disposition>;
}

/// API to the system-managed parts of the environment: processes, file
/// descriptors, the file system, signals, and the terminal.
pub trait System: Debug {
    /// # Safety
    /// Forking duplicates the entire process; the caller must ensure the
    /// child does not run non-async-signal-safe code before `execve` or
    /// `exit`.
    unsafe fn fork(&mut self) -> Result<ForkResult>;

    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<std::convert::Infallible>;

    /// Exits the current process without returning, used in a forked child
    /// after the command it was forked for finished.
    fn exit(&mut self, status: i32) -> !;

    fn wait(&mut self, pid: Option<Pid>) -> Result<WaitStatus>;

    fn pipe(&mut self) -> Result<(Fd, Fd)>;
    fn close(&mut self, fd: Fd) -> Result<()>;
    fn dup(&mut self, fd: Fd, min_fd: Fd, cloexec: bool) -> Result<Fd>;
    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd>;
    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd>;
    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize>;
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize>;
    fn isatty(&self, fd: Fd) -> bool;

    fn getcwd(&self) -> std::io::Result<PathBuf>;
    fn chdir(&mut self, path: &Path) -> Result<()>;
    fn is_executable_file(&self, path: &CStr) -> bool;

    fn getpid(&self) -> Pid;
    fn getppid(&self) -> Pid;
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()>;
    fn tcgetpgrp(&self, fd: Fd) -> Result<Pid>;
    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> Result<()>;

    fn kill(&mut self, pid: Pid, signal: Option<Signal>) -> Result<()>;
    fn sigaction(&mut self, signal: Signal, disposition: Disposition) -> Result<Disposition>;

    /// Drains every signal caught since the last call under a
    /// [`Disposition::Catch`] disposition. Safe to call from ordinary code;
    /// the actual signal handler only ever records that a signal arrived.
    fn take_caught_signals(&mut self) -> Vec<Signal>;

    fn now(&self) -> SystemTime;

    /// Absolute path to the shell's own executable, for `$0`/re-`exec`ing
    /// into a login shell.
    fn shell_path(&self) -> CString;
}

impl<T: System + ?Sized> SignalSystem for T {
    fn set_disposition(&mut self, signal: Signal, disposition: Disposition) -> Result<Disposition> {
        System::sigaction(self, signal, disposition)
    }
}
