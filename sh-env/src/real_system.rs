//! [`System`] implementation that talks to the real kernel.

use crate::system::{Disposition, Result, System};
use nix::errno::Errno;
use nix::fcntl::{self, FcntlArg, OFlag};
use nix::libc::{S_IFMT, S_IFREG};
use nix::sys::signal::{self, SigAction, SigHandler, SigSet, Signal};
use nix::sys::stat::{self, Mode};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::{self, AccessFlags, ForkResult, Pid};
use sh_syntax::Fd;
use std::ffi::{CStr, CString};
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

/// One flag per signal number the shell might catch, set (only) from
/// `catch_signal` and drained (only) from `take_caught_signals`. A plain
/// atomic store/load is the only thing async-signal-safe enough to do from
/// inside a handler; everything else — `TrapSet::notify`, running the
/// trap command — happens later, polled from ordinary code.
const MAX_SIGNAL: usize = 64;
static CAUGHT: [AtomicBool; MAX_SIGNAL] = [const { AtomicBool::new(false) }; MAX_SIGNAL];

fn is_executable(path: &CStr) -> bool {
    unistd::access(path, AccessFlags::X_OK).is_ok()
}

fn is_regular_file(path: &CStr) -> bool {
    stat::stat(path).is_ok_and(|stat| stat.st_mode & S_IFMT == S_IFREG)
}

fn borrow(fd: Fd) -> BorrowedFd<'static> {
    unsafe { BorrowedFd::borrow_raw(fd.0 as RawFd) }
}

/// The real operating system: no state of its own, since the kernel already
/// holds it.
#[derive(Debug, Default)]
pub struct RealSystem;

impl System for RealSystem {
    unsafe fn fork(&mut self) -> Result<ForkResult> {
        unsafe { unistd::fork() }
    }

    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<std::convert::Infallible> {
        loop {
            match unistd::execve(path, args, envs) {
                Err(Errno::EINTR) => continue,
                other => return other,
            }
        }
    }

    fn exit(&mut self, status: i32) -> ! {
        std::process::exit(status)
    }

    fn wait(&mut self, pid: Option<Pid>) -> Result<WaitStatus> {
        let flags = WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED | WaitPidFlag::WNOHANG;
        wait::waitpid(pid, Some(flags))
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let (read, write) = unistd::pipe()?;
        Ok((Fd(read.as_raw_fd()), Fd(write.as_raw_fd())))
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        unistd::close(fd.0)
    }

    fn dup(&mut self, fd: Fd, min_fd: Fd, cloexec: bool) -> Result<Fd> {
        let arg = if cloexec {
            FcntlArg::F_DUPFD_CLOEXEC(min_fd.0)
        } else {
            FcntlArg::F_DUPFD(min_fd.0)
        };
        fcntl::fcntl(borrow(fd), arg).map(Fd)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        unistd::dup2(borrow(from).as_raw_fd(), to.0).map(Fd)
    }

    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd> {
        fcntl::open(path, flags, mode).map(Fd)
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        unistd::read(borrow(fd), buffer)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        unistd::write(borrow(fd), buffer)
    }

    fn isatty(&self, fd: Fd) -> bool {
        unistd::isatty(borrow(fd).as_raw_fd()).unwrap_or(false)
    }

    fn getcwd(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn chdir(&mut self, path: &Path) -> Result<()> {
        unistd::chdir(path)
    }

    fn is_executable_file(&self, path: &CStr) -> bool {
        is_regular_file(path) && is_executable(path)
    }

    fn getpid(&self) -> Pid {
        unistd::getpid()
    }

    fn getppid(&self) -> Pid {
        unistd::getppid()
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()> {
        unistd::setpgid(pid, pgid)
    }

    fn tcgetpgrp(&self, fd: Fd) -> Result<Pid> {
        unistd::tcgetpgrp(borrow(fd))
    }

    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> Result<()> {
        unistd::tcsetpgrp(borrow(fd), pgid)
    }

    fn kill(&mut self, pid: Pid, sig: Option<Signal>) -> Result<()> {
        signal::kill(pid, sig)
    }

    fn sigaction(&mut self, sig: Signal, disposition: Disposition) -> Result<Disposition> {
        let handler = match disposition {
            Disposition::Default => SigHandler::SigDfl,
            Disposition::Ignore => SigHandler::SigIgn,
            Disposition::Catch => SigHandler::Handler(catch_signal),
        };
        let action = SigAction::new(handler, signal::SaFlags::empty(), SigSet::empty());
        let previous = unsafe { signal::sigaction(sig, &action)? };
        Ok(match previous.handler() {
            SigHandler::SigDfl => Disposition::Default,
            SigHandler::SigIgn => Disposition::Ignore,
            _ => Disposition::Catch,
        })
    }

    fn take_caught_signals(&mut self) -> Vec<Signal> {
        let mut caught = Vec::new();
        for (raw, flag) in CAUGHT.iter().enumerate() {
            if flag.swap(false, Ordering::Relaxed) {
                if let Ok(signal) = Signal::try_from(raw as i32) {
                    caught.push(signal);
                }
            }
        }
        caught
    }

    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn shell_path(&self) -> CString {
        std::env::current_exe()
            .ok()
            .and_then(|p| CString::new(p.into_os_string().into_encoded_bytes()).ok())
            .unwrap_or_else(|| CString::new("/bin/sh").unwrap())
    }
}

/// Installed for every condition the `trap` builtin catches. Only records
/// that `signal` arrived; `take_caught_signals` drains the record and
/// `TrapSet::notify`/`take_pending` decide what to do about it, all from
/// ordinary (non-handler) code at the executor's next safe point.
extern "C" fn catch_signal(signal: nix::libc::c_int) {
    if let Ok(raw) = usize::try_from(signal) {
        if let Some(flag) = CAUGHT.get(raw) {
            flag.store(true, Ordering::Relaxed);
        }
    }
}
