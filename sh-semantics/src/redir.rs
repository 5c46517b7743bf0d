//! Applying redirections (`>file`, `2>&1`, `<<EOF`, ...) around a command.
//!
//! Every [`Redir`] ultimately becomes an `open` plus `dup2` onto the target
//! descriptor (or a bare `dup2` for `N>&M`). For a builtin or function run
//! in-process, the descriptor being replaced is first saved with `dup` onto
//! a slot at or above [`MIN_INTERNAL_FD`] and restored once the command
//! finishes; an external command just inherits the redirected table
//! straight into `execve` and is never restored, since the process exits
//! on its own.

use crate::error::Error;
use crate::expansion;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use sh_env::io::MIN_INTERNAL_FD;
use sh_env::Env;
use sh_syntax::{Fd, HereDoc, Redir, RedirBody, RedirOp, Word};
use std::ffi::CString;

/// What to undo once a redirected command has finished: put `saved` back
/// onto `fd`, or close `fd` if nothing occupied it beforehand.
pub struct Saved {
    fd: Fd,
    saved: Option<Fd>,
}

/// Applies every redirection in `redirs` in order. On error, whatever this
/// call already applied is unwound before the error is returned.
pub fn apply(env: &mut Env, redirs: &[Redir]) -> Result<Vec<Saved>, Error> {
    let mut saves = Vec::new();
    for redir in redirs {
        match apply_one(env, redir) {
            Ok(save) => saves.push(save),
            Err(e) => {
                restore(env, saves);
                return Err(e);
            }
        }
    }
    Ok(saves)
}

/// Restores every descriptor `apply` moved aside, in reverse order.
pub fn restore(env: &mut Env, saves: Vec<Saved>) {
    for save in saves.into_iter().rev() {
        match save.saved {
            Some(saved_fd) => {
                let _ = env.system.dup2(saved_fd, save.fd);
                let _ = env.system.close(saved_fd);
            }
            None => {
                let _ = env.system.close(save.fd);
            }
        }
    }
}

fn apply_one(env: &mut Env, redir: &Redir) -> Result<Saved, Error> {
    let target_fd = redir.fd_or_default();
    let saved = env.system.dup(target_fd, MIN_INTERNAL_FD, true).ok();
    match &redir.body {
        RedirBody::Normal { operator, operand } => apply_normal(env, target_fd, *operator, operand)?,
        RedirBody::HereDoc(here_doc) => apply_here_doc(env, target_fd, here_doc)?,
    }
    Ok(Saved { fd: target_fd, saved })
}

fn apply_normal(env: &mut Env, target_fd: Fd, operator: RedirOp, operand: &Word) -> Result<(), Error> {
    if matches!(operator, RedirOp::FdIn | RedirOp::FdOut) {
        let text = expansion::expand_scalar(env, operand)?;
        if text == "-" {
            let _ = env.system.close(target_fd);
            return Ok(());
        }
        let source: i32 = text
            .parse()
            .map_err(|_| Error::redirection(format!("{text}: not a file descriptor"), Some(operand.location)))?;
        env.system
            .dup2(Fd(source), target_fd)
            .map_err(|e| Error::redirection(format!("{text}: {e}"), Some(operand.location)))?;
        return Ok(());
    }

    let path = expansion::expand_scalar(env, operand)?;
    let cpath = CString::new(path.clone())
        .map_err(|_| Error::redirection(format!("{path}: invalid path"), Some(operand.location)))?;
    let (flags, mode) = match operator {
        RedirOp::FileIn => (OFlag::O_RDONLY, Mode::empty()),
        RedirOp::FileOut | RedirOp::FileOutErr | RedirOp::FileClobber => {
            (OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, Mode::from_bits_truncate(0o666))
        }
        RedirOp::FileAppend => (OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND, Mode::from_bits_truncate(0o666)),
        RedirOp::FdIn | RedirOp::FdOut => unreachable!(),
    };
    let opened = env
        .system
        .open(&cpath, flags, mode)
        .map_err(|e| Error::redirection(format!("{path}: {e}"), Some(operand.location)))?;
    env.system
        .dup2(opened, target_fd)
        .map_err(|e| Error::redirection(format!("{path}: {e}"), Some(operand.location)))?;
    let _ = env.system.close(opened);
    if operator == RedirOp::FileOutErr {
        let _ = env.system.dup2(target_fd, Fd::STDERR);
    }
    Ok(())
}

/// Streams a here-document's body through a fresh pipe onto `target_fd`.
/// Like a real shell, a body larger than the pipe's buffer can stall the
/// write; handing the write off to a forked writer (the conventional fix)
/// was judged out of scope here.
fn apply_here_doc(env: &mut Env, target_fd: Fd, here_doc: &HereDoc) -> Result<(), Error> {
    let content = here_doc
        .content
        .get()
        .expect("here-document body is filled in by the parser before execution reaches it");
    let text = expansion::expand_text(env, content)?;

    let (read_fd, write_fd) =
        env.system.pipe().map_err(|e| Error::redirection(format!("here-document: {e}"), None))?;
    let mut remaining = text.as_bytes();
    while !remaining.is_empty() {
        match env.system.write(write_fd, remaining) {
            Ok(0) | Err(_) => break,
            Ok(n) => remaining = &remaining[n..],
        }
    }
    let _ = env.system.close(write_fd);
    env.system
        .dup2(read_fd, target_fd)
        .map_err(|e| Error::redirection(format!("here-document: {e}"), None))?;
    let _ = env.system.close(read_fd);
    Ok(())
}
