//! The executor: walks a parsed [`List`] and runs it against an [`Env`].
//!
//! Every function here returns either a [`Divert`] (for list-shaped nodes,
//! which only ever have a status by way of `$?`) or a `(i32, Divert)` pair
//! (for anything that is itself one command and so has its own exit
//! status independent of `$?` at the moment it returns). Control flow that
//! needs to unwind several levels (`break N`, `continue N`, `return`,
//! `exit`) rides back up as the `Divert` half of that pair rather than a
//! Rust-level exception.

use crate::error::Error;
use crate::{command_search, expansion, job, redir, xtrace};
use crate::{Divert, DivertExt, Handle};
use nix::unistd::ForkResult;
use sh_env::builtin;
use sh_env::variable::{Scope, Value as VarValue};
use sh_env::Env;
use sh_syntax::{
    AndOr, AndOrList, Assign, Command, CompoundCommand, Fd, FullCompoundCommand, FunctionParam, Item, List, Location,
    Pipeline, Redir as Redirection,
};
use std::ffi::CString;
use std::rc::Rc;

/// Safety bound on `for`/`while`/`until` iterations, so a runaway loop in a
/// script being evaluated ends the shell with a diagnosable error instead
/// of spinning forever.
const MAX_LOOP_ITERATIONS: u32 = 10_000;

/// Runs every item of `list` in turn, stopping early on the first
/// non-`Continue` diversion. `$?`/`set -e` behave as they would at the top
/// level or inside a command group.
pub fn execute_list(env: &mut Env, list: &List) -> Result<Divert, Error> {
    execute_list_inner(env, list, true)
}

/// Like [`execute_list`], but for a condition of `if`/`while`/`until`: a
/// non-zero status here is the condition answer, not a command failure, so
/// `errexit` never fires on it.
fn execute_list_as_condition(env: &mut Env, list: &List) -> Result<Divert, Error> {
    execute_list_inner(env, list, false)
}

fn execute_list_inner(env: &mut Env, list: &List, check_errexit: bool) -> Result<Divert, Error> {
    for item in &list.0 {
        crate::trap::run_traps_for_caught_signals(env);
        let divert = execute_item(env, item, check_errexit)?;
        if !matches!(divert, Divert::Continue) {
            return Ok(divert);
        }
    }
    Ok(Divert::Continue)
}

fn execute_item(env: &mut Env, item: &Item, check_errexit: bool) -> Result<Divert, Error> {
    if item.is_async {
        run_async(env, &item.and_or)?;
        env.exit_status = 0;
        Ok(Divert::Continue)
    } else {
        execute_and_or_list(env, &item.and_or, check_errexit)
    }
}

fn run_async(env: &mut Env, and_or: &Rc<AndOrList>) -> Result<(), Error> {
    match unsafe { env.system.fork() } {
        Ok(ForkResult::Child) => {
            let status = match execute_and_or_list(env, and_or, true) {
                Ok(divert) => divert.unwrap_or(env.exit_status),
                Err(error) => {
                    let divert = error.handle(env, false);
                    divert.unwrap_or(env.exit_status)
                }
            };
            env.system.exit(status)
        }
        Ok(ForkResult::Parent { child }) => {
            job::add_background(env, child, "job".to_owned());
            Ok(())
        }
        Err(e) => Err(Error::runtime(format!("fork: {e}"), None)),
    }
}

fn execute_and_or_list(env: &mut Env, and_or: &AndOrList, check_errexit: bool) -> Result<Divert, Error> {
    let mut divert = execute_pipeline(env, &and_or.first)?;
    for (op, pipeline) in &and_or.rest {
        if !matches!(divert, Divert::Continue) {
            break;
        }
        let status_ok = env.exit_status == 0;
        let should_run = match op {
            AndOr::AndThen => status_ok,
            AndOr::OrElse => !status_ok,
        };
        if !should_run {
            continue;
        }
        divert = execute_pipeline(env, pipeline)?;
    }
    if check_errexit
        && matches!(divert, Divert::Continue)
        && env.options.is_on(sh_env::option::ErrExit)
        && env.exit_status != 0
    {
        return Ok(Divert::Exit(env.exit_status));
    }
    Ok(divert)
}

fn execute_pipeline(env: &mut Env, pipeline: &Pipeline) -> Result<Divert, Error> {
    let (status, divert) = if pipeline.commands.len() == 1 {
        execute_command(env, &pipeline.commands[0])?
    } else {
        run_piped(env, &pipeline.commands)?
    };
    env.exit_status = if pipeline.negation { i32::from(status == 0) } else { status };
    Ok(divert)
}

/// Forks every stage of a multi-command pipeline, even the last: running
/// the last stage in-process (so a lone `return`/`exit` inside it could
/// propagate to the caller) was judged not worth the added bookkeeping, so
/// a `Divert` can only ever escape a pipeline of exactly one command.
fn run_piped(env: &mut Env, commands: &[Rc<Command>]) -> Result<(i32, Divert), Error> {
    let mut previous_read: Option<Fd> = None;
    let mut pids = Vec::new();

    for (i, command) in commands.iter().enumerate() {
        let is_last = i == commands.len() - 1;
        let next_pipe = if is_last {
            None
        } else {
            Some(env.system.pipe().map_err(|e| Error::runtime(format!("pipe: {e}"), None))?)
        };

        match unsafe { env.system.fork() } {
            Ok(ForkResult::Child) => {
                if let Some(read_fd) = previous_read {
                    let _ = env.system.dup2(read_fd, Fd::STDIN);
                    let _ = env.system.close(read_fd);
                }
                if let Some((read_fd, write_fd)) = next_pipe {
                    let _ = env.system.dup2(write_fd, Fd::STDOUT);
                    let _ = env.system.close(read_fd);
                    let _ = env.system.close(write_fd);
                }
                let (status, divert) = match execute_command(env, command) {
                    Ok(result) => result,
                    Err(error) => {
                        let status = error.exit_status();
                        error.handle(env, false);
                        (status, Divert::Continue)
                    }
                };
                let final_status = divert.unwrap_or(status);
                env.system.exit(final_status)
            }
            Ok(ForkResult::Parent { child }) => {
                pids.push(child);
                if let Some(read_fd) = previous_read {
                    let _ = env.system.close(read_fd);
                }
                if let Some((read_fd, write_fd)) = next_pipe {
                    let _ = env.system.close(write_fd);
                    previous_read = Some(read_fd);
                }
            }
            Err(e) => return Err(Error::runtime(format!("fork: {e}"), None)),
        }
    }

    let mut last_status = 0;
    let last_index = pids.len().saturating_sub(1);
    for (i, pid) in pids.iter().enumerate() {
        let status = job::wait_for(env, *pid);
        if i == last_index {
            last_status = status;
        }
    }
    Ok((last_status, Divert::Continue))
}

fn execute_command(env: &mut Env, command: &Command) -> Result<(i32, Divert), Error> {
    if env.options.is_on(sh_env::option::NoExec) {
        return Ok((0, Divert::Continue));
    }
    match command {
        Command::Simple(simple) => execute_simple(env, simple),
        Command::Compound(full) => execute_full_compound(env, full),
        Command::Function(definition) => {
            let function = sh_env::function::Function::new(Rc::new(definition.clone()), Location::START);
            env.functions.define(function).map_err(|e| Error::runtime(e.to_string(), None))?;
            Ok((0, Divert::Continue))
        }
    }
}

fn execute_simple(env: &mut Env, simple: &sh_syntax::SimpleCommand) -> Result<(i32, Divert), Error> {
    if simple.is_empty() {
        return Ok((0, Divert::Continue));
    }
    if simple.is_pure_assignment() {
        apply_assignments(env, &simple.assigns, Scope::Global)?;
        let saves = redir::apply(env, &simple.redirs)?;
        redir::restore(env, saves);
        env.exit_status = 0;
        return Ok((0, Divert::Continue));
    }

    env.variables.push_context();
    let result = execute_simple_with_word(env, simple);
    env.variables.pop_context();
    result
}

/// Assignments preceding a command word (`FOO=bar cmd`) only last for that
/// one invocation; this runs inside a context pushed and popped by the
/// caller so they behave like `local` variables scoped to this call.
fn execute_simple_with_word(env: &mut Env, simple: &sh_syntax::SimpleCommand) -> Result<(i32, Divert), Error> {
    apply_assignments(env, &simple.assigns, Scope::Local)?;
    let mut fields = expansion::expand_words(env, &simple.words)?;
    if fields.is_empty() {
        env.exit_status = 0;
        return Ok((0, Divert::Continue));
    }
    xtrace::trace(env, &fields);

    match command_search::resolve(env, &mut fields) {
        command_search::Found::Function => execute_function_call(env, &fields, &simple.redirs),
        command_search::Found::Builtin(kind) => execute_builtin(env, kind, &fields, &simple.redirs),
        command_search::Found::External(path) => execute_external(env, &path, &fields, &simple.redirs),
        command_search::Found::NotFound => handle_not_found(env, fields, &simple.redirs),
    }
}

/// What happens when command search finds nothing for `argv[0]`: `cd` into
/// it if `autocd` is on and it names a directory, else retry once with the
/// corrector's suggestion if `correct` is on, else report "not found".
fn handle_not_found(env: &mut Env, fields: Vec<builtin::Field>, redirs: &[Redirection]) -> Result<(i32, Divert), Error> {
    let name = fields[0].value.clone();

    if env.options.is_on(sh_env::option::AutoCd) {
        if let Some(status) = try_auto_cd(env, &name) {
            return Ok((status, Divert::Continue));
        }
    }

    if env.options.is_on(sh_env::option::CorrectSpelling) {
        if let Some(suggestion) = env.corrector.suggest(&name) {
            let mut corrected = fields;
            corrected[0] = builtin::Field::new(suggestion, corrected[0].origin);
            return match command_search::resolve(env, &mut corrected) {
                command_search::Found::Function => execute_function_call(env, &corrected, redirs),
                command_search::Found::Builtin(kind) => execute_builtin(env, kind, &corrected, redirs),
                command_search::Found::External(path) => execute_external(env, &path, &corrected, redirs),
                command_search::Found::NotFound => {
                    Err(Error::exec_not_found(format!("{name}: command not found"), Some(corrected[0].origin)))
                }
            };
        }
    }

    Err(Error::exec_not_found(format!("{name}: command not found"), Some(fields[0].origin)))
}

/// `cd`s into `name` if it names a directory, mirroring the `cd` built-in's
/// `PWD`/`OLDPWD` bookkeeping. Returns `None` (so the caller falls through
/// to spell-correction/"not found") if `name` isn't a directory shell can
/// `chdir` into.
fn try_auto_cd(env: &mut Env, name: &str) -> Option<i32> {
    let old_cwd = env.system.getcwd().ok();
    env.system.chdir(std::path::Path::new(name)).ok()?;
    let new_cwd = env.system.getcwd().ok()?;
    if let Some(old) = old_cwd {
        if let Ok(var) = env.variables.get_or_new("OLDPWD", Scope::Global) {
            var.value = Some(VarValue::scalar(old.display().to_string()));
        }
    }
    if let Ok(var) = env.variables.get_or_new("PWD", Scope::Global) {
        var.value = Some(VarValue::scalar(new_cwd.display().to_string()));
    }
    Some(0)
}

fn apply_assignments(env: &mut Env, assigns: &[Assign], scope: Scope) -> Result<(), Error> {
    for assign in assigns {
        let value = expansion::expand_value(env, &assign.value)?;
        let var = env
            .variables
            .get_or_new(&assign.name, scope)
            .map_err(|e| Error::runtime(e.to_string(), Some(assign.location)))?;
        var.value = Some(value);
        var.last_assigned_location = Some(assign.location);
    }
    Ok(())
}

/// A redirection error on a special builtin (`export > /no/such/dir`, say)
/// ends the whole shell per POSIX, not just this command, the same as a
/// syntax error in one would; everything else just reports the failure and
/// carries on.
fn execute_builtin(
    env: &mut Env,
    kind: builtin::Type,
    fields: &[builtin::Field],
    redirs: &[Redirection],
) -> Result<(i32, Divert), Error> {
    let in_special = kind == builtin::Type::Special;
    let saves = match redir::apply(env, redirs) {
        Ok(saves) => saves,
        Err(error) => {
            let status = error.exit_status();
            let divert = error.handle(env, in_special);
            return Ok((status, divert));
        }
    };
    let name = fields[0].value.as_str();
    let result = match env.builtins.get(name).copied() {
        Some(found) => (found.execute)(env, fields.to_vec()),
        None => builtin::BuiltinResult::new(127),
    };
    redir::restore(env, saves);
    env.exit_status = result.exit_status;
    Ok((result.exit_status, result.divert))
}

fn execute_external(
    env: &mut Env,
    path: &std::path::Path,
    fields: &[builtin::Field],
    redirs: &[Redirection],
) -> Result<(i32, Divert), Error> {
    match unsafe { env.system.fork() } {
        Ok(ForkResult::Child) => {
            let _ = redir::apply(env, redirs);
            let cpath = CString::new(path.as_os_str().as_encoded_bytes()).unwrap_or_default();
            let args: Vec<CString> = fields.iter().map(|f| CString::new(f.value.as_bytes()).unwrap_or_default()).collect();
            let envp: Vec<CString> = env
                .variables
                .environ()
                .into_iter()
                .map(|(k, v)| CString::new(format!("{k}={v}")).unwrap_or_default())
                .collect();
            let _ = env.system.execve(&cpath, &args, &envp);
            eprintln!("sh: {}: cannot execute", fields[0].value);
            env.system.exit(126)
        }
        Ok(ForkResult::Parent { child }) => {
            let status = job::wait_for(env, child);
            Ok((status, Divert::Continue))
        }
        Err(e) => Err(Error::runtime(format!("fork: {e}"), Some(fields[0].origin))),
    }
}

fn execute_function_call(env: &mut Env, fields: &[builtin::Field], redirs: &[Redirection]) -> Result<(i32, Divert), Error> {
    let name = fields[0].value.clone();
    let Some(function) = env.functions.get(&name) else {
        return Err(Error::exec_not_found(format!("{name}: function not found"), Some(fields[0].origin)));
    };

    let saves = redir::apply(env, redirs)?;
    let args: Vec<String> = fields[1..].iter().map(|f| f.value.clone()).collect();
    let previous_params = env.push_positional_params(args.clone());
    env.variables.push_context();

    let bind_result = bind_function_params(env, &function.definition.params, &args, fields[0].origin);
    let body_result = bind_result.and_then(|()| execute_full_compound(env, &function.definition.body));

    env.variables.pop_context();
    env.push_positional_params(previous_params);
    redir::restore(env, saves);

    let (status, divert) = match body_result {
        Ok(result) => result,
        Err(error) => {
            let status = error.exit_status();
            let divert = error.handle(env, false);
            (status, divert)
        }
    };
    let divert = match divert {
        Divert::Return => Divert::Continue,
        other => other,
    };
    env.exit_status = status;
    Ok((status, divert))
}

/// Binds an extended function's named parameters as local variables
/// alongside the ordinary positional parameters, filling in defaults for
/// arguments the caller omitted.
fn bind_function_params(env: &mut Env, params: &[FunctionParam], args: &[String], location: Location) -> Result<(), Error> {
    for (i, param) in params.iter().enumerate() {
        let value = match args.get(i) {
            Some(v) => v.clone(),
            None => match &param.default {
                Some(default_word) => expansion::expand_scalar(env, default_word)?,
                None => {
                    return Err(Error::runtime(format!("{}: missing required argument", param.name), Some(location)));
                }
            },
        };
        let var = env
            .variables
            .get_or_new(&param.name, Scope::Local)
            .map_err(|e| Error::runtime(e.to_string(), Some(location)))?;
        var.value = Some(VarValue::scalar(value));
    }
    Ok(())
}

fn execute_full_compound(env: &mut Env, full: &FullCompoundCommand) -> Result<(i32, Divert), Error> {
    let saves = redir::apply(env, &full.redirs)?;
    let result = execute_compound_command(env, &full.command);
    redir::restore(env, saves);
    result
}

fn execute_compound_command(env: &mut Env, command: &CompoundCommand) -> Result<(i32, Divert), Error> {
    match command {
        CompoundCommand::Grouping(list) => {
            let divert = execute_list(env, list)?;
            Ok((env.exit_status, divert))
        }
        CompoundCommand::Subshell(list) => execute_subshell(env, list),
        CompoundCommand::For { name, values, body } => execute_for(env, name, values.as_deref(), body),
        CompoundCommand::While { condition, body } => run_conditional_loop(env, condition, body, true),
        CompoundCommand::Until { condition, body } => run_conditional_loop(env, condition, body, false),
        CompoundCommand::If { condition, body, elifs, r#else } => execute_if(env, condition, body, elifs, r#else.as_ref()),
        CompoundCommand::Case { subject, items } => execute_case(env, subject, items),
    }
}

fn execute_subshell(env: &mut Env, list: &List) -> Result<(i32, Divert), Error> {
    match unsafe { env.system.fork() } {
        Ok(ForkResult::Child) => {
            let status = match execute_list(env, list) {
                Ok(divert) => divert.unwrap_or(env.exit_status),
                Err(error) => {
                    let divert = error.handle(env, false);
                    divert.unwrap_or(env.exit_status)
                }
            };
            env.system.exit(status)
        }
        Ok(ForkResult::Parent { child }) => {
            let status = job::wait_for(env, child);
            Ok((status, Divert::Continue))
        }
        Err(e) => Err(Error::runtime(format!("fork: {e}"), None)),
    }
}

fn execute_for(env: &mut Env, name: &str, values: Option<&[sh_syntax::Word]>, body: &List) -> Result<(i32, Divert), Error> {
    let items: Vec<String> = match values {
        Some(words) => expansion::expand_words(env, words)?.into_iter().map(|f| f.value).collect(),
        None => env.positional_params.clone(),
    };

    let mut status = 0;
    let mut iterations = 0u32;
    for item in items {
        iterations += 1;
        if iterations > MAX_LOOP_ITERATIONS {
            return Err(Error::runtime("for: too many iterations", None));
        }
        let var = env
            .variables
            .get_or_new(name, Scope::Global)
            .map_err(|e| Error::runtime(e.to_string(), None))?;
        var.value = Some(VarValue::scalar(item));

        let divert = execute_list(env, body)?;
        status = env.exit_status;
        match divert {
            Divert::Continue => {}
            Divert::Break(n) if n <= 1 => break,
            Divert::Break(n) => return Ok((status, Divert::Break(n - 1))),
            Divert::LoopContinue(n) if n <= 1 => continue,
            Divert::LoopContinue(n) => return Ok((status, Divert::LoopContinue(n - 1))),
            other => return Ok((status, other)),
        }
    }
    Ok((status, Divert::Continue))
}

fn run_conditional_loop(env: &mut Env, condition: &List, body: &List, continue_while_true: bool) -> Result<(i32, Divert), Error> {
    let mut status = 0;
    let mut iterations = 0u32;
    loop {
        iterations += 1;
        if iterations > MAX_LOOP_ITERATIONS {
            return Err(Error::runtime("loop: too many iterations", None));
        }

        let condition_divert = execute_list_as_condition(env, condition)?;
        if !matches!(condition_divert, Divert::Continue) {
            return Ok((env.exit_status, condition_divert));
        }
        if (env.exit_status == 0) != continue_while_true {
            break;
        }

        let divert = execute_list(env, body)?;
        status = env.exit_status;
        match divert {
            Divert::Continue => {}
            Divert::Break(n) if n <= 1 => break,
            Divert::Break(n) => return Ok((status, Divert::Break(n - 1))),
            Divert::LoopContinue(n) if n <= 1 => continue,
            Divert::LoopContinue(n) => return Ok((status, Divert::LoopContinue(n - 1))),
            other => return Ok((status, other)),
        }
    }
    Ok((status, Divert::Continue))
}

fn execute_if(
    env: &mut Env,
    condition: &List,
    body: &List,
    elifs: &[sh_syntax::ElifThen],
    r#else: Option<&List>,
) -> Result<(i32, Divert), Error> {
    let condition_divert = execute_list_as_condition(env, condition)?;
    if !matches!(condition_divert, Divert::Continue) {
        return Ok((env.exit_status, condition_divert));
    }
    if env.exit_status == 0 {
        let divert = execute_list(env, body)?;
        return Ok((env.exit_status, divert));
    }

    for clause in elifs {
        let condition_divert = execute_list_as_condition(env, &clause.condition)?;
        if !matches!(condition_divert, Divert::Continue) {
            return Ok((env.exit_status, condition_divert));
        }
        if env.exit_status == 0 {
            let divert = execute_list(env, &clause.body)?;
            return Ok((env.exit_status, divert));
        }
    }

    if let Some(else_body) = r#else {
        let divert = execute_list(env, else_body)?;
        return Ok((env.exit_status, divert));
    }

    env.exit_status = 0;
    Ok((0, Divert::Continue))
}

fn execute_case(env: &mut Env, subject: &sh_syntax::Word, items: &[sh_syntax::CaseItem]) -> Result<(i32, Divert), Error> {
    let subject_str = expansion::expand_scalar(env, subject)?;
    for item in items {
        for pattern_word in &item.patterns {
            let pattern_str = expansion::expand_pattern(env, pattern_word)?;
            let pattern = sh_fnmatch::Pattern::parse(&pattern_str).map_err(|e| Error::expansion(e.to_string(), None))?;
            if pattern.is_match(&subject_str) {
                let divert = execute_list(env, &item.body)?;
                return Ok((env.exit_status, divert));
            }
        }
    }
    env.exit_status = 0;
    Ok((0, Divert::Continue))
}
