//! Command-line frontend for the shell: reads lines (through a pluggable
//! [`collaborators::LineSource`]), feeds them to the parser and executor,
//! and owns process exit-status bookkeeping.
//!
//! The entry point is [`run`], which is what the `sh3` binary crate calls
//! as its whole `main`.

pub mod args;
pub mod collaborators;

use args::{Run, Source};
use collaborators::{
    ConfigSource, DefaultPromptRenderer, FileHistoryStore, HistoryStore, LineSource, NullConfigSource,
    NullHistoryStore, NullPluginLoader, PluginLoader, PromptLevel, PromptRenderer, StdinLineSource,
};
use sh_env::option::{Option as ShellOption, State};
use sh_env::real_system::RealSystem;
use sh_env::system::Disposition;
use sh_env::variable::{Scope, Value, Variable};
use sh_env::Env;
use sh_syntax::syntax::{Command, List};
use sh_syntax::{lex, parser};
use std::borrow::Cow;

/// Everything the interactive loop needs beyond `Env` itself: the
/// collaborators from §F, boxed so a host can swap in richer
/// implementations.
pub struct Shell {
    pub env: Env,
    pub lines: Box<dyn LineSource>,
    pub prompt: Box<dyn PromptRenderer>,
    pub config: Box<dyn ConfigSource>,
    pub plugins: Box<dyn PluginLoader>,
    pub history: Box<dyn HistoryStore>,
}

impl Shell {
    #[must_use]
    pub fn new(env: Env) -> Self {
        let history: Box<dyn HistoryStore> = match FileHistoryStore::default_path() {
            Some(path) => Box::new(FileHistoryStore::new(path)),
            None => Box::new(NullHistoryStore),
        };
        Shell {
            env,
            lines: Box::new(StdinLineSource),
            prompt: Box::new(DefaultPromptRenderer),
            config: Box::new(NullConfigSource),
            plugins: Box::new(NullPluginLoader),
            history,
        }
    }

    /// Applies `ConfigSource::load()`'s entries as `SH_CONFIG_*` variables,
    /// the same namespace the `config` builtin reads and writes, and loads
    /// whatever plugins the `PluginLoader` names (the core never inspects
    /// the resulting handles; loading them is the whole contract).
    pub fn apply_config(&mut self) {
        let config = self.config.load();
        for (key, value) in config.entries {
            let name = format!("SH_CONFIG_{key}");
            if let Ok(var) = self.env.variables.get_or_new(&name, Scope::Global) {
                var.value = Some(Value::scalar(value));
            }
        }
        let _plugins = self.plugins.load_plugins();
    }

    /// Runs `source` to completion and returns the shell's exit status.
    pub fn run(&mut self, source: &Source) -> i32 {
        match source {
            Source::Stdin if self.env.options.is_on(ShellOption::Interactive) => self.run_interactive(),
            Source::Stdin => {
                use std::io::Read as _;
                let mut text = String::new();
                if let Err(e) = std::io::stdin().read_to_string(&mut text) {
                    eprintln!("{}: {e}", self.env.arg0);
                    return 1;
                }
                self.run_script(&text)
            }
            Source::File { path } => match std::fs::read_to_string(path) {
                Ok(text) => self.run_script(&text),
                Err(e) => {
                    eprintln!("{}: {path}: {e}", self.env.arg0);
                    127
                }
            },
            Source::String(command) => self.run_script(command),
        }
    }

    /// Runs a complete, non-interactive script: parse once, execute once.
    fn run_script(&mut self, text: &str) -> i32 {
        match sh_syntax::parse(text) {
            Ok(list) => self.execute(&list),
            Err(e) => {
                report_parse_error(&e, text);
                self.env.exit_status = 2;
                2
            }
        }
    }

    /// The read-eval loop: reads one logical command at a time, growing the
    /// buffer across lines while a quote or compound construct is left
    /// open, echoing the continuation prompt meanwhile.
    fn run_interactive(&mut self) -> i32 {
        let mut pending = String::new();
        loop {
            if pending.is_empty() {
                sh_semantics::trap::run_traps_for_caught_signals(&mut self.env);
                sh_semantics::job::reap_finished(&mut self.env);
            }
            let level = if pending.is_empty() { PromptLevel::Primary } else { PromptLevel::Continuation };
            let prompt = self.prompt.render(level);
            let line = match self.lines.read_line(&prompt) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    eprintln!("{}: {e}", self.env.arg0);
                    break;
                }
            };
            if !pending.is_empty() {
                pending.push('\n');
            }
            pending.push_str(&line);

            match sh_syntax::parse(&pending) {
                Ok(list) => {
                    self.history.append(pending.trim_end());
                    if !self.try_run_history_builtin(&list) {
                        self.execute(&list);
                    }
                    pending.clear();
                }
                Err(e) if needs_more_input(&e) => continue,
                Err(e) => {
                    report_parse_error(&e, &pending);
                    self.env.exit_status = 2;
                    pending.clear();
                }
            }
        }
        self.env.exit_status
    }

    /// Intercepts a bare `history` command so it can be served from the
    /// real [`HistoryStore`] rather than `sh-builtin`'s portable fallback,
    /// which has no collaborator to read from. Returns whether it handled
    /// the list.
    fn try_run_history_builtin(&mut self, list: &List) -> bool {
        if !is_bare_history_command(list) {
            return false;
        }
        for line in self.history.all() {
            println!("{line}");
        }
        self.env.exit_status = 0;
        true
    }

    fn execute(&mut self, list: &List) -> i32 {
        match sh_semantics::command::execute_list(&mut self.env, list) {
            Ok(sh_semantics::Divert::Exit(status)) => status,
            Ok(_) => self.env.exit_status,
            Err(error) => {
                use sh_semantics::Handle;
                match error.handle(&mut self.env, false) {
                    sh_semantics::Divert::Exit(status) => status,
                    _ => self.env.exit_status,
                }
            }
        }
    }
}

fn is_bare_history_command(list: &List) -> bool {
    let [item] = list.0.as_slice() else { return false };
    if item.is_async || !item.and_or.rest.is_empty() {
        return false;
    }
    let pipeline = &item.and_or.first;
    if pipeline.negation {
        return false;
    }
    let [command] = pipeline.commands.as_slice() else { return false };
    let Command::Simple(simple) = command.as_ref() else { return false };
    simple.assigns.is_empty() && simple.redirs.is_empty() && simple.words.len() == 1 && simple.words[0].to_literal().as_deref() == Some("history")
}

/// Whether a parse failure merely means "there is more input to come"
/// (an unterminated quote, an unclosed `if`/`{`/...) rather than a real
/// syntax error a REPL should report immediately.
fn needs_more_input(error: &parser::Error) -> bool {
    matches!(
        error,
        parser::Error::UnexpectedEof(_)
            | parser::Error::Lex(
                lex::Error::UnterminatedSingleQuote(_)
                    | lex::Error::UnterminatedDoubleQuote(_)
                    | lex::Error::UnterminatedBackquote(_)
                    | lex::Error::UnterminatedBrace(_)
                    | lex::Error::UnterminatedCommandSubst(_)
                    | lex::Error::UnterminatedArith(_)
            )
    )
}

fn parse_error_location(error: &parser::Error) -> Option<&sh_syntax::Location> {
    match error {
        parser::Error::Lex(lex::Error::MissingHereDocDelimiter(_)) => None,
        parser::Error::Lex(
            lex::Error::UnterminatedSingleQuote(loc)
            | lex::Error::UnterminatedDoubleQuote(loc)
            | lex::Error::UnterminatedBackquote(loc)
            | lex::Error::UnterminatedBrace(loc)
            | lex::Error::UnterminatedCommandSubst(loc)
            | lex::Error::UnterminatedArith(loc)
            | lex::Error::MalformedParam(loc),
        ) => Some(loc),
        parser::Error::UnexpectedEof(loc)
        | parser::Error::Unexpected { location: loc, .. }
        | parser::Error::MissingPipelineCommand(loc)
        | parser::Error::UnmatchedKeyword(loc, _)
        | parser::Error::MalformedCasePattern(loc) => Some(loc),
    }
}

/// Renders a parse error with `annotate-snippets` when it carries a
/// location, falling back to a plain `name: message` line otherwise (§7).
fn report_parse_error(error: &parser::Error, source: &str) {
    match parse_error_location(error) {
        Some(location) => {
            let rendered = sh_env::io::format_error(Cow::Borrowed("sh"), Cow::Owned(error.to_string()), source, location, false);
            eprint!("{rendered}");
        }
        None => eprintln!("sh: {error}"),
    }
}

fn apply_options(env: &mut Env, options: &[(ShellOption, State)]) {
    for &(option, state) in options {
        env.options.set(option, state);
    }
}

/// Whether the shell should behave as interactive absent an explicit `-i`:
/// reading from stdin, no script operand, and both stdin and stderr
/// attached to a terminal.
fn auto_interactive(env: &Env, run: &Run) -> bool {
    if run.source != Source::Stdin || !run.positional_params.is_empty() {
        return false;
    }
    if run.options.iter().any(|&(o, _)| o == ShellOption::Interactive) {
        return false;
    }
    env.system.isatty(sh_syntax::Fd::STDIN) && env.system.isatty(sh_syntax::Fd::STDERR)
}

/// Copies the process's environment in as exported shell variables, the
/// way every POSIX shell seeds its initial variable set.
fn import_environment(env: &mut Env) {
    import_environment_from(env, std::env::vars());
}

fn import_environment_from(env: &mut Env, vars: impl IntoIterator<Item = (String, String)>) {
    for (name, value) in vars {
        if let Ok(var) = env.variables.get_or_new(&name, Scope::Global) {
            *var = Variable::new(value).exported();
        }
    }
}

/// Runs the EXIT trap, if one is set, the way a real shell finishes up
/// before actually terminating.
fn run_exit_trap(env: &mut Env) {
    use sh_env::trap::{Action, Condition};
    let action = env.traps.get_action(Condition::Exit).clone();
    if let Action::Command(command) = action {
        sh_semantics::run(env, &command);
    }
}

/// Sets up the environment, parses `argv`, and runs the shell to
/// completion, returning the process exit status.
#[must_use]
pub fn run() -> i32 {
    let mut env = Env::new(Box::new(RealSystem));
    sh_builtin::install(&mut env);
    import_environment(&mut env);

    // Rust sets SIGPIPE to SIG_IGN by default; POSIX utilities expect the
    // default (terminating) disposition.
    let _ = env.system.sigaction(nix::sys::signal::Signal::SIGPIPE, Disposition::Default);

    let mut argv = std::env::args();
    let arg0 = argv.next();
    let run = match args::parse(argv) {
        Ok(run) => run,
        Err(e) => {
            let prog = arg0.unwrap_or_else(|| "sh".to_owned());
            eprintln!("{prog}: {e}");
            return 2;
        }
    };

    if let Some(arg0) = arg0 {
        env.arg0 = arg0;
    }
    if let Some(name) = &run.arg0 {
        env.arg0 = name.clone();
    }
    env.positional_params = run.positional_params.clone();

    if auto_interactive(&env, &run) {
        env.options.set(ShellOption::Interactive, State::On);
    }
    apply_options(&mut env, &run.options);

    let mut shell = Shell::new(env);
    shell.apply_config();
    let status = shell.run(&run.source);
    run_exit_trap(&mut shell.env);
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_env::virtual_system::RecordingSystem;

    fn env() -> Env {
        let mut env = Env::new(Box::new(RecordingSystem::new()));
        sh_builtin::install(&mut env);
        env
    }

    #[test]
    fn run_script_executes_and_reports_exit_status() {
        let mut shell = Shell::new(env());
        let status = shell.run_script("exit 3");
        assert_eq!(status, 3);
    }

    #[test]
    fn run_script_reports_a_syntax_error() {
        let mut shell = Shell::new(env());
        let status = shell.run_script("'unterminated");
        assert_eq!(status, 2);
    }

    #[test]
    fn needs_more_input_detects_an_unterminated_quote() {
        let error = sh_syntax::parse("echo 'still open").unwrap_err();
        assert!(needs_more_input(&error));
    }

    #[test]
    fn needs_more_input_rejects_a_real_syntax_error() {
        let error = sh_syntax::parse("fi").unwrap_err();
        assert!(!needs_more_input(&error));
    }

    #[test]
    fn is_bare_history_command_matches_only_a_lone_history_word() {
        let list = sh_syntax::parse("history").unwrap();
        assert!(is_bare_history_command(&list));
        let list = sh_syntax::parse("history foo").unwrap();
        assert!(!is_bare_history_command(&list));
        let list = sh_syntax::parse("echo hi").unwrap();
        assert!(!is_bare_history_command(&list));
    }

    #[test]
    fn import_environment_exports_process_variables() {
        let mut e = env();
        import_environment_from(&mut e, [("SH_CLI_TEST_VAR".to_owned(), "hello".to_owned())]);
        let var = e.variables.get("SH_CLI_TEST_VAR").unwrap();
        assert_eq!(var.value.as_ref().and_then(Value::as_scalar), Some("hello"));
        assert!(var.is_exported);
    }

    #[test]
    fn apply_options_sets_every_flag() {
        let mut e = env();
        apply_options(&mut e, &[(ShellOption::ErrExit, State::On)]);
        assert_eq!(e.options.get(ShellOption::ErrExit), State::On);
    }
}
