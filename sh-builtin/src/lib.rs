//! Built-in utility implementations, and the registry that installs them
//! into an [`Env`]'s [`BuiltinSet`].

pub mod alias;
pub mod common;
pub mod eval;
pub mod getopts;
pub mod jobs;
pub mod misc;
pub mod printf;
pub mod read;
pub mod simple;
pub mod test;
pub mod trap;
pub mod type_hash;
pub mod variables;

use sh_env::builtin::{Builtin, BuiltinFn, Type};
use sh_env::Env;

fn entry(set: &mut sh_env::builtin::BuiltinSet, name: &'static str, r#type: Type, execute: BuiltinFn) {
    set.insert(name, Builtin { r#type, execute });
}

/// Populates `env.builtins` with every built-in utility named in this
/// crate. Call once when constructing a fresh [`Env`].
pub fn install(env: &mut Env) {
    use Type::{Elective, Mandatory, Special};
    let set = &mut env.builtins;

    entry(set, ":", Special, simple::colon);
    entry(set, ".", Special, eval::dot);
    entry(set, "source", Special, eval::dot);
    entry(set, "alias", Mandatory, alias::alias);
    entry(set, "bg", Mandatory, jobs::bg);
    entry(set, "break", Special, simple::r#break);
    entry(set, "cd", Mandatory, simple::cd);
    entry(set, "clear", Elective, simple::clear);
    entry(set, "config", Elective, misc::config);
    entry(set, "continue", Special, simple::r#continue);
    entry(set, "dump", Elective, misc::dump);
    entry(set, "echo", Mandatory, simple::echo);
    entry(set, "eval", Special, eval::eval);
    entry(set, "exec", Special, eval::exec);
    entry(set, "exit", Special, simple::exit);
    entry(set, "export", Special, variables::export);
    entry(set, "false", Mandatory, simple::r#false);
    entry(set, "fg", Mandatory, jobs::fg);
    entry(set, "getopts", Mandatory, getopts::getopts);
    entry(set, "hash", Elective, type_hash::hash);
    entry(set, "help", Elective, misc::help);
    entry(set, "history", Elective, misc::history);
    entry(set, "jobs", Mandatory, jobs::jobs);
    entry(set, "local", Elective, variables::local);
    entry(set, "printf", Mandatory, printf::printf);
    entry(set, "pwd", Mandatory, simple::pwd);
    entry(set, "read", Mandatory, read::read);
    entry(set, "readonly", Special, variables::readonly);
    entry(set, "return", Special, simple::r#return);
    entry(set, "set", Special, variables::set);
    entry(set, "setopt", Elective, variables::setopt);
    entry(set, "setprompt", Elective, misc::setprompt);
    entry(set, "shift", Special, simple::shift);
    entry(set, "test", Mandatory, test::test);
    entry(set, "[", Mandatory, test::bracket);
    entry(set, "theme", Elective, misc::theme);
    entry(set, "times", Special, simple::times);
    entry(set, "trap", Special, trap::trap);
    entry(set, "true", Mandatory, simple::r#true);
    entry(set, "type", Elective, type_hash::r#type);
    entry(set, "ulimit", Mandatory, misc::ulimit);
    entry(set, "umask", Mandatory, misc::umask);
    entry(set, "unalias", Mandatory, alias::unalias);
    entry(set, "unset", Special, variables::unset);
    entry(set, "wait", Mandatory, jobs::wait);
}
