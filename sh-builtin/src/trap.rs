//! `trap`: configures or reports the actions run on a signal or on exit.

use crate::common;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::system::Disposition;
use sh_env::trap::{Action, Condition};
use sh_env::Env;

/// `trap [-lp] [action condition...]`: with no operands, lists every
/// configured trap. `trap action condition...` sets `action` (`-` or
/// `""`/omitted resets to the default, `""` given explicitly ignores the
/// condition) for each named condition. `trap -l` lists signal names.
pub fn trap(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);

    if rest.iter().any(|f| f.value == "-l") {
        for n in 1..=31 {
            println!("{n}) SIG{n}");
        }
        return common::ok();
    }
    if rest.is_empty() || rest.iter().any(|f| f.value == "-p") {
        for (condition, action) in env.traps.iter() {
            if let Action::Command(command) = action {
                println!("trap -- {} {condition}", sh_quote::quote(command));
            }
        }
        return common::ok();
    }

    let action_text = &rest[0].value;
    let action = match action_text.as_str() {
        "-" => Action::Default,
        "" => Action::Ignore,
        text => Action::Command(text.to_owned().into()),
    };

    let mut status = 0;
    for field in &rest[1..] {
        let condition = match field.value.parse::<Condition>() {
            Ok(c) => c,
            Err(_) => {
                common::report(name, format_args!("{}: unknown condition", field.value));
                status = 1;
                continue;
            }
        };
        if let Err(e) = env.traps.set_action(condition, action.clone()) {
            common::report(name, e);
            status = 1;
            continue;
        }
        if let Condition::Signal(signal) = condition {
            let disposition = match action {
                Action::Command(_) => Disposition::Catch,
                Action::Ignore => Disposition::Ignore,
                Action::Default => Disposition::Default,
            };
            let _ = env.system.sigaction(signal, disposition);
        }
    }
    BuiltinResult::new(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    #[test]
    fn trap_sets_a_command_action_for_a_signal() {
        let mut e = env();
        let result = trap(&mut e, fields(&["trap", "echo bye", "TERM"]));
        assert_eq!(result.exit_status, 0);
        let action = e.traps.get_action(Condition::Signal(nix::sys::signal::Signal::SIGTERM));
        assert_eq!(action, &Action::Command("echo bye".into()));
    }

    #[test]
    fn trap_dash_resets_to_default() {
        let mut e = env();
        trap(&mut e, fields(&["trap", "echo bye", "TERM"]));
        trap(&mut e, fields(&["trap", "-", "TERM"]));
        let action = e.traps.get_action(Condition::Signal(nix::sys::signal::Signal::SIGTERM));
        assert_eq!(action, &Action::Default);
    }

    #[test]
    fn trap_rejects_an_unknown_condition() {
        let mut e = env();
        let result = trap(&mut e, fields(&["trap", "echo hi", "NOTASIGNAL"]));
        assert_eq!(result.exit_status, 1);
    }

    #[test]
    fn trap_dash_l_lists_signal_numbers() {
        let mut e = env();
        let result = trap(&mut e, fields(&["trap", "-l"]));
        assert_eq!(result.exit_status, 0);
    }
}
