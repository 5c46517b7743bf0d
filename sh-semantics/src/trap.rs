//! Running trap commands for signals caught since the last safe point.
//!
//! The `trap` builtin only records actions and arms the signal disposition;
//! actually running a `Command` action happens here, polled from
//! [`run_traps_for_caught_signals`] at the executor's safe points (between
//! top-level commands, and wherever else the caller chooses to poll) rather
//! than from signal-handler context.

use sh_env::trap::Action;
use sh_env::Env;

/// Runs the command configured for every signal caught since the last call,
/// in the order the signals were caught. `$?` is saved and restored around
/// each trap command, the way a real shell's trap execution doesn't
/// perturb the exit status seen by the code that gets interrupted.
pub fn run_traps_for_caught_signals(env: &mut Env) {
    env.poll_signals();

    for (_signal, action) in env.traps.take_pending() {
        let Action::Command(command) = action else { continue };
        let previous_exit_status = env.exit_status;
        crate::run(env, &command);
        env.exit_status = previous_exit_status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_env::virtual_system::RecordingSystem;

    #[test]
    fn nothing_to_do_without_signals_caught() {
        let mut env = Env::new(Box::new(RecordingSystem::new()));
        env.exit_status = 7;
        run_traps_for_caught_signals(&mut env);
        assert_eq!(env.exit_status, 7);
    }

    #[test]
    fn running_trap_restores_previous_exit_status() {
        use sh_env::trap::Condition;
        use nix::sys::signal::Signal;

        let mut system = RecordingSystem::new();
        system.pending_signals.push(Signal::SIGTERM);
        let mut env = Env::new(Box::new(system));
        env.traps
            .set_action(Condition::Signal(Signal::SIGTERM), Action::Command("exit 0".into()))
            .unwrap();
        env.exit_status = 42;

        run_traps_for_caught_signals(&mut env);

        assert_eq!(env.exit_status, 42);
        assert!(!env.traps.has_pending());
    }
}
