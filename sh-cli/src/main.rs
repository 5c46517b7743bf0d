//! The `sh3` binary: a thin wrapper around [`sh_cli::run`].

fn main() {
    std::process::exit(sh_cli::run());
}
