use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd {
    pub mod show;
    pub mod watch;
}

mod util;

fn main() -> ExitCode {
    if std::env::var("RUST_BACKTRACE").is_err() {
        // Enable backtraces on panics by default.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    match App::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Banned peers viewer
#[derive(Parser)]
#[clap(name = "banwatch", version)]
#[clap(subcommand_required = true, arg_required_else_help = true)]
struct App {
    #[clap(subcommand)]
    cmd: Cmd,
}

impl App {
    fn run(self) -> Result<()> {
        self.cmd.run()
    }
}

#[derive(Subcommand)]
enum Cmd {
    Show(cmd::show::CmdShow),

    Watch(cmd::watch::CmdWatch),
}

impl Cmd {
    fn run(self) -> Result<()> {
        match self {
            Cmd::Show(cmd) => cmd.run(),
            Cmd::Watch(cmd) => cmd.run(),
        }
    }
}
