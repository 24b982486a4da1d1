use anyhow::Result;
use clap::{CommandFactory, Parser};

mod cache;
mod cli;
mod commands;
mod config;
mod constants;
mod descriptor;
mod filter;
mod lookup;
mod registry;
mod resolver;
mod text_metrics;
mod vfs;

#[cfg(test)]
mod test_support;

use cli::Cli;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    clap_complete::CompleteEnv::with_factory(|| Cli::command().name("fileinfo"))
        .completer("fileinfo")
        .complete();

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    commands::dispatch(cli)
}
