use crate::cache;
use crate::cli::{Cli, Command};
use anyhow::Result;

mod completions;
mod config;
mod context;
mod info;
mod lines;
mod ls;

pub use completions::CompletionsCommand;
pub use config::ConfigCommand;
pub use context::CommandContext;
pub use info::InfoCommand;
pub use lines::LinesCommand;
pub use ls::LsCommand;

pub trait CommandExecutor {
    fn execute(self, ctx: &CommandContext) -> Result<()>;
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let Cli { global, command } = cli;

    if global.clear_cache {
        cache::clear_cache()?;
    }

    let ctx = CommandContext::new(global);

    match command {
        Command::Info(args) => InfoCommand::new(args).execute(&ctx),
        Command::Ls(args) => LsCommand::new(args).execute(&ctx),
        Command::Lines(args) => LinesCommand::new(args).execute(&ctx),
        Command::Config(args) => ConfigCommand::new(args).execute(&ctx),
        Command::Completions(args) => CompletionsCommand::new(args).execute(&ctx),
    }
}

/// One-line rendering of a record. Inline previews are summarized.
pub(crate) fn display_icon(icon: &str) -> String {
    match icon.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or_default();
            format!("<{mime} preview, {} bytes>", icon.len())
        }
        None => icon.to_string(),
    }
}
