use crate::cli::ConfigArgs;
use crate::commands::{CommandContext, CommandExecutor};
use crate::config::Config;
use anyhow::Result;

pub struct ConfigCommand {
    args: ConfigArgs,
}

impl ConfigCommand {
    pub fn new(args: ConfigArgs) -> Self {
        Self { args }
    }
}

impl CommandExecutor for ConfigCommand {
    fn execute(self, ctx: &CommandContext) -> Result<()> {
        if self.args.generate {
            let path = Config::default().save(Some(ctx.config_path()))?;
            println!("Generated default configuration at: {}", path.display());
            return Ok(());
        }

        println!("# {}", ctx.config_path().display());
        print!("{}", toml::to_string_pretty(ctx.config())?);
        Ok(())
    }
}
