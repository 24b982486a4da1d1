use crate::cli::{Cli, CompletionsArgs};
use crate::commands::{CommandContext, CommandExecutor};
use anyhow::Result;
use clap::CommandFactory;
use std::fs;
use std::io::Write;

pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }

    fn write_to(&self, out: &mut dyn Write) {
        let mut command = Cli::command();
        clap_complete::generate(self.args.shell, &mut command, &self.args.bin_name, out);
    }
}

impl CommandExecutor for CompletionsCommand {
    fn execute(self, _ctx: &CommandContext) -> Result<()> {
        match &self.args.output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut file = fs::File::create(path)?;
                self.write_to(&mut file);
                println!(
                    "Generated {} completions at {}",
                    self.args.shell,
                    path.display()
                );
            }
            None => self.write_to(&mut std::io::stdout()),
        }

        Ok(())
    }
}
