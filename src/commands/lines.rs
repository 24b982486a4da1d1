use crate::cli::LinesArgs;
use crate::commands::{CommandContext, CommandExecutor};
use crate::text_metrics::{get_line_count, TextMeasurer};
use anyhow::Result;

pub struct LinesCommand {
    args: LinesArgs,
}

impl LinesCommand {
    pub fn new(args: LinesArgs) -> Self {
        Self { args }
    }

    fn count(&self, measurer: &dyn TextMeasurer) -> Result<usize> {
        get_line_count(
            measurer,
            &self.args.text,
            &self.args.font_size,
            &self.args.font_family,
            self.args.max_width,
        )
    }
}

impl CommandExecutor for LinesCommand {
    fn execute(self, ctx: &CommandContext) -> Result<()> {
        let measurer = ctx.config().measurer();
        println!("{}", self.count(&measurer)?);
        Ok(())
    }
}
