use crate::cli::InfoArgs;
use crate::commands::{display_icon, CommandContext, CommandExecutor};
use crate::resolver::{FileInfo, Resolver};
use anyhow::Result;
use serde::Serialize;

pub struct InfoCommand {
    args: InfoArgs,
}

#[derive(Debug, Serialize)]
struct PathReport {
    path: String,
    #[serde(rename = "final")]
    final_info: FileInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reports: Vec<FileInfo>,
}

impl InfoCommand {
    pub fn new(args: InfoArgs) -> Self {
        Self { args }
    }

    fn collect(&self, resolver: &mut Resolver<'_>) -> Vec<PathReport> {
        self.args
            .paths
            .iter()
            .map(|path| {
                let mut reports = resolver.reports(path);
                let final_info = reports.last().cloned().unwrap_or_else(FileInfo::unknown);
                if self.args.final_only {
                    reports.clear();
                }
                PathReport {
                    path: path.clone(),
                    final_info,
                    reports,
                }
            })
            .collect()
    }
}

impl CommandExecutor for InfoCommand {
    fn execute(self, ctx: &CommandContext) -> Result<()> {
        let fs = ctx.filesystem()?;
        let registry = ctx.registry();
        let mut resolver = ctx.resolver(&fs, &registry);

        let results = self.collect(&mut resolver);
        ctx.finish(resolver)?;

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        for result in &results {
            println!("{}", result.path);
            if result.reports.is_empty() {
                print_info("", &result.final_info);
            } else {
                for (step, info) in result.reports.iter().enumerate() {
                    print_info(&format!("{}. ", step + 1), info);
                }
            }
        }

        Ok(())
    }
}

fn print_info(prefix: &str, info: &FileInfo) {
    println!("  {prefix}icon: {}", display_icon(&info.icon));
    println!("  {}pid:  {}", " ".repeat(prefix.len()), info.pid);
    if !info.url.is_empty() {
        println!("  {}url:  {}", " ".repeat(prefix.len()), info.url);
    }
}
