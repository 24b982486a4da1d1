use crate::cli::LsArgs;
use crate::commands::{display_icon, CommandContext, CommandExecutor};
use crate::filter::filter_system_files;
use crate::resolver::{FileInfo, Resolver};
use crate::vfs::{basename, join, FileSystem};
use anyhow::Result;
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;
use wildmatch::WildMatch;

pub struct LsCommand {
    args: LsArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Entry {
    path: String,
    is_dir: bool,
    #[serde(flatten)]
    info: FileInfo,
}

impl LsCommand {
    pub fn new(args: LsArgs) -> Self {
        Self { args }
    }

    /// Virtual paths under the listed directory, directories first.
    fn paths(&self, fs: &dyn FileSystem) -> Result<Vec<(String, bool)>> {
        let matcher = self.args.pattern.as_deref().map(WildMatch::new);
        let mut found = Vec::new();
        let mut pending = vec![self.args.directory.clone()];

        while let Some(directory) = pending.pop() {
            let names = match fs.read_dir(&directory) {
                Ok(names) => names,
                Err(e) if directory != self.args.directory => {
                    debug!("Skipping {directory}: {e:#}");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let visible = filter_system_files(&directory);
            for name in names {
                if !self.args.all && !visible(&name) {
                    continue;
                }

                let path = join(&directory, &name);
                let (is_dir, is_symlink) = fs
                    .stat(&path)
                    .map(|meta| (meta.is_dir, meta.is_symlink))
                    .unwrap_or((false, false));

                // Linked directories are listed but not entered.
                if is_dir && !is_symlink && self.args.recursive {
                    pending.push(path.clone());
                }
                if matcher.as_ref().map_or(true, |m| m.matches(&name)) {
                    found.push((path, is_dir));
                }
            }
        }

        Ok(found
            .into_iter()
            .sorted_by(|(a, a_dir), (b, b_dir)| {
                b_dir
                    .cmp(a_dir)
                    .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            })
            .collect())
    }

    fn entries(&self, fs: &dyn FileSystem, resolver: &mut Resolver<'_>) -> Result<Vec<Entry>> {
        Ok(self
            .paths(fs)?
            .into_iter()
            .map(|(path, is_dir)| {
                let info = resolver.resolve(&path);
                Entry { path, is_dir, info }
            })
            .collect())
    }
}

impl CommandExecutor for LsCommand {
    fn execute(self, ctx: &CommandContext) -> Result<()> {
        let fs = ctx.filesystem()?;
        let registry = ctx.registry();
        let mut resolver = ctx.resolver(&fs, &registry);

        let entries = self.entries(&fs, &mut resolver)?;
        ctx.finish(resolver)?;

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        for row in self.rows(&entries) {
            println!("{row}");
        }

        Ok(())
    }
}

impl LsCommand {
    /// Text rows aligned on display columns, so wide characters line up.
    fn rows(&self, entries: &[Entry]) -> Vec<String> {
        let labels = entries.iter().map(|entry| self.label(entry)).collect_vec();
        let width = labels.iter().map(|label| label.width()).max().unwrap_or(0);

        entries
            .iter()
            .zip(labels)
            .map(|(entry, label)| {
                let padding = " ".repeat(width - label.width());
                format!(
                    "{label}{padding}  {:<14}  {}",
                    entry.info.pid,
                    display_icon(&entry.info.icon)
                )
            })
            .collect()
    }

    fn label(&self, entry: &Entry) -> String {
        let name = if self.args.recursive {
            entry.path.clone()
        } else {
            basename(&entry.path).to_string()
        };
        if entry.is_dir {
            format!("{name}/")
        } else {
            name
        }
    }
}
