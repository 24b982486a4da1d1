use crate::constants::{system_icon, EDITOR_PID, FILE_EXPLORER_PID, PHOTOS_PID, VIDEO_PLAYER_PID};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionEntry {
    /// Short icon name under the system icon directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Processes able to open the extension, preferred first.
    #[serde(default)]
    pub process: Vec<String>,
}

/// Applications of the desktop, keyed by process id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessDirectory {
    entries: BTreeMap<String, ProcessEntry>,
}

impl Default for ProcessDirectory {
    fn default() -> Self {
        let builtin = [
            (FILE_EXPLORER_PID, "File Explorer", "explorer"),
            (EDITOR_PID, "Monaco Editor", "monaco"),
            (PHOTOS_PID, "Photos", "photo"),
            (VIDEO_PLAYER_PID, "Video Player", "vlc"),
            ("Webamp", "Webamp", "webamp"),
            ("JSDOS", "js-dos v7", "jsdos"),
            ("V86", "Virtual x86", "v86"),
            ("Ruffle", "Ruffle", "ruffle"),
            ("PDF", "PDF", "pdf"),
            ("Browser", "Browser", "chromium"),
        ];

        let entries = builtin
            .into_iter()
            .map(|(pid, title, icon)| {
                (
                    pid.to_string(),
                    ProcessEntry {
                        title: title.to_string(),
                        icon: system_icon(icon),
                    },
                )
            })
            .collect();

        Self { entries }
    }
}

impl ProcessDirectory {
    pub fn get(&self, pid: &str) -> Option<&ProcessEntry> {
        self.entries.get(pid)
    }

    /// Icon of `pid`, or `""` when the process is unknown.
    pub fn icon(&self, pid: &str) -> &str {
        self.get(pid)
            .map(|entry| entry.icon.as_str())
            .unwrap_or_default()
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, ProcessEntry)>) {
        self.entries.extend(entries);
    }
}

/// Static association of file extensions to icons and processes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionTable {
    entries: BTreeMap<String, ExtensionEntry>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        let builtin: [(&[&str], Option<&str>, &[&str]); 8] = [
            (&[".mp3"], Some("audio"), &["Webamp"]),
            (&[".wsz"], Some("wsz"), &["Webamp"]),
            (&[".zip"], Some("compressed"), &["FileExplorer", "JSDOS"]),
            (&[".jsdos"], Some("jsdos"), &["JSDOS"]),
            (&[".img", ".iso"], Some("image"), &["V86"]),
            (&[".swf", ".spl"], Some("ruffle"), &["Ruffle"]),
            (&[".pdf"], None, &["PDF"]),
            (&[".htm", ".html"], None, &["Browser", "MonacoEditor"]),
        ];

        let mut entries = BTreeMap::new();
        for (extensions, icon, process) in builtin {
            for extension in extensions {
                entries.insert(
                    extension.to_string(),
                    ExtensionEntry {
                        icon: icon.map(str::to_string),
                        process: process.iter().map(|pid| pid.to_string()).collect(),
                    },
                );
            }
        }

        Self { entries }
    }
}

impl ExtensionTable {
    pub fn get(&self, extension: &str) -> Option<&ExtensionEntry> {
        self.entries.get(extension)
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, ExtensionEntry)>) {
        self.entries.extend(
            entries
                .into_iter()
                .map(|(extension, entry)| (normalize_extension(&extension), entry)),
        );
    }
}

/// Extensions the text editor opens by default.
pub fn default_editor_extensions() -> BTreeSet<String> {
    [
        ".js", ".jsx", ".ts", ".tsx", ".json", ".md", ".txt", ".css", ".html", ".xml", ".yml",
        ".yaml", ".ini", ".sh", ".rs", ".py", ".toml", ".log",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Lowercases an extension and makes sure it carries a leading dot.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_ascii_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}

/// The lookup tables the resolver consults.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    pub processes: ProcessDirectory,
    pub extensions: ExtensionTable,
    pub editor_extensions: BTreeSet<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            processes: ProcessDirectory::default(),
            extensions: ExtensionTable::default(),
            editor_extensions: default_editor_extensions(),
        }
    }
}
