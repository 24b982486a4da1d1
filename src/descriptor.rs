use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sections of an ini-style descriptor file, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniDocument {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    pub fn parse(contents: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section = String::new();

        for line in contents.lines() {
            let line = line.trim().trim_start_matches('\u{feff}');

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = Self::section_name(&line[1..line.len() - 1]);
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                if key.is_empty() {
                    continue;
                }
                let value = Self::unquote(line[eq_pos + 1..].trim());
                sections
                    .entry(current_section.clone())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
            }
        }

        Self { sections }
    }

    // Windows writes `[.ShellClassInfo]`; both spellings name the same section.
    fn section_name(raw: &str) -> String {
        raw.trim().trim_start_matches('.').to_string()
    }

    fn unquote(value: &str) -> &str {
        let bytes = value.as_bytes();
        if bytes.len() >= 2 {
            let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
            if first == last && (first == b'"' || first == b'\'') {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    pub fn section(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(name)
    }

    /// Value of `key` in `section`, or `""` when either is missing.
    pub fn get(&self, section: &str, key: &str) -> &str {
        self.section(section)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// `[ShellClassInfo]` section of a folder's `desktop.ini`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellClassInfo {
    pub icon_file: String,
}

impl ShellClassInfo {
    pub fn parse(contents: &str) -> Self {
        let document = IniDocument::parse(contents);
        Self {
            icon_file: document.get("ShellClassInfo", "IconFile").to_string(),
        }
    }
}

/// `[InternetShortcut]` section of a `.url` shortcut file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternetShortcut {
    /// Process that opens the shortcut target.
    pub base_url: String,
    pub icon_file: String,
    pub url: String,
}

impl InternetShortcut {
    pub fn parse(contents: &str) -> Self {
        let document = IniDocument::parse(contents);
        Self {
            base_url: document.get("InternetShortcut", "BaseURL").to_string(),
            icon_file: document.get("InternetShortcut", "IconFile").to_string(),
            url: document.get("InternetShortcut", "URL").to_string(),
        }
    }
}
