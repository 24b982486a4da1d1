use crate::constants::PREVIEW_FRAME_SECOND;
use crate::registry::{normalize_extension, ExtensionEntry, ProcessEntry, Registry};
use crate::resolver::PreviewSettings;
use crate::text_metrics::{ColumnMeasurer, DEFAULT_FONT_ADVANCE};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host directory mounted as `/` of the virtual filesystem.
    pub root: Option<PathBuf>,
    pub preview_frame_second: f64,
    pub thumbnail_size: Option<u32>,
    pub default_font_advance: f32,
    /// Extra extensions opened by the text editor.
    pub editor_extensions: Vec<String>,
    /// Average glyph advance, as a fraction of the font size, per family.
    pub font_advance: HashMap<String, f32>,
    /// Processes added to, or replacing, the built-in process directory.
    pub processes: BTreeMap<String, ProcessEntry>,
    /// Extensions added to, or replacing, the built-in extension table.
    pub extensions: BTreeMap<String, ExtensionEntry>,
}

impl Default for Config {
    fn default() -> Self {
        let mut font_advance = HashMap::new();
        font_advance.insert("monospace".to_string(), 0.6);
        font_advance.insert("Segoe UI".to_string(), 0.52);

        Self {
            root: None,
            preview_frame_second: PREVIEW_FRAME_SECOND,
            thumbnail_size: None,
            default_font_advance: DEFAULT_FONT_ADVANCE,
            editor_extensions: Vec::new(),
            font_advance,
            processes: BTreeMap::new(),
            extensions: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(custom_path: Option<PathBuf>) -> Self {
        let config_path = custom_path.unwrap_or_else(Self::config_path);

        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(config) => return config,
                    Err(e) => warn!("Ignoring invalid config {}: {e}", config_path.display()),
                },
                Err(e) => warn!("Cannot read config {}: {e}", config_path.display()),
            }
        }

        // Return default config if file doesn't exist or can't be parsed
        Self::default()
    }

    pub fn save(&self, custom_path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        let config_path = custom_path.unwrap_or_else(Self::config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(config_path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fileinfo")
            .join("config.toml")
    }

    /// Built-in lookup tables with this configuration's entries merged in.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::default();

        registry.processes.extend(self.processes.clone());
        registry.extensions.extend(self.extensions.clone());
        registry.editor_extensions.extend(
            self.editor_extensions
                .iter()
                .map(|extension| normalize_extension(extension))
                .filter(|extension| !extension.is_empty()),
        );

        registry
    }

    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            thumbnail_size: self.thumbnail_size.filter(|size| *size > 0),
            frame_second: self.preview_frame_second.max(0.0),
        }
    }

    pub fn measurer(&self) -> ColumnMeasurer {
        ColumnMeasurer::new(self.default_font_advance, self.font_advance.clone())
    }
}
