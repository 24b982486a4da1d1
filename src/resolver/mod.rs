//! Display metadata for explorer entries.
//!
//! Resolution is progressive: every resolver reports a placeholder record
//! right away and reports again whenever a better icon turns up (a folder's
//! descriptor icon, a decoded preview, a shortcut target's preview). The last
//! report is the best one.

use crate::cache::PreviewCache;
use crate::constants::{
    is_image_extension, is_video_extension, system_icon, DESKTOP_INI, FILE_EXPLORER_PID,
    FOLDER_ICON, MP3_EXTENSION, SHORTCUT_EXTENSION, UNKNOWN_ICON, VIDEO_PLAYER_PID, PHOTO_ICON,
};
use crate::descriptor::{InternetShortcut, ShellClassInfo};
use crate::lookup::{icon_by_file_extension, process_by_file_extension};
use crate::registry::Registry;
use crate::vfs::{extname, join, FileSystem};
use log::debug;
use serde::{Deserialize, Serialize};

pub mod preview;
mod target;

pub use preview::PreviewSettings;
pub use target::ShortcutTarget;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub icon: String,
    pub pid: String,
    pub url: String,
}

impl FileInfo {
    pub fn new(icon: impl Into<String>, pid: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            pid: pid.into(),
            url: url.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ICON, "", "")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PreviewKind {
    Image,
    Video,
    Audio,
}

pub struct Resolver<'a> {
    fs: &'a dyn FileSystem,
    registry: &'a Registry,
    settings: PreviewSettings,
    cache: Option<Box<dyn PreviewCache>>,
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            // Filesystem and cache are trait objects; surface a summary instead.
            .field("settings", &self.settings)
            .field("cache_len", &self.cache.as_ref().map(|cache| cache.len()))
            .finish()
    }
}

impl<'a> Resolver<'a> {
    pub fn new(fs: &'a dyn FileSystem, registry: &'a Registry) -> Self {
        Self {
            fs,
            registry,
            settings: PreviewSettings::default(),
            cache: None,
        }
    }

    pub fn with_settings(mut self, settings: PreviewSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cache(mut self, cache: Box<dyn PreviewCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&dyn PreviewCache> {
        self.cache.as_deref()
    }

    pub fn into_cache(self) -> Option<Box<dyn PreviewCache>> {
        self.cache
    }

    /// Custom folder icon from the directory's `desktop.ini`, if it names one.
    pub fn icon_from_ini(&self, directory: &str) -> Option<String> {
        let descriptor = join(directory, DESKTOP_INI);
        let contents = match self.fs.read_file(&descriptor) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No folder descriptor for {directory}: {e}");
                return None;
            }
        };

        let info = ShellClassInfo::parse(&String::from_utf8_lossy(&contents));
        Some(info.icon_file).filter(|icon| !icon.is_empty())
    }

    pub fn shortcut_info(&self, contents: &[u8]) -> FileInfo {
        let shortcut = InternetShortcut::parse(&String::from_utf8_lossy(contents));

        let icon = if shortcut.icon_file.is_empty() && !shortcut.base_url.is_empty() {
            self.registry.processes.icon(&shortcut.base_url).to_string()
        } else {
            shortcut.icon_file
        };

        FileInfo::new(icon, shortcut.base_url, shortcut.url)
    }

    pub fn info_without_extension(
        &self,
        path: &str,
        is_directory: bool,
        report: &mut dyn FnMut(FileInfo),
    ) {
        if !is_directory {
            report(FileInfo::unknown());
            return;
        }

        report(FileInfo::new(FOLDER_ICON, FILE_EXPLORER_PID, path));

        if let Some(icon) = self.icon_from_ini(path) {
            report(FileInfo::new(icon, FILE_EXPLORER_PID, path));
        }
    }

    pub fn info_with_extension(
        &mut self,
        path: &str,
        extension: &str,
        report: &mut dyn FnMut(FileInfo),
    ) {
        let registry = self.registry;
        let by_extension = |icon: Option<String>| FileInfo {
            icon: icon
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| icon_by_file_extension(registry, extension)),
            pid: process_by_file_extension(registry, extension),
            url: path.to_string(),
        };

        if extension == SHORTCUT_EXTENSION {
            let contents = match self.fs.read_file(path) {
                Ok(contents) => contents,
                Err(e) => {
                    debug!("Unreadable shortcut {path}: {e}");
                    report(by_extension(None));
                    return;
                }
            };

            let shortcut = self.shortcut_info(&contents);
            report(shortcut.clone());

            let target_extension = ShortcutTarget::parse(&shortcut.url).extension();
            if is_image_extension(&target_extension)
                || is_video_extension(&target_extension)
                || target_extension == MP3_EXTENSION
            {
                self.info_with_extension(&shortcut.url, &target_extension, &mut |target| {
                    if !target.icon.is_empty() && target.icon != shortcut.icon {
                        report(FileInfo::new(target.icon, &shortcut.pid, &shortcut.url));
                    }
                });
            }
        } else if is_image_extension(extension) {
            report(by_extension(Some(PHOTO_ICON.to_string())));
            if let Some(preview) = self.load_preview(path, extension, PreviewKind::Image) {
                report(by_extension(Some(preview)));
            }
        } else if is_video_extension(extension) {
            let player_icon = registry.processes.icon(VIDEO_PLAYER_PID).to_string();
            report(by_extension(Some(player_icon)));
            if let Some(preview) = self.load_preview(path, extension, PreviewKind::Video) {
                report(by_extension(Some(preview)));
            }
        } else if extension == MP3_EXTENSION {
            let audio_icon = registry
                .extensions
                .get(MP3_EXTENSION)
                .and_then(|entry| entry.icon.as_deref())
                .map(system_icon);
            report(by_extension(audio_icon));
            if let Some(preview) = self.load_preview(path, extension, PreviewKind::Audio) {
                report(by_extension(Some(preview)));
            }
        } else {
            report(by_extension(None));
        }
    }

    /// Stats `path` and dispatches on whether it has an extension.
    pub fn file_info(&mut self, path: &str, report: &mut dyn FnMut(FileInfo)) {
        let metadata = match self.fs.stat(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Cannot stat {path}: {e}");
                report(FileInfo::unknown());
                return;
            }
        };

        let extension = extname(path).to_ascii_lowercase();
        if metadata.is_dir || extension.is_empty() {
            self.info_without_extension(path, metadata.is_dir, report);
        } else {
            self.info_with_extension(path, &extension, report);
        }
    }

    /// Every record reported for `path`, in order.
    pub fn reports(&mut self, path: &str) -> Vec<FileInfo> {
        let mut reports = Vec::new();
        self.file_info(path, &mut |info| reports.push(info));
        reports
    }

    /// The final, best record for `path`.
    pub fn resolve(&mut self, path: &str) -> FileInfo {
        self.reports(path)
            .pop()
            .unwrap_or_else(FileInfo::unknown)
    }

    /// Host paths keep previews of different roots apart in a shared cache.
    fn cache_key(&self, path: &str) -> String {
        self.fs
            .host_path(path)
            .map(|host| host.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string())
    }

    fn load_preview(&mut self, path: &str, extension: &str, kind: PreviewKind) -> Option<String> {
        let stat = self.fs.stat(path);
        let modified = stat.as_ref().ok().and_then(|metadata| metadata.modified);
        let key = self.cache_key(path);

        if let (Some(cache), Some(modified)) = (self.cache.as_deref(), modified) {
            if let Some(preview) = cache.get(&key, modified) {
                debug!("Preview cache hit for {path}");
                return Some(preview.to_string());
            }
        }

        let result = match kind {
            PreviewKind::Image | PreviewKind::Audio => {
                let contents = match self.fs.read_file(path) {
                    Ok(contents) => contents,
                    Err(e) => {
                        debug!("No preview for {path}: {e}");
                        return None;
                    }
                };
                if kind == PreviewKind::Image {
                    preview::image_preview(extension, &contents, &self.settings).map(Some)
                } else {
                    preview::audio_cover(&contents, &self.settings)
                }
            }
            PreviewKind::Video => {
                if let Err(e) = stat {
                    debug!("No preview for {path}: {e}");
                    return None;
                }
                preview::video_frame(self.fs.host_path(path).as_deref(), &self.settings)
            }
        };

        match result {
            Ok(Some(preview)) => {
                if let (Some(cache), Some(modified)) = (self.cache.as_deref_mut(), modified) {
                    cache.insert(key, modified, preview.clone());
                }
                Some(preview)
            }
            Ok(None) => None,
            Err(e) => {
                debug!("Failed to build preview for {path}: {e:#}");
                None
            }
        }
    }
}
