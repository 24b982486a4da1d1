use crate::constants::{
    is_image_extension, is_video_extension, system_icon, EDITOR_PID, PHOTOS_PID, UNKNOWN_ICON,
    VIDEO_PLAYER_PID,
};
use crate::registry::Registry;

/// Process that opens an extension when the extension table says nothing.
pub fn default_file_viewer(registry: &Registry, extension: &str) -> &'static str {
    if registry.editor_extensions.contains(extension) {
        EDITOR_PID
    } else if is_image_extension(extension) {
        PHOTOS_PID
    } else if is_video_extension(extension) {
        VIDEO_PLAYER_PID
    } else {
        ""
    }
}

pub fn icon_by_file_extension(registry: &Registry, extension: &str) -> String {
    let entry = registry.extensions.get(extension);

    if let Some(icon) = entry
        .and_then(|entry| entry.icon.as_deref())
        .filter(|icon| !icon.is_empty())
    {
        return system_icon(icon);
    }

    let default_process = entry
        .and_then(|entry| entry.process.first())
        .map(String::as_str)
        .filter(|pid| !pid.is_empty())
        .unwrap_or_else(|| default_file_viewer(registry, extension));

    let icon = registry.processes.icon(default_process);
    if icon.is_empty() {
        UNKNOWN_ICON.to_string()
    } else {
        icon.to_string()
    }
}

pub fn process_by_file_extension(registry: &Registry, extension: &str) -> String {
    match registry.extensions.get(extension) {
        Some(entry) => entry.process.first().cloned().unwrap_or_default(),
        None => default_file_viewer(registry, extension).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ExtensionEntry;

    #[test]
    fn test_default_viewer_prefers_editor_then_photos_then_video() {
        let registry = Registry::default();
        assert_eq!(default_file_viewer(&registry, ".md"), "MonacoEditor");
        assert_eq!(default_file_viewer(&registry, ".jpg"), "Photos");
        assert_eq!(default_file_viewer(&registry, ".mp4"), "VideoPlayer");
        assert_eq!(default_file_viewer(&registry, ".exe"), "");
    }

    #[test]
    fn test_table_icon_wins() {
        let registry = Registry::default();
        assert_eq!(
            icon_by_file_extension(&registry, ".mp3"),
            "/System/Icons/audio.png"
        );
        assert_eq!(
            icon_by_file_extension(&registry, ".zip"),
            "/System/Icons/compressed.png"
        );
    }

    #[test]
    fn test_falls_back_to_process_icon() {
        let registry = Registry::default();
        assert_eq!(icon_by_file_extension(&registry, ".pdf"), "/System/Icons/pdf.png");
        assert_eq!(icon_by_file_extension(&registry, ".png"), "/System/Icons/photo.png");
        assert_eq!(icon_by_file_extension(&registry, ".webm"), "/System/Icons/vlc.png");
        assert_eq!(icon_by_file_extension(&registry, ".txt"), "/System/Icons/monaco.png");
    }

    #[test]
    fn test_unknown_extension_gets_unknown_icon() {
        let registry = Registry::default();
        assert_eq!(icon_by_file_extension(&registry, ".exe"), UNKNOWN_ICON);
        assert_eq!(icon_by_file_extension(&registry, ""), UNKNOWN_ICON);
    }

    #[test]
    fn test_table_entry_without_process_uses_default_viewer_icon() {
        let mut registry = Registry::default();
        registry.extensions.extend([(".log".to_string(), ExtensionEntry::default())]);

        assert_eq!(
            icon_by_file_extension(&registry, ".log"),
            "/System/Icons/monaco.png"
        );
        // The table entry still decides the process, even when empty.
        assert_eq!(process_by_file_extension(&registry, ".log"), "");
    }

    #[test]
    fn test_unknown_process_in_table_gets_unknown_icon() {
        let mut registry = Registry::default();
        registry.extensions.extend([(
            ".xyz".to_string(),
            ExtensionEntry {
                icon: None,
                process: vec!["Missing".to_string()],
            },
        )]);

        assert_eq!(icon_by_file_extension(&registry, ".xyz"), UNKNOWN_ICON);
        assert_eq!(process_by_file_extension(&registry, ".xyz"), "Missing");
    }

    #[test]
    fn test_process_lookup() {
        let registry = Registry::default();
        assert_eq!(process_by_file_extension(&registry, ".mp3"), "Webamp");
        assert_eq!(process_by_file_extension(&registry, ".html"), "Browser");
        assert_eq!(process_by_file_extension(&registry, ".gif"), "Photos");
        assert_eq!(process_by_file_extension(&registry, ".json"), "MonacoEditor");
        assert_eq!(process_by_file_extension(&registry, ".bin"), "");
    }
}
