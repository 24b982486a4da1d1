pub const ICON_ROOT: &str = "/System/Icons";
pub const FOLDER_ICON: &str = "/System/Icons/folder.png";
pub const UNKNOWN_ICON: &str = "/System/Icons/unknown.png";
pub const PHOTO_ICON: &str = "/System/Icons/photo.png";

pub const FILE_EXPLORER_PID: &str = "FileExplorer";
pub const EDITOR_PID: &str = "MonacoEditor";
pub const PHOTOS_PID: &str = "Photos";
pub const VIDEO_PLAYER_PID: &str = "VideoPlayer";

pub const DESKTOP_INI: &str = "desktop.ini";
pub const SHORTCUT_EXTENSION: &str = ".url";
pub const MP3_EXTENSION: &str = ".mp3";

/// Offset into a video where the preview frame is taken.
pub const PREVIEW_FRAME_SECOND: f64 = 3.0;

pub const IMAGE_FILE_EXTENSIONS: &[&str] = &[
    ".apng", ".avif", ".bmp", ".cur", ".gif", ".ico", ".jfif", ".jif", ".jpe", ".jpeg", ".jpg",
    ".pjp", ".pjpeg", ".png", ".svg", ".tif", ".tiff", ".webp", ".xbm",
];

pub const VIDEO_FILE_EXTENSIONS: &[&str] =
    &[".m4v", ".mkv", ".mov", ".mp4", ".ogm", ".ogv", ".webm"];

pub const SYSTEM_FILES: &[&str] = &[DESKTOP_INI];

pub const SYSTEM_PATHS: &[&str] = &["/.index.json", "/.deletedFiles.log"];

pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_FILE_EXTENSIONS.contains(&extension)
}

pub fn is_video_extension(extension: &str) -> bool {
    VIDEO_FILE_EXTENSIONS.contains(&extension)
}

/// Builds the path of a bundled system icon from its short name.
pub fn system_icon(name: &str) -> String {
    format!("{ICON_ROOT}/{name}.png")
}
