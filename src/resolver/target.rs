use crate::vfs::extname;
use url::Url;

/// Where a `.url` shortcut points.
#[derive(Debug, Clone, PartialEq)]
pub enum ShortcutTarget {
    /// A path inside the virtual filesystem.
    Path(String),
    /// An absolute URI handed to a process verbatim.
    Uri(Url),
}

impl ShortcutTarget {
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            // Single letter schemes are drive letters, not URIs.
            Ok(uri) if uri.scheme().len() > 1 => Self::Uri(uri),
            _ => Self::Path(raw.to_string()),
        }
    }

    /// Lowercased extension of the target, ignoring any query or fragment.
    pub fn extension(&self) -> String {
        match self {
            Self::Path(path) => extname(path).to_ascii_lowercase(),
            Self::Uri(uri) => extname(uri.path()).to_ascii_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_paths_are_paths() {
        let target = ShortcutTarget::parse("/Users/Public/Videos/clip.WEBM");
        assert_eq!(
            target,
            ShortcutTarget::Path("/Users/Public/Videos/clip.WEBM".to_string())
        );
        assert_eq!(target.extension(), ".webm");
    }

    #[test]
    fn test_uri_extension_ignores_query() {
        let target = ShortcutTarget::parse("https://example.com/media/cover.png?size=large#top");
        assert!(matches!(target, ShortcutTarget::Uri(_)));
        assert_eq!(target.extension(), ".png");
    }

    #[test]
    fn test_drive_letters_are_not_schemes() {
        let target = ShortcutTarget::parse("C:/Games/doom.jsdos");
        assert!(matches!(target, ShortcutTarget::Path(_)));
        assert_eq!(target.extension(), ".jsdos");
    }

    #[test]
    fn test_empty_target_has_no_extension() {
        assert_eq!(ShortcutTarget::parse("").extension(), "");
        assert_eq!(ShortcutTarget::parse("https://example.com").extension(), "");
    }
}
