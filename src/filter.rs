use crate::constants::{SYSTEM_FILES, SYSTEM_PATHS};
use crate::vfs::join;

/// Predicate that hides bookkeeping files from a directory listing.
pub fn filter_system_files(directory: &str) -> impl Fn(&str) -> bool + '_ {
    move |file: &str| {
        let path = join(directory, file);
        !SYSTEM_PATHS.contains(&path.as_str()) && !SYSTEM_FILES.contains(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hides_descriptor_files_everywhere() {
        let keep = filter_system_files("/Users/Public/Music");
        assert!(!keep("desktop.ini"));
        assert!(keep("song.mp3"));
    }

    #[test]
    fn test_hides_system_paths_only_at_their_location() {
        let at_root = filter_system_files("/");
        assert!(!at_root(".index.json"));
        assert!(!at_root(".deletedFiles.log"));

        let nested = filter_system_files("/Users");
        assert!(nested(".index.json"));
    }

    #[test]
    fn test_filters_a_listing() {
        let names = ["desktop.ini", "a.txt", ".index.json", "b.png"];
        let visible: Vec<_> = names
            .into_iter()
            .filter(|name| filter_system_files("/")(*name))
            .collect();
        assert_eq!(visible, vec!["a.txt", "b.png"]);
    }
}
