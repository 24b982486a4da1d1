use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Whether the entry is a directory, following symlinks.
    pub is_dir: bool,
    /// Whether the entry itself is a symlink.
    pub is_symlink: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Read access to the explorer's virtual filesystem.
///
/// Paths are absolute, `/`-separated virtual paths regardless of the host
/// platform.
pub trait FileSystem {
    /// Read the whole contents of a file
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Look up the metadata of a file or directory
    fn stat(&self, path: &str) -> Result<Metadata>;

    /// List the entry names of a directory
    fn read_dir(&self, path: &str) -> Result<Vec<String>>;

    /// Location of the entry on the host, when the filesystem is backed by one
    fn host_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }
}

/// Joins virtual path segments and normalizes `.` and `..` components.
pub fn join(directory: &str, name: &str) -> String {
    let absolute = directory.starts_with('/') || (directory.is_empty() && name.starts_with('/'));
    let mut parts: Vec<&str> = Vec::new();

    for part in directory.split('/').chain(name.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() && !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

pub fn basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Extension of the last path segment including the leading dot.
///
/// Dot files such as `.profile` have no extension; a trailing dot yields `"."`.
pub fn extname(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(index) => &name[index..],
    }
}

/// Host directory exposed as the root of the virtual filesystem.
#[derive(Debug, Clone)]
pub struct HostFileSystem {
    root: PathBuf,
}

impl HostFileSystem {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            anyhow::bail!("Path escapes the filesystem root: {path}");
        }
        Ok(self.root.join(relative))
    }
}

impl FileSystem for HostFileSystem {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let host = self.resolve(path)?;
        fs::read(&host).with_context(|| format!("Failed to read file: {}", host.display()))
    }

    fn stat(&self, path: &str) -> Result<Metadata> {
        let host = self.resolve(path)?;
        let metadata = fs::metadata(&host)
            .with_context(|| format!("Failed to stat: {}", host.display()))?;

        let is_symlink = fs::symlink_metadata(&host)
            .map(|link| link.file_type().is_symlink())
            .unwrap_or(false);

        Ok(Metadata {
            is_dir: metadata.is_dir(),
            is_symlink,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        let host = self.resolve(path)?;
        let mut names = Vec::new();

        for entry in fs::read_dir(&host)
            .with_context(|| format!("Failed to read directory: {}", host.display()))?
        {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }

    fn host_path(&self, path: &str) -> Option<PathBuf> {
        self.resolve(path).ok()
    }
}

#[derive(Debug, Clone)]
enum Node {
    File {
        contents: Vec<u8>,
        modified: SystemTime,
    },
    Directory,
}

/// Filesystem held entirely in memory.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    nodes: BTreeMap<String, Node>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(not(test), allow(dead_code))]
impl MemoryFileSystem {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Directory);
        Self { nodes }
    }

    pub fn insert_file(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        let path = join("/", path);
        self.insert_parents(&path);
        self.nodes.insert(
            path,
            Node::File {
                contents: contents.into(),
                modified: SystemTime::now(),
            },
        );
    }

    pub fn insert_dir(&mut self, path: &str) {
        let path = join("/", path);
        self.insert_parents(&path);
        self.nodes.insert(path, Node::Directory);
    }

    fn insert_parents(&mut self, path: &str) {
        let mut parent = join(path, "..");
        while parent != "/" {
            self.nodes.entry(parent.clone()).or_insert(Node::Directory);
            parent = join(&parent, "..");
        }
    }

    fn node(&self, path: &str) -> Result<&Node> {
        self.nodes
            .get(&join("/", path))
            .ok_or_else(|| anyhow::anyhow!("No such file or directory: {path}"))
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        match self.node(path)? {
            Node::File { contents, .. } => Ok(contents.clone()),
            Node::Directory => anyhow::bail!("Is a directory: {path}"),
        }
    }

    fn stat(&self, path: &str) -> Result<Metadata> {
        Ok(match self.node(path)? {
            Node::File { contents, modified } => Metadata {
                is_dir: false,
                is_symlink: false,
                len: contents.len() as u64,
                modified: Some(*modified),
            },
            Node::Directory => Metadata {
                is_dir: true,
                is_symlink: false,
                len: 0,
                modified: None,
            },
        })
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        let directory = join("/", path);
        if !matches!(self.node(&directory)?, Node::Directory) {
            anyhow::bail!("Not a directory: {path}");
        }

        Ok(self
            .nodes
            .keys()
            .filter(|candidate| candidate.as_str() != "/" && join(candidate, "..") == directory)
            .map(|candidate| basename(candidate).to_string())
            .collect())
    }
}
