#![cfg(test)]

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CacheEnvGuard {
    original: Option<OsString>,
}

impl CacheEnvGuard {
    const KEY: &'static str = crate::cache::CACHE_PATH_ENV;

    pub fn set(path: &Path) -> Self {
        let original = env::var_os(Self::KEY);
        env::set_var(Self::KEY, path);
        Self { original }
    }
}

impl Drop for CacheEnvGuard {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            env::set_var(Self::KEY, original);
        } else {
            env::remove_var(Self::KEY);
        }
    }
}

pub struct ConfigEnvGuard {
    original: Option<OsString>,
}

impl ConfigEnvGuard {
    const KEY: &'static str = "XDG_CONFIG_HOME";

    pub fn set(path: &Path) -> Self {
        let original = env::var_os(Self::KEY);
        env::set_var(Self::KEY, path);
        Self { original }
    }
}

impl Drop for ConfigEnvGuard {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            env::set_var(Self::KEY, original);
        } else {
            env::remove_var(Self::KEY);
        }
    }
}

/// Writes `content` to `root/relative`, creating parent directories.
pub fn write_fixture(root: &Path, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let file_path = root.join(relative.trim_start_matches('/'));
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(&file_path, content).expect("failed to write fixture");
    file_path
}
