use crate::cache::{cache_path, FileSystemCache, PreviewCache};
use crate::cli::GlobalArgs;
use crate::config::Config;
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::vfs::HostFileSystem;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::env;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CommandContext {
    global: GlobalArgs,
    config: Config,
}

impl CommandContext {
    pub fn new(global: GlobalArgs) -> Self {
        let config = Config::load(global.config.clone());
        Self { global, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.global.config.clone().unwrap_or_else(Config::config_path)
    }

    /// Host directory mounted as `/`: the flag, then the config, then the working directory.
    pub fn root(&self) -> Result<PathBuf> {
        if let Some(root) = self.global.root.clone().or_else(|| self.config.root.clone()) {
            return Ok(root);
        }
        env::current_dir().context("Failed to determine working directory")
    }

    pub fn filesystem(&self) -> Result<HostFileSystem> {
        let root = self.root()?;
        if !root.is_dir() {
            anyhow::bail!("Root {} is not a directory", root.display());
        }
        debug!("Mounting {} as /", root.display());
        Ok(HostFileSystem::new(root))
    }

    pub fn registry(&self) -> Registry {
        self.config.registry()
    }

    pub fn resolver<'a>(&self, fs: &'a HostFileSystem, registry: &'a Registry) -> Resolver<'a> {
        let resolver = Resolver::new(fs, registry).with_settings(self.config.preview_settings());

        if self.global.no_cache {
            return resolver;
        }

        let mut cache = FileSystemCache::new(cache_path());
        if let Err(e) = cache.load() {
            warn!("Ignoring preview cache: {e:#}");
            cache.clear();
        }
        resolver.with_cache(Box::new(cache))
    }

    /// Persists whatever previews the resolver cached.
    pub fn finish(&self, resolver: Resolver<'_>) -> Result<()> {
        if let Some(cache) = resolver.into_cache() {
            cache.save()?;
        }
        Ok(())
    }
}
