use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{
    config::{Dependency, DependencyConfig},
    Result, TypewriterError,
};

/// Makes one external animation library available. Loaders are shared
/// between the threads of a bootstrap stage.
pub trait DependencyLoader: Sync {
    fn load(&self, dependency: &Dependency) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Bundled,
    Unavailable,
}

/// Registry of libraries shipped with the application.
#[derive(Debug, Default, Clone)]
pub struct AssetCatalog {
    libraries: HashMap<String, Availability>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self {
            libraries: HashMap::new(),
        }
    }

    /// A catalog holding every library the load plan names.
    pub fn bundled(dependencies: &DependencyConfig) -> Self {
        let mut catalog = Self::new();
        for dependency in dependencies.all() {
            catalog.register(&dependency.name);
        }
        catalog
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.libraries.insert(name.into(), Availability::Bundled);
    }

    pub fn mark_unavailable(&mut self, name: impl Into<String>) {
        self.libraries.insert(name.into(), Availability::Unavailable);
    }

    pub fn availability(&self, name: &str) -> Option<Availability> {
        self.libraries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl DependencyLoader for AssetCatalog {
    fn load(&self, dependency: &Dependency) -> Result<()> {
        match self.availability(&dependency.name) {
            Some(Availability::Bundled) => Ok(()),
            Some(Availability::Unavailable) => Err(load_error(dependency, "marked unavailable")),
            None => Err(load_error(dependency, "not bundled")),
        }
    }
}

/// Resolves each library to `<root>/<last url segment>`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, dependency: &Dependency) -> Result<PathBuf> {
        let url = dependency
            .url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        match url.rsplit('/').next() {
            Some(file) if !file.is_empty() => Ok(self.root.join(file)),
            _ => Err(load_error(dependency, "url has no file name")),
        }
    }
}

impl DependencyLoader for DirectoryLoader {
    fn load(&self, dependency: &Dependency) -> Result<()> {
        let path = self.path_for(dependency)?;
        let metadata = std::fs::metadata(&path)
            .map_err(|err| load_error(dependency, format!("{}: {err}", path.display())))?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(load_error(
                dependency,
                format!("{} is empty or not a file", path.display()),
            ));
        }
        tracing::debug!(name = %dependency.name, path = %path.display(), "library resolved");
        Ok(())
    }
}

fn load_error(dependency: &Dependency, reason: impl Into<String>) -> TypewriterError {
    TypewriterError::DependencyLoad {
        name: dependency.name.clone(),
        url: dependency.url.clone(),
        reason: reason.into(),
    }
}
