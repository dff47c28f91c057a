//! File discovery for the transform pipeline
//!
//! Walks a root directory and applies the configured include/exclude glob
//! patterns. This is the gate that decides which documents are offered to
//! the engine at all; the engine itself never touches the filesystem.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::Config;
use crate::{OrigamiError, Result};

/// Trait for file discovery functionality
pub trait FileDiscovery {
    /// Discover files matching the configuration patterns
    fn discover_files(&self, config: &Config) -> Result<Vec<PathBuf>>;

    /// Check whether a single file passes the include/exclude gate
    fn should_include(&self, path: &Path, config: &Config) -> bool;
}

/// Default implementation of file discovery
#[derive(Debug, Clone)]
pub struct DefaultFileDiscovery {
    root: PathBuf,
}

impl DefaultFileDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
        patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| OrigamiError::config(format!("invalid glob pattern `{p}`: {e}")))
            })
            .collect()
    }

    /// Path relative to the discovery root, with forward slashes, for
    /// pattern matching
    fn relative_key(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }

    fn matches(&self, path: &Path, include: &[Pattern], exclude: &[Pattern]) -> bool {
        let key = self.relative_key(path);
        include.iter().any(|p| p.matches(&key)) && !exclude.iter().any(|p| p.matches(&key))
    }
}

impl FileDiscovery for DefaultFileDiscovery {
    fn discover_files(&self, config: &Config) -> Result<Vec<PathBuf>> {
        let include = Self::compile(&config.files.include)?;
        let exclude = Self::compile(&config.files.exclude)?;

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            // prune noise directories outright
            !(entry.file_type().is_dir()
                && (name.starts_with('.') && name.len() > 1
                    || name == "node_modules"
                    || name == "target"))
        });

        for entry in walker {
            let entry = entry.map_err(|e| {
                OrigamiError::config(format!("walking {}: {e}", self.root.display()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if self.matches(entry.path(), &include, &exclude) {
                files.push(entry.path().to_path_buf());
            }
        }

        files.sort();
        debug!(count = files.len(), root = %self.root.display(), "discovered files");
        Ok(files)
    }

    fn should_include(&self, path: &Path, config: &Config) -> bool {
        let include = match Self::compile(&config.files.include) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let exclude = match Self::compile(&config.files.exclude) {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.matches(path, &include, &exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, "").expect("write");
    }

    #[test]
    fn discovers_included_files_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(&dir.path().join("docs/a.mdx"));
        touch(&dir.path().join("src/b.jsx"));
        touch(&dir.path().join("src/c.js"));
        touch(&dir.path().join("node_modules/pkg/d.mdx"));

        let discovery = DefaultFileDiscovery::new(dir.path());
        let files = discovery
            .discover_files(&Config::default())
            .expect("discover");
        let names: Vec<String> = files
            .iter()
            .map(|p| discovery.relative_key(p))
            .collect();
        assert_eq!(names, vec!["docs/a.mdx", "src/b.jsx"]);
    }

    #[test]
    fn exclude_patterns_win() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(&dir.path().join("docs/a.mdx"));
        touch(&dir.path().join("docs/generated/b.mdx"));

        let mut config = Config::default();
        config.files.exclude = vec!["docs/generated/**".to_string()];

        let discovery = DefaultFileDiscovery::new(dir.path());
        let files = discovery.discover_files(&config).expect("discover");
        assert_eq!(files.len(), 1);
        assert!(discovery.should_include(&dir.path().join("docs/a.mdx"), &config));
        assert!(!discovery.should_include(&dir.path().join("docs/generated/b.mdx"), &config));
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::default();
        config.files.include = vec!["[".to_string()];
        let discovery = DefaultFileDiscovery::new(dir.path());
        assert!(discovery.discover_files(&config).is_err());
    }
}
