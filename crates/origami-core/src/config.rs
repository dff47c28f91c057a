//! Configuration for the rewrite pipeline
//!
//! Loaded from `origami.toml`, discovered by walking up from the working
//! directory when no explicit path is given. Everything has a default, so a
//! missing file is not an error.
//!
//! ```toml
//! [files]
//! include = ["**/*.mdx", "**/*.jsx"]
//! exclude = ["**/node_modules/**"]
//!
//! [transform]
//! guard-callee = "_missingMdxReference"
//! sourcemaps = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{OrigamiError, Result};

/// Name of the configuration file searched for during discovery
pub const CONFIG_FILE_NAME: &str = "origami.toml";

/// Runtime identifier whose existence-check calls the engine neutralizes
pub const DEFAULT_GUARD_CALLEE: &str = "_missingMdxReference";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub files: FilesConfig,
    pub transform: TransformConfig,
}

/// Which documents are offered to the engine at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilesConfig {
    /// Glob patterns for files to transform
    pub include: Vec<String>,
    /// Glob patterns for files to skip
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.mdx".to_string(), "**/*.jsx".to_string()],
            exclude: Vec::new(),
        }
    }
}

/// Engine knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TransformConfig {
    /// Callee name of the per-tag existence check inserted by the upstream
    /// document compiler
    pub guard_callee: String,
    /// Whether `transform` emits `.map` files next to rewritten output
    pub sourcemaps: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            guard_callee: DEFAULT_GUARD_CALLEE.to_string(),
            sourcemaps: true,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| OrigamiError::io(path, e))?;
        toml::from_str(&content).map_err(|e| {
            OrigamiError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Search for `origami.toml` from `start` upward; `Ok(None)` when no
    /// config file exists anywhere up the tree
    pub fn discover(start: &Path) -> Result<Option<(PathBuf, Self)>> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }
            dir = current.parent();
        }
        Ok(None)
    }

    /// Load from `path` when given, otherwise discover upward from `cwd`,
    /// otherwise defaults
    pub fn resolve(path: Option<&Path>, cwd: &Path) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::discover(cwd)?.map(|(_, c)| c).unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_pipeline() {
        let config = Config::default();
        assert_eq!(config.files.include, vec!["**/*.mdx", "**/*.jsx"]);
        assert!(config.files.exclude.is_empty());
        assert_eq!(config.transform.guard_callee, DEFAULT_GUARD_CALLEE);
        assert!(config.transform.sourcemaps);
    }

    #[test]
    fn parses_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [files]
            include = ["docs/**/*.mdx"]
            "#,
        )
        .expect("parse");
        assert_eq!(config.files.include, vec!["docs/**/*.mdx"]);
        assert_eq!(config.transform.guard_callee, DEFAULT_GUARD_CALLEE);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: std::result::Result<Config, _> = toml::from_str("[linter]\nenabled = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn discovers_upward() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[transform]\nsourcemaps = false\n",
        )
        .expect("write");

        let (path, config) = Config::discover(&nested)
            .expect("discover")
            .expect("found");
        assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));
        assert!(!config.transform.sourcemaps);
    }

    #[test]
    fn missing_config_resolves_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::resolve(None, dir.path()).expect("resolve");
        assert_eq!(config, Config::default());
    }
}
