//! ### 配置
//!
//! 从 `svn-scm.toml` 读取，文件不存在时使用默认值
//!
//! ```toml
//! [default]
//! encoding = "gbk"
//!
//! [conflict]
//! autoResolve = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::error::{AppError, AppResult};

pub const SETTINGS_FILE: &str = "svn-scm.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub default: DefaultSection,
    pub conflict: ConflictSection,
    pub svn: SvnSection,
    pub layout: BranchLayout,
    pub discovery: DiscoverySection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefaultSection {
    /// Encoding for non-XML svn output, e.g. `gbk`.
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConflictSection {
    /// Mark conflicts resolved without asking.
    pub auto_resolve: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SvnSection {
    pub path: Option<PathBuf>,
}

/// Where trunk and branches live, relative to the repository root.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BranchLayout {
    pub trunk: String,
    pub branches: String,
    pub tags: String,
}

impl Default for BranchLayout {
    fn default() -> Self {
        BranchLayout {
            trunk: "trunk".to_string(),
            branches: "branches".to_string(),
            tags: "tags".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoverySection {
    /// How many directory levels below the workspace folder to scan.
    pub depth: usize,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        DiscoverySection { depth: 1 }
    }
}

impl Settings {
    /// Reads `path`, or `svn-scm.toml` in `folder` when no path is given.
    pub fn load(path: Option<&Path>, folder: &Path) -> AppResult<Self> {
        let (file, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (folder.join(SETTINGS_FILE), false),
        };

        if !file.exists() {
            if explicit {
                return Err(AppError::Config(format!("{} does not exist", file.display())));
            }
            return Ok(Settings::default());
        }

        let text = std::fs::read_to_string(&file)?;
        Settings::parse(&text).map_err(|e| AppError::Config(format!("{}: {}", file.display(), e)))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.layout.branches, "branches");
        assert_eq!(settings.discovery.depth, 1);
        assert!(!settings.conflict.auto_resolve);
    }

    #[test]
    fn reads_dotted_keys() {
        let settings = Settings::parse(
            "[default]\nencoding = \"gbk\"\n[conflict]\nautoResolve = true\n[layout]\nbranches = \"dev\"\n",
        )
        .unwrap();
        assert_eq!(settings.default.encoding.as_deref(), Some("gbk"));
        assert!(settings.conflict.auto_resolve);
        assert_eq!(settings.layout.branches, "dev");
        assert_eq!(settings.layout.trunk, "trunk");
    }

    #[test]
    fn missing_default_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(None, dir.path()).unwrap(), Settings::default());
        assert!(matches!(
            Settings::load(Some(&dir.path().join("nope.toml")), dir.path()),
            Err(AppError::Config(_))
        ));
    }
}
