// src/project.rs

//! Project metadata: a read-only, informational JSON file (`package.json`
//! style) whose name/version feed the bundle banner.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectMeta {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

impl ProjectMeta {
    /// Load metadata from `path`. A missing file yields empty metadata; a
    /// present but malformed file is a configuration-time error.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.is_file(path) {
            debug!(?path, "no project metadata file; banner will omit name/version");
            return Ok(Self::default());
        }

        let contents = fs.read_to_string(path)?;
        let meta: ProjectMeta = serde_json::from_str(&contents)?;
        Ok(meta)
    }

    /// Human label for the banner: `"name v1.2.3"`, either half optional.
    pub fn banner_label(&self) -> Option<String> {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => Some(format!("{name} v{version}")),
            (Some(name), None) => Some(name.clone()),
            (None, Some(version)) => Some(format!("v{version}")),
            (None, None) => None,
        }
    }
}
