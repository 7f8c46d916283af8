// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::ConfigFile;

/// Compiled glob patterns for a single watch binding.
///
/// Patterns are relative to the project root; the dispatcher passes
/// relative paths (e.g. `"src/less/main.less"`) into `matches`.
#[derive(Clone)]
pub struct BindingProfile {
    name: String,
    pipeline: Option<String>,
    reload: bool,
    files: GlobSet,
}

impl fmt::Debug for BindingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingProfile")
            .field("name", &self.name)
            .field("pipeline", &self.pipeline)
            .field("reload", &self.reload)
            .finish_non_exhaustive()
    }
}

impl BindingProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pipeline this binding dispatches, `None` for the reload binding.
    pub fn pipeline(&self) -> Option<&str> {
        self.pipeline.as_deref()
    }

    /// Whether a match restarts the whole watch session.
    pub fn reload(&self) -> bool {
        self.reload
    }

    /// Returns true if this binding is interested in the given path
    /// (relative to the project root, `/`-separated).
    pub fn matches(&self, rel_path: &str) -> bool {
        self.files.is_match(rel_path)
    }
}

/// Compile a profile per `[watch.<name>]` binding, in binding-name order.
pub fn build_binding_profiles(cfg: &ConfigFile) -> Result<Vec<BindingProfile>> {
    let mut profiles = Vec::with_capacity(cfg.watch.len());

    for (name, binding) in cfg.watch.iter() {
        let files = build_globset(&binding.files)
            .with_context(|| format!("building globset for watch binding {name}"))?;

        profiles.push(BindingProfile {
            name: name.clone(),
            pipeline: binding.pipeline.clone(),
            reload: binding.reload,
            files,
        });
    }

    Ok(profiles)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
