// src/steps/mod.rs

//! Build step definitions.
//!
//! Every step implements the [`BuildStep`] capability trait and is looked up
//! through the statically enumerated [`step_impl`] registry; there is no
//! dynamic task discovery. Steps are stateless: everything they need comes
//! in through the [`StepContext`].

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::{ConfigFile, Paths};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::project::ProjectMeta;
use crate::tools::{LintViolation, ToolSet};

pub mod clean;
pub mod concat;
pub mod copy;
pub mod images;
pub mod includes;
pub mod lint;
pub mod minify_js;
pub mod rewrite;
pub mod styles;
pub mod uncss;

pub use clean::CleanStep;
pub use concat::ConcatStep;
pub use copy::CopyStep;
pub use images::ImagesStep;
pub use includes::IncludesStep;
pub use lint::LintStep;
pub use minify_js::MinifyJsStep;
pub use rewrite::RewriteStep;
pub use styles::StylesStep;
pub use uncss::UncssStep;

/// The fixed set of step families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Clean,
    Includes,
    Rewrite,
    Styles,
    Copy,
    Uncss,
    Lint,
    Concat,
    MinifyJs,
    Images,
}

impl StepKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "clean" => Some(StepKind::Clean),
            "includes" => Some(StepKind::Includes),
            "rewrite" => Some(StepKind::Rewrite),
            "styles" => Some(StepKind::Styles),
            "copy" => Some(StepKind::Copy),
            "uncss" => Some(StepKind::Uncss),
            "lint" => Some(StepKind::Lint),
            "concat" => Some(StepKind::Concat),
            "minify_js" => Some(StepKind::MinifyJs),
            "images" => Some(StepKind::Images),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Clean => "clean",
            StepKind::Includes => "includes",
            StepKind::Rewrite => "rewrite",
            StepKind::Styles => "styles",
            StepKind::Copy => "copy",
            StepKind::Uncss => "uncss",
            StepKind::Lint => "lint",
            StepKind::Concat => "concat",
            StepKind::MinifyJs => "minify_js",
            StepKind::Images => "images",
        }
    }

    pub fn all() -> &'static [StepKind] {
        &[
            StepKind::Clean,
            StepKind::Includes,
            StepKind::Rewrite,
            StepKind::Styles,
            StepKind::Copy,
            StepKind::Uncss,
            StepKind::Lint,
            StepKind::Concat,
            StepKind::MinifyJs,
            StepKind::Images,
        ]
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed step reference from a pipeline entry, e.g. `"clean:styles"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRef {
    pub kind: StepKind,
    pub variant: Option<String>,
}

impl StepRef {
    /// Parse `"name"` or `"name:variant"`. Returns `None` when the name is
    /// not a known step kind (it may still be a pipeline alias).
    pub fn parse(entry: &str) -> Option<Self> {
        let (name, variant) = match entry.split_once(':') {
            Some((name, variant)) => (name, Some(variant.to_string())),
            None => (entry, None),
        };
        StepKind::parse(name).map(|kind| StepRef { kind, variant })
    }
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{}:{}", self.kind.name(), variant),
            None => f.write_str(self.kind.name()),
        }
    }
}

/// Everything a step needs to run. Borrowed from the composer per
/// invocation; steps hold no state of their own.
pub struct StepContext<'a> {
    pub config: &'a ConfigFile,
    pub fs: &'a dyn FileSystem,
    pub tools: &'a ToolSet,
    pub project: &'a ProjectMeta,
    /// Project root (the config file's directory); all configured relative
    /// paths resolve against it.
    pub root: &'a Path,
}

impl StepContext<'_> {
    pub fn paths(&self) -> &Paths {
        &self.config.paths
    }

    pub fn src_root(&self) -> PathBuf {
        self.root.join(&self.config.paths.src_root)
    }

    pub fn build_root(&self) -> PathBuf {
        self.root.join(&self.config.paths.build_root)
    }

    pub fn src_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.src_root().join(rel)
    }

    pub fn build_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.build_root().join(rel)
    }
}

/// What a step produced beyond its file outputs. Lint findings accumulate
/// in the pipeline report instead of failing the run.
#[derive(Debug, Default)]
pub struct StepOutcome {
    pub lint: Vec<LintViolation>,
}

/// Capability interface implemented by every step family.
pub trait BuildStep: Sync {
    fn kind(&self) -> StepKind;

    fn run(&self, ctx: &StepContext<'_>, variant: Option<&str>) -> Result<StepOutcome>;
}

/// Static registry mapping step kinds to their implementations.
pub fn step_impl(kind: StepKind) -> &'static dyn BuildStep {
    match kind {
        StepKind::Clean => &CleanStep,
        StepKind::Includes => &IncludesStep,
        StepKind::Rewrite => &RewriteStep,
        StepKind::Styles => &StylesStep,
        StepKind::Copy => &CopyStep,
        StepKind::Uncss => &UncssStep,
        StepKind::Lint => &LintStep,
        StepKind::Concat => &ConcatStep,
        StepKind::MinifyJs => &MinifyJsStep,
        StepKind::Images => &ImagesStep,
    }
}

/// Build a GlobSet from simple string patterns.
pub(crate) fn build_globset(patterns: &[String]) -> AnyResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
