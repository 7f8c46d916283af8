// src/steps/concat.rs

use std::path::PathBuf;

use tracing::info;

use crate::errors::{Result, SiteforgeError};
use crate::fs::walk_matching;
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};

/// Concatenate script files into one bundle.
///
/// Each `sources` entry contributes its files in declared order. A glob
/// entry expands to its matches sorted lexicographically, so the bundle is
/// reproducible regardless of filesystem enumeration order; listing files
/// explicitly pins an exact order.
pub struct ConcatStep;

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

impl BuildStep for ConcatStep {
    fn kind(&self) -> StepKind {
        StepKind::Concat
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.concat;
        let src_root = ctx.src_root();

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in &opts.sources {
            if is_glob(entry) {
                let set = build_globset(std::slice::from_ref(entry))?;
                files.extend(walk_matching(ctx.fs, &src_root, &|rel| set.is_match(rel))?);
            } else {
                let path = src_root.join(entry);
                if !ctx.fs.is_file(&path) {
                    return Err(SiteforgeError::MissingInput(format!(
                        "script '{}' does not exist",
                        path.display()
                    )));
                }
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(SiteforgeError::MissingInput(format!(
                "no scripts matched {:?} under '{}'",
                opts.sources,
                src_root.display()
            )));
        }

        let mut parts = Vec::with_capacity(files.len());
        for file in &files {
            parts.push(ctx.fs.read_to_string(file)?);
        }

        let separator = format!("{}\n", opts.separator);
        let bundle = parts.join(&separator);

        let output = ctx.build_path(&opts.output);
        ctx.fs.write(&output, bundle.as_bytes())?;

        info!(files = files.len(), output = %output.display(), "concat: wrote bundle");
        Ok(StepOutcome::default())
    }
}
