// src/steps/copy.rs

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::walk_matching;
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};

/// Mirror hand-written plain stylesheets from the source tree into the
/// build tree.
pub struct CopyStep;

impl BuildStep for CopyStep {
    fn kind(&self) -> StepKind {
        StepKind::Copy
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.copy;
        let src_root = ctx.src_root();
        let dest_root = ctx.build_path(&opts.dest);

        let set = build_globset(&opts.sources)?;
        let sources = walk_matching(ctx.fs, &src_root, &|rel| set.is_match(rel))?;

        if sources.is_empty() {
            debug!("copy: no files matched");
            return Ok(StepOutcome::default());
        }

        for src in &sources {
            let name = src.file_name().expect("walk_matching yields files");
            ctx.fs.copy(src, &dest_root.join(name))?;
        }

        info!(files = sources.len(), dest = %dest_root.display(), "copy: mirrored stylesheets");
        Ok(StepOutcome::default())
    }
}
