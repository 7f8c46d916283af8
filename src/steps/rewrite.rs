// src/steps/rewrite.rs

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::walk_matching;
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};

/// Rewrite asset path prefixes in built documents so they resolve from the
/// deployed layout.
///
/// Operates in place on documents under the build root. Validation rejects
/// rules whose replacement still contains the pattern, so a second run
/// finds nothing left to rewrite.
pub struct RewriteStep;

impl BuildStep for RewriteStep {
    fn kind(&self) -> StepKind {
        StepKind::Rewrite
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.rewrite;
        let build_root = ctx.build_root();

        let set = build_globset(&opts.sources)?;
        let documents = walk_matching(ctx.fs, &build_root, &|rel| set.is_match(rel))?;

        let mut touched = 0usize;
        for doc in &documents {
            let original = ctx.fs.read_to_string(doc)?;

            let mut rewritten = original.clone();
            for rule in &opts.rules {
                rewritten = rewritten.replace(&rule.from, &rule.to);
            }

            if rewritten != original {
                ctx.fs.write(doc, rewritten.as_bytes())?;
                touched += 1;
            } else {
                debug!(?doc, "rewrite: document already in deployed form");
            }
        }

        info!(
            documents = documents.len(),
            rewritten = touched,
            "rewrite: adjusted asset paths"
        );
        Ok(StepOutcome::default())
    }
}
