// src/steps/lint.rs

use tracing::{info, warn};

use crate::errors::{Result, SiteforgeError};
use crate::fs::walk_matching;
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};

/// Statically check script sources without modifying them.
///
/// `lint:sources` (the default) checks the raw script files; `lint:bundle`
/// checks the concatenated output, catching what bundling introduced.
/// Violations go into the pipeline report, not into an error; escalation to
/// a failing exit status is the CLI's decision in non-interactive runs.
pub struct LintStep;

impl BuildStep for LintStep {
    fn kind(&self) -> StepKind {
        StepKind::Lint
    }

    fn run(&self, ctx: &StepContext<'_>, variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.lint;

        let files = match variant.unwrap_or("sources") {
            "sources" => {
                let set = build_globset(&ctx.config.steps.concat.sources)?;
                walk_matching(ctx.fs, &ctx.src_root(), &|rel| set.is_match(rel))?
            }
            "bundle" => {
                let bundle = ctx.build_path(&ctx.config.steps.concat.output);
                if !ctx.fs.is_file(&bundle) {
                    return Err(SiteforgeError::MissingInput(format!(
                        "bundle '{}' does not exist; run concat first",
                        bundle.display()
                    )));
                }
                vec![bundle]
            }
            other => {
                return Err(SiteforgeError::ConfigError(format!(
                    "unknown lint variant '{other}' (expected 'sources' or 'bundle')"
                )));
            }
        };

        let mut outcome = StepOutcome::default();
        for file in &files {
            let violations = ctx.tools.script_linter.lint(file, opts)?;
            for violation in &violations {
                warn!(%violation, "lint violation");
            }
            outcome.lint.extend(violations);
        }

        info!(
            files = files.len(),
            violations = outcome.lint.len(),
            "lint: checked scripts"
        );
        Ok(outcome)
    }
}
