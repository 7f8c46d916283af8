// src/steps/clean.rs

use tracing::{debug, info};

use crate::errors::{Result, SiteforgeError};
use crate::fs::walk_matching;
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};

/// Remove previously generated files before regenerating them.
///
/// Groups of destination-scoped globs come from `[steps.clean]`; a variant
/// selects one group (`clean:styles`), no variant cleans them all. Deleting
/// a path that does not exist is a no-op, and validation guarantees the
/// globs cannot reach outside the build root.
pub struct CleanStep;

impl BuildStep for CleanStep {
    fn kind(&self) -> StepKind {
        StepKind::Clean
    }

    fn run(&self, ctx: &StepContext<'_>, variant: Option<&str>) -> Result<StepOutcome> {
        let groups = &ctx.config.steps.clean.groups;

        let selected: Vec<(&str, &Vec<String>)> = match variant {
            Some(name) => {
                let (key, globs) = groups.get_key_value(name).ok_or_else(|| {
                    SiteforgeError::ConfigError(format!("unknown clean group '{name}'"))
                })?;
                vec![(key.as_str(), globs)]
            }
            None => groups.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        };

        let build_root = ctx.build_root();

        for (group, patterns) in selected {
            let set = build_globset(patterns)?;
            let matched = walk_matching(ctx.fs, &build_root, &|rel| set.is_match(rel))?;

            if matched.is_empty() {
                debug!(group = %group, "clean: nothing to remove");
                continue;
            }

            for path in &matched {
                ctx.fs.remove_file(path)?;
            }
            info!(group = %group, removed = matched.len(), "clean: removed stale outputs");
        }

        Ok(StepOutcome::default())
    }
}
