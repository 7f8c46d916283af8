// src/steps/uncss.rs

use regex::Regex;
use tracing::{debug, info};

use crate::errors::{Result, SiteforgeError};
use crate::fs::walk_matching;
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};

/// Remove stylesheet selectors unused across the union of the sampled
/// documents.
///
/// The reduction itself is the analyzer collaborator's job; this step only
/// decides which sheets are analyzed. Sheets whose source path matches an
/// ignore pattern are passed through unmodified, so a selector living in an
/// ignored source always survives.
pub struct UncssStep;

impl BuildStep for UncssStep {
    fn kind(&self) -> StepKind {
        StepKind::Uncss
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.uncss;
        let build_root = ctx.build_root();

        let mut samples = Vec::with_capacity(opts.samples.len());
        for sample in &opts.samples {
            let path = ctx.src_path(sample);
            if !ctx.fs.is_file(&path) {
                return Err(SiteforgeError::MissingInput(format!(
                    "sampled document '{}' does not exist",
                    path.display()
                )));
            }
            samples.push(path);
        }

        let ignore: Vec<Regex> = opts
            .ignore
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| SiteforgeError::ConfigError(format!("invalid ignore pattern: {e}")))?;

        let set = build_globset(&opts.sources)?;
        let sheets = walk_matching(ctx.fs, &build_root, &|rel| set.is_match(rel))?;

        if sheets.is_empty() {
            return Err(SiteforgeError::MissingInput(format!(
                "no stylesheets matched {:?} under '{}'",
                opts.sources,
                build_root.display()
            )));
        }

        let mut reduced_parts = Vec::with_capacity(sheets.len());
        for sheet in &sheets {
            let rel = sheet
                .strip_prefix(&build_root)
                .expect("walk_matching yields paths under its root")
                .to_string_lossy()
                .replace('\\', "/");

            if ignore.iter().any(|re| re.is_match(&rel)) {
                debug!(sheet = %rel, "uncss: ignored source passed through");
                reduced_parts.push(ctx.fs.read_to_string(sheet)?);
                continue;
            }

            reduced_parts.push(ctx.tools.selector_analyzer.reduce(sheet, &samples)?);
        }

        let output = ctx.build_path(&opts.output);
        ctx.fs.write(&output, reduced_parts.join("\n").as_bytes())?;

        info!(
            sheets = sheets.len(),
            documents = samples.len(),
            output = %output.display(),
            "uncss: wrote reduced stylesheet"
        );
        Ok(StepOutcome::default())
    }
}
