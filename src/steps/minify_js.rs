// src/steps/minify_js.rs

use chrono::Local;
use tracing::info;

use crate::errors::{Result, SiteforgeError};
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome};

/// Minify the concatenated bundle and prepend the build-metadata banner.
///
/// The banner's generation timestamp is the one documented exception to
/// byte-for-byte reproducible builds.
pub struct MinifyJsStep;

impl BuildStep for MinifyJsStep {
    fn kind(&self) -> StepKind {
        StepKind::MinifyJs
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.minify_js;

        let input = ctx.build_path(&opts.input);
        if !ctx.fs.is_file(&input) {
            return Err(SiteforgeError::MissingInput(format!(
                "bundle '{}' does not exist; run concat first",
                input.display()
            )));
        }

        let source = ctx.fs.read_to_string(&input)?;
        let minified = ctx.tools.script_minifier.minify(&source)?;

        let contents = if opts.banner {
            format!("{}{}", banner(ctx), minified)
        } else {
            minified
        };

        let output = ctx.build_path(&opts.output);
        ctx.fs.write(&output, contents.as_bytes())?;

        info!(output = %output.display(), "minify_js: wrote minified bundle");
        Ok(StepOutcome::default())
    }
}

fn banner(ctx: &StepContext<'_>) -> String {
    let stamp = Local::now().format("%d-%m-%Y %H:%M");
    match ctx.project.banner_label() {
        Some(label) => format!("/*! {label} {stamp} */\n"),
        None => format!("/*! {stamp} */\n"),
    }
}
