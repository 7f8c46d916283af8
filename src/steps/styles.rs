// src/steps/styles.rs

use tracing::info;

use crate::errors::{Result, SiteforgeError};
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome};

/// The stylesheet pipeline: compile the structured entry stylesheet, apply
/// vendor prefixes for the configured browser matrix, then minify.
///
/// One entry file in, one compiled file out; transitive imports are the
/// compiler's concern. A syntax error surfaces the compiler's own file/line
/// diagnostics.
pub struct StylesStep;

impl BuildStep for StylesStep {
    fn kind(&self) -> StepKind {
        StepKind::Styles
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.styles;

        let entry = ctx.src_path(&opts.entry);
        if !ctx.fs.is_file(&entry) {
            return Err(SiteforgeError::MissingInput(format!(
                "style entry '{}' does not exist",
                entry.display()
            )));
        }

        let compiled = ctx.tools.style_compiler.compile(&entry)?;
        let prefixed = ctx.tools.prefixer.prefix(&compiled, &opts.browsers)?;
        let minified = ctx
            .tools
            .css_minifier
            .minify(&prefixed, opts.keep_special_comments)?;

        let output = ctx.build_path(&opts.output);
        ctx.fs.write(&output, minified.as_bytes())?;

        info!(
            entry = %entry.display(),
            output = %output.display(),
            "styles: compiled, prefixed and minified"
        );
        Ok(StepOutcome::default())
    }
}
