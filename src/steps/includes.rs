// src/steps/includes.rs

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::errors::{Result, SiteforgeError};
use crate::fs::{FileSystem, walk_matching};
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};

/// Directive form recognised inside templates and fragments:
/// `<!-- include "header.html" -->` on a line of its own.
static INCLUDE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<!--\s*include\s+"([^"]+)"\s*-->\s*$"#).expect("include directive pattern")
});

/// Expand fragment references in page templates into standalone documents.
///
/// Fragments may themselves include fragments to arbitrary depth; a
/// reference cycle fails the step naming the cycle path. With
/// `duplicates = false` a fragment already emitted into the current output
/// document is silently skipped on later references. Output is flattened
/// into the build root when `flatten = true`.
pub struct IncludesStep;

impl BuildStep for IncludesStep {
    fn kind(&self) -> StepKind {
        StepKind::Includes
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.includes;
        let html_root = ctx.root.join(ctx.paths().html_root());
        let include_root = ctx.root.join(ctx.paths().include_root());
        let build_root = ctx.build_root();

        let set = build_globset(&opts.sources)?;
        let templates = walk_matching(ctx.fs, &html_root, &|rel| set.is_match(rel))?;

        if templates.is_empty() {
            debug!("includes: no templates matched");
            return Ok(StepOutcome::default());
        }

        for template in &templates {
            let rel = template
                .strip_prefix(&html_root)
                .expect("walk_matching yields paths under its root");

            let label = rel.to_string_lossy().replace('\\', "/");
            let text = ctx.fs.read_to_string(template)?;

            let mut emitted = HashSet::new();
            let mut stack = Vec::new();
            let expanded = expand(
                ctx.fs,
                &include_root,
                &label,
                &text,
                opts.duplicates,
                &mut emitted,
                &mut stack,
            )?;

            let out_path = if opts.flatten {
                build_root.join(rel.file_name().expect("template paths are files"))
            } else {
                build_root.join(rel)
            };
            ctx.fs.write(&out_path, expanded.as_bytes())?;
        }

        info!(templates = templates.len(), "includes: expanded page templates");
        Ok(StepOutcome::default())
    }
}

/// Recursively expand one document.
///
/// `emitted` spans the whole output document so duplicate suppression works
/// across nesting levels; `stack` tracks the active include chain for cycle
/// detection.
fn expand(
    fs: &dyn FileSystem,
    include_root: &Path,
    referrer: &str,
    text: &str,
    allow_duplicates: bool,
    emitted: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());

    for line in text.lines() {
        let Some(caps) = INCLUDE_DIRECTIVE.captures(line) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let fragment = caps.get(1).expect("directive capture").as_str();

        if !allow_duplicates && emitted.contains(fragment) {
            debug!(fragment, referrer, "includes: suppressing duplicate fragment");
            continue;
        }

        if stack.iter().any(|s| s == fragment) {
            let mut chain = stack.clone();
            chain.push(fragment.to_string());
            return Err(SiteforgeError::ConfigError(format!(
                "include cycle: {}",
                chain.join(" -> ")
            )));
        }

        let fragment_path = include_root.join(fragment);
        if !fs.is_file(&fragment_path) {
            return Err(SiteforgeError::MissingInput(format!(
                "template '{referrer}' references missing fragment '{fragment}'"
            )));
        }

        emitted.insert(fragment.to_string());

        let fragment_text = fs.read_to_string(&fragment_path)?;
        stack.push(fragment.to_string());
        let expanded = expand(
            fs,
            include_root,
            fragment,
            &fragment_text,
            allow_duplicates,
            emitted,
            stack,
        )?;
        stack.pop();

        out.push_str(&expanded);
    }

    Ok(out)
}
