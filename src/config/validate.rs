// src/config/validate.rs

use std::path::{Component, Path};

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SiteforgeError};
use crate::steps::{StepKind, StepRef};

/// Reserved pipeline entry that switches the session into watch mode.
pub const WATCH_ENTRY: &str = "watch";

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SiteforgeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_pipelines(cfg)?;
    validate_roots(cfg)?;
    validate_pipeline_names(cfg)?;
    validate_alias_graph(cfg)?;
    validate_pipeline_entries(cfg)?;
    validate_watch_bindings(cfg)?;
    validate_step_options(cfg)?;
    Ok(())
}

fn ensure_has_pipelines(cfg: &RawConfigFile) -> Result<()> {
    if cfg.pipelines.is_empty() {
        return Err(SiteforgeError::ConfigError(
            "config must define at least one [pipelines] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_roots(cfg: &RawConfigFile) -> Result<()> {
    for (label, root) in [
        ("paths.src_root", &cfg.paths.src_root),
        ("paths.build_root", &cfg.paths.build_root),
    ] {
        if root.is_absolute() {
            return Err(SiteforgeError::ConfigError(format!(
                "{label} must be relative to the project root (got '{}')",
                root.display()
            )));
        }
    }

    if cfg.paths.src_root == cfg.paths.build_root {
        return Err(SiteforgeError::ConfigError(
            "paths.src_root and paths.build_root must differ".to_string(),
        ));
    }
    Ok(())
}

fn validate_pipeline_names(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.pipelines.keys() {
        if name == WATCH_ENTRY {
            return Err(SiteforgeError::ConfigError(format!(
                "pipeline name '{name}' is reserved"
            )));
        }
        if StepKind::parse(name).is_some() {
            return Err(SiteforgeError::ConfigError(format!(
                "pipeline name '{name}' collides with a step name"
            )));
        }
    }
    Ok(())
}

fn validate_pipeline_entries(cfg: &RawConfigFile) -> Result<()> {
    for (name, entries) in cfg.pipelines.iter() {
        if entries.is_empty() {
            return Err(SiteforgeError::ConfigError(format!(
                "pipeline '{name}' is empty"
            )));
        }

        for (idx, entry) in entries.iter().enumerate() {
            if entry == WATCH_ENTRY {
                if idx + 1 != entries.len() {
                    return Err(SiteforgeError::ConfigError(format!(
                        "pipeline '{name}': '{WATCH_ENTRY}' must be the last entry"
                    )));
                }
                continue;
            }

            if let Some(step) = StepRef::parse(entry) {
                validate_variant(name, &step, cfg)?;
            } else if cfg.pipelines.contains_key(entry) {
                if reaches_watch_entry(cfg, entry) {
                    return Err(SiteforgeError::ConfigError(format!(
                        "pipeline '{name}': nested pipeline '{entry}' enters watch mode; \
                         '{WATCH_ENTRY}' may only end a directly invoked pipeline"
                    )));
                }
            } else {
                return Err(SiteforgeError::UnknownStep(format!(
                    "pipeline '{name}' references '{entry}', which is neither a step nor a pipeline"
                )));
            }
        }
    }
    Ok(())
}

fn validate_variant(pipeline: &str, step: &StepRef, cfg: &RawConfigFile) -> Result<()> {
    match (step.kind, step.variant.as_deref()) {
        (_, None) => Ok(()),
        (StepKind::Clean, Some(group)) => {
            if cfg.steps.clean.groups.contains_key(group) {
                Ok(())
            } else {
                Err(SiteforgeError::ConfigError(format!(
                    "pipeline '{pipeline}': unknown clean group '{group}'"
                )))
            }
        }
        (StepKind::Lint, Some("sources" | "bundle")) => Ok(()),
        (StepKind::Lint, Some(variant)) => Err(SiteforgeError::ConfigError(format!(
            "pipeline '{pipeline}': unknown lint variant '{variant}' (expected 'sources' or 'bundle')"
        ))),
        (kind, Some(variant)) => Err(SiteforgeError::ConfigError(format!(
            "pipeline '{pipeline}': step '{}' takes no variant (got '{variant}')",
            kind.name()
        ))),
    }
}

/// Reject cycles among pipeline aliases.
///
/// Edge direction: referenced -> referrer, so a toposort failure names a
/// pipeline on the cycle.
fn validate_alias_graph(cfg: &RawConfigFile) -> Result<()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.pipelines.keys() {
        graph.add_node(name.as_str());
    }

    for (name, entries) in cfg.pipelines.iter() {
        for entry in entries {
            if cfg.pipelines.contains_key(entry) {
                if entry == name {
                    return Err(SiteforgeError::PipelineCycle(name.clone()));
                }
                graph.add_edge(entry.as_str(), name.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(SiteforgeError::PipelineCycle(cycle.node_id().to_string())),
    }
}

fn validate_watch_bindings(cfg: &RawConfigFile) -> Result<()> {
    let mut reload_bindings = 0usize;

    for (name, binding) in cfg.watch.iter() {
        if binding.files.is_empty() {
            return Err(SiteforgeError::ConfigError(format!(
                "watch binding '{name}' has no files"
            )));
        }
        for pattern in &binding.files {
            Glob::new(pattern).map_err(|e| {
                SiteforgeError::ConfigError(format!(
                    "watch binding '{name}': invalid glob '{pattern}': {e}"
                ))
            })?;
        }

        if binding.reload {
            reload_bindings += 1;
            if binding.pipeline.is_some() {
                return Err(SiteforgeError::ConfigError(format!(
                    "watch binding '{name}': reload bindings restart the session and take no pipeline"
                )));
            }
            continue;
        }

        let Some(pipeline) = binding.pipeline.as_deref() else {
            return Err(SiteforgeError::ConfigError(format!(
                "watch binding '{name}' names no pipeline"
            )));
        };
        if !cfg.pipelines.contains_key(pipeline) {
            return Err(SiteforgeError::ConfigError(format!(
                "watch binding '{name}' references unknown pipeline '{pipeline}'"
            )));
        }
        if reaches_watch_entry(cfg, pipeline) {
            return Err(SiteforgeError::ConfigError(format!(
                "watch binding '{name}': pipeline '{pipeline}' enters watch mode and cannot be watch-dispatched"
            )));
        }
    }

    if reload_bindings > 1 {
        return Err(SiteforgeError::ConfigError(
            "at most one watch binding may set reload = true".to_string(),
        ));
    }
    Ok(())
}

/// Does this pipeline (transitively) contain the reserved watch entry?
/// Only called after the alias graph is known to be acyclic.
fn reaches_watch_entry(cfg: &RawConfigFile, pipeline: &str) -> bool {
    let Some(entries) = cfg.pipelines.get(pipeline) else {
        return false;
    };
    entries.iter().any(|entry| {
        entry == WATCH_ENTRY
            || (cfg.pipelines.contains_key(entry) && reaches_watch_entry(cfg, entry))
    })
}

fn validate_step_options(cfg: &RawConfigFile) -> Result<()> {
    // Destination-scoped globs and outputs must stay under build_root.
    for (group, patterns) in cfg.steps.clean.groups.iter() {
        for pattern in patterns {
            check_glob(&format!("steps.clean.{group}"), pattern)?;
            check_contained(&format!("steps.clean.{group}"), pattern)?;
        }
    }

    for pattern in &cfg.steps.includes.sources {
        check_glob("steps.includes.sources", pattern)?;
    }
    for pattern in &cfg.steps.rewrite.sources {
        check_glob("steps.rewrite.sources", pattern)?;
    }
    for pattern in &cfg.steps.copy.sources {
        check_glob("steps.copy.sources", pattern)?;
    }
    for pattern in &cfg.steps.uncss.sources {
        check_glob("steps.uncss.sources", pattern)?;
    }
    for pattern in &cfg.steps.images.sources {
        check_glob("steps.images.sources", pattern)?;
    }
    for entry in &cfg.steps.concat.sources {
        check_glob("steps.concat.sources", entry)?;
        check_contained("steps.concat.sources", entry)?;
    }

    for (label, path) in [
        ("steps.styles.entry", cfg.steps.styles.entry.as_str()),
        ("steps.styles.output", cfg.steps.styles.output.as_str()),
        ("steps.copy.dest", cfg.steps.copy.dest.as_str()),
        ("steps.uncss.output", cfg.steps.uncss.output.as_str()),
        ("steps.concat.output", cfg.steps.concat.output.as_str()),
        ("steps.minify_js.input", cfg.steps.minify_js.input.as_str()),
        ("steps.minify_js.output", cfg.steps.minify_js.output.as_str()),
    ] {
        check_contained(label, path)?;
    }

    for rule in &cfg.steps.rewrite.rules {
        if rule.from.is_empty() {
            return Err(SiteforgeError::ConfigError(
                "steps.rewrite: rule with empty 'from'".to_string(),
            ));
        }
        if rule.to.contains(&rule.from) {
            return Err(SiteforgeError::ConfigError(format!(
                "steps.rewrite: rule '{}' -> '{}' would never reach a fixed point",
                rule.from, rule.to
            )));
        }
    }

    for pattern in &cfg.steps.uncss.ignore {
        Regex::new(pattern).map_err(|e| {
            SiteforgeError::ConfigError(format!(
                "steps.uncss.ignore: invalid pattern '{pattern}': {e}"
            ))
        })?;
    }

    if cfg.steps.images.quality > 100 {
        return Err(SiteforgeError::ConfigError(format!(
            "steps.images.quality must be 0..=100 (got {})",
            cfg.steps.images.quality
        )));
    }

    Ok(())
}

fn check_glob(label: &str, pattern: &str) -> Result<()> {
    Glob::new(pattern).map_err(|e| {
        SiteforgeError::ConfigError(format!("{label}: invalid glob '{pattern}': {e}"))
    })?;
    Ok(())
}

/// Relative paths/patterns only: no absolute paths and no parent-directory
/// escapes, so configured inputs and outputs stay inside their root.
fn check_contained(label: &str, path: &str) -> Result<()> {
    let p = Path::new(path);
    let escapes = p.is_absolute()
        || p.components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(SiteforgeError::ConfigError(format!(
            "{label}: '{path}' must stay inside its configured root"
        )));
    }
    Ok(())
}
