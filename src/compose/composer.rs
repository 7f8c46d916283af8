// src/compose/composer.rs

use std::path::Path;

use tracing::{debug, info};

use crate::config::model::ConfigFile;
use crate::config::validate::WATCH_ENTRY;
use crate::errors::{Result, SiteforgeError};
use crate::fs::FileSystem;
use crate::project::ProjectMeta;
use crate::steps::{StepContext, StepRef, step_impl};
use crate::tools::{LintViolation, ToolSet};

/// A resolved pipeline: the flattened, ordered step list plus whether the
/// session enters watch mode afterwards.
#[derive(Debug, Clone)]
pub struct Plan {
    pub pipeline: String,
    pub steps: Vec<StepRef>,
    pub enter_watch: bool,
}

/// What a pipeline run produced. Lint findings are advisory; their
/// escalation to an exit status happens at the CLI boundary.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub pipeline: String,
    pub steps_run: Vec<String>,
    pub lint: Vec<LintViolation>,
}

/// Resolves pipeline names and runs their steps strictly sequentially,
/// stop-on-first-failure.
///
/// Constructed per invocation from borrowed configuration; holds no
/// process-wide state, so independent invocations are independent values.
pub struct Composer<'a> {
    config: &'a ConfigFile,
    tools: &'a ToolSet,
    fs: &'a dyn FileSystem,
    project: &'a ProjectMeta,
    root: &'a Path,
}

impl<'a> Composer<'a> {
    pub fn new(
        config: &'a ConfigFile,
        tools: &'a ToolSet,
        fs: &'a dyn FileSystem,
        project: &'a ProjectMeta,
        root: &'a Path,
    ) -> Self {
        Self {
            config,
            tools,
            fs,
            project,
            root,
        }
    }

    /// Flatten a pipeline name into an ordered step plan, expanding nested
    /// aliases left-to-right.
    pub fn resolve(&self, name: &str) -> Result<Plan> {
        if !self.config.pipelines.contains_key(name) {
            return Err(SiteforgeError::UnknownPipeline(name.to_string()));
        }

        let mut steps = Vec::new();
        let mut enter_watch = false;
        let mut visiting: Vec<String> = Vec::new();
        self.flatten(name, &mut steps, &mut enter_watch, &mut visiting)?;

        Ok(Plan {
            pipeline: name.to_string(),
            steps,
            enter_watch,
        })
    }

    fn flatten(
        &self,
        name: &str,
        out: &mut Vec<StepRef>,
        enter_watch: &mut bool,
        visiting: &mut Vec<String>,
    ) -> Result<()> {
        // Validation already rejects cyclic configs; this guards resolve()
        // against configs constructed without validation.
        if visiting.iter().any(|v| v == name) {
            return Err(SiteforgeError::PipelineCycle(name.to_string()));
        }
        visiting.push(name.to_string());

        let entries = self
            .config
            .pipelines
            .get(name)
            .ok_or_else(|| SiteforgeError::UnknownPipeline(name.to_string()))?;

        for entry in entries {
            if entry == WATCH_ENTRY {
                *enter_watch = true;
            } else if let Some(step) = StepRef::parse(entry) {
                out.push(step);
            } else {
                self.flatten(entry, out, enter_watch, visiting)?;
            }
        }

        visiting.pop();
        Ok(())
    }

    /// Run the plan's steps in order. The first failing step aborts the
    /// pipeline; the error names the pipeline, the step and the cause.
    pub fn execute(&self, plan: &Plan) -> Result<PipelineReport> {
        let step_ids: Vec<String> = plan.steps.iter().map(|s| s.to_string()).collect();
        info!(pipeline = %plan.pipeline, steps = ?step_ids, "running pipeline");

        let ctx = StepContext {
            config: self.config,
            fs: self.fs,
            tools: self.tools,
            project: self.project,
            root: self.root,
        };

        let mut report = PipelineReport {
            pipeline: plan.pipeline.clone(),
            ..PipelineReport::default()
        };

        for step in &plan.steps {
            let id = step.to_string();
            debug!(step = %id, "starting step");

            match step_impl(step.kind).run(&ctx, step.variant.as_deref()) {
                Ok(outcome) => {
                    report.steps_run.push(id);
                    report.lint.extend(outcome.lint);
                }
                Err(err) => {
                    return Err(SiteforgeError::StepFailed {
                        pipeline: plan.pipeline.clone(),
                        step: id,
                        source: anyhow::Error::new(err),
                    });
                }
            }
        }

        info!(pipeline = %plan.pipeline, steps = report.steps_run.len(), "pipeline complete");
        Ok(report)
    }

    /// Convenience: resolve and execute in one call.
    pub fn run(&self, name: &str) -> Result<PipelineReport> {
        let plan = self.resolve(name)?;
        self.execute(&plan)
    }
}
