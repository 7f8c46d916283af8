// src/lib.rs

pub mod cli;
pub mod compose;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod project;
pub mod steps;
pub mod tools;
pub mod watch;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::CliArgs;
use crate::compose::{Composer, PipelineReport, Plan};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::fs::RealFileSystem;
use crate::project::ProjectMeta;
use crate::tools::ToolSet;
use crate::watch::SessionEnd;

/// Exit code for a run where lint violations were escalated (`--ci`).
/// Distinct from 1, which means a pipeline aborted.
pub const EXIT_LINT: i32 = 2;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading + validation
/// - project metadata
/// - the command-backed tool set
/// - the composer (resolve + execute)
/// - the watch session, re-reading config when the reload binding fires
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = PathBuf::from(&args.config);
    let root = config_root_dir(&config_path);
    let fs = RealFileSystem;

    loop {
        let cfg = load_and_validate(&config_path)?;
        let project = ProjectMeta::load(&fs, &root.join(&cfg.project.metadata))?;
        let tools = ToolSet::from_commands(&cfg.tools);

        let composer = Composer::new(&cfg, &tools, &fs, &project, &root);
        let plan = composer.resolve(&args.pipeline)?;

        if args.dry_run {
            print_dry_run(&cfg, &plan);
            return Ok(0);
        }

        let report = composer.execute(&plan)?;
        print_lint_report(&report);

        if !plan.enter_watch {
            return Ok(exit_code(&report, args.ci));
        }

        match watch::run_session(&cfg, &tools, &fs, &project, &root).await? {
            SessionEnd::Reload => {
                info!("configuration changed; restarting watch session");
                continue;
            }
            SessionEnd::Shutdown => return Ok(0),
        }
    }
}

fn exit_code(report: &PipelineReport, ci: bool) -> i32 {
    if ci && !report.lint.is_empty() {
        EXIT_LINT
    } else {
        0
    }
}

fn print_lint_report(report: &PipelineReport) {
    if report.lint.is_empty() {
        return;
    }
    println!("{} lint violation(s):", report.lint.len());
    for violation in &report.lint {
        println!("  {violation}");
    }
}

/// Figure out the project root all relative configuration resolves against.
///
/// - If the config path has a non-empty parent (e.g. "configs/Siteforge.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Siteforge.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: the resolved plan plus the watch bindings it
/// would arm.
fn print_dry_run(cfg: &ConfigFile, plan: &Plan) {
    println!("siteforge dry-run");
    println!("  pipeline: {}", plan.pipeline);
    println!();

    println!("steps ({}):", plan.steps.len());
    for step in &plan.steps {
        println!("  - {step}");
    }

    if plan.enter_watch {
        println!();
        println!("watch bindings ({}):", cfg.watch.len());
        for (name, binding) in cfg.watch.iter() {
            println!("  - {name}");
            println!("      files: {:?}", binding.files);
            if let Some(ref pipeline) = binding.pipeline {
                println!("      pipeline: {pipeline}");
            }
            if binding.reload {
                println!("      reload: true");
            }
        }
    }
}
