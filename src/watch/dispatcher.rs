// src/watch/dispatcher.rs

//! The watch session event loop.
//!
//! A single dispatcher consumes filesystem events from the watcher channel,
//! debounces bursts, filters through the binding profiles and the content
//! hash cache, and synchronously runs each matched binding's pipeline to
//! completion before touching the next event. Sequential dispatch keeps the
//! destination tree free of interleaved writers.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::compose::Composer;
use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::project::ProjectMeta;
use crate::tools::ToolSet;
use crate::watch::hash::FileCache;
use crate::watch::patterns::{BindingProfile, build_binding_profiles};
use crate::watch::watcher::spawn_watcher;

/// How a watch session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The configuration file changed; the caller should re-read it and
    /// start a fresh session.
    Reload,
    /// Explicit termination (Ctrl-C or watcher gone).
    Shutdown,
}

/// Batch window for event bursts (editors fire several events per save).
const DEBOUNCE: Duration = Duration::from_millis(150);

/// What one batch of changed paths leads to.
#[derive(Debug)]
pub enum Dispatch<'p> {
    /// The configuration binding matched; it wins over content bindings.
    Reload,
    /// Content bindings to run, in declared order.
    Run(Vec<&'p BindingProfile>),
}

/// Decide which bindings a batch of changed paths (relative to the project
/// root) dispatches. Pure so it can be tested without a live watcher.
pub fn plan_dispatch<'p>(profiles: &'p [BindingProfile], changed: &[String]) -> Dispatch<'p> {
    if profiles
        .iter()
        .any(|p| p.reload() && changed.iter().any(|rel| p.matches(rel)))
    {
        return Dispatch::Reload;
    }

    Dispatch::Run(
        profiles
            .iter()
            .filter(|p| !p.reload() && changed.iter().any(|rel| p.matches(rel)))
            .collect(),
    )
}

/// Run one watch session until it ends.
///
/// The session holds the watcher for its whole lifetime; profiles and the
/// hash cache are rebuilt per session, so a `Reload` picks up configuration
/// changes naturally.
pub async fn run_session(
    config: &ConfigFile,
    tools: &ToolSet,
    fs: &dyn FileSystem,
    project: &ProjectMeta,
    root: &Path,
) -> Result<SessionEnd> {
    let profiles = build_binding_profiles(config)?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let _watcher = spawn_watcher(root.to_path_buf(), event_tx)?;

    // The watcher reports canonicalized paths; relativize against the same base.
    let canon_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let mut cache = FileCache::new();
    let composer = Composer::new(config, tools, fs, project, root);

    info!("watch session started; waiting for changes");

    loop {
        let first = tokio::select! {
            maybe_event = event_rx.recv() => match maybe_event {
                Some(event) => event,
                None => {
                    info!("watch event channel closed; ending session");
                    return Ok(SessionEnd::Shutdown);
                }
            },
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    warn!("failed to listen for Ctrl+C: {err}");
                }
                info!("shutdown requested; ending watch session");
                return Ok(SessionEnd::Shutdown);
            }
        };

        let mut changed: BTreeSet<String> = BTreeSet::new();
        collect_paths(&first, &canon_root, &mut changed);

        // Drain the burst before dispatching.
        while let Ok(Some(event)) = tokio::time::timeout(DEBOUNCE, event_rx.recv()).await {
            collect_paths(&event, &canon_root, &mut changed);
        }

        let changed: Vec<String> = changed
            .into_iter()
            .filter(|rel| cache.update_and_check_changed(&canon_root.join(rel)))
            .collect();

        if changed.is_empty() {
            continue;
        }
        debug!(?changed, "dispatching changed paths");

        let matched = match plan_dispatch(&profiles, &changed) {
            Dispatch::Reload => {
                info!("configuration change detected; reloading watch session");
                return Ok(SessionEnd::Reload);
            }
            Dispatch::Run(matched) => matched,
        };

        // Every matching binding dispatches, each pipeline run to
        // completion before the next starts.
        for profile in matched {
            let Some(pipeline) = profile.pipeline() else {
                continue;
            };

            info!(binding = profile.name(), pipeline, "change matched; running pipeline");
            match composer.run(pipeline) {
                Ok(report) => {
                    for violation in &report.lint {
                        warn!(%violation, "lint violation");
                    }
                }
                Err(err) => {
                    // A failed dispatch does not end the session; the next
                    // save gets another chance.
                    error!(binding = profile.name(), error = %err, "watch-dispatched pipeline failed");
                }
            }
        }
    }
}

fn collect_paths(event: &Event, root: &Path, out: &mut BTreeSet<String>) {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return;
    }

    for path in &event.paths {
        if let Ok(rel) = path.strip_prefix(root) {
            out.insert(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
