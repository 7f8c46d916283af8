// src/steps/images.rs

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fs::walk_matching;
use crate::steps::{BuildStep, StepContext, StepKind, StepOutcome, build_globset};
use crate::tools::{EncodeOptions, ImageFormat};

/// Compress raster images into the build tree via the per-format encoder
/// collaborators.
///
/// Incremental: a source whose output already exists and is at least as new
/// is skipped, leaving the output file (and its mtime) untouched.
pub struct ImagesStep;

impl BuildStep for ImagesStep {
    fn kind(&self) -> StepKind {
        StepKind::Images
    }

    fn run(&self, ctx: &StepContext<'_>, _variant: Option<&str>) -> Result<StepOutcome> {
        let opts = &ctx.config.steps.images;
        let images_root = ctx.root.join(ctx.paths().images_root());
        let dest_root = ctx.root.join(ctx.paths().build_images_root());

        let encode_opts = EncodeOptions {
            quality: opts.quality,
            optimization_level: opts.optimization_level,
            progressive: opts.progressive,
        };

        let set = build_globset(&opts.sources)?;
        let sources = walk_matching(ctx.fs, &images_root, &|rel| set.is_match(rel))?;

        let mut encoded = 0usize;
        let mut skipped = 0usize;

        for src in &sources {
            let rel = src
                .strip_prefix(&images_root)
                .expect("walk_matching yields paths under its root");
            let out = dest_root.join(rel);

            if ctx.fs.is_file(&out) && ctx.fs.modified(&out)? >= ctx.fs.modified(src)? {
                debug!(?src, "images: output up to date, skipping");
                skipped += 1;
                continue;
            }

            let ext = src
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(format) = ImageFormat::from_extension(&ext) else {
                warn!(?src, "images: no encoder for extension, skipping");
                continue;
            };

            if let Some(parent) = out.parent() {
                ctx.fs.create_dir_all(parent)?;
            }
            ctx.tools.image_encoder.encode(format, src, &out, &encode_opts)?;
            encoded += 1;
        }

        info!(encoded, skipped, "images: compression pass complete");
        Ok(StepOutcome::default())
    }
}
