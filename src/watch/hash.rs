// src/watch/hash.rs

//! Content hashing for watch-event deduplication.
//!
//! Editors routinely rewrite files without changing their bytes (atomic
//! saves, touch-on-format). The dispatcher keeps a hash per seen path and
//! only treats an event as a real change when the content hash moved.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

/// Compute the hash of a single file.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// In-memory cache of file hashes, keyed by path.
#[derive(Debug, Default)]
pub struct FileCache {
    hashes: HashMap<PathBuf, String>,
}

impl FileCache {
    pub fn new() -> Self {
        Self {
            hashes: HashMap::new(),
        }
    }

    /// Record the file's current content hash and report whether it differs
    /// from the last recorded one. A vanished file counts as changed and
    /// drops the cache entry.
    pub fn update_and_check_changed(&mut self, path: &Path) -> bool {
        if !path.is_file() {
            // Removal is always a real change.
            self.hashes.remove(path);
            return true;
        }

        match compute_file_hash(path) {
            Ok(hash) => {
                let changed = self.hashes.get(path) != Some(&hash);
                if !changed {
                    debug!(?path, "content unchanged, suppressing event");
                }
                self.hashes.insert(path.to_path_buf(), hash);
                changed
            }
            Err(err) => {
                // Unreadable mid-write files: err on the side of dispatching.
                debug!(?path, %err, "could not hash changed file");
                self.hashes.remove(path);
                true
            }
        }
    }
}
