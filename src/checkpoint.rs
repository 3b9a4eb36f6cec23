use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::report::write_atomic;

/// Default checkpoint file name.
pub const DEFAULT_CHECKPOINT_FILE: &str = "progress.txt";

/// Resume point for the generation pipeline: the highest paragraph ordinal
/// already attempted, stored as a bare integer.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
    last_processed: u64,
}

impl Checkpoint {
    /// Load the checkpoint, starting from 0 when the file is missing or unreadable.
    pub async fn load(path: &Path) -> Self {
        let last_processed = match fs::read_to_string(path).await {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    warn!("Checkpoint {} is not a number, starting from 0", path.display());
                    0
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                warn!("Failed to read checkpoint {}: {}, starting from 0", path.display(), e);
                0
            }
        };

        debug!("Loaded checkpoint {} (last_processed={})", path.display(), last_processed);
        Self {
            path: path.to_path_buf(),
            last_processed,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_processed(&self) -> u64 {
        self.last_processed
    }

    pub fn is_processed(&self, ordinal: u64) -> bool {
        ordinal <= self.last_processed
    }

    /// Advance to `ordinal` (never backwards) and persist.
    pub async fn record(&mut self, ordinal: u64) -> Result<()> {
        self.last_processed = self.last_processed.max(ordinal);
        self.save().await
    }

    pub async fn save(&self) -> Result<()> {
        write_atomic(&self.path, self.last_processed.to_string().as_bytes()).await
    }
}
