use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use image::{GrayImage, RgbImage};
use log::{debug, warn};

/// Where intermediate heuristic images are written.
///
/// Clones share one run counter. The first run writes straight into
/// `output_dir`; every later run gets its own `run_NNN` subdirectory, so
/// requests sharing an analyzer never overwrite each other's images.
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    runs: Arc<AtomicUsize>,
}

impl DebugConfig {
    /// The directory must be empty or non-existent; it is created if missing.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self {
            output_dir,
            runs: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Claim the directory for the next heuristic run.
    pub fn start_run(&self) -> Result<DebugRun> {
        let index = self.runs.fetch_add(1, Ordering::Relaxed);
        let dir = if index == 0 {
            self.output_dir.clone()
        } else {
            let dir = self.output_dir.join(format!("run_{:03}", index));
            std::fs::create_dir_all(&dir)?;
            dir
        };
        Ok(DebugRun { dir })
    }
}

/// Debug images of a single heuristic run.
#[derive(Clone, Debug)]
pub struct DebugRun {
    dir: PathBuf,
}

impl DebugRun {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the decoded frame as `00_input.png`.
    pub fn save_input(&self, image: &RgbImage) {
        let path = self.dir.join("00_input.png");
        log_saved(&path, image.save(&path));
    }

    /// Save one stage image as `NN_name.png`. Failures are logged, not raised.
    pub fn save_stage(&self, index: usize, name: &str, image: &GrayImage) {
        let filename = format!("{:02}_{}.png", index, name.to_lowercase().replace(' ', "_"));
        let path = self.dir.join(filename);
        log_saved(&path, image.save(&path));
    }
}

fn log_saved(path: &Path, result: image::ImageResult<()>) {
    match result {
        Ok(()) => debug!("Debug: saved {}", path.display()),
        Err(e) => warn!("Failed to save debug image {}: {}", path.display(), e),
    }
}
