use crate::raster::RasterImage;
use anyhow::{Context, Result, bail};
use image::ImageFormat;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Destination for finished images. Persisting is entirely up to the sink.
pub trait ImageSink {
    fn save(&self, img: &RasterImage, label: &str) -> Result<()>;
}

/// Writes each image as `<dir>/<label>.png`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> DirectorySink {
        DirectorySink { dir: dir.into() }
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.png"))
    }
}

impl ImageSink for DirectorySink {
    fn save(&self, img: &RasterImage, label: &str) -> Result<()> {
        if label.is_empty() || label.contains(['/', '\\']) || label.starts_with('.') {
            bail!("invalid image label {label:?}");
        }

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(label);
        img.pixels()
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!("Saved image to {}", path.display());
        Ok(())
    }
}

/// `<prefix>_<unix millis>`, the naming used for saved results.
pub fn timestamped_label(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{prefix}_{millis}")
}
