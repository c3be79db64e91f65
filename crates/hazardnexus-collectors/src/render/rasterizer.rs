//! Document rasterization backends

use async_trait::async_trait;
use hazardnexus_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{info, warn};

/// Converts a document into one image file per page
#[async_trait]
pub trait Rasterizer: Send + Sync {
    fn name(&self) -> &str;

    /// Write page images into `work_dir` and return them in page order
    async fn rasterize(&self, document: &Path, work_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Whether this host can turn documents into images
///
/// Resolved once at startup and held by the pipeline.
#[derive(Clone)]
pub enum RenderCapability {
    Available(Arc<dyn Rasterizer>),
    Unavailable(String),
}

impl RenderCapability {
    /// Probe for `pdftoppm` on the PATH
    pub async fn detect() -> Self {
        let backend = PdftoppmRasterizer::default();
        match backend.probe().await {
            Ok(()) => {
                info!("Document rendering enabled ({})", backend.name());
                Self::Available(Arc::new(backend))
            }
            Err(e) => {
                warn!(
                    "Document rendering disabled, bulletins will carry links only: {}",
                    e
                );
                Self::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Available(backend) => backend.name().to_string(),
            Self::Unavailable(reason) => format!("unavailable: {reason}"),
        }
    }
}

impl std::fmt::Debug for RenderCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Poppler's `pdftoppm`
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PdftoppmRasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Succeeds if the binary can be spawned
    pub async fn probe(&self) -> Result<()> {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .await
            .map(|_| ())
            .map_err(|e| Error::config(format!("cannot run {:?}: {}", self.binary, e)))
    }
}

#[async_trait]
impl Rasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    async fn rasterize(&self, document: &Path, work_dir: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new(&self.binary)
            .arg("-png")
            .arg(document)
            .arg(work_dir.join("page"))
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::parse(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        collect_pages(work_dir).await
    }
}

/// Page files named `page-<n>.png` (n possibly zero padded), sorted by n
async fn collect_pages(work_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(work_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit_once('-')?.1.parse().ok()
}
