//! Document download and rasterization
//!
//! Documents are downloaded into a scratch directory, rasterized into the
//! public asset directory, and always removed from scratch afterwards.

mod rasterizer;

pub use rasterizer::{PdftoppmRasterizer, Rasterizer, RenderCapability};

use crate::collector::{check_status, http_client, http_error};
use hazardnexus_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

/// Timeout for document downloads
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Filesystem roots used by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct StorageLayout {
    /// Durable images, served to the dashboard
    pub asset_dir: PathBuf,

    /// Transient documents
    pub scratch_dir: PathBuf,

    /// URL prefix under which `asset_dir` is served
    pub public_prefix: String,
}

impl StorageLayout {
    pub fn new(
        asset_dir: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
        public_prefix: impl Into<String>,
    ) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            scratch_dir: scratch_dir.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Public path for a file in the asset directory
    pub fn public_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name)
    }

    /// Create both roots; safe to call repeatedly
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.asset_dir, &self.scratch_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::config(format!("cannot create storage directory {:?}: {}", dir, e))
            })?;
        }
        Ok(())
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new("assets/images", "temp_pdfs", "/assets/images")
    }
}

/// Removes a scratch file when dropped
struct ScratchFile {
    path: PathBuf,
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch document {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch document {:?}: {}", self.path, e),
        }
    }
}

/// Downloads documents and turns them into page images
pub struct RenderPipeline {
    client: reqwest::Client,
    layout: StorageLayout,
    capability: RenderCapability,
}

impl RenderPipeline {
    /// Create the pipeline and its storage roots
    pub fn new(
        layout: StorageLayout,
        capability: RenderCapability,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        layout.ensure()?;
        let client = http_client(DOWNLOAD_TIMEOUT, accept_invalid_certs)?;

        info!(
            "Render pipeline: assets {:?}, scratch {:?}, rasterizer {}",
            layout.asset_dir,
            layout.scratch_dir,
            capability.describe()
        );

        Ok(Self {
            client,
            layout,
            capability,
        })
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn capability(&self) -> &RenderCapability {
        &self.capability
    }

    pub fn can_render(&self) -> bool {
        self.capability.is_available()
    }

    /// Download a document to `{scratch}/{name}.pdf`; `None` on any failure
    pub async fn download_document(&self, url: &str, name: &str) -> Option<PathBuf> {
        match self.try_download(url, name).await {
            Ok(path) => {
                info!("Downloaded document {} to {:?}", url, path);
                Some(path)
            }
            Err(e) => {
                error!("Failed to download document {}: {}", url, e);
                None
            }
        }
    }

    async fn try_download(&self, url: &str, name: &str) -> Result<PathBuf> {
        let response = self.client.get(url).send().await.map_err(http_error)?;
        let body = check_status(response)?.bytes().await.map_err(http_error)?;

        let path = self.layout.scratch_dir.join(format!("{name}.pdf"));
        if let Err(e) = tokio::fs::write(&path, &body).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }
        Ok(path)
    }

    /// Rasterize a downloaded document into public page image paths
    ///
    /// Returns an empty list when rendering is unavailable or fails. The
    /// document is removed from scratch storage on every path.
    pub async fn render_to_images(&self, document: &Path, base_name: &str) -> Vec<String> {
        let _scratch = ScratchFile {
            path: document.to_path_buf(),
        };

        let RenderCapability::Available(rasterizer) = &self.capability else {
            debug!("Skipping rasterization of {:?}: no backend", document);
            return Vec::new();
        };

        match self.rasterize(rasterizer.as_ref(), document, base_name).await {
            Ok(paths) => {
                info!("Rendered {:?} into {} page(s)", document, paths.len());
                paths
            }
            Err(e) => {
                error!("Failed to render {:?}: {}", document, e);
                Vec::new()
            }
        }
    }

    async fn rasterize(
        &self,
        rasterizer: &dyn Rasterizer,
        document: &Path,
        base_name: &str,
    ) -> Result<Vec<String>> {
        let work_dir = TempDir::new_in(&self.layout.scratch_dir)?;
        let pages = rasterizer.rasterize(document, work_dir.path()).await?;

        let timestamp = chrono::Utc::now().timestamp();
        let mut public = Vec::with_capacity(pages.len());
        let mut current = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let file_name = format!("{}_page_{}_{}.png", base_name, index + 1, timestamp);
            tokio::fs::copy(page, self.layout.asset_dir.join(&file_name)).await?;
            public.push(self.layout.public_path(&file_name));
            current.push(file_name);
        }

        if !current.is_empty() {
            self.prune_generations(base_name, &current).await;
        }
        Ok(public)
    }

    /// Delete page images of `base_name` left by earlier renders
    async fn prune_generations(&self, base_name: &str, current: &[String]) {
        let prefix = format!("{base_name}_page_");
        let mut entries = match tokio::fs::read_dir(&self.layout.asset_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {:?} for pruning: {}", self.layout.asset_dir, e);
                return;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&prefix) || !name.ends_with(".png") || current.contains(&name) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => debug!("Pruned old page image {}", name),
                Err(e) => warn!("Failed to prune {}: {}", name, e),
            }
        }
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("layout", &self.layout)
            .field("capability", &self.capability)
            .finish()
    }
}
