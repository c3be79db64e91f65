#![allow(dead_code)]

use async_trait::async_trait;
use hazardnexus_collectors::{Rasterizer, RenderCapability, RenderPipeline, StorageLayout};
use hazardnexus_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Writes `pages` fake PNG files, recording how often it ran
pub struct FakeRasterizer {
    pub pages: usize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    fn name(&self) -> &str {
        "fake"
    }

    async fn rasterize(&self, document: &Path, work_dir: &Path) -> Result<Vec<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(document.exists(), "document must exist while rendering");

        let mut pages = Vec::new();
        for n in 1..=self.pages {
            let page = work_dir.join(format!("page-{n}.png"));
            tokio::fs::write(&page, format!("page {n}")).await?;
            pages.push(page);
        }
        Ok(pages)
    }
}

pub struct BrokenRasterizer;

#[async_trait]
impl Rasterizer for BrokenRasterizer {
    fn name(&self) -> &str {
        "broken"
    }

    async fn rasterize(&self, _document: &Path, _work_dir: &Path) -> Result<Vec<PathBuf>> {
        Err(Error::parse("corrupt document"))
    }
}

pub fn layout(dir: &TempDir) -> StorageLayout {
    StorageLayout::new(
        dir.path().join("images"),
        dir.path().join("scratch"),
        "/assets/images",
    )
}

pub fn pipeline(dir: &TempDir, capability: RenderCapability) -> Arc<RenderPipeline> {
    Arc::new(RenderPipeline::new(layout(dir), capability, false).unwrap())
}

pub fn fake(pages: usize) -> Arc<FakeRasterizer> {
    Arc::new(FakeRasterizer {
        pages,
        calls: AtomicUsize::new(0),
    })
}

pub fn scratch_entries(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path().join("scratch"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}
