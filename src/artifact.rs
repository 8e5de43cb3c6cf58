use anyhow::{anyhow, Context};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub artifact_name: String,
    pub artifact_items: Vec<PathBuf>,
    pub failed_items: Vec<PathBuf>,
}

pub trait ArtifactUploader {
    fn upload(
        &self,
        name: &str,
        files: &[PathBuf],
        root: &Path,
        options: UploadOptions,
    ) -> anyhow::Result<UploadResult>;
}

/// Packages artifacts as directories under a local store root:
/// `<store>/<artifact name>/<file path relative to root>`.
pub struct LocalArtifactStore {
    store: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(store: impl Into<PathBuf>) -> Self {
        LocalArtifactStore {
            store: store.into(),
        }
    }

    fn copy_item(&self, target_dir: &Path, file: &Path, root: &Path) -> anyhow::Result<PathBuf> {
        let relative = file
            .strip_prefix(root)
            .map_err(|_| anyhow!("{} is not under {}", file.display(), root.display()))?;
        let target = target_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &target)
            .with_context(|| format!("failed to copy {} into artifact", file.display()))?;
        Ok(relative.to_path_buf())
    }
}

impl ArtifactUploader for LocalArtifactStore {
    fn upload(
        &self,
        name: &str,
        files: &[PathBuf],
        root: &Path,
        options: UploadOptions,
    ) -> anyhow::Result<UploadResult> {
        let target_dir = self.store.join(name);
        if target_dir.exists() {
            fs::remove_dir_all(&target_dir)
                .with_context(|| format!("failed to clear {}", target_dir.display()))?;
        }
        fs::create_dir_all(&target_dir)
            .with_context(|| format!("failed to create {}", target_dir.display()))?;

        let mut artifact_items = Vec::new();
        let mut failed_items = Vec::new();

        for file in files {
            match self.copy_item(&target_dir, file, root) {
                Ok(item) => artifact_items.push(item),
                Err(e) if options.continue_on_error => {
                    log::warn!("skipping {} in artifact {name}: {e:#}", file.display());
                    failed_items.push(file.clone());
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "artifact {name}: {} item(s) packaged, {} failed",
            artifact_items.len(),
            failed_items.len()
        );
        Ok(UploadResult {
            artifact_name: name.to_string(),
            artifact_items,
            failed_items,
        })
    }
}
