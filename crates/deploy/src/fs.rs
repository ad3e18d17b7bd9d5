//! File system utils.

use std::{io::Write, path::Path};

use anyhow::Context;

pub struct FsHandler;

impl FsHandler {
    // Create a directory owned by this tool if it doesn't exist yet.
    pub fn create_output_directory(path: &Path) -> anyhow::Result<()> {
        if path.is_dir() {
            return Ok(());
        }

        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        tracing::debug!("Created output directory: {}", path.display());

        Ok(())
    }

    /// Replace the content of `path` with `content` atomically.
    ///
    /// The content is written and synced to a temporary file next to `path`,
    /// then renamed over it. Readers see either the previous file or the new
    /// one, never a truncated write. The parent directory must exist.
    pub fn write_atomic(path: &Path, content: &[u8]) -> anyhow::Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if !parent.is_dir() {
            anyhow::bail!("Destination directory does not exist: {}", parent.display());
        }

        let mut file = tempfile::NamedTempFile::new_in(parent).with_context(|| {
            format!("Failed to create temporary file in {}", parent.display())
        })?;

        file.write_all(content)
            .context("Failed to write temporary file")?;
        file.as_file()
            .sync_all()
            .context("Failed to sync temporary file")?;

        file.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move temporary file to {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "File written");

        Ok(())
    }
}
