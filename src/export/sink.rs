use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    export::png::ExportedFile,
    foundation::error::{FrameError, FrameResult},
};

/// Destination for exported files (the "download" half of export).
pub trait ExportSink {
    /// Persist `file` and return where it went, if it went anywhere addressable.
    fn deliver(&mut self, file: &ExportedFile) -> FrameResult<Option<PathBuf>>;
}

/// Writes exports into a directory, creating it on first use.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn deliver(&mut self, file: &ExportedFile) -> FrameResult<Option<PathBuf>> {
        let path = self.dir.join(&file.file_name);
        write_file(&path, &file.bytes).map_err(|e| FrameError::export(format!("{e:#}")))?;
        tracing::info!(path = %path.display(), bytes = file.bytes.len(), "wrote export");
        Ok(Some(path))
    }
}

/// Keeps exports in memory; for tests and embedders that handle bytes themselves.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub(crate) files: Vec<ExportedFile>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ExportedFile] {
        &self.files
    }
}

impl ExportSink for InMemorySink {
    fn deliver(&mut self, file: &ExportedFile) -> FrameResult<Option<PathBuf>> {
        self.files.push(file.clone());
        Ok(None)
    }
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
