use anyhow::{Context, Result};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::calibration::DistanceRange;

/// Output file holding the distances of the current frame, one face per
/// line as `index<TAB>min-max`.
pub struct ReportWriter {
    path: PathBuf,
    file: File,
}

impl ReportWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Can't open output file: {}", path.display()))?;

        debug!("Report file {} opened", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file contents with `distances`.
    pub fn write(&mut self, distances: &[DistanceRange]) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;

        let mut out = BufWriter::new(&mut self.file);
        for (idx, range) in distances.iter().enumerate() {
            writeln!(out, "{idx}\t{range}")?;
        }
        out.flush()?;
        drop(out);

        let end = self.file.stream_position()?;
        self.file.set_len(end)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.write(&[])
            .with_context(|| format!("Failed to clear {}", self.path.display()))
    }
}
