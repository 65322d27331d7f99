use crate::transcript::LogRecord;
use crate::{Error, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Fixed name of the diagnostic file. Each run replaces the previous one.
pub const REPORT_FILE_NAME: &str = "tcsync-check-output.log";

/// Where operators are asked to attach the report.
pub const SUPPORT_URL: &str = "https://github.com/jwoglom/tconnectsync/issues/new";

#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE_NAME)
    }

    /// Write every record, one per line, truncating any earlier report.
    pub fn write(&self, records: &[LogRecord]) -> Result<PathBuf> {
        let path = self.path();
        write_records(&path, records).map_err(|source| Error::Report {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), records = records.len(), "report written");
        Ok(path)
    }

    /// Console guidance printed once the report exists.
    pub fn guidance(path: &Path) -> Vec<String> {
        vec![
            format!(
                "Created file {} containing additional debugging information.",
                path.display()
            ),
            format!("For support, you can upload this file to {}", SUPPORT_URL),
            "Before uploading, look through the file and remove any sensitive data, such as"
                .to_string(),
            "your Nightscout URL, pump serial number, and any credentials.".to_string(),
        ]
    }
}

fn write_records(path: &Path, records: &[LogRecord]) -> std::io::Result<()> {
    let mut file = BufWriter::new(fs::File::create(path)?);
    for record in records {
        writeln!(file, "{}", record.text)?;
    }
    file.flush()
}
