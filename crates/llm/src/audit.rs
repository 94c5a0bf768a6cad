// Append-only audit log of verification records (JSON lines)

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::VerificationRecord;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize verification record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("audit log {} line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Destination for verification records. Implementations only ever append.
pub trait AuditSink {
    fn append(&mut self, record: &VerificationRecord) -> Result<(), AuditError>;
}

impl AuditSink for Vec<VerificationRecord> {
    fn append(&mut self, record: &VerificationRecord) -> Result<(), AuditError> {
        self.push(record.clone());
        Ok(())
    }
}

/// JSON-lines file, one record per line. Opened in append mode per record.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> AuditError {
        AuditError::Io { path: self.path.clone(), source }
    }
}

impl AuditSink for AuditLog {
    fn append(&mut self, record: &VerificationRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        // One write per record line.
        file.write_all(line.as_bytes()).map_err(|e| self.io_err(e))?;
        file.sync_data().map_err(|e| self.io_err(e))?;

        log::debug!("audit: appended call {} to {}", record.call_id(), self.path.display());
        Ok(())
    }
}

/// Read every record back in append order. A missing log reads as empty.
pub fn read_records(path: &Path) -> Result<Vec<VerificationRecord>, AuditError> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(AuditError::Io { path: path.to_path_buf(), source }),
    };

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| AuditError::Io { path: path.to_path_buf(), source })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| AuditError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}
