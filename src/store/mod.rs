pub mod npy;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::record::{CandidateId, JobRecord};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid id array in {path:?}: {source}")]
    Npy {
        path: PathBuf,
        source: npy::NpyError,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent(path: &Path) -> Result<(), ArtifactError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io_err(parent))
        }
        _ => Ok(()),
    }
}

pub fn ensure_dir(path: &Path) -> Result<(), ArtifactError> {
    fs::create_dir_all(path).map_err(io_err(path))
}

/// Write bytes in one go, replacing whatever was at `path`.
fn write_all(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    ensure_parent(path)?;
    fs::write(path, bytes).map_err(io_err(path))?;
    debug!(path = ?path, bytes = bytes.len(), "artifact written");
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(io_err(path))?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_all(path, text.as_bytes())
}

pub fn write_ids(path: &Path, ids: &[CandidateId]) -> Result<(), ArtifactError> {
    write_all(path, &npy::encode_i64(ids))
}

pub fn read_ids(path: &Path) -> Result<Vec<CandidateId>, ArtifactError> {
    let bytes = fs::read(path).map_err(io_err(path))?;
    npy::decode_i64(&bytes).map_err(|source| ArtifactError::Npy {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_records(path: &Path, records: &[JobRecord]) -> Result<(), ArtifactError> {
    write_json_pretty(path, records)
}

pub fn read_records(path: &Path) -> Result<Vec<JobRecord>, ArtifactError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scratch_dir;

    fn sample_records() -> Vec<JobRecord> {
        vec![
            JobRecord {
                title: Some("Softwareentwickler (m/w/d)".into()),
                code: Some("Job Nr. 045".into()),
                entry_type: Some("Berufserfahrene".into()),
                location: Some("Stuttgart".into()),
                company: Some("Example AG".into()),
                tasks: vec!["Build services".into(), "Review code".into()],
                requirements: vec!["Rust".into()],
            },
            JobRecord {
                title: Some("Praktikant".into()),
                code: None,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn records_round_trip_in_order() {
        let dir = scratch_dir("records_round_trip");
        let path = dir.join("nested").join("jobs.json");
        let records = sample_records();

        write_records(&path, &records).unwrap();
        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn ids_round_trip_and_overwrite() {
        let dir = scratch_dir("ids_round_trip");
        let path = dir.join("job_ids.npy");

        write_ids(&path, &[3, 1, 2]).unwrap();
        write_ids(&path, &[42]).unwrap();
        assert_eq!(read_ids(&path).unwrap(), vec![42]);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = scratch_dir("missing_file");
        let err = read_records(&dir.join("absent.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = scratch_dir("malformed_json");
        let path = dir.join("jobs.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_records(&path), Err(ArtifactError::Json { .. })));
    }
}
