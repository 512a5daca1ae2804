use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;

use crate::persist::{write_atomically, PersistError};

/// File name offered when the operator does not pick one.
pub const DEFAULT_EXPORT_FILENAME: &str = "server.txt";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no working servers to save")]
    Empty,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// One endpoint per line, each line newline-terminated, no header.
pub fn format_endpoint_list(endpoints: &[String]) -> String {
    let mut buffer = String::with_capacity(endpoints.iter().map(|e| e.len() + 1).sum());
    for endpoint in endpoints {
        buffer.push_str(endpoint);
        buffer.push('\n');
    }
    buffer
}

/// Inverse of [`format_endpoint_list`]; tolerates CRLF and blank lines.
pub fn parse_endpoint_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

pub fn export_endpoints(path: &Path, endpoints: &[String]) -> Result<PathBuf, ExportError> {
    if endpoints.is_empty() {
        return Err(ExportError::Empty);
    }
    let written = write_atomically(path, &format_endpoint_list(endpoints))?;
    engine_info!("Saved {} endpoints to {:?}", endpoints.len(), written);
    Ok(written)
}

pub fn read_endpoints(path: &Path) -> Result<Vec<String>, ExportError> {
    Ok(parse_endpoint_list(&fs::read_to_string(path)?))
}
