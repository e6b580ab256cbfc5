pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise a typed document from `path` when one is given, otherwise
/// from piped stdin (JSON). Returns `Ok(None)` when no path is given and
/// stdin is an interactive terminal or empty.
pub fn read_document_or_stdin<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_document(path)?));
    }

    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let document: T = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse piped stdin: {}", e))?;
    Ok(Some(document))
}
