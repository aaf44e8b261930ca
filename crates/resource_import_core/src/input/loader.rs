//! Resources file loader.
//!
//! # Responsibility
//! - Read the resources file into an ordered list of descriptors.
//! - Pick the document format from the file extension.
//!
//! # Invariants
//! - Output order equals document order.
//! - A malformed document or a missing required key fails the whole load;
//!   nothing is written in that case.

use crate::model::descriptor::ResourceDescriptor;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors raised while reading or parsing the resources file.
#[derive(Debug)]
pub enum InputError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Yaml(err) => write!(f, "invalid resources yaml: {err}"),
            Self::Json(err) => write!(f, "invalid resources json: {err}"),
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for InputError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<serde_json::Error> for InputError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Loads descriptors from `path`.
///
/// `.json` files are parsed as JSON, everything else as YAML.
pub fn load_descriptors(path: impl AsRef<Path>) -> Result<Vec<ResourceDescriptor>, InputError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        parse_descriptors_json(&text)
    } else {
        parse_descriptors_yaml(&text)
    };

    match parsed {
        Ok(descriptors) => {
            info!(
                "event=input_load module=input status=ok path={} count={}",
                path.display(),
                descriptors.len()
            );
            Ok(descriptors)
        }
        Err(err) => {
            error!(
                "event=input_load module=input status=error path={} error={}",
                path.display(),
                err
            );
            Err(err)
        }
    }
}

/// Parses a YAML sequence of resource mappings.
///
/// An empty document yields an empty list.
pub fn parse_descriptors_yaml(text: &str) -> Result<Vec<ResourceDescriptor>, InputError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Parses a JSON array of resource objects.
pub fn parse_descriptors_json(text: &str) -> Result<Vec<ResourceDescriptor>, InputError> {
    Ok(serde_json::from_str(text)?)
}
