//! Map tile provider credentials.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Reads an access token from `path`.
///
/// The token is the file's content with surrounding whitespace removed. A
/// missing or blank file yields `None` so callers can fall back to a tile
/// style that needs no token.
pub fn read_token(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            if token.is_empty() {
                debug!("token file {} is empty", path.display());
                Ok(None)
            } else {
                Ok(Some(token.to_string()))
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no token file at {}", path.display());
            Ok(None)
        }
        Err(err) => Err(err).with_context(|| format!("reading token file {}", path.display())),
    }
}
