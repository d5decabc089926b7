// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Loading the backend/place registry from a places description file.
//!
//! The file format is described in [`crate::core::parser`]. Paths may start
//! with `~`, which is expanded to the user's home directory.
//!
//! # Example
//!
//! ```no_run
//! use keyring_sidebar::config::load_registry;
//! use std::path::Path;
//!
//! let registry = load_registry(Path::new("~/.config/keyring-sidebar/places.conf"))?;
//! println!("{} backends", registry.len());
//! # Ok::<(), keyring_sidebar::config::ConfigError>(())
//! ```

mod error;

pub use error::ConfigError;

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::parser::parse_places_file;
use crate::core::Registry;

/// Where the places file lives unless told otherwise
pub const DEFAULT_PLACES_PATH: &str = "~/.config/keyring-sidebar/places.conf";

/// Expands a leading `~` in a path
///
/// # Errors
///
/// Returns `ConfigError::InvalidPath` if the path is not valid UTF-8.
pub fn expand_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path
        .to_str()
        .ok_or_else(|| ConfigError::InvalidPath(path.display().to_string()))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// Reads and parses a places file into a fresh registry
///
/// # Errors
///
/// - `ConfigError::NotFound` if the file does not exist
/// - `ConfigError::Parse` on a syntax error (with line number)
/// - `ConfigError::Io` if the file cannot be read
pub fn load_registry(path: &Path) -> Result<Registry, ConfigError> {
    let path = expand_path(path)?;
    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }

    if path.read_link().is_ok() {
        warn!("Places file is a symlink: {}", path.display());
    }

    let content = fs::read_to_string(&path)?;
    let registry = registry_from_str(&content)?;
    debug!("Loaded {} backends from {}", registry.len(), path.display());
    Ok(registry)
}

/// Parses places file content into a fresh registry
pub fn registry_from_str(content: &str) -> Result<Registry, ConfigError> {
    let sections = parse_places_file(content)?;
    Ok(Registry::from_sections(sections))
}

#[cfg(test)]
mod tests;
