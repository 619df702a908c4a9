//! Maps shader names to program text.
//!
//! The registry is a closed set: callers ask for a name and either receive the
//! source or a [`RegistryError::UnknownShader`] listing what is available. It
//! never substitutes a different program on its own; picking a default is the
//! caller's decision.
//!
//! Built-in fragments are compiled into the binary. `load_dir` layers a user
//! directory on top, where every `*.frag` / `*.glsl` file becomes a program
//! named after its file stem.
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::builtin;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown shader '{name}' (available: {})", .known.join(", "))]
    UnknownShader { name: String, known: Vec<String> },

    #[error("shader directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("failed to read shader source at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    source: String,
    origin: Origin,
}

/// Where a registered fragment program came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Builtin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ShaderRegistry {
    vertex: String,
    fragments: Vec<Entry>,
}

impl ShaderRegistry {
    /// Registry holding only the vertex program; mostly useful in tests.
    pub fn empty() -> Self {
        Self {
            vertex: builtin::PROJECTION_VERTEX.to_string(),
            fragments: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (name, source) in builtin::FRAGMENTS {
            registry.insert(name, source.to_string(), Origin::Builtin);
        }
        registry
    }

    /// The projection vertex program shared by every fragment.
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self, name: &str) -> Result<&str, RegistryError> {
        self.fragments
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.source.as_str())
            .ok_or_else(|| RegistryError::UnknownShader {
                name: name.to_string(),
                known: self.names().map(str::to_string).collect(),
            })
    }

    pub fn origin(&self, name: &str) -> Option<&Origin> {
        self.fragments
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.origin)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.iter().any(|entry| entry.name == name)
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.fragments.get(index).map(|entry| entry.name.as_str())
    }

    /// Name registered after `current`, wrapping around.
    pub fn next_after(&self, current: &str) -> Option<&str> {
        if self.fragments.is_empty() {
            return None;
        }
        let next = self
            .fragments
            .iter()
            .position(|entry| entry.name == current)
            .map(|index| (index + 1) % self.fragments.len())
            .unwrap_or(0);
        self.name_at(next)
    }

    /// Registers (or replaces) a fragment program.
    pub fn insert(&mut self, name: &str, source: String, origin: Origin) {
        if let Some(entry) = self.fragments.iter_mut().find(|entry| entry.name == name) {
            debug!(shader = name, ?origin, "replacing registered shader");
            entry.source = source;
            entry.origin = origin;
        } else {
            self.fragments.push(Entry {
                name: name.to_string(),
                source,
                origin,
            });
        }
    }

    /// Adds every `*.frag` / `*.glsl` file in `dir`; returns the names added.
    ///
    /// Files are visited in name order so the selector is stable between runs.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<String>, RegistryError> {
        if !dir.is_dir() {
            return Err(RegistryError::MissingDirectory(dir.to_path_buf()));
        }

        let read_err = |source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if is_fragment_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut added = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(path = %path.display(), "skipping shader with non UTF-8 name");
                continue;
            };
            let source = fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            let name = name.to_string();
            self.insert(&name, source, Origin::File(path.clone()));
            debug!(shader = %name, path = %path.display(), "registered shader from directory");
            added.push(name);
        }
        Ok(added)
    }
}

impl Default for ShaderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_fragment_file(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("frag") | Some("glsl")
        )
}
