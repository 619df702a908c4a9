//! Startup options for the viewer.
//!
//! Options arrive as a single `/`-separated string such as
//! `shader:cube/start/hd` (optionally prefixed with `#`). Segments of the form
//! `key:value` carry a string value, every other segment is a presence flag.
//! Parsing never fails: malformed values are reported back as warnings and the
//! default is kept.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const KEY_SHADER: &str = "shader";
pub const KEY_HD: &str = "hd";
pub const KEY_START: &str = "start";

/// Shader selected when the options do not name one.
pub const DEFAULT_SHADER: &str = "upstream";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("option '{key}' expects a boolean, got '{value}'")]
    InvalidFlag { key: String, value: String },
    #[error("option '{key}' requires a value")]
    MissingValue { key: String },
}

/// Immutable snapshot of the startup options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerConfig {
    pub shader: Option<String>,
    pub high_definition: bool,
    pub auto_start: bool,
    /// Unrecognised keys; stored as flags and ignored by the viewer.
    pub flags: BTreeSet<String>,
    /// Unrecognised `key:value` pairs.
    pub values: BTreeMap<String, String>,
}

/// Result of a lenient parse.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub config: ViewerConfig,
    pub warnings: Vec<ConfigError>,
}

impl ViewerConfig {
    pub fn parse(input: &str) -> Parsed {
        let mut parsed = Parsed::default();
        let trimmed = input.trim().trim_start_matches('#');

        for segment in trimmed.split('/') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match split_pair(segment) {
                Some((key, value)) => parsed.apply_value(key, value),
                None => parsed.apply_flag(segment),
            }
        }

        parsed
    }

    /// Name of the shader to load, falling back to [`DEFAULT_SHADER`].
    pub fn shader_or_default(&self) -> &str {
        self.shader.as_deref().unwrap_or(DEFAULT_SHADER)
    }

    /// Render target size for the given viewport; halved unless `hd` is set.
    pub fn render_size(&self, viewport: (u32, u32)) -> (u32, u32) {
        let divisor = if self.high_definition { 1 } else { 2 };
        (
            (viewport.0 / divisor).max(1),
            (viewport.1 / divisor).max(1),
        )
    }

    pub fn with_shader(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.shader = Some(name.to_string());
        next
    }

    /// Rebuilds the option string so a restart reproduces this snapshot.
    ///
    /// Only the recognised options are written; unknown keys are dropped.
    pub fn to_fragment(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(shader) = &self.shader {
            parts.push(format!("{KEY_SHADER}:{shader}"));
        }
        if self.auto_start {
            parts.push(KEY_START.to_string());
        }
        if self.high_definition {
            parts.push(KEY_HD.to_string());
        }
        parts.join("/")
    }
}

impl fmt::Display for ViewerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_fragment())
    }
}

impl Parsed {
    fn apply_flag(&mut self, key: &str) {
        match key {
            KEY_HD => self.config.high_definition = true,
            KEY_START => self.config.auto_start = true,
            KEY_SHADER => self.warnings.push(ConfigError::MissingValue {
                key: key.to_string(),
            }),
            other => {
                self.config.flags.insert(other.to_string());
            }
        }
    }

    fn apply_value(&mut self, key: &str, value: &str) {
        match key {
            KEY_SHADER => self.config.shader = Some(value.to_string()),
            KEY_HD => {
                if let Some(flag) = self.parse_bool(key, value) {
                    self.config.high_definition = flag;
                }
            }
            KEY_START => {
                if let Some(flag) = self.parse_bool(key, value) {
                    self.config.auto_start = flag;
                }
            }
            other => {
                self.config
                    .values
                    .insert(other.to_string(), value.to_string());
            }
        }
    }

    fn parse_bool(&mut self, key: &str, value: &str) -> Option<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => {
                self.warnings.push(ConfigError::InvalidFlag {
                    key: key.to_string(),
                    value: value.to_string(),
                });
                None
            }
        }
    }
}

fn split_pair(segment: &str) -> Option<(&str, &str)> {
    let (key, value) = segment.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}
