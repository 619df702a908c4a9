use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shaders::ShaderRegistry;
use tracing::{debug, warn};
use viewconfig::ViewerConfig;

use crate::cli::RunArgs;
use crate::paths::AppPaths;
use crate::state::AppState;

/// Where the startup option string came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsSource {
    CommandLine,
    StateFile,
    Empty,
}

pub struct Startup {
    pub config: ViewerConfig,
    pub source: OptionsSource,
    pub state_file: PathBuf,
    pub state: AppState,
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1280x720"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }

    Ok((width, height))
}

pub fn state_file(args: &RunArgs, paths: &AppPaths) -> PathBuf {
    args.state_file
        .clone()
        .unwrap_or_else(|| paths.state_file())
}

/// Reads the saved state; an unreadable file is reported and ignored.
pub fn load_state(path: &Path) -> AppState {
    match AppState::load_or_default(path) {
        Ok(state) => state,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "ignoring unreadable state file");
            AppState::default()
        }
    }
}

/// Picks the option string (command line, then saved state, then empty)
/// and parses it, logging anything that was ignored.
pub fn resolve_config(args: &RunArgs, state: &AppState) -> (ViewerConfig, OptionsSource) {
    let (raw, source) = match (&args.options, &state.options) {
        (Some(options), _) => (options.as_str(), OptionsSource::CommandLine),
        (None, Some(saved)) => (saved.as_str(), OptionsSource::StateFile),
        (None, None) => ("", OptionsSource::Empty),
    };
    let parsed = ViewerConfig::parse(raw);
    for warning in &parsed.warnings {
        warn!(%warning, "ignoring option");
    }
    debug!(options = raw, ?source, "resolved startup options");
    (parsed.config, source)
}

pub fn bootstrap(args: &RunArgs, paths: &AppPaths) -> Startup {
    let state_file = state_file(args, paths);
    let state = load_state(&state_file);
    let (config, source) = resolve_config(args, &state);
    Startup {
        config,
        source,
        state_file,
        state,
    }
}

/// Built-in programs, then the user shader directory, then `--shader-dir`.
pub fn build_registry(args: &RunArgs, paths: &AppPaths) -> Result<ShaderRegistry> {
    let mut registry = ShaderRegistry::builtin();

    let user_dir = paths.shader_dir();
    if user_dir.is_dir() {
        let loaded = registry
            .load_dir(&user_dir)
            .with_context(|| format!("failed to load shaders from {}", user_dir.display()))?;
        debug!(dir = %user_dir.display(), count = loaded.len(), "loaded user shaders");
    }

    if let Some(dir) = &args.shader_dir {
        let loaded = registry
            .load_dir(dir)
            .with_context(|| format!("failed to load shaders from {}", dir.display()))?;
        debug!(dir = %dir.display(), count = loaded.len(), "loaded shader directory");
    }

    Ok(registry)
}
