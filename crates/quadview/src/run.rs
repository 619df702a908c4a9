use anyhow::Result;
use renderer::{run_window, WindowOptions, DEFAULT_VIEWPORT};
use shaders::{Origin, ShaderRegistry};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{bootstrap, build_registry, parse_surface_size};
use crate::cli::RunArgs;
use crate::paths::AppPaths;
use crate::state::AppState;

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let registry = build_registry(&args, &paths)?;

    if args.list_shaders {
        print_shaders(&registry);
        return Ok(());
    }

    let startup = bootstrap(&args, &paths);
    let viewport = args
        .size
        .as_deref()
        .map(parse_surface_size)
        .transpose()?
        .unwrap_or(DEFAULT_VIEWPORT);
    tracing::debug!(
        config = %paths.config_dir().display(),
        state = %startup.state_file.display(),
        shaders = registry.len(),
        "resolved quadview paths"
    );
    tracing::info!(
        shader = startup.config.shader_or_default(),
        hd = startup.config.high_definition,
        start = startup.config.auto_start,
        source = ?startup.source,
        width = viewport.0,
        height = viewport.1,
        "launching viewer"
    );

    let state_file = startup.state_file.clone();
    let mut state = startup.state.clone();
    let persist = !args.no_persist;
    run_window(
        startup.config,
        registry,
        WindowOptions::new(viewport),
        move |options: &str| {
            if !persist {
                return;
            }
            state.options = Some(options.to_string());
            if let Err(err) = state.persist(&state_file) {
                tracing::warn!(error = %format!("{err:#}"), "failed to save option string");
            } else {
                tracing::debug!(options, path = %state_file.display(), "saved option string");
            }
        },
    )
}

pub fn print_paths(args: &RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let startup = bootstrap(args, &paths);
    println!("Configuration directories:");
    println!("  config:     {}", paths.config_dir().display());
    println!("  shaders:    {}", paths.shader_dir().display());
    println!("  state:      {}", startup.state_file.display());
    match &startup.state {
        AppState {
            options: Some(options),
        } => println!("Saved options: {options}"),
        AppState { options: None } => println!("Saved options: (none)"),
    }
    Ok(())
}

fn print_shaders(registry: &ShaderRegistry) {
    for (index, name) in registry.names().enumerate() {
        let origin = match registry.origin(name) {
            Some(Origin::File(path)) => path.display().to_string(),
            _ => "built-in".to_string(),
        };
        println!("{:>2}  {name:<16} {origin}", index + 1);
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
