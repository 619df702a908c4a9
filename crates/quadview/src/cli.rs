use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "quadview",
    author,
    version,
    about = "Interactive GLSL shader viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Option string, e.g. `#shader:cube/start/hd`. Falls back to the saved one.
    #[arg(value_name = "OPTIONS")]
    pub options: Option<String>,

    /// Viewport size (e.g. `1280x720`); the render target is half of it unless `hd` is set.
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Extra directory of `*.frag`/`*.glsl` programs to register.
    #[arg(long, value_name = "DIR", env = "QUADVIEW_SHADER_DIR")]
    pub shader_dir: Option<PathBuf>,

    /// Override the state file location.
    #[arg(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Print the registered shader names and exit.
    #[arg(long)]
    pub list_shaders: bool,

    /// Do not write the option string back to the state file.
    #[arg(long)]
    pub no_persist: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print resolved directories and the saved option string.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}
