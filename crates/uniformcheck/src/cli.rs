use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "uniformcheck",
    author,
    version,
    about = "Check shader parameter declarations against GLSL sources"
)]
pub struct Cli {
    /// Parameter declarations (TOML).
    #[arg(long, value_name = "FILE")]
    pub params: PathBuf,

    /// Fragment shader source.
    #[arg(long, value_name = "FILE")]
    pub fragment: PathBuf,

    /// Optional vertex shader source; its uniforms are linked with the fragment stage.
    #[arg(long, value_name = "FILE")]
    pub vertex: Option<PathBuf>,

    /// Override a parameter before pushing (`name=value`, vectors as `x,y,z`). Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(String, String)>,

    /// Log table resolution and pushes at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("parameter name may not be empty".into());
    }
    Ok((name.to_string(), value.trim().to_string()))
}
