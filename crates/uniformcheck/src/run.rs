use std::fs;

use anyhow::{bail, Context, Result};
use shaderparams::{ParamValue, ParameterTable, ParamsConfig, RecordingBinding};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub fn initialise_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let raw = fs::read_to_string(&cli.params)
        .with_context(|| format!("failed to read {}", cli.params.display()))?;
    let mut config = ParamsConfig::from_toml_str(&raw)
        .with_context(|| format!("invalid parameter file {}", cli.params.display()))?;
    if cli.verbose {
        config.debug = true;
    }

    let mut sources = vec![fs::read_to_string(&cli.fragment)
        .with_context(|| format!("failed to read {}", cli.fragment.display()))?];
    if let Some(vertex) = &cli.vertex {
        sources.push(
            fs::read_to_string(vertex)
                .with_context(|| format!("failed to read {}", vertex.display()))?,
        );
    }

    let mut gl = RecordingBinding::new();
    let program = gl.link(sources.iter().map(String::as_str));
    let mut table: ParameterTable<RecordingBinding> = config
        .to_table()
        .context("failed to build parameter table")?;

    for (name, raw_value) in &cli.overrides {
        let Some(view) = table.get(name) else {
            tracing::warn!(name = name.as_str(), "override for undeclared parameter ignored");
            continue;
        };
        let value = ParamValue::parse(view.kind, raw_value)
            .with_context(|| format!("invalid override for '{name}'"))?;
        table.update_value(name, value);
    }

    table.resolve_all(&gl, program);
    let pushed = table.push(&gl);

    for call in gl.take_calls() {
        println!(
            "set {} {} @{} = {}",
            call.name,
            call.value.kind(),
            call.location.slot,
            call.value
        );
    }
    println!("{pushed} of {} parameter(s) pushed", table.len());

    let declared = gl.declared(program);
    for (name, view) in table.iter() {
        if !view.location.is_found() {
            println!("unused {name}: not declared by the shader");
        }
    }

    let mut mismatches = 0;
    for uniform in declared {
        match table.get(&uniform.name) {
            None => println!(
                "missing {}: shader declares {} but no parameter drives it",
                uniform.name, uniform.glsl_type
            ),
            Some(view) if uniform.kind != Some(view.kind) => {
                mismatches += 1;
                println!(
                    "mismatch {}: shader declares {} but parameter is {}",
                    uniform.name, uniform.glsl_type, view.kind
                );
            }
            Some(_) => {}
        }
    }

    if mismatches > 0 {
        bail!("{mismatches} parameter kind mismatch(es) found");
    }
    Ok(())
}
