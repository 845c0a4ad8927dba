//! CLI logic for the Terracanvas diagram tool.
//!
//! Each subcommand is a short pipeline over [`DiagramService`]: read
//! configuration or a snapshot from disk, run the engine, and write JSON or
//! configuration files back out.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use terracanvas::{
    DiagramService, TerracanvasError, codegen::GeneratedFiles, configuration::Configuration,
    graph::Graph,
};

/// Extension of configuration source files read from directories.
const SOURCE_EXTENSION: &str = "tf";

/// Run the Terracanvas CLI application
///
/// # Errors
///
/// Returns `TerracanvasError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Layout errors
/// - Generation errors
pub fn run(args: &Args) -> Result<(), TerracanvasError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let service = DiagramService::new(app_config);

    match &args.command {
        Command::Build { input, output } => {
            info!(input_path = input, output_path = output; "Building diagram");
            let graph = build(&service, Path::new(input))?;
            fs::write(output, serde_json::to_string_pretty(&graph)?)?;
            info!(output_file = output; "Snapshot written");
        }
        Command::Generate { snapshot, output } => {
            info!(snapshot_path = snapshot, output_dir = output; "Generating configuration");
            let graph: Graph = serde_json::from_str(&fs::read_to_string(snapshot)?)?;
            let id = diagram_id(Path::new(snapshot));
            service.import(&id, graph)?;
            write_files(&service.generate(&id)?, Path::new(output))?;
        }
        Command::RoundTrip { input, output } => {
            info!(input_path = input, output_dir = output; "Round-tripping configuration");
            let input = Path::new(input);
            build(&service, input)?;
            write_files(&service.generate(&diagram_id(input))?, Path::new(output))?;
        }
    }

    Ok(())
}

/// Load the configuration at `input` and build a diagram from it.
fn build(service: &DiagramService, input: &Path) -> Result<Graph, TerracanvasError> {
    let configuration = load_configuration(input)?;
    service.build_from_configuration(&diagram_id(input), &configuration)
}

/// Read a `.json` configuration, a single source file, or every source file
/// in a directory.
fn load_configuration(input: &Path) -> Result<Configuration, TerracanvasError> {
    if input.is_dir() {
        return load_directory(input);
    }

    let source = fs::read_to_string(input)?;
    if input.extension().and_then(|ext| ext.to_str()) == Some("json") {
        debug!(path = input.display().to_string(); "Reading JSON configuration");
        return Ok(serde_json::from_str(&source)?);
    }

    terracanvas_parser::parse(&source)
        .map_err(|err| TerracanvasError::new_parse_error(err, source))
}

fn load_directory(dir: &Path) -> Result<Configuration, TerracanvasError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<_, _>>()?;
    paths.retain(|path| {
        path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
    });
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in &paths {
        sources.push((path.display().to_string(), fs::read_to_string(path)?));
    }
    debug!(dir = dir.display().to_string(), files = sources.len(); "Reading configuration directory");

    terracanvas_parser::parse_files(
        sources
            .iter()
            .map(|(name, source)| (name.as_str(), source.as_str())),
    )
    .map_err(|err| {
        let src = sources
            .iter()
            .find(|(name, _)| Some(name.as_str()) == err.file())
            .map(|(_, source)| source.clone())
            .unwrap_or_default();
        TerracanvasError::new_parse_error(err, src)
    })
}

fn write_files(files: &GeneratedFiles, dir: &Path) -> Result<(), TerracanvasError> {
    fs::create_dir_all(dir)?;
    for (name, text) in files {
        let path = dir.join(name);
        fs::write(&path, text)?;
        info!(output_file = path.display().to_string(); "Configuration file written");
    }
    Ok(())
}

/// Diagram id derived from an input path's file stem.
fn diagram_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diagram".to_string())
}
