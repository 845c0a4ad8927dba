//! Command-line argument definitions for the Terracanvas CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the pipeline to run; the global flags
//! control configuration file selection and logging verbosity.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Terracanvas diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Pipelines exposed by the CLI
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a laid-out diagram snapshot from configuration files
    Build {
        /// A `.tf` file, a directory of `.tf` files, or a `.json` configuration
        input: String,

        /// Path to the output snapshot JSON file
        #[arg(short, long, default_value = "diagram.json")]
        output: String,
    },

    /// Generate configuration files from a diagram snapshot
    Generate {
        /// Path to a snapshot JSON file written by `build`
        snapshot: String,

        /// Directory to write the generated files into
        #[arg(short, long, default_value = "generated")]
        output: String,
    },

    /// Parse, build and generate in one step
    RoundTrip {
        /// A `.tf` file, a directory of `.tf` files, or a `.json` configuration
        input: String,

        /// Directory to write the generated files into
        #[arg(short, long, default_value = "generated")]
        output: String,
    },
}
