//! Vmodl Code Generator
//!
//! Generates a typed Rust client module from a vmodl schema document.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use vmomi_define::SchemaModel;
use vmomi_gen::cargo_gen::write_cargo_toml;
use vmomi_gen::config::{DEFAULT_CRATE_NAME, DEFAULT_ROOT_TYPE, DEFAULT_RUNTIME_CRATE, GeneratorOptions};
use vmomi_gen::errors::GeneratorError;
use vmomi_gen::extract::{DEFAULT_EXTRACT_COMMAND, SchemaExtractor};
use vmomi_gen::output::generate_and_write;

/// vmodl code generator - transforms a schema document into a typed Rust client
#[derive(Parser, Debug)]
#[command(name = "vmomi-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema document to generate from
    #[arg(short, long, default_value = "vmomi.json")]
    schema: PathBuf,

    /// Output directory for generated code
    #[arg(short, long, default_value = "generated/src")]
    output: PathBuf,

    /// Run the extraction command to (re)create the schema document first
    #[arg(long)]
    extract: bool,

    /// Command that writes the schema document to the path appended to it
    #[arg(long, default_value = DEFAULT_EXTRACT_COMMAND)]
    extract_command: String,

    /// Rust path generated code uses to reach the runtime
    #[arg(long, default_value = DEFAULT_RUNTIME_CRATE)]
    runtime_crate: String,

    /// Filesystem path of the runtime crate, written to the generated Cargo.toml
    #[arg(long)]
    runtime_path: Option<String>,

    /// Wire name of the service entry point
    #[arg(long, default_value = DEFAULT_ROOT_TYPE)]
    root_type: String,

    /// Package name of the generated crate
    #[arg(long, default_value = DEFAULT_CRATE_NAME)]
    crate_name: String,

    /// Also write Cargo.toml next to the output directory
    #[arg(long)]
    cargo_toml: bool,

    /// Omit module docs and inner attributes, for use with include!
    #[arg(long)]
    embedded: bool,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> GeneratorOptions {
        let options = GeneratorOptions::default()
            .with_runtime_crate(&self.runtime_crate)
            .with_root_type(&self.root_type)
            .with_crate_name(&self.crate_name)
            .with_embedded(self.embedded);
        match &self.runtime_path {
            Some(path) => options.with_runtime_path(path),
            None => options,
        }
    }
}

fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,vmomi_gen=info".to_string(),
            2 => "info,vmomi_gen=debug,vmomi_define=debug".to_string(),
            _ => "debug,vmomi_gen=trace,vmomi_define=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = cli.options();
    options.validate()?;

    let schema = if cli.extract {
        SchemaExtractor::from_command_line(&cli.extract_command)?.extract_and_load(&cli.schema)?
    } else {
        SchemaModel::load(&cli.schema)?
    };
    info!(
        schema = %cli.schema.display(),
        enums = schema.enum_types.len(),
        data_types = schema.data_types.len(),
        managed_types = schema.managed_types.len(),
        "loaded schema"
    );
    if cli.dry_run {
        debug!("dry run, no files will be written");
    }

    generate_and_write(&schema, &options, &cli.output, cli.dry_run)?;

    if cli.cargo_toml {
        // The output directory points at src/, Cargo.toml goes one level up.
        let package_dir = cli.output.parent().unwrap_or(Path::new("."));
        write_cargo_toml(package_dir, &options, cli.dry_run)?;
    }

    if !cli.dry_run {
        eprintln!("Generated {}/lib.rs", cli.output.display());
    }

    Ok(())
}
