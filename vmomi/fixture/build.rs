use std::env;
use std::path::PathBuf;

use vmomi_define::SchemaModel;
use vmomi_gen::config::GeneratorOptions;
use vmomi_gen::output::{generate_code, write_atomic};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema_path = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?)
        .join("../gen/tests/fixtures/schema.json");
    println!("cargo:rerun-if-changed={}", schema_path.display());

    let schema = SchemaModel::load(&schema_path)?;
    let options = GeneratorOptions::default().with_embedded(true);
    let code = generate_code(&schema, &options)?;

    let out_file = PathBuf::from(env::var("OUT_DIR")?).join("vmodl.rs");
    write_atomic(&out_file, &code)?;

    Ok(())
}
