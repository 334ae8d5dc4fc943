// Generates the built-in bindings from bindings.json into $OUT_DIR/bindings.rs

#[allow(dead_code, unused_imports)]
#[path = "src/binding/mod.rs"]
mod binding;

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=bindings.json");
    println!("cargo:rerun-if-changed=src/binding");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let registry = binding::load_manifest(&manifest_dir.join("bindings.json"))?;

    let options = binding::EmitOptions {
        runtime_path: "crate::vm".to_string(),
        types_path: Some("super".to_string()),
        source: Some("bindings.json".to_string()),
    };
    let unit = binding::emit_unit(&registry, &options);

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    fs::write(out_dir.join("bindings.rs"), unit)?;
    Ok(())
}
