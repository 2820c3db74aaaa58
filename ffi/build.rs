use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=skipping playground.h: cargo did not set the build directories");
        return;
    };
    let header = PathBuf::from(out_dir).join("playground.h");

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("PLAYGROUND_H")
        .generate();

    match bindings {
        Ok(bindings) => {
            // The returned flag says whether the contents changed, not
            // whether the header exists.
            bindings.write_to_file(&header);
            if !header.is_file() {
                println!("cargo:warning=could not write {}", header.display());
            }
        }
        Err(err) => println!("cargo:warning=skipping playground.h: {err}"),
    }
}
