use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");

    // The C header is only needed by the iOS bridge.
    if env::var_os("CARGO_FEATURE_IOS").is_none() {
        return;
    }

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let include_dir = crate_dir.join("include");
    std::fs::create_dir_all(&include_dir).expect("Unable to create include directory");
    let header = include_dir.join("gb_pocketcam.h");

    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("GB_POCKETCAM_H")
        .with_sys_include("stdbool.h")
        .generate()
        .expect("Unable to generate C bindings")
        .write_to_file(header);
}
