use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=namespaces.toml");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    file_local_ns_build::generate("namespaces.toml", out_dir.join("namespaces.rs"))
        .expect("namespaces.toml should generate");
}
