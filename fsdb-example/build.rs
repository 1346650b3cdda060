fn main() {
    println!("cargo:rerun-if-changed=fsdb.yaml");
    fsdb_codegen::generate_from_config(
        "fsdb.yaml",
        &format!("{}/store.rs", std::env::var("OUT_DIR").unwrap()),
    )
    .expect("Code generation failed");
}
