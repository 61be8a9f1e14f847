fn main() {
    #[cfg(feature = "run-bindgen")]
    {
        let header = std::env::var("SANE_HEADER")
            .unwrap_or_else(|_| "/usr/include/sane/sane.h".to_string());

        let bindings = bindgen::Builder::default()
            // The input header we would like to generate bindings for.
            .header(header)
            .allowlist_function("sane_.*")
            .allowlist_type("SANE_.*")
            .allowlist_var("SANE_.*")
            // derive defaults if possible
            .derive_default(true)
            // Tell cargo to invalidate the built crate whenever any of the
            // included header files changed.
            .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
            // Finish the builder and generate the bindings.
            .generate()
            .expect("Unable to generate bindings");

        let bindings_file = std::env::current_dir()
            .unwrap()
            .join("bindings")
            .join("sane.rs");
        bindings
            .write_to_file(bindings_file)
            .expect("Couldn't write bindings!");
    }

    // prevent linking for docs.rs
    #[cfg(not(feature = "docsrs"))]
    {
        if let Ok(dir) = std::env::var("SANE_LIB_DIR") {
            println!("cargo:rustc-link-search={dir}");
        }
        println!("cargo:rerun-if-env-changed=SANE_LIB_DIR");
        println!("cargo:rustc-link-lib=sane");
    }
}
