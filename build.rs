fn main() {
    // ONNX Runtime is only linked when the `onnx` backend is compiled in
    if std::env::var_os("CARGO_FEATURE_ONNX").is_some() {
        println!("cargo:rustc-link-search=native=onnxruntime-linux-x64-1.22.0/lib");
        println!("cargo:rustc-link-lib=dylib=onnxruntime");
        println!("cargo:rerun-if-changed=onnxruntime-linux-x64-1.22.0/");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
