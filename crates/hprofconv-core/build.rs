//! Build script for hprofconv-core
//!
//! Checks the minimum Rust version before compilation.
//!
//! ## Requirements
//!
//! - **Rust**: 1.65.0 or newer (`let ... else`)

fn main()
{
    let Ok(min_rust_version) = rustc_version::Version::parse("1.65.0") else {
        println!("cargo:warning=could not parse minimum Rust version");
        return;
    };

    if let Ok(rustc_version) = rustc_version::version() {
        if rustc_version < min_rust_version {
            panic!("hprofconv-core requires Rust {min_rust_version} or newer, found {rustc_version}");
        }
    } else {
        // Some build environments hide the compiler version
        println!("cargo:warning=could not verify Rust version");
    }
}
