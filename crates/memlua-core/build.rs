//! Build script for memlua-core
//!
//! Checks the toolchain before compilation. The embedded Lua state comes from
//! `mlua` 0.10, which needs Rust 1.79.0 or newer.

fn main()
{
    let Ok(min_rust_version) = rustc_version::Version::parse("1.79.0") else {
        println!("cargo:warning=could not parse minimum Rust version");
        return;
    };

    if let Ok(rustc_version) = rustc_version::version() {
        if rustc_version < min_rust_version {
            panic!(
                "memlua-core requires Rust {} or newer, found {}",
                min_rust_version, rustc_version
            );
        }
    } else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }
}
