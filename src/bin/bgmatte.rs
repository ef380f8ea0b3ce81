//! bgmatte CLI tool
//!
//! Command-line interface for removing backgrounds from still images using
//! the bgmatte library's deterministic separation pipeline.

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    bgmatte::cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
