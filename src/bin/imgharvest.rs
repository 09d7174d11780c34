//! Image Harvest CLI Tool
//!
//! Command-line interface for the keyword-driven image acquisition and
//! post-processing pipeline provided by the imgharvest library.

#[cfg(feature = "cli")]
use imgharvest::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
