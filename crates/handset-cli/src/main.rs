//! `handset` binary: delegates to the library entry point.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = handset_cli::run().await;
    process::exit(exit_code);
}
