#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

//! `unspool` binary entrypoint.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = unspool_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
