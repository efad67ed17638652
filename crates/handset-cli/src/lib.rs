#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Library entry point for the handset admin CLI.
//!
//! Layout:
//! - `cli.rs`: clap definitions, logging setup, and dispatch
//! - `client.rs`: error type and the per-invocation context
//! - `commands/`: category, phone, and dashboard handlers
//! - `output.rs`: table/JSON renderers

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
