//! # folio
//!
//! Command-line driver for the folio kernel: configuration loading, demo
//! components and the `folio` CLI.

pub mod cli;
pub mod config;
pub mod demo;
