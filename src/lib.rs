//! Detect which languages a repository contains and run their linters,
//! formatters and secret scanners, each in a disposable container.

pub mod config;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod sandbox;

pub use error::{Error, Result};
