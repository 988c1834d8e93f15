//! Build-time utilities for file-local-ns.
//!
//! This crate provides tools for:
//! - Parsing `namespaces.toml` descriptions
//! - Generating the namespace modules, their aliases and the shorthand
//! - Forcing the counter past the cutoff to exercise the overflow path
//!
//! # Usage in build.rs
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     println!("cargo:rerun-if-changed=namespaces.toml");
//!     let out = std::path::Path::new(&std::env::var("OUT_DIR").unwrap()).join("namespaces.rs");
//!     file_local_ns_build::generate("namespaces.toml", out)
//!         .expect("Failed to generate namespaces");
//! }
//!
//! // src/lib.rs
//! mod namespaces {
//!     include!(concat!(env!("OUT_DIR"), "/namespaces.rs"));
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! prefix = "File_Local_Namespace_"   # default
//! shorthand = "FLN"                  # default
//! suppress_shorthand = false
//! bit_width = 10                     # cutoff = 2^bit_width
//! retry_bound = 10                   # re-advances allowed past the cutoff
//! force_overflow = false
//!
//! [[namespace]]
//! alias = "time"
//! reexports = ["std::time::*"]
//! ```
//!
//! Module names are not stable across builds. Only aliases and the shorthand
//! should be referenced from hand-written code.

mod codegen;
mod toml_parser;

pub use codegen::{generate_namespace_code, Generated};
pub use toml_parser::{ConfigError, NamespaceEntry, NamespacesConfig};

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

/// Main entry point for build.rs integration.
///
/// Reads `namespaces.toml`, generates the modules and writes them to
/// `output_path`.
///
/// # Errors
///
/// Returns an error if:
/// - the config cannot be read, parsed or validated
/// - two inclusions collide and cannot be re-advanced apart
/// - the output file cannot be written
pub fn generate(
    config_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<Generated, GenerateError> {
    let config_path = config_path.as_ref();
    let output_path = output_path.as_ref();

    let config = NamespacesConfig::from_file(config_path)?;
    debug!(
        config = %config_path.display(),
        namespaces = config.len(),
        "parsed namespace description"
    );

    let generated = generate_from_config(&config)?;
    std::fs::write(output_path, &generated.code)?;

    info!(
        output = %output_path.display(),
        inclusions = generated.inclusions.len(),
        "wrote namespace modules"
    );
    Ok(generated)
}

/// Generate from an already parsed config, emitting cargo warnings for
/// inclusions that needed the overflow path.
pub fn generate_from_config(config: &NamespacesConfig) -> Result<Generated, GenerateError> {
    let generated = generate_namespace_code(config)?;

    if let Some(points) = &generated.continuation {
        println!(
            "cargo:warning=file-local-ns: counter crossed cutoff {} at `{}`; continuation counter {}, final {}",
            config.generator.layout.cutoff(),
            points.identifier(),
            points.counter(),
            points.final_counter(),
        );
    }
    for inclusion in generated.inclusions.iter().filter(|inc| inc.attempts > 1) {
        println!(
            "cargo:warning=file-local-ns: `{}` needed {} attempts",
            inclusion.identifier, inclusion.attempts
        );
    }

    Ok(generated)
}

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Failed to read or validate namespaces.toml
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// Identifier conflict or misconfigured layout
    #[error("Generation error: {0}")]
    Generation(#[from] file_local_ns::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
