//! fsdb code generation - compiles path grammars into typed collection and
//! record types over folders of JSON documents.
//!
//! Each grammar statement describes one chain of folders ending in a record:
//!
//! ```text
//! /group/users/user -> User
//! /group/:id/meta -> Meta
//! ```
//!
//! The main entry points are [`generate`], which writes one file per statement
//! plus a `mod.rs` index, and [`generate_from_config`], which writes a single
//! bundle for `include!` from a build script.

pub mod config;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod grammar;
pub mod naming;
pub mod node;

pub use config::GeneratorConfig;
pub use error::{CodegenError, GrammarError, MalformedGrammar, Result};
pub use generator::{Generation, Generator, OutputUnit};

use std::path::{Path, PathBuf};

/// Outcome of a [`generate`] run.
#[derive(Debug, Default)]
pub struct Report {
    /// Files written, index last.
    pub written: Vec<PathBuf>,
    /// Statements that were skipped.
    pub rejected: Vec<MalformedGrammar>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Generate the data-access layer described by `config` into `config.output`.
///
/// Malformed statements are skipped and listed in the report; the remaining
/// statements are still generated. Rendering and filesystem failures abort
/// the run.
pub fn generate(config: &GeneratorConfig) -> Result<Report> {
    let mut generator = Generator::from_config(config)?;
    let mut rejected = Vec::new();
    for statement in &config.statements {
        if let Err(e) = generator.add_statement(statement) {
            log::warn!("{e}");
            rejected.push(e);
        }
    }

    let generation = generator.generate()?;
    let written = generation.write_to(&config.output)?;
    Ok(Report { written, rejected })
}

/// Render `config` as a single bundle. Any malformed statement is an error.
pub fn generate_bundle(config: &GeneratorConfig) -> Result<String> {
    let mut generator = Generator::from_config(config)?;
    for statement in &config.statements {
        generator.add_statement(statement)?;
    }
    generator.generate()?.bundle()
}

/// Read an `fsdb.yaml` config and write its bundle to `output_path`. This is
/// intended to be called from a `build.rs` build script.
///
/// # Example
///
/// ```no_run
/// // In build.rs:
/// let out = format!("{}/store.rs", std::env::var("OUT_DIR").unwrap());
/// fsdb_codegen::generate_from_config("fsdb.yaml", &out).unwrap();
/// ```
pub fn generate_from_config(config_path: &str, output_path: &str) -> Result<()> {
    let config = GeneratorConfig::from_yaml_file(Path::new(config_path))?;
    let bundle = generate_bundle(&config)?;
    std::fs::write(output_path, bundle)?;
    Ok(())
}
