//! Operator-flip mutation testing for Rust
//!
//! This library finds arithmetic (`+ - * /`) and short-circuit boolean
//! (`&& ||`) operators in Rust source, flips each one to its paired opposite,
//! runs a test command against every mutant, and reports which mutants the
//! test suite killed. Every mutated file is restored before the next mutant.
//!
//! # Example Configuration
//!
//! ```yaml
//! version: "1.0"
//! settings:
//!   timeout: 120
//!
//! include:
//!   - src/**/*.rs
//! exclude:
//!   - src/generated/**/*.rs
//! test_command: cargo test --quiet
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use opflip::{Config, run_mutation_tests, MutationReport};
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("mutations.yaml")).unwrap();
//! let verdicts = run_mutation_tests(&config, Path::new(".")).unwrap();
//! let report = MutationReport::new(verdicts);
//! report.print();
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod generator;
pub mod mutation;
pub mod mutator;
pub mod operator;
pub mod report;
pub mod runner;
pub mod selector;
pub mod source;

// Re-export main types at crate root
pub use config::{Config, Settings};
pub use error::{MutationError, Result};
pub use executor::{ShellExecutor, TestExecutor, TestResult};
pub use generator::MutationGenerator;
pub use mutation::Mutation;
pub use operator::Operator;
pub use report::MutationReport;
pub use runner::{
    list_mutations, run_mutation_tests, MutationRunner, MutationStatus, SkipReason, Verdict,
};
pub use selector::select_files;
