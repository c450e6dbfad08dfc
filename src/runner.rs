//! Mutation runner
//!
//! This module coordinates the mutation testing process:
//! - Selects files and generates mutations against their pristine content
//! - Runs the test command once against the unmutated tree
//! - Applies each mutation in turn and runs the test command
//! - Restores the pristine content before the next mutation
//! - Collects verdicts

use std::cell::Cell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{MutationError, Result};
use crate::executor::{ShellExecutor, TestExecutor, TestResult};
use crate::generator::MutationGenerator;
use crate::mutation::Mutation;
use crate::mutator::{apply_mutation, MutantGuard};
use crate::selector::select_files;

/// Status of a mutation after testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    /// Tests failed - mutation was detected (good!)
    Killed,
    /// Tests passed - mutation was NOT detected (bad!)
    Survived,
    /// Tests timed out; counted as killed
    Timeout,
}

/// Result of testing a single mutation
#[derive(Debug, Clone)]
pub struct Verdict {
    pub mutation: Mutation,
    pub status: MutationStatus,
    pub duration: Duration,
    /// Combined test output
    pub output: String,
}

impl Verdict {
    pub fn from_result(mutation: Mutation, result: TestResult) -> Self {
        let status = if result.timed_out {
            MutationStatus::Timeout
        } else if result.succeeded {
            MutationStatus::Survived
        } else {
            MutationStatus::Killed
        };

        Self {
            mutation,
            status,
            duration: result.duration,
            output: result.output,
        }
    }

    /// The test command did not pass against the mutant
    pub fn killed(&self) -> bool {
        self.status != MutationStatus::Survived
    }

    pub fn survived(&self) -> bool {
        !self.killed()
    }
}

/// Why a selected file produced no verdicts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    Unreadable(String),
    Unparsable(String),
    /// Writing a mutant failed part way through the file
    Unwritable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "file does not exist"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {}", e),
            SkipReason::Unparsable(e) => write!(f, "unparsable: {}", e),
            SkipReason::Unwritable(e) => write!(f, "unwritable: {}", e),
        }
    }
}

/// Drives one mutation testing run
pub struct MutationRunner<'a, E> {
    config: &'a Config,
    project_dir: PathBuf,
    executor: E,
    generator: MutationGenerator,
    on_verdict: Option<Box<dyn Fn(&Verdict) + 'a>>,
    baseline_checked: Cell<bool>,
}

impl<'a, E: TestExecutor> MutationRunner<'a, E> {
    pub fn new(config: &'a Config, project_dir: &Path, executor: E) -> Self {
        Self {
            config,
            project_dir: project_dir.to_path_buf(),
            executor,
            generator: MutationGenerator::new(),
            on_verdict: None,
            baseline_checked: Cell::new(false),
        }
    }

    /// Call `f` as soon as each verdict is known
    pub fn on_verdict(mut self, f: impl Fn(&Verdict) + 'a) -> Self {
        self.on_verdict = Some(Box::new(f));
        self
    }

    pub fn select_files(&self) -> Result<Vec<PathBuf>> {
        select_files(&self.project_dir, &self.config.include, &self.config.exclude)
    }

    /// Test every mutation of every selected file
    ///
    /// Files that can't be read or parsed are skipped. A test command that
    /// can't be executed on the unmutated tree, or a file that can't be
    /// restored, aborts the run.
    pub fn run(&self) -> Result<Vec<Verdict>> {
        let files = self.select_files()?;
        info!("{} file(s) selected", files.len());

        let mut verdicts = Vec::new();
        for file in &files {
            if let Some(reason) = self.process_file(file, &mut verdicts)? {
                warn!("skipping {}: {}", self.display_path(file), reason);
            }
        }

        Ok(verdicts)
    }

    /// Test all mutations of one file, appending verdicts
    pub fn process_file(
        &self,
        path: &Path,
        verdicts: &mut Vec<Verdict>,
    ) -> Result<Option<SkipReason>> {
        let pristine = match read_source(path) {
            Ok(source) => source,
            Err(reason) => return Ok(Some(reason)),
        };

        let shown = self.display_path(path);
        let mutations = match self.generator.try_generate(&pristine, &shown) {
            Ok(mutations) => mutations,
            Err(e) => return Ok(Some(SkipReason::Unparsable(e.to_string()))),
        };
        info!("{}: {} mutation(s)", shown, mutations.len());

        if !mutations.is_empty() {
            self.check_baseline()?;
        }

        for mutation in mutations {
            match self.run_mutation(path, &pristine, mutation) {
                Ok(verdict) => {
                    if let Some(f) = &self.on_verdict {
                        f(&verdict);
                    }
                    verdicts.push(verdict);
                }
                Err(MutationError::WriteError { error, .. }) => {
                    return Ok(Some(SkipReason::Unwritable(error)));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("{}: skipping mutation: {}", shown, e),
            }
        }

        Ok(None)
    }

    /// Run the test command once before the first mutant is written
    ///
    /// A shell that can't find or execute the command aborts the run. A
    /// failing or timed out suite only warns, since every mutant will then
    /// look killed.
    fn check_baseline(&self) -> Result<()> {
        if self.baseline_checked.get() {
            return Ok(());
        }

        let command = &self.config.test_command;
        let result = self.executor.run_tests(command)?;
        if let Some(code) = result.exit_code.filter(|_| result.command_not_found()) {
            return Err(MutationError::TestExecutionError {
                command: command.clone(),
                error: format!("shell exited with status {} on the unmutated tree", code),
            });
        }

        if result.timed_out {
            warn!("`{}` times out on the unmutated tree", command);
        } else if !result.succeeded {
            warn!(
                "`{}` fails on the unmutated tree; every mutant will be reported killed",
                command
            );
        } else {
            info!("baseline passed ({}ms)", result.duration.as_millis());
        }

        self.baseline_checked.set(true);
        Ok(())
    }

    /// Apply, execute, restore
    fn run_mutation(&self, path: &Path, pristine: &str, mutation: Mutation) -> Result<Verdict> {
        let mutated = apply_mutation(pristine, &mutation)?;

        let guard = MutantGuard::apply(path, pristine, &mutated)?;
        let result = self.executor.run_tests(&self.config.test_command);
        guard.restore()?;

        let verdict = Verdict::from_result(mutation, result?);
        info!(
            "{} = {:?} ({}ms)",
            verdict.mutation.description(),
            verdict.status,
            verdict.duration.as_millis()
        );
        Ok(verdict)
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_dir)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

fn read_source(path: &Path) -> std::result::Result<String, SkipReason> {
    if !path.exists() {
        return Err(SkipReason::Missing);
    }
    fs::read_to_string(path).map_err(|e| SkipReason::Unreadable(e.to_string()))
}

/// Run mutation testing with the given configuration through the shell
pub fn run_mutation_tests(config: &Config, project_dir: &Path) -> Result<Vec<Verdict>> {
    let executor = ShellExecutor::new(project_dir).with_timeout(config.settings.timeout());
    MutationRunner::new(config, project_dir, executor).run()
}

/// List the mutations of every selected file without running anything
pub fn list_mutations(config: &Config, project_dir: &Path) -> Result<Vec<Mutation>> {
    let generator = MutationGenerator::new();
    let mut mutations = Vec::new();

    for file in select_files(project_dir, &config.include, &config.exclude)? {
        let shown = file
            .strip_prefix(project_dir)
            .unwrap_or(&file)
            .display()
            .to_string();
        match read_source(&file) {
            Ok(source) => mutations.extend(generator.generate_mutations_for(&source, &shown)),
            Err(reason) => warn!("skipping {}: {}", shown, reason),
        }
    }

    Ok(mutations)
}
