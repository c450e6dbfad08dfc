//! Mutation application
//!
//! This module turns a [`Mutation`] into mutated file content and owns the
//! on-disk lifecycle of a mutant: write it, then put the pristine content back.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::{MutationError, Result};
use crate::mutation::Mutation;
use crate::source::SourceMap;

/// Apply a mutation to pristine source text
///
/// The replacement happens at the recorded line and column. If that position
/// doesn't hold `original_code`, the first occurrence starting on the recorded
/// line is used instead. Other lines are never touched.
pub fn apply_mutation(source: &str, mutation: &Mutation) -> Result<String> {
    let map = SourceMap::new(source);
    let line = map
        .line_range(mutation.line_number)
        .ok_or_else(|| MutationError::FailedToApply {
            reason: format!(
                "line {} out of range ({} lines)",
                mutation.line_number,
                map.line_count()
            ),
        })?;

    let exact = mutation
        .column
        .checked_sub(1)
        .and_then(|column| map.offset(mutation.line_number, column))
        .filter(|&at| source[at..].starts_with(&mutation.original_code));

    let start = match exact {
        Some(at) => at,
        None => source[line.start..]
            .find(&mutation.original_code)
            .map(|relative| line.start + relative)
            .filter(|&at| at <= line.end)
            .ok_or_else(|| MutationError::FailedToApply {
                reason: format!(
                    "'{}' not found on line {} of {}",
                    mutation.original_code, mutation.line_number, mutation.file_path
                ),
            })?,
    };

    let end = start + mutation.original_code.len();
    let mut mutated = String::with_capacity(source.len() + mutation.mutated_code.len());
    mutated.push_str(&source[..start]);
    mutated.push_str(&mutation.mutated_code);
    mutated.push_str(&source[end..]);
    Ok(mutated)
}

/// A mutant written to disk
///
/// While the guard is alive the file holds mutated content. Call
/// [`restore`](Self::restore) to write the pristine content back and observe
/// failures; if the guard is dropped without that (early return, panic), the
/// drop handler restores and logs any failure.
#[derive(Debug)]
pub struct MutantGuard<'a> {
    path: PathBuf,
    pristine: &'a str,
    restored: bool,
}

impl<'a> MutantGuard<'a> {
    /// Write `mutated` over `path`
    ///
    /// A failed write is restored before the `WriteError` is returned; a failed
    /// restore at that point is returned instead as `RestoreError`.
    pub fn apply(path: &Path, pristine: &'a str, mutated: &str) -> Result<Self> {
        let guard = Self {
            path: path.to_path_buf(),
            pristine,
            restored: false,
        };

        if let Err(e) = fs::write(path, mutated) {
            guard.restore()?;
            return Err(MutationError::WriteError {
                file: path.to_path_buf(),
                error: e.to_string(),
            });
        }

        Ok(guard)
    }

    /// Write the pristine content back
    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        write_pristine(&self.path, self.pristine)
    }
}

impl Drop for MutantGuard<'_> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = write_pristine(&self.path, self.pristine) {
            error!("{}", e);
        }
    }
}

fn write_pristine(path: &Path, pristine: &str) -> Result<()> {
    fs::write(path, pristine).map_err(|e| MutationError::RestoreError {
        file: path.to_path_buf(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MutationGenerator;
    use crate::operator::Operator;
    use pretty_assertions::assert_eq;
    use std::panic;

    fn mutation(original: &str, mutated: &str, line: usize, column: usize) -> Mutation {
        Mutation {
            original_code: original.to_string(),
            mutated_code: mutated.to_string(),
            line_number: line,
            column,
            file_path: "test.rs".to_string(),
            operator: Operator::Add,
        }
    }

    #[test]
    fn test_apply_at_recorded_position() {
        let source = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n";
        let mutated = apply_mutation(source, &mutation("a + b", "a - b", 2, 5)).unwrap();
        assert_eq!(mutated, "fn add(a: i32, b: i32) -> i32 {\n    a - b\n}\n");
    }

    #[test]
    fn test_apply_targets_second_identical_expression() {
        let source = "fn f(a: i32, b: i32) -> (i32, i32) { (a + b, a + b) }";
        let mutations = MutationGenerator::new().generate_mutations(source);
        let mutated = apply_mutation(source, &mutations[1]).unwrap();
        assert_eq!(
            mutated,
            "fn f(a: i32, b: i32) -> (i32, i32) { (a + b, a - b) }"
        );
    }

    #[test]
    fn test_apply_falls_back_to_first_occurrence_on_line() {
        let source = "let x = 1;\nlet y = a + b;\nlet z = a + b;\n";
        let mutated = apply_mutation(source, &mutation("a + b", "a - b", 2, 1)).unwrap();
        assert_eq!(mutated, "let x = 1;\nlet y = a - b;\nlet z = a + b;\n");
    }

    #[test]
    fn test_apply_does_not_reach_other_lines() {
        let source = "let y = 1;\nlet z = a + b;\n";
        let result = apply_mutation(source, &mutation("a + b", "a - b", 1, 1));
        assert!(matches!(result, Err(MutationError::FailedToApply { .. })));
    }

    #[test]
    fn test_apply_line_out_of_range() {
        let result = apply_mutation("a + b", &mutation("a + b", "a - b", 7, 1));
        assert!(matches!(result, Err(MutationError::FailedToApply { .. })));
    }

    #[test]
    fn test_apply_multi_line_span() {
        let source = "fn f(a: i32, b: i32) -> i32 {\n    a\n        + b\n}\n";
        let mutations = MutationGenerator::new().generate_mutations(source);
        let mutated = apply_mutation(source, &mutations[0]).unwrap();
        assert_eq!(mutated, "fn f(a: i32, b: i32) -> i32 {\n    a\n        - b\n}\n");
    }

    #[test]
    fn test_every_generated_mutation_applies() {
        let source = "fn f(a: i32, b: i32) -> bool {\n    a * b > a / b || a - b == 0 && a + b > 1\n}\n";
        for m in MutationGenerator::new().generate_mutations(source) {
            let mutated = apply_mutation(source, &m).unwrap();
            assert_ne!(mutated, source);
            assert_eq!(mutated.len(), source.len());
        }
    }

    #[test]
    fn test_guard_restores_explicitly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.rs");
        let pristine = "fn f() -> i32 { 1 + 2 }\n";
        fs::write(&path, pristine).unwrap();

        let guard = MutantGuard::apply(&path, pristine, "fn f() -> i32 { 1 - 2 }\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn f() -> i32 { 1 - 2 }\n");

        guard.restore().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), pristine);
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.rs");
        let pristine = "fn f() -> bool { a && b }\n";
        fs::write(&path, pristine).unwrap();

        {
            let _guard = MutantGuard::apply(&path, pristine, "fn f() -> bool { a || b }\n").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), pristine);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.rs");
        let pristine = "fn f() -> i32 { 6 / 3 }\n";
        fs::write(&path, pristine).unwrap();

        let result = panic::catch_unwind(|| {
            let _guard = MutantGuard::apply(&path, pristine, "fn f() -> i32 { 6 * 3 }\n").unwrap();
            panic!("test command blew up");
        });
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), pristine);
    }

    #[test]
    fn test_guard_write_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("lib.rs");

        let result = MutantGuard::apply(&path, "a + b", "a - b");
        assert!(matches!(result, Err(MutationError::RestoreError { .. })));
    }
}
