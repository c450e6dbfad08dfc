//! Report generation for mutation testing results
//!
//! This module formats and displays mutation testing results.

use colored::Colorize;
use std::time::Duration;

use crate::runner::{MutationStatus, Verdict};

/// Summary report of mutation testing
#[derive(Debug)]
pub struct MutationReport {
    pub verdicts: Vec<Verdict>,
    pub total_duration: Duration,
}

impl MutationReport {
    /// Create a new report from verdicts
    pub fn new(verdicts: Vec<Verdict>) -> Self {
        let total_duration = verdicts.iter().map(|v| v.duration).sum();
        Self {
            verdicts,
            total_duration,
        }
    }

    /// Count of mutations whose tests failed, timeouts excluded
    pub fn killed(&self) -> usize {
        self.count(MutationStatus::Killed)
    }

    /// Count of mutations that survived (not detected by tests)
    pub fn survived(&self) -> usize {
        self.count(MutationStatus::Survived)
    }

    /// Count of mutations that timed out
    pub fn timeouts(&self) -> usize {
        self.count(MutationStatus::Timeout)
    }

    fn count(&self, status: MutationStatus) -> usize {
        self.verdicts.iter().filter(|v| v.status == status).count()
    }

    /// Total number of mutations
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    /// Percentage of mutations detected; timeouts count as detected
    pub fn score(&self) -> f64 {
        if self.total() == 0 {
            return 100.0;
        }
        let detected = self.total() - self.survived();
        (detected as f64 / self.total() as f64) * 100.0
    }

    /// Get surviving mutations (test gaps)
    pub fn surviving_mutations(&self) -> Vec<&Verdict> {
        self.verdicts.iter().filter(|v| v.survived()).collect()
    }

    /// Print one line as soon as a verdict arrives
    pub fn print_progress(verdict: &Verdict) {
        println!(
            "{} {} ({})",
            status_label(verdict.status),
            verdict.mutation,
            format_duration(verdict.duration).dimmed()
        );
    }

    /// Print the report to stdout
    pub fn print(&self) {
        println!();
        println!("{}", "Mutation Testing Report".bold());
        println!("{}", "=".repeat(60));
        println!();

        for verdict in &self.verdicts {
            let mutation = &verdict.mutation;
            println!(
                "{} {} -> {}",
                status_label(verdict.status),
                mutation.original_code,
                mutation.mutated_code
            );
            println!(
                "        {}",
                format!("{}:{}", mutation.file_path, mutation.line_number).dimmed()
            );
        }

        // Print summary
        println!();
        println!("{}", "Summary".bold());
        println!("{}", "-".repeat(40));
        println!("Total mutations:   {}", self.total());
        println!(
            "Killed:            {} {}",
            self.killed(),
            "(good - tests caught the mutation)".dimmed()
        );
        println!(
            "Survived:          {} {}",
            self.survived(),
            "(bad - tests missed the mutation)".dimmed()
        );

        if self.timeouts() > 0 {
            println!("Timeouts:          {}", self.timeouts());
        }

        println!();
        let score = self.score();
        let score_str = format!("{:.1}%", score);
        let score_colored = if score >= 90.0 {
            score_str.green().bold()
        } else if score >= 70.0 {
            score_str.yellow().bold()
        } else {
            score_str.red().bold()
        };
        println!("Mutation Score:    {}", score_colored);
        println!("Duration:          {}", format_duration(self.total_duration));

        let survivors = self.surviving_mutations();
        if !survivors.is_empty() {
            println!();
            println!(
                "{}",
                "Surviving Mutations (improve your tests!)".red().bold()
            );
            println!("{}", "-".repeat(40));
            for verdict in survivors {
                let mutation = &verdict.mutation;
                println!(
                    "  • {} -> {}",
                    mutation.original_code.yellow(),
                    mutation.mutated_code.yellow()
                );
                println!("    at {}:{}", mutation.file_path, mutation.line_number);
            }
        }
    }
}

fn status_label(status: MutationStatus) -> colored::ColoredString {
    match status {
        MutationStatus::Killed => "[KILLED]".green().bold(),
        MutationStatus::Survived => "[SURVIVED]".red().bold(),
        MutationStatus::Timeout => "[TIMEOUT]".yellow().bold(),
    }
}

/// Format duration in a human-readable way
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::Mutation;
    use crate::operator::Operator;

    fn verdict(status: MutationStatus, millis: u64) -> Verdict {
        Verdict {
            mutation: Mutation {
                original_code: "a + b".to_string(),
                mutated_code: "a - b".to_string(),
                line_number: 1,
                column: 1,
                file_path: "src/lib.rs".to_string(),
                operator: Operator::Add,
            },
            status,
            duration: Duration::from_millis(millis),
            output: String::new(),
        }
    }

    #[test]
    fn test_counts_and_score() {
        let report = MutationReport::new(vec![
            verdict(MutationStatus::Killed, 100),
            verdict(MutationStatus::Killed, 100),
            verdict(MutationStatus::Timeout, 300),
            verdict(MutationStatus::Survived, 500),
        ]);

        assert_eq!(report.total(), 4);
        assert_eq!(report.killed(), 2);
        assert_eq!(report.timeouts(), 1);
        assert_eq!(report.survived(), 1);
        assert_eq!(report.score(), 75.0);
        assert_eq!(report.surviving_mutations().len(), 1);
        assert_eq!(report.total_duration, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_report_scores_full_marks() {
        assert_eq!(MutationReport::new(Vec::new()).score(), 100.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
