//! The mutation record produced by the generator

use std::fmt;

use crate::operator::Operator;

/// One candidate edit at one operator site
///
/// `original_code` is the text of the smallest expression enclosing the
/// operator; `mutated_code` is the same text with only that operator flipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub original_code: String,
    pub mutated_code: String,
    /// Line where the span starts (1-indexed)
    pub line_number: usize,
    /// Column where the span starts (1-indexed, in characters)
    pub column: usize,
    /// Logical name of the parsed buffer
    pub file_path: String,
    /// The operator being replaced
    pub operator: Operator,
}

impl Mutation {
    pub fn replacement(&self) -> Operator {
        self.operator.opposite()
    }

    /// Create a description for this mutation
    pub fn description(&self) -> String {
        format!(
            "{} -> {} at {}:{}:{}",
            self.original_code, self.mutated_code, self.file_path, self.line_number, self.column
        )
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: replace {} with {} in `{}`",
            self.file_path,
            self.line_number,
            self.operator,
            self.replacement(),
            self.original_code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mutation {
        Mutation {
            original_code: "a + b".to_string(),
            mutated_code: "a - b".to_string(),
            line_number: 3,
            column: 5,
            file_path: "src/math.rs".to_string(),
            operator: Operator::Add,
        }
    }

    #[test]
    fn test_description() {
        assert_eq!(sample().description(), "a + b -> a - b at src/math.rs:3:5");
    }

    #[test]
    fn test_display() {
        let mutation = sample();
        assert_eq!(mutation.replacement(), Operator::Sub);
        assert_eq!(
            mutation.to_string(),
            "src/math.rs:3: replace + with - in `a + b`"
        );
    }
}
