//! Mutation discovery
//!
//! This module parses Rust source and walks the syntax tree looking for
//! flippable binary operators, emitting one [`Mutation`] per operator site.

use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::visit::Visit;
use syn::Token;
use tracing::debug;

use crate::error::{MutationError, Result};
use crate::mutation::Mutation;
use crate::operator::Operator;
use crate::source::SourceMap;

/// Buffer name used when no file path is given
pub const IN_MEMORY_BUFFER: &str = "(string)";

/// Discovers operator mutations in source text
#[derive(Debug, Default, Clone, Copy)]
pub struct MutationGenerator;

impl MutationGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate mutations for an in-memory buffer
    ///
    /// Unparsable or empty source yields no mutations.
    pub fn generate_mutations(&self, source: &str) -> Vec<Mutation> {
        self.generate_mutations_for(source, IN_MEMORY_BUFFER)
    }

    /// Generate mutations, tagging each with `file_path`
    pub fn generate_mutations_for(&self, source: &str, file_path: &str) -> Vec<Mutation> {
        match self.try_generate(source, file_path) {
            Ok(mutations) => mutations,
            Err(e) => {
                debug!("no mutations for {}: {}", file_path, e);
                Vec::new()
            }
        }
    }

    /// Like [`generate_mutations_for`](Self::generate_mutations_for) but reports parse failures
    pub fn try_generate(&self, source: &str, file_path: &str) -> Result<Vec<Mutation>> {
        let tree = parse_source(source).map_err(|e| MutationError::ParseError {
            file: file_path.to_string(),
            error: e.to_string(),
        })?;

        let mut collector = OperatorCollector {
            source: SourceMap::new(source),
            file_path,
            mutations: Vec::new(),
        };

        match &tree {
            SourceTree::File(file) => collector.visit_file(file),
            SourceTree::Expr(expr) => collector.visit_expr(expr),
        }

        Ok(collector.mutations)
    }
}

enum SourceTree {
    File(syn::File),
    Expr(syn::Expr),
}

/// Parse a whole file, falling back to a single standalone expression
fn parse_source(source: &str) -> syn::Result<SourceTree> {
    match syn::parse_file(source) {
        Ok(file) => Ok(SourceTree::File(file)),
        Err(file_error) => match syn::parse_str::<syn::Expr>(source) {
            Ok(expr) => Ok(SourceTree::Expr(expr)),
            Err(_) => Err(file_error),
        },
    }
}

struct OperatorCollector<'a> {
    source: SourceMap<'a>,
    file_path: &'a str,
    mutations: Vec<Mutation>,
}

impl<'ast> Visit<'ast> for OperatorCollector<'_> {
    fn visit_expr_binary(&mut self, expr: &'ast syn::ExprBinary) {
        if let Some(operator) = Operator::from_bin_op(&expr.op) {
            match self.mutation_for(expr, operator) {
                Some(mutation) => self.mutations.push(mutation),
                None => {
                    let at = expr.op.span().start();
                    debug!(
                        "skipping `{}` at {}:{}:{}, span does not map onto the source",
                        operator,
                        self.file_path,
                        at.line,
                        at.column + 1
                    );
                }
            }
        }
        // Operands may hold further operators at any depth
        syn::visit::visit_expr_binary(self, expr);
    }

    /// Macro bodies are token streams. Ones that read as comma-separated
    /// expressions (`assert_eq!`, `vec!`, `format!`, ...) are walked like
    /// ordinary code; anything else is left alone.
    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        if mac.path.is_ident("macro_rules") {
            return;
        }

        match mac.parse_body_with(Punctuated::<syn::Expr, Token![,]>::parse_terminated) {
            Ok(args) => {
                for arg in &args {
                    <Self as Visit<'_>>::visit_expr(self, arg);
                }
            }
            Err(e) => {
                let at = mac.path.span().start();
                debug!(
                    "not walking macro body at {}:{}:{}: {}",
                    self.file_path,
                    at.line,
                    at.column + 1,
                    e
                );
            }
        }
    }
}

impl OperatorCollector<'_> {
    fn mutation_for(&self, expr: &syn::ExprBinary, operator: Operator) -> Option<Mutation> {
        // Left operand start to right operand end, so outer attributes stay out
        let begin = expr.left.span().start();
        let start = self.source.offset_of(begin)?;
        let end = self.source.offset_of(expr.right.span().end())?;
        let op_start = self.source.offset_of(expr.op.span().start())?;

        let symbol = operator.symbol();
        if op_start < start || op_start + symbol.len() > end {
            return None;
        }

        let original_code = self.source.text().get(start..end)?;
        let relative = op_start - start;
        if original_code.get(relative..relative + symbol.len()) != Some(symbol) {
            return None;
        }

        let mutated_code = format!(
            "{}{}{}",
            &original_code[..relative],
            operator.opposite().symbol(),
            &original_code[relative + symbol.len()..]
        );

        Some(Mutation {
            original_code: original_code.to_string(),
            mutated_code,
            line_number: begin.line,
            column: begin.column + 1,
            file_path: self.file_path.to_string(),
            operator,
        })
    }
}
