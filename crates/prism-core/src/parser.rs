//! The parser seam.
//!
//! Parsing is done by an external collaborator that turns code into a
//! [`SourceFile`]. [`FixtureParser`] serves pre-built trees for code it was
//! given in advance, which is what tests and embedders without a real parser
//! use.

use prism_syntax::SourceFile;
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}{}", line.map(|line| format!(" on line {line}")).unwrap_or_default())]
pub struct ParseError {
    pub message: String,
    pub line: Option<u32>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

pub trait Parser {
    /// Parse `code`; `file` is the unit's path when known.
    fn parse(&self, code: &str, file: Option<&str>) -> Result<SourceFile, ParseError>;
}

/// Returns the tree registered for exactly this code.
#[derive(Default)]
pub struct FixtureParser {
    trees: FxHashMap<String, SourceFile>,
    failures: FxHashMap<String, ParseError>,
}

impl FixtureParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, code: &str, tree: SourceFile) -> &mut Self {
        self.trees.insert(code.to_string(), tree);
        self
    }

    /// Make parsing `code` fail with `error`.
    pub fn register_failure(&mut self, code: &str, error: ParseError) -> &mut Self {
        self.failures.insert(code.to_string(), error);
        self
    }
}

impl Parser for FixtureParser {
    fn parse(&self, code: &str, file: Option<&str>) -> Result<SourceFile, ParseError> {
        if let Some(error) = self.failures.get(code) {
            return Err(error.clone());
        }
        let tree = self
            .trees
            .get(code)
            .ok_or_else(|| ParseError::new("no syntax tree registered for this code"))?;
        let mut tree = tree.clone();
        if tree.path.is_none() {
            tree.path = file.map(str::to_string);
        }
        Ok(tree)
    }
}
