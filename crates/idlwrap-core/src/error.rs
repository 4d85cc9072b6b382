//! Unified error types for interface wrapping.
//!
//! Every phase of processing an interface file has its own error type, and
//! all of them convert into [`WrapError`] for callers that only care that the
//! file failed.
//!
//! ## Error Hierarchy
//!
//! ```text
//! WrapError (top-level wrapper)
//! ├── LexError            - tokenization errors
//! ├── ParseErrors         - grammar errors (each a ParseError with ParseErrorKind)
//! └── InstantiationError  - template expansion errors
//! ```
//!
//! A failed file never yields a partial tree: the first error aborts the run.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A string or character literal was not properly terminated.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// A block comment was not properly terminated.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    /// An `#include` directive without a `<path>` or `"path"`.
    #[error("malformed include directive at {span}")]
    MalformedInclude { span: Span },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::MalformedInclude { span } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    // Token-level errors
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,

    // Type errors
    /// A type was expected.
    ExpectedType,
    /// The type is invalid.
    InvalidType,
    /// Template arguments were expected.
    ExpectedTemplateArgs,

    // Declaration errors
    /// A declaration was expected.
    ExpectedDeclaration,
    /// The declaration is invalid.
    InvalidDeclaration,
    /// Function parameters were expected.
    ExpectedParameters,
    /// A class member was expected.
    ExpectedClassMember,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// An overloadable operator symbol was expected.
    ExpectedOperator,

    // Syntax errors
    /// Mismatched delimiter (parentheses, brackets, braces).
    MismatchedDelimiter,
    /// A modifier that is not allowed here, or conflicts with another.
    InvalidModifier,
    /// General syntax error, including lexer failures.
    InvalidSyntax,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::InvalidType => "invalid type",
            ParseErrorKind::ExpectedTemplateArgs => "expected template arguments",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::InvalidDeclaration => "invalid declaration",
            ParseErrorKind::ExpectedParameters => "expected parameters",
            ParseErrorKind::ExpectedClassMember => "expected class member",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedOperator => "expected operator",
            ParseErrorKind::MismatchedDelimiter => "mismatched delimiter",
            ParseErrorKind::InvalidModifier => "invalid modifier",
            ParseErrorKind::InvalidSyntax => "invalid syntax",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("unexpected token: {token}"),
        )
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            "unexpected end of file".to_string(),
        )
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    /// Create an "expected type" error.
    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedType,
            span,
            format!("expected type, found {found}"),
        )
    }

    /// Format the error with source context for display.
    ///
    /// Renders the relevant source line with a caret under the error location.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = String::new();

        let line = self.span.line;
        let column = self.span.col;

        output.push_str(&format!("Error at {}:{}: {}\n", line, column, self.kind));

        if !self.message.is_empty() {
            output.push_str(&format!("  {}\n", self.message));
        }

        if let Some(line_text) = Self::get_line(source, line) {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", line, line_text));

            let indent = " ".repeat(column.saturating_sub(1) as usize);
            let pointer = if self.span.len <= 1 {
                "^".to_string()
            } else {
                "^".to_string() + &"~".repeat((self.span.len - 1) as usize)
            };
            output.push_str(&format!("  | {}{}\n", indent, pointer));
        }

        output
    }

    /// Get the text of a specific line (1-indexed).
    fn get_line(source: &str, line_num: u32) -> Option<&str> {
        source.lines().nth((line_num as usize).checked_sub(1)?)
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(
            ParseErrorKind::InvalidSyntax,
            error.span(),
            format!("lexer error: {error}"),
        )
    }
}

/// A collection of parse errors.
///
/// Lexing keeps going after a bad character, so one file can report several
/// lexer errors at once; the grammar stops at its first error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    /// The first recorded error.
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Convert to a Vec of errors.
    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }

    /// `Ok(())` if empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ParseErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Instantiation Errors
// ============================================================================

/// Errors raised while expanding templated declarations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstantiationError {
    /// The number of supplied types differs from the template's parameter count.
    #[error("at {span}: template '{name}' expects {expected} argument(s), got {got}")]
    TemplateArityMismatch {
        /// The templated declaration.
        name: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        got: usize,
        /// Where the declaration (or typedef request) appears.
        span: Span,
    },

    /// `This` was used where there is no enclosing class.
    #[error("at {span}: 'This' used outside of a class in '{declaration}'")]
    UnresolvedSelfReference {
        /// The declaration containing the reference.
        declaration: String,
        /// Where that declaration appears.
        span: Span,
    },

    /// A typedef names a template that does not exist.
    #[error("at {span}: typedef target '{name}' not found")]
    UnresolvedTypedefTarget {
        /// The qualified target name.
        name: String,
        /// Where the typedef appears.
        span: Span,
    },

    /// A typedef target name matches more than one declaration.
    #[error("at {span}: typedef target '{name}' is ambiguous ({count} candidates)")]
    AmbiguousTypedefTarget {
        /// The qualified target name.
        name: String,
        /// Number of matching declarations.
        count: usize,
        /// Where the typedef appears.
        span: Span,
    },

    /// Two distinct instantiations generated the same external name.
    #[error("at {span}: generated name '{name}' is produced by both {first} and {second}")]
    NameCollision {
        /// The colliding generated name.
        name: String,
        /// Rendering of the first instantiation that produced it.
        first: String,
        /// Rendering of the second instantiation that produced it.
        second: String,
        /// Where the second instantiation's declaration appears.
        span: Span,
    },
}

impl InstantiationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            InstantiationError::TemplateArityMismatch { span, .. } => *span,
            InstantiationError::UnresolvedSelfReference { span, .. } => *span,
            InstantiationError::UnresolvedTypedefTarget { span, .. } => *span,
            InstantiationError::AmbiguousTypedefTarget { span, .. } => *span,
            InstantiationError::NameCollision { span, .. } => *span,
        }
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Any error from processing an interface file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WrapError {
    /// A lexer error.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// One or more parse errors.
    #[error(transparent)]
    Parse(#[from] ParseErrors),

    /// An instantiation error.
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
}

impl From<ParseError> for WrapError {
    fn from(error: ParseError) -> Self {
        WrapError::Parse(error.into())
    }
}

impl WrapError {
    /// Check if this is a lexer error.
    pub fn is_lex(&self) -> bool {
        matches!(self, WrapError::Lex(_))
    }

    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, WrapError::Parse(_))
    }

    /// Check if this is an instantiation error.
    pub fn is_instantiation(&self) -> bool {
        matches!(self, WrapError::Instantiation(_))
    }

    /// Location of the (first) error.
    pub fn span(&self) -> Option<Span> {
        match self {
            WrapError::Lex(e) => Some(e.span()),
            WrapError::Parse(e) => e.first().map(|e| e.span),
            WrapError::Instantiation(e) => Some(e.span()),
        }
    }
}
