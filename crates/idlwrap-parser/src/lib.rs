//! Interface file parser.
//!
//! This crate provides the lexer and parser for interface files: a small
//! C++-like language declaring classes, functions, enums, variables and
//! templates. It includes:
//! - Lexical analysis (tokenization)
//! - The declaration tree (types, declarations, templates, namespaces)
//! - A recursive-descent parser from tokens to that tree
//!
//! # Example
//!
//! ```
//! use idlwrap_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     #include <gtsam/geometry/Pose3.h>
//!     namespace gtsam {
//!     template<T = {double, float}>
//!     class Wrapper {
//!         T value() const;
//!     };
//!     }
//! "#;
//!
//! let module = Parser::parse(source, &arena).expect("valid interface");
//! assert_eq!(module.content().len(), 2);
//! ```

// Lexer module
pub mod lexer;

// AST module
pub mod ast;

// Re-export commonly used types at crate root
pub use ast::Parser;
pub use idlwrap_core::Span;
pub use lexer::{Lexer, Token, TokenKind};

use bumpalo::Bump;
use idlwrap_core::ParseErrors;

/// Parse a single type use (`const gtsam::Pose3&`) without keeping an arena.
pub fn parse_type(source: &str) -> Result<ast::Type, ParseErrors> {
    let arena = Bump::new();
    Parser::type_expr(source, &arena)
}
