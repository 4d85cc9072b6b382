//! Declaration tree for interface files.
//!
//! This module provides:
//! - Type nodes ([`Typename`], [`Type`])
//! - Declaration nodes for everything a namespace or class can contain
//! - The recursive-descent [`Parser`] that builds them
//!
//! # Example
//!
//! ```
//! use idlwrap_parser::ast::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     namespace gtsam {
//!     class Point2 {
//!         Point2(double x, double y);
//!         double norm() const;
//!     };
//!     }
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(module) => println!("parsed {} declarations", module.content().len()),
//!     Err(errors) => eprintln!("parse errors: {}", errors),
//! }
//! ```

pub mod decl;
mod decl_parser;
mod parser;
mod type_parser;
pub mod types;

pub use idlwrap_core::{ParseError, ParseErrorKind, ParseErrors};

pub use decl::*;
pub use parser::Parser;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn parse_simple_module() {
        let arena = Bump::new();
        let module = Parser::parse("class Foo { Foo(); };", &arena).unwrap();
        assert_eq!(module.content().len(), 1);
        assert_eq!(module.names(), vec!["Foo"]);
    }

    #[test]
    fn parse_with_errors() {
        let arena = Bump::new();
        let errors = Parser::parse("class Foo { double x( };", &arena).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn error_renders_with_source() {
        let arena = Bump::new();
        let source = "class Foo {\n  double x( ;\n};";
        let errors = Parser::parse(source, &arena).unwrap_err();
        let rendered = errors.first().unwrap().display_with_source(source);
        assert!(rendered.contains("double x( ;"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn type_round_trip() {
        let arena = Bump::new();
        for source in [
            "const gtsam::Pose3&",
            "std::vector<std::map<size_t, gtsam::Pose3*>>",
            "unsigned char",
            "Eigen::Matrix<double, 3, 4>@",
        ] {
            let ty = Parser::type_expr(source, &arena).unwrap();
            let reparsed = Parser::type_expr(&ty.to_string(), &arena).unwrap();
            assert_eq!(ty, reparsed, "round trip of {source}");
        }
    }
}
