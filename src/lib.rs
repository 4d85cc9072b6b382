//! Interface-file parsing and template instantiation.
//!
//! `idlwrap` reads the C++-like interface language used to describe a
//! library for binding generators, and expands every template in it into
//! concrete declarations.
//!
//! # Quick Start
//!
//! ```
//! let source = r#"
//!     namespace gtsam {
//!     template<T = {gtsam::Pose2, gtsam::Pose3}>
//!     class BetweenFactor {
//!         BetweenFactor(size_t key1, size_t key2, const T& relativePose);
//!         T measured() const;
//!     };
//!     }
//! "#;
//!
//! let module = idlwrap::wrap(source).unwrap();
//! let gtsam = module.namespace("gtsam").unwrap();
//! assert_eq!(gtsam.names(), vec!["BetweenFactorPose2", "BetweenFactorPose3"]);
//!
//! let factor = gtsam.class("BetweenFactorPose3").unwrap();
//! assert_eq!(factor.cpp_name(), "gtsam::BetweenFactor<gtsam::Pose3>");
//! assert_eq!(factor.methods[0].return_type.type1.canonical(), "gtsam::Pose3");
//! ```
//!
//! # Crates
//!
//! - `idlwrap-core`: spans, errors and options
//! - `idlwrap-parser`: lexer, AST and parser
//! - `idlwrap-instantiator`: template expansion

pub use idlwrap_core::{
    CollisionPolicy, InstantiationError, InstantiatorOptions, LexError, ParseError,
    ParseErrorKind, ParseErrors, RenderConventions, Span, WrapError,
};
pub use idlwrap_instantiator::{Instantiator, instantiate_name};
pub use idlwrap_parser::ast::{self, Module};
pub use idlwrap_parser::{Parser, lexer, parse_type};

use bumpalo::Bump;
use tracing::debug;

/// Parse an interface file into a generic module.
///
/// Parsing stops at the first grammar error; lexer errors are all reported.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse(source: &str) -> Result<Module, ParseErrors> {
    let arena = Bump::new();
    Parser::parse(source, &arena)
}

/// Instantiate every template in `module` with default options.
pub fn instantiate(module: &Module) -> Result<Module, InstantiationError> {
    instantiate_with(module, InstantiatorOptions::default())
}

/// Instantiate every template in `module`.
pub fn instantiate_with(
    module: &Module,
    options: InstantiatorOptions,
) -> Result<Module, InstantiationError> {
    Instantiator::new(options).instantiate(module)
}

/// Parse `source` and instantiate it with default options.
pub fn wrap(source: &str) -> Result<Module, WrapError> {
    wrap_with(source, InstantiatorOptions::default())
}

/// Parse `source` and instantiate it.
///
/// A file that fails at either stage yields no module.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn wrap_with(source: &str, options: InstantiatorOptions) -> Result<Module, WrapError> {
    let generic = parse(source)?;
    debug!(declarations = generic.content().len(), "parsed interface");
    Ok(instantiate_with(&generic, options)?)
}
