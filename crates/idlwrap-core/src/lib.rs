//! Core types shared across the idlwrap crates.
//!
//! - [`Span`]: source locations
//! - the error hierarchy rooted at [`WrapError`]
//! - configuration: [`RenderConventions`] and [`InstantiatorOptions`]

mod config;
mod error;
mod span;

pub use config::{CollisionPolicy, InstantiatorOptions, RenderConventions};
pub use error::{
    InstantiationError, LexError, ParseError, ParseErrorKind, ParseErrors, WrapError,
};
pub use span::Span;
