//! Template instantiation for parsed interface modules.
//!
//! Takes the generic [`Module`] produced by `idlwrap-parser` and returns a
//! fully concrete one: every templated class, function, variable and forward
//! declaration is replaced by one declaration per requested instantiation,
//! and every `typedef Target<Args...> Name;` by the declaration it names.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use idlwrap_instantiator::instantiate;
//! use idlwrap_parser::Parser;
//!
//! let arena = Bump::new();
//! let module = Parser::parse("template<T = {double, int}> class Box { T get() const; };", &arena).unwrap();
//! let concrete = instantiate(&module).unwrap();
//! assert_eq!(concrete.names(), vec!["BoxDouble", "BoxInt"]);
//! ```
//!
//! # Architecture
//!
//! - [`substitution`]: replaces parameters, `This` and `T::Member` in types
//! - [`naming`]: generated names (`Iron` + `Man` → `IronMan`)
//! - `class` / `declaration`: per-declaration instantiation, including
//!   member-level templates
//! - `namespace`: the module walk and typedef expansion
//! - `registry`: per-run typedef index and generated-name registry

mod class;
mod declaration;
mod namespace;
pub mod naming;
mod product;
mod registry;
pub mod substitution;

pub use class::instantiate_class;
pub use declaration::{instantiate_forward_declaration, instantiate_function, instantiate_variable};
pub use namespace::Instantiator;
pub use naming::{describe_instantiation, instantiate_name};
pub use product::cartesian_product;
pub use registry::{NameRegistry, TypedefIndex, TypedefTarget};

pub use idlwrap_core::{CollisionPolicy, InstantiationError, InstantiatorOptions};
use idlwrap_parser::ast::Module;

/// Instantiate `module` with default options.
pub fn instantiate(module: &Module) -> Result<Module, InstantiationError> {
    Instantiator::default().instantiate(module)
}
