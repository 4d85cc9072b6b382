//! Type model: qualified names, qualifiers and template arguments.
//!
//! A [`Typename`] is a namespace path, a base name and (for templated types)
//! an ordered list of argument [`Type`]s. A [`Type`] adds `const` and at most
//! one [`Indirection`].
//!
//! Two renderings exist:
//! - `Display` gives the canonical interface-file form (`const gtsam::Pose3&`),
//!   which parses back to an equal value.
//! - [`Type::to_cpp`] gives the C++ spelling (`const std::shared_ptr<X>`).

use std::fmt;

use idlwrap_core::RenderConventions;

/// Names of the built-in basic types.
pub const BASIC_TYPES: &[&str] = &[
    "void",
    "bool",
    "unsigned char",
    "char",
    "int",
    "size_t",
    "double",
    "float",
];

/// Whether `name` is one of [`BASIC_TYPES`].
pub fn is_basic_type_name(name: &str) -> bool {
    BASIC_TYPES.contains(&name)
}

/// A possibly-qualified, possibly-templated type name.
///
/// Equality is structural, which coincides with equality of the canonical
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Typename {
    /// Enclosing namespaces, outermost first.
    pub namespaces: Vec<String>,
    /// Base name.
    pub name: String,
    /// Template arguments, in declared order.
    pub instantiations: Vec<Type>,
}

impl Typename {
    /// Create a typename. A leading empty namespace segment (from `::Name`)
    /// is dropped.
    pub fn new(
        mut namespaces: Vec<String>,
        name: impl Into<String>,
        instantiations: Vec<Type>,
    ) -> Self {
        if namespaces.first().is_some_and(|ns| ns.is_empty()) {
            namespaces.remove(0);
        }
        Self {
            namespaces,
            name: name.into(),
            instantiations,
        }
    }

    /// An unqualified, non-templated name.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(Vec::new(), name, Vec::new())
    }

    /// Whether this name carries template arguments.
    pub fn is_templated(&self) -> bool {
        !self.instantiations.is_empty()
    }

    /// `ns1::ns2::Name`, without template arguments.
    pub fn qualified_name(&self) -> String {
        if self.namespaces.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespaces.join("::"), self.name)
        }
    }

    /// Canonical rendering: `ns1::ns2::Name<Arg1, Arg2>`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Base name with template arguments and no namespaces: `Name<Arg1, Arg2>`.
    ///
    /// Arguments use the interface spelling, as in [`canonical`](Self::canonical).
    pub fn templated_name(&self) -> String {
        if self.instantiations.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self.instantiations.iter().map(Type::to_string).collect();
        format!("{}<{}>", self.name, args.join(", "))
    }

    /// C++ spelling with no project conventions applied.
    pub fn to_cpp(&self) -> String {
        self.to_cpp_with(&RenderConventions::default())
    }

    /// C++ spelling; template arguments are rendered with `conventions`.
    pub fn to_cpp_with(&self, conventions: &RenderConventions) -> String {
        if self.instantiations.is_empty() {
            return self.qualified_name();
        }
        let args: Vec<String> = self
            .instantiations
            .iter()
            .map(|t| t.to_cpp_with(conventions))
            .collect();
        format!("{}<{}>", self.qualified_name(), args.join(", "))
    }
}

impl fmt::Display for Typename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ns in &self.namespaces {
            write!(f, "{ns}::")?;
        }
        f.write_str(&self.name)?;
        if !self.instantiations.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.instantiations.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Pointer or reference qualifier. A type carries at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirection {
    /// `*`: shared-ownership pointer (`std::shared_ptr<T>`).
    SharedPtr,
    /// `@`: raw pointer (`T*`).
    RawPtr,
    /// `&`: reference (`T&`).
    Ref,
}

impl Indirection {
    /// Surface symbol in interface files.
    pub fn symbol(self) -> char {
        match self {
            Indirection::SharedPtr => '*',
            Indirection::RawPtr => '@',
            Indirection::Ref => '&',
        }
    }
}

/// A type use: a [`Typename`] plus qualifiers.
///
/// A type whose typename has template arguments is a templated type; the
/// arguments are themselves `Type`s and may be templated in turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Type {
    /// The named type.
    pub typename: Typename,
    /// `const` prefix.
    pub is_const: bool,
    /// Pointer/reference qualifier.
    pub indirection: Option<Indirection>,
    /// Whether the name is a built-in basic type.
    pub is_basic: bool,
}

impl Type {
    /// An unqualified type; `is_basic` is derived from the name.
    pub fn new(typename: Typename) -> Self {
        let is_basic = typename.namespaces.is_empty()
            && typename.instantiations.is_empty()
            && is_basic_type_name(&typename.name);
        Self {
            typename,
            is_const: false,
            indirection: None,
            is_basic,
        }
    }

    /// An unqualified type from a simple name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(Typename::simple(name))
    }

    /// Builder: set `const`.
    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    /// Builder: set the pointer/reference qualifier.
    pub fn with_indirection(mut self, indirection: Option<Indirection>) -> Self {
        self.indirection = indirection;
        self
    }

    /// Base name of the type.
    pub fn name(&self) -> &str {
        &self.typename.name
    }

    /// Whether this is a templated type.
    pub fn is_templated(&self) -> bool {
        self.typename.is_templated()
    }

    /// `*` qualifier.
    pub fn is_shared_ptr(&self) -> bool {
        self.indirection == Some(Indirection::SharedPtr)
    }

    /// `@` qualifier.
    pub fn is_ptr(&self) -> bool {
        self.indirection == Some(Indirection::RawPtr)
    }

    /// `&` qualifier.
    pub fn is_ref(&self) -> bool {
        self.indirection == Some(Indirection::Ref)
    }

    /// Qualifier-free canonical name, used for equality and lookup.
    pub fn canonical(&self) -> String {
        self.typename.canonical()
    }

    /// C++ spelling with no project conventions applied.
    pub fn to_cpp(&self) -> String {
        self.to_cpp_with(&RenderConventions::default())
    }

    /// C++ spelling: `const` prefix, then the shared-pointer wrapper or the
    /// pointer/reference suffix.
    pub fn to_cpp_with(&self, conventions: &RenderConventions) -> String {
        if !self.typename.is_templated()
            && let Some(alias_ns) = conventions.const_ref_alias(&self.typename.name)
        {
            let qualified = if self.typename.namespaces.is_empty() {
                format!("{alias_ns}::{}", self.typename.name)
            } else {
                self.typename.qualified_name()
            };
            return format!("const {qualified}&");
        }

        let typename = self.typename.to_cpp_with(conventions);
        let typename = match self.indirection {
            Some(Indirection::SharedPtr) => format!("std::shared_ptr<{typename}>"),
            Some(Indirection::RawPtr) => format!("{typename}*"),
            Some(Indirection::Ref) => format!("{typename}&"),
            None => typename,
        };
        if self.is_const {
            format!("const {typename}")
        } else {
            typename
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            f.write_str("const ")?;
        }
        write!(f, "{}", self.typename)?;
        if let Some(indirection) = self.indirection {
            write!(f, "{}", indirection.symbol())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose3() -> Typename {
        Typename::new(vec!["gtsam".to_string()], "Pose3", vec![])
    }

    #[test]
    fn leading_empty_namespace_is_dropped() {
        let tn = Typename::new(vec![String::new(), "gtsam".to_string()], "Pose3", vec![]);
        assert_eq!(tn.namespaces, vec!["gtsam".to_string()]);
        assert_eq!(tn, pose3());
    }

    #[test]
    fn canonical_rendering() {
        let tn = Typename::new(
            vec!["std".to_string()],
            "map",
            vec![Type::named("size_t"), Type::new(pose3())],
        );
        assert_eq!(tn.canonical(), "std::map<size_t, gtsam::Pose3>");
        assert_eq!(tn.templated_name(), "map<size_t, gtsam::Pose3>");
        assert_eq!(tn.qualified_name(), "std::map");
    }

    #[test]
    fn templated_name_matches_canonical_arguments() {
        let shared = Type::new(pose3()).with_indirection(Some(Indirection::SharedPtr));
        let tn = Typename::new(vec!["gtsam".to_string()], "Foo", vec![shared]);
        assert_eq!(tn.templated_name(), "Foo<gtsam::Pose3*>");
        assert_eq!(tn.canonical(), format!("gtsam::{}", tn.templated_name()));
    }

    #[test]
    fn basic_detection() {
        assert!(Type::named("double").is_basic);
        assert!(Type::named("unsigned char").is_basic);
        assert!(!Type::named("string").is_basic);
        assert!(!Type::new(pose3()).is_basic);
    }

    #[test]
    fn cpp_rendering_of_qualifiers() {
        let shared = Type::new(pose3())
            .with_const(true)
            .with_indirection(Some(Indirection::SharedPtr));
        assert_eq!(shared.to_cpp(), "const std::shared_ptr<gtsam::Pose3>");

        let raw = Type::new(pose3()).with_indirection(Some(Indirection::RawPtr));
        assert_eq!(raw.to_cpp(), "gtsam::Pose3*");

        let reference = Type::new(pose3())
            .with_const(true)
            .with_indirection(Some(Indirection::Ref));
        assert_eq!(reference.to_cpp(), "const gtsam::Pose3&");
        assert_eq!(reference.to_string(), "const gtsam::Pose3&");
    }

    #[test]
    fn display_uses_interface_symbols() {
        let raw = Type::new(pose3()).with_indirection(Some(Indirection::RawPtr));
        assert_eq!(raw.to_string(), "gtsam::Pose3@");
        let shared = Type::named("Foo").with_indirection(Some(Indirection::SharedPtr));
        assert_eq!(shared.to_string(), "Foo*");
    }

    #[test]
    fn templated_arguments_render_recursively() {
        let inner = Type::new(pose3()).with_indirection(Some(Indirection::SharedPtr));
        let vector = Type::new(Typename::new(
            vec!["std".to_string()],
            "vector",
            vec![inner],
        ));
        assert_eq!(vector.to_string(), "std::vector<gtsam::Pose3*>");
        assert_eq!(
            vector.to_cpp(),
            "std::vector<std::shared_ptr<gtsam::Pose3>>"
        );
    }

    #[test]
    fn render_conventions_force_const_ref() {
        let conventions = RenderConventions::gtsam();
        let matrix = Type::named("Matrix");
        assert_eq!(matrix.to_cpp(), "Matrix");
        assert_eq!(matrix.to_cpp_with(&conventions), "const gtsam::Matrix&");

        let shared_vector = Type::named("Vector").with_indirection(Some(Indirection::SharedPtr));
        assert_eq!(
            shared_vector.to_cpp_with(&conventions),
            "const gtsam::Vector&"
        );

        let qualified = Type::new(Typename::new(vec!["Eigen".to_string()], "Matrix", vec![]));
        assert_eq!(qualified.to_cpp_with(&conventions), "const Eigen::Matrix&");
    }
}
