//! Configuration shared by the parser, the instantiator and their consumers.

/// Project-specific type rendering conventions.
///
/// Some projects treat a handful of base names as aliases living in an
/// implicit namespace that are always passed by const reference. Listing a
/// name here makes `Type::to_cpp_with` render it as `const ns::Name&` whatever
/// qualifiers were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConventions {
    /// `(base name, implicit namespace)` pairs.
    const_ref_aliases: Vec<(String, String)>,
}

impl RenderConventions {
    /// No special names.
    pub fn new() -> Self {
        Self::default()
    }

    /// The GTSAM conventions: `Matrix` and `Vector` live in `gtsam`.
    pub fn gtsam() -> Self {
        Self::new()
            .with_const_ref_alias("Matrix", "gtsam")
            .with_const_ref_alias("Vector", "gtsam")
    }

    /// Register a base name that always renders as a const reference.
    pub fn with_const_ref_alias(
        mut self,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        match self.const_ref_aliases.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = namespace,
            None => self.const_ref_aliases.push((name, namespace)),
        }
        self
    }

    /// The implicit namespace for `name`, if it is a registered alias.
    pub fn const_ref_alias(&self, name: &str) -> Option<&str> {
        self.const_ref_aliases
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ns)| ns.as_str())
    }

    /// Whether no aliases are registered.
    pub fn is_empty(&self) -> bool {
        self.const_ref_aliases.is_empty()
    }
}

/// What to do when two instantiations generate the same external name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Say nothing.
    Ignore,
    /// Emit a `tracing` warning and keep both declarations.
    #[default]
    Warn,
    /// Fail the run with `InstantiationError::NameCollision`.
    Error,
}

/// Options for a template instantiation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstantiatorOptions {
    /// Handling of generated-name collisions. The name format itself never changes.
    pub collision_policy: CollisionPolicy,
}

impl InstantiatorOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collision policy.
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}
