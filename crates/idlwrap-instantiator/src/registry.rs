//! Per-run lookup tables.
//!
//! Both tables live for a single instantiation run and are dropped with it.

use idlwrap_core::{CollisionPolicy, InstantiationError, Span};
use idlwrap_parser::ast::{Class, Declaration, ForwardDeclaration, GlobalFunction, Namespace};
use rustc_hash::FxHashMap;
use tracing::warn;

// =========================================
// Generated-name registry
// =========================================

/// Records which instantiation produced each generated name.
///
/// Maps (scope, generated name) → description of the instantiation.
#[derive(Debug, Default)]
pub struct NameRegistry {
    policy: CollisionPolicy,
    names: FxHashMap<(Vec<String>, String), String>,
}

impl NameRegistry {
    /// Create an empty registry reporting collisions per `policy`.
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            names: FxHashMap::default(),
        }
    }

    /// Record that `description` generated `name` in `scope`.
    ///
    /// Registering the same description twice is not a collision; two
    /// different descriptions for one name are.
    pub fn register(
        &mut self,
        scope: &[String],
        name: &str,
        description: String,
        span: Span,
    ) -> Result<(), InstantiationError> {
        if self.policy == CollisionPolicy::Ignore {
            return Ok(());
        }
        let key = (scope.to_vec(), name.to_string());
        let Some(first) = self.names.get(&key) else {
            self.names.insert(key, description);
            return Ok(());
        };
        if *first == description {
            return Ok(());
        }

        match self.policy {
            CollisionPolicy::Error => Err(InstantiationError::NameCollision {
                name: name.to_string(),
                first: first.clone(),
                second: description,
                span,
            }),
            _ => {
                warn!(
                    name,
                    scope = %scope.join("::"),
                    first = %first,
                    second = %description,
                    "generated name collision"
                );
                Ok(())
            }
        }
    }

    /// Number of distinct generated names recorded.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// =========================================
// Typedef target index
// =========================================

/// A declaration a typedef can instantiate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedefTarget<'m> {
    Class(&'m Class),
    Function(&'m GlobalFunction),
    ForwardDeclaration(&'m ForwardDeclaration),
}

impl TypedefTarget<'_> {
    fn is_class(&self) -> bool {
        matches!(self, TypedefTarget::Class(_))
    }
}

/// Typedef targets in a parsed module, keyed by fully qualified path.
///
/// Same-named namespaces contribute to the same path.
#[derive(Debug, Default)]
pub struct TypedefIndex<'m> {
    targets: FxHashMap<Vec<String>, Vec<TypedefTarget<'m>>>,
}

impl<'m> TypedefIndex<'m> {
    /// Index every class, function and forward declaration under `root`.
    pub fn build(root: &'m Namespace) -> Self {
        let mut index = Self::default();
        index.collect(root, &mut Vec::new());
        index
    }

    fn collect(&mut self, namespace: &'m Namespace, path: &mut Vec<String>) {
        for decl in &namespace.content {
            let (target, qualifier): (TypedefTarget<'m>, &[String]) = match decl {
                Declaration::Namespace(inner) => {
                    path.push(inner.name.clone());
                    self.collect(inner, path);
                    path.pop();
                    continue;
                }
                Declaration::Class(c) => (TypedefTarget::Class(c), &[]),
                Declaration::GlobalFunction(f) => (TypedefTarget::Function(f), &[]),
                Declaration::ForwardDeclaration(f) => {
                    (TypedefTarget::ForwardDeclaration(f), &f.typename.namespaces)
                }
                _ => continue,
            };
            let mut key = path.clone();
            key.extend(qualifier.iter().cloned());
            key.push(decl.name().to_string());
            self.targets.entry(key).or_default().push(target);
        }
    }

    /// Resolve `qualified` (namespaces then name) as seen from `scope`.
    ///
    /// Scopes are searched from `scope` outward to the root; the first scope
    /// with any match decides. A class definition hides forward declarations
    /// of the same name.
    pub fn resolve(&self, scope: &[String], qualified: &[String]) -> Vec<TypedefTarget<'m>> {
        for depth in (0..=scope.len()).rev() {
            let mut key = scope[..depth].to_vec();
            key.extend(qualified.iter().cloned());
            let Some(found) = self.targets.get(&key) else {
                continue;
            };
            if found.iter().any(TypedefTarget::is_class) {
                return found.iter().copied().filter(TypedefTarget::is_class).collect();
            }
            return found.clone();
        }
        Vec::new()
    }
}
