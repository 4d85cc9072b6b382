//! The instantiation pass over a parsed module.
//!
//! Walks the namespace tree depth-first and replaces every templated
//! declaration with its concrete instances, in place, so sibling order is
//! preserved. Typedefs are resolved against the original tree and replaced
//! by the declaration they name.

use idlwrap_core::{InstantiationError, InstantiatorOptions};
use idlwrap_parser::ast::{Declaration, Module, Namespace, Template, Type, TypedefTemplateInstantiation};
use tracing::{debug, trace};

use crate::class::expand_class;
use crate::declaration::{expand_forward_declaration, expand_function, instantiate_variable};
use crate::naming::describe_instantiation;
use crate::product::cartesian_product;
use crate::registry::{NameRegistry, TypedefIndex, TypedefTarget};

/// Expands a parsed module into a fully concrete one.
///
/// The input module is never modified, and nothing is kept between runs.
#[derive(Debug, Clone, Default)]
pub struct Instantiator {
    options: InstantiatorOptions,
}

impl Instantiator {
    pub fn new(options: InstantiatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &InstantiatorOptions {
        &self.options
    }

    /// Instantiate every templated declaration in `module`.
    ///
    /// # Errors
    /// The first [`InstantiationError`] aborts the run; no partial module is
    /// returned.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate(&self, module: &Module) -> Result<Module, InstantiationError> {
        let mut pass = Pass {
            index: TypedefIndex::build(&module.root),
            registry: NameRegistry::new(self.options.collision_policy),
        };
        let content = pass.walk(&module.root.content, &[])?;
        debug!(
            declarations = content.len(),
            generated_names = pass.registry.len(),
            "instantiation complete"
        );
        Ok(Module::new(content))
    }
}

/// State for one run.
struct Pass<'m> {
    index: TypedefIndex<'m>,
    registry: NameRegistry,
}

impl<'m> Pass<'m> {
    fn walk(
        &mut self,
        content: &'m [Declaration],
        scope: &[String],
    ) -> Result<Vec<Declaration>, InstantiationError> {
        let mut out = Vec::with_capacity(content.len());
        for decl in content {
            match decl {
                Declaration::Namespace(ns) => {
                    let mut inner = scope.to_vec();
                    inner.push(ns.name.clone());
                    out.push(Declaration::Namespace(Namespace {
                        name: ns.name.clone(),
                        content: self.walk(&ns.content, &inner)?,
                        span: ns.span,
                    }));
                }
                Declaration::Class(class) => {
                    self.expand_inline(decl, class.template.as_ref(), scope, &mut out, |combo, registry| {
                        expand_class(class, combo, None, class.span, registry).map(Declaration::Class)
                    })?;
                }
                Declaration::GlobalFunction(func) => {
                    self.expand_inline(decl, func.template.as_ref(), scope, &mut out, |combo, _| {
                        expand_function(func, combo, None, func.span).map(Declaration::GlobalFunction)
                    })?;
                }
                Declaration::Variable(var) => {
                    self.expand_inline(decl, var.template.as_ref(), scope, &mut out, |combo, _| {
                        instantiate_variable(var, combo, None).map(Declaration::Variable)
                    })?;
                }
                Declaration::ForwardDeclaration(fwd) if fwd.template.is_some() => {
                    self.expand_inline(decl, fwd.template.as_ref(), scope, &mut out, |combo, _| {
                        expand_forward_declaration(fwd, combo, None, fwd.span)
                            .map(Declaration::ForwardDeclaration)
                    })?;
                }
                Declaration::Typedef(typedef) => {
                    let instance = self.expand_typedef(typedef)?;
                    out.push(instance);
                }
                Declaration::ForwardDeclaration(_) | Declaration::Include(_) | Declaration::Enum(_) => {
                    out.push(decl.clone());
                }
            }
        }
        Ok(out)
    }

    /// Expand `decl` once per combination of its inline instantiation sets,
    /// or once with no bindings when it is not templated.
    fn expand_inline<F>(
        &mut self,
        decl: &Declaration,
        template: Option<&Template>,
        scope: &[String],
        out: &mut Vec<Declaration>,
        mut instantiate: F,
    ) -> Result<(), InstantiationError>
    where
        F: FnMut(&[Type], &mut NameRegistry) -> Result<Declaration, InstantiationError>,
    {
        let combos = match template {
            Some(template) => {
                let combos = cartesian_product(&template.instantiation_sets());
                debug!(
                    kind = decl.kind(),
                    name = decl.name(),
                    instantiations = combos.len(),
                    "expanding template"
                );
                combos
            }
            None => vec![Vec::new()],
        };

        for combo in &combos {
            let instance = instantiate(combo, &mut self.registry)?;
            self.registry.register(
                scope,
                instance.name(),
                describe_instantiation(decl.name(), combo),
                decl.span(),
            )?;
            out.push(instance);
        }
        Ok(())
    }

    fn expand_typedef(
        &mut self,
        typedef: &TypedefTemplateInstantiation,
    ) -> Result<Declaration, InstantiationError> {
        let target = &typedef.typename;
        let mut qualified = target.namespaces.clone();
        qualified.push(target.name.clone());

        let found = self.index.resolve(&typedef.namespaces, &qualified);
        let target_name = target.qualified_name();
        let resolved = match found.as_slice() {
            [] => {
                return Err(InstantiationError::UnresolvedTypedefTarget {
                    name: target_name,
                    span: typedef.span,
                });
            }
            [one] => *one,
            many => {
                return Err(InstantiationError::AmbiguousTypedefTarget {
                    name: target_name,
                    count: many.len(),
                    span: typedef.span,
                });
            }
        };
        trace!(
            typedef = %typedef.new_name,
            resolved = %target,
            "resolved typedef target"
        );

        let args = &target.instantiations;
        let new_name = Some(typedef.new_name.as_str());
        let (original, instance) = match resolved {
            TypedefTarget::Class(class) => (
                &class.name,
                Declaration::Class(expand_class(class, args, new_name, typedef.span, &mut self.registry)?),
            ),
            TypedefTarget::Function(func) => (
                &func.name,
                Declaration::GlobalFunction(expand_function(func, args, new_name, typedef.span)?),
            ),
            TypedefTarget::ForwardDeclaration(fwd) => (
                &fwd.name,
                Declaration::ForwardDeclaration(expand_forward_declaration(
                    fwd,
                    args,
                    new_name,
                    typedef.span,
                )?),
            ),
        };

        self.registry.register(
            &typedef.namespaces,
            &typedef.new_name,
            describe_instantiation(original, args),
            typedef.span,
        )?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use idlwrap_core::CollisionPolicy;
    use idlwrap_parser::Parser;
    use idlwrap_parser::ast::Class;

    fn parse(source: &str) -> Module {
        let arena = Bump::new();
        Parser::parse(source, &arena).unwrap()
    }

    fn run(source: &str) -> Result<Module, InstantiationError> {
        Instantiator::default().instantiate(&parse(source))
    }

    fn class<'a>(ns: &'a Namespace, name: &str) -> &'a Class {
        ns.class(name)
            .unwrap_or_else(|| panic!("no class {name} in {:?}", ns.names()))
    }

    #[test]
    fn cartesian_class_expansion() {
        let module = run(
            "template<X = {double, float}, Y = {gtsam::Pose2, gtsam::Pose3}>
             class Fun { X x(Y y) const; };",
        )
        .unwrap();
        assert_eq!(
            module.names(),
            vec!["FunDoublePose2", "FunDoublePose3", "FunFloatPose2", "FunFloatPose3"]
        );
        let fun = class(&module, "FunFloatPose3");
        assert_eq!(fun.methods[0].return_type.type1.name(), "float");
        assert_eq!(fun.methods[0].args.to_cpp(), vec!["gtsam::Pose3"]);
    }

    #[test]
    fn order_is_preserved() {
        let module = run(
            "#include <a.h>
             class A {};
             template<T = {int, double}> T f(T x);
             enum Kind { One, Two };
             double g();",
        )
        .unwrap();
        assert_eq!(module.names(), vec!["a.h", "A", "fInt", "fDouble", "Kind", "g"]);
    }

    #[test]
    fn nested_namespaces_are_walked() {
        let module = run(
            "namespace gtsam { namespace noise { template<T = {double}> class Model {}; } class Point2 {}; }",
        )
        .unwrap();
        let gtsam = module.namespace("gtsam").unwrap();
        assert_eq!(gtsam.names(), vec!["noise", "Point2"]);
        let noise = gtsam.namespace("noise").unwrap();
        let model = class(noise, "ModelDouble");
        assert_eq!(model.namespaces, vec!["gtsam", "noise"]);
        assert_eq!(model.cpp_name(), "gtsam::noise::Model<double>");
    }

    #[test]
    fn template_without_sets_produces_nothing() {
        let module = run("template<T> class Foo {}; class Bar {};").unwrap();
        assert_eq!(module.names(), vec!["Bar"]);
    }

    #[test]
    fn input_module_is_untouched() {
        let source = "template<T = {double, int}> class Box { T get() const; };";
        let module = parse(source);
        let before = module.clone();
        let first = Instantiator::default().instantiate(&module).unwrap();
        let snapshot = first.clone();
        let _second = Instantiator::default().instantiate(&module).unwrap();
        assert_eq!(module, before);
        assert_eq!(first, snapshot);
        assert_eq!(class(&first, "BoxDouble").methods[0].return_type.type1.name(), "double");
        assert_eq!(class(&first, "BoxInt").methods[0].return_type.type1.name(), "int");
    }

    #[test]
    fn typedef_instantiates_class_in_place() {
        let module = run(
            "template<T, U> class Pair { T first() const; U second() const; };
             class Marker {};
             typedef Pair<double, gtsam::Pose3> PairDP;",
        )
        .unwrap();
        assert_eq!(module.names(), vec!["Marker", "PairDP"]);
        let pair = class(&module, "PairDP");
        assert_eq!(pair.cpp_name(), "Pair<double, gtsam::Pose3>");
        assert_eq!(pair.methods[1].return_type.type1.canonical(), "gtsam::Pose3");
    }

    #[test]
    fn typedef_resolves_from_enclosing_scopes() {
        let module = run(
            "namespace gtsam {
                template<T> class Factor {};
                namespace inner { typedef Factor<double> FactorD; }
             }
             typedef gtsam::Factor<int> FactorI;",
        )
        .unwrap();
        let inner = module.namespace("gtsam").unwrap().namespace("inner").unwrap();
        let factor = class(inner, "FactorD");
        assert_eq!(factor.cpp_name(), "gtsam::Factor<double>");
        assert_eq!(class(&module, "FactorI").cpp_name(), "gtsam::Factor<int>");
    }

    #[test]
    fn typedef_of_function_and_forward_declaration() {
        let module = run(
            "template<T, R> R convert(T x);
             class FactorFromAnotherMother;
             typedef convert<int, double> convertIntDouble;
             typedef FactorFromAnotherMother<gtsam::Pose3> FactorWeCanUse;",
        )
        .unwrap();
        let func = module.function("convertIntDouble").unwrap();
        assert_eq!(func.cpp_name(), "convert<int,double>");
        assert_eq!(func.return_type.type1.name(), "double");

        let Some(Declaration::ForwardDeclaration(fwd)) = module.content().last() else {
            panic!("expected forward declaration");
        };
        assert_eq!(fwd.name, "FactorWeCanUse");
        assert_eq!(fwd.to_cpp(), "FactorFromAnotherMother<gtsam::Pose3>");
    }

    #[test]
    fn typedef_errors() {
        let unresolved = run("typedef Missing<int> MissingInt;").unwrap_err();
        assert!(matches!(
            unresolved,
            InstantiationError::UnresolvedTypedefTarget { ref name, .. } if name == "Missing"
        ));

        let ambiguous = run(
            "template<T> void f(T x); template<T> void f(T x, T y); typedef f<int> fInt;",
        )
        .unwrap_err();
        assert!(matches!(
            ambiguous,
            InstantiationError::AmbiguousTypedefTarget { count: 2, .. }
        ));

        let source = "template<T, U> class Pair {};\ntypedef Pair<int> PairI;";
        let arity = run(source).unwrap_err();
        assert!(matches!(
            arity,
            InstantiationError::TemplateArityMismatch { expected: 2, got: 1, .. }
        ));
        assert_eq!(arity.span().line, 2);
    }

    #[test]
    fn this_outside_class_fails_the_run() {
        let err = run("class A {}; This make();").unwrap_err();
        assert!(matches!(err, InstantiationError::UnresolvedSelfReference { .. }));
    }

    #[test]
    fn collisions_follow_policy() {
        let source = "namespace a { class Pose3 {}; }
                      namespace b { class Pose3 {}; }
                      template<T = {a::Pose3, b::Pose3}> class Foo {};";
        let module = parse(source);

        let warned = Instantiator::default().instantiate(&module).unwrap();
        assert_eq!(warned.names(), vec!["a", "b", "FooPose3", "FooPose3"]);

        let strict = Instantiator::new(
            InstantiatorOptions::new().with_collision_policy(CollisionPolicy::Error),
        );
        let err = strict.instantiate(&module).unwrap_err();
        assert_eq!(
            err,
            InstantiationError::NameCollision {
                name: "FooPose3".to_string(),
                first: "Foo<a::Pose3>".to_string(),
                second: "Foo<b::Pose3>".to_string(),
                span: module.content()[2].span(),
            }
        );
    }

    #[test]
    fn member_name_collisions_are_scoped_to_the_class() {
        let source = "namespace a { class V {}; } namespace b { class V {}; }
                      class Holder { template<T = {a::V, b::V}> void set(T v); };";
        let strict = Instantiator::new(
            InstantiatorOptions::new().with_collision_policy(CollisionPolicy::Error),
        );
        let err = strict.instantiate(&parse(source)).unwrap_err();
        assert!(matches!(err, InstantiationError::NameCollision { ref name, .. } if name == "setV"));
    }
}
