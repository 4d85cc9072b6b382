//! Class instantiation.
//!
//! A class is instantiated with one binding per class-level parameter. Its
//! constructors, methods and static methods may declare their own templates;
//! those are expanded once per combination of the member's instantiation
//! sets, with the member's parameters appended after the class's.

use idlwrap_core::{CollisionPolicy, InstantiationError, Span};
use idlwrap_parser::ast::{
    Class, Constructor, DunderMethod, Instantiation, Method, Operator, StaticMethod, Template,
    Type, Typename, Variable,
};
use tracing::trace;

use crate::naming::{describe_instantiation, instantiate_name};
use crate::product::cartesian_product;
use crate::registry::NameRegistry;
use crate::substitution::{
    Site, SubstitutionMap, build_substitution_map, substitute_args, substitute_return_type,
    substitute_type,
};

/// Instantiate `class` with concrete `bindings` for its class-level
/// parameters.
///
/// The result is named `new_name` when given, otherwise the generated name.
/// A non-templated class takes no bindings; instantiating it applies `This`
/// and copies it.
///
/// # Errors
/// - [`InstantiationError::TemplateArityMismatch`] if `bindings` does not
///   match the class template.
/// - [`InstantiationError::UnresolvedSelfReference`] never, since every
///   member has the class as context.
pub fn instantiate_class(
    class: &Class,
    bindings: &[Type],
    new_name: Option<&str>,
) -> Result<Class, InstantiationError> {
    let mut registry = NameRegistry::new(CollisionPolicy::Ignore);
    expand_class(class, bindings, new_name, class.span, &mut registry)
}

/// [`instantiate_class`] reporting arity errors at `span` and recording
/// generated member names in `registry`.
pub(crate) fn expand_class(
    class: &Class,
    bindings: &[Type],
    new_name: Option<&str>,
    span: Span,
    registry: &mut NameRegistry,
) -> Result<Class, InstantiationError> {
    // 1. Validate arity and bind class parameters
    let params = class.template.as_ref().map(Template::names).unwrap_or_default();
    let owner = Typename::new(class.namespaces.clone(), class.name.clone(), bindings.to_vec());
    let map = build_substitution_map(&class.name, &params, bindings, span)?.with_this(owner.clone());

    // 2. Name the instance
    let name = match new_name {
        Some(name) => name.to_string(),
        None => instantiate_name(&class.name, bindings),
    };
    let site = Site::new(&class.name, class.span);

    let mut scope = class.namespaces.clone();
    scope.push(name.clone());
    let mut members = MemberExpansion {
        class_map: &map,
        owner: &owner,
        scope: &scope,
        registry,
    };

    // 3. Parent and members
    let parent = class
        .parent
        .as_ref()
        .map(|parent| substitute_type(parent, &map, site))
        .transpose()?;
    let ctors = members.expand(&class.ctors, |_| name.as_str())?;
    let methods = members.expand(&class.methods, |m| m.name.as_str())?;
    let static_methods = members.expand(&class.static_methods, |m| m.name.as_str())?;

    let operators = class
        .operators
        .iter()
        .map(|op| instantiate_operator(op, &map, &owner))
        .collect::<Result<Vec<_>, _>>()?;
    let properties = class
        .properties
        .iter()
        .map(|prop| instantiate_property(prop, &map, &owner))
        .collect::<Result<Vec<_>, _>>()?;
    let dunder_methods = class
        .dunder_methods
        .iter()
        .map(|dunder| {
            Ok(DunderMethod {
                name: dunder.name.clone(),
                args: substitute_args(&dunder.args, &map, Site::new(&dunder.name, dunder.span))?,
                owner: owner.clone(),
                span: dunder.span,
            })
        })
        .collect::<Result<Vec<_>, InstantiationError>>()?;

    let instantiation = class.template.as_ref().map(|_| Instantiation {
        original_name: class.name.clone(),
        bindings: bindings.to_vec(),
    });

    Ok(Class {
        name,
        template: None,
        is_virtual: class.is_virtual,
        parent,
        ctors,
        methods,
        static_methods,
        dunder_methods,
        operators,
        properties,
        enums: class.enums.clone(),
        namespaces: class.namespaces.clone(),
        span: class.span,
        instantiation,
    })
}

fn instantiate_operator(
    op: &Operator,
    map: &SubstitutionMap,
    owner: &Typename,
) -> Result<Operator, InstantiationError> {
    let name = op.name();
    let site = Site::new(&name, op.span);
    Ok(Operator {
        symbol: op.symbol,
        return_type: substitute_return_type(&op.return_type, map, site)?,
        args: substitute_args(&op.args, map, site)?,
        is_const: op.is_const,
        owner: owner.clone(),
        span: op.span,
    })
}

fn instantiate_property(
    prop: &Variable,
    map: &SubstitutionMap,
    owner: &Typename,
) -> Result<Variable, InstantiationError> {
    Ok(Variable {
        ctype: substitute_type(&prop.ctype, map, Site::new(&prop.name, prop.span))?,
        owner: Some(owner.clone()),
        ..prop.clone()
    })
}

// =========================================
// Member-level templates
// =========================================

/// A class member that may carry its own template.
trait TemplatedMember: Sized {
    fn member_name(&self) -> &str;
    fn template(&self) -> Option<&Template>;
    fn span(&self) -> Span;

    /// A concrete copy named `name` belonging to `owner`, substituted
    /// through `map`.
    fn instantiate(
        &self,
        name: String,
        map: &SubstitutionMap,
        owner: &Typename,
        instantiation: Option<Instantiation>,
    ) -> Result<Self, InstantiationError>;
}

impl TemplatedMember for Constructor {
    fn member_name(&self) -> &str {
        &self.name
    }

    fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    fn span(&self) -> Span {
        self.span
    }

    fn instantiate(
        &self,
        name: String,
        map: &SubstitutionMap,
        owner: &Typename,
        instantiation: Option<Instantiation>,
    ) -> Result<Self, InstantiationError> {
        let args = substitute_args(&self.args, map, Site::new(&self.name, self.span))?;
        Ok(Constructor {
            name,
            args,
            owner: owner.clone(),
            template: None,
            span: self.span,
            instantiation,
        })
    }
}

impl TemplatedMember for Method {
    fn member_name(&self) -> &str {
        &self.name
    }

    fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    fn span(&self) -> Span {
        self.span
    }

    fn instantiate(
        &self,
        name: String,
        map: &SubstitutionMap,
        owner: &Typename,
        instantiation: Option<Instantiation>,
    ) -> Result<Self, InstantiationError> {
        let site = Site::new(&self.name, self.span);
        Ok(Method {
            name,
            return_type: substitute_return_type(&self.return_type, map, site)?,
            args: substitute_args(&self.args, map, site)?,
            is_const: self.is_const,
            owner: owner.clone(),
            template: None,
            span: self.span,
            instantiation,
        })
    }
}

impl TemplatedMember for StaticMethod {
    fn member_name(&self) -> &str {
        &self.name
    }

    fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    fn span(&self) -> Span {
        self.span
    }

    fn instantiate(
        &self,
        name: String,
        map: &SubstitutionMap,
        owner: &Typename,
        instantiation: Option<Instantiation>,
    ) -> Result<Self, InstantiationError> {
        let site = Site::new(&self.name, self.span);
        Ok(StaticMethod {
            name,
            return_type: substitute_return_type(&self.return_type, map, site)?,
            args: substitute_args(&self.args, map, site)?,
            owner: owner.clone(),
            template: None,
            span: self.span,
            instantiation,
        })
    }
}

struct MemberExpansion<'a> {
    class_map: &'a SubstitutionMap,
    owner: &'a Typename,
    /// Enclosing namespaces plus the instantiated class name.
    scope: &'a [String],
    registry: &'a mut NameRegistry,
}

impl MemberExpansion<'_> {
    /// Expand every member, in order. `base_name` gives the name that
    /// member-level bindings are appended to.
    fn expand<'m, M, F>(&mut self, members: &'m [M], base_name: F) -> Result<Vec<M>, InstantiationError>
    where
        M: TemplatedMember,
        F: Fn(&'m M) -> &'m str,
    {
        let mut out = Vec::with_capacity(members.len());
        for member in members {
            let base = base_name(member);
            let Some(template) = member.template() else {
                out.push(member.instantiate(base.to_string(), self.class_map, self.owner, None)?);
                continue;
            };

            let names = template.names();
            let combos = cartesian_product(&template.instantiation_sets());
            trace!(
                member = member.member_name(),
                instantiations = combos.len(),
                "expanding member template"
            );

            for combo in combos {
                let map = self.class_map.extended(&names, &combo);
                let name = instantiate_name(base, &combo);
                self.registry.register(
                    self.scope,
                    &name,
                    describe_instantiation(member.member_name(), &combo),
                    member.span(),
                )?;
                let instantiation = Instantiation {
                    original_name: member.member_name().to_string(),
                    bindings: combo,
                };
                out.push(member.instantiate(name, &map, self.owner, Some(instantiation))?);
            }
        }
        Ok(out)
    }
}
