//! Type substitution for template instantiation.
//!
//! Provides functions to substitute template parameters, the `This`
//! placeholder and scoped dependent names (`T::Value`) with concrete types.

use idlwrap_core::{InstantiationError, Span};
use idlwrap_parser::ast::{Argument, ArgumentList, ReturnType, Type, Typename};

/// The self-reference placeholder.
pub const THIS: &str = "This";

/// Template parameters bound to concrete types, plus the class that `This`
/// stands for.
///
/// Order matters: when a name could match more than one parameter, the one
/// declared first wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionMap {
    params: Vec<(String, Type)>,
    this: Option<Typename>,
}

impl SubstitutionMap {
    /// An empty map: substitution is a deep copy that rejects `This`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type that `This` resolves to.
    pub fn with_this(mut self, this: Typename) -> Self {
        self.this = Some(this);
        self
    }

    /// A copy of this map with more parameters appended.
    ///
    /// Used for member templates, whose parameters follow the class's.
    pub fn extended(&self, names: &[String], types: &[Type]) -> Self {
        let mut map = self.clone();
        map.params.extend(names.iter().cloned().zip(types.iter().cloned()));
        map
    }

    /// The type bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// The type `This` resolves to, if inside a class.
    pub fn this(&self) -> Option<&Typename> {
        self.this.as_ref()
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// First parameter (in declared order) used as a namespace segment,
    /// with the segment's index.
    fn scoped_param(&self, namespaces: &[String]) -> Option<(usize, &Type)> {
        self.params.iter().find_map(|(name, ty)| {
            namespaces
                .iter()
                .position(|segment| segment == name)
                .map(|index| (index, ty))
        })
    }
}

/// Build a substitution map from template parameters and type arguments.
///
/// # Errors
/// Returns [`InstantiationError::TemplateArityMismatch`] if the number of
/// arguments doesn't match the number of parameters.
pub fn build_substitution_map(
    template_name: &str,
    params: &[String],
    args: &[Type],
    span: Span,
) -> Result<SubstitutionMap, InstantiationError> {
    if params.len() != args.len() {
        return Err(InstantiationError::TemplateArityMismatch {
            name: template_name.to_string(),
            expected: params.len(),
            got: args.len(),
            span,
        });
    }
    Ok(SubstitutionMap::new().extended(params, args))
}

/// Where a substitution happens, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    /// Name of the declaration being instantiated.
    pub declaration: &'a str,
    pub span: Span,
}

impl<'a> Site<'a> {
    pub fn new(declaration: &'a str, span: Span) -> Self {
        Self { declaration, span }
    }
}

/// Substitute template parameters in a type.
///
/// Precedence, after nested template arguments have been substituted:
/// 1. a parameter used as a namespace segment (`T::Value`); segments
///    written before it are kept,
/// 2. the whole type is a parameter (`T`),
/// 3. the whole type is `This`,
/// 4. `This` used as a namespace segment (`This::Inner`),
/// 5. anything else is copied unchanged.
///
/// The use site's `const` and pointer/reference qualifier are always kept;
/// the bound type's qualifiers are not carried over.
pub fn substitute_type(
    ty: &Type,
    map: &SubstitutionMap,
    site: Site<'_>,
) -> Result<Type, InstantiationError> {
    let typename = &ty.typename;
    let instantiations = typename
        .instantiations
        .iter()
        .map(|arg| substitute_type(arg, map, site))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some((index, bound)) = map.scoped_param(&typename.namespaces) {
        let bound = &bound.typename;
        let mut namespaces = typename.namespaces[..index].to_vec();
        namespaces.extend(bound.namespaces.iter().cloned());
        namespaces.push(bound.templated_name());
        namespaces.extend(typename.namespaces[index + 1..].iter().cloned());
        return Ok(requalify(
            ty,
            Typename::new(namespaces, typename.name.clone(), Vec::new()),
            false,
        ));
    }

    if typename.namespaces.is_empty() && typename.instantiations.is_empty() {
        if let Some(bound) = map.get(&typename.name) {
            return Ok(requalify(ty, bound.typename.clone(), bound.is_basic));
        }
        if typename.name == THIS {
            let this = resolve_this(map, site)?;
            return Ok(requalify(ty, this.clone(), false));
        }
    }

    if let Some(index) = typename.namespaces.iter().position(|ns| ns == THIS) {
        let this = resolve_this(map, site)?;
        let mut namespaces = this.namespaces.clone();
        namespaces.push(this.templated_name());
        namespaces.extend(typename.namespaces[index + 1..].iter().cloned());
        return Ok(requalify(
            ty,
            Typename::new(namespaces, typename.name.clone(), instantiations),
            false,
        ));
    }

    Ok(Type {
        typename: Typename::new(
            typename.namespaces.clone(),
            typename.name.clone(),
            instantiations,
        ),
        ..ty.clone()
    })
}

fn resolve_this<'m>(
    map: &'m SubstitutionMap,
    site: Site<'_>,
) -> Result<&'m Typename, InstantiationError> {
    map.this()
        .ok_or_else(|| InstantiationError::UnresolvedSelfReference {
            declaration: site.declaration.to_string(),
            span: site.span,
        })
}

/// A new type named `typename` carrying `use_site`'s qualifiers.
fn requalify(use_site: &Type, typename: Typename, is_basic: bool) -> Type {
    Type {
        typename,
        is_const: use_site.is_const,
        indirection: use_site.indirection,
        is_basic,
    }
}

/// Substitute template parameters in every argument type.
///
/// Names and default values are copied verbatim.
pub fn substitute_args(
    args: &ArgumentList,
    map: &SubstitutionMap,
    site: Site<'_>,
) -> Result<ArgumentList, InstantiationError> {
    let args = args
        .iter()
        .map(|arg| {
            Ok(Argument {
                ctype: substitute_type(&arg.ctype, map, site)?,
                name: arg.name.clone(),
                default: arg.default.clone(),
            })
        })
        .collect::<Result<Vec<_>, InstantiationError>>()?;
    Ok(ArgumentList::new(args))
}

/// Substitute template parameters in both halves of a return type.
pub fn substitute_return_type(
    return_type: &ReturnType,
    map: &SubstitutionMap,
    site: Site<'_>,
) -> Result<ReturnType, InstantiationError> {
    let type1 = substitute_type(&return_type.type1, map, site)?;
    let type2 = return_type
        .type2
        .as_ref()
        .map(|t| substitute_type(t, map, site))
        .transpose()?;
    Ok(ReturnType { type1, type2 })
}
