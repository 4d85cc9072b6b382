//! Instantiation of namespace-level declarations other than classes.

use idlwrap_core::{InstantiationError, Span};
use idlwrap_parser::ast::{
    ForwardDeclaration, GlobalFunction, Instantiation, Template, Type, Variable,
};

use crate::naming::instantiate_name;
use crate::substitution::{
    Site, build_substitution_map, substitute_args, substitute_return_type,
    substitute_type,
};

fn template_params(template: &Option<Template>) -> Vec<String> {
    template.as_ref().map(Template::names).unwrap_or_default()
}

fn instance_name(original: &str, bindings: &[Type], new_name: Option<&str>) -> String {
    match new_name {
        Some(name) => name.to_string(),
        None => instantiate_name(original, bindings),
    }
}

fn provenance(template: &Option<Template>, original: &str, bindings: &[Type]) -> Option<Instantiation> {
    template.as_ref().map(|_| Instantiation {
        original_name: original.to_string(),
        bindings: bindings.to_vec(),
    })
}

// =========================================
// Global functions
// =========================================

/// Instantiate a global function.
///
/// There is no enclosing class, so `This` anywhere in the signature is an
/// error.
pub fn instantiate_function(
    func: &GlobalFunction,
    bindings: &[Type],
    new_name: Option<&str>,
) -> Result<GlobalFunction, InstantiationError> {
    expand_function(func, bindings, new_name, func.span)
}

pub(crate) fn expand_function(
    func: &GlobalFunction,
    bindings: &[Type],
    new_name: Option<&str>,
    span: Span,
) -> Result<GlobalFunction, InstantiationError> {
    let map = build_substitution_map(&func.name, &template_params(&func.template), bindings, span)?;
    let site = Site::new(&func.name, func.span);
    Ok(GlobalFunction {
        name: instance_name(&func.name, bindings, new_name),
        return_type: substitute_return_type(&func.return_type, &map, site)?,
        args: substitute_args(&func.args, &map, site)?,
        template: None,
        namespaces: func.namespaces.clone(),
        span: func.span,
        instantiation: provenance(&func.template, &func.name, bindings),
    })
}

// =========================================
// Variables
// =========================================

/// Instantiate a (possibly templated) global variable.
pub fn instantiate_variable(
    var: &Variable,
    bindings: &[Type],
    new_name: Option<&str>,
) -> Result<Variable, InstantiationError> {
    let map = build_substitution_map(&var.name, &template_params(&var.template), bindings, var.span)?;
    Ok(Variable {
        ctype: substitute_type(&var.ctype, &map, Site::new(&var.name, var.span))?,
        name: instance_name(&var.name, bindings, new_name),
        default: var.default.clone(),
        template: None,
        namespaces: var.namespaces.clone(),
        owner: var.owner.clone(),
        span: var.span,
        instantiation: provenance(&var.template, &var.name, bindings),
    })
}

// =========================================
// Forward declarations
// =========================================

/// Instantiate a forward declaration for naming purposes.
///
/// A templated declaration checks arity and substitutes its parent. A
/// non-templated one accepts any bindings, since its template lives in code
/// the interface file does not describe; with no bindings it keeps its name.
pub fn instantiate_forward_declaration(
    decl: &ForwardDeclaration,
    bindings: &[Type],
    new_name: Option<&str>,
) -> Result<ForwardDeclaration, InstantiationError> {
    expand_forward_declaration(decl, bindings, new_name, decl.span)
}

pub(crate) fn expand_forward_declaration(
    decl: &ForwardDeclaration,
    bindings: &[Type],
    new_name: Option<&str>,
    span: Span,
) -> Result<ForwardDeclaration, InstantiationError> {
    let parent = match &decl.template {
        Some(template) => {
            let map = build_substitution_map(&decl.name, &template.names(), bindings, span)?;
            decl.parent
                .as_ref()
                .map(|p| substitute_type(p, &map, Site::new(&decl.name, decl.span)))
                .transpose()?
        }
        None => decl.parent.clone(),
    };

    let instantiation = (decl.template.is_some() || !bindings.is_empty()).then(|| Instantiation {
        original_name: decl.name.clone(),
        bindings: bindings.to_vec(),
    });

    Ok(ForwardDeclaration {
        name: instance_name(&decl.name, bindings, new_name),
        typename: decl.typename.clone(),
        parent,
        is_virtual: decl.is_virtual,
        template: None,
        namespaces: decl.namespaces.clone(),
        span: decl.span,
        instantiation,
    })
}
