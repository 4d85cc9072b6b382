//! Generated names for instantiated declarations.

use idlwrap_parser::ast::Type;

/// Append each binding's base name, first letter capitalized, to `original`.
///
/// Namespaces are not part of the generated name, so `gtsam::Pose3` and
/// `other::Pose3` produce the same suffix.
///
/// ```
/// use idlwrap_instantiator::instantiate_name;
/// use idlwrap_parser::parse_type;
///
/// let man = parse_type("Man").unwrap();
/// assert_eq!(instantiate_name("Iron", &[man]), "IronMan");
/// ```
pub fn instantiate_name(original: &str, bindings: &[Type]) -> String {
    let mut name = original.to_string();
    for binding in bindings {
        let mut chars = binding.name().chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

/// `name<A, B>` with canonical argument names, used to tell instantiations
/// apart when their generated names collide.
pub fn describe_instantiation(original: &str, bindings: &[Type]) -> String {
    if bindings.is_empty() {
        return original.to_string();
    }
    let args: Vec<String> = bindings.iter().map(Type::canonical).collect();
    format!("{original}<{}>", args.join(", "))
}
