//! Declaration nodes.
//!
//! Every node owns its children. Declarations record the namespace path they
//! were declared in (`namespaces`), and class members record their declaring
//! class (`owner`) as a type, so a member taken out of its class can still
//! name it.
//!
//! Nodes produced by template expansion carry an [`Instantiation`] recording
//! the generic name and the types bound to it; parsed nodes carry `None`.

use std::fmt;

use idlwrap_core::{RenderConventions, Span};

use super::types::{Type, Typename};

// ==========================================================================
// Templates
// ==========================================================================

/// One template parameter and its inline instantiation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    /// Parameter name (`T`).
    pub name: String,
    /// Types from `= {A, B}`; empty when none were listed.
    pub instantiations: Vec<Type>,
}

/// `template<T = {A, B}, U>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Parameters in declared order.
    pub params: Vec<TemplateParam>,
}

impl Template {
    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameter names in order.
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    /// Inline instantiation sets, one per parameter.
    pub fn instantiation_sets(&self) -> Vec<&[Type]> {
        self.params.iter().map(|p| p.instantiations.as_slice()).collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("template<")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&param.name)?;
            if !param.instantiations.is_empty() {
                let insts: Vec<String> = param.instantiations.iter().map(|t| t.to_string()).collect();
                write!(f, " = {{{}}}", insts.join(", "))?;
            }
        }
        f.write_str(">")
    }
}

/// Provenance of a concrete declaration produced by template expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instantiation {
    /// Name of the generic declaration.
    pub original_name: String,
    /// Types bound to that declaration's own template parameters, in order.
    pub bindings: Vec<Type>,
}

impl Instantiation {
    /// `name<A,B>`, the spelling used to call a templated function or method.
    pub fn call_name(&self) -> String {
        let args: Vec<String> = self.bindings.iter().map(|t| t.to_cpp()).collect();
        format!("{}<{}>", self.original_name, args.join(","))
    }
}

/// `typedef Target<A, B> NewName;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefTemplateInstantiation {
    /// The templated target, with the requested arguments.
    pub typename: Typename,
    /// External name of the result.
    pub new_name: String,
    /// Enclosing namespace path.
    pub namespaces: Vec<String>,
    pub span: Span,
}

// ==========================================================================
// Arguments and return types
// ==========================================================================

/// A named, typed parameter with an optional verbatim default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub ctype: Type,
    pub name: String,
    /// Default expression exactly as written, never interpreted.
    pub default: Option<String>,
}

impl Argument {
    pub fn new(ctype: Type, name: impl Into<String>) -> Self {
        Self {
            ctype,
            name: name.into(),
            default: None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ctype, self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// Ordered parameters of a callable. Order is call-site order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentList {
    pub args: Vec<Argument>,
}

impl ArgumentList {
    pub fn new(args: Vec<Argument>) -> Self {
        Self { args }
    }

    /// Parameter names in order.
    pub fn names(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.name.as_str()).collect()
    }

    /// C++ spelling of each parameter type, in order.
    pub fn to_cpp(&self) -> Vec<String> {
        self.to_cpp_with(&RenderConventions::default())
    }

    /// C++ spelling of each parameter type under `conventions`.
    pub fn to_cpp_with(&self, conventions: &RenderConventions) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.ctype.to_cpp_with(conventions))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.args.iter()
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}

/// A single return type, or a `pair<T1, T2>` return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnType {
    pub type1: Type,
    pub type2: Option<Type>,
}

impl ReturnType {
    pub fn new(type1: Type) -> Self {
        Self { type1, type2: None }
    }

    pub fn pair(type1: Type, type2: Type) -> Self {
        Self {
            type1,
            type2: Some(type2),
        }
    }

    /// True iff this is a single type whose canonical name is exactly `void`.
    pub fn is_void(&self) -> bool {
        self.type2.is_none() && self.type1.canonical() == "void"
    }

    pub fn is_pair(&self) -> bool {
        self.type2.is_some()
    }

    /// C++ spelling; pairs become `std::pair<T1, T2>`.
    pub fn to_cpp_with(&self, conventions: &RenderConventions) -> String {
        match &self.type2 {
            Some(type2) => format!(
                "std::pair<{}, {}>",
                self.type1.to_cpp_with(conventions),
                type2.to_cpp_with(conventions)
            ),
            None => self.type1.to_cpp_with(conventions),
        }
    }

    pub fn to_cpp(&self) -> String {
        self.to_cpp_with(&RenderConventions::default())
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type2 {
            Some(type2) => write!(f, "pair<{}, {}>", self.type1, type2),
            None => write!(f, "{}", self.type1),
        }
    }
}

// ==========================================================================
// Free-standing declarations
// ==========================================================================

/// `#include <path>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub path: String,
    pub span: Span,
}

/// A global variable or a class property: `[const] Type name [= default];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub ctype: Type,
    pub name: String,
    pub default: Option<String>,
    pub template: Option<Template>,
    pub namespaces: Vec<String>,
    /// The declaring class of a property; `None` at namespace scope.
    pub owner: Option<Typename>,
    pub span: Span,
    pub instantiation: Option<Instantiation>,
}

/// `enum [class] Name { A, B };` Only enumerator names are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub name: String,
    pub enumerators: Vec<String>,
    /// Declared as `enum class` or `enum struct`.
    pub is_scoped: bool,
    pub namespaces: Vec<String>,
    pub span: Span,
}

/// `[virtual] class Name [: Parent];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardDeclaration {
    /// External name; the generated name after instantiation.
    pub name: String,
    /// The declared (possibly qualified) name.
    pub typename: Typename,
    pub parent: Option<Type>,
    pub is_virtual: bool,
    pub template: Option<Template>,
    pub namespaces: Vec<String>,
    pub span: Span,
    pub instantiation: Option<Instantiation>,
}

impl ForwardDeclaration {
    /// `ns::Name<A,B>` for an instantiated declaration, `ns::Name` otherwise.
    ///
    /// The path is the enclosing scope followed by any qualification written
    /// in the declaration itself.
    pub fn to_cpp(&self) -> String {
        let mut path: Vec<&str> = self.namespaces.iter().map(String::as_str).collect();
        path.extend(self.typename.namespaces.iter().map(String::as_str));
        path.push(&self.typename.name);
        let qualified = path.join("::");
        match &self.instantiation {
            Some(inst) if !inst.bindings.is_empty() => {
                let args: Vec<String> = inst.bindings.iter().map(|t| t.canonical()).collect();
                format!("{qualified}<{}>", args.join(","))
            }
            _ => qualified,
        }
    }
}

/// `[template<...>] ReturnType name(args);` at namespace scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalFunction {
    pub name: String,
    pub return_type: ReturnType,
    pub args: ArgumentList,
    pub template: Option<Template>,
    pub namespaces: Vec<String>,
    pub span: Span,
    pub instantiation: Option<Instantiation>,
}

impl GlobalFunction {
    /// How C++ code calls this function: `name` or `name<A,B>`.
    pub fn cpp_name(&self) -> String {
        call_name(&self.name, &self.instantiation)
    }
}

impl fmt::Display for GlobalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(template) = &self.template {
            write!(f, "{template} ")?;
        }
        write!(f, "{} {}({});", self.return_type, self.name, self.args)
    }
}

fn call_name(name: &str, instantiation: &Option<Instantiation>) -> String {
    match instantiation {
        Some(inst) if !inst.bindings.is_empty() => inst.call_name(),
        _ => name.to_string(),
    }
}

// ==========================================================================
// Class members
// ==========================================================================

/// `[template<...>] Name(args);`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    pub args: ArgumentList,
    /// The declaring class, see [`Class::self_type`].
    pub owner: Typename,
    pub template: Option<Template>,
    pub span: Span,
    pub instantiation: Option<Instantiation>,
}

/// `[template<...>] ReturnType name(args) [const];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub return_type: ReturnType,
    pub args: ArgumentList,
    pub is_const: bool,
    pub owner: Typename,
    pub template: Option<Template>,
    pub span: Span,
    pub instantiation: Option<Instantiation>,
}

impl Method {
    /// `name` or `name<A,B>` for a member-templated instantiation.
    pub fn cpp_name(&self) -> String {
        call_name(&self.name, &self.instantiation)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(template) = &self.template {
            write!(f, "{template} ")?;
        }
        write!(f, "{} {}({})", self.return_type, self.name, self.args)?;
        if self.is_const {
            f.write_str(" const")?;
        }
        f.write_str(";")
    }
}

/// `[template<...>] static ReturnType name(args);`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMethod {
    pub name: String,
    pub return_type: ReturnType,
    pub args: ArgumentList,
    pub owner: Typename,
    pub template: Option<Template>,
    pub span: Span,
    pub instantiation: Option<Instantiation>,
}

impl StaticMethod {
    pub fn cpp_name(&self) -> String {
        call_name(&self.name, &self.instantiation)
    }
}

/// A Python-style special method, `__name__(args);`, stored as `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DunderMethod {
    pub name: String,
    pub args: ArgumentList,
    pub owner: Typename,
    pub span: Span,
}

/// Overloadable operator symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorSymbol {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitXor,
    BitAnd,
    BitOr,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    BitXorAssign,
    BitAndAssign,
    BitOrAssign,
    Shl,
    ShlAssign,
    Shr,
    ShrAssign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    /// `()`
    Call,
    /// `[]`
    Index,
}

impl OperatorSymbol {
    pub fn as_str(self) -> &'static str {
        use OperatorSymbol::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            BitXor => "^",
            BitAnd => "&",
            BitOr => "|",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            RemAssign => "%=",
            BitXorAssign => "^=",
            BitAndAssign => "&=",
            BitOrAssign => "|=",
            Shl => "<<",
            ShlAssign => "<<=",
            Shr => ">>",
            ShrAssign => ">>=",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Call => "()",
            Index => "[]",
        }
    }
}

impl fmt::Display for OperatorSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an operator overload takes an operand besides `this`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Unary,
    Binary,
}

/// `ReturnType operator<sym>(args) [const];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub symbol: OperatorSymbol,
    pub return_type: ReturnType,
    pub args: ArgumentList,
    pub is_const: bool,
    pub owner: Typename,
    pub span: Span,
}

impl Operator {
    /// Unary iff declared with no arguments.
    pub fn arity(&self) -> Arity {
        if self.args.is_empty() {
            Arity::Unary
        } else {
            Arity::Binary
        }
    }

    pub fn is_unary(&self) -> bool {
        self.arity() == Arity::Unary
    }

    /// `operator+`
    pub fn name(&self) -> String {
        format!("operator{}", self.symbol)
    }
}

/// `[template<...>] [virtual] class Name [: Parent] { members };`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    /// External name; the generated name after instantiation.
    pub name: String,
    pub template: Option<Template>,
    pub is_virtual: bool,
    pub parent: Option<Type>,
    pub ctors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub static_methods: Vec<StaticMethod>,
    pub dunder_methods: Vec<DunderMethod>,
    pub operators: Vec<Operator>,
    pub properties: Vec<Variable>,
    pub enums: Vec<Enum>,
    pub namespaces: Vec<String>,
    pub span: Span,
    pub instantiation: Option<Instantiation>,
}

impl Class {
    /// An empty class named `name`.
    pub fn new(name: impl Into<String>, namespaces: Vec<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            template: None,
            is_virtual: false,
            parent: None,
            ctors: Vec::new(),
            methods: Vec::new(),
            static_methods: Vec::new(),
            dunder_methods: Vec::new(),
            operators: Vec::new(),
            properties: Vec::new(),
            enums: Vec::new(),
            namespaces,
            span,
            instantiation: None,
        }
    }

    /// The name as written in the interface file.
    pub fn original_name(&self) -> &str {
        self.instantiation
            .as_ref()
            .map_or(&self.name, |inst| &inst.original_name)
    }

    /// The C++ type this class stands for: `ns::Name<A, B>`.
    pub fn cpp_type(&self) -> Typename {
        let bindings = self
            .instantiation
            .as_ref()
            .map(|inst| inst.bindings.clone())
            .unwrap_or_default();
        Typename::new(self.namespaces.clone(), self.original_name(), bindings)
    }

    /// C++ spelling of [`cpp_type`](Self::cpp_type).
    pub fn cpp_name(&self) -> String {
        self.cpp_type().to_cpp()
    }

    /// The type this class's members belong to.
    ///
    /// Same as [`cpp_type`](Self::cpp_type), except that a generic class
    /// uses its own parameters as arguments: `ns::Fun<X, Y>`.
    pub fn self_type(&self) -> Typename {
        match (&self.instantiation, &self.template) {
            (None, Some(template)) => Typename::new(
                self.namespaces.clone(),
                self.name.clone(),
                template.params.iter().map(|p| Type::named(&p.name)).collect(),
            ),
            _ => self.cpp_type(),
        }
    }
}

// ==========================================================================
// Containers
// ==========================================================================

/// Any declaration that can appear in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Include(Include),
    Namespace(Namespace),
    Class(Class),
    ForwardDeclaration(ForwardDeclaration),
    Enum(Enum),
    Variable(Variable),
    GlobalFunction(GlobalFunction),
    Typedef(TypedefTemplateInstantiation),
}

impl Declaration {
    /// The declared (or generated) name; the path for includes.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Include(d) => &d.path,
            Declaration::Namespace(d) => &d.name,
            Declaration::Class(d) => &d.name,
            Declaration::ForwardDeclaration(d) => &d.name,
            Declaration::Enum(d) => &d.name,
            Declaration::Variable(d) => &d.name,
            Declaration::GlobalFunction(d) => &d.name,
            Declaration::Typedef(d) => &d.new_name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Declaration::Include(d) => d.span,
            Declaration::Namespace(d) => d.span,
            Declaration::Class(d) => d.span,
            Declaration::ForwardDeclaration(d) => d.span,
            Declaration::Enum(d) => d.span,
            Declaration::Variable(d) => d.span,
            Declaration::GlobalFunction(d) => d.span,
            Declaration::Typedef(d) => d.span,
        }
    }

    /// Short kind label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Declaration::Include(_) => "include",
            Declaration::Namespace(_) => "namespace",
            Declaration::Class(_) => "class",
            Declaration::ForwardDeclaration(_) => "forward declaration",
            Declaration::Enum(_) => "enum",
            Declaration::Variable(_) => "variable",
            Declaration::GlobalFunction(_) => "function",
            Declaration::Typedef(_) => "typedef",
        }
    }

    /// Whether this declaration still needs template expansion.
    pub fn is_templated(&self) -> bool {
        match self {
            Declaration::Class(d) => d.template.is_some(),
            Declaration::ForwardDeclaration(d) => d.template.is_some(),
            Declaration::Variable(d) => d.template.is_some(),
            Declaration::GlobalFunction(d) => d.template.is_some(),
            Declaration::Typedef(_) => true,
            Declaration::Include(_) | Declaration::Namespace(_) | Declaration::Enum(_) => false,
        }
    }
}

/// `namespace Name { ... }`. Same-named namespaces are kept separate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Namespace {
    pub name: String,
    pub content: Vec<Declaration>,
    pub span: Span,
}

impl Namespace {
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.content.iter().filter_map(|d| match d {
            Declaration::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &GlobalFunction> {
        self.content.iter().filter_map(|d| match d {
            Declaration::GlobalFunction(f) => Some(f),
            _ => None,
        })
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.content.iter().filter_map(|d| match d {
            Declaration::Namespace(n) => Some(n),
            _ => None,
        })
    }

    /// First class named `name` directly in this namespace.
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes().find(|c| c.name == name)
    }

    /// First function named `name` directly in this namespace.
    pub fn function(&self, name: &str) -> Option<&GlobalFunction> {
        self.functions().find(|f| f.name == name)
    }

    /// First nested namespace named `name`.
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces().find(|n| n.name == name)
    }

    /// Names of the direct children, in order.
    pub fn names(&self) -> Vec<&str> {
        self.content.iter().map(Declaration::name).collect()
    }
}

/// A parsed file: the unnamed root namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    pub root: Namespace,
}

impl Module {
    pub fn new(content: Vec<Declaration>) -> Self {
        Self {
            root: Namespace {
                name: String::new(),
                content,
                span: Span::default(),
            },
        }
    }

    pub fn content(&self) -> &[Declaration] {
        &self.root.content
    }
}

impl std::ops::Deref for Module {
    type Target = Namespace;

    fn deref(&self) -> &Namespace {
        &self.root
    }
}

// ==========================================================================
// Surface rendering
// ==========================================================================

fn write_template(f: &mut fmt::Formatter<'_>, template: &Option<Template>) -> fmt::Result {
    match template {
        Some(template) => write!(f, "{template} "),
        None => Ok(()),
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#include <{}>", self.path)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_template(f, &self.template)?;
        write!(f, "{} {}", self.ctype, self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        f.write_str(";")
    }
}

impl fmt::Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_scoped { "enum class" } else { "enum" };
        write!(f, "{keyword} {} {{{}}};", self.name, self.enumerators.join(", "))
    }
}

impl fmt::Display for ForwardDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_template(f, &self.template)?;
        if self.is_virtual {
            f.write_str("virtual ")?;
        }
        write!(f, "class {}", self.typename)?;
        if let Some(parent) = &self.parent {
            write!(f, " : {parent}")?;
        }
        f.write_str(";")
    }
}

impl fmt::Display for TypedefTemplateInstantiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "typedef {} {};", self.typename, self.new_name)
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_template(f, &self.template)?;
        write!(f, "{}({});", self.name, self.args)
    }
}

impl fmt::Display for StaticMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_template(f, &self.template)?;
        write!(f, "static {} {}({});", self.return_type, self.name, self.args)
    }
}

impl fmt::Display for DunderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__{}__({});", self.name, self.args)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} operator{}({})", self.return_type, self.symbol, self.args)?;
        if self.is_const {
            f.write_str(" const")?;
        }
        f.write_str(";")
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_template(f, &self.template)?;
        if self.is_virtual {
            f.write_str("virtual ")?;
        }
        write!(f, "class {}", self.name)?;
        if let Some(parent) = &self.parent {
            write!(f, " : {parent}")?;
        }
        f.write_str(" {\n")?;
        for ctor in &self.ctors {
            writeln!(f, "  {ctor}")?;
        }
        for method in &self.methods {
            writeln!(f, "  {method}")?;
        }
        for method in &self.static_methods {
            writeln!(f, "  {method}")?;
        }
        for method in &self.dunder_methods {
            writeln!(f, "  {method}")?;
        }
        for op in &self.operators {
            writeln!(f, "  {op}")?;
        }
        for property in &self.properties {
            writeln!(f, "  {property}")?;
        }
        for e in &self.enums {
            writeln!(f, "  {e}")?;
        }
        f.write_str("};")
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Include(d) => d.fmt(f),
            Declaration::Namespace(d) => d.fmt(f),
            Declaration::Class(d) => d.fmt(f),
            Declaration::ForwardDeclaration(d) => d.fmt(f),
            Declaration::Enum(d) => d.fmt(f),
            Declaration::Variable(d) => d.fmt(f),
            Declaration::GlobalFunction(d) => d.fmt(f),
            Declaration::Typedef(d) => d.fmt(f),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "namespace {} {{", self.name)?;
        for decl in &self.content {
            writeln!(f, "{decl}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decl in &self.root.content {
            writeln!(f, "{decl}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Indirection;

    fn arg(ty: &str, name: &str) -> Argument {
        Argument::new(Type::named(ty), name)
    }

    #[test]
    fn argument_list_views() {
        let args = ArgumentList::new(vec![
            arg("double", "x"),
            Argument::new(
                Type::named("Pose3")
                    .with_const(true)
                    .with_indirection(Some(Indirection::Ref)),
                "pose",
            ),
        ]);
        assert_eq!(args.names(), vec!["x", "pose"]);
        assert_eq!(args.to_cpp(), vec!["double", "const Pose3&"]);
        assert_eq!(args.to_string(), "double x, const Pose3& pose");
    }

    #[test]
    fn return_type_void() {
        assert!(ReturnType::new(Type::named("void")).is_void());
        assert!(!ReturnType::new(Type::named("int")).is_void());
        assert!(!ReturnType::pair(Type::named("void"), Type::named("int")).is_void());
    }

    #[test]
    fn pair_return_rendering() {
        let rt = ReturnType::pair(Type::named("Point2"), Type::named("double"));
        assert_eq!(rt.to_cpp(), "std::pair<Point2, double>");
        assert_eq!(rt.to_string(), "pair<Point2, double>");
    }

    #[test]
    fn operator_arity() {
        let op = Operator {
            symbol: OperatorSymbol::Sub,
            return_type: ReturnType::new(Type::named("Point2")),
            args: ArgumentList::default(),
            is_const: true,
            owner: Typename::simple("Point2"),
            span: Span::default(),
        };
        assert!(op.is_unary());
        assert_eq!(op.name(), "operator-");
    }

    #[test]
    fn class_cpp_type() {
        let mut class = Class::new("FunDouble", vec!["ns".to_string()], Span::default());
        class.instantiation = Some(Instantiation {
            original_name: "Fun".to_string(),
            bindings: vec![Type::named("double"), Type::named("int")],
        });
        assert_eq!(class.original_name(), "Fun");
        assert_eq!(class.cpp_name(), "ns::Fun<double, int>");
        assert_eq!(class.self_type(), class.cpp_type());
    }

    #[test]
    fn generic_self_type_uses_parameters() {
        let mut class = Class::new("Fun", vec!["ns".to_string()], Span::default());
        assert_eq!(class.self_type().canonical(), "ns::Fun");
        class.template = Some(Template {
            params: vec![
                TemplateParam {
                    name: "X".to_string(),
                    instantiations: vec![Type::named("double")],
                },
                TemplateParam {
                    name: "Y".to_string(),
                    instantiations: vec![],
                },
            ],
        });
        assert_eq!(class.self_type().canonical(), "ns::Fun<X, Y>");
    }

    #[test]
    fn call_names() {
        let inst = Instantiation {
            original_name: "templatedMethod".to_string(),
            bindings: vec![Type::named("string"), Type::named("size_t")],
        };
        assert_eq!(inst.call_name(), "templatedMethod<string,size_t>");
    }

    #[test]
    fn template_display() {
        let template = Template {
            params: vec![
                TemplateParam {
                    name: "T".to_string(),
                    instantiations: vec![Type::named("double"), Type::named("int")],
                },
                TemplateParam {
                    name: "U".to_string(),
                    instantiations: vec![],
                },
            ],
        };
        assert_eq!(template.to_string(), "template<T = {double, int}, U>");
        assert_eq!(template.names(), vec!["T", "U"]);
        assert_eq!(template.arity(), 2);
    }
}
