//! Declaration parsing functions.
//!
//! Implements parsing of everything that can appear in a namespace or a
//! class body. Every rule either builds one complete node or fails; nothing
//! is emitted for a declaration that does not parse.

use idlwrap_core::{ParseError, ParseErrorKind, Span};

use super::decl::*;
use super::parser::Parser;
use super::type_parser::into_return_type;
use crate::lexer::{Token, TokenKind};

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse the whole file into the root namespace.
    pub(super) fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut content = Vec::new();
        while !self.is_eof() {
            content.push(self.parse_declaration()?);
        }
        Ok(Module::new(content))
    }

    /// Parse one namespace-level declaration.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Include => self.parse_include().map(Declaration::Include),
            TokenKind::Namespace => self.parse_namespace().map(Declaration::Namespace),
            TokenKind::Typedef => self.parse_typedef().map(Declaration::Typedef),
            TokenKind::Enum => self.parse_enum().map(Declaration::Enum),
            TokenKind::Class | TokenKind::Virtual => self.parse_class_or_forward(None, token.span),
            TokenKind::Template => {
                let template = self.parse_template_header()?;
                if matches!(self.peek().kind, TokenKind::Class | TokenKind::Virtual) {
                    self.parse_class_or_forward(Some(template), token.span)
                } else {
                    self.parse_function_or_variable(Some(template), token.span)
                }
            }
            TokenKind::Const | TokenKind::Identifier | TokenKind::ColonColon => {
                self.parse_function_or_variable(None, token.span)
            }
            kind if kind.is_basic_type() => self.parse_function_or_variable(None, token.span),
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedDeclaration,
                token.span,
                format!("expected declaration, found {}", token.lexeme),
            )),
        }
    }

    // =========================================
    // Includes and namespaces
    // =========================================

    /// `#include <path>` or `#include "path"`.
    fn parse_include(&mut self) -> Result<Include, ParseError> {
        let token = self.expect(TokenKind::Include)?;
        let path = include_path(token.lexeme).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidSyntax,
                token.span,
                "malformed include directive",
            )
        })?;
        Ok(Include {
            path: path.to_string(),
            span: token.span,
        })
    }

    /// `namespace Name { declarations }`
    fn parse_namespace(&mut self) -> Result<Namespace, ParseError> {
        let start = self.expect(TokenKind::Namespace)?.span;
        let name = self.expect_identifier()?.lexeme.to_string();
        self.expect(TokenKind::LeftBrace)?;

        self.namespaces.push(name.clone());
        let mut content = Vec::new();
        let result = loop {
            if self.check(TokenKind::RightBrace) {
                self.advance();
                break Ok(());
            }
            match self.parse_declaration() {
                Ok(decl) => content.push(decl),
                Err(error) => break Err(error),
            }
        };
        self.namespaces.pop();
        result?;

        Ok(Namespace {
            name,
            content,
            span: self.span_from(start),
        })
    }

    // =========================================
    // Typedefs and enums
    // =========================================

    /// `typedef Target<Args...> NewName;`
    fn parse_typedef(&mut self) -> Result<TypedefTemplateInstantiation, ParseError> {
        let start = self.expect(TokenKind::Typedef)?.span;
        let target_span = self.peek().span;
        let target = self.parse_type()?;
        if !target.is_templated() {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedTemplateArgs,
                target_span,
                format!("typedef target '{target}' has no template arguments"),
            ));
        }
        if target.is_const || target.indirection.is_some() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidModifier,
                target_span,
                "typedef target cannot carry qualifiers",
            ));
        }
        let new_name = self.expect_identifier()?.lexeme.to_string();
        self.expect(TokenKind::Semicolon)?;

        Ok(TypedefTemplateInstantiation {
            typename: target.typename,
            new_name,
            namespaces: self.namespaces.clone(),
            span: self.span_from(start),
        })
    }

    /// `enum [class|struct] Name { A [= value], B };`
    fn parse_enum(&mut self) -> Result<Enum, ParseError> {
        let start = self.expect(TokenKind::Enum)?.span;
        let is_scoped =
            self.eat(TokenKind::Class).is_some() || self.eat(TokenKind::Struct).is_some();
        let name = self.expect_identifier()?.lexeme.to_string();
        self.expect(TokenKind::LeftBrace)?;

        let mut enumerators = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            enumerators.push(self.expect_identifier()?.lexeme.to_string());
            if self.eat(TokenKind::Equal).is_some() {
                self.skip_enumerator_value()?;
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightBrace)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(Enum {
            name,
            enumerators,
            is_scoped,
            namespaces: self.namespaces.clone(),
            span: self.span_from(start),
        })
    }

    /// Skip an enumerator initializer; its value is not retained.
    fn skip_enumerator_value(&mut self) -> Result<(), ParseError> {
        let start = self.peek().span;
        let mut skipped = 0;
        while !matches!(
            self.peek().kind,
            TokenKind::Comma | TokenKind::RightBrace | TokenKind::Eof
        ) {
            self.advance();
            skipped += 1;
        }
        if skipped == 0 {
            return Err(ParseError::new(
                ParseErrorKind::InvalidSyntax,
                start,
                "expected enumerator value after '='",
            ));
        }
        Ok(())
    }

    // =========================================
    // Classes and forward declarations
    // =========================================

    /// `[virtual] class Name [: Parent] { members };` or the forward form
    /// ending in `;` right after the name or parent.
    fn parse_class_or_forward(
        &mut self,
        template: Option<Template>,
        start: Span,
    ) -> Result<Declaration, ParseError> {
        let is_virtual = self.eat(TokenKind::Virtual).is_some();
        self.expect(TokenKind::Class)?;
        let name_span = self.peek().span;
        let typename = self.parse_typename(false)?;
        let parent = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };

        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(Declaration::ForwardDeclaration(ForwardDeclaration {
                name: typename.name.clone(),
                typename,
                parent,
                is_virtual,
                template,
                namespaces: self.namespaces.clone(),
                span: self.span_from(start),
                instantiation: None,
            }));
        }

        if !typename.namespaces.is_empty() || typename.is_templated() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                name_span,
                format!("class definition name must be a plain identifier, found '{typename}'"),
            ));
        }

        let mut class = Class::new(typename.name, self.namespaces.clone(), start);
        class.template = template;
        class.is_virtual = is_virtual;
        class.parent = parent;

        self.expect(TokenKind::LeftBrace)?;
        while !self.check(TokenKind::RightBrace) {
            self.parse_class_member(&mut class)?;
        }
        self.expect(TokenKind::RightBrace)?;
        self.expect(TokenKind::Semicolon)?;

        class.span = self.span_from(start);
        Ok(Declaration::Class(class))
    }

    /// Parse one class member into `class`.
    fn parse_class_member(&mut self, class: &mut Class) -> Result<(), ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            TokenKind::Enum => {
                let e = self.parse_enum()?;
                class.enums.push(e);
                Ok(())
            }
            TokenKind::Template => {
                let template = self.parse_template_header()?;
                self.parse_templatable_member(class, Some(template), token.span)
            }
            TokenKind::Static => self.parse_templatable_member(class, None, token.span),
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::LeftParen => {
                self.parse_templatable_member(class, None, token.span)
            }
            TokenKind::Const | TokenKind::Identifier | TokenKind::ColonColon => {
                self.parse_method_operator_or_property(class, token.span)
            }
            kind if kind.is_basic_type() => self.parse_method_operator_or_property(class, token.span),
            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedClassMember,
                token.span,
                format!("expected class member, found {}", token.lexeme),
            )),
        }
    }

    /// Constructors, dunder methods, static methods and methods, any of which
    /// may follow a template header.
    fn parse_templatable_member(
        &mut self,
        class: &mut Class,
        template: Option<Template>,
        start: Span,
    ) -> Result<(), ParseError> {
        if self.eat(TokenKind::Static).is_some() {
            let return_type = self.parse_return_type()?;
            let name = self.expect_identifier()?.lexeme.to_string();
            let args = self.parse_arguments()?;
            self.expect(TokenKind::Semicolon)?;
            class.static_methods.push(StaticMethod {
                name,
                return_type,
                args,
                owner: class.self_type(),
                template,
                span: self.span_from(start),
                instantiation: None,
            });
            return Ok(());
        }

        let token = self.peek();
        if token.kind == TokenKind::Identifier && self.peek_nth(1).kind == TokenKind::LeftParen {
            self.advance();
            if let Some(dunder) = dunder_name(token.lexeme) {
                if template.is_some() {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidDeclaration,
                        token.span,
                        "special methods cannot be templated",
                    ));
                }
                let args = self.parse_arguments()?;
                self.expect(TokenKind::Semicolon)?;
                class.dunder_methods.push(DunderMethod {
                    name: dunder.to_string(),
                    args,
                    owner: class.self_type(),
                    span: self.span_from(start),
                });
                return Ok(());
            }

            if token.lexeme != class.name {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidDeclaration,
                    token.span,
                    format!(
                        "constructor name '{}' does not match class '{}'",
                        token.lexeme, class.name
                    ),
                ));
            }
            let args = self.parse_arguments()?;
            self.expect(TokenKind::Semicolon)?;
            class.ctors.push(Constructor {
                name: token.lexeme.to_string(),
                args,
                owner: class.self_type(),
                template,
                span: self.span_from(start),
                instantiation: None,
            });
            return Ok(());
        }

        let return_type = self.parse_return_type()?;
        let name = self.expect_identifier()?.lexeme.to_string();
        let method = self.parse_method_rest(class, name, return_type, template, start)?;
        class.methods.push(method);
        Ok(())
    }

    /// `Type name ...` where the name decides between method and property,
    /// or `ReturnType operator<sym>(...)`.
    fn parse_method_operator_or_property(
        &mut self,
        class: &mut Class,
        start: Span,
    ) -> Result<(), ParseError> {
        let ty = self.parse_type()?;

        if self.eat(TokenKind::Operator).is_some() {
            let symbol = self.parse_operator_symbol()?;
            let args = self.parse_arguments()?;
            let is_const = self.eat(TokenKind::Const).is_some();
            self.expect(TokenKind::Semicolon)?;
            class.operators.push(Operator {
                symbol,
                return_type: into_return_type(ty),
                args,
                is_const,
                owner: class.self_type(),
                span: self.span_from(start),
            });
            return Ok(());
        }

        let name = self.expect_identifier()?.lexeme.to_string();
        if self.check(TokenKind::LeftParen) {
            let method = self.parse_method_rest(class, name, into_return_type(ty), None, start)?;
            class.methods.push(method);
            return Ok(());
        }

        let default = self.parse_optional_default()?;
        self.expect(TokenKind::Semicolon)?;
        class.properties.push(Variable {
            ctype: ty,
            name,
            default,
            template: None,
            namespaces: self.namespaces.clone(),
            owner: Some(class.self_type()),
            span: self.span_from(start),
            instantiation: None,
        });
        Ok(())
    }

    /// `(args) [const];` after a method name.
    fn parse_method_rest(
        &mut self,
        class: &Class,
        name: String,
        return_type: ReturnType,
        template: Option<Template>,
        start: Span,
    ) -> Result<Method, ParseError> {
        let args = self.parse_arguments()?;
        let is_const = self.eat(TokenKind::Const).is_some();
        self.expect(TokenKind::Semicolon)?;
        Ok(Method {
            name,
            return_type,
            args,
            is_const,
            owner: class.self_type(),
            template,
            span: self.span_from(start),
            instantiation: None,
        })
    }

    /// The symbol after `operator`.
    fn parse_operator_symbol(&mut self) -> Result<OperatorSymbol, ParseError> {
        use OperatorSymbol as Op;

        let token = self.advance();
        let symbol = match token.kind {
            TokenKind::Plus => Op::Add,
            TokenKind::Minus => Op::Sub,
            TokenKind::Star => Op::Mul,
            TokenKind::Slash => Op::Div,
            TokenKind::Percent => Op::Rem,
            TokenKind::Caret => Op::BitXor,
            TokenKind::Amp => Op::BitAnd,
            TokenKind::Pipe => Op::BitOr,
            TokenKind::PlusEqual => Op::AddAssign,
            TokenKind::MinusEqual => Op::SubAssign,
            TokenKind::StarEqual => Op::MulAssign,
            TokenKind::SlashEqual => Op::DivAssign,
            TokenKind::PercentEqual => Op::RemAssign,
            TokenKind::CaretEqual => Op::BitXorAssign,
            TokenKind::AmpEqual => Op::BitAndAssign,
            TokenKind::PipeEqual => Op::BitOrAssign,
            TokenKind::LessLess => Op::Shl,
            TokenKind::LessLessEqual => Op::ShlAssign,
            TokenKind::GreaterGreater => Op::Shr,
            TokenKind::GreaterGreaterEqual => Op::ShrAssign,
            TokenKind::EqualEqual => Op::Eq,
            TokenKind::BangEqual => Op::Ne,
            TokenKind::Less => Op::Lt,
            TokenKind::Greater => Op::Gt,
            TokenKind::LessEqual => Op::Le,
            TokenKind::GreaterEqual => Op::Ge,
            TokenKind::LeftParen if self.eat(TokenKind::RightParen).is_some() => Op::Call,
            TokenKind::LeftBracket if self.eat(TokenKind::RightBracket).is_some() => Op::Index,
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedOperator,
                    token.span,
                    format!("'{}' is not an overloadable operator", token.lexeme),
                ));
            }
        };
        Ok(symbol)
    }

    // =========================================
    // Functions and variables
    // =========================================

    /// `ReturnType name(args);` or `[const] Type name [= default];`
    fn parse_function_or_variable(
        &mut self,
        template: Option<Template>,
        start: Span,
    ) -> Result<Declaration, ParseError> {
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?.lexeme.to_string();

        if self.check(TokenKind::LeftParen) {
            let args = self.parse_arguments()?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Declaration::GlobalFunction(GlobalFunction {
                name,
                return_type: into_return_type(ty),
                args,
                template,
                namespaces: self.namespaces.clone(),
                span: self.span_from(start),
                instantiation: None,
            }));
        }

        let default = self.parse_optional_default()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Declaration::Variable(Variable {
            ctype: ty,
            name,
            default,
            template,
            namespaces: self.namespaces.clone(),
            owner: None,
            span: self.span_from(start),
            instantiation: None,
        }))
    }

    // =========================================
    // Arguments and defaults
    // =========================================

    /// `'(' (Type IDENT ('=' DEFAULT)? (',' ...)*)? ')'`
    fn parse_arguments(&mut self) -> Result<ArgumentList, ParseError> {
        let open = self.peek();
        if open.kind != TokenKind::LeftParen {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedParameters,
                open.span,
                format!("expected '(' to start parameter list, found {}", open.lexeme),
            ));
        }
        self.advance();

        let mut args = Vec::new();
        if self.eat(TokenKind::RightParen).is_some() {
            return Ok(ArgumentList::new(args));
        }

        loop {
            let ctype = self.parse_type()?;
            let name = self.expect_identifier()?.lexeme.to_string();
            let default = self.parse_optional_default()?;
            args.push(Argument {
                ctype,
                name,
                default,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(ArgumentList::new(args))
    }

    fn parse_optional_default(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat(TokenKind::Equal).is_some() {
            self.capture_default().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Capture a default value verbatim.
    ///
    /// Stops before a `,`, `)` or `;` at nesting depth zero. Parentheses,
    /// brackets and braces nest. A `<` nests only when it opens template
    /// arguments (see [`Self::closes_template_args`]); otherwise it is a
    /// comparison, like a stray `>` that closes nothing.
    fn capture_default(&mut self) -> Result<String, ParseError> {
        let first = self.peek();
        let mut last: Option<Token<'ast>> = None;
        let mut openers: Vec<TokenKind> = Vec::new();

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => {
                    if let Some(open) = openers.last() {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedDelimiter,
                            token.span,
                            format!("unclosed {} in default value", open.description()),
                        ));
                    }
                    break;
                }
                TokenKind::Comma | TokenKind::Semicolon if openers.is_empty() => break,
                TokenKind::RightParen if openers.is_empty() => break,
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    openers.push(token.kind)
                }
                TokenKind::Less
                    if last.is_some_and(|t| t.kind == TokenKind::Identifier)
                        && self.closes_template_args() =>
                {
                    openers.push(token.kind)
                }
                TokenKind::RightParen => close_delimiter(&mut openers, TokenKind::LeftParen, token)?,
                TokenKind::RightBracket => {
                    close_delimiter(&mut openers, TokenKind::LeftBracket, token)?
                }
                TokenKind::RightBrace => close_delimiter(&mut openers, TokenKind::LeftBrace, token)?,
                TokenKind::Greater => {
                    if openers.last() == Some(&TokenKind::Less) {
                        openers.pop();
                    }
                }
                TokenKind::GreaterGreater => {
                    for _ in 0..2 {
                        if openers.last() == Some(&TokenKind::Less) {
                            openers.pop();
                        }
                    }
                }
                _ => {}
            }
            last = Some(self.advance());
        }

        let Some(last) = last else {
            return Err(ParseError::new(
                ParseErrorKind::InvalidSyntax,
                first.span,
                format!("expected default value after '=', found {}", first.lexeme),
            ));
        };
        first
            .span
            .merge(last.span)
            .slice(self.source)
            .map(str::to_string)
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::InvalidSyntax,
                    first.span,
                    "default value lies outside the source text",
                )
            })
    }
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Whether the current `<` is closed by a `>` before the enclosing
    /// bracket closes or the declaration ends.
    ///
    /// Commas do not end the search: template argument lists contain them.
    fn closes_template_args(&self) -> bool {
        let mut angles = 1usize;
        let mut brackets = 0usize;
        let mut n = 1;
        loop {
            match self.peek_nth(n).kind {
                TokenKind::Eof | TokenKind::Semicolon => return false,
                TokenKind::Less if brackets == 0 => angles += 1,
                TokenKind::Greater if brackets == 0 => angles -= 1,
                TokenKind::GreaterGreater if brackets == 0 => angles = angles.saturating_sub(2),
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    brackets += 1
                }
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    if brackets == 0 {
                        return false;
                    }
                    brackets -= 1;
                }
                _ => {}
            }
            if angles == 0 {
                return true;
            }
            n += 1;
        }
    }
}

/// Pop the matching opener for a closing bracket. Unclosed `<` above it are
/// treated as comparisons and discarded.
fn close_delimiter(
    openers: &mut Vec<TokenKind>,
    expected: TokenKind,
    token: Token<'_>,
) -> Result<(), ParseError> {
    while openers.last() == Some(&TokenKind::Less) {
        openers.pop();
    }
    match openers.pop() {
        Some(open) if open == expected => Ok(()),
        _ => Err(ParseError::new(
            ParseErrorKind::MismatchedDelimiter,
            token.span,
            format!("unmatched {} in default value", token.kind.description()),
        )),
    }
}

/// Path inside `#include <...>` or `#include "..."`.
fn include_path(lexeme: &str) -> Option<&str> {
    let rest = lexeme.strip_prefix("#include")?.trim_start();
    let inner = rest
        .strip_prefix('<')
        .and_then(|r| r.strip_suffix('>'))
        .or_else(|| rest.strip_prefix('"').and_then(|r| r.strip_suffix('"')))?;
    Some(inner.trim())
}

/// `__name__` -> `name`.
fn dunder_name(ident: &str) -> Option<&str> {
    let inner = ident.strip_prefix("__")?.strip_suffix("__")?;
    if inner.is_empty() { None } else { Some(inner) }
}
