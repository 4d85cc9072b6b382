//! Type parsing functions.
//!
//! Implements parsing of:
//! - Basic types (`double`, `unsigned char`)
//! - Qualified names (`gtsam::noiseModel::Base`)
//! - Template arguments (`std::vector<gtsam::Pose3*>`)
//! - Qualifiers (`const`, `*`, `@`, `&`)
//! - Return types, including `pair<T1, T2>`
//! - Template headers (`template<T = {A, B}, U>`)

use idlwrap_core::{ParseError, ParseErrorKind, Span};

use super::decl::{ReturnType, Template, TemplateParam};
use super::parser::Parser;
use super::types::{Indirection, Type, Typename};
use crate::lexer::{Token, TokenKind};

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse a type use.
    ///
    /// Grammar: `'const'? TYPENAME ('*' | '@' | '&')?`
    pub fn parse_type(&mut self) -> Result<Type, ParseError> {
        self.parse_qualified_type(false)
    }

    fn parse_qualified_type(&mut self, in_template_args: bool) -> Result<Type, ParseError> {
        let is_const = self.eat(TokenKind::Const).is_some();
        let typename = self.parse_typename(in_template_args)?;

        let indirection = match self.peek().kind {
            TokenKind::Star => Some(Indirection::SharedPtr),
            TokenKind::At => Some(Indirection::RawPtr),
            TokenKind::Amp => Some(Indirection::Ref),
            _ => None,
        };
        if indirection.is_some() {
            self.advance();
        }

        Ok(Type::new(typename)
            .with_const(is_const)
            .with_indirection(indirection))
    }

    /// Parse a return type. `pair<T1, T2>` becomes a two-type return.
    pub fn parse_return_type(&mut self) -> Result<ReturnType, ParseError> {
        let ty = self.parse_type()?;
        Ok(into_return_type(ty))
    }

    /// Parse a possibly qualified, possibly templated name.
    ///
    /// Grammar: `BASIC | '::'? (IDENT '::')* IDENT TEMPLATE_ARGS?`
    ///
    /// Integer literals are accepted as names inside template arguments
    /// (`Matrix<double, 3, 4>`).
    pub(super) fn parse_typename(&mut self, in_template_args: bool) -> Result<Typename, ParseError> {
        let token = self.peek();
        if token.kind.is_basic_type() {
            return self.parse_basic_typename();
        }
        if in_template_args && token.kind == TokenKind::IntLiteral {
            self.advance();
            return Ok(Typename::simple(token.lexeme));
        }

        self.eat(TokenKind::ColonColon);

        let mut namespaces = Vec::new();
        let mut name = self.expect_type_segment()?;
        while self.check(TokenKind::ColonColon) && self.peek_nth(1).kind == TokenKind::Identifier {
            self.advance();
            namespaces.push(std::mem::take(&mut name));
            name = self.expect_type_segment()?;
        }

        let instantiations = if self.check(TokenKind::Less) {
            self.parse_template_args()?
        } else {
            Vec::new()
        };

        Ok(Typename::new(namespaces, name, instantiations))
    }

    fn expect_type_segment(&mut self) -> Result<String, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                Ok(token.lexeme.to_string())
            }
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            _ => Err(ParseError::expected_type(token.span, token.lexeme)),
        }
    }

    /// `void`, `bool`, `char`, `unsigned char`, `int`, `size_t`, `double`, `float`.
    fn parse_basic_typename(&mut self) -> Result<Typename, ParseError> {
        let token = self.advance();
        if token.kind == TokenKind::Unsigned {
            self.expect(TokenKind::Char)?;
            return Ok(Typename::simple("unsigned char"));
        }
        Ok(Typename::simple(token.lexeme))
    }

    /// Parse template argument list.
    ///
    /// Grammar: `'<' TYPE (',' TYPE)* '>'`
    fn parse_template_args(&mut self) -> Result<Vec<Type>, ParseError> {
        let open = self.expect(TokenKind::Less)?;

        if self.is_template_close() {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedTemplateArgs,
                open.span,
                "template argument list is empty",
            ));
        }

        let mut args = vec![self.parse_qualified_type(true)?];
        while self.eat(TokenKind::Comma).is_some() {
            args.push(self.parse_qualified_type(true)?);
        }

        self.expect_template_close()?;
        Ok(args)
    }

    /// Check if we're at a template closing token (`>` or `>>`).
    fn is_template_close(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Greater | TokenKind::GreaterGreater
        )
    }

    /// Expect and consume a template closing `>`.
    ///
    /// A `>>` is split into two `>` tokens and one is consumed, so nested
    /// templates close correctly at any depth.
    pub(super) fn expect_template_close(&mut self) -> Result<(), ParseError> {
        if self.check(TokenKind::GreaterGreater) {
            self.split_greater_greater();
        }
        if self.eat(TokenKind::Greater).is_some() {
            return Ok(());
        }
        let token = self.peek();
        Err(ParseError::new(
            ParseErrorKind::ExpectedToken,
            token.span,
            format!("expected '>' to close template arguments, found {}", token.lexeme),
        ))
    }

    /// Split a `>>` token into two `>` tokens in the buffer.
    fn split_greater_greater(&mut self) {
        let token = self.peek();
        if token.kind != TokenKind::GreaterGreater {
            return;
        }
        let first = Token::new(
            TokenKind::Greater,
            ">",
            Span::new(token.span.offset, 1, token.span.line, token.span.col),
        );
        let second = Token::new(
            TokenKind::Greater,
            ">",
            Span::new(token.span.offset + 1, 1, token.span.line, token.span.col + 1),
        );
        self.buffer[self.position] = first;
        self.buffer.insert(self.position + 1, second);
    }

    /// Parse a template header.
    ///
    /// Grammar: `'template' '<' PARAM (',' PARAM)* '>'` where
    /// `PARAM = IDENT ('=' '{' TYPE (',' TYPE)* '}')?`
    pub(super) fn parse_template_header(&mut self) -> Result<Template, ParseError> {
        self.expect(TokenKind::Template)?;
        let open = self.expect(TokenKind::Less)?;

        if self.is_template_close() {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedTemplateArgs,
                open.span,
                "template header declares no parameters",
            ));
        }

        let mut params = Vec::new();
        loop {
            let name = self.expect_identifier()?.lexeme.to_string();
            let mut instantiations = Vec::new();
            if self.eat(TokenKind::Equal).is_some() {
                self.expect(TokenKind::LeftBrace)?;
                if !self.check(TokenKind::RightBrace) {
                    instantiations.push(self.parse_type()?);
                    while self.eat(TokenKind::Comma).is_some() {
                        instantiations.push(self.parse_type()?);
                    }
                }
                self.expect(TokenKind::RightBrace)?;
            }
            params.push(TemplateParam {
                name,
                instantiations,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect_template_close()?;
        Ok(Template { params })
    }
}

/// Apply the `pair` rule: an unqualified (or `std::`) `pair` of exactly two
/// plain types, with no qualifiers of its own, is a two-type return.
pub(super) fn into_return_type(ty: Type) -> ReturnType {
    let typename = &ty.typename;
    let is_pair = typename.name == "pair"
        && (typename.namespaces.is_empty() || typename.namespaces == ["std"])
        && typename.instantiations.len() == 2
        && typename.instantiations.iter().all(|t| !t.is_templated())
        && !ty.is_const
        && ty.indirection.is_none();

    if !is_pair {
        return ReturnType::new(ty);
    }
    match <[Type; 2]>::try_from(ty.typename.instantiations.clone()) {
        Ok([type1, type2]) => ReturnType::pair(type1, type2),
        Err(_) => ReturnType::new(ty),
    }
}
