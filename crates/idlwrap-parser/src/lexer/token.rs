//! Token types for the interface lexer.

use idlwrap_core::Span;
use std::fmt;

/// A token from an interface file.
///
/// The `'ast` lifetime refers to the arena where the lexeme string is allocated.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    /// The type of token.
    pub kind: TokenKind,
    /// The source text of this token (allocated in arena).
    pub lexeme: &'ast str,
    /// Location in source.
    pub span: Span,
}

impl<'ast> Token<'ast> {
    /// Create a new token.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types of the interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// Integer literal: `42`, `0xFF`
    IntLiteral,
    /// Floating-point literal: `9.81`, `1e-3`, `2.5f`
    FloatLiteral,
    /// String or character literal: `"hello"`, `'a'`
    StringLiteral,

    // =========================================
    // Identifiers and directives
    // =========================================
    /// User-defined identifier
    Identifier,
    /// Whole `#include <path>` directive
    Include,

    // =========================================
    // Keywords - Basic types
    // =========================================
    /// `void`
    Void,
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `unsigned` (only valid before `char`)
    Unsigned,
    /// `int`
    Int,
    /// `size_t`
    SizeT,
    /// `double`
    Double,
    /// `float`
    Float,

    // =========================================
    // Keywords - Declarations
    // =========================================
    /// `class`
    Class,
    /// `struct` (only in `enum struct`)
    Struct,
    /// `enum`
    Enum,
    /// `namespace`
    Namespace,
    /// `template`
    Template,
    /// `typedef`
    Typedef,
    /// `virtual`
    Virtual,
    /// `static`
    Static,
    /// `const`
    Const,
    /// `operator`
    Operator,

    // =========================================
    // Operators
    // =========================================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `@`
    At,
    /// `=`
    Equal,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `/=`
    SlashEqual,
    /// `%=`
    PercentEqual,
    /// `^=`
    CaretEqual,
    /// `&=`
    AmpEqual,
    /// `|=`
    PipeEqual,
    /// `<<`
    LessLess,
    /// `<<=`
    LessLessEqual,
    /// `>>`
    GreaterGreater,
    /// `>>=`
    GreaterGreaterEqual,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    // =========================================
    // Punctuation
    // =========================================
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// Expression punctuation with no role in declarations: `.`, `~`, `?`,
    /// `!`, `&&`, `||`, `++`, `--`, `->`. Kept only as default-value text.
    Punct,

    // =========================================
    // Special
    // =========================================
    /// End of input
    Eof,
    /// Lexer error (details recorded separately)
    Error,
}

impl TokenKind {
    /// Check if this token kind names one of the built-in basic types.
    pub fn is_basic_type(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Void | Bool | Char | Unsigned | Int | SizeT | Double | Float
        )
    }

    /// Check if this token kind is a keyword.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        self.is_basic_type()
            || matches!(
                self,
                Class
                    | Struct
                    | Enum
                    | Namespace
                    | Template
                    | Typedef
                    | Virtual
                    | Static
                    | Const
                    | Operator
            )
    }

    /// Check if this token kind is a literal.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral | TokenKind::FloatLiteral | TokenKind::StringLiteral
        )
    }

    /// Get the string representation of this token kind for error messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            FloatLiteral => "float literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Include => "include directive",
            Void => "'void'",
            Bool => "'bool'",
            Char => "'char'",
            Unsigned => "'unsigned'",
            Int => "'int'",
            SizeT => "'size_t'",
            Double => "'double'",
            Float => "'float'",
            Class => "'class'",
            Struct => "'struct'",
            Enum => "'enum'",
            Namespace => "'namespace'",
            Template => "'template'",
            Typedef => "'typedef'",
            Virtual => "'virtual'",
            Static => "'static'",
            Const => "'const'",
            Operator => "'operator'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Caret => "'^'",
            Amp => "'&'",
            Pipe => "'|'",
            At => "'@'",
            Equal => "'='",
            PlusEqual => "'+='",
            MinusEqual => "'-='",
            StarEqual => "'*='",
            SlashEqual => "'/='",
            PercentEqual => "'%='",
            CaretEqual => "'^='",
            AmpEqual => "'&='",
            PipeEqual => "'|='",
            LessLess => "'<<'",
            LessLessEqual => "'<<='",
            GreaterGreater => "'>>'",
            GreaterGreaterEqual => "'>>='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Semicolon => "';'",
            Comma => "','",
            Colon => "':'",
            ColonColon => "'::'",
            Punct => "punctuation",
            Eof => "end of file",
            Error => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Map a keyword string to its [`TokenKind`], or `None` if not a keyword.
///
/// `pair`, `std` and `This` are deliberately absent: they are ordinary
/// identifiers that only gain meaning in particular positions.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        // Basic types
        "void" => Void,
        "bool" => Bool,
        "char" => Char,
        "unsigned" => Unsigned,
        "int" => Int,
        "size_t" => SizeT,
        "double" => Double,
        "float" => Float,

        // Declarations
        "class" => Class,
        "struct" => Struct,
        "enum" => Enum,
        "namespace" => Namespace,
        "template" => Template,
        "typedef" => Typedef,
        "virtual" => Virtual,
        "static" => Static,
        "const" => Const,
        "operator" => Operator,

        _ => return None,
    })
}
