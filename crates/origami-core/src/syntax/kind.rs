//! Syntax kinds for the markup-in-expression grammar

/// All token and node kinds produced by the lexer and parser.
///
/// Tokens occupy the low ranges, structure nodes start at 200. The numeric
/// values are part of the `rowan::Language` mapping and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Trivia (0-9)
    Whitespace = 0,
    Newline = 1,
    CommentLine = 2,
    CommentBlock = 3,

    // Expression tokens (10-49)
    Ident = 10,
    StringLit = 11,
    TemplateLit = 12,
    NumberLit = 13,
    RegexLit = 14,
    /// Any operator or punctuation the engine has no structural interest in
    /// (`+`, `=>`, `===`, `,`, `;`, `?`, a comparison `<`, ...).
    Operator = 15,
    Dot = 16,

    // Structural punctuation (50-99)
    LAngle = 50,
    RAngle = 51,
    Slash = 52,
    LBrace = 53,
    RBrace = 54,
    LParen = 55,
    RParen = 56,
    LBracket = 57,
    RBracket = 58,
    Eq = 59,

    // Markup tokens (100-149)
    MarkupText = 100,
    TagName = 101,
    AttrName = 102,

    // Structure nodes (200-)
    Document = 200,
    Element = 201,
    Fragment = 202,
    OpeningTag = 203,
    ClosingTag = 204,
    Attribute = 205,
    ExpressionContainer = 206,
    CallExpression = 207,

    // Special (400+)
    Error = 400,
}

impl SyntaxKind {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::Newline
                | SyntaxKind::CommentLine
                | SyntaxKind::CommentBlock
        )
    }
}
