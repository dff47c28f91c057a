//! Rowan language implementation for the markup-in-expression grammar
//!
//! Connects [`SyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::SyntaxKind;

/// Language implementation for markup-in-expression documents
///
/// Zero-sized type implementing `rowan::Language` so that our syntax kinds
/// can flow through Rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkupLanguage;

impl Language for MarkupLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            // Trivia
            0 => SyntaxKind::Whitespace,
            1 => SyntaxKind::Newline,
            2 => SyntaxKind::CommentLine,
            3 => SyntaxKind::CommentBlock,

            // Expression tokens (10-49)
            10 => SyntaxKind::Ident,
            11 => SyntaxKind::StringLit,
            12 => SyntaxKind::TemplateLit,
            13 => SyntaxKind::NumberLit,
            14 => SyntaxKind::RegexLit,
            15 => SyntaxKind::Operator,
            16 => SyntaxKind::Dot,

            // Structural punctuation (50-99)
            50 => SyntaxKind::LAngle,
            51 => SyntaxKind::RAngle,
            52 => SyntaxKind::Slash,
            53 => SyntaxKind::LBrace,
            54 => SyntaxKind::RBrace,
            55 => SyntaxKind::LParen,
            56 => SyntaxKind::RParen,
            57 => SyntaxKind::LBracket,
            58 => SyntaxKind::RBracket,
            59 => SyntaxKind::Eq,

            // Markup tokens (100-149)
            100 => SyntaxKind::MarkupText,
            101 => SyntaxKind::TagName,
            102 => SyntaxKind::AttrName,

            // Structure nodes (200-)
            200 => SyntaxKind::Document,
            201 => SyntaxKind::Element,
            202 => SyntaxKind::Fragment,
            203 => SyntaxKind::OpeningTag,
            204 => SyntaxKind::ClosingTag,
            205 => SyntaxKind::Attribute,
            206 => SyntaxKind::ExpressionContainer,
            207 => SyntaxKind::CallExpression,

            _ => SyntaxKind::Error,
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}
