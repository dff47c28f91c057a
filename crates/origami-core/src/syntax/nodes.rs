//! Typed wrappers over the raw syntax tree
//!
//! Each wrapper implements `cast()` to safely convert from raw nodes, in the
//! spirit of a typed AST layer over a lossless CST. The rewrite engine works
//! against these, never against raw kinds.

use std::ops::Range;

use super::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Helper trait for casting raw nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Byte range of this node in the original source
    fn span(&self) -> Range<usize> {
        let range = self.syntax().text_range();
        u32::from(range.start()) as usize..u32::from(range.end()) as usize
    }
}

fn child_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

fn token_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

fn token_span(token: &SyntaxToken) -> Range<usize> {
    let range = token.text_range();
    u32::from(range.start()) as usize..u32::from(range.end()) as usize
}

/// Strip matching quotes from a string-literal token's text
pub(crate) fn unquote(text: &str) -> String {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0]
    {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(
    /// An element: `<name ...>children</name>` or `<name .../>`
    Element,
    SyntaxKind::Element
);

impl Element {
    pub fn opening_tag(&self) -> Option<OpeningTag> {
        child_of_kind(&self.syntax, SyntaxKind::OpeningTag).and_then(OpeningTag::cast)
    }

    pub fn closing_tag(&self) -> Option<ClosingTag> {
        child_of_kind(&self.syntax, SyntaxKind::ClosingTag).and_then(ClosingTag::cast)
    }

    pub fn tag_name(&self) -> Option<String> {
        self.opening_tag().and_then(|t| t.name())
    }

    pub fn is_self_closing(&self) -> bool {
        self.closing_tag().is_none()
    }

    /// Anything between the tags: nested nodes, markup text (including
    /// whitespace-only runs)
    pub fn has_body_content(&self) -> bool {
        self.syntax.children_with_tokens().any(|e| match e {
            rowan::NodeOrToken::Node(n) => {
                !matches!(n.kind(), SyntaxKind::OpeningTag | SyntaxKind::ClosingTag)
            }
            rowan::NodeOrToken::Token(t) => t.kind() == SyntaxKind::MarkupText,
        })
    }

    /// Source text of the opening tag, for error messages
    pub fn opening_text(&self) -> String {
        self.opening_tag()
            .map(|t| t.syntax().text().to_string())
            .unwrap_or_else(|| self.syntax.text().to_string())
    }
}

ast_node!(
    /// The `<name attr=...>` (or `<name .../>`) part of an element
    OpeningTag,
    SyntaxKind::OpeningTag
);

impl OpeningTag {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::TagName)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.syntax.children().filter_map(Attribute::cast)
    }
}

ast_node!(
    /// The `</name>` part of an element
    ClosingTag,
    SyntaxKind::ClosingTag
);

ast_node!(
    /// A named attribute inside an opening tag
    Attribute,
    SyntaxKind::Attribute
);

/// An attribute's value: a quoted literal or a brace container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Literal(SyntaxToken),
    Container(ExpressionContainer),
}

impl AttrValue {
    /// The literal's text without quotes; None for containers
    pub fn literal_text(&self) -> Option<String> {
        match self {
            AttrValue::Literal(token) => Some(unquote(token.text())),
            AttrValue::Container(_) => None,
        }
    }
}

impl Attribute {
    pub fn name(&self) -> Option<String> {
        token_of_kind(&self.syntax, SyntaxKind::AttrName).map(|t| t.text().to_string())
    }

    pub fn value(&self) -> Option<AttrValue> {
        for child in self.syntax.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::StringLit => {
                    return Some(AttrValue::Literal(t));
                }
                rowan::NodeOrToken::Node(n) if n.kind() == SyntaxKind::ExpressionContainer => {
                    return ExpressionContainer::cast(n).map(AttrValue::Container);
                }
                _ => {}
            }
        }
        None
    }
}

ast_node!(
    /// A brace-fenced expression in markup content or attribute position
    ExpressionContainer,
    SyntaxKind::ExpressionContainer
);

impl ExpressionContainer {
    fn l_brace(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::LBrace)
    }

    fn r_brace(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::RBrace)
    }

    /// Byte range of the contained expression (between the braces)
    pub fn expression_span(&self) -> Option<Range<usize>> {
        let open = self.l_brace()?;
        let close = self.r_brace()?;
        Some(token_span(&open).end..token_span(&close).start)
    }

    /// Whether the container holds anything significant (`{}` and
    /// `{ /* only trivia */ }` do not)
    pub fn has_expression(&self) -> bool {
        self.syntax.children_with_tokens().any(|e| match e {
            rowan::NodeOrToken::Node(_) => true,
            rowan::NodeOrToken::Token(t) => !matches!(
                t.kind(),
                SyntaxKind::LBrace | SyntaxKind::RBrace
            ) && !t.kind().is_trivia(),
        })
    }
}

ast_node!(
    /// A plain `ident(...)` call in expression soup
    CallExpression,
    SyntaxKind::CallExpression
);

impl CallExpression {
    pub fn callee_name(&self) -> Option<String> {
        token_of_kind(&self.syntax, SyntaxKind::Ident).map(|t| t.text().to_string())
    }

    /// The first argument, when it is a string literal; unquoted
    pub fn first_string_arg(&self) -> Option<String> {
        let mut seen_paren = false;
        for child in self.syntax.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Token(t) => {
                    if t.kind() == SyntaxKind::LParen {
                        seen_paren = true;
                        continue;
                    }
                    if !seen_paren || t.kind().is_trivia() {
                        continue;
                    }
                    return (t.kind() == SyntaxKind::StringLit).then(|| unquote(t.text()));
                }
                rowan::NodeOrToken::Node(_) if seen_paren => return None,
                rowan::NodeOrToken::Node(_) => continue,
            }
        }
        None
    }
}
