//! Host syntax tree for markup-in-expression documents
//!
//! This module is the engine's view of the host language: a lossless Rowan
//! tree over a document that interleaves ordinary expressions with
//! angle-bracket markup. It deliberately understands only as much of the
//! host grammar as the rewrite engine needs (element structure, attribute
//! shapes, expression containers, plain call expressions) and treats the
//! rest as opaque token runs.
//!
//! The tree uses Rowan's green/red pattern: the green tree stores the exact
//! source text (losslessly, `root.text() == source`), the red tree provides
//! parent pointers and sibling navigation, which is what the chain linker
//! leans on.

mod kind;
mod language;
mod lexer;
mod parser;

pub mod nodes;

pub use kind::SyntaxKind;
pub use language::MarkupLanguage;
pub use lexer::{LexError, Span};
pub use nodes::{
    AstNode, AttrValue, Attribute, CallExpression, ClosingTag, Element, ExpressionContainer,
    OpeningTag,
};
pub use parser::{ParseError, parse_document};

/// Red-tree node over the markup language
pub type SyntaxNode = rowan::SyntaxNode<MarkupLanguage>;
/// Red-tree token over the markup language
pub type SyntaxToken = rowan::SyntaxToken<MarkupLanguage>;
/// Node-or-token union
pub type SyntaxElement = rowan::SyntaxElement<MarkupLanguage>;
