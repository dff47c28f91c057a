//! Context fencing for rewritten nodes
//!
//! Two independent decisions, re-derived per node from its immediate
//! parent, never from global document state:
//!
//! - **children fencing**: a control body becomes an embedded markup
//!   fragment (`<>` ... `</>`), or an empty-fragment placeholder when there
//!   is no body, so a ternary/map/lambda branch is never an empty
//!   expression.
//! - **result fencing**: once the control construct is a bare expression,
//!   it is spliced back as `{...}` when the parent is markup content and as
//!   `(...)` when the parent is already an expression position, where brace
//!   syntax would be illegal.

use std::ops::Range;

use crate::edit::EditBuffer;
use crate::syntax::SyntaxKind;

/// What kind of position a rewritten node occupies in its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentContext {
    /// Inside an element or fragment: markup content
    Markup,
    /// Inside an expression container, call arguments, or the document
    /// itself: expression position
    Expression,
}

impl ParentContext {
    pub fn of(parent_kind: SyntaxKind) -> Self {
        match parent_kind {
            SyntaxKind::Element | SyntaxKind::Fragment => Self::Markup,
            _ => Self::Expression,
        }
    }
}

/// Fence markers for a control body: `("<>", "</>")` around a real body,
/// a `<></>` placeholder when the body is empty
pub fn children_fence(has_body: bool) -> (&'static str, &'static str) {
    if has_body { ("<>", "</>") } else { ("<></>", "") }
}

/// Splice a finished expression back into its parent position
pub fn wrap_for_parent(buf: &mut EditBuffer<'_>, span: Range<usize>, ctx: ParentContext) {
    let (open, close) = match ctx {
        ParentContext::Markup => ("{", "}"),
        ParentContext::Expression => ("(", ")"),
    };
    buf.insert_before(span.start, open);
    buf.insert_after(span.end, close);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_context_from_kind() {
        assert_eq!(ParentContext::of(SyntaxKind::Element), ParentContext::Markup);
        assert_eq!(ParentContext::of(SyntaxKind::Fragment), ParentContext::Markup);
        assert_eq!(
            ParentContext::of(SyntaxKind::ExpressionContainer),
            ParentContext::Expression
        );
        assert_eq!(
            ParentContext::of(SyntaxKind::Document),
            ParentContext::Expression
        );
        assert_eq!(
            ParentContext::of(SyntaxKind::CallExpression),
            ParentContext::Expression
        );
    }

    #[test]
    fn markup_parent_gets_braces() {
        let mut buf = EditBuffer::new("abcd");
        wrap_for_parent(&mut buf, 1..3, ParentContext::Markup);
        let (text, _) = buf.materialize().expect("materialize");
        assert_eq!(text, "a{bc}d");
    }

    #[test]
    fn expression_parent_gets_parens() {
        let mut buf = EditBuffer::new("abcd");
        wrap_for_parent(&mut buf, 1..3, ParentContext::Expression);
        let (text, _) = buf.materialize().expect("materialize");
        assert_eq!(text, "a(bc)d");
    }
}
