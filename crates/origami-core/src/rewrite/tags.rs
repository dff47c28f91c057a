//! Reserved control forms and their attribute contracts
//!
//! Dispatch is a closed enum resolved once per element, not a registry
//! lookup. Each handler builds a fresh name-keyed attribute map from the
//! opening tag, destructures the form's required attributes and rejects
//! everything else.

use std::ops::Range;

use indexmap::IndexMap;
use tracing::debug;

use crate::edit::EditBuffer;
use crate::syntax::{AstNode, AttrValue, Element, ExpressionContainer};
use crate::{OrigamiError, Result};

use super::wrap::{ParentContext, children_fence, wrap_for_parent};
use super::Rewriter;

/// The reserved control forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlForm {
    If,
    ElseIf,
    Else,
    For,
    Let,
}

impl ControlForm {
    /// Every tag name the engine consumes
    pub const RESERVED_NAMES: &'static [&'static str] =
        &["$if", "$else-if", "$else", "$for", "$let"];

    /// Resolve a tag name to its control form
    pub fn of(name: &str) -> Option<Self> {
        match name {
            "$if" => Some(Self::If),
            "$else-if" => Some(Self::ElseIf),
            "$else" => Some(Self::Else),
            "$for" => Some(Self::For),
            "$let" => Some(Self::Let),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::If => "$if",
            Self::ElseIf => "$else-if",
            Self::Else => "$else",
            Self::For => "$for",
            Self::Let => "$let",
        }
    }

    /// Conditional forms carrying a `test` attribute
    pub fn has_test(self) -> bool {
        matches!(self, Self::If | Self::ElseIf)
    }

    /// Forms that continue a conditional chain started by `$if`
    pub fn continues_chain(self) -> bool {
        matches!(self, Self::ElseIf | Self::Else)
    }
}

/// Name-keyed projection of an element's attributes
///
/// Built fresh per handler invocation and discarded after. Keys are unique
/// in a legal document; on duplicates the first wins by construction.
pub struct AttrMap {
    map: IndexMap<String, Option<AttrValue>>,
    has_spread: bool,
    tag: String,
    span: Range<usize>,
}

impl AttrMap {
    pub fn collect(element: &Element) -> Self {
        let tag = element.opening_text();
        let span = element
            .opening_tag()
            .map(|t| t.span())
            .unwrap_or_else(|| element.span());

        let mut map = IndexMap::new();
        let mut has_spread = false;
        if let Some(opening) = element.opening_tag() {
            has_spread = opening
                .syntax()
                .children()
                .any(|n| ExpressionContainer::cast(n).is_some());
            for attr in opening.attributes() {
                let Some(name) = attr.name() else { continue };
                map.entry(name).or_insert_with(|| attr.value());
            }
        }

        Self {
            map,
            has_spread,
            tag,
            span,
        }
    }

    /// Require an attribute holding a non-empty embedded-expression
    /// container
    pub fn require_container(&self, name: &str) -> Result<ExpressionContainer> {
        match self.map.get(name) {
            None => Err(OrigamiError::missing_attribute(
                name,
                &self.tag,
                self.span.clone(),
            )),
            Some(Some(AttrValue::Container(container))) if container.has_expression() => {
                Ok(container.clone())
            }
            Some(_) => Err(OrigamiError::wrong_attribute_kind(
                name,
                "an {expression} container",
                &self.tag,
                self.span.clone(),
            )),
        }
    }

    /// Require an attribute holding a string literal; returns the unquoted
    /// text
    pub fn require_literal(&self, name: &str) -> Result<String> {
        match self.map.get(name) {
            None => Err(OrigamiError::missing_attribute(
                name,
                &self.tag,
                self.span.clone(),
            )),
            Some(Some(AttrValue::Literal(token))) => {
                Ok(crate::syntax::nodes::unquote(token.text()))
            }
            Some(_) => Err(OrigamiError::wrong_attribute_kind(
                name,
                "a string literal",
                &self.tag,
                self.span.clone(),
            )),
        }
    }

    /// Reject any attribute outside `allowed`, and spreads always
    pub fn forbid_extra(&self, allowed: &[&str]) -> Result<()> {
        if self.has_spread {
            return Err(OrigamiError::unexpected_attribute(
                "{...}",
                &self.tag,
                self.span.clone(),
            ));
        }
        for name in self.map.keys() {
            if !allowed.contains(&name.as_str()) {
                return Err(OrigamiError::unexpected_attribute(
                    name,
                    &self.tag,
                    self.span.clone(),
                ));
            }
        }
        Ok(())
    }
}

impl Rewriter {
    /// Rewrite `<$for var="x" of={E}>B</$for>` to `(E).map((x) => <>B</>)`,
    /// fenced for its parent.
    ///
    /// The loop variable text is taken as opaque identifier-or-pattern
    /// text; validating it as a legal binding target is deferred.
    pub(crate) fn rewrite_for(
        &self,
        element: &Element,
        ctx: ParentContext,
        buf: &mut EditBuffer<'_>,
    ) -> Result<()> {
        debug!("rewriting {}", element.opening_text());

        let attrs = AttrMap::collect(element);
        let var_text = attrs.require_literal("var")?;
        let of = attrs.require_container("of")?;
        attrs.forbid_extra(&["var", "of"])?;

        let opening = element
            .opening_tag()
            .ok_or_else(|| OrigamiError::internal("element without opening tag"))?;
        let open = opening.span();
        let expr = of
            .expression_span()
            .ok_or_else(|| OrigamiError::internal("container without braces"))?;
        let (fence_open, fence_close) = children_fence(element.has_body_content());

        buf.replace(open.start..expr.start, "(");
        match element.closing_tag() {
            Some(closing) => {
                buf.replace(
                    expr.end..open.end,
                    format!(").map(({var_text}) => {fence_open}"),
                );
                buf.replace(closing.span(), format!("{fence_close})"));
            }
            None => {
                buf.replace(
                    expr.end..open.end,
                    format!(").map(({var_text}) => {fence_open})"),
                );
            }
        }

        self.process_children(element.syntax(), buf)?;
        wrap_for_parent(buf, element.span(), ctx);
        Ok(())
    }

    /// Rewrite `<$let var="x" value={E}>B</$let>` to `((x) => <>B</>)((E))`,
    /// fenced for its parent.
    ///
    /// The value expression moves after the body, so it is re-emitted as
    /// text. Control tags inside it are rewritten into a scratch buffer
    /// first; their positions are generated text in the final map, exactly
    /// like the rest of the re-emitted expression.
    pub(crate) fn rewrite_let(
        &self,
        element: &Element,
        ctx: ParentContext,
        buf: &mut EditBuffer<'_>,
    ) -> Result<()> {
        debug!("rewriting {}", element.opening_text());

        let attrs = AttrMap::collect(element);
        let var_text = attrs.require_literal("var")?;
        let value = attrs.require_container("value")?;
        attrs.forbid_extra(&["var", "value"])?;

        let opening = element
            .opening_tag()
            .ok_or_else(|| OrigamiError::internal("element without opening tag"))?;
        let open = opening.span();
        let expr = value
            .expression_span()
            .ok_or_else(|| OrigamiError::internal("container without braces"))?;
        let (fence_open, fence_close) = children_fence(element.has_body_content());

        let value_text = {
            let mut scratch = EditBuffer::new(buf.source());
            self.process_children(value.syntax(), &mut scratch)?;
            if scratch.has_edits() {
                scratch.render_range(expr.clone())?
            } else {
                buf.slice(expr.clone()).to_string()
            }
        };

        match element.closing_tag() {
            Some(closing) => {
                buf.replace(open, format!("(({var_text}) => {fence_open}"));
                buf.replace(
                    closing.span(),
                    format!("{fence_close})(({value_text}))"),
                );
            }
            None => {
                buf.replace(
                    open,
                    format!("(({var_text}) => {fence_open})(({value_text}))"),
                );
            }
        }

        self.process_body(element, buf)?;
        wrap_for_parent(buf, element.span(), ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_document;

    fn first_element(source: &str) -> Element {
        let (root, errors) = parse_document(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        root.descendants().find_map(Element::cast).expect("element")
    }

    #[test]
    fn resolves_reserved_names() {
        assert_eq!(ControlForm::of("$if"), Some(ControlForm::If));
        assert_eq!(ControlForm::of("$else-if"), Some(ControlForm::ElseIf));
        assert_eq!(ControlForm::of("$else"), Some(ControlForm::Else));
        assert_eq!(ControlForm::of("$for"), Some(ControlForm::For));
        assert_eq!(ControlForm::of("$let"), Some(ControlForm::Let));
        assert_eq!(ControlForm::of("$custom"), None);
        assert_eq!(ControlForm::of("div"), None);
    }

    #[test]
    fn attr_map_first_wins_on_duplicates() {
        let element = first_element(r#"<$for var="a" var="b" of={xs}/>"#);
        let attrs = AttrMap::collect(&element);
        assert_eq!(attrs.require_literal("var").expect("var"), "a");
    }

    #[test]
    fn missing_attribute_is_reported() {
        let element = first_element("<$for of={xs}/>");
        let attrs = AttrMap::collect(&element);
        let err = attrs.require_literal("var").expect_err("missing");
        assert!(matches!(err, OrigamiError::MissingAttribute { .. }));
        assert!(err.to_string().contains("<$for of={xs}/>"));
    }

    #[test]
    fn literal_where_container_expected() {
        let element = first_element(r#"<$if test="yes">x</$if>"#);
        let attrs = AttrMap::collect(&element);
        let err = attrs.require_container("test").expect_err("wrong kind");
        assert!(matches!(err, OrigamiError::WrongAttributeKind { .. }));
    }

    #[test]
    fn empty_container_is_wrong_kind() {
        let element = first_element("<$if test={}>x</$if>");
        let attrs = AttrMap::collect(&element);
        let err = attrs.require_container("test").expect_err("empty");
        assert!(matches!(err, OrigamiError::WrongAttributeKind { .. }));
    }

    #[test]
    fn extra_attribute_is_rejected() {
        let element = first_element(r#"<$let var="x" value={1} extra="y"/>"#);
        let attrs = AttrMap::collect(&element);
        let err = attrs.forbid_extra(&["var", "value"]).expect_err("extra");
        assert!(matches!(err, OrigamiError::UnexpectedAttribute { .. }));
    }

    #[test]
    fn spread_is_rejected() {
        let element = first_element("<$else {...rest}>x</$else>");
        let attrs = AttrMap::collect(&element);
        let err = attrs.forbid_extra(&[]).expect_err("spread");
        assert!(matches!(err, OrigamiError::UnexpectedAttribute { .. }));
    }
}
