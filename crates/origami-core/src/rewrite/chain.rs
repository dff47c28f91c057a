//! Conditional-chain linking
//!
//! A chain is a maximal run of sibling elements `$if`, zero or more
//! `$else-if`, an optional trailing `$else`, at one nesting depth. It resolves to a single right-associated nested
//! ternary. Members are accumulated forward while the sibling list is
//! walked; the accumulator finalizes at the first sibling that is not a
//! chain member, so no backward re-scan is ever needed. Whitespace-only
//! markup text between members is transparent; anything else ends the
//! chain.

use tracing::debug;

use crate::edit::EditBuffer;
use crate::syntax::{AstNode, Element, SyntaxElement, SyntaxKind};
use crate::{OrigamiError, Result};

use super::Rewriter;
use super::tags::{AttrMap, ControlForm};
use super::wrap::{ParentContext, children_fence, wrap_for_parent};

/// One element of a conditional chain
pub(crate) struct ChainMember {
    pub element: Element,
    pub form: ControlForm,
}

/// Sibling items that do not interrupt a chain
pub(crate) fn is_transparent(item: &SyntaxElement) -> bool {
    match item {
        rowan::NodeOrToken::Token(token) => {
            token.kind().is_trivia()
                || (token.kind() == SyntaxKind::MarkupText && token.text().trim().is_empty())
        }
        rowan::NodeOrToken::Node(_) => false,
    }
}

/// Accumulate the chain led by the `$if` at `items[lead]`.
///
/// Returns the members and the index just past the last member. The caller
/// resumes iteration there; intervening transparent siblings need no
/// further processing.
pub(crate) fn collect_chain(
    items: &[SyntaxElement],
    lead: usize,
    lead_element: Element,
) -> (Vec<ChainMember>, usize) {
    let mut members = vec![ChainMember {
        element: lead_element,
        form: ControlForm::If,
    }];
    let mut end = lead + 1;

    let mut j = lead + 1;
    while j < items.len() {
        if is_transparent(&items[j]) {
            j += 1;
            continue;
        }
        let Some(element) = items[j].as_node().cloned().and_then(Element::cast) else {
            break;
        };
        let form = element.tag_name().as_deref().and_then(ControlForm::of);
        match form {
            Some(form @ ControlForm::ElseIf) => {
                members.push(ChainMember { element, form });
                end = j + 1;
                j += 1;
            }
            Some(form @ ControlForm::Else) => {
                members.push(ChainMember { element, form });
                end = j + 1;
                break;
            }
            _ => break,
        }
    }

    (members, end)
}

impl Rewriter {
    /// Resolve one chain into a nested ternary and fence the combined span
    /// for the parent.
    ///
    /// Per member: the opening tag up to the test expression becomes `(`,
    /// the rest of the opening tag `) ? ` plus the body fence; a plain
    /// `$else` loses its opening tag entirely. A member followed by another
    /// chain member leaves the ternary open with ` : `; the terminal member
    /// closes it, with ` : null` when it still carries a test.
    pub(crate) fn rewrite_chain(
        &self,
        members: &[ChainMember],
        ctx: ParentContext,
        buf: &mut EditBuffer<'_>,
    ) -> Result<()> {
        for (index, member) in members.iter().enumerate() {
            debug!("rewriting {}", member.element.opening_text());

            let element = &member.element;
            let opening = element
                .opening_tag()
                .ok_or_else(|| OrigamiError::internal("element without opening tag"))?;
            let open = opening.span();
            let (fence_open, fence_close) = children_fence(element.has_body_content());

            let is_terminal = index + 1 == members.len();
            let tail = if !is_terminal {
                " : "
            } else if member.form.has_test() {
                " : null"
            } else {
                ""
            };

            let attrs = AttrMap::collect(element);
            match member.form {
                ControlForm::If | ControlForm::ElseIf => {
                    let test = attrs.require_container("test")?;
                    attrs.forbid_extra(&["test"])?;
                    let expr = test
                        .expression_span()
                        .ok_or_else(|| OrigamiError::internal("container without braces"))?;

                    buf.replace(open.start..expr.start, "(");
                    match element.closing_tag() {
                        Some(closing) => {
                            buf.replace(expr.end..open.end, format!(") ? {fence_open}"));
                            buf.replace(closing.span(), format!("{fence_close}{tail}"));
                        }
                        None => {
                            buf.replace(expr.end..open.end, format!(") ? {fence_open}{tail}"));
                        }
                    }
                }
                ControlForm::Else => {
                    attrs.forbid_extra(&[])?;
                    match element.closing_tag() {
                        Some(closing) => {
                            buf.replace(open, fence_open);
                            buf.replace(closing.span(), format!("{fence_close}{tail}"));
                        }
                        None => {
                            buf.replace(open, format!("{fence_open}{tail}"));
                        }
                    }
                }
                _ => {
                    return Err(OrigamiError::internal("non-conditional form in chain"));
                }
            }

            self.process_children(element.syntax(), buf)?;
        }

        let combined = members[0].element.span().start
            ..members[members.len() - 1].element.span().end;
        wrap_for_parent(buf, combined, ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_document;

    fn children_of_fragment(source: &str) -> Vec<SyntaxElement> {
        let (root, errors) = parse_document(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        let fragment = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::Fragment)
            .expect("fragment");
        fragment.children_with_tokens().collect()
    }

    fn element_index(items: &[SyntaxElement], name: &str) -> usize {
        items
            .iter()
            .position(|item| {
                item.as_node()
                    .cloned()
                    .and_then(Element::cast)
                    .and_then(|e| e.tag_name())
                    .as_deref()
                    == Some(name)
            })
            .expect("element present")
    }

    fn element_at(items: &[SyntaxElement], index: usize) -> Element {
        items[index]
            .as_node()
            .cloned()
            .and_then(Element::cast)
            .expect("element at index")
    }

    #[test]
    fn lone_if_is_a_one_member_chain() {
        let items = children_of_fragment("<><$if test={a}>x</$if><p>y</p></>");
        let lead = element_index(&items, "$if");
        let (members, end) = collect_chain(&items, lead, element_at(&items, lead));
        assert_eq!(members.len(), 1);
        assert_eq!(end, lead + 1);
    }

    #[test]
    fn full_chain_is_collected_across_whitespace() {
        let items = children_of_fragment(
            "<>\n<$if test={a}>x</$if>\n<$else-if test={b}>y</$else-if>\n<$else>z</$else>\n</>",
        );
        let lead = element_index(&items, "$if");
        let (members, end) = collect_chain(&items, lead, element_at(&items, lead));
        assert_eq!(members.len(), 3);
        assert_eq!(
            members.iter().map(|m| m.form).collect::<Vec<_>>(),
            vec![ControlForm::If, ControlForm::ElseIf, ControlForm::Else]
        );
        assert_eq!(end, element_index(&items, "$else") + 1);
    }

    #[test]
    fn non_member_sibling_ends_the_chain() {
        let items =
            children_of_fragment("<><$if test={a}>x</$if><p>gap</p><$else>z</$else></>");
        let lead = element_index(&items, "$if");
        let (members, _) = collect_chain(&items, lead, element_at(&items, lead));
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn visible_text_ends_the_chain() {
        let items = children_of_fragment("<><$if test={a}>x</$if> gap <$else>z</$else></>");
        let lead = element_index(&items, "$if");
        let (members, _) = collect_chain(&items, lead, element_at(&items, lead));
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn chain_stops_after_else() {
        let items = children_of_fragment(
            "<><$if test={a}>x</$if><$else>y</$else><$else>z</$else></>",
        );
        let lead = element_index(&items, "$if");
        let (members, end) = collect_chain(&items, lead, element_at(&items, lead));
        assert_eq!(members.len(), 2);
        // the second $else is left for the caller, which reports it as a
        // malformed chain
        assert_eq!(end, element_index(&items, "$else") + 1);
    }

    #[test]
    fn second_if_starts_a_new_chain() {
        let items =
            children_of_fragment("<><$if test={a}>x</$if><$if test={b}>y</$if></>");
        let lead = element_index(&items, "$if");
        let (members, end) = collect_chain(&items, lead, element_at(&items, lead));
        assert_eq!(members.len(), 1);
        assert_eq!(end, lead + 1);
    }
}
