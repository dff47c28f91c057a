//! The rewrite engine
//!
//! Scans a parsed document for the reserved control-flow tags and rewrites
//! them, in place, into equivalent plain-expression form: conditionals
//! become ternaries, iteration becomes `.map`, local bindings become
//! immediately-invoked lambdas. The output is byte-for-byte substitutable
//! for the input in the surrounding pipeline and carries a position map
//! back to the original source.
//!
//! One synchronous pass per document: a cheap textual pre-check, a parse,
//! one traversal accumulating typed edits, one materialization. A
//! validation failure aborts the document's transform before anything is
//! materialized, so partial edits are never visible as a successful
//! result.

mod chain;
mod guard;
mod tags;
mod wrap;

pub use tags::ControlForm;
pub use wrap::ParentContext;

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::config::{Config, DEFAULT_GUARD_CALLEE};
use crate::edit::{EditBuffer, PositionMap};
use crate::syntax::{
    AstNode, CallExpression, Element, SyntaxElement, SyntaxKind, SyntaxNode, parse_document,
};
use crate::{OrigamiError, Result};

/// Cheap pre-check: a document that cannot contain a reserved tag name is
/// returned unchanged without ever being parsed
static TRIGGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:if|else-if|else|for|let)\b").expect("trigger pattern"));

/// A rewritten document: the new text and its position map
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutput {
    pub text: String,
    pub map: PositionMap,
}

/// What the engine produced for one document
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteOutcome {
    /// No reserved tag present (or no edit accumulated): the input is
    /// already in plain-expression form
    Unchanged,
    /// The document was rewritten
    Rewritten(RewriteOutput),
}

impl RewriteOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, RewriteOutcome::Unchanged)
    }
}

/// The rewrite engine. Stateless between documents; cheap to share.
#[derive(Debug)]
pub struct Rewriter {
    guard_callee: String,
    #[cfg(test)]
    parses: std::sync::atomic::AtomicUsize,
}

impl Clone for Rewriter {
    fn clone(&self) -> Self {
        Self {
            guard_callee: self.guard_callee.clone(),
            #[cfg(test)]
            parses: std::sync::atomic::AtomicUsize::new(
                self.parses.load(std::sync::atomic::Ordering::Relaxed),
            ),
        }
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Rewriter {
    pub fn new() -> Self {
        Self {
            guard_callee: DEFAULT_GUARD_CALLEE.to_string(),
            #[cfg(test)]
            parses: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new().with_guard_callee(config.transform.guard_callee.clone())
    }

    /// Override the callee name of the existence-check calls to neutralize
    pub fn with_guard_callee(mut self, name: impl Into<String>) -> Self {
        self.guard_callee = name.into();
        self
    }

    /// Rewrite one document.
    ///
    /// Returns [`RewriteOutcome::Unchanged`] when no reserved tag occurs
    /// (fast path, the parser is never invoked) or when the traversal
    /// accumulated no edit.
    pub fn rewrite(&self, source: &str) -> Result<RewriteOutcome> {
        if !TRIGGER.is_match(source) {
            trace!("no trigger substring, skipping parse");
            return Ok(RewriteOutcome::Unchanged);
        }

        #[cfg(test)]
        self.parses
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let (root, parse_errors) = parse_document(source);
        if let Some(first) = parse_errors.into_iter().next() {
            return Err(OrigamiError::parse(first.message, first.span));
        }

        let mut buf = EditBuffer::new(source);
        self.process_children(&root, &mut buf)?;

        if !buf.has_edits() {
            return Ok(RewriteOutcome::Unchanged);
        }
        let (text, map) = buf.materialize()?;
        Ok(RewriteOutcome::Rewritten(RewriteOutput { text, map }))
    }

    /// Process the children of `parent`, dispatching reserved forms and
    /// descending into everything else
    pub(crate) fn process_children(
        &self,
        parent: &SyntaxNode,
        buf: &mut EditBuffer<'_>,
    ) -> Result<()> {
        let items: Vec<SyntaxElement> = parent.children_with_tokens().collect();
        self.process_items(&items, ParentContext::of(parent.kind()), buf)
    }

    /// Process an element's body only, leaving its opening tag alone
    pub(crate) fn process_body(&self, element: &Element, buf: &mut EditBuffer<'_>) -> Result<()> {
        let items: Vec<SyntaxElement> = element
            .syntax()
            .children_with_tokens()
            .filter(|item| {
                !matches!(
                    item.as_node().map(SyntaxNode::kind),
                    Some(SyntaxKind::OpeningTag)
                )
            })
            .collect();
        self.process_items(&items, ParentContext::Markup, buf)
    }

    fn process_items(
        &self,
        items: &[SyntaxElement],
        ctx: ParentContext,
        buf: &mut EditBuffer<'_>,
    ) -> Result<()> {
        let mut i = 0;
        while i < items.len() {
            let Some(node) = items[i].as_node() else {
                i += 1;
                continue;
            };
            match node.kind() {
                SyntaxKind::Element => {
                    let element = Element::cast(node.clone())
                        .ok_or_else(|| OrigamiError::internal("element cast failed"))?;
                    match element.tag_name().as_deref().and_then(ControlForm::of) {
                        Some(ControlForm::If) => {
                            let (members, next) = chain::collect_chain(items, i, element);
                            self.rewrite_chain(&members, ctx, buf)?;
                            i = next;
                            continue;
                        }
                        Some(form) if form.continues_chain() => {
                            return Err(OrigamiError::malformed_chain(
                                element.opening_text(),
                                element.span(),
                            ));
                        }
                        Some(ControlForm::For) => self.rewrite_for(&element, ctx, buf)?,
                        Some(ControlForm::Let) => self.rewrite_let(&element, ctx, buf)?,
                        _ => self.process_children(node, buf)?,
                    }
                }
                SyntaxKind::CallExpression => {
                    let call = CallExpression::cast(node.clone())
                        .ok_or_else(|| OrigamiError::internal("call cast failed"))?;
                    if !guard::neutralize(&call, &self.guard_callee, buf) {
                        // the arguments may still hold markup
                        self.process_children(node, buf)?;
                    }
                }
                SyntaxKind::ClosingTag => {}
                _ => self.process_children(node, buf)?,
            }
            i += 1;
        }
        Ok(())
    }
}
