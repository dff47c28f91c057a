//! Guard-call neutralization
//!
//! The upstream document compiler inserts one existence-check call per tag
//! name referenced anywhere in a document. The reserved tags no longer
//! exist after the rewrite, so their checks must be disabled. Purely
//! textual and position-based: the whole call range becomes an empty no-op
//! expression.

use tracing::debug;

use crate::edit::EditBuffer;
use crate::syntax::{AstNode, CallExpression};

use super::tags::ControlForm;

/// Replacement for a neutralized guard call
const NO_OP: &str = "{}";

/// Neutralize `call` when it is a guard check for a reserved tag name.
/// Returns true when an edit was registered; the caller must not descend
/// into the call afterwards.
pub(crate) fn neutralize(
    call: &CallExpression,
    guard_callee: &str,
    buf: &mut EditBuffer<'_>,
) -> bool {
    if call.callee_name().as_deref() != Some(guard_callee) {
        return false;
    }
    let Some(first_arg) = call.first_string_arg() else {
        return false;
    };
    if !ControlForm::RESERVED_NAMES.contains(&first_arg.as_str()) {
        return false;
    }

    let span = call.span();
    debug!("neutralizing {}", buf.slice(span.clone()));
    buf.replace(span, NO_OP);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_document;

    fn first_call(source: &str) -> CallExpression {
        let (root, _) = parse_document(source);
        root.descendants()
            .find_map(CallExpression::cast)
            .expect("call")
    }

    fn neutralized(source: &str) -> Option<String> {
        let call = first_call(source);
        let mut buf = EditBuffer::new(source);
        neutralize(&call, "_missingMdxReference", &mut buf)
            .then(|| buf.materialize().expect("materialize").0)
    }

    #[test]
    fn reserved_guard_is_replaced() {
        let out = neutralized("_missingMdxReference(\"$if\", false);").expect("neutralized");
        assert_eq!(out, "{};");
    }

    #[test]
    fn extra_arguments_are_irrelevant() {
        let out =
            neutralized("_missingMdxReference(\"$for\", true, \"3:1-3:9\");").expect("neutralized");
        assert_eq!(out, "{};");
    }

    #[test]
    fn other_components_are_untouched() {
        assert!(neutralized("_missingMdxReference(\"Chart\", true);").is_none());
    }

    #[test]
    fn other_callees_are_untouched() {
        assert!(neutralized("somethingElse(\"$if\", true);").is_none());
    }

    #[test]
    fn non_literal_first_argument_is_untouched() {
        assert!(neutralized("_missingMdxReference(name, true);").is_none());
    }
}
