//! Char-level scanners for the markup-in-expression grammar
//!
//! The parser drives these directly: the grammar is modal (expression soup,
//! tag interior, markup content), so the mode decisions live in the parser
//! and this module only knows how to take one token's worth of characters.
//! Every scanner returns the end offset of the token; the parser guarantees
//! that every byte of the input ends up inside exactly one token, which is
//! what makes the tree lossless.

use std::ops::Range;

/// Byte span in the original source
pub type Span = Range<usize>;

/// A lexer error (unterminated string, comment, template, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Decode the char at byte offset `i`, with its UTF-8 width
pub(crate) fn next_char(input: &str, i: usize) -> Option<(char, usize)> {
    input[i..].chars().next().map(|c| (c, c.len_utf8()))
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Tag names additionally admit `-`, `.` and `:` (`$else-if`, `Foo.Bar`,
/// `svg:path`)
pub(crate) fn is_tag_name_continue(c: char) -> bool {
    is_ident_continue(c) || c == '-' || c == '.' || c == ':'
}

/// Attribute names admit `-` and `:` (`data-id`, `xml:lang`)
pub(crate) fn is_attr_name_continue(c: char) -> bool {
    is_ident_continue(c) || c == '-' || c == ':'
}

/// Consume a run of non-newline whitespace starting at `start`
pub(crate) fn scan_whitespace(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if c.is_whitespace() && c != '\n' && c != '\r' {
            end += size;
        } else {
            break;
        }
    }
    end
}

/// Consume one newline (`\n`, `\r` or `\r\n`) starting at `start`
pub(crate) fn scan_newline(input: &str, start: usize) -> usize {
    match next_char(input, start) {
        Some(('\r', size)) => match next_char(input, start + size) {
            Some(('\n', nl)) => start + size + nl,
            _ => start + size,
        },
        Some(('\n', size)) => start + size,
        _ => start,
    }
}

/// Consume `//` to end of line (exclusive of the newline)
pub(crate) fn scan_line_comment(input: &str, start: usize) -> usize {
    let mut end = start + 2;
    while let Some((c, size)) = next_char(input, end) {
        if c == '\n' || c == '\r' {
            break;
        }
        end += size;
    }
    end
}

/// Consume `/*` ... `*/`
pub(crate) fn scan_block_comment(input: &str, start: usize) -> (usize, Option<LexError>) {
    let mut end = start + 2;
    while let Some((c, size)) = next_char(input, end) {
        if c == '*' && matches!(next_char(input, end + size), Some(('/', _))) {
            return (end + size + 1, None);
        }
        end += size;
    }
    (
        end,
        Some(LexError::new("unterminated block comment", start..end)),
    )
}

/// Consume a single- or double-quoted string starting at the quote
pub(crate) fn scan_string(input: &str, start: usize) -> (usize, Option<LexError>) {
    let (quote, qsize) = match next_char(input, start) {
        Some(pair) => pair,
        None => return (start, None),
    };
    let mut end = start + qsize;
    while let Some((c, size)) = next_char(input, end) {
        match c {
            '\\' => {
                end += size;
                if let Some((_, esc)) = next_char(input, end) {
                    end += esc;
                }
            }
            '\n' | '\r' => break,
            c if c == quote => return (end + size, None),
            _ => end += size,
        }
    }
    (
        end,
        Some(LexError::new("unterminated string literal", start..end)),
    )
}

/// Consume a template literal starting at the backtick, including `${...}`
/// substitutions. Substitutions are scanned opaquely but brace-balanced,
/// with strings, comments and nested templates honored so a `}` inside one
/// of those does not close the substitution.
pub(crate) fn scan_template(input: &str, start: usize) -> (usize, Option<LexError>) {
    let mut end = start + 1;
    while let Some((c, size)) = next_char(input, end) {
        match c {
            '\\' => {
                end += size;
                if let Some((_, esc)) = next_char(input, end) {
                    end += esc;
                }
            }
            '`' => return (end + size, None),
            '$' if matches!(next_char(input, end + size), Some(('{', _))) => {
                let (sub_end, err) = scan_template_substitution(input, end + size);
                if err.is_some() {
                    return (sub_end, err);
                }
                end = sub_end;
            }
            _ => end += size,
        }
    }
    (
        end,
        Some(LexError::new("unterminated template literal", start..end)),
    )
}

/// Scan a `{ ... }` substitution body, `start` pointing at the `{`
fn scan_template_substitution(input: &str, start: usize) -> (usize, Option<LexError>) {
    let mut depth = 0usize;
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        match c {
            '{' => {
                depth += 1;
                end += size;
            }
            '}' => {
                depth -= 1;
                end += size;
                if depth == 0 {
                    return (end, None);
                }
            }
            '\'' | '"' => {
                let (s_end, err) = scan_string(input, end);
                if err.is_some() {
                    return (s_end, err);
                }
                end = s_end;
            }
            '`' => {
                let (t_end, err) = scan_template(input, end);
                if err.is_some() {
                    return (t_end, err);
                }
                end = t_end;
            }
            '/' if matches!(next_char(input, end + size), Some(('/', _))) => {
                end = scan_line_comment(input, end);
            }
            '/' if matches!(next_char(input, end + size), Some(('*', _))) => {
                let (c_end, err) = scan_block_comment(input, end);
                if err.is_some() {
                    return (c_end, err);
                }
                end = c_end;
            }
            _ => end += size,
        }
    }
    (
        end,
        Some(LexError::new(
            "unterminated template substitution",
            start..end,
        )),
    )
}

/// Consume a numeric literal. Deliberately loose: the engine never needs the
/// value, only the extent.
pub(crate) fn scan_number(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        let is_exp_sign = (c == '+' || c == '-')
            && matches!(input[..end].chars().next_back(), Some('e') | Some('E'));
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' || is_exp_sign {
            end += size;
        } else {
            break;
        }
    }
    end
}

/// Consume an expression identifier
pub(crate) fn scan_ident(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if (end == start && is_ident_start(c)) || (end > start && is_ident_continue(c)) {
            end += size;
        } else {
            break;
        }
    }
    end
}

/// Consume a tag name (`div`, `$else-if`, `Foo.Bar`)
pub(crate) fn scan_tag_name(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if (end == start && is_ident_start(c)) || (end > start && is_tag_name_continue(c)) {
            end += size;
        } else {
            break;
        }
    }
    end
}

/// Consume an attribute name
pub(crate) fn scan_attr_name(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if (end == start && is_ident_start(c)) || (end > start && is_attr_name_continue(c)) {
            end += size;
        } else {
            break;
        }
    }
    end
}

/// Consume a regex literal starting at the `/`. The caller has already
/// decided (from the previous significant token) that this position cannot
/// be a division.
pub(crate) fn scan_regex(input: &str, start: usize) -> (usize, Option<LexError>) {
    let mut end = start + 1;
    let mut in_class = false;
    loop {
        match next_char(input, end) {
            Some(('\\', size)) => {
                end += size;
                if let Some((_, esc)) = next_char(input, end) {
                    end += esc;
                }
            }
            Some(('[', size)) => {
                in_class = true;
                end += size;
            }
            Some((']', size)) => {
                in_class = false;
                end += size;
            }
            Some(('/', size)) if !in_class => {
                end += size;
                // flags
                while let Some((c, fsize)) = next_char(input, end) {
                    if c.is_ascii_alphabetic() {
                        end += fsize;
                    } else {
                        break;
                    }
                }
                return (end, None);
            }
            Some(('\n', _)) | Some(('\r', _)) | None => {
                return (
                    end,
                    Some(LexError::new("unterminated regex literal", start..end)),
                );
            }
            Some((_, size)) => end += size,
        }
    }
}

/// Multi-char operators, longest first; single chars fall through
const OPERATORS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "<<=", ">>=", ">>>", "...", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "<<", ">>", "**",
];

/// Consume one operator token (greedy longest match)
pub(crate) fn scan_operator(input: &str, start: usize) -> usize {
    let rest = &input[start..];
    for op in OPERATORS {
        if rest.starts_with(op) {
            return start + op.len();
        }
    }
    match next_char(input, start) {
        Some((_, size)) => start + size,
        None => start,
    }
}

/// Consume markup text: raw content up to the next `<`, `{` or end of input
pub(crate) fn scan_markup_text(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if c == '<' || c == '{' {
            break;
        }
        end += size;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_strings_with_escapes() {
        let src = r#""a\"b" rest"#;
        let (end, err) = scan_string(src, 0);
        assert!(err.is_none());
        assert_eq!(&src[..end], r#""a\"b""#);
    }

    #[test]
    fn unterminated_string_reports_error() {
        let src = "\"abc\nrest";
        let (end, err) = scan_string(src, 0);
        assert!(err.is_some());
        assert_eq!(end, 4);
    }

    #[test]
    fn template_substitution_is_brace_balanced() {
        let src = "`a${ {b: \"}\"} }c` tail";
        let (end, err) = scan_template(src, 0);
        assert!(err.is_none());
        assert_eq!(&src[..end], "`a${ {b: \"}\"} }c`");
    }

    #[test]
    fn regex_honors_char_class() {
        let src = "/[/]+/g next";
        let (end, err) = scan_regex(src, 0);
        assert!(err.is_none());
        assert_eq!(&src[..end], "/[/]+/g");
    }

    #[test]
    fn tag_names_allow_dashes() {
        let src = "$else-if test";
        assert_eq!(&src[..scan_tag_name(src, 0)], "$else-if");
    }

    #[test]
    fn operators_merge_greedily() {
        assert_eq!(scan_operator("=> x", 0), 2);
        assert_eq!(scan_operator("===b", 0), 3);
        assert_eq!(scan_operator(", x", 0), 1);
    }

    #[test]
    fn markup_text_stops_at_structure() {
        let src = "hello world<div>";
        assert_eq!(&src[..scan_markup_text(src, 0)], "hello world");
        let src2 = "a {b}";
        assert_eq!(&src2[..scan_markup_text(src2, 0)], "a ");
    }
}
