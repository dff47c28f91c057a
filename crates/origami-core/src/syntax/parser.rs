//! Modal parser for markup-in-expression documents
//!
//! Builds a lossless Rowan green tree from raw text. The grammar has three
//! modes and the parser switches between them as it descends:
//!
//! - **expression soup**: ordinary expression text. Tracked only as far as
//!   the engine needs: bracket balance, string/template/regex/comment
//!   extents, plain `ident(...)` call expressions, and the positions where
//!   a `<` opens an element rather than a comparison.
//! - **tag interior**: opening/closing tags, attributes with string or
//!   brace-container values, spread containers.
//! - **markup content**: raw text runs, nested elements and fragments,
//!   embedded expression containers.
//!
//! Everything else in the host language is deliberately opaque. The tree is
//! lossless: `root.text() == source` for every input, which is what lets
//! the rewrite engine splice by byte range.

use rowan::{GreenNodeBuilder, Language};

use super::lexer::{self, Span};
use super::{MarkupLanguage, SyntaxKind, SyntaxNode};

/// A parse error with the byte span of the offending region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse a document into a lossless syntax tree
///
/// Always returns a tree covering every byte of the input; structural
/// problems (unclosed elements, mismatched closing tags, unterminated
/// literals) are reported in the error list.
pub fn parse_document(source: &str) -> (SyntaxNode, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    parser.builder.start_node(raw(SyntaxKind::Document));
    parser.parse_expr_run(None);
    parser.builder.finish_node();
    let green = parser.builder.finish();
    (SyntaxNode::new_root(green), parser.errors)
}

fn raw(kind: SyntaxKind) -> rowan::SyntaxKind {
    MarkupLanguage::kind_to_raw(kind)
}

/// Identifiers that can never be callees and never end a value expression
const KEYWORDS: &[&str] = &[
    "await", "case", "catch", "const", "default", "delete", "do", "else", "export", "extends",
    "finally", "for", "function", "if", "import", "in", "instanceof", "let", "new", "of", "return",
    "switch", "throw", "try", "typeof", "var", "void", "while", "yield",
];

/// What the previous significant token means for `<` and `/` disambiguation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    /// Could end a value: identifier, literal, `)`, `]`
    Value,
    /// Operator, keyword, opening bracket, start of input
    NonValue,
    /// A `.`: the next identifier is a member name, never a plain callee
    Dot,
}

struct Parser<'s> {
    src: &'s str,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn current(&self) -> Option<char> {
        lexer::next_char(self.src, self.pos).map(|(c, _)| c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        lexer::next_char(self.src, offset).map(|(c, _)| c)
    }

    /// Emit a token from `pos` to `end` and advance
    fn token(&mut self, kind: SyntaxKind, end: usize) {
        debug_assert!(end > self.pos, "empty token {kind:?} at {}", self.pos);
        self.builder.token(raw(kind), &self.src[self.pos..end]);
        self.pos = end;
    }

    /// Emit a token spanning exactly `n` bytes
    fn token_len(&mut self, kind: SyntaxKind, n: usize) {
        self.token(kind, self.pos + n);
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(ParseError::new(message, span));
    }

    /// Consume one piece of trivia if present; returns false when the
    /// current position is significant
    fn bump_trivia(&mut self) -> bool {
        match self.current() {
            Some(c) if c == '\n' || c == '\r' => {
                let end = lexer::scan_newline(self.src, self.pos);
                self.token(SyntaxKind::Newline, end);
                true
            }
            Some(c) if c.is_whitespace() => {
                let end = lexer::scan_whitespace(self.src, self.pos);
                self.token(SyntaxKind::Whitespace, end);
                true
            }
            Some('/') if self.peek_at(self.pos + 1) == Some('/') => {
                let end = lexer::scan_line_comment(self.src, self.pos);
                self.token(SyntaxKind::CommentLine, end);
                true
            }
            Some('/') if self.peek_at(self.pos + 1) == Some('*') => {
                let (end, err) = lexer::scan_block_comment(self.src, self.pos);
                if let Some(err) = err {
                    self.error(err.message, err.span);
                }
                self.token(SyntaxKind::CommentBlock, end);
                true
            }
            _ => false,
        }
    }

    fn skip_trivia(&mut self) {
        while self.bump_trivia() {}
    }

    /// First significant char at or after `from`, without consuming
    fn peek_significant(&self, mut from: usize) -> Option<(char, usize)> {
        loop {
            let (c, size) = lexer::next_char(self.src, from)?;
            if c.is_whitespace() {
                from += size;
                continue;
            }
            if c == '/' {
                match self.peek_at(from + 1) {
                    Some('/') => {
                        from = lexer::scan_line_comment(self.src, from);
                        continue;
                    }
                    Some('*') => {
                        let (end, _) = lexer::scan_block_comment(self.src, from);
                        from = end;
                        continue;
                    }
                    _ => {}
                }
            }
            return Some((c, from));
        }
    }

    /// Does a `<` at the current position open an element or fragment?
    fn at_element_start(&self, prev: Prev) -> bool {
        if prev == Prev::Value {
            return false;
        }
        match self.peek_at(self.pos + 1) {
            Some('>') => true,
            Some(c) => lexer::is_ident_start(c),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Expression soup
    // ------------------------------------------------------------------

    /// Parse expression text until `closer` (not consumed) or end of input
    fn parse_expr_run(&mut self, closer: Option<char>) {
        let mut prev = Prev::NonValue;

        loop {
            if self.bump_trivia() {
                continue;
            }
            let (c, size) = match lexer::next_char(self.src, self.pos) {
                Some(pair) => pair,
                None => {
                    if closer.is_some() {
                        self.error("unexpected end of input", self.pos..self.pos);
                    }
                    return;
                }
            };
            if Some(c) == closer {
                return;
            }

            match c {
                '"' | '\'' => {
                    let (end, err) = lexer::scan_string(self.src, self.pos);
                    if let Some(err) = err {
                        self.error(err.message, err.span);
                    }
                    self.token(SyntaxKind::StringLit, end);
                    prev = Prev::Value;
                }
                '`' => {
                    let (end, err) = lexer::scan_template(self.src, self.pos);
                    if let Some(err) = err {
                        self.error(err.message, err.span);
                    }
                    self.token(SyntaxKind::TemplateLit, end);
                    prev = Prev::Value;
                }
                '0'..='9' => {
                    let end = lexer::scan_number(self.src, self.pos);
                    self.token(SyntaxKind::NumberLit, end);
                    prev = Prev::Value;
                }
                '/' => {
                    // bump_trivia already took comments; this is division
                    // or a regex literal depending on what came before
                    if prev == Prev::Value {
                        let end = lexer::scan_operator(self.src, self.pos);
                        self.token(SyntaxKind::Operator, end);
                        prev = Prev::NonValue;
                    } else {
                        let (end, err) = lexer::scan_regex(self.src, self.pos);
                        if let Some(err) = err {
                            self.error(err.message, err.span);
                        }
                        self.token(SyntaxKind::RegexLit, end);
                        prev = Prev::Value;
                    }
                }
                '(' => {
                    self.token_len(SyntaxKind::LParen, 1);
                    self.parse_expr_run(Some(')'));
                    if self.current() == Some(')') {
                        self.token_len(SyntaxKind::RParen, 1);
                    }
                    prev = Prev::Value;
                }
                '[' => {
                    self.token_len(SyntaxKind::LBracket, 1);
                    self.parse_expr_run(Some(']'));
                    if self.current() == Some(']') {
                        self.token_len(SyntaxKind::RBracket, 1);
                    }
                    prev = Prev::Value;
                }
                '{' => {
                    self.token_len(SyntaxKind::LBrace, 1);
                    self.parse_expr_run(Some('}'));
                    if self.current() == Some('}') {
                        self.token_len(SyntaxKind::RBrace, 1);
                    }
                    // a closing brace usually ends a block in the
                    // documents we see; treat `<` after it as a tag start
                    prev = Prev::NonValue;
                }
                ')' | ']' | '}' => {
                    // unbalanced closer for this nesting level
                    self.error(format!("stray `{c}`"), self.pos..self.pos + size);
                    self.token_len(SyntaxKind::Error, size);
                    prev = Prev::NonValue;
                }
                '<' if self.at_element_start(prev) => {
                    self.parse_element_or_fragment();
                    prev = Prev::NonValue;
                }
                '.' => {
                    self.token_len(SyntaxKind::Dot, 1);
                    prev = Prev::Dot;
                }
                c if lexer::is_ident_start(c) => {
                    let end = lexer::scan_ident(self.src, self.pos);
                    let text = &self.src[self.pos..end];
                    let keyword = KEYWORDS.contains(&text);
                    let callable = !keyword && prev != Prev::Dot;
                    if callable && matches!(self.peek_significant(end), Some(('(', _))) {
                        self.parse_call(end);
                        prev = Prev::Value;
                    } else {
                        self.token(SyntaxKind::Ident, end);
                        prev = if keyword { Prev::NonValue } else { Prev::Value };
                    }
                }
                _ => {
                    let end = lexer::scan_operator(self.src, self.pos);
                    self.token(SyntaxKind::Operator, end);
                    prev = Prev::NonValue;
                }
            }
        }
    }

    /// Parse `ident ( ... )` as a call expression; `ident_end` is the end
    /// of the already-scanned callee identifier
    fn parse_call(&mut self, ident_end: usize) {
        self.builder.start_node(raw(SyntaxKind::CallExpression));
        self.token(SyntaxKind::Ident, ident_end);
        self.skip_trivia();
        // peek_significant guaranteed a `(` here
        self.token_len(SyntaxKind::LParen, 1);
        self.parse_expr_run(Some(')'));
        if self.current() == Some(')') {
            self.token_len(SyntaxKind::RParen, 1);
        } else {
            self.error("unclosed call expression", self.pos..self.pos);
        }
        self.builder.finish_node();
    }

    // ------------------------------------------------------------------
    // Tags and markup content
    // ------------------------------------------------------------------

    /// Parse an element or fragment; the current char is the `<`
    fn parse_element_or_fragment(&mut self) {
        if self.peek_at(self.pos + 1) == Some('>') {
            self.parse_fragment();
        } else {
            self.parse_element();
        }
    }

    fn parse_fragment(&mut self) {
        self.builder.start_node(raw(SyntaxKind::Fragment));
        self.token_len(SyntaxKind::LAngle, 1);
        self.token_len(SyntaxKind::RAngle, 1);
        self.parse_markup_children();
        self.parse_closing_tag(None);
        self.builder.finish_node();
    }

    fn parse_element(&mut self) {
        let open_start = self.pos;
        self.builder.start_node(raw(SyntaxKind::Element));
        self.builder.start_node(raw(SyntaxKind::OpeningTag));
        self.token_len(SyntaxKind::LAngle, 1);

        let name_end = lexer::scan_tag_name(self.src, self.pos);
        let name = self.src[self.pos..name_end].to_string();
        self.token(SyntaxKind::TagName, name_end);

        self.parse_attributes();

        match self.current() {
            Some('/') if self.peek_at(self.pos + 1) == Some('>') => {
                self.token_len(SyntaxKind::Slash, 1);
                self.token_len(SyntaxKind::RAngle, 1);
                self.builder.finish_node(); // OpeningTag
                self.builder.finish_node(); // Element
            }
            Some('>') => {
                self.token_len(SyntaxKind::RAngle, 1);
                self.builder.finish_node(); // OpeningTag
                self.parse_markup_children();
                self.parse_closing_tag(Some(&name));
                self.builder.finish_node(); // Element
            }
            _ => {
                self.error(format!("unclosed opening tag `<{name}`"), open_start..self.pos);
                self.builder.finish_node(); // OpeningTag
                self.builder.finish_node(); // Element
            }
        }
    }

    /// Parse attributes until `/`, `>` or end of input
    fn parse_attributes(&mut self) {
        loop {
            self.skip_trivia();
            match self.current() {
                None | Some('/') | Some('>') => return,
                Some('{') => self.parse_expression_container(),
                Some(c) if lexer::is_ident_start(c) => self.parse_attribute(),
                Some(c) => {
                    let span = self.pos..self.pos + c.len_utf8();
                    self.error(format!("unexpected `{c}` in tag"), span);
                    self.token_len(SyntaxKind::Error, c.len_utf8());
                }
            }
        }
    }

    fn parse_attribute(&mut self) {
        self.builder.start_node(raw(SyntaxKind::Attribute));
        let end = lexer::scan_attr_name(self.src, self.pos);
        let name_span = self.pos..end;
        self.token(SyntaxKind::AttrName, end);
        self.skip_trivia();
        if self.current() == Some('=') {
            self.token_len(SyntaxKind::Eq, 1);
            self.skip_trivia();
            match self.current() {
                Some('"') | Some('\'') => {
                    let (end, err) = lexer::scan_string(self.src, self.pos);
                    if let Some(err) = err {
                        self.error(err.message, err.span);
                    }
                    self.token(SyntaxKind::StringLit, end);
                }
                Some('{') => self.parse_expression_container(),
                _ => self.error("expected attribute value after `=`", name_span),
            }
        }
        self.builder.finish_node();
    }

    fn parse_expression_container(&mut self) {
        self.builder.start_node(raw(SyntaxKind::ExpressionContainer));
        let start = self.pos;
        self.token_len(SyntaxKind::LBrace, 1);
        self.parse_expr_run(Some('}'));
        if self.current() == Some('}') {
            self.token_len(SyntaxKind::RBrace, 1);
        } else {
            self.error("unterminated expression container", start..self.pos);
        }
        self.builder.finish_node();
    }

    /// Parse markup content until a closing tag or end of input
    fn parse_markup_children(&mut self) {
        loop {
            match self.current() {
                None => {
                    self.error("unclosed element", self.pos..self.pos);
                    return;
                }
                Some('<') => match self.peek_at(self.pos + 1) {
                    Some('/') => return,
                    Some('>') => self.parse_fragment(),
                    Some(c) if lexer::is_ident_start(c) => self.parse_element(),
                    _ => {
                        self.error("stray `<` in markup content", self.pos..self.pos + 1);
                        self.token_len(SyntaxKind::Error, 1);
                    }
                },
                Some('{') => self.parse_expression_container(),
                Some(_) => {
                    let end = lexer::scan_markup_text(self.src, self.pos);
                    self.token(SyntaxKind::MarkupText, end);
                }
            }
        }
    }

    /// Parse `</name>` (or `</>` when `expected` is None, i.e. a fragment)
    fn parse_closing_tag(&mut self, expected: Option<&str>) {
        if self.current() != Some('<') || self.peek_at(self.pos + 1) != Some('/') {
            // children loop already reported the unclosed element
            return;
        }
        self.builder.start_node(raw(SyntaxKind::ClosingTag));
        self.token_len(SyntaxKind::LAngle, 1);
        self.token_len(SyntaxKind::Slash, 1);

        let name_start = self.pos;
        let name_end = lexer::scan_tag_name(self.src, self.pos);
        if name_end > name_start {
            let name = &self.src[name_start..name_end];
            match expected {
                Some(open) if open != name => {
                    self.error(
                        format!("mismatched closing tag: expected `</{open}>`, found `</{name}>`"),
                        name_start..name_end,
                    );
                }
                None => {
                    self.error(
                        format!("fragment closed by `</{name}>`"),
                        name_start..name_end,
                    );
                }
                _ => {}
            }
            self.token(SyntaxKind::TagName, name_end);
        } else if let Some(open) = expected {
            self.error(
                format!("expected `</{open}>`"),
                name_start..name_start,
            );
        }

        self.skip_trivia();
        if self.current() == Some('>') {
            self.token_len(SyntaxKind::RAngle, 1);
        } else {
            self.error("malformed closing tag", name_start..self.pos);
        }
        self.builder.finish_node();
    }
}
