//! Scanning helpers shared by the front-ends

use pest::Parser;
use pest_derive::Parser;

/// Append literal template text, escaping anything Jinja would treat as
/// the start of a tag
///
/// A `{` is emitted as `{{ "{" }}` when it is followed by `{`, `%` or `#`,
/// and when it ends the literal (generated code may follow it directly).
pub(crate) fn push_literal(out: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' && matches!(chars.peek(), Some('{' | '%' | '#') | None) {
            out.push_str("{{ \"{\" }}");
        } else {
            out.push(c);
        }
    }
}

#[derive(Parser)]
#[grammar = "delimiters.pest"]
pub(crate) struct DelimiterParser;

/// Byte index of the `}` matching the `{` at `open`
///
/// Braces inside single- or double-quoted strings are ignored.
pub(crate) fn find_closing_brace(s: &str, open: usize) -> Option<usize> {
    find_closing(Rule::braces, s, open)
}

/// Byte index of the `)` matching the `(` at `open`
pub(crate) fn find_closing_paren(s: &str, open: usize) -> Option<usize> {
    find_closing(Rule::parens, s, open)
}

fn find_closing(rule: Rule, s: &str, open: usize) -> Option<usize> {
    let group = DelimiterParser::parse(rule, s.get(open..)?).ok()?.next()?;
    Some(open + group.as_span().end() - 1)
}

/// One `\n` for every line break in `s`
pub(crate) fn line_breaks(s: &str) -> String {
    "\n".repeat(s.matches('\n').count())
}
