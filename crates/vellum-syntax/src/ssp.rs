//! SSP front-end
//!
//! Markup is copied through; `${expr}` and `<%= expr %>` print, `<% stmt %>`
//! runs a statement, `<%-- --%>` is a comment and `<%@ %>` directives are
//! dropped.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::SyntaxError;
use crate::text::{line_breaks, push_literal};

#[derive(Parser)]
#[grammar = "ssp.pest"]
struct SspParser;

pub(crate) fn translate(uri: &str, source: &str) -> Result<String, SyntaxError> {
    let error = |message: &str, offset: usize| SyntaxError::at(message, uri, source, offset);
    let nodes = SspParser::parse(Rule::template, source)
        .map_err(|e| SyntaxError::from_pest(e, uri, source))?
        .flat_map(|template| template.into_inner());

    let mut out = String::with_capacity(source.len());
    // Pending text, flushed before each tag
    let mut literal = String::new();

    for pair in nodes {
        let offset = pair.as_span().start();
        match pair.as_rule() {
            Rule::text => literal.push_str(pair.as_str()),
            Rule::escaped => literal.push_str("${"),
            Rule::expression => {
                let body = body(pair);
                if body.trim().is_empty() {
                    return Err(error("empty `${}` expression", offset));
                }
                flush(&mut out, &mut literal);
                out.push_str(&format!("{{{{ {} }}}}", single_line(body)));
                out.push_str(&line_breaks(body));
            }
            Rule::comment => {
                flush(&mut out, &mut literal);
                out.push_str("{#");
                out.push_str(&line_breaks(body(pair)));
                out.push_str("#}");
            }
            Rule::directive => {
                flush(&mut out, &mut literal);
                out.push_str(&line_breaks(body(pair)));
            }
            Rule::output | Rule::statement => {
                let statement = pair.as_rule() == Rule::statement;
                let body = body(pair);
                let code = single_line(body);
                match (statement, code.is_empty()) {
                    (false, true) => return Err(error("empty `<%= %>` expression", offset)),
                    (true, true) => return Err(error("empty `<% %>` statement", offset)),
                    (false, false) => {
                        flush(&mut out, &mut literal);
                        out.push_str(&format!("{{{{ {} }}}}", code));
                    }
                    (true, false) => {
                        flush(&mut out, &mut literal);
                        out.push_str(&format!("{{% {} %}}", code));
                    }
                }
                out.push_str(&line_breaks(body));
            }
            Rule::unclosed_expression => return Err(error("unclosed `${` expression", offset)),
            Rule::unclosed_comment => return Err(error("unclosed `<%--` comment", offset)),
            Rule::unclosed_tag => return Err(error("unclosed `<%` tag", offset)),
            _ => {}
        }
    }

    flush(&mut out, &mut literal);
    Ok(out)
}

/// Text between a tag's delimiters
fn body<'i>(pair: Pair<'i, Rule>) -> &'i str {
    pair.into_inner().next().map_or("", |inner| inner.as_str())
}

fn flush(out: &mut String, literal: &mut String) {
    push_literal(out, literal);
    literal.clear();
}

/// Tag contents on one line; the breaks are re-emitted after the tag
fn single_line(body: &str) -> String {
    body.trim().replace(['\r', '\n'], " ")
}
