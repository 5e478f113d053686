//! Mustache front-end
//!
//! Sections become loops over a normalised list: a sequence is iterated, any
//! other truthy value is iterated once, falsy values not at all. Names inside
//! a section are looked up on the innermost section item first, then outwards
//! until the render context.
//!
//! Names may contain `-`. Such segments are looked up by subscript, and a
//! top-level one through the action binding, which serves both attributes and
//! helpers.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use vellum_core::HELPER_BINDING;

use crate::error::SyntaxError;
use crate::text::{line_breaks, push_literal};

#[derive(Parser)]
#[grammar = "mustache.pest"]
struct MustacheParser;

pub(crate) fn translate(uri: &str, source: &str) -> Result<String, SyntaxError> {
    Translator {
        uri,
        source,
        sections: Vec::new(),
    }
    .run()
}

#[derive(Debug)]
struct Section<'a> {
    name: &'a str,
    inverted: bool,
    offset: usize,
}

struct Translator<'a> {
    uri: &'a str,
    source: &'a str,
    sections: Vec<Section<'a>>,
}

impl<'a> Translator<'a> {
    fn run(mut self) -> Result<String, SyntaxError> {
        let source = self.source;
        let nodes = MustacheParser::parse(Rule::template, source)
            .map_err(|e| SyntaxError::from_pest(e, self.uri, source))?
            .flat_map(|template| template.into_inner());
        let mut out = String::with_capacity(source.len());

        for pair in nodes {
            if pair.as_rule() == Rule::text {
                push_literal(&mut out, pair.as_str());
                continue;
            }

            let offset = pair.as_span().start();
            let lines = line_breaks(pair.as_str());
            match pair.as_rule() {
                Rule::triple => {
                    let expr = self.resolve(inner(pair), offset)?;
                    out.push_str(&format!("{{{{ ({})|safe }}}}", expr));
                }
                Rule::tag => self.tag(&mut out, inner(pair), offset)?,
                Rule::invalid_triple | Rule::invalid_tag => {
                    return Err(self.error(format!("invalid tag `{}`", pair.as_str()), offset));
                }
                Rule::unclosed_triple => return Err(self.error("unclosed `{{{` tag", offset)),
                Rule::unclosed_tag => return Err(self.error("unclosed `{{` tag", offset)),
                _ => {}
            }
            out.push_str(&lines);
        }

        if let Some(section) = self.sections.last() {
            return Err(self.error(format!("unclosed section `{}`", section.name), section.offset));
        }
        Ok(out)
    }

    fn tag(&mut self, out: &mut String, tag: Pair<'a, Rule>, offset: usize) -> Result<(), SyntaxError> {
        match tag.as_rule() {
            Rule::comment => out.push_str("{##}"),
            Rule::section | Rule::inverted => {
                let inverted = tag.as_rule() == Rule::inverted;
                let name = inner(tag);
                let section = name.as_str();
                let expr = self.resolve(name, offset)?;
                if inverted {
                    out.push_str(&format!("{{% if not ({}) %}}", expr));
                } else {
                    let depth = self.loop_depth() + 1;
                    out.push_str(&format!(
                        "{{% for _s{depth} in (({expr}) if ({expr}) is sequence else ([{expr}] if {expr} else [])) %}}"
                    ));
                }
                self.sections.push(Section {
                    name: section,
                    inverted,
                    offset,
                });
            }
            Rule::close => {
                let name = inner(tag).as_str();
                let section = self
                    .sections
                    .pop()
                    .ok_or_else(|| self.error(format!("closing `{}` without an open section", name), offset))?;
                if section.name != name {
                    return Err(self.error(
                        format!("expected `{{{{/{}}}}}`, found `{{{{/{}}}}}`", section.name, name),
                        offset,
                    ));
                }
                out.push_str(if section.inverted { "{% endif %}" } else { "{% endfor %}" });
            }
            Rule::unescaped => {
                let expr = self.resolve(inner(tag), offset)?;
                out.push_str(&format!("{{{{ ({})|safe }}}}", expr));
            }
            Rule::partial => return Err(self.error("partials are not supported", offset)),
            Rule::delimiters => return Err(self.error("delimiter changes are not supported", offset)),
            _ => {
                let expr = self.resolve(inner(tag), offset)?;
                out.push_str(&format!("{{{{ {} }}}}", expr));
            }
        }
        Ok(())
    }

    fn loop_depth(&self) -> usize {
        self.sections.iter().filter(|s| !s.inverted).count()
    }

    /// Jinja expression for a dotted Mustache name
    fn resolve(&self, name: Pair<'a, Rule>, offset: usize) -> Result<String, SyntaxError> {
        let depth = self.loop_depth();
        if name.as_str() == "." {
            if depth == 0 {
                return Err(self.error("`{{.}}` is only valid inside a section", offset));
            }
            return Ok(format!("_s{}", depth));
        }

        let mut segments = name.into_inner().map(|segment| segment.as_str());
        let Some(head) = segments.next() else {
            return Err(self.error("empty name", offset));
        };

        let mut expr = if head.contains('-') {
            member(HELPER_BINDING, head)
        } else {
            head.to_string()
        };
        for level in 1..=depth {
            let item = member(&format!("_s{level}"), head);
            expr = format!("({item} if {item} is defined else {expr})");
        }
        for segment in segments {
            expr = member(&expr, segment);
        }
        Ok(expr)
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> SyntaxError {
        SyntaxError::at(message, self.uri, self.source, offset)
    }
}

/// First inner pair, the tag kind or the name it carries
fn inner(pair: Pair<'_, Rule>) -> Pair<'_, Rule> {
    let fallback = pair.clone();
    pair.into_inner().next().unwrap_or(fallback)
}

/// `base.segment`, or a subscript for names Jinja cannot spell
fn member(base: &str, segment: &str) -> String {
    if segment.contains('-') {
        format!("{}[\"{}\"]", base, segment)
    } else {
        format!("{}.{}", base, segment)
    }
}
