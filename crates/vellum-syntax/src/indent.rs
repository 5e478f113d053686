//! Indentation-based front-ends (Jade and Scaml)
//!
//! Both dialects describe markup by nesting: a tag or a control line owns
//! every following line that is indented deeper. Closing tags are appended
//! to the last line a block owns, so the generated code never gains lines.

use phf::{phf_map, phf_set};

use crate::error::SyntaxError;
use crate::text::{find_closing_brace, find_closing_paren, push_literal};

/// Elements that never take a closing tag
static VOID_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
};

/// Control keywords that open a block, and the tag that ends it
static BLOCK_KEYWORDS: phf::Map<&'static str, &'static str> = phf_map! {
    "for" => "endfor",
    "if" => "endif",
    "with" => "endwith",
    "macro" => "endmacro",
    "block" => "endblock",
    "filter" => "endfilter",
    "call" => "endcall",
    "autoescape" => "endautoescape",
};

/// `doctype <kind>` (Jade) and `!!! <kind>` (Scaml) declarations
static DOCTYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "<!DOCTYPE html>",
    "5" => "<!DOCTYPE html>",
    "html" => "<!DOCTYPE html>",
    "xml" => "<?xml version=\"1.0\" encoding=\"utf-8\" ?>",
    "transitional" => "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">",
    "strict" => "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">",
    "frameset" => "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Frameset//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd\">",
    "1.1" => "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">",
    "basic" => "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML Basic 1.1//EN\" \"http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd\">",
    "mobile" => "<!DOCTYPE html PUBLIC \"-//WAPFORUM//DTD XHTML Mobile 1.2//EN\" \"http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd\">",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Jade,
    Scaml,
}

pub(crate) fn translate(dialect: Dialect, uri: &str, source: &str) -> Result<String, SyntaxError> {
    Translator {
        dialect,
        uri,
        source,
    }
    .run()
}

#[derive(Debug)]
enum Block {
    Element(String),
    /// `tag.`: every nested line is text
    Text(String),
    Control {
        keyword: &'static str,
        end: &'static str,
    },
    Comment,
}

impl Block {
    fn closer(&self) -> String {
        match self {
            Block::Element(name) | Block::Text(name) => format!("</{}>", name),
            Block::Control { end, .. } => format!("{{% {} %}}", end),
            Block::Comment => String::new(),
        }
    }

    fn accepts(&self, continuation: Continuation) -> bool {
        match (self, continuation) {
            (Block::Control { keyword: "if", .. }, _) => true,
            (Block::Control { keyword: "for", .. }, Continuation::Else) => true,
            _ => false,
        }
    }
}

/// `- else` and `- elif` lines continue the block above them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    Else,
    Elif,
}

#[derive(Debug)]
struct OpenBlock {
    indent: usize,
    block: Block,
}

struct Line {
    text: String,
    opens: Option<Block>,
}

impl Line {
    fn text(text: String) -> Self {
        Self { text, opens: None }
    }
}

struct Translator<'a> {
    dialect: Dialect,
    uri: &'a str,
    source: &'a str,
}

impl Translator<'_> {
    fn run(&self) -> Result<String, SyntaxError> {
        let mut lines: Vec<String> = Vec::new();
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut last_content: Option<usize> = None;
        let mut offset = 0;

        for raw in self.source.split('\n') {
            let line_offset = offset;
            offset += raw.len() + 1;

            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let body = line.trim_start_matches(' ');
            let indent = line.len() - body.len();
            let base = line_offset + indent;

            if body.trim().is_empty() {
                lines.push(String::new());
                continue;
            }

            if let Some(top) = stack.last() {
                if matches!(top.block, Block::Text(_)) && indent > top.indent {
                    let text = self.interpolate(body, base)?;
                    lines.push(format!("{}{}", " ".repeat(indent), text));
                    last_content = Some(lines.len() - 1);
                    continue;
                }
            }
            if body.starts_with('\t') {
                return Err(self.error("tabs are not allowed in indentation", base));
            }

            // Silent comments swallow everything nested below them
            if let Some(top) = stack.last() {
                if matches!(top.block, Block::Comment) && indent > top.indent {
                    lines.push(String::new());
                    continue;
                }
            }

            let continuation = self.continuation(body);
            let mut closers = String::new();
            loop {
                let (top_indent, continues) = match stack.last() {
                    Some(top) => (
                        top.indent,
                        continuation.is_some_and(|c| top.block.accepts(c)),
                    ),
                    None => break,
                };
                if top_indent < indent || (top_indent == indent && continues) {
                    break;
                }
                if let Some(open) = stack.pop() {
                    closers.push_str(&open.block.closer());
                }
            }

            if let Some(continuation) = continuation {
                let matched = stack
                    .last()
                    .is_some_and(|top| top.indent == indent && top.block.accepts(continuation));
                if !matched {
                    let message = match continuation {
                        Continuation::Else => "`- else` without a matching `- if` or `- for`",
                        Continuation::Elif => "`- elif` without a matching `- if`",
                    };
                    return Err(self.error(message, base));
                }
            }
            attach(&mut lines, last_content, &closers);

            let translated = self.line(body, base)?;
            if translated.text.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{}{}", " ".repeat(indent), translated.text));
                last_content = Some(lines.len() - 1);
            }
            if let Some(block) = translated.opens {
                stack.push(OpenBlock { indent, block });
            }
        }

        let closers: String = stack.iter().rev().map(|open| open.block.closer()).collect();
        attach(&mut lines, last_content, &closers);

        Ok(lines.join("\n"))
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> SyntaxError {
        SyntaxError::at(message, self.uri, self.source, offset)
    }

    fn continuation(&self, body: &str) -> Option<Continuation> {
        let stmt = code(body)?.trim();
        if stmt == "else" {
            Some(Continuation::Else)
        } else if stmt.starts_with("elif ") || stmt.starts_with("else if ") {
            Some(Continuation::Elif)
        } else {
            None
        }
    }

    fn line(&self, body: &str, base: usize) -> Result<Line, SyntaxError> {
        match self.dialect {
            Dialect::Jade => self.jade_line(body, base),
            Dialect::Scaml => self.scaml_line(body, base),
        }
    }

    fn jade_line(&self, body: &str, base: usize) -> Result<Line, SyntaxError> {
        if body.starts_with("//-") {
            return Ok(Line {
                text: String::new(),
                opens: Some(Block::Comment),
            });
        }
        if let Some(comment) = body.strip_prefix("//") {
            return Ok(Line::text(html_comment(comment)));
        }
        if let Some(kind) = body.strip_prefix("doctype") {
            if kind.is_empty() || kind.starts_with(' ') {
                return Ok(Line::text(doctype(kind.trim())));
            }
        }
        if let Some(stmt) = code(body) {
            return self.control(stmt, base + 1);
        }
        if let Some(expr) = body.strip_prefix("!=") {
            return Ok(Line::text(self.output(expr, true, base + 2)?));
        }
        if let Some(expr) = body.strip_prefix('=') {
            return Ok(Line::text(self.output(expr, false, base + 1)?));
        }
        if let Some(text) = body.strip_prefix('|') {
            let (text, base) = match text.strip_prefix(' ') {
                Some(text) => (text, base + 2),
                None => (text, base + 1),
            };
            return Ok(Line::text(self.interpolate(text, base)?));
        }
        if body.starts_with('<') {
            return Ok(Line::text(self.interpolate(body, base)?));
        }
        self.element(body, base)
    }

    fn scaml_line(&self, body: &str, base: usize) -> Result<Line, SyntaxError> {
        if body.starts_with("-#") {
            return Ok(Line {
                text: String::new(),
                opens: Some(Block::Comment),
            });
        }
        if let Some(kind) = body.strip_prefix("!!!") {
            return Ok(Line::text(doctype(kind.trim())));
        }
        if let Some(stmt) = code(body) {
            return self.control(stmt, base + 1);
        }
        if let Some(expr) = body.strip_prefix("!=") {
            return Ok(Line::text(self.output(expr, true, base + 2)?));
        }
        if let Some(expr) = body.strip_prefix("&=") {
            return Ok(Line::text(self.output(expr, false, base + 2)?));
        }
        if let Some(expr) = body.strip_prefix('=') {
            return Ok(Line::text(self.output(expr, false, base + 1)?));
        }
        if let Some(tag) = body.strip_prefix('%') {
            return self.element(tag, base + 1);
        }
        if starts_shorthand(body) {
            return self.element(body, base);
        }
        if let Some(comment) = body.strip_prefix('/') {
            return Ok(Line::text(html_comment(comment)));
        }
        if let Some(text) = body.strip_prefix('\\') {
            return Ok(Line::text(self.interpolate(text, base + 1)?));
        }
        Ok(Line::text(self.interpolate(body, base)?))
    }

    fn control(&self, stmt: &str, base: usize) -> Result<Line, SyntaxError> {
        let leading = stmt.len() - stmt.trim_start().len();
        let stmt = stmt.trim();
        let keyword = stmt.split_whitespace().next().unwrap_or("");

        if keyword.is_empty() {
            return Err(self.error("empty code line", base));
        }
        if stmt.contains("%}") {
            return Err(self.error("code lines cannot contain `%}`", base + leading));
        }

        if let Some(cond) = stmt.strip_prefix("else if ") {
            return Ok(Line::text(format!("{{% elif {} %}}", cond.trim())));
        }

        let opens = BLOCK_KEYWORDS
            .get_entry(keyword)
            .map(|(keyword, end)| Block::Control {
                keyword: *keyword,
                end: *end,
            });

        Ok(Line {
            text: format!("{{% {} %}}", stmt),
            opens,
        })
    }

    fn output(&self, expr: &str, safe: bool, base: usize) -> Result<String, SyntaxError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(self.error("expected an expression", base));
        }
        Ok(if safe {
            format!("{{{{ ({})|safe }}}}", expr)
        } else {
            format!("{{{{ {} }}}}", expr)
        })
    }

    /// Text with `#{expr}` (escaped) and `!{expr}` (raw) interpolation
    fn interpolate(&self, text: &str, base: usize) -> Result<String, SyntaxError> {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' if matches!(bytes.get(i + 1), Some(b'#' | b'!')) && bytes.get(i + 2) == Some(&b'{') => {
                    push_literal(&mut out, &text[last..i]);
                    last = i + 1;
                    i += 3;
                }
                b'#' | b'!' if bytes.get(i + 1) == Some(&b'{') => {
                    push_literal(&mut out, &text[last..i]);
                    let close = find_closing_brace(text, i + 1)
                        .ok_or_else(|| self.error("unclosed interpolation", base + i))?;
                    let expr = text[i + 2..close].trim();
                    if expr.is_empty() {
                        return Err(self.error("empty interpolation", base + i));
                    }
                    if bytes[i] == b'#' {
                        out.push_str(&format!("{{{{ {} }}}}", expr));
                    } else {
                        out.push_str(&format!("{{{{ ({})|safe }}}}", expr));
                    }
                    i = close + 1;
                    last = i;
                }
                _ => i += 1,
            }
        }

        push_literal(&mut out, &text[last..]);
        Ok(out)
    }

    /// A tag line: `name.class#id(attrs) content`
    ///
    /// `body` starts right after Scaml's `%`.
    fn element(&self, body: &str, base: usize) -> Result<Line, SyntaxError> {
        let bytes = body.as_bytes();
        let name_end = scan(bytes, 0, is_name_byte);
        let name = match &body[..name_end] {
            "" if starts_shorthand(body) => "div",
            "" => return Err(self.error("expected a tag name", base)),
            name if self.dialect == Dialect::Jade && !bytes[0].is_ascii_alphabetic() => {
                return Err(self.error(format!("invalid tag name `{}`", name), base));
            }
            name => name,
        };

        let mut i = name_end;
        let mut classes: Vec<&str> = Vec::new();
        let mut id: Option<&str> = None;
        while matches!(bytes.get(i), Some(b'.' | b'#')) && bytes.get(i + 1).is_some_and(|b| is_name_byte(*b)) {
            let start = i + 1;
            let end = scan(bytes, start, is_name_byte);
            if bytes[i] == b'.' {
                classes.push(&body[start..end]);
            } else if id.replace(&body[start..end]).is_some() {
                return Err(self.error("an element can only have one id", base + i));
            }
            i = end;
        }

        let mut tag = format!("<{}", name);
        if !classes.is_empty() {
            tag.push_str(&format!(" class=\"{}\"", classes.join(" ")));
        }
        if let Some(id) = id {
            tag.push_str(&format!(" id=\"{}\"", id));
        }

        if bytes.get(i) == Some(&b'(') {
            let close = find_closing_paren(body, i)
                .ok_or_else(|| self.error("unclosed attribute list", base + i))?;
            tag.push_str(&self.attributes(&body[i + 1..close], base + i + 1)?);
            i = close + 1;
        }

        let rest = &body[i..];
        let mut self_closing = false;
        let mut text_block = false;
        let content = if let Some(expr) = rest.strip_prefix("!=") {
            self.output(expr, true, base + i + 2)?
        } else if let Some(expr) = rest.strip_prefix('=') {
            self.output(expr, false, base + i + 1)?
        } else if rest.trim_end() == "/" {
            self_closing = true;
            String::new()
        } else if self.dialect == Dialect::Jade && rest.trim_end() == "." {
            text_block = true;
            String::new()
        } else if rest.trim().is_empty() {
            String::new()
        } else if let Some(text) = rest.strip_prefix(' ') {
            self.interpolate(text, base + i + 1)?
        } else {
            let found = rest.chars().next().unwrap_or_default();
            return Err(self.error(format!("unexpected `{}` after tag", found), base + i));
        };

        if self_closing {
            tag.push_str(" />");
            return Ok(Line::text(tag));
        }

        tag.push('>');
        tag.push_str(&content);
        let opens = if text_block {
            Some(Block::Text(name.to_string()))
        } else {
            (!VOID_ELEMENTS.contains(name)).then(|| Block::Element(name.to_string()))
        };
        Ok(Line { text: tag, opens })
    }

    /// `name="literal #{interp}", flag=true, value=expr`
    fn attributes(&self, list: &str, base: usize) -> Result<String, SyntaxError> {
        let mut out = String::new();

        for (offset, item) in split_attributes(list) {
            let at = base + offset + (item.len() - item.trim_start().len());
            let item = item.trim();
            if item.is_empty() {
                continue;
            }

            let (name, value) = match item.find('=') {
                Some(eq) => (item[..eq].trim(), Some(item[eq + 1..].trim())),
                None => (item, None),
            };
            if name.is_empty() || !name.bytes().all(|b| is_name_byte(b) || matches!(b, b'@' | b'.')) {
                return Err(self.error(format!("invalid attribute name `{}`", name), at));
            }

            match value {
                None | Some("true") => {
                    out.push(' ');
                    out.push_str(name);
                }
                Some("false") => {}
                Some("") => return Err(self.error(format!("attribute `{}` has no value", name), at)),
                Some(value) => {
                    out.push_str(&format!(" {}=\"", name));
                    match quoted(value) {
                        Some(inner) => {
                            let inner = inner.replace('"', "&quot;");
                            out.push_str(&self.interpolate(&inner, at)?);
                        }
                        None => out.push_str(&format!("{{{{ {} }}}}", value)),
                    }
                    out.push('"');
                }
            }
        }

        Ok(out)
    }
}

/// Append closing tags to the last line that produced output
fn attach(lines: &mut [String], last_content: Option<usize>, closers: &str) {
    if closers.is_empty() {
        return;
    }
    let target = last_content.or(lines.len().checked_sub(1));
    if let Some(line) = target.and_then(|i| lines.get_mut(i)) {
        line.push_str(closers);
    }
}

/// Statement text of a `- stmt` line
fn code(body: &str) -> Option<&str> {
    if body == "-" {
        Some("")
    } else {
        body.strip_prefix("- ")
    }
}

fn html_comment(comment: &str) -> String {
    let mut out = String::from("<!--");
    push_literal(&mut out, comment.trim_end());
    out.push_str(" -->");
    out
}

fn doctype(kind: &str) -> String {
    match DOCTYPES.get(kind.to_ascii_lowercase().as_str()) {
        Some(doctype) => doctype.to_string(),
        None => {
            let mut out = String::from("<!DOCTYPE ");
            push_literal(&mut out, kind);
            out.push('>');
            out
        }
    }
}

fn starts_shorthand(body: &str) -> bool {
    let bytes = body.as_bytes();
    matches!(bytes.first(), Some(b'.' | b'#')) && bytes.get(1).is_some_and(|b| is_name_byte(*b))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

fn scan(bytes: &[u8], from: usize, pred: fn(u8) -> bool) -> usize {
    bytes[from..]
        .iter()
        .position(|b| !pred(*b))
        .map_or(bytes.len(), |n| from + n)
}

/// Inner text of a fully quoted value
fn quoted(value: &str) -> Option<&str> {
    let quote = *value.as_bytes().first()?;
    if !matches!(quote, b'"' | b'\'') || value.len() < 2 || !value.ends_with(quote as char) {
        return None;
    }
    let inner = &value[1..value.len() - 1];
    let mut escaped = false;
    for b in inner.bytes() {
        match b {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            _ if b == quote => return None,
            _ => {}
        }
    }
    Some(inner)
}

/// Split on commas outside quotes and brackets, keeping each item's offset
fn split_attributes(list: &str) -> Vec<(usize, &str)> {
    let bytes = list.as_bytes();
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    items.push((start, &list[start..i]));
                    start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }

    items.push((start, &list[start..]));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jade(source: &str) -> String {
        translate(Dialect::Jade, "test.jade", source).unwrap()
    }

    fn scaml(source: &str) -> String {
        translate(Dialect::Scaml, "test.scaml", source).unwrap()
    }

    #[test]
    fn test_simple_tags() {
        assert_eq!(jade("p Hello"), "<p>Hello</p>");
        assert_eq!(jade("p Hello\np World"), "<p>Hello</p>\n<p>World</p>");
        assert_eq!(scaml("%p Hello"), "<p>Hello</p>");
    }

    #[test]
    fn test_nesting_closes_on_last_owned_line() {
        assert_eq!(
            jade("ul\n  li a\n  li b"),
            "<ul>\n  <li>a</li>\n  <li>b</li></ul>"
        );
    }

    #[test]
    fn test_output_lines() {
        assert_eq!(jade("p= user.name"), "<p>{{ user.name }}</p>");
        assert_eq!(jade("p!= body"), "<p>{{ (body)|safe }}</p>");
        assert_eq!(jade("= x"), "{{ x }}");
        assert_eq!(scaml("%li= x"), "<li>{{ x }}</li>");
        assert_eq!(scaml("&= x"), "{{ x }}");
    }

    #[test]
    fn test_control_blocks() {
        assert_eq!(
            jade("- for x in xs\n  li= x"),
            "{% for x in xs %}\n  <li>{{ x }}</li>{% endfor %}"
        );
        assert_eq!(
            jade("- if a\n  p A\n- elif b\n  p B\n- else\n  p C"),
            "{% if a %}\n  <p>A</p>\n{% elif b %}\n  <p>B</p>\n{% else %}\n  <p>C</p>{% endif %}"
        );
        assert_eq!(jade("- set x = 1"), "{% set x = 1 %}");
    }

    #[test]
    fn test_else_if_becomes_elif() {
        assert_eq!(
            scaml("- if a\n  A\n- else if b\n  B"),
            "{% if a %}\n  A\n{% elif b %}\n  B{% endif %}"
        );
    }

    #[test]
    fn test_for_else() {
        assert_eq!(
            jade("- for x in xs\n  = x\n- else\n  | none"),
            "{% for x in xs %}\n  {{ x }}\n{% else %}\n  none{% endfor %}"
        );
    }

    #[test]
    fn test_else_without_if() {
        let err = translate(Dialect::Jade, "t.jade", "p a\n- else").unwrap_err();
        assert_eq!(err.position.map(|p| p.line), Some(2));
    }

    #[test]
    fn test_shorthand_classes_and_id() {
        assert_eq!(jade(".box"), "<div class=\"box\"></div>");
        assert_eq!(jade("p.a.b#main Hi"), "<p class=\"a b\" id=\"main\">Hi</p>");
        assert_eq!(scaml("#nav"), "<div id=\"nav\"></div>");
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            jade("a(href=\"/home\", title=page.title) Home"),
            "<a href=\"/home\" title=\"{{ page.title }}\">Home</a>"
        );
        assert_eq!(
            jade("input(type='checkbox', checked=true, disabled=false)"),
            "<input type=\"checkbox\" checked>"
        );
        assert_eq!(
            jade("a(href=\"/u/#{user.id}\")"),
            "<a href=\"/u/{{ user.id }}\"></a>"
        );
    }

    #[test]
    fn test_void_and_self_closing() {
        assert_eq!(jade("br\np x"), "<br>\n<p>x</p>");
        assert_eq!(jade("foo/"), "<foo />");
    }

    #[test]
    fn test_interpolation() {
        assert_eq!(jade("p Hi #{name}!"), "<p>Hi {{ name }}!</p>");
        assert_eq!(jade("p !{html}"), "<p>{{ (html)|safe }}</p>");
        assert_eq!(jade("p \\#{name}"), "<p>#{name}</p>");
        assert_eq!(scaml("Hello #{name}"), "Hello {{ name }}");
    }

    #[test]
    fn test_unclosed_interpolation_reports_position() {
        let err = translate(Dialect::Jade, "t.jade", "p ok\np Hi #{name").unwrap_err();
        let position = err.position.unwrap();
        assert_eq!((position.line, position.column), (2, 6));
    }

    #[test]
    fn test_literal_braces_are_escaped() {
        assert_eq!(jade("| {{ not code }}"), "{{ \"{\" }}{ not code }}");
    }

    #[test]
    fn test_silent_comments_swallow_children() {
        assert_eq!(jade("//- hidden\n  p gone\np kept"), "\n\n<p>kept</p>");
        assert_eq!(scaml("-# hidden\n  %p gone\n%p kept"), "\n\n<p>kept</p>");
        assert_eq!(jade("// shown"), "<!-- shown -->");
    }

    #[test]
    fn test_raw_html_and_escaped_text() {
        assert_eq!(jade("<br/>"), "<br/>");
        assert_eq!(scaml("\\%p not a tag"), "%p not a tag");
    }

    #[test]
    fn test_tabs_are_rejected() {
        assert!(translate(Dialect::Jade, "t.jade", "ul\n\tli").is_err());
    }

    #[test]
    fn test_empty_code_line() {
        assert!(translate(Dialect::Scaml, "t.scaml", "-").is_err());
    }

    #[test]
    fn test_doctype_page() {
        let out = jade("doctype html\nhtml\n  body\n    p hi");
        insta::assert_snapshot!(out, @r"
        <!DOCTYPE html>
        <html>
          <body>
            <p>hi</p></body></html>
        ");
    }

    #[test]
    fn test_doctype_kinds() {
        assert_eq!(jade("doctype"), "<!DOCTYPE html>");
        assert_eq!(jade("doctype xml"), "<?xml version=\"1.0\" encoding=\"utf-8\" ?>");
        assert_eq!(jade("doctype plist"), "<!DOCTYPE plist>");
        assert_eq!(scaml("!!! 5\n%html"), "<!DOCTYPE html>\n<html></html>");
        assert!(scaml("!!! Strict").contains("XHTML 1.0 Strict"));
        assert_eq!(jade("doctypes"), "<doctypes></doctypes>");
    }

    #[test]
    fn test_text_block() {
        let out = jade("p.\n  some text\n  more #{x}\n\n    {{ literal }}\np after");
        insta::assert_snapshot!(out, @r#"
        <p>
          some text
          more {{ x }}

            {{ "{" }}{ literal }}</p>
        <p>after</p>
        "#);
    }

    #[test]
    fn test_text_block_with_attributes() {
        assert_eq!(
            jade("script(type=\"module\").\n  if (a) { go() }"),
            "<script type=\"module\">\n  if (a) { go() }</script>"
        );
        assert!(translate(Dialect::Scaml, "t.scaml", "%p.").is_err());
    }

    #[test]
    fn test_blank_lines_are_kept() {
        assert_eq!(jade("p a\n\n\np b"), "<p>a</p>\n\n\n<p>b</p>");
    }
}
