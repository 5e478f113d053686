//! Vellum Syntax - template front-ends
//!
//! Every supported syntax is translated into Jinja2 source that MiniJinja
//! executes. The generated code keeps the line structure of the template:
//! line N of a template always ends up on line N of its generated code, so a
//! line reported by the Jinja runtime is also a line of the original template.
//!
//! | Syntax     | Output                        | Control flow                     |
//! |------------|-------------------------------|----------------------------------|
//! | Jade       | `p= user.name`                | `- for item in items` + indent   |
//! | Scaml      | `%p= user.name`               | `- if admin` + indent            |
//! | SSP        | `${user.name}`, `<%= x %>`    | `<% for item in items %>`        |
//! | Mustache   | `{{user.name}}`               | `{{#items}}...{{/items}}`        |
//!
//! # Example
//!
//! ```
//! use vellum_core::Syntax;
//!
//! let jinja = vellum_syntax::translate(Syntax::Ssp, "hello.ssp", "Hello ${name}!").unwrap();
//! assert_eq!(jinja, "Hello {{ name }}!");
//! ```

pub mod error;
mod indent;
mod mustache;
mod ssp;
mod text;

pub use error::{Position, SyntaxError};

use vellum_core::Syntax;

/// Translate template source into Jinja2
///
/// `uri` names the template in error messages.
pub fn translate(syntax: Syntax, uri: &str, source: &str) -> Result<String, SyntaxError> {
    tracing::trace!(%syntax, uri, "translating template");
    match syntax {
        Syntax::Jade => indent::translate(indent::Dialect::Jade, uri, source),
        Syntax::Scaml => indent::translate(indent::Dialect::Scaml, uri, source),
        Syntax::Ssp => ssp::translate(uri, source),
        Syntax::Mustache => mustache::translate(uri, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_translates_to_empty_output() {
        for syntax in Syntax::ALL {
            assert_eq!(translate(syntax, "empty", "").unwrap(), "", "{syntax}");
        }
    }

    #[test]
    fn test_line_count_is_preserved() {
        let sources = [
            (Syntax::Jade, "ul\n  - for x in xs\n    li= x\n\np done"),
            (Syntax::Scaml, "%ul\n  - for x in xs\n    %li= x\n\n%p done"),
            (Syntax::Ssp, "<ul>\n<% for x in xs %>\n<li>${x}</li>\n<% endfor %>\n</ul>"),
            (Syntax::Mustache, "<ul>\n{{#xs}}\n<li>{{.}}</li>\n{{/xs}}\n</ul>"),
        ];

        for (syntax, source) in sources {
            let out = translate(syntax, "lines", source).unwrap();
            assert_eq!(
                out.lines().count(),
                source.lines().count(),
                "{syntax}: {out:?}"
            );
        }
    }

    #[test]
    fn test_ssp_page_snapshot() {
        let source = "<h1>${title}</h1>\n<%-- note --%>\n<% if admin %>x<% endif %>";
        let out = translate(Syntax::Ssp, "page.ssp", source).unwrap();
        insta::assert_snapshot!(out, @r"
        <h1>{{ title }}</h1>
        {##}
        {% if admin %}x{% endif %}
        ");
    }
}
