//! End-to-end rendering through the `Renderer` facade

use std::path::Path;
use std::sync::Arc;

use vellum_core::{Action, RenderConfig, RenderOptions, SimpleAction, Syntax};
use vellum_engine::{RenderError, Renderer, UnitRegistry, numbered_listing};

fn write(root: &Path, identifier: &str, content: &str) {
    let path = root.join(identifier);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn config(dir: &Path) -> RenderConfig {
    RenderConfig::default()
        .with_template_root(dir.join("templates"))
        .with_tmp_dir(dir.join("tmp"))
}

fn show() -> Arc<dyn Action> {
    Arc::new(SimpleAction::new("Show"))
}

mod resolution {
    use super::*;

    #[test]
    fn test_extension_selects_syntax_unless_type_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        write(&root, "page.jade", "p= 1 + 1");
        let renderer = Renderer::new(config(dir.path()));

        let inferred = renderer.render("page.jade", &show(), &RenderOptions::default()).unwrap();
        assert_eq!(inferred, "<p>2</p>");

        let forced = RenderOptions::from_pairs([("type", "ssp")]).unwrap();
        let verbatim = renderer.render("page.jade", &show(), &forced).unwrap();
        assert_eq!(verbatim, "p= 1 + 1");
    }

    #[test]
    fn test_missing_file_without_unit_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(config(dir.path()));

        let err = renderer
            .render("app/Missing.scaml", &show(), &RenderOptions::default())
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("app.$_vellum_$.Missing_scaml"));
    }

    #[test]
    fn test_production_renders_units_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        write(&root, "app/Index.ssp", "from file");

        let mut units = UnitRegistry::new();
        units
            .register_generated("app/Index.ssp", Syntax::Ssp, "from unit")
            .unwrap();
        let renderer = Renderer::builder()
            .config(config(dir.path()).with_production(true))
            .units(units)
            .build();

        let out = renderer.render("app/Index.ssp", &show(), &RenderOptions::default()).unwrap();
        assert_eq!(out, "from unit");

        write(&root, "app/Other.ssp", "only a file");
        let err = renderer
            .render("app/Other.ssp", &show(), &RenderOptions::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

mod context {
    use super::*;

    #[test]
    fn test_colliding_helper_attribute_keeps_action_binding() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(config(dir.path()));
        let action: Arc<dyn Action> = Arc::new(
            SimpleAction::new("Checkout")
                .with_attribute("helper", "spoofed")
                .with_attribute("context", "spoofed"),
        );

        let out = renderer
            .render_string("${helper.name} ${context.identifier}", Syntax::Ssp, &action, &RenderOptions::default())
            .unwrap();
        assert_eq!(out, "Checkout inline.ssp");
    }

    #[test]
    fn test_mustache_hyphenated_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(config(dir.path()));
        let action: Arc<dyn Action> = Arc::new(
            SimpleAction::new("Profile").with_attribute("first-name", "Ada"),
        );

        let out = renderer
            .render_string("Hi {{first-name}}", Syntax::Mustache, &action, &RenderOptions::default())
            .unwrap();
        assert_eq!(out, "Hi Ada");
    }

    #[test]
    fn test_locale_aware_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(config(dir.path()));
        let action: Arc<dyn Action> = Arc::new(
            SimpleAction::new("Invoice")
                .with_locale(vellum_core::Locale::parse("de-DE").unwrap())
                .with_attribute("total", 1234567.5),
        );

        let defaults = renderer
            .render_string("${total|format_number}", Syntax::Ssp, &action, &RenderOptions::default())
            .unwrap();
        assert_eq!(defaults, "1.234.567,5");

        let options = RenderOptions::from_pairs([("number", "2"), ("date", "%Y/%m/%d")]).unwrap();
        let explicit = renderer
            .render_string(
                "${format_number(total)} ${format_date('2024-03-09')}",
                Syntax::Ssp,
                &action,
                &options,
            )
            .unwrap();
        assert_eq!(explicit, "1.234.567,50 2024/03/09");
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_empty_template_renders_empty_in_every_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(config(dir.path()));
        renderer.start();

        for syntax in Syntax::ALL {
            let out = renderer
                .render_string("", syntax, &show(), &RenderOptions::default())
                .unwrap();
            assert_eq!(out, "", "{} should render nothing", syntax);
        }
    }

    #[test]
    fn test_concurrent_renders_of_cached_templates() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        for i in 0..8 {
            write(&root, &format!("app/T{}.ssp", i), &format!("template {} for ${{helper.name}}", i));
        }
        let renderer = Renderer::new(config(dir.path()));

        std::thread::scope(|scope| {
            for i in 0..8 {
                let renderer = &renderer;
                scope.spawn(move || {
                    let action: Arc<dyn Action> = Arc::new(SimpleAction::new(format!("worker{}", i)));
                    let identifier = format!("app/T{}.ssp", i);
                    for _ in 0..25 {
                        let out = renderer
                            .render(&identifier, &action, &RenderOptions::default())
                            .unwrap();
                        assert_eq!(out, format!("template {} for worker{}", i, i));
                    }
                });
            }
        });

        assert_eq!(renderer.manager().file_engine().cached(), 8);
        renderer.stop();
        assert_eq!(renderer.manager().file_engine().cached(), 0);
    }
}

mod diagnostics {
    use super::*;

    fn failing_at_line_42() -> String {
        let mut source = "p ok\n".repeat(41);
        source.push_str("= nope()\n");
        source
    }

    #[test]
    fn test_runtime_error_points_at_generated_code() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        write(&root, "app/Foo.jade", &failing_at_line_42());
        let renderer = Renderer::new(config(dir.path()));

        let err = renderer
            .render("app/Foo.jade", &show(), &RenderOptions::default())
            .unwrap_err();
        let RenderError::Enriched(enriched) = &err else {
            panic!("expected an enriched error, got {:?}", err);
        };

        let artifact = renderer.work_dir().join("src/app/Foo.jade.j2");
        assert_eq!(enriched.artifact, artifact);
        assert_eq!(err.line(), Some(42));
        let message = err.to_string();
        assert!(message.contains("app/Foo.jade"));
        assert!(message.contains(&format!("{}:42", artifact.display())));
        assert!(message.contains("  42  {{ nope() }}"));
        assert!(std::error::Error::source(enriched).is_some());
    }

    #[test]
    fn test_unit_errors_list_the_unit_code() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        write(&root, "app/Foo.jade", "p one\np two");
        let development = Renderer::new(config(dir.path()));
        development
            .render("app/Foo.jade", &show(), &RenderOptions::default())
            .unwrap();

        let mut units = UnitRegistry::new();
        units
            .register_generated("app/Foo.jade", Syntax::Jade, "<p>{{ nope() }}</p>")
            .unwrap();
        let production = Renderer::builder()
            .config(config(dir.path()).with_production(true))
            .units(units)
            .build();

        let err = production
            .render("app/Foo.jade", &show(), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Enriched(_)), "{:?}", err);
        let message = err.to_string();
        assert!(message.contains("   1  <p>{{ nope() }}</p>"), "{}", message);
        assert!(!message.contains("<p>one</p>"), "{}", message);
    }

    #[test]
    fn test_runtime_error_without_artifact_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        write(&root, "app/Foo.jade", &failing_at_line_42());
        let mut config = config(dir.path());
        config.write_artifacts = false;
        let renderer = Renderer::new(config);

        let err = renderer
            .render("app/Foo.jade", &show(), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Runtime(_)));
        assert_eq!(err.line(), Some(42));
    }

    #[test]
    fn test_syntax_error_excerpt() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        write(&root, "broken.mustache", "one\ntwo\nthree {{#open}}");
        let renderer = Renderer::new(config(dir.path()));

        let err = renderer
            .render("broken.mustache", &show(), &RenderOptions::default())
            .unwrap_err();
        let RenderError::Syntax(syntax) = &err else {
            panic!("expected a syntax error, got {:?}", err);
        };
        assert_eq!(syntax.position.map(|p| p.line), Some(3));
        assert!(syntax.message.contains("   3  three {{#open}}"));
        assert!(syntax.message.contains("^"));
    }

    #[test]
    fn test_numbered_listing_numbers_every_line() {
        let lines: Vec<String> = (0..12).map(|i| format!("line {}", i)).collect();
        let listing = numbered_listing(&lines);
        let numbered: Vec<&str> = listing.lines().collect();
        assert_eq!(numbered.len(), 12);
        assert_eq!(numbered[0], "   1  line 0");
        assert_eq!(numbered[11], "  12  line 11");
    }
}
