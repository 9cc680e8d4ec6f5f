use super::*;
use crate::cache::InMemoryCache;
use crate::expression::ClassTarget;
use crate::locator::{FileLocator, LocatorError, MemoryLocator, SourceUnit};
use crate::parser::{FixtureParser, ParseError};
use crate::typed_map::Key;
use prism_syntax::builder::*;
use prism_syntax::{SourceFile, Statement, Visibility};
use prism_types::{FunctionLikeId, Type};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Default)]
struct Fixture {
    parser: FixtureParser,
    locator: MemoryLocator,
}

impl Fixture {
    fn new() -> Self {
        crate::tracing_config::init_tracing();
        Self::default()
    }

    fn add(mut self, path: &str, tree: SourceFile, declares: impl IntoIterator<Item = DeclId>) -> Self {
        let code = format!("<?php // {path}");
        self.parser.register(&code, tree);
        self.locator.add(path, &code, declares);
        self
    }

    fn builder(self) -> SessionBuilder {
        Session::builder(self.parser).locator(self.locator)
    }

    fn session(self) -> Session {
        self.builder().build()
    }
}

fn app(statements: impl IntoIterator<Item = Statement>) -> SourceFile {
    file([namespace("App", statements)])
}

fn app_class(name: &str) -> DeclId {
    DeclId::class(&format!("App\\{name}"))
}

fn user_fixture() -> Fixture {
    Fixture::new().add(
        "src/User.php",
        app([class("User")
            .constant(constant("LIMIT", int(10)))
            .property(
                property("age")
                    .hint(hint("int"))
                    .doc("/** @var positive-int */"),
            )
            .method(method("save").param(param("force").hint(hint("bool"))))
            .statement()]),
        [app_class("User")],
    )
}

/// Counts how often the wrapped locator is asked.
struct Counting {
    inner: MemoryLocator,
    calls: Rc<Cell<usize>>,
}

impl Locator for Counting {
    fn locate(&self, id: &DeclId) -> std::result::Result<Option<SourceUnit>, LocatorError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.locate(id)
    }
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_reflects_a_class() {
    let session = user_fixture().session();
    let user_id = app_class("User");
    assert_eq!(session.state(&user_id), ResolutionState::Unrequested);

    let user = session.reflect(&user_id).unwrap();
    assert_eq!(user.get(&data::NAME).map(String::as_str), Some("App\\User"));
    assert_eq!(user.get(&data::FILE).map(String::as_str), Some("src/User.php"));
    assert!(*user.get(&data::CLONEABLE));
    assert!(!user.contains(&data::DOC_COMMENT));
    assert!(!user.contains(&data::TYPE_CONTEXT));
    assert_eq!(session.state(&user_id), ResolutionState::Cached);
}

#[test]
fn test_results_are_shared_not_rebuilt() {
    let session = user_fixture().session();
    let first = session.reflect(&app_class("User")).unwrap();
    let second = session.reflect(&app_class("User")).unwrap();
    assert!(first.ptr_eq(&second));

    let changed = first.with(&data::NAME, "Other".to_string());
    assert_eq!(
        session.reflect(&app_class("User")).unwrap().get(&data::NAME).map(String::as_str),
        Some("App\\User")
    );
    assert_ne!(changed, first);
}

#[test]
fn test_layers_resolve_annotated_first() {
    let session = user_fixture().session();
    let age = session
        .reflect(&DeclId::property(&ClassId::named("App\\User"), "age"))
        .unwrap();
    let layers = age.get(&data::TYPE);
    assert_eq!(layers.native(), Some(&Type::Int));
    assert_eq!(layers.annotated(), Some(&Type::positive_int()));
    assert_eq!(layers.resolved(), Some(&Type::positive_int()));
}

#[test]
fn test_members_are_reflected_through_their_owner() {
    let session = user_fixture().session();
    let user = ClassId::named("App\\User");

    let save = session.reflect(&DeclId::method(&user, "save")).unwrap();
    assert_eq!(save.get(&data::NAME).map(String::as_str), Some("save"));

    let method = FunctionLikeId::Method {
        class: user.clone(),
        name: "save".to_string(),
    };
    let force = session.reflect(&DeclId::parameter(&method, "force")).unwrap();
    assert_eq!(force.get(&data::INDEX), Some(&0));
    assert_eq!(force.get(&data::TYPE).native(), Some(&Type::Bool));

    assert!(matches!(
        session.reflect(&DeclId::method(&user, "load")),
        Err(ReflectionError::DeclarationNotFound(_))
    ));
    assert_eq!(session.state(&DeclId::Class(user)), ResolutionState::Cached);
}

#[test]
fn test_unit_declarations_are_buffered() {
    let calls = Rc::new(Cell::new(0));
    let mut parser = FixtureParser::new();
    let mut inner = MemoryLocator::new();
    let code = "<?php // src/models.php";
    parser.register(
        code,
        app([class("User").statement(), class("Order").statement()]),
    );
    inner.add("src/models.php", code, [app_class("User")]);
    let session = Session::builder(parser)
        .locator(Counting {
            inner,
            calls: Rc::clone(&calls),
        })
        .build();

    session.reflect(&app_class("User")).unwrap();
    assert_eq!(session.state(&app_class("Order")), ResolutionState::Unrequested);
    let order = session.reflect(&app_class("Order")).unwrap();
    assert_eq!(order.get(&data::NAME).map(String::as_str), Some("App\\Order"));
    assert_eq!(order.get(&data::FILE).map(String::as_str), Some("src/models.php"));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_evaluates_against_reflected_declarations() {
    let session = user_fixture().session();
    let limit = Expression::ClassConstantFetch {
        class: ClassTarget::Class(ClassId::named("App\\User")),
        name: "LIMIT".to_string(),
    };
    assert_eq!(session.evaluate(&limit, None).unwrap(), Value::Int(10));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unknown_declaration() {
    let session = user_fixture().session();
    let missing = app_class("Missing");
    assert!(matches!(
        session.reflect(&missing),
        Err(ReflectionError::DeclarationNotFound(id)) if id == missing
    ));
    assert_eq!(session.state(&missing), ResolutionState::Unrequested);
}

#[test]
fn test_located_unit_without_the_declaration() {
    let session = Fixture::new()
        .add("src/User.php", app([class("Account").statement()]), [app_class("User")])
        .session();
    assert!(matches!(
        session.reflect(&app_class("User")),
        Err(ReflectionError::DeclarationNotFound(_))
    ));
}

#[test]
fn test_parse_failures_are_not_cached() {
    let cache = Arc::new(InMemoryCache::new());
    let mut parser = FixtureParser::new();
    parser.register_failure("<?php class {", ParseError::new("unexpected `{`").at_line(1));
    let mut locator = MemoryLocator::new();
    locator.add("src/Broken.php", "<?php class {", [DeclId::class("Broken")]);
    let session = Session::builder(parser)
        .locator(locator)
        .cache(cache.clone())
        .build();

    let result = session.reflect(&DeclId::class("Broken"));
    match result {
        Err(ReflectionError::ParseFailed { id, source }) => {
            assert_eq!(id, DeclId::class("Broken"));
            assert_eq!(source.line, Some(1));
        }
        other => panic!("expected a parse failure, got {other:?}"),
    }
    assert_eq!(session.state(&DeclId::class("Broken")), ResolutionState::Unrequested);
    assert!(cache.is_empty());
}

struct Failing;

impl Locator for Failing {
    fn locate(&self, _id: &DeclId) -> std::result::Result<Option<SourceUnit>, LocatorError> {
        Err(LocatorError::new("index unavailable"))
    }
}

#[test]
fn test_locator_failures_propagate() {
    let session = Session::builder(FixtureParser::new()).locator(Failing).build();
    match session.reflect(&DeclId::class("User")) {
        Err(ReflectionError::LocatorFailed { source, .. }) => {
            assert_eq!(source.message, "index unavailable");
        }
        other => panic!("expected a locator failure, got {other:?}"),
    }
}

#[test]
fn test_later_locators_are_asked_after_misses() {
    let mut parser = FixtureParser::new();
    let code = "<?php class User {}";
    parser.register(code, file([class("User").statement()]));
    let mut second = MemoryLocator::new();
    second.add("src/User.php", code, [DeclId::class("User")]);
    let session = Session::builder(parser)
        .locator(MemoryLocator::new())
        .locator(second)
        .build();
    assert!(session.reflect(&DeclId::class("User")).is_ok());
}

#[test]
fn test_cyclic_inheritance() {
    let session = Fixture::new()
        .add(
            "src/cycle.php",
            app([
                class("A").extends("B").statement(),
                class("B").extends("A").statement(),
            ]),
            [app_class("A"), app_class("B")],
        )
        .session();

    match session.reflect(&app_class("A")) {
        Err(ReflectionError::CyclicResolution { chain }) => {
            assert_eq!(chain, vec![app_class("A"), app_class("B"), app_class("A")]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
    assert_eq!(session.state(&app_class("A")), ResolutionState::Unrequested);
    assert_eq!(session.state(&app_class("B")), ResolutionState::Unrequested);
}

#[test]
fn test_deep_hierarchies_are_bounded() {
    let count = 300;
    let classes = (0..count).map(|index| {
        let mut builder = class(&format!("C{index}"));
        if index + 1 < count {
            builder = builder.extends(&format!("C{}", index + 1));
        }
        builder.statement()
    });
    let declares: Vec<DeclId> = (0..count).map(|index| DeclId::class(&format!("C{index}"))).collect();
    let session = Fixture::new()
        .add("src/deep.php", file(classes), declares)
        .session();

    match session.reflect(&DeclId::class("C0")) {
        Err(ReflectionError::DepthExceeded { id, limit }) => {
            assert_eq!(limit, 256);
            assert_eq!(id, DeclId::class("C256"));
        }
        other => panic!("expected the depth limit, got {other:?}"),
    }
    assert_eq!(session.state(&DeclId::class("C0")), ResolutionState::Unrequested);
}

#[test]
fn test_failed_sibling_stays_buffered() {
    let session = Fixture::new()
        .add(
            "src/pair.php",
            app([
                class("A").statement(),
                class("B").extends("Missing").statement(),
            ]),
            [app_class("A")],
        )
        .session();

    session.reflect(&app_class("A")).unwrap();
    for _ in 0..2 {
        assert!(matches!(
            session.reflect(&app_class("B")),
            Err(ReflectionError::DeclarationNotFound(id)) if id == app_class("Missing")
        ));
        assert_eq!(session.state(&app_class("B")), ResolutionState::Unrequested);
    }
}

#[test]
fn test_failed_target_can_be_retried_from_the_buffer() {
    let calls = Rc::new(Cell::new(0));
    let mut parser = FixtureParser::new();
    let mut inner = MemoryLocator::new();
    let code = "<?php // src/child.php";
    parser.register(code, app([class("Child").extends("Missing").statement()]));
    inner.add("src/child.php", code, [app_class("Child")]);
    let session = Session::builder(parser)
        .locator(Counting {
            inner,
            calls: Rc::clone(&calls),
        })
        .build();

    assert!(session.reflect(&app_class("Child")).is_err());
    assert!(session.reflect(&app_class("Child")).is_err());
    // Child is located once; Missing is asked for on both attempts.
    assert_eq!(calls.get(), 3);
}

// =============================================================================
// Inheritance through the session
// =============================================================================

fn generics_fixture() -> Fixture {
    Fixture::new().add(
        "src/generics.php",
        app([
            interface("Collection").doc("/** @template V */").statement(),
            class("Box")
                .implements("Collection")
                .doc("/**\n * @template T\n * @implements Collection<T>\n */")
                .method(method("get").doc("/** @return T */"))
                .method(method("save").returns(hint("int")))
                .statement(),
            class("IntBox")
                .extends("Box")
                .doc("/** @extends Box<int> */")
                .method(method("save").returns(hint("string")))
                .statement(),
        ]),
        [app_class("Collection"), app_class("Box"), app_class("IntBox")],
    )
}

#[test]
fn test_generic_parent_members_are_substituted() {
    let session = generics_fixture().session();
    let int_box = session.reflect(&app_class("IntBox")).unwrap();

    let get = data::member(&int_box, &data::METHODS, "get").unwrap();
    assert_eq!(get.get(&data::TYPE).resolved(), Some(&Type::Int));
    assert_eq!(get.get(&data::DECLARING_CLASS), Some(&ClassId::named("App\\Box")));
    assert_eq!(int_box.get(&data::PARENTS).get("App\\Box"), Some(&vec![Type::Int]));
}

#[test]
fn test_own_methods_override_parent_methods() {
    let session = generics_fixture().session();
    let int_box = session.reflect(&app_class("IntBox")).unwrap();
    let save = data::member(&int_box, &data::METHODS, "save").unwrap();
    assert_eq!(save.get(&data::TYPE).resolved(), Some(&Type::String));
    assert_eq!(save.get(&data::DECLARING_CLASS), Some(&ClassId::named("App\\IntBox")));
}

#[test]
fn test_interface_arguments_are_substituted_transitively() {
    let session = generics_fixture().session();
    let int_box = session.reflect(&app_class("IntBox")).unwrap();
    assert_eq!(
        int_box.get(&data::INTERFACES).get("App\\Collection"),
        Some(&vec![Type::Int])
    );
    let boxed = session.reflect(&app_class("Box")).unwrap();
    assert_eq!(
        boxed.get(&data::INTERFACES).get("App\\Collection"),
        Some(&vec![Type::Template(prism_types::TemplateId::of_class(
            ClassId::named("App\\Box"),
            "T"
        ))])
    );
}

#[test]
fn test_mixin_aliases() {
    let session = Fixture::new()
        .add(
            "src/User.php",
            app([
                trait_("Greets").method(method("hello")).statement(),
                class("User")
                    .uses(trait_use(["Greets"]).alias(
                        Some("Greets"),
                        "hello",
                        Some("hi"),
                        Some(Visibility::Protected),
                    ))
                    .statement(),
            ]),
            [app_class("Greets"), app_class("User")],
        )
        .session();
    let user = session.reflect(&app_class("User")).unwrap();

    let hi = data::member(&user, &data::METHODS, "hi").unwrap();
    assert_eq!(*hi.get(&data::VISIBILITY), Visibility::Protected);
    assert_eq!(hi.get(&data::DECLARING_CLASS), Some(&ClassId::named("App\\Greets")));
    assert!(data::member(&user, &data::METHODS, "hello").is_some());
    assert!(user.get(&data::MIXINS).contains_key("App\\Greets"));
}

#[test]
fn test_inherited_private_clone_blocks_cloning() {
    let session = Fixture::new()
        .add(
            "src/Singleton.php",
            app([
                class("Singleton")
                    .method(method("__clone").visibility(Visibility::Private))
                    .statement(),
                class("Registry").extends("Singleton").statement(),
            ]),
            [app_class("Singleton"), app_class("Registry")],
        )
        .session();
    let registry = session.reflect(&app_class("Registry")).unwrap();
    assert!(!*registry.get(&data::CLONEABLE));
}

// =============================================================================
// Hooks
// =============================================================================

const SEEN: Key<Vec<String>> = Key::new("seen");

struct Recorder(&'static str);

impl Hook for Recorder {
    fn name(&self) -> &'static str {
        self.0
    }

    fn process(&self, _id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let mut seen = data.get(&SEEN).cloned().unwrap_or_default();
        seen.push(self.0.to_string());
        Ok(data.with(&SEEN, seen))
    }
}

#[test]
fn test_unit_hooks_run_before_host_hooks() {
    let mut parser = FixtureParser::new();
    let code = "<?php class User {}";
    parser.register(code, file([class("User").statement()]));
    let mut locator = MemoryLocator::new();
    locator.add_with_hooks(
        "src/User.php",
        code,
        [DeclId::class("User")],
        vec![Arc::new(Recorder("unit"))],
    );
    let session = Session::builder(parser)
        .locator(locator)
        .hook(Recorder("host"))
        .build();

    let names = session.hook_names();
    assert_eq!(&names[names.len() - 3..], &["unit", "host", "cleanup"]);

    let user = session.reflect(&DeclId::class("User")).unwrap();
    assert_eq!(
        user.get(&SEEN),
        Some(&vec!["unit".to_string(), "host".to_string()])
    );
}

// =============================================================================
// Caching
// =============================================================================

#[test]
fn test_sessions_share_the_external_cache() {
    let cache = Arc::new(InMemoryCache::new());
    let first = user_fixture().builder().cache(cache.clone()).build();
    let user = first.reflect(&app_class("User")).unwrap();
    assert!(cache.contains(&first.fingerprint(&app_class("User"))));

    // No parser trees and no locators: only the cache can answer.
    let second = Session::builder(FixtureParser::new()).cache(cache.clone()).build();
    assert_eq!(second.reflect(&app_class("User")).unwrap(), user);
    assert_eq!(second.state(&app_class("User")), ResolutionState::Cached);
}

#[test]
fn test_supertypes_are_written_to_the_cache_too() {
    let cache = Arc::new(InMemoryCache::new());
    let session = generics_fixture().builder().cache(cache.clone()).build();
    session.reflect(&app_class("IntBox")).unwrap();
    for name in ["IntBox", "Box", "Collection"] {
        assert!(cache.contains(&session.fingerprint(&app_class(name))));
    }
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_sessions_with_other_options_do_not_share_entries() {
    let cache = Arc::new(InMemoryCache::new());
    let documented = user_fixture().builder().cache(cache.clone()).build();
    documented.reflect(&app_class("User")).unwrap();

    let plain = ReflectorOptions {
        doc_comments: false,
        ..ReflectorOptions::default()
    };
    let calls = Rc::new(Cell::new(0));
    let fixture = user_fixture();
    let undocumented = Session::builder(fixture.parser)
        .locator(Counting {
            inner: fixture.locator,
            calls: Rc::clone(&calls),
        })
        .cache(cache.clone())
        .options(plain)
        .build();
    assert_ne!(
        undocumented.fingerprint(&app_class("User")),
        documented.fingerprint(&app_class("User"))
    );

    let user = undocumented.reflect(&app_class("User")).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(cache.len(), 2);
    assert!(cache.contains(&undocumented.fingerprint(&app_class("User"))));
    let age = data::member(&user, &data::PROPERTIES, "age").unwrap();
    assert_eq!(age.get(&data::TYPE).resolved(), Some(&Type::Int));
}

#[test]
fn test_changed_files_are_reflected_again() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("User.php");
    let v1 = "<?php class User {}";
    let v2 = "<?php final class User {}";
    std::fs::write(&path, v1).unwrap();
    let cache = Arc::new(InMemoryCache::new());

    let session = |tree: Option<(&str, SourceFile)>| {
        let mut parser = FixtureParser::new();
        if let Some((code, tree)) = tree {
            parser.register(code, tree);
        }
        let mut locator = FileLocator::new();
        locator.add(&path, [DeclId::class("User")]);
        Session::builder(parser).locator(locator).cache(cache.clone()).build()
    };

    let first = session(Some((v1, file([class("User").statement()]))))
        .reflect(&DeclId::class("User"))
        .unwrap();
    assert!(!*first.get(&data::NATIVE_FINAL));
    assert!(first.contains(&data::CHANGE_DETECTOR));

    // Unchanged: served from the cache without parsing.
    let cached = session(None).reflect(&DeclId::class("User")).unwrap();
    assert_eq!(cached, first);

    std::fs::write(&path, v2).unwrap();
    let fresh = session(Some((v2, file([class("User").final_().statement()]))))
        .reflect(&DeclId::class("User"))
        .unwrap();
    assert!(*fresh.get(&data::NATIVE_FINAL));
}

#[test]
fn test_options_are_exposed() {
    let options = ReflectorOptions {
        doc_comments: false,
        ..ReflectorOptions::default()
    };
    let session = user_fixture().builder().options(options.clone()).build();
    assert_eq!(session.options(), &options);
    assert!(!session.hook_names().contains(&"doc_overlay"));

    let age = session
        .reflect(&DeclId::property(&ClassId::named("App\\User"), "age"))
        .unwrap();
    assert!(age.get(&data::TYPE).annotated().is_none());
}

#[test]
fn test_log_format_names() {
    use crate::tracing_config::LogFormat;
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::parse("text"), LogFormat::Text);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("Tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse("yaml"), LogFormat::default());
}
