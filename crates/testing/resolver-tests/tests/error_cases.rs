//! Inconsistencies between host and metadata are fatal for the affected type

use km_host::JvmType;
use km_resolve::{AccessorRole, ElementResolver, ResolveError, ResolverConfig, SemanticElement};
use resolver_tests::{Fixture, init_tracing};
use std::io::Write as _;

fn errors() -> Fixture {
    init_tracing();
    Fixture::parse(include_str!("fixtures/errors.toml")).expect("errors fixture should load")
}

fn resolve_err(fixture: &Fixture, path: &str) -> ResolveError {
    let mut resolver = ElementResolver::new(&fixture.tree);
    let decl = fixture.decl(path).unwrap();
    let err = resolver.resolve(decl).expect_err("resolution should fail");
    assert_eq!(resolver.cache().get(decl), None, "{path} left a partial result");
    err
}

#[test]
fn test_missing_host_member() {
    let fixture = errors();
    let err = resolve_err(&fixture, "errs.Missing");
    assert_eq!(
        err,
        ResolveError::MissingCorrespondence {
            owner: "errs.Missing".to_owned(),
            descriptor: "run".to_owned(),
            signature: "run()V".to_owned(),
        }
    );
}

#[test]
fn test_ambiguous_host_members() {
    let mut fixture = errors();
    let twice = fixture.decl("errs.Twice").unwrap();
    fixture.tree.add_method(twice, "run", JvmType::Void);

    let ResolveError::AmbiguousCorrespondence { candidates, .. } = resolve_err(&fixture, "errs.Twice")
    else {
        panic!("expected an ambiguity");
    };
    assert_eq!(candidates, ["errs.Twice.run()", "errs.Twice.run()"]);
}

#[test]
fn test_parameter_names_must_agree() {
    let fixture = errors();
    let err = resolve_err(&fixture, "errs.Renamed#move(I)V/distance");
    let ResolveError::ParameterMismatch {
        position,
        host_name,
        descriptor_name,
        ..
    } = err
    else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(position, 0);
    assert_eq!(host_name, "distance");
    assert_eq!(descriptor_name, "steps");
}

#[test]
fn test_parameter_counts_must_agree() {
    let fixture = errors();
    let err = resolve_err(&fixture, "errs.Miscounted");
    assert!(
        matches!(
            err,
            ResolveError::ParameterCountMismatch {
                host_count: 1,
                descriptor_count: 0,
                ..
            }
        ),
        "unexpected error: {err}"
    );
}

#[test]
fn test_qualified_name_check_can_be_disabled() {
    let fixture = errors();
    let moved = fixture.decl("errs.Moved").unwrap();
    assert_eq!(
        resolve_err(&fixture, "errs.Moved"),
        ResolveError::QualifiedNameMismatch {
            host: "errs.Moved".to_owned(),
            descriptor: "errs.Elsewhere".to_owned(),
        }
    );

    let config = ResolverConfig::from_toml_str("check_qualified_names = false").unwrap();
    let mut resolver = ElementResolver::with_config(&fixture.tree, config);
    let id = resolver.resolve(moved).unwrap().unwrap();
    let ty = resolver.element(id).and_then(SemanticElement::as_type).unwrap();
    assert_eq!(ty.qualified_name, "errs.Elsewhere");
}

#[test]
fn test_member_claimed_twice() {
    let fixture = errors();
    let err = resolve_err(&fixture, "errs.Clash#getName()Ljava/lang/String;");
    assert_eq!(
        err,
        ResolveError::DoubleClaim {
            host: "errs.Clash.getName()".to_owned(),
            first: "function `getName`".to_owned(),
            second: "property `name`".to_owned(),
        }
    );
}

#[test]
fn test_property_without_members() {
    let fixture = errors();
    assert!(matches!(
        resolve_err(&fixture, "errs.Ghost"),
        ResolveError::EmptyProperty { property, .. } if property == "ghost"
    ));
}

#[test]
fn test_annotation_holder_does_not_realize_a_property() {
    let fixture = errors();
    let err = resolve_err(&fixture, "errs.Annotated#tagged$annotations()V");
    assert_eq!(
        err,
        ResolveError::EmptyProperty {
            owner: "errs.Annotated".to_owned(),
            property: "tagged".to_owned(),
        }
    );
}

#[test]
fn test_companion_failures() {
    let fixture = errors();
    let mut resolver = ElementResolver::new(&fixture.tree);

    let lonely = resolver.resolve(fixture.decl("errs.Lonely").unwrap()).unwrap().unwrap();
    assert!(matches!(
        resolver.companion(lonely),
        Err(ResolveError::CompanionNotFound { found: 0, .. })
    ));

    let bare = resolver.resolve(fixture.decl("errs.Bare").unwrap()).unwrap().unwrap();
    assert!(matches!(
        resolver.companion(bare),
        Err(ResolveError::CompanionWithoutMetadata { .. })
    ));
    assert!(matches!(
        resolver.resolve(fixture.decl("errs.Bare.Helper").unwrap()),
        Err(ResolveError::MissingDescriptor { .. })
    ));
}

#[test]
fn test_accessor_shape_check_from_config_file() {
    let fixture = errors();
    let err = resolve_err(&fixture, "errs.Toggle");
    assert!(matches!(
        err,
        ResolveError::AccessorShapeMismatch {
            role: AccessorRole::Getter,
            ..
        }
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "verify_accessor_shapes = false").unwrap();
    let config = ResolverConfig::from_file(file.path()).unwrap();
    assert!(config.check_qualified_names);

    let mut resolver = ElementResolver::with_config(&fixture.tree, config);
    let getter = fixture.decl("errs.Toggle#isFlag(Z)V").unwrap();
    let flag = resolver.resolve(getter).unwrap().unwrap();
    let property = resolver.element(flag).and_then(SemanticElement::as_property).unwrap();
    assert_eq!(property.getter, Some(getter));
}

#[test]
fn test_sealed_function() {
    let fixture = errors();
    assert!(matches!(
        resolve_err(&fixture, "errs.Sealed#run()V"),
        ResolveError::SealedFunction { .. }
    ));
}

#[test]
fn test_constructors_without_primary() {
    let fixture = errors();
    assert_eq!(
        resolve_err(&fixture, "errs.Secondary"),
        ResolveError::PrimaryConstructorOrder {
            owner: "errs.Secondary".to_owned(),
            reason: "no primary constructor",
        }
    );
}

#[test]
fn test_initializer_block() {
    let fixture = errors();
    assert!(matches!(
        resolve_err(&fixture, "errs.Initialized#{init}0"),
        ResolveError::InitializerInSourceType { .. }
    ));
}

#[test]
fn test_named_field_signature() {
    let fixture = errors();
    assert!(matches!(
        resolve_err(&fixture, "errs.Aliased#raw"),
        ResolveError::NamedFieldSignature { name, .. } if name == "raw"
    ));
}

#[test]
fn test_type_parameter_names_must_agree() {
    let fixture = errors();
    assert_eq!(
        resolve_err(&fixture, "errs.Keyed<K>"),
        ResolveError::TypeParameterMismatch {
            host: "errs.Keyed".to_owned(),
            position: 0,
            host_name: "K".to_owned(),
            descriptor_name: "T".to_owned(),
        }
    );
}

#[test]
fn test_failures_are_isolated_per_type() {
    let fixture = errors();
    let mut resolver = ElementResolver::new(&fixture.tree);

    let missing = fixture.decl("errs.Missing").unwrap();
    let first = resolver.resolve(missing).unwrap_err();
    assert!(resolver.resolve(fixture.decl("errs.Lonely").unwrap()).unwrap().is_some());
    // Failures are not cached; the same error comes back
    assert_eq!(resolver.resolve(missing).unwrap_err(), first);
}
