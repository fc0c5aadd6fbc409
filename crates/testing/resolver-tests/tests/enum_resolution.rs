//! Enum and annotation classes

use km_resolve::{ElementResolver, ImplicitKind, ResolveError, SemanticElement};
use resolver_tests::{Fixture, init_tracing};

fn palette() -> Fixture {
    init_tracing();
    Fixture::parse(include_str!("fixtures/palette.toml")).expect("palette fixture should load")
}

#[test]
fn test_enum_constructor_drops_name_and_ordinal() {
    let fixture = palette();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let color = resolver.resolve(fixture.decl("palette.Color").unwrap()).unwrap().unwrap();

    let ctor = resolver.primary_constructor(color).expect("enum has a primary constructor");
    let ctor = resolver.element(ctor).and_then(SemanticElement::as_constructor).unwrap();
    assert_eq!(ctor.signature, "<init>(I)V");
    assert_eq!(ctor.host, fixture.decl("palette.Color#<init>(I)V").unwrap());
    assert_eq!(ctor.parameters.len(), 1);
}

#[test]
fn test_recorded_enum_constructor_signature() {
    let fixture = palette();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let tone = resolver.resolve(fixture.decl("palette.Tone").unwrap()).unwrap().unwrap();

    let level = resolver
        .resolve(fixture.decl("palette.Tone#<init>(J)V/level").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolver.element(level).map(SemanticElement::name), Some("level"));
    assert_eq!(resolver.constructors(tone).len(), 1);
}

#[test]
fn test_recorded_signature_without_enum_prefix_is_rejected() {
    let fixture = palette();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let shade = fixture.decl("palette.Shade").unwrap();

    let err = resolver.resolve(shade).unwrap_err();
    let ResolveError::EnumConstructorPrefix { signature, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(signature, "<init>(I)V");
    assert_eq!(resolver.cache().get(shade), None);

    // Other types of the unit are unaffected
    assert!(resolver.resolve(fixture.decl("palette.Color").unwrap()).unwrap().is_some());
}

#[test]
fn test_enum_entries_keep_their_order() {
    let fixture = palette();
    let mut resolver = ElementResolver::new(&fixture.tree);

    let green = resolver
        .resolve(fixture.decl("palette.Color#GREEN").unwrap())
        .unwrap()
        .unwrap();
    let red = resolver
        .resolve(fixture.decl("palette.Color#RED").unwrap())
        .unwrap()
        .unwrap();

    let ordinal = |id| match resolver.element(id) {
        Some(SemanticElement::EnumEntry(entry)) => Some(entry.ordinal),
        _ => None,
    };
    assert_eq!(ordinal(red), Some(0));
    assert_eq!(ordinal(green), Some(1));

    let color = resolver.resolve(fixture.decl("palette.Color").unwrap()).unwrap().unwrap();
    let ty = resolver.element(color).and_then(SemanticElement::as_type).unwrap();
    assert_eq!(ty.enum_entries, vec![red, green]);
}

#[test]
fn test_generated_enum_methods_are_synthetic() {
    let fixture = palette();
    let mut resolver = ElementResolver::new(&fixture.tree);

    for path in [
        "palette.Color#values()[Lpalette/Color;",
        "palette.Color#valueOf(Ljava/lang/String;)Lpalette/Color;",
    ] {
        let id = resolver.resolve(fixture.decl(path).unwrap()).unwrap().unwrap();
        let implicit = resolver.element(id).and_then(SemanticElement::as_implicit).unwrap();
        assert_eq!(implicit.kind, ImplicitKind::SyntheticMember, "{path}");
    }

    let rgb = resolver.resolve(fixture.decl("palette.Color#getRgb()I").unwrap()).unwrap();
    assert_eq!(
        rgb.and_then(|id| resolver.element(id)).map(SemanticElement::kind_name),
        Some("property")
    );
}

#[test]
fn test_annotation_class_has_no_constructors() {
    let fixture = palette();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let swatch = resolver.resolve(fixture.decl("palette.Swatch").unwrap()).unwrap().unwrap();

    assert!(resolver.constructors(swatch).is_empty());
    assert_eq!(resolver.primary_constructor(swatch), None);

    let value = resolver
        .resolve(fixture.decl("palette.Swatch#value()Ljava/lang/String;").unwrap())
        .unwrap()
        .unwrap();
    let property = resolver.element(value).and_then(SemanticElement::as_property).unwrap();
    assert_eq!(property.name, "value");
    assert_eq!(property.field, None);
    assert_eq!(resolver.properties(swatch), &[value]);
}
