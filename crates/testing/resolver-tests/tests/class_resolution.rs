//! Resolution of source classes, their members and their companions

use expect_test::expect;
use km_host::HostTree;
use km_resolve::{ElementResolver, ImplicitKind, SemanticElement};
use resolver_tests::{Fixture, init_tracing, render, resolve_all};

fn shop() -> Fixture {
    init_tracing();
    Fixture::parse(include_str!("fixtures/shop.toml")).expect("shop fixture should load")
}

#[test]
fn test_cart_outline() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let cart = resolver
        .resolve(fixture.decl("shop.Cart").unwrap())
        .unwrap()
        .expect("Cart comes from source");

    expect![[r#"
        Class shop.Cart
          primary <init>(Ljava/lang/String;)V
            param owner
          secondary <init>()V
          fun add(Ljava/lang/String;I)V +1 overloads
            param sku
            param qty = default
          fun total()J
          fun pick(Ljava/util/List;)Ljava/lang/Object;
            type param T
            param items
          val owner [field, getter]
          var count [field, getter, setter]
    "#]]
    .assert_eq(&render(&resolver, cart));
}

#[test]
fn test_primary_constructor_is_listed_first() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let cart = resolver.resolve(fixture.decl("shop.Cart").unwrap()).unwrap().unwrap();

    let primary = resolver.primary_constructor(cart).expect("Cart has a primary constructor");
    let from_host = resolver
        .resolve(fixture.decl("shop.Cart#<init>(Ljava/lang/String;)V").unwrap())
        .unwrap();
    assert_eq!(from_host, Some(primary));

    // Declared first on the host, but secondary
    let secondary = resolver
        .resolve(fixture.decl("shop.Cart#<init>()V").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolver.secondary_constructors(cart), vec![secondary]);
    assert_eq!(resolver.constructors(cart), &[primary, secondary]);
}

#[test]
fn test_defaulted_parameter_overload_shares_the_function() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let full = fixture.decl("shop.Cart#add(Ljava/lang/String;I)V").unwrap();
    let short = fixture.decl("shop.Cart#add(Ljava/lang/String;)V").unwrap();

    let add = resolver.resolve(short).unwrap().unwrap();
    assert_eq!(resolver.resolve(full).unwrap(), Some(add));

    let function = resolver.element(add).and_then(SemanticElement::as_function).unwrap();
    assert_eq!(function.host, full);
    assert_eq!(function.overloads, vec![short]);

    // Both `sku` parameters are one element
    let sku = resolver
        .resolve(fixture.decl("shop.Cart#add(Ljava/lang/String;I)V/sku").unwrap())
        .unwrap();
    let short_sku = resolver
        .resolve(fixture.decl("shop.Cart#add(Ljava/lang/String;)V/sku").unwrap())
        .unwrap();
    assert_eq!(sku, short_sku);

    let qty = resolver
        .resolve(fixture.decl("shop.Cart#add(Ljava/lang/String;I)V/qty").unwrap())
        .unwrap()
        .unwrap();
    let SemanticElement::Parameter(qty) = resolver.element(qty).unwrap() else {
        panic!("qty should be a parameter");
    };
    assert!(qty.has_default);
    assert_eq!(qty.position, 1);
    assert!(qty.overload_hosts.is_empty());
}

#[test]
fn test_default_stub_is_synthetic() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let stub_path = "shop.Cart#add$default(Lshop/Cart;Ljava/lang/String;IILjava/lang/Object;)V";

    let stub = resolver.resolve(fixture.decl(stub_path).unwrap()).unwrap().unwrap();
    let implicit = resolver.element(stub).and_then(SemanticElement::as_implicit).unwrap();
    assert_eq!(implicit.kind, ImplicitKind::SyntheticMember);
    assert_eq!(implicit.name, "add$default");

    let mask = resolver
        .resolve(fixture.decl(&format!("{stub_path}/mask")).unwrap())
        .unwrap()
        .unwrap();
    let mask = resolver.element(mask).and_then(SemanticElement::as_implicit).unwrap();
    assert_eq!(mask.kind, ImplicitKind::SyntheticParameter);
    assert_eq!(mask.owner, Some(stub));
}

#[test]
fn test_accessors_resolve_to_their_property() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);

    let field = resolver.resolve(fixture.decl("shop.Cart#count").unwrap()).unwrap();
    let getter = resolver.resolve(fixture.decl("shop.Cart#getCount()I").unwrap()).unwrap();
    let setter = resolver.resolve(fixture.decl("shop.Cart#setCount(I)V").unwrap()).unwrap();
    assert_eq!(field, getter);
    assert_eq!(getter, setter);

    let count = resolver
        .element(setter.unwrap())
        .and_then(SemanticElement::as_property)
        .unwrap();
    assert!(count.is_mutable());
    assert_eq!(count.hosts().count(), 3);

    // Setter parameters have no descriptor of their own
    let value = resolver
        .resolve(fixture.decl("shop.Cart#setCount(I)V/value").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(
        resolver.element(value).and_then(SemanticElement::as_implicit).map(|value| value.kind),
        Some(ImplicitKind::SyntheticParameter)
    );
}

#[test]
fn test_companion_is_resolved_lazily() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let cart = resolver.resolve(fixture.decl("shop.Cart").unwrap()).unwrap().unwrap();
    let factory = fixture.decl("shop.Cart.Factory").unwrap();
    assert_eq!(resolver.cache().get(factory), None);

    let companion = resolver.companion(cart).unwrap().expect("Cart declares a companion");
    assert_eq!(resolver.resolve(factory).unwrap(), Some(companion));
    assert_eq!(resolver.companion(cart).unwrap(), Some(companion));

    let ty = resolver.element(companion).and_then(SemanticElement::as_type).unwrap();
    assert!(ty.is_companion());
    assert_eq!(ty.qualified_name, "shop.Cart.Factory");
    assert_eq!(resolver.enclosing_element(companion).unwrap(), Some(cart));

    let shelf = resolver.resolve(fixture.decl("shop.Shelf").unwrap()).unwrap().unwrap();
    assert_eq!(resolver.companion(shelf).unwrap(), None);
}

#[test]
fn test_type_parameters() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);

    let shelf = resolver.resolve(fixture.decl("shop.Shelf").unwrap()).unwrap().unwrap();
    let type_param = resolver.resolve(fixture.decl("shop.Shelf<T>").unwrap()).unwrap().unwrap();
    assert_eq!(resolver.type_parameters(shelf), &[type_param]);
    assert_eq!(resolver.element(type_param).map(SemanticElement::name), Some("T"));
    assert_eq!(resolver.enclosing_element(type_param).unwrap(), Some(shelf));

    let pick_path = "shop.Cart#pick(Ljava/util/List;)Ljava/lang/Object;";
    let pick = resolver.resolve(fixture.decl(pick_path).unwrap()).unwrap().unwrap();
    let own = resolver
        .resolve(fixture.decl(&format!("{pick_path}<T>")).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolver.type_parameters(pick), &[own]);
    assert_ne!(own, type_param);
}

#[test]
fn test_every_declaration_resolves_to_an_element_it_backs() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let resolved = resolve_all(&mut resolver, &fixture).unwrap();

    for &(decl, id) in &resolved {
        let element = resolver.element(id).unwrap();
        assert!(
            element.host_forms().contains(&decl),
            "{} resolved to {} `{}` which does not list it",
            fixture.tree.describe(decl),
            element.kind_name(),
            element.name()
        );
    }

    // Resolving again hands out the same elements without creating new ones
    let created = resolver.cache().len();
    let again = resolve_all(&mut resolver, &fixture).unwrap();
    assert_eq!(again, resolved);
    assert_eq!(resolver.cache().len(), created);
}

#[test]
fn test_foreign_declarations() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let register = fixture.decl("legacy.Register").unwrap();
    let open = fixture.decl("legacy.Register#open()V").unwrap();

    assert_eq!(resolver.resolve(register).unwrap(), None);
    assert_eq!(resolver.resolve(open).unwrap(), None);
    assert!(!resolver.is_source_declaration(open));
    assert!(resolver.is_source_declaration(fixture.decl("shop.Cart#total()J").unwrap()));

    let legacy = resolver.resolve(fixture.decl("legacy").unwrap()).unwrap().unwrap();
    assert!(matches!(resolver.element(legacy), Some(SemanticElement::Package(_))));
}

#[test]
fn test_enclosed_elements_list_each_member_once() {
    let fixture = shop();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let cart = resolver.resolve(fixture.decl("shop.Cart").unwrap()).unwrap().unwrap();

    let names: Vec<String> = resolver
        .enclosed_elements(cart)
        .unwrap()
        .into_iter()
        .map(|id| resolver.element(id).unwrap().name().to_owned())
        .collect();
    assert_eq!(
        names,
        [
            "owner",
            "count",
            "<init>",
            "<init>",
            "add",
            "add$default",
            "total",
            "pick",
            "shop.Cart.Factory",
        ]
    );

    assert!(resolver.is_top_level_element(cart));
    let shop = resolver.enclosing_element(cart).unwrap().unwrap();
    assert_eq!(resolver.element(shop).map(SemanticElement::name), Some("shop"));
    let factory = fixture.decl("shop.Cart.Factory").unwrap();
    assert!(!resolver.is_top_level(factory));
}
