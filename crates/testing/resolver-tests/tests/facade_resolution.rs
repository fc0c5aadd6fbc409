//! Top-level declarations and compiler-generated classes

use km_host::DeclTree;
use km_resolve::{
    ElementId, ElementResolver, ImplicitKind, ResolveError, SemanticElement, UnsupportedFeature,
};
use resolver_tests::{Fixture, init_tracing};

fn toplevel() -> Fixture {
    init_tracing();
    Fixture::parse(include_str!("fixtures/toplevel.toml")).expect("toplevel fixture should load")
}

fn implicit_kind(resolver: &ElementResolver<'_, DeclTree>, id: ElementId) -> Option<ImplicitKind> {
    resolver
        .element(id)
        .and_then(SemanticElement::as_implicit)
        .map(|implicit| implicit.kind)
}

#[test]
fn test_file_facade_members() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let facade = resolver.resolve(fixture.decl("util.StringsKt").unwrap()).unwrap().unwrap();

    let Some(SemanticElement::FileFacade(element)) = resolver.element(facade) else {
        panic!("StringsKt should be a file facade");
    };
    assert_eq!(element.qualified_name, "util.StringsKt");
    assert_eq!(element.mangling_suffix, "app_core");

    let names: Vec<&str> = resolver
        .functions(facade)
        .iter()
        .map(|&id| resolver.element(id).unwrap().name())
        .collect();
    assert_eq!(names, ["shout", "fetch", "firstOr", "tally"]);
    assert_eq!(resolver.properties(facade).len(), 2);
    assert!(resolver.is_top_level_element(facade));
    assert!(resolver.is_top_level_element(resolver.properties(facade)[0]));
}

#[test]
fn test_extension_receiver_is_synthetic() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let shout_path = "util.StringsKt#shout(Ljava/lang/String;)Ljava/lang/String;";

    let shout = resolver.resolve(fixture.decl(shout_path).unwrap()).unwrap().unwrap();
    let function = resolver.element(shout).and_then(SemanticElement::as_function).unwrap();
    assert!(function.is_extension);
    assert_eq!(function.implicit_leading(), 1);
    assert!(function.parameters.is_empty());

    let receiver = resolver
        .resolve(fixture.decl(&format!("{shout_path}/$this$shout")).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(implicit_kind(&resolver, receiver), Some(ImplicitKind::SyntheticParameter));
}

#[test]
fn test_suspend_continuation_is_synthetic() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let fetch_path =
        "util.StringsKt#fetch(Ljava/lang/String;Lkotlin/coroutines/Continuation;)Ljava/lang/Object;";

    let fetch = resolver.resolve(fixture.decl(fetch_path).unwrap()).unwrap().unwrap();
    let function = resolver.element(fetch).and_then(SemanticElement::as_function).unwrap();
    assert!(function.is_suspend());
    assert_eq!(function.implicit_trailing(), 1);
    let parameters = function.parameters.clone();

    let url = resolver
        .resolve(fixture.decl(&format!("{fetch_path}/url")).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolver.element(url).and_then(SemanticElement::owner), Some(fetch));
    assert_eq!(parameters, vec![url]);

    let completion = resolver
        .resolve(fixture.decl(&format!("{fetch_path}/$completion")).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(implicit_kind(&resolver, completion), Some(ImplicitKind::SyntheticParameter));
}

#[test]
fn test_internal_function_uses_module_mangling() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let facade = resolver.resolve(fixture.decl("util.StringsKt").unwrap()).unwrap().unwrap();

    let mangler = resolver.mangler(facade).expect("facades carry a mangler");
    assert_eq!(mangler.mangle("tally"), "tally$app_core");

    let tally = resolver
        .resolve(fixture.decl("util.StringsKt#tally$app_core()I").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolver.element(tally).map(SemanticElement::name), Some("tally"));
}

#[test]
fn test_top_level_property_members() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);

    let greeting = resolver
        .resolve(fixture.decl("util.StringsKt#getGreeting$annotations()V").unwrap())
        .unwrap()
        .unwrap();
    let property = resolver.element(greeting).and_then(SemanticElement::as_property).unwrap();
    assert_eq!(property.field, Some(fixture.decl("util.StringsKt#greeting").unwrap()));
    assert_eq!(
        property.setter,
        Some(fixture.decl("util.StringsKt#setGreeting(Ljava/lang/String;)V").unwrap())
    );
    assert_eq!(property.hosts().count(), 4);

    let size = resolver
        .resolve(fixture.decl("util.StringsKt#getSize(Ljava/lang/String;)I").unwrap())
        .unwrap()
        .unwrap();
    let property = resolver.element(size).and_then(SemanticElement::as_property).unwrap();
    assert!(property.is_extension);
    assert_eq!(property.field, None);
}

#[test]
fn test_generic_top_level_function() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let path = "util.StringsKt#firstOr(Ljava/util/List;Ljava/lang/Object;)Ljava/lang/Object;";

    let first_or = resolver.resolve(fixture.decl(path).unwrap()).unwrap().unwrap();
    let type_param = resolver
        .resolve(fixture.decl(&format!("{path}<T>")).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolver.type_parameters(first_or), &[type_param]);
    assert_eq!(resolver.enclosed_elements(first_or).unwrap().len(), 2);
}

#[test]
fn test_default_impls() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let default_impls = fixture.decl("util.Greeter.DefaultImpls").unwrap();
    let body_path = "util.Greeter.DefaultImpls#greet(Lutil/Greeter;Ljava/lang/String;)Ljava/lang/String;";

    let id = resolver.resolve(default_impls).unwrap().unwrap();
    assert_eq!(implicit_kind(&resolver, id), Some(ImplicitKind::DefaultImpls));
    let greeter = resolver.resolve(fixture.decl("util.Greeter").unwrap()).unwrap();
    assert_eq!(resolver.enclosing_element(id).unwrap(), greeter);

    let body = resolver.resolve(fixture.decl(body_path).unwrap()).unwrap().unwrap();
    assert_eq!(implicit_kind(&resolver, body), Some(ImplicitKind::DefaultImplsMember));

    let this = resolver
        .resolve(fixture.decl(&format!("{body_path}/$this")).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(implicit_kind(&resolver, this), Some(ImplicitKind::SyntheticParameter));
}

#[test]
fn test_synthetic_class() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);

    let lambda = resolver
        .resolve(fixture.decl("util.StringsKt$shout$1").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(implicit_kind(&resolver, lambda), Some(ImplicitKind::SyntheticClass));

    let invoke = resolver
        .resolve(fixture.decl("util.StringsKt$shout$1#invoke()V").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(implicit_kind(&resolver, invoke), Some(ImplicitKind::SyntheticMember));
    assert_eq!(resolver.enclosing_element(invoke).unwrap(), Some(lambda));
}

#[test]
fn test_multi_file_facade_is_unsupported() {
    let fixture = toplevel();
    let mut resolver = ElementResolver::new(&fixture.tree);
    let err = resolver
        .resolve(fixture.decl("util.CollectionsKt").unwrap())
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::Unsupported {
            host: "util.CollectionsKt".to_owned(),
            feature: UnsupportedFeature::MultiFileFacade,
        }
    );
}
