//! Fixture support for resolver integration tests
//!
//! A fixture is a TOML document describing a host tree together with the
//! metadata attached to it. Names are written out in full instead of as
//! string-table indices, and host methods are given by JVM descriptor:
//!
//! ```toml
//! [[packages]]
//! name = "shop"
//!
//! [[packages.types]]
//! name = "Cart"
//! fields = [{ name = "owner", type = "Ljava/lang/String;" }]
//! methods = [{ name = "getOwner", descriptor = "()Ljava/lang/String;" }]
//!
//! [packages.types.class]
//! name = "shop/Cart"
//! kind = "Class"
//! properties = [{ name = "owner", type = "kotlin/String", field = "Ljava/lang/String;", getter = "getOwner()Ljava/lang/String;" }]
//! ```
//!
//! Every declaration is reachable by a path:
//!
//! | declaration       | path                                   |
//! |-------------------|----------------------------------------|
//! | package           | `shop`                                 |
//! | type              | `shop.Cart`, `shop.Cart.Factory`       |
//! | field, constant   | `shop.Cart#owner`                      |
//! | method            | `shop.Cart#add(Ljava/lang/String;I)V`  |
//! | constructor       | `shop.Cart#<init>(Ljava/lang/String;)V`|
//! | parameter         | `<method path>/sku`                    |
//! | type parameter    | `<type or method path><T>`             |
//! | initializer       | `shop.Cart#{init}0`                    |

use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use km_host::{DeclId, DeclKind, DeclTree, HostTree, JvmType};
use km_metadata::{
    ClassDescriptor, ClassKind, ClassMetadata, ConstructorDescriptor, ConstructorKind,
    FunctionDescriptor, FunctionFlags, JvmMethodSignature, Metadata, Modality, PackageDescriptor,
    PackageMetadata, ParameterDescriptor, PropertyDescriptor, PropertyFlags, StringTable,
    TypeParameterDescriptor, TypeRef, Visibility,
};
use km_resolve::{ElementId, ElementResolver, SemanticElement};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Route resolver logs to the test harness; honours `RUST_LOG`
pub fn init_tracing() {
    drop(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init(),
    );
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
    #[serde(default)]
    packages: Vec<PackageFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageFixture {
    name: String,
    #[serde(default)]
    types: Vec<TypeFixture>,
}

#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum HostKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl From<HostKind> for DeclKind {
    fn from(kind: HostKind) -> Self {
        match kind {
            HostKind::Class => Self::Class,
            HostKind::Interface => Self::Interface,
            HostKind::Enum => Self::Enum,
            HostKind::Annotation => Self::AnnotationType,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeFixture {
    name: String,
    #[serde(default)]
    kind: HostKind,
    #[serde(default)]
    type_params: Vec<String>,
    #[serde(default)]
    fields: Vec<FieldFixture>,
    #[serde(default)]
    enum_constants: Vec<String>,
    #[serde(default)]
    constructors: Vec<ExecutableFixture>,
    #[serde(default)]
    methods: Vec<ExecutableFixture>,
    #[serde(default)]
    initializers: usize,
    #[serde(default)]
    types: Vec<TypeFixture>,
    #[serde(default)]
    class: Option<ClassFixture>,
    #[serde(default)]
    facade: Option<FacadeFixture>,
    #[serde(default)]
    synthetic: bool,
    #[serde(default)]
    multifile_parts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldFixture {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExecutableFixture {
    #[serde(default)]
    name: Option<String>,
    descriptor: String,
    #[serde(default)]
    params: Vec<String>,
    #[serde(default)]
    type_params: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassFixture {
    name: String,
    kind: ClassKind,
    #[serde(default)]
    companion: Option<String>,
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    type_params: Vec<String>,
    #[serde(default)]
    constructors: Vec<ConstructorFixture>,
    #[serde(default)]
    functions: Vec<FunctionFixture>,
    #[serde(default)]
    properties: Vec<PropertyFixture>,
    #[serde(default)]
    enum_entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FacadeFixture {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    functions: Vec<FunctionFixture>,
    #[serde(default)]
    properties: Vec<PropertyFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamFixture {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    default: bool,
    #[serde(default)]
    vararg: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstructorFixture {
    #[serde(default)]
    secondary: bool,
    #[serde(default)]
    params: Vec<ParamFixture>,
    #[serde(default)]
    jvm: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FunctionFixture {
    name: String,
    returns: String,
    #[serde(default)]
    params: Vec<ParamFixture>,
    #[serde(default)]
    type_params: Vec<String>,
    #[serde(default)]
    receiver: Option<String>,
    #[serde(default)]
    suspend: bool,
    #[serde(default)]
    modality: Modality,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    jvm: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertyFixture {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    var: bool,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    receiver: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    field_name: Option<String>,
    #[serde(default)]
    getter: Option<String>,
    #[serde(default)]
    setter: Option<String>,
    #[serde(default)]
    holder: Option<String>,
}

/// A loaded fixture: the host tree and a path for every declaration
#[derive(Debug)]
pub struct Fixture {
    /// The host tree with metadata attached
    pub tree: DeclTree,
    decls: IndexMap<String, DeclId>,
}

impl Fixture {
    /// Parse fixture TOML
    pub fn parse(text: &str) -> Result<Self> {
        let file: FixtureFile = toml::from_str(text).context("invalid fixture")?;
        let mut loader = Loader::default();
        for package in &file.packages {
            let decl = loader.tree.add_package(&package.name);
            loader.record(package.name.clone(), decl)?;
            for ty in &package.types {
                loader.add_type(decl, &package.name, ty)?;
            }
        }
        Ok(Self {
            tree: loader.tree,
            decls: loader.decls,
        })
    }

    /// Declaration at a fixture path
    pub fn decl(&self, path: &str) -> Result<DeclId> {
        self.decls
            .get(path)
            .copied()
            .ok_or_else(|| anyhow!("no declaration at fixture path `{path}`"))
    }

    /// Every path with its declaration, in creation order
    pub fn paths(&self) -> impl Iterator<Item = (&str, DeclId)> + '_ {
        self.decls.iter().map(|(path, &decl)| (path.as_str(), decl))
    }
}

#[derive(Default)]
struct Loader {
    tree: DeclTree,
    decls: IndexMap<String, DeclId>,
}

impl Loader {
    fn record(&mut self, path: String, decl: DeclId) -> Result<()> {
        if self.decls.insert(path.clone(), decl).is_some() {
            bail!("duplicate fixture path `{path}`");
        }
        Ok(())
    }

    fn add_type(&mut self, enclosing: DeclId, prefix: &str, fixture: &TypeFixture) -> Result<()> {
        let path = if prefix.is_empty() {
            fixture.name.clone()
        } else {
            format!("{prefix}.{}", fixture.name)
        };
        let decl = self
            .tree
            .add_type(enclosing, fixture.kind.into(), &fixture.name);
        self.record(path.clone(), decl)?;

        for name in &fixture.type_params {
            let param = self.tree.add_type_parameter(decl, name);
            self.record(format!("{path}<{name}>"), param)?;
        }
        for field in &fixture.fields {
            let ty = JvmType::parse(&field.ty).with_context(|| format!("field {path}#{}", field.name))?;
            let id = self.tree.add_field(decl, &field.name, ty);
            self.record(format!("{path}#{}", field.name), id)?;
        }
        for name in &fixture.enum_constants {
            let id = self.tree.add(
                Some(decl),
                DeclKind::EnumConstant,
                name,
                Some(JvmType::object(&path.replace('.', "/"))),
            );
            self.record(format!("{path}#{name}"), id)?;
        }
        for ctor in &fixture.constructors {
            self.add_executable(decl, &path, DeclKind::Constructor, ctor)?;
        }
        for method in &fixture.methods {
            self.add_executable(decl, &path, DeclKind::Method, method)?;
        }
        for position in 0..fixture.initializers {
            let id = self.tree.add(Some(decl), DeclKind::InstanceInit, "", None);
            self.record(format!("{path}#{{init}}{position}"), id)?;
        }
        for nested in &fixture.types {
            self.add_type(decl, &path, nested)?;
        }

        let metadata = metadata_of(fixture).with_context(|| format!("metadata of {path}"))?;
        if let Some(metadata) = metadata
            && !self.tree.attach_metadata(decl, metadata)
        {
            bail!("{path} is not part of the fixture tree");
        }
        Ok(())
    }

    fn add_executable(
        &mut self,
        owner: DeclId,
        owner_path: &str,
        kind: DeclKind,
        fixture: &ExecutableFixture,
    ) -> Result<()> {
        let (params, returns) = JvmType::parse_method(&fixture.descriptor)
            .with_context(|| format!("member of {owner_path}"))?;
        if params.len() != fixture.params.len() {
            bail!(
                "{owner_path}: descriptor {} has {} parameters but {} names are given",
                fixture.descriptor,
                params.len(),
                fixture.params.len()
            );
        }

        let (decl, name) = match kind {
            DeclKind::Constructor => (self.tree.add_constructor(owner), "<init>"),
            _ => {
                let name = fixture
                    .name
                    .as_deref()
                    .ok_or_else(|| anyhow!("{owner_path}: method without a name"))?;
                (self.tree.add_method(owner, name, returns), name)
            }
        };
        let path = format!("{owner_path}#{name}{}", fixture.descriptor);
        self.record(path.clone(), decl)?;

        for type_param in &fixture.type_params {
            let id = self.tree.add_type_parameter(decl, type_param);
            self.record(format!("{path}<{type_param}>"), id)?;
        }
        for (param_name, ty) in fixture.params.iter().zip(params) {
            let id = self.tree.add_parameter(decl, param_name, ty);
            self.record(format!("{path}/{param_name}"), id)?;
        }
        Ok(())
    }
}

fn metadata_of(fixture: &TypeFixture) -> Result<Option<Metadata>> {
    if let Some(class) = &fixture.class {
        return MetadataBuilder::default().class(class).map(Some);
    }
    if let Some(facade) = &fixture.facade {
        return MetadataBuilder::default().facade(facade).map(Some);
    }
    if !fixture.multifile_parts.is_empty() {
        return Ok(Some(Metadata::MultiFileClassFacade {
            parts: fixture.multifile_parts.clone(),
        }));
    }
    Ok(fixture.synthetic.then_some(Metadata::SyntheticClass))
}

/// Converts name-based fixtures into descriptors over one string table
#[derive(Default)]
struct MetadataBuilder {
    strings: StringTable,
    scope: Vec<(String, u32)>,
    next_type_param: u32,
}

impl MetadataBuilder {
    fn class(mut self, fixture: &ClassFixture) -> Result<Metadata> {
        let fq_name = self.strings.intern(&fixture.name)?;
        let mut class = ClassDescriptor::new(fq_name, fixture.kind);
        class.type_parameters = self.type_params(&fixture.type_params)?;
        if let Some(companion) = &fixture.companion {
            class.companion_object_name = Some(self.strings.intern(companion)?);
        }
        if let Some(module) = &fixture.module {
            class.module_name = Some(self.strings.intern(module)?);
        }
        for ctor in &fixture.constructors {
            class.constructors.push(self.constructor(ctor)?);
        }
        for function in &fixture.functions {
            class.functions.push(self.function(function)?);
        }
        for property in &fixture.properties {
            class.properties.push(self.property(property)?);
        }
        for entry in &fixture.enum_entries {
            class.enum_entries.push(self.strings.intern(entry)?);
        }
        Ok(Metadata::Class(ClassMetadata {
            strings: self.strings,
            class,
        }))
    }

    fn facade(mut self, fixture: &FacadeFixture) -> Result<Metadata> {
        let mut package = PackageDescriptor::default();
        if let Some(module) = &fixture.module {
            package.module_name = Some(self.strings.intern(module)?);
        }
        for function in &fixture.functions {
            package.functions.push(self.function(function)?);
        }
        for property in &fixture.properties {
            package.properties.push(self.property(property)?);
        }
        Ok(Metadata::FileFacade(PackageMetadata {
            strings: self.strings,
            package,
        }))
    }

    /// `T` or `T : bound`; brings the parameters into scope
    fn type_params(&mut self, list: &[String]) -> Result<Vec<TypeParameterDescriptor>> {
        let mut declared = Vec::with_capacity(list.len());
        for text in list {
            let (name, bound) = match text.split_once(':') {
                Some((name, bound)) => (name.trim(), Some(bound.trim())),
                None => (text.trim(), None),
            };
            let id = self.next_type_param;
            self.next_type_param += 1;
            self.scope.push((name.to_owned(), id));
            declared.push((id, name, bound));
        }

        let mut params = Vec::with_capacity(declared.len());
        for (id, name, bound) in declared {
            let mut param = TypeParameterDescriptor::new(id, self.strings.intern(name)?);
            if let Some(bound) = bound {
                param = param.with_bound(self.ty(bound)?);
            }
            params.push(param);
        }
        Ok(params)
    }

    fn ty(&mut self, text: &str) -> Result<TypeRef> {
        let mut parser = TypeParser { text, pos: 0 };
        let ty = parser.parse(self)?;
        if parser.pos != text.len() {
            bail!("trailing characters in type `{text}`");
        }
        Ok(ty)
    }

    fn classifier(&mut self, name: &str) -> Result<TypeRef> {
        Ok(match self.scope.iter().rev().find(|(scoped, _)| scoped == name) {
            Some(&(_, id)) => TypeRef::type_parameter(id),
            None => TypeRef::class(self.strings.intern(name)?),
        })
    }

    fn method_signature(&mut self, text: &str) -> Result<JvmMethodSignature> {
        let split = text
            .find('(')
            .ok_or_else(|| anyhow!("`{text}` is not a JVM method signature"))?;
        let (name, desc) = text.split_at(split);
        Ok(JvmMethodSignature {
            name: self.strings.intern(name)?,
            desc: self.strings.intern(desc)?,
        })
    }

    fn param(&mut self, fixture: &ParamFixture) -> Result<ParameterDescriptor> {
        let mut param = ParameterDescriptor::new(self.strings.intern(&fixture.name)?, self.ty(&fixture.ty)?);
        param.declares_default = fixture.default;
        if let Some(element) = &fixture.vararg {
            param.vararg_element = Some(self.ty(element)?);
        }
        Ok(param)
    }

    fn constructor(&mut self, fixture: &ConstructorFixture) -> Result<ConstructorDescriptor> {
        let kind = if fixture.secondary {
            ConstructorKind::Secondary
        } else {
            ConstructorKind::Primary
        };
        let mut ctor = ConstructorDescriptor::new(kind);
        for param in &fixture.params {
            ctor.value_parameters.push(self.param(param)?);
        }
        if let Some(jvm) = &fixture.jvm {
            ctor.jvm_signature = Some(self.method_signature(jvm)?);
        }
        Ok(ctor)
    }

    fn function(&mut self, fixture: &FunctionFixture) -> Result<FunctionDescriptor> {
        let scope_len = self.scope.len();
        let type_parameters = self.type_params(&fixture.type_params)?;
        let returns = self.ty(&fixture.returns)?;
        let mut function = FunctionDescriptor::new(self.strings.intern(&fixture.name)?, returns)
            .with_modality(fixture.modality)
            .with_visibility(fixture.visibility);
        function.type_parameters = type_parameters;
        if let Some(receiver) = &fixture.receiver {
            function.receiver = Some(self.ty(receiver)?);
        }
        for param in &fixture.params {
            function.value_parameters.push(self.param(param)?);
        }
        if fixture.suspend {
            function.flags |= FunctionFlags::SUSPEND;
        }
        if let Some(jvm) = &fixture.jvm {
            function.jvm_signature = Some(self.method_signature(jvm)?);
        }
        self.scope.truncate(scope_len);
        Ok(function)
    }

    fn property(&mut self, fixture: &PropertyFixture) -> Result<PropertyDescriptor> {
        let mut property = PropertyDescriptor::new(self.strings.intern(&fixture.name)?, self.ty(&fixture.ty)?);
        property.visibility = fixture.visibility;
        if fixture.var {
            property.flags |= PropertyFlags::VAR;
        }
        if let Some(receiver) = &fixture.receiver {
            property.receiver = Some(self.ty(receiver)?);
        }
        if let Some(field) = &fixture.field {
            property = property.with_field(self.strings.intern(field)?);
        }
        if let (Some(name), Some(field)) = (&fixture.field_name, property.jvm.field.as_mut()) {
            field.name = Some(self.strings.intern(name)?);
        }
        if let Some(getter) = &fixture.getter {
            property.jvm.getter = Some(self.method_signature(getter)?);
        }
        if let Some(setter) = &fixture.setter {
            property.jvm.setter = Some(self.method_signature(setter)?);
        }
        if let Some(holder) = &fixture.holder {
            property.jvm.synthetic_method = Some(self.method_signature(holder)?);
        }
        Ok(property)
    }
}

/// `name`, `name?`, `name<arg, *>`
struct TypeParser<'src> {
    text: &'src str,
    pos: usize,
}

impl TypeParser<'_> {
    fn parse(&mut self, builder: &mut MetadataBuilder) -> Result<TypeRef> {
        self.skip_spaces();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| !matches!(ch, '<' | '>' | ',' | '?' | ' '))
        {
            self.pos += 1;
        }
        let name = &self.text[start..self.pos];
        if name.is_empty() {
            bail!("expected a type name in `{}`", self.text);
        }
        let mut ty = builder.classifier(name)?;

        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                self.skip_spaces();
                if self.peek() == Some('*') {
                    self.pos += 1;
                    ty = ty.with_star();
                } else {
                    let argument = self.parse(builder)?;
                    ty = ty.with_argument(argument);
                }
                self.skip_spaces();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => bail!("unterminated type arguments in `{}`", self.text),
                }
            }
        }
        if self.peek() == Some('?') {
            self.pos += 1;
            ty = ty.nullable();
        }
        Ok(ty)
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }
}

/// Resolve every declaration of the fixture, in creation order
///
/// Returns the elements for declarations that come from source code.
pub fn resolve_all(
    resolver: &mut ElementResolver<'_, DeclTree>,
    fixture: &Fixture,
) -> Result<Vec<(DeclId, ElementId)>> {
    let mut resolved = Vec::new();
    for (path, decl) in fixture.paths() {
        if let Some(id) = resolver
            .resolve(decl)
            .with_context(|| format!("resolving `{path}`"))?
        {
            resolved.push((decl, id));
        }
    }
    Ok(resolved)
}

/// Indented outline of an element and its members, for snapshots
pub fn render<T: HostTree + ?Sized>(resolver: &ElementResolver<'_, T>, id: ElementId) -> String {
    let mut lines = Vec::new();
    render_into(resolver, id, 0, &mut lines);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_into<T: HostTree + ?Sized>(
    resolver: &ElementResolver<'_, T>,
    id: ElementId,
    depth: usize,
    lines: &mut Vec<String>,
) {
    let Some(element) = resolver.element(id) else {
        return;
    };
    let line = match element {
        SemanticElement::Package(package) => format!("package {}", package.name),
        SemanticElement::Type(ty) => format!("{:?} {}", ty.kind, ty.qualified_name),
        SemanticElement::FileFacade(facade) => format!("facade {}", facade.qualified_name),
        SemanticElement::Function(function) if function.overloads.is_empty() => {
            format!("fun {}", function.signature)
        }
        SemanticElement::Function(function) => format!(
            "fun {} +{} overloads",
            function.signature,
            function.overloads.len()
        ),
        SemanticElement::Constructor(ctor) => format!(
            "{} {}",
            if ctor.is_primary() { "primary" } else { "secondary" },
            ctor.signature
        ),
        SemanticElement::Property(property) => {
            let roles: Vec<&str> = [
                ("field", property.field),
                ("getter", property.getter),
                ("setter", property.setter),
                ("holder", property.annotation_holder),
            ]
            .into_iter()
            .filter_map(|(role, decl)| decl.map(|_| role))
            .collect();
            format!(
                "{} {} [{}]",
                if property.is_mutable() { "var" } else { "val" },
                property.name,
                roles.join(", ")
            )
        }
        SemanticElement::Parameter(param) if param.has_default => {
            format!("param {} = default", param.name)
        }
        SemanticElement::Parameter(param) => format!("param {}", param.name),
        SemanticElement::TypeParameter(param) => format!("type param {}", param.name),
        SemanticElement::EnumEntry(entry) => format!("entry {} #{}", entry.name, entry.ordinal),
        SemanticElement::Implicit(implicit) => {
            format!("implicit {:?} {}", implicit.kind, implicit.name)
        }
    };
    lines.push(format!("{}{line}", "  ".repeat(depth)));

    let children: Vec<ElementId> = match element {
        SemanticElement::Type(ty) => ty
            .type_parameters
            .iter()
            .chain(&ty.constructors)
            .chain(&ty.functions)
            .chain(&ty.properties)
            .chain(&ty.enum_entries)
            .copied()
            .collect(),
        SemanticElement::FileFacade(facade) => {
            facade.functions.iter().chain(&facade.properties).copied().collect()
        }
        SemanticElement::Function(function) => function
            .type_parameters
            .iter()
            .chain(&function.parameters)
            .copied()
            .collect(),
        SemanticElement::Constructor(ctor) => ctor.parameters.clone(),
        _ => Vec::new(),
    };
    for child in children {
        render_into(resolver, child, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_metadata::Classifier;

    #[test]
    fn test_type_strings() {
        let mut builder = MetadataBuilder::default();
        builder.type_params(&["T".to_owned()]).unwrap();

        let map = builder.ty("kotlin/collections/Map<kotlin/String, T?>?").unwrap();
        assert!(map.nullable);
        assert_eq!(map.arguments.len(), 2);
        let value = map.arguments[1].ty.as_ref().unwrap();
        assert_eq!(value.classifier, Classifier::TypeParameter(0));
        assert!(value.nullable);

        let star = builder.ty("kotlin/collections/List<*>").unwrap();
        assert!(star.arguments[0].ty.is_none());

        let unterminated = builder.ty("kotlin/Array<kotlin/Int").unwrap_err();
        assert!(unterminated.to_string().contains("unterminated"), "{unterminated}");
        let empty = builder.ty("").unwrap_err();
        assert!(empty.to_string().contains("expected a type name"), "{empty}");
    }

    #[test]
    fn test_paths() {
        let fixture = Fixture::parse(
            r#"
            [[packages]]
            name = "p"

            [[packages.types]]
            name = "C"
            type_params = ["E"]
            constructors = [{ descriptor = "(I)V", params = ["x"] }]
            methods = [{ name = "m", descriptor = "()V" }]
            "#,
        )
        .unwrap();

        let paths: Vec<&str> = fixture.paths().map(|(path, _)| path).collect();
        assert_eq!(paths, ["p", "p.C", "p.C<E>", "p.C#<init>(I)V", "p.C#<init>(I)V/x", "p.C#m()V"]);
        let ctor = fixture.decl("p.C#<init>(I)V").unwrap();
        assert_eq!(fixture.tree.kind(ctor), DeclKind::Constructor);
        let missing = fixture.decl("p.D").unwrap_err();
        assert!(missing.to_string().contains("p.D"), "{missing}");
    }

    #[test]
    fn test_rejects_mismatched_parameter_names() {
        let err = Fixture::parse(
            r#"
            [[packages]]
            name = "p"

            [[packages.types]]
            name = "C"
            methods = [{ name = "m", descriptor = "(IJ)V", params = ["x"] }]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("2 parameters"), "{err}");
    }
}
