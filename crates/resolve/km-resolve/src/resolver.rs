//! The element resolver
//!
//! [`ElementResolver::resolve`] is the single entry point: it maps a host
//! declaration to its semantic element, or to `None` when the declaration
//! does not come from source code. Types are resolved as a whole; members,
//! parameters and type parameters are looked up in the claims their type
//! produced.

use crate::builder::MemberBuilder;
use crate::cache::IdentityCache;
use crate::config::ResolverConfig;
use crate::element::{
    ElementId, FileFacadeElement, ImplicitElement, ImplicitKind, PackageElement, SemanticElement,
    TypeElement,
};
use crate::error::{ResolveError, ResolveResult, UnsupportedFeature};
use crate::index::DescriptorIndex;
use crate::mangle::NameMangler;
use crate::signature::host_signature;
use km_host::{DeclId, DeclKind, HostTree};
use km_metadata::{ClassKind, ClassMetadata, Metadata, PackageMetadata, StrId, StringTable};
use tracing::{debug, trace};

/// Simple name of the class holding interface default method bodies
pub const DEFAULT_IMPLS_NAME: &str = "DefaultImpls";

/// Resolves host declarations of one compiled unit to semantic elements
///
/// The resolver owns the unit's [`IdentityCache`]; create one per unit.
pub struct ElementResolver<'tree, T: HostTree + ?Sized> {
    tree: &'tree T,
    config: ResolverConfig,
    cache: IdentityCache,
}

impl<'tree, T: HostTree + ?Sized> ElementResolver<'tree, T> {
    /// Resolver with the default configuration
    pub fn new(tree: &'tree T) -> Self {
        Self::with_config(tree, ResolverConfig::default())
    }

    /// Resolver with an explicit configuration
    pub fn with_config(tree: &'tree T, config: ResolverConfig) -> Self {
        Self {
            tree,
            config,
            cache: IdentityCache::new(),
        }
    }

    /// The host tree
    pub fn tree(&self) -> &'tree T {
        self.tree
    }

    /// The configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Elements resolved so far
    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Borrow an element
    pub fn element(&self, id: ElementId) -> Option<&SemanticElement> {
        self.cache.element(id)
    }

    /// Map a host declaration to its semantic element
    ///
    /// Returns `Ok(None)` when no declaration on the enclosing chain carries
    /// metadata. Repeated calls return the same id.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve(&mut self, decl: DeclId) -> ResolveResult<Option<ElementId>> {
        if let Some(id) = self.cache.get(decl) {
            return Ok(Some(id));
        }

        let tree = self.tree;
        let kind = tree.kind(decl);
        match kind {
            DeclKind::Package => {
                let element = SemanticElement::Package(PackageElement {
                    host: decl,
                    name: tree.simple_name(decl).to_owned(),
                });
                return Ok(Some(self.cache.insert(decl, element)));
            }
            DeclKind::Module => {
                return Err(ResolveError::Unsupported {
                    host: tree.describe(decl),
                    feature: UnsupportedFeature::Module,
                });
            }
            _ => {}
        }

        if self.metadata_carrier(decl).is_none() {
            trace!("no metadata on the enclosing chain");
            return Ok(None);
        }

        match kind {
            DeclKind::Class | DeclKind::Interface | DeclKind::Enum | DeclKind::AnnotationType => {
                self.resolve_type(decl)
            }
            DeclKind::Method
            | DeclKind::Constructor
            | DeclKind::Field
            | DeclKind::EnumConstant
            | DeclKind::InstanceInit
            | DeclKind::StaticInit => self.resolve_member(decl),
            DeclKind::Parameter => self.resolve_parameter(decl),
            DeclKind::TypeParameter => self.resolve_type_parameter(decl),
            DeclKind::Package
            | DeclKind::Module
            | DeclKind::LocalVariable
            | DeclKind::ResourceVariable
            | DeclKind::ExceptionParameter
            | DeclKind::Other => Err(ResolveError::UnsupportedKind {
                host: tree.describe(decl),
                kind,
            }),
        }
    }

    /// Closest declaration on the enclosing chain (itself included) that carries metadata
    pub fn metadata_carrier(&mut self, decl: DeclId) -> Option<DeclId> {
        if let Some(known) = self.cache.carrier(decl) {
            return known;
        }
        let tree = self.tree;
        let carrier = if tree.metadata(decl).is_some() {
            Some(decl)
        } else {
            tree.enclosing(decl)
                .and_then(|parent| self.metadata_carrier(parent))
        };
        self.cache.remember_carrier(decl, carrier);
        carrier
    }

    /// Whether the declaration comes from source code
    pub fn is_source_declaration(&mut self, decl: DeclId) -> bool {
        self.metadata_carrier(decl).is_some()
    }

    /// Whether `decl` is not nested in a type or function of the source program
    pub fn is_top_level(&self, decl: DeclId) -> bool {
        let tree = self.tree;
        match tree.enclosing(decl) {
            None => true,
            Some(parent) => {
                tree.kind(parent) == DeclKind::Package
                    || tree.metadata(parent).is_some_and(Metadata::is_package_level)
            }
        }
    }

    /// [`Self::is_top_level`] of an element's host declaration
    pub fn is_top_level_element(&self, id: ElementId) -> bool {
        match self.cache.element(id) {
            Some(SemanticElement::Package(_)) => true,
            Some(SemanticElement::Property(property)) => {
                self.cache
                    .element(property.owner)
                    .is_some_and(|owner| matches!(owner, SemanticElement::FileFacade(_)))
            }
            Some(element) => element.host().is_some_and(|host| self.is_top_level(host)),
            None => false,
        }
    }

    /// The element enclosing `id`
    pub fn enclosing_element(&mut self, id: ElementId) -> ResolveResult<Option<ElementId>> {
        let Some(element) = self.cache.element(id) else {
            return Ok(None);
        };
        if let Some(owner) = element.owner() {
            return Ok(Some(owner));
        }
        let tree = self.tree;
        let Some(parent) = element.host().and_then(|host| tree.enclosing(host)) else {
            return Ok(None);
        };
        match self.resolve(parent)? {
            Some(owner) => Ok(Some(owner)),
            None => Err(ResolveError::MissingDescriptor {
                host: tree.describe(parent),
            }),
        }
    }

    /// Elements enclosed by `id`, in host order, each listed once
    ///
    /// Executables list their value parameters. Containers list whatever
    /// their host members resolve to, so a property appears once even when
    /// both its field and getter are members.
    pub fn enclosed_elements(&mut self, id: ElementId) -> ResolveResult<Vec<ElementId>> {
        let host = match self.cache.element(id) {
            Some(element) => {
                if let Some(params) = element.parameters() {
                    return Ok(params.to_vec());
                }
                match element {
                    SemanticElement::Package(_)
                    | SemanticElement::Type(_)
                    | SemanticElement::FileFacade(_)
                    | SemanticElement::Implicit(_) => element.host(),
                    _ => None,
                }
            }
            None => None,
        };
        let Some(host) = host else {
            return Ok(Vec::new());
        };

        let tree = self.tree;
        let mut enclosed = Vec::new();
        for &member in tree.enclosed(host) {
            if let Some(element) = self.resolve(member)? {
                if !enclosed.contains(&element) {
                    enclosed.push(element);
                }
            }
        }
        Ok(enclosed)
    }

    /// Constructors of a type, primary first
    pub fn constructors(&self, id: ElementId) -> &[ElementId] {
        self.type_element(id)
            .map(|ty| ty.constructors.as_slice())
            .unwrap_or_default()
    }

    /// The primary constructor of a type
    pub fn primary_constructor(&self, id: ElementId) -> Option<ElementId> {
        self.constructors(id).first().copied().filter(|&ctor| {
            self.cache
                .element(ctor)
                .and_then(SemanticElement::as_constructor)
                .is_some_and(|ctor| ctor.is_primary())
        })
    }

    /// Secondary constructors of a type, in declaration order
    pub fn secondary_constructors(&self, id: ElementId) -> Vec<ElementId> {
        self.constructors(id)
            .iter()
            .copied()
            .filter(|&ctor| {
                self.cache
                    .element(ctor)
                    .and_then(SemanticElement::as_constructor)
                    .is_some_and(|ctor| !ctor.is_primary())
            })
            .collect()
    }

    /// Functions of a type or file facade
    pub fn functions(&self, id: ElementId) -> &[ElementId] {
        match self.cache.element(id) {
            Some(SemanticElement::Type(ty)) => &ty.functions,
            Some(SemanticElement::FileFacade(facade)) => &facade.functions,
            _ => &[],
        }
    }

    /// Properties of a type or file facade
    pub fn properties(&self, id: ElementId) -> &[ElementId] {
        match self.cache.element(id) {
            Some(SemanticElement::Type(ty)) => &ty.properties,
            Some(SemanticElement::FileFacade(facade)) => &facade.properties,
            _ => &[],
        }
    }

    /// Type parameters of a type or function
    pub fn type_parameters(&self, id: ElementId) -> &[ElementId] {
        self.cache
            .element(id)
            .and_then(SemanticElement::type_parameters)
            .unwrap_or_default()
    }

    /// Mangler for internal members of a type or file facade
    pub fn mangler(&self, id: ElementId) -> Option<NameMangler> {
        let suffix = match self.cache.element(id)? {
            SemanticElement::Type(ty) => &ty.mangling_suffix,
            SemanticElement::FileFacade(facade) => &facade.mangling_suffix,
            _ => return None,
        };
        Some(NameMangler::new(suffix))
    }

    /// The companion object of a type, resolved on first request
    pub fn companion(&mut self, id: ElementId) -> ResolveResult<Option<ElementId>> {
        if let Some(known) = self.cache.companion(id) {
            return Ok(known);
        }
        let Some((host, name)) = self
            .type_element(id)
            .map(|ty| (ty.host, ty.companion_name.clone()))
        else {
            return Ok(None);
        };
        let Some(name) = name else {
            self.cache.remember_companion(id, None);
            return Ok(None);
        };

        let tree = self.tree;
        let candidates: Vec<DeclId> = tree
            .enclosed(host)
            .iter()
            .copied()
            .filter(|&decl| tree.kind(decl) == DeclKind::Class && tree.simple_name(decl) == name)
            .collect();
        let [candidate] = candidates.as_slice() else {
            return Err(ResolveError::CompanionNotFound {
                owner: tree.describe(host),
                companion: name,
                found: candidates.len(),
            });
        };
        if tree.metadata(*candidate).and_then(Metadata::as_class).is_none() {
            return Err(ResolveError::CompanionWithoutMetadata {
                owner: tree.describe(host),
                host: tree.describe(*candidate),
            });
        }

        let companion = self.resolve(*candidate)?;
        self.cache.remember_companion(id, companion);
        Ok(companion)
    }

    fn type_element(&self, id: ElementId) -> Option<&TypeElement> {
        self.cache.element(id).and_then(SemanticElement::as_type)
    }

    fn resolve_type(&mut self, decl: DeclId) -> ResolveResult<Option<ElementId>> {
        let tree = self.tree;
        match tree.metadata(decl) {
            Some(Metadata::Class(metadata)) => self.build_type(decl, metadata).map(Some),
            Some(Metadata::FileFacade(metadata)) => self.build_file_facade(decl, metadata).map(Some),
            Some(Metadata::MultiFileClassFacade { .. } | Metadata::MultiFileClassPart { .. }) => {
                Err(ResolveError::Unsupported {
                    host: tree.describe(decl),
                    feature: UnsupportedFeature::MultiFileFacade,
                })
            }
            Some(Metadata::SyntheticClass) | None => {
                let kind = if self.is_default_impls(decl) {
                    ImplicitKind::DefaultImpls
                } else if tree.metadata(decl).is_some() {
                    ImplicitKind::SyntheticClass
                } else {
                    return Err(ResolveError::MissingDescriptor {
                        host: tree.describe(decl),
                    });
                };
                let owner = match tree.enclosing(decl) {
                    Some(parent) => self.resolve(parent)?,
                    None => None,
                };
                if let Some(id) = self.cache.get(decl) {
                    return Ok(Some(id));
                }
                trace!(host = %tree.describe(decl), ?kind, "compiler-generated type");
                Ok(Some(self.insert_implicit(decl, kind, owner)))
            }
        }
    }

    fn is_default_impls(&self, decl: DeclId) -> bool {
        let tree = self.tree;
        tree.simple_name(decl) == DEFAULT_IMPLS_NAME
            && tree.enclosing(decl).is_some_and(|parent| {
                tree.kind(parent) == DeclKind::Interface
                    && tree
                        .metadata(parent)
                        .and_then(Metadata::as_class)
                        .is_some_and(|class| class.class.kind == ClassKind::Interface)
            })
    }

    fn mangler_for(&self, strings: &StringTable, module: Option<StrId>) -> ResolveResult<NameMangler> {
        Ok(match module {
            Some(module) => NameMangler::new(strings.get(module)?),
            None => NameMangler::new(&self.config.default_module_name),
        })
    }

    fn build_type(&mut self, decl: DeclId, metadata: &'tree ClassMetadata) -> ResolveResult<ElementId> {
        let tree = self.tree;
        let class = &metadata.class;
        let strings = &metadata.strings;
        let owner = tree.describe(decl);

        let fq_name = strings.get(class.fq_name)?;
        let qualified_name = fq_name.replace('/', ".");
        if self.config.check_qualified_names && qualified_name != tree.qualified_name(decl) {
            return Err(ResolveError::QualifiedNameMismatch {
                host: tree.qualified_name(decl),
                descriptor: qualified_name,
            });
        }
        if tree
            .enclosed(decl)
            .iter()
            .any(|&member| tree.kind(member).is_initializer())
        {
            return Err(ResolveError::InitializerInSourceType { host: owner });
        }

        let index = DescriptorIndex::for_class(&owner, metadata)?;
        let mangler = self.mangler_for(strings, class.module_name)?;
        let companion_name = match class.companion_object_name {
            Some(name) => Some(strings.get(name)?.to_owned()),
            None => None,
        };
        let element = SemanticElement::Type(TypeElement {
            host: decl,
            qualified_name,
            package_name: fq_name
                .rsplit_once('/')
                .map(|(package, _)| package.replace('/', "."))
                .unwrap_or_default(),
            kind: class.kind,
            modality: class.modality,
            visibility: class.visibility,
            flags: class.flags,
            companion_name,
            mangling_suffix: mangler.suffix().to_owned(),
            constructors: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
            type_parameters: Vec::new(),
            enum_entries: Vec::new(),
        });

        let mut builder = MemberBuilder::new(
            tree,
            decl,
            self.cache.begin(),
            element,
            self.config.verify_accessor_shapes,
        )?;
        let id = builder.owner();
        let type_parameters = builder.type_parameters(decl, id, strings, &class.type_parameters)?;
        let constructors = if class.kind == ClassKind::AnnotationClass {
            Vec::new()
        } else {
            builder.constructors(&index, &class.constructors)?
        };
        let functions = builder.functions(&index, strings, &class.functions)?;
        let properties = builder.properties(&index, &class.properties)?;
        let enum_entries = builder.enum_entries(&index)?;

        debug!(
            host = %owner,
            constructors = constructors.len(),
            functions = functions.len(),
            properties = properties.len(),
            "resolved source type"
        );
        if let Some(SemanticElement::Type(ty)) = builder.owner_mut() {
            ty.type_parameters = type_parameters;
            ty.constructors = constructors;
            ty.functions = functions;
            ty.properties = properties;
            ty.enum_entries = enum_entries;
        }
        self.cache.commit(builder.finish());
        Ok(id)
    }

    fn build_file_facade(
        &mut self,
        decl: DeclId,
        metadata: &'tree PackageMetadata,
    ) -> ResolveResult<ElementId> {
        let tree = self.tree;
        let index = DescriptorIndex::for_package(&tree.describe(decl), metadata)?;
        let mangler = self.mangler_for(&metadata.strings, metadata.package.module_name)?;
        let element = SemanticElement::FileFacade(FileFacadeElement {
            host: decl,
            qualified_name: tree.qualified_name(decl),
            mangling_suffix: mangler.suffix().to_owned(),
            functions: Vec::new(),
            properties: Vec::new(),
        });

        let mut builder = MemberBuilder::new(
            tree,
            decl,
            self.cache.begin(),
            element,
            self.config.verify_accessor_shapes,
        )?;
        let id = builder.owner();
        let functions = builder.functions(&index, &metadata.strings, &metadata.package.functions)?;
        let properties = builder.properties(&index, &metadata.package.properties)?;

        debug!(
            host = %tree.describe(decl),
            functions = functions.len(),
            properties = properties.len(),
            "resolved file facade"
        );
        if let Some(SemanticElement::FileFacade(facade)) = builder.owner_mut() {
            facade.functions = functions;
            facade.properties = properties;
        }
        self.cache.commit(builder.finish());
        Ok(id)
    }

    fn resolve_member(&mut self, decl: DeclId) -> ResolveResult<Option<ElementId>> {
        let tree = self.tree;
        let Some(parent) = tree.enclosing(decl) else {
            return Ok(None);
        };
        let Some(owner) = self.resolve(parent)? else {
            return Ok(None);
        };
        if let Some(id) = self.cache.get(decl) {
            return Ok(Some(id));
        }

        let kind = match self.cache.element(owner) {
            Some(SemanticElement::Implicit(ImplicitElement {
                kind: ImplicitKind::DefaultImpls,
                ..
            })) => ImplicitKind::DefaultImplsMember,
            _ => ImplicitKind::SyntheticMember,
        };
        trace!(host = %tree.describe(decl), ?kind, "member without descriptor");
        Ok(Some(self.insert_implicit(decl, kind, Some(owner))))
    }

    fn resolve_parameter(&mut self, decl: DeclId) -> ResolveResult<Option<ElementId>> {
        let tree = self.tree;
        let Some(executable) = tree.enclosing(decl) else {
            return Ok(None);
        };
        let Some(owner) = self.resolve(executable)? else {
            return Ok(None);
        };
        if let Some(id) = self.cache.get(decl) {
            return Ok(Some(id));
        }

        let name = tree.simple_name(decl);
        let host_params = tree.parameters(executable);
        let position = host_params.iter().position(|&param| param == decl);
        let implicit = match self.cache.element(owner) {
            Some(SemanticElement::Function(function)) => position.is_some_and(|position| {
                position < function.implicit_leading()
                    || position >= host_params.len().saturating_sub(function.implicit_trailing())
            }),
            Some(SemanticElement::Constructor(_)) => false,
            _ => true,
        };

        if implicit {
            return Ok(Some(self.insert_implicit(
                decl,
                ImplicitKind::SyntheticParameter,
                Some(owner),
            )));
        }

        let named = self.named_child(
            self.cache
                .element(owner)
                .and_then(SemanticElement::parameters)
                .unwrap_or_default(),
            name,
        );
        match named {
            Some(id) => {
                self.cache.alias(decl, id);
                Ok(Some(id))
            }
            None => Err(ResolveError::MissingCorrespondence {
                owner: tree.describe(executable),
                descriptor: name.to_owned(),
                signature: host_signature(tree, executable),
            }),
        }
    }

    fn resolve_type_parameter(&mut self, decl: DeclId) -> ResolveResult<Option<ElementId>> {
        let tree = self.tree;
        let Some(parent) = tree.enclosing(decl) else {
            return Ok(None);
        };
        let parent_kind = tree.kind(parent);
        if !parent_kind.is_type() && parent_kind != DeclKind::Method {
            return Err(ResolveError::NoTypeParameters {
                host: tree.describe(parent),
            });
        }
        let Some(owner) = self.resolve(parent)? else {
            return Ok(None);
        };
        if let Some(id) = self.cache.get(decl) {
            return Ok(Some(id));
        }

        let name = tree.simple_name(decl);
        let (declared, synthetic) = match self.cache.element(owner) {
            Some(element) => (
                element.type_parameters().map(<[ElementId]>::to_vec),
                matches!(
                    element,
                    SemanticElement::Property(_) | SemanticElement::Implicit(_)
                ),
            ),
            None => (None, false),
        };

        match declared {
            Some(declared) => match self.named_child(&declared, name) {
                Some(id) => {
                    self.cache.alias(decl, id);
                    Ok(Some(id))
                }
                None => {
                    let position = tree
                        .type_parameters(parent)
                        .iter()
                        .position(|&param| param == decl)
                        .unwrap_or_default();
                    let descriptor_name = declared
                        .get(position)
                        .and_then(|&id| self.cache.element(id))
                        .map(|element| element.name().to_owned())
                        .unwrap_or_default();
                    Err(ResolveError::TypeParameterMismatch {
                        host: tree.describe(parent),
                        position,
                        host_name: name.to_owned(),
                        descriptor_name,
                    })
                }
            },
            None if synthetic => Ok(Some(self.insert_implicit(
                decl,
                ImplicitKind::SyntheticTypeParameter,
                Some(owner),
            ))),
            None => Err(ResolveError::NoTypeParameters {
                host: tree.describe(parent),
            }),
        }
    }

    fn named_child(&self, children: &[ElementId], name: &str) -> Option<ElementId> {
        children.iter().copied().find(|&child| {
            self.cache
                .element(child)
                .is_some_and(|element| element.name() == name)
        })
    }

    fn insert_implicit(
        &mut self,
        decl: DeclId,
        kind: ImplicitKind,
        owner: Option<ElementId>,
    ) -> ElementId {
        let element = SemanticElement::Implicit(ImplicitElement {
            host: decl,
            kind,
            name: self.tree.simple_name(decl).to_owned(),
            owner,
        });
        self.cache.insert(decl, element)
    }
}
