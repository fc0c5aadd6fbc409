//! Host declaration trees
//!
//! The host compiler flattens a compiled unit into packages, types, methods,
//! constructors, fields and parameters. That model is owned by the host; the
//! resolver only reads it through the [`HostTree`] trait.
//!
//! [`DeclTree`] is an arena-backed implementation with a small builder API,
//! used by collaborators that lower a host model into memory and by tests.

pub mod ty;

pub use ty::{DescriptorError, JvmType};

use km_intern::{Interner, Symbol};
use km_metadata::Metadata;
use la_arena::{Arena, Idx, RawIdx};
use serde::{Deserialize, Serialize};

/// Stable identity of a host declaration within one unit
///
/// Ids are handed out by [`DeclTree`]; an id from another tree is unknown
/// to it and reads as an empty declaration of kind [`DeclKind::Other`].
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct DeclId(u32);

impl DeclId {
    /// Position in creation order
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<Idx<Decl>> for DeclId {
    fn from(idx: Idx<Decl>) -> Self {
        Self(u32::from(idx.into_raw()))
    }
}

impl From<DeclId> for Idx<Decl> {
    fn from(id: DeclId) -> Self {
        Self::from_raw(RawIdx::from(id.0))
    }
}

/// Kind tag of a host declaration
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum DeclKind {
    /// Package
    Package,
    /// Module
    Module,
    /// Class
    Class,
    /// Interface
    Interface,
    /// Enum
    Enum,
    /// Annotation type
    AnnotationType,
    /// Method
    Method,
    /// Constructor
    Constructor,
    /// Instance initializer block
    InstanceInit,
    /// Static initializer block
    StaticInit,
    /// Field
    Field,
    /// Enum constant
    EnumConstant,
    /// Parameter of a method or constructor
    Parameter,
    /// Type parameter of a type or method
    TypeParameter,
    /// Local variable
    LocalVariable,
    /// Resource variable of a try-with-resources
    ResourceVariable,
    /// Exception parameter of a catch clause
    ExceptionParameter,
    /// Anything the host added later
    Other,
}

impl DeclKind {
    /// Class, interface, enum or annotation type
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Enum | Self::AnnotationType
        )
    }

    /// Method or constructor
    pub fn is_executable(self) -> bool {
        matches!(self, Self::Method | Self::Constructor)
    }

    /// Instance or static initializer
    pub fn is_initializer(self) -> bool {
        matches!(self, Self::InstanceInit | Self::StaticInit)
    }
}

/// Read-only navigation over a host declaration tree
pub trait HostTree {
    /// Kind tag
    fn kind(&self, decl: DeclId) -> DeclKind;

    /// Simple name (`<init>` for constructors, dotted name for packages)
    fn simple_name(&self, decl: DeclId) -> &str;

    /// Enclosing declaration; `None` for roots
    fn enclosing(&self, decl: DeclId) -> Option<DeclId>;

    /// Enclosed members (types, methods, constructors, fields, initializers)
    fn enclosed(&self, decl: DeclId) -> &[DeclId];

    /// Ordered parameters of an executable; empty otherwise
    fn parameters(&self, decl: DeclId) -> &[DeclId];

    /// Ordered type parameters of a type or executable; empty otherwise
    fn type_parameters(&self, decl: DeclId) -> &[DeclId];

    /// Field or parameter type, or method return type
    fn ty(&self, decl: DeclId) -> Option<&JvmType>;

    /// Source-compiler metadata attached to this declaration
    fn metadata(&self, decl: DeclId) -> Option<&Metadata>;

    /// Dotted qualified name of a type or package; the simple name otherwise
    fn qualified_name(&self, decl: DeclId) -> String {
        let name = self.simple_name(decl);
        if !self.kind(decl).is_type() {
            return name.to_owned();
        }
        match self.enclosing(decl) {
            Some(parent) if self.kind(parent).is_type() || self.kind(parent) == DeclKind::Package => {
                let prefix = self.qualified_name(parent);
                if prefix.is_empty() {
                    name.to_owned()
                } else {
                    format!("{prefix}.{name}")
                }
            }
            _ => name.to_owned(),
        }
    }

    /// Human-readable rendering for diagnostics
    fn describe(&self, decl: DeclId) -> String {
        let kind = self.kind(decl);
        if kind.is_type() || kind == DeclKind::Package {
            return self.qualified_name(decl);
        }
        let name = self.simple_name(decl);
        let owner = self
            .enclosing(decl)
            .map(|parent| self.describe(parent))
            .unwrap_or_default();
        let rendered = if kind.is_executable() {
            let params: Vec<String> = self
                .parameters(decl)
                .iter()
                .map(|&param| {
                    self.ty(param)
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "?".to_owned())
                })
                .collect();
            format!("{name}({})", params.join(", "))
        } else {
            name.to_owned()
        };
        if owner.is_empty() {
            rendered
        } else {
            format!("{owner}.{rendered}")
        }
    }
}

/// One declaration stored in a [`DeclTree`]
#[derive(Debug)]
pub struct Decl {
    /// Kind tag
    pub kind: DeclKind,
    /// Simple name
    pub name: Symbol,
    /// Enclosing declaration
    pub enclosing: Option<DeclId>,
    /// Enclosed members
    pub enclosed: Vec<DeclId>,
    /// Parameters (executables only)
    pub parameters: Vec<DeclId>,
    /// Type parameters
    pub type_parameters: Vec<DeclId>,
    /// Field/parameter type or return type
    pub ty: Option<JvmType>,
    /// Attached metadata
    pub metadata: Option<Metadata>,
}

/// Arena-backed host declaration tree
#[derive(Debug, Default)]
pub struct DeclTree {
    decls: Arena<Decl>,
    interner: Interner,
    roots: Vec<DeclId>,
}

impl DeclTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Declarations without an enclosing declaration, in insertion order
    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// All declaration ids in insertion order
    pub fn iter(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.decls.iter().map(|(idx, _)| DeclId::from(idx))
    }

    /// Borrow a declaration; `None` for ids this tree did not hand out
    pub fn decl(&self, id: DeclId) -> Option<&Decl> {
        (id.index() < self.decls.len()).then(|| &self.decls[Idx::from(id)])
    }

    fn decl_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        let decls: &mut [Decl] = self.decls.as_mut();
        decls.get_mut(id.index())
    }

    /// Add a declaration under `enclosing`
    ///
    /// Parameters and type parameters are recorded in their owner's ordered
    /// lists; every other kind becomes an enclosed member. An unknown
    /// `enclosing` id leaves the declaration unlinked.
    pub fn add(
        &mut self,
        enclosing: Option<DeclId>,
        kind: DeclKind,
        name: &str,
        ty: Option<JvmType>,
    ) -> DeclId {
        let name = self.interner.intern(name);
        let id = DeclId::from(self.decls.alloc(Decl {
            kind,
            name,
            enclosing,
            enclosed: Vec::new(),
            parameters: Vec::new(),
            type_parameters: Vec::new(),
            ty,
            metadata: None,
        }));

        match enclosing {
            None => self.roots.push(id),
            Some(parent) => {
                if let Some(parent) = self.decl_mut(parent) {
                    match kind {
                        DeclKind::Parameter => parent.parameters.push(id),
                        DeclKind::TypeParameter => parent.type_parameters.push(id),
                        _ => parent.enclosed.push(id),
                    }
                }
            }
        }
        id
    }

    /// Add a package root
    pub fn add_package(&mut self, name: &str) -> DeclId {
        self.add(None, DeclKind::Package, name, None)
    }

    /// Add a type (class, interface, enum or annotation type)
    pub fn add_type(&mut self, enclosing: DeclId, kind: DeclKind, name: &str) -> DeclId {
        self.add(Some(enclosing), kind, name, None)
    }

    /// Add a method with the given return type
    pub fn add_method(&mut self, owner: DeclId, name: &str, returns: JvmType) -> DeclId {
        self.add(Some(owner), DeclKind::Method, name, Some(returns))
    }

    /// Add a constructor
    pub fn add_constructor(&mut self, owner: DeclId) -> DeclId {
        self.add(Some(owner), DeclKind::Constructor, "<init>", Some(JvmType::Void))
    }

    /// Add a field
    pub fn add_field(&mut self, owner: DeclId, name: &str, ty: JvmType) -> DeclId {
        self.add(Some(owner), DeclKind::Field, name, Some(ty))
    }

    /// Add a parameter to an executable
    pub fn add_parameter(&mut self, executable: DeclId, name: &str, ty: JvmType) -> DeclId {
        self.add(Some(executable), DeclKind::Parameter, name, Some(ty))
    }

    /// Add a type parameter
    pub fn add_type_parameter(&mut self, owner: DeclId, name: &str) -> DeclId {
        self.add(Some(owner), DeclKind::TypeParameter, name, None)
    }

    /// Attach source-compiler metadata to a declaration
    ///
    /// Returns `false` and drops `metadata` when the id is unknown.
    pub fn attach_metadata(&mut self, decl: DeclId, metadata: Metadata) -> bool {
        let Some(decl) = self.decl_mut(decl) else {
            return false;
        };
        decl.metadata = Some(metadata);
        true
    }
}

impl HostTree for DeclTree {
    fn kind(&self, decl: DeclId) -> DeclKind {
        self.decl(decl).map_or(DeclKind::Other, |decl| decl.kind)
    }

    fn simple_name(&self, decl: DeclId) -> &str {
        self.decl(decl).map_or("", |decl| self.interner.resolve(decl.name))
    }

    fn enclosing(&self, decl: DeclId) -> Option<DeclId> {
        self.decl(decl).and_then(|decl| decl.enclosing)
    }

    fn enclosed(&self, decl: DeclId) -> &[DeclId] {
        self.decl(decl)
            .map(|decl| decl.enclosed.as_slice())
            .unwrap_or_default()
    }

    fn parameters(&self, decl: DeclId) -> &[DeclId] {
        self.decl(decl)
            .map(|decl| decl.parameters.as_slice())
            .unwrap_or_default()
    }

    fn type_parameters(&self, decl: DeclId) -> &[DeclId] {
        self.decl(decl)
            .map(|decl| decl.type_parameters.as_slice())
            .unwrap_or_default()
    }

    fn ty(&self, decl: DeclId) -> Option<&JvmType> {
        self.decl(decl).and_then(|decl| decl.ty.as_ref())
    }

    fn metadata(&self, decl: DeclId) -> Option<&Metadata> {
        self.decl(decl).and_then(|decl| decl.metadata.as_ref())
    }
}
