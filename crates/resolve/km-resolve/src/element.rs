//! Semantic elements
//!
//! One element per source declaration, carrying the host declaration(s) it
//! corresponds to. Elements refer to each other by [`ElementId`]; the
//! [`crate::IdentityCache`] owns them.

use km_host::DeclId;
use km_metadata::{
    ClassFlags, ClassKind, ConstructorKind, FunctionFlags, Modality, PropertyFlags, Variance,
    Visibility,
};
use la_arena::{Idx, RawIdx};
use serde::Serialize;
use std::iter;

/// Identity of a semantic element within one resolver
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// Position in creation order
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<Idx<SemanticElement>> for ElementId {
    fn from(idx: Idx<SemanticElement>) -> Self {
        Self(u32::from(idx.into_raw()))
    }
}

impl From<ElementId> for Idx<SemanticElement> {
    fn from(id: ElementId) -> Self {
        Self::from_raw(RawIdx::from(id.0))
    }
}

/// A package
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageElement {
    /// Host package
    pub host: DeclId,
    /// Dotted name, empty for the root package
    pub name: String,
}

/// A class, interface, enum class, annotation class or object
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeElement {
    /// Host type
    pub host: DeclId,
    /// Dotted qualified name
    pub qualified_name: String,
    /// Dotted package name
    pub package_name: String,
    /// Source kind
    pub kind: ClassKind,
    /// Modality
    pub modality: Modality,
    /// Visibility
    pub visibility: Visibility,
    /// Modifiers
    pub flags: ClassFlags,
    /// Simple name of the companion object
    pub companion_name: Option<String>,
    /// Suffix for internal member names
    pub mangling_suffix: String,
    /// Constructors, primary first
    pub constructors: Vec<ElementId>,
    /// Functions in declaration order
    pub functions: Vec<ElementId>,
    /// Properties in declaration order
    pub properties: Vec<ElementId>,
    /// Type parameters in declaration order
    pub type_parameters: Vec<ElementId>,
    /// Enum entries in declaration order
    pub enum_entries: Vec<ElementId>,
}

impl TypeElement {
    /// `object` or `companion object`
    pub fn is_object(&self) -> bool {
        self.kind.is_object()
    }

    /// `companion object`
    pub fn is_companion(&self) -> bool {
        self.kind == ClassKind::CompanionObject
    }

    /// `inner class`
    pub fn is_inner(&self) -> bool {
        self.flags.contains(ClassFlags::INNER)
    }

    /// `data class`
    pub fn is_data(&self) -> bool {
        self.flags.contains(ClassFlags::DATA)
    }

    /// `expect` declaration
    pub fn is_expect(&self) -> bool {
        self.flags.contains(ClassFlags::EXPECT)
    }

    /// `external` declaration
    pub fn is_external(&self) -> bool {
        self.flags.contains(ClassFlags::EXTERNAL)
    }
}

/// The implicit class holding top-level declarations of one file
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileFacadeElement {
    /// Host facade class
    pub host: DeclId,
    /// Dotted qualified name of the facade class
    pub qualified_name: String,
    /// Suffix for internal member names
    pub mangling_suffix: String,
    /// Top-level functions
    pub functions: Vec<ElementId>,
    /// Top-level properties
    pub properties: Vec<ElementId>,
}

/// A function
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionElement {
    /// Host method with the exact signature
    pub host: DeclId,
    /// Overload siblings
    pub overloads: Vec<DeclId>,
    /// Type or facade
    pub owner: ElementId,
    /// Source name
    pub name: String,
    /// JVM signature of `host`
    pub signature: String,
    /// Modality, never sealed
    pub modality: Modality,
    /// Visibility
    pub visibility: Visibility,
    /// Modifiers
    pub flags: FunctionFlags,
    /// Extension function
    pub is_extension: bool,
    /// Value parameters
    pub parameters: Vec<ElementId>,
    /// Type parameters
    pub type_parameters: Vec<ElementId>,
}

impl FunctionElement {
    /// Host parameters ahead of the value parameters
    pub fn implicit_leading(&self) -> usize {
        usize::from(self.is_extension)
    }

    /// Host parameters after the value parameters
    pub fn implicit_trailing(&self) -> usize {
        usize::from(self.is_suspend())
    }

    /// `suspend`
    pub fn is_suspend(&self) -> bool {
        self.flags.contains(FunctionFlags::SUSPEND)
    }

    /// `inline`
    pub fn is_inline(&self) -> bool {
        self.flags.contains(FunctionFlags::INLINE)
    }

    /// `operator`
    pub fn is_operator(&self) -> bool {
        self.flags.contains(FunctionFlags::OPERATOR)
    }

    /// `infix`
    pub fn is_infix(&self) -> bool {
        self.flags.contains(FunctionFlags::INFIX)
    }

    /// `tailrec`
    pub fn is_tailrec(&self) -> bool {
        self.flags.contains(FunctionFlags::TAILREC)
    }

    /// `expect`
    pub fn is_expect(&self) -> bool {
        self.flags.contains(FunctionFlags::EXPECT)
    }

    /// `external`
    pub fn is_external(&self) -> bool {
        self.flags.contains(FunctionFlags::EXTERNAL)
    }

    /// `abstract`
    pub fn is_abstract(&self) -> bool {
        self.modality == Modality::Abstract
    }
}

/// A constructor
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstructorElement {
    /// Host constructor with the exact signature
    pub host: DeclId,
    /// Overload siblings
    pub overloads: Vec<DeclId>,
    /// Owning type
    pub owner: ElementId,
    /// Primary or secondary
    pub kind: ConstructorKind,
    /// Visibility
    pub visibility: Visibility,
    /// JVM signature of `host`
    pub signature: String,
    /// Value parameters
    pub parameters: Vec<ElementId>,
}

impl ConstructorElement {
    /// Declared in the class header
    pub fn is_primary(&self) -> bool {
        self.kind == ConstructorKind::Primary
    }
}

/// A property and the host members realizing it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyElement {
    /// Type or facade
    pub owner: ElementId,
    /// Property name
    pub name: String,
    /// Backing field
    pub field: Option<DeclId>,
    /// Getter
    pub getter: Option<DeclId>,
    /// Setter
    pub setter: Option<DeclId>,
    /// `name$annotations` holder
    pub annotation_holder: Option<DeclId>,
    /// Modality
    pub modality: Modality,
    /// Visibility
    pub visibility: Visibility,
    /// Modifiers
    pub flags: PropertyFlags,
    /// Extension property
    pub is_extension: bool,
}

impl PropertyElement {
    /// `var`
    pub fn is_mutable(&self) -> bool {
        self.flags.contains(PropertyFlags::VAR)
    }

    /// `const val`
    pub fn is_const(&self) -> bool {
        self.flags.contains(PropertyFlags::CONST)
    }

    /// `lateinit var`
    pub fn is_lateinit(&self) -> bool {
        self.flags.contains(PropertyFlags::LATEINIT)
    }

    /// Host members in field, getter, setter, holder order
    pub fn hosts(&self) -> impl Iterator<Item = DeclId> + '_ {
        [self.field, self.getter, self.setter, self.annotation_holder]
            .into_iter()
            .flatten()
    }
}

/// A value parameter
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParameterElement {
    /// Parameter of the matched executable
    pub host: DeclId,
    /// Same-named parameters of the overload siblings
    pub overload_hosts: Vec<DeclId>,
    /// Function or constructor
    pub owner: ElementId,
    /// Parameter name
    pub name: String,
    /// Zero-based position among value parameters
    pub position: usize,
    /// Declares a default value
    pub has_default: bool,
    /// `vararg`
    pub is_vararg: bool,
}

/// A type parameter
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeParameterElement {
    /// Host type parameter
    pub host: DeclId,
    /// Type or function
    pub owner: ElementId,
    /// Name
    pub name: String,
    /// Declaration-site variance
    pub variance: Variance,
    /// `reified`
    pub reified: bool,
}

/// An enum entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumEntryElement {
    /// Host enum constant
    pub host: DeclId,
    /// Enum class
    pub owner: ElementId,
    /// Entry name
    pub name: String,
    /// Position in the enum
    pub ordinal: usize,
}

/// Why a host declaration inside source code has no descriptor
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize)]
pub enum ImplicitKind {
    /// The `DefaultImpls` class holding interface method bodies
    DefaultImpls,
    /// A method of `DefaultImpls`
    DefaultImplsMember,
    /// A compiler-generated class
    SyntheticClass,
    /// A compiler-generated member of a source type
    SyntheticMember,
    /// A receiver, continuation or accessor parameter
    SyntheticParameter,
    /// A type parameter of a compiler-generated member
    SyntheticTypeParameter,
}

/// A host declaration generated by the source compiler
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImplicitElement {
    /// The host declaration
    pub host: DeclId,
    /// Classification
    pub kind: ImplicitKind,
    /// Host simple name
    pub name: String,
    /// Enclosing element
    pub owner: Option<ElementId>,
}

/// Anything the resolver produces
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SemanticElement {
    /// A package
    Package(PackageElement),
    /// A source type
    Type(TypeElement),
    /// A file facade
    FileFacade(FileFacadeElement),
    /// A function
    Function(FunctionElement),
    /// A constructor
    Constructor(ConstructorElement),
    /// A property
    Property(PropertyElement),
    /// A value parameter
    Parameter(ParameterElement),
    /// A type parameter
    TypeParameter(TypeParameterElement),
    /// An enum entry
    EnumEntry(EnumEntryElement),
    /// A compiler-generated host declaration
    Implicit(ImplicitElement),
}

impl SemanticElement {
    /// Short kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Package(_) => "package",
            Self::Type(_) => "type",
            Self::FileFacade(_) => "file facade",
            Self::Function(_) => "function",
            Self::Constructor(_) => "constructor",
            Self::Property(_) => "property",
            Self::Parameter(_) => "parameter",
            Self::TypeParameter(_) => "type parameter",
            Self::EnumEntry(_) => "enum entry",
            Self::Implicit(_) => "implicit declaration",
        }
    }

    /// Source name
    pub fn name(&self) -> &str {
        match self {
            Self::Package(package) => &package.name,
            Self::Type(ty) => &ty.qualified_name,
            Self::FileFacade(facade) => &facade.qualified_name,
            Self::Function(function) => &function.name,
            Self::Constructor(_) => crate::signature::CONSTRUCTOR_NAME,
            Self::Property(property) => &property.name,
            Self::Parameter(param) => &param.name,
            Self::TypeParameter(param) => &param.name,
            Self::EnumEntry(entry) => &entry.name,
            Self::Implicit(implicit) => &implicit.name,
        }
    }

    /// The primary host declaration; properties use their first member
    pub fn host(&self) -> Option<DeclId> {
        match self {
            Self::Package(package) => Some(package.host),
            Self::Type(ty) => Some(ty.host),
            Self::FileFacade(facade) => Some(facade.host),
            Self::Function(function) => Some(function.host),
            Self::Constructor(ctor) => Some(ctor.host),
            Self::Property(property) => property.hosts().next(),
            Self::Parameter(param) => Some(param.host),
            Self::TypeParameter(param) => Some(param.host),
            Self::EnumEntry(entry) => Some(entry.host),
            Self::Implicit(implicit) => Some(implicit.host),
        }
    }

    /// Every host declaration the element stands for
    pub fn host_forms(&self) -> Vec<DeclId> {
        match self {
            Self::Function(function) => iter::once(function.host)
                .chain(function.overloads.iter().copied())
                .collect(),
            Self::Constructor(ctor) => iter::once(ctor.host)
                .chain(ctor.overloads.iter().copied())
                .collect(),
            Self::Parameter(param) => iter::once(param.host)
                .chain(param.overload_hosts.iter().copied())
                .collect(),
            Self::Property(property) => property.hosts().collect(),
            other => other.host().into_iter().collect(),
        }
    }

    /// Enclosing element, when it is recorded on the element itself
    pub fn owner(&self) -> Option<ElementId> {
        match self {
            Self::Package(_) | Self::Type(_) | Self::FileFacade(_) => None,
            Self::Function(function) => Some(function.owner),
            Self::Constructor(ctor) => Some(ctor.owner),
            Self::Property(property) => Some(property.owner),
            Self::Parameter(param) => Some(param.owner),
            Self::TypeParameter(param) => Some(param.owner),
            Self::EnumEntry(entry) => Some(entry.owner),
            Self::Implicit(implicit) => implicit.owner,
        }
    }

    /// Type parameters, for elements that can declare them
    pub fn type_parameters(&self) -> Option<&[ElementId]> {
        match self {
            Self::Type(ty) => Some(&ty.type_parameters),
            Self::Function(function) => Some(&function.type_parameters),
            _ => None,
        }
    }

    /// Value parameters, for executables
    pub fn parameters(&self) -> Option<&[ElementId]> {
        match self {
            Self::Function(function) => Some(&function.parameters),
            Self::Constructor(ctor) => Some(&ctor.parameters),
            _ => None,
        }
    }

    /// The type payload
    pub fn as_type(&self) -> Option<&TypeElement> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// The function payload
    pub fn as_function(&self) -> Option<&FunctionElement> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// The constructor payload
    pub fn as_constructor(&self) -> Option<&ConstructorElement> {
        match self {
            Self::Constructor(ctor) => Some(ctor),
            _ => None,
        }
    }

    /// The property payload
    pub fn as_property(&self) -> Option<&PropertyElement> {
        match self {
            Self::Property(property) => Some(property),
            _ => None,
        }
    }

    /// The implicit payload
    pub fn as_implicit(&self) -> Option<&ImplicitElement> {
        match self {
            Self::Implicit(implicit) => Some(implicit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_host::{DeclKind, DeclTree};

    fn type_element(kind: ClassKind, flags: ClassFlags) -> TypeElement {
        let mut tree = DeclTree::new();
        let package = tree.add_package("geo");
        let host = tree.add_type(package, DeclKind::Class, "Point");
        TypeElement {
            host,
            qualified_name: "geo.Point".to_owned(),
            package_name: "geo".to_owned(),
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            flags,
            companion_name: None,
            mangling_suffix: "main".to_owned(),
            constructors: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
            type_parameters: Vec::new(),
            enum_entries: Vec::new(),
        }
    }

    #[test]
    fn test_class_modifiers_follow_flags() {
        let point = type_element(ClassKind::Class, ClassFlags::DATA | ClassFlags::INNER);
        assert!(point.is_data());
        assert!(point.is_inner());
        assert!(!point.is_expect());
        assert!(!point.is_external());
        assert!(!point.is_object());

        let native = type_element(ClassKind::Class, ClassFlags::EXPECT | ClassFlags::EXTERNAL);
        assert!(native.is_expect());
        assert!(native.is_external());
        assert!(!native.is_data());
    }

    #[test]
    fn test_companion_is_an_object() {
        let companion = type_element(ClassKind::CompanionObject, ClassFlags::empty());
        assert!(companion.is_object());
        assert!(companion.is_companion());
        assert!(!type_element(ClassKind::Object, ClassFlags::empty()).is_companion());
    }
}
