//! Descriptor nodes
//!
//! Each node mirrors one declaration of the source program as the source
//! compiler recorded it. They are immutable once decoded; the `with_*`
//! builders exist for collaborators that construct trees directly.

use crate::strings::StrId;
use crate::ty::{TypeRef, Variance};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Kind of a class-like declaration
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ClassKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum class`
    EnumClass,
    /// A single entry of an enum class with a body
    EnumEntry,
    /// `annotation class`
    AnnotationClass,
    /// `object`
    Object,
    /// `companion object`
    CompanionObject,
}

impl ClassKind {
    /// Whether instances are singletons (`object` / `companion object`)
    pub fn is_object(self) -> bool {
        matches!(self, Self::Object | Self::CompanionObject)
    }
}

/// Inheritance modality
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Modality {
    /// `final` (the default)
    #[default]
    Final,
    /// `open`
    Open,
    /// `abstract`
    Abstract,
    /// `sealed`
    Sealed,
}

/// Declared visibility
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Visibility {
    /// `internal`; members get a module-specific mangled JVM name
    Internal,
    /// `private`
    Private,
    /// `protected`
    Protected,
    /// `public` (the default)
    #[default]
    Public,
    /// `private` to the receiver instance
    PrivateToThis,
    /// Local declaration
    Local,
}

bitflags! {
    /// Boolean modifiers of a class
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ClassFlags: u32 {
        /// `inner`
        const INNER = 1 << 0;
        /// `data`
        const DATA = 1 << 1;
        /// `expect`
        const EXPECT = 1 << 2;
        /// `external`
        const EXTERNAL = 1 << 3;
        /// `fun interface`
        const FUN = 1 << 4;
        /// `value` / inline class
        const VALUE = 1 << 5;
    }
}

bitflags! {
    /// Boolean modifiers of a function
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FunctionFlags: u32 {
        /// `inline`
        const INLINE = 1 << 0;
        /// `infix`
        const INFIX = 1 << 1;
        /// `tailrec`
        const TAILREC = 1 << 2;
        /// `suspend`
        const SUSPEND = 1 << 3;
        /// `operator`
        const OPERATOR = 1 << 4;
        /// `expect`
        const EXPECT = 1 << 5;
        /// `external`
        const EXTERNAL = 1 << 6;
    }
}

bitflags! {
    /// Boolean modifiers of a property
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PropertyFlags: u32 {
        /// `var` rather than `val`
        const VAR = 1 << 0;
        /// `const`
        const CONST = 1 << 1;
        /// `lateinit`
        const LATEINIT = 1 << 2;
        /// `by` delegate
        const DELEGATED = 1 << 3;
        /// `expect`
        const EXPECT = 1 << 4;
        /// `external`
        const EXTERNAL = 1 << 5;
    }
}

/// JVM name and descriptor of a method, e.g. `getName` + `()Ljava/lang/String;`
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct JvmMethodSignature {
    /// JVM method name
    pub name: StrId,
    /// JVM method descriptor
    pub desc: StrId,
}

/// JVM descriptor of a backing field
///
/// The field name is implied by the property name; a recorded name is never
/// expected.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct JvmFieldSignature {
    /// Explicit field name (never present in well-formed metadata)
    #[serde(default)]
    pub name: Option<StrId>,
    /// JVM field descriptor
    pub desc: StrId,
}

/// The JVM-level members that realize one property
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct JvmPropertySignature {
    /// Backing field
    #[serde(default)]
    pub field: Option<JvmFieldSignature>,
    /// Getter method
    #[serde(default)]
    pub getter: Option<JvmMethodSignature>,
    /// Setter method
    #[serde(default)]
    pub setter: Option<JvmMethodSignature>,
    /// Empty `name$annotations` method holding property-targeted annotations
    #[serde(default)]
    pub synthetic_method: Option<JvmMethodSignature>,
}

/// A value parameter
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: StrId,
    /// Whether the parameter declares a default value
    #[serde(default)]
    pub declares_default: bool,
    /// Declared type (the array type for `vararg`)
    pub ty: TypeRef,
    /// Element type when the parameter is `vararg`
    #[serde(default)]
    pub vararg_element: Option<TypeRef>,
}

impl ParameterDescriptor {
    /// A required parameter
    pub fn new(name: StrId, ty: TypeRef) -> Self {
        Self {
            name,
            declares_default: false,
            ty,
            vararg_element: None,
        }
    }

    /// Mark the parameter as having a default value
    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.declares_default = true;
        self
    }
}

/// A type parameter; bounds and variance pass through untouched
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TypeParameterDescriptor {
    /// Id used by [`crate::Classifier::TypeParameter`]
    pub id: u32,
    /// Parameter name
    pub name: StrId,
    /// Declaration-site variance
    #[serde(default)]
    pub variance: Variance,
    /// `reified`
    #[serde(default)]
    pub reified: bool,
    /// Upper bounds; empty means `kotlin/Any?`
    #[serde(default)]
    pub upper_bounds: Vec<TypeRef>,
}

impl TypeParameterDescriptor {
    /// An unbounded, invariant type parameter
    pub fn new(id: u32, name: StrId) -> Self {
        Self {
            id,
            name,
            variance: Variance::Invariant,
            reified: false,
            upper_bounds: Vec::new(),
        }
    }

    /// Add an upper bound
    #[must_use]
    pub fn with_bound(mut self, bound: TypeRef) -> Self {
        self.upper_bounds.push(bound);
        self
    }
}

/// A function or method
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Source name (may differ from the JVM name)
    pub name: StrId,
    /// Modality
    #[serde(default)]
    pub modality: Modality,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Modifiers
    #[serde(default)]
    pub flags: FunctionFlags,
    /// Type parameters in declaration order
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDescriptor>,
    /// Extension receiver type
    #[serde(default)]
    pub receiver: Option<TypeRef>,
    /// Value parameters in declaration order
    #[serde(default)]
    pub value_parameters: Vec<ParameterDescriptor>,
    /// Return type
    pub return_type: TypeRef,
    /// Recorded JVM signature, when it differs from the computed one
    #[serde(default)]
    pub jvm_signature: Option<JvmMethodSignature>,
}

impl FunctionDescriptor {
    /// A public final function without parameters
    pub fn new(name: StrId, return_type: TypeRef) -> Self {
        Self {
            name,
            modality: Modality::Final,
            visibility: Visibility::Public,
            flags: FunctionFlags::empty(),
            type_parameters: Vec::new(),
            receiver: None,
            value_parameters: Vec::new(),
            return_type,
            jvm_signature: None,
        }
    }

    /// Append a value parameter
    #[must_use]
    pub fn with_parameter(mut self, param: ParameterDescriptor) -> Self {
        self.value_parameters.push(param);
        self
    }

    /// Append a type parameter
    #[must_use]
    pub fn with_type_parameter(mut self, param: TypeParameterDescriptor) -> Self {
        self.type_parameters.push(param);
        self
    }

    /// Set the extension receiver
    #[must_use]
    pub fn with_receiver(mut self, receiver: TypeRef) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Add modifiers
    #[must_use]
    pub fn with_flags(mut self, flags: FunctionFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the visibility
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set the modality
    #[must_use]
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Record an explicit JVM signature
    #[must_use]
    pub fn with_jvm_signature(mut self, signature: JvmMethodSignature) -> Self {
        self.jvm_signature = Some(signature);
        self
    }
}

/// Whether a constructor is the primary one
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConstructorKind {
    /// Declared in the class header
    #[default]
    Primary,
    /// Declared with `constructor` in the body
    Secondary,
}

/// A constructor
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDescriptor {
    /// Primary or secondary
    #[serde(default)]
    pub kind: ConstructorKind,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Value parameters in declaration order
    #[serde(default)]
    pub value_parameters: Vec<ParameterDescriptor>,
    /// Recorded JVM signature, when it differs from the computed one
    #[serde(default)]
    pub jvm_signature: Option<JvmMethodSignature>,
}

impl ConstructorDescriptor {
    /// A public constructor of the given kind without parameters
    pub fn new(kind: ConstructorKind) -> Self {
        Self {
            kind,
            visibility: Visibility::Public,
            value_parameters: Vec::new(),
            jvm_signature: None,
        }
    }

    /// Whether this is the primary constructor
    pub fn is_primary(&self) -> bool {
        self.kind == ConstructorKind::Primary
    }

    /// Append a value parameter
    #[must_use]
    pub fn with_parameter(mut self, param: ParameterDescriptor) -> Self {
        self.value_parameters.push(param);
        self
    }

    /// Set the visibility
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Record an explicit JVM signature
    #[must_use]
    pub fn with_jvm_signature(mut self, signature: JvmMethodSignature) -> Self {
        self.jvm_signature = Some(signature);
        self
    }
}

/// A property
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name (also the backing field name)
    pub name: StrId,
    /// Modality
    #[serde(default)]
    pub modality: Modality,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Modifiers
    #[serde(default)]
    pub flags: PropertyFlags,
    /// Declared type
    pub return_type: TypeRef,
    /// Extension receiver type
    #[serde(default)]
    pub receiver: Option<TypeRef>,
    /// JVM members realizing the property
    #[serde(default)]
    pub jvm: JvmPropertySignature,
}

impl PropertyDescriptor {
    /// A public final `val` with no recorded JVM members
    pub fn new(name: StrId, return_type: TypeRef) -> Self {
        Self {
            name,
            modality: Modality::Final,
            visibility: Visibility::Public,
            flags: PropertyFlags::empty(),
            return_type,
            receiver: None,
            jvm: JvmPropertySignature::default(),
        }
    }

    /// Add modifiers
    #[must_use]
    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Record the backing field
    #[must_use]
    pub fn with_field(mut self, desc: StrId) -> Self {
        self.jvm.field = Some(JvmFieldSignature { name: None, desc });
        self
    }

    /// Record the getter
    #[must_use]
    pub fn with_getter(mut self, signature: JvmMethodSignature) -> Self {
        self.jvm.getter = Some(signature);
        self
    }

    /// Record the setter
    #[must_use]
    pub fn with_setter(mut self, signature: JvmMethodSignature) -> Self {
        self.jvm.setter = Some(signature);
        self
    }

    /// Record the synthetic annotation holder
    #[must_use]
    pub fn with_annotation_holder(mut self, signature: JvmMethodSignature) -> Self {
        self.jvm.synthetic_method = Some(signature);
        self
    }
}

/// A class, interface, enum, annotation class or object
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Qualified name, `/`-separated package and `.`-separated nesting
    pub fq_name: StrId,
    /// Kind
    pub kind: ClassKind,
    /// Modality
    #[serde(default)]
    pub modality: Modality,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Modifiers
    #[serde(default)]
    pub flags: ClassFlags,
    /// Simple name of the companion object, if any
    #[serde(default)]
    pub companion_object_name: Option<StrId>,
    /// Type parameters in declaration order
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDescriptor>,
    /// Constructors in declaration order
    #[serde(default)]
    pub constructors: Vec<ConstructorDescriptor>,
    /// Functions in declaration order
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,
    /// Properties in declaration order
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Enum entry names
    #[serde(default)]
    pub enum_entries: Vec<StrId>,
    /// Name of the module the class was compiled in
    #[serde(default)]
    pub module_name: Option<StrId>,
}

impl ClassDescriptor {
    /// A public final class of the given kind with no members
    pub fn new(fq_name: StrId, kind: ClassKind) -> Self {
        Self {
            fq_name,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            flags: ClassFlags::empty(),
            companion_object_name: None,
            type_parameters: Vec::new(),
            constructors: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
            enum_entries: Vec::new(),
            module_name: None,
        }
    }

    /// Append a constructor
    #[must_use]
    pub fn with_constructor(mut self, ctor: ConstructorDescriptor) -> Self {
        self.constructors.push(ctor);
        self
    }

    /// Append a function
    #[must_use]
    pub fn with_function(mut self, function: FunctionDescriptor) -> Self {
        self.functions.push(function);
        self
    }

    /// Append a property
    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Append a type parameter
    #[must_use]
    pub fn with_type_parameter(mut self, param: TypeParameterDescriptor) -> Self {
        self.type_parameters.push(param);
        self
    }

    /// Append an enum entry
    #[must_use]
    pub fn with_enum_entry(mut self, name: StrId) -> Self {
        self.enum_entries.push(name);
        self
    }

    /// Set the companion object name
    #[must_use]
    pub fn with_companion(mut self, name: StrId) -> Self {
        self.companion_object_name = Some(name);
        self
    }

    /// Set the module name
    #[must_use]
    pub fn with_module_name(mut self, name: StrId) -> Self {
        self.module_name = Some(name);
        self
    }

    /// Add modifiers
    #[must_use]
    pub fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the modality
    #[must_use]
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }
}

/// Top-level members compiled into one file facade class
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Top-level functions in declaration order
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,
    /// Top-level properties in declaration order
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Name of the module the file was compiled in
    #[serde(default)]
    pub module_name: Option<StrId>,
}

impl PackageDescriptor {
    /// Append a function
    #[must_use]
    pub fn with_function(mut self, function: FunctionDescriptor) -> Self {
        self.functions.push(function);
        self
    }

    /// Append a property
    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }
}
