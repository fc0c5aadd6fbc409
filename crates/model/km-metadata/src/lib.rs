//! Decoded source-compiler metadata
//!
//! The source compiler attaches a binary blob to every class file it emits.
//! Decoding that blob is someone else's job; this crate is the shape of the
//! result: a [`Metadata`] value per host type, holding a descriptor tree and
//! the string table its indices refer to.
//!
//! # Layout
//!
//! - [`StringTable`]: the per-unit name resolver
//! - [`TypeRef`]: source-level types, used to compute JVM signatures
//! - descriptor nodes: [`ClassDescriptor`], [`FunctionDescriptor`],
//!   [`ConstructorDescriptor`], [`PropertyDescriptor`],
//!   [`ParameterDescriptor`], [`TypeParameterDescriptor`]

pub mod descriptor;
pub mod error;
pub mod strings;
pub mod ty;

pub use descriptor::{
    ClassDescriptor, ClassFlags, ClassKind, ConstructorDescriptor, ConstructorKind,
    FunctionDescriptor, FunctionFlags, JvmFieldSignature, JvmMethodSignature,
    JvmPropertySignature, Modality, PackageDescriptor, ParameterDescriptor, PropertyDescriptor,
    PropertyFlags, TypeParameterDescriptor, Visibility,
};
pub use error::MetadataError;
pub use strings::{StrId, StringTable};
pub use ty::{Classifier, TypeProjection, TypeRef, Variance};

use serde::{Deserialize, Serialize};

/// Metadata of a class declaration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    /// Strings referenced by `class`
    pub strings: StringTable,
    /// The class descriptor
    pub class: ClassDescriptor,
}

/// Metadata of a file facade (top-level declarations of one source file)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Strings referenced by `package`
    pub strings: StringTable,
    /// The package-level descriptor
    pub package: PackageDescriptor,
}

/// Everything the source compiler may attach to one host type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metadata {
    /// A source class, interface, enum, annotation class or object
    Class(ClassMetadata),
    /// A single-file facade holding top-level declarations
    FileFacade(PackageMetadata),
    /// A facade delegating to several multi-file parts
    MultiFileClassFacade {
        /// JVM internal names of the parts
        parts: Vec<String>,
    },
    /// One part of a multi-file facade
    MultiFileClassPart {
        /// The part's declarations
        metadata: PackageMetadata,
        /// JVM internal name of the facade
        facade: String,
    },
    /// A compiler-generated class with no source counterpart
    SyntheticClass,
}

impl Metadata {
    /// The string table, for variants that carry one
    pub fn strings(&self) -> Option<&StringTable> {
        match self {
            Self::Class(class) => Some(&class.strings),
            Self::FileFacade(package) | Self::MultiFileClassPart { metadata: package, .. } => {
                Some(&package.strings)
            }
            Self::MultiFileClassFacade { .. } | Self::SyntheticClass => None,
        }
    }

    /// Whether the metadata describes package-level (not class-level) declarations
    pub fn is_package_level(&self) -> bool {
        matches!(
            self,
            Self::FileFacade(_) | Self::MultiFileClassFacade { .. } | Self::MultiFileClassPart { .. }
        )
    }

    /// The class descriptor, if this is class metadata
    pub fn as_class(&self) -> Option<&ClassMetadata> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }
}
