//! Error types for correspondence resolution
//!
//! Every variant except [`ResolveError::Metadata`] reports a broken
//! invariant between the host tree and the descriptor tree. None of them is
//! recoverable: callers are expected to abort the traversal and report.

use crate::property::AccessorRole;
use km_host::DeclKind;
use km_metadata::MetadataError;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the resolver
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Constructs the resolver refuses to handle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnsupportedFeature {
    /// Module declarations
    Module,
    /// Multi-file class facades and their parts
    MultiFileFacade,
}

impl fmt::Display for UnsupportedFeature {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Module => "module declarations",
            Self::MultiFileFacade => "multi-file class facades",
        })
    }
}

/// Errors raised while pairing host declarations with descriptors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No host member has the descriptor's JVM signature
    #[error("no member of {owner} matches `{descriptor}` with signature {signature}")]
    MissingCorrespondence {
        /// Owning host type
        owner: String,
        /// Descriptor name
        descriptor: String,
        /// Expected JVM signature
        signature: String,
    },

    /// Several host members have the descriptor's JVM signature
    #[error("members {candidates:?} of {owner} all match `{descriptor}` with signature {signature}")]
    AmbiguousCorrespondence {
        /// Owning host type
        owner: String,
        /// Descriptor name
        descriptor: String,
        /// Expected JVM signature
        signature: String,
        /// Every matching host member
        candidates: Vec<String>,
    },

    /// A host parameter and its descriptor disagree on the name
    #[error(
        "parameter #{position} of {host} is `{host_name}` but `{descriptor}` declares `{descriptor_name}`"
    )]
    ParameterMismatch {
        /// The executable
        host: String,
        /// Descriptor name
        descriptor: String,
        /// Zero-based value parameter position
        position: usize,
        /// Host parameter name
        host_name: String,
        /// Descriptor parameter name
        descriptor_name: String,
    },

    /// A host executable and its descriptor disagree on the parameter count
    #[error("{host} has {host_count} value parameters but `{descriptor}` declares {descriptor_count}")]
    ParameterCountMismatch {
        /// The executable
        host: String,
        /// Descriptor name
        descriptor: String,
        /// Host value parameters (implicit ones excluded)
        host_count: usize,
        /// Descriptor value parameters
        descriptor_count: usize,
    },

    /// Two descriptors of one container record the same JVM signature
    #[error("{owner} declares {signature} for both `{first}` and `{second}`")]
    DuplicateDescriptor {
        /// The type or facade
        owner: String,
        /// The shared signature
        signature: String,
        /// Earlier descriptor
        first: String,
        /// Later descriptor
        second: String,
    },

    /// An enum constructor signature lacks the implicit name and ordinal parameters
    #[error("enum constructor signature {signature} of {owner} lacks the name/ordinal prefix")]
    EnumConstructorPrefix {
        /// The enum class
        owner: String,
        /// The offending signature
        signature: String,
    },

    /// The descriptor's class name differs from the host type's qualified name
    #[error("descriptor names class `{descriptor}` but the host type is `{host}`")]
    QualifiedNameMismatch {
        /// Host qualified name
        host: String,
        /// Descriptor qualified name, dotted
        descriptor: String,
    },

    /// A source type contains an initializer block
    #[error("source type {host} declares an initializer block")]
    InitializerInSourceType {
        /// The type
        host: String,
    },

    /// Constructors of a source type violate the primary ordering
    #[error("constructors of {owner}: {reason}")]
    PrimaryConstructorOrder {
        /// The type
        owner: String,
        /// Which rule was broken
        reason: &'static str,
    },

    /// Two descriptors claim the same host declaration
    #[error("{host} is claimed by both {first} and {second}")]
    DoubleClaim {
        /// The host declaration
        host: String,
        /// First claimant
        first: String,
        /// Second claimant
        second: String,
    },

    /// A property matched neither a field nor any accessor
    #[error("property `{property}` of {owner} has no field, getter or setter")]
    EmptyProperty {
        /// The type or facade
        owner: String,
        /// Property name
        property: String,
    },

    /// A property's field signature carries an explicit name
    #[error("field signature of property `{property}` of {owner} carries the name `{name}`")]
    NamedFieldSignature {
        /// The type or facade
        owner: String,
        /// Property name
        property: String,
        /// Recorded field name
        name: String,
    },

    /// A host method claimed as an accessor has the wrong shape for its role
    #[error("{host} cannot be the {role} of property `{property}`")]
    AccessorShapeMismatch {
        /// The method
        host: String,
        /// Property name
        property: String,
        /// Claimed role
        role: AccessorRole,
    },

    /// The companion object named by the descriptor is not a nested class
    #[error("{owner} has {found} nested classes named `{companion}`, expected exactly one")]
    CompanionNotFound {
        /// The type
        owner: String,
        /// Companion simple name
        companion: String,
        /// Candidates found
        found: usize,
    },

    /// The companion object carries no class metadata
    #[error("companion {host} of {owner} carries no class metadata")]
    CompanionWithoutMetadata {
        /// The type
        owner: String,
        /// The companion
        host: String,
    },

    /// A type nested in source declarations has no descriptor of its own
    #[error("{host} is nested in source declarations but carries no metadata")]
    MissingDescriptor {
        /// The type
        host: String,
    },

    /// Host and descriptor type parameters disagree
    #[error(
        "type parameter #{position} of {host} is `{host_name}` but the descriptor declares `{descriptor_name}`"
    )]
    TypeParameterMismatch {
        /// The type or executable
        host: String,
        /// Zero-based position
        position: usize,
        /// Host name, empty when missing
        host_name: String,
        /// Descriptor name, empty when missing
        descriptor_name: String,
    },

    /// The owner of a type parameter cannot declare type parameters
    #[error("{host} cannot declare type parameters")]
    NoTypeParameters {
        /// The owner
        host: String,
    },

    /// A function descriptor has sealed modality
    #[error("function `{descriptor}` of {owner} is sealed")]
    SealedFunction {
        /// The type or facade
        owner: String,
        /// Function name
        descriptor: String,
    },

    /// The declaration kind never corresponds to a source declaration
    #[error("{host} of kind {kind:?} has no source counterpart")]
    UnsupportedKind {
        /// The declaration
        host: String,
        /// Its kind
        kind: DeclKind,
    },

    /// A recognized but unsupported construct
    #[error("{host}: {feature} are not supported")]
    Unsupported {
        /// The declaration
        host: String,
        /// What is unsupported
        feature: UnsupportedFeature,
    },

    /// The descriptor tree is malformed
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
