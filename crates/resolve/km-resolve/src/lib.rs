//! Correspondence resolution between host declarations and descriptors
//!
//! The host compiler sees a compiled unit as a flat tree of classes,
//! methods, constructors, fields and parameters. The source compiler
//! recorded richer information next to it: which constructor is primary,
//! which parameters have defaults, which methods are property accessors,
//! modality, visibility and the module name used for mangling. This crate
//! pairs the two trees and exposes the result as [`SemanticElement`]s.
//!
//! # Architecture
//!
//! - **Signatures** ([`signature`]): canonical `name(params)return` strings
//!   for both sides, with enum constructor normalization
//! - **Index** ([`DescriptorIndex`]): signature- and name-keyed lookup over
//!   the descriptors of one type or file facade
//! - **Matching** ([`MemberMatcher`]): unique exact-signature match plus
//!   overload siblings generated for defaulted parameters
//! - **Properties** ([`PropertyAssembler`]): field, getter, setter and
//!   annotation holder of each property
//! - **Resolution** ([`ElementResolver`]): dispatch by declaration kind,
//!   atomic per-type resolution and the [`IdentityCache`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use km_resolve::ElementResolver;
//!
//! let mut resolver = ElementResolver::new(&tree);
//! if let Some(id) = resolver.resolve(decl)? {
//!     let element = resolver.element(id);
//! }
//! ```

mod builder;
pub mod cache;
pub mod config;
pub mod element;
pub mod error;
pub mod index;
pub mod mangle;
pub mod matcher;
pub mod property;
pub mod resolver;
pub mod signature;

pub use cache::IdentityCache;
pub use config::{ConfigError, ResolverConfig, DEFAULT_MODULE_NAME};
pub use element::{
    ConstructorElement, ElementId, EnumEntryElement, FileFacadeElement, FunctionElement,
    ImplicitElement, ImplicitKind, PackageElement, ParameterElement, PropertyElement,
    SemanticElement, TypeElement, TypeParameterElement,
};
pub use error::{ResolveError, ResolveResult, UnsupportedFeature};
pub use index::DescriptorIndex;
pub use mangle::NameMangler;
pub use matcher::{MatchRequest, MemberMatch, MemberMatcher};
pub use property::{AccessorRole, AccessorShape, PropertyAssembler, PropertyMatch};
pub use resolver::ElementResolver;
