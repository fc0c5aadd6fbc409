//! Property assembly
//!
//! A property has no host declaration of its own. It is realized by up to
//! four host members: a backing field, a getter, a setter and an empty
//! `name$annotations` method holding property-targeted annotations. The
//! assembler finds each of them and refuses properties that end up with
//! none.

use crate::error::{ResolveError, ResolveResult};
use crate::index::IndexedProperty;
use crate::signature::host_signature;
use km_host::{DeclId, DeclKind, HostTree, JvmType};
use std::fmt;

/// Suffix of the synthetic annotation holder method
pub const ANNOTATION_HOLDER_SUFFIX: &str = "$annotations";

/// Role a host member plays for a property
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum AccessorRole {
    /// Backing field
    Field,
    /// Getter method
    Getter,
    /// Setter method
    Setter,
    /// `name$annotations` holder method
    AnnotationHolder,
}

impl fmt::Display for AccessorRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Field => "backing field",
            Self::Getter => "getter",
            Self::Setter => "setter",
            Self::AnnotationHolder => "annotation holder",
        })
    }
}

/// Structural classification of a host method as an accessor
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AccessorShape {
    params: usize,
    returns_void: bool,
    holder_name: bool,
}

impl AccessorShape {
    /// Shape of a host method
    pub fn of<T: HostTree + ?Sized>(tree: &T, method: DeclId) -> Self {
        Self {
            params: tree.parameters(method).len(),
            returns_void: tree.ty(method).is_none_or(|ty| *ty == JvmType::Void),
            holder_name: tree.simple_name(method).ends_with(ANNOTATION_HOLDER_SUFFIX),
        }
    }

    /// Role implied by the shape; `receiver` adds one leading parameter
    pub fn role(self, receiver: bool) -> Option<AccessorRole> {
        let implicit = usize::from(receiver);
        if self.holder_name && self.returns_void && self.params <= implicit {
            Some(AccessorRole::AnnotationHolder)
        } else if self.params == implicit && !self.returns_void {
            Some(AccessorRole::Getter)
        } else if self.params == implicit + 1 && self.returns_void {
            Some(AccessorRole::Setter)
        } else {
            None
        }
    }
}

/// Host members realizing one property
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyMatch {
    /// Backing field
    pub field: Option<DeclId>,
    /// Getter
    pub getter: Option<DeclId>,
    /// Setter
    pub setter: Option<DeclId>,
    /// Annotation holder
    pub annotation_holder: Option<DeclId>,
}

impl PropertyMatch {
    /// Every claimed member with its role
    pub fn hosts(&self) -> impl Iterator<Item = (AccessorRole, DeclId)> + '_ {
        [
            (AccessorRole::Field, self.field),
            (AccessorRole::Getter, self.getter),
            (AccessorRole::Setter, self.setter),
            (AccessorRole::AnnotationHolder, self.annotation_holder),
        ]
        .into_iter()
        .filter_map(|(role, decl)| decl.map(|decl| (role, decl)))
    }

    /// Whether neither a field nor an accessor was found
    ///
    /// An annotation holder alone does not realize a property.
    pub const fn is_empty(&self) -> bool {
        self.field.is_none() && self.getter.is_none() && self.setter.is_none()
    }
}

/// Finds the host members of properties declared in one host type
pub struct PropertyAssembler<'tree, T: HostTree + ?Sized> {
    tree: &'tree T,
    owner: String,
    fields: Vec<DeclId>,
    methods: Vec<(DeclId, String)>,
    verify_shapes: bool,
}

impl<'tree, T: HostTree + ?Sized> PropertyAssembler<'tree, T> {
    /// Collect the fields and methods of `owner`
    pub fn new(tree: &'tree T, owner: DeclId, verify_shapes: bool) -> Self {
        let enclosed = tree.enclosed(owner);
        Self {
            tree,
            owner: tree.describe(owner),
            fields: enclosed
                .iter()
                .copied()
                .filter(|&decl| tree.kind(decl) == DeclKind::Field)
                .collect(),
            methods: enclosed
                .iter()
                .copied()
                .filter(|&decl| tree.kind(decl) == DeclKind::Method)
                .map(|decl| (decl, host_signature(tree, decl)))
                .collect(),
            verify_shapes,
        }
    }

    /// Locate the field and accessors of `property`
    pub fn assemble(&self, property: &IndexedProperty) -> ResolveResult<PropertyMatch> {
        if let Some(name) = &property.field_name {
            return Err(ResolveError::NamedFieldSignature {
                owner: self.owner.clone(),
                property: property.name.clone(),
                name: name.clone(),
            });
        }

        let found = PropertyMatch {
            field: self.unique(
                &property.name,
                self.fields
                    .iter()
                    .copied()
                    .filter(|&field| self.tree.simple_name(field) == property.name),
            )?,
            getter: self.accessor(property, AccessorRole::Getter)?,
            setter: self.accessor(property, AccessorRole::Setter)?,
            annotation_holder: self.accessor(property, AccessorRole::AnnotationHolder)?,
        };

        if found.is_empty() {
            return Err(ResolveError::EmptyProperty {
                owner: self.owner.clone(),
                property: property.name.clone(),
            });
        }
        Ok(found)
    }

    fn accessor(
        &self,
        property: &IndexedProperty,
        role: AccessorRole,
    ) -> ResolveResult<Option<DeclId>> {
        let Some(signature) = property.accessor(role) else {
            return Ok(None);
        };
        let found = self.unique(
            signature,
            self.methods
                .iter()
                .filter(|(_, host)| host == signature)
                .map(|&(decl, _)| decl),
        )?;

        match found {
            Some(method)
                if self.verify_shapes
                    && AccessorShape::of(self.tree, method).role(property.has_receiver)
                        != Some(role) =>
            {
                Err(ResolveError::AccessorShapeMismatch {
                    host: self.tree.describe(method),
                    property: property.name.clone(),
                    role,
                })
            }
            _ => Ok(found),
        }
    }

    fn unique(
        &self,
        descriptor: &str,
        mut found: impl Iterator<Item = DeclId>,
    ) -> ResolveResult<Option<DeclId>> {
        match (found.next(), found.next()) {
            (first, None) => Ok(first),
            (Some(first), Some(second)) => Err(ResolveError::AmbiguousCorrespondence {
                owner: self.owner.clone(),
                descriptor: descriptor.to_owned(),
                signature: descriptor.to_owned(),
                candidates: [first, second]
                    .into_iter()
                    .chain(found)
                    .map(|decl| self.tree.describe(decl))
                    .collect(),
            }),
            (None, Some(_)) => Ok(None),
        }
    }
}
