//! Source-level type references inside descriptors

use crate::strings::StrId;
use serde::{Deserialize, Serialize};

/// What a type reference points at
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Classifier {
    /// A class, by its slash-separated qualified name (`kotlin/collections/List`)
    Class(StrId),
    /// A type parameter, by its descriptor-level id
    TypeParameter(u32),
}

/// Declaration-site or use-site variance
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Variance {
    /// No variance annotation
    #[default]
    Invariant,
    /// `in`
    In,
    /// `out`
    Out,
}

/// A single type argument; `ty == None` is a star projection
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TypeProjection {
    /// Use-site variance
    pub variance: Variance,
    /// Projected type, absent for `*`
    pub ty: Option<TypeRef>,
}

/// A type as written in source
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Referenced classifier
    pub classifier: Classifier,
    /// Whether the type is marked nullable
    #[serde(default)]
    pub nullable: bool,
    /// Type arguments in declaration order
    #[serde(default)]
    pub arguments: Vec<TypeProjection>,
}

impl TypeRef {
    /// Non-null reference to a class without arguments
    pub fn class(name: StrId) -> Self {
        Self {
            classifier: Classifier::Class(name),
            nullable: false,
            arguments: Vec::new(),
        }
    }

    /// Non-null reference to a type parameter
    pub fn type_parameter(id: u32) -> Self {
        Self {
            classifier: Classifier::TypeParameter(id),
            nullable: false,
            arguments: Vec::new(),
        }
    }

    /// Mark the type nullable
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Append an invariant type argument
    #[must_use]
    pub fn with_argument(mut self, ty: TypeRef) -> Self {
        self.arguments.push(TypeProjection {
            variance: Variance::Invariant,
            ty: Some(ty),
        });
        self
    }

    /// Append a star projection
    #[must_use]
    pub fn with_star(mut self) -> Self {
        self.arguments.push(TypeProjection {
            variance: Variance::Invariant,
            ty: None,
        });
        self
    }
}
