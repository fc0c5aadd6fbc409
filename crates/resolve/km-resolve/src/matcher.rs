//! Pairing descriptors with host executables
//!
//! Matching is by exact JVM signature. A descriptor with defaulted
//! parameters may additionally own "overload siblings": host methods the
//! source compiler emitted with a reduced parameter list.

use crate::error::{ResolveError, ResolveResult};
use crate::index::{DescriptorIndex, IndexedConstructor, IndexedFunction, IndexedParameter};
use crate::signature::{CONSTRUCTOR_NAME, host_signature};
use km_host::{DeclId, DeclKind, HostTree, JvmType};
use std::iter;
use tracing::trace;

/// A host parameter, compared by name and erased type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostParameter {
    /// The parameter declaration
    pub decl: DeclId,
    /// Simple name
    pub name: String,
    /// Erased type
    pub ty: Option<JvmType>,
}

impl HostParameter {
    fn same_as(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

#[derive(Clone, Debug)]
struct Candidate {
    decl: DeclId,
    name: String,
    signature: String,
    params: Vec<HostParameter>,
}

/// What a descriptor looks like to the matcher
#[derive(Clone, Copy, Debug)]
pub struct MatchRequest<'req> {
    /// Descriptor name, for diagnostics
    pub descriptor: &'req str,
    /// Expected JVM signature
    pub signature: &'req str,
    /// Value parameters
    pub parameters: &'req [IndexedParameter],
    /// Host parameters before the value parameters
    pub implicit_leading: usize,
    /// Host parameters after the value parameters
    pub implicit_trailing: usize,
}

impl<'req> MatchRequest<'req> {
    /// Request for a function
    pub fn function(function: &'req IndexedFunction) -> Self {
        Self {
            descriptor: &function.name,
            signature: &function.signature,
            parameters: &function.parameters,
            implicit_leading: function.implicit_leading,
            implicit_trailing: function.implicit_trailing,
        }
    }

    /// Request for a constructor
    pub fn constructor(ctor: &'req IndexedConstructor) -> Self {
        Self {
            descriptor: CONSTRUCTOR_NAME,
            signature: &ctor.signature,
            parameters: &ctor.parameters,
            implicit_leading: 0,
            implicit_trailing: 0,
        }
    }
}

/// Host forms of one descriptor parameter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterMatch {
    /// Parameter of the matched executable
    pub host: DeclId,
    /// Same-named parameters of the overload siblings
    pub overloads: Vec<DeclId>,
}

/// Outcome of matching one descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberMatch {
    /// The executable with the exact signature
    pub host: DeclId,
    /// Overload siblings
    pub overloads: Vec<DeclId>,
    /// One entry per descriptor value parameter
    pub parameters: Vec<ParameterMatch>,
}

impl MemberMatch {
    /// Every host executable claimed by the match
    pub fn hosts(&self) -> impl Iterator<Item = DeclId> + '_ {
        iter::once(self.host).chain(self.overloads.iter().copied())
    }
}

/// Matches descriptors against the methods or constructors of one host type
pub struct MemberMatcher<'tree, T: HostTree + ?Sized> {
    tree: &'tree T,
    owner: String,
    kind: DeclKind,
    candidates: Vec<Candidate>,
    index: Option<&'tree DescriptorIndex>,
}

impl<'tree, T: HostTree + ?Sized> MemberMatcher<'tree, T> {
    /// Candidates are the members of `owner` with the given kind
    pub fn new(tree: &'tree T, owner: DeclId, kind: DeclKind) -> Self {
        let candidates = tree
            .enclosed(owner)
            .iter()
            .filter(|&&decl| tree.kind(decl) == kind)
            .map(|&decl| Candidate {
                decl,
                name: tree.simple_name(decl).to_owned(),
                signature: host_signature(tree, decl),
                params: tree
                    .parameters(decl)
                    .iter()
                    .map(|&param| HostParameter {
                        decl: param,
                        name: tree.simple_name(param).to_owned(),
                        ty: tree.ty(param).map(|ty| ty.erased().clone()),
                    })
                    .collect(),
            })
            .collect();

        Self {
            tree,
            owner: tree.describe(owner),
            kind,
            candidates,
            index: None,
        }
    }

    /// Descriptors of the container; host members whose signature they
    /// record are never overload siblings
    #[must_use]
    pub fn with_index(mut self, index: &'tree DescriptorIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Find the unique host member for `request`, its siblings and parameters
    pub fn match_member(&self, request: &MatchRequest<'_>) -> ResolveResult<MemberMatch> {
        let mut exact = self
            .candidates
            .iter()
            .filter(|candidate| candidate.signature == request.signature);
        let matched = match (exact.next(), exact.next()) {
            (Some(matched), None) => matched,
            (None, _) => {
                return Err(ResolveError::MissingCorrespondence {
                    owner: self.owner.clone(),
                    descriptor: request.descriptor.to_owned(),
                    signature: request.signature.to_owned(),
                });
            }
            (Some(first), Some(second)) => {
                let candidates = [first, second]
                    .into_iter()
                    .chain(exact)
                    .map(|candidate| self.tree.describe(candidate.decl))
                    .collect();
                return Err(ResolveError::AmbiguousCorrespondence {
                    owner: self.owner.clone(),
                    descriptor: request.descriptor.to_owned(),
                    signature: request.signature.to_owned(),
                    candidates,
                });
            }
        };

        let value_params = self.value_parameters(matched, request)?;
        let mut parameters: Vec<ParameterMatch> = value_params
            .iter()
            .map(|param| ParameterMatch {
                host: param.decl,
                overloads: Vec::new(),
            })
            .collect();

        let required: Vec<&HostParameter> = matched
            .params
            .iter()
            .enumerate()
            .filter(|&(position, _)| {
                match position.checked_sub(request.implicit_leading) {
                    Some(value) => request
                        .parameters
                        .get(value)
                        .is_none_or(|param| !param.has_default),
                    None => true,
                }
            })
            .map(|(_, param)| param)
            .collect();

        let mut overloads = Vec::new();
        for sibling in self
            .candidates
            .iter()
            .filter(|candidate| self.is_overload_sibling(matched, candidate, &required))
        {
            trace!(
                sibling = %sibling.signature,
                matched = %matched.signature,
                "overload sibling"
            );
            overloads.push(sibling.decl);
            for param in &sibling.params {
                if let Some(position) = value_params.iter().position(|value| value.same_as(param)) {
                    parameters[position].overloads.push(param.decl);
                }
            }
        }

        Ok(MemberMatch {
            host: matched.decl,
            overloads,
            parameters,
        })
    }

    /// Host value parameters of `matched`, checked against the descriptor's
    fn value_parameters<'cand>(
        &self,
        matched: &'cand Candidate,
        request: &MatchRequest<'_>,
    ) -> ResolveResult<&'cand [HostParameter]> {
        let host = &matched.params;
        let implicit = request.implicit_leading + request.implicit_trailing;
        let value_params = host
            .len()
            .checked_sub(implicit)
            .and_then(|count| host.get(request.implicit_leading..request.implicit_leading + count));

        let value_params = match value_params {
            Some(params) if params.len() == request.parameters.len() => params,
            _ => {
                return Err(ResolveError::ParameterCountMismatch {
                    host: self.tree.describe(matched.decl),
                    descriptor: request.descriptor.to_owned(),
                    host_count: host.len().saturating_sub(implicit),
                    descriptor_count: request.parameters.len(),
                });
            }
        };

        for (position, (host_param, param)) in value_params.iter().zip(request.parameters).enumerate() {
            if host_param.name != param.name {
                return Err(ResolveError::ParameterMismatch {
                    host: self.tree.describe(matched.decl),
                    descriptor: request.descriptor.to_owned(),
                    position,
                    host_name: host_param.name.clone(),
                    descriptor_name: param.name.clone(),
                });
            }
        }
        Ok(value_params)
    }

    fn is_overload_sibling(
        &self,
        matched: &Candidate,
        candidate: &Candidate,
        required: &[&HostParameter],
    ) -> bool {
        candidate.decl != matched.decl
            && candidate.name == matched.name
            && candidate.signature != matched.signature
            && !self
                .index
                .is_some_and(|index| index.reserves(self.kind, &candidate.signature))
            && candidate
                .params
                .iter()
                .all(|param| matched.params.iter().any(|own| own.same_as(param)))
            && required
                .iter()
                .all(|needed| candidate.params.iter().any(|param| param.same_as(needed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_host::DeclTree;
    use km_metadata::{
        ClassDescriptor, ClassKind, ClassMetadata, FunctionDescriptor, JvmMethodSignature,
        ParameterDescriptor, PropertyDescriptor, StringTable, TypeRef,
    };

    fn param(name: &str, has_default: bool) -> IndexedParameter {
        IndexedParameter {
            name: name.to_owned(),
            has_default,
            is_vararg: false,
        }
    }

    fn request<'req>(signature: &'req str, parameters: &'req [IndexedParameter]) -> MatchRequest<'req> {
        MatchRequest {
            descriptor: "draw",
            signature,
            parameters,
            implicit_leading: 0,
            implicit_trailing: 0,
        }
    }

    /// `draw(x: Int, y: Int, scale: Double = 1.0)` with overloads
    fn canvas() -> (DeclTree, DeclId, [DeclId; 3]) {
        let mut tree = DeclTree::new();
        let pkg = tree.add_package("gfx");
        let class = tree.add_type(pkg, DeclKind::Class, "Canvas");

        let full = tree.add_method(class, "draw", JvmType::Void);
        tree.add_parameter(full, "x", JvmType::Int);
        tree.add_parameter(full, "y", JvmType::Int);
        tree.add_parameter(full, "scale", JvmType::Double);

        let reduced = tree.add_method(class, "draw", JvmType::Void);
        tree.add_parameter(reduced, "x", JvmType::Int);
        tree.add_parameter(reduced, "y", JvmType::Int);

        let missing_required = tree.add_method(class, "draw", JvmType::Void);
        tree.add_parameter(missing_required, "x", JvmType::Int);
        tree.add_parameter(missing_required, "scale", JvmType::Double);

        (tree, class, [full, reduced, missing_required])
    }

    #[test]
    fn test_matches_exact_signature_with_siblings() {
        let (tree, class, [full, reduced, missing_required]) = canvas();
        let params = [param("x", false), param("y", false), param("scale", true)];

        let matcher = MemberMatcher::new(&tree, class, DeclKind::Method);
        let found = matcher.match_member(&request("draw(IID)V", &params)).unwrap();

        assert_eq!(found.host, full);
        assert_eq!(found.overloads, vec![reduced]);
        assert!(!found.overloads.contains(&missing_required));
        assert_eq!(found.parameters.len(), 3);
        assert_eq!(found.parameters[0].overloads.len(), 1);
        assert!(found.parameters[2].overloads.is_empty());
    }

    /// `draw(x: Int, y: Int, scale: Double = 1.0)` plus one more descriptor
    fn canvas_index(extra: impl FnOnce(&mut StringTable, &mut ClassDescriptor)) -> DescriptorIndex {
        let mut strings = StringTable::new();
        let class_name = strings.intern("gfx/Canvas").unwrap();
        let draw = strings.intern("draw").unwrap();
        let int = TypeRef::class(strings.intern("kotlin/Int").unwrap());
        let double = TypeRef::class(strings.intern("kotlin/Double").unwrap());
        let unit = TypeRef::class(strings.intern("kotlin/Unit").unwrap());
        let (x, y, scale) = (
            strings.intern("x").unwrap(),
            strings.intern("y").unwrap(),
            strings.intern("scale").unwrap(),
        );

        let mut class = ClassDescriptor::new(class_name, ClassKind::Class).with_function(
            FunctionDescriptor::new(draw, unit)
                .with_parameter(ParameterDescriptor::new(x, int.clone()))
                .with_parameter(ParameterDescriptor::new(y, int))
                .with_parameter(ParameterDescriptor::new(scale, double).with_default()),
        );
        extra(&mut strings, &mut class);
        DescriptorIndex::for_class("gfx.Canvas", &ClassMetadata { strings, class }).unwrap()
    }

    #[test]
    fn test_function_signature_is_never_a_sibling() {
        let (tree, class, [full, ..]) = canvas();
        let params = [param("x", false), param("y", false), param("scale", true)];
        let index = canvas_index(|strings, class| {
            let draw = strings.intern("draw").unwrap();
            let int = TypeRef::class(strings.intern("kotlin/Int").unwrap());
            let unit = TypeRef::class(strings.intern("kotlin/Unit").unwrap());
            let (x, y) = (strings.intern("x").unwrap(), strings.intern("y").unwrap());
            class.functions.push(
                FunctionDescriptor::new(draw, unit)
                    .with_parameter(ParameterDescriptor::new(x, int.clone()))
                    .with_parameter(ParameterDescriptor::new(y, int)),
            );
        });

        let matcher = MemberMatcher::new(&tree, class, DeclKind::Method).with_index(&index);
        let found = matcher.match_member(&request("draw(IID)V", &params)).unwrap();

        assert_eq!(found.host, full);
        assert!(found.overloads.is_empty());
    }

    #[test]
    fn test_accessor_signature_is_never_a_sibling() {
        let (tree, class, [full, reduced, _]) = canvas();
        let params = [param("x", false), param("y", false), param("scale", true)];

        let unrelated = canvas_index(|_, _| ());
        let matcher = MemberMatcher::new(&tree, class, DeclKind::Method).with_index(&unrelated);
        let found = matcher.match_member(&request("draw(IID)V", &params)).unwrap();
        assert_eq!(found.overloads, vec![reduced]);

        let index = canvas_index(|strings, class| {
            let origin = strings.intern("origin").unwrap();
            let int = TypeRef::class(strings.intern("kotlin/Int").unwrap());
            let setter = JvmMethodSignature {
                name: strings.intern("draw").unwrap(),
                desc: strings.intern("(II)V").unwrap(),
            };
            class
                .properties
                .push(PropertyDescriptor::new(origin, int).with_setter(setter));
        });
        let matcher = MemberMatcher::new(&tree, class, DeclKind::Method).with_index(&index);
        let found = matcher.match_member(&request("draw(IID)V", &params)).unwrap();
        assert_eq!(found.host, full);
        assert!(found.overloads.is_empty());
    }

    #[test]
    fn test_missing_and_ambiguous() {
        let (mut tree, class, _) = canvas();
        let params = [param("x", false)];
        let matcher = MemberMatcher::new(&tree, class, DeclKind::Method);
        let err = matcher.match_member(&request("draw(I)V", &params)).unwrap_err();
        assert!(matches!(err, ResolveError::MissingCorrespondence { .. }));

        let copy = tree.add_method(class, "draw", JvmType::Void);
        tree.add_parameter(copy, "x", JvmType::Int);
        tree.add_parameter(copy, "y", JvmType::Int);
        let params = [param("x", false), param("y", false)];
        let matcher = MemberMatcher::new(&tree, class, DeclKind::Method);
        let err = matcher.match_member(&request("draw(II)V", &params)).unwrap_err();
        assert!(matches!(err, ResolveError::AmbiguousCorrespondence { ref candidates, .. } if candidates.len() == 2));
    }

    #[test]
    fn test_parameter_names_must_agree() {
        let (tree, class, _) = canvas();
        let params = [param("x", false), param("height", false)];
        let matcher = MemberMatcher::new(&tree, class, DeclKind::Method);
        let err = matcher.match_member(&request("draw(II)V", &params)).unwrap_err();
        assert!(matches!(err, ResolveError::ParameterMismatch { position: 1, .. }));

        let params = [param("x", false)];
        let err = matcher.match_member(&request("draw(II)V", &params)).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ParameterCountMismatch { host_count: 2, descriptor_count: 1, .. }
        ));
    }

    #[test]
    fn test_receiver_is_skipped() {
        let mut tree = DeclTree::new();
        let pkg = tree.add_package("ext");
        let facade = tree.add_type(pkg, DeclKind::Class, "StringsKt");
        let method = tree.add_method(facade, "shout", JvmType::object("java/lang/String"));
        tree.add_parameter(method, "$this$shout", JvmType::object("java/lang/String"));
        tree.add_parameter(method, "times", JvmType::Int);

        let params = [param("times", false)];
        let request = MatchRequest {
            descriptor: "shout",
            signature: "shout(Ljava/lang/String;I)Ljava/lang/String;",
            parameters: &params,
            implicit_leading: 1,
            implicit_trailing: 0,
        };
        let found = MemberMatcher::new(&tree, facade, DeclKind::Method)
            .match_member(&request)
            .unwrap();
        assert_eq!(found.host, method);
        assert_eq!(found.parameters[0].host, tree.parameters(method)[1]);
    }
}
