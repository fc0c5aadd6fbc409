//! Staging the members of one source type or file facade
//!
//! The builder runs every matcher for one container and pushes the
//! resulting elements into a [`Batch`]. Nothing is visible to the cache
//! until the resolver commits the finished batch, so a failure anywhere
//! leaves no partial state behind.

use crate::cache::Batch;
use crate::element::{
    ConstructorElement, ElementId, EnumEntryElement, FunctionElement, ParameterElement,
    PropertyElement, SemanticElement, TypeParameterElement,
};
use crate::error::{ResolveError, ResolveResult};
use crate::index::{DescriptorIndex, IndexedParameter};
use crate::matcher::{MatchRequest, MemberMatch, MemberMatcher};
use crate::property::PropertyAssembler;
use km_host::{DeclId, DeclKind, HostTree};
use km_metadata::{
    ConstructorDescriptor, FunctionDescriptor, FunctionFlags, Modality, PropertyDescriptor,
    StringTable, TypeParameterDescriptor,
};
use std::iter;
use tracing::trace;

pub(crate) struct MemberBuilder<'tree, T: HostTree + ?Sized> {
    tree: &'tree T,
    host: DeclId,
    owner: ElementId,
    batch: Batch,
    verify_shapes: bool,
}

impl<'tree, T: HostTree + ?Sized> MemberBuilder<'tree, T> {
    /// Stage `element` as the container for the members of `host`
    pub(crate) fn new(
        tree: &'tree T,
        host: DeclId,
        mut batch: Batch,
        element: SemanticElement,
        verify_shapes: bool,
    ) -> ResolveResult<Self> {
        let owner = batch.push(element);
        batch.claim(tree, host, owner)?;
        Ok(Self {
            tree,
            host,
            owner,
            batch,
            verify_shapes,
        })
    }

    pub(crate) fn owner(&self) -> ElementId {
        self.owner
    }

    pub(crate) fn owner_mut(&mut self) -> Option<&mut SemanticElement> {
        self.batch.get_mut(self.owner)
    }

    pub(crate) fn finish(self) -> Batch {
        self.batch
    }

    fn claim_all(
        &mut self,
        decls: impl IntoIterator<Item = DeclId>,
        element: ElementId,
    ) -> ResolveResult<()> {
        for decl in decls {
            self.batch.claim(self.tree, decl, element)?;
        }
        Ok(())
    }

    /// Pair descriptor type parameters with those of `host`, by position and name
    pub(crate) fn type_parameters(
        &mut self,
        host: DeclId,
        owner: ElementId,
        strings: &StringTable,
        descriptors: &[TypeParameterDescriptor],
    ) -> ResolveResult<Vec<ElementId>> {
        let tree = self.tree;
        let hosts = tree.type_parameters(host);
        let mismatch = |position: usize, descriptor_name: String| ResolveError::TypeParameterMismatch {
            host: tree.describe(host),
            position,
            host_name: hosts
                .get(position)
                .map(|&param| tree.simple_name(param).to_owned())
                .unwrap_or_default(),
            descriptor_name,
        };

        if hosts.len() != descriptors.len() {
            let position = hosts.len().min(descriptors.len());
            let descriptor_name = match descriptors.get(position) {
                Some(param) => strings.get(param.name)?.to_owned(),
                None => String::new(),
            };
            return Err(mismatch(position, descriptor_name));
        }

        let mut ids = Vec::with_capacity(descriptors.len());
        for (position, (&param, descriptor)) in hosts.iter().zip(descriptors).enumerate() {
            let name = strings.get(descriptor.name)?;
            if tree.simple_name(param) != name {
                return Err(mismatch(position, name.to_owned()));
            }
            let id = self
                .batch
                .push(SemanticElement::TypeParameter(TypeParameterElement {
                    host: param,
                    owner,
                    name: name.to_owned(),
                    variance: descriptor.variance,
                    reified: descriptor.reified,
                }));
            self.batch.claim(tree, param, id)?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn parameters(
        &mut self,
        owner: ElementId,
        found: &MemberMatch,
        descriptors: &[IndexedParameter],
    ) -> ResolveResult<Vec<ElementId>> {
        let mut ids = Vec::with_capacity(descriptors.len());
        for (position, (matched, param)) in found.parameters.iter().zip(descriptors).enumerate() {
            let id = self.batch.push(SemanticElement::Parameter(ParameterElement {
                host: matched.host,
                overload_hosts: matched.overloads.clone(),
                owner,
                name: param.name.clone(),
                position,
                has_default: param.has_default,
                is_vararg: param.is_vararg,
            }));
            self.claim_all(
                iter::once(matched.host).chain(matched.overloads.iter().copied()),
                id,
            )?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Match every constructor descriptor; the result lists the primary first
    pub(crate) fn constructors(
        &mut self,
        index: &DescriptorIndex,
        descriptors: &[ConstructorDescriptor],
    ) -> ResolveResult<Vec<ElementId>> {
        let tree = self.tree;
        let matcher = MemberMatcher::new(tree, self.host, DeclKind::Constructor).with_index(index);

        let mut staged = Vec::with_capacity(descriptors.len());
        for (indexed, descriptor) in index.constructors().iter().zip(descriptors) {
            let found = matcher.match_member(&MatchRequest::constructor(indexed))?;
            if !tree.type_parameters(found.host).is_empty() {
                return Err(ResolveError::NoTypeParameters {
                    host: tree.describe(found.host),
                });
            }

            let id = self.batch.push(SemanticElement::Constructor(ConstructorElement {
                host: found.host,
                overloads: found.overloads.clone(),
                owner: self.owner,
                kind: descriptor.kind,
                visibility: descriptor.visibility,
                signature: indexed.signature.clone(),
                parameters: Vec::new(),
            }));
            self.claim_all(found.hosts(), id)?;
            let params = self.parameters(id, &found, &indexed.parameters)?;
            if let Some(SemanticElement::Constructor(ctor)) = self.batch.get_mut(id) {
                ctor.parameters = params;
            }
            staged.push((descriptor.is_primary(), id));
        }

        // Stable, so secondaries keep their declaration order
        staged.sort_by_key(|&(is_primary, _)| !is_primary);
        let primaries = staged.iter().filter(|&&(is_primary, _)| is_primary).count();
        let reason = match staged.first() {
            None => None,
            Some(&(false, _)) => Some("no primary constructor"),
            Some(_) if primaries > 1 => Some("more than one primary constructor"),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            return Err(ResolveError::PrimaryConstructorOrder {
                owner: tree.describe(self.host),
                reason,
            });
        }
        Ok(staged.into_iter().map(|(_, id)| id).collect())
    }

    /// Match every function descriptor
    pub(crate) fn functions(
        &mut self,
        index: &DescriptorIndex,
        strings: &StringTable,
        descriptors: &[FunctionDescriptor],
    ) -> ResolveResult<Vec<ElementId>> {
        let tree = self.tree;
        let matcher = MemberMatcher::new(tree, self.host, DeclKind::Method).with_index(index);

        let mut ids = Vec::with_capacity(descriptors.len());
        for (indexed, descriptor) in index.functions().iter().zip(descriptors) {
            if descriptor.modality == Modality::Sealed {
                return Err(ResolveError::SealedFunction {
                    owner: tree.describe(self.host),
                    descriptor: indexed.name.clone(),
                });
            }

            let found = matcher.match_member(&MatchRequest::function(indexed))?;
            let id = self.batch.push(SemanticElement::Function(FunctionElement {
                host: found.host,
                overloads: found.overloads.clone(),
                owner: self.owner,
                name: indexed.name.clone(),
                signature: indexed.signature.clone(),
                modality: descriptor.modality,
                visibility: descriptor.visibility,
                flags: descriptor.flags,
                is_extension: descriptor.receiver.is_some(),
                parameters: Vec::new(),
                type_parameters: Vec::new(),
            }));
            self.claim_all(found.hosts(), id)?;

            let params = self.parameters(id, &found, &indexed.parameters)?;
            let type_params =
                self.type_parameters(found.host, id, strings, &descriptor.type_parameters)?;
            if let Some(SemanticElement::Function(function)) = self.batch.get_mut(id) {
                function.parameters = params;
                function.type_parameters = type_params;
            }
            if descriptor.flags.contains(FunctionFlags::SUSPEND) {
                trace!(function = %indexed.name, "suspend function, continuation parameter is implicit");
            }
            ids.push(id);
        }
        Ok(ids)
    }

    /// Assemble every property descriptor
    pub(crate) fn properties(
        &mut self,
        index: &DescriptorIndex,
        descriptors: &[PropertyDescriptor],
    ) -> ResolveResult<Vec<ElementId>> {
        let assembler = PropertyAssembler::new(self.tree, self.host, self.verify_shapes);
        let mut ids = Vec::with_capacity(descriptors.len());
        for (indexed, descriptor) in index.properties().iter().zip(descriptors) {
            let found = assembler.assemble(indexed)?;
            let id = self.batch.push(SemanticElement::Property(PropertyElement {
                owner: self.owner,
                name: indexed.name.clone(),
                field: found.field,
                getter: found.getter,
                setter: found.setter,
                annotation_holder: found.annotation_holder,
                modality: descriptor.modality,
                visibility: descriptor.visibility,
                flags: descriptor.flags,
                is_extension: descriptor.receiver.is_some(),
            }));
            self.claim_all(found.hosts().map(|(_, decl)| decl), id)?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Pair enum entry names with host enum constants
    pub(crate) fn enum_entries(&mut self, index: &DescriptorIndex) -> ResolveResult<Vec<ElementId>> {
        let tree = self.tree;
        let mut constants: Vec<Vec<DeclId>> = vec![Vec::new(); index.enum_entries().len()];
        for &decl in tree.enclosed(self.host) {
            if tree.kind(decl) == DeclKind::EnumConstant
                && let Some(ordinal) = index.enum_entry_named(tree.simple_name(decl))
                && let Some(slot) = constants.get_mut(ordinal)
            {
                slot.push(decl);
            }
        }

        let mut ids = Vec::with_capacity(constants.len());
        for (ordinal, (name, matching)) in index.enum_entries().iter().zip(constants).enumerate() {
            let host = match matching.as_slice() {
                [host] => *host,
                [] => {
                    return Err(ResolveError::MissingCorrespondence {
                        owner: tree.describe(self.host),
                        descriptor: name.clone(),
                        signature: name.clone(),
                    });
                }
                several => {
                    return Err(ResolveError::AmbiguousCorrespondence {
                        owner: tree.describe(self.host),
                        descriptor: name.clone(),
                        signature: name.clone(),
                        candidates: several.iter().map(|&decl| tree.describe(decl)).collect(),
                    });
                }
            };

            let id = self.batch.push(SemanticElement::EnumEntry(EnumEntryElement {
                host,
                owner: self.owner,
                name: name.clone(),
                ordinal,
            }));
            self.batch.claim(tree, host, id)?;
            ids.push(id);
        }
        Ok(ids)
    }
}
