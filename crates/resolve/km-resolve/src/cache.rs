//! Identity cache
//!
//! Maps every claimed host declaration to its element so that resolving the
//! same declaration twice yields the same [`ElementId`]. Elements built for
//! a type are staged in a [`Batch`] and only become visible when the whole
//! type has resolved.

use crate::element::{ElementId, SemanticElement};
use crate::error::{ResolveError, ResolveResult};
use km_host::{DeclId, HostTree};
use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;

/// Element storage and host-to-element identity map
#[derive(Debug, Default)]
pub struct IdentityCache {
    elements: Arena<SemanticElement>,
    by_decl: FxHashMap<DeclId, ElementId>,
    carriers: FxHashMap<DeclId, Option<DeclId>>,
    companions: FxHashMap<ElementId, Option<ElementId>>,
}

impl IdentityCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element was created yet
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element previously produced for a host declaration
    pub fn get(&self, decl: DeclId) -> Option<ElementId> {
        self.by_decl.get(&decl).copied()
    }

    /// Borrow an element; `None` for ids of another resolver
    pub fn element(&self, id: ElementId) -> Option<&SemanticElement> {
        (id.index() < self.elements.len()).then(|| &self.elements[Idx::from(id)])
    }

    /// All elements in creation order
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &SemanticElement)> + '_ {
        self.elements
            .iter()
            .map(|(idx, element)| (ElementId::from(idx), element))
    }

    /// Store a single element for `decl`
    pub(crate) fn insert(&mut self, decl: DeclId, element: SemanticElement) -> ElementId {
        let id = ElementId::from(self.elements.alloc(element));
        self.by_decl.insert(decl, id);
        id
    }

    /// Map another host declaration to an existing element
    pub(crate) fn alias(&mut self, decl: DeclId, id: ElementId) {
        self.by_decl.insert(decl, id);
    }

    /// Start staging elements; ids are assigned as if committed
    pub(crate) fn begin(&self) -> Batch {
        Batch {
            base: self.elements.len() as u32,
            elements: Arena::new(),
            claims: FxHashMap::default(),
        }
    }

    /// Make a staged batch visible
    pub(crate) fn commit(&mut self, batch: Batch) {
        debug_assert_eq!(batch.base as usize, self.elements.len());
        self.elements
            .alloc_many(batch.elements.into_iter().map(|(_, element)| element));
        self.by_decl.extend(batch.claims);
    }

    pub(crate) fn carrier(&self, decl: DeclId) -> Option<Option<DeclId>> {
        self.carriers.get(&decl).copied()
    }

    pub(crate) fn remember_carrier(&mut self, decl: DeclId, carrier: Option<DeclId>) {
        self.carriers.insert(decl, carrier);
    }

    pub(crate) fn companion(&self, owner: ElementId) -> Option<Option<ElementId>> {
        self.companions.get(&owner).copied()
    }

    pub(crate) fn remember_companion(&mut self, owner: ElementId, companion: Option<ElementId>) {
        self.companions.insert(owner, companion);
    }
}

/// Elements and claims staged for one type
///
/// Staged elements live in their own arena; an element at local index `i`
/// gets the id `base + i`, which is where [`IdentityCache::commit`] puts it.
#[derive(Debug)]
pub(crate) struct Batch {
    base: u32,
    elements: Arena<SemanticElement>,
    claims: FxHashMap<DeclId, ElementId>,
}

impl Batch {
    pub(crate) fn push(&mut self, element: SemanticElement) -> ElementId {
        let local = self.elements.alloc(element);
        ElementId(self.base + u32::from(local.into_raw()))
    }

    fn local(&self, id: ElementId) -> Option<Idx<SemanticElement>> {
        let offset = id.0.checked_sub(self.base)?;
        let local = ElementId(offset);
        (local.index() < self.elements.len()).then(|| Idx::from(local))
    }

    pub(crate) fn get(&self, id: ElementId) -> Option<&SemanticElement> {
        self.local(id).map(|local| &self.elements[local])
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut SemanticElement> {
        let local = self.local(id)?;
        Some(&mut self.elements[local])
    }

    /// Record that `element` corresponds to `decl`
    ///
    /// A declaration may be claimed repeatedly by the same element; a second
    /// element is an error.
    pub(crate) fn claim<T: HostTree + ?Sized>(
        &mut self,
        tree: &T,
        decl: DeclId,
        element: ElementId,
    ) -> ResolveResult<()> {
        match self.claims.get(&decl) {
            Some(&previous) if previous != element => Err(ResolveError::DoubleClaim {
                host: tree.describe(decl),
                first: self.describe(previous),
                second: self.describe(element),
            }),
            Some(_) => Ok(()),
            None => {
                self.claims.insert(decl, element);
                Ok(())
            }
        }
    }

    fn describe(&self, id: ElementId) -> String {
        self.get(id)
            .map(|element| format!("{} `{}`", element.kind_name(), element.name()))
            .unwrap_or_default()
    }
}
