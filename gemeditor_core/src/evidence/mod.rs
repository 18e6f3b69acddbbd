//! Evidence: checkable claims about model entities
//!
//! An [`Evidence`] links an entity (and optionally a second item, its target) to an
//! [`Assertion`](assertion::Assertion). Registration of an evidence with the items and
//! references it names is held by the [`Model`]. [`Model::copy_evidence`] hands out a detached
//! draft that lives outside the model, which is edited freely and then stored with
//! [`Model::commit_evidence`] or written back over the original with [`Model::replace_evidence`].
pub mod assertion;
pub mod reference;

use indexmap::IndexSet;
use thiserror::Error;
use uuid::Uuid;

use crate::evidence::assertion::Assertion;
use crate::metabolic_model::keys::{
    CompartmentKey, EvidenceKey, GeneKey, MetaboliteKey, ModelTestKey, ReactionKey, ReferenceKey,
};
use crate::metabolic_model::model::{Model, ModelError};

/// Biological item an evidence can be about or point to
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Item {
    Reaction(ReactionKey),
    Metabolite(MetaboliteKey),
    Gene(GeneKey),
    Compartment(CompartmentKey),
}

impl From<ReactionKey> for Item {
    fn from(key: ReactionKey) -> Self {
        Item::Reaction(key)
    }
}

impl From<MetaboliteKey> for Item {
    fn from(key: MetaboliteKey) -> Self {
        Item::Metabolite(key)
    }
}

impl From<GeneKey> for Item {
    fn from(key: GeneKey) -> Self {
        Item::Gene(key)
    }
}

impl From<CompartmentKey> for Item {
    fn from(key: CompartmentKey) -> Self {
        Item::Compartment(key)
    }
}

/// Anything that can cite references
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum LinkHolder {
    Evidence(EvidenceKey),
    ModelTest(ModelTestKey),
}

/// A claim about a biological item
#[derive(Clone, Debug, PartialEq)]
pub struct Evidence {
    /// Stable id, shared by copies of the evidence
    pub internal_id: Uuid,
    /// Kind of claim
    pub assertion: Assertion,
    /// Evidence code ontology term
    pub eco: Option<String>,
    /// Free text comment
    pub comment: Option<String>,
    pub(crate) entity: Option<Item>,
    pub(crate) target: Option<Item>,
    pub(crate) references: IndexSet<ReferenceKey>,
}

impl Evidence {
    /// Item the claim is about
    pub fn entity(&self) -> Option<Item> {
        self.entity
    }

    /// Second item the claim relates the entity to
    pub fn target(&self) -> Option<Item> {
        self.target
    }

    /// References supporting the claim
    pub fn references(&self) -> &IndexSet<ReferenceKey> {
        &self.references
    }

    /// Point a detached draft at another entity, checked on commit
    pub fn set_entity(&mut self, entity: Option<Item>) {
        self.entity = entity;
    }

    /// Point a detached draft at another target, checked on commit
    pub fn set_target(&mut self, target: Option<Item>) {
        self.target = target;
    }

    /// References of a detached draft, checked on commit
    pub fn references_mut(&mut self) -> &mut IndexSet<ReferenceKey> {
        &mut self.references
    }

    fn links_item(&self, item: Item) -> bool {
        self.entity == Some(item) || self.target == Some(item)
    }
}

/// Errors associated with evidences
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvidenceError {
    #[error("{item:?} is neither entity nor target of evidence {evidence}")]
    ItemNotLinked { evidence: EvidenceKey, item: Item },
    #[error(transparent)]
    Model(#[from] ModelError),
}

// Model associated functions for working with evidences
impl Model {
    fn check_item(&self, item: Item) -> Result<(), ModelError> {
        match item {
            Item::Reaction(k) => self.reaction(k).map(|_| ()),
            Item::Metabolite(k) => self.metabolite(k).map(|_| ()),
            Item::Gene(k) => self.gene(k).map(|_| ()),
            Item::Compartment(k) => self.compartment(k).map(|_| ()),
        }
    }

    /// Create an evidence, registered with its entity and target
    ///
    /// # Examples
    /// ```rust
    /// use gemeditor_core::evidence::assertion::Assertion;
    /// use gemeditor_core::evidence::Item;
    /// use gemeditor_core::metabolic_model::model::Model;
    /// use gemeditor_core::metabolic_model::reaction::Reaction;
    /// let mut model = Model::new_empty();
    /// let reaction = model.add_reaction(Reaction::new("r1"));
    /// let evidence = model
    ///     .add_evidence(Item::Reaction(reaction), Assertion::Present, Some("ECO:0000000"), None, None)
    ///     .unwrap();
    /// assert_eq!(model.item_evidences(Item::Reaction(reaction)), vec![evidence]);
    /// ```
    pub fn add_evidence(
        &mut self,
        entity: Item,
        assertion: Assertion,
        eco: Option<&str>,
        comment: Option<&str>,
        target: Option<Item>,
    ) -> Result<EvidenceKey, ModelError> {
        self.check_item(entity)?;
        if let Some(target) = target {
            self.check_item(target)?;
        }
        let key = self.insert_evidence(Evidence {
            internal_id: Uuid::new_v4(),
            assertion,
            eco: eco.map(str::to_string),
            comment: comment.map(str::to_string),
            entity: None,
            target: None,
            references: IndexSet::new(),
        });
        self.set_evidence_entity(key, Some(entity), true)?;
        self.set_evidence_target(key, target, true)?;
        Ok(key)
    }

    pub fn evidence(&self, key: EvidenceKey) -> Result<&Evidence, ModelError> {
        self.evidences
            .get(&key)
            .ok_or(ModelError::EvidenceNotFound(key))
    }

    /// Mutable access to the plain fields of an evidence, links are changed through the model
    pub fn evidence_mut(&mut self, key: EvidenceKey) -> Result<&mut Evidence, ModelError> {
        self.evidences
            .get_mut(&key)
            .ok_or(ModelError::EvidenceNotFound(key))
    }

    /// Evidences registered with an item
    pub fn item_evidences(&self, item: Item) -> Vec<EvidenceKey> {
        self.evidence_index
            .get(&item)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Holders registered with a reference
    pub fn reference_linked_items(&self, reference: ReferenceKey) -> Vec<LinkHolder> {
        self.reference_index
            .get(&reference)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn register_evidence(&mut self, item: Item, evidence: EvidenceKey) {
        self.evidence_index.entry(item).or_default().insert(evidence);
    }

    /// Unregister unless the evidence still links the item through its other slot
    fn unregister_evidence(&mut self, item: Item, evidence: EvidenceKey) {
        if self
            .evidences
            .get(&evidence)
            .is_some_and(|e| e.links_item(item))
        {
            return;
        }
        if let Some(set) = self.evidence_index.get_mut(&item) {
            set.shift_remove(&evidence);
            if set.is_empty() {
                self.evidence_index.shift_remove(&item);
            }
        }
    }

    pub(crate) fn unregister_reference(&mut self, reference: ReferenceKey, holder: LinkHolder) {
        if let Some(set) = self.reference_index.get_mut(&reference) {
            set.shift_remove(&holder);
            if set.is_empty() {
                self.reference_index.shift_remove(&reference);
            }
        }
    }

    /// Change the entity of an evidence
    ///
    /// The evidence is unregistered from the old entity and, if `reciprocal` is set, registered
    /// with the new one.
    pub fn set_evidence_entity(
        &mut self,
        key: EvidenceKey,
        entity: Option<Item>,
        reciprocal: bool,
    ) -> Result<(), ModelError> {
        if let Some(item) = entity {
            self.check_item(item)?;
        }
        let evidence = self.evidence_mut(key)?;
        let old = std::mem::replace(&mut evidence.entity, entity);
        if let Some(old) = old {
            self.unregister_evidence(old, key);
        }
        if let (Some(new), true) = (entity, reciprocal) {
            self.register_evidence(new, key);
        }
        Ok(())
    }

    /// Change the target of an evidence, see [`Model::set_evidence_entity`]
    pub fn set_evidence_target(
        &mut self,
        key: EvidenceKey,
        target: Option<Item>,
        reciprocal: bool,
    ) -> Result<(), ModelError> {
        if let Some(item) = target {
            self.check_item(item)?;
        }
        let evidence = self.evidence_mut(key)?;
        let old = std::mem::replace(&mut evidence.target, target);
        if let Some(old) = old {
            self.unregister_evidence(old, key);
        }
        if let (Some(new), true) = (target, reciprocal) {
            self.register_evidence(new, key);
        }
        Ok(())
    }

    /// Cite a reference from an evidence or test
    pub fn add_reference_link(
        &mut self,
        holder: LinkHolder,
        reference: ReferenceKey,
    ) -> Result<(), ModelError> {
        self.reference(reference)?;
        match holder {
            LinkHolder::Evidence(key) => {
                self.evidence_mut(key)?.references.insert(reference);
            }
            LinkHolder::ModelTest(key) => {
                self.test_mut(key)?.references.insert(reference);
            }
        }
        self.reference_index
            .entry(reference)
            .or_default()
            .insert(holder);
        Ok(())
    }

    /// Stop citing a reference from an evidence or test
    pub fn remove_reference_link(
        &mut self,
        holder: LinkHolder,
        reference: ReferenceKey,
    ) -> Result<(), ModelError> {
        match holder {
            LinkHolder::Evidence(key) => {
                self.evidence_mut(key)?.references.shift_remove(&reference);
            }
            LinkHolder::ModelTest(key) => {
                self.test_mut(key)?.references.shift_remove(&reference);
            }
        }
        self.unregister_reference(reference, holder);
        Ok(())
    }

    /// Detached draft of an evidence
    ///
    /// The copy shares the internal id, assertion, eco code, comment, entity, target and
    /// references of the original. It is not part of the model, so neither the items it names
    /// nor [`Model::all_evidences`] know about it.
    pub fn copy_evidence(&self, key: EvidenceKey) -> Result<Evidence, ModelError> {
        Ok(self.evidence(key)?.clone())
    }

    fn check_links(&self, evidence: &Evidence) -> Result<(), ModelError> {
        for item in evidence.entity.into_iter().chain(evidence.target) {
            self.check_item(item)?;
        }
        for reference in evidence.references.iter() {
            self.reference(*reference)?;
        }
        Ok(())
    }

    /// Store a detached evidence as a new model evidence and register its links
    pub fn commit_evidence(&mut self, evidence: Evidence) -> Result<EvidenceKey, ModelError> {
        self.check_links(&evidence)?;
        let key = self.insert_evidence(evidence);
        self.setup_evidence_links(key)?;
        Ok(key)
    }

    /// Write an edited draft back over an existing evidence, keeping its key
    ///
    /// The old links are dropped before the links of the draft are registered.
    pub fn replace_evidence(
        &mut self,
        key: EvidenceKey,
        evidence: Evidence,
    ) -> Result<(), ModelError> {
        self.evidence(key)?;
        self.check_links(&evidence)?;
        self.delete_evidence_links(key)?;
        *self.evidence_mut(key)? = evidence;
        self.setup_evidence_links(key)
    }

    /// Register an evidence with its entity, target and references
    pub fn setup_evidence_links(&mut self, key: EvidenceKey) -> Result<(), ModelError> {
        let evidence = self.evidence(key)?;
        let items: Vec<Item> = evidence.entity.into_iter().chain(evidence.target).collect();
        let references: Vec<ReferenceKey> = evidence.references.iter().copied().collect();
        for item in items {
            self.register_evidence(item, key);
        }
        for reference in references {
            self.reference_index
                .entry(reference)
                .or_default()
                .insert(LinkHolder::Evidence(key));
        }
        Ok(())
    }

    /// Detach an evidence from its entity, target and references
    pub fn delete_evidence_links(&mut self, key: EvidenceKey) -> Result<(), ModelError> {
        self.set_evidence_entity(key, None, false)?;
        self.set_evidence_target(key, None, false)?;
        let references = std::mem::take(&mut self.evidence_mut(key)?.references);
        for reference in references {
            self.unregister_reference(reference, LinkHolder::Evidence(key));
        }
        Ok(())
    }

    /// Detach and discard an evidence
    pub fn remove_evidence(&mut self, key: EvidenceKey) -> Result<(), ModelError> {
        self.delete_evidence_links(key)?;
        self.evidences.shift_remove(&key);
        Ok(())
    }

    /// Replace `old` by `new` in an evidence, used when merging entities
    ///
    /// The entity is checked first, then the target.
    pub fn substitute_evidence_item(
        &mut self,
        key: EvidenceKey,
        old: Item,
        new: Item,
    ) -> Result<(), EvidenceError> {
        let evidence = self.evidence(key)?;
        let (entity, target) = (evidence.entity, evidence.target);
        if entity == Some(old) {
            self.set_evidence_entity(key, Some(new), true)?;
        } else if target == Some(old) {
            self.set_evidence_target(key, Some(new), true)?;
        } else {
            return Err(EvidenceError::ItemNotLinked { evidence: key, item: old });
        }
        Ok(())
    }

    /// Drop every evidence about an item that is being removed, and clear targets pointing to it
    pub(crate) fn drop_item_links(&mut self, item: Item) {
        for key in self.item_evidences(item) {
            let Some(evidence) = self.evidences.get(&key) else {
                continue;
            };
            let result = if evidence.entity == Some(item) {
                self.remove_evidence(key)
            } else {
                self.set_evidence_target(key, None, false)
            };
            if let Err(err) = result {
                tracing::warn!(evidence = %key, error = %err, "could not unlink evidence");
            }
        }
        // Links set without registration are not in the index
        for evidence in self.evidences.values_mut() {
            if evidence.entity == Some(item) {
                evidence.entity = None;
            }
            if evidence.target == Some(item) {
                evidence.target = None;
            }
        }
        self.evidence_index.shift_remove(&item);
    }
}
