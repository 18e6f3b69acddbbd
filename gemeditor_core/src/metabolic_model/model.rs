//! This module provides the Model struct for representing an entire metabolic model
//!
//! The model owns every entity in insertion ordered arenas. Everything else refers to entities
//! through the typed handles in [`keys`](super::keys), and all links between entities (gene
//! tree, evidence registration, reference registration) are indexes held here, so both sides of
//! a link are always changed together.
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::evidence::reference::Reference;
use crate::evidence::{Evidence, Item, LinkHolder};
use crate::metabolic_model::gene::{Gene, GeneGroup};
use crate::metabolic_model::keys::{
    CompartmentKey, EvidenceKey, GeneGroupKey, GeneKey, MetaboliteKey, ModelTestKey,
    ReactionKey, ReferenceKey,
};
use crate::metabolic_model::metabolite::{Compartment, Metabolite};
use crate::metabolic_model::reaction::{BalanceStatus, Reaction};
use crate::metabolic_model::tree::{GeneTree, TreeError, TreeNode};
use crate::model_test::ModelTest;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Id associated with the Model
    pub id: Option<String>,
    /// Human readable name of the Model
    pub name: Option<String>,
    pub(crate) reactions: IndexMap<ReactionKey, Reaction>,
    pub(crate) metabolites: IndexMap<MetaboliteKey, Metabolite>,
    pub(crate) genes: IndexMap<GeneKey, Gene>,
    pub(crate) gene_groups: IndexMap<GeneGroupKey, GeneGroup>,
    pub(crate) compartments: IndexMap<CompartmentKey, Compartment>,
    pub(crate) references: IndexMap<ReferenceKey, Reference>,
    pub(crate) tests: IndexMap<ModelTestKey, ModelTest>,
    pub(crate) evidences: IndexMap<EvidenceKey, Evidence>,
    /// Gene reaction rule links
    pub(crate) tree: GeneTree,
    /// Evidences registered with each item
    pub(crate) evidence_index: IndexMap<Item, IndexSet<EvidenceKey>>,
    /// Holders registered with each reference
    pub(crate) reference_index: IndexMap<ReferenceKey, IndexSet<LinkHolder>>,
    next_key: usize,
}

/// Errors associated with the Model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} is not part of the model")]
    ReactionNotFound(ReactionKey),
    #[error("Metabolite {0} is not part of the model")]
    MetaboliteNotFound(MetaboliteKey),
    #[error("Gene {0} is not part of the model")]
    GeneNotFound(GeneKey),
    #[error("Gene group {0} is not part of the model")]
    GeneGroupNotFound(GeneGroupKey),
    #[error("Compartment {0} is not part of the model")]
    CompartmentNotFound(CompartmentKey),
    #[error("Evidence {0} is not part of the model")]
    EvidenceNotFound(EvidenceKey),
    #[error("Reference {0} is not part of the model")]
    ReferenceNotFound(ReferenceKey),
    #[error("Test {0} is not part of the model")]
    TestNotFound(ModelTestKey),
    #[error("Invalid gene tree change")]
    Tree(#[from] TreeError),
}

impl Model {
    pub fn new_empty() -> Self {
        Model::default()
    }

    fn allocate(&mut self) -> usize {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    // region Adding entities
    /// Add a reaction to the model
    ///
    /// # Examples
    /// ```rust
    /// use gemeditor_core::metabolic_model::model::Model;
    /// use gemeditor_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// let key = model.add_reaction(new_reaction);
    /// assert_eq!(model.reaction(key).unwrap().id, "new_reaction");
    /// ```
    pub fn add_reaction(&mut self, mut reaction: Reaction) -> ReactionKey {
        // Stoichiometry copied from another reaction may only refer to metabolites of this model
        reaction
            .metabolites
            .retain(|m, c| self.metabolites.contains_key(m) && *c != 0.);
        let key = ReactionKey(self.allocate());
        self.reactions.insert(key, reaction);
        key
    }

    pub fn add_metabolite(&mut self, metabolite: Metabolite) -> MetaboliteKey {
        let key = MetaboliteKey(self.allocate());
        self.metabolites.insert(key, metabolite);
        key
    }

    /// Add a gene to the model
    ///
    /// # Examples
    /// ```rust
    /// use gemeditor_core::metabolic_model::gene::GeneBuilder;
    /// use gemeditor_core::metabolic_model::model::Model;
    /// let mut model = Model::new_empty();
    /// let new_gene = GeneBuilder::default().id("new_gene".to_string()).build().unwrap();
    /// model.add_gene(new_gene);
    /// ```
    pub fn add_gene(&mut self, gene: Gene) -> GeneKey {
        let key = GeneKey(self.allocate());
        self.genes.insert(key, gene);
        key
    }

    pub fn add_gene_group(&mut self, group: GeneGroup) -> GeneGroupKey {
        let key = GeneGroupKey(self.allocate());
        self.gene_groups.insert(key, group);
        key
    }

    pub fn add_compartment(&mut self, compartment: Compartment) -> CompartmentKey {
        let key = CompartmentKey(self.allocate());
        self.compartments.insert(key, compartment);
        key
    }

    /// Add a reference, evidences and tests are linked to it with [`Model::add_reference_link`]
    pub fn add_reference(&mut self, reference: Reference) -> ReferenceKey {
        let key = ReferenceKey(self.allocate());
        self.references.insert(key, reference);
        key
    }

    /// Add a model test, registering it with every reference it holds
    pub fn add_test(&mut self, mut test: ModelTest) -> ModelTestKey {
        let key = ModelTestKey(self.allocate());
        test.references.retain(|r| self.references.contains_key(r));
        for reference in test.references.iter() {
            self.reference_index
                .entry(*reference)
                .or_default()
                .insert(LinkHolder::ModelTest(key));
        }
        self.tests.insert(key, test);
        key
    }

    pub(crate) fn insert_evidence(&mut self, evidence: Evidence) -> EvidenceKey {
        let key = EvidenceKey(self.allocate());
        self.evidences.insert(key, evidence);
        key
    }
    // endregion Adding entities

    // region Access
    pub fn reactions(&self) -> &IndexMap<ReactionKey, Reaction> {
        &self.reactions
    }

    pub fn metabolites(&self) -> &IndexMap<MetaboliteKey, Metabolite> {
        &self.metabolites
    }

    pub fn genes(&self) -> &IndexMap<GeneKey, Gene> {
        &self.genes
    }

    pub fn gene_groups(&self) -> &IndexMap<GeneGroupKey, GeneGroup> {
        &self.gene_groups
    }

    pub fn compartments(&self) -> &IndexMap<CompartmentKey, Compartment> {
        &self.compartments
    }

    pub fn references(&self) -> &IndexMap<ReferenceKey, Reference> {
        &self.references
    }

    pub fn tests(&self) -> &IndexMap<ModelTestKey, ModelTest> {
        &self.tests
    }

    /// Every evidence owned by the model, linked or not
    pub fn all_evidences(&self) -> &IndexMap<EvidenceKey, Evidence> {
        &self.evidences
    }

    pub fn gene_tree(&self) -> &GeneTree {
        &self.tree
    }

    pub fn reaction(&self, key: ReactionKey) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(&key)
            .ok_or(ModelError::ReactionNotFound(key))
    }

    pub fn reaction_mut(&mut self, key: ReactionKey) -> Result<&mut Reaction, ModelError> {
        self.reactions
            .get_mut(&key)
            .ok_or(ModelError::ReactionNotFound(key))
    }

    pub fn metabolite(&self, key: MetaboliteKey) -> Result<&Metabolite, ModelError> {
        self.metabolites
            .get(&key)
            .ok_or(ModelError::MetaboliteNotFound(key))
    }

    pub fn metabolite_mut(&mut self, key: MetaboliteKey) -> Result<&mut Metabolite, ModelError> {
        self.metabolites
            .get_mut(&key)
            .ok_or(ModelError::MetaboliteNotFound(key))
    }

    pub fn gene(&self, key: GeneKey) -> Result<&Gene, ModelError> {
        self.genes.get(&key).ok_or(ModelError::GeneNotFound(key))
    }

    pub fn gene_mut(&mut self, key: GeneKey) -> Result<&mut Gene, ModelError> {
        self.genes.get_mut(&key).ok_or(ModelError::GeneNotFound(key))
    }

    pub fn gene_group(&self, key: GeneGroupKey) -> Result<&GeneGroup, ModelError> {
        self.gene_groups
            .get(&key)
            .ok_or(ModelError::GeneGroupNotFound(key))
    }

    pub fn gene_group_mut(&mut self, key: GeneGroupKey) -> Result<&mut GeneGroup, ModelError> {
        self.gene_groups
            .get_mut(&key)
            .ok_or(ModelError::GeneGroupNotFound(key))
    }

    pub fn compartment(&self, key: CompartmentKey) -> Result<&Compartment, ModelError> {
        self.compartments
            .get(&key)
            .ok_or(ModelError::CompartmentNotFound(key))
    }

    pub fn reference(&self, key: ReferenceKey) -> Result<&Reference, ModelError> {
        self.references
            .get(&key)
            .ok_or(ModelError::ReferenceNotFound(key))
    }

    pub fn reference_mut(&mut self, key: ReferenceKey) -> Result<&mut Reference, ModelError> {
        self.references
            .get_mut(&key)
            .ok_or(ModelError::ReferenceNotFound(key))
    }

    pub fn test(&self, key: ModelTestKey) -> Result<&ModelTest, ModelError> {
        self.tests.get(&key).ok_or(ModelError::TestNotFound(key))
    }

    pub fn test_mut(&mut self, key: ModelTestKey) -> Result<&mut ModelTest, ModelError> {
        self.tests.get_mut(&key).ok_or(ModelError::TestNotFound(key))
    }

    /// Find a reaction by its (display) id
    pub fn reaction_by_id(&self, id: &str) -> Option<ReactionKey> {
        self.reactions
            .iter()
            .find(|(_, r)| r.id == id)
            .map(|(k, _)| *k)
    }

    /// Find a metabolite by its (display) id
    pub fn metabolite_by_id(&self, id: &str) -> Option<MetaboliteKey> {
        self.metabolites
            .iter()
            .find(|(_, m)| m.id == id)
            .map(|(k, _)| *k)
    }

    /// Find a gene by its (display) id
    pub fn gene_by_id(&self, id: &str) -> Option<GeneKey> {
        self.genes.iter().find(|(_, g)| g.id == id).map(|(k, _)| *k)
    }
    // endregion Access

    // region Stoichiometry
    /// Add metabolites to a reaction
    ///
    /// With `combine` set the coefficients are added to those already present, otherwise they
    /// replace them. Entries whose coefficient ends up at zero are removed.
    pub fn add_metabolites(
        &mut self,
        reaction: ReactionKey,
        metabolites: &IndexMap<MetaboliteKey, f64>,
        combine: bool,
    ) -> Result<(), ModelError> {
        if let Some(missing) = metabolites
            .keys()
            .find(|m| !self.metabolites.contains_key(*m))
        {
            return Err(ModelError::MetaboliteNotFound(*missing));
        }
        let reaction = self
            .reactions
            .get_mut(&reaction)
            .ok_or(ModelError::ReactionNotFound(reaction))?;
        for (metabolite, coefficient) in metabolites {
            let new_value = if combine {
                reaction.coefficient(*metabolite) + coefficient
            } else {
                *coefficient
            };
            if new_value == 0. {
                reaction.metabolites.shift_remove(metabolite);
            } else {
                reaction.metabolites.insert(*metabolite, new_value);
            }
        }
        Ok(())
    }

    /// Subtract metabolites from a reaction, the inverse of combining [`Model::add_metabolites`]
    pub fn subtract_metabolites(
        &mut self,
        reaction: ReactionKey,
        metabolites: &IndexMap<MetaboliteKey, f64>,
    ) -> Result<(), ModelError> {
        let negated: IndexMap<MetaboliteKey, f64> =
            metabolites.iter().map(|(m, c)| (*m, -c)).collect();
        self.add_metabolites(reaction, &negated, true)
    }

    /// Reactions in which a metabolite takes part with a nonzero coefficient
    pub fn metabolite_reactions(&self, metabolite: MetaboliteKey) -> IndexSet<ReactionKey> {
        self.reactions
            .iter()
            .filter(|(_, r)| r.coefficient(metabolite) != 0.)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Check the elemental and charge balance of a reaction
    pub fn reaction_balance(&self, key: ReactionKey) -> Result<BalanceStatus, ModelError> {
        let reaction = self.reaction(key)?;
        if reaction.metabolites.is_empty() || reaction.boundary() {
            return Ok(BalanceStatus::Unknown);
        }
        let tolerance = crate::configuration::current().balance_tolerance;
        let mut elements: IndexMap<String, f64> = IndexMap::new();
        let mut charge = 0.;
        for (metabolite, coefficient) in reaction.metabolites.iter() {
            let metabolite = self.metabolite(*metabolite)?;
            let formula = match metabolite.parsed_formula() {
                Some(Ok(formula)) => formula,
                _ => return Ok(BalanceStatus::Unknown),
            };
            for (element, count) in formula.elements {
                *elements.entry(element).or_insert(0.) += coefficient * count;
            }
            charge += coefficient * metabolite.charge as f64;
        }
        elements.retain(|_, amount| amount.abs() > tolerance);
        if elements.is_empty() && charge.abs() <= tolerance {
            Ok(BalanceStatus::Balanced)
        } else {
            Ok(BalanceStatus::Unbalanced { elements, charge })
        }
    }
    // endregion Stoichiometry

    // region Gene tree
    fn contains_node(&self, node: TreeNode) -> Result<(), ModelError> {
        match node {
            TreeNode::Reaction(k) => self.reaction(k).map(|_| ()),
            TreeNode::Gene(k) => self.gene(k).map(|_| ()),
            TreeNode::GeneGroup(k) => self.gene_group(k).map(|_| ()),
        }
    }

    /// Attach a gene or gene group below a reaction or gene group
    pub fn add_child<P: Into<TreeNode>, C: Into<TreeNode>>(
        &mut self,
        parent: P,
        child: C,
    ) -> Result<(), ModelError> {
        let (parent, child) = (parent.into(), child.into());
        self.contains_node(parent)?;
        self.contains_node(child)?;
        Ok(self.tree.add_child(parent, child)?)
    }

    /// Detach one occurrence of a child, or all of them
    pub fn remove_child<P: Into<TreeNode>, C: Into<TreeNode>>(
        &mut self,
        parent: P,
        child: C,
        all: bool,
    ) -> Result<(), ModelError> {
        Ok(self.tree.remove_child(parent.into(), child.into(), all)?)
    }

    pub fn add_parent<C: Into<TreeNode>, P: Into<TreeNode>>(
        &mut self,
        child: C,
        parent: P,
    ) -> Result<(), ModelError> {
        let (child, parent) = (child.into(), parent.into());
        self.contains_node(parent)?;
        self.contains_node(child)?;
        Ok(self.tree.add_parent(child, parent)?)
    }

    pub fn remove_parent<C: Into<TreeNode>, P: Into<TreeNode>>(
        &mut self,
        child: C,
        parent: P,
        all: bool,
    ) -> Result<(), ModelError> {
        Ok(self.tree.remove_parent(child.into(), parent.into(), all)?)
    }

    pub fn children<N: Into<TreeNode>>(&self, node: N) -> &[TreeNode] {
        self.tree.children(node.into())
    }

    pub fn parents<N: Into<TreeNode>>(&self, node: N) -> &[TreeNode] {
        self.tree.parents(node.into())
    }

    /// Genes reachable below a node
    pub fn genes_of<N: Into<TreeNode>>(&self, node: N) -> IndexSet<GeneKey> {
        self.tree.genes(node.into())
    }

    /// Reactions reachable above a node
    pub fn reactions_of<N: Into<TreeNode>>(&self, node: N) -> IndexSet<ReactionKey> {
        self.tree.reactions(node.into())
    }

    /// Functional state of a node of the gene tree
    ///
    /// - Genes report their own flag
    /// - Gene groups combine their children according to their type, and are undetermined
    ///   (None) without children
    /// - Reactions are functional without children, otherwise every direct child has to be
    ///   functional
    pub fn functional<N: Into<TreeNode>>(&self, node: N) -> Option<bool> {
        let node = node.into();
        match node {
            TreeNode::Gene(key) => self.genes.get(&key).map(|g| g.functional),
            TreeNode::GeneGroup(key) => {
                let group = self.gene_groups.get(&key)?;
                group
                    .group_type
                    .combine(self.tree.children(node).iter().map(|c| self.functional(*c)))
            }
            TreeNode::Reaction(key) => {
                self.reactions.get(&key)?;
                Some(
                    self.tree
                        .children(node)
                        .iter()
                        .all(|c| self.functional(*c) == Some(true)),
                )
            }
        }
    }

    pub fn reaction_functional(&self, key: ReactionKey) -> Result<bool, ModelError> {
        self.reaction(key)?;
        Ok(self.functional(key) == Some(true))
    }

    /// Render the gene reaction rule of a reaction as a boolean expression of gene ids
    ///
    /// # Examples
    /// ```rust
    /// use gemeditor_core::metabolic_model::gene::{Gene, GeneGroup};
    /// use gemeditor_core::metabolic_model::model::Model;
    /// use gemeditor_core::metabolic_model::reaction::Reaction;
    /// let mut model = Model::new_empty();
    /// let reaction = model.add_reaction(Reaction::new("r1"));
    /// let group = model.add_gene_group(GeneGroup::new_or());
    /// let g1 = model.add_gene(Gene::new("g1"));
    /// let g2 = model.add_gene(Gene::new("g2"));
    /// model.add_child(reaction, group).unwrap();
    /// model.add_child(group, g1).unwrap();
    /// model.add_child(group, g2).unwrap();
    /// assert_eq!(model.gene_reaction_rule(reaction).unwrap(), "g1 or g2");
    /// ```
    pub fn gene_reaction_rule(&self, key: ReactionKey) -> Result<String, ModelError> {
        self.reaction(key)?;
        let parts: Vec<(String, usize)> = self
            .tree
            .children(TreeNode::Reaction(key))
            .iter()
            .map(|c| self.render_clause(*c))
            .filter(|(rendered, _)| !rendered.is_empty())
            .collect();
        // Multi clause groups are only enclosed next to other top level children
        let nested = parts.len() > 1;
        Ok(parts
            .into_iter()
            .map(|(rendered, clauses)| enclose(rendered, nested && clauses > 1))
            .collect::<Vec<String>>()
            .join(" and "))
    }

    /// Render a gene or gene group without outer parentheses, with the number of clauses joined
    fn render_clause(&self, node: TreeNode) -> (String, usize) {
        match node {
            TreeNode::Gene(key) => match self.genes.get(&key) {
                Some(gene) => (gene.id.clone(), 1),
                None => (String::new(), 0),
            },
            TreeNode::GeneGroup(key) => {
                let Some(group) = self.gene_groups.get(&key) else {
                    return (String::new(), 0);
                };
                let parts: Vec<String> = self
                    .tree
                    .children(node)
                    .iter()
                    .map(|c| self.render_clause(*c))
                    .filter(|(rendered, _)| !rendered.is_empty())
                    .map(|(rendered, clauses)| enclose(rendered, clauses > 1))
                    .collect();
                let joined = parts.join(&format!(" {} ", group.group_type.keyword()));
                (joined, parts.len())
            }
            TreeNode::Reaction(_) => (String::new(), 0),
        }
    }
    // endregion Gene tree

    // region Removal
    /// Remove reactions, detaching their gene reaction rules and dropping evidences about them
    ///
    /// All keys are checked before anything is changed, so a failed call leaves the model
    /// untouched.
    pub fn remove_reactions(&mut self, keys: &[ReactionKey]) -> Result<(), ModelError> {
        for key in keys {
            self.reaction(*key)?;
        }
        for key in keys {
            if !self.reactions.contains_key(key) {
                continue;
            }
            let children = self.tree.prepare_deletion(TreeNode::Reaction(*key));
            self.dispose_orphan_groups(children);
            self.drop_item_links(Item::Reaction(*key));
            for test in self.tests.values_mut() {
                test.forget_reaction(*key);
            }
            self.reactions.shift_remove(key);
        }
        Ok(())
    }

    /// Remove metabolites from the model and from every reaction they take part in
    pub fn remove_metabolites(&mut self, keys: &[MetaboliteKey]) -> Result<(), ModelError> {
        for key in keys {
            self.metabolite(*key)?;
        }
        for key in keys {
            for reaction in self.reactions.values_mut() {
                reaction.metabolites.shift_remove(key);
            }
            self.drop_item_links(Item::Metabolite(*key));
            self.metabolites.shift_remove(key);
        }
        Ok(())
    }

    /// Remove genes, detaching them from every gene reaction rule
    pub fn remove_genes(&mut self, keys: &[GeneKey]) -> Result<(), ModelError> {
        for key in keys {
            self.gene(*key)?;
        }
        for key in keys {
            if !self.genes.contains_key(key) {
                continue;
            }
            self.tree.prepare_deletion(TreeNode::Gene(*key));
            self.drop_item_links(Item::Gene(*key));
            for test in self.tests.values_mut() {
                test.forget_gene(*key);
            }
            self.genes.shift_remove(key);
        }
        Ok(())
    }

    /// Remove a gene group, child groups left without any parent are removed as well
    pub fn remove_gene_group(&mut self, key: GeneGroupKey) -> Result<(), ModelError> {
        self.gene_group(key)?;
        let children = self.tree.prepare_deletion(TreeNode::GeneGroup(key));
        self.gene_groups.shift_remove(&key);
        self.dispose_orphan_groups(children);
        Ok(())
    }

    pub fn remove_compartment(&mut self, key: CompartmentKey) -> Result<(), ModelError> {
        self.compartment(key)?;
        self.drop_item_links(Item::Compartment(key));
        self.compartments.shift_remove(&key);
        Ok(())
    }

    /// Remove a reference, unlinking it from every evidence and test
    pub fn remove_reference(&mut self, key: ReferenceKey) -> Result<(), ModelError> {
        self.reference(key)?;
        for holder in self.reference_index.shift_remove(&key).unwrap_or_default() {
            match holder {
                LinkHolder::Evidence(evidence) => {
                    if let Some(e) = self.evidences.get_mut(&evidence) {
                        e.references.shift_remove(&key);
                    }
                }
                LinkHolder::ModelTest(test) => {
                    if let Some(t) = self.tests.get_mut(&test) {
                        t.references.shift_remove(&key);
                    }
                }
            }
        }
        // Links set without registration are not in the index
        for evidence in self.evidences.values_mut() {
            evidence.references.shift_remove(&key);
        }
        self.references.shift_remove(&key);
        Ok(())
    }

    pub fn remove_test(&mut self, key: ModelTestKey) -> Result<(), ModelError> {
        let test = self.tests.shift_remove(&key).ok_or(ModelError::TestNotFound(key))?;
        for reference in test.references.iter() {
            self.unregister_reference(*reference, LinkHolder::ModelTest(key));
        }
        Ok(())
    }

    /// Remove gene groups that were left without parents, recursing into their children
    fn dispose_orphan_groups(&mut self, nodes: Vec<TreeNode>) {
        let mut stack = nodes;
        while let Some(node) = stack.pop() {
            if let TreeNode::GeneGroup(key) = node {
                if self.tree.parents(node).is_empty() && self.gene_groups.contains_key(&key) {
                    stack.extend(self.tree.prepare_deletion(node));
                    self.gene_groups.shift_remove(&key);
                }
            }
        }
    }
    // endregion Removal
}

fn enclose(rendered: String, parenthesize: bool) -> String {
    if parenthesize {
        format!("({})", rendered)
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::gene::GroupType;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;

    fn metabolite(id: &str, formula: &str, charge: i32) -> Metabolite {
        MetaboliteBuilder::default()
            .id(id.to_string())
            .formula(Some(formula.to_string()))
            .charge(charge)
            .compartment(Some("c".to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn keys_are_identities() {
        let mut model = Model::new_empty();
        let a = model.add_gene(Gene::new("same"));
        let b = model.add_gene(Gene::new("same"));
        assert_ne!(a, b);
        model.remove_genes(&[a]).unwrap();
        let c = model.add_gene(Gene::new("same"));
        assert_ne!(a, c);
        assert_eq!(model.gene(a), Err(ModelError::GeneNotFound(a)));
    }

    #[test]
    fn gene_group_functional() {
        let mut model = Model::new_empty();
        let working = model.add_gene(Gene::new("working"));
        let mut broken_gene = Gene::new("broken");
        broken_gene.functional = false;
        let broken = model.add_gene(broken_gene);

        let and_group = model.add_gene_group(GeneGroup::new_and());
        assert_eq!(model.functional(and_group), None);
        model.add_child(and_group, working).unwrap();
        assert_eq!(model.functional(and_group), Some(true));
        model.add_child(and_group, broken).unwrap();
        assert_eq!(model.functional(and_group), Some(false));

        let or_group = model.add_gene_group(GeneGroup::new_or());
        model.add_child(or_group, broken).unwrap();
        assert_eq!(model.functional(or_group), Some(false));
        model.add_child(or_group, working).unwrap();
        assert_eq!(model.functional(or_group), Some(true));

        // Switching the type changes the evaluation
        model.gene_group_mut(or_group).unwrap().group_type = GroupType::And;
        assert_eq!(model.functional(or_group), Some(false));
    }

    #[test]
    fn reaction_functional() {
        let mut model = Model::new_empty();
        let reaction = model.add_reaction(Reaction::new("r1"));
        assert!(model.reaction_functional(reaction).unwrap());

        let g1 = model.add_gene(Gene::new("g1"));
        let g2 = model.add_gene(Gene::new("g2"));
        model.add_child(reaction, g1).unwrap();
        model.add_child(reaction, g2).unwrap();
        assert!(model.reaction_functional(reaction).unwrap());
        model.gene_mut(g2).unwrap().functional = false;
        assert!(!model.reaction_functional(reaction).unwrap());

        // An empty group below a reaction is not functional
        let other = model.add_reaction(Reaction::new("r2"));
        let empty = model.add_gene_group(GeneGroup::new_or());
        model.add_child(other, empty).unwrap();
        assert!(!model.reaction_functional(other).unwrap());
    }

    #[test]
    fn rule_rendering() {
        let mut model = Model::new_empty();
        let reaction = model.add_reaction(Reaction::new("r1"));
        let g1 = model.add_gene(Gene::new("g1"));
        let g2 = model.add_gene(Gene::new("g2"));
        let g3 = model.add_gene(Gene::new("g3"));
        assert_eq!(model.gene_reaction_rule(reaction).unwrap(), "");

        model.add_child(reaction, g1).unwrap();
        assert_eq!(model.gene_reaction_rule(reaction).unwrap(), "g1");

        // Single top level group renders without parentheses
        model.remove_child(reaction, g1, false).unwrap();
        let top = model.add_gene_group(GeneGroup::new_or());
        model.add_child(reaction, top).unwrap();
        model.add_child(top, g1).unwrap();
        model.add_child(top, g2).unwrap();
        assert_eq!(model.gene_reaction_rule(reaction).unwrap(), "g1 or g2");

        // Nested groups with more than one child are enclosed
        let nested = model.add_gene_group(GeneGroup::new_and());
        model.add_child(top, nested).unwrap();
        model.add_child(nested, g2).unwrap();
        model.add_child(nested, g3).unwrap();
        assert_eq!(
            model.gene_reaction_rule(reaction).unwrap(),
            "g1 or g2 or (g2 and g3)"
        );

        // Empty groups are skipped, single child groups are not enclosed
        let empty = model.add_gene_group(GeneGroup::new_and());
        model.add_child(top, empty).unwrap();
        let single = model.add_gene_group(GeneGroup::new_and());
        model.add_child(top, single).unwrap();
        model.add_child(single, g3).unwrap();
        assert_eq!(
            model.gene_reaction_rule(reaction).unwrap(),
            "g1 or g2 or (g2 and g3) or g3"
        );
    }

    #[test]
    fn rule_rendering_with_several_top_level_children() {
        let mut model = Model::new_empty();
        let reaction = model.add_reaction(Reaction::new("r1"));
        let g1 = model.add_gene(Gene::new("g1"));
        let g2 = model.add_gene(Gene::new("g2"));
        let g3 = model.add_gene(Gene::new("g3"));
        let group = model.add_gene_group(GeneGroup::new_or());
        model.add_child(reaction, g1).unwrap();
        model.add_child(reaction, group).unwrap();
        model.add_child(group, g2).unwrap();
        model.add_child(group, g3).unwrap();
        assert_eq!(
            model.gene_reaction_rule(reaction).unwrap(),
            "g1 and (g2 or g3)"
        );
    }

    #[test]
    fn rule_rendering_of_deep_nesting() {
        let mut model = Model::new_empty();
        let reaction = model.add_reaction(Reaction::new("r1"));
        let genes: Vec<GeneKey> = (1..=4)
            .map(|i| model.add_gene(Gene::new(&format!("g{i}"))))
            .collect();
        let top = model.add_gene_group(GeneGroup::new_and());
        let middle = model.add_gene_group(GeneGroup::new_or());
        let bottom = model.add_gene_group(GeneGroup::new_and());
        model.add_child(reaction, top).unwrap();
        model.add_child(top, genes[0]).unwrap();
        model.add_child(top, middle).unwrap();
        model.add_child(middle, genes[1]).unwrap();
        model.add_child(middle, bottom).unwrap();
        model.add_child(bottom, genes[2]).unwrap();
        model.add_child(bottom, genes[3]).unwrap();
        assert_eq!(
            model.gene_reaction_rule(reaction).unwrap(),
            "g1 and (g2 or (g3 and g4))"
        );

        // A second top level child encloses the former top group
        model.add_child(reaction, genes[3]).unwrap();
        assert_eq!(
            model.gene_reaction_rule(reaction).unwrap(),
            "(g1 and (g2 or (g3 and g4))) and g4"
        );
    }

    #[test]
    fn tree_changes_require_known_entities() {
        let mut model = Model::new_empty();
        let reaction = model.add_reaction(Reaction::new("r1"));
        let gene = model.add_gene(Gene::new("g1"));
        model.remove_genes(&[gene]).unwrap();
        assert_eq!(
            model.add_child(reaction, gene),
            Err(ModelError::GeneNotFound(gene))
        );
        let other = model.add_gene(Gene::new("g2"));
        assert!(matches!(
            model.add_child(other, reaction),
            Err(ModelError::Tree(TreeError::GeneCannotHaveChildren(_)))
        ));
    }

    #[test]
    fn stoichiometry_changes() {
        let mut model = Model::new_empty();
        let a = model.add_metabolite(metabolite("a", "C", 0));
        let b = model.add_metabolite(metabolite("b", "C", 0));
        let reaction = model.add_reaction(Reaction::new("r1"));
        model
            .add_metabolites(reaction, &IndexMap::from([(a, -1.), (b, 1.)]), true)
            .unwrap();
        model
            .add_metabolites(reaction, &IndexMap::from([(a, -1.)]), true)
            .unwrap();
        assert_eq!(model.reaction(reaction).unwrap().coefficient(a), -2.);
        model
            .subtract_metabolites(reaction, &IndexMap::from([(b, 1.)]))
            .unwrap();
        // Zero coefficients are dropped
        assert!(!model.reaction(reaction).unwrap().metabolites().contains_key(&b));
        assert!(model.metabolite_reactions(b).is_empty());
        assert_eq!(
            model.metabolite_reactions(a).into_iter().collect::<Vec<_>>(),
            vec![reaction]
        );
    }

    #[test]
    fn balance_check() {
        let mut model = Model::new_empty();
        let glucose = model.add_metabolite(metabolite("glc", "C6H12O6", 0));
        let g6p = model.add_metabolite(metabolite("g6p", "C6H11O9P", -2));
        let atp = model.add_metabolite(metabolite("atp", "C10H12N5O13P3", -4));
        let adp = model.add_metabolite(metabolite("adp", "C10H12N5O10P2", -3));
        let h = model.add_metabolite(metabolite("h", "H", 1));

        let hex = model.add_reaction(Reaction::new("HEX1"));
        model
            .add_metabolites(
                hex,
                &IndexMap::from([(glucose, -1.), (atp, -1.), (g6p, 1.), (adp, 1.), (h, 1.)]),
                true,
            )
            .unwrap();
        assert_eq!(model.reaction_balance(hex).unwrap(), BalanceStatus::Balanced);

        model
            .subtract_metabolites(hex, &IndexMap::from([(h, 1.)]))
            .unwrap();
        match model.reaction_balance(hex).unwrap() {
            BalanceStatus::Unbalanced { elements, charge } => {
                assert_eq!(elements["H"], -1.);
                assert_eq!(charge, -1.);
            }
            other => panic!("Expected unbalanced reaction, got {:?}", other),
        }

        let exchange = model.add_reaction(Reaction::new("EX_glc"));
        model
            .add_metabolites(exchange, &IndexMap::from([(glucose, -1.)]), true)
            .unwrap();
        assert_eq!(
            model.reaction_balance(exchange).unwrap(),
            BalanceStatus::Unknown
        );
    }

    #[test]
    fn removing_reaction_disposes_orphan_groups() {
        let mut model = Model::new_empty();
        let reaction = model.add_reaction(Reaction::new("r1"));
        let top = model.add_gene_group(GeneGroup::new_or());
        let inner = model.add_gene_group(GeneGroup::new_and());
        let gene = model.add_gene(Gene::new("g1"));
        model.add_child(reaction, top).unwrap();
        model.add_child(top, inner).unwrap();
        model.add_child(inner, gene).unwrap();

        model.remove_reactions(&[reaction]).unwrap();
        assert!(model.gene_groups().is_empty());
        assert!(model.gene(gene).is_ok());
        assert!(model.parents(gene).is_empty());
        assert!(model.gene_tree().is_consistent());
    }

    #[test]
    fn failed_removal_changes_nothing() {
        let mut model = Model::new_empty();
        let r1 = model.add_reaction(Reaction::new("r1"));
        let r2 = model.add_reaction(Reaction::new("r2"));
        model.remove_reactions(&[r2]).unwrap();
        assert_eq!(
            model.remove_reactions(&[r1, r2]),
            Err(ModelError::ReactionNotFound(r2))
        );
        assert!(model.reaction(r1).is_ok());
    }

    #[test]
    fn removing_metabolite_updates_reactions() {
        let mut model = Model::new_empty();
        let a = model.add_metabolite(metabolite("a", "C", 0));
        let b = model.add_metabolite(metabolite("b", "C", 0));
        let reaction = model.add_reaction(Reaction::new("r1"));
        model
            .add_metabolites(reaction, &IndexMap::from([(a, -1.), (b, 1.)]), true)
            .unwrap();
        model.remove_metabolites(&[a]).unwrap();
        assert_eq!(
            model.reaction(reaction).unwrap().metabolites(),
            &IndexMap::from([(b, 1.)])
        );
    }
}
