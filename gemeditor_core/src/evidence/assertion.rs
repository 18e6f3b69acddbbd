//! Catalogue of assertions and the registry evaluating them
//!
//! Each [`Assertion`] has a validity check and optionally a fix procedure. The checks are
//! collected in an [`AssertionRegistry`] which is passed to whoever evaluates evidences, so
//! different catalogues can coexist.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evidence::{Evidence, Item};
use crate::metabolic_model::keys::{CompartmentKey, EvidenceKey, GeneKey, ReactionKey};
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::tree::TreeNode;

/// Kinds of claims an evidence can make
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assertion {
    /// A gene product catalyzes a reaction
    CatalyzingReaction,
    /// A gene product does not catalyze a reaction
    NotCatalyzingReaction,
    /// A reaction can run in both directions
    Reversible,
    /// A reaction can only run in one direction
    Irreversible,
    /// A reaction or metabolite is present in the organism
    Present,
    /// A reaction or metabolite is absent from the organism
    Absent,
    /// A gene product is located in a compartment
    Localization,
}

impl Assertion {
    pub const ALL: [Assertion; 7] = [
        Assertion::CatalyzingReaction,
        Assertion::NotCatalyzingReaction,
        Assertion::Reversible,
        Assertion::Irreversible,
        Assertion::Present,
        Assertion::Absent,
        Assertion::Localization,
    ];

    /// Name of the assertion as shown to users
    pub fn name(&self) -> &'static str {
        match self {
            Assertion::CatalyzingReaction => "Catalyzing reaction",
            Assertion::NotCatalyzingReaction => "Not catalyzing reaction",
            Assertion::Reversible => "Reversible",
            Assertion::Irreversible => "Irreversible",
            Assertion::Present => "Present",
            Assertion::Absent => "Absent",
            Assertion::Localization => "Localization",
        }
    }
}

impl Display for Assertion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Assertion {
    type Err = AssertionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Assertion::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| AssertionError::UnknownAssertion(s.to_string()))
    }
}

/// Reasons an assertion could not be evaluated or fixed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertionError {
    #[error("Unknown assertion: {0}")]
    UnknownAssertion(String),
    #[error("Evidence has no entity")]
    MissingEntity,
    #[error("Evidence has no target")]
    MissingTarget,
    #[error("{0:?} can not be judged by this assertion")]
    UnexpectedItem(Item),
    #[error("No fix is available for {0}")]
    NotImplemented(Assertion),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Decides whether the claim of an evidence holds in a model
pub type ValidityCheck = fn(&Model, &Evidence) -> Result<bool, AssertionError>;
/// Changes a model so the claim of an evidence holds
pub type FixProcedure = fn(&mut Model, &Evidence) -> Result<(), AssertionError>;

/// Validity check and optional fix of one assertion
#[derive(Copy, Clone)]
pub struct AssertionRule {
    pub validity: ValidityCheck,
    pub fix: Option<FixProcedure>,
}

/// Registry of the assertions an evidence engine knows how to evaluate
#[derive(Clone)]
pub struct AssertionRegistry {
    rules: IndexMap<Assertion, AssertionRule>,
}

impl Default for AssertionRegistry {
    /// Registry holding the full catalogue
    fn default() -> Self {
        let mut registry = AssertionRegistry::empty();
        for assertion in Assertion::ALL {
            registry.register(assertion, standard_rule(assertion));
        }
        registry
    }
}

impl AssertionRegistry {
    /// Registry without any assertion
    pub fn empty() -> AssertionRegistry {
        AssertionRegistry {
            rules: IndexMap::new(),
        }
    }

    /// Add or replace the rule of an assertion
    pub fn register(&mut self, assertion: Assertion, rule: AssertionRule) {
        self.rules.insert(assertion, rule);
    }

    pub fn rule(&self, assertion: Assertion) -> Option<&AssertionRule> {
        self.rules.get(&assertion)
    }

    /// Judge an evidence
    ///
    /// Returns None when the evidence can not be judged: its assertion is not registered, a
    /// required entity or target is missing, or an item is of the wrong kind.
    ///
    /// # Examples
    /// ```rust
    /// use gemeditor_core::evidence::assertion::{Assertion, AssertionRegistry};
    /// use gemeditor_core::evidence::Item;
    /// use gemeditor_core::metabolic_model::model::Model;
    /// use gemeditor_core::metabolic_model::reaction::Reaction;
    /// let mut model = Model::new_empty();
    /// let mut reaction = Reaction::new("r1");
    /// reaction.lower_bound = -1000.;
    /// let reaction = model.add_reaction(reaction);
    /// let evidence = model
    ///     .add_evidence(Item::Reaction(reaction), Assertion::Reversible, None, None, None)
    ///     .unwrap();
    /// let registry = AssertionRegistry::default();
    /// assert_eq!(registry.is_valid(&model, evidence), Some(true));
    /// assert_eq!(AssertionRegistry::empty().is_valid(&model, evidence), None);
    /// ```
    pub fn is_valid(&self, model: &Model, evidence: EvidenceKey) -> Option<bool> {
        let evidence = model.evidence(evidence).ok()?;
        let rule = self.rule(evidence.assertion)?;
        match (rule.validity)(model, evidence) {
            Ok(valid) => Some(valid),
            Err(err) => {
                tracing::debug!(assertion = %evidence.assertion, error = %err, "evidence can not be judged");
                None
            }
        }
    }

    /// Try to make the claim of an evidence hold
    ///
    /// Evidences that are valid or can not be judged are left alone, and the result is whether
    /// the evidence was valid. Otherwise the fix procedure of the assertion is run and the result
    /// is whether it succeeded.
    pub fn fix(&self, model: &mut Model, evidence: EvidenceKey) -> bool {
        match self.is_valid(model, evidence) {
            Some(true) => return true,
            None => return false,
            Some(false) => {}
        }
        let Ok(evidence) = model.evidence(evidence).cloned() else {
            return false;
        };
        let Some(fix) = self.rule(evidence.assertion).and_then(|r| r.fix) else {
            let err = AssertionError::NotImplemented(evidence.assertion);
            tracing::debug!(error = %err, "evidence could not be fixed");
            return false;
        };
        match fix(model, &evidence) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(assertion = %evidence.assertion, error = %err, "evidence could not be fixed");
                false
            }
        }
    }
}

fn standard_rule(assertion: Assertion) -> AssertionRule {
    match assertion {
        Assertion::CatalyzingReaction => AssertionRule {
            validity: catalyzing_validity,
            fix: Some(catalyzing_fix),
        },
        Assertion::NotCatalyzingReaction => AssertionRule {
            validity: not_catalyzing_validity,
            fix: Some(not_catalyzing_fix),
        },
        Assertion::Reversible => AssertionRule {
            validity: reversible_validity,
            fix: Some(reversible_fix),
        },
        Assertion::Irreversible => AssertionRule {
            validity: irreversible_validity,
            fix: Some(irreversible_fix),
        },
        Assertion::Present => AssertionRule {
            validity: present_validity,
            fix: None,
        },
        Assertion::Absent => AssertionRule {
            validity: absent_validity,
            fix: None,
        },
        Assertion::Localization => AssertionRule {
            validity: localization_validity,
            fix: None,
        },
    }
}

// region Link extraction
fn entity(evidence: &Evidence) -> Result<Item, AssertionError> {
    evidence.entity.ok_or(AssertionError::MissingEntity)
}

fn target(evidence: &Evidence) -> Result<Item, AssertionError> {
    evidence.target.ok_or(AssertionError::MissingTarget)
}

fn gene_entity(evidence: &Evidence) -> Result<GeneKey, AssertionError> {
    match entity(evidence)? {
        Item::Gene(gene) => Ok(gene),
        other => Err(AssertionError::UnexpectedItem(other)),
    }
}

fn reaction_entity(evidence: &Evidence) -> Result<ReactionKey, AssertionError> {
    match entity(evidence)? {
        Item::Reaction(reaction) => Ok(reaction),
        other => Err(AssertionError::UnexpectedItem(other)),
    }
}

fn reaction_target(evidence: &Evidence) -> Result<ReactionKey, AssertionError> {
    match target(evidence)? {
        Item::Reaction(reaction) => Ok(reaction),
        other => Err(AssertionError::UnexpectedItem(other)),
    }
}

fn compartment_target(evidence: &Evidence) -> Result<CompartmentKey, AssertionError> {
    match target(evidence)? {
        Item::Compartment(compartment) => Ok(compartment),
        other => Err(AssertionError::UnexpectedItem(other)),
    }
}
// endregion Link extraction

// region Catalyzing reaction
fn catalyzing_validity(model: &Model, evidence: &Evidence) -> Result<bool, AssertionError> {
    let gene = gene_entity(evidence)?;
    let reaction = reaction_target(evidence)?;
    model.gene(gene)?;
    model.reaction(reaction)?;
    Ok(model.genes_of(reaction).contains(&gene))
}

fn catalyzing_fix(model: &mut Model, evidence: &Evidence) -> Result<(), AssertionError> {
    let gene = gene_entity(evidence)?;
    let reaction = reaction_target(evidence)?;
    model.add_child(reaction, gene)?;
    Ok(())
}

fn not_catalyzing_validity(model: &Model, evidence: &Evidence) -> Result<bool, AssertionError> {
    catalyzing_validity(model, evidence).map(|valid| !valid)
}

/// Remove every occurrence of the gene from the rule of the reaction, at any depth
fn not_catalyzing_fix(model: &mut Model, evidence: &Evidence) -> Result<(), AssertionError> {
    let gene = TreeNode::Gene(gene_entity(evidence)?);
    let reaction = TreeNode::Reaction(reaction_target(evidence)?);
    let holders: Vec<TreeNode> = std::iter::once(reaction)
        .chain(model.gene_tree().descendants(reaction))
        .filter(|node| model.gene_tree().multiplicity(*node, gene) > 0)
        .collect();
    for holder in holders {
        model.remove_child(holder, gene, true)?;
    }
    Ok(())
}
// endregion Catalyzing reaction

// region Reaction bounds
fn reversible_validity(model: &Model, evidence: &Evidence) -> Result<bool, AssertionError> {
    Ok(model.reaction(reaction_entity(evidence)?)?.reversible())
}

fn reversible_fix(model: &mut Model, evidence: &Evidence) -> Result<(), AssertionError> {
    let config = crate::configuration::current();
    let reaction = model.reaction_mut(reaction_entity(evidence)?)?;
    reaction.lower_bound = config.min_bound;
    reaction.upper_bound = config.max_bound;
    Ok(())
}

fn irreversible_validity(model: &Model, evidence: &Evidence) -> Result<bool, AssertionError> {
    reversible_validity(model, evidence).map(|valid| !valid)
}

/// Close the reverse direction, the forward bound keeps whatever value it had
fn irreversible_fix(model: &mut Model, evidence: &Evidence) -> Result<(), AssertionError> {
    let reaction = model.reaction_mut(reaction_entity(evidence)?)?;
    if reaction.lower_bound < 0. {
        reaction.lower_bound = 0.;
    }
    Ok(())
}
// endregion Reaction bounds

// region Presence
fn present_validity(model: &Model, evidence: &Evidence) -> Result<bool, AssertionError> {
    match entity(evidence)? {
        Item::Reaction(reaction) => Ok(!model.reaction(reaction)?.blocked()),
        Item::Metabolite(metabolite) => model.metabolite(metabolite).map(|_| true).map_err(Into::into),
        other => Err(AssertionError::UnexpectedItem(other)),
    }
}

fn absent_validity(model: &Model, evidence: &Evidence) -> Result<bool, AssertionError> {
    match entity(evidence)? {
        Item::Reaction(reaction) => Ok(model.reaction(reaction)?.blocked()),
        Item::Metabolite(metabolite) => model.metabolite(metabolite).map(|_| false).map_err(Into::into),
        other => Err(AssertionError::UnexpectedItem(other)),
    }
}
// endregion Presence

/// Every metabolite of every reaction the gene takes part in has to be in the target compartment
fn localization_validity(model: &Model, evidence: &Evidence) -> Result<bool, AssertionError> {
    let gene = gene_entity(evidence)?;
    let compartment = &model.compartment(compartment_target(evidence)?)?.id;
    model.gene(gene)?;
    for reaction in model.reactions_of(gene) {
        for metabolite in model.reaction(reaction)?.metabolites().keys() {
            if model.metabolite(*metabolite)?.compartment.as_ref() != Some(compartment) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
