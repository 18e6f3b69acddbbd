//! Model tests: settings applied before simulating and outcomes checked afterwards
pub mod runner;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_builder::Builder;
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::metabolic_model::keys::{GeneKey, ReactionKey, ReferenceKey};
use crate::metabolic_model::model::{Model, ModelError};

/// A test of the model behaviour
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct ModelTest {
    /// Used to identify the test
    pub id: String,
    /// What the test checks
    #[builder(default = "None")]
    pub description: Option<String>,
    /// Free text comment
    #[builder(default = "None")]
    pub comment: Option<String>,
    /// Bound and objective overrides applied before simulating
    #[builder(default = "Vec::new()")]
    pub reaction_settings: Vec<ReactionSetting>,
    /// Gene knockouts (or knock-ins) applied after the reaction settings
    #[builder(default = "Vec::new()")]
    pub gene_settings: Vec<GeneSetting>,
    /// Conditions the simulated fluxes have to satisfy
    #[builder(default = "Vec::new()")]
    pub outcomes: Vec<Outcome>,
    #[builder(setter(skip))]
    pub(crate) references: IndexSet<ReferenceKey>,
}

impl ModelTest {
    pub fn new(id: &str) -> ModelTest {
        ModelTest {
            id: id.to_string(),
            description: None,
            comment: None,
            reaction_settings: Vec::new(),
            gene_settings: Vec::new(),
            outcomes: Vec::new(),
            references: IndexSet::new(),
        }
    }

    /// References cited by the test
    pub fn references(&self) -> &IndexSet<ReferenceKey> {
        &self.references
    }

    /// Every setting of the test, reaction settings first
    ///
    /// Gene settings block reactions based on the bounds they find when applied, so reaction
    /// overrides have to be in place before them.
    pub fn all_settings(&self) -> Vec<Setting> {
        self.reaction_settings
            .iter()
            .cloned()
            .map(Setting::Reaction)
            .chain(self.gene_settings.iter().cloned().map(Setting::Gene))
            .collect()
    }

    /// Drop settings and outcomes about a reaction leaving the model
    pub(crate) fn forget_reaction(&mut self, reaction: ReactionKey) {
        self.reaction_settings.retain(|s| s.reaction != reaction);
        self.outcomes.retain(|o| o.reaction != reaction);
    }

    /// Drop settings about a gene leaving the model
    pub(crate) fn forget_gene(&mut self, gene: GeneKey) {
        self.gene_settings.retain(|s| s.gene != gene);
    }
}

/// A reversible change applied to the model before simulating
#[derive(Clone, Debug, PartialEq)]
pub enum Setting {
    Reaction(ReactionSetting),
    Gene(GeneSetting),
}

impl Setting {
    pub fn apply(&mut self, model: &mut Model) -> Result<(), ModelError> {
        match self {
            Setting::Reaction(setting) => setting.apply(model),
            Setting::Gene(setting) => setting.apply(model),
        }
    }

    pub fn undo(&mut self, model: &mut Model) {
        match self {
            Setting::Reaction(setting) => setting.undo(model),
            Setting::Gene(setting) => setting.undo(model),
        }
    }
}

/// Override of the bounds and objective coefficient of a reaction
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionSetting {
    pub reaction: ReactionKey,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub objective_coefficient: f64,
    /// Values found when the setting was applied
    snapshot: Option<(f64, f64, f64)>,
}

impl ReactionSetting {
    pub fn new(
        reaction: ReactionKey,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
    ) -> ReactionSetting {
        ReactionSetting {
            reaction,
            lower_bound,
            upper_bound,
            objective_coefficient,
            snapshot: None,
        }
    }

    /// Remember the current values of the reaction and overwrite them
    pub fn apply(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let reaction = model.reaction_mut(self.reaction)?;
        self.snapshot = Some(reaction.flux_settings());
        reaction.lower_bound = self.lower_bound;
        reaction.upper_bound = self.upper_bound;
        reaction.objective_coefficient = self.objective_coefficient;
        Ok(())
    }

    /// Restore the remembered values, only the first undo after an apply has an effect
    pub fn undo(&mut self, model: &mut Model) {
        let Some((lower_bound, upper_bound, objective_coefficient)) = self.snapshot.take() else {
            return;
        };
        match model.reaction_mut(self.reaction) {
            Ok(reaction) => {
                reaction.lower_bound = lower_bound;
                reaction.upper_bound = upper_bound;
                reaction.objective_coefficient = objective_coefficient;
            }
            Err(err) => tracing::warn!(error = %err, "reaction setting could not be undone"),
        }
    }
}

/// Change of the functional state of a gene
///
/// Applying the setting also blocks every reaction that stops being functional because of it.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneSetting {
    pub gene: GeneKey,
    pub activity: bool,
    previous_activity: Option<bool>,
    /// Reactions blocked on apply, with their bounds at that time
    blocked: Vec<(ReactionKey, f64, f64)>,
}

impl GeneSetting {
    pub fn new(gene: GeneKey, activity: bool) -> GeneSetting {
        GeneSetting {
            gene,
            activity,
            previous_activity: None,
            blocked: Vec::new(),
        }
    }

    pub fn apply(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let gene = model.gene_mut(self.gene)?;
        self.previous_activity = Some(gene.functional);
        gene.functional = self.activity;
        self.blocked.clear();
        for key in model.reactions_of(self.gene) {
            if model.reaction_functional(key)? {
                continue;
            }
            let reaction = model.reaction_mut(key)?;
            self.blocked
                .push((key, reaction.lower_bound, reaction.upper_bound));
            reaction.lower_bound = 0.;
            reaction.upper_bound = 0.;
        }
        Ok(())
    }

    /// Reopen the blocked reactions in reverse order, then restore the gene
    pub fn undo(&mut self, model: &mut Model) {
        for (key, lower_bound, upper_bound) in self.blocked.drain(..).rev() {
            if let Ok(reaction) = model.reaction_mut(key) {
                reaction.lower_bound = lower_bound;
                reaction.upper_bound = upper_bound;
            }
        }
        if let Some(activity) = self.previous_activity.take() {
            if let Ok(gene) = model.gene_mut(self.gene) {
                gene.functional = activity;
            }
        }
    }
}

/// Comparison used by an [`Outcome`]
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum OutcomeOperator {
    GreaterThan,
    LessThan,
}

impl Display for OutcomeOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeOperator::GreaterThan => write!(f, "greater than"),
            OutcomeOperator::LessThan => write!(f, "less than"),
        }
    }
}

impl FromStr for OutcomeOperator {
    type Err = OutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greater than" => Ok(OutcomeOperator::GreaterThan),
            "less than" => Ok(OutcomeOperator::LessThan),
            other => Err(OutcomeError::UnknownOperator(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutcomeError {
    #[error("Unknown outcome operator: {0}")]
    UnknownOperator(String),
}

/// Expected flux of a reaction
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub reaction: ReactionKey,
    pub value: f64,
    pub operator: OutcomeOperator,
}

impl Outcome {
    pub fn new(reaction: ReactionKey, operator: OutcomeOperator, value: f64) -> Outcome {
        Outcome {
            reaction,
            value,
            operator,
        }
    }

    /// Compare a flux to the expected value
    ///
    /// The configured tolerance is given in favour of the flux, so values marginally short of
    /// the boundary pass.
    pub fn check_value(&self, flux: f64) -> bool {
        let tolerance = crate::configuration::current().outcome_tolerance;
        match self.operator {
            OutcomeOperator::GreaterThan => flux > self.value - tolerance,
            OutcomeOperator::LessThan => flux < self.value + tolerance,
        }
    }

    /// Check the outcome against fluxes keyed by reaction id
    ///
    /// Fails if the reaction is gone from the model or has no flux.
    pub fn check(&self, model: &Model, fluxes: &IndexMap<String, f64>) -> bool {
        let Ok(reaction) = model.reaction(self.reaction) else {
            return false;
        };
        match fluxes.get(&reaction.id) {
            Some(flux) => self.check_value(*flux),
            None => {
                tracing::debug!(reaction = %reaction.id, "no flux for outcome reaction");
                false
            }
        }
    }
}
