//! This module provides a struct for representing reactions
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::IndexMap;

use crate::metabolic_model::annotation::Annotations;
use crate::metabolic_model::keys::MetaboliteKey;

/// Represents a reaction in the metabolic model
///
/// The gene reaction rule of a reaction is held by the model's gene tree, with the reaction
/// as root. The stoichiometry can only be changed through the model, which keeps zero
/// coefficients out of it.
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Lower flux bound
    #[builder(default = "crate::configuration::current().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "crate::configuration::current().upper_bound")]
    pub upper_bound: f64,
    /// Coefficient of the reaction in the objective function
    #[builder(default = "0.")]
    pub objective_coefficient: f64,
    /// Free text comment
    #[builder(default = "None")]
    pub comment: Option<String>,
    /// Reaction Annotations
    #[builder(default = "Annotations::new()")]
    pub annotation: Annotations,
    /// Metabolite stoichiometry of the reaction
    #[builder(setter(skip))]
    pub(crate) metabolites: IndexMap<MetaboliteKey, f64>,
}

impl Reaction {
    pub fn new(id: &str) -> Reaction {
        let config = crate::configuration::current();
        Reaction {
            id: id.to_string(),
            name: None,
            subsystem: None,
            lower_bound: config.lower_bound,
            upper_bound: config.upper_bound,
            objective_coefficient: 0.,
            comment: None,
            annotation: Annotations::new(),
            metabolites: IndexMap::new(),
        }
    }

    /// Signed stoichiometric coefficients, keyed by metabolite
    pub fn metabolites(&self) -> &IndexMap<MetaboliteKey, f64> {
        &self.metabolites
    }

    /// Coefficient of a metabolite, zero if it does not take part
    pub fn coefficient(&self, metabolite: MetaboliteKey) -> f64 {
        self.metabolites.get(&metabolite).copied().unwrap_or(0.)
    }

    /// A boundary reaction exchanges a single metabolite with the environment
    pub fn boundary(&self) -> bool {
        self.metabolites.len() == 1
    }

    /// Whether the bounds allow flux in both directions
    pub fn reversible(&self) -> bool {
        self.lower_bound < 0. && self.upper_bound > 0.
    }

    /// Whether both bounds are zero, i.e. the reaction can not carry flux
    pub fn blocked(&self) -> bool {
        self.lower_bound == 0. && self.upper_bound == 0.
    }

    /// Current (lower bound, upper bound, objective coefficient)
    pub(crate) fn flux_settings(&self) -> (f64, f64, f64) {
        (self.lower_bound, self.upper_bound, self.objective_coefficient)
    }
}

impl Display for Reaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Outcome of an elemental and charge balance check
#[derive(Clone, Debug, PartialEq)]
pub enum BalanceStatus {
    /// Every element and the charge sum to zero
    Balanced,
    /// Net amounts that do not sum to zero
    Unbalanced {
        /// Net amount per element, only elements off balance are listed
        elements: IndexMap<String, f64>,
        /// Net charge
        charge: f64,
    },
    /// Balance can not be judged, e.g. a formula is missing or the reaction is a boundary
    Unknown,
}

impl BalanceStatus {
    pub fn is_unbalanced(&self) -> bool {
        matches!(self, BalanceStatus::Unbalanced { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::CONFIGURATION;

    #[test]
    fn builder_uses_configured_bounds() {
        let reaction = ReactionBuilder::default()
            .id("r1".to_string())
            .build()
            .unwrap();
        let config = CONFIGURATION.read().unwrap();
        assert_eq!(reaction.lower_bound, config.lower_bound);
        assert_eq!(reaction.upper_bound, config.upper_bound);
        assert_eq!(reaction.objective_coefficient, 0.);
        assert!(reaction.metabolites().is_empty());
    }

    #[test]
    fn bound_predicates() {
        let mut reaction = Reaction::new("r1");
        reaction.lower_bound = -10.;
        reaction.upper_bound = 10.;
        assert!(reaction.reversible());
        assert!(!reaction.blocked());
        reaction.lower_bound = 0.;
        reaction.upper_bound = 0.;
        assert!(!reaction.reversible());
        assert!(reaction.blocked());
    }

    #[test]
    fn boundary_reaction() {
        let mut reaction = Reaction::new("EX_glc");
        assert!(!reaction.boundary());
        reaction.metabolites.insert(MetaboliteKey(0), -1.);
        assert!(reaction.boundary());
        assert_eq!(reaction.coefficient(MetaboliteKey(0)), -1.);
        assert_eq!(reaction.coefficient(MetaboliteKey(1)), 0.);
        reaction.metabolites.insert(MetaboliteKey(1), 1.);
        assert!(!reaction.boundary());
    }
}
