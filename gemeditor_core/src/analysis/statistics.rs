//! Summary counts describing the state of a model
use serde::Serialize;

use crate::evidence::assertion::AssertionRegistry;
use crate::metabolic_model::model::Model;

/// Counts of model entities and of the issues found in them
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ModelStatistics {
    pub reactions: usize,
    pub boundary_reactions: usize,
    /// Non boundary reactions without gene reaction rule
    pub reactions_without_genes: usize,
    pub unbalanced_reactions: usize,
    pub metabolites: usize,
    /// Metabolites not taking part in any reaction
    pub unused_metabolites: usize,
    pub genes: usize,
    /// Genes not linked to any reaction
    pub genes_without_reaction: usize,
    pub gene_groups: usize,
    pub compartments: usize,
    pub references: usize,
    pub tests: usize,
    pub evidences: usize,
    pub valid_evidences: usize,
    pub invalid_evidences: usize,
    /// Evidences that could not be judged
    pub undetermined_evidences: usize,
}

impl ModelStatistics {
    /// Collect the statistics of a model, judging evidences with the given registry
    pub fn collect(model: &Model, registry: &AssertionRegistry) -> ModelStatistics {
        let mut statistics = ModelStatistics {
            reactions: model.reactions().len(),
            metabolites: model.metabolites().len(),
            genes: model.genes().len(),
            gene_groups: model.gene_groups().len(),
            compartments: model.compartments().len(),
            references: model.references().len(),
            tests: model.tests().len(),
            evidences: model.all_evidences().len(),
            ..Default::default()
        };

        for (key, reaction) in model.reactions() {
            if reaction.boundary() {
                statistics.boundary_reactions += 1;
                continue;
            }
            if model.genes_of(*key).is_empty() {
                statistics.reactions_without_genes += 1;
            }
            if model
                .reaction_balance(*key)
                .is_ok_and(|status| status.is_unbalanced())
            {
                statistics.unbalanced_reactions += 1;
            }
        }

        statistics.unused_metabolites = model
            .metabolites()
            .keys()
            .filter(|m| model.metabolite_reactions(**m).is_empty())
            .count();
        statistics.genes_without_reaction = model
            .genes()
            .keys()
            .filter(|g| model.reactions_of(**g).is_empty())
            .count();

        for key in model.all_evidences().keys() {
            match registry.is_valid(model, *key) {
                Some(true) => statistics.valid_evidences += 1,
                Some(false) => statistics.invalid_evidences += 1,
                None => statistics.undetermined_evidences += 1,
            }
        }
        tracing::debug!(reactions = statistics.reactions, "model statistics collected");
        statistics
    }

    /// Statistics as pretty printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
