//! Core of GEMEditor, an editor for curating genome scale metabolic models.
//!
//! The [`Model`](metabolic_model::model::Model) owns reactions, metabolites, genes and gene
//! groups together with the gene tree linking them. On top of it sit the evidence engine
//! checking literature backed claims, duplicate detection and merging, and the runner for
//! model tests which delegates flux balance analysis to an external [`Solver`](optimize::Solver).

pub mod analysis;
pub mod configuration;
pub mod evidence;
pub mod metabolic_model;
pub mod model_test;
pub mod optimize;
