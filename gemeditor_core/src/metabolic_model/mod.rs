//! Module providing the Model struct and the entities it owns.

pub mod annotation;
pub mod gene;
pub mod keys;
pub mod metabolite;
pub mod model;
pub mod reaction;
pub mod tree;
