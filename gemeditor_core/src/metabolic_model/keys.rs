//! Typed handles into the arenas owned by [`Model`](super::model::Model)
//!
//! Handles are allocated from a counter that only ever increases, so two handles are equal
//! exactly when they refer to the same entity, regardless of the (mutable) id strings.
use std::fmt::{Display, Formatter};

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

define_key!(
    /// Handle of a [`Reaction`](super::reaction::Reaction)
    ReactionKey,
    "reaction"
);
define_key!(
    /// Handle of a [`Metabolite`](super::metabolite::Metabolite)
    MetaboliteKey,
    "metabolite"
);
define_key!(
    /// Handle of a [`Gene`](super::gene::Gene)
    GeneKey,
    "gene"
);
define_key!(
    /// Handle of a [`GeneGroup`](super::gene::GeneGroup)
    GeneGroupKey,
    "genegroup"
);
define_key!(
    /// Handle of a [`Compartment`](super::metabolite::Compartment)
    CompartmentKey,
    "compartment"
);
define_key!(
    /// Handle of an [`Evidence`](crate::evidence::Evidence)
    EvidenceKey,
    "evidence"
);
define_key!(
    /// Handle of a [`Reference`](crate::evidence::reference::Reference)
    ReferenceKey,
    "reference"
);
define_key!(
    /// Handle of a [`ModelTest`](crate::model_test::ModelTest)
    ModelTestKey,
    "test"
);
