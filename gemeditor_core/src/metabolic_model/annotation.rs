//! Cross reference annotations attached to model entities
use std::fmt::{Display, Formatter};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A single cross reference into an external database or ontology
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Annotation {
    /// Namespace of the identifier (e.g. `chebi`, `metanetx.chemical`)
    pub collection: String,
    /// Identifier within the collection
    pub identifier: String,
}

impl Annotation {
    pub fn new(collection: &str, identifier: &str) -> Annotation {
        Annotation {
            collection: collection.to_string(),
            identifier: identifier.to_string(),
        }
    }
}

impl Display for Annotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.collection, self.identifier)
    }
}

/// Ordered set of annotations
pub type Annotations = IndexSet<Annotation>;
