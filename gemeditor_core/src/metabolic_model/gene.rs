//! This module provides the Gene struct, representing a gene, and the GeneGroup struct,
//! representing a boolean clause over genes in a gene reaction rule
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::metabolic_model::annotation::Annotations;
use crate::metabolic_model::tree::TreeError;

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct Gene {
    /// Used to identify the gene
    pub id: String,
    /// Human Readable Gene Name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Genome the gene is located on
    #[builder(default = "None")]
    pub genome: Option<String>,
    /// Gene Annotations
    #[builder(default = "Annotations::new()")]
    pub annotation: Annotations,
    /// Whether the gene product is available, the base case of every functional evaluation
    #[builder(default = "true")]
    pub functional: bool,
}

impl Gene {
    pub fn new(id: &str) -> Gene {
        Gene {
            id: id.to_string(),
            name: None,
            genome: None,
            annotation: Annotations::new(),
            functional: true,
        }
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// How the children of a [`GeneGroup`] are combined
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// All children are required
    #[default]
    And,
    /// Any one child is sufficient
    Or,
}

impl GroupType {
    /// Keyword joining the children when rendering a rule
    pub fn keyword(&self) -> &'static str {
        match self {
            GroupType::And => "and",
            GroupType::Or => "or",
        }
    }

    /// Combine the functional states of the children of a group
    ///
    /// Returns None when there are no children. Children whose own state is undetermined
    /// count as not functional.
    pub fn combine<I: IntoIterator<Item = Option<bool>>>(&self, states: I) -> Option<bool> {
        let mut states = states.into_iter().peekable();
        states.peek()?;
        Some(match self {
            GroupType::And => states.all(|s| s == Some(true)),
            GroupType::Or => states.any(|s| s == Some(true)),
        })
    }
}

impl Display for GroupType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl FromStr for GroupType {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(GroupType::And),
            "or" => Ok(GroupType::Or),
            other => Err(TreeError::UnknownGroupType(other.to_string())),
        }
    }
}

/// A boolean clause in a gene reaction rule
///
/// The members of the clause are held by the model's gene tree, the group itself only
/// carries its combination type and a generated id.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneGroup {
    /// Generated unique id
    pub id: String,
    /// Combination type of the children
    pub group_type: GroupType,
}

impl GeneGroup {
    pub fn new(group_type: GroupType) -> GeneGroup {
        GeneGroup {
            id: uuid::Uuid::new_v4().to_string(),
            group_type,
        }
    }

    pub fn new_and() -> GeneGroup {
        GeneGroup::new(GroupType::And)
    }

    pub fn new_or() -> GeneGroup {
        GeneGroup::new(GroupType::Or)
    }
}

impl Default for GeneGroup {
    fn default() -> Self {
        GeneGroup::new(GroupType::default())
    }
}
