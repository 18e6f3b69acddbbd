//! Literature references cited by evidences and model tests
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// An author of a publication
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub lastname: String,
    pub firstname: String,
    pub initials: String,
}

impl Author {
    pub fn new(lastname: &str, firstname: &str, initials: &str) -> Author {
        Author {
            lastname: lastname.to_string(),
            firstname: firstname.to_string(),
            initials: initials.to_string(),
        }
    }

    /// "Lastname Initials", or just the last name without initials
    pub fn display_name(&self) -> String {
        if self.initials.is_empty() {
            self.lastname.clone()
        } else {
            format!("{} {}", self.lastname, self.initials)
        }
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A literature citation
///
/// The evidences and tests citing a reference are registered with the model, see
/// [`Model::reference_linked_items`](crate::metabolic_model::model::Model::reference_linked_items).
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct Reference {
    pub id: String,
    #[builder(default = "None")]
    pub pmid: Option<String>,
    #[builder(default = "None")]
    pub pmc: Option<String>,
    #[builder(default = "None")]
    pub doi: Option<String>,
    #[builder(default = "None")]
    pub url: Option<String>,
    #[builder(default = "Vec::new()")]
    pub authors: Vec<Author>,
    #[builder(default = "None")]
    pub year: Option<String>,
    #[builder(default = "None")]
    pub title: Option<String>,
    #[builder(default = "None")]
    pub journal: Option<String>,
    #[builder(default = "None")]
    pub abstract_text: Option<String>,
}

impl Reference {
    pub fn new(id: &str) -> Reference {
        Reference {
            id: id.to_string(),
            pmid: None,
            pmc: None,
            doi: None,
            url: None,
            authors: Vec::new(),
            year: None,
            title: None,
            journal: None,
            abstract_text: None,
        }
    }

    /// Short citation like "Smith et al., 2015"
    pub fn reference_string(&self) -> String {
        let authors = match self.authors.as_slice() {
            [] => String::new(),
            [single] => single.lastname.clone(),
            [first, second] => format!("{} and {}", first.lastname, second.lastname),
            [first, ..] => format!("{} et al.", first.lastname),
        };
        match (authors.is_empty(), self.year.as_deref()) {
            (true, Some(year)) => year.to_string(),
            (true, None) => String::new(),
            (false, Some(year)) => format!("{}, {}", authors, year),
            (false, None) => authors,
        }
    }
}
