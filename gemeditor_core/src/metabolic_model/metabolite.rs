//! This module provides the metabolite struct representing a metabolite, the compartment it
//! lives in, and parsing of chemical formulas for elemental balance checks
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::annotation::Annotations;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Used to identify the metabolite
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Id of the compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Metabolite annotations
    #[builder(default = "Annotations::new()")]
    pub annotation: Annotations,
}

impl Metabolite {
    pub fn new(id: &str) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: None,
            compartment: None,
            charge: 0,
            formula: None,
            annotation: Annotations::new(),
        }
    }

    /// Parsed chemical formula, None if the metabolite has no (or an empty) formula
    pub fn parsed_formula(&self) -> Option<Result<Formula, FormulaError>> {
        match self.formula.as_deref() {
            Some(f) if !f.trim().is_empty() => Some(Formula::parse(f)),
            _ => None,
        }
    }
}

impl Display for Metabolite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A cellular compartment
#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    /// Short id, matched against [`Metabolite::compartment`]
    pub id: String,
    /// Human readable name
    pub name: Option<String>,
}

impl Compartment {
    pub fn new(id: &str, name: Option<&str>) -> Compartment {
        Compartment {
            id: id.to_string(),
            name: name.map(str::to_string),
        }
    }
}

/// Element counts of a chemical formula
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formula {
    pub elements: IndexMap<String, f64>,
}

impl Formula {
    /// Parse a Hill style formula such as `C6H12O6` or `C10H12N5O13P3`
    ///
    /// Elements are an uppercase letter followed by any lowercase letters, optionally followed by
    /// a count, which may be fractional. Repeated elements are summed.
    ///
    /// # Examples
    /// ```rust
    /// use gemeditor_core::metabolic_model::metabolite::Formula;
    /// let glucose = Formula::parse("C6H12O6").unwrap();
    /// assert_eq!(glucose.elements["C"], 6.);
    /// assert_eq!(glucose.elements["H"], 12.);
    /// ```
    pub fn parse(input: &str) -> Result<Formula, FormulaError> {
        let chars: Vec<char> = input.trim().chars().collect();
        let mut elements: IndexMap<String, f64> = IndexMap::new();
        let mut current = 0;
        while current < chars.len() {
            let c = chars[current];
            if !c.is_ascii_uppercase() {
                return Err(FormulaError::UnexpectedCharacter {
                    character: c,
                    position: current,
                });
            }
            let start = current;
            current += 1;
            while current < chars.len() && chars[current].is_ascii_lowercase() {
                current += 1;
            }
            let element: String = chars[start..current].iter().collect();
            let count_start = current;
            while current < chars.len() && (chars[current].is_ascii_digit() || chars[current] == '.')
            {
                current += 1;
            }
            let count = if count_start == current {
                1.
            } else {
                let digits: String = chars[count_start..current].iter().collect();
                digits
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidCount(digits))?
            };
            *elements.entry(element).or_insert(0.) += count;
        }
        Ok(Formula { elements })
    }
}

/// Errors from parsing a chemical formula
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Invalid element count: {0}")]
    InvalidCount(String),
}
