//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque ingredient token carried on the conveyor belt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ingredient(String);

impl Ingredient {
    /// Wrap a token as an ingredient.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ingredient {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Ingredient {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A customer waiting in line together with the ingredients they ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOrder {
    /// Customer name as read from the customer file.
    pub id: String,
    /// Ingredients in the order they were listed.
    pub required: Vec<Ingredient>,
}

impl CustomerOrder {
    /// Build an order from a customer name and ingredient tokens.
    pub fn new<I, T>(id: impl Into<String>, required: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Ingredient>,
    {
        Self {
            id: id.into(),
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `ingredient` is part of this order.
    pub fn requires(&self, ingredient: &Ingredient) -> bool {
        self.required.contains(ingredient)
    }

    /// Number of ingredients listed on the order.
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// True when the order lists no ingredients at all.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}
