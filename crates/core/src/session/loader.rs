#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rand::Rng;
use tokio::fs;
use tracing::{info, warn};

use crate::{
    engine::RoutingEngine,
    error::KitchenError,
    models::{CustomerOrder, Ingredient},
    station::STATION_CAPACITY,
};

/// Parsed contents of the customer and ingredient files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitchenInput {
    pub orders: Vec<CustomerOrder>,
    pub ingredients: Vec<Ingredient>,
}

impl KitchenInput {
    /// Shuffle the ingredients onto a fresh belt and seat the first customers.
    pub fn into_engine<R>(self, rng: &mut R) -> Result<RoutingEngine>
    where
        R: Rng + ?Sized,
    {
        Ok(RoutingEngine::new(self.orders, self.ingredients, rng)?)
    }
}

/// Reads customer orders and belt ingredients from plain-text files.
#[derive(Debug, Clone)]
pub struct SessionLoader {
    customers_path: PathBuf,
    ingredients_path: PathBuf,
}

impl SessionLoader {
    pub fn new(customers_path: impl Into<PathBuf>, ingredients_path: impl Into<PathBuf>) -> Self {
        Self {
            customers_path: customers_path.into(),
            ingredients_path: ingredients_path.into(),
        }
    }

    pub fn customers_path(&self) -> &Path {
        &self.customers_path
    }

    pub fn ingredients_path(&self) -> &Path {
        &self.ingredients_path
    }

    pub async fn load(&self) -> Result<KitchenInput> {
        let customers = fs::read_to_string(&self.customers_path)
            .await
            .with_context(|| format!("failed to read {}", self.customers_path.display()))?;
        let orders = parse_customers(&customers)
            .with_context(|| format!("failed to parse {}", self.customers_path.display()))?;

        let ingredients = fs::read_to_string(&self.ingredients_path)
            .await
            .with_context(|| format!("failed to read {}", self.ingredients_path.display()))?;
        let ingredients = parse_ingredients(&ingredients);
        if ingredients.is_empty() {
            return Err(anyhow!(KitchenError::NoIngredients))
                .with_context(|| format!("{} is empty", self.ingredients_path.display()));
        }

        info!(
            customers = orders.len(),
            ingredients = ingredients.len(),
            "kitchen input loaded"
        );
        Ok(KitchenInput {
            orders,
            ingredients,
        })
    }
}

/// Parse `Name: ingredient, ingredient` lines, skipping blanks and `#` comments.
pub fn parse_customers(content: &str) -> Result<Vec<CustomerOrder>> {
    let mut orders = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let caps = CUSTOMER_LINE_RE
            .captures(line)
            .ok_or_else(|| anyhow!("line {}: expected `name: ingredient, ...`", index + 1))?;
        let name = caps[1].trim().to_string();
        let required: Vec<Ingredient> = split_tokens(&caps[2]).collect();
        if required.is_empty() {
            return Err(anyhow!(KitchenError::EmptyOrder(name)))
                .with_context(|| format!("line {}", index + 1));
        }
        if required.len() > STATION_CAPACITY {
            warn!(
                customer = %name,
                ingredients = required.len(),
                "order lists more ingredients than a station can hold"
            );
        }
        orders.push(CustomerOrder { id: name, required });
    }
    if orders.is_empty() {
        return Err(KitchenError::NoCustomers.into());
    }
    Ok(orders)
}

/// Parse ingredient tokens separated by commas or newlines.
pub fn parse_ingredients(content: &str) -> Vec<Ingredient> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(split_tokens)
        .collect()
}

fn split_tokens(raw: &str) -> impl Iterator<Item = Ingredient> + '_ {
    TOKEN_SEPARATOR_RE
        .split(raw)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Ingredient::from)
}

static CUSTOMER_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]*[^:\s][^:]*):(.*)$").expect("failed to compile customer line regex")
});

static TOKEN_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("failed to compile token separator regex"));
