use crate::seo_page::SeoOverride;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use storefront_types::filter::{FilterConfig, PriceRanges};
use storefront_types::product::{self, Product, ProductDto};
use storefront_types::taxonomy::Taxonomy;

/// Read-only lookup tables, loaded once at startup.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub taxonomy: Taxonomy,
    pub filters: FilterConfig,
    pub price_ranges: PriceRanges,
    pub overrides: Vec<SeoOverride>,
}

impl CatalogConfig {
    pub fn check(&self) -> Result<(), anyhow::Error> {
        self.taxonomy.check()?;
        for o in &self.overrides {
            let known = match o.gender {
                Some(gender) => self.taxonomy.category(gender, &o.category).is_some(),
                None => storefront_types::Gender::ALL
                    .iter()
                    .any(|g| self.taxonomy.category(*g, &o.category).is_some()),
            };
            if !known {
                log::warn!("SEO override for unknown category {}", o.category);
            }
        }
        Ok(())
    }
}

pub fn parse_catalog_config(input: &str) -> Result<CatalogConfig, anyhow::Error> {
    let config: CatalogConfig = serde_yaml::from_str(input)?;
    config.check()?;
    Ok(config)
}

pub fn read_catalog_config(path: &str) -> Result<CatalogConfig, anyhow::Error> {
    let input = match std::fs::read_to_string(path) {
        Ok(input) => input,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::info!("{path} not found, using built-in catalog");
            return Ok(CatalogConfig::default());
        }
        Err(err) => return Err(err.into()),
    };
    parse_catalog_config(&input).with_context(|| format!("Unable to read catalog config {path}"))
}

pub fn parse_products(input: &str) -> Result<Vec<Product>, anyhow::Error> {
    let dtos: Vec<ProductDto> = serde_yaml::from_str(input)?;
    Ok(product::convert(dtos).collect())
}

pub fn read_products(path: &str) -> Result<Vec<Product>, anyhow::Error> {
    let input = match std::fs::read_to_string(path) {
        Ok(input) => input,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::warn!("{path} not found, catalog is empty");
            return Ok(vec![]);
        }
        Err(err) => return Err(err.into()),
    };
    parse_products(&input).with_context(|| format!("Unable to read products from {path}"))
}
