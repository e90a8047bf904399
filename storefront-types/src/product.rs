use crate::Gender;
use derive_more::{Display, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use xxhash_rust::xxh64::xxh64;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ProductError {
    #[display("Product name is empty")]
    EmptyName,
    #[display("Product {name} has no gender")]
    MissingGender { name: String },
    #[display("Negative price {price}")]
    NegativePrice { price: Decimal },
    #[display("Sale price {sale_price} is not below price {price}")]
    SalePriceNotBelowPrice { price: Decimal, sale_price: Decimal },
}

/// Product as it appears in static catalog data.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ProductDto {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    pub gender: Option<Gender>,
    pub category: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub fabric: String,
    #[serde(default)]
    pub occasions: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub rating: f32,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub review_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_in_stock() -> bool {
    true
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    sale_price: Option<Decimal>,
    pub gender: Gender,
    pub category: String,
    pub style: Option<String>,
    pub color: String,
    pub fabric: String,
    pub occasions: Vec<String>,
    pub sizes: Vec<String>,
    pub in_stock: bool,
    pub rating: f32,
    pub review_count: u32,
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub features: Vec<String>,
}

impl Product {
    pub fn sale_price(&self) -> Option<Decimal> {
        self.sale_price
    }

    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }
}

impl TryFrom<ProductDto> for Product {
    type Error = ProductError;

    fn try_from(dto: ProductDto) -> Result<Self, Self::Error> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if dto.price.is_sign_negative() {
            return Err(ProductError::NegativePrice { price: dto.price });
        }
        if let Some(sale_price) = dto.sale_price {
            if sale_price >= dto.price || sale_price.is_sign_negative() {
                return Err(ProductError::SalePriceNotBelowPrice {
                    price: dto.price,
                    sale_price,
                });
            }
        }
        let gender = dto
            .gender
            .ok_or_else(|| ProductError::MissingGender { name: name.clone() })?;
        let category = dto.category.trim().to_lowercase();
        let id = dto
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generate_id(&name, gender, &category));
        Ok(Product {
            id,
            name,
            description: dto.description,
            price: dto.price,
            sale_price: dto.sale_price,
            gender,
            category,
            style: dto.style.filter(|s| !s.trim().is_empty()),
            color: dto.color,
            fabric: dto.fabric,
            occasions: dto.occasions,
            sizes: dto.sizes,
            in_stock: dto.in_stock,
            rating: dto.rating,
            review_count: dto.review_count,
            tags: dto.tags,
            brand: dto.brand.filter(|b| !b.trim().is_empty()),
            features: dto.features,
        })
    }
}

/// Converts static product data, skipping (and logging) entries that break an
/// invariant.
pub fn convert(v: impl IntoIterator<Item = ProductDto>) -> impl Iterator<Item = Product> {
    v.into_iter().filter_map(|dto| {
        let name = dto.name.clone();
        match Product::try_from(dto) {
            Ok(p) => Some(p),
            Err(err) => {
                log::warn!("Unable to convert product {name:?}: {err}");
                None
            }
        }
    })
}

pub fn generate_id(name: &str, gender: Gender, category: &str) -> String {
    let gender = gender.as_str();
    format!(
        "xxh64{:x}",
        xxh64(
            format!("{name}{gender}{category}").as_bytes(),
            name.len() as u64
        )
    )
}
