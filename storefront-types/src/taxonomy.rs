use crate::{same_slug, slugify, Gender};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TypeConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TypeConfig {
    pub fn find_style(&self, slug: &str) -> Option<&str> {
        if slugify(slug).is_empty() {
            return None;
        }
        self.styles
            .iter()
            .find(|s| same_slug(s, slug))
            .map(String::as_str)
    }
}

/// Outcome of validating the gender/category/style part of a catalog URL.
/// Anything that does not resolve is `None`; style is never resolved without
/// its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolved<'a> {
    pub gender: Option<Gender>,
    pub category: Option<&'a TypeConfig>,
    pub style: Option<&'a str>,
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum TaxonomyError {
    #[display("Duplicate category {category} for {gender}")]
    DuplicateCategory { gender: Gender, category: String },
    #[display("Category {category} for {gender} has an empty id")]
    EmptyCategoryId { gender: Gender, category: String },
    #[display("Styles {first} and {second} of {gender}/{category} share the slug {slug}")]
    StyleSlugCollision {
        gender: Gender,
        category: String,
        first: String,
        second: String,
        slug: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Taxonomy {
    genders: BTreeMap<Gender, Vec<TypeConfig>>,
}

impl Taxonomy {
    pub fn new(genders: BTreeMap<Gender, Vec<TypeConfig>>) -> Self {
        Self { genders }
    }

    pub fn categories(&self, gender: Gender) -> &[TypeConfig] {
        self.genders
            .get(&gender)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn category(&self, gender: Gender, id: &str) -> Option<&TypeConfig> {
        self.categories(gender)
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id.trim()))
    }

    pub fn validate<'a>(
        &'a self,
        gender: &str,
        category: Option<&str>,
        style: Option<&str>,
    ) -> Resolved<'a> {
        let Some(gender) = Gender::from_slug(gender) else {
            return Resolved::default();
        };
        let category = category.and_then(|id| self.category(gender, id));
        let style = category
            .zip(style)
            .and_then(|(category, style)| category.find_style(style));
        Resolved {
            gender: Some(gender),
            category,
            style,
        }
    }

    pub fn styles_of(&self, gender: &str, category: &str) -> &[String] {
        Gender::from_slug(gender)
            .and_then(|g| self.category(g, category))
            .map(|c| c.styles.as_slice())
            .unwrap_or_default()
    }

    pub fn check(&self) -> Result<(), TaxonomyError> {
        for (gender, categories) in &self.genders {
            let mut ids = HashSet::new();
            for category in categories {
                if category.id.trim().is_empty() {
                    return Err(TaxonomyError::EmptyCategoryId {
                        gender: *gender,
                        category: category.name.clone(),
                    });
                }
                if !ids.insert(category.id.to_lowercase()) {
                    return Err(TaxonomyError::DuplicateCategory {
                        gender: *gender,
                        category: category.id.clone(),
                    });
                }
                let mut slugs: BTreeMap<String, &String> = BTreeMap::new();
                for style in &category.styles {
                    let slug = slugify(style);
                    if let Some(first) = slugs.insert(slug.clone(), style) {
                        return Err(TaxonomyError::StyleSlugCollision {
                            gender: *gender,
                            category: category.id.clone(),
                            first: first.clone(),
                            second: style.clone(),
                            slug,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn category(id: &str, name: &str, description: &str, styles: &[&str], keywords: &[&str]) -> TypeConfig {
    TypeConfig {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        styles: styles.iter().map(|s| s.to_string()).collect(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        let women = vec![
            category(
                "abaya",
                "Abayas",
                "Flowing abayas for everyday wear and special occasions.",
                &["Open Abaya", "Closed Abaya", "Kimono Abaya", "Butterfly Abaya", "Embroidered Abaya"],
                &["abaya", "modest dress", "black abaya"],
            ),
            category(
                "hijabs",
                "Hijabs",
                "Soft, breathable hijabs in jersey, chiffon and modal.",
                &["Jersey Hijab", "Chiffon Hijab", "Instant Hijab", "Square Hijab"],
                &["hijab", "headscarf", "jersey hijab"],
            ),
            category(
                "jilbab",
                "Jilbabs",
                "One and two piece jilbabs with full coverage.",
                &["One Piece Jilbab", "Two Piece Jilbab"],
                &["jilbab", "prayer outfit"],
            ),
            category(
                "prayer-dress",
                "Prayer Dresses",
                "Comfortable prayer dresses that slip on in seconds.",
                &["Hooded Prayer Dress", "Travel Prayer Dress"],
                &["prayer dress", "salah dress"],
            ),
            category(
                "accessories",
                "Accessories",
                "Underscarves, pins and magnets to finish the look.",
                &["Underscarf", "Hijab Pins", "Hijab Magnets"],
                &["hijab accessories", "underscarf"],
            ),
        ];
        let men = vec![
            category(
                "thobe",
                "Thobes",
                "Classic and modern thobes cut for comfort.",
                &["Saudi Thobe", "Emirati Thobe", "Moroccan Thobe", "Kuwaiti Thobe"],
                &["thobe", "jubba", "dishdasha"],
            ),
            category(
                "kufi",
                "Kufis",
                "Knitted and embroidered kufi caps.",
                &["Knitted Kufi", "Embroidered Kufi"],
                &["kufi", "prayer cap"],
            ),
            category(
                "sirwal",
                "Sirwal",
                "Relaxed sirwal trousers to pair with any thobe.",
                &["Cotton Sirwal", "Linen Sirwal"],
                &["sirwal", "harem pants"],
            ),
            category(
                "accessories",
                "Accessories",
                "Shemaghs, misbaha and everyday essentials.",
                &["Shemagh", "Misbaha", "Miswak Case"],
                &["shemagh", "misbaha"],
            ),
        ];
        Self::new(BTreeMap::from([(Gender::Women, women), (Gender::Men, men)]))
    }
}
