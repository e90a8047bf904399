use crate::{capitalize_words, same_slug, slugify};
use derive_more::Display;
use lazy_regex::regex_captures;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[serde(rename_all = "lowercase")]
pub enum FilterAttribute {
    #[display("brand")]
    Brand,
    #[display("color")]
    Color,
    #[display("fabric")]
    Fabric,
    #[display("feature")]
    Feature,
    #[display("occasion")]
    Occasion,
    #[display("price")]
    Price,
    #[display("size")]
    Size,
}

impl FilterAttribute {
    pub const ALL: [FilterAttribute; 7] = [
        FilterAttribute::Brand,
        FilterAttribute::Color,
        FilterAttribute::Fabric,
        FilterAttribute::Feature,
        FilterAttribute::Occasion,
        FilterAttribute::Price,
        FilterAttribute::Size,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterAttribute::Brand => "brand",
            FilterAttribute::Color => "color",
            FilterAttribute::Fabric => "fabric",
            FilterAttribute::Feature => "feature",
            FilterAttribute::Occasion => "occasion",
            FilterAttribute::Price => "price",
            FilterAttribute::Size => "size",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "brand" => Some(FilterAttribute::Brand),
            "color" => Some(FilterAttribute::Color),
            "fabric" => Some(FilterAttribute::Fabric),
            "feature" => Some(FilterAttribute::Feature),
            "occasion" => Some(FilterAttribute::Occasion),
            "price" => Some(FilterAttribute::Price),
            "size" => Some(FilterAttribute::Size),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActiveFilter {
    pub attribute: FilterAttribute,
    pub value: String,
}

impl ActiveFilter {
    pub fn new(attribute: FilterAttribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    /// Whitespace runs inside `value` collapse to a single space.
    pub fn parse(attribute: &str, value: &str) -> Option<Self> {
        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            return None;
        }
        FilterAttribute::from_str(attribute).map(|a| Self::new(a, value))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TitlePlacement {
    Prefix,
    Suffix,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterValue {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl FilterValue {
    fn new(id: &str, label: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            label: label.map(str::to_string),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttributeRule {
    pub placement: TitlePlacement,
    #[serde(default)]
    pub preposition: Option<String>,
    #[serde(default)]
    pub indexable: bool,
    /// Legal values. Empty means any non-empty value is accepted.
    #[serde(default)]
    pub values: Vec<FilterValue>,
}

impl AttributeRule {
    pub fn default_for(attribute: FilterAttribute) -> Self {
        fn rule(
            placement: TitlePlacement,
            preposition: Option<&str>,
            indexable: bool,
            values: &[(&str, Option<&str>)],
        ) -> AttributeRule {
            AttributeRule {
                placement,
                preposition: preposition.map(str::to_string),
                indexable,
                values: values
                    .iter()
                    .map(|(id, label)| FilterValue::new(id, *label))
                    .collect(),
            }
        }
        match attribute {
            FilterAttribute::Brand => rule(TitlePlacement::Prefix, None, true, &[]),
            FilterAttribute::Color => rule(
                TitlePlacement::Prefix,
                None,
                true,
                &[
                    ("black", None),
                    ("white", None),
                    ("navy", None),
                    ("beige", None),
                    ("grey", None),
                    ("brown", None),
                    ("olive", None),
                    ("burgundy", None),
                    ("dusty pink", None),
                    ("off-white", None),
                ],
            ),
            FilterAttribute::Fabric => rule(
                TitlePlacement::Prefix,
                None,
                true,
                &[
                    ("cotton", None),
                    ("linen", None),
                    ("modal", None),
                    ("jersey", None),
                    ("chiffon", None),
                    ("crepe", None),
                    ("nida", None),
                    ("polyester", None),
                ],
            ),
            FilterAttribute::Feature => rule(TitlePlacement::Suffix, Some("with"), true, &[]),
            FilterAttribute::Occasion => rule(
                TitlePlacement::Suffix,
                Some("for"),
                true,
                &[
                    ("everyday", None),
                    ("work", None),
                    ("wedding", None),
                    ("eid", None),
                    ("prayer", None),
                    ("travel", None),
                ],
            ),
            // Price ids and labels come from `PriceRanges`.
            FilterAttribute::Price => rule(TitlePlacement::Suffix, Some("priced"), false, &[]),
            FilterAttribute::Size => rule(
                TitlePlacement::Suffix,
                Some("in size"),
                false,
                &[
                    ("xs", Some("XS")),
                    ("s", Some("S")),
                    ("m", Some("M")),
                    ("l", Some("L")),
                    ("xl", Some("XL")),
                    ("xxl", Some("XXL")),
                    ("one size", None),
                ],
            ),
        }
    }

    pub fn preposition(&self) -> &str {
        self.preposition
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("with")
    }

    fn find(&self, value: &str) -> Option<&FilterValue> {
        self.values.iter().find(|v| same_slug(&v.id, value))
    }
}

/// Per-attribute rules. Attributes missing from a deserialized config fall
/// back to [`AttributeRule::default_for`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "BTreeMap<FilterAttribute, AttributeRule>")]
#[serde(into = "BTreeMap<FilterAttribute, AttributeRule>")]
pub struct FilterConfig {
    rules: BTreeMap<FilterAttribute, AttributeRule>,
}

impl From<BTreeMap<FilterAttribute, AttributeRule>> for FilterConfig {
    fn from(mut rules: BTreeMap<FilterAttribute, AttributeRule>) -> Self {
        for attribute in FilterAttribute::ALL {
            rules
                .entry(attribute)
                .or_insert_with(|| AttributeRule::default_for(attribute));
        }
        Self { rules }
    }
}

impl From<FilterConfig> for BTreeMap<FilterAttribute, AttributeRule> {
    fn from(config: FilterConfig) -> Self {
        config.rules
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        BTreeMap::new().into()
    }
}

impl FilterConfig {
    pub fn rule(&self, attribute: FilterAttribute) -> Cow<'_, AttributeRule> {
        self.rules
            .get(&attribute)
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(AttributeRule::default_for(attribute)))
    }

    /// Returns the configured spelling of `value`, `None` when the attribute has
    /// a value list that does not contain it. Free-form values are reduced to
    /// their slug words, so `Amani`, `AMANI` and `amani` share one spelling.
    /// Price values are checked with [`PriceRanges::canonical_id`] instead.
    pub fn canonical_value(&self, attribute: FilterAttribute, value: &str) -> Option<String> {
        let rule = self.rule(attribute);
        if rule.values.is_empty() {
            let slug = slugify(value);
            return (!slug.is_empty()).then(|| slug.replace('-', " "));
        }
        rule.find(value).map(|v| v.id.clone())
    }

    pub fn label(&self, attribute: FilterAttribute, value: &str) -> String {
        self.rule(attribute)
            .find(value)
            .and_then(|v| v.label.clone())
            .unwrap_or_else(|| capitalize_words(value))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PriceRange {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub min: Decimal,
    #[serde(default)]
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn new(id: &str, min: Decimal, max: Option<Decimal>) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            min,
            max,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn label(&self) -> String {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| capitalize_words(&self.id))
    }

    /// `[min, max)`
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && self.max.map_or(true, |max| price < max)
    }

    /// Parses ad-hoc ids of the form `under75`, `75to150` and `over300`.
    pub fn parse_id(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        if let Some((_, max)) = regex_captures!(r"^under(\d{1,9})$", &id) {
            return Some(Self::new(&id, Decimal::ZERO, Some(max.parse().ok()?)));
        }
        if let Some((_, min)) = regex_captures!(r"^over(\d{1,9})$", &id) {
            return Some(Self::new(&id, min.parse().ok()?, None));
        }
        if let Some((_, min, max)) = regex_captures!(r"^(\d{1,9})to(\d{1,9})$", &id) {
            let (min, max): (Decimal, Decimal) = (min.parse().ok()?, max.parse().ok()?);
            return (min < max).then(|| Self::new(&id, min, Some(max)));
        }
        None
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct PriceRanges(pub Vec<PriceRange>);

impl Default for PriceRanges {
    fn default() -> Self {
        Self(vec![
            PriceRange::new("under50", Decimal::ZERO, Some(dec!(50))).with_label("Under 50"),
            PriceRange::new("50to100", dec!(50), Some(dec!(100))).with_label("50 to 100"),
            PriceRange::new("100to200", dec!(100), Some(dec!(200))).with_label("100 to 200"),
            PriceRange::new("over200", dec!(200), None).with_label("Over 200"),
        ])
    }
}

impl PriceRanges {
    /// `None` for `all` and for ids that are neither configured nor parseable,
    /// which callers treat as "no price constraint".
    pub fn get(&self, id: &str) -> Option<Cow<'_, PriceRange>> {
        let id = id.trim();
        if id.is_empty() || id.eq_ignore_ascii_case("all") {
            return None;
        }
        self.0
            .iter()
            .find(|r| r.id.eq_ignore_ascii_case(id))
            .map(Cow::Borrowed)
            .or_else(|| PriceRange::parse_id(id).map(Cow::Owned))
    }

    /// Configured id for `value`, or the normalized ad-hoc id.
    pub fn canonical_id(&self, value: &str) -> Option<String> {
        self.get(value).map(|r| r.id.clone())
    }
}
