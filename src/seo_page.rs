use crate::catalog_path::Route;
use crate::filter_codec;
use crate::site::SiteConfig;
use derive_more::Display;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use storefront_types::filter::{ActiveFilter, FilterAttribute, FilterConfig, PriceRanges, TitlePlacement};
use storefront_types::taxonomy::TypeConfig;
use storefront_types::{same_slug, Gender};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Robots {
    #[serde(rename = "index, follow")]
    #[display("index, follow")]
    IndexFollow,
    #[serde(rename = "noindex, follow")]
    #[display("noindex, follow")]
    NoindexFollow,
    #[serde(rename = "noindex, nofollow")]
    #[display("noindex, nofollow")]
    NoindexNofollow,
}

impl Robots {
    pub fn as_str(&self) -> &'static str {
        match self {
            Robots::IndexFollow => "index, follow",
            Robots::NoindexFollow => "noindex, follow",
            Robots::NoindexNofollow => "noindex, nofollow",
        }
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self, Robots::IndexFollow)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SeoPageInfo {
    pub robots: Robots,
    pub canonical: String,
    pub title: String,
    pub h1: String,
    pub meta_description: String,
    pub intro_text: Option<String>,
}

/// Hand-written copy for a single-filter landing page with known search
/// volume. `gender` narrows the match for category ids shared by both genders.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SeoOverride {
    #[serde(default)]
    pub gender: Option<Gender>,
    pub category: String,
    pub attribute: FilterAttribute,
    pub value: String,
    pub title: String,
    pub h1: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub intro_text: Option<String>,
}

impl SeoOverride {
    pub fn matches(&self, gender: Option<Gender>, category: &str, filter: &ActiveFilter) -> bool {
        self.gender.map_or(true, |g| Some(g) == gender)
            && self.category.trim().eq_ignore_ascii_case(category)
            && self.attribute == filter.attribute
            && same_slug(&self.value, &filter.value)
    }
}

/// Everything the rules look at for one catalog page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub gender: Option<Gender>,
    pub category: Option<&'a TypeConfig>,
    pub style: Option<&'a str>,
    pub filters: &'a [ActiveFilter],
    pub page: u32,
}

impl PageContext<'_> {
    pub fn route(&self) -> Route {
        Route::new(
            self.gender.map(|g| g.as_str()).unwrap_or_default(),
            self.category.map(|c| c.id.as_str()),
            self.style,
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeoRules<'a> {
    pub site: &'a SiteConfig,
    pub filters: &'a FilterConfig,
    pub price_ranges: &'a PriceRanges,
    pub overrides: &'a [SeoOverride],
}

impl<'a> SeoRules<'a> {
    pub fn new(
        site: &'a SiteConfig,
        filters: &'a FilterConfig,
        price_ranges: &'a PriceRanges,
        overrides: &'a [SeoOverride],
    ) -> Self {
        Self {
            site,
            filters,
            price_ranges,
            overrides,
        }
    }

    pub fn evaluate(&self, ctx: &PageContext) -> SeoPageInfo {
        let filters = ctx.filters.iter().unique().collect::<Vec<_>>();
        let page = ctx.page.max(1);
        let route = ctx.route();
        let segment = filter_codec::encode(filters.iter().copied());

        let (robots, canonical) = match filters.as_slice() {
            [_, _, ..] => (Robots::NoindexNofollow, route.base()),
            [_] if page > 1 => (Robots::NoindexFollow, route.filtered(&segment)),
            [single] if !self.filters.rule(single.attribute).indexable => {
                (Robots::NoindexFollow, route.base())
            }
            [_] => (Robots::IndexFollow, route.paged(&segment, page)),
            [] if page > 1 => (Robots::NoindexFollow, route.base()),
            [] => (Robots::IndexFollow, route.paged(&segment, page)),
        };

        let subject = self.subject(ctx);
        let h1 = match filters.as_slice() {
            [single] => self.filtered_heading(&subject, single),
            _ => match ctx.gender {
                Some(gender) => format!("{} {subject}", gender.possessive()),
                None => subject,
            },
        };
        let mut meta_description = format!("Shop {h1} at {}.", self.site.site_name);
        if let Some(description) = ctx
            .category
            .map(|c| c.description.trim())
            .filter(|d| !d.is_empty())
        {
            meta_description = format!("{meta_description} {description}");
        }
        let mut info = SeoPageInfo {
            robots,
            canonical: self.site.absolute(&canonical),
            title: format!("{h1} | {}", self.site.site_name),
            h1,
            meta_description,
            intro_text: None,
        };

        if let ([single], Some(category)) = (filters.as_slice(), ctx.category) {
            if let Some(o) = self
                .overrides
                .iter()
                .find(|o| o.matches(ctx.gender, &category.id, single))
            {
                log::debug!("SEO override for {}/{}-{}", category.id, single.attribute, single.value);
                info.title = o.title.clone();
                info.h1 = o.h1.clone();
                if let Some(meta_description) = &o.meta_description {
                    info.meta_description = meta_description.clone();
                }
                info.intro_text = o.intro_text.clone();
            }
        }
        info
    }

    fn subject(&self, ctx: &PageContext) -> String {
        ctx.style
            .or(ctx.category.map(|c| c.name.as_str()))
            .unwrap_or(self.site.all_categories_label.as_str())
            .to_string()
    }

    fn filtered_heading(&self, subject: &str, filter: &ActiveFilter) -> String {
        let rule = self.filters.rule(filter.attribute);
        let label = match filter.attribute {
            FilterAttribute::Price => self
                .price_ranges
                .get(&filter.value)
                .map(|r| r.label())
                .unwrap_or_else(|| self.filters.label(filter.attribute, &filter.value)),
            _ => self.filters.label(filter.attribute, &filter.value),
        };
        match rule.placement {
            TitlePlacement::Prefix => format!("{label} {subject}"),
            TitlePlacement::Suffix => format!("{subject} {} {label}", rule.preposition()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_types::filter::FilterAttribute::*;
    use storefront_types::taxonomy::Taxonomy;

    fn site() -> SiteConfig {
        SiteConfig {
            site_name: "Modest Threads".to_string(),
            base_url: "https://shop.example".to_string(),
            ..Default::default()
        }
    }

    fn evaluate(filters: &[ActiveFilter], page: u32) -> SeoPageInfo {
        evaluate_with(filters, page, &[])
    }

    fn evaluate_with(filters: &[ActiveFilter], page: u32, overrides: &[SeoOverride]) -> SeoPageInfo {
        let site = site();
        let config = FilterConfig::default();
        let taxonomy = Taxonomy::default();
        let resolved = taxonomy.validate("women", Some("hijabs"), None);
        let ctx = PageContext {
            gender: resolved.gender,
            category: resolved.category,
            style: resolved.style,
            filters,
            page,
        };
        SeoRules::new(&site, &config, &PriceRanges::default(), overrides).evaluate(&ctx)
    }

    fn f(attribute: FilterAttribute, value: &str) -> ActiveFilter {
        ActiveFilter::new(attribute, value)
    }

    const BASE: &str = "https://shop.example/women/hijabs";

    #[test]
    fn unfiltered_first_page_is_indexed() {
        let info = evaluate(&[], 1);
        assert_eq!(info.robots, Robots::IndexFollow);
        assert_eq!(info.canonical, BASE);
    }

    #[test]
    fn unfiltered_deep_page_points_to_first_page() {
        let info = evaluate(&[], 3);
        assert_eq!(info.robots, Robots::NoindexFollow);
        assert_eq!(info.canonical, BASE);
    }

    #[test]
    fn indexable_single_filter_is_canonical_to_itself() {
        let info = evaluate(&[f(Color, "black")], 1);
        assert_eq!(info.robots, Robots::IndexFollow);
        assert_eq!(info.canonical, format!("{BASE}/f/color-black"));
    }

    #[test]
    fn non_indexable_single_filter_points_to_base() {
        let info = evaluate(&[f(Size, "l")], 1);
        assert_eq!(info.robots, Robots::NoindexFollow);
        assert_eq!(info.canonical, BASE);
    }

    #[test]
    fn paginated_single_filter_points_to_filter_first_page() {
        let info = evaluate(&[f(Color, "black")], 2);
        assert_eq!(info.robots, Robots::NoindexFollow);
        assert_eq!(info.canonical, format!("{BASE}/f/color-black"));
        let info = evaluate(&[f(Size, "l")], 2);
        assert_eq!(info.canonical, format!("{BASE}/f/size-l"));
    }

    #[test]
    fn multiple_attributes_are_not_followed() {
        let info = evaluate(&[f(Color, "black"), f(Fabric, "cotton")], 1);
        assert_eq!(info.robots, Robots::NoindexNofollow);
        assert_eq!(info.canonical, BASE);
    }

    #[test]
    fn repeated_attribute_counts_each_value() {
        let info = evaluate(&[f(Color, "black"), f(Color, "navy")], 1);
        assert_eq!(info.robots, Robots::NoindexNofollow);
        assert_eq!(info.canonical, BASE);
    }

    #[test]
    fn duplicate_pairs_count_once() {
        let info = evaluate(&[f(Color, "black"), f(Color, "black")], 1);
        assert_eq!(info.robots, Robots::IndexFollow);
    }

    #[test]
    fn robots_serializes_to_meta_string() {
        assert_eq!(serde_json::to_string(&Robots::NoindexFollow).unwrap(), "\"noindex, follow\"");
        assert_eq!(Robots::NoindexNofollow.to_string(), Robots::NoindexNofollow.as_str());
        assert!(!Robots::NoindexFollow.is_indexable());
    }

    #[test]
    fn unfiltered_title_has_gender_prefix() {
        let info = evaluate(&[], 1);
        assert_eq!(info.h1, "Women's Hijabs");
        assert_eq!(info.title, "Women's Hijabs | Modest Threads");
        assert!(info.meta_description.starts_with("Shop Women's Hijabs at Modest Threads."));
    }

    #[test]
    fn prefix_filter_title() {
        let info = evaluate(&[f(Fabric, "modal")], 1);
        assert!(info.title.starts_with("Modal Hijabs"));
        assert_eq!(info.title, "Modal Hijabs | Modest Threads");
        assert_eq!(info.h1, "Modal Hijabs");
    }

    #[test]
    fn suffix_filter_title() {
        let info = evaluate(&[f(Occasion, "wedding")], 1);
        assert!(info.title.contains("Hijabs for Wedding"));
        let info = evaluate(&[f(Feature, "magnetic closure")], 1);
        assert_eq!(info.h1, "Hijabs with Magnetic Closure");
        let info = evaluate(&[f(Size, "xl")], 1);
        assert_eq!(info.h1, "Hijabs in size XL");
    }

    #[test]
    fn price_title_uses_range_label() {
        let info = evaluate_with(&[f(Price, "100to200")], 1, &[]);
        assert_eq!(info.h1, "Hijabs priced 100 to 200");
        assert_eq!(info.canonical, BASE);
        let info = evaluate_with(&[f(Price, "75to150")], 1, &[]);
        assert_eq!(info.h1, "Hijabs priced 75to150");
    }

    #[test]
    fn multi_filter_title_falls_back_to_base() {
        let info = evaluate(&[f(Color, "black"), f(Fabric, "cotton")], 1);
        assert_eq!(info.title, "Women's Hijabs | Modest Threads");
    }

    #[test]
    fn title_without_gender_or_category() {
        let site = site();
        let config = FilterConfig::default();
        let ctx = PageContext {
            gender: None,
            category: None,
            style: None,
            filters: &[],
            page: 1,
        };
        let info = SeoRules::new(&site, &config, &PriceRanges::default(), &[]).evaluate(&ctx);
        assert_eq!(info.title, "Clothing | Modest Threads");
        assert_eq!(info.canonical, "https://shop.example/");
    }

    #[test]
    fn style_is_the_title_subject() {
        let site = site();
        let config = FilterConfig::default();
        let taxonomy = Taxonomy::default();
        let resolved = taxonomy.validate("men", Some("thobe"), Some("saudi-thobe"));
        let filters = [f(Color, "white")];
        let ctx = PageContext {
            gender: resolved.gender,
            category: resolved.category,
            style: resolved.style,
            filters: &filters,
            page: 1,
        };
        let info = SeoRules::new(&site, &config, &PriceRanges::default(), &[]).evaluate(&ctx);
        assert_eq!(info.h1, "White Saudi Thobe");
        assert_eq!(info.canonical, "https://shop.example/men/thobe/saudi-thobe/f/color-white");
    }

    fn wedding_override() -> SeoOverride {
        SeoOverride {
            gender: None,
            category: "hijabs".to_string(),
            attribute: Occasion,
            value: "wedding".to_string(),
            title: "Bridal Hijabs for Your Wedding Day | Modest Threads".to_string(),
            h1: "Bridal Hijabs".to_string(),
            meta_description: None,
            intro_text: Some("Lace and satin hijabs for the big day.".to_string()),
        }
    }

    #[test]
    fn override_replaces_generated_copy() {
        let info = evaluate_with(&[f(Occasion, "wedding")], 1, &[wedding_override()]);
        assert_eq!(info.title, "Bridal Hijabs for Your Wedding Day | Modest Threads");
        assert_eq!(info.h1, "Bridal Hijabs");
        assert_eq!(info.intro_text.as_deref(), Some("Lace and satin hijabs for the big day."));
        assert!(info.meta_description.starts_with("Shop Hijabs for Wedding"));
        assert_eq!(info.robots, Robots::IndexFollow);
    }

    #[test]
    fn override_needs_exact_triple() {
        let overrides = [wedding_override()];
        let info = evaluate_with(&[f(Occasion, "eid")], 1, &overrides);
        assert_eq!(info.h1, "Hijabs for Eid");
        let info = evaluate_with(&[f(Occasion, "wedding"), f(Color, "black")], 1, &overrides);
        assert_eq!(info.h1, "Women's Hijabs");
        let mut men_only = wedding_override();
        men_only.gender = Some(Gender::Men);
        let info = evaluate_with(&[f(Occasion, "wedding")], 1, &[men_only]);
        assert_eq!(info.h1, "Hijabs for Wedding");
    }
}
