use itertools::Itertools;
use serde::{Deserialize, Serialize};
use storefront_types::filter::{ActiveFilter, FilterAttribute, PriceRanges};
use storefront_types::product::Product;
use storefront_types::{slugify, Gender};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub gender: Option<Gender>,
    pub category: Option<String>,
    pub style: Option<String>,
    pub filters: Vec<ActiveFilter>,
    pub price_range: Option<String>,
    pub search: Option<String>,
    pub in_stock_only: bool,
}

fn slug_eq(a: &str, b: &str) -> bool {
    let a = slugify(a);
    !a.is_empty() && a == slugify(b)
}

pub fn matches_filter(
    product: &Product,
    attribute: FilterAttribute,
    value: &str,
    ranges: &PriceRanges,
) -> bool {
    match attribute {
        FilterAttribute::Brand => product.brand.as_deref().is_some_and(|b| slug_eq(b, value)),
        FilterAttribute::Color => slug_eq(&product.color, value),
        FilterAttribute::Fabric => slug_eq(&product.fabric, value),
        FilterAttribute::Feature => product
            .features
            .iter()
            .chain(&product.tags)
            .any(|f| slug_eq(f, value)),
        FilterAttribute::Occasion => product.occasions.iter().any(|o| slug_eq(o, value)),
        // unknown range ids do not constrain
        FilterAttribute::Price => ranges
            .get(value)
            .map_or(true, |r| r.contains(product.effective_price())),
        FilterAttribute::Size => product.sizes.iter().any(|s| slug_eq(s, value)),
    }
}

fn matches_search(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(term) || product.description.to_lowercase().contains(term)
}

/// Every criterion must hold. Several values of the same attribute are
/// alternatives, so `color-black+color-navy` lists black and navy products.
pub fn filter<'p>(products: &'p [Product], query: &ProductQuery, ranges: &PriceRanges) -> Vec<&'p Product> {
    let price_range = query.price_range.as_deref().and_then(|id| ranges.get(id));
    let search = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let groups = query.filters.iter().into_group_map_by(|f| f.attribute);
    products
        .iter()
        .filter(|p| query.gender.map_or(true, |g| p.gender == g))
        .filter(|p| {
            query
                .category
                .as_deref()
                .map_or(true, |c| p.category.eq_ignore_ascii_case(c.trim()))
        })
        .filter(|p| {
            query
                .style
                .as_deref()
                .map_or(true, |s| p.style.as_deref().is_some_and(|ps| slug_eq(ps, s)))
        })
        .filter(|p| !query.in_stock_only || p.in_stock)
        .filter(|p| {
            price_range
                .as_ref()
                .map_or(true, |r| r.contains(p.effective_price()))
        })
        .filter(|p| search.as_deref().map_or(true, |s| matches_search(p, s)))
        .filter(|p| {
            groups.iter().all(|(attribute, values)| {
                values
                    .iter()
                    .any(|f| matches_filter(p, *attribute, &f.value, ranges))
            })
        })
        .collect()
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Featured,
    Name,
    PriceAsc,
    PriceDesc,
    Rating,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Featured => "featured",
            SortKey::Name => "name",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Rating => "rating",
        }
    }

    pub fn from_str(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "name" => SortKey::Name,
            "price_asc" => SortKey::PriceAsc,
            "price_desc" => SortKey::PriceDesc,
            "rating" => SortKey::Rating,
            _ => SortKey::Featured,
        }
    }
}

/// Stable: products comparing equal keep their relative order.
pub fn sort(items: &mut [&Product], key: SortKey) {
    match key {
        SortKey::Featured => (),
        SortKey::Name => items.sort_by_cached_key(|p| p.name.to_lowercase()),
        SortKey::PriceAsc => items.sort_by_key(|p| p.effective_price()),
        SortKey::PriceDesc => items.sort_by(|a, b| b.effective_price().cmp(&a.effective_price())),
        SortKey::Rating => items.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub page_size: usize,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// 1-indexed. Pages past the end are empty; page and size 0 are read as 1.
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = u32::try_from(total.div_ceil(page_size)).unwrap_or(u32::MAX);
    let offset = (page as usize - 1).saturating_mul(page_size);
    let items = items.into_iter().skip(offset).take(page_size).collect();
    Page {
        items,
        total,
        page,
        page_size,
        total_pages,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page,
        }
    }
}
