use crate::catalog::{self, CatalogConfig};
use crate::catalog_path::{self, Route};
use crate::filter_codec;
use crate::product_query::{self, Page, ProductQuery, SortKey};
use crate::seo_page::{PageContext, SeoPageInfo, SeoRules};
use crate::site::SiteConfig;
use itertools::Itertools;
use log_error::LogError;
use serde::Serialize;
use storefront_types::filter::{ActiveFilter, FilterAttribute};
use storefront_types::product::Product;
use storefront_types::taxonomy::TypeConfig;
use storefront_types::Gender;
use url::form_urlencoded;

/// Query parameters that change the view but never the canonical page.
pub const VIEW_PARAMS: [&str; 3] = ["sort", "q", "in_stock"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub sort: Option<String>,
    pub q: Option<String>,
    pub in_stock: Option<String>,
    pub page: Option<String>,
}

impl ViewParams {
    /// The first occurrence of a repeated key wins.
    pub fn parse(query: &str) -> Self {
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(query.trim_start_matches('?'))
            .log_error("Unable to parse catalog query")
            .unwrap_or_default();
        let mut view = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "sort" => &mut view.sort,
                "q" => &mut view.q,
                "in_stock" => &mut view.in_stock,
                "page" => &mut view.page,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        view
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort.as_deref().map(SortKey::from_str).unwrap_or_default()
    }

    pub fn in_stock_only(&self) -> bool {
        matches!(
            self.in_stock.as_deref().map(|s| s.trim().to_lowercase()).as_deref(),
            Some("1" | "true" | "on" | "yes")
        )
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct CatalogPage {
    pub gender: Gender,
    pub category: Option<TypeConfig>,
    pub style: Option<String>,
    pub filters: Vec<ActiveFilter>,
    /// Normalized form of the requested path.
    pub path: String,
    pub sort: SortKey,
    pub seo: SeoPageInfo,
    pub products: Page<Product>,
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Set when the request should be answered with a permanent redirect.
    pub redirect: Option<String>,
}

pub struct Storefront {
    pub site: SiteConfig,
    pub catalog: CatalogConfig,
    pub products: Vec<Product>,
}

fn view_query(query: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        if VIEW_PARAMS.iter().any(|k| *k == key) {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.finish()
}

fn with_query(path: String, query: &str) -> String {
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

/// Legacy filter keys and `page` belong in the path.
fn query_needs_rewrite(query: &str) -> bool {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .any(|(key, _)| key == "page" || FilterAttribute::from_str(&key).is_some())
}

impl Storefront {
    pub fn new(site: SiteConfig, catalog: CatalogConfig, products: Vec<Product>) -> Self {
        for p in &products {
            if catalog.taxonomy.category(p.gender, &p.category).is_none() {
                log::warn!("Product {} is in unknown category {}/{}", p.id, p.gender.as_str(), p.category);
            }
        }
        Self {
            site,
            catalog,
            products,
        }
    }

    pub fn load(site: SiteConfig) -> Result<Self, anyhow::Error> {
        let catalog = catalog::read_catalog_config(&site.catalog_config_path)?;
        let products = catalog::read_products(&site.products_path)?;
        log::info!("Loaded {} products", products.len());
        Ok(Self::new(site, catalog, products))
    }

    pub fn seo_rules(&self) -> SeoRules<'_> {
        SeoRules::new(
            &self.site,
            &self.catalog.filters,
            &self.catalog.price_ranges,
            &self.catalog.overrides,
        )
    }

    /// Canonical spelling of a single value, `None` when it is not legal for
    /// `attribute`. Price values are checked against the price ranges.
    pub fn canonical_value(&self, attribute: FilterAttribute, value: &str) -> Option<String> {
        match attribute {
            FilterAttribute::Price => self.catalog.price_ranges.canonical_id(value),
            _ => self.catalog.filters.canonical_value(attribute, value),
        }
    }

    /// Canonical spelling of each filter; values outside an attribute's legal
    /// list are dropped.
    pub fn normalize_filters(&self, filters: Vec<ActiveFilter>) -> Vec<ActiveFilter> {
        filters
            .into_iter()
            .filter_map(|f| {
                let value = self.canonical_value(f.attribute, &f.value);
                if value.is_none() {
                    log::debug!("Dropping illegal filter {}-{}", f.attribute, f.value);
                }
                value.map(|v| ActiveFilter::new(f.attribute, v))
            })
            .unique()
            .collect()
    }

    /// Canonical `/f/` segment for a set of raw filter pairs.
    pub fn filter_segment<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filters = pairs
            .into_iter()
            .filter_map(|(k, v)| ActiveFilter::parse(k.as_ref(), v.as_ref()))
            .collect();
        filter_codec::encode(&self.normalize_filters(filters))
    }

    /// `None` means the path is not a catalog page (404).
    pub fn resolve(&self, path: &str, query: &str) -> Option<CatalogPage> {
        let parsed = catalog_path::parse(path)?;
        let route = &parsed.route;
        let resolved = self.catalog.taxonomy.validate(
            &route.gender,
            route.category.as_deref(),
            route.style.as_deref(),
        );
        let Some(gender) = resolved.gender else {
            log::debug!("Unknown gender {:?}", route.gender);
            return None;
        };
        if route.category.is_some() && resolved.category.is_none() {
            log::debug!("Unknown category {:?} for {}", route.category, gender.as_str());
            return None;
        }
        if route.style.is_some() && resolved.style.is_none() {
            log::debug!("Dropping unknown style {:?}", route.style);
        }

        let view = ViewParams::parse(query);
        let filters = self.normalize_filters(filter_codec::merge(
            filter_codec::decode(&parsed.filters),
            filter_codec::filters_from_query(query),
        ));
        let page = match &view.page {
            Some(page) if parsed.page == 1 => catalog_path::parse_page(page),
            _ => parsed.page,
        };

        let canonical_route = Route::new(
            gender.as_str(),
            resolved.category.map(|c| c.id.as_str()),
            resolved.style,
        );
        let segment = filter_codec::encode(&filters);
        let normalized = canonical_route.paged(&segment, page);
        let view_query = view_query(query);
        let requested = format!("/{}", path.split('?').next().unwrap_or_default().trim_matches('/'));
        let redirect = (normalized != requested || query_needs_rewrite(query))
            .then(|| with_query(normalized.clone(), &view_query));

        let seo = self.seo_rules().evaluate(&PageContext {
            gender: Some(gender),
            category: resolved.category,
            style: resolved.style,
            filters: &filters,
            page,
        });

        let product_query = ProductQuery {
            gender: Some(gender),
            category: resolved.category.map(|c| c.id.clone()),
            style: resolved.style.map(str::to_string),
            filters: filters.clone(),
            price_range: None,
            search: view.q.clone(),
            in_stock_only: view.in_stock_only(),
        };
        let sort = view.sort_key();
        let mut items = product_query::filter(&self.products, &product_query, &self.catalog.price_ranges);
        product_query::sort(&mut items, sort);
        let products = product_query::paginate(items, page, self.site.page_size).map(Product::clone);

        let link = |page: u32| with_query(canonical_route.paged(&segment, page), &view_query);
        let prev = products
            .has_previous_page
            .then(|| link((page - 1).min(products.total_pages.max(1))));
        let next = products.has_next_page.then(|| link(page + 1));

        Some(CatalogPage {
            gender,
            category: resolved.category.cloned(),
            style: resolved.style.map(str::to_string),
            filters,
            path: normalized,
            sort,
            seo,
            products,
            prev,
            next,
            redirect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seo_page::Robots;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use storefront_types::filter::FilterAttribute::*;
    use storefront_types::filter::PriceRange;
    use storefront_types::product::ProductDto;

    fn product(name: &str, gender: Gender, category: &str, color: &str, price: Decimal) -> Product {
        Product::try_from(ProductDto {
            name: name.to_string(),
            price,
            gender: Some(gender),
            category: category.to_string(),
            color: color.to_string(),
            in_stock: true,
            ..Default::default()
        })
        .unwrap()
    }

    fn storefront() -> Storefront {
        let site = SiteConfig {
            base_url: "https://shop.example".to_string(),
            page_size: 2,
            ..Default::default()
        };
        let mut products = vec![
            product("Black Jersey Hijab", Gender::Women, "hijabs", "black", dec!(15)),
            product("Navy Chiffon Hijab", Gender::Women, "hijabs", "navy", dec!(18)),
            product("Black Modal Hijab", Gender::Women, "hijabs", "black", dec!(22)),
            product("Beige Square Hijab", Gender::Women, "hijabs", "beige", dec!(12)),
            product("Black Saudi Thobe", Gender::Men, "thobe", "black", dec!(90)),
        ];
        products[1].in_stock = false;
        products[4].style = Some("Saudi Thobe".to_string());
        Storefront::new(site, CatalogConfig::default(), products)
    }

    fn names(page: &CatalogPage) -> Vec<&str> {
        page.products.items.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn resolves_category_page() {
        let page = storefront().resolve("/women/hijabs", "").unwrap();
        assert_eq!(page.gender, Gender::Women);
        assert_eq!(page.category.as_ref().map(|c| c.id.as_str()), Some("hijabs"));
        assert_eq!(page.products.total, 4);
        assert_eq!(names(&page), ["Black Jersey Hijab", "Navy Chiffon Hijab"]);
        assert_eq!(page.seo.robots, Robots::IndexFollow);
        assert_eq!(page.seo.canonical, "https://shop.example/women/hijabs");
        assert_eq!(page.next.as_deref(), Some("/women/hijabs/page/2"));
        assert!(page.prev.is_none());
        assert!(page.redirect.is_none());
    }

    #[test]
    fn gender_page_lists_all_categories() {
        let page = storefront().resolve("/men", "").unwrap();
        assert!(page.category.is_none());
        assert_eq!(names(&page), ["Black Saudi Thobe"]);
        assert_eq!(page.seo.h1, "Men's Clothing");
    }

    #[test]
    fn unknown_gender_or_category_is_not_found() {
        let store = storefront();
        assert!(store.resolve("/kids/hijabs", "").is_none());
        assert!(store.resolve("/men/abaya", "").is_none());
        assert!(store.resolve("/women/hijabs/jersey-hijab/extra/parts", "").is_none());
    }

    #[test]
    fn unknown_style_redirects_to_category() {
        let page = storefront().resolve("/men/thobe/kimono-abaya", "").unwrap();
        assert!(page.style.is_none());
        assert_eq!(page.redirect.as_deref(), Some("/men/thobe"));
    }

    #[test]
    fn style_page_filters_by_style() {
        let page = storefront().resolve("/men/thobe/saudi-thobe", "").unwrap();
        assert_eq!(page.style.as_deref(), Some("Saudi Thobe"));
        assert_eq!(names(&page), ["Black Saudi Thobe"]);
        assert_eq!(page.seo.title, "Men's Saudi Thobe | Modest Threads");
        assert!(page.redirect.is_none());
    }

    #[test]
    fn single_filter_landing_page() {
        let page = storefront().resolve("/women/hijabs/f/color-black", "").unwrap();
        assert_eq!(page.filters, vec![ActiveFilter::new(Color, "black")]);
        assert_eq!(page.products.total, 2);
        assert_eq!(page.seo.robots, Robots::IndexFollow);
        assert_eq!(page.seo.canonical, "https://shop.example/women/hijabs/f/color-black");
        assert_eq!(page.seo.h1, "Black Hijabs");
        assert!(page.redirect.is_none());
    }

    #[test]
    fn unsorted_tokens_redirect_to_canonical_order() {
        let page = storefront()
            .resolve("/women/hijabs/f/fabric-modal+color-black", "")
            .unwrap();
        assert_eq!(
            page.redirect.as_deref(),
            Some("/women/hijabs/f/color-black+fabric-modal")
        );
        assert_eq!(page.seo.robots, Robots::NoindexNofollow);
    }

    #[test]
    fn illegal_values_are_dropped() {
        let page = storefront()
            .resolve("/women/hijabs/f/color-Black+color-plaid+colour-red", "")
            .unwrap();
        assert_eq!(page.filters, vec![ActiveFilter::new(Color, "black")]);
        assert_eq!(page.redirect.as_deref(), Some("/women/hijabs/f/color-black"));
    }

    #[test]
    fn brand_spellings_share_one_page() {
        let store = storefront();
        for path in ["/women/hijabs/f/brand-Amani", "/women/hijabs/f/brand-AMANI"] {
            let page = store.resolve(path, "").unwrap();
            assert_eq!(page.filters, vec![ActiveFilter::new(Brand, "amani")]);
            assert_eq!(page.redirect.as_deref(), Some("/women/hijabs/f/brand-amani"));
            assert_eq!(page.seo.canonical, "https://shop.example/women/hijabs/f/brand-amani");
        }
        let page = store.resolve("/women/hijabs/f/brand-amani", "").unwrap();
        assert!(page.redirect.is_none());
        assert_eq!(page.seo.robots, Robots::IndexFollow);
        assert_eq!(page.seo.h1, "Amani Hijabs");
    }

    #[test]
    fn configured_price_range_is_kept() {
        let mut store = storefront();
        store
            .catalog
            .price_ranges
            .0
            .push(PriceRange::new("over500", dec!(500), None).with_label("Over 500"));
        let page = store.resolve("/women/hijabs/f/price-over500", "").unwrap();
        assert_eq!(page.filters, vec![ActiveFilter::new(Price, "over500")]);
        assert!(page.redirect.is_none());
        assert_eq!(page.seo.h1, "Hijabs priced Over 500");
        assert_eq!(page.products.total, 0);

        let page = store.resolve("/women/hijabs/f/price-UNDER50", "").unwrap();
        assert_eq!(page.redirect.as_deref(), Some("/women/hijabs/f/price-under50"));
        assert_eq!(page.products.total, 4);
    }

    #[test]
    fn repeated_view_params_keep_the_first() {
        let view = ViewParams::parse("?sort=name&sort=rating&q=hijab&q=abaya&in_stock=1");
        assert_eq!(view.sort_key(), SortKey::Name);
        assert_eq!(view.q.as_deref(), Some("hijab"));
        assert!(view.in_stock_only());
        let page = storefront()
            .resolve("/women/hijabs", "sort=price_asc&sort=name")
            .unwrap();
        assert_eq!(page.sort, SortKey::PriceAsc);
    }

    #[test]
    fn legacy_query_moves_into_path() {
        let page = storefront()
            .resolve("/women/hijabs", "color=black&sort=price_desc&page=2")
            .unwrap();
        assert_eq!(page.filters, vec![ActiveFilter::new(Color, "black")]);
        assert_eq!(
            page.redirect.as_deref(),
            Some("/women/hijabs/f/color-black/page/2?sort=price_desc")
        );
        assert!(page.products.items.is_empty());
        assert_eq!(page.prev.as_deref(), Some("/women/hijabs/f/color-black?sort=price_desc"));
    }

    #[test]
    fn first_page_is_never_in_the_url() {
        let page = storefront().resolve("/women/hijabs/page/1", "").unwrap();
        assert_eq!(page.redirect.as_deref(), Some("/women/hijabs"));
        let page = storefront().resolve("/women/hijabs/page/zero", "").unwrap();
        assert_eq!(page.products.page, 1);
    }

    #[test]
    fn view_params_do_not_redirect() {
        let page = storefront()
            .resolve("/women/hijabs", "sort=price_asc&in_stock=1&q=hijab")
            .unwrap();
        assert!(page.redirect.is_none());
        assert_eq!(page.sort, SortKey::PriceAsc);
        assert_eq!(page.products.total, 3);
        assert_eq!(names(&page), ["Beige Square Hijab", "Black Jersey Hijab"]);
        assert_eq!(
            page.next.as_deref(),
            Some("/women/hijabs/page/2?sort=price_asc&in_stock=1&q=hijab")
        );
    }

    #[test]
    fn deep_page_links_back() {
        let page = storefront().resolve("/women/hijabs/page/2", "").unwrap();
        assert_eq!(page.seo.robots, Robots::NoindexFollow);
        assert_eq!(page.seo.canonical, "https://shop.example/women/hijabs");
        assert_eq!(page.prev.as_deref(), Some("/women/hijabs"));
        assert!(page.next.is_none());
        let page = storefront().resolve("/women/hijabs/page/999", "").unwrap();
        assert!(page.products.items.is_empty());
        assert_eq!(page.prev.as_deref(), Some("/women/hijabs/page/2"));
    }

    #[test]
    fn builds_filter_segment_from_pairs() {
        let store = storefront();
        assert_eq!(
            store.filter_segment([("fabric", "Cotton"), ("color", "Black"), ("material", "silk")]),
            "color-black+fabric-cotton"
        );
        assert_eq!(store.filter_segment([("color", "plaid")]), "");
    }
}
