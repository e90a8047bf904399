use lazy_regex::regex_is_match;
use storefront_types::slugify;

pub const FILTER_MARKER: &str = "f";
pub const PAGE_MARKER: &str = "page";

/// Gender/category/style part of a catalog URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub gender: String,
    pub category: Option<String>,
    pub style: Option<String>,
}

impl Route {
    pub fn new(gender: &str, category: Option<&str>, style: Option<&str>) -> Self {
        let category = category.map(str::to_string);
        // a style is only reachable under its category
        let style = category.as_ref().and(style).map(slugify);
        Self {
            gender: gender.to_string(),
            category,
            style: style.filter(|s| !s.is_empty()),
        }
    }

    pub fn base(&self) -> String {
        let path: String = std::iter::once(&self.gender)
            .chain(&self.category)
            .chain(&self.style)
            .filter(|s| !s.is_empty())
            .map(|s| format!("/{s}"))
            .collect();
        if path.is_empty() {
            "/".to_string()
        } else {
            path
        }
    }

    pub fn filtered(&self, segment: &str) -> String {
        let base = self.base();
        if segment.is_empty() {
            base
        } else {
            format!("{}/{FILTER_MARKER}/{segment}", base.trim_end_matches('/'))
        }
    }

    /// Page 1 is never part of the URL.
    pub fn paged(&self, segment: &str, page: u32) -> String {
        let path = self.filtered(segment);
        if page > 1 {
            format!("{}/{PAGE_MARKER}/{page}", path.trim_end_matches('/'))
        } else {
            path
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPath {
    pub route: Route,
    /// Raw filter segment, still encoded.
    pub filters: String,
    pub page: u32,
}

impl CatalogPath {
    pub fn to_path(&self) -> String {
        self.route.paged(&self.filters, self.page)
    }
}

pub fn parse_page(input: &str) -> u32 {
    let input = input.trim();
    if !regex_is_match!(r"^\d{1,9}$", input) {
        log::debug!("Non-numeric page {input:?}");
        return 1;
    }
    input.parse().ok().filter(|p| *p > 0).unwrap_or(1)
}

/// `/{gender}[/{category}[/{style}]][/f/{segment}][/page/{N}]`
///
/// Returns `None` when the path does not fit the grammar. Gender, category and
/// style are returned as written; resolving them is up to the taxonomy.
pub fn parse(path: &str) -> Option<CatalogPath> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let gender = segments.next()?;
    if gender == FILTER_MARKER || gender == PAGE_MARKER {
        return None;
    }
    let mut taxonomy = Vec::new();
    let mut filters = String::new();
    let mut page = 1;
    let mut next = segments.next();
    while let Some(segment) = next.filter(|s| *s != FILTER_MARKER && *s != PAGE_MARKER) {
        taxonomy.push(segment);
        next = segments.next();
    }
    if taxonomy.len() > 2 {
        return None;
    }
    if next == Some(FILTER_MARKER) {
        filters = segments.next()?.to_string();
        next = segments.next();
    }
    if next == Some(PAGE_MARKER) {
        page = parse_page(segments.next()?);
        next = segments.next();
    }
    if next.is_some() {
        return None;
    }
    Some(CatalogPath {
        route: Route {
            gender: gender.to_string(),
            category: taxonomy.first().map(|s| s.to_string()),
            style: taxonomy.get(1).map(|s| s.to_string()),
        },
        filters,
        page,
    })
}
