use log_error::LogError;

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PAGE_SIZE: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub site_name: String,
    pub base_url: String,
    pub page_size: usize,
    pub all_categories_label: String,
    pub catalog_config_path: String,
    pub products_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Modest Threads".to_string(),
            base_url: DEFAULT_SITE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            all_categories_label: "Clothing".to_string(),
            catalog_config_path: "catalog.yaml".to_string(),
            products_path: "storage/products.yaml".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        let base_url = envmnt::get_or("NEXT_PUBLIC_SITE_URL", &default.base_url)
            .trim()
            .trim_end_matches('/')
            .to_string();
        let page_size = envmnt::exists("CATALOG_PAGE_SIZE")
            .then(|| {
                envmnt::get_parse::<_, usize, _>("CATALOG_PAGE_SIZE")
                    .log_error("CATALOG_PAGE_SIZE is not a number")
            })
            .flatten()
            .filter(|v| *v > 0)
            .unwrap_or(default.page_size);
        Self {
            site_name: envmnt::get_or("SITE_NAME", &default.site_name),
            base_url: if base_url.is_empty() {
                default.base_url
            } else {
                base_url
            },
            page_size,
            all_categories_label: envmnt::get_or(
                "CATALOG_ALL_LABEL",
                &default.all_categories_label,
            ),
            catalog_config_path: envmnt::get_or("CATALOG_CONFIG", &default.catalog_config_path),
            products_path: envmnt::get_or("PRODUCTS_FILE", &default.products_path),
        }
    }

    pub fn absolute(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
