#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod catalog_path;
pub mod control;
pub mod filter_codec;
pub mod product_query;
pub mod seo_page;
pub mod site;
pub mod storefront;
