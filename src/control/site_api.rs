use crate::catalog_path::Route;
use crate::control::{ControllerError, Response};
use crate::filter_codec;
use crate::storefront::Storefront;
use actix_web::{get, web::Data, web::Path, HttpRequest, HttpResponse};
use serde::Serialize;
use std::sync::Arc;
use storefront_types::filter::ActiveFilter;
use storefront_types::{slugify, Gender};
use url::form_urlencoded;

pub const CATALOG_PREFIX: &str = "/api/site/catalog";

#[derive(Serialize, Debug)]
pub struct StyleDto {
    pub name: String,
    pub slug: String,
    pub path: String,
}

#[derive(Serialize, Debug)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub path: String,
    pub styles: Vec<StyleDto>,
}

#[derive(Serialize, Debug)]
pub struct SegmentDto {
    pub segment: String,
    pub filters: Vec<ActiveFilter>,
    pub path: Option<String>,
}

fn styles(gender: Gender, category: &str, names: &[String]) -> Vec<StyleDto> {
    names
        .iter()
        .map(|name| StyleDto {
            name: name.clone(),
            slug: slugify(name),
            path: Route::new(gender.as_str(), Some(category), Some(name)).base(),
        })
        .collect()
}

fn cached_json<T: Serialize>(body: &T) -> HttpResponse {
    let mut resp = HttpResponse::Ok();
    resp.insert_header(("Cache-Control", "public, max-age=300"));
    resp.json(body)
}

/// Catalog page for the path after the prefix. The raw request URI is used so
/// the filter segment reaches the codec still percent-encoded.
#[get("/api/site/catalog/{path:.*}")]
pub async fn catalog_page(storefront: Data<Arc<Storefront>>, req: HttpRequest) -> Response {
    let path = req
        .uri()
        .path()
        .strip_prefix(CATALOG_PREFIX)
        .unwrap_or_default();
    let page = storefront
        .resolve(path, req.query_string())
        .ok_or(ControllerError::NotFound)?;
    let mut resp = HttpResponse::Ok();
    resp.insert_header(("Cache-Control", "public, max-age=300"));
    resp.insert_header(("X-Robots-Tag", page.seo.robots.as_str()));
    Ok(resp.json(page))
}

#[get("/api/site/taxonomy/{gender}")]
pub async fn categories(storefront: Data<Arc<Storefront>>, gender: Path<String>) -> Response {
    let gender = Gender::from_slug(&gender).ok_or(ControllerError::NotFound)?;
    let categories = storefront
        .catalog
        .taxonomy
        .categories(gender)
        .iter()
        .map(|c| CategoryDto {
            id: c.id.clone(),
            name: c.name.clone(),
            description: c.description.clone(),
            keywords: c.keywords.clone(),
            path: Route::new(gender.as_str(), Some(&c.id), None).base(),
            styles: styles(gender, &c.id, &c.styles),
        })
        .collect::<Vec<_>>();
    Ok(cached_json(&categories))
}

/// Empty list for an unknown gender or category.
#[get("/api/site/taxonomy/{gender}/{category}/styles")]
pub async fn category_styles(
    storefront: Data<Arc<Storefront>>,
    path: Path<(String, String)>,
) -> Response {
    let (gender, category) = path.into_inner();
    let taxonomy = &storefront.catalog.taxonomy;
    let list = Gender::from_slug(&gender)
        .and_then(|g| {
            taxonomy
                .category(g, &category)
                .map(|c| styles(g, &c.id, &c.styles))
        })
        .unwrap_or_default();
    Ok(cached_json(&list))
}

/// Canonical filter segment for `?color=black&fabric=cotton`. With `gender`
/// (and optionally `category`, `style`) the full catalog path is returned too.
#[get("/api/site/filters/segment")]
pub async fn filter_segment(storefront: Data<Arc<Storefront>>, req: HttpRequest) -> Response {
    let query = req.query_string();
    let requested = filter_codec::filters_from_query(query);
    let mut filters = Vec::with_capacity(requested.len());
    for f in requested {
        let value = storefront
            .canonical_value(f.attribute, &f.value)
            .ok_or_else(|| ControllerError::InvalidInput {
                field: f.attribute.to_string(),
                msg: format!("Unknown value {}", f.value),
            })?;
        filters.push(ActiveFilter::new(f.attribute, value));
    }
    let filters = storefront.normalize_filters(filters);
    let segment = filter_codec::encode(&filters);

    let param = |name: &str| {
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };
    let path = param("gender").and_then(|gender| {
        let category = param("category");
        let style = param("style");
        let resolved = storefront
            .catalog
            .taxonomy
            .validate(&gender, category.as_deref(), style.as_deref());
        let gender = resolved.gender?;
        Some(
            Route::new(
                gender.as_str(),
                resolved.category.map(|c| c.id.as_str()),
                resolved.style,
            )
            .filtered(&segment),
        )
    });
    Ok(cached_json(&SegmentDto {
        segment,
        filters,
        path,
    }))
}
