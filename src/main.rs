use actix_web::middleware::{DefaultHeaders, NormalizePath, TrailingSlash};
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use std::env;
use std::sync::Arc;
use storefront::control::{self, site_api};
use storefront::site::SiteConfig;
use storefront::storefront::Storefront;

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_default_env()
        .init();

    match std::fs::File::open(".env") {
        Ok(_) => envmnt::load_file(".env")?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::info!(".env not found, using process environment");
        }
        Err(err) => {
            return Err(anyhow::anyhow!("Unable to open .env file: {err}"));
        }
    }

    let site = SiteConfig::from_env();
    log::info!("Serving {} at {}", site.site_name, site.base_url);
    let storefront = Arc::new(Storefront::load(site).context("Unable to load catalog")?);

    let addr = envmnt::get_or("SELF_ADDR", "0.0.0.0");
    let port = envmnt::get_u16("PORT", 8080);
    HttpServer::new(move || {
        App::new()
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Methods", "GET, OPTIONS"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .wrap(actix_web::middleware::Compress::default())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .app_data(Data::new(storefront.clone()))
            .service(site_api::catalog_page)
            .service(site_api::category_styles)
            .service(site_api::categories)
            .service(site_api::filter_segment)
            .default_service(actix_web::web::to(control::not_found))
    })
    .bind((addr.as_str(), port))
    .with_context(|| format!("Failed to bind server to {addr}:{port}. Is the port already in use?"))?
    .run()
    .await?;
    Ok(())
}
