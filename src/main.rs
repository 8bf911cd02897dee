use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use log::info;
use valut_exchange::{
    api, config::Config, scheduler::start_refresh_scheduler, service::ExchangeService,
    source::build_source, store::PgRateStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = PgRateStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Can't connect to the database")?;
    store.migrate().await.context("Can't run migrations")?;

    let source = build_source(&config.source, config.source_timeout)?;
    let service = Arc::new(ExchangeService::new(Arc::new(store), source));

    if service
        .initialize()
        .await
        .context("Can't seed the currency table")?
    {
        info!("Currency table seeded");
    }

    if let Some(period) = config.refresh_interval {
        start_refresh_scheduler(service.clone(), period);
    }

    let data = web::Data::from(service);

    info!("Listening on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(api::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
