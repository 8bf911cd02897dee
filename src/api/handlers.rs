use actix_web::{web, HttpResponse};

use super::dto::{ConvertRequest, ConvertResponse, CurrencyResponse, LastUpdatedResponse};
use crate::currency::CurrencyCode;
use crate::error::ExchangeError;
use crate::service::ExchangeService;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn update_rates(
    service: web::Data<ExchangeService>,
) -> Result<HttpResponse, ExchangeError> {
    service.refresh().await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn last_updated(
    service: web::Data<ExchangeService>,
) -> Result<web::Json<LastUpdatedResponse>, ExchangeError> {
    let record = service.last_updated().await?;
    Ok(web::Json(record.into()))
}

pub async fn convert(
    service: web::Data<ExchangeService>,
    body: web::Json<ConvertRequest>,
) -> Result<web::Json<ConvertResponse>, ExchangeError> {
    let (original, target, amount) = body.validate()?;
    let conversion = service.convert(&original, &target, amount).await?;
    Ok(web::Json(conversion.into()))
}

pub async fn list_currencies(
    service: web::Data<ExchangeService>,
) -> Result<web::Json<Vec<CurrencyResponse>>, ExchangeError> {
    let currencies = service.list_currencies().await?;
    Ok(web::Json(currencies.into_iter().map(Into::into).collect()))
}

pub async fn get_currency(
    service: web::Data<ExchangeService>,
    path: web::Path<String>,
) -> Result<web::Json<CurrencyResponse>, ExchangeError> {
    let code: CurrencyCode = path.parse()?;
    let currency = service.currency(&code).await?;
    Ok(web::Json(currency.into()))
}
