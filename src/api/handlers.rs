use actix_web::{http::header, web, HttpResponse};
use uuid::Uuid;

use crate::domain::order::{OrderAggregate, OrderService};
use super::auth::Authenticated;
use super::errors::ApiError;
use super::views::OrderView;

type Service = web::Data<OrderService>;

fn parse_order_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::MalformedOrderId(raw.to_string()))
}

fn order_ok(order: &OrderAggregate) -> HttpResponse {
    HttpResponse::Ok().json(OrderView::from(order))
}

/// GET /order/{id}
pub async fn get_order(
    _auth: Authenticated,
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = service.get_order(order_id).await?;
    Ok(order_ok(&order))
}

/// POST /order
pub async fn create_order(
    _auth: Authenticated,
    service: Service,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let order = service.create_order(&body).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/order/{}", order.id)))
        .json(OrderView::from(&order)))
}

/// PUT|PATCH /order/{id}
pub async fn update_order(
    _auth: Authenticated,
    service: Service,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = service.update_order(order_id, &body).await?;
    Ok(order_ok(&order))
}

/// DELETE /order/{id}
pub async fn cancel_order(
    _auth: Authenticated,
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = service.cancel_order(order_id).await?;
    Ok(order_ok(&order))
}

/// PUT|PATCH /payment/{id}
pub async fn pay_order(
    _auth: Authenticated,
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = service.pay_order(order_id).await?;
    Ok(order_ok(&order))
}

/// DELETE /receipt/{id}
pub async fn complete_order(
    _auth: Authenticated,
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = service.complete_order(order_id).await?;
    Ok(order_ok(&order))
}
