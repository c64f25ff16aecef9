use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::info;

use api_ingress::AppError;

use crate::api::rest::dto::{CustomerDto, CustomerReq, MessageDto};
use crate::api::rest::error::{
    map_domain_error, CHECK_FAILED, CREATE_FAILED, DELETE_FAILED, GET_FAILED, LIST_FAILED,
    UPDATE_FAILED,
};
use crate::domain::service::Service;

/// Create a customer
pub async fn create_customer(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CustomerReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerDto>), AppError> {
    let Json(req) = payload?;
    info!("Creating customer: {:?}", req);

    let customer = svc
        .create_customer(req.into())
        .await
        .map_err(|e| map_domain_error(e, CREATE_FAILED))?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// List every customer
pub async fn list_customers(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<CustomerDto>>, AppError> {
    info!("Listing customers");

    let customers = svc
        .list_customers()
        .await
        .map_err(|e| map_domain_error(e, LIST_FAILED))?;
    Ok(Json(customers.into_iter().map(CustomerDto::from).collect()))
}

/// Get a customer by id
pub async fn get_customer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerDto>, AppError> {
    info!("Getting customer with id: {}", id);

    let customer = svc
        .get_customer(&id)
        .await
        .map_err(|e| map_domain_error(e, GET_FAILED))?;
    Ok(Json(customer.into()))
}

/// Replace a customer. A missing customer is reported before a bad body.
pub async fn update_customer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerReq>, JsonRejection>,
) -> Result<Json<CustomerDto>, AppError> {
    info!("Updating customer {}", id);

    svc.ensure_exists(&id)
        .await
        .map_err(|e| map_domain_error(e, CHECK_FAILED))?;

    let Json(req) = payload?;
    let customer = svc
        .update_customer(&id, req.into())
        .await
        .map_err(|e| map_domain_error(e, UPDATE_FAILED))?;
    Ok(Json(customer.into()))
}

/// Delete a customer by id
pub async fn delete_customer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<MessageDto>, AppError> {
    info!("Deleting customer: {}", id);

    svc.ensure_exists(&id)
        .await
        .map_err(|e| map_domain_error(e, CHECK_FAILED))?;
    svc.delete_customer(&id)
        .await
        .map_err(|e| map_domain_error(e, DELETE_FAILED))?;

    Ok(Json(MessageDto {
        message: "Customer deleted successfully".to_owned(),
    }))
}
