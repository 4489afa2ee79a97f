//! REST API module.
//!
//! Contains the program routes and the response helpers they share.

mod pagination;
mod programs;

pub use pagination::*;
pub use programs::*;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Response,
};

use crate::errors::{AppError, AppErrorWithAlert};
use crate::AppState;

/// JSON body extractor that reports malformed bodies through [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor; `sort` and other keys may repeat.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Response type that can be either success or error.
pub type ApiResult = Result<Response, AppErrorWithAlert>;

/// Attach the application's alert header prefix to an error.
pub fn error(err: AppError, state: &AppState) -> AppErrorWithAlert {
    AppErrorWithAlert::new(err, &state.config.app_name)
}

/// Build the `X-<app>-alert` / `X-<app>-params` pair for an entity write.
pub fn entity_alert(app_name: &str, message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let app = app_name.to_lowercase();

    if let (Ok(name), Ok(value)) = (
        HeaderName::try_from(format!("x-{}-alert", app)),
        HeaderValue::try_from(message),
    ) {
        headers.insert(name, value);
    }
    if let (Ok(name), Ok(value)) = (
        HeaderName::try_from(format!("x-{}-params", app)),
        HeaderValue::try_from(param),
    ) {
        headers.insert(name, value);
    }

    headers
}

pub fn creation_alert(app_name: &str, entity_name: &str, id: &str) -> HeaderMap {
    let message = format!("A new {} is created with identifier {}", entity_name, id);
    entity_alert(app_name, &message, id)
}

pub fn update_alert(app_name: &str, entity_name: &str, id: &str) -> HeaderMap {
    let message = format!("A {} is updated with identifier {}", entity_name, id);
    entity_alert(app_name, &message, id)
}

pub fn deletion_alert(app_name: &str, entity_name: &str, id: &str) -> HeaderMap {
    let message = format!("A {} is deleted with identifier {}", entity_name, id);
    entity_alert(app_name, &message, id)
}
