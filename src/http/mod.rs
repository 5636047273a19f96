//! HTTP host for the registrar, speaking the Lambda runtime-emulator invocation path.
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use http::StatusCode;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::errors::{Error, Result};
use crate::event::{InvocationResponse, RegistrationEvent};
use crate::registrar::Registrar;
use crate::registry::ModelRegistry;

pub const INVOCATIONS_PATH: &str = "/2015-03-31/functions/function/invocations";

pub fn router<R: ModelRegistry>(registrar: Arc<Registrar<R>>) -> Router {
    Router::new()
        .route(INVOCATIONS_PATH, post(invoke::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(registrar)
}

pub async fn serve<R: ModelRegistry>(registrar: Arc<Registrar<R>>, addr: SocketAddr) -> Result<()> {
    tracing::info!(%addr, "listening for invocations");
    axum::Server::bind(&addr)
        .serve(router(registrar).into_make_service())
        .await?;
    Ok(())
}

async fn invoke<R: ModelRegistry>(
    State(registrar): State<Arc<Registrar<R>>>,
    body: Bytes,
) -> std::result::Result<Json<InvocationResponse>, InvocationError> {
    let event = RegistrationEvent::from_slice(&body)?;
    tracing::debug!(?event, "received event");
    Ok(Json(registrar.register(&event).await?))
}

/// A failed invocation, reported the way the Lambda runtime reports function errors.
#[derive(Debug)]
struct InvocationError(Error);

impl From<Error> for InvocationError {
    fn from(e: Error) -> Self {
        InvocationError(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "errorType")]
    error_type: &'static str,
    #[serde(rename = "errorMessage")]
    error_message: String,
}

impl IntoResponse for InvocationError {
    fn into_response(self) -> Response {
        tracing::warn!(error = ?self.0, "invocation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error_type: self.0.kind(),
                error_message: format!("{}", self.0),
            }),
        )
            .into_response()
    }
}
