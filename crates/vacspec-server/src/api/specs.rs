use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use futures::future::join_all;
use serde::{de::DeserializeOwned, Deserialize};
use vacspec_core::SpecRequest;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// Items stay raw so one malformed product cannot drop the rest.
#[derive(Debug, Default, Deserialize)]
pub(super) struct BatchRequest {
    #[serde(default)]
    products: Vec<serde_json::Value>,
}

/// `POST /api/v1/specs`. Always answers 200; a body that is not a valid
/// request is treated as an empty identity.
pub(super) async fn resolve_specs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> impl IntoResponse {
    let request: SpecRequest = parse_or_default(&body);
    let data = state.specs.resolve_specs(&request).await;

    (
        StatusCode::OK,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

/// `POST /api/v1/specs/batch`. Results come back in input order.
pub(super) async fn resolve_specs_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let batch: BatchRequest = parse_or_default(&body);
    if batch.products.len() > state.batch_limit {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!(
                "batch holds {} products; the limit is {}",
                batch.products.len(),
                state.batch_limit
            ),
        ));
    }

    tracing::debug!(products = batch.products.len(), "resolving spec batch");
    let requests: Vec<SpecRequest> = batch
        .products
        .into_iter()
        .enumerate()
        .map(|(index, item)| request_or_default(index, item))
        .collect();
    let data = join_all(
        requests
            .iter()
            .map(|request| state.specs.resolve_specs(request)),
    )
    .await;

    Ok((
        StatusCode::OK,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

fn parse_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "malformed request body; using empty request");
            T::default()
        }
    }
}

fn request_or_default(index: usize, item: serde_json::Value) -> SpecRequest {
    serde_json::from_value(item).unwrap_or_else(|e| {
        tracing::debug!(index, error = %e, "malformed batch item; using empty request");
        SpecRequest::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_default_accepts_camel_case_hint_urls() {
        let request: SpecRequest = parse_or_default(
            br#"{"brand":"Roborock","model":"S8","hintUrls":["https://www.currys.co.uk/p/1"]}"#,
        );
        assert_eq!(request.identity.brand.as_deref(), Some("Roborock"));
        assert_eq!(request.hint_urls, vec!["https://www.currys.co.uk/p/1"]);
    }

    #[test]
    fn parse_or_default_falls_back_for_garbage_and_empty_bodies() {
        assert_eq!(parse_or_default::<SpecRequest>(b"{not json"), SpecRequest::default());
        assert_eq!(parse_or_default::<SpecRequest>(b""), SpecRequest::default());
        assert_eq!(parse_or_default::<SpecRequest>(b"null"), SpecRequest::default());
        assert!(parse_or_default::<BatchRequest>(b"[1,2]").products.is_empty());
    }

    #[test]
    fn parse_or_default_keeps_brand_when_ean_is_numeric() {
        let request: SpecRequest =
            parse_or_default(br#"{"brand":"Roborock","model":"S8","ean":6970995781502}"#);
        assert_eq!(request.identity.brand.as_deref(), Some("Roborock"));
        assert_eq!(request.identity.ean.as_deref(), Some("6970995781502"));
    }

    #[test]
    fn batch_items_are_parsed_independently() {
        let batch: BatchRequest = parse_or_default(
            br#"{"products":[{"name":"Roborock S8"},"not an object",{"name":"Eufy X10","hintUrls":null}]}"#,
        );
        let requests: Vec<SpecRequest> = batch
            .products
            .into_iter()
            .enumerate()
            .map(|(i, item)| request_or_default(i, item))
            .collect();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].identity.name.as_deref(), Some("Roborock S8"));
        assert_eq!(requests[1], SpecRequest::default());
        assert_eq!(requests[2].identity.name.as_deref(), Some("Eufy X10"));
        assert!(requests[2].hint_urls.is_empty());
    }
}
