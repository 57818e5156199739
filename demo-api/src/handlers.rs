use crate::errors::ApiError;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::http::make_boxed_error_response;
use statusgen::{RandomSource, StatusCodeGenerator};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub type ApiBody = BoxBody<Bytes, ApiError>;

const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris.";

const INVALID_SUBMIT_MESSAGE: &str = "Request body must be a JSON object";
const INVALID_TAGS_MESSAGE: &str = "Payload must be a non-empty JSON object with key-value pairs";

/// The demo endpoints, keyed by method and path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    GetData,
    Submit,
    Update,
    Status,
    PayloadToSpanTags,
}

impl Endpoint {
    pub fn resolve(method: &Method, path: &str) -> Option<Self> {
        match (method, path) {
            (&Method::GET, "/api/data") => Some(Endpoint::GetData),
            (&Method::POST, "/api/submit") => Some(Endpoint::Submit),
            (&Method::PUT, "/api/update") => Some(Endpoint::Update),
            (&Method::PUT, "/api/status") => Some(Endpoint::Status),
            (&Method::GET, "/payload-to-spantags") => Some(Endpoint::PayloadToSpanTags),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Endpoint::GetData => "get_data",
            Endpoint::Submit => "submit",
            Endpoint::Update => "update",
            Endpoint::Status => "status",
            Endpoint::PayloadToSpanTags => "payload_to_span_tags",
        }
    }
}

/// Shared by every request. The generator and the endpoint payloads draw
/// from the same random source.
#[derive(Clone)]
pub struct ApiState {
    pub generator: StatusCodeGenerator,
    pub source: Arc<dyn RandomSource>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataResponse {
    random_number: u32,
    lorem_ipsum: &'static str,
    status_code: u16,
    timestamp: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse<'a> {
    status: &'static str,
    message: &'static str,
    received_payload: &'a Value,
    status_code: u16,
    timestamp: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    http_status: u16,
    message: &'static str,
    timestamp: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TagsResponse<'a> {
    status: &'static str,
    tags_added: usize,
    tags: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: &'static str,
}

pub async fn handle<B>(
    state: &ApiState,
    endpoint: Option<Endpoint>,
    req: Request<B>,
) -> Result<Response<ApiBody>, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    match endpoint {
        Some(Endpoint::GetData) => get_data(state),
        Some(Endpoint::Submit) => submit(state, &read_body(req).await?),
        Some(Endpoint::Update) => update(state),
        Some(Endpoint::Status) => put_status(),
        Some(Endpoint::PayloadToSpanTags) => payload_to_span_tags(&read_body(req).await?),
        None => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "No route matched"
            );
            Ok(make_boxed_error_response(StatusCode::NOT_FOUND))
        }
    }
}

/// Dummy data with a five digit random number.
fn get_data(state: &ApiState) -> Result<Response<ApiBody>, ApiError> {
    let status = state.generator.generate();
    let random_number = 10_000 + state.source.below(90_000);

    tracing::info!(
        target: "demo_api::get_data",
        status = status.as_u16(),
        random_number,
        "GET /api/data"
    );

    json_response(
        status,
        &DataResponse {
            random_number,
            lorem_ipsum: LOREM_IPSUM,
            status_code: status.as_u16(),
            timestamp: now_millis(),
        },
    )
}

/// Echoes a JSON object payload back.
fn submit(state: &ApiState, body: &[u8]) -> Result<Response<ApiBody>, ApiError> {
    let payload = match serde_json::from_slice::<Map<String, Value>>(body) {
        Ok(payload) => Value::Object(payload),
        Err(e) => {
            tracing::info!(target: "demo_api::submit", error = %e, "POST /api/submit rejected");
            return json_response(
                StatusCode::BAD_REQUEST,
                &ErrorResponse {
                    status: "error",
                    message: INVALID_SUBMIT_MESSAGE,
                },
            );
        }
    };

    let status = state.generator.generate();

    tracing::info!(
        target: "demo_api::submit",
        status = status.as_u16(),
        %payload,
        "POST /api/submit"
    );

    json_response(
        status,
        &SubmitResponse {
            status: "received",
            message: "Data submitted successfully",
            received_payload: &payload,
            status_code: status.as_u16(),
            timestamp: now_millis(),
        },
    )
}

/// Status line only, no body.
fn update(state: &ApiState) -> Result<Response<ApiBody>, ApiError> {
    let status = state.generator.generate();

    tracing::info!(target: "demo_api::update", status = status.as_u16(), "PUT /api/update");

    empty_response(status)
}

fn put_status() -> Result<Response<ApiBody>, ApiError> {
    let timestamp = now_millis();

    tracing::info!(target: "demo_api::status", timestamp, "PUT /api/status");

    json_response(
        StatusCode::OK,
        &StatusResponse {
            http_status: StatusCode::OK.as_u16(),
            message: "PUT request processed successfully",
            timestamp,
        },
    )
}

/// Records every key/value pair of the payload against the current request
/// span. Numbers and booleans are taken in their JSON text form.
fn payload_to_span_tags(body: &[u8]) -> Result<Response<ApiBody>, ApiError> {
    let tags = parse_tags(body).unwrap_or_default();

    if tags.is_empty() {
        return json_response(
            StatusCode::BAD_REQUEST,
            &ErrorResponse {
                status: "error",
                message: INVALID_TAGS_MESSAGE,
            },
        );
    }

    for (key, value) in &tags {
        tracing::info!(tag.key = %key, tag.value = %value, "span tag");
    }
    tracing::Span::current().record("tags_added", tags.len() as u64);

    json_response(
        StatusCode::OK,
        &TagsResponse {
            status: "success",
            tags_added: tags.len(),
            tags: &tags,
        },
    )
}

/// `None` unless the body is a JSON object whose values are all scalars.
fn parse_tags(body: &[u8]) -> Option<BTreeMap<String, String>> {
    let payload = serde_json::from_slice::<Map<String, Value>>(body).ok()?;

    payload
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .collect()
}

async fn read_body<B>(req: Request<B>) -> Result<Bytes, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    req.into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| ApiError::RequestBodyError(e.to_string()))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<ApiBody>, ApiError> {
    if !body_allowed(status) {
        return empty_response(status);
    }

    let bytes = serde_json::to_vec(value).map(Bytes::from)?;
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(bytes).map_err(|e| match e {}).boxed())?;

    Ok(response)
}

fn empty_response(status: StatusCode) -> Result<Response<ApiBody>, ApiError> {
    let response = Response::builder()
        .status(status)
        .body(Empty::new().map_err(|e| match e {}).boxed())?;

    Ok(response)
}

/// 1xx, 204 and 304 responses must not carry a body.
fn body_allowed(status: StatusCode) -> bool {
    !(status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
