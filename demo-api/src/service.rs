use crate::errors::ApiError;
use crate::handlers::{self, ApiBody, ApiState, Endpoint};
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT, RESPONSES_GENERATED};
use hyper::body::{Body, Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::http::make_boxed_error_response;
use shared::{counter, gauge, histogram};
use statusgen::{RandomSource, StatusCodeGenerator};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Hyper service for the demo endpoints.
#[derive(Clone)]
pub struct DemoApiService {
    state: ApiState,
}

impl DemoApiService {
    pub fn new(generator: StatusCodeGenerator, source: Arc<dyn RandomSource>) -> Self {
        Self {
            state: ApiState { generator, source },
        }
    }

    /// Handles one request. Handler failures are logged and turned into a
    /// 500 so the connection stays usable.
    pub async fn serve<B>(&self, req: Request<B>) -> Response<ApiBody>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let endpoint = Endpoint::resolve(req.method(), req.uri().path());
        let endpoint_name = endpoint.map_or("unknown", |e| e.name());

        let span = tracing::info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            endpoint = endpoint_name,
            status = tracing::field::Empty,
            tags_added = tracing::field::Empty,
        );

        let start = Instant::now();
        let inflight = gauge!(REQUESTS_INFLIGHT);
        inflight.increment(1.0);

        let response = match handlers::handle(&self.state, endpoint, req)
            .instrument(span.clone())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                span.in_scope(|| tracing::error!(error = %e, "Request failed"));
                make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        inflight.decrement(1.0);
        span.record("status", response.status().as_u16());

        counter!(
            RESPONSES_GENERATED,
            "endpoint" => endpoint_name,
            "status_class" => status_class(response.status()),
        )
        .increment(1);
        histogram!(REQUEST_DURATION, "endpoint" => endpoint_name)
            .record(start.elapsed().as_secs_f64());

        response
    }
}

impl Service<Request<Incoming>> for DemoApiService {
    type Response = Response<ApiBody>;
    type Error = ApiError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.serve(req).await) })
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        5 => "5xx",
        _ => "other",
    }
}
