pub mod config;
pub mod errors;
mod handlers;
pub mod metrics_defs;
mod service;

pub use errors::ApiError;
pub use service::DemoApiService;

use shared::admin_service::AdminService;
use shared::http::{run_http_service, serve_http};
use statusgen::{RandomSource, SeededSource, StatusCodeGenerator, ThreadRngSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

pub async fn run(config: config::Config) -> Result<(), ApiError> {
    let distribution = config.validate()?;
    let source = random_source(config.seed);
    let service = DemoApiService::new(
        StatusCodeGenerator::new(distribution, source.clone()),
        source,
    );

    let ready = Arc::new(AtomicBool::new(false));
    let admin_ready = ready.clone();
    let admin_service = AdminService::<_, ApiError>::new(move || admin_ready.load(Ordering::Relaxed));
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    let listener =
        TcpListener::bind(format!("{}:{}", config.listener.host, config.listener.port)).await?;
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        admin_port = config.admin_listener.port,
        seeded = config.seed.is_some(),
        "Demo API listening"
    );
    ready.store(true, Ordering::Relaxed);

    tokio::try_join!(serve_http(listener, service), admin_task)?;
    Ok(())
}

/// Seeded sources are shared and reproducible; otherwise every worker thread
/// draws from its own stream.
pub fn random_source(seed: Option<u64>) -> Arc<dyn RandomSource> {
    match seed {
        Some(seed) => Arc::new(SeededSource::new(seed)),
        None => Arc::new(ThreadRngSource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ValidationError;
    use http_body_util::{BodyExt, Empty, Full};
    use hyper::body::Bytes;
    use hyper::{Method, Request, StatusCode};
    use hyper_util::client::legacy::Client;
    use hyper_util::rt::TokioExecutor;
    use statusgen::Distribution;

    async fn start_test_server(seed: u64) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();

        let source = random_source(Some(seed));
        let service = DemoApiService::new(
            StatusCodeGenerator::new(Distribution::default(), source.clone()),
            source,
        );
        tokio::spawn(serve_http(listener, service));

        port
    }

    #[tokio::test]
    async fn test_endpoints_over_http() {
        let port = start_test_server(99).await;
        let valid = [200, 201, 204, 400, 404, 409, 500, 503];

        let client = Client::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();

        let requests = [
            (Method::GET, "/api/data", ""),
            (Method::POST, "/api/submit", r#"{"test": "data"}"#),
            (Method::PUT, "/api/update", ""),
        ];

        for (method, path, body) in requests {
            let request = Request::builder()
                .method(method)
                .uri(format!("http://127.0.0.1:{port}{path}"))
                .header("content-type", "application/json")
                .body(Full::new(Bytes::from(body)))
                .unwrap();

            let response = client.request(request).await.unwrap();
            let status = response.status().as_u16();
            assert!(valid.contains(&status), "{path} returned {status}");
        }

        // Static endpoint is unaffected by the generator
        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("http://127.0.0.1:{port}/api/status"))
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = client.request(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_over_http() {
        let port = start_test_server(5).await;

        let client = Client::builder(TokioExecutor::new()).build_http::<Empty<Bytes>>();
        let uri = format!("http://127.0.0.1:{port}/nope").parse().unwrap();
        let response = client.get(uri).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"Not Found");
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_config() {
        let config = config::Config {
            listener: config::Listener {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            admin_listener: config::Listener {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            seed: None,
            distribution: None,
        };

        assert!(matches!(
            run(config).await.unwrap_err(),
            ApiError::InvalidConfig(ValidationError::InvalidPort)
        ));
    }
}
