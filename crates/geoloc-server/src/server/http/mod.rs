//! HTTP binding of the geocoding flows.
//!
//! The router is built by walking [`ROUTES`]: each row's method and path are
//! mounted under the configured API root, and its [`FlowId`] picks the
//! handler. The OpenAPI document describing the same table is served next to
//! the API root.

mod api_doc;
mod handlers;
mod response;

use crate::server::config::ServerConfig;
use response::FlowResponse;
use axum::{
    Json, Router,
    routing::{MethodFilter, MethodRouter, get, on},
};
use geoloc_core::{FlowId, FlowRequest, Flows, Method, ROUTES, Route};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    flows: Arc<Flows>,
}

impl AppState {
    pub fn new(flows: Flows) -> Self {
        Self {
            flows: Arc::new(flows),
        }
    }

    async fn dispatch(&self, request: FlowRequest) -> FlowResponse {
        let flow = request.flow();
        tracing::debug!(%flow, "dispatching");
        FlowResponse(self.flows.dispatch(request).await)
    }
}

/// Builds the full application router.
pub fn router(flows: Flows, config: &ServerConfig) -> Router {
    let api = ROUTES
        .iter()
        .fold(Router::new(), |api, route| {
            api.route(route.path, method_router(route))
        })
        .with_state(AppState::new(flows));

    let doc = api_doc::openapi(config);
    let app = Router::new()
        .nest(&config.api_root(), api)
        .route(
            &config.api_doc_path(),
            get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        )
        .layer(TraceLayer::new_for_http());

    if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

fn method_router(route: &Route) -> MethodRouter<AppState> {
    let filter = match route.method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
    };
    match route.flow {
        FlowId::Ping => on(filter, handlers::ping),
        FlowId::Lookup => on(filter, handlers::lookup),
        FlowId::StoredQuery => on(filter, handlers::stored_query),
        FlowId::CacheSnapshot => on(filter, handlers::cache_snapshot),
        FlowId::BulkPersist => on(filter, handlers::bulk_persist),
        FlowId::BulkCacheWrite => on(filter, handlers::bulk_cache_write),
    }
}

#[cfg(test)]
mod tests {
    use super::{response::INVALID_JSON_BODY, *};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use geoloc_core::{
        TimeRandomIds,
        test_support::{RecordingCache, RecordingStore, StubProvider},
    };
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    fn config() -> ServerConfig {
        ServerConfig {
            server_addr: "127.0.0.1:0".to_string(),
            context_path: "/Location".to_string(),
            geocoder_url: "http://localhost".to_string(),
            geocoder_api_key: None,
            geocoder_timeout: Duration::from_secs(1),
            api_title: "Location Services".to_string(),
            api_description: "Geocoding".to_string(),
            cors: false,
        }
    }

    struct Harness {
        app: Router,
        provider: Arc<StubProvider>,
        store: Arc<RecordingStore>,
        cache: Arc<RecordingCache>,
    }

    impl Harness {
        fn with_provider(provider: StubProvider) -> Self {
            let provider = Arc::new(provider);
            let store = Arc::new(RecordingStore::new());
            let cache = Arc::new(RecordingCache::new());
            let flows = Flows::new(
                provider.clone(),
                store.clone(),
                cache.clone(),
                Arc::new(TimeRandomIds),
            );
            Self {
                app: router(flows, &config()),
                provider,
                store,
                cache,
            }
        }

        fn new() -> Self {
            Self::with_provider(StubProvider::answering("Atlanta, GA"))
        }

        async fn call(&self, request: Request<Body>) -> (StatusCode, String) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        }

        async fn get(&self, path: &str) -> (StatusCode, String) {
            self.call(Request::get(path).body(Body::empty()).unwrap())
                .await
        }

        async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
            self.call(
                Request::post(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }
    }

    fn json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn ping_answers_fixed_coordinate() {
        let harness = Harness::new();
        let (status, body) = harness.get("/Location/api/ping").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json(&body),
            json!({"latitude": "33.969601", "longitude": "-84.100033", "address": "Atlanta, GA"})
        );
    }

    #[tokio::test]
    async fn lookup_resolves_path_coordinate() {
        let harness = Harness::new();
        let (status, body) = harness
            .get("/Location/api/location/latitude/33.969601/longitude/-84.100033")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["address"], "Atlanta, GA");
        assert_eq!(harness.provider.calls(), vec![(33.969601, -84.100033)]);
    }

    #[tokio::test]
    async fn lookup_with_invalid_coordinate_is_rejected() {
        let harness = Harness::new();
        let (status, body) = harness
            .get("/Location/api/location/latitude/200/longitude/50")
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json(&body),
            json!({"status": "ERROR", "msg": "Invalid latitude or longitude"})
        );
        assert!(harness.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_a_bad_gateway() {
        let harness = Harness::with_provider(StubProvider::unreachable());
        let (status, body) = harness.get("/Location/api/ping").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body = json(&body);
        assert_eq!(body["status"], "ERROR");
        assert_eq!(
            body["msg"],
            "geocoding provider error: provider unreachable"
        );
    }

    #[tokio::test]
    async fn stored_query_returns_batch() {
        let harness = Harness::new();
        let (status, _) = harness
            .post(
                "/Location/api/savetoMongoDB",
                r#"{"list": [{"latitude": "10", "longitude": "20", "address": "X"}]}"#,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = harness
            .get("/Location/api/mongoLocation/latitude/10/longitude/20")
            .await;

        assert_eq!(status, StatusCode::OK);
        let list = json(&body)["list"].as_array().unwrap().clone();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["address"], "X");
        assert!(list[0]["geocodingId"].is_string());
        assert_eq!(harness.store.queries().len(), 1);
    }

    #[tokio::test]
    async fn stored_query_with_invalid_coordinate_skips_store() {
        let harness = Harness::new();
        let (status, _) = harness
            .get("/Location/api/mongoLocation/latitude/north/longitude/20")
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(harness.store.queries().is_empty());
    }

    #[tokio::test]
    async fn empty_cache_lists_empty_batch() {
        let harness = Harness::new();
        let (status, body) = harness.get("/Location/api/listAllFromCache").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), json!({"list": []}));
    }

    #[tokio::test]
    async fn save_to_mongo_echoes_records_with_ids() {
        let harness = Harness::new();
        let (status, body) = harness
            .post(
                "/Location/api/savetoMongoDB",
                r#"{"list": [
                    {"latitude": "1", "longitude": "1"},
                    {"latitude": "2", "longitude": "2"},
                    {"latitude": "3", "longitude": "3"}
                ]}"#,
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["msg"], "Message successfully saved to mongodb!");
        let list = body["request"]["list"].as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|r| r["geocodingId"].is_string()));
        assert_eq!(harness.store.inserts().len(), 1);
    }

    #[tokio::test]
    async fn save_to_cache_puts_each_record() {
        let harness = Harness::new();
        let (status, body) = harness
            .post(
                "/Location/api/savetoCache",
                r#"{"list": [{"latitude": "1", "longitude": "1"}, {"latitude": "2", "longitude": "2"}]}"#,
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["msg"], "Message successfully saved to cache!");
        assert_eq!(harness.cache.puts().len(), 2);

        let (_, body) = harness.get("/Location/api/listAllFromCache").await;
        assert_eq!(json(&body)["list"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_batch_is_rejected_without_writes() {
        let harness = Harness::new();
        let (status, body) = harness
            .post(
                "/Location/api/savetoCache",
                r#"{"list": [{"latitude": "1", "longitude": "1"}, {"latitude": "95", "longitude": "2"}]}"#,
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["status"], "ERROR");
        assert_eq!(harness.cache.attempts(), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_plain_text_400() {
        let harness = Harness::new();
        let response = harness
            .app
            .clone()
            .oneshot(
                Request::post("/Location/api/savetoMongoDB")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"list\": [oops"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], INVALID_JSON_BODY.as_bytes());
        assert!(harness.store.inserts().is_empty());
    }

    #[tokio::test]
    async fn api_doc_lists_every_route() {
        let harness = Harness::new();
        let (status, body) = harness.get("/Location/api-doc").await;

        assert_eq!(status, StatusCode::OK);
        let doc = json(&body);
        assert_eq!(doc["info"]["title"], "Location Services");
        for route in &ROUTES {
            assert!(doc["paths"][route.path].is_object(), "{} missing", route.path);
        }
        assert_eq!(doc["paths"].as_object().unwrap().len(), ROUTES.len());
    }

    #[tokio::test]
    async fn save_accepts_numeric_coordinates() {
        let harness = Harness::new();
        let (status, body) = harness
            .post(
                "/Location/api/savetoMongoDB",
                r#"{"list": [{"latitude": 33.9, "longitude": -84.1}]}"#,
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        let record = &json(&body)["request"]["list"][0];
        assert_eq!(record["latitude"], "33.9");
        assert_eq!(record["longitude"], "-84.1");
        assert_eq!(harness.store.inserts()[0][0].latitude, "33.9");
    }

    #[tokio::test]
    async fn routes_live_under_the_context_path_only() {
        let harness = Harness::new();
        let (status, _) = harness.get("/api/ping").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = harness.post("/Location/api/ping", "{}").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
