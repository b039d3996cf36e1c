mod handlers;

use std::net::SocketAddr;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::DynAPI;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{auth, bids, drivers, rides, subscriptions, users};

pub const BANNER: &str = "LehGo Backend API v1";

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/", get(|| async { BANNER }))
        .route("/health", get(|| async { "ok" }))
        .route("/users", post(users::create))
        .route("/rides", post(rides::create))
        .route("/bids", post(bids::create))
        .route("/drivers/nearby", get(drivers::nearby))
        .route("/auth/send-otp", post(auth::send_otp))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/subscribe", get(subscriptions::subscribe))
        .layer(Extension(api))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(api: DynAPI, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "server stopped");
            unexpected_error()
        })
}

#[cfg(test)]
mod tests {
    use super::handlers::{auth, drivers};
    use super::router;
    use std::sync::Arc;

    use async_channel::Receiver;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::{Extension, Json, Query};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::IntoResponse;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::{
        AuthAPI, BidAPI, DriverSearchAPI, DynAPI, RideAPI, SubscriptionAPI, UserAPI, API,
    };
    use crate::auth::{CredentialStore, MemoryCredentialStore};
    use crate::bus::{Broker, Message};
    use crate::entities::{Bid, Coordinates, DriverMatch, NewBid, NewRide, NewUser, Ride, User};
    use crate::error::{invalid_input_error, unexpected_error, Error};
    use crate::matching::{rank_drivers, tests::driver_north_of, tests::ORIGIN};

    /// Real credential store and broker, canned persistence.
    struct StubAPI {
        credentials: MemoryCredentialStore,
        broker: Broker,
    }

    impl StubAPI {
        fn new() -> DynAPI {
            Arc::new(Self {
                credentials: MemoryCredentialStore::new(None),
                broker: Broker::new(4),
            })
        }
    }

    #[async_trait]
    impl UserAPI for StubAPI {
        async fn create_user(&self, _params: NewUser) -> Result<User, Error> {
            Err(unexpected_error())
        }
    }

    #[async_trait]
    impl RideAPI for StubAPI {
        async fn create_ride(&self, _params: NewRide) -> Result<Ride, Error> {
            Err(unexpected_error())
        }
    }

    #[async_trait]
    impl BidAPI for StubAPI {
        async fn create_bid(&self, _params: NewBid) -> Result<Bid, Error> {
            Err(unexpected_error())
        }
    }

    #[async_trait]
    impl DriverSearchAPI for StubAPI {
        async fn find_nearby_drivers(
            &self,
            origin: Coordinates,
            radius_km: f64,
        ) -> Result<Vec<DriverMatch>, Error> {
            if !origin.is_valid() {
                return Err(invalid_input_error());
            }

            let candidates = vec![
                driver_north_of(ORIGIN, 3, 7.0),
                driver_north_of(ORIGIN, 2, 4.9),
                driver_north_of(ORIGIN, 1, 1.2),
            ];
            Ok(rank_drivers(candidates, origin, radius_km))
        }
    }

    #[async_trait]
    impl AuthAPI for StubAPI {
        async fn send_otp(&self, phone: &str) -> Result<String, Error> {
            Ok(self.credentials.issue(phone).await)
        }

        async fn verify_otp(&self, phone: &str, code: &str) -> Result<(), Error> {
            self.credentials.validate(phone, code).await
        }
    }

    #[async_trait]
    impl SubscriptionAPI for StubAPI {
        async fn subscribe(&self, topic: &str) -> Result<Receiver<Message>, Error> {
            Ok(self.broker.subscribe(topic).await)
        }

        async fn unsubscribe(&self, topic: &str) -> Result<(), Error> {
            self.broker.prune(topic).await;
            Ok(())
        }
    }

    impl API for StubAPI {}

    fn send_params(phone: &str) -> auth::SendOtpParams {
        serde_json::from_value(json!({ "phone": phone })).unwrap()
    }

    fn verify_params(phone: &str, code: &str) -> auth::VerifyOtpParams {
        serde_json::from_value(json!({ "phone": phone, "code": code })).unwrap()
    }

    #[tokio::test]
    async fn otp_flow_reports_sent_then_verified() {
        let api = StubAPI::new();

        let Json(sent) = auth::send_otp(
            Extension(api.clone()),
            Ok(Json(send_params("+231770000001"))),
        )
        .await
        .unwrap();
        assert_eq!(sent.status, "sent");
        let code = sent.dev_code.unwrap();

        let Json(verified) = auth::verify_otp(
            Extension(api.clone()),
            Ok(Json(verify_params("+231770000001", &code))),
        )
        .await
        .unwrap();
        assert_eq!(verified.status, "verified");
        assert_eq!(
            serde_json::to_value(&verified).unwrap(),
            json!({ "status": "verified" })
        );
    }

    #[tokio::test]
    async fn replayed_code_is_unauthorized() {
        let api = StubAPI::new();
        let code = api.send_otp("+231770000001").await.unwrap();
        api.verify_otp("+231770000001", &code).await.unwrap();

        let err = auth::verify_otp(
            Extension(api),
            Ok(Json(verify_params("+231770000001", &code))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn nearby_uses_the_fixed_radius() {
        let api = StubAPI::new();
        let params: drivers::NearbyParams =
            serde_json::from_value(json!({ "lat": ORIGIN.lat, "long": ORIGIN.long })).unwrap();

        let Json(matches) = drivers::nearby(Extension(api), Ok(Query(params)))
            .await
            .unwrap();

        assert_eq!(matches.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn nearby_rejects_out_of_range_coordinates() {
        let api = StubAPI::new();
        let params: drivers::NearbyParams =
            serde_json::from_value(json!({ "lat": 91.0, "long": 0.0 })).unwrap();

        let err = drivers::nearby(Extension(api), Ok(Query(params)))
            .await
            .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let res = router(StubAPI::new()).oneshot(request).await.unwrap();
        let status = res.status();
        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();

        (status, body.to_vec())
    }

    #[tokio::test]
    async fn health_and_banner_respond() {
        assert_eq!(call(get("/health")).await, (StatusCode::OK, b"ok".to_vec()));

        let (status, body) = call(get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, super::BANNER.as_bytes());
    }

    #[tokio::test]
    async fn nearby_with_both_coordinates_succeeds() {
        let (status, body) = call(get("/drivers/nearby?lat=6.3&long=-10.8")).await;

        assert_eq!(status, StatusCode::OK);
        let matches: Vec<DriverMatch> = serde_json::from_slice(&body).unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn nearby_missing_long_is_bad_request() {
        let (status, body) = call(get("/drivers/nearby?lat=6.3")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], 100);
    }

    #[tokio::test]
    async fn nearby_unparseable_lat_is_bad_request() {
        let (status, _) = call(get("/drivers/nearby?lat=abc&long=1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn truncated_body_is_bad_request() {
        let (status, _) = call(post_json("/auth/send-otp", "{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn body_with_missing_field_is_bad_request() {
        let (status, _) = call(post_json("/auth/verify-otp", r#"{"phone":"+231770000001"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn body_without_content_type_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/send-otp")
            .body(Body::from(r#"{"phone":"+231770000001"}"#))
            .unwrap();

        let (status, _) = call(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_code_is_unauthorized_with_generic_body() {
        let (status, body) = call(post_json(
            "/auth/verify-otp",
            r#"{"phone":"+231770000001","code":"000000"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "code": 101, "error": "invalid code" }));
    }

    #[tokio::test]
    async fn send_otp_reports_the_dev_code() {
        let (status, body) = call(post_json("/auth/send-otp", r#"{"phone":"+231770000001"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "sent");
        assert_eq!(body["dev_code"].as_str().map(str::len), Some(6));
    }
}
