mod common;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use common::{FakeSpotify, distinct_tracks, seed_session, settings};
use muralcli::{
    config::{RateLimitPolicy, Settings},
    management::{
        ACCESS_TOKEN_KEY, AuthManager, InMemoryRateLimiter, InMemoryStore, STATE_KEY, SessionStore,
    },
    server::{AppState, router},
};
use serde_json::Value;

type State = AppState<InMemoryStore, FakeSpotify, InMemoryRateLimiter>;

fn create_state(settings: Settings, spotify: FakeSpotify, policy: RateLimitPolicy) -> State {
    AppState::new(
        AuthManager::new(settings, InMemoryStore::new(), spotify),
        InMemoryRateLimiter::new(),
        policy,
    )
}

fn create_test_server(state: &State) -> TestServer {
    TestServer::new(router(state.clone())).unwrap()
}

async fn logged_in_server(spotify: FakeSpotify) -> (TestServer, State) {
    let state = create_state(settings(), spotify, RateLimitPolicy::default());
    seed_session(state.auth.store()).await;
    (create_test_server(&state), state)
}

fn forwarded_for(ip: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(ip),
    )
}

#[tokio::test]
async fn test_health() {
    let state = create_state(settings(), FakeSpotify::default(), RateLimitPolicy::default());
    let server = create_test_server(&state);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_start_returns_auth_url() {
    let state = create_state(settings(), FakeSpotify::default(), RateLimitPolicy::default());
    let server = create_test_server(&state);

    let response = server.post("/api/auth/start").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let url = body["authUrl"].as_str().unwrap();
    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(url.contains("code_challenge_method=S256"));
    assert!(state.auth.transaction_pending().await);
}

#[tokio::test]
async fn test_start_without_configuration() {
    let state = create_state(
        Settings::default(),
        FakeSpotify::default(),
        RateLimitPolicy::default(),
    );
    let server = create_test_server(&state);

    let response = server.post("/api/auth/start").await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing configuration");
}

#[tokio::test]
async fn test_callback_redirects_after_login() {
    let state = create_state(settings(), FakeSpotify::default(), RateLimitPolicy::default());
    let server = create_test_server(&state);
    state.auth.start().await.unwrap();
    let oauth_state = state.auth.store().get(STATE_KEY).await.unwrap().unwrap();

    let response = server
        .get(&format!("/callback?code=abc&state={oauth_state}"))
        .await;

    assert_eq!(response.status_code(), 303);
    assert_eq!(response.header("location"), "/?authorized=true");

    let status = server.get("/api/auth/status").await;
    assert_eq!(status.status_code(), 200);
    let body: Value = status.json();
    assert_eq!(body["authenticated"], true);
}

#[tokio::test]
async fn test_callback_with_denied_consent() {
    let state = create_state(settings(), FakeSpotify::default(), RateLimitPolicy::default());
    let server = create_test_server(&state);
    state.auth.start().await.unwrap();

    let response = server.get("/callback?error=access_denied").await;

    assert_eq!(response.status_code(), 303);
    assert_eq!(response.header("location"), "/?error=accessdenied");
    assert_eq!(state.auth.endpoint().exchanges(), 0);
}

#[tokio::test]
async fn test_callback_with_forged_state() {
    let state = create_state(settings(), FakeSpotify::default(), RateLimitPolicy::default());
    let server = create_test_server(&state);
    state.auth.start().await.unwrap();

    let response = server.get("/callback?code=abc&state=forged").await;

    let location = response.header("location");
    assert!(
        location
            .to_str()
            .unwrap()
            .starts_with("/?error=State+mismatch")
    );
    assert_eq!(state.auth.endpoint().exchanges(), 0);
}

#[tokio::test]
async fn test_index_sanitizes_error() {
    let state = create_state(settings(), FakeSpotify::default(), RateLimitPolicy::default());
    let server = create_test_server(&state);

    let response = server
        .get("/?error=%3Cscript%3Ealert(1)%3C%2Fscript%3E")
        .await;

    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(!html.contains("<script>"));
    assert!(html.contains("scriptalert1script"));
}

#[tokio::test]
async fn test_status_without_session() {
    let state = create_state(settings(), FakeSpotify::default(), RateLimitPolicy::default());
    let server = create_test_server(&state);

    let response = server.get("/api/auth/status").await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_logout_twice() {
    let (server, state) = logged_in_server(FakeSpotify::default()).await;

    for _ in 0..2 {
        let response = server.post("/api/auth/logout").await;
        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
    }

    assert_eq!(
        state.auth.store().get(ACCESS_TOKEN_KEY).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_top_tracks_requires_session() {
    let state = create_state(
        settings(),
        FakeSpotify::with_tracks(distinct_tracks(5)),
        RateLimitPolicy::default(),
    );
    let server = create_test_server(&state);

    let response = server.get("/api/spotify/top-tracks").await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Your session has expired. Please reconnect your account."
    );
    assert_eq!(state.auth.endpoint().track_requests(), 0);
}

#[tokio::test]
async fn test_top_tracks_defaults_and_clamping() {
    let (server, state) = logged_in_server(FakeSpotify::with_tracks(distinct_tracks(60))).await;

    let response = server.get("/api/spotify/top-tracks?limit=80").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 50);
    assert_eq!(body["limit"], 50);
    assert!(body["next"].is_string());

    let response = server
        .get("/api/spotify/top-tracks?offset=-5&limit=10")
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(*state.auth.endpoint().offsets.lock().unwrap(), vec![0, 0]);
}

#[tokio::test]
async fn test_top_tracks_validation() {
    let (server, state) = logged_in_server(FakeSpotify::with_tracks(distinct_tracks(5))).await;

    for query in [
        "time_range=forever",
        "limit=0",
        "limit=abc",
        "offset=500",
        "offset=ten",
    ] {
        let response = server
            .get(&format!("/api/spotify/top-tracks?{query}"))
            .await;
        assert_eq!(response.status_code(), 400, "query {query}");
    }

    // rejected before any upstream call
    assert_eq!(state.auth.endpoint().track_requests(), 0);
}

#[tokio::test]
async fn test_top_tracks_rate_limit_per_client() {
    let state = create_state(
        settings(),
        FakeSpotify::with_tracks(distinct_tracks(5)),
        RateLimitPolicy {
            max_requests: 2,
            window: chrono::Duration::seconds(60),
        },
    );
    seed_session(state.auth.store()).await;
    let server = create_test_server(&state);

    for _ in 0..2 {
        let (name, value) = forwarded_for("203.0.113.7");
        let response = server
            .get("/api/spotify/top-tracks")
            .add_header(name, value)
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let (name, value) = forwarded_for("203.0.113.7");
    let response = server
        .get("/api/spotify/top-tracks")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 429);

    let (name, value) = forwarded_for("198.51.100.1");
    let response = server
        .get("/api/spotify/top-tracks")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_top_tracks_upstream_unauthorized() {
    let spotify = FakeSpotify::with_tracks(distinct_tracks(5));
    spotify.fail_tracks_with(401);
    let (server, _) = logged_in_server(spotify).await;

    let response = server.get("/api/spotify/top-tracks").await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_top_tracks_upstream_failure_is_sanitized() {
    let spotify = FakeSpotify::with_tracks(distinct_tracks(5));
    spotify.fail_tracks_with(503);
    let (server, _) = logged_in_server(spotify).await;

    let response = server.get("/api/spotify/top-tracks").await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("upstream failure"));
}

#[tokio::test]
async fn test_mural() {
    let (server, _) = logged_in_server(FakeSpotify::with_tracks(distinct_tracks(3))).await;

    let response = server
        .get("/api/mural?width=2&height=2&quality=low&time_range=short_term")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let covers = body.as_array().unwrap();
    assert_eq!(covers.len(), 4);
    assert_eq!(covers[0]["id"], "album0");
    assert_eq!(covers[0]["imageUrl"], "https://i.scdn.co/image/album0-64");
    assert_eq!(covers[0]["artistName"], "Artist 0");
    assert_eq!(
        covers[0]["externalUrl"],
        "https://open.spotify.com/album/album0"
    );
    assert_eq!(covers[3]["id"], "placeholder-0");
    assert_eq!(covers[3]["externalUrl"], "");
}

#[tokio::test]
async fn test_mural_rejects_bad_dimensions() {
    let (server, state) = logged_in_server(FakeSpotify::with_tracks(distinct_tracks(3))).await;

    for query in [
        "height=2",
        "width=0&height=2",
        "width=21&height=1",
        "width=15&height=15",
        "width=2.5&height=2",
        "width=2&height=2&quality=ultra",
    ] {
        let response = server.get(&format!("/api/mural?{query}")).await;
        assert_eq!(response.status_code(), 400, "query {query}");
    }

    assert_eq!(state.auth.endpoint().track_requests(), 0);
}
