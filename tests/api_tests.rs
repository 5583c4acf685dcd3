use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use radio_api::api::{create_router, AppState};
use radio_api::config::Config;

fn create_test_server() -> TestServer {
    let state = AppState::new();
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn new_user() -> String {
    uuid::Uuid::new_v4().to_string()
}

async fn create_song(server: &TestServer, title: &str) -> String {
    let response = server
        .post("/songs")
        .json(&json!({
            "title": title,
            "artist": "Test Artist"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let song: Value = response.json();
    song["id"].as_str().unwrap().to_string()
}

async fn rate(server: &TestServer, user: &str, song: &str, rating: i64) {
    server
        .put(&format!("/users/{}/ratings/{}", user, song))
        .json(&json!({ "rating": rating }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = create_test_server();
    let id = uuid::Uuid::new_v4().to_string();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_str(&id).unwrap(),
        )
        .await;

    assert_eq!(response.header("x-request-id").to_str().unwrap(), id);
}

#[tokio::test]
async fn test_create_and_get_song() {
    let server = create_test_server();
    create_song(&server, "Svefn-g-englar").await;

    let response = server.get("/songs").await;
    response.assert_status_ok();
    let songs: Vec<Value> = response.json();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["title"], "Svefn-g-englar");
}

#[tokio::test]
async fn test_station_membership() {
    let server = create_test_server();
    let song = create_song(&server, "Hoppípolla").await;

    let response = server
        .post("/stations")
        .json(&json!({ "name": "Post-rock" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let station: Value = response.json();
    let station_id = station["id"].as_str().unwrap();

    server
        .put(&format!("/stations/{}/songs/{}", station_id, song))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/stations/{}", station_id)).await;
    let station: Value = response.json();
    assert_eq!(station["songs"], json!([song]));

    server
        .delete(&format!("/stations/{}/songs/{}", station_id, song))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    // No longer on the playlist
    server
        .delete(&format!("/stations/{}/songs/{}", station_id, song))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rating_validation() {
    let server = create_test_server();
    let song = create_song(&server, "Glósóli").await;
    let user = new_user();

    for rating in [0, 6, -3] {
        server
            .put(&format!("/users/{}/ratings/{}", user, song))
            .json(&json!({ "rating": rating }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    server
        .put(&format!("/users/{}/ratings/{}", user, new_user()))
        .json(&json!({ "rating": 3 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let nil = uuid::Uuid::nil();
    server
        .put(&format!("/users/{}/ratings/{}", nil, song))
        .json(&json!({ "rating": 3 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_rating_body_is_bad_request() {
    let server = create_test_server();
    let song = create_song(&server, "Sæglópur").await;
    let user = new_user();

    for body in [json!({ "rating": 3.5 }), json!({ "rating": "5" }), json!({})] {
        let response = server
            .put(&format!("/users/{}/ratings/{}", user, song))
            .json(&body)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert!(error["error"].is_string());
    }
}

#[tokio::test]
async fn test_malformed_ids_are_json_errors() {
    let server = create_test_server();
    let song = create_song(&server, "Ný batterí").await;

    let response = server
        .get(&format!("/users/not-a-uuid/predictions/{}", song))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert!(error["error"].is_string());

    let response = server
        .get(&format!("/users/{}/suggestions", new_user()))
        .add_query_param("limit", "many")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn test_clear_rating() {
    let server = create_test_server();
    let song = create_song(&server, "Starálfur").await;
    let user = new_user();

    server
        .delete(&format!("/users/{}/ratings/{}", user, song))
        .await
        .assert_status(StatusCode::CONFLICT);

    rate(&server, &user, &song, 4).await;
    let ratings: Vec<Value> = server
        .get(&format!("/users/{}/ratings", user))
        .await
        .json();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["rating"], 4);

    server
        .delete(&format!("/users/{}/ratings/{}", user, song))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let ratings: Vec<Value> = server
        .get(&format!("/users/{}/ratings", user))
        .await
        .json();
    assert!(ratings.is_empty());
}

#[tokio::test]
async fn test_predict_on_empty_ledger() {
    let server = create_test_server();
    let song = create_song(&server, "Untitled #1").await;

    let response = server
        .get(&format!("/users/{}/predictions/{}", new_user(), song))
        .await;
    response.assert_status_ok();
    let prediction: Value = response.json();
    assert_eq!(prediction["stars"], 3);
    assert_eq!(prediction["basis"], "neutral_default");
}

#[tokio::test]
async fn test_predict_unknown_song() {
    let server = create_test_server();
    server
        .get(&format!("/users/{}/predictions/{}", new_user(), new_user()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendation_flow() {
    let server = create_test_server();
    let s1 = create_song(&server, "S1").await;
    let s2 = create_song(&server, "S2").await;
    let s3 = create_song(&server, "S3").await;
    let (alice, bob, carol) = (new_user(), new_user(), new_user());

    rate(&server, &alice, &s1, 5).await;
    rate(&server, &alice, &s2, 1).await;
    rate(&server, &bob, &s1, 4).await;
    rate(&server, &bob, &s2, 2).await;
    rate(&server, &bob, &s3, 5).await;
    rate(&server, &carol, &s1, 1).await;
    rate(&server, &carol, &s2, 5).await;

    let similarity: Value = server
        .get(&format!("/users/{}/similarity/{}", alice, bob))
        .await
        .json();
    assert!(similarity["similarity"].as_f64().unwrap() > 0.0);

    let similarity: Value = server
        .get(&format!("/users/{}/similarity/{}", alice, carol))
        .await
        .json();
    assert!(similarity["similarity"].as_f64().unwrap() < 0.0);

    let prediction: Value = server
        .get(&format!("/users/{}/predictions/{}", alice, s3))
        .await
        .json();
    assert_eq!(prediction["stars"], 5);
    assert_eq!(prediction["basis"], "neighbors");

    let response = server.get(&format!("/users/{}/suggestion", alice)).await;
    response.assert_status_ok();
    let suggestion: Value = response.json();
    assert_eq!(suggestion["song"]["id"], s3);
    assert_eq!(suggestion["predicted_rating"], 5);

    // Bob has rated everything
    server
        .get(&format!("/users/{}/suggestion", bob))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_similarity_undefined_is_null() {
    let server = create_test_server();
    let s1 = create_song(&server, "S1").await;
    let s2 = create_song(&server, "S2").await;
    let (alice, bob) = (new_user(), new_user());
    rate(&server, &alice, &s1, 5).await;
    rate(&server, &bob, &s2, 5).await;

    let similarity: Value = server
        .get(&format!("/users/{}/similarity/{}", alice, bob))
        .await
        .json();
    assert!(similarity["similarity"].is_null());
}

#[tokio::test]
async fn test_suggestion_is_stable() {
    let server = create_test_server();
    for title in ["a", "b", "c", "d"] {
        create_song(&server, title).await;
    }
    let user = new_user();

    let first: Value = server
        .get(&format!("/users/{}/suggestion", user))
        .await
        .json();
    for _ in 0..5 {
        let again: Value = server
            .get(&format!("/users/{}/suggestion", user))
            .await
            .json();
        assert_eq!(again["song"]["id"], first["song"]["id"]);
    }

    // Ties go to the lowest song id
    let songs: Vec<Value> = server.get("/songs").await.json();
    assert_eq!(first["song"]["id"], songs[0]["id"]);
}

#[tokio::test]
async fn test_ranked_suggestions_respect_limit() {
    let server = create_test_server();
    for title in ["a", "b", "c", "d", "e"] {
        create_song(&server, title).await;
    }
    let user = new_user();

    let ranked: Vec<Value> = server
        .get(&format!("/users/{}/suggestions", user))
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(ranked.len(), 2);

    let suggestion: Value = server
        .get(&format!("/users/{}/suggestion", user))
        .await
        .json();
    assert_eq!(ranked[0]["song"]["id"], suggestion["song"]["id"]);
}

#[tokio::test]
async fn test_station_suggestion() {
    let server = create_test_server();
    let on_air = create_song(&server, "On air").await;
    create_song(&server, "Off air").await;
    let station: Value = server
        .post("/stations")
        .json(&json!({ "name": "Only one", "songs": [on_air] }))
        .await
        .json();
    let station_id = station["id"].as_str().unwrap();
    let user = new_user();

    let suggestion: Value = server
        .get(&format!("/users/{}/stations/{}/suggestion", user, station_id))
        .await
        .json();
    assert_eq!(suggestion["song"]["id"], on_air);

    server
        .get(&format!("/users/{}/stations/{}/suggestion", user, new_user()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_song_cascades() {
    let server = create_test_server();
    let song = create_song(&server, "Doomed").await;
    let user = new_user();
    rate(&server, &user, &song, 5).await;

    server
        .delete(&format!("/songs/{}", song))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let ratings: Vec<Value> = server
        .get(&format!("/users/{}/ratings", user))
        .await
        .json();
    assert!(ratings.is_empty());
    server
        .get(&format!("/users/{}/suggestion", user))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_candidate_budget_from_config() {
    let config = Config {
        suggest_candidate_budget: Some(1),
        ..Config::default()
    };
    let server = TestServer::new(create_router(AppState::from_config(&config))).unwrap();
    for title in ["a", "b", "c"] {
        create_song(&server, title).await;
    }

    let suggestion: Value = server
        .get(&format!("/users/{}/suggestion", new_user()))
        .await
        .json();
    assert_eq!(suggestion["candidates"], 3);
    assert_eq!(suggestion["evaluated"], 1);
}
