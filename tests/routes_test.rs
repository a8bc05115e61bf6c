use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use trivia_back::{
    config::AppConfig,
    routes,
    state::{AppState, game::Question},
};

fn create_test_app() -> Router {
    let questions = (1..=5)
        .map(|i| Question {
            id: i.to_string(),
            question_text: format!("Question {i}?"),
            options: vec!["right".into(), "wrong".into(), "also wrong".into()],
            correct_index: 0,
        })
        .collect();
    let config = AppConfig::default().with_countdown_seconds(0);
    routes::router(AppState::new(config, questions))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri).header("host", "trivia.test");
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn start_session(app: &Router, body: Option<Value>) -> String {
    let (status, json) = send(app, "POST", "/game/start", body).await;
    assert_eq!(status, StatusCode::OK, "unexpected body {json}");
    json["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_healthcheck_reports_session_count() {
    let app = create_test_app();
    start_session(&app, None).await;

    let (status, json) = send(&app, "GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn test_start_game_returns_shareable_link() {
    let app = create_test_app();
    let (status, json) = send(&app, "POST", "/game/start", Some(json!({"numQuestions": 2}))).await;

    assert_eq!(status, StatusCode::OK);
    let session_id = json["sessionId"].as_str().unwrap();
    assert_eq!(session_id.len(), 32);
    assert_eq!(
        json["shareableLink"],
        format!("trivia.test/join/{session_id}")
    );

    let (status, json) = send(&app, "GET", &format!("/questions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let questions = json["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert!(questions[0].get("correctIndex").is_none());
}

#[tokio::test]
async fn test_start_game_clamps_to_question_bank() {
    let app = create_test_app();
    let session_id = start_session(&app, Some(json!({"numQuestions": 50}))).await;

    let (_, json) = send(&app, "GET", &format!("/questions/{session_id}"), None).await;
    assert_eq!(json["questions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_start_game_rejects_zero_questions() {
    let app = create_test_app();
    let (status, json) = send(&app, "POST", "/game/start", Some(json!({"numQuestions": 0}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_unknown_session_returns_404() {
    let app = create_test_app();

    for (method, uri) in [
        ("POST", "/game/join/missing"),
        ("GET", "/game/end/missing"),
        ("GET", "/questions/missing"),
        ("GET", "/final-scores/missing"),
    ] {
        let (status, _) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_single_player_flow() {
    let app = create_test_app();
    let session_id = start_session(&app, None).await;

    let (status, json) = send(
        &app,
        "POST",
        "/answer",
        Some(json!({"sessionId": session_id, "questionId": "1", "answer": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["correct"], true);
    assert_eq!(json["currentScore"], 10);

    let (_, json) = send(
        &app,
        "POST",
        "/answer",
        Some(json!({"sessionId": session_id, "questionId": "2", "answer": 2})),
    )
    .await;
    assert_eq!(json["correct"], false);
    assert_eq!(json["currentScore"], 10);

    let (status, json) = send(&app, "GET", &format!("/game/end/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["finalScore"], 10);
}

#[tokio::test]
async fn test_multiplayer_flow_feeds_scores_and_leaderboard() {
    let app = create_test_app();
    let session_id = start_session(&app, None).await;

    let (status, alice) = send(&app, "POST", &format!("/game/join/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alice["playerName"], "Player 1");
    let (_, bob) = send(&app, "POST", &format!("/game/join/{session_id}"), None).await;
    assert_eq!(bob["playerName"], "Player 2");
    let alice_id = alice["playerId"].as_str().unwrap().to_string();
    let bob_id = bob["playerId"].as_str().unwrap().to_string();

    let (_, first) = send(
        &app,
        "POST",
        "/answer",
        Some(json!({"sessionId": session_id, "playerId": alice_id, "questionId": "1", "answer": 0})),
    )
    .await;
    let (_, second) = send(
        &app,
        "POST",
        "/answer",
        Some(json!({"sessionId": session_id, "playerId": bob_id, "questionId": "1", "answer": 0})),
    )
    .await;
    assert_eq!(first["correct"], true);
    assert_eq!(first["currentScore"], 10);
    assert_eq!(second["correct"], false);
    assert_eq!(second["currentScore"], 0);

    for player_id in [&alice_id, &bob_id] {
        let (status, json) = send(
            &app,
            "POST",
            "/player/finished",
            Some(json!({"sessionId": session_id, "playerId": player_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Player marked as finished");
    }

    let (status, json) = send(&app, "GET", &format!("/final-scores/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["highScore"], 10);
    assert_eq!(json["winners"], json!(["Player 1"]));
    assert_eq!(json["scores"].as_array().unwrap().len(), 2);

    let (status, json) = send(&app, "GET", "/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let standings = json.as_object().unwrap();
    let order: Vec<&String> = standings.keys().collect();
    assert_eq!(order, [&alice_id, &bob_id]);
    assert_eq!(standings[&alice_id], "20.00%");
    assert_eq!(standings[&bob_id], "0.00%");
}

#[tokio::test]
async fn test_answer_for_unknown_player_returns_404() {
    let app = create_test_app();
    let session_id = start_session(&app, None).await;

    let (status, _) = send(
        &app,
        "POST",
        "/answer",
        Some(json!({"sessionId": session_id, "playerId": "not-a-player", "questionId": "1", "answer": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_session_id_is_rejected() {
    let app = create_test_app();
    let (status, json) = send(
        &app,
        "POST",
        "/answer",
        Some(json!({"sessionId": "  ", "questionId": "1", "answer": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("validation failed"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app();
    let (status, json) = send(&app, "GET", routes::docs::OPENAPI_PATH, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"].get("/game/start").is_some());
    assert!(json["paths"].get("/ws").is_some());
    assert!(json["paths"].get("/leaderboard").is_some());
}
