use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Game routes.
pub mod game;
/// Health route.
pub mod health;
/// Player search, registration and leaderboard routes.
pub mod player;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(game::router())
        .merge(player::router())
        .merge(docs::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    async fn call(
        app: &Router<()>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn game_lifecycle_over_http() {
        let app = router(AppState::new(&AppConfig::default(), None));

        let (status, created) = call(
            &app,
            "POST",
            "/games/start",
            Some(json!({
                "red": {"forward": "p1", "goalkeeper": "p2"},
                "blue": {"forward": "p3", "goalkeeper": "p4"},
                "waiting": ["p5", "p6", "p7"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 24);

        let (status, goal) = call(
            &app,
            "POST",
            &format!("/games/{id}/goal"),
            Some(json!({"team": "red"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(goal["blue"], json!({"forward": "p5", "goalkeeper": "p3"}));
        assert_eq!(goal["waiting"], json!(["p6", "p7", "p4"]));
        assert_eq!(goal["rotation"]["benched"], "p4");

        let (status, undone) = call(&app, "POST", &format!("/games/{id}/undo"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(undone["score"], json!({"red": 0, "blue": 0}));

        let (status, listed) = call(&app, "GET", "/games", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn errors_map_to_statuses() {
        let app = router(AppState::new(&AppConfig::default(), None));

        let (status, _) = call(&app, "GET", "/games/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            "POST",
            "/games/start",
            Some(json!({
                "red": {"forward": "p1", "goalkeeper": " "},
                "blue": {"forward": "p3", "goalkeeper": "p4"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, created) = call(
            &app,
            "POST",
            "/games/start",
            Some(json!({
                "red": {"forward": "p1", "goalkeeper": "p2"},
                "blue": {"forward": "p3", "goalkeeper": "p4"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = call(
            &app,
            "POST",
            &format!("/games/{id}/goal"),
            Some(json!({"team": "blue"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &app,
            "POST",
            &format!("/games/{id}/goal"),
            Some(json!({"team": "purple"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, "GET", "/leaderboard/data", None).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

        let (status, health) = call(&app, "GET", "/healthcheck", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "disabled");
        assert_eq!(health["games"], 1);
    }

    #[tokio::test]
    async fn openapi_document_lists_game_routes() {
        let app = router(AppState::new(&AppConfig::default(), None));

        let (status, doc) = call(&app, "GET", docs::OPENAPI_JSON_PATH, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"].get("/games/{id}/goal").is_some());
        assert!(doc["paths"].get("/leaderboard/data").is_some());
    }
}
