use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use emotiva::ml::{DecisionTree, LabelEncoder, LinearTextClassifier, MoodEncoders, MoodModel, TreeEnsemble, TreeNode};
use emotiva::store::{RecommendationRecord, StoredBlock};
use emotiva::{build_router, AppState, Config, EmotivaDatabase, ModelRegistry};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        database_path: PathBuf::from(":memory:"),
        db_pool_size: 1,
        encoders_path: PathBuf::from("missing/encoders.json"),
        mood_model_path: PathBuf::from("missing/mood.json"),
        sentiment_model_path: PathBuf::from("missing/sentiment.json"),
        content_seed_path: PathBuf::from("missing/recommendations.json"),
        request_timeout_seconds: 30,
    }
}

fn leaf(value: &[f32]) -> TreeNode {
    TreeNode::Leaf { value: value.to_vec() }
}

fn split(feature: usize, threshold: f32, left: usize, right: usize) -> TreeNode {
    TreeNode::Split { feature, threshold, left, right }
}

/// sad/medium/no/low/yes -> "calm"; happy/*/*/*/no -> "uplift".
fn mood_model() -> MoodModel {
    mood_model_with_intensity(&["high", "low", "medium"])
}

/// The trees never split on intensity, so its classes only affect encoding.
fn mood_model_with_intensity(intensity: &[&str]) -> MoodModel {
    let encoders = MoodEncoders {
        mood: LabelEncoder::new(["happy", "neutral", "sad"]),
        intensity: LabelEncoder::new(intensity.iter().copied()),
        social_interaction: LabelEncoder::new(["no", "yes"]),
        productivity: LabelEncoder::new(["high", "low", "medium"]),
        overwhelmed: LabelEncoder::new(["no", "yes"]),
        target: LabelEncoder::new(["calm", "energize", "uplift"]),
    };
    let by_mood = DecisionTree {
        nodes: vec![
            split(0, 0.5, 1, 2),
            leaf(&[0.0, 0.0, 10.0]),
            split(0, 1.5, 3, 4),
            leaf(&[0.0, 8.0, 2.0]),
            leaf(&[9.0, 1.0, 0.0]),
        ],
    };
    let by_overwhelmed = DecisionTree {
        nodes: vec![split(4, 0.5, 1, 2), leaf(&[0.0, 3.0, 3.0]), leaf(&[6.0, 0.0, 0.0])],
    };
    let forest = TreeEnsemble::RandomForest {
        n_features: 5,
        n_classes: 3,
        trees: vec![by_mood.clone(), by_mood, by_overwhelmed],
    };
    MoodModel::new(encoders, Arc::new(forest)).unwrap()
}

fn sentiment_model() -> LinearTextClassifier {
    let vocabulary = ["great", "happy", "sad", "awful", "not"]
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect();
    LinearTextClassifier {
        labels: vec!["NEGATIVE".into(), "POSITIVE".into()],
        vocabulary,
        weights: vec![
            vec![-1.0, -1.0, 1.5, 2.0, 0.5],
            vec![1.0, 1.5, -1.5, -2.0, -0.5],
        ],
        bias: vec![0.0, 0.1],
    }
}

fn test_app(models: ModelRegistry) -> Router {
    let database = EmotivaDatabase::new_in_memory().unwrap();
    let block: StoredBlock = serde_json::from_value(json!({
        "type": "iframe",
        "src": "https://video.example/calm",
        "width": "560px",
        "height": 315,
        "frameborder": "0"
    }))
    .unwrap();
    let unknown: StoredBlock = serde_json::from_value(json!({"type": "poll", "question": "?"})).unwrap();
    database
        .content
        .upsert(&RecommendationRecord {
            id: "calm".to_string(),
            title: Some("Slow down".to_string()),
            blocks: vec![block, unknown],
        })
        .unwrap();

    build_router(AppState::new(test_config(), Arc::new(database), models))
}

fn full_models() -> ModelRegistry {
    ModelRegistry::empty()
        .with_mood(mood_model())
        .with_sentiment(Arc::new(sentiment_model()))
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_req(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> StatusCode {
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/user/register",
            json!({"name": name, "email": email, "password": password}),
        ))
        .await
        .unwrap();
    resp.status()
}

// --- Accounts ---

#[tokio::test]
async fn register_then_signin() {
    let app = test_app(ModelRegistry::empty());
    assert_eq!(register(&app, "Ada", "ada@example.com", "s3cret").await, StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/user/signin",
            json!({"email": "ada@example.com", "password": "s3cret"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = test_app(ModelRegistry::empty());
    assert_eq!(register(&app, "Ada", "ada@example.com", "one").await, StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/user/register",
            json!({"name": "Other", "email": "ada@example.com", "password": "two"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "User already exists");
}

#[tokio::test]
async fn register_requires_every_field() {
    let app = test_app(ModelRegistry::empty());
    let resp = app
        .oneshot(json_req("POST", "/user/register", json!({"email": "ada@example.com"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let message = body_json(resp).await["message"].as_str().unwrap().to_string();
    assert!(message.contains("name is required"), "{message}");
    assert!(message.contains("password is required"), "{message}");
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let app = test_app(ModelRegistry::empty());
    assert_eq!(register(&app, "Ada", "not-an-email", "pw").await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signin_failures_are_indistinguishable() {
    let app = test_app(ModelRegistry::empty());
    register(&app, "Ada", "ada@example.com", "right").await;

    let wrong_password = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/user/signin",
            json!({"email": "ada@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/user/signin",
            json!({"email": "nobody@example.com", "password": "right"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[tokio::test]
async fn update_profile_changes_name_and_password() {
    let app = test_app(ModelRegistry::empty());
    register(&app, "Ada", "ada@example.com", "old").await;

    let resp = app
        .clone()
        .oneshot(json_req(
            "PUT",
            "/user/update",
            json!({"email": "ada@example.com", "name": "Ada L.", "password": "new"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["name"], "Ada L.");

    let old = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/user/signin",
            json!({"email": "ada@example.com", "password": "old"}),
        ))
        .await
        .unwrap();
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/user/signin",
            json!({"email": "ada@example.com", "password": "new"}),
        ))
        .await
        .unwrap();
    assert_eq!(new.status(), StatusCode::OK);
    assert_eq!(body_json(new).await["user"], "Ada L.");
}

#[tokio::test]
async fn update_profile_edge_cases() {
    let app = test_app(ModelRegistry::empty());
    register(&app, "Ada", "ada@example.com", "pw").await;

    let nothing = app
        .clone()
        .oneshot(json_req("PUT", "/user/update", json!({"email": "ada@example.com"})))
        .await
        .unwrap();
    assert_eq!(nothing.status(), StatusCode::BAD_REQUEST);

    let missing = app
        .clone()
        .oneshot(json_req(
            "PUT",
            "/user/update",
            json!({"email": "ghost@example.com", "name": "Ghost"}),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["message"], "User not found");
}

#[tokio::test(flavor = "current_thread")]
async fn signin_does_not_stall_other_requests() {
    let app = test_app(ModelRegistry::empty());
    register(&app, "Ada", "ada@example.com", "pw").await;

    let signin = async {
        let resp = app
            .clone()
            .oneshot(json_req(
                "POST",
                "/user/signin",
                json!({"email": "ada@example.com", "password": "pw"}),
            ))
            .await
            .unwrap();
        (resp.status(), std::time::Instant::now())
    };
    let health = async {
        let resp = app.clone().oneshot(get_req("/healthz")).await.unwrap();
        (resp.status(), std::time::Instant::now())
    };

    // One runtime thread: hashing inline would finish sign-in before health is polled.
    let ((signin_status, signin_done), (health_status, health_done)) = tokio::join!(signin, health);
    assert_eq!(signin_status, StatusCode::OK);
    assert_eq!(health_status, StatusCode::OK);
    assert!(health_done < signin_done);
}

// --- Journals ---

#[tokio::test]
async fn journal_lifecycle() {
    let app = test_app(ModelRegistry::empty());

    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/journals/add",
            json!({
                "email": "ada@example.com",
                "title": "Monday",
                "content": "Long day",
                "timestamp": "2024-03-04T20:15:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Journal added successfully");
    let id = body["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/journals/update/{id}"),
            json!({"title": "Monday (edited)", "content": "Better evening"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Journal updated successfully");

    let resp = app
        .clone()
        .oneshot(json_req("POST", "/journals/get", json!({"email": "ada@example.com"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let journals = body_json(resp).await["journals"].as_array().unwrap().clone();
    assert_eq!(journals.len(), 1);
    assert_eq!(journals[0]["_id"], id.as_str());
    assert_eq!(journals[0]["title"], "Monday (edited)");
    assert_eq!(journals[0]["content"], "Better evening");
    assert_eq!(journals[0]["timestamp"], "2024-03-04T20:15:00Z");
    assert!(journals[0].get("email").is_none());

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/journals/delete/{id}"))
            .body(Body::empty())
            .unwrap()
    };
    let resp = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Journal deleted successfully");

    let resp = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "Journal not found");
}

#[tokio::test]
async fn journals_for_unknown_email_is_empty() {
    let app = test_app(ModelRegistry::empty());
    let resp = app
        .oneshot(json_req("POST", "/journals/get", json!({"email": "nobody@example.com"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"journals": []}));
}

#[tokio::test]
async fn journal_add_requires_all_fields() {
    let app = test_app(ModelRegistry::empty());
    let resp = app
        .oneshot(json_req(
            "POST",
            "/journals/add",
            json!({"email": "ada@example.com", "title": "No body"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn journal_update_unknown_and_invalid_ids() {
    let app = test_app(ModelRegistry::empty());

    let unknown = app
        .clone()
        .oneshot(json_req(
            "PUT",
            "/journals/update/9b2f4c1e-0000-4000-8000-000000000000",
            json!({"title": "t", "content": "c"}),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let invalid = app
        .clone()
        .oneshot(json_req(
            "PUT",
            "/journals/update/not-an-id",
            json!({"title": "t", "content": "c"}),
        ))
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body_json(invalid).await["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Error updating journal"), "{message}");
}

#[tokio::test]
async fn journal_values_keep_their_json_type() {
    let app = test_app(ModelRegistry::empty());
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/journals/add",
            json!({
                "email": "a@b.com",
                "title": null,
                "content": "c",
                "timestamp": 1717171717000u64
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(json_req("POST", "/journals/get", json!({"email": "a@b.com"})))
        .await
        .unwrap();
    let journals = body_json(resp).await["journals"].clone();
    assert_eq!(journals[0]["timestamp"], json!(1717171717000u64));
    assert_eq!(journals[0]["title"], json!(null));
    assert_eq!(journals[0]["content"], "c");
}

#[tokio::test]
async fn journal_delete_malformed_id_is_server_error() {
    let app = test_app(ModelRegistry::empty());
    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/journals/delete/not-an-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await["message"],
        "Error: 'not-an-id' is not a valid journal id"
    );
}

// --- Recommendations ---

#[tokio::test]
async fn mood_recommendation_returns_reshaped_content() {
    let app = test_app(full_models());
    let resp = app
        .oneshot(json_req(
            "POST",
            "/recommend/mood",
            json!({
                "mood": "sad",
                "intensity": "medium",
                "socialInteraction": "no",
                "productivity": "low",
                "overwhelmed": "yes"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["emotion"], "calm");
    assert_eq!(body["title"], "Slow down");
    assert_eq!(
        body["content"],
        json!([{"type": "iframe", "src": "https://video.example/calm", "width": 560, "height": 315}])
    );
}

#[tokio::test]
async fn mood_recommendation_accepts_numeric_attributes() {
    let models = ModelRegistry::empty().with_mood(mood_model_with_intensity(&["1", "2", "3"]));
    let app = test_app(models);
    let request = |intensity: serde_json::Value| {
        json_req(
            "POST",
            "/recommend/mood",
            json!({
                "mood": "sad",
                "intensity": intensity,
                "socialInteraction": "no",
                "productivity": "low",
                "overwhelmed": "yes"
            }),
        )
    };

    let resp = app.clone().oneshot(request(json!(3))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["emotion"], "calm");

    let resp = app.clone().oneshot(request(json!(7))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body_json(resp).await["message"].as_str().unwrap().to_string();
    assert!(message.contains("unseen intensity category '7'"), "{message}");
}

#[tokio::test]
async fn mood_recommendation_unseen_category_is_server_error() {
    let app = test_app(full_models());
    let resp = app
        .oneshot(json_req(
            "POST",
            "/recommend/mood",
            json!({
                "mood": "ecstatic",
                "intensity": "medium",
                "socialInteraction": "no",
                "productivity": "low",
                "overwhelmed": "yes"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body_json(resp).await["message"].as_str().unwrap().to_string();
    assert!(message.contains("ecstatic"), "{message}");
}

#[tokio::test]
async fn mood_recommendation_without_record_is_not_found() {
    let app = test_app(full_models());
    let resp = app
        .oneshot(json_req(
            "POST",
            "/recommend/mood",
            json!({
                "mood": "happy",
                "intensity": "high",
                "socialInteraction": "yes",
                "productivity": "high",
                "overwhelmed": "no"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "Recommendation not found");
}

#[tokio::test]
async fn mood_recommendation_requires_every_attribute() {
    let app = test_app(full_models());
    let resp = app
        .oneshot(json_req("POST", "/recommend/mood", json!({"mood": "sad"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recommenders_unavailable_without_models() {
    let app = test_app(ModelRegistry::empty());

    let mood = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/recommend/mood",
            json!({
                "mood": "sad",
                "intensity": "medium",
                "socialInteraction": "no",
                "productivity": "low",
                "overwhelmed": "yes"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(mood.status(), StatusCode::SERVICE_UNAVAILABLE);

    let sentiment = app
        .clone()
        .oneshot(json_req("POST", "/recommend/sentiment", json!({"text": "great day"})))
        .await
        .unwrap();
    assert_eq!(sentiment.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn sentiment_recommendation_branches_on_label() {
    let app = test_app(full_models());

    let positive = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/recommend/sentiment",
            json!({"text": "What a great, happy day"}),
        ))
        .await
        .unwrap();
    assert_eq!(positive.status(), StatusCode::OK);
    let body = body_json(positive).await;
    assert_eq!(body["sentiment"], "POSITIVE");
    assert_eq!(body["recommendation"]["title"], "Keep the momentum going");
    assert!(body["score"].as_f64().unwrap() > 0.5);

    let negative = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/recommend/sentiment",
            json!({"text": "awful and sad"}),
        ))
        .await
        .unwrap();
    let body = body_json(negative).await;
    assert_eq!(body["sentiment"], "NEGATIVE");
    assert_eq!(body["recommendation"]["title"], "Take a gentle pause");
}

#[tokio::test]
async fn sentiment_rejects_blank_text() {
    let app = test_app(full_models());
    let resp = app
        .oneshot(json_req("POST", "/sentiment", json!({"text": "   "})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Text cannot be empty");
}

#[tokio::test]
async fn sentiment_analysis_returns_suggestion_title() {
    let app = test_app(full_models());
    let resp = app
        .oneshot(json_req("POST", "/sentiment", json!({"text": "happy happy"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"sentiment": "POSITIVE", "recommendation": "Keep the momentum going"})
    );
}

// --- Operations ---

#[tokio::test]
async fn health_endpoints() {
    let app = test_app(full_models());

    let resp = app.clone().oneshot(get_req("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(get_req("/admin/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models"], json!(["mood", "sentiment"]));
}

#[tokio::test]
async fn stats_count_rows() {
    let app = test_app(ModelRegistry::empty());
    register(&app, "Ada", "ada@example.com", "pw").await;

    let resp = app.clone().oneshot(get_req("/admin/stats")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_users"], 1);
    assert_eq!(body["total_journals"], 0);
    assert_eq!(body["total_recommendations"], 1);
}

#[tokio::test]
async fn metrics_count_requests_by_route() {
    emotiva::metrics::init_metrics();
    let app = test_app(ModelRegistry::empty());
    app.clone().oneshot(get_req("/healthz")).await.unwrap();
    let missing = app.clone().oneshot(get_req("/no/such/route")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let resp = app.clone().oneshot(get_req("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("requests_total"), "{text}");
    assert!(text.contains("route=\"/healthz\""), "{text}");
    assert!(text.contains("route=\"unmatched\",status=\"404\""), "{text}");
}
