use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use course_recommender::api::{create_router, AppState};
use course_recommender::config::Config;
use course_recommender::dataset::load_from_reader;
use course_recommender::services::export;

const DATASET: &str = "\
user_id,course_id,course_name,instructor,rating,difficulty_level,course_price,enrollment_numbers,time_spent_hours,previous_courses_taken,completion_status
15796,9366,Python for Beginners,Emma Harris,4.5,Beginner,39.1,48245,12.5,2,Completed
15796,1494,Data Visualization with Tableau,Alexander Young,3.9,Intermediate,149.86,21312,8.0,2,Not Completed
861,1494,Data Visualization with Tableau,Alexander Young,4.2,Intermediate,149.86,21312,10.0,5,Completed
861,7004,Fundamentals of Machine Learning,Emma Harris,4.8,Intermediate,89.99,41208,25.5,5,Completed
38158,9366,Python for Beginners,Emma Harris,4.9,Beginner,39.1,48245,15.0,0,Completed
38158,5813,Advanced Python Programming,Emma Harris,4.6,Advanced,119.0,18540,18.0,0,Not Completed
";

const REPLACEMENT: &str = "\
user_id,course_id,course_name,instructor,rating,difficulty_level,course_price,enrollment_numbers
1,100,Rust Systems Programming,Ava King,4.8,Advanced,79.0,5000
2,200,Intro to SQL,Noah Reed,4.1,Beginner,19.0,9000
";

async fn create_test_server() -> TestServer {
    let dataset = load_from_reader(DATASET.as_bytes()).unwrap();
    let state = AppState::from_config(&Config::default(), dataset)
        .await
        .unwrap();
    TestServer::new(create_router(state)).unwrap()
}

fn course_ids(body: &Value) -> Vec<String> {
    body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["course_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["snapshot_id"].is_string());
}

#[tokio::test]
async fn test_list_and_get_courses() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/courses").await;
    response.assert_status_ok();
    let courses: Vec<Value> = response.json();
    assert_eq!(courses.len(), 4);
    // first occurrence of 9366 carries rating 4.5, not the later 4.9
    assert_eq!(courses[0]["course_id"], "9366");
    assert_eq!(courses[0]["rating"], 4.5);

    let response = server.get("/api/v1/courses/7004").await;
    response.assert_status_ok();
    let course: Value = response.json();
    assert_eq!(course["course_name"], "Fundamentals of Machine Learning");
}

#[tokio::test]
async fn test_unknown_course_is_404() {
    let server = create_test_server().await;
    let response = server.get("/api/v1/courses/0000").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("0000"));
}

#[tokio::test]
async fn test_popular_recommendations() {
    let server = create_test_server().await;
    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "popular")
        .add_query_param("top_n", 2)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["strategy"], "popular");
    assert_eq!(course_ids(&body), vec!["9366", "7004"]);
    assert_eq!(body["recommendations"][0]["score"]["kind"], "enrollment");
    assert_eq!(body["recommendations"][0]["score"]["score"], 48245);
}

#[tokio::test]
async fn test_content_recommendations_exclude_anchor() {
    let server = create_test_server().await;
    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "content")
        .add_query_param("course_id", "9366")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let ids = course_ids(&body);
    assert_eq!(ids.len(), 3);
    assert!(!ids.contains(&"9366".to_string()));
    // shares "python" and the instructor with the anchor
    assert_eq!(ids[0], "5813");
}

#[tokio::test]
async fn test_hybrid_scores_are_bounded() {
    let server = create_test_server().await;
    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "hybrid")
        .add_query_param("user_id", "15796")
        .add_query_param("top_n", 3)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty() && recommendations.len() <= 3);
    for rec in recommendations {
        assert_eq!(rec["score"]["kind"], "hybrid");
        let score = rec["score"]["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
    }
}

#[tokio::test]
async fn test_unknown_user_is_empty_not_error() {
    let server = create_test_server().await;
    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "collaborative")
        .add_query_param("user_id", "99999")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "empty");
    assert_eq!(body["reason"]["reason"], "unknown_user");
    assert_eq!(body["reason"]["user_id"], "99999");
    assert!(body["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_requests_are_400() {
    let server = create_test_server().await;

    let missing_user = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "collaborative")
        .await;
    missing_user.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = missing_user.json();
    assert!(body["error"].as_str().unwrap().contains("user_id"));

    let bad_top_n = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "popular")
        .add_query_param("top_n", 0)
        .await;
    bad_top_n.assert_status(StatusCode::BAD_REQUEST);

    let bad_strategy = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "astrology")
        .await;
    bad_strategy.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = bad_strategy.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_export_round_trips() {
    let server = create_test_server().await;

    let json_response = server
        .get("/api/v1/recommendations")
        .add_query_param("strategy", "trending")
        .await;
    let body: Value = json_response.json();

    let response = server
        .get("/api/v1/recommendations/export")
        .add_query_param("strategy", "trending")
        .await;
    response.assert_status_ok();
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let csv = response.text();
    assert!(csv.starts_with("rank,course_id,course_name"));

    let reimported = export::from_csv(&csv).unwrap();
    let ids: Vec<String> = reimported
        .iter()
        .map(|r| r.course_id().to_string())
        .collect();
    assert_eq!(ids, course_ids(&body));
    for (rec, json) in reimported.iter().zip(body["recommendations"].as_array().unwrap()) {
        assert_eq!(rec.score.value(), json["score"]["score"].as_f64().unwrap());
    }
}

#[tokio::test]
async fn test_stats() {
    let server = create_test_server().await;
    let response = server.get("/api/v1/stats").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total_courses"], 4);
    assert_eq!(body["total_users"], 3);
    assert_eq!(body["total_ratings"], 6);
    assert_eq!(body["top_instructors"][0]["instructor"], "Emma Harris");
    // 9366 averages 4.7 over its two rows and ranks between 7004 and 5813
    assert_eq!(body["top_courses"][0]["course_name"], "Fundamentals of Machine Learning");
    assert_eq!(body["top_courses"][1]["course_name"], "Python for Beginners");
    assert_eq!(body["top_courses"][1]["interactions"], 2);
}

#[tokio::test]
async fn test_upload_swaps_snapshot() {
    let server = create_test_server().await;
    let before: Value = server.get("/health").await.json();

    let response = server.post("/api/v1/dataset").text(REPLACEMENT).await;
    response.assert_status_ok();
    let trained: Value = response.json();
    assert_eq!(trained["courses"], 2);
    assert_ne!(trained["snapshot_id"], before["snapshot_id"]);

    let after: Value = server.get("/health").await.json();
    assert_eq!(after["snapshot_id"], trained["snapshot_id"]);

    let courses: Vec<Value> = server.get("/api/v1/courses").await.json();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["course_id"], "100");
}

#[tokio::test]
async fn test_bad_upload_keeps_snapshot() {
    let server = create_test_server().await;
    let before: Value = server.get("/health").await.json();

    let response = server
        .post("/api/v1/dataset")
        .text("user_id,course_id\n1,100\n")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("course_name"));

    let after: Value = server.get("/health").await.json();
    assert_eq!(after["snapshot_id"], before["snapshot_id"]);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server().await;
    let id = "0b7c3a44-2f9e-4d41-9a57-8f1c2d3e4f50";

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}
