use std::fs;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::json;
use tempfile::TempDir;

use restaurant_recommender::server::{self, AppState, CategoriesResponse, SearchResponse};
use restaurant_recommender::{Config, CorpusStats, Recommender};

const CORPUS: &str = r#"[
    {"restaurant_name": "1. Adana Sofrası", "url": "u1", "rating": "4,5",
     "comments": ["Adana kebap harika", "Fiyatlar uygun"]},
    {"name": "Kervan Bistro", "url": "u2", "rating": 4.0, "reviews": []},
    {"name": "Mado", "link": "u3", "reviews": ["Dondurma harika"]}
]"#;

fn state(dir: &TempDir) -> web::Data<AppState> {
    let source = dir.path().join("restaurants.json");
    fs::write(&source, CORPUS).unwrap();

    let mut config = Config::default();
    config.data.source = source;
    config.data.snapshot = dir.path().join("snapshot.bin");

    let recommender = Recommender::from_config(&config).unwrap();
    web::Data::new(AppState::new(recommender, config))
}

#[actix_web::test]
async fn test_search_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(App::new().app_data(state(&dir)).configure(server::configure)).await;

    let req = test::TestRequest::post()
        .uri("/search")
        .set_json(json!({"query": "kebap", "limit": 3}))
        .to_request();
    let response: SearchResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(response.recommendations[0].name, "Adana Sofrası");
    assert_eq!(response.recommendations[0].rating, Some(4.5));
}

#[actix_web::test]
async fn test_search_rejects_zero_limit() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(App::new().app_data(state(&dir)).configure(server::configure)).await;

    let req = test::TestRequest::post()
        .uri("/search")
        .set_json(json!({"query": "kebap", "limit": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_search_category_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(App::new().app_data(state(&dir)).configure(server::configure)).await;

    let req = test::TestRequest::post()
        .uri("/search_category")
        .set_json(json!({"category": "dondurma"}))
        .to_request();
    let response: SearchResponse = test::call_and_read_body_json(&app, req).await;

    let mut names: Vec<&str> = response.recommendations.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Kervan Bistro", "Mado"]);
}

#[actix_web::test]
async fn test_categories_and_stats() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(App::new().app_data(state(&dir)).configure(server::configure)).await;

    let req = test::TestRequest::get().uri("/categories").to_request();
    let response: CategoriesResponse = test::call_and_read_body_json(&app, req).await;
    assert!(response.categories.iter().any(|c| c.category == "kebap" && c.count == 1));

    let req = test::TestRequest::get().uri("/stats").to_request();
    let stats: CorpusStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.restaurant_count, 3);
    assert_eq!(stats.reviewed_count, 2);
}

#[actix_web::test]
async fn test_reload_swaps_in_new_corpus() {
    let dir = TempDir::new().unwrap();
    let state = state(&dir);
    let app = test::init_service(App::new().app_data(state.clone()).configure(server::configure)).await;

    fs::write(
        dir.path().join("restaurants.json"),
        r#"[{"name": "Tantuni Evi", "url": "u9", "reviews": ["Tantuni çok iyi"]}]"#,
    )
    .unwrap();

    let req = test::TestRequest::post().uri("/reload").to_request();
    let stats: CorpusStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.restaurant_count, 1);

    let req = test::TestRequest::post()
        .uri("/search")
        .set_json(json!({"query": "tantuni"}))
        .to_request();
    let response: SearchResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(response.recommendations.len(), 1);
    assert_eq!(response.recommendations[0].name, "Tantuni Evi");
    assert_eq!(state.current().stats().restaurant_count, 1);
}
