//! HTTP front-end over a [`Recommender`].
//!
//! Requests read the current snapshot through an `Arc`; `/reload` builds a new one on a
//! blocking thread and swaps it in, so in-flight queries finish on the old snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{App, HttpResponse, HttpServer, Responder, ResponseError, get, post, web};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::{CategoryCount, Recommendation, Recommender, SearchOptions};
use crate::error::Error;

pub struct AppState {
    recommender: RwLock<Arc<Recommender>>,
    config: Config,
}

impl AppState {
    pub fn new(recommender: Recommender, config: Config) -> Self {
        Self {
            recommender: RwLock::new(Arc::new(recommender)),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The snapshot queries should run against right now.
    pub fn current(&self) -> Arc<Recommender> {
        let guard = self.recommender.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, recommender: Recommender) {
        let next = Arc::new(recommender);
        let mut guard = self.recommender.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySearchRequest {
    pub category: String,
    #[serde(default)]
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryCount>,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Restaurant Recommender API")
}

#[post("/search")]
async fn search(
    request: web::Json<SearchRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let recommender = state.current();
    let options = SearchOptions {
        top_n: request.limit.unwrap_or(recommender.settings().default_top_n),
        min_rating: request.min_rating,
    };
    let recommendations = recommender.search_with(&request.query, &options)?;
    Ok(HttpResponse::Ok().json(SearchResponse { recommendations }))
}

#[post("/search_category")]
async fn search_category(
    request: web::Json<CategorySearchRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let recommender = state.current();
    let top_n = request.limit.unwrap_or(recommender.settings().default_top_n);
    let recommendations =
        recommender.recommend_in_category(&request.category, &request.query, top_n)?;
    Ok(HttpResponse::Ok().json(SearchResponse { recommendations }))
}

#[get("/categories")]
async fn categories(state: web::Data<AppState>) -> impl Responder {
    let counts = state.current().list_categories();
    HttpResponse::Ok().json(CategoriesResponse { categories: counts })
}

#[get("/stats")]
async fn stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.current().stats())
}

#[post("/reload")]
async fn reload(state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let config = state.config().clone();
    let recommender = tokio::task::spawn_blocking(move || Recommender::rebuild(&config))
        .await
        .map_err(|e| Error::Task(e.to_string()))??;

    let corpus_stats = recommender.stats();
    state.replace(recommender);
    info!("Reloaded corpus: {} restaurants", corpus_stats.restaurant_count);
    Ok(HttpResponse::Ok().json(corpus_stats))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(search)
        .service(search_category)
        .service(categories)
        .service(stats)
        .service(reload);
}

pub async fn run(state: web::Data<AppState>) -> std::io::Result<()> {
    let bind = state.config().server.bind.clone();
    info!("Starting HTTP server at http://{}", bind);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();
        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
