use actix_web::{get, web, HttpResponse};
use tracing::info;

use crate::state::AppState;
use crate::types::{ApiError, SearchQuery, SearchResponse};

#[get("/search")]
pub async fn search(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let top_k = query.top_k.unwrap_or(state.config.default_top_k);

    let results = state.engine.search(&query.q, top_k).await?;
    info!("Search '{}' returned {} results", query.q.trim(), results.len());

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: query.q.clone(),
        count: results.len(),
        results,
    }))
}

#[get("/search/stats")]
pub async fn search_stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.engine.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::configure;
    use crate::types::ErrorResponse;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use semsearch_common::{AppConfig, Result};
    use semsearch_embed::Embedder;
    use semsearch_vector::{Corpus, IndexStats, SearchEngine};
    use std::sync::Arc;

    /// Maps texts onto two axes: "rain" and "sun"
    struct WeatherEmbedder;

    #[async_trait]
    impl Embedder for WeatherEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let rain = t.matches("rain").count() as f32;
                    let sun = t.matches("sun").count() as f32;
                    let norm = (rain * rain + sun * sun).sqrt().max(f32::EPSILON);
                    vec![rain / norm, sun / norm]
                })
                .collect())
        }

        fn model(&self) -> &str {
            "weather-test"
        }
    }

    const CORPUS: &str = r#"{"text": "rain all day"}
{"text": "sun and rain"}
{"text": "sun sun sun"}
"#;

    async fn state() -> web::Data<AppState> {
        let engine = SearchEngine::build(Corpus::parse(CORPUS, "text"), Arc::new(WeatherEmbedder))
            .await
            .unwrap();
        let mut config = AppConfig::default();
        config.default_top_k = 2;
        web::Data::new(AppState::new(config, Arc::new(engine)))
    }

    #[actix_web::test]
    async fn test_search_returns_ranked_results() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get().uri("/search?q=rain&top_k=3").to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.query, "rain");
        assert_eq!(body.count, 3);
        let ids: Vec<_> = body.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(body.results[0].text, "rain all day");
    }

    #[actix_web::test]
    async fn test_search_uses_default_top_k() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get().uri("/search?q=sun").to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.count, 2);
        assert_eq!(body.results[0].id, 2);
    }

    #[actix_web::test]
    async fn test_search_errors_are_bad_requests() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get().uri("/search?q=%20%20").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);

        let req = test::TestRequest::get().uri("/search?q=rain&top_k=0").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.contains("invalid k"));

        let req = test::TestRequest::get().uri("/search").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn test_search_stats() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get().uri("/search/stats").to_request();
        let stats: IndexStats = test::call_and_read_body_json(&app, req).await;

        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.dimension, 2);
        assert_eq!(stats.embedding_model, "weather-test");
    }
}
