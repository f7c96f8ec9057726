use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    extract::{Json, Query},
    state::AppState,
};

#[derive(Debug, Clone, Serialize)]
pub struct NewsSource {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub source: NewsSource,
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub category: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub success: bool,
    pub source: &'static str,
    pub count: usize,
    pub news: Vec<NewsArticle>,
}

pub fn news_routes() -> Router<AppState> {
    Router::new().route("/news/cybersecurity", get(cybersecurity_news))
}

/// Static feed; publication times are relative to `now`.
pub fn mock_articles(now: OffsetDateTime) -> Vec<NewsArticle> {
    let source = NewsSource {
        id: "sebastopol",
        name: "Sebastopol Academy",
    };
    vec![
        NewsArticle {
            source: source.clone(),
            title: "Cybersecurity Training Reduces Phishing Success by 70%",
            description: "Recent studies show organizations with regular security training \
                          see significant improvement in threat detection.",
            url: "https://sebastopol.academy",
            published_at: now,
            category: "cybersecurity",
        },
        NewsArticle {
            source,
            title: "Ethiopian Banks Enhance Digital Security Infrastructure",
            description: "Financial institutions across Ethiopia are implementing advanced \
                          security protocols.",
            url: "https://sebastopol.academy",
            published_at: now - Duration::days(1),
            category: "cybersecurity",
        },
    ]
}

#[instrument(skip(_user))]
pub async fn cybersecurity_news(_user: AuthUser, Query(q): Query<NewsQuery>) -> Json<NewsResponse> {
    let mut news = mock_articles(OffsetDateTime::now_utc());
    news.truncate(q.limit);
    Json(NewsResponse {
        success: true,
        source: "mock",
        count: news.len(),
        news,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_are_newest_first() {
        let now = OffsetDateTime::now_utc();
        let articles = mock_articles(now);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].published_at, now);
        assert!(articles[1].published_at < articles[0].published_at);
    }

    #[test]
    fn article_serializes_with_camel_case_timestamp() {
        let article = mock_articles(OffsetDateTime::now_utc()).remove(0);
        let json = serde_json::to_value(&article).unwrap();
        assert!(json["publishedAt"].is_string());
        assert_eq!(json["source"]["name"], "Sebastopol Academy");
    }
}
