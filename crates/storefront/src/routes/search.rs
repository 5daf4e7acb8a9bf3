//! Product search.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use super::ProductCardView;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Maximum number of results shown.
const SEARCH_RESULTS_LIMIT: i64 = 24;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub ctx: PageContext,
    pub query: String,
    pub products: Vec<ProductCardView>,
    pub searched: bool,
    pub error: Option<String>,
}

/// Display search results. An empty query shows the empty form.
#[instrument(skip(state, ctx, params))]
pub async fn search(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default().trim().to_string();

    if query.is_empty() {
        return SearchTemplate {
            ctx,
            query,
            products: Vec::new(),
            searched: false,
            error: None,
        };
    }

    let (products, error) = match state
        .storefront()
        .search_products(&query, SEARCH_RESULTS_LIMIT)
        .await
    {
        Ok(products) => (products.iter().map(ProductCardView::from).collect(), None),
        Err(e) => {
            tracing::error!(error = %e, query = %query, "Product search failed");
            (Vec::new(), Some("Search is unavailable right now.".to_string()))
        }
    };

    SearchTemplate {
        ctx,
        query,
        products,
        searched: true,
        error,
    }
}
