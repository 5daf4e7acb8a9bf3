//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use super::{ImageView, ProductCardView};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::shopify::CollectionSummary;
use crate::state::AppState;

/// Items per page for collection listings and grids.
const PAGE_SIZE: i64 = 12;

/// Collection display data for templates.
#[derive(Clone)]
pub struct CollectionView {
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<ImageView>,
}

impl From<&CollectionSummary> for CollectionView {
    fn from(collection: &CollectionSummary) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            description: Some(collection.description.clone()).filter(|d| !d.is_empty()),
            image: collection
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &collection.title)),
        }
    }
}

/// Cursor pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct CursorQuery {
    pub after: Option<String>,
}

impl CursorQuery {
    fn cursor(self) -> Option<String> {
        self.after.filter(|cursor| !cursor.is_empty())
    }
}

/// Collection listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub ctx: PageContext,
    pub collections: Vec<CollectionView>,
    pub next_cursor: Option<String>,
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub ctx: PageContext,
    pub collection: CollectionView,
    pub description_html: String,
    pub products: Vec<ProductCardView>,
    pub next_cursor: Option<String>,
}

/// Display collection listing page.
#[instrument(skip(state, ctx, query))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<CursorQuery>,
) -> impl IntoResponse {
    let (collections, next_cursor) = match state
        .storefront()
        .get_collections(PAGE_SIZE, query.cursor())
        .await
    {
        Ok(list) => (
            list.collections.iter().map(CollectionView::from).collect(),
            list.page_info.next_cursor().map(str::to_string),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch collections");
            (Vec::new(), None)
        }
    };

    CollectionsIndexTemplate {
        ctx,
        collections,
        next_cursor,
    }
}

/// Display collection detail page with products.
#[instrument(skip(state, ctx, query), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(handle): Path<String>,
    Query(query): Query<CursorQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .storefront()
        .get_collection(&handle, PAGE_SIZE, query.cursor())
        .await
        .map_err(AppError::from_lookup)?;

    Ok(CollectionShowTemplate {
        ctx,
        collection: CollectionView::from(&page.collection),
        description_html: page.description_html.clone(),
        products: page.products.iter().map(ProductCardView::from).collect(),
        next_cursor: page.page_info.next_cursor().map(str::to_string),
    })
}
