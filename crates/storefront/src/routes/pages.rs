//! Shopify page route handlers.
//!
//! Page bodies are edited in the Shopify admin and rendered as HTML.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use super::DIRECTIONS_URL;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::shopify::Page;
use crate::state::AppState;

/// Contact details shown under the contact page body.
pub struct ContactDetails {
    pub email: &'static str,
    pub phone: &'static str,
    pub phone_href: &'static str,
    pub address: &'static str,
    pub directions_url: &'static str,
}

const CONTACT: ContactDetails = ContactDetails {
    email: "help@bienmiches.com",
    phone: "(831) 222-0622",
    phone_href: "tel:831-222-0622",
    address: "907 Cedar St, Santa Cruz, CA 95060",
    directions_url: DIRECTIONS_URL,
};

/// Page display data.
pub struct PageView {
    /// Heading, always the page's own title.
    pub title: String,
    /// Document `<title>`: the SEO title when one is set.
    pub document_title: String,
    pub body_html: String,
    pub seo_description: Option<String>,
}

impl From<Page> for PageView {
    fn from(page: Page) -> Self {
        Self {
            seo_description: page.seo.description.filter(|d| !d.is_empty()),
            document_title: page
                .seo
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| page.title.clone()),
            title: page.title,
            body_html: page.body,
        }
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
    pub page: PageView,
    pub contact: ContactDetails,
}

/// Generic page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/show.html")]
pub struct PageTemplate {
    pub ctx: PageContext,
    pub page: PageView,
}

/// Display the contact page.
#[instrument(skip(state, ctx))]
pub async fn contact(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let page = state
        .storefront()
        .get_page("contact")
        .await
        .map_err(AppError::from_lookup)?;

    Ok(ContactTemplate {
        ctx,
        page: PageView::from(page),
        contact: CONTACT,
    })
}

/// Display a Shopify page by handle.
#[instrument(skip(state, ctx), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse> {
    let page = state
        .storefront()
        .get_page(&handle)
        .await
        .map_err(AppError::from_lookup)?;

    Ok(PageTemplate {
        ctx,
        page: PageView::from(page),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::Seo;

    fn page(seo_title: Option<&str>) -> Page {
        Page {
            id: "gid://shopify/Page/1".to_string(),
            title: "Contact".to_string(),
            body: "<p>Hola</p>".to_string(),
            seo: Seo {
                title: seo_title.map(str::to_string),
                description: Some(String::new()),
            },
        }
    }

    #[test]
    fn test_page_view_seo_title_only_names_the_document() {
        let view = PageView::from(page(Some("Contact Bien Miches")));
        assert_eq!(view.title, "Contact");
        assert_eq!(view.document_title, "Contact Bien Miches");
        assert_eq!(view.body_html, "<p>Hola</p>");
        assert_eq!(view.seo_description, None);
    }

    #[test]
    fn test_page_view_document_title_falls_back_to_title() {
        let view = PageView::from(page(Some("")));
        assert_eq!(view.title, "Contact");
        assert_eq!(view.document_title, "Contact");
    }
}
