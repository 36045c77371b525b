//! Markdown page route handlers.
//!
//! Serves the marketing pages (pricing, docs, features, terms) loaded into
//! the content store at startup.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use crate::content::Page;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Markdown page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/page.html")]
pub struct PageTemplate {
    pub page: Page,
}

/// Display a markdown page by slug.
///
/// # Route
///
/// `GET /pages/{slug}`
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<PageTemplate> {
    let page = state
        .content()
        .get_page(&slug)
        .ok_or_else(|| AppError::NotFound(slug))?
        .clone();

    Ok(PageTemplate { page })
}
