use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
/// The scanner form: job description, PDF upload, results table and CSV link.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
