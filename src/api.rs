use std::fmt::Write as _;

use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use html_escape::encode_text;
use tower_http::cors::CorsLayer;

use crate::model::{AggregateState, SiteStatus};
use crate::status::{RefreshAck, StatusFacade};

pub fn router(facade: StatusFacade) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(|| async { "ok" }))
        .route("/api/status", get(api_status))
        .route("/api/refresh", get(api_refresh).post(api_refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(facade)
}

async fn api_status(State(facade): State<StatusFacade>) -> Json<AggregateState> {
    Json(facade.get_status())
}

async fn api_refresh(State(facade): State<StatusFacade>) -> Json<RefreshAck> {
    Json(facade.request_refresh())
}

async fn dashboard(State(facade): State<StatusFacade>) -> Html<String> {
    Html(render_dashboard(&facade.get_status()))
}

/// Plain server-rendered status page. All dynamic text is escaped.
pub fn render_dashboard(state: &AggregateState) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Stock Tracker</title></head><body>",
    );
    out.push_str("<h1>Stock Tracker</h1>");

    let last = state
        .last_sweep_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    let _ = write!(out, "<p>Last sweep: {}</p>", encode_text(&last));

    out.push_str("<h2>Sites</h2><table><tr><th>Site</th><th>Status</th><th>Products</th><th>Last checked</th></tr>");
    for rec in state.site_records.values() {
        let status = match rec.status {
            SiteStatus::Ok => "ok",
            SiteStatus::Error => "error",
        };
        let _ = write!(
            out,
            "<tr><td><a href=\"{url}\">{name}</a></td><td>{status}</td><td>{count}</td><td>{checked}</td></tr>",
            url = html_escape::encode_double_quoted_attribute(&rec.url),
            name = encode_text(&rec.name),
            count = rec.product_count,
            checked = rec.last_checked_at.to_rfc3339(),
        );
    }
    out.push_str("</table>");

    out.push_str("<h2>Recent changes</h2><ul>");
    for ev in &state.change_log {
        let _ = write!(
            out,
            "<li><strong>{}</strong> {}: {}</li>",
            encode_text(&ev.name),
            ev.timestamp.to_rfc3339(),
            encode_text(&ev.change_descriptions.join(", ")),
        );
    }
    out.push_str("</ul></body></html>");
    out
}
