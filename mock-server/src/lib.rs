use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Host of the links the mock API hands out.
pub const LINK_DOMAIN: &str = "mock.app.link";

/// Body accepted by `POST /v1/url` and `PUT /v1/url`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkRequest {
    pub branch_key: String,
    #[serde(default)]
    pub branch_secret: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkReply {
    pub url: String,
}

#[derive(Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

pub type Db = Arc<RwLock<HashMap<String, LinkRequest>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/v1/url", post(create_link).put(update_link))
        .with_state(db)
}

/// A link API that answers every request with `502 Bad Gateway`.
pub fn unavailable_app() -> Router {
    Router::new().fallback(|| async { (StatusCode::BAD_GATEWAY, "Bad Gateway") })
}

/// Pick the router for a `MOCK_MODE` value: `unavailable` serves
/// `unavailable_app`, anything else (or unset) the working link API.
pub fn app_for_mode(mode: Option<&str>) -> Router {
    match mode {
        Some(mode) if mode.eq_ignore_ascii_case("unavailable") => unavailable_app(),
        _ => app(),
    }
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn create_link(
    State(db): State<Db>,
    Json(input): Json<LinkRequest>,
) -> Result<Json<LinkReply>, (StatusCode, Json<Value>)> {
    check_key(&input)?;
    let slug = match input.alias.as_deref() {
        Some(alias) if !alias.is_empty() => alias.to_string(),
        _ => Uuid::new_v4().simple().to_string()[..11].to_string(),
    };
    let url = format!("https://{LINK_DOMAIN}/{slug}");

    let mut links = db.write().await;
    if links.contains_key(&url) {
        return Err(api_error(StatusCode::CONFLICT, "alias already in use"));
    }
    links.insert(url.clone(), input);
    Ok(Json(LinkReply { url }))
}

async fn update_link(
    State(db): State<Db>,
    Query(query): Query<UrlQuery>,
    Json(input): Json<LinkRequest>,
) -> Result<Json<LinkReply>, (StatusCode, Json<Value>)> {
    check_key(&input)?;
    let mut links = db.write().await;
    let link = links
        .get_mut(&query.url)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "link not found"))?;
    *link = input;
    Ok(Json(LinkReply { url: query.url }))
}

fn check_key(input: &LinkRequest) -> Result<(), (StatusCode, Json<Value>)> {
    if input.branch_key.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "branch_key is required"));
    }
    Ok(())
}

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(serde_json::json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_request_collects_unknown_fields() {
        let input: LinkRequest = serde_json::from_str(
            r#"{"branch_key":"k","channel":"email","data":{"story_id":1}}"#,
        )
        .unwrap();
        assert_eq!(input.branch_key, "k");
        assert!(input.alias.is_none());
        assert_eq!(input.data["story_id"], 1);
        assert_eq!(input.rest["channel"], "email");
    }

    #[test]
    fn link_request_defaults_data() {
        let input: LinkRequest = serde_json::from_str(r#"{"branch_key":"k"}"#).unwrap();
        assert!(input.data.is_empty());
        assert!(input.branch_secret.is_none());
    }

    #[test]
    fn link_request_rejects_missing_key() {
        let result: Result<LinkRequest, _> = serde_json::from_str(r#"{"data":{}}"#);
        assert!(result.is_err());
    }
}
