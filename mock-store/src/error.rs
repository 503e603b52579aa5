use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

/// An error rendered the way Elasticsearch renders them:
/// `{"error": {"root_cause": [...], "type": ..., "reason": ...}, "status": n}`.
#[derive(Debug, Clone, PartialEq)]
pub struct EsError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub reason: String,
    pub index: Option<String>,
}

impl EsError {
    pub fn new(status: StatusCode, kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            reason: reason.into(),
            index: None,
        }
    }

    pub fn index_not_found(index: &str) -> Self {
        Self {
            index: Some(index.to_string()),
            ..Self::new(
                StatusCode::NOT_FOUND,
                "index_not_found_exception",
                format!("no such index [{index}]"),
            )
        }
    }

    pub fn parsing(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "parsing_exception", reason)
    }

    pub fn script(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "script_exception", reason)
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "action_request_validation_exception",
            format!("Validation Failed: 1: {};", reason.into()),
        )
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "security_exception", reason)
    }

    fn detail(&self) -> Map<String, Value> {
        let mut detail = Map::new();
        self.fill(&mut detail);
        detail
    }

    fn fill(&self, detail: &mut Map<String, Value>) {
        detail.insert("type".into(), json!(self.kind));
        detail.insert("reason".into(), json!(self.reason));
        if let Some(index) = &self.index {
            detail.insert("index".into(), json!(index));
        }
    }

    pub fn body(&self) -> Value {
        let mut error = Map::new();
        error.insert("root_cause".into(), json!([self.detail()]));
        self.fill(&mut error);
        json!({ "error": error, "status": self.status.as_u16() })
    }
}

impl IntoResponse for EsError {
    fn into_response(self) -> Response {
        let body = Json(self.body());
        if self.status == StatusCode::UNAUTHORIZED {
            let challenge = [(
                header::WWW_AUTHENTICATE,
                r#"Basic realm="security" charset="UTF-8""#,
            )];
            return (self.status, challenge, body).into_response();
        }
        (self.status, body).into_response()
    }
}
