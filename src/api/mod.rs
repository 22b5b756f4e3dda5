use crate::models::Item;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Shown when a failed response carries no usable `message` field.
pub(crate) const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong, please try again.";

// Server paths. The per-item mutation URL comes from the item's own
// `data-href`, so it never appears here.
const INTRO_PAGE_PATH: &str = "/intro";
const APP_PAGE_PATH: &str = "/app";
const NEW_ITEM_PATH: &str = "/item/new";
const CLEAR_COMPLETED_PATH: &str = "/item/clear";
const LOGIN_PATH: &str = "/login";
const LOGOUT_PATH: &str = "/logout";
const REGISTER_PATH: &str = "/register";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    /// Every failed response funnels through here: take the JSON
    /// `message` if the body has one, else the generic default.
    fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let kind = if status.as_u16() == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Http
        };
        Self {
            kind,
            message: extract_message(body).unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub csrf_token: Option<String>,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut cfg = Self {
            api_url: "http://localhost:5000".to_string(),
            csrf_token: None,
        };

        // Deployment injects `window.ENV = { API_URL, CSRF_TOKEN }`.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Ok(v) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(s) = v.as_string() {
                            cfg.api_url = s;
                        }
                    }
                    if let Ok(v) = js_sys::Reflect::get(&env, &"CSRF_TOKEN".into()) {
                        if let Some(s) = v.as_string() {
                            cfg.csrf_token = Some(s);
                        }
                    }
                }
            }
        }

        cfg
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ItemBody {
    pub body: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct MessageResponse {
    pub message: String,
}

/// Create returns the server-rendered item fragment alongside the
/// feedback message; the fragment is parsed client-side into an
/// [`Item`](crate::models::Item).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreatedItemResponse {
    pub message: String,
    pub html: String,
}

/// Demo-account registration hands back ready-to-use credentials.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct RegisterResponse {
    pub username: String,
    pub password: String,
    pub message: String,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) csrf_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            csrf_token: None,
        }
    }

    pub fn from_env() -> Self {
        let cfg = EnvConfig::new();
        Self {
            base_url: cfg.api_url,
            csrf_token: cfg.csrf_token,
        }
    }

    pub(crate) fn is_mutating(method: &Method) -> bool {
        !matches!(
            *method,
            Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
        )
    }

    fn with_csrf_header(&self, method: &Method, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if Self::is_mutating(method) {
            if let Some(token) = &self.csrf_token {
                return req.header("X-CSRFToken", token);
            }
        }
        req
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method.clone(), url);
        req = self.with_csrf_header(&method, req);

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::from_response(status, &body))
        }
    }

    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let res = self.send(method, path, body).await?;
        res.json().await.map_err(ApiError::parse)
    }

    async fn request_fragment(&self, path: &str) -> ApiResult<String> {
        let res = self
            .send(Method::GET, path, None::<&serde_json::Value>)
            .await?;
        res.text().await.map_err(ApiError::parse)
    }

    pub async fn intro_fragment(&self) -> ApiResult<String> {
        self.request_fragment(INTRO_PAGE_PATH).await
    }

    pub async fn app_fragment(&self) -> ApiResult<String> {
        self.request_fragment(APP_PAGE_PATH).await
    }

    pub async fn new_item(&self, body: &str) -> ApiResult<CreatedItemResponse> {
        self.request_json(
            Method::POST,
            NEW_ITEM_PATH,
            Some(&ItemBody {
                body: body.to_string(),
            }),
        )
        .await
    }

    pub async fn edit_item(&self, href: &str, body: &str) -> ApiResult<MessageResponse> {
        self.request_json(
            Method::PUT,
            href,
            Some(&ItemBody {
                body: body.to_string(),
            }),
        )
        .await
    }

    pub async fn toggle_item(&self, href: &str) -> ApiResult<MessageResponse> {
        self.request_json(Method::PATCH, href, None::<&serde_json::Value>)
            .await
    }

    pub async fn delete_item(&self, href: &str) -> ApiResult<MessageResponse> {
        self.request_json(Method::DELETE, href, None::<&serde_json::Value>)
            .await
    }

    pub async fn clear_completed(&self) -> ApiResult<MessageResponse> {
        self.request_json(Method::DELETE, CLEAR_COMPLETED_PATH, None::<&serde_json::Value>)
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<MessageResponse> {
        self.request_json(
            Method::POST,
            LOGIN_PATH,
            Some(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    pub async fn logout(&self) -> ApiResult<MessageResponse> {
        self.request_json(Method::GET, LOGOUT_PATH, None::<&serde_json::Value>)
            .await
    }

    pub async fn register(&self) -> ApiResult<RegisterResponse> {
        self.request_json(Method::GET, REGISTER_PATH, None::<&serde_json::Value>)
            .await
    }
}

fn read_attr_value(rest: &str) -> String {
    match rest.chars().next() {
        Some(q @ ('"' | '\'')) => rest[1..].split(q).next().unwrap_or("").to_string(),
        _ => rest
            .split(|c: char| c.is_whitespace() || c == '>')
            .next()
            .unwrap_or("")
            .to_string(),
    }
}

/// Find an attribute value in a markup fragment. Quoted and bare
/// values are both accepted; `id=` must sit on a word boundary so it
/// does not match inside `data-id=`.
fn find_attr(html: &str, name: &str) -> Option<String> {
    let bytes = html.as_bytes();
    let pat = format!("{name}=");
    let mut start = 0;

    while let Some(pos) = html[start..].find(&pat) {
        let at = start + pos;
        let boundary_ok = at == 0 || {
            let prev = bytes[at - 1];
            !prev.is_ascii_alphanumeric() && prev != b'-' && prev != b'_'
        };
        if !boundary_ok {
            start = at + pat.len();
            continue;
        }
        return Some(read_attr_value(&html[at + pat.len()..]));
    }

    None
}

fn text_content(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The fragment renders the body in a dedicated node, e.g.
/// `<span id="body7">…</span>`. Falling back to the whole fragment's
/// text keeps minimal markup (`<li id=1>Buy milk</li>`) working.
fn body_text(html: &str, id: u64) -> String {
    for marker in [
        format!("id=\"body{id}\""),
        format!("id='body{id}'"),
        format!("id=body{id}"),
    ] {
        if let Some(at) = html.find(&marker) {
            if let Some(gt) = html[at..].find('>') {
                let rest = &html[at + gt + 1..];
                let text = rest.split('<').next().unwrap_or("").trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    text_content(html)
}

/// Parse one server-rendered item fragment.
///
/// The canonical shape carries `data-id`/`data-done`/`data-href`;
/// a bare `id=` attribute is accepted defensively. Returns `None`
/// when no usable id is present.
pub(crate) fn parse_item_fragment(html: &str) -> Option<Item> {
    let id = find_attr(html, "data-id")
        .or_else(|| find_attr(html, "id"))?
        .trim()
        .parse::<u64>()
        .ok()?;

    // Jinja renders booleans capitalized, so compare case-insensitively.
    let done = find_attr(html, "data-done")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let href = find_attr(html, "data-href").unwrap_or_else(|| format!("/item/{id}"));

    Some(Item {
        id,
        body: body_text(html, id),
        done,
        href,
    })
}

/// Pull every item node out of the app view fragment. Only `<li>`
/// chunks carrying a `data-id` count; the fragment also contains
/// filter-tab `<li>`s that must not become items.
pub(crate) fn parse_item_fragments(html: &str) -> Vec<Item> {
    let mut out = Vec::new();
    let mut start = 0;

    while let Some(pos) = html[start..].find("<li") {
        let at = start + pos;
        let end = match html[at..].find("</li>") {
            Some(e) => at + e + "</li>".len(),
            None => html.len(),
        };

        let chunk = &html[at..end];
        if find_attr(chunk, "data-id").is_some() {
            if let Some(item) = parse_item_fragment(chunk) {
                out.push(item);
            }
        }

        start = end;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_item_response_contract_deserialize() {
        let json = r#"{"message": "+1", "html": "<li class=\"item\" data-id=\"7\">x</li>"}"#;
        let parsed: CreatedItemResponse =
            serde_json::from_str(json).expect("created response should parse");
        assert_eq!(parsed.message, "+1");
        assert!(parsed.html.contains("data-id"));
    }

    #[test]
    fn register_response_contract_deserialize() {
        let json = r#"{"username": "grace", "password": "hopper", "message": "Account ready."}"#;
        let parsed: RegisterResponse =
            serde_json::from_str(json).expect("register response should parse");
        assert_eq!(parsed.username, "grace");
        assert_eq!(parsed.password, "hopper");
    }

    #[test]
    fn login_request_serializes_both_fields() {
        let req = LoginRequest {
            username: "grace".to_string(),
            password: "hopper".to_string(),
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["username"], "grace");
        assert_eq!(v["password"], "hopper");
    }

    #[test]
    fn item_body_serializes_as_body_key() {
        let v = serde_json::to_value(ItemBody {
            body: "Buy milk".to_string(),
        })
        .expect("should serialize");
        assert_eq!(v, serde_json::json!({"body": "Buy milk"}));
    }

    #[test]
    fn extract_message_reads_json_message() {
        assert_eq!(
            extract_message(r#"{"message": "Unauthorized"}"#).as_deref(),
            Some("Unauthorized")
        );
    }

    #[test]
    fn extract_message_rejects_non_json_and_missing_field() {
        assert_eq!(extract_message("<html>502</html>"), None);
        assert_eq!(extract_message(r#"{"error": "nope"}"#), None);
    }

    #[test]
    fn error_falls_back_to_default_message() {
        let e = ApiError::from_response(reqwest::StatusCode::BAD_GATEWAY, "<html>502</html>");
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(e.message, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn error_keeps_server_message_verbatim() {
        let e = ApiError::from_response(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"message": "Unauthorized"}"#,
        );
        assert_eq!(e.kind, ApiErrorKind::Unauthorized);
        assert_eq!(e.message, "Unauthorized");
    }

    #[test]
    fn mutating_methods_get_the_csrf_header() {
        assert!(ApiClient::is_mutating(&Method::POST));
        assert!(ApiClient::is_mutating(&Method::PUT));
        assert!(ApiClient::is_mutating(&Method::PATCH));
        assert!(ApiClient::is_mutating(&Method::DELETE));
        assert!(!ApiClient::is_mutating(&Method::GET));
        assert!(!ApiClient::is_mutating(&Method::HEAD));
        assert!(!ApiClient::is_mutating(&Method::OPTIONS));
        assert!(!ApiClient::is_mutating(&Method::TRACE));
    }

    #[test]
    fn parse_item_fragment_canonical_shape() {
        let html = r#"
            <li class="item" data-id="7" data-done="False" data-href="/item/7">
              <span class="done-btn"><i>check_box_outline_blank</i></span>
              <span class="active-item" id="body7">Buy milk</span>
            </li>"#;

        let item = parse_item_fragment(html).expect("fragment should parse");
        assert_eq!(item.id, 7);
        assert_eq!(item.body, "Buy milk");
        assert!(!item.done);
        assert_eq!(item.href, "/item/7");
    }

    #[test]
    fn parse_item_fragment_capitalized_done() {
        let html = r#"<li class="item" data-id="3" data-done="True" data-href="/item/3"><span id="body3">Ship it</span></li>"#;
        let item = parse_item_fragment(html).expect("fragment should parse");
        assert!(item.done);
    }

    #[test]
    fn parse_item_fragment_minimal_shape() {
        // Bare `id=`, no data attributes at all.
        let item = parse_item_fragment("<li id=1 class=item>Buy milk</li>")
            .expect("minimal fragment should parse");
        assert_eq!(item.id, 1);
        assert_eq!(item.body, "Buy milk");
        assert!(!item.done);
        assert_eq!(item.href, "/item/1");
    }

    #[test]
    fn parse_item_fragment_without_id_is_none() {
        assert!(parse_item_fragment("<li class=\"item\">no id here</li>").is_none());
        assert!(parse_item_fragment("<li data-id=\"abc\">bad id</li>").is_none());
    }

    #[test]
    fn parse_item_fragments_skips_non_item_lis() {
        let html = r#"
            <ul class="tabs">
              <li class="tab"><a id="all-item">All</a></li>
              <li class="tab"><a id="active-item">Active</a></li>
            </ul>
            <ul class="items">
              <li class="item" data-id="1" data-done="False" data-href="/item/1"><span id="body1">One</span></li>
              <li class="item" data-id="2" data-done="True" data-href="/item/2"><span id="body2">Two</span></li>
            </ul>"#;

        let items = parse_item_fragments(html);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].body, "One");
        assert!(items[1].done);
    }

    #[test]
    fn parse_item_fragments_empty_view() {
        assert!(parse_item_fragments("<ul class=\"items\"></ul>").is_empty());
    }
}
