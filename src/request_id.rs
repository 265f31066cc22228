use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求上下文中的 request_id。
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_request_id(v: &str) -> bool {
    !v.is_empty()
        && v.len() <= 128
        && v.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
}

fn resolve_request_id(req: &Request) -> String {
    if let Some(raw) = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        && is_valid_request_id(raw)
    {
        return raw.to_string();
    }
    format!("req_{}", Uuid::new_v4().simple())
}

/// 全局 request_id 中间件：
/// - 优先透传客户端传入的 `X-Request-Id`，缺失或非法时服务端生成
/// - 在 `request` span 中处理请求，使该请求的所有日志都带上 request_id
/// - 回写到响应头，便于调用方与服务端日志对账
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&req);
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    let mut res = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    res
}

#[cfg(test)]
mod tests {
    use super::is_valid_request_id;

    #[test]
    fn request_id_validation_accepts_safe_chars() {
        assert!(is_valid_request_id("req-123_abc.def"));
    }

    #[test]
    fn request_id_validation_rejects_empty_and_unsafe_chars() {
        assert!(!is_valid_request_id(""));
        assert!(!is_valid_request_id("bad id"));
        assert!(!is_valid_request_id("bad/xx"));
        assert!(!is_valid_request_id(&"a".repeat(129)));
    }
}
