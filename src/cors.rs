use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// 配置列表的解析结果：是否包含通配符 "*"，以及其余合法条目。
struct ParsedList<T> {
    any: bool,
    items: Vec<T>,
}

/// 解析配置列表：跳过空白项，识别 "*"，非法值告警后丢弃。
fn parse_list<T>(
    label: &str,
    values: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> ParsedList<T> {
    let mut parsed = ParsedList {
        any: false,
        items: Vec::new(),
    };
    for raw in values {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        if value == "*" {
            parsed.any = true;
            continue;
        }
        match parse(value) {
            Some(v) => parsed.items.push(v),
            None => tracing::warn!("CORS {} 含无效值: {}", label, value),
        }
    }
    parsed
}

fn parse_origin(v: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(v).ok()
}

fn parse_method(v: &str) -> Option<Method> {
    Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
}

fn parse_header(v: &str) -> Option<HeaderName> {
    HeaderName::from_bytes(v.to_ascii_lowercase().as_bytes()).ok()
}

/// 根据配置构建 CORS 中间件；未启用或配置无效时返回 None。
pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if !cors.enabled {
        return None;
    }

    let origins = parse_list("allowed_origins", &cors.allowed_origins, parse_origin);
    if !origins.any && origins.items.is_empty() {
        tracing::warn!("CORS 已启用但 allowed_origins 为空，已跳过启用");
        return None;
    }
    let methods = parse_list("allowed_methods", &cors.allowed_methods, parse_method);
    let headers = parse_list("allowed_headers", &cors.allowed_headers, parse_header);
    let expose = parse_list("expose_headers", &cors.expose_headers, parse_header);

    if cors.allow_credentials && (origins.any || methods.any || headers.any || expose.any) {
        tracing::error!("CORS 配置无效：allow_credentials=true 不能与 \"*\" 同时使用，已跳过启用");
        return None;
    }

    let mut layer = CorsLayer::new();

    layer = if origins.any {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins.items)
    };

    if methods.any {
        layer = layer.allow_methods(Any);
    } else if !methods.items.is_empty() {
        layer = layer.allow_methods(methods.items);
    }

    if headers.any {
        layer = layer.allow_headers(Any);
    } else if !headers.items.is_empty() {
        layer = layer.allow_headers(headers.items);
    }

    if expose.any {
        layer = layer.expose_headers(Any);
    } else if !expose.items.is_empty() {
        layer = layer.expose_headers(expose.items);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(secs) = cors.max_age_secs
        && secs > 0
    {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::{build_cors_layer, parse_list, parse_method};
    use crate::config::CorsConfig;
    use axum::http::Method;

    #[test]
    fn build_cors_layer_skips_when_disabled_or_origins_empty() {
        let disabled = CorsConfig {
            enabled: false,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&disabled).is_none());

        let empty = CorsConfig {
            allowed_origins: Vec::new(),
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&empty).is_none());
    }

    #[test]
    fn build_cors_layer_rejects_credentials_with_wildcard() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn default_config_builds_a_layer() {
        assert!(build_cors_layer(&CorsConfig::default()).is_some());
    }

    #[test]
    fn parse_methods_normalizes_case_and_detects_wildcard() {
        let input = vec!["get".to_string(), " POST ".to_string(), "*".to_string()];
        let parsed = parse_list("allowed_methods", &input, parse_method);
        assert!(parsed.any);
        assert_eq!(parsed.items, vec![Method::GET, Method::POST]);
    }
}
