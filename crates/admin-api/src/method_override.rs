use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

const OVERRIDE_HEADER: &str = "x-http-method-override";

// Bodies here are small JSON forms; anything bigger is not ours.
const BODY_LIMIT: usize = 1 << 20;

/// Legacy dashboard forms can only POST; they tunnel the real verb through
/// the `X-HTTP-Method-Override` header, a `_method` query parameter, or a
/// `_method` field in the JSON body.
pub async fn middleware(request: Request, next: Next) -> Response {
    let request = match rewrite(request).await {
        Ok(request) => request,
        Err(response) => return response,
    };
    next.run(request).await
}

async fn rewrite(mut request: Request) -> Result<Request, Response> {
    if request.method() != Method::POST {
        return Ok(request);
    }
    if let Some(method) = effective_method(request.headers(), request.uri()) {
        *request.method_mut() = method;
        return Ok(request);
    }
    if !is_json(request.headers()) {
        return Ok(request);
    }
    // The body fallback has to buffer; the bytes are handed back untouched
    // so the extractors downstream still see the full payload.
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => return Err(StatusCode::BAD_REQUEST.into_response()),
    };
    let method = body_method(&bytes);
    let mut request = Request::from_parts(parts, Body::from(bytes));
    if let Some(method) = method {
        *request.method_mut() = method;
    }
    Ok(request)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false)
}

fn effective_method(headers: &HeaderMap, uri: &Uri) -> Option<Method> {
    headers
        .get(OVERRIDE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| query_method(uri))
        .as_deref()
        .and_then(parse_method)
}

fn query_method(uri: &Uri) -> Option<String> {
    uri.query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "_method")
        .map(|(_, value)| value.to_string())
}

fn body_method(bytes: &[u8]) -> Option<Method> {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()?
        .get("_method")?
        .as_str()
        .and_then(parse_method)
}

fn parse_method(requested: &str) -> Option<Method> {
    match requested.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "DELETE" => Some(Method::DELETE),
        "PATCH" => Some(Method::PATCH),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_override_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(OVERRIDE_HEADER, "delete".parse().unwrap());
        let uri: Uri = "/classes/abc?_method=PUT".parse().unwrap();
        assert_eq!(effective_method(&headers, &uri), Some(Method::DELETE));
    }

    #[test]
    fn query_override_applies() {
        let uri: Uri = "/classes/abc?_method=put".parse().unwrap();
        assert_eq!(effective_method(&HeaderMap::new(), &uri), Some(Method::PUT));
    }

    #[test]
    fn body_override_applies() {
        let body = br#"{"_method": "delete", "status": "paid"}"#;
        assert_eq!(body_method(body), Some(Method::DELETE));
    }

    #[test]
    fn body_without_override_is_untouched() {
        assert_eq!(body_method(br#"{"status": "paid"}"#), None);
        assert_eq!(body_method(b"not json"), None);
    }

    #[test]
    fn unknown_verbs_are_ignored() {
        let uri: Uri = "/classes/abc?_method=TRACE".parse().unwrap();
        assert_eq!(effective_method(&HeaderMap::new(), &uri), None);
        assert_eq!(
            effective_method(&HeaderMap::new(), &"/classes".parse().unwrap()),
            None
        );
        assert_eq!(body_method(br#"{"_method": "TRACE"}"#), None);
    }
}
