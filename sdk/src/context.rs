use axum::http::{request::Parts, Extensions, HeaderMap, Method, Uri};

/// Request metadata handed to handler implementations alongside the decoded
/// input message.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub extensions: Extensions,
}

impl Context {
    pub fn from_parts(parts: Parts) -> Self {
        Context {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            extensions: parts.extensions,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Values inserted by middleware, e.g. an authenticated principal.
    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[derive(Debug, Clone, PartialEq)]
    struct UserId(u64);

    #[test]
    fn test_from_parts() {
        let mut request = Request::builder()
            .method("DELETE")
            .uri("/v1/users/7?hard=true")
            .header("x-request-id", "abc")
            .body(())
            .unwrap();
        request.extensions_mut().insert(UserId(7));

        let ctx = Context::from_parts(request.into_parts().0);
        assert_eq!(ctx.method, Method::DELETE);
        assert_eq!(ctx.uri.path(), "/v1/users/7");
        assert_eq!(ctx.header("x-request-id"), Some("abc"));
        assert_eq!(ctx.header("missing"), None);
        assert_eq!(ctx.extension::<UserId>(), Some(&UserId(7)));
    }
}
