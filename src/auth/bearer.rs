/// Bearer token extraction from the `Authorization` header.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Pull the raw token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-sensitively and the token is returned as-is.
///
/// # Errors
/// - `MissingHeader` if the header is absent or empty
/// - `MalformedHeader` if it is not valid text, has fewer than two fields,
///   or the first field is not `Bearer`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = match headers.get(AUTHORIZATION) {
        None => return Err(AuthError::MissingHeader),
        Some(value) if value.is_empty() => return Err(AuthError::MissingHeader),
        Some(value) => value.to_str().map_err(|_| AuthError::MalformedHeader)?,
    };

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(BEARER_SCHEME), Some(token)) => Ok(token.to_string()),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_valid_bearer() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn test_token_returned_verbatim() {
        let token = extract_bearer_token(&headers_with("Bearer eyJ.a-b_c.d==")).unwrap();
        assert_eq!(token, "eyJ.a-b_c.d==");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingHeader)
        );
    }

    #[test]
    fn test_empty_header() {
        assert_eq!(
            extract_bearer_token(&headers_with("")),
            Err(AuthError::MissingHeader)
        );
    }

    #[test]
    fn test_malformed_headers() {
        let cases = ["abc", "Bearer", "bearer abc", "Basic abc", "   "];
        for case in cases {
            assert_eq!(
                extract_bearer_token(&headers_with(case)),
                Err(AuthError::MalformedHeader),
                "header: {:?}",
                case
            );
        }
    }

    #[test]
    fn test_non_ascii_header_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert_eq!(extract_bearer_token(&headers), Err(AuthError::MalformedHeader));
    }
}
