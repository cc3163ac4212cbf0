use crate::domain_model::{RequestHeaders, Token};

pub const BEARER: &str = "Bearer ";
pub const BASIC: &str = "Basic ";

/// Resolves the caller's token: `Authorization` first, then `Accept-Token`,
/// otherwise a freshly generated one. Never fails, never empty.
pub fn extract_token(headers: &RequestHeaders) -> Token {
    [&headers.authorization, &headers.accept_token]
        .into_iter()
        .flatten()
        .find_map(|value| Token::parse(strip_scheme(value)))
        .unwrap_or_else(Token::generate)
}

fn strip_scheme(value: &str) -> &str {
    value
        .strip_prefix(BEARER)
        .or_else(|| value.strip_prefix(BASIC))
        .unwrap_or(value)
}
