//! Authentication handling for the YouTrack API.
//!
//! YouTrack uses permanent tokens sent as a bearer `Authorization` header on
//! every request.

use std::fmt;

/// A permanent YouTrack token.
///
/// The complete header value is built once; the raw token never appears in
/// `Debug` output.
#[derive(Clone)]
pub struct Token {
    header_value: String,
}

impl Token {
    /// Wraps a permanent token.
    pub fn new(token: &str) -> Self {
        Self {
            header_value: format!("Bearer {token}"),
        }
    }

    /// The complete `Authorization` header value (`Bearer ...`).
    pub fn header_value(&self) -> &str {
        &self.header_value
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token").field("token", &"***").finish()
    }
}

impl From<&str> for Token {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Token {
    fn from(token: String) -> Self {
        Self::new(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_format() {
        let token = Token::new("perm:abc.def.123");
        assert_eq!(token.header_value(), "Bearer perm:abc.def.123");
    }

    #[test]
    fn test_token_does_not_expose_secret() {
        let token = Token::new("perm:secret_token");
        let debug_output = format!("{:?}", token);
        assert!(!debug_output.contains("secret_token"));
    }
}
