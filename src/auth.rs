//! Request authentication.
//!
//! slurmrestd with `auth/jwt` accepts the token as a bearer credential or in
//! the `X-SLURM-USER-TOKEN` header, optionally paired with
//! `X-SLURM-USER-NAME`. [`TokenAuth`] sends both forms so it works across
//! all supported server releases.

use std::fmt;

use reqwest::RequestBuilder;

pub const USER_TOKEN_HEADER: &str = "X-SLURM-USER-TOKEN";
pub const USER_NAME_HEADER: &str = "X-SLURM-USER-NAME";

/// Attaches credentials to outgoing requests.
pub trait AuthProvider: Send + Sync + fmt::Debug {
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder;
}

/// No credentials (e.g. slurmrestd behind `auth/local`).
#[derive(Debug, Clone, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }
}

/// Static JWT credentials.
#[derive(Clone)]
pub struct TokenAuth {
    token: String,
    user_name: Option<String>,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_name: None,
        }
    }

    pub fn with_user(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }
}

// Never print the token.
impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth")
            .field("token", &"<redacted>")
            .field("user_name", &self.user_name)
            .finish()
    }
}

impl AuthProvider for TokenAuth {
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .bearer_auth(&self.token)
            .header(USER_TOKEN_HEADER, &self.token);
        match &self.user_name {
            Some(user) => request.header(USER_NAME_HEADER, user),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(auth: &dyn AuthProvider) -> reqwest::Request {
        let client = reqwest::Client::new();
        auth.authenticate(client.get("http://head:6820/slurm/v0.0.43/ping"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_token_headers() {
        let request = build(&TokenAuth::new("jwt-123").with_user("root"));
        let headers = request.headers();
        assert_eq!(headers["authorization"], "Bearer jwt-123");
        assert_eq!(headers[USER_TOKEN_HEADER], "jwt-123");
        assert_eq!(headers[USER_NAME_HEADER], "root");
    }

    #[test]
    fn test_no_auth_leaves_request_untouched() {
        let request = build(&NoAuth);
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let printed = format!("{:?}", TokenAuth::new("secret"));
        assert!(!printed.contains("secret"));
    }
}
