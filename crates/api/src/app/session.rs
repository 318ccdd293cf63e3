use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;

use quillgate_auth::TokenCodec;
use quillgate_core::UserId;

use crate::app::errors::ApiError;
use crate::cookies::{set_cookie_header, CookiePolicy};

/// Issues and clears the credential cookie.
#[derive(Debug, Clone)]
pub struct Sessions {
    codec: Arc<TokenCodec>,
    cookies: CookiePolicy,
}

impl Sessions {
    pub fn new(codec: Arc<TokenCodec>, cookies: CookiePolicy) -> Self {
        Self { codec, cookies }
    }

    /// Sign a credential for `user_id`; returns the `Set-Cookie` header.
    pub fn start(&self, user_id: UserId) -> Result<HeaderMap, ApiError> {
        let issued = self.codec.issue(user_id, Utc::now()).map_err(ApiError::internal)?;
        Ok(set_cookie_header(self.cookies.issue(&issued.token)))
    }

    pub fn end(&self) -> HeaderMap {
        set_cookie_header(self.cookies.clear())
    }
}
