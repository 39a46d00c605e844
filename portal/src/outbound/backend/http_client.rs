//! Reqwest-backed bookkeeping backend adapter.
//!
//! This adapter owns transport details only: URL joining, default headers,
//! credential forwarding, status mapping and JSON decoding.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use super::dto::{ErrorBodyDto, LoginResponseDto};
use crate::domain::ports::{
    ApiError, ApiMethod, ApiRequest, AuthGateway, BackendApi, LoginGrant, UNKNOWN_ERROR_DETAIL,
};
use crate::domain::{LoginCredentials, SessionToken};

const JSON: &str = "application/json";
const TOKEN_COOKIE: &str = "token";

/// Backend client shared by every request the portal serves.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: String,
}

impl ApiClient {
    /// Build a client for the backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: &Url) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, base_url: &Url) -> Self {
        Self {
            client,
            base: base_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base, path)
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::transport(err.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::transport(err.to_string()))?
            .to_vec();
        debug!(method = %method, path, status = status.as_u16(), "backend call completed");
        if status.is_success() {
            Ok((status, headers, body))
        } else {
            Err(map_status_error(status, &body))
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn method_for(method: ApiMethod) -> Method {
    match method {
        ApiMethod::Get => Method::GET,
        ApiMethod::Post => Method::POST,
        ApiMethod::Put => Method::PUT,
        ApiMethod::Patch => Method::PATCH,
        ApiMethod::Delete => Method::DELETE,
    }
}

fn credential_cookie(token: &SessionToken) -> String {
    format!("{TOKEN_COOKIE}={}", token.expose())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let detail = match serde_json::from_slice::<ErrorBodyDto>(body) {
        Ok(parsed) => parsed.into_detail(),
        Err(_) => Some(UNKNOWN_ERROR_DETAIL.to_owned()),
    };
    ApiError::status(
        status.as_u16(),
        detail,
        status.canonical_reason().unwrap_or_default(),
    )
}

fn parse_success(status: StatusCode, body: &[u8]) -> Result<Option<Value>, ApiError> {
    if status == StatusCode::NO_CONTENT || body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|err| ApiError::decode(format!("invalid JSON payload: {err}")))
}

/// Value of the `token` cookie among `Set-Cookie` headers, if any.
fn token_from_set_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim() == TOKEN_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl BackendApi for ApiClient {
    async fn request(&self, path: &str, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let method = method_for(request.method);
        let mut builder = self
            .client
            .request(method.clone(), self.url(path))
            .header(ACCEPT, JSON);

        let overrides_content_type = request
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        if !overrides_content_type {
            builder = builder.header(CONTENT_TYPE, JSON);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &request.credential {
            builder = builder.header(COOKIE, credential_cookie(token));
        }
        if let Some(body) = &request.body {
            let encoded =
                serde_json::to_vec(body).map_err(|err| ApiError::decode(err.to_string()))?;
            builder = builder.body(encoded);
        }

        let (status, _, body) = self.send(&method, path, builder).await?;
        parse_success(status, &body)
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, ApiError> {
        let builder = self
            .client
            .post(self.url("/auth/login"))
            .header(ACCEPT, JSON)
            .form(&[
                ("username", credentials.identifier()),
                ("password", credentials.password()),
            ]);
        let (status, headers, body) = self.send(&Method::POST, "/auth/login", builder).await?;

        let parsed: LoginResponseDto = match parse_success(status, &body)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|err| ApiError::decode(format!("invalid login payload: {err}")))?,
            None => LoginResponseDto::default(),
        };
        let raw_token = token_from_set_cookie(&headers)
            .ok_or_else(|| ApiError::decode("login response set no token cookie"))?;
        let token = SessionToken::new(raw_token)
            .map_err(|err| ApiError::decode(format!("unusable login token: {err}")))?;

        Ok(LoginGrant {
            token,
            user: parsed.user,
        })
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError> {
        let builder = self
            .client
            .post(self.url("/auth/logout"))
            .header(ACCEPT, JSON)
            .header(COOKIE, credential_cookie(token));
        self.send(&Method::POST, "/auth/logout", builder).await?;
        Ok(())
    }
}
