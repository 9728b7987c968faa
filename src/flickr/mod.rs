use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde_json::Value;

pub mod error;
pub mod models;
pub mod result;

pub use error::Error;
pub use models::{ParseError, PhotoRecord, ResultPage};
pub use result::Result;

pub const API_KEY_VAR: &str = "FLICKR_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.flickr.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

macro_rules! flickr_api {
    ($base:expr, $end_point:expr) => {
        format!(concat!("{}", $end_point), $base)
    };
}

macro_rules! query_params {
    ($($key:expr => $value:expr),+ $(,)?) => {
        &[
            $(($key, $value.to_string())),+
        ]
    };
}

/// Returns the raw response body, see [`ResultPage::parse`].
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    async fn search(&self, tags: &[String], per_page: u32, page: u32) -> Result<Value>;
}

#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    api_key: String,
    base_url: String,
    license: Option<String>,
}

impl Client {
    pub fn new<T: AsRef<str>>(api_key: T) -> Result<Self> {
        let api_key = api_key.as_ref().trim();
        if api_key.is_empty() {
            return Err(Error::InvalidApiKey);
        }

        Ok(Self {
            http: Self::http_client(DEFAULT_TIMEOUT)?,
            api_key: api_key.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            license: None,
        })
    }

    pub fn new_from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| Error::InvalidApiKey)?;

        Self::new(api_key)
    }

    pub fn with_base_url<T: Into<String>>(mut self, base_url: T) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Timeouts surface as [`Error::Request`].
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Self::http_client(timeout)?;
        Ok(self)
    }

    /// Restricts results to one license id. Flickr's `1` is CC BY-NC-SA.
    pub fn with_license(mut self, license: Option<String>) -> Self {
        self.license = license;
        self
    }

    fn http_client(timeout: Duration) -> Result<HttpClient> {
        HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| Error::Request)
    }

    async fn send_request(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|_| Error::Request)?;

        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }

        Ok(response)
    }
}

#[async_trait]
impl PhotoSearch for Client {
    async fn search(&self, tags: &[String], per_page: u32, page: u32) -> Result<Value> {
        let mut request = self
            .http
            .get(flickr_api!(self.base_url, "/services/rest/"))
            .query(query_params!(
                "method" => "flickr.photos.search",
                "api_key" => self.api_key,
                "tags" => tags.join(","),
                "per_page" => per_page,
                "page" => page,
                "format" => "json",
                "nojsoncallback" => 1,
            ));

        if let Some(license) = &self.license {
            request = request.query(query_params!("license" => license));
        }

        let response = Self::send_request(request).await?;
        let body: Value = response.json().await.map_err(|err| {
            if err.is_timeout() {
                Error::Request
            } else {
                Error::InvalidResponse
            }
        })?;

        if body.get("stat").and_then(Value::as_str) == Some("fail") {
            return Err(Error::Api {
                code: body.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
            });
        }

        Ok(body)
    }
}
