use std::time::Duration;

use crate::error::{HttpError, ResolveError};

pub const DEFAULT_HEADER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get<S: Into<String>>(url: S) -> Self {
        HttpRequest {
            method: Method::Get,
            url: url.into(),
            headers: vec![],
            body: None,
        }
    }

    pub fn post<S: Into<String>>(url: S) -> Self {
        HttpRequest {
            method: Method::Post,
            ..HttpRequest::get(url)
        }
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The one seam every provider talks to the network through.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    type Response: HttpResponse;

    /// Resolves as soon as the response headers are in; the body is read
    /// separately through [`HttpResponse::bytes`].
    async fn send(&self, request: HttpRequest) -> Result<Self::Response, HttpError>;
}

#[allow(async_fn_in_trait)]
pub trait HttpResponse {
    fn status(&self) -> u16;
    fn header(&self, name: &str) -> Option<String>;
    /// Final url after redirects.
    fn url(&self) -> &str;
    async fn bytes(self) -> Result<Vec<u8>, HttpError>;
}

/// reqwest backed client with a response-header timeout shared by every call.
pub struct ReqwestClient {
    client: reqwest::Client,
    header_timeout: Duration,
}

impl ReqwestClient {
    pub fn new(header_timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .connect_timeout(header_timeout)
            .build()
            .map_err(HttpError::Client)?;
        Ok(ReqwestClient {
            client,
            header_timeout,
        })
    }
}

impl HttpClient for ReqwestClient {
    type Response = reqwest::Response;

    async fn send(&self, request: HttpRequest) -> Result<reqwest::Response, HttpError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        match tokio::time::timeout(self.header_timeout, builder.send()).await {
            Ok(response) => response.map_err(|source| HttpError::Request {
                url: request.url,
                source,
            }),
            Err(_) => Err(HttpError::Timeout { url: request.url }),
        }
    }
}

impl HttpResponse for reqwest::Response {
    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
    }

    fn url(&self) -> &str {
        reqwest::Response::url(self).as_str()
    }

    async fn bytes(self) -> Result<Vec<u8>, HttpError> {
        let url = reqwest::Response::url(&self).to_string();
        reqwest::Response::bytes(self)
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|source| HttpError::Request { url, source })
    }
}

/// Tries to fetch a url, returning the response only if it was positive.
///
/// A 404 is plain absence, some apps just don't have an image. Any other
/// error status is reported.
pub async fn try_download<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Option<C::Response>, ResolveError> {
    let response = client.send(HttpRequest::get(url)).await?;
    match response.status() {
        404 => Ok(None),
        status if status >= 400 => Err(ResolveError::Status {
            url: url.to_string(),
            status,
        }),
        _ => Ok(Some(response)),
    }
}
