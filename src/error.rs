use crate::providers::ProviderKind;

/// Failures of the HTTP seam itself, before any status code is looked at.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} did not start responding in time")]
    Timeout { url: String },

    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Everything that can go wrong while resolving one piece of artwork.
///
/// Absence is not an error: providers and the resolver report it as `None`
/// or `Resolution::NotFound`.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{provider} authorization is missing or invalid")]
    AuthInvalid { provider: ProviderKind },

    #[error("Failed to download {url}: status {status}")]
    Status { url: String, status: u16 },

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Malformed response from {provider}: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not read image header: {0}")]
    Image(#[from] image::ImageError),
}

impl ResolveError {
    /// The provider that rejected its credentials, if this is an auth failure.
    pub fn rejected_provider(&self) -> Option<ProviderKind> {
        match self {
            ResolveError::AuthInvalid { provider } => Some(*provider),
            _ => None,
        }
    }
}
