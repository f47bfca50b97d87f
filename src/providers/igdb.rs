use serde::Deserialize;

use crate::{
    error::ResolveError,
    http::{HttpClient, HttpRequest, HttpResponse},
    providers::ProviderKind,
};

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const GAMES_URL: &str = "https://api.igdb.com/v4/games";
const COVERS_URL: &str = "https://api.igdb.com/v4/covers";
const IMAGE_URL: &str = "https://images.igdb.com/igdb/image/upload/t_720p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgdbCredentials {
    pub client_id: String,
    pub secret: String,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize, Debug)]
struct IgdbGame {
    #[serde(default)]
    cover: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct IgdbCover {
    image_id: String,
}

pub fn image_url(image_id: &str) -> String {
    format!("{}/{}.jpg", IMAGE_URL, image_id)
}

/// IGDB mostly has covers, so it is only asked for those.
#[derive(Debug, Clone, Default)]
pub struct Igdb;

impl Igdb {
    /// Trades the client credentials for a fresh token, then walks
    /// name -> cover id -> image id.
    pub async fn candidate<C: HttpClient>(
        &self,
        client: &C,
        name: &str,
        credentials: &IgdbCredentials,
    ) -> Result<Option<String>, ResolveError> {
        let token = fetch_token(client, credentials).await?;

        let body = format!("fields name,cover; search \"{}\";", name.replace('"', ""));
        let games: Option<Vec<IgdbGame>> = post(client, GAMES_URL, body, credentials, &token).await?;
        let cover_id = games
            .unwrap_or_default()
            .first()
            .and_then(|game| game.cover)
            .filter(|cover| *cover != 0);
        let Some(cover_id) = cover_id else {
            tracing::debug!(name, "IGDB has no cover");
            return Ok(None);
        };

        let body = format!("fields image_id; where id = {};", cover_id);
        let covers: Option<Vec<IgdbCover>> =
            post(client, COVERS_URL, body, credentials, &token).await?;
        Ok(covers
            .unwrap_or_default()
            .first()
            .map(|cover| image_url(&cover.image_id)))
    }
}

async fn fetch_token<C: HttpClient>(
    client: &C,
    credentials: &IgdbCredentials,
) -> Result<String, ResolveError> {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &credentials.client_id)
        .append_pair("client_secret", &credentials.secret)
        .append_pair("grant_type", "client_credentials")
        .finish();
    let response = client
        .send(HttpRequest::post(format!("{}?{}", TOKEN_URL, query)))
        .await?;
    match response.status() {
        // Twitch answers 400 for an unknown client id and 403 for a bad secret
        400 | 401 | 403 => {
            return Err(ResolveError::AuthInvalid {
                provider: ProviderKind::Igdb,
            })
        }
        status if status >= 400 => {
            return Err(ResolveError::Status {
                url: TOKEN_URL.to_string(),
                status,
            })
        }
        _ => {}
    }
    let bytes = response.bytes().await?;
    let token: TokenResponse =
        serde_json::from_slice(&bytes).map_err(|source| ResolveError::Decode {
            provider: "IGDB",
            source,
        })?;
    Ok(token.access_token)
}

/// IGDB answers queries it can't run with an error object instead of a list,
/// those are treated as no result.
async fn post<C, T>(
    client: &C,
    url: &str,
    body: String,
    credentials: &IgdbCredentials,
    token: &str,
) -> Result<Option<T>, ResolveError>
where
    C: HttpClient,
    T: serde::de::DeserializeOwned,
{
    let request = HttpRequest::post(url)
        .header("Client-ID", credentials.client_id.as_str())
        .header("Authorization", format!("Bearer {}", token))
        .header("Accept", "application/json")
        .body(body);
    let response = client.send(request).await?;
    match response.status() {
        401 | 403 => {
            return Err(ResolveError::AuthInvalid {
                provider: ProviderKind::Igdb,
            })
        }
        status if status >= 400 => {
            return Err(ResolveError::Status {
                url: url.to_string(),
                status,
            })
        }
        _ => {}
    }
    let bytes = response.bytes().await?;
    match serde_json::from_slice(&bytes) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            tracing::debug!(url, %err, "Unexpected IGDB response");
            Ok(None)
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::http::stub::StubClient;

    pub const TOKEN_REQUEST: &str = "https://id.twitch.tv/oauth2/token?client_id=client&client_secret=secret&grant_type=client_credentials";

    pub fn igdb_stub(client: StubClient) -> StubClient {
        client
            .json(TOKEN_REQUEST, r#"{"access_token":"token","expires_in":5000,"token_type":"bearer"}"#)
            .json(
                super::GAMES_URL,
                r#"[{"id":5,"cover":9,"name":"Half-Life 2"}]"#,
            )
            .json(super::COVERS_URL, r#"[{"id":9,"image_id":"abc123"}]"#)
    }

    pub fn credentials() -> super::IgdbCredentials {
        super::IgdbCredentials {
            client_id: "client".to_string(),
            secret: "secret".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::http::{
        stub::{StubClient, StubResponse},
        Method,
    };

    #[tokio::test]
    async fn walks_game_cover_image() {
        let client = igdb_stub(StubClient::new());
        let url = Igdb
            .candidate(&client, "Half-Life 2", &credentials())
            .await
            .unwrap();
        assert_eq!(
            Some("https://images.igdb.com/igdb/image/upload/t_720p/abc123.jpg".to_string()),
            url
        );

        let requests = client.requests();
        assert_eq!(3, requests.len());
        assert!(requests.iter().all(|r| r.method == Method::Post));
        assert_eq!(
            Some("fields name,cover; search \"Half-Life 2\";".to_string()),
            requests[1].body
        );
        assert_eq!(Some("fields image_id; where id = 9;".to_string()), requests[2].body);
        assert!(requests[1]
            .headers
            .contains(&("Authorization".to_string(), "Bearer token".to_string())));
        assert!(requests[1]
            .headers
            .contains(&("Client-ID".to_string(), "client".to_string())));
    }

    #[tokio::test]
    async fn missing_cover_is_not_found() {
        let client = StubClient::new()
            .json(TOKEN_REQUEST, r#"{"access_token":"token"}"#)
            .json(GAMES_URL, r#"[{"id":5,"name":"Half-Life 2"}]"#);
        let url = Igdb
            .candidate(&client, "Half-Life 2", &credentials())
            .await
            .unwrap();
        assert_eq!(None, url);
        assert_eq!(2, client.requests().len());
    }

    #[tokio::test]
    async fn error_object_is_not_found() {
        let client = StubClient::new()
            .json(TOKEN_REQUEST, r#"{"access_token":"token"}"#)
            .json(GAMES_URL, r#"{"title":"Syntax Error","status":400}"#);
        let url = Igdb
            .candidate(&client, "Half-Life 2", &credentials())
            .await
            .unwrap();
        assert_eq!(None, url);
    }

    #[tokio::test]
    async fn rejected_client_is_auth_invalid() {
        for status in [400, 401, 403] {
            let client = StubClient::new().route(TOKEN_REQUEST, StubResponse::status(status));
            let result = Igdb.candidate(&client, "Half-Life 2", &credentials()).await;
            assert_eq!(
                Some(ProviderKind::Igdb),
                result.unwrap_err().rejected_provider(),
                "status {}",
                status
            );
            assert_eq!(1, client.requests().len());
        }
    }

    #[tokio::test]
    async fn rejected_token_on_query_is_auth_invalid() {
        let client = StubClient::new()
            .json(TOKEN_REQUEST, r#"{"access_token":"token"}"#)
            .route(GAMES_URL, StubResponse::status(401));
        let result = Igdb.candidate(&client, "Half-Life 2", &credentials()).await;
        assert_eq!(Some(ProviderKind::Igdb), result.unwrap_err().rejected_provider());
    }

    #[tokio::test]
    async fn token_server_failure_is_status_error() {
        let client = StubClient::new().route(TOKEN_REQUEST, StubResponse::status(500));
        let result = Igdb.candidate(&client, "Half-Life 2", &credentials()).await;
        assert!(matches!(result, Err(ResolveError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn credentials_are_encoded_in_token_request() {
        let client = StubClient::new();
        let credentials = IgdbCredentials {
            client_id: "id&x=1".to_string(),
            secret: "s e/cret".to_string(),
        };
        let _ = Igdb.candidate(&client, "Half-Life 2", &credentials).await;
        assert_eq!(
            vec!["https://id.twitch.tv/oauth2/token?client_id=id%26x%3D1&client_secret=s+e%2Fcret&grant_type=client_credentials".to_string()],
            client.urls()
        );
    }

    #[tokio::test]
    async fn bad_token_response_is_decode_error() {
        let client = StubClient::new().json(TOKEN_REQUEST, r#"{"message":"invalid client"}"#);
        let result = Igdb.candidate(&client, "Half-Life 2", &credentials()).await;
        assert!(matches!(result, Err(ResolveError::Decode { .. })));
    }
}
