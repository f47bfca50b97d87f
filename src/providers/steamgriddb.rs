use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::{
    art_style::{ArtStyle, ArtworkStyleSpec},
    error::ResolveError,
    game::Game,
    http::{HttpClient, HttpRequest, HttpResponse},
    providers::ProviderKind,
};

/// https://www.steamgriddb.com/api/v2
pub const STEAMGRIDDB_BASE_URL: &str = "https://www.steamgriddb.com/api/v2";

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImagesResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImageData {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub style: String,
    pub url: String,
    #[serde(default)]
    pub thumb: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<SearchResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchResult {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone)]
pub struct SteamGridDb {
    base_url: String,
}

impl Default for SteamGridDb {
    fn default() -> Self {
        SteamGridDb::new(STEAMGRIDDB_BASE_URL)
    }
}

/// Banners and covers share the grids collection.
pub fn collection(style: ArtStyle) -> &'static str {
    match style {
        ArtStyle::Banner | ArtStyle::Cover => "grids",
        ArtStyle::Hero => "heroes",
        ArtStyle::Logo => "logos",
    }
}

impl SteamGridDb {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        SteamGridDb {
            base_url: base_url.into(),
        }
    }

    /// Looks the game up by app id, then by name, and returns the url of the
    /// best image for the style.
    pub async fn candidate<C: HttpClient>(
        &self,
        client: &C,
        game: &Game,
        spec: &ArtworkStyleSpec,
        auth_key: &str,
    ) -> Result<Option<String>, ResolveError> {
        let collection = collection(spec.style);
        let filter = &spec.steamgriddb_filter;

        let by_app_id = match game.native_id() {
            Some(app_id) => {
                let url = format!(
                    "{}/{}/steam/{}{}",
                    self.base_url, collection, app_id, filter
                );
                get_request(client, &url, auth_key).await?
            }
            None => None,
        };

        let body = match by_app_id {
            Some(body) => body,
            None => {
                let Some(grid_id) = self.search(client, &game.name, filter, auth_key).await? else {
                    return Ok(None);
                };
                let url = format!(
                    "{}/{}/game/{}{}",
                    self.base_url, collection, grid_id, filter
                );
                match get_request(client, &url, auth_key).await? {
                    Some(body) => body,
                    None => return Ok(None),
                }
            }
        };

        let response: ImagesResponse =
            serde_json::from_slice(&body).map_err(|source| ResolveError::Decode {
                provider: "SteamGridDB",
                source,
            })?;
        Ok(pick_image(&response, spec.animated_first()))
    }

    /// SteamGridDB's own id of the closest match for the name.
    pub async fn search<C: HttpClient>(
        &self,
        client: &C,
        name: &str,
        filter: &str,
        auth_key: &str,
    ) -> Result<Option<u64>, ResolveError> {
        if name.is_empty() {
            return Ok(None);
        }
        let url = format!(
            "{}/search/autocomplete/{}{}",
            self.base_url,
            utf8_percent_encode(name, PATH_SEGMENT),
            filter
        );
        let Some(body) = get_request(client, &url, auth_key).await? else {
            return Ok(None);
        };
        let response: SearchResponse =
            serde_json::from_slice(&body).map_err(|source| ResolveError::Decode {
                provider: "SteamGridDB",
                source,
            })?;
        if !response.success {
            return Ok(None);
        }
        let names: Vec<&str> = response.data.iter().map(|r| r.name.as_str()).collect();
        let best = best_match(name, &names).and_then(|index| response.data.get(index));
        if let Some(best) = best {
            tracing::debug!(query = name, matched = %best.name, id = best.id, "SteamGridDB search");
        }
        Ok(best.map(|b| b.id))
    }
}

async fn get_request<C: HttpClient>(
    client: &C,
    url: &str,
    auth_key: &str,
) -> Result<Option<Vec<u8>>, ResolveError> {
    let request = HttpRequest::get(url).header("Authorization", format!("Bearer {}", auth_key));
    let response = client.send(request).await?;
    match response.status() {
        401 => Err(ResolveError::AuthInvalid {
            provider: ProviderKind::SteamGridDb,
        }),
        404 => Ok(None),
        status if status >= 400 => Err(ResolveError::Status {
            url: url.to_string(),
            status,
        }),
        _ => Ok(Some(response.bytes().await?)),
    }
}

pub fn pick_image(response: &ImagesResponse, animated_first: bool) -> Option<String> {
    if !response.success {
        return None;
    }
    if animated_first {
        if let Some(animated) = response.data.iter().find(|d| d.thumb.contains("webm")) {
            return Some(animated.url.clone());
        }
    }
    response.data.first().map(|d| d.url.clone())
}

/// Index of the name closest to the query, ignoring case. Ties go to the
/// earlier entry.
pub fn best_match<S: AsRef<str>>(query: &str, names: &[S]) -> Option<usize> {
    best_match_by(query, names, |a, b| {
        strsim::jaro_winkler(&a.to_lowercase(), &b.to_lowercase())
    })
}

pub fn best_match_by<S, F>(query: &str, names: &[S], score: F) -> Option<usize>
where
    S: AsRef<str>,
    F: Fn(&str, &str) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, name) in names.iter().enumerate() {
        let current = score(query, name.as_ref());
        match best {
            Some((_, best_score)) if current <= best_score => {}
            _ => best = Some((index, current)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::{StubClient, StubResponse};

    const IMAGES: &str = r#"{"success":true,"data":[
        {"id":1,"style":"alternate","url":"https://cdn2.steamgriddb.com/grid/static.png","thumb":"https://cdn2.steamgriddb.com/thumb/static.png"},
        {"id":2,"style":"alternate","url":"https://cdn2.steamgriddb.com/grid/animated.webp","thumb":"https://cdn2.steamgriddb.com/thumb/animated.webm"}
    ]}"#;

    const SEARCH: &str = r#"{"success":true,"data":[
        {"id":10,"name":"Half-Life","verified":true},
        {"id":20,"name":"Half-Life 2","verified":true},
        {"id":30,"name":"Half-Life 2: Episode One","verified":true}
    ]}"#;

    fn cover() -> ArtworkStyleSpec {
        ArtworkStyleSpec::new(ArtStyle::Cover, "?styles=alternate")
    }

    #[tokio::test]
    async fn finds_by_app_id() {
        let client = StubClient::new().json(
            "https://www.steamgriddb.com/api/v2/grids/steam/220?styles=alternate",
            IMAGES,
        );
        let url = SteamGridDb::default()
            .candidate(&client, &Game::new("220", "Half-Life 2"), &cover(), "key")
            .await
            .unwrap();
        assert_eq!(
            Some("https://cdn2.steamgriddb.com/grid/static.png".to_string()),
            url
        );
        let requests = client.requests();
        assert_eq!(
            Some(&("Authorization".to_string(), "Bearer key".to_string())),
            requests[0].headers.first()
        );
    }

    #[tokio::test]
    async fn falls_back_to_name_search() {
        let client = StubClient::new()
            .json(
                "https://www.steamgriddb.com/api/v2/search/autocomplete/Half-Life%202?styles=alternate",
                SEARCH,
            )
            .json(
                "https://www.steamgriddb.com/api/v2/grids/game/20?styles=alternate",
                IMAGES,
            );
        let url = SteamGridDb::default()
            .candidate(&client, &Game::new("220", "Half-Life 2"), &cover(), "key")
            .await
            .unwrap();
        assert_eq!(
            Some("https://cdn2.steamgriddb.com/grid/static.png".to_string()),
            url
        );
        assert_eq!(3, client.requests().len());
    }

    #[tokio::test]
    async fn custom_games_go_straight_to_search() {
        let client = StubClient::new().json(
            "https://www.steamgriddb.com/api/v2/search/autocomplete/My%20Game?styles=alternate",
            r#"{"success":true,"data":[]}"#,
        );
        let url = SteamGridDb::default()
            .candidate(&client, &Game::new("shortcut", "My Game"), &cover(), "key")
            .await
            .unwrap();
        assert_eq!(None, url);
        assert!(!client.urls().iter().any(|u| u.contains("/steam/")));
    }

    #[tokio::test]
    async fn unauthorized_is_auth_invalid() {
        let client = StubClient::new().route(
            "https://www.steamgriddb.com/api/v2/heroes/steam/220?",
            StubResponse::status(401),
        );
        let spec = ArtworkStyleSpec::new(ArtStyle::Hero, "?");
        let result = SteamGridDb::default()
            .candidate(&client, &Game::new("220", "Half-Life 2"), &spec, "bad")
            .await;
        assert_eq!(
            Some(ProviderKind::SteamGridDb),
            result.unwrap_err().rejected_provider()
        );
    }

    #[tokio::test]
    async fn unauthorized_search_is_auth_invalid() {
        let client = StubClient::new().route(
            "https://www.steamgriddb.com/api/v2/search/autocomplete/Half-Life%202?styles=alternate",
            StubResponse::status(401),
        );
        let result = SteamGridDb::default()
            .candidate(&client, &Game::new("220", "Half-Life 2"), &cover(), "bad")
            .await;
        assert_eq!(
            Some(ProviderKind::SteamGridDb),
            result.unwrap_err().rejected_provider()
        );
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let client = StubClient::new().json(
            "https://www.steamgriddb.com/api/v2/grids/steam/220?styles=alternate",
            "<html>",
        );
        let result = SteamGridDb::default()
            .candidate(&client, &Game::new("220", "Half-Life 2"), &cover(), "key")
            .await;
        assert!(matches!(result, Err(ResolveError::Decode { .. })));
    }

    #[test]
    fn prefers_animated_when_asked() {
        let response: ImagesResponse = serde_json::from_str(IMAGES).unwrap();
        assert_eq!(
            Some("https://cdn2.steamgriddb.com/grid/animated.webp".to_string()),
            pick_image(&response, true)
        );
        assert_eq!(
            Some("https://cdn2.steamgriddb.com/grid/static.png".to_string()),
            pick_image(&response, false)
        );
    }

    #[test]
    fn unsuccessful_response_has_no_image() {
        let response: ImagesResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(None, pick_image(&response, false));
    }

    #[test]
    fn uses_collection_per_style() {
        assert_eq!("grids", collection(ArtStyle::Banner));
        assert_eq!("grids", collection(ArtStyle::Cover));
        assert_eq!("heroes", collection(ArtStyle::Hero));
        assert_eq!("logos", collection(ArtStyle::Logo));
    }

    #[test]
    fn best_match_ignores_case() {
        let names = ["Half-Life", "HALF-LIFE 2", "Half-Life 2: Episode One"];
        assert_eq!(Some(1), best_match("half-life 2", &names));
    }

    #[test]
    fn ties_keep_result_order() {
        let names = ["b", "a", "c"];
        assert_eq!(Some(0), best_match_by("x", &names, |_, _| 0.5));
    }

    #[test]
    fn scorer_decides_order() {
        let names = ["short", "a much longer name"];
        let by_length = |_: &str, name: &str| name.len() as f64;
        assert_eq!(Some(1), best_match_by("x", &names, by_length));
    }

    #[test]
    fn no_names_no_match() {
        let names: [&str; 0] = [];
        assert_eq!(None, best_match("anything", &names));
    }
}
