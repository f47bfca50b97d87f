pub mod google;
pub mod igdb;
pub mod steam_cdn;
pub mod steamdb;
pub mod steamgriddb;

pub use google::GoogleSearch;
pub use igdb::{Igdb, IgdbCredentials};
pub use steam_cdn::SteamCdn;
pub use steamgriddb::{best_match, best_match_by, SteamGridDb};

use serde::{Deserialize, Serialize};

use crate::{
    art_style::{ArtStyle, ArtworkStyleSpec},
    error::ResolveError,
    game::Game,
    http::HttpClient,
    resolver::CredentialState,
};

/// Where a piece of artwork came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    SteamServer,
    SteamGridDb,
    Igdb,
    Search,
}

impl ProviderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::SteamServer => "steam server",
            ProviderKind::SteamGridDb => "SteamGridDB",
            ProviderKind::Igdb => "IGDB",
            ProviderKind::Search => "search",
        }
    }

    /// Anything not served by Steam itself may be inaccurate or low quality.
    pub fn low_confidence(&self) -> bool {
        !matches!(self, ProviderKind::SteamServer)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A url that may hold the artwork, not downloaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub source: ProviderKind,
}

impl Candidate {
    fn new(url: String, source: ProviderKind) -> Self {
        Candidate { url, source }
    }
}

#[derive(Debug, Clone)]
pub enum Provider {
    SteamCdn(SteamCdn),
    SteamGridDb(SteamGridDb),
    Igdb(Igdb),
    Google(GoogleSearch),
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::SteamCdn(_) => ProviderKind::SteamServer,
            Provider::SteamGridDb(_) => ProviderKind::SteamGridDb,
            Provider::Igdb(_) => ProviderKind::Igdb,
            Provider::Google(_) => ProviderKind::Search,
        }
    }

    /// Whether the provider has anything to offer for this game and style
    /// with the credentials still valid in this run.
    pub fn applies(&self, game: &Game, style: ArtStyle, credentials: &CredentialState) -> bool {
        match self {
            Provider::SteamCdn(_) => game.native_id().is_some(),
            Provider::SteamGridDb(_) => credentials.steamgriddb_key().is_some(),
            Provider::Igdb(_) => style == ArtStyle::Cover && credentials.igdb().is_some(),
            Provider::Google(_) => style == ArtStyle::Banner,
        }
    }

    /// Candidate urls in the order they should be tried. Only the Steam CDN
    /// ever has more than one.
    pub async fn candidates<C: HttpClient>(
        &self,
        client: &C,
        game: &Game,
        spec: &ArtworkStyleSpec,
        credentials: &CredentialState,
    ) -> Result<Vec<Candidate>, ResolveError> {
        let kind = self.kind();
        let url = match self {
            Provider::SteamCdn(cdn) => {
                return Ok(cdn
                    .urls(game, spec)
                    .into_iter()
                    .map(|url| Candidate::new(url, kind))
                    .collect());
            }
            Provider::SteamGridDb(steamgriddb) => match credentials.steamgriddb_key() {
                Some(key) => steamgriddb.candidate(client, game, spec, key).await?,
                None => None,
            },
            Provider::Igdb(igdb) => match credentials.igdb() {
                Some(igdb_credentials) => {
                    igdb.candidate(client, &game.name, igdb_credentials).await?
                }
                None => None,
            },
            Provider::Google(google) => google.candidate(client, &game.name).await?,
        };
        Ok(url
            .filter(|url| !url.is_empty())
            .map(|url| Candidate::new(url, kind))
            .into_iter()
            .collect())
    }
}
