use crate::{
    art_style::ArtworkStyleSpec,
    error::ResolveError,
    game::Game,
    http::{try_download, HttpClient, HttpResponse},
    image_info::validate,
    providers::{GoogleSearch, Igdb, IgdbCredentials, Provider, ProviderKind, SteamCdn, SteamGridDb},
};

/// Which providers a run is allowed to use. Fixed for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveFlags {
    pub skip_steam: bool,
    pub skip_google: bool,
    pub steamgriddb_only: bool,
    /// Only look for artwork Steam does not serve itself.
    pub only_missing_artwork: bool,
}

/// API keys for the run. Credentials a provider rejected are dropped for the
/// rest of the run, the batch loop does that through [`CredentialState::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialState {
    steamgriddb_key: Option<String>,
    igdb: Option<IgdbCredentials>,
}

impl CredentialState {
    pub fn new(steamgriddb_key: Option<String>, igdb: Option<IgdbCredentials>) -> Self {
        CredentialState {
            steamgriddb_key: steamgriddb_key.filter(|key| !key.is_empty()),
            igdb: igdb.filter(|igdb| !igdb.client_id.is_empty() && !igdb.secret.is_empty()),
        }
    }

    pub fn steamgriddb_key(&self) -> Option<&str> {
        self.steamgriddb_key.as_deref()
    }

    pub fn igdb(&self) -> Option<&IgdbCredentials> {
        self.igdb.as_ref()
    }

    /// Takes in what a resolution learned about the credentials. Returns the
    /// providers that were disabled by this report.
    pub fn apply(&mut self, report: &ResolveReport) -> Vec<ProviderKind> {
        let mut disabled = vec![];
        if report.rejected(ProviderKind::SteamGridDb) && self.steamgriddb_key.take().is_some() {
            disabled.push(ProviderKind::SteamGridDb);
        }
        if report.rejected(ProviderKind::Igdb) && self.igdb.take().is_some() {
            disabled.push(ProviderKind::Igdb);
        }
        disabled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found { source: ProviderKind, url: String },
    NotFound,
    /// Steam already serves this artwork, nothing was downloaded.
    AlreadyPresent,
}

#[derive(Debug)]
pub struct ResolveReport {
    pub outcome: Result<Resolution, ResolveError>,
    /// Credential rejections seen during this resolution, at most one per provider.
    pub auth_errors: Vec<ResolveError>,
}

impl ResolveReport {
    pub fn rejected(&self, provider: ProviderKind) -> bool {
        self.auth_errors
            .iter()
            .any(|err| err.rejected_provider() == Some(provider))
    }

    pub fn steamgriddb_rejected(&self) -> bool {
        self.rejected(ProviderKind::SteamGridDb)
    }

    pub fn source(&self) -> Option<ProviderKind> {
        match &self.outcome {
            Ok(Resolution::Found { source, .. }) => Some(*source),
            _ => None,
        }
    }
}

/// The fixed provider order for a run.
pub fn active_providers(flags: &ResolveFlags) -> Vec<Provider> {
    let mut providers = vec![];
    if !flags.skip_steam && !flags.steamgriddb_only {
        providers.push(Provider::SteamCdn(SteamCdn));
    }
    providers.push(Provider::SteamGridDb(SteamGridDb::default()));
    if !flags.steamgriddb_only {
        providers.push(Provider::Igdb(Igdb));
        if !flags.skip_google {
            providers.push(Provider::Google(GoogleSearch::default()));
        }
    }
    providers
}

pub struct Resolver<C> {
    client: C,
    flags: ResolveFlags,
    providers: Vec<Provider>,
}

impl<C: HttpClient> Resolver<C> {
    pub fn new(client: C, flags: ResolveFlags) -> Self {
        let providers = active_providers(&flags);
        Resolver::with_providers(client, flags, providers)
    }

    pub fn with_providers(client: C, flags: ResolveFlags, providers: Vec<Provider>) -> Self {
        Resolver {
            client,
            flags,
            providers,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Tries every eligible provider in order until one yields an image with
    /// the right orientation, and stores it on the game.
    pub async fn resolve(
        &self,
        game: &mut Game,
        spec: &ArtworkStyleSpec,
        credentials: &CredentialState,
    ) -> ResolveReport {
        game.clear_image();
        let mut auth_errors = vec![];
        let outcome = self
            .try_providers(game, spec, credentials, &mut auth_errors)
            .await;
        ResolveReport {
            outcome,
            auth_errors,
        }
    }

    async fn try_providers(
        &self,
        game: &mut Game,
        spec: &ArtworkStyleSpec,
        credentials: &CredentialState,
        auth_errors: &mut Vec<ResolveError>,
    ) -> Result<Resolution, ResolveError> {
        for provider in &self.providers {
            if !provider.applies(game, spec.style, credentials) {
                continue;
            }
            let candidates = match provider
                .candidates(&self.client, game, spec, credentials)
                .await
            {
                Ok(candidates) => candidates,
                Err(err @ ResolveError::AuthInvalid { .. }) => {
                    tracing::warn!(game = %game.display_name(), "{}", err);
                    auth_errors.push(err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            for candidate in candidates {
                let Some(response) = try_download(&self.client, &candidate.url).await? else {
                    tracing::debug!(url = %candidate.url, source = %candidate.source, "Candidate not found");
                    continue;
                };
                if candidate.source == ProviderKind::SteamServer && self.flags.only_missing_artwork
                {
                    return Ok(Resolution::AlreadyPresent);
                }
                let content_type = response.header("Content-Type");
                let final_url = response.url().to_string();
                let bytes = response.bytes().await?;
                let Some(image) = validate(bytes, content_type.as_deref(), &final_url, spec.style)?
                else {
                    continue;
                };
                tracing::debug!(
                    url = %candidate.url,
                    width = image.width,
                    height = image.height,
                    extension = %image.extension,
                    "Accepted image"
                );
                game.image_ext = Some(image.extension);
                game.image_animated = image.animated;
                game.image_bytes = Some(image.bytes);
                game.image_source = Some(candidate.source);
                return Ok(Resolution::Found {
                    source: candidate.source,
                    url: candidate.url,
                });
            }
        }
        Ok(Resolution::NotFound)
    }
}
