use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    art_style::{ArtStyle, ArtworkStyleSpec},
    config::{get_config_file, get_default_grid_folder, get_default_overrides_folder},
    http::DEFAULT_HEADER_TIMEOUT,
    providers::IgdbCredentials,
    resolver::{CredentialState, ResolveFlags},
};

const AUTH_KEY_PLACEHOLDER: &str = "Write your authentication key between these quotes";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub debug: bool,
    pub grid_folder: Option<String>,
    /// Hand picked images, see [`crate::batch::load_override`].
    pub overrides_folder: Option<String>,
    pub steamgrid_db: SteamGridDbSettings,
    #[serde(default)]
    pub igdb: IgdbSettings,
    pub resolve: ResolveSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SteamGridDbSettings {
    pub enabled: bool,
    pub auth_key: Option<String>,
    pub styles: String,
    pub logo_styles: String,
    pub types: String,
    pub nsfw: String,
    pub humor: String,
    pub banner_dimensions: String,
    pub cover_dimensions: String,
    pub hero_dimensions: String,
}

impl Default for SteamGridDbSettings {
    fn default() -> Self {
        SteamGridDbSettings {
            enabled: true,
            auth_key: None,
            styles: "alternate".to_string(),
            logo_styles: "official".to_string(),
            types: "static".to_string(),
            nsfw: "false".to_string(),
            humor: "false".to_string(),
            banner_dimensions: "460x215,920x430".to_string(),
            cover_dimensions: "600x900,342x482,660x930".to_string(),
            hero_dimensions: "1920x620,3840x1240,1600x650".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct IgdbSettings {
    pub client_id: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResolveSettings {
    pub skip_steam: bool,
    pub skip_google: bool,
    pub steamgriddb_only: bool,
    pub only_missing_artwork: bool,
    pub skip_banner: bool,
    pub skip_cover: bool,
    pub skip_hero: bool,
    pub skip_logo: bool,
    pub header_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Settings::load(&get_config_file())
    }

    pub fn load(config_file: &Path) -> Result<Self, ConfigError> {
        let default_str = include_str!("defaultconfig.toml");
        let config_file = config_file.to_string_lossy();
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::from_str(default_str, config::FileFormat::Toml))
            .add_source(File::with_name(config_file.as_ref()).required(false))
            // Default to 'development' env, the file is optional
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            // This file shouldn't be checked in to git
            .add_source(File::with_name("local.toml").required(false))
            // Eg.. `GRIDART_DEBUG=1 ./target/app` would set the `debug` key
            .add_source(Environment::with_prefix("gridart").separator("-"))
            .build()?;
        let mut settings = config.try_deserialize::<Settings>()?;
        sanitize_auth_key(&mut settings);
        Ok(settings)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.resolve.skip_steam && self.resolve.only_missing_artwork {
            eyre::bail!("Can't check if official artwork is missing with steam turned off");
        }
        if self.styles().is_empty() {
            eyre::bail!("No art styles, nothing to do");
        }
        Ok(())
    }

    pub fn flags(&self) -> ResolveFlags {
        ResolveFlags {
            skip_steam: self.resolve.skip_steam,
            skip_google: self.resolve.skip_google,
            steamgriddb_only: self.resolve.steamgriddb_only,
            only_missing_artwork: self.resolve.only_missing_artwork,
        }
    }

    pub fn credentials(&self) -> CredentialState {
        let steamgriddb_key = if self.steamgrid_db.enabled {
            self.steamgrid_db.auth_key.clone()
        } else {
            None
        };
        let igdb = match (&self.igdb.client_id, &self.igdb.secret) {
            (Some(client_id), Some(secret)) => Some(IgdbCredentials {
                client_id: client_id.clone(),
                secret: secret.clone(),
            }),
            _ => None,
        };
        CredentialState::new(steamgriddb_key, igdb)
    }

    /// One spec per style that is not skipped, with the SteamGridDB filters applied.
    pub fn styles(&self) -> Vec<ArtworkStyleSpec> {
        ArtStyle::ALL
            .iter()
            .filter(|style| !self.skips(**style))
            .map(|style| ArtworkStyleSpec::from_settings(*style, &self.steamgrid_db))
            .collect()
    }

    fn skips(&self, style: ArtStyle) -> bool {
        match style {
            ArtStyle::Banner => self.resolve.skip_banner,
            ArtStyle::Cover => self.resolve.skip_cover,
            ArtStyle::Hero => self.resolve.skip_hero,
            ArtStyle::Logo => self.resolve.skip_logo,
        }
    }

    pub fn grid_folder(&self) -> PathBuf {
        self.grid_folder
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(get_default_grid_folder)
    }

    pub fn overrides_folder(&self) -> PathBuf {
        self.overrides_folder
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(get_default_overrides_folder)
    }

    pub fn header_timeout(&self) -> Duration {
        match self.resolve.header_timeout_secs {
            0 => DEFAULT_HEADER_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }
}

fn sanitize_auth_key(result: &mut Settings) {
    if let Some(auth_key) = result.steamgrid_db.auth_key.as_ref() {
        if auth_key == AUTH_KEY_PLACEHOLDER || auth_key.trim().is_empty() {
            result.steamgrid_db.auth_key = None;
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn defaults() -> Settings {
        Settings::load(Path::new("this/file/does/not/exist.toml")).unwrap()
    }

    #[test]
    pub fn loads_defaults() {
        let settings = defaults();
        assert!(settings.steamgrid_db.enabled);
        assert_eq!(None, settings.steamgrid_db.auth_key);
        assert_eq!(10, settings.header_timeout().as_secs());
        assert_eq!(4, settings.styles().len());
        assert_eq!(ResolveFlags::default(), settings.flags());
    }

    #[test]
    pub fn reads_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[steamgrid_db]\nauth_key = \"abc\"\n[igdb]\nclient_id = \"id\"\nsecret = \"s\"\n[resolve]\nskip_hero = true\n",
        )
        .unwrap();
        let settings = Settings::load(&path).unwrap();
        let credentials = settings.credentials();
        assert_eq!(Some("abc"), credentials.steamgriddb_key());
        assert!(credentials.igdb().is_some());
        assert!(settings
            .styles()
            .iter()
            .all(|spec| spec.style != ArtStyle::Hero));
    }

    #[test]
    pub fn disabled_steamgriddb_has_no_key() {
        let mut settings = defaults();
        settings.steamgrid_db.auth_key = Some("abc".to_string());
        settings.steamgrid_db.enabled = false;
        assert_eq!(None, settings.credentials().steamgriddb_key());
    }

    #[test]
    pub fn folders_default_to_config_folder() {
        let mut settings = defaults();
        assert_eq!(get_default_grid_folder(), settings.grid_folder());
        assert_eq!(get_default_overrides_folder(), settings.overrides_folder());
        settings.overrides_folder = Some("/tmp/art".to_string());
        assert_eq!(PathBuf::from("/tmp/art"), settings.overrides_folder());
    }

    #[test]
    pub fn zero_timeout_uses_default() {
        let mut settings = defaults();
        settings.resolve.header_timeout_secs = 0;
        assert_eq!(DEFAULT_HEADER_TIMEOUT, settings.header_timeout());
    }

    #[test]
    pub fn rejects_only_missing_without_steam() {
        let mut settings = defaults();
        settings.resolve.skip_steam = true;
        settings.resolve.only_missing_artwork = true;
        assert!(settings.validate().is_err());
    }

    #[test]
    pub fn rejects_skipping_every_style() {
        let mut settings = defaults();
        settings.resolve.skip_banner = true;
        settings.resolve.skip_cover = true;
        settings.resolve.skip_hero = true;
        settings.resolve.skip_logo = true;
        assert!(settings.validate().is_err());
    }
}
