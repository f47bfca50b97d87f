use crate::{art_style::ArtworkStyleSpec, game::Game};

/// Primary url for grid images.
const AKAMAI_URL: &str = "https://steamcdn-a.akamaihd.net/steam/apps";

/// The subreddit lists this one as primary, but Akamai has more images and answers faster.
const STEAM_CDN_URL: &str = "https://cdn.akamai.steamstatic.com/steam/apps";

#[derive(Debug, Clone, Default)]
pub struct SteamCdn;

impl SteamCdn {
    /// Both CDN urls for the style, long-form host first. Custom games have no
    /// app id on Steam, so there is nothing to ask for.
    pub fn urls(&self, game: &Game, spec: &ArtworkStyleSpec) -> Vec<String> {
        match game.native_id() {
            Some(app_id) => [AKAMAI_URL, STEAM_CDN_URL]
                .iter()
                .map(|host| format!("{}/{}/{}", host, app_id, spec.steam_file))
                .collect(),
            None => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art_style::ArtStyle;

    #[test]
    fn builds_both_hosts() {
        let spec = ArtworkStyleSpec::new(ArtStyle::Cover, "");
        let urls = SteamCdn.urls(&Game::new("220", "Half-Life 2"), &spec);
        assert_eq!(
            vec![
                "https://steamcdn-a.akamaihd.net/steam/apps/220/library_600x900_2x.jpg",
                "https://cdn.akamai.steamstatic.com/steam/apps/220/library_600x900_2x.jpg",
            ],
            urls
        );
    }

    #[test]
    fn skips_custom_games() {
        let spec = ArtworkStyleSpec::new(ArtStyle::Banner, "");
        assert!(SteamCdn
            .urls(&Game::new("my-shortcut", "Shortcut"), &spec)
            .is_empty());
    }
}
