use serde::{Deserialize, Serialize};

use crate::settings::SteamGridDbSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtStyle {
    Banner,
    Cover,
    Hero,
    Logo,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 4] = [
        ArtStyle::Banner,
        ArtStyle::Cover,
        ArtStyle::Hero,
        ArtStyle::Logo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtStyle::Banner => "Banner",
            ArtStyle::Cover => "Cover",
            ArtStyle::Hero => "Hero",
            ArtStyle::Logo => "Logo",
        }
    }

    /// Suffix after the app id in the grid folder, `{id}{suffix}.{ext}`.
    pub fn id_suffix(&self) -> &'static str {
        match self {
            ArtStyle::Banner => "",
            ArtStyle::Cover => "p",
            ArtStyle::Hero => "_hero",
            ArtStyle::Logo => "_logo",
        }
    }

    pub fn name_suffix(&self) -> &'static str {
        match self {
            ArtStyle::Banner => ".banner",
            ArtStyle::Cover => ".cover",
            ArtStyle::Hero => ".hero",
            ArtStyle::Logo => ".logo",
        }
    }

    /// File name of this style on the Steam CDN.
    pub fn steam_file(&self) -> &'static str {
        match self {
            ArtStyle::Banner => "header.jpg",
            ArtStyle::Cover => "library_600x900_2x.jpg",
            ArtStyle::Hero => "library_hero.jpg",
            ArtStyle::Logo => "logo.png",
        }
    }

    /// Whether an image of this size has the orientation the style expects.
    pub fn accepts(&self, width: u32, height: u32) -> bool {
        match self {
            ArtStyle::Banner => width >= height,
            ArtStyle::Cover => width <= height,
            ArtStyle::Hero | ArtStyle::Logo => true,
        }
    }
}

impl std::fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything that changes between styles while resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkStyleSpec {
    pub style: ArtStyle,
    pub id_suffix: &'static str,
    pub name_suffix: &'static str,
    pub steam_file: &'static str,
    /// Query string appended to every SteamGridDB request, starting with `?`.
    pub steamgriddb_filter: String,
}

impl ArtworkStyleSpec {
    pub fn new<S: Into<String>>(style: ArtStyle, steamgriddb_filter: S) -> Self {
        ArtworkStyleSpec {
            style,
            id_suffix: style.id_suffix(),
            name_suffix: style.name_suffix(),
            steam_file: style.steam_file(),
            steamgriddb_filter: steamgriddb_filter.into(),
        }
    }

    pub fn from_settings(style: ArtStyle, settings: &SteamGridDbSettings) -> Self {
        ArtworkStyleSpec::new(style, steamgriddb_filter(style, settings))
    }

    /// Asking for animated images before static ones changes which result is picked.
    pub fn animated_first(&self) -> bool {
        self.steamgriddb_filter.contains("animated,static")
    }
}

pub fn steamgriddb_filter(style: ArtStyle, settings: &SteamGridDbSettings) -> String {
    let common = format!(
        "&types={}&nsfw={}&humor={}",
        settings.types, settings.nsfw, settings.humor
    );
    match style {
        ArtStyle::Banner => format!(
            "?styles={}{}&dimensions={}",
            settings.styles, common, settings.banner_dimensions
        ),
        ArtStyle::Cover => format!(
            "?styles={}{}&dimensions={}",
            settings.styles, common, settings.cover_dimensions
        ),
        ArtStyle::Hero => format!(
            "?styles={}{}&dimensions={}",
            settings.styles, common, settings.hero_dimensions
        ),
        ArtStyle::Logo => format!("?styles={}{}", settings.logo_styles, common),
    }
}
