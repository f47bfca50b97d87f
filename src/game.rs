use crate::providers::ProviderKind;

/// One catalog entry to find artwork for.
///
/// The resolver only ever writes the `image_*` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Game {
    /// Steam app id for native games, anything else for custom shortcuts.
    pub id: String,
    pub name: String,
    pub custom: bool,
    /// Old `target+exe` style id of custom shortcuts, used for the Big Picture alias.
    pub legacy_id: Option<u64>,
    pub image_bytes: Option<Vec<u8>>,
    pub image_ext: Option<String>,
    pub image_source: Option<ProviderKind>,
    pub image_animated: bool,
}

impl Game {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        let id = id.into();
        let custom = id.parse::<u64>().is_err();
        Game {
            id,
            name: name.into(),
            custom,
            ..Default::default()
        }
    }

    pub fn custom<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Game {
            custom: true,
            ..Game::new(id, name)
        }
    }

    /// Parses `ID`, `ID=Name` or `ID=Name=LegacyId` as given on the command line.
    pub fn from_arg(arg: &str) -> Self {
        let Some((id, rest)) = arg.split_once('=') else {
            return Game::new(arg.trim(), "");
        };
        let legacy = rest
            .rsplit_once('=')
            .and_then(|(name, legacy)| Some((name, legacy.trim().parse::<u64>().ok()?)));
        match legacy {
            Some((name, legacy_id)) => Game {
                legacy_id: Some(legacy_id),
                ..Game::new(id.trim(), name.trim())
            },
            None => Game::new(id.trim(), rest.trim()),
        }
    }

    pub fn native_id(&self) -> Option<u64> {
        if self.custom {
            None
        } else {
            self.id.parse().ok()
        }
    }

    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("unknown game with id {}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Clears the outputs of a previous style, the same game is resolved once per style.
    pub fn clear_image(&mut self) {
        self.image_bytes = None;
        self.image_ext = None;
        self.image_source = None;
        self.image_animated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_are_native() {
        let game = Game::new("220", "Half-Life 2");
        assert!(!game.custom);
        assert_eq!(Some(220), game.native_id());
    }

    #[test]
    fn other_ids_are_custom() {
        let game = Game::new("my-emulator", "Emulator");
        assert!(game.custom);
        assert_eq!(None, game.native_id());
    }

    #[test]
    fn custom_numeric_id_has_no_native_id() {
        let game = Game::custom("3123456789", "Shortcut");
        assert_eq!(None, game.native_id());
    }

    #[test]
    fn parses_arguments() {
        let game = Game::from_arg("570=Dota 2");
        assert_eq!("570", game.id);
        assert_eq!("Dota 2", game.name);

        let game = Game::from_arg("570");
        assert_eq!("unknown game with id 570", game.display_name());
    }

    #[test]
    fn parses_legacy_id() {
        let game = Game::from_arg("my-emulator=Emulator=3123456789");
        assert!(game.custom);
        assert_eq!("Emulator", game.name);
        assert_eq!(Some(3123456789), game.legacy_id);

        let game = Game::from_arg("400=Portal");
        assert_eq!(None, game.legacy_id);

        // only a trailing number is a legacy id
        let game = Game::from_arg("shortcut=a=b");
        assert_eq!("a=b", game.name);
        assert_eq!(None, game.legacy_id);
    }
}
