use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    art_style::{ArtStyle, ArtworkStyleSpec},
    game::Game,
    http::HttpClient,
    providers::{steamdb, ProviderKind},
    resolver::{CredentialState, Resolution, Resolver},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub id: String,
    pub style: ArtStyle,
}

impl Entry {
    fn new(game: &Game, style: ArtStyle) -> Self {
        Entry {
            name: game.display_name(),
            id: game.id.clone(),
            style,
        }
    }
}

const OVERRIDE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub downloaded: usize,
    pub already_present: usize,
    /// Images taken from the overrides folder instead of being downloaded.
    pub overridden: usize,
    /// Low confidence finds, per source.
    pub unverified: BTreeMap<&'static str, Vec<Entry>>,
    pub not_found: Vec<Entry>,
    pub errors: Vec<(Entry, String)>,
    /// Providers whose credentials were rejected during the run.
    pub disabled: Vec<ProviderKind>,
}

/// Resolves every style for every game, writing what was found into the grid folder.
///
/// Images found in `overrides_folder` win over every provider. A failure for
/// one game never stops the batch. SteamGridDB and IGDB
/// credentials are dropped for the rest of the batch the first time they are
/// rejected.
pub async fn run_batch<C: HttpClient>(
    resolver: &Resolver<C>,
    games: &mut [Game],
    styles: &[ArtworkStyleSpec],
    mut credentials: CredentialState,
    grid_folder: &Path,
    overrides_folder: Option<&Path>,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let total = games.len();
    for (index, game) in games.iter_mut().enumerate() {
        if game.name.is_empty() && !game.custom {
            if let Some(name) = steamdb::lookup_name(resolver.client(), &game.id).await {
                game.name = name;
            }
        }
        tracing::info!("Processing {} ({}/{})", game.display_name(), index + 1, total);

        for spec in styles {
            if let Some(folder) = overrides_folder {
                match load_override(folder, game, spec) {
                    Ok(Some(path)) => {
                        tracing::info!(path = %path.display(), "{} taken from overrides", spec.style);
                        if store(grid_folder, game, spec, &mut summary) {
                            summary.overridden += 1;
                        }
                        continue;
                    }
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!("Could not read override for {}: {}", game.display_name(), err);
                    }
                }
            }

            let report = resolver.resolve(game, spec, &credentials).await;
            for provider in credentials.apply(&report) {
                tracing::error!(
                    "{provider} authorization is missing or invalid, skipping {provider} for the rest of the run"
                );
                summary.disabled.push(provider);
            }
            let entry = Entry::new(game, spec.style);
            match report.outcome {
                Ok(Resolution::Found { source, .. }) => {
                    if store(grid_folder, game, spec, &mut summary) {
                        tracing::info!("{} found from {}", spec.style, source);
                        summary.downloaded += 1;
                        if source.low_confidence() {
                            summary
                                .unverified
                                .entry(source.label())
                                .or_default()
                                .push(entry);
                        }
                    }
                }
                Ok(Resolution::AlreadyPresent) => {
                    tracing::debug!("{} already on the Steam servers", spec.style);
                    summary.already_present += 1;
                }
                Ok(Resolution::NotFound) => {
                    tracing::info!("{} not found", spec.style);
                    summary.not_found.push(entry);
                }
                Err(err) => {
                    tracing::warn!("{} for {} failed: {}", spec.style, game.display_name(), err);
                    summary.errors.push((entry.clone(), err.to_string()));
                    summary.not_found.push(entry);
                }
            }
        }
    }
    summary
}

fn store(
    grid_folder: &Path,
    game: &Game,
    spec: &ArtworkStyleSpec,
    summary: &mut BatchSummary,
) -> bool {
    match write_artwork(grid_folder, game, spec) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(
                "Failed to write image for {} ({}) because: {}",
                game.display_name(),
                spec.style,
                err
            );
            summary
                .errors
                .push((Entry::new(game, spec.style), err.to_string()));
            false
        }
    }
}

/// Loads a user supplied image named `{name}{name_suffix}.{ext}` or
/// `{id}{id_suffix}.{ext}`, e.g. `Half-Life 2.banner.png` or `220p.jpg`.
pub fn load_override(
    folder: &Path,
    game: &mut Game,
    spec: &ArtworkStyleSpec,
) -> std::io::Result<Option<PathBuf>> {
    let mut stems = vec![];
    if !game.name.is_empty() {
        stems.push(format!("{}{}", game.name, spec.name_suffix));
    }
    stems.push(format!("{}{}", game.id, spec.id_suffix));

    for stem in &stems {
        for extension in OVERRIDE_EXTENSIONS {
            let path = folder.join(format!("{}.{}", stem, extension));
            if !path.is_file() {
                continue;
            }
            let bytes = std::fs::read(&path)?;
            game.clear_image();
            game.image_bytes = Some(bytes);
            game.image_ext = Some(match extension {
                "jpeg" => "jpg".to_string(),
                other => other.to_string(),
            });
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Extension the file is written with. Steam can't show animated WEBP under
/// its own extension.
pub fn file_extension(game: &Game) -> String {
    match game.image_ext.as_deref() {
        Some("webp") if game.image_animated => "png".to_string(),
        Some(ext) => ext.to_string(),
        None => "png".to_string(),
    }
}

/// Writes the resolved image as `{id}{suffix}.{ext}`. Banners also get a copy
/// under the legacy Big Picture id.
pub fn write_artwork(
    grid_folder: &Path,
    game: &Game,
    spec: &ArtworkStyleSpec,
) -> std::io::Result<Vec<PathBuf>> {
    let Some(bytes) = game.image_bytes.as_ref() else {
        return Ok(vec![]);
    };
    std::fs::create_dir_all(grid_folder)?;
    let extension = file_extension(game);
    let mut written = vec![];

    let path = grid_folder.join(format!("{}{}.{}", game.id, spec.id_suffix, extension));
    std::fs::write(&path, bytes)?;
    written.push(path);

    if spec.style == ArtStyle::Banner {
        let legacy = game.legacy_id.or_else(|| game.id.parse::<u64>().ok());
        if let Some(id) = legacy {
            let path = grid_folder.join(format!(
                "{}{}.{}",
                big_picture_id(id),
                spec.id_suffix,
                extension
            ));
            std::fs::write(&path, bytes)?;
            written.push(path);
        }
    }
    Ok(written)
}

pub fn big_picture_id(id: u64) -> u64 {
    (id << 32) | 0x0200_0000
}

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[Entry], bullet: &str) -> fmt::Result {
    for entry in entries {
        writeln!(f, "{} {} (id {}, {})", bullet, entry.name, entry.id, entry.style)?;
    }
    Ok(())
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} images downloaded.", self.downloaded)?;
        if self.overridden > 0 {
            writeln!(f, "{} images were taken from the overrides folder.", self.overridden)?;
        }
        if self.already_present > 0 {
            writeln!(
                f,
                "{} images are already on the Steam servers and were skipped.",
                self.already_present
            )?;
        }
        for (source, entries) in &self.unverified {
            let warning = if *source == ProviderKind::Search.label() {
                "were found with a Google search and may not be accurate"
            } else {
                "may not be in full quality or accurate"
            };
            writeln!(f, "\n{} images from {} {}:", entries.len(), source, warning)?;
            write_entries(f, entries, "*")?;
        }
        if !self.not_found.is_empty() {
            writeln!(f, "\n{} images could not be found anywhere:", self.not_found.len())?;
            write_entries(f, &self.not_found, "-")?;
        }
        if !self.errors.is_empty() {
            writeln!(f, "\n{} errors:", self.errors.len())?;
            for (entry, message) in &self.errors {
                writeln!(f, "- {} (id {}, {}) ({})", entry.name, entry.id, entry.style, message)?;
            }
        }
        Ok(())
    }
}
