use gridart::{
    batch::run_batch,
    game::Game,
    http::ReqwestClient,
    logging::init_logging,
    resolver::Resolver,
    settings::Settings,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let settings = Settings::new()?;
    let _guard = init_logging(settings.debug);
    settings.validate()?;

    let mut games: Vec<Game> = std::env::args().skip(1).map(|arg| Game::from_arg(&arg)).collect();
    if games.is_empty() {
        eyre::bail!("Usage: gridart <app id>[=<name>[=<legacy id>]] ...");
    }

    let grid_folder = settings.grid_folder();
    let overrides_folder = settings.overrides_folder();
    tracing::info!(grid_folder = %grid_folder.display(), games = games.len(), "Starting artwork download");

    let client = ReqwestClient::new(settings.header_timeout())?;
    let resolver = Resolver::new(client, settings.flags());
    let summary = run_batch(
        &resolver,
        &mut games,
        &settings.styles(),
        settings.credentials(),
        &grid_folder,
        Some(&overrides_folder),
    )
    .await;

    println!("{summary}");
    Ok(())
}
