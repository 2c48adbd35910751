use anyhow::{bail, Context, Result};
use delegering_chat::app::App;
use delegering_chat::config::{Config, SessionConfig};
use delegering_chat::logging::init_tracing;
use std::path::PathBuf;

const NOT_STARTED_HELP: &str = "Ingen profil hittades. Ange DELEGERING_USER_NAME, \
DELEGERING_UNDERSKOTERSKA och DELEGERING_DELEGERING (ja/nej), eller en profil via \
DELEGERING_PROFILE.";

/// `--save-profile <path>` writes the resolved profile and exits.
fn save_profile_target() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(None),
        Some("--save-profile") => match args.next() {
            Some(path) => Ok(Some(PathBuf::from(path))),
            None => bail!("--save-profile needs a file path"),
        },
        Some(other) => bail!("unknown argument '{other}' (usage: delegering [--save-profile <path>])"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;
    init_tracing(&config)?;

    let session_config = SessionConfig::load()?;
    if let Some(path) = save_profile_target()? {
        session_config
            .save_to(&path)
            .with_context(|| format!("saving profile for {}", session_config.user_name))?;
        println!("Profil sparad: {}", path.display());
        return Ok(());
    }
    if !session_config.has_started {
        bail!(NOT_STARTED_HELP);
    }

    tracing::info!(
        endpoint = %config.chat_endpoint(),
        user = %session_config.user_name,
        "starting delegering chat"
    );
    let mut app = App::new(&config, session_config)?;
    app.run().await?;

    Ok(())
}
