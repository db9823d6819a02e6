use crate::core::{Database, Gamemaster, Icons, Locales, Schema, Sources};
use crate::{Config, Error, Session};

use tokio::sync::RwLock;
use tokio::task;

use std::sync::Arc;

/// A reloadable handle to the latest [`Database`].
#[derive(Debug, Clone)]
pub struct PogoData {
    config: Arc<Config>,
    session: Session,
    database: Arc<RwLock<Database>>,
}

impl PogoData {
    pub async fn load(config: Config) -> Result<Self, Error> {
        let session = Session::new(&config)?;
        let database = fetch(&config, &session).await?;

        Ok(Self {
            config: Arc::new(config),
            session,
            database: Arc::new(RwLock::new(database)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches every source again and replaces the current snapshot.
    ///
    /// On failure, the previous snapshot keeps being served.
    pub async fn reload(&self) -> Result<(), Error> {
        match fetch(&self.config, &self.session).await {
            Ok(database) => {
                *self.database.write().await = database;
                log::info!("Reloaded data");

                Ok(())
            }
            Err(error) => {
                log::error!("Reload failed, keeping previous data: {error}");

                Err(error)
            }
        }
    }

    pub async fn database(&self) -> Database {
        self.database.read().await.clone()
    }
}

async fn fetch(config: &Config, session: &Session) -> Result<Database, Error> {
    let schema = session.download(&config.protos_url).await?;
    let gamemaster = session.download(&config.gamemaster_url).await?;

    let mut locales = Locales::new();

    for &language in &config.languages {
        for url in config.locale_urls(language) {
            if let Some(text) = session.download_optional(&url).await? {
                locales.extend(language, &text);
            }
        }

        log::info!("Loaded {} texts for {language}", locales.len(language));
    }

    let mut icons = Icons::new();

    for &iconset in &config.iconsets {
        match session.github.manifest(iconset).await {
            Ok(manifest) => icons.insert(iconset, manifest),
            Err(error) => log::warn!("Skipping manifest of {iconset}: {error}"),
        }
    }

    let database = task::spawn_blocking(move || {
        Database::reconcile(Sources {
            schema: Schema::new(schema),
            gamemaster: Gamemaster::from_json(&gamemaster)?,
            locales,
            icons,
        })
    })
    .await??;

    Ok(database)
}
