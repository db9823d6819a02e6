pub mod github;

use crate::{Config, Error};

use github::GitHub;

use reqwest::StatusCode;

use std::fmt;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Session {
    pub github: GitHub,
    client: reqwest::Client,
    retries: usize,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            github: GitHub::new(client.clone(), config.retries),
            client,
            retries: config.retries,
        })
    }

    pub async fn download(&self, url: &str) -> Result<String, Error> {
        log::info!("Downloading: {url}");
        let response = retry(self.retries, || self.client.get(url).send()).await;

        Ok(response?.error_for_status()?.text().await?)
    }

    /// Downloads a file that may not exist upstream.
    pub async fn download_optional(&self, url: &str) -> Result<Option<String>, Error> {
        log::info!("Downloading: {url}");
        let response = retry(self.retries, || self.client.get(url).send()).await?;

        if response.status() == StatusCode::NOT_FOUND {
            log::warn!("Not found: {url}");
            return Ok(None);
        }

        Ok(Some(response.error_for_status()?.text().await?))
    }
}

async fn retry<T, E, F>(mut retries: usize, f: impl Fn() -> F) -> Result<T, E>
where
    E: fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    loop {
        let result = f().await;

        match result {
            Ok(response) => {
                break Ok(response);
            }
            Err(error) => {
                if retries > 0 {
                    log::warn!(
                        "{error} ({retries} {} left)",
                        if retries == 1 { "retry" } else { "retries" }
                    );
                    retries -= 1;
                } else {
                    break Err(error);
                }
            }
        }
    }
}
