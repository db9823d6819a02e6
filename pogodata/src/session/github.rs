//! Manifests of icon repositories, built from GitHub's recursive tree listing.
use crate::core::{IconSet, Manifest};
use crate::session;
use crate::Error;

use regex::Regex;
use reqwest::header;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use std::sync::LazyLock;

const API: &str = "https://api.github.com";

static RAW_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://raw\.githubusercontent\.com/([^/]+)/([^/]+)/([^/]+)/(.*)$")
        .expect("Compile raw URL regex")
});

/// A directory inside a branch of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub user: String,
    pub repository: String,
    pub branch: String,
    pub directory: String,
}

impl Location {
    /// Parses a `raw.githubusercontent.com` URL.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let captures = RAW_URL
            .captures(url)
            .ok_or_else(|| Error::InvalidManifestUrl(url.to_owned()))?;

        Ok(Self {
            user: captures[1].to_owned(),
            repository: captures[2].to_owned(),
            branch: captures[3].to_owned(),
            directory: captures[4].to_owned(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GitHub {
    client: reqwest::Client,
    retries: usize,
}

impl GitHub {
    pub fn new(client: reqwest::Client, retries: usize) -> Self {
        Self { client, retries }
    }

    pub async fn manifest(&self, iconset: IconSet) -> Result<Manifest, Error> {
        let location = Location::parse(iconset.url())?;

        let branch: Branch = self
            .get(&format!(
                "{API}/repos/{user}/{repository}/branches/{branch}",
                user = location.user,
                repository = location.repository,
                branch = location.branch,
            ))
            .await?;

        let tree: Tree = self
            .get(&format!(
                "{API}/repos/{user}/{repository}/git/trees/{sha}?recursive=true",
                user = location.user,
                repository = location.repository,
                sha = branch.commit.sha,
            ))
            .await?;

        if tree.truncated {
            log::warn!("Tree of {iconset} is truncated");
        }

        Ok(Manifest::new(tree.files(&location.directory)))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        log::info!("Fetching: {url}");
        let response = session::retry(self.retries, || {
            self.client
                .get(url)
                .header(header::ACCEPT, "application/vnd.github+json")
                .send()
        })
        .await;

        Ok(response?.error_for_status()?.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct Branch {
    commit: Commit,
}

#[derive(Debug, Deserialize)]
struct Commit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct Tree {
    tree: Vec<Entry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct Entry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl Tree {
    /// Paths of the files below `directory`.
    fn files(self, directory: &str) -> impl Iterator<Item = String> {
        self.tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .filter(move |entry| entry.path.starts_with(directory))
            .map(|entry| entry.path)
    }
}

#[cfg(test)]
mod github_test {
    use super::{Location, Tree};
    use crate::Error;
    use crate::core::IconSet;

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_raw_urls() {
        assert_eq!(
            Location::parse(IconSet::PogoOptimized.url()).unwrap(),
            Location {
                user: "whitewillem".to_owned(),
                repository: "PogoAssets".to_owned(),
                branch: "resized".to_owned(),
                directory: "no_border/".to_owned(),
            }
        );

        assert_eq!(Location::parse(IconSet::Pogo.url()).unwrap().directory, "");
    }

    #[test]
    fn every_iconset_has_a_location() {
        for iconset in IconSet::ALL {
            assert_matches!(Location::parse(iconset.url()), Ok(_));
        }
    }

    #[test]
    fn rejects_other_hosts() {
        assert_matches!(
            Location::parse("https://example.com/icons/"),
            Err(Error::InvalidManifestUrl(url)) if url == "https://example.com/icons/"
        );
    }

    #[test]
    fn keeps_files_below_directory() {
        let tree: Tree = serde_json::from_str(
            r#"{
                "sha": "abc",
                "tree": [
                    { "path": "no_border", "type": "tree" },
                    { "path": "no_border/pokemon_icon_001_00.png", "type": "blob" },
                    { "path": "icons_large/pokemon_icon_001_00.png", "type": "blob" }
                ],
                "truncated": false
            }"#,
        )
        .unwrap();

        assert_eq!(
            tree.files("no_border/").collect::<Vec<_>>(),
            vec!["no_border/pokemon_icon_001_00.png".to_owned()]
        );
    }
}
