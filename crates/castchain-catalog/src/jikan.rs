//! Jikan (MyAnimeList) catalog adapter.

use std::time::Duration;

use async_trait::async_trait;
use castchain_chain::{CastMember, ItemId, PersonId, Role};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::gateway::{CatalogGateway, ItemDisplay};

/// Default public Jikan endpoint.
pub const DEFAULT_JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Voice actor language kept when normalizing rosters.
pub const DEFAULT_CAST_LANGUAGE: &str = "Japanese";

/// HTTP client for the Jikan v4 API.
#[derive(Debug, Clone)]
pub struct JikanCatalog {
    client: Client,
    base_url: String,
    language: String,
}

impl JikanCatalog {
    /// Creates a client with a request timeout.
    #[must_use]
    pub fn new(base_url: &str, language: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            language: language.to_owned(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        item_id: ItemId,
        path: &str,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "catalog request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::lookup_failed(item_id, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "catalog returned an error status");
            return Err(CatalogError::lookup_failed(
                item_id,
                format!("unexpected status {status}"),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::lookup_failed(item_id, e))
    }
}

impl Default for JikanCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_JIKAN_BASE_URL,
            DEFAULT_CAST_LANGUAGE,
            Duration::from_secs(10),
        )
    }
}

#[async_trait]
impl CatalogGateway for JikanCatalog {
    async fn lookup_roster(&self, item_id: ItemId) -> Result<Vec<CastMember>, CatalogError> {
        let response: CharactersResponse = self
            .get_json(item_id, &format!("/anime/{item_id}/characters"))
            .await?;
        Ok(normalize_characters(response, &self.language))
    }

    async fn lookup_display(&self, item_id: ItemId) -> Result<ItemDisplay, CatalogError> {
        let response: AnimeResponse = self.get_json(item_id, &format!("/anime/{item_id}")).await?;
        Ok(normalize_display(item_id, response))
    }
}

// Raw payloads. Every field the API may omit is optional; nothing here
// leaves this module.

#[derive(Debug, Deserialize)]
struct CharactersResponse {
    #[serde(default)]
    data: Vec<CharacterEntry>,
}

#[derive(Debug, Deserialize)]
struct CharacterEntry {
    character: RawCharacter,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    voice_actors: Vec<RawVoiceActor>,
}

#[derive(Debug, Deserialize)]
struct RawCharacter {
    name: String,
    #[serde(default)]
    images: Option<RawImages>,
}

#[derive(Debug, Deserialize)]
struct RawVoiceActor {
    person: RawPerson,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPerson {
    mal_id: PersonId,
    name: String,
    #[serde(default)]
    images: Option<RawImages>,
}

#[derive(Debug, Default, Deserialize)]
struct RawImages {
    #[serde(default)]
    jpg: Option<RawImage>,
    #[serde(default)]
    webp: Option<RawImage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawImage {
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnimeResponse {
    data: RawAnime,
}

#[derive(Debug, Deserialize)]
struct RawAnime {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    title_english: Option<String>,
    #[serde(default)]
    images: Option<RawImages>,
}

impl RawImages {
    fn best_url(&self) -> Option<String> {
        self.webp
            .as_ref()
            .and_then(|i| i.image_url.clone())
            .or_else(|| self.jpg.as_ref().and_then(|i| i.image_url.clone()))
    }
}

fn parse_role(role: Option<&str>) -> Role {
    match role {
        Some(r) if r.eq_ignore_ascii_case("main") => Role::Main,
        _ => Role::Supporting,
    }
}

/// One row per character, voiced by the first actor in `language`.
/// Characters without such an actor are dropped.
fn normalize_characters(response: CharactersResponse, language: &str) -> Vec<CastMember> {
    response
        .data
        .into_iter()
        .filter_map(|entry| {
            let actor = entry.voice_actors.into_iter().find(|va| {
                va.language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(language))
            })?;

            Some(CastMember {
                person_id: actor.person.mal_id,
                person_name: actor.person.name,
                person_image_url: actor.person.images.as_ref().and_then(RawImages::best_url),
                character_name: entry.character.name,
                character_image_url: entry
                    .character
                    .images
                    .as_ref()
                    .and_then(RawImages::best_url),
                role: parse_role(entry.role.as_deref()),
            })
        })
        .collect()
}

fn normalize_display(item_id: ItemId, response: AnimeResponse) -> ItemDisplay {
    ItemDisplay {
        item_id,
        title: response.data.title,
        english_title: response.data.title_english,
        image_url: response.data.images.as_ref().and_then(RawImages::best_url),
    }
}
