//! PokeAPI catalog client

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinSet;

use crate::sprite::{decode_sprite, SpriteData};
use crate::state::{DetailRecord, StatEntry, SummaryEntry};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_SPRITE_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("{url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Raw GET access to the catalog, so the page logic can run without a network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeName {
    name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    next: Option<String>,
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypesResponse {
    types: Vec<PokemonTypeSlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    height: u16,
    weight: u16,
    sprites: PokemonSprites,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSprites {
    front_default: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: TypeName,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: TypeName,
}

/// One committed-or-discarded unit of list loading.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub entries: Vec<SummaryEntry>,
    pub has_more: bool,
}

#[derive(Clone)]
pub struct Catalog {
    transport: Arc<dyn Transport>,
    api_base: String,
    sprite_base: String,
}

impl Catalog {
    pub fn new(
        transport: Arc<dyn Transport>,
        api_base: impl Into<String>,
        sprite_base: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            sprite_base: sprite_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn http(api_base: impl Into<String>, sprite_base: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpTransport::new()), api_base, sprite_base)
    }

    /// Fetches `limit` entries starting at `offset` and resolves the types of
    /// each one concurrently.
    ///
    /// Entries come back in list order. The first failing request aborts the
    /// remaining ones and fails the whole page.
    pub async fn load_page(&self, offset: u32, limit: u32) -> Result<Page, FetchError> {
        let url = format!("{}/pokemon?limit={limit}&offset={offset}", self.api_base);
        let list: ListResponse = self.fetch_json(&url).await?;

        let mut pending = Vec::with_capacity(list.results.len());
        for reference in list.results {
            let id = id_from_resource_url(&reference.url).ok_or_else(|| {
                FetchError::Parse(format!("no numeric id in {}", reference.url))
            })?;
            pending.push((id, reference));
        }

        let mut slots: Vec<Option<SummaryEntry>> = vec![None; pending.len()];
        let mut join_set = JoinSet::new();
        for (index, (id, reference)) in pending.into_iter().enumerate() {
            let catalog = self.clone();
            join_set.spawn(async move {
                let detail: PokemonTypesResponse = catalog.fetch_json(&reference.url).await?;
                let entry = SummaryEntry {
                    image_url: sprite_url(&catalog.sprite_base, &id),
                    id,
                    name: reference.name,
                    types: detail
                        .types
                        .into_iter()
                        .map(|slot| slot.type_info.name)
                        .collect(),
                };
                Ok::<_, FetchError>((index, entry))
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let outcome = joined.map_err(|err| FetchError::Network(err.to_string()))?;
            match outcome {
                Ok((index, entry)) => slots[index] = Some(entry),
                Err(err) => {
                    join_set.abort_all();
                    return Err(err);
                }
            }
        }

        let entries = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| FetchError::Parse("page finished with missing entries".into()))?;
        tracing::info!(offset, count = entries.len(), "page loaded");
        Ok(Page {
            entries,
            has_more: list.next.is_some(),
        })
    }

    pub async fn fetch_detail(&self, id: &str) -> Result<DetailRecord, FetchError> {
        let url = format!("{}/pokemon/{id}", self.api_base);
        let response: PokemonResponse = self.fetch_json(&url).await?;
        Ok(DetailRecord {
            id: response.id.to_string(),
            name: response.name,
            sprite_url: response.sprites.front_default,
            height: response.height,
            weight: response.weight,
            types: response
                .types
                .into_iter()
                .map(|slot| slot.type_info.name)
                .collect(),
            stats: response
                .stats
                .into_iter()
                .map(|slot| StatEntry {
                    name: slot.stat.name,
                    base_value: slot.base_stat,
                })
                .collect(),
        })
    }

    pub async fn fetch_sprite(&self, url: &str) -> Result<SpriteData, FetchError> {
        let bytes = self.transport.get_bytes(url).await?;
        let sprite = decode_sprite(&bytes).map_err(|err| FetchError::Decode {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        tracing::debug!(%url, width = sprite.width, height = sprite.height, "sprite decoded");
        Ok(sprite)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let bytes = self.transport.get_bytes(url).await?;
        serde_json::from_slice(&bytes).map_err(|err| FetchError::Parse(format!("{url}: {err}")))
    }
}

/// Numeric id from a resource URL such as `.../pokemon/25/`.
pub fn id_from_resource_url(url: &str) -> Option<String> {
    let segment = url.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(segment.to_string())
}

pub fn sprite_url(sprite_base: &str, id: &str) -> String {
    format!("{}/{id}.png", sprite_base.trim_end_matches('/'))
}
