//! Selection handoff into the detail loader, against a canned catalog

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pokedex::api::{Catalog, FetchError, Transport};
use pokedex::detail::{load_detail, DetailError};
use pokedex::handoff::{FileStore, SelectionHandoff};
use pretty_assertions::assert_eq;

const BASE: &str = "https://api.test/v2";
const SPRITES: &str = "https://sprites.test";

/// Serves fixed bodies by URL and remembers what was requested.
#[derive(Default)]
struct CannedTransport {
    bodies: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl CannedTransport {
    fn with(mut self, url: &str, body: String) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .map(|body| body.clone().into_bytes())
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn pokemon_body(id: u32, name: &str, height: u16, weight: u16, types: &[&str]) -> String {
    let types: Vec<String> = types
        .iter()
        .enumerate()
        .map(|(slot, t)| {
            format!(r#"{{"slot":{},"type":{{"name":"{t}","url":"{BASE}/type/1/"}}}}"#, slot + 1)
        })
        .collect();
    format!(
        r#"{{
            "id": {id},
            "name": "{name}",
            "height": {height},
            "weight": {weight},
            "sprites": {{"front_default": "{SPRITES}/{id}.png"}},
            "types": [{}],
            "stats": [
                {{"base_stat": 78, "effort": 0, "stat": {{"name": "hp", "url": "{BASE}/stat/1/"}}}},
                {{"base_stat": 84, "effort": 0, "stat": {{"name": "attack", "url": "{BASE}/stat/2/"}}}},
                {{"base_stat": 100, "effort": 0, "stat": {{"name": "speed", "url": "{BASE}/stat/6/"}}}}
            ]
        }}"#,
        types.join(",")
    )
}

fn catalog(transport: Arc<CannedTransport>) -> Catalog {
    Catalog::new(transport, BASE, SPRITES)
}

#[tokio::test]
async fn detail_reads_the_handed_off_id() {
    let transport = Arc::new(CannedTransport::default().with(
        &format!("{BASE}/pokemon/25"),
        pokemon_body(25, "pikachu", 4, 60, &["electric"]),
    ));
    let handoff = SelectionHandoff::in_memory();

    handoff.select("25").await.unwrap();
    let record = load_detail(&handoff, &catalog(Arc::clone(&transport)))
        .await
        .unwrap();

    assert_eq!(record.id, "25");
    assert_eq!(record.display_name(), "Pikachu");
    assert_eq!(transport.requested(), vec![format!("{BASE}/pokemon/25")]);
}

#[tokio::test]
async fn charizard_detail_is_scaled_for_display() {
    let transport = Arc::new(CannedTransport::default().with(
        &format!("{BASE}/pokemon/6"),
        pokemon_body(6, "charizard", 17, 905, &["fire", "flying"]),
    ));
    let handoff = SelectionHandoff::in_memory();
    handoff.select("6").await.unwrap();

    let record = load_detail(&handoff, &catalog(transport)).await.unwrap();

    assert_eq!(record.display_name(), "Charizard");
    assert_eq!(record.types, vec!["fire", "flying"]);
    assert_eq!(record.height_m(), 1.7);
    assert_eq!(record.weight_kg(), 90.5);
    assert_eq!(record.sprite_url.as_deref(), Some("https://sprites.test/6.png"));
    let stats: Vec<_> = record.stats.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(stats, vec!["hp", "attack", "speed"]);
}

#[tokio::test]
async fn empty_slot_is_missing_selection() {
    let transport = Arc::new(CannedTransport::default());
    let handoff = SelectionHandoff::in_memory();

    let err = load_detail(&handoff, &catalog(Arc::clone(&transport)))
        .await
        .unwrap_err();

    assert_eq!(err, DetailError::MissingSelection);
    assert!(transport.requested().is_empty());
}

#[tokio::test]
async fn later_selection_replaces_earlier_one() {
    let transport = Arc::new(
        CannedTransport::default()
            .with(
                &format!("{BASE}/pokemon/4"),
                pokemon_body(4, "charmander", 6, 85, &["fire"]),
            )
            .with(
                &format!("{BASE}/pokemon/7"),
                pokemon_body(7, "squirtle", 5, 90, &["water"]),
            ),
    );
    let handoff = SelectionHandoff::in_memory();

    handoff.select("4").await.unwrap();
    handoff.select("7").await.unwrap();
    let record = load_detail(&handoff, &catalog(transport)).await.unwrap();

    assert_eq!(record.name, "squirtle");
}

#[tokio::test]
async fn unknown_id_surfaces_fetch_error() {
    let transport = Arc::new(CannedTransport::default());
    let handoff = SelectionHandoff::in_memory();
    handoff.select("99999").await.unwrap();

    let err = load_detail(&handoff, &catalog(transport)).await.unwrap_err();

    assert!(matches!(
        err,
        DetailError::Fetch(FetchError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn file_backed_handoff_reaches_a_fresh_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("handoff.json");
    let transport = Arc::new(CannedTransport::default().with(
        &format!("{BASE}/pokemon/1"),
        pokemon_body(1, "bulbasaur", 7, 69, &["grass", "poison"]),
    ));

    SelectionHandoff::new(Arc::new(FileStore::new(&path)))
        .select("1")
        .await
        .unwrap();
    let reader = SelectionHandoff::new(Arc::new(FileStore::new(&path)));
    let record = load_detail(&reader, &catalog(transport)).await.unwrap();

    assert_eq!(record.id, "1");
    assert_eq!(record.height_m(), 0.7);
    assert_eq!(record.weight_kg(), 6.9);
}
