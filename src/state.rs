//! Application state - single source of truth

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::sprite::SpriteData;

/// Entries requested per list page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Rows from the end of the filtered list at which another page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// One row of the list screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub name: String,
    pub base_value: u16,
}

/// Full record shown on the detail screen.
///
/// `height` is in decimetres and `weight` in hectograms, as served by the
/// catalog; use [`DetailRecord::height_m`] and [`DetailRecord::weight_kg`] for
/// display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: String,
    pub name: String,
    pub sprite_url: Option<String>,
    pub height: u16,
    pub weight: u16,
    pub types: Vec<String>,
    pub stats: Vec<StatEntry>,
}

impl DetailRecord {
    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }

    pub fn height_m(&self) -> f32 {
        f32::from(self.height) / 10.0
    }

    pub fn weight_kg(&self) -> f32 {
        f32::from(self.weight) / 10.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    List,
    Detail,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,

    pub entries: Vec<SummaryEntry>,
    pub filtered_indices: Vec<usize>,
    pub selected_index: usize,
    pub search: SearchState,

    /// Pagination cursor: offset of the next page to request.
    pub offset: u32,
    pub page_size: u32,
    pub has_more: bool,
    /// Busy flag shared by the initial load and "load more".
    pub list_loading: bool,
    pub list_error: Option<String>,

    pub detail_id: Option<String>,
    pub detail: DataResource<DetailRecord>,

    /// Decoded sprites keyed by URL; left out of state snapshots.
    #[serde(skip)]
    pub sprites: HashMap<String, SpriteData>,
    #[serde(skip)]
    pub failed_sprites: HashSet<String>,
    pub sprite_loading: Option<String>,

    pub message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl AppState {
    pub fn new(page_size: u32) -> Self {
        Self {
            terminal_size: (80, 24),
            screen: Screen::List,
            entries: Vec::new(),
            filtered_indices: Vec::new(),
            selected_index: 0,
            search: SearchState::default(),
            offset: 0,
            page_size: page_size.max(1),
            has_more: true,
            list_loading: false,
            list_error: None,
            detail_id: None,
            detail: DataResource::Empty,
            sprites: HashMap::new(),
            failed_sprites: HashSet::new(),
            sprite_loading: None,
            message: None,
        }
    }

    pub fn filtered_entries(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.filtered_indices
            .iter()
            .filter_map(|idx| self.entries.get(*idx))
    }

    pub fn selected_entry(&self) -> Option<&SummaryEntry> {
        self.filtered_indices
            .get(self.selected_index)
            .and_then(|idx| self.entries.get(*idx))
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.filtered_indices.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(self.filtered_indices.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn rebuild_filtered(&mut self) {
        self.filtered_indices = filter_indices(&self.entries, &self.search.query);
        if self.selected_index >= self.filtered_indices.len() {
            self.selected_index = 0;
        }
    }

    /// Whether the selection sits close enough to the end of the filtered
    /// list that the next page should be requested.
    pub fn near_end(&self) -> bool {
        let remaining = self
            .filtered_indices
            .len()
            .saturating_sub(self.selected_index + 1);
        remaining <= LOAD_MORE_THRESHOLD
    }

    /// Sprite for whatever the current screen shows: the selected row on the
    /// list, the loaded record on the detail screen.
    pub fn wanted_sprite_url(&self) -> Option<&str> {
        let url = match self.screen {
            Screen::List => self.selected_entry().map(|entry| entry.image_url.as_str()),
            Screen::Detail => self
                .detail
                .data()
                .and_then(|record| record.sprite_url.as_deref()),
        }?;
        (!url.is_empty()).then_some(url)
    }

    pub fn current_sprite(&self) -> Option<&SpriteData> {
        self.wanted_sprite_url().and_then(|url| self.sprites.get(url))
    }

    pub fn can_load_more(&self) -> bool {
        !self.list_loading && self.has_more
    }
}

/// Positions of the entries whose name contains `query`, ignoring case.
///
/// A blank query matches everything.
pub fn filter_indices(entries: &[SummaryEntry], query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| query.is_empty() || entry.name.to_lowercase().contains(&query))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn apply_filter<'a>(entries: &'a [SummaryEntry], query: &str) -> Vec<&'a SummaryEntry> {
    filter_indices(entries, query)
        .into_iter()
        .map(|idx| &entries[idx])
        .collect()
}

/// Uppercases the first letter of every hyphen-separated part.
pub fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("List")
                .entry("screen", ron_string(&self.screen))
                .entry("total", ron_string(&self.entries.len()))
                .entry("filtered", ron_string(&self.filtered_indices.len()))
                .entry("selected", ron_string(&self.selected_index))
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active)),
            DebugSection::new("Paging")
                .entry("offset", ron_string(&self.offset))
                .entry("page_size", ron_string(&self.page_size))
                .entry("has_more", ron_string(&self.has_more))
                .entry("list_loading", ron_string(&self.list_loading))
                .entry("list_error", ron_string(&self.list_error)),
            DebugSection::new("Detail")
                .entry("id", ron_string(&self.detail_id))
                .entry("loading", ron_string(&self.detail.is_loading()))
                .entry("failed", ron_string(&self.detail.is_failed()))
                .entry("sprites", ron_string(&self.sprites.len()))
                .entry("sprite_loading", ron_string(&self.sprite_loading))
                .entry("message", ron_string(&self.message)),
        ]
    }
}
