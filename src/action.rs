use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::{DetailRecord, SummaryEntry};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    /// Request the page at the current cursor (no-op while one is in flight).
    ListFetch,
    /// The UI scrolled near the end of the rendered list.
    ListNearEnd,
    ListDidLoad {
        offset: u32,
        entries: Vec<SummaryEntry>,
        has_more: bool,
    },
    ListDidError {
        offset: u32,
        error: String,
    },
    ListSelect(usize),
    ListOpenSelected,

    SelectionMove(i16),
    SelectionPage(i16),
    SelectionJumpTop,
    SelectionJumpBottom,

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    HandoffDidStore { id: String },
    HandoffDidError { id: String, error: String },

    DetailDidLoad(DetailRecord),
    DetailDidError { id: String, error: String },
    DetailBack,

    SpriteDidLoad { url: String, sprite: SpriteData },
    SpriteDidError { url: String, error: String },

    UiTerminalResize(u16, u16),
    Quit,
}
