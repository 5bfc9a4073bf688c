use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, Screen};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.message = None;
            request_page(state)
        }

        Action::ListFetch => request_page(state),

        Action::ListNearEnd => {
            if state.screen != Screen::List || !state.near_end() {
                return DispatchResult::unchanged();
            }
            request_page(state)
        }

        Action::ListDidLoad {
            offset,
            entries,
            has_more,
        } => {
            if !state.list_loading || offset != state.offset {
                return DispatchResult::unchanged();
            }
            state.entries.extend(entries);
            state.offset += state.page_size;
            state.has_more = has_more;
            state.list_loading = false;
            state.list_error = None;
            state.rebuild_filtered();
            changed_with_sprite(state, None)
        }

        Action::ListDidError { offset, error } => {
            if !state.list_loading || offset != state.offset {
                return DispatchResult::unchanged();
            }
            state.list_loading = false;
            state.list_error = Some(error);
            DispatchResult::changed()
        }

        Action::ListSelect(index) => {
            if !state.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            let page = near_end_page(state);
            changed_with_sprite(state, page)
        }

        Action::ListOpenSelected => {
            if state.screen != Screen::List || state.search.active {
                return DispatchResult::unchanged();
            }
            let Some(entry) = state.selected_entry() else {
                return DispatchResult::unchanged();
            };
            let id = entry.id.clone();
            state.message = None;
            DispatchResult::changed_with(Effect::StoreSelection { id })
        }

        Action::SelectionMove(delta) => move_selection(state, delta),

        Action::SelectionPage(delta) => {
            let page = i16::try_from(list_page_size(state)).unwrap_or(i16::MAX);
            move_selection(state, delta.saturating_mul(page))
        }

        Action::SelectionJumpTop => {
            if !state.set_selected_index(0) {
                return DispatchResult::unchanged();
            }
            changed_with_sprite(state, None)
        }

        Action::SelectionJumpBottom => {
            let last = state.filtered_indices.len().saturating_sub(1);
            if !state.set_selected_index(last) {
                return DispatchResult::unchanged();
            }
            let page = near_end_page(state);
            changed_with_sprite(state, page)
        }

        Action::SearchStart => {
            if state.screen != Screen::List || state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.rebuild_filtered();
            changed_with_sprite(state, None)
        }

        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            changed_with_sprite(state, None)
        }

        // Filtering never pages: a narrow filter would otherwise walk the
        // whole catalog looking for matches.
        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.selected_index = 0;
            state.rebuild_filtered();
            changed_with_sprite(state, None)
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.selected_index = 0;
            state.rebuild_filtered();
            changed_with_sprite(state, None)
        }

        Action::HandoffDidStore { id } => {
            state.screen = Screen::Detail;
            state.detail_id = Some(id.clone());
            state.detail = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadDetail { id })
        }

        Action::HandoffDidError { id, error } => {
            state.message = Some(format!("Could not open #{id}: {error}"));
            DispatchResult::changed()
        }

        Action::DetailDidLoad(record) => {
            if state.screen != Screen::Detail || !state.detail.is_loading() {
                return DispatchResult::unchanged();
            }
            if state.detail_id.as_deref() != Some(record.id.as_str()) {
                return DispatchResult::unchanged();
            }
            state.detail = DataResource::Loaded(record);
            changed_with_sprite(state, None)
        }

        Action::DetailDidError { id, error } => {
            if state.screen != Screen::Detail || !state.detail.is_loading() {
                return DispatchResult::unchanged();
            }
            if state.detail_id.as_deref() != Some(id.as_str()) {
                return DispatchResult::unchanged();
            }
            state.detail = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::DetailBack => {
            if state.screen != Screen::Detail {
                return DispatchResult::unchanged();
            }
            state.screen = Screen::List;
            state.detail = DataResource::Empty;
            state.detail_id = None;
            changed_with_sprite(state, None)
        }

        Action::SpriteDidLoad { url, sprite } => {
            if state.sprite_loading.as_deref() == Some(url.as_str()) {
                state.sprite_loading = None;
            }
            state.sprites.insert(url, sprite);
            DispatchResult::changed()
        }

        Action::SpriteDidError { url, .. } => {
            if state.sprite_loading.as_deref() == Some(url.as_str()) {
                state.sprite_loading = None;
            }
            state.failed_sprites.insert(url);
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn request_page(state: &mut AppState) -> DispatchResult<Effect> {
    match next_page(state) {
        Some(effect) => DispatchResult::changed_with(effect),
        None => DispatchResult::unchanged(),
    }
}

/// Marks the list busy and returns the fetch for the current cursor.
fn next_page(state: &mut AppState) -> Option<Effect> {
    if !state.can_load_more() {
        return None;
    }
    state.list_loading = true;
    state.list_error = None;
    Some(Effect::LoadPage {
        offset: state.offset,
        limit: state.page_size,
    })
}

/// Page request for a selection that landed near the end of the list.
fn near_end_page(state: &mut AppState) -> Option<Effect> {
    if state.screen == Screen::List && state.list_error.is_none() && state.near_end() {
        return next_page(state);
    }
    None
}

/// Sprite fetch for what the screen currently shows, unless it is cached,
/// known to fail, or already on its way. Nothing is fetched while typing a
/// search query.
fn next_sprite(state: &mut AppState) -> Option<Effect> {
    if state.screen == Screen::List && state.search.active {
        return None;
    }
    let url = state.wanted_sprite_url()?.to_string();
    if state.sprites.contains_key(&url)
        || state.failed_sprites.contains(&url)
        || state.sprite_loading.as_deref() == Some(url.as_str())
    {
        return None;
    }
    state.sprite_loading = Some(url.clone());
    Some(Effect::LoadSprite { url })
}

fn changed_with_sprite(state: &mut AppState, page: Option<Effect>) -> DispatchResult<Effect> {
    let effects: Vec<Effect> = page.into_iter().chain(next_sprite(state)).collect();
    if effects.is_empty() {
        DispatchResult::changed()
    } else {
        DispatchResult::changed_with_many(effects)
    }
}

fn move_selection(state: &mut AppState, delta: i16) -> DispatchResult<Effect> {
    let mut index = state.selected_index as i64 + i64::from(delta);
    if index < 0 {
        index = 0;
    }
    if !state.set_selected_index(index as usize) {
        if delta > 0 {
            // Already on the last row; scrolling further still asks for more.
            return reducer(state, Action::ListNearEnd);
        }
        return DispatchResult::unchanged();
    }
    let page = near_end_page(state);
    changed_with_sprite(state, page)
}

fn list_page_size(state: &AppState) -> usize {
    state.terminal_size.1.saturating_sub(8).max(1) as usize
}
