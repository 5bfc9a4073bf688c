//! List, paging and selection flows driven through EffectStoreTestHarness
//!
//! Async completions are simulated with `complete_action`, so these run
//! without a network or a terminal.

use pokedex::{
    action::Action,
    effect::Effect,
    reducer::reducer,
    state::{AppState, DetailRecord, Screen, StatEntry, SummaryEntry},
    ui,
};
use pretty_assertions::assert_eq;
use tui_dispatch::testing::*;
use tui_dispatch::{EffectStore, NumericComponentId};

const PAGE: u32 = 20;

fn entry(n: u32, name: &str, types: &[&str]) -> SummaryEntry {
    SummaryEntry {
        id: n.to_string(),
        name: name.to_string(),
        image_url: format!(
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/{n}.png"
        ),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

fn numbered_page(offset: u32) -> Vec<SummaryEntry> {
    (offset + 1..=offset + PAGE)
        .map(|n| entry(n, &format!("mon-{n}"), &["normal"]))
        .collect()
}

fn first_page_with_starters() -> Vec<SummaryEntry> {
    let mut entries = vec![
        entry(1, "bulbasaur", &["grass", "poison"]),
        entry(2, "ivysaur", &["grass", "poison"]),
        entry(3, "venusaur", &["grass", "poison"]),
        entry(4, "charmander", &["fire"]),
        entry(5, "charmeleon", &["fire"]),
        entry(6, "charizard", &["fire", "flying"]),
    ];
    entries.extend((7..=PAGE).map(|n| entry(n, &format!("mon-{n}"), &["water"])));
    entries
}

fn charizard() -> DetailRecord {
    DetailRecord {
        id: "6".into(),
        name: "charizard".into(),
        sprite_url: Some("https://sprites.test/6.png".into()),
        height: 17,
        weight: 905,
        types: vec!["fire".into(), "flying".into()],
        stats: vec![StatEntry {
            name: "hp".into(),
            base_value: 78,
        }],
    }
}

fn did_load(offset: u32, entries: Vec<SummaryEntry>, has_more: bool) -> Action {
    Action::ListDidLoad {
        offset,
        entries,
        has_more,
    }
}

#[test]
fn consecutive_pages_accumulate_and_advance_cursor() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::Init);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 0, limit: 20 }));
    harness.complete_action(did_load(0, numbered_page(0), true));
    harness.process_emitted();
    harness
        .drain_effects()
        .effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));

    harness.dispatch_collect(Action::ListFetch);
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 20, .. }));
    harness.complete_action(did_load(20, numbered_page(20), true));
    harness.process_emitted();

    harness.dispatch_collect(Action::ListFetch);
    harness.drain_effects();
    harness.complete_action(did_load(40, numbered_page(40), true));
    harness.process_emitted();

    harness.assert_state(|s| s.entries.len() == 60);
    harness.assert_state(|s| s.offset == 60);
    harness.assert_state(|s| !s.list_loading);
    harness.assert_state(|s| {
        s.entries
            .iter()
            .map(|e| e.id.parse::<u32>().unwrap_or_default())
            .eq(1..=60)
    });
}

#[test]
fn failed_page_keeps_list_and_cursor() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(did_load(0, numbered_page(0), true));
    harness.process_emitted();

    harness.dispatch_collect(Action::ListFetch);
    harness.drain_effects();
    harness.complete_action(Action::ListDidError {
        offset: 20,
        error: "request failed: connection reset".into(),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.entries.len() == 20);
    harness.assert_state(|s| s.offset == 20);
    harness.assert_state(|s| !s.list_loading);
    harness.assert_state(|s| s.list_error.is_some());

    // Retry asks for the same page again.
    harness.dispatch_collect(Action::ListFetch);
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 20, .. }));
}

#[test]
fn failed_first_page_leaves_empty_list() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();

    harness.complete_action(Action::ListDidError {
        offset: 0,
        error: "boom".into(),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.entries.is_empty());
    harness.assert_state(|s| s.offset == 0);
    harness.assert_state(|s| !s.list_loading);
}

#[test]
fn load_more_while_busy_issues_nothing() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    let first = store.dispatch(Action::Init);
    assert_eq!(first.effects.len(), 1);

    let again = store.dispatch(Action::ListFetch);
    assert!(!again.changed);
    assert!(again.effects.is_empty());

    let near_end = store.dispatch(Action::ListNearEnd);
    assert!(near_end.effects.is_empty());
    assert!(store.state().list_loading);
}

#[test]
fn end_of_catalog_stops_paging() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(did_load(0, numbered_page(0)[..7].to_vec(), false));
    harness.process_emitted();
    harness.drain_effects();

    harness.assert_state(|s| !s.has_more);
    harness.dispatch_collect(Action::SelectionJumpBottom);
    harness
        .drain_effects()
        .effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));
    harness.dispatch_collect(Action::ListFetch);
    let effects = harness.drain_effects();
    effects.effects_empty();
}

#[test]
fn scrolling_near_the_end_requests_next_page() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(did_load(0, numbered_page(0), true));
    harness.process_emitted();
    harness.drain_effects();

    harness.dispatch_collect(Action::SelectionMove(3));
    harness
        .drain_effects()
        .effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));
    harness.assert_state(|s| !s.list_loading);

    harness.dispatch_collect(Action::SelectionMove(12));
    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 20, .. }));
    effects.effects_any_matches(|e| matches!(e, Effect::LoadSprite { url } if url.ends_with("/16.png")));
}

#[test]
fn search_narrows_loaded_entries_without_fetching() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(did_load(0, first_page_with_starters(), true));
    harness.process_emitted();
    harness.drain_effects();

    harness.dispatch_collect(Action::SearchStart);
    for ch in "char".chars() {
        harness.dispatch_collect(Action::SearchInput(ch));
    }
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| !s.list_loading);
    harness.dispatch_collect(Action::SearchSubmit);
    harness
        .drain_effects()
        .effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));

    harness.assert_state(|s| {
        s.filtered_entries()
            .map(|e| e.name.as_str())
            .eq(["charmander", "charmeleon", "charizard"])
    });
    harness.assert_state(|s| s.entries.len() == 20);

    harness.dispatch_collect(Action::SearchCancel);
    harness.assert_state(|s| s.filtered_indices.len() == 20);
}

#[test]
fn unmatched_filter_does_not_walk_the_catalog() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();

    harness.dispatch_collect(Action::SearchStart);
    for ch in "zzz".chars() {
        harness.dispatch_collect(Action::SearchInput(ch));
    }
    harness.drain_effects().effects_empty();

    harness.complete_action(did_load(0, numbered_page(0), true));
    harness.process_emitted();

    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.filtered_indices.is_empty());
    harness.assert_state(|s| s.entries.len() == 20);
    harness.assert_state(|s| s.offset == 20);
    harness.assert_state(|s| !s.list_loading);

    // Leaving the filter on submit still does not page by itself.
    harness.dispatch_collect(Action::SearchSubmit);
    harness
        .drain_effects()
        .effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));
    harness.assert_state(|s| !s.list_loading);
}

#[test]
fn opening_an_entry_hands_off_then_loads_detail() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(did_load(0, first_page_with_starters(), true));
    harness.process_emitted();
    harness.drain_effects();

    harness.dispatch_collect(Action::ListSelect(5));
    harness.drain_effects();
    harness.dispatch_collect(Action::ListOpenSelected);
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::StoreSelection { id } if id == "6"));
    harness.assert_state(|s| s.screen == Screen::List);

    harness.complete_action(Action::HandoffDidStore { id: "6".into() });
    harness.process_emitted();
    harness.assert_state(|s| s.screen == Screen::Detail);
    harness.assert_state(|s| s.detail.is_loading());
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::LoadDetail { id } if id == "6"));

    harness.complete_action(Action::DetailDidLoad(charizard()));
    harness.process_emitted();
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::LoadSprite { url } if url == "https://sprites.test/6.png"));
    harness.assert_state(|s| s.detail.data().map(|d| d.height_m()) == Some(1.7));
    harness.assert_state(|s| s.detail.data().map(|d| d.weight_kg()) == Some(90.5));

    harness.dispatch_collect(Action::DetailBack);
    harness.assert_state(|s| s.screen == Screen::List);
    harness.assert_state(|s| s.entries.len() == 20);
}

#[test]
fn failed_handoff_stays_on_list() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(did_load(0, first_page_with_starters(), true));
    harness.process_emitted();

    harness.complete_action(Action::HandoffDidError {
        id: "1".into(),
        error: "store i/o failed: read-only".into(),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.screen == Screen::List);
    harness.assert_state(|s| s.detail.is_empty());
    harness.assert_state(|s| {
        s.message
            .as_deref()
            .is_some_and(|m| m.starts_with("Could not open #1"))
    });
}

#[test]
fn retry_key_dispatches_fetch() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    let mut list = tui_dispatch_components::SelectList::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("r", |state, event| {
        ui::handle_list_event(&event.kind, state, &mut list).actions
    });

    actions.assert_count(1);
    actions.assert_first(Action::ListFetch);
}

#[test]
fn back_key_leaves_detail() {
    let state = AppState {
        screen: Screen::Detail,
        ..Default::default()
    };
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    let actions = harness.send_keys::<NumericComponentId, _, _>("b", |state, event| {
        ui::handle_detail_event(&event.kind, state).actions
    });
    actions.assert_first(Action::DetailBack);

    for action in actions {
        harness.dispatch_collect(action);
    }
    harness.assert_state(|s| s.screen == Screen::List);
}
