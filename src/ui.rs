use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventContext, EventKind, HandlerResponse, RenderContext};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::sprite::SpriteView;
use crate::state::{title_case, AppState, Screen};

const BG_BASE: Color = Color::Rgb(18, 14, 16);
const BG_PANEL: Color = Color::Rgb(30, 24, 28);
const BG_HIGHLIGHT: Color = Color::Rgb(120, 24, 30);
const TEXT_MAIN: Color = Color::Rgb(242, 238, 236);
const TEXT_DIM: Color = Color::Rgb(180, 170, 168);
const ACCENT_RED: Color = Color::Rgb(234, 28, 36);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);

const PREVIEW_WIDTH: u16 = 24;
/// Narrower list bodies drop the sprite preview column.
const PREVIEW_MIN_WIDTH: u16 = 64;
const DETAIL_SPRITE_MIN_WIDTH: u16 = 40;
const DETAIL_SPRITE_MAX_WIDTH: u16 = 32;

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PokedexComponentId {
    Search,
    List,
    Detail,
}

pub struct PokedexUi {
    list: SelectList,
    status_bar: StatusBar,
}

impl Default for PokedexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl PokedexUi {
    pub fn new() -> Self {
        Self {
            list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state);
        match state.screen {
            Screen::List => {
                event_ctx.component_areas.remove(&PokedexComponentId::Detail);
                event_ctx.set_component_area(PokedexComponentId::List, layout[1]);
                if state.search.active {
                    event_ctx.set_component_area(PokedexComponentId::Search, layout[0]);
                } else {
                    event_ctx.component_areas.remove(&PokedexComponentId::Search);
                }
                render_list(frame, layout[1], state, &mut self.list);
            }
            Screen::Detail => {
                event_ctx.component_areas.remove(&PokedexComponentId::List);
                event_ctx.component_areas.remove(&PokedexComponentId::Search);
                event_ctx.set_component_area(PokedexComponentId::Detail, layout[1]);
                render_detail(frame, layout[1], state);
            }
        }
        render_footer(frame, layout[2], state, &mut self.status_bar);
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.list)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_detail_event(event, state)
    }
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Enter => vec![Action::ListOpenSelected],
            crossterm::event::KeyCode::Char('r') => vec![Action::ListFetch],
            crossterm::event::KeyCode::PageDown => vec![Action::SelectionPage(1)],
            crossterm::event::KeyCode::PageUp => vec![Action::SelectionPage(-1)],
            crossterm::event::KeyCode::Home | crossterm::event::KeyCode::Char('g') => {
                vec![Action::SelectionJumpTop]
            }
            crossterm::event::KeyCode::End | crossterm::event::KeyCode::Char('G') => {
                vec![Action::SelectionJumpBottom]
            }
            crossterm::event::KeyCode::Down | crossterm::event::KeyCode::Char('j')
                if state.selected_index + 1 >= state.filtered_indices.len() =>
            {
                vec![Action::ListNearEnd]
            }
            _ => {
                let items = list_items(state);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_index.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::ListSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_detail_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc
            | crossterm::event::KeyCode::Backspace
            | crossterm::event::KeyCode::Char('b') => vec![Action::DetailBack],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let line = Line::from(vec![
        Span::raw("Search: "),
        Span::styled(search, Style::default().fg(ACCENT_GOLD)),
        Span::raw("  |  Loaded: "),
        Span::styled(
            state.entries.len().to_string(),
            Style::default().fg(ACCENT_GOLD),
        ),
        Span::raw("  Showing: "),
        Span::styled(
            state.filtered_indices.len().to_string(),
            Style::default().fg(ACCENT_GOLD),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            "POKEDEX",
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// List screen body: the filtered entries, or a placeholder while empty.
pub fn render_list(frame: &mut Frame, area: Rect, state: &AppState, list: &mut SelectList) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DEX")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.filtered_indices.is_empty() {
        let placeholder = if state.list_loading {
            "Loading Pokédex..."
        } else {
            "No Pokémon found"
        };
        frame.render_widget(
            Paragraph::new(placeholder)
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    }

    let list_area = if inner.width >= PREVIEW_MIN_WIDTH {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(PREVIEW_WIDTH)])
            .split(inner);
        render_sprite_panel(frame, columns[1], state);
        columns[0]
    } else {
        inner
    };

    let items = list_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.selected_index.min(items.len().saturating_sub(1)),
        is_focused: !state.search.active,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::ListSelect,
        render_item: &|item| item.clone(),
    };
    list.render(frame, list_area, props);
}

/// Detail screen body: the record text with its sprite to the right.
pub fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DATA")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text_area = if state.detail.data().is_some() && inner.width >= DETAIL_SPRITE_MIN_WIDTH {
        let sprite_width = (inner.width / 3).min(DETAIL_SPRITE_MAX_WIDTH);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(sprite_width)])
            .split(inner);
        render_sprite_panel(frame, columns[1], state);
        columns[0]
    } else {
        inner
    };
    frame.render_widget(
        Paragraph::new(detail_text(state)).wrap(Wrap { trim: true }),
        text_area,
    );
}

fn render_sprite_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    if let Some(sprite) = state.current_sprite() {
        frame.render_widget(SpriteView(sprite), area);
        return;
    }
    let label = match state.wanted_sprite_url() {
        Some(url) if state.sprite_loading.as_deref() == Some(url) => "Loading sprite...",
        Some(url) if !state.failed_sprites.contains(url) => return,
        _ => "No sprite",
    };
    let line = Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    };
    frame.render_widget(
        Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_DIM)),
        line,
    );
}

pub fn list_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .filtered_entries()
        .map(|entry| {
            Line::from(vec![
                Span::raw(format!("#{:<5}", entry.id)),
                Span::styled(
                    title_case(&entry.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", entry.types.join(", ")),
                    Style::default().fg(TEXT_DIM),
                ),
            ])
        })
        .collect()
}

pub fn detail_text(state: &AppState) -> Text<'static> {
    if state.detail.is_loading() {
        return Text::from("Loading Pokémon...");
    }
    if state.detail.is_failed() {
        return Text::from(vec![
            Line::from(Span::styled(
                "Failed to load Pokémon data.",
                Style::default().fg(ACCENT_RED),
            )),
            Line::from(""),
            Line::from("Press Esc to go back."),
        ]);
    }
    let Some(record) = state.detail.data() else {
        return Text::from("No Pokémon selected.");
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("#{} {}", record.id, record.display_name()),
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Types:  {}", record.types.join(", "))),
        Line::from(format!("Height: {} m", record.height_m())),
        Line::from(format!("Weight: {} kg", record.weight_kg())),
    ];
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "STATS",
        Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
    )));
    lines.extend(record.stats.iter().map(|stat| {
        Line::from(format!(
            "{:<16} {:>3}",
            title_case(&stat.name),
            stat.base_value
        ))
    }));
    Text::from(lines)
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = status_line(state);
    let left_hints = status_hints(state);
    let center_hints = vec![StatusBarHint::new("q", "Quit")];
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_RED)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

pub fn status_line(state: &AppState) -> String {
    if let Some(message) = &state.message {
        return message.clone();
    }
    match state.screen {
        Screen::List => {
            if state.list_loading {
                if state.entries.is_empty() {
                    "Loading pokedex...".to_string()
                } else {
                    "Loading more...".to_string()
                }
            } else if state.list_error.is_some() {
                "Could not load more Pokémon. Press r to retry.".to_string()
            } else if !state.has_more {
                "End of the Pokédex.".to_string()
            } else {
                String::new()
            }
        }
        Screen::Detail => String::new(),
    }
}

fn status_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    if state.search.active {
        return vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Clear"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
    }
    match state.screen {
        Screen::List => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("/", "Search"),
            StatusBarHint::new("r", "Retry"),
        ],
        Screen::Detail => vec![StatusBarHint::new("Esc", "Back")],
    }
}
