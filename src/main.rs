use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api::Catalog;
use pokedex::config::Config;
use pokedex::detail::load_detail;
use pokedex::effect::Effect;
use pokedex::handoff::SelectionHandoff;
use pokedex::logging::init_logging;
use pokedex::reducer::reducer;
use pokedex::state::{AppState, Screen};
use pokedex::ui::{PokedexComponentId, PokedexUi};

const SPRITE_DEBOUNCE: Duration = Duration::from_millis(120);

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse the PokeAPI catalog in the terminal")]
struct Args {
    #[command(flatten)]
    config: Config,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum PokedexContext {
    List,
    Search,
    Detail,
}

impl EventRoutingState<PokedexComponentId, PokedexContext> for AppState {
    fn focused(&self) -> Option<PokedexComponentId> {
        match self.screen {
            Screen::List if self.search.active => Some(PokedexComponentId::Search),
            Screen::List => Some(PokedexComponentId::List),
            Screen::Detail => Some(PokedexComponentId::Detail),
        }
    }

    fn modal(&self) -> Option<PokedexComponentId> {
        if self.search.active {
            Some(PokedexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: PokedexComponentId) -> PokedexContext {
        match id {
            PokedexComponentId::List => PokedexContext::List,
            PokedexComponentId::Search => PokedexContext::Search,
            PokedexComponentId::Detail => PokedexContext::Detail,
        }
    }

    fn default_context(&self) -> PokedexContext {
        PokedexContext::List
    }
}

/// Long-lived clients the effect handler hands to spawned tasks.
#[derive(Clone)]
struct Services {
    catalog: Catalog,
    handoff: SelectionHandoff,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args.config.resolved_log_dir(), args.config.verbose)?;
    let debug = DebugSession::new(args.debug);

    let page_size = args.config.page_size;
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(page_size))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let services = Services {
        catalog: args.config.catalog(),
        handoff: args.config.handoff(),
    };
    tracing::info!(
        api_base = %args.config.api_base,
        page_size,
        memory_store = args.config.memory_store,
        "starting pokedex"
    );

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, services).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("pokedex exited");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    services: Services,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(PokedexUi::new()));
    let mut bus: EventBus<AppState, Action, PokedexComponentId, PokedexContext> =
        EventBus::new();
    let keybindings: Keybindings<PokedexContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(PokedexComponentId::List, move |event, state| {
        ui_list
            .borrow_mut()
            .handle_list_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(PokedexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(PokedexComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Char('q') if !state.search.active => {
                HandlerResponse::action(Action::Quit)
            }
            crossterm::event::KeyCode::Char('/')
                if !state.search.active && state.screen == Screen::List =>
            {
                HandlerResponse::action(Action::SearchStart)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    let services = Arc::new(services);
    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, Arc::clone(&services)),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, services: Arc<Services>) {
    match effect {
        Effect::LoadPage { offset, limit } => {
            let catalog = services.catalog.clone();
            ctx.tasks().spawn(TaskKey::new("page"), async move {
                match catalog.load_page(offset, limit).await {
                    Ok(page) => Action::ListDidLoad {
                        offset,
                        entries: page.entries,
                        has_more: page.has_more,
                    },
                    Err(error) => {
                        tracing::warn!(offset, %error, "page load failed");
                        Action::ListDidError {
                            offset,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::StoreSelection { id } => {
            let handoff = services.handoff.clone();
            ctx.tasks().spawn(TaskKey::new("handoff"), async move {
                match handoff.select(&id).await {
                    Ok(()) => Action::HandoffDidStore { id },
                    Err(error) => {
                        tracing::warn!(%id, %error, "selection write failed");
                        Action::HandoffDidError {
                            id,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::LoadDetail { id } => {
            let Services { catalog, handoff } = services.as_ref().clone();
            ctx.tasks().spawn(TaskKey::new("detail"), async move {
                match load_detail(&handoff, &catalog).await {
                    Ok(record) => Action::DetailDidLoad(record),
                    Err(error) => {
                        tracing::warn!(%id, %error, "detail load failed");
                        Action::DetailDidError {
                            id,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::LoadSprite { url } => {
            let catalog = services.catalog.clone();
            // Holding a movement key replaces the pending fetch instead of piling up.
            ctx.tasks()
                .debounce(TaskKey::new("sprite"), SPRITE_DEBOUNCE, async move {
                    match catalog.fetch_sprite(&url).await {
                        Ok(sprite) => Action::SpriteDidLoad { url, sprite },
                        Err(error) => {
                            tracing::warn!(%url, %error, "sprite load failed");
                            Action::SpriteDidError {
                                url,
                                error: error.to_string(),
                            }
                        }
                    }
                });
        }
    }
}
