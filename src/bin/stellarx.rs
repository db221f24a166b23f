// Native binary for stellarx - Terminal UI and --print mode

use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::OpenOptions, io, sync::Arc, time::Duration};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use stellarx::{
    app::{App, AppEvent, Effect, InputMode},
    config::{self, load_args, resolve, Config, Stored},
    contract::SorobanRpc,
    horizon::HorizonClient,
    i18n::{translator_for, Translator},
    prefs::{Prefs, PrefsStore},
    router::{self, Route},
    ui,
    views::{view_for_route, Status, ViewContext},
};

const FRAME: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let (args, file) = load_args().context("Failed to load configuration")?;

    // Preferences feed the config, so open them first
    let db_path = config::db_path(&args, &file);
    let store = match PrefsStore::open(&db_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("stellarx: preferences unavailable ({e:#}), using a temporary store");
            PrefsStore::open_in_memory()?
        }
    };
    let stored = Stored {
        horizon_url: store.horizon_url().ok().flatten(),
        lang: store.lang().ok().flatten(),
    };
    let recent = store.account_history().unwrap_or_default();
    let cfg = resolve(args, file, stored).context("Invalid configuration")?;
    init_logging(&cfg)?;
    log::info!(
        "[main] horizon={} ({:?}) rpc={}",
        cfg.horizon_url, cfg.horizon_origin, cfg.soroban_rpc_url
    );

    let horizon = HorizonClient::new(&cfg.horizon_url, cfg.timeout_ms, cfg.retries)?;
    let rpc = SorobanRpc::new(&cfg.soroban_rpc_url, cfg.timeout_ms, cfg.retries)?;
    let translator: Arc<dyn Translator> = Arc::from(translator_for(cfg.lang));
    let mut ctx = ViewContext::new(horizon, rpc, translator);
    ctx.recent = recent;

    if cfg.print {
        cfg.print_summary();
        return print_route(&cfg, ctx).await;
    }

    let prefs = Prefs::with_store(store);

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // app + channels
    let (tx, rx) = unbounded_channel::<AppEvent>();
    let mut app = App::new(ctx, tx, cfg.timeout_ms, cfg.retries, cfg.theme.colors());
    match cfg.route.as_deref() {
        Some(path) => app.open_path(path),
        None => app.reload(),
    }

    let res = run_loop(&mut app, &mut terminal, rx, &prefs).await;

    // cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

/// Log to stderr for `--print`, to the log file under the terminal UI.
fn init_logging(cfg: &Config) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if !cfg.print {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cfg.log_file)
            .with_context(|| format!("opening log file {}", cfg.log_file))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

async fn print_route(cfg: &Config, mut ctx: ViewContext) -> Result<()> {
    let route = match cfg.route.as_deref() {
        Some(path) => router::parse(path).ok_or_else(|| anyhow!("Page not found: {path}"))?,
        None => Route::Home,
    };
    ctx.progress = Some(Arc::new(|msg: String| eprintln!("… {msg}")));

    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut view = view_for_route(&route);
    let model = view.load(&ctx).await;
    print!("{}", model.to_plain(ctx.translator.as_ref()));
    match model.status {
        Status::Error | Status::NotFound => Err(anyhow!(
            "{}",
            model.error.unwrap_or_else(|| "failed".into())
        )),
        _ => Ok(()),
    }
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
    prefs: &Prefs,
) -> Result<()> {
    loop {
        if event::poll(FRAME)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    handle_key(app, k);
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }
        for effect in app.drain_effects() {
            apply_effect(prefs, effect).await;
        }

        terminal.draw(|f| ui::draw(f, app))?;
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

async fn apply_effect(prefs: &Prefs, effect: Effect) {
    match effect {
        Effect::RememberAccount(id) => {
            let history = prefs.push_account(&id).await;
            log::debug!("[main] history now {} accounts", history.items().len());
        }
        Effect::SaveHorizonUrl(url) => prefs.set_horizon_url(&url),
        Effect::ResetHorizonUrl => prefs.reset_horizon_url(),
    }
}

fn handle_key(app: &mut App, k: KeyEvent) {
    // Text input modes share one editor
    if app.input_mode() != InputMode::Normal {
        match (k.code, k.modifiers) {
            (KeyCode::Char('r'), KeyModifiers::CONTROL) if app.input_mode() == InputMode::Settings => {
                app.reset_horizon_url();
            }
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => app.cancel_input(),
            (KeyCode::Char(c), _) => app.input_add_char(c),
            (KeyCode::Backspace, _) => app.input_backspace(),
            (KeyCode::Enter, _) => app.submit_input(),
            (KeyCode::Esc, _) => app.cancel_input(),
            _ => {}
        }
        return;
    }

    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => app.quit(),

        (KeyCode::Char('/'), _) => app.start_search(),
        (KeyCode::Char('f'), _) => app.start_filter(),
        (KeyCode::Char('s'), _) => app.start_settings(),
        (KeyCode::Char('n'), _) => app.load_more(),
        (KeyCode::Char('r'), _) => app.reload(),
        (KeyCode::Char('g'), _) => app.open_path("/"),

        // Links
        (KeyCode::Tab, _) => app.next_link(),
        (KeyCode::BackTab, _) => app.prev_link(),
        (KeyCode::Enter, _) => app.follow_link(),
        (KeyCode::Backspace, _) | (KeyCode::Esc, _) => app.back(),

        // Scrolling
        (KeyCode::Up, _) => app.scroll_up(1),
        (KeyCode::Down, _) => app.scroll_down(1),
        (KeyCode::PageUp, _) => app.scroll_up(20),
        (KeyCode::PageDown, _) => app.scroll_down(20),
        (KeyCode::Home, _) => app.scroll_home(),
        (KeyCode::End, _) => app.scroll_down(u16::MAX),
        _ => {}
    }
}
