use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

use crate::config::validate_url;
use crate::horizon::{HorizonClient, DEFAULT_HORIZON_URL};
use crate::router::{self, Route};
use crate::search::{classify, SearchTarget};
use crate::theme::ColorScheme;
use crate::views::home::HomeView;
use crate::views::{view_for_route, LinkRef, View, ViewContext, ViewModel};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode { Normal, Search, Filter, Settings }

/// Results coming back from spawned view tasks, tagged with the load
/// generation they were started under.
#[derive(Debug)]
pub enum AppEvent {
    Loaded { generation: u64, model: ViewModel },
    Progress { generation: u64, message: String },
    FilterRejected { generation: u64, message: String },
    Quit,
}

/// Side effects the binary carries out against local preferences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    RememberAccount(String),
    SaveHorizonUrl(String),
    ResetHorizonUrl,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Job { Load, More, Filter }

type SharedView = Arc<Mutex<Box<dyn View>>>;

pub struct App {
    quit: bool,
    route: Route,
    back: Vec<Route>,
    view: SharedView,
    filter_prompt: Option<&'static str>,
    ctx: ViewContext,
    tx: UnboundedSender<AppEvent>,
    generation: u64,

    model: ViewModel,
    progress: Option<String>,
    scroll: u16,
    focus: Option<usize>,

    input_mode: InputMode,
    input: String,

    toast_message: Option<(String, Instant, bool)>,  // (message, since, is_error)
    effects: Vec<Effect>,

    timeout_ms: u64,
    retries: u8,
    colors: ColorScheme,
}

impl App {
    pub fn new(ctx: ViewContext, tx: UnboundedSender<AppEvent>, timeout_ms: u64, retries: u8, colors: ColorScheme) -> Self {
        let route = Route::Home;
        let view: Box<dyn View> = Box::new(HomeView::new());
        let title = view.title(&ctx);
        Self {
            quit: false,
            route,
            back: Vec::new(),
            filter_prompt: view.filter_prompt(),
            view: Arc::new(Mutex::new(view)),
            ctx,
            tx,
            generation: 0,
            model: ViewModel::loading(title),
            progress: None,
            scroll: 0,
            focus: None,
            input_mode: InputMode::Normal,
            input: String::new(),
            toast_message: None,
            effects: Vec::new(),
            timeout_ms,
            retries,
            colors,
        }
    }

    // ----- getters -----
    pub fn quit_flag(&self) -> bool { self.quit }
    pub fn route(&self) -> &Route { &self.route }
    pub fn model(&self) -> &ViewModel { &self.model }
    pub fn generation(&self) -> u64 { self.generation }
    pub fn progress(&self) -> Option<&str> { self.progress.as_deref() }
    pub fn scroll(&self) -> u16 { self.scroll }
    pub fn focus(&self) -> Option<usize> { self.focus }
    pub fn input_mode(&self) -> InputMode { self.input_mode }
    pub fn input(&self) -> &str { &self.input }
    pub fn can_go_back(&self) -> bool { !self.back.is_empty() }
    pub fn colors(&self) -> &ColorScheme { &self.colors }
    pub fn context(&self) -> &ViewContext { &self.ctx }
    pub fn t(&self, key: &str) -> String { self.ctx.t(key) }
    pub fn filter_prompt(&self) -> Option<&'static str> { self.filter_prompt }

    pub fn links(&self) -> Vec<LinkRef> { self.model.links() }

    /// Label shown in front of the input bar.
    pub fn input_prompt(&self) -> &'static str {
        match self.input_mode {
            InputMode::Normal => "",
            InputMode::Search => "Search",
            InputMode::Filter => self.filter_prompt.unwrap_or("Filter"),
            InputMode::Settings => "Horizon URL (Ctrl+R resets)",
        }
    }

    pub fn show_toast(&mut self, msg: String) {
        self.toast_message = Some((msg, Instant::now(), false));
    }

    pub fn show_error(&mut self, msg: String) {
        self.toast_message = Some((msg, Instant::now(), true));
    }

    /// Current toast if still active, with its error flag.
    pub fn toast_message(&self) -> Option<(&str, bool)> {
        const TOAST_DURATION: Duration = Duration::from_secs(3);
        self.toast_message.as_ref().and_then(|(msg, time, err)| {
            (time.elapsed() < TOAST_DURATION).then_some((msg.as_str(), *err))
        })
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Seed the home page's recent list from stored history.
    pub fn set_recent(&mut self, recent: crate::search::AccountHistory) {
        self.ctx.recent = recent;
    }

    // ----- navigation -----
    pub fn navigate(&mut self, route: Route) {
        let view = view_for_route(&route);
        self.enter(route, view, true);
    }

    fn enter(&mut self, route: Route, view: Box<dyn View>, push: bool) {
        if push {
            let prev = std::mem::replace(&mut self.route, route);
            self.back.push(prev);
        } else {
            self.route = route;
        }
        log::info!("[app] open {}", self.route);
        self.filter_prompt = view.filter_prompt();
        let title = view.title(&self.ctx);
        self.view = Arc::new(Mutex::new(view));
        self.model = ViewModel::loading(title);
        self.scroll = 0;
        self.focus = None;
        self.spawn(Job::Load, String::new());
    }

    /// Follow a path typed or linked; unknown paths leave a toast.
    pub fn open_path(&mut self, path: &str) {
        match router::parse(path) {
            Some(route) => self.navigate(route),
            None => self.show_error("Page not found".into()),
        }
    }

    pub fn back(&mut self) {
        match self.back.pop() {
            Some(route) => {
                let view = view_for_route(&route);
                self.enter(route, view, false);
            }
            None => self.show_toast("Nothing to go back to".into()),
        }
    }

    pub fn reload(&mut self) {
        let view = match &self.route {
            Route::Home => self.view.clone(),
            route => Arc::new(Mutex::new(view_for_route(route))),
        };
        self.view = view;
        self.model.status = crate::views::Status::Loading;
        self.spawn(Job::Load, String::new());
    }

    pub fn load_more(&mut self) {
        if !self.model.has_more {
            self.show_toast(self.t("view.empty"));
            return;
        }
        self.spawn(Job::More, String::new());
    }

    /// Run a view job on its own task. Loads get a fresh token so the
    /// previous request is cancelled.
    fn spawn(&mut self, job: Job, input: String) {
        if job == Job::Load {
            self.ctx.cancel.cancel();
            self.ctx = self.ctx.renew();
        }
        self.generation += 1;
        self.progress = None;
        let generation = self.generation;
        let mut ctx = self.ctx.clone();
        let progress_tx = self.tx.clone();
        ctx.progress = Some(Arc::new(move |message: String| {
            let _ = progress_tx.send(AppEvent::Progress { generation, message });
        }));
        let view = self.view.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut view = view.lock().await;
            let event = match job {
                Job::Load => AppEvent::Loaded { generation, model: view.load(&ctx).await },
                Job::More => AppEvent::Loaded { generation, model: view.load_more(&ctx).await },
                Job::Filter => match view.apply_filter(&ctx, &input).await {
                    Ok(model) => AppEvent::Loaded { generation, model },
                    Err(e) => AppEvent::FilterRejected { generation, message: e.user_message() },
                },
            };
            let _ = tx.send(event);
        });
    }

    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Loaded { generation, model } if generation == self.generation => {
                self.model = model;
                self.progress = None;
                let n = self.model.links().len();
                self.focus = self.focus.filter(|&i| i < n);
            }
            AppEvent::Progress { generation, message } if generation == self.generation => {
                self.progress = Some(message);
            }
            AppEvent::FilterRejected { generation, message } if generation == self.generation => {
                self.show_error(message);
            }
            AppEvent::Quit => self.quit = true,
            other => log::debug!("[app] stale event dropped: {other:?}"),
        }
    }

    // ----- links and scrolling -----
    pub fn next_link(&mut self) {
        let n = self.links().len();
        if n == 0 { return; }
        self.focus = Some(match self.focus { Some(i) => (i + 1) % n, None => 0 });
    }

    pub fn prev_link(&mut self) {
        let n = self.links().len();
        if n == 0 { return; }
        self.focus = Some(match self.focus { Some(0) | None => n - 1, Some(i) => i - 1 });
    }

    pub fn follow_link(&mut self) {
        let Some(href) = self.focus.and_then(|i| self.links().get(i).map(|l| l.href.clone())) else {
            return;
        };
        self.open_path(&href);
    }

    pub fn scroll_up(&mut self, n: u16) { self.scroll = self.scroll.saturating_sub(n); }
    pub fn scroll_down(&mut self, n: u16) { self.scroll = self.scroll.saturating_add(n); }
    pub fn scroll_home(&mut self) { self.scroll = 0; }

    /// Clamp scrolling to the content and keep `row` on screen.
    pub fn fit_scroll(&mut self, content_rows: u16, viewport: u16, row: Option<u16>) {
        let max = content_rows.saturating_sub(viewport);
        if let Some(r) = row {
            if r < self.scroll {
                self.scroll = r;
            } else if viewport > 0 && r >= self.scroll + viewport {
                self.scroll = r + 1 - viewport;
            }
        }
        self.scroll = self.scroll.min(max);
    }

    // ----- input modes -----
    pub fn start_search(&mut self) {
        self.input.clear();
        self.input_mode = InputMode::Search;
    }

    pub fn start_filter(&mut self) {
        if self.filter_prompt.is_none() {
            self.show_toast("No filter on this page".into());
            return;
        }
        self.input.clear();
        self.input_mode = InputMode::Filter;
    }

    pub fn start_settings(&mut self) {
        self.input = self.ctx.horizon.base_url().to_string();
        self.input_mode = InputMode::Settings;
    }

    pub fn input_add_char(&mut self, c: char) { self.input.push(c); }
    pub fn input_backspace(&mut self) { self.input.pop(); }

    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_input(&mut self) {
        let input = std::mem::take(&mut self.input);
        let mode = self.input_mode;
        self.input_mode = InputMode::Normal;
        match mode {
            InputMode::Search => self.submit_search(&input),
            InputMode::Filter => self.spawn(Job::Filter, input),
            InputMode::Settings => self.set_horizon_url(&input),
            InputMode::Normal => {}
        }
    }

    pub fn submit_search(&mut self, input: &str) {
        match classify(input) {
            SearchTarget::Empty => self.show_error(self.t("search.empty")),
            SearchTarget::Unknown => self.show_error(self.t("search.unknown")),
            SearchTarget::AssetCode(code) => {
                self.enter(Route::Home, Box::new(HomeView::search(&code)), true)
            }
            SearchTarget::Account(id) => {
                self.ctx.recent.push(&id);
                self.effects.push(Effect::RememberAccount(id.clone()));
                self.navigate(Route::Account { id });
            }
            target => {
                if let Some(route) = target.route() {
                    self.navigate(route);
                }
            }
        }
    }

    /// Point the explorer at another Horizon server and reload.
    pub fn set_horizon_url(&mut self, raw: &str) {
        let url = raw.trim().trim_end_matches('/');
        if let Err(e) = validate_url(url, "Horizon URL") {
            self.show_error(e.to_string());
            return;
        }
        if self.swap_horizon(url) {
            self.effects.push(Effect::SaveHorizonUrl(url.to_string()));
        }
    }

    pub fn reset_horizon_url(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        if self.swap_horizon(DEFAULT_HORIZON_URL) {
            self.effects.push(Effect::ResetHorizonUrl);
        }
    }

    fn swap_horizon(&mut self, url: &str) -> bool {
        match HorizonClient::new(url, self.timeout_ms, self.retries) {
            Ok(client) => {
                self.ctx.horizon = client;
                self.show_toast(format!("Horizon: {url}"));
                self.reload();
                true
            }
            Err(e) => {
                self.show_error(e.user_message());
                false
            }
        }
    }

    pub fn quit(&mut self) {
        self.ctx.cancel.cancel();
        self.quit = true;
    }
}
