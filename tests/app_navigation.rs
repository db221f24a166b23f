//! App navigation tests - search routing, history, stale results and settings

use std::sync::Arc;

use stellarx::app::{App, AppEvent, Effect, InputMode};
use stellarx::contract::SorobanRpc;
use stellarx::horizon::HorizonClient;
use stellarx::i18n::{English, Translator};
use stellarx::router::Route;
use stellarx::theme::ColorScheme;
use stellarx::views::{Status, ViewContext, ViewModel};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

const ACCOUNT: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

// Nothing listens on port 9, so spawned loads fail fast
fn app() -> (App, UnboundedReceiver<AppEvent>) {
    let horizon = HorizonClient::new("http://127.0.0.1:9", 1000, 0).unwrap();
    let rpc = SorobanRpc::new("http://127.0.0.1:9", 1000, 0).unwrap();
    let translator: Arc<dyn Translator> = Arc::new(English::default());
    let ctx = ViewContext::new(horizon, rpc, translator);
    let (tx, rx) = unbounded_channel();
    (App::new(ctx, tx, 1000, 0, ColorScheme::default()), rx)
}

#[tokio::test]
async fn starts_on_home_without_history() {
    let (app, _rx) = app();
    assert_eq!(app.route(), &Route::Home);
    assert!(!app.can_go_back());
    assert_eq!(app.model().status, Status::Loading);
    assert_eq!(app.input_mode(), InputMode::Normal);
}

#[tokio::test]
async fn digits_open_a_ledger() {
    let (mut app, _rx) = app();
    app.submit_search("  123 ");
    assert_eq!(app.route(), &Route::Ledger { seq: 123 });
    assert!(app.can_go_back());
    assert_eq!(app.generation(), 1);
}

#[tokio::test]
async fn account_search_is_remembered() {
    let (mut app, _rx) = app();
    app.submit_search(ACCOUNT);
    assert_eq!(app.route(), &Route::Account { id: ACCOUNT.to_string() });
    assert_eq!(app.drain_effects(), vec![Effect::RememberAccount(ACCOUNT.to_string())]);
    assert!(app.drain_effects().is_empty());
    assert_eq!(app.context().recent.items(), &[ACCOUNT.to_string()]);
}

#[tokio::test]
async fn links_and_back_leave_history_alone() {
    let (mut app, _rx) = app();
    app.open_path(&format!("/account/{ACCOUNT}"));
    assert_eq!(app.route(), &Route::Account { id: ACCOUNT.to_string() });
    assert!(app.drain_effects().is_empty());

    app.open_path("/ledger/5");
    app.back();
    assert_eq!(app.route(), &Route::Account { id: ACCOUNT.to_string() });
    assert!(app.drain_effects().is_empty());
    assert!(app.context().recent.is_empty());
}

#[tokio::test]
async fn empty_and_unknown_searches_stay_put() {
    let (mut app, _rx) = app();
    app.submit_search("   ");
    assert_eq!(app.route(), &Route::Home);
    assert_eq!(app.toast_message().map(|(_, err)| err), Some(true));

    app.submit_search("not a thing!");
    assert_eq!(app.route(), &Route::Home);
    assert!(!app.can_go_back());
    assert_eq!(app.generation(), 0);
}

#[tokio::test]
async fn asset_code_search_lists_on_home() {
    let (mut app, _rx) = app();
    app.submit_search("USDC");
    assert_eq!(app.route(), &Route::Home);
    assert!(app.can_go_back());
    assert_eq!(app.generation(), 1);
}

#[tokio::test]
async fn back_returns_to_previous_route() {
    let (mut app, _rx) = app();
    app.open_path("/ledger/5");
    app.open_path("/operation/12345");
    assert_eq!(app.route(), &Route::Operation { id: "12345".into() });

    app.back();
    assert_eq!(app.route(), &Route::Ledger { seq: 5 });
    app.back();
    assert_eq!(app.route(), &Route::Home);
    assert!(!app.can_go_back());

    app.back();
    assert_eq!(app.toast_message().map(|(_, err)| err), Some(false));
}

#[tokio::test]
async fn unknown_path_leaves_a_toast() {
    let (mut app, _rx) = app();
    app.open_path("/nowhere/at/all");
    assert_eq!(app.route(), &Route::Home);
    assert_eq!(app.toast_message(), Some(("Page not found", true)));
}

#[tokio::test]
async fn stale_results_are_dropped() {
    let (mut app, _rx) = app();
    app.open_path("/ledger/1");
    app.open_path("/ledger/2");
    assert_eq!(app.generation(), 2);

    app.on_event(AppEvent::Loaded { generation: 1, model: ViewModel::ok("Ledger 1", Vec::new()) });
    assert_eq!(app.model().status, Status::Loading);

    app.on_event(AppEvent::Progress { generation: 2, message: "page 1".into() });
    assert_eq!(app.progress(), Some("page 1"));

    app.on_event(AppEvent::Loaded { generation: 2, model: ViewModel::ok("Ledger 2", Vec::new()) });
    assert_eq!(app.model().title, "Ledger 2");
    assert_eq!(app.model().status, Status::Ok);
    assert_eq!(app.progress(), None);
}

#[tokio::test]
async fn filter_needs_a_filtered_view() {
    let (mut app, _rx) = app();
    app.open_path("/ledger/7");
    app.start_filter();
    assert_eq!(app.input_mode(), InputMode::Normal);

    app.open_path("/offer/77/trades");
    app.start_filter();
    assert_eq!(app.input_mode(), InputMode::Filter);
    app.cancel_input();
    assert_eq!(app.input_mode(), InputMode::Normal);
}

#[tokio::test]
async fn settings_validate_the_horizon_url() {
    let (mut app, _rx) = app();
    app.start_settings();
    assert_eq!(app.input(), "http://127.0.0.1:9");

    app.set_horizon_url("ftp://example.org");
    assert_eq!(app.toast_message().map(|(_, err)| err), Some(true));
    assert!(app.drain_effects().is_empty());

    app.set_horizon_url("http://127.0.0.1:8000/ ");
    assert_eq!(app.context().horizon.base_url(), "http://127.0.0.1:8000");
    assert_eq!(app.drain_effects(), vec![Effect::SaveHorizonUrl("http://127.0.0.1:8000".into())]);

    app.reset_horizon_url();
    assert_eq!(app.drain_effects(), vec![Effect::ResetHorizonUrl]);
}

#[tokio::test]
async fn scroll_keeps_focused_row_visible() {
    let (mut app, _rx) = app();
    app.scroll_down(50);
    app.fit_scroll(30, 10, None);
    assert_eq!(app.scroll(), 20);

    app.fit_scroll(30, 10, Some(3));
    assert_eq!(app.scroll(), 3);

    app.fit_scroll(30, 10, Some(15));
    assert_eq!(app.scroll(), 6);

    app.fit_scroll(5, 10, None);
    assert_eq!(app.scroll(), 0);
}

#[tokio::test]
async fn quit_sets_flag() {
    let (mut app, _rx) = app();
    app.quit();
    assert!(app.quit_flag());
    assert!(app.context().cancel.is_cancelled());
}
