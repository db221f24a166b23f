//! Per-route controllers.
//!
//! A view is built when its route is entered, loads on a spawned task and
//! hands back a `ViewModel` the UI can draw or `--print` can flatten.
//! Views catch their own errors; nothing crosses a view boundary.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::contract::SorobanRpc;
use crate::error::{Result, StellarxError};
use crate::horizon::HorizonClient;
use crate::i18n::Translator;
use crate::render::{DisplayLine, Segment};
use crate::router::Route;
use crate::search::AccountHistory;

pub mod account;
pub mod asset;
pub mod asset_charts;
pub mod asset_orderbook;
pub mod contract;
pub mod home;
pub mod ledger;
pub mod list;
pub mod offer;
pub mod operation;
pub mod pool;
pub mod pool_charts;
pub mod transaction;
pub mod year_stats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Loading,
    Ok,
    Error,
    NotFound,
}

impl Status {
    pub fn label_key(&self) -> &'static str {
        match self {
            Status::Loading => "status.loading",
            Status::Ok => "status.success",
            Status::Error => "status.error",
            Status::NotFound => "status.not_found",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<DisplayLine>,
    /// Preformatted block shown under the lines (JSON dumps, XDR).
    pub raw: Option<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, lines: Vec<DisplayLine>) -> Self {
        Section {
            title: title.into(),
            lines,
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// A link inside a view model, addressed by position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRef {
    pub section: usize,
    pub line: usize,
    pub segment: usize,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub title: String,
    pub status: Status,
    pub sections: Vec<Section>,
    /// Banner text.
    pub error: Option<String>,
    pub has_more: bool,
    /// Informational line, e.g. "no trades in the last 7 days".
    pub notice: Option<String>,
}

impl ViewModel {
    pub fn loading(title: impl Into<String>) -> Self {
        ViewModel {
            title: title.into(),
            status: Status::Loading,
            sections: Vec::new(),
            error: None,
            has_more: false,
            notice: None,
        }
    }

    pub fn ok(title: impl Into<String>, sections: Vec<Section>) -> Self {
        ViewModel {
            status: Status::Ok,
            sections,
            ..ViewModel::loading(title)
        }
    }

    /// Error page for `err`; 404s become `NotFound`.
    pub fn failed(title: impl Into<String>, err: &StellarxError) -> Self {
        let title = title.into();
        if err.is_cancelled() {
            log::debug!("[view] {title}: cancelled");
        } else {
            log::warn!("[view] {title}: {err}");
        }
        ViewModel {
            status: if err.is_not_found() {
                Status::NotFound
            } else {
                Status::Error
            },
            error: Some(err.user_message()),
            ..ViewModel::loading(title)
        }
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn with_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    /// Every followable segment, in reading order.
    pub fn links(&self) -> Vec<LinkRef> {
        let mut out = Vec::new();
        for (si, s) in self.sections.iter().enumerate() {
            for (li, l) in s.lines.iter().enumerate() {
                for (gi, g) in l.segments.iter().enumerate() {
                    if let Some(href) = g.href() {
                        out.push(LinkRef {
                            section: si,
                            line: li,
                            segment: gi,
                            href,
                        });
                    }
                }
            }
        }
        out
    }

    /// Plain-text rendering for `--print`.
    pub fn to_plain(&self, t: &dyn Translator) -> String {
        let mut out = format!("{} [{}]\n", self.title, t.t(self.status.label_key()));
        if let Some(e) = &self.error {
            out.push_str(&format!("! {e}\n"));
        }
        if let Some(n) = &self.notice {
            out.push_str(&format!("{n}\n"));
        }
        for s in &self.sections {
            out.push('\n');
            if !s.title.is_empty() {
                out.push_str(&format!("== {} ==\n", s.title));
            }
            for l in &s.lines {
                out.push_str(&l.plain());
                out.push('\n');
            }
            if let Some(raw) = &s.raw {
                out.push_str(raw);
                out.push('\n');
            }
        }
        if self.has_more {
            out.push_str(&format!("\n{}\n", t.t("view.load_more")));
        }
        out
    }
}

/// Receives progress lines from long-running loads.
pub type ProgressSink = Arc<dyn Fn(String) + Send + Sync>;

/// Shared handles a view loads with.
#[derive(Clone)]
pub struct ViewContext {
    pub horizon: HorizonClient,
    pub rpc: SorobanRpc,
    pub translator: Arc<dyn Translator>,
    pub cancel: CancellationToken,
    pub recent: AccountHistory,
    pub progress: Option<ProgressSink>,
}

impl ViewContext {
    pub fn new(horizon: HorizonClient, rpc: SorobanRpc, translator: Arc<dyn Translator>) -> Self {
        ViewContext {
            horizon,
            rpc,
            translator,
            cancel: CancellationToken::new(),
            recent: AccountHistory::default(),
            progress: None,
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.translator.t(key)
    }

    pub fn report(&self, msg: String) {
        if let Some(sink) = &self.progress {
            sink(msg);
        }
    }

    /// Same handles with a fresh token for the next view.
    pub fn renew(&self) -> Self {
        ViewContext {
            cancel: CancellationToken::new(),
            ..self.clone()
        }
    }

    /// Race `fut` against this view's token.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StellarxError::Cancelled),
            r = fut => r,
        }
    }
}

#[async_trait]
pub trait View: Send {
    fn title(&self, ctx: &ViewContext) -> String;

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel;

    /// Next batch for paged views; others just reload.
    async fn load_more(&mut self, ctx: &ViewContext) -> ViewModel {
        self.load(ctx).await
    }

    /// Prompt label for views that take a filter.
    fn filter_prompt(&self) -> Option<&'static str> {
        None
    }

    /// Validate and apply filter input. Validation errors come back before
    /// any request is made.
    async fn apply_filter(&mut self, _ctx: &ViewContext, _input: &str) -> Result<ViewModel> {
        Err(StellarxError::Validation("this view has no filter".into()))
    }
}

/// Controller for a route.
pub fn view_for_route(route: &Route) -> Box<dyn View> {
    match route {
        Route::Home => Box::new(home::HomeView::new()),
        Route::Account { id } => Box::new(account::AccountView::new(id)),
        Route::AccountOperations { id } => Box::new(list::account_operations(id)),
        Route::AccountOffers { id } => Box::new(list::account_offers(id)),
        Route::AccountYearStats { id, year } => Box::new(year_stats::YearStatsView::new(id, *year)),
        Route::Pool { id } => Box::new(pool::PoolView::new(id)),
        Route::PoolOperations { id } => Box::new(list::pool_operations(id)),
        Route::PoolTrades { id } => Box::new(list::pool_trades(id)),
        Route::PoolCharts { id } => Box::new(pool_charts::PoolChartsView::new(id)),
        Route::Asset { asset } => Box::new(asset::AssetView::new(asset.clone())),
        Route::AssetOrderbook { asset, counter } => Box::new(
            asset_orderbook::OrderbookView::new(asset.clone(), counter.clone()),
        ),
        Route::AssetCharts { asset, counter } => Box::new(asset_charts::ChartsView::new(
            asset.clone(),
            counter.clone(),
        )),
        Route::Transaction { hash } => Box::new(transaction::TransactionView::new(hash)),
        Route::Operation { id } => Box::new(operation::OperationView::new(id)),
        Route::Offer { id } => Box::new(offer::OfferView::new(id)),
        Route::OfferTrades { id } => Box::new(offer::OfferTradesView::new(id)),
        Route::Contract { id } => Box::new(contract::ContractView::new(id)),
        Route::Ledger { seq } => Box::new(ledger::LedgerView::new(*seq)),
    }
}

/// `label: value` line with a single link segment.
pub(crate) fn link_line(label: impl Into<String>, seg: Segment) -> DisplayLine {
    DisplayLine::new(label, vec![seg])
}

/// Text line, `—` when empty.
pub(crate) fn text_line(label: impl Into<String>, value: Option<impl Into<String>>) -> DisplayLine {
    let v = value
        .map(Into::into)
        .filter(|s: &String| !s.is_empty())
        .unwrap_or_else(|| crate::util_text::DASH.to_string());
    DisplayLine::text(label, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::English;

    #[test]
    fn failed_maps_not_found() {
        let vm = ViewModel::failed("Account", &StellarxError::NotFound("/accounts/x".into()));
        assert_eq!(vm.status, Status::NotFound);
        assert_eq!(vm.error.as_deref(), Some("Not found"));
        let vm = ViewModel::failed(
            "Account",
            &StellarxError::Http { status: 500, detail: Some("boom".into()) },
        );
        assert_eq!(vm.status, Status::Error);
        assert_eq!(vm.error.as_deref(), Some("Error 500: boom"));
    }

    #[test]
    fn links_and_plain_text() {
        let vm = ViewModel::ok(
            "Ledger 5",
            vec![Section::new(
                "Header",
                vec![
                    DisplayLine::text("Hash", "abc"),
                    link_line("Previous", Segment::Ledger(4)),
                ],
            )],
        )
        .with_more(true);
        let links = vm.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/ledger/4");
        assert_eq!((links[0].section, links[0].line), (0, 1));

        let text = vm.to_plain(&English::default());
        assert!(text.starts_with("Ledger 5 [success]\n"));
        assert!(text.contains("== Header ==\nHash: abc\nPrevious: 4\n"));
        assert!(text.trim_end().ends_with("Press n to load more"));
    }

    #[test]
    fn text_line_dashes_empty() {
        assert_eq!(text_line("Memo", Some("")).plain(), "Memo: —");
        assert_eq!(text_line("Memo", None::<String>).plain(), "Memo: —");
        assert_eq!(text_line("Memo", Some("hi")).plain(), "Memo: hi");
    }
}
