use async_trait::async_trait;

use super::{Section, View, ViewContext, ViewModel};
use crate::asset::Asset;
use crate::counter_assets::{discover, pick_counter, CounterAsset};
use crate::error::{Result, StellarxError};
use crate::orderbook::{group_book, swap_quotes, validate_step, GroupedBook, Quote, Row, SwapQuotes, BOOK_LIMIT};
use crate::render::{DisplayLine, Segment};
use crate::router::Route;
use crate::types::OrderBook;
use crate::util_text::format_decimal;

/// Counter assets listed as quick links.
const COUNTER_LINKS: usize = 10;

pub struct OrderbookView {
    base: Asset,
    requested: Option<Asset>,
    counters: Vec<CounterAsset>,
    counter: Option<Asset>,
    book: Option<OrderBook>,
    step: Option<f64>,
    quotes: Option<SwapQuotes>,
}

impl OrderbookView {
    pub fn new(base: Asset, counter: Option<Asset>) -> Self {
        OrderbookView {
            base,
            requested: counter,
            counters: Vec::new(),
            counter: None,
            book: None,
            step: None,
            quotes: None,
        }
    }

    /// Book and quotes for one pair, raced as a whole against the view's token.
    async fn fetch_market(&self, ctx: &ViewContext, counter: &Asset) -> Result<(OrderBook, SwapQuotes)> {
        ctx.guard(async {
            let (book, quotes) = tokio::join!(
                ctx.horizon.order_book(&self.base, counter, BOOK_LIMIT),
                swap_quotes(&ctx.horizon, &self.base, counter),
            );
            Ok((book?, quotes))
        })
        .await
    }

    /// Switch to `counter` only once its market has loaded.
    async fn open_market(&mut self, ctx: &ViewContext, counter: Option<Asset>) -> Result<()> {
        let Some(c) = counter else {
            self.counter = None;
            self.book = None;
            self.quotes = None;
            return Ok(());
        };
        let (book, quotes) = self.fetch_market(ctx, &c).await?;
        self.counter = Some(c);
        self.book = Some(book);
        self.quotes = Some(quotes);
        Ok(())
    }

    fn model(&self, ctx: &ViewContext) -> ViewModel {
        let mut sections = vec![Section::new("", self.header_lines(ctx))];
        let Some(counter) = &self.counter else {
            return ViewModel::ok(self.title(ctx), sections)
                .with_notice("No markets found for this asset.");
        };
        if let Some(book) = &self.book {
            let grouped = group_book(book, self.step);
            sections.extend(book_sections(&grouped));
        }
        if let Some(q) = &self.quotes {
            sections.push(Section::new(
                format!("Sell {}", self.base.code()),
                quote_lines(&q.sell, &self.base, counter),
            ));
            sections.push(Section::new(
                format!("Buy {}", self.base.code()),
                quote_lines(&q.buy, counter, &self.base),
            ));
        }
        ViewModel::ok(self.title(ctx), sections)
    }

    fn header_lines(&self, ctx: &ViewContext) -> Vec<DisplayLine> {
        let mut lines = vec![DisplayLine::new(ctx.t("view.asset"), vec![Segment::Asset(self.base.clone())])];
        if let Some(c) = &self.counter {
            lines.push(DisplayLine::new("Counter", vec![Segment::Asset(c.clone())]));
        }
        let mut links = Vec::new();
        for (i, c) in self.counters.iter().take(COUNTER_LINKS).enumerate() {
            if i > 0 {
                links.push(Segment::text(" · "));
            }
            let route = Route::AssetOrderbook {
                asset: self.base.clone(),
                counter: Some(c.asset.clone()),
            };
            links.push(Segment::Link {
                label: format!("{} ({})", c.asset.code(), c.count),
                href: route.path(),
            });
        }
        if !links.is_empty() {
            lines.push(DisplayLine::new("Markets", links));
        }
        lines
    }
}

fn row_line(r: &Row) -> DisplayLine {
    DisplayLine::text(
        "",
        format!(
            "{} · {} · {}",
            format_decimal(r.price, 7),
            format_decimal(r.amount, 7),
            format_decimal(r.total, 7)
        ),
    )
}

pub(crate) fn book_sections(g: &GroupedBook) -> Vec<Section> {
    let mut spread = Vec::new();
    if let Some(s) = &g.spread {
        spread.push(DisplayLine::text("Best bid", format_decimal(s.best_bid, 7)));
        spread.push(DisplayLine::text("Best ask", format_decimal(s.best_ask, 7)));
        spread.push(DisplayLine::text(
            "Spread",
            format!("{} ({:.2}%)", format_decimal(s.absolute, 7), s.percent),
        ));
        spread.push(DisplayLine::text("Mid", format_decimal(s.mid, 7)));
    }
    spread.push(DisplayLine::text(
        "Step",
        g.step.map(|s| format_decimal(s, 9)).unwrap_or_else(|| "none".into()),
    ));
    vec![
        Section::new("Asks · price · amount · total", g.asks.iter().map(row_line).collect()),
        Section::new("Spread", spread),
        Section::new("Bids · price · amount · total", g.bids.iter().map(row_line).collect()),
    ]
}

pub(crate) fn quote_lines(quotes: &[Result<Quote>], from: &Asset, to: &Asset) -> Vec<DisplayLine> {
    quotes
        .iter()
        .map(|q| match q {
            Ok(Quote::Filled { send, receive, price, hops }) => DisplayLine::text(
                format!("{send} {}", from.code()),
                format!(
                    "{receive} {} @ {} · {hops} hop(s)",
                    to.code(),
                    format_decimal(*price, 7)
                ),
            ),
            Ok(Quote::NoRoute { send }) => {
                DisplayLine::text(format!("{send} {}", from.code()), "no route")
            }
            Err(e) => DisplayLine::text("", format!("error: {}", e.user_message())),
        })
        .collect()
}

#[async_trait]
impl View for OrderbookView {
    fn title(&self, ctx: &ViewContext) -> String {
        match &self.counter {
            Some(c) => format!("{} · {}/{}", ctx.t("view.orderbook"), self.base.code(), c.code()),
            None => format!("{} · {}", ctx.t("view.orderbook"), self.base.code()),
        }
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        match discover(&ctx.horizon, &self.base, &ctx.cancel).await {
            Ok(found) => self.counters = found,
            Err(e) if self.requested.is_some() && !e.is_cancelled() => {
                log::warn!("[orderbook] counter discovery failed: {e}");
            }
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        }
        let requested = self.requested.as_ref().map(Asset::canonical);
        let counter = pick_counter(&self.counters, requested.as_deref(), &self.base);
        match self.open_market(ctx, counter).await {
            Ok(()) => self.model(ctx),
            Err(e) => ViewModel::failed(self.title(ctx), &e),
        }
    }

    fn filter_prompt(&self) -> Option<&'static str> {
        Some("Step (e.g. 0.01), auto, or counter CODE-ISSUER")
    }

    async fn apply_filter(&mut self, ctx: &ViewContext, input: &str) -> Result<ViewModel> {
        let s = input.trim();
        if s.eq_ignore_ascii_case("auto") {
            self.step = None;
            return Ok(self.model(ctx));
        }
        if s.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-') {
            self.step = Some(validate_step(s)?);
            return Ok(self.model(ctx));
        }
        let counter = Asset::parse(s)?;
        if counter == self.base {
            return Err(StellarxError::Validation("counter must differ from the base asset".into()));
        }
        Ok(match self.open_market(ctx, Some(counter)).await {
            Ok(()) => {
                self.step = None;
                self.model(ctx)
            }
            Err(e) => ViewModel::failed(self.title(ctx), &e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::SorobanRpc;
    use crate::horizon::HorizonClient;
    use crate::i18n::English;
    use crate::types::{PathRecord, PriceLevel};
    use std::sync::Arc;
    use std::time::Duration;

    const ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

    fn cancelled_ctx() -> ViewContext {
        let horizon = HorizonClient::new("http://127.0.0.1:9", 3000, 2).unwrap();
        let rpc = SorobanRpc::new("http://127.0.0.1:9", 3000, 0).unwrap();
        let ctx = ViewContext::new(horizon, rpc, Arc::new(English::default()));
        ctx.cancel.cancel();
        ctx
    }

    fn loaded_view() -> OrderbookView {
        let mut view = OrderbookView::new(Asset::Native, None);
        view.counter = Some(Asset::credit("USDC", ISSUER));
        view.book = Some(OrderBook {
            bids: vec![level("0.10", "100")],
            asks: vec![level("0.11", "50")],
        });
        view.quotes = Some(SwapQuotes { sell: Vec::new(), buy: Vec::new() });
        view
    }

    fn level(price: &str, amount: &str) -> PriceLevel {
        PriceLevel { price: price.into(), amount: amount.into(), price_r: None }
    }

    #[test]
    fn book_sections_put_spread_between_sides() {
        let book = OrderBook {
            bids: vec![level("0.99", "10"), level("0.98", "5")],
            asks: vec![level("1.01", "3"), level("1.02", "4")],
        };
        let g = group_book(&book, Some(0.01));
        let sections = book_sections(&g);
        assert_eq!(sections[1].title, "Spread");
        // best ask sits last, next to the spread
        assert_eq!(sections[0].lines.last().unwrap().value_text(), "1.01 · 3 · 3");
        assert_eq!(sections[2].lines[0].value_text(), "0.99 · 10 · 10");
        assert_eq!(sections[2].lines[1].value_text(), "0.98 · 5 · 15");
    }

    #[test]
    fn quotes_render_routes_and_gaps() {
        let paths = vec![PathRecord {
            source_amount: "10".into(),
            destination_amount: "9.5".into(),
            path: vec![],
        }];
        let qs = vec![
            Ok(crate::orderbook::best_quote("10", &paths)),
            Ok(crate::orderbook::best_quote("100", &[])),
            Err(StellarxError::Http { status: 503, detail: None }),
        ];
        let usdc = Asset::credit("USDC", "GISS");
        let lines = quote_lines(&qs, &usdc, &Asset::Native);
        assert_eq!(lines[0].plain(), "10 USDC: 9.5 XLM @ 0.95 · 0 hop(s)");
        assert_eq!(lines[1].plain(), "100 USDC: no route");
        assert_eq!(lines[2].plain(), "error: Error 503");
    }

    #[tokio::test]
    async fn cancelled_counter_switch_returns_at_once() {
        let ctx = cancelled_ctx();
        let mut view = loaded_view();
        let model = tokio::time::timeout(
            Duration::from_millis(500),
            view.apply_filter(&ctx, &format!("EURC-{ISSUER}")),
        )
        .await
        .expect("cancelled fetch should not wait on quotes")
        .unwrap();
        assert_eq!(model.status, crate::views::Status::Error);
    }

    #[tokio::test]
    async fn failed_counter_switch_keeps_previous_market() {
        let ctx = cancelled_ctx();
        let mut view = loaded_view();
        view.apply_filter(&ctx, &format!("EURC-{ISSUER}")).await.unwrap();
        assert_eq!(view.counter, Some(Asset::credit("USDC", ISSUER)));
        assert!(view.book.is_some());

        let model = view.apply_filter(&ctx, "0.01").await.unwrap();
        assert!(model.title.ends_with("XLM/USDC"));
        assert_eq!(model.status, crate::views::Status::Ok);
    }
}
