//! Paged record lists: account/pool operations, offers and trades.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Section, View, ViewContext, ViewModel};
use crate::horizon::params;
use crate::i18n::Translator;
use crate::operation::normalize;
use crate::paging::{HorizonCollection, Pager};
use crate::render::{operation_card, DisplayLine, Segment};
use crate::types::{OfferRecord, Paged, TradeRecord};
use crate::util_text::{shorten, DASH};

/// Renders one record as display lines; `index` is its position in the list.
pub type RowFn<T> = fn(&T, usize, &dyn Translator) -> Vec<DisplayLine>;

pub struct ListView<T: DeserializeOwned + Paged + Send + Sync + 'static> {
    title_key: &'static str,
    subject: String,
    path: String,
    params: Vec<(String, String)>,
    header: Vec<DisplayLine>,
    rows: RowFn<T>,
    /// Blank line between multi-line rows.
    spaced: bool,
    pager: Option<Pager<HorizonCollection<T>>>,
    error: Option<String>,
}

impl<T> ListView<T>
where
    T: DeserializeOwned + Paged + Send + Sync + 'static,
{
    pub fn new(
        title_key: &'static str,
        subject: &str,
        path: String,
        params: Vec<(String, String)>,
        rows: RowFn<T>,
    ) -> Self {
        ListView {
            title_key,
            subject: subject.to_string(),
            path,
            params,
            header: Vec::new(),
            rows,
            spaced: false,
            pager: None,
            error: None,
        }
    }

    pub fn with_header(mut self, header: Vec<DisplayLine>) -> Self {
        self.header = header;
        self
    }

    pub fn spaced(mut self) -> Self {
        self.spaced = true;
        self
    }

    pub fn items(&self) -> &[T] {
        self.pager.as_ref().map(|p| p.items()).unwrap_or(&[])
    }

    pub fn has_more(&self) -> bool {
        self.pager.as_ref().is_some_and(|p| p.has_more())
    }

    pub fn title_for(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t(self.title_key), shorten(&self.subject))
    }

    /// Drop what was loaded and fetch the first page again.
    pub async fn reload(&mut self, ctx: &ViewContext) -> Option<ViewModel> {
        let source = HorizonCollection::new(&ctx.horizon, self.path.clone(), self.params.clone());
        let mut pager = Pager::new(source);
        self.error = None;
        let res = pager.load_more(&ctx.cancel).await;
        self.pager = Some(pager);
        match res {
            Ok(n) => {
                log::debug!("[list] {} first page: {n}", self.path);
                None
            }
            Err(e) => Some(ViewModel::failed(self.title_for(ctx), &e)),
        }
    }

    /// Append the next page; failures keep the rows and show a banner.
    pub async fn next_page(&mut self, ctx: &ViewContext) -> Option<ViewModel> {
        let Some(pager) = self.pager.as_mut() else {
            return self.reload(ctx).await;
        };
        match pager.load_more(&ctx.cancel).await {
            Ok(n) => {
                log::debug!("[list] {} +{n}", self.path);
                self.error = None;
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                log::warn!("[list] {}: {e}", self.path);
                self.error = Some(e.user_message());
            }
        }
        None
    }

    /// Model over the records `keep` accepts.
    pub fn model_filtered(&self, ctx: &ViewContext, keep: impl Fn(&T) -> bool) -> ViewModel {
        let t = ctx.translator.as_ref();
        let mut lines = Vec::new();
        for (i, rec) in self.items().iter().filter(|r| keep(r)).enumerate() {
            if i > 0 && self.spaced {
                lines.push(DisplayLine::text("", ""));
            }
            lines.extend((self.rows)(rec, i, t));
        }
        let empty = lines.is_empty();
        let mut sections = Vec::new();
        if !self.header.is_empty() {
            sections.push(Section::new("", self.header.clone()));
        }
        sections.push(Section::new(ctx.t(self.title_key), lines));
        let mut vm = ViewModel::ok(self.title_for(ctx), sections).with_more(self.has_more());
        vm.error = self.error.clone();
        if empty {
            vm = vm.with_notice(ctx.t("view.empty"));
        }
        vm
    }

    pub fn model(&self, ctx: &ViewContext) -> ViewModel {
        self.model_filtered(ctx, |_| true)
    }
}

#[async_trait]
impl<T> View for ListView<T>
where
    T: DeserializeOwned + Paged + Send + Sync + 'static,
{
    fn title(&self, ctx: &ViewContext) -> String {
        self.title_for(ctx)
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        match self.reload(ctx).await {
            Some(err) => err,
            None => self.model(ctx),
        }
    }

    async fn load_more(&mut self, ctx: &ViewContext) -> ViewModel {
        match self.next_page(ctx).await {
            Some(err) => err,
            None => self.model(ctx),
        }
    }
}

// ---------------------------------------------------------------------------
// Row renderers

pub fn op_rows(op: &Value, index: usize, t: &dyn Translator) -> Vec<DisplayLine> {
    operation_card(&normalize(op), index, t)
}

fn asset_seg(a: Option<crate::asset::Asset>) -> Segment {
    match a {
        Some(a) => Segment::Asset(a),
        None => Segment::text(DASH),
    }
}

pub fn offer_rows(o: &OfferRecord, _index: usize, t: &dyn Translator) -> Vec<DisplayLine> {
    vec![DisplayLine::new(
        "",
        vec![
            Segment::Offer(o.id.clone()),
            Segment::Text(format!(" {} ", o.amount)),
            asset_seg(o.selling_asset()),
            Segment::text(" → "),
            asset_seg(o.buying_asset()),
            Segment::Text(format!(" @ {} · {}", o.price, t.t("op.seller"))),
            Segment::Account(o.seller.clone()),
        ],
    )]
}

pub fn trade_rows(tr: &TradeRecord, _index: usize, _t: &dyn Translator) -> Vec<DisplayLine> {
    let price = tr.price.map(|p| p.ratio()).unwrap_or_else(|| DASH.to_string());
    vec![DisplayLine::new(
        tr.ledger_close_time.clone(),
        vec![
            Segment::Text(format!("{} ", tr.base_amount)),
            asset_seg(tr.base_asset()),
            Segment::Text(format!(" ⇄ {} ", tr.counter_amount)),
            asset_seg(tr.counter_asset()),
            Segment::Text(format!(" @ {price}")),
        ],
    )]
}

// ---------------------------------------------------------------------------
// Route constructors

pub fn account_operations(id: &str) -> ListView<Value> {
    ListView::new(
        "view.operations",
        id,
        format!("/accounts/{id}/operations"),
        params(&[("limit", "20"), ("order", "desc"), ("include_failed", "true")]),
        op_rows,
    )
    .spaced()
    .with_header(vec![DisplayLine::new("", vec![Segment::Account(id.to_string())])])
}

pub fn account_offers(id: &str) -> ListView<OfferRecord> {
    ListView::new(
        "view.offers",
        id,
        format!("/accounts/{id}/offers"),
        params(&[("limit", "50"), ("order", "desc")]),
        offer_rows,
    )
    .with_header(vec![DisplayLine::new("", vec![Segment::Account(id.to_string())])])
}

pub fn pool_operations(id: &str) -> ListView<Value> {
    ListView::new(
        "view.operations",
        id,
        format!("/liquidity_pools/{id}/operations"),
        params(&[("limit", "20"), ("order", "desc")]),
        op_rows,
    )
    .spaced()
    .with_header(vec![DisplayLine::new("", vec![Segment::Pool(id.to_string())])])
}

pub fn pool_trades(id: &str) -> ListView<TradeRecord> {
    ListView::new(
        "view.trades",
        id,
        format!("/liquidity_pools/{id}/trades"),
        params(&[("limit", "50"), ("order", "desc")]),
        trade_rows,
    )
    .with_header(vec![DisplayLine::new("", vec![Segment::Pool(id.to_string())])])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::English;
    use serde_json::json;

    #[test]
    fn offer_row_links() {
        let o: OfferRecord = serde_json::from_value(json!({
            "id": "77",
            "seller": "GSELLER",
            "selling": {"asset_type": "native"},
            "buying": {"asset_type": "credit_alphanum4", "asset_code": "USDC", "asset_issuer": "GISS"},
            "amount": "10.0000000",
            "price": "0.1200000"
        }))
        .unwrap();
        let rows = offer_rows(&o, 0, &English::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].segments[0].href().as_deref(), Some("/offer/77"));
        let text = rows[0].value_text();
        assert!(text.starts_with("#77 10.0000000 XLM → USDC"));
        assert!(text.contains("@ 0.1200000"));
    }

    #[test]
    fn trade_row_shows_price_ratio() {
        let tr: TradeRecord = serde_json::from_value(json!({
            "id": "1-1",
            "ledger_close_time": "2024-01-01T00:00:00Z",
            "base_amount": "5.0000000",
            "base_asset_type": "native",
            "counter_amount": "1.0000000",
            "counter_asset_type": "credit_alphanum4",
            "counter_asset_code": "USDC",
            "counter_asset_issuer": "GISS",
            "price": {"n": "1", "d": "5"}
        }))
        .unwrap();
        let rows = trade_rows(&tr, 0, &English::default());
        assert_eq!(rows[0].label, "2024-01-01T00:00:00Z");
        assert!(rows[0].value_text().ends_with("@ 1/5"));
    }

    #[test]
    fn constructors_target_collections() {
        assert_eq!(account_operations("GA").path, "/accounts/GA/operations");
        assert_eq!(account_offers("GA").path, "/accounts/GA/offers");
        assert_eq!(pool_operations("p").path, "/liquidity_pools/p/operations");
        assert_eq!(pool_trades("p").path, "/liquidity_pools/p/trades");
        assert!(account_offers("GA").params.contains(&("limit".into(), "50".into())));
    }
}
