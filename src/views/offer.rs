use async_trait::async_trait;
use serde_json::Value;

use super::list::{trade_rows, ListView};
use super::{link_line, text_line, Section, View, ViewContext, ViewModel};
use crate::error::{Result, StellarxError};
use crate::horizon::params;
use crate::i18n::Translator;
use crate::render::{DisplayLine, Segment};
use crate::types::{OfferRecord, TradeRecord};
use crate::trades::TradeFilter;
use crate::util_text::DASH;

pub struct OfferView {
    id: String,
}

impl OfferView {
    pub fn new(id: &str) -> Self {
        OfferView { id: id.to_string() }
    }
}

fn asset_seg(a: Option<crate::asset::Asset>) -> Segment {
    a.map(Segment::Asset).unwrap_or_else(|| Segment::text(DASH))
}

pub(crate) fn offer_lines(o: &OfferRecord, t: &dyn Translator) -> Vec<DisplayLine> {
    let price = match (&o.price_r, o.price.is_empty()) {
        (_, false) => o.price.clone(),
        (Some(p), true) => p.ratio(),
        (None, true) => DASH.to_string(),
    };
    let modified = match (&o.last_modified_time, o.last_modified_ledger) {
        (Some(time), Some(seq)) => vec![Segment::Text(format!("{time} · ")), Segment::Ledger(seq)],
        (None, Some(seq)) => vec![Segment::Ledger(seq)],
        (Some(time), None) => vec![Segment::Text(time.clone())],
        (None, None) => vec![Segment::text(DASH)],
    };
    let mut lines = vec![
        DisplayLine::new(t.t("op.offer"), vec![Segment::Code(o.id.clone())]),
        link_line(t.t("op.seller"), Segment::Account(o.seller.clone())),
        DisplayLine::new("Last modified", modified),
        link_line(t.t("op.selling"), asset_seg(o.selling_asset())),
        link_line(t.t("op.buying"), asset_seg(o.buying_asset())),
        text_line(t.t("op.amount"), Some(o.amount.clone())),
        DisplayLine::text(t.t("op.price"), price),
    ];
    if let Some(p) = &o.price_r {
        lines.push(DisplayLine::text("Price ratio", p.ratio()));
    }
    if let Some(s) = &o.sponsor {
        lines.push(link_line(t.t("op.sponsor"), Segment::Account(s.clone())));
    }
    lines.push(DisplayLine::new(
        "",
        vec![Segment::Link {
            label: t.t("view.trades"),
            href: format!("/offer/{}/trades", o.id),
        }],
    ));
    lines
}

#[async_trait]
impl View for OfferView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} #{}", ctx.t("view.offer"), self.id)
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        let url = ctx.horizon.url(&format!("/offers/{}", self.id), &[]);
        let raw: Value = match ctx.guard(ctx.horizon.get_value(&url)).await {
            Ok(v) => v,
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        };
        let offer: OfferRecord = match serde_json::from_value(raw.clone()) {
            Ok(o) => o,
            Err(e) => return ViewModel::failed(self.title(ctx), &StellarxError::from(e)),
        };
        let raw_json = serde_json::to_string_pretty(&raw).unwrap_or_default();
        ViewModel::ok(
            self.title(ctx),
            vec![
                Section::new("", offer_lines(&offer, ctx.translator.as_ref())),
                Section::new("JSON", Vec::new()).with_raw(raw_json),
            ],
        )
    }
}

/// Trades that touched one offer, with an amount/asset filter over what
/// has been loaded.
pub struct OfferTradesView {
    list: ListView<TradeRecord>,
    filter: TradeFilter,
}

impl OfferTradesView {
    pub fn new(id: &str) -> Self {
        let list = ListView::new(
            "view.trades",
            id,
            format!("/offers/{id}/trades"),
            params(&[("limit", "50"), ("order", "desc")]),
            trade_rows,
        )
        .with_header(vec![DisplayLine::new("", vec![Segment::Offer(id.to_string())])]);
        OfferTradesView {
            list,
            filter: TradeFilter::default(),
        }
    }

    fn model(&self, ctx: &ViewContext) -> ViewModel {
        let vm = self.list.model_filtered(ctx, |tr| self.filter.matches(tr));
        if self.filter.is_empty() {
            return vm;
        }
        let shown = self.list.items().iter().filter(|tr| self.filter.matches(tr)).count();
        let note = format!("Filter: {shown} of {} loaded trades", self.list.items().len());
        match vm.notice.clone() {
            Some(n) => vm.with_notice(format!("{note}. {n}")),
            None => vm.with_notice(note),
        }
    }
}

#[async_trait]
impl View for OfferTradesView {
    fn title(&self, ctx: &ViewContext) -> String {
        self.list.title_for(ctx)
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        match self.list.reload(ctx).await {
            Some(err) => err,
            None => self.model(ctx),
        }
    }

    async fn load_more(&mut self, ctx: &ViewContext) -> ViewModel {
        match self.list.next_page(ctx).await {
            Some(err) => err,
            None => self.model(ctx),
        }
    }

    fn filter_prompt(&self) -> Option<&'static str> {
        Some("Amount and/or asset, e.g. >100 USDC (empty clears)")
    }

    async fn apply_filter(&mut self, ctx: &ViewContext, input: &str) -> Result<ViewModel> {
        self.filter = TradeFilter::parse_line(input)?;
        Ok(self.model(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::English;
    use serde_json::json;

    #[test]
    fn offer_details() {
        let o: OfferRecord = serde_json::from_value(json!({
            "id": "165561423",
            "seller": "GSELLER",
            "selling": {"asset_type": "credit_alphanum4", "asset_code": "USDC", "asset_issuer": "GISS"},
            "buying": {"asset_type": "native"},
            "amount": "18.6",
            "price": "",
            "price_r": {"n": 10, "d": 3},
            "last_modified_ledger": 42,
            "last_modified_time": "2024-02-02T00:00:00Z"
        }))
        .unwrap();
        let lines = offer_lines(&o, &English::default());
        let plain: Vec<String> = lines.iter().map(DisplayLine::plain).collect();
        assert!(plain.contains(&"Price: 10/3".to_string()));
        assert!(plain.contains(&"Last modified: 2024-02-02T00:00:00Z · 42".to_string()));
        assert!(plain.contains(&"Selling: USDC · GISS".to_string()));
        assert_eq!(
            lines.last().unwrap().segments[0].href().as_deref(),
            Some("/offer/165561423/trades")
        );
    }
}
