use async_trait::async_trait;

use super::{text_line, Section, View, ViewContext, ViewModel};
use crate::asset::Asset;
use crate::horizon::params;
use crate::i18n::Translator;
use crate::paging::{HorizonCollection, Pager};
use crate::render::{DisplayLine, Segment};
use crate::types::{AccountRecord, AssetRecord};
use crate::util_text::DASH;

type Holders = Pager<HorizonCollection<AccountRecord>>;

pub struct AssetView {
    asset: Asset,
    record: Option<AssetRecord>,
    holders: Option<Holders>,
    holders_error: Option<String>,
}

impl AssetView {
    pub fn new(asset: Asset) -> Self {
        AssetView {
            asset,
            record: None,
            holders: None,
            holders_error: None,
        }
    }

    fn model(&self, ctx: &ViewContext) -> ViewModel {
        let t = ctx.translator.as_ref();
        let mut sections = vec![Section::new("", asset_lines(&self.asset, self.record.as_ref(), t))];
        if let Some(h) = &self.holders {
            sections.push(Section::new(
                t.t("view.holders"),
                holder_rows(&self.asset, h.items()),
            ));
        }
        let mut vm = ViewModel::ok(self.title(ctx), sections)
            .with_more(self.holders.as_ref().is_some_and(|h| h.has_more()));
        vm.error = self.holders_error.clone();
        if self.asset.is_native() {
            vm = vm.with_notice("XLM is the native asset; Horizon keeps no holder statistics for it.");
        }
        vm
    }
}

pub(crate) fn asset_lines(asset: &Asset, rec: Option<&AssetRecord>, t: &dyn Translator) -> Vec<DisplayLine> {
    let mut lines = vec![
        DisplayLine::text("Code", asset.code().to_string()),
        DisplayLine::text("Type", asset.wire_type().to_string()),
    ];
    if let Some(issuer) = asset.issuer() {
        lines.push(DisplayLine::new("Issuer", vec![Segment::Account(issuer.to_string())]));
    }
    if let Some(r) = rec {
        let count = |v: Option<u64>| v.map(|n| n.to_string());
        lines.push(text_line(t.t("view.holders"), count(r.holders())));
        lines.push(text_line("Supply", r.supply()));
        lines.push(text_line("Claimable balances", count(r.num_claimable_balances)));
        lines.push(text_line("Liquidity pools", count(r.num_liquidity_pools)));
        lines.push(text_line("In pools", r.liquidity_pools_amount.clone()));
        lines.push(text_line("Contracts", count(r.num_contracts)));
        let flags = r.flags.enabled();
        lines.push(DisplayLine::text(
            "Flags",
            if flags.is_empty() { DASH.to_string() } else { flags.join(", ") },
        ));
    }
    let id = asset.route_id();
    lines.push(DisplayLine::new(
        "",
        vec![
            Segment::Link {
                label: t.t("view.orderbook"),
                href: format!("/asset/{id}/orderbook"),
            },
            Segment::text(" · "),
            Segment::Link {
                label: t.t("view.charts"),
                href: format!("/asset/{id}/charts"),
            },
        ],
    ));
    lines
}

fn holder_rows(asset: &Asset, holders: &[AccountRecord]) -> Vec<DisplayLine> {
    holders
        .iter()
        .map(|acct| {
            let bal = acct
                .balances
                .iter()
                .find(|b| b.asset().as_ref() == Some(asset))
                .map(|b| b.balance.clone())
                .unwrap_or_else(|| DASH.to_string());
            DisplayLine::new(
                "",
                vec![Segment::Account(acct.account_id.clone()), Segment::Text(format!(" · {bal}"))],
            )
        })
        .collect()
}

#[async_trait]
impl View for AssetView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t("view.asset"), self.asset.label())
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        if self.asset.is_native() {
            return self.model(ctx);
        }
        match ctx.guard(ctx.horizon.asset(&self.asset)).await {
            Ok(Some(r)) => self.record = Some(r),
            Ok(None) => {
                let e = crate::error::StellarxError::NotFound(self.asset.canonical());
                return ViewModel::failed(self.title(ctx), &e);
            }
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        }
        let mut holders = Pager::new(HorizonCollection::new(
            &ctx.horizon,
            "/accounts",
            params(&[
                ("asset", self.asset.canonical().as_str()),
                ("limit", "50"),
                ("order", "desc"),
            ]),
        ));
        self.holders_error = match holders.load_more(&ctx.cancel).await {
            Ok(_) => None,
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                log::warn!("[asset] holders: {e}");
                Some(e.user_message())
            }
        };
        self.holders = Some(holders);
        self.model(ctx)
    }

    async fn load_more(&mut self, ctx: &ViewContext) -> ViewModel {
        let Some(h) = self.holders.as_mut() else {
            return self.load(ctx).await;
        };
        self.holders_error = match h.load_more(&ctx.cancel).await {
            Ok(_) => None,
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(e.user_message()),
        };
        self.model(ctx)
    }
}
