use async_trait::async_trait;

use super::{text_line, Section, View, ViewContext, ViewModel};
use crate::account::pool_breakdown;
use crate::horizon::params;
use crate::i18n::Translator;
use crate::paging::{HorizonCollection, Pager};
use crate::render::{DisplayLine, Segment};
use crate::types::{AccountRecord, PoolRecord};
use crate::util_text::{shorten, DASH};

type Holders = Pager<HorizonCollection<AccountRecord>>;

pub struct PoolView {
    id: String,
    pool: Option<PoolRecord>,
    holders: Option<Holders>,
    holders_error: Option<String>,
}

impl PoolView {
    pub fn new(id: &str) -> Self {
        PoolView {
            id: id.to_string(),
            pool: None,
            holders: None,
            holders_error: None,
        }
    }

    fn model(&self, ctx: &ViewContext) -> ViewModel {
        let Some(pool) = &self.pool else {
            return ViewModel::loading(self.title(ctx));
        };
        let t = ctx.translator.as_ref();
        let mut sections = vec![Section::new("", pool_lines(pool, t))];
        let holders = self.holders.as_ref();
        let rows = holders
            .map(|h| holder_rows(pool, h.items()))
            .unwrap_or_default();
        sections.push(Section::new(t.t("view.holders"), rows));
        let mut vm = ViewModel::ok(self.title(ctx), sections)
            .with_more(holders.is_some_and(|h| h.has_more()));
        vm.error = self.holders_error.clone();
        vm
    }
}

pub(crate) fn pool_lines(pool: &PoolRecord, t: &dyn Translator) -> Vec<DisplayLine> {
    let mut lines = vec![
        DisplayLine::new(t.t("view.pool"), vec![Segment::Code(pool.id.clone())]),
        text_line("Type", Some(pool.kind.clone())),
        DisplayLine::text("Fee", format!("{} bp ({}%)", pool.fee_bp, pool.fee_bp as f64 / 100.0)),
        text_line("Trustlines", Some(pool.total_trustlines.clone())),
        text_line(t.t("op.shares"), Some(pool.total_shares.clone())),
    ];
    for r in &pool.reserves {
        let asset = match r.asset_id() {
            Some(a) => Segment::Asset(a),
            None => Segment::Text(r.asset.clone()),
        };
        lines.push(DisplayLine::new(
            "Reserve",
            vec![Segment::Text(format!("{} ", r.amount)), asset],
        ));
    }
    let link = |label: String, page: &str| Segment::Link {
        label,
        href: format!("/pool/{}/{page}", pool.id),
    };
    lines.push(DisplayLine::new(
        "",
        vec![
            link(t.t("view.operations"), "operations"),
            Segment::text(" · "),
            link(t.t("view.trades"), "trades"),
            Segment::text(" · "),
            link(t.t("view.charts"), "charts"),
        ],
    ));
    lines
}

/// One line per holder: shares and what they are worth in reserves.
pub(crate) fn holder_rows(pool: &PoolRecord, holders: &[AccountRecord]) -> Vec<DisplayLine> {
    holders
        .iter()
        .map(|acct| {
            let shares = acct
                .balances
                .iter()
                .find(|b| b.liquidity_pool_id.as_deref() == Some(pool.id.as_str()))
                .map(|b| b.balance.clone());
            let mut segs = vec![Segment::Account(acct.account_id.clone())];
            match shares {
                Some(s) => {
                    segs.push(Segment::Text(format!(" · {s}")));
                    for (i, r) in pool_breakdown(pool, &s).into_iter().enumerate() {
                        segs.push(Segment::text(if i == 0 { " ≈ " } else { " + " }));
                        segs.push(Segment::Text(format!("{} ", r.amount)));
                        segs.push(Segment::Asset(r.asset));
                    }
                }
                None => segs.push(Segment::Text(format!(" · {DASH}"))),
            }
            DisplayLine::new("", segs)
        })
        .collect()
}

#[async_trait]
impl View for PoolView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t("view.pool"), shorten(&self.id))
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        match ctx.guard(ctx.horizon.liquidity_pool(&self.id)).await {
            Ok(p) => self.pool = Some(p),
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        }
        let mut holders = Pager::new(HorizonCollection::new(
            &ctx.horizon,
            "/accounts",
            params(&[("liquidity_pool", self.id.as_str()), ("limit", "50"), ("order", "desc")]),
        ));
        self.holders_error = holders
            .load_more(&ctx.cancel)
            .await
            .err()
            .filter(|e| !e.is_cancelled())
            .map(|e| {
                log::warn!("[pool] holders: {e}");
                e.user_message()
            });
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
