use async_trait::async_trait;
use chrono::{Datelike, Utc};

use super::{link_line, text_line, Section, View, ViewContext, ViewModel};
use crate::account::{AccountSummary, BalanceLine, PoolCache};
use crate::i18n::Translator;
use crate::render::{DisplayLine, Segment};
use crate::strkey::{is_account_id, signer_hint};
use crate::util_text::{shorten, DASH};

pub struct AccountView {
    id: String,
    pools: PoolCache,
    summary: Option<AccountSummary>,
}

impl AccountView {
    pub fn new(id: &str) -> Self {
        AccountView {
            id: id.to_string(),
            pools: PoolCache::default(),
            summary: None,
        }
    }
}

fn balance_line(b: &BalanceLine) -> DisplayLine {
    let mut segs = vec![Segment::Text(format!("{} ", b.balance)), Segment::Asset(b.asset.clone())];
    if let Some(limit) = &b.limit {
        segs.push(Segment::Text(format!(" · limit {limit}")));
    }
    let buying = b.buying_liabilities.as_deref().unwrap_or("0");
    let selling = b.selling_liabilities.as_deref().unwrap_or("0");
    if buying.trim_start_matches(['0', '.']) != "" || selling.trim_start_matches(['0', '.']) != "" {
        segs.push(Segment::Text(format!(" · liabilities {buying}/{selling}")));
    }
    if b.authorized == Some(false) {
        segs.push(Segment::text(" · not authorized"));
    }
    if let Some(sp) = &b.sponsor {
        segs.push(Segment::text(" · sponsor "));
        segs.push(Segment::Account(sp.clone()));
    }
    DisplayLine::new("", segs)
}

pub(crate) fn summary_sections(s: &AccountSummary, t: &dyn Translator) -> Vec<Section> {
    let year = Utc::now().year();
    let mut overview = vec![
        link_line(t.t("view.account"), Segment::Account(s.account_id.clone())),
        DisplayLine::text("Sequence", s.sequence.clone()),
        text_line(t.t("op.home_domain"), s.home_domain.clone()),
        DisplayLine::text(
            "Subentries",
            format!(
                "{} · sponsoring {} · sponsored {}",
                s.subentry_count, s.num_sponsoring, s.num_sponsored
            ),
        ),
        DisplayLine::text("Reserve", format!("{} XLM", s.reserve_display())),
        DisplayLine::text(
            "Available",
            s.available_display()
                .map(|a| format!("{a} XLM"))
                .unwrap_or_else(|| DASH.to_string()),
        ),
        DisplayLine::text(
            t.t("op.thresholds"),
            format!(
                "low: {}, med: {}, high: {}",
                s.thresholds.low_threshold, s.thresholds.med_threshold, s.thresholds.high_threshold
            ),
        ),
    ];
    let flags = s.flags.enabled();
    overview.push(DisplayLine::text(
        "Flags",
        if flags.is_empty() { DASH.to_string() } else { flags.join(", ") },
    ));
    if let Some(sp) = &s.sponsor {
        overview.push(link_line(t.t("op.sponsor"), Segment::Account(sp.clone())));
    }
    overview.push(DisplayLine::new(
        "",
        vec![
            Segment::Link {
                label: t.t("view.operations"),
                href: format!("/account/{}/operations", s.account_id),
            },
            Segment::text(" · "),
            Segment::Link {
                label: t.t("view.offers"),
                href: format!("/account/{}/offers", s.account_id),
            },
            Segment::text(" · "),
            Segment::Link {
                label: format!("{} {year}", t.t("view.stats")),
                href: format!("/account/{}/{year}", s.account_id),
            },
        ],
    ));

    let mut balances = Vec::new();
    if let Some(n) = &s.native {
        balances.push(balance_line(n));
    }
    balances.extend(s.credit.iter().map(balance_line));

    let mut sections = vec![Section::new("", overview), Section::new("Balances", balances)];

    if !s.pools.is_empty() {
        let lines = s
            .pools
            .iter()
            .map(|p| {
                let mut segs = vec![
                    Segment::Pool(p.pool_id.clone()),
                    Segment::Text(format!(" · {} {}", p.shares, t.t("op.shares"))),
                ];
                for (i, r) in p.implied.iter().enumerate() {
                    segs.push(Segment::text(if i == 0 { " ≈ " } else { " + " }));
                    segs.push(Segment::Text(format!("{} ", r.amount)));
                    segs.push(Segment::Asset(r.asset.clone()));
                }
                DisplayLine::new("", segs)
            })
            .collect();
        sections.push(Section::new("Pool shares", lines));
    }

    let signers = s
        .signers
        .iter()
        .map(|sg| {
            let key = if is_account_id(&sg.key) {
                Segment::Account(sg.key.clone())
            } else {
                Segment::Code(shorten(&sg.key))
            };
            let hint = if is_account_id(&sg.key) {
                signer_hint(&sg.key).map(|h| format!(" [{h}]")).unwrap_or_default()
            } else {
                String::new()
            };
            DisplayLine::new(
                "",
                vec![
                    key,
                    Segment::Text(format!("{hint} · {} {} · {}", t.t("op.weight"), sg.weight, sg.kind)),
                ],
            )
        })
        .collect();
    sections.push(Section::new(t.t("op.signer"), signers));

    if !s.data.is_empty() {
        let mut lines = Vec::new();
        for d in &s.data {
            lines.push(DisplayLine::text(t.t("op.data_name"), d.name.clone()));
            lines.push(DisplayLine::text(t.t("op.value_raw"), d.raw.clone()));
            if let Some(v) = &d.decoded {
                if let Some(text) = &v.text {
                    lines.push(DisplayLine::text(t.t("op.value_string"), text.clone()));
                }
                lines.push(DisplayLine::text(t.t("op.value_hex"), v.hex.clone()));
            }
        }
        sections.push(Section::new("Data", lines));
    }
    sections
}

#[async_trait]
impl View for AccountView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t("view.account"), shorten(&self.id))
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        let rec = match ctx.guard(ctx.horizon.account(&self.id)).await {
            Ok(r) => r,
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        };
        let mut summary = AccountSummary::from_record(&rec);
        let ids = summary.pool_ids();
        if !ids.is_empty() {
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => {}
                _ = self.pools.fill(&ctx.horizon, &ids) => {}
            }
            summary.apply_pools(&self.pools);
        }
        log::info!(
            "[account] {} balances={} pools={}",
            shorten(&self.id),
            summary.credit.len() + usize::from(summary.native.is_some()),
            summary.pools.len()
        );
        let sections = summary_sections(&summary, ctx.translator.as_ref());
        self.summary = Some(summary);
        ViewModel::ok(self.title(ctx), sections)
    }
}
