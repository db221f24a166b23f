use async_trait::async_trait;

use super::{link_line, Section, View, ViewContext, ViewModel};
use crate::horizon::params;
use crate::i18n::Translator;
use crate::paging::{HorizonCollection, Pager};
use crate::render::{status_label, DisplayLine, Segment};
use crate::types::{LedgerRecord, TransactionRecord};
use crate::util_text::{format_stroop, format_stroops, DASH};

type Transactions = Pager<HorizonCollection<TransactionRecord>>;

pub struct LedgerView {
    seq: u64,
    ledger: Option<LedgerRecord>,
    txs: Option<Transactions>,
    txs_error: Option<String>,
}

impl LedgerView {
    pub fn new(seq: u64) -> Self {
        LedgerView {
            seq,
            ledger: None,
            txs: None,
            txs_error: None,
        }
    }

    fn model(&self, ctx: &ViewContext) -> ViewModel {
        let Some(ledger) = &self.ledger else {
            return ViewModel::loading(self.title(ctx));
        };
        let t = ctx.translator.as_ref();
        let rows = self
            .txs
            .as_ref()
            .map(|p| tx_rows(p.items(), t))
            .unwrap_or_default();
        let mut vm = ViewModel::ok(
            self.title(ctx),
            vec![
                Section::new("", ledger_lines(ledger)),
                Section::new(t.t("view.transaction"), rows),
            ],
        )
        .with_more(self.txs.as_ref().is_some_and(|p| p.has_more()));
        vm.error = self.txs_error.clone();
        vm
    }
}

pub(crate) fn ledger_lines(l: &LedgerRecord) -> Vec<DisplayLine> {
    let failed = l.failed_transaction_count.unwrap_or(0);
    let mut lines = vec![
        DisplayLine::text("Sequence", l.sequence.to_string()),
        DisplayLine::text("Closed", l.closed_at.clone()),
        DisplayLine::text("Protocol", l.protocol_version.to_string()),
        DisplayLine::text(
            "Transactions",
            format!("{} ok · {failed} failed", l.successful_transaction_count),
        ),
        DisplayLine::text("Operations", l.operation_count.to_string()),
        DisplayLine::text("Base fee", format!("{} XLM", format_stroops(l.base_fee_in_stroops as i64))),
        DisplayLine::text(
            "Base reserve",
            format!("{} XLM", format_stroops(l.base_reserve_in_stroops as i64)),
        ),
        DisplayLine::text("Total coins", l.total_coins.clone()),
        DisplayLine::text("Fee pool", l.fee_pool.clone()),
        DisplayLine::new("Hash", vec![Segment::Code(l.hash.clone())]),
    ];
    match (&l.prev_hash, l.sequence.checked_sub(1)) {
        (Some(prev), Some(p)) if p > 0 => lines.push(DisplayLine::new(
            "Previous",
            vec![Segment::Link {
                label: prev.clone(),
                href: format!("/ledger/{p}"),
            }],
        )),
        _ => lines.push(DisplayLine::text("Previous", DASH)),
    }
    lines.push(link_line("Next", Segment::Ledger(l.sequence + 1)));
    lines
}

pub(crate) fn tx_rows(txs: &[TransactionRecord], t: &dyn Translator) -> Vec<DisplayLine> {
    txs.iter()
        .map(|tx| {
            DisplayLine::new(
                "",
                vec![
                    Segment::Transaction(tx.hash.clone()),
                    Segment::text(" · "),
                    Segment::Account(tx.source_account.clone()),
                    Segment::Text(format!(
                        " · {} ops · {} · fee {}",
                        tx.operation_count,
                        status_label(Some(tx.successful), t),
                        format_stroop(&tx.fee_charged)
                    )),
                ],
            )
        })
        .collect()
}

#[async_trait]
impl View for LedgerView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} {}", ctx.t("view.ledger"), self.seq)
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        match ctx.guard(ctx.horizon.ledger(self.seq)).await {
            Ok(l) => self.ledger = Some(l),
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        }
        let mut txs = Pager::new(HorizonCollection::new(
            &ctx.horizon,
            format!("/ledgers/{}/transactions", self.seq),
            params(&[("limit", "200"), ("order", "desc"), ("include_failed", "true")]),
        ));
        self.txs_error = match txs.load_more(&ctx.cancel).await {
            Ok(_) => None,
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                log::warn!("[ledger] transactions: {e}");
                Some(e.user_message())
            }
        };
        self.txs = Some(txs);
        self.model(ctx)
    }

    async fn load_more(&mut self, ctx: &ViewContext) -> ViewModel {
        let Some(txs) = self.txs.as_mut() else {
            return self.load(ctx).await;
        };
        self.txs_error = match txs.load_more(&ctx.cancel).await {
            Ok(_) => None,
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(e.user_message()),
        };
        self.model(ctx)
    }
}
