use async_trait::async_trait;
use serde_json::Value;

use super::{link_line, text_line, Section, View, ViewContext, ViewModel};
use crate::contract::envelope_operations;
use crate::i18n::Translator;
use crate::operation::normalize;
use crate::render::{operation_card, status_label, DisplayLine, Segment};
use crate::types::TransactionRecord;
use crate::util_text::{format_stroop, shorten};

pub struct TransactionView {
    hash: String,
}

impl TransactionView {
    pub fn new(hash: &str) -> Self {
        TransactionView {
            hash: hash.to_string(),
        }
    }

    /// Operations from the envelope XDR, or Horizon's list when the
    /// envelope is missing or does not decode.
    async fn operations(&self, ctx: &ViewContext, tx: &TransactionRecord) -> Vec<Value> {
        if let Some(env) = tx.envelope_xdr.as_deref() {
            match envelope_operations(env) {
                Ok(ops) => return ops,
                Err(e) => log::warn!("[tx] {}: {e}", shorten(&self.hash)),
            }
        }
        match ctx.guard(ctx.horizon.transaction_operations(&self.hash)).await {
            Ok(page) => page.into_records(),
            Err(e) => {
                log::warn!("[tx] operations: {e}");
                Vec::new()
            }
        }
    }
}

pub(crate) fn tx_lines(tx: &TransactionRecord, t: &dyn Translator) -> Vec<DisplayLine> {
    let memo = match (&tx.memo, tx.memo_type.as_str()) {
        (Some(m), kind) if !m.is_empty() => Some(format!("{m} ({kind})")),
        _ => None,
    };
    let mut lines = vec![
        DisplayLine::new("Hash", vec![Segment::Code(tx.hash.clone())]),
        DisplayLine::text("Status", status_label(Some(tx.successful), t)),
        link_line("Ledger", Segment::Ledger(tx.ledger)),
        text_line("Created", Some(tx.created_at.clone())),
        link_line(t.t("op.source"), Segment::Account(tx.source_account.clone())),
    ];
    if let Some(fee_acct) = tx.fee_account.as_ref().filter(|f| **f != tx.source_account) {
        lines.push(link_line("Fee account", Segment::Account(fee_acct.clone())));
    }
    lines.push(DisplayLine::text(
        "Fee",
        format!("{} XLM (max {})", format_stroop(&tx.fee_charged), format_stroop(&tx.max_fee)),
    ));
    lines.push(DisplayLine::text(t.t("view.operations"), tx.operation_count.to_string()));
    lines.push(text_line("Memo", memo));
    lines
}

#[async_trait]
impl View for TransactionView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t("view.transaction"), shorten(&self.hash))
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        let tx = match ctx.guard(ctx.horizon.transaction(&self.hash)).await {
            Ok(tx) => tx,
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        };
        let t = ctx.translator.as_ref();
        let ops = self.operations(ctx, &tx).await;
        let mut cards = Vec::new();
        for (i, raw) in ops.iter().enumerate() {
            cards.extend(operation_card(&normalize(raw), i, t));
            cards.push(DisplayLine::text("", ""));
        }
        cards.pop();
        ViewModel::ok(
            self.title(ctx),
            vec![
                Section::new("", tx_lines(&tx, t)),
                Section::new(t.t("view.operations"), cards),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::English;
    use serde_json::json;

    #[test]
    fn header_lines() {
        let tx: TransactionRecord = serde_json::from_value(json!({
            "hash": "ab".repeat(32),
            "successful": true,
            "ledger": 5,
            "created_at": "2024-05-01T00:00:00Z",
            "source_account": "GSRC",
            "fee_account": "GSRC",
            "fee_charged": "100",
            "max_fee": "1000",
            "operation_count": 2,
            "memo_type": "text",
            "memo": "hi"
        }))
        .unwrap();
        let lines = tx_lines(&tx, &English::default());
        let plain: Vec<String> = lines.iter().map(DisplayLine::plain).collect();
        assert!(plain.contains(&"Fee: 0.00001 XLM (max 0.0001)".to_string()));
        assert!(plain.contains(&"Memo: hi (text)".to_string()));
        assert!(!plain.iter().any(|l| l.starts_with("Fee account")));
        assert_eq!(lines[2].segments[0].href().as_deref(), Some("/ledger/5"));
    }
}
