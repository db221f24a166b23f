//! Operation and effect formatting.
//!
//! Produces `DisplayLine`s made of typed segments so the terminal UI can
//! style links while `--print` mode flattens them to text.

use serde_json::Value;

use crate::asset::Asset;
use crate::data_value::decode_value_as;
use crate::i18n::Translator;
use crate::operation::{
    Claimant, OfferFields, Operation, OperationRecord, ReserveAmount, RevokeTarget, TrustLine,
};
use crate::strkey::{is_account_id, is_contract_id};
use crate::util_text::{shorten, DASH};

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Text(String),
    /// Account or contract key, shown shortened.
    Account(String),
    Asset(Asset),
    Pool(String),
    Offer(String),
    Transaction(String),
    Ledger(u64),
    /// Preformatted value (ids, JSON).
    Code(String),
    /// Arbitrary in-app link.
    Link { label: String, href: String },
}

impl Segment {
    pub fn text(s: impl Into<String>) -> Self {
        Segment::Text(s.into())
    }

    /// Plain-text rendering.
    pub fn display(&self) -> String {
        match self {
            Segment::Text(s) | Segment::Code(s) => s.clone(),
            Segment::Account(id) | Segment::Pool(id) | Segment::Transaction(id) => shorten(id),
            Segment::Asset(a) => a.label(),
            Segment::Offer(id) => format!("#{id}"),
            Segment::Ledger(seq) => seq.to_string(),
            Segment::Link { label, .. } => label.clone(),
        }
    }

    /// In-app route this segment points at.
    pub fn href(&self) -> Option<String> {
        match self {
            Segment::Account(id) if is_account_id(id) => Some(format!("/account/{id}")),
            Segment::Account(id) if is_contract_id(id) => Some(format!("/contract/{id}")),
            Segment::Asset(a) => a.link(),
            Segment::Pool(id) => Some(format!("/pool/{id}")),
            Segment::Offer(id) => Some(format!("/offer/{id}")),
            Segment::Transaction(hash) => Some(format!("/tx/{hash}")),
            Segment::Ledger(seq) => Some(format!("/ledger/{seq}")),
            Segment::Link { href, .. } => Some(href.clone()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayLine {
    pub label: String,
    pub segments: Vec<Segment>,
}

impl DisplayLine {
    pub fn new(label: impl Into<String>, segments: Vec<Segment>) -> Self {
        DisplayLine {
            label: label.into(),
            segments,
        }
    }

    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        DisplayLine::new(label, vec![Segment::Text(value.into())])
    }

    /// Segments joined without the label.
    pub fn value_text(&self) -> String {
        self.segments.iter().map(Segment::display).collect()
    }

    /// `label: value`, or just the value for unlabelled lines.
    pub fn plain(&self) -> String {
        if self.label.is_empty() {
            self.value_text()
        } else {
            format!("{}: {}", self.label, self.value_text())
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperationDetails {
    pub lines: Vec<DisplayLine>,
    /// Pretty JSON for kinds without a recipe.
    pub raw: Option<String>,
}

fn opt_text(v: &Option<String>) -> Segment {
    Segment::Text(v.clone().unwrap_or_else(|| DASH.to_string()))
}

fn account(v: &Option<String>) -> Vec<Segment> {
    match v {
        Some(id) if !id.is_empty() => vec![Segment::Account(id.clone())],
        _ => vec![Segment::text(DASH)],
    }
}

fn asset_seg(a: &Option<Asset>) -> Segment {
    match a {
        Some(a) => Segment::Asset(a.clone()),
        None => Segment::text(DASH),
    }
}

/// `12.5 USDC · GA5Z…KZVN`
fn amount_with_asset(amount: &Option<String>, asset: &Option<Asset>) -> Vec<Segment> {
    let mut out = vec![opt_text(amount)];
    if asset.is_some() {
        out.push(Segment::text(" "));
        out.push(asset_seg(asset));
    }
    out
}

fn path_segments(path: &[Asset]) -> Vec<Segment> {
    let mut out = Vec::with_capacity(path.len() * 2);
    for (i, a) in path.iter().enumerate() {
        if i > 0 {
            out.push(Segment::text(" → "));
        }
        out.push(Segment::Asset(a.clone()));
    }
    out
}

fn reserve_segments(items: &[ReserveAmount]) -> Vec<Segment> {
    let mut out = Vec::new();
    for (i, r) in items.iter().enumerate() {
        if i > 0 {
            out.push(Segment::text(" · "));
        }
        let tag = if i == 0 { "A: " } else { "B: " };
        out.push(Segment::text(tag));
        out.extend(amount_with_asset(&r.amount, &r.asset));
    }
    if out.is_empty() {
        out.push(Segment::text(DASH));
    }
    out
}

fn num(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| DASH.to_string())
}

fn compact_json(v: &Value) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| DASH.to_string())
}

fn pretty_json(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn offer_lines(o: &OfferFields, amount_key: &str, t: &dyn Translator) -> Vec<DisplayLine> {
    let mut lines = Vec::new();
    if let Some(id) = &o.offer_id {
        lines.push(DisplayLine::new(t.t("op.offer"), vec![Segment::Offer(id.clone())]));
    }
    let amount_asset = if amount_key == "op.buy_amount" { &o.buying } else { &o.selling };
    lines.push(DisplayLine::new(t.t(amount_key), amount_with_asset(&o.amount, amount_asset)));
    lines.push(DisplayLine::new(t.t("op.selling"), vec![asset_seg(&o.selling)]));
    lines.push(DisplayLine::new(t.t("op.buying"), vec![asset_seg(&o.buying)]));
    lines.push(DisplayLine::new(t.t("op.price"), vec![opt_text(&o.price)]));
    lines
}

fn claimant_lines(claimants: &[Claimant], t: &dyn Translator) -> Vec<DisplayLine> {
    let mut lines = vec![DisplayLine::text(t.t("op.claimants"), claimants.len().to_string())];
    for (i, c) in claimants.iter().enumerate() {
        let mut segs = account(&c.destination);
        segs.push(Segment::text(" · "));
        segs.push(Segment::Code(compact_json(&c.predicate)));
        lines.push(DisplayLine::new(format!("  #{}", i + 1), segs));
    }
    lines
}

fn revoke_line(target: &RevokeTarget, t: &dyn Translator) -> DisplayLine {
    let with_account = |mut segs: Vec<Segment>, acct: &Option<String>| {
        if acct.is_some() {
            segs.push(Segment::text(" · "));
            segs.extend(account(acct));
        }
        segs
    };
    match target {
        RevokeTarget::Offer { offer_id, seller } => DisplayLine::new(
            t.t("op.target_offer"),
            with_account(vec![Segment::Offer(offer_id.clone())], seller),
        ),
        RevokeTarget::ClaimableBalance { balance_id } => DisplayLine::new(
            t.t("op.target_balance"),
            vec![Segment::Code(balance_id.clone())],
        ),
        RevokeTarget::LiquidityPool { pool_id, account: acct } => DisplayLine::new(
            t.t("op.target_pool"),
            with_account(vec![Segment::Pool(pool_id.clone())], acct),
        ),
        RevokeTarget::Data { account: acct, name } => DisplayLine::new(
            t.t("op.target_data"),
            with_account(vec![Segment::Text(name.clone())], acct),
        ),
        RevokeTarget::Signer { account: acct, key } => DisplayLine::new(
            t.t("op.target_signer"),
            with_account(vec![Segment::Account(key.clone())], acct),
        ),
        RevokeTarget::TrustLine { account: acct, asset } => {
            let mut segs = account(acct);
            segs.push(Segment::text(" · "));
            segs.push(asset_seg(asset));
            DisplayLine::new(t.t("op.target_trustline"), segs)
        }
        RevokeTarget::Account { account: acct } => DisplayLine::new(
            t.t("op.target_account"),
            vec![Segment::Account(acct.clone())],
        ),
        RevokeTarget::Unresolved(raw) => {
            DisplayLine::new(t.t("op.target"), vec![Segment::Code(compact_json(raw))])
        }
    }
}

/// Detail lines for one operation.
pub fn format_operation(rec: &OperationRecord, t: &dyn Translator) -> OperationDetails {
    let mut lines: Vec<DisplayLine> = Vec::new();
    let mut raw = None;
    let line = |key: &str, segs: Vec<Segment>| DisplayLine::new(t.t(key), segs);

    match &rec.op {
        Operation::CreateAccount {
            destination,
            starting_balance,
        } => {
            lines.push(line("op.destination", account(destination)));
            lines.push(line(
                "op.starting_balance",
                amount_with_asset(starting_balance, &Some(Asset::Native)),
            ));
        }
        Operation::Payment {
            destination,
            asset,
            amount,
        } => {
            lines.push(line("op.to", account(destination)));
            lines.push(line("op.amount", amount_with_asset(amount, asset)));
        }
        Operation::PathPaymentStrictReceive {
            destination,
            dest_asset,
            dest_amount,
            send_asset,
            send_max,
            path,
        } => {
            lines.push(line("op.to", account(destination)));
            lines.push(line("op.dest_amount", amount_with_asset(dest_amount, dest_asset)));
            lines.push(line("op.send_max", amount_with_asset(send_max, send_asset)));
            if !path.is_empty() {
                lines.push(line("op.path", path_segments(path)));
            }
        }
        Operation::PathPaymentStrictSend {
            destination,
            send_asset,
            send_amount,
            dest_asset,
            dest_min,
            path,
        } => {
            lines.push(line("op.to", account(destination)));
            lines.push(line("op.send_amount", amount_with_asset(send_amount, send_asset)));
            lines.push(line("op.dest_min", amount_with_asset(dest_min, dest_asset)));
            if !path.is_empty() {
                lines.push(line("op.path", path_segments(path)));
            }
        }
        Operation::ManageSellOffer(o) | Operation::CreatePassiveSellOffer(o) => {
            lines.extend(offer_lines(o, "op.amount", t));
        }
        Operation::ManageBuyOffer(o) => lines.extend(offer_lines(o, "op.buy_amount", t)),
        Operation::SetOptions {
            inflation_dest,
            home_domain,
            master_weight,
            low_threshold,
            med_threshold,
            high_threshold,
            set_flags,
            clear_flags,
            signer,
        } => {
            if inflation_dest.is_some() {
                lines.push(line("op.inflation_dest", account(inflation_dest)));
            }
            if home_domain.is_some() {
                lines.push(line("op.home_domain", vec![opt_text(home_domain)]));
            }
            if low_threshold.is_some() || med_threshold.is_some() || high_threshold.is_some() {
                lines.push(DisplayLine::text(
                    t.t("op.thresholds"),
                    format!(
                        "low: {}, med: {}, high: {}",
                        num(*low_threshold),
                        num(*med_threshold),
                        num(*high_threshold)
                    ),
                ));
            }
            if master_weight.is_some() {
                lines.push(DisplayLine::text(t.t("op.master_weight"), num(*master_weight)));
            }
            if set_flags.is_some() {
                lines.push(line("op.set_flags", vec![opt_text(set_flags)]));
            }
            if clear_flags.is_some() {
                lines.push(line("op.clear_flags", vec![opt_text(clear_flags)]));
            }
            if let Some(s) = signer {
                let mut segs = account(&s.key);
                segs.push(Segment::Text(format!(" ({} {})", t.t("op.weight"), num(s.weight))));
                lines.push(line("op.signer", segs));
            }
        }
        Operation::ChangeTrust { line: tl, limit } => {
            match tl {
                TrustLine::Pool(Some(id)) => {
                    lines.push(line("op.pool", vec![Segment::Pool(id.clone())]))
                }
                TrustLine::Pool(None) => lines.push(line("op.pool", vec![Segment::text(DASH)])),
                TrustLine::Asset(a) => lines.push(line("op.asset", vec![asset_seg(a)])),
            }
            lines.push(line("op.limit", vec![opt_text(limit)]));
        }
        Operation::AllowTrust {
            trustor,
            asset,
            asset_code,
            authorize,
        } => {
            lines.push(line("op.trustor", account(trustor)));
            let asset_segs = match (asset, asset_code) {
                (Some(a), _) => vec![Segment::Asset(a.clone())],
                (None, code) => vec![opt_text(code)],
            };
            lines.push(line("op.asset", asset_segs));
            lines.push(line("op.authorize", vec![opt_text(authorize)]));
        }
        Operation::AccountMerge { destination } => {
            lines.push(line("op.into", account(destination)));
        }
        Operation::Inflation => {}
        Operation::ManageData { name, value } => {
            lines.push(line("op.data_name", vec![opt_text(name)]));
            match value {
                None => lines.push(DisplayLine::text(t.t("op.value_deleted"), t.t("op.deleted"))),
                Some(v) => {
                    lines.push(line("op.value_raw", vec![Segment::Code(v.raw.clone())]));
                    if let Some(decoded) = decode_value_as(&v.raw, v.encoding) {
                        if let Some(text) = decoded.text {
                            lines.push(line("op.value_string", vec![Segment::Text(text)]));
                        }
                        lines.push(line("op.value_hex", vec![Segment::Code(decoded.hex)]));
                    }
                }
            }
        }
        Operation::BumpSequence { bump_to } => {
            lines.push(line("op.bump_to", vec![opt_text(bump_to)]));
        }
        Operation::CreateClaimableBalance {
            asset,
            amount,
            claimants,
        } => {
            lines.push(line("op.amount", amount_with_asset(amount, asset)));
            lines.extend(claimant_lines(claimants, t));
        }
        Operation::ClaimClaimableBalance { balance_id }
        | Operation::ClawbackClaimableBalance { balance_id } => {
            let seg = match balance_id {
                Some(id) => Segment::Code(id.clone()),
                None => Segment::text(DASH),
            };
            lines.push(line("op.balance_id", vec![seg]));
        }
        Operation::BeginSponsoringFutureReserves { sponsored_id } => {
            lines.push(line("op.sponsored", account(sponsored_id)));
        }
        Operation::EndSponsoringFutureReserves { begin_sponsor } => {
            if begin_sponsor.is_some() {
                lines.push(line("op.sponsor", account(begin_sponsor)));
            }
        }
        Operation::RevokeSponsorship(target) => lines.push(revoke_line(target, t)),
        Operation::Clawback {
            from,
            asset,
            amount,
        } => {
            lines.push(line("op.from", account(from)));
            lines.push(line("op.amount", amount_with_asset(amount, asset)));
        }
        Operation::SetTrustLineFlags {
            trustor,
            asset,
            set_flags,
            clear_flags,
        } => {
            lines.push(line("op.trustor", account(trustor)));
            lines.push(line("op.asset", vec![asset_seg(asset)]));
            lines.push(line("op.set_flags", vec![opt_text(set_flags)]));
            lines.push(line("op.clear_flags", vec![opt_text(clear_flags)]));
        }
        Operation::LiquidityPoolDeposit {
            pool_id,
            max_amounts,
            min_price,
            max_price,
            deposited,
            shares_received,
        } => {
            lines.push(pool_line(pool_id, t));
            lines.push(line("op.max_amounts", reserve_segments(max_amounts)));
            lines.push(line("op.min_price", vec![opt_text(min_price)]));
            lines.push(line("op.max_price", vec![opt_text(max_price)]));
            if !deposited.is_empty() {
                lines.push(line("op.deposited", reserve_segments(deposited)));
            }
            if shares_received.is_some() {
                lines.push(line("op.shares_received", vec![opt_text(shares_received)]));
            }
        }
        Operation::LiquidityPoolWithdraw {
            pool_id,
            shares,
            min_amounts,
            received,
        } => {
            lines.push(pool_line(pool_id, t));
            lines.push(line("op.shares", vec![opt_text(shares)]));
            lines.push(line("op.min_amounts", reserve_segments(min_amounts)));
            if !received.is_empty() {
                lines.push(line("op.received", reserve_segments(received)));
            }
        }
        Operation::Unknown { raw: v } => raw = Some(pretty_json(v)),
    }

    OperationDetails { lines, raw }
}

fn pool_line(pool_id: &Option<String>, t: &dyn Translator) -> DisplayLine {
    let seg = match pool_id {
        Some(id) => Segment::Pool(id.clone()),
        None => Segment::text(DASH),
    };
    DisplayLine::new(t.t("op.pool"), vec![seg])
}

pub fn status_label(successful: Option<bool>, t: &dyn Translator) -> String {
    match successful {
        Some(true) => t.t("status.success"),
        Some(false) => t.t("status.failed"),
        None => DASH.to_string(),
    }
}

/// Full card: a heading line, source/transaction lines, then details.
pub fn operation_card(rec: &OperationRecord, index: usize, t: &dyn Translator) -> Vec<DisplayLine> {
    let mut heading = vec![Segment::Text(format!("#{} {}", index + 1, rec.type_tag))];
    if let Some(id) = &rec.id {
        heading.push(Segment::text(" · "));
        heading.push(Segment::Link {
            label: id.clone(),
            href: format!("/operation/{id}"),
        });
    }
    if let Some(at) = &rec.created_at {
        heading.push(Segment::Text(format!(" · {at}")));
    }
    if rec.successful.is_some() {
        heading.push(Segment::Text(format!(" · {}", status_label(rec.successful, t))));
    }

    let mut out = vec![DisplayLine::new("", heading)];
    if rec.source_account.is_some() {
        out.push(DisplayLine::new(t.t("op.source"), account(&rec.source_account)));
    }
    if let Some(hash) = &rec.transaction_hash {
        out.push(DisplayLine::new(
            t.t("op.transaction"),
            vec![Segment::Transaction(hash.clone())],
        ));
    }
    let details = format_operation(rec, t);
    out.extend(details.lines);
    if let Some(raw) = details.raw {
        for l in raw.lines() {
            out.push(DisplayLine::new("", vec![Segment::Code(l.to_string())]));
        }
    }
    out
}

/// One line per Horizon effect record.
pub fn format_effect(effect: &Value, t: &dyn Translator) -> DisplayLine {
    let kind = effect.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let s = |k: &str| effect.get(k).and_then(Value::as_str).map(str::to_string);
    match kind {
        "account_credited" | "account_debited" => {
            let sign = if kind == "account_credited" { "+" } else { "-" };
            let mut segs = account(&s("account"));
            segs.push(Segment::Text(format!(" {sign}")));
            segs.extend(amount_with_asset(&s("amount"), &Asset::from_horizon(effect, "")));
            let key = if kind == "account_credited" {
                "effect.credited"
            } else {
                "effect.debited"
            };
            DisplayLine::new(t.t(key), segs)
        }
        "trade" => {
            let mut segs = account(&s("account"));
            segs.push(Segment::text(" sold "));
            segs.extend(amount_with_asset(&s("sold_amount"), &Asset::from_horizon(effect, "sold_")));
            segs.push(Segment::text(" for "));
            segs.extend(amount_with_asset(
                &s("bought_amount"),
                &Asset::from_horizon(effect, "bought_"),
            ));
            DisplayLine::new(t.t("effect.trade"), segs)
        }
        other => DisplayLine::text(other.to_string(), s("id").unwrap_or_else(|| DASH.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::English;
    use crate::operation::normalize;
    use serde_json::json;

    const G1: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";
    const G2: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    fn plain(rec: &OperationRecord) -> Vec<String> {
        format_operation(rec, &English::default())
            .lines
            .iter()
            .map(DisplayLine::plain)
            .collect()
    }

    #[test]
    fn xdr_payment_lines() {
        let rec = normalize(&json!({"body": {"payment": {
            "destination": G1,
            "asset": {"credit_alphanum4": {"asset_code": "USDC", "issuer": G2}},
            "amount": "125000000"
        }}}));
        assert_eq!(
            plain(&rec),
            vec!["To: GA5Z…KZVN".to_string(), "Amount: 12.5 USDC · GBRP…OX2H".to_string()]
        );
        let details = format_operation(&rec, &English::default());
        assert_eq!(details.lines[0].segments[0].href(), Some(format!("/account/{G1}")));
        assert_eq!(details.lines[1].segments[2].href(), Some(format!("/asset/USDC-{G2}")));
    }

    #[test]
    fn missing_fields_render_dash() {
        let rec = normalize(&json!({"type": "payment"}));
        assert_eq!(plain(&rec), vec!["To: —".to_string(), "Amount: —".to_string()]);
    }

    #[test]
    fn set_options_thresholds_line() {
        let rec = normalize(&json!({
            "type": "set_options", "low_threshold": 1, "high_threshold": 3,
            "set_flags_s": ["auth_required"], "signer_key": G2, "signer_weight": 2
        }));
        let lines = plain(&rec);
        assert!(lines.contains(&"Thresholds: low: 1, med: —, high: 3".to_string()));
        assert!(lines.contains(&"Set flags: auth_required".to_string()));
        assert!(lines.contains(&"Signer: GBRP…OX2H (weight 2)".to_string()));
    }

    #[test]
    fn manage_data_drops_text_for_control_bytes() {
        let printable = normalize(&json!({"type": "manage_data", "name": "greeting", "value": "aGVsbG8="}));
        assert_eq!(
            plain(&printable),
            vec![
                "Name: greeting".to_string(),
                "Value (raw): aGVsbG8=".to_string(),
                "Value (string): hello".to_string(),
                "Value (hex): 68656c6c6f".to_string(),
            ]
        );
        // 0x41 0x01 0x42
        let binary = normalize(&json!({"type": "manage_data", "name": "bin", "value": "QQFC"}));
        let lines = plain(&binary);
        assert!(!lines.iter().any(|l| l.starts_with("Value (string)")));
        assert!(lines.contains(&"Value (hex): 410142".to_string()));
    }

    #[test]
    fn unknown_kind_dumps_json() {
        let rec = normalize(&json!({"type": "invoke_host_function", "function": "HostFunctionTypeHostFunctionTypeInvokeContract"}));
        let details = format_operation(&rec, &English::default());
        assert!(details.lines.is_empty());
        assert!(details.raw.unwrap().contains("\"function\""));
    }

    #[test]
    fn offers_and_pool_lines() {
        let rec = normalize(&json!({
            "type": "manage_buy_offer", "offer_id": "0", "amount": "10.0000000",
            "selling_asset_type": "native",
            "buying_asset_type": "credit_alphanum4", "buying_asset_code": "USDC", "buying_asset_issuer": G2,
            "price": "0.2000000", "price_r": {"n": 1, "d": 5}
        }));
        let lines = plain(&rec);
        assert_eq!(lines[0], "Buy amount: 10.0000000 USDC · GBRP…OX2H");
        assert!(lines.contains(&"Price: 1/5".to_string()));

        let dep = normalize(&json!({
            "type": "liquidity_pool_deposit", "liquidity_pool_id": "ab".repeat(32),
            "reserves_max": [{"asset": "native", "amount": "100.0000000"}, {"asset": format!("USDC:{G2}"), "amount": "10.0000000"}],
            "min_price": "0.09", "max_price": "0.11", "shares_received": "31.6227766"
        }));
        let lines = plain(&dep);
        assert_eq!(lines[1], "Max amounts: A: 100.0000000 XLM · B: 10.0000000 USDC · GBRP…OX2H");
        assert!(lines.contains(&"Shares received: 31.6227766".to_string()));
    }

    #[test]
    fn effect_lines() {
        let t = English::default();
        let credited = format_effect(
            &json!({"type": "account_credited", "account": G1, "amount": "5.0000000", "asset_type": "native"}),
            &t,
        );
        assert_eq!(credited.plain(), "Credited: GA5Z…KZVN +5.0000000 XLM");
        let other = format_effect(&json!({"type": "signer_created", "id": "0001-1"}), &t);
        assert_eq!(other.plain(), "signer_created: 0001-1");
    }

    #[test]
    fn card_has_heading_and_links() {
        let rec = normalize(&json!({
            "id": "123", "type": "bump_sequence", "bump_to": "99",
            "source_account": G1, "transaction_hash": "ab".repeat(32),
            "created_at": "2025-03-01T00:00:00Z", "transaction_successful": false
        }));
        let card = operation_card(&rec, 0, &English::default());
        assert_eq!(card[0].plain(), "#1 bump_sequence · 123 · 2025-03-01T00:00:00Z · failed");
        assert_eq!(card[2].segments[0].href(), Some(format!("/tx/{}", "ab".repeat(32))));
        assert_eq!(card.last().unwrap().plain(), "Bump to: 99");
    }
}
