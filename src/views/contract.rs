use async_trait::async_trait;

use super::{Section, View, ViewContext, ViewModel};
use crate::contract::{ContractInstance, Executable};
use crate::error::StellarxError;
use crate::render::{DisplayLine, Segment};
use crate::util_text::{shorten, DASH};

pub struct ContractView {
    id: String,
}

impl ContractView {
    pub fn new(id: &str) -> Self {
        ContractView { id: id.to_string() }
    }
}

pub(crate) fn instance_lines(id: &str, inst: &ContractInstance) -> Vec<DisplayLine> {
    let ledger = |seq: Option<u64>| match seq {
        Some(s) => vec![Segment::Ledger(s)],
        None => vec![Segment::text(DASH)],
    };
    let mut lines = vec![DisplayLine::new("Contract", vec![Segment::Code(id.to_string())])];
    match &inst.summary {
        Some(s) => {
            let exec = match &s.executable {
                Executable::Wasm(hash) => format!("WASM {hash}"),
                Executable::StellarAsset => "Stellar asset contract".to_string(),
            };
            lines.push(DisplayLine::text("Executable", exec));
            lines.push(DisplayLine::text("Storage entries", s.storage_entries.to_string()));
        }
        None => lines.push(DisplayLine::text("Executable", DASH)),
    }
    lines.push(DisplayLine::new("Last modified", ledger(inst.last_modified)));
    let mut live = ledger(inst.live_until);
    if let Some(until) = inst.live_until {
        if until < inst.latest_ledger {
            live.push(Segment::text(" (archived)"));
        }
    }
    lines.push(DisplayLine::new("Live until", live));
    lines.push(DisplayLine::new("Latest ledger", vec![Segment::Ledger(inst.latest_ledger)]));
    lines
}

#[async_trait]
impl View for ContractView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t("view.contract"), shorten(&self.id))
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        let inst = match ctx.guard(ctx.rpc.contract_instance(&self.id)).await {
            Ok(Some(i)) => i,
            Ok(None) => {
                let e = StellarxError::NotFound(self.id.clone());
                return ViewModel::failed(self.title(ctx), &e);
            }
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        };
        let raw = match &inst.json {
            Some(v) => Section::new("Instance (JSON)", Vec::new())
                .with_raw(serde_json::to_string_pretty(v).unwrap_or_default()),
            None => Section::new("Instance (XDR)", Vec::new()).with_raw(inst.xdr.clone()),
        };
        ViewModel::ok(
            self.title(ctx),
            vec![Section::new("", instance_lines(&self.id, &inst)), raw],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::InstanceSummary;

    #[test]
    fn wasm_instance_lines() {
        let inst = ContractInstance {
            latest_ledger: 500,
            last_modified: Some(100),
            live_until: Some(400),
            summary: Some(InstanceSummary {
                executable: Executable::Wasm("ab".repeat(32)),
                storage_entries: 3,
            }),
            json: None,
            xdr: "AAAA".into(),
        };
        let plain: Vec<String> = instance_lines("CABC", &inst).iter().map(DisplayLine::plain).collect();
        assert_eq!(plain[1], format!("Executable: WASM {}", "ab".repeat(32)));
        assert_eq!(plain[2], "Storage entries: 3");
        assert_eq!(plain[3], "Last modified: 100");
        assert_eq!(plain[4], "Live until: 400 (archived)");
    }
}
