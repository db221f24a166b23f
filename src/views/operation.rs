use async_trait::async_trait;

use super::{Section, View, ViewContext, ViewModel};
use crate::operation::normalize;
use crate::render::{format_effect, operation_card};

pub struct OperationView {
    id: String,
}

impl OperationView {
    pub fn new(id: &str) -> Self {
        OperationView { id: id.to_string() }
    }
}

#[async_trait]
impl View for OperationView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t("view.operation"), self.id)
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        let (op, effects) = tokio::join!(
            ctx.guard(ctx.horizon.operation(&self.id)),
            ctx.guard(ctx.horizon.operation_effects(&self.id)),
        );
        let raw = match op {
            Ok(v) => v,
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        };
        let t = ctx.translator.as_ref();
        let mut sections = vec![Section::new("", operation_card(&normalize(&raw), 0, t))];
        let mut vm_error = None;
        match effects {
            Ok(page) => {
                let lines = page.records().iter().map(|e| format_effect(e, t)).collect();
                sections.push(Section::new(t.t("view.effects"), lines));
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                log::warn!("[operation] effects: {e}");
                vm_error = Some(e.user_message());
            }
        }
        let raw_json = serde_json::to_string_pretty(&raw).unwrap_or_default();
        sections.push(Section::new("JSON", Vec::new()).with_raw(raw_json));
        let mut vm = ViewModel::ok(self.title(ctx), sections);
        vm.error = vm_error;
        vm
    }
}
