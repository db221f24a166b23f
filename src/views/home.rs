use async_trait::async_trait;

use super::{Section, View, ViewContext, ViewModel};
use crate::error::{Result, StellarxError};
use crate::render::{DisplayLine, Segment};
use crate::search::{classify, SearchTarget, ASSET_SEARCH_LIMIT};
use crate::types::AssetRecord;
use crate::util_text::DASH;

/// Start page: recent accounts and asset-code search results.
#[derive(Default)]
pub struct HomeView {
    query: Option<String>,
    results: Vec<AssetRecord>,
}

impl HomeView {
    pub fn new() -> Self {
        HomeView::default()
    }

    /// Home page preloaded with an asset-code search.
    pub fn search(code: &str) -> Self {
        HomeView {
            query: Some(code.to_string()),
            results: Vec::new(),
        }
    }

    fn model(&self, ctx: &ViewContext) -> ViewModel {
        let mut sections = Vec::new();
        if let Some(q) = &self.query {
            let lines = self.results.iter().map(asset_row).collect::<Vec<_>>();
            let empty = lines.is_empty();
            sections.push(Section::new(format!("{} · {q}", ctx.t("view.asset")), lines));
            if empty {
                return ViewModel::ok(self.title(ctx), sections).with_notice(ctx.t("view.empty"));
            }
        }
        let recent = ctx
            .recent
            .items()
            .iter()
            .map(|id| DisplayLine::new("", vec![Segment::Account(id.clone())]))
            .collect::<Vec<_>>();
        if !recent.is_empty() {
            sections.push(Section::new(ctx.t("search.recent"), recent));
        }
        let vm = ViewModel::ok(self.title(ctx), sections);
        if self.query.is_none() {
            vm.with_notice(ctx.t("search.empty"))
        } else {
            vm
        }
    }
}

fn asset_row(rec: &AssetRecord) -> DisplayLine {
    let holders = rec.holders().map(|h| h.to_string()).unwrap_or_else(|| DASH.into());
    let supply = rec.supply().unwrap_or_else(|| DASH.into());
    DisplayLine::new(
        "",
        vec![
            Segment::Asset(rec.asset()),
            Segment::Text(format!(" · holders {holders} · supply {supply}")),
        ],
    )
}

#[async_trait]
impl View for HomeView {
    fn title(&self, ctx: &ViewContext) -> String {
        ctx.t("view.home")
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        if let Some(code) = self.query.clone() {
            match ctx
                .guard(ctx.horizon.assets_by_code(&code, ASSET_SEARCH_LIMIT))
                .await
            {
                Ok(found) => {
                    log::info!("[home] {} assets for {code}", found.len());
                    self.results = found;
                }
                Err(e) => return ViewModel::failed(self.title(ctx), &e),
            }
        }
        self.model(ctx)
    }

    fn filter_prompt(&self) -> Option<&'static str> {
        Some("Asset code")
    }

    async fn apply_filter(&mut self, ctx: &ViewContext, input: &str) -> Result<ViewModel> {
        match classify(input) {
            SearchTarget::AssetCode(code) => {
                self.query = Some(code);
                Ok(self.load(ctx).await)
            }
            SearchTarget::Empty => Err(StellarxError::Validation(ctx.t("search.empty"))),
            _ => Err(StellarxError::Validation(ctx.t("search.unknown"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn asset_row_prefers_new_counters() {
        let rec: AssetRecord = serde_json::from_value(json!({
            "asset_type": "credit_alphanum4",
            "asset_code": "USDC",
            "asset_issuer": "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN",
            "num_accounts": 3,
            "accounts": {"authorized": 12},
            "balances": {"authorized": "100.0000000"}
        }))
        .unwrap();
        let line = asset_row(&rec);
        assert_eq!(
            line.value_text(),
            "USDC · GA5Z…KZVN · holders 12 · supply 100.0000000"
        );
        assert!(line.segments[0].href().is_some());
    }
}
