use async_trait::async_trait;
use chrono::Utc;

use super::{link_line, Section, View, ViewContext, ViewModel};
use crate::render::{DisplayLine, Segment};
use crate::util_text::shorten;
use crate::year_stats::{account_operations, scan, validate_year, YearStats};

pub struct YearStatsView {
    id: String,
    year: i32,
}

impl YearStatsView {
    pub fn new(id: &str, year: i32) -> Self {
        YearStatsView {
            id: id.to_string(),
            year,
        }
    }
}

pub(crate) fn stats_lines(stats: &YearStats) -> Vec<DisplayLine> {
    vec![
        DisplayLine::text("Operations", stats.total.to_string()),
        DisplayLine::text("Orders", stats.orders.to_string()),
        DisplayLine::text("Swaps", stats.swaps.to_string()),
        DisplayLine::text("Payments", stats.payments.to_string()),
        DisplayLine::text("Trustlines", stats.trustlines.to_string()),
    ]
}

#[async_trait]
impl View for YearStatsView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} {} · {}", ctx.t("view.stats"), self.year, shorten(&self.id))
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        let window = match validate_year(self.year, Utc::now()) {
            Ok(w) => w,
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        };
        let source = account_operations(&ctx.horizon, &self.id);
        let res = scan(&source, window, &ctx.cancel, |p| {
            ctx.report(format!(
                "page {} · {} operations",
                p.pages, p.stats.total
            ))
        })
        .await;
        match res {
            Ok(stats) => ViewModel::ok(
                self.title(ctx),
                vec![
                    Section::new(
                        "",
                        vec![link_line(ctx.t("view.account"), Segment::Account(self.id.clone()))],
                    ),
                    Section::new(self.year.to_string(), stats_lines(&stats)),
                ],
            ),
            Err(e) => ViewModel::failed(self.title(ctx), &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_in_bucket_order() {
        let s = YearStats { total: 9, orders: 1, swaps: 2, payments: 3, trustlines: 0 };
        let plain: Vec<String> = stats_lines(&s).iter().map(DisplayLine::plain).collect();
        assert_eq!(
            plain,
            vec!["Operations: 9", "Orders: 1", "Swaps: 2", "Payments: 3", "Trustlines: 0"]
        );
    }
}
