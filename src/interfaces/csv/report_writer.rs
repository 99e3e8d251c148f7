use crate::application::ledger::ResellerSummary;
use crate::error::Result;
use rust_decimal::RoundingStrategy;
use serde::Serialize;
use std::io::Write;

/// One output line of the reseller report, already formatted for display.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReportRow {
    pub reseller: u32,
    pub open_sales: usize,
    pub total_sold: String,
    pub commission: String,
    pub amount_due: String,
    pub goal: String,
    pub goal_progress: String,
    /// Empty when the goal cannot be reached.
    pub sales_to_goal: String,
    pub receivable: String,
    pub pending_settlements: usize,
}

impl From<&ResellerSummary> for ReportRow {
    fn from(summary: &ResellerSummary) -> Self {
        let progress = &summary.progress;
        Self {
            reseller: summary.reseller,
            open_sales: summary.open_sales,
            total_sold: progress.total_sold.to_string(),
            commission: progress.commission.to_string(),
            amount_due: summary.amount_due.to_string(),
            goal: progress.goal.to_string(),
            goal_progress: format!(
                "{:.2}",
                progress
                    .progress
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            ),
            sales_to_goal: progress
                .sales_to_goal
                .map(|m| m.to_string())
                .unwrap_or_default(),
            receivable: summary.receivable.to_string(),
            pending_settlements: summary.pending_settlements,
        }
    }
}

/// Writes reseller summaries as CSV, one row per reseller.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and every summary, in the order given, then flushes.
    pub fn write_summaries(&mut self, summaries: &[ResellerSummary]) -> Result<()> {
        if summaries.is_empty() {
            self.writer.write_record([
                "reseller",
                "open_sales",
                "total_sold",
                "commission",
                "amount_due",
                "goal",
                "goal_progress",
                "sales_to_goal",
                "receivable",
                "pending_settlements",
            ])?;
        }
        for summary in summaries {
            self.writer.serialize(ReportRow::from(summary))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
