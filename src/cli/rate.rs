use super::ui;
use crate::core::rate::{PROJECTION_DAYS, RateResult, TimeSeriesProvider};
use crate::core::rate_service::RateService;
use anyhow::Result;
use comfy_table::Cell;

/// Rows of history shown in the table view; JSON output carries all of it.
const HISTORY_ROWS: usize = 10;

impl RateResult {
    pub fn display_as_table(&self, pair: (&str, &str)) -> String {
        let (base, quote) = pair;

        let mut summary = ui::new_styled_table();
        summary.set_header(vec![
            ui::header_cell(&format!("{base}/{quote}")),
            ui::header_cell("Avg Daily Change"),
            ui::header_cell(&format!("Target ({PROJECTION_DAYS}d)")),
            ui::header_cell("Last Update"),
        ]);
        summary.add_row(vec![
            ui::amount_cell(self.current_price, 4),
            ui::change_cell(self.avg_daily_change, 6),
            ui::amount_cell(self.suggested_target_price, 4),
            Cell::new(&self.last_update),
        ]);

        let mut history = ui::new_styled_table();
        history.set_header(vec![ui::header_cell("Date"), ui::header_cell("Close")]);
        for entry in self.history.iter().take(HISTORY_ROWS) {
            history.add_row(vec![Cell::new(&entry.date), ui::amount_cell(entry.price, 4)]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text(&format!("{base}/{quote} rate"), ui::StyleType::Title)
        );
        output.push_str(&summary.to_string());
        output.push_str("\n\n");
        output.push_str(&history.to_string());
        if self.history.len() > HISTORY_ROWS {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!(
                        "showing {HISTORY_ROWS} of {} daily closes",
                        self.history.len()
                    ),
                    ui::StyleType::Subtle
                )
            ));
        }
        output
    }
}

pub async fn run<P: TimeSeriesProvider>(service: &RateService<P>, json: bool) -> Result<()> {
    let pb = (!json).then(|| ui::new_spinner("Fetching USD rates..."));
    let result = service.get_usd_rate().await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let result = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.display_as_table(service.pair()));
    }
    Ok(())
}
