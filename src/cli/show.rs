use super::ui;
use crate::core::Payload;
use crate::core::config::AppConfig;
use crate::store::SnapshotStore;
use anyhow::{Result, anyhow};
use comfy_table::Cell;

impl Payload {
    pub fn display_as_table(&self) -> String {
        let mut funds = ui::new_styled_table();
        funds.set_header(vec![ui::header_cell("Fund"), ui::header_cell("Share Price")]);
        for (code, price) in self.tsp.funds.iter() {
            funds.add_row(vec![
                Cell::new(code.label()),
                ui::format_optional_cell(price, |p| format!("${p:.4}")),
            ]);
        }

        let rates = &self.fed.rates;
        let mut fed = ui::new_styled_table();
        fed.set_header(vec![ui::header_cell("Rate"), ui::header_cell("Percent")]);
        for (name, value) in [
            ("Effective Fed Funds", rates.effective_fed_funds_rate),
            ("Target Lower", rates.target_lower),
            ("Target Upper", rates.target_upper),
        ] {
            fed.add_row(vec![
                Cell::new(name),
                ui::format_optional_cell(value, |v| format!("{v:.2}%")),
            ]);
        }

        let mut output = format!(
            "Trade date: {}\n\n",
            ui::style_text(&self.trade_date.to_string(), ui::StyleType::Title)
        );
        output.push_str(&funds.to_string());
        output.push_str("\n\n");
        output.push_str(&fed.to_string());
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("Fetched {}", self.as_of_utc.to_rfc3339()),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

/// Prints the most recent payload from the data directory.
pub fn run(config: &AppConfig) -> Result<()> {
    let store = SnapshotStore::new(config.data_dir()?);
    let payload = store.load_latest()?.ok_or_else(|| {
        anyhow!(
            "No payload found at {}. Run `tspfed update` first.",
            store.latest_path().display()
        )
    })?;

    println!("{}", payload.display_as_table());
    Ok(())
}
