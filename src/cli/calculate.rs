use super::ui;
use crate::core::calculation::{CalculationRequest, CalculationResponse, DailyResult};
use crate::core::error::Error;
use crate::core::{engine, validation};
use anyhow::{Context, Result};
use comfy_table::Cell;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Where the request comes from and how to print the result.
#[derive(Debug, Default, Clone)]
pub struct CalculateOptions {
    pub request_path: Option<PathBuf>,
    pub principal: Option<f64>,
    pub days: Option<u32>,
    pub withholding_tax: Option<f64>,
    pub usd_start_rate: Option<f64>,
    pub usd_end_rate: Option<f64>,
    pub daily: bool,
    pub json: bool,
}

/// Reads the request file (or takes the configured defaults), applies any
/// flag overrides on top and validates the result.
///
/// Field problems surface as [`Error::Validation`].
pub fn build_request(
    options: &CalculateOptions,
    defaults: &CalculationRequest,
) -> Result<CalculationRequest> {
    let mut raw = match &options.request_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read request file: {}", path.display()))?;
            serde_json::from_str::<Value>(&text)
                .with_context(|| format!("Failed to parse request file: {}", path.display()))?
        }
        None => serde_json::to_value(defaults)?,
    };

    if let Some(object) = raw.as_object_mut() {
        let overrides = [
            ("principal", options.principal),
            ("days", options.days.map(f64::from)),
            ("withholdingTax", options.withholding_tax),
            ("usdStartRate", options.usd_start_rate),
            ("usdEndRate", options.usd_end_rate),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                object.insert(key.to_string(), Value::from(value));
            }
        }
    }

    validation::parse_request(&raw).map_err(|e| Error::Validation(e).into())
}

impl CalculationResponse {
    pub fn display_as_table(&self) -> String {
        let mut totals = ui::new_styled_table();
        totals.set_header(vec![
            ui::header_cell("Total Balance"),
            ui::header_cell("Net Profit"),
            ui::header_cell("USD Initial"),
            ui::header_cell("USD Final"),
            ui::header_cell("USD P/L"),
        ]);
        totals.add_row(vec![
            ui::amount_cell(self.total_balance, 2),
            ui::change_cell(self.total_net_profit, 2),
            ui::amount_cell(self.usd_initial, 2),
            ui::amount_cell(self.usd_final_value, 2),
            ui::change_cell(self.usd_profit_loss, 2),
        ]);

        let mut tiers = ui::new_styled_table();
        tiers.set_header(vec![
            ui::header_cell("Tier"),
            ui::header_cell("Rate (%)"),
            ui::header_cell("Days"),
            ui::header_cell("Interest Earned"),
        ]);
        for summary in &self.tier_summary {
            let label = if summary.fallback {
                "No matching tier".to_string()
            } else {
                match summary.max {
                    Some(max) => format!("{:.2} - {:.2}", summary.min, max),
                    None => format!("{:.2} +", summary.min),
                }
            };
            tiers.add_row(vec![
                Cell::new(label),
                ui::amount_cell(summary.rate * 100.0, 2),
                ui::amount_cell(summary.days_passed as f64, 0),
                ui::amount_cell(summary.interest_earned, 2),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Projection", ui::StyleType::Title)
        );
        output.push_str(&totals.to_string());
        output.push_str(&format!(
            "\n\n{}\n\n",
            ui::style_text("Tiers", ui::StyleType::Title)
        ));
        output.push_str(&tiers.to_string());
        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Final Balance", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", self.total_balance),
                ui::StyleType::TotalValue
            )
        ));
        output
    }
}

pub fn schedule_as_table(days: &[DailyResult]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Day"),
        ui::header_cell("Month"),
        ui::header_cell("Balance"),
        ui::header_cell("Exemption"),
        ui::header_cell("Gross Interest"),
        ui::header_cell("Net Interest"),
    ]);
    for day in days {
        table.add_row(vec![
            ui::amount_cell(day.day as f64, 0),
            ui::amount_cell(day.month as f64, 0),
            ui::amount_cell(day.balance, 2),
            ui::amount_cell(day.exemption, 2),
            ui::amount_cell(day.gross_interest, 2),
            ui::amount_cell(day.net_interest, 2),
        ]);
    }
    table.to_string()
}

/// Validates, simulates and prints. The engine is not run for a request
/// that fails validation.
pub fn run(options: &CalculateOptions, defaults: &CalculationRequest) -> Result<()> {
    let request = match build_request(options, defaults) {
        Ok(request) => request,
        Err(e) => {
            if options.json {
                if let Some(Error::Validation(errors)) = e.downcast_ref::<Error>() {
                    println!("{}", serde_json::to_string_pretty(errors)?);
                }
            }
            return Err(e);
        }
    };
    debug!(
        principal = request.principal,
        days = request.days,
        tiers = request.tiers.len(),
        "Running projection"
    );

    let response = engine::simulate(&request);
    let schedule = options.daily.then(|| engine::schedule(&request));

    if options.json {
        let mut value = serde_json::to_value(&response)?;
        if let (Some(days), Some(object)) = (&schedule, value.as_object_mut()) {
            object.insert("schedule".to_string(), serde_json::to_value(days)?);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if let Some(days) = &schedule {
        println!("{}\n", schedule_as_table(days));
    }
    println!("{}", response.display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tier::Tier;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let options = CalculateOptions {
            principal: Some(5_000.0),
            days: Some(7),
            usd_end_rate: Some(40.0),
            ..CalculateOptions::default()
        };
        let defaults = CalculationRequest::default();

        let request = build_request(&options, &defaults).unwrap();
        assert_eq!(request.principal, 5_000.0);
        assert_eq!(request.days, 7);
        assert_eq!(request.usd_end_rate, 40.0);
        assert_eq!(request.usd_start_rate, defaults.usd_start_rate);
        assert_eq!(request.tiers, defaults.tiers);
    }

    #[test]
    fn test_request_file_replaces_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{"principal": 20000, "days": 1, "withholdingTax": 0,
                "usdStartRate": 1, "usdEndRate": 1,
                "tiers": [{"min": 0, "max": null, "rate": 0.44, "exempt": 20000}]}"#,
        )
        .unwrap();
        let options = CalculateOptions {
            request_path: Some(file.path().to_path_buf()),
            ..CalculateOptions::default()
        };

        let request = build_request(&options, &CalculationRequest::default()).unwrap();
        assert_eq!(request.principal, 20_000.0);
        assert_eq!(request.tiers.len(), 1);
    }

    #[test]
    fn test_unreadable_request_file_fails() {
        let options = CalculateOptions {
            request_path: Some(PathBuf::from("/nonexistent/request.json")),
            ..CalculateOptions::default()
        };
        let err = build_request(&options, &CalculationRequest::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read request file"));
    }

    #[test]
    fn test_invalid_request_is_rejected_before_simulation() {
        let options = CalculateOptions {
            principal: Some(-1.0),
            ..CalculateOptions::default()
        };
        let err = run(&options, &CalculationRequest::default()).unwrap_err();
        let validation = err.downcast_ref::<Error>().unwrap();
        match validation {
            Error::Validation(e) => assert_eq!(e.fields().collect::<Vec<_>>(), vec!["principal"]),
            other => panic!("Expected a validation error, got {other}"),
        }
    }

    fn request_file(body: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), body).unwrap();
        file
    }

    fn file_request_with_days(days: &str) -> String {
        format!(
            r#"{{"principal": 20000, "days": {days}, "withholdingTax": 0,
                "usdStartRate": 1, "usdEndRate": 1,
                "tiers": [{{"min": 0, "max": null, "rate": 0.44, "exempt": 0}}]}}"#
        )
    }

    fn validation_fields(err: &anyhow::Error) -> Vec<String> {
        match err.downcast_ref::<Error>() {
            Some(Error::Validation(e)) => e.fields().map(str::to_string).collect(),
            other => panic!("Expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_days_in_request_file_are_field_errors() {
        for days in ["-1", "2.5", "\"7\""] {
            let file = request_file(&file_request_with_days(days));
            let options = CalculateOptions {
                request_path: Some(file.path().to_path_buf()),
                json: true,
                ..CalculateOptions::default()
            };
            let err = run(&options, &CalculationRequest::default()).unwrap_err();
            assert_eq!(validation_fields(&err), vec!["days"], "days = {days}");
        }
    }

    #[test]
    fn test_whole_float_days_in_request_file_are_accepted() {
        let file = request_file(&file_request_with_days("30.0"));
        let options = CalculateOptions {
            request_path: Some(file.path().to_path_buf()),
            ..CalculateOptions::default()
        };
        let request = build_request(&options, &CalculationRequest::default()).unwrap();
        assert_eq!(request.days, 30);
        assert!(run(&options, &CalculationRequest::default()).is_ok());
    }

    #[test]
    fn test_missing_principal_is_a_field_error() {
        let file = request_file(
            r#"{"days": 30, "withholdingTax": 0, "usdStartRate": 1, "usdEndRate": 1,
                "tiers": []}"#,
        );
        let options = CalculateOptions {
            request_path: Some(file.path().to_path_buf()),
            ..CalculateOptions::default()
        };
        let err = build_request(&options, &CalculationRequest::default()).unwrap_err();
        assert_eq!(validation_fields(&err), vec!["principal"]);
        assert!(err.to_string().contains("principal is required"));
    }

    #[test]
    fn test_flag_overrides_fill_missing_file_fields() {
        let file = request_file(
            r#"{"days": 30, "withholdingTax": 0, "usdStartRate": 1, "usdEndRate": 1,
                "tiers": []}"#,
        );
        let options = CalculateOptions {
            request_path: Some(file.path().to_path_buf()),
            principal: Some(5_000.0),
            ..CalculateOptions::default()
        };
        let request = build_request(&options, &CalculationRequest::default()).unwrap();
        assert_eq!(request.principal, 5_000.0);
    }

    #[test]
    fn test_infinite_principal_flag_is_rejected() {
        let options = CalculateOptions {
            principal: Some(f64::INFINITY),
            ..CalculateOptions::default()
        };
        let err = run(&options, &CalculationRequest::default()).unwrap_err();
        assert_eq!(validation_fields(&err), vec!["principal"]);
    }

    #[test]
    fn test_non_json_request_file_fails_to_parse() {
        let file = request_file("principal = 5");
        let options = CalculateOptions {
            request_path: Some(file.path().to_path_buf()),
            ..CalculateOptions::default()
        };
        let err = build_request(&options, &CalculationRequest::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse request file"));
    }

    #[test]
    fn test_response_table_lists_tiers_and_fallback() {
        let request = CalculationRequest {
            principal: 1_000.0,
            days: 10,
            withholding_tax: 0.0,
            usd_start_rate: 1.0,
            usd_end_rate: 1.0,
            tiers: vec![Tier {
                min: 5_000.0,
                max: None,
                rate: 0.4,
                exempt: 0.0,
            }],
        };
        let output = engine::simulate(&request).display_as_table();
        assert!(output.contains("No matching tier"));
        assert!(output.contains("1000.00"));
    }

    #[test]
    fn test_schedule_table_has_a_row_per_day() {
        let request = CalculationRequest {
            days: 3,
            ..CalculationRequest::default()
        };
        let output = schedule_as_table(&engine::schedule(&request));
        assert!(output.contains("Gross Interest"));
        assert!(output.contains("100000.00"));
    }
}
