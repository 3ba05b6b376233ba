//! Boundary checks a request must pass before it reaches the engine

use super::calculation::CalculationRequest;
use super::error::{FieldError, ValidationError};
use super::tier::Tier;
use serde_json::{Map, Value};

/// Upper bound accepted for `withholding_tax`.
///
/// The engine multiplies by `1 - withholding_tax`, so only values in
/// `[0, 1]` keep interest non-negative.
pub const MAX_WITHHOLDING_TAX: f64 = 100.0;

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: impl Into<String>, message: &str) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.to_string(),
        });
    }

    /// Reads a required JSON number.
    fn number(&mut self, object: &Map<String, Value>, key: &str, field: &str) -> Option<f64> {
        match object.get(key) {
            None => {
                self.fail(field, "is required");
                None
            }
            Some(value) => {
                let number = value.as_f64();
                if number.is_none() {
                    self.fail(field, "must be a number");
                }
                number
            }
        }
    }

    /// Reads a required JSON number or `null`.
    fn nullable_number(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        field: &str,
    ) -> Option<Option<f64>> {
        match object.get(key) {
            None => {
                self.fail(field, "is required");
                None
            }
            Some(Value::Null) => Some(None),
            Some(value) => {
                let number = value.as_f64();
                if number.is_none() {
                    self.fail(field, "must be a number or null");
                }
                number.map(Some)
            }
        }
    }

    fn finite(&mut self, field: &str, value: Option<f64>) -> Option<f64> {
        let value = value?;
        if value.is_finite() {
            Some(value)
        } else {
            self.fail(field, "must be a finite number");
            None
        }
    }

    fn positive(&mut self, field: &str, value: Option<f64>) -> Option<f64> {
        let value = self.finite(field, value)?;
        if value > 0.0 {
            Some(value)
        } else {
            self.fail(field, "must be greater than 0");
            None
        }
    }

    fn non_negative(&mut self, field: &str, value: Option<f64>) -> Option<f64> {
        let value = self.finite(field, value)?;
        if value >= 0.0 {
            Some(value)
        } else {
            self.fail(field, "must be at least 0");
            None
        }
    }

    fn withholding_tax(&mut self, field: &str, value: Option<f64>) -> Option<f64> {
        let value = self.finite(field, value)?;
        if (0.0..=MAX_WITHHOLDING_TAX).contains(&value) {
            Some(value)
        } else {
            self.fail(field, "must be between 0 and 100");
            None
        }
    }

    /// Whole numbers written as floats (`30.0`) are accepted.
    fn day_count(&mut self, field: &str, value: Option<f64>) -> Option<u32> {
        let value = self.finite(field, value)?;
        if value <= 0.0 || value.fract() != 0.0 {
            self.fail(field, "must be a positive integer");
            None
        } else if value > f64::from(u32::MAX) {
            self.fail(field, "must be at most 4294967295");
            None
        } else {
            Some(value as u32)
        }
    }

    /// `None` is an unbounded bracket; infinity is accepted as one too.
    fn upper_bound(&mut self, field: &str, value: Option<Option<f64>>) -> Option<Option<f64>> {
        match value? {
            Some(max) if max.is_nan() => {
                self.fail(field, "must be a number or null");
                None
            }
            max => Some(max),
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationError {
                errors: self.errors,
            }),
        }
    }
}

/// Range checks shared by typed and untyped requests, in field order.
fn check_scalars(
    c: &mut Checker,
    principal: Option<f64>,
    days: Option<f64>,
    withholding_tax: Option<f64>,
    usd_start_rate: Option<f64>,
    usd_end_rate: Option<f64>,
) -> Option<(f64, u32, f64, f64, f64)> {
    let principal = c.positive("principal", principal);
    let days = c.day_count("days", days);
    let withholding_tax = c.withholding_tax("withholdingTax", withholding_tax);
    let usd_start_rate = c.positive("usdStartRate", usd_start_rate);
    let usd_end_rate = c.positive("usdEndRate", usd_end_rate);
    Some((
        principal?,
        days?,
        withholding_tax?,
        usd_start_rate?,
        usd_end_rate?,
    ))
}

fn check_tier(
    c: &mut Checker,
    index: usize,
    min: Option<f64>,
    max: Option<Option<f64>>,
    rate: Option<f64>,
    exempt: Option<f64>,
) -> Option<Tier> {
    let min = c.non_negative(&format!("tiers[{index}].min"), min);
    let exempt = c.non_negative(&format!("tiers[{index}].exempt"), exempt);
    let rate = c.non_negative(&format!("tiers[{index}].rate"), rate);
    let max = c.upper_bound(&format!("tiers[{index}].max"), max);
    Some(Tier {
        min: min?,
        max: max?,
        rate: rate?,
        exempt: exempt?,
    })
}

/// Reports every out-of-range field of a typed request, or `Ok(())` if the
/// engine may run.
pub fn validate(request: &CalculationRequest) -> Result<(), ValidationError> {
    let mut c = Checker::default();

    let scalars = check_scalars(
        &mut c,
        Some(request.principal),
        Some(f64::from(request.days)),
        Some(request.withholding_tax),
        Some(request.usd_start_rate),
        Some(request.usd_end_rate),
    );
    let mut tiers_ok = true;
    for (i, tier) in request.tiers.iter().enumerate() {
        tiers_ok &= check_tier(
            &mut c,
            i,
            Some(tier.min),
            Some(tier.max),
            Some(tier.rate),
            Some(tier.exempt),
        )
        .is_some();
    }

    c.finish(scalars.filter(|_| tiers_ok).map(|_| ()))
}

/// Builds a request from untyped JSON, reporting missing fields, wrong
/// types, non-integer days and out-of-range values together.
pub fn parse_request(value: &Value) -> Result<CalculationRequest, ValidationError> {
    let mut c = Checker::default();
    let Some(object) = value.as_object() else {
        c.fail("request", "must be an object");
        return c.finish(None);
    };

    let principal = c.number(object, "principal", "principal");
    let days = c.number(object, "days", "days");
    let withholding_tax = c.number(object, "withholdingTax", "withholdingTax");
    let usd_start_rate = c.number(object, "usdStartRate", "usdStartRate");
    let usd_end_rate = c.number(object, "usdEndRate", "usdEndRate");
    let scalars = check_scalars(
        &mut c,
        principal,
        days,
        withholding_tax,
        usd_start_rate,
        usd_end_rate,
    );
    let tiers = parse_tiers(&mut c, object.get("tiers"));

    let request = scalars.zip(tiers).map(
        |((principal, days, withholding_tax, usd_start_rate, usd_end_rate), tiers)| {
            CalculationRequest {
                principal,
                days,
                withholding_tax,
                usd_start_rate,
                usd_end_rate,
                tiers,
            }
        },
    );
    c.finish(request)
}

fn parse_tiers(c: &mut Checker, value: Option<&Value>) -> Option<Vec<Tier>> {
    let entries = match value {
        None => {
            c.fail("tiers", "is required");
            return None;
        }
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            c.fail("tiers", "must be an array");
            return None;
        }
    };

    let mut tiers = Some(Vec::with_capacity(entries.len()));
    for (i, entry) in entries.iter().enumerate() {
        let Some(object) = entry.as_object() else {
            c.fail(format!("tiers[{i}]"), "must be an object");
            tiers = None;
            continue;
        };
        let min = c.number(object, "min", &format!("tiers[{i}].min"));
        let max = c.nullable_number(object, "max", &format!("tiers[{i}].max"));
        let rate = c.number(object, "rate", &format!("tiers[{i}].rate"));
        let exempt = c.number(object, "exempt", &format!("tiers[{i}].exempt"));
        let tier = check_tier(c, i, min, max, rate, exempt);
        tiers = tiers.zip(tier).map(|(mut tiers, tier)| {
            tiers.push(tier);
            tiers
        });
    }
    tiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> CalculationRequest {
        CalculationRequest {
            principal: 1_000.0,
            days: 30,
            withholding_tax: 0.15,
            usd_start_rate: 34.0,
            usd_end_rate: 36.0,
            tiers: vec![Tier {
                min: 0.0,
                max: None,
                rate: 0.4,
                exempt: 0.0,
            }],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate(&valid()).is_ok());
        assert!(validate(&CalculationRequest::default()).is_ok());
    }

    #[test]
    fn test_empty_tier_table_is_valid() {
        let request = CalculationRequest {
            tiers: vec![],
            ..valid()
        };
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_scalar_fields_are_reported_together() {
        let request = CalculationRequest {
            principal: 0.0,
            days: 0,
            withholding_tax: -1.0,
            usd_start_rate: 0.0,
            usd_end_rate: f64::NAN,
            tiers: vec![],
        };
        let error = validate(&request).unwrap_err();
        let fields: Vec<&str> = error.fields().collect();
        assert_eq!(
            fields,
            vec![
                "principal",
                "days",
                "withholdingTax",
                "usdStartRate",
                "usdEndRate"
            ]
        );
    }

    #[test]
    fn test_withholding_tax_bounds() {
        for ok in [0.0, 1.0, 15.0, 100.0] {
            let request = CalculationRequest {
                withholding_tax: ok,
                ..valid()
            };
            assert!(validate(&request).is_ok(), "{ok} should be accepted");
        }
        let request = CalculationRequest {
            withholding_tax: 100.5,
            ..valid()
        };
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_tier_fields_are_indexed() {
        let request = CalculationRequest {
            tiers: vec![
                Tier {
                    min: 0.0,
                    max: Some(10.0),
                    rate: 0.1,
                    exempt: 0.0,
                },
                Tier {
                    min: -5.0,
                    max: Some(f64::NAN),
                    rate: -0.1,
                    exempt: -1.0,
                },
            ],
            ..valid()
        };
        let error = validate(&request).unwrap_err();
        let fields: Vec<&str> = error.fields().collect();
        assert_eq!(
            fields,
            vec!["tiers[1].min", "tiers[1].exempt", "tiers[1].rate", "tiers[1].max"]
        );
    }

    #[test]
    fn test_infinite_amounts_are_rejected() {
        let request = CalculationRequest {
            principal: f64::INFINITY,
            usd_start_rate: f64::INFINITY,
            usd_end_rate: f64::NEG_INFINITY,
            ..valid()
        };
        let error = validate(&request).unwrap_err();
        assert_eq!(
            error.fields().collect::<Vec<_>>(),
            vec!["principal", "usdStartRate", "usdEndRate"]
        );
        assert_eq!(error.errors[0].message, "must be a finite number");
    }

    #[test]
    fn test_unbounded_tier_max_may_be_infinite() {
        let request = CalculationRequest {
            tiers: vec![Tier {
                min: 0.0,
                max: Some(f64::INFINITY),
                rate: 0.4,
                exempt: 0.0,
            }],
            ..valid()
        };
        assert!(validate(&request).is_ok());
    }

    fn body(days: Value) -> Value {
        json!({
            "principal": 1000,
            "days": days,
            "withholdingTax": 0.15,
            "usdStartRate": 34,
            "usdEndRate": 36,
            "tiers": [{"min": 0, "max": null, "rate": 0.4, "exempt": 0}]
        })
    }

    #[test]
    fn test_parse_accepts_well_formed_body() {
        let request = parse_request(&body(json!(30))).unwrap();
        assert_eq!(request, valid());
    }

    #[test]
    fn test_parse_accepts_whole_float_days() {
        let request = parse_request(&body(json!(30.0))).unwrap();
        assert_eq!(request.days, 30);
    }

    #[test]
    fn test_parse_rejects_negative_and_fractional_days() {
        for days in [json!(-1), json!(2.5), json!(0), json!(1e12)] {
            let error = parse_request(&body(days.clone())).unwrap_err();
            assert_eq!(error.fields().collect::<Vec<_>>(), vec!["days"], "{days}");
        }
        let error = parse_request(&body(json!(2.5))).unwrap_err();
        assert_eq!(error.errors[0].message, "must be a positive integer");
    }

    #[test]
    fn test_parse_reports_wrong_types() {
        let error = parse_request(&body(json!("30"))).unwrap_err();
        assert_eq!(error.errors[0].field, "days");
        assert_eq!(error.errors[0].message, "must be a number");
    }

    #[test]
    fn test_parse_reports_missing_fields_with_range_errors() {
        let mut value = body(json!(0));
        let object = value.as_object_mut().unwrap();
        object.remove("principal");
        object.remove("tiers");

        let error = parse_request(&value).unwrap_err();
        assert_eq!(
            error.errors,
            vec![
                FieldError {
                    field: "principal".to_string(),
                    message: "is required".to_string(),
                },
                FieldError {
                    field: "days".to_string(),
                    message: "must be a positive integer".to_string(),
                },
                FieldError {
                    field: "tiers".to_string(),
                    message: "is required".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_checks_each_tier() {
        let mut value = body(json!(30));
        value["tiers"] = json!([
            {"min": 0, "max": 10, "rate": 0.1, "exempt": 0},
            {"min": -5, "rate": "high", "exempt": 0},
            7
        ]);

        let error = parse_request(&value).unwrap_err();
        assert_eq!(
            error.fields().collect::<Vec<_>>(),
            vec!["tiers[1].max", "tiers[1].rate", "tiers[1].min", "tiers[2]"]
        );
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let error = parse_request(&json!([1, 2])).unwrap_err();
        assert_eq!(error.fields().collect::<Vec<_>>(), vec!["request"]);
    }
}
