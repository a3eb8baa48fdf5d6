//! Value expressions: literals, `set:A,B,C` and `range:start,stop[,step]`.
//!
//! A token is parsed once into a [`ValueExpression`] and then expanded into an
//! ordered [`ValueDomain`]. Numeric ranges are inclusive: the endpoint is kept
//! when the accumulated value lands within the tolerance of `stop`.

use crate::domain::model::ValueDomain;
use crate::utils::error::{Result, SweepError};
use serde::{Deserialize, Serialize};

const SET_PREFIX: &str = "set:";
const RANGE_PREFIX: &str = "range:";

/// 浮點數差距小於此值視為相等
pub const DEFAULT_TOLERANCE: f64 = 1e-8;
pub const DEFAULT_MAX_VALUES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpansionSettings {
    pub tolerance: f64,
    /// Upper bound on the number of values a single range may produce.
    pub max_values: usize,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_values: DEFAULT_MAX_VALUES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpression {
    Literal(String),
    Set(Vec<String>),
    Range { start: f64, stop: f64, step: f64 },
}

impl ValueExpression {
    pub fn parse(token: &str) -> Result<Self> {
        if let Some(rest) = strip_prefix_ignore_case(token, SET_PREFIX) {
            if rest.is_empty() {
                return Err(SweepError::InvalidExpression {
                    expression: token.to_string(),
                    reason: "a set needs at least one value".to_string(),
                });
            }
            return Ok(ValueExpression::Set(
                rest.split(',').map(str::to_string).collect(),
            ));
        }

        if let Some(rest) = strip_prefix_ignore_case(token, RANGE_PREFIX) {
            let parts: Vec<&str> = rest.split(',').collect();
            let numbers = parts
                .iter()
                .map(|part| parse_bound(token, part))
                .collect::<Result<Vec<f64>>>()?;

            return match numbers.as_slice() {
                [start, stop] => Ok(ValueExpression::Range {
                    start: *start,
                    stop: *stop,
                    step: 1.0,
                }),
                [start, stop, step] => {
                    // step 為 0 會無限迴圈，負數永遠到不了 stop
                    if *step <= 0.0 {
                        return Err(SweepError::NonPositiveStep {
                            expression: token.to_string(),
                            step: *step,
                        });
                    }
                    Ok(ValueExpression::Range {
                        start: *start,
                        stop: *stop,
                        step: *step,
                    })
                }
                _ => Err(SweepError::InvalidExpression {
                    expression: token.to_string(),
                    reason: format!("expected 2 or 3 numbers, found {}", parts.len()),
                }),
            };
        }

        Ok(ValueExpression::Literal(token.to_string()))
    }

    pub fn expand(&self, settings: &ExpansionSettings) -> Result<ValueDomain> {
        match self {
            ValueExpression::Literal(value) => Ok(vec![value.clone()]),
            ValueExpression::Set(values) => Ok(values.clone()),
            ValueExpression::Range { start, stop, step } => {
                let numbers = inclusive_range(*start, *stop, *step, settings).ok_or_else(|| {
                    SweepError::RangeTooLarge {
                        expression: self.to_string(),
                        limit: settings.max_values,
                    }
                })?;
                if numbers.is_empty() {
                    return Err(SweepError::InvalidExpression {
                        expression: self.to_string(),
                        reason: "range is empty (start is greater than stop)".to_string(),
                    });
                }
                Ok(numbers
                    .into_iter()
                    .map(|n| render_number(n, settings.tolerance))
                    .collect())
            }
        }
    }
}

impl std::fmt::Display for ValueExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExpression::Literal(value) => write!(f, "{}", value),
            ValueExpression::Set(values) => write!(f, "set:{}", values.join(",")),
            ValueExpression::Range { start, stop, step } => {
                write!(f, "range:{},{},{}", start, stop, step)
            }
        }
    }
}

/// Parse and expand a single token.
pub fn expand(token: &str, settings: &ExpansionSettings) -> Result<ValueDomain> {
    ValueExpression::parse(token)?.expand(settings)
}

fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let head = token.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&token[prefix.len()..])
    } else {
        None
    }
}

fn parse_bound(expression: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(SweepError::InvalidRangeBound {
            expression: expression.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Returns `None` when the range would exceed `settings.max_values`.
fn inclusive_range(start: f64, stop: f64, step: f64, settings: &ExpansionSettings) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    let mut current = start;
    while current < stop {
        if values.len() >= settings.max_values {
            return None;
        }
        values.push(current);
        current += step;
    }
    if (current - stop).abs() < settings.tolerance {
        if values.len() >= settings.max_values {
            return None;
        }
        values.push(current);
    }
    Some(values)
}

/// Integers print without a fractional part; other values keep 12 significant
/// digits so accumulated step error does not leak into the rendered value.
pub fn render_number(value: f64, tolerance: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < tolerance {
        // 負零印成 "0"
        if rounded == 0.0 {
            return "0".to_string();
        }
        return format!("{:.0}", rounded);
    }

    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (11 - magnitude).clamp(0, 17) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
