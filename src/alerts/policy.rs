//! Pluggable rules deciding which stored values raise alerts.

use crate::color::Color;
use crate::types::Value;
use std::ops::RangeInclusive;

use super::types::Alert;

/// Decides which values deserve an alert.
///
/// Called with the store lock released, both after every successful set and
/// on every watcher sweep. Implementations push zero or more alerts.
pub trait AlertPolicy: Send + Sync {
    fn inspect(&self, key: &str, value: &Value, alerts: &mut Vec<Alert>);
}

/// Policy that never alerts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAlerts;

impl AlertPolicy for NoAlerts {
    fn inspect(&self, _key: &str, _value: &Value, _alerts: &mut Vec<Alert>) {}
}

/// Rule-based policy.
///
/// Every rule is opt-in; an empty rule set behaves like [`NoAlerts`].
#[derive(Clone, Debug, Default)]
pub struct AlertRules {
    allowed_integers: Option<RangeInclusive<i32>>,
    forbidden_text: Vec<String>,
    forbidden_colors: Vec<Color>,
    exempt_keys: Vec<String>,
}

impl AlertRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alert on integers (and integer array elements) outside `range`.
    pub fn allowed_integers(mut self, range: RangeInclusive<i32>) -> Self {
        self.allowed_integers = Some(range);
        self
    }

    /// Alert on text values equal to any of `values`.
    pub fn forbidden_text<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_text.extend(values.into_iter().map(Into::into));
        self
    }

    /// Alert on colors (and color array elements) equal to any of `colors`.
    pub fn forbidden_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.forbidden_colors.extend(colors);
        self
    }

    /// Never inspect the value stored under `key`.
    pub fn exempt_key(mut self, key: impl Into<String>) -> Self {
        self.exempt_keys.push(key.into());
        self
    }

    fn check_integer(&self, value: i32, alerts: &mut Vec<Alert>) {
        if let Some(range) = &self.allowed_integers {
            if !range.contains(&value) {
                alerts.push(Alert::Integer(value));
            }
        }
    }

    fn check_color(&self, color: Color, alerts: &mut Vec<Alert>) {
        if self.forbidden_colors.contains(&color) {
            alerts.push(Alert::Color(color));
        }
    }
}

impl AlertPolicy for AlertRules {
    fn inspect(&self, key: &str, value: &Value, alerts: &mut Vec<Alert>) {
        if self.exempt_keys.iter().any(|k| k == key) {
            return;
        }
        match value {
            Value::Integer(i) => self.check_integer(*i, alerts),
            Value::Text(s) => {
                if self.forbidden_text.iter().any(|f| f == s) {
                    alerts.push(Alert::Text(s.clone()));
                }
            }
            Value::Color(c) => self.check_color(*c, alerts),
            Value::IntegerArray(values) => {
                for i in values {
                    self.check_integer(*i, alerts);
                }
            }
            Value::ColorArray(values) => {
                for c in values {
                    self.check_color(*c, alerts);
                }
            }
        }
    }
}
