//! Alert payloads and the observer capability.

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// A notification about a value that was not allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Alert {
    Integer(i32),
    Text(String),
    Color(Color),
}

impl Alert {
    /// Hand this alert to the matching observer callback.
    pub fn deliver_to<O: AlertObserver + ?Sized>(self, observer: &O) {
        match self {
            Alert::Integer(value) => observer.on_alert_integer(value),
            Alert::Text(value) => observer.on_alert_text(&value),
            Alert::Color(value) => observer.on_alert_color(value),
        }
    }
}

/// Receiver of alerts.
///
/// Callbacks always run on the observer's home context, one at a time, so
/// implementations may use `Cell`/`RefCell` freely.
pub trait AlertObserver {
    fn on_alert_integer(&self, value: i32);

    fn on_alert_text(&self, value: &str);

    fn on_alert_color(&self, value: Color);
}
