//! # Inline Macros
//!
//! `{{…}}` macros are resolved to literal text when a screenplay snapshot is
//! assembled:
//!
//! - `{{name}}` looks up a variable
//! - `{{name = value}}` defines a variable and prints nothing
//! - `{{serial name}}` prints the next value of a counter (starting at 1)
//! - `{{date}}` prints the current date (`YYYY-MM-DD`)
//!
//! Unknown variables resolve to an empty string.

use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MacroResolver {
    variables: BTreeMap<String, String>,
    serials: BTreeMap<String, usize>,
    date: Option<String>,
}

impl MacroResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables(variables: BTreeMap<String, String>) -> Self {
        Self { variables, ..Self::default() }
    }

    /// Pin the value printed by `{{date}}`
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Resolve every macro in `text`; text without macros is returned as is
    pub fn resolve(&mut self, text: &str) -> String {
        if !text.contains("{{") {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find("{{") {
            let Some(close) = rest[open + 2..].find("}}") else {
                break;
            };
            out.push_str(&rest[..open]);
            let body = rest[open + 2..open + 2 + close].trim();
            out.push_str(&self.evaluate(body));
            rest = &rest[open + 2 + close + 2..];
        }
        out.push_str(rest);
        out
    }

    fn evaluate(&mut self, body: &str) -> String {
        if body.eq_ignore_ascii_case("date") {
            return self
                .date
                .clone()
                .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        }

        if let Some(name) = body.strip_prefix("serial ") {
            let counter = self.serials.entry(name.trim().to_string()).or_insert(0);
            *counter += 1;
            return counter.to_string();
        }

        if let Some((name, value)) = body.split_once('=') {
            let name = name.trim().to_string();
            let value = value.trim().to_string();
            debug!(%name, %value, "Defined macro variable");
            self.variables.insert(name, value);
            return String::new();
        }

        self.variables.get(body).cloned().unwrap_or_default()
    }
}
