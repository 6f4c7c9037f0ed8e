//! # Stylesheet Parsing
//!
//! ```text
//! /* Comments are ignored */
//! heading, transition {
//!     margin-top: 1l;
//!     bold: userSetting(headingStyleBold)
//! }
//! ```
//!
//! Parsing never fails. Malformed rules and declarations are reported with
//! `tracing::warn!` and skipped.

use crate::error::ValueError;
use crate::property::StyleProperty;
use crate::settings::SettingsProvider;
use tracing::{debug, warn};

/// One `selectors { declarations }` block
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selectors: Vec<String>,
    pub declarations: Vec<StyleProperty>,
}

/// Parse stylesheet source into rules, in declaration order
pub fn parse_stylesheet(source: &str, settings: &dyn SettingsProvider) -> Vec<StyleRule> {
    let source = strip_comments(source);
    let mut rules = Vec::new();
    let mut rest = source.as_str();

    while let Some(open) = rest.find('{') {
        let selectors: Vec<String> = rest[..open]
            .split(',')
            .map(|selector| selector.trim().to_string())
            .filter(|selector| !selector.is_empty())
            .collect();

        let after = &rest[open + 1..];
        let (body, next) = match after.find('}') {
            Some(close) => (&after[..close], &after[close + 1..]),
            None => {
                warn!(selectors = ?selectors, "Unterminated style block");
                (after, "")
            }
        };
        rest = next;

        if selectors.is_empty() {
            warn!("Style block without a selector");
            continue;
        }

        let declarations = parse_declarations(body, settings);
        debug!(selectors = ?selectors, count = declarations.len(), "Parsed style rule");
        rules.push(StyleRule { selectors, declarations });
    }

    if !rest.trim().is_empty() {
        warn!(trailing = rest.trim(), "Ignoring text outside of style blocks");
    }

    rules
}

fn parse_declarations(body: &str, settings: &dyn SettingsProvider) -> Vec<StyleProperty> {
    let mut declarations = Vec::new();

    for declaration in body.split([';', '\n']) {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((name, value)) = declaration.split_once(':') else {
            warn!(declaration, "Declaration without a value");
            continue;
        };
        let name = name.trim().to_lowercase();

        let decoded = substitute_macros(value.trim(), settings)
            .and_then(|value| StyleProperty::decode(&name, &value));
        match decoded {
            Ok(property) => declarations.push(property),
            Err(error) => warn!(property = %name, %error, "Skipping style declaration"),
        }
    }

    declarations
}

/// Remove `/* */` comments with a two-character lookback
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_comment = false;
    let mut previous: Option<char> = None;

    for c in source.chars() {
        if in_comment {
            if previous == Some('*') && c == '/' {
                in_comment = false;
                previous = None;
            } else {
                previous = Some(c);
            }
            continue;
        }

        if previous == Some('/') && c == '*' {
            in_comment = true;
            previous = None;
            continue;
        }
        if let Some(held) = previous.take() {
            out.push(held);
        }
        previous = Some(c);
    }

    if !in_comment {
        if let Some(held) = previous {
            out.push(held);
        }
    }
    out
}

/// Replace `setting(key)` and `userSetting(key)` with their values
fn substitute_macros(value: &str, settings: &dyn SettingsProvider) -> Result<String, ValueError> {
    const MACROS: [&str; 2] = ["userSetting(", "setting("];

    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    loop {
        let next = MACROS
            .iter()
            .filter_map(|name| rest.find(name).map(|at| (at, *name)))
            .min_by_key(|(at, _)| *at);
        let Some((at, name)) = next else {
            break;
        };

        let args = &rest[at + name.len()..];
        let Some(close) = args.find(')') else {
            return Err(ValueError::expression(value, "unterminated macro"));
        };
        let key = args[..close].trim().trim_matches(|c| c == '"' || c == '\'');

        let resolved = if name == "userSetting(" {
            settings.user_setting(key)
        } else {
            settings.setting(key)
        }
        .ok_or_else(|| ValueError::MissingSetting { key: key.to_string() })?;

        out.push_str(&rest[..at]);
        out.push_str(&resolved.to_string());
        rest = &args[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
