//! Classification of inbound driver text messages.
//!
//! Parsing is kept apart from state changes: [`SmsCommand::classify`] turns a
//! free-text body into one of a closed set of commands, and the queue service
//! applies it.

use super::site::SiteCode;
use super::truck::{EtaMinutes, LineType};

/// A driver instruction recognised in an SMS body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsCommand {
    /// `ARRIVED`
    Arrived,
    /// `LOADING` or `UNLOADING`
    Loading,
    /// `DEPARTED`
    Departed,
    /// `CANCEL`, `CANCELED`, or `CANCELLED`
    Cancel,
    /// `ETA <n>` with `n` of one to three digits. Zero is kept so the reply
    /// can ask for a usable value.
    SetEta(u32),
    /// `HELP`
    Help,
    /// Anything else.
    Unknown,
}

impl SmsCommand {
    /// Classify a message body. Case and surrounding whitespace are ignored.
    #[must_use]
    pub fn classify(body: &str) -> Self {
        let upper = body.trim().to_uppercase();
        if let Some(minutes) = parse_eta(&upper) {
            return Self::SetEta(minutes);
        }
        let first = upper
            .split(|c: char| c.is_whitespace() || c == ',')
            .next()
            .unwrap_or_default();
        match first {
            "ARRIVED" => Self::Arrived,
            "LOADING" | "UNLOADING" => Self::Loading,
            "DEPARTED" => Self::Departed,
            "CANCEL" | "CANCELED" | "CANCELLED" => Self::Cancel,
            "HELP" => Self::Help,
            _ => Self::Unknown,
        }
    }
}

/// Match `ETA`, whitespace, then one to three digits ending at a word boundary.
fn parse_eta(upper: &str) -> Option<u32> {
    let rest = upper.strip_prefix("ETA")?;
    let digits_start = rest.trim_start();
    if digits_start.len() == rest.len() {
        return None;
    }
    let digits: String = digits_start
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() || digits.len() > 3 {
        return None;
    }
    let boundary = digits_start.chars().nth(digits.len());
    if boundary.is_some_and(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    digits.parse().ok()
}

/// Context pulled from a message body when a new queue entry is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsHints {
    upper: String,
}

impl SmsHints {
    /// Capture hints from a raw body.
    #[must_use]
    pub fn new(body: &str) -> Self {
        Self {
            upper: body.trim().to_uppercase(),
        }
    }

    /// `DELIVER` when the body mentions delivering or unloading.
    #[must_use]
    pub fn line_type(&self) -> LineType {
        if self.upper.contains("DELIVER") || self.upper.contains("UNLOAD") {
            LineType::Deliver
        } else {
            LineType::Load
        }
    }

    /// Whether the body starts with the site code or names it after a space.
    #[must_use]
    pub fn mentions_site(&self, code: &SiteCode) -> bool {
        let code = code.as_str();
        self.upper.starts_with(code) || self.upper.contains(&format!(" {code}"))
    }
}

/// Reply text for an applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsReply {
    /// Body or sender missing.
    MissingFields,
    /// No site exists to attach the truck to.
    NoSites,
    /// Marked arrived.
    Arrived,
    /// Marked loading; the wording follows the line type.
    Loading(LineType),
    /// Marked departed.
    Departed,
    /// Cancelled, which also marks departed.
    Canceled,
    /// ETA recorded.
    EtaUpdated(EtaMinutes),
    /// ETA present but unusable.
    EtaInvalid,
    /// Command list.
    Help,
    /// Fallback.
    Unknown,
    /// Processing failed.
    Error,
}

impl SmsReply {
    /// Human-readable reply text.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::MissingFields => "Missing from/body".to_owned(),
            Self::NoSites => "No sites configured".to_owned(),
            Self::Arrived => "Thanks \u{2014} marked ARRIVED. Reply LOADING when you start.".to_owned(),
            Self::Loading(line) => {
                let verb = match line {
                    LineType::Deliver => "UNLOADING",
                    LineType::Load => "LOADING",
                };
                format!("Got it \u{2014} marked {verb}. Reply DEPARTED when finished.")
            }
            Self::Departed => "Marked DEPARTED. Thank you.".to_owned(),
            Self::Canceled => "Canceled \u{2014} marked DEPARTED. Thank you.".to_owned(),
            Self::EtaUpdated(eta) => format!(
                "ETA updated: {} min. Reply ARRIVED when you get there.",
                eta.get()
            ),
            Self::EtaInvalid => "Please send ETA as: ETA 25".to_owned(),
            Self::Help => {
                "Commands: ARRIVED, LOADING, DEPARTED, ETA 25, CANCEL. You can also include site code: CIF or CCR."
                    .to_owned()
            }
            Self::Unknown => {
                "Sorry, not sure. Try: ARRIVED, LOADING, DEPARTED, ETA 25, or CANCEL.".to_owned()
            }
            Self::Error => "Error".to_owned(),
        }
    }

    /// Reply wrapped as a TwiML document.
    #[must_use]
    pub fn twiml(&self) -> String {
        format!(
            "<Response><Message>{}</Message></Response>",
            escape_xml(&self.text())
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "sms_command_tests.rs"]
mod tests;
