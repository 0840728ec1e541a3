//! Per-caller translation preferences.
//! Records are created lazily with defaults and mutated in place. Every write
//! happens under the caller's map entry, so a caller never observes a partial update.

use std::fmt;
use std::str::FromStr;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::catalog;

/// Opaque caller identity supplied by the chat transport.
pub type CallerId = u64;

pub const MIN_TEMPERATURE: f64 = 0.1;
pub const MAX_TEMPERATURE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceRecord {
    pub style_key: String,
    pub target_language_code: String,
    pub temperature: f64,
    pub preserve_formatting: bool,
    pub add_explanatory_notes: bool,
    pub show_original_text: bool,
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        Self {
            style_key: catalog::DEFAULT_STYLE_KEY.to_string(),
            target_language_code: "vi".to_string(),
            temperature: 0.3,
            preserve_formatting: true,
            add_explanatory_notes: false,
            show_original_text: false,
        }
    }
}

impl PreferenceRecord {
    /// Default record targeting `language_code` instead of Vietnamese.
    pub fn with_language(language_code: &str) -> Result<Self, PreferenceError> {
        let language = catalog::get_language(language_code)
            .ok_or_else(|| PreferenceError::UnknownLanguage(language_code.to_string()))?;
        Ok(Self {
            target_language_code: language.code.to_string(),
            ..Self::default()
        })
    }

    pub fn flag(&self, flag: PreferenceFlag) -> bool {
        match flag {
            PreferenceFlag::PreserveFormatting => self.preserve_formatting,
            PreferenceFlag::AddExplanatoryNotes => self.add_explanatory_notes,
            PreferenceFlag::ShowOriginalText => self.show_original_text,
        }
    }

    fn flag_mut(&mut self, flag: PreferenceFlag) -> &mut bool {
        match flag {
            PreferenceFlag::PreserveFormatting => &mut self.preserve_formatting,
            PreferenceFlag::AddExplanatoryNotes => &mut self.add_explanatory_notes,
            PreferenceFlag::ShowOriginalText => &mut self.show_original_text,
        }
    }
}

/// The three boolean switches of a [`PreferenceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceFlag {
    PreserveFormatting,
    AddExplanatoryNotes,
    ShowOriginalText,
}

impl PreferenceFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceFlag::PreserveFormatting => "preserveFormatting",
            PreferenceFlag::AddExplanatoryNotes => "addExplanatoryNotes",
            PreferenceFlag::ShowOriginalText => "showOriginalText",
        }
    }
}

impl FromStr for PreferenceFlag {
    type Err = PreferenceError;

    /// Accepts the record field name in camel or snake case, or the short
    /// button name (`format`, `notes`, `original`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "format" | "preserve_formatting" | "preserveFormatting" => {
                Ok(PreferenceFlag::PreserveFormatting)
            }
            "notes" | "add_explanatory_notes" | "addExplanatoryNotes" => {
                Ok(PreferenceFlag::AddExplanatoryNotes)
            }
            "original" | "show_original_text" | "showOriginalText" => {
                Ok(PreferenceFlag::ShowOriginalText)
            }
            other => Err(PreferenceError::UnknownFlag(other.to_string())),
        }
    }
}

impl fmt::Display for PreferenceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreferenceError {
    #[error("unknown style: {0}")]
    UnknownStyle(String),
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("temperature {0} outside 0.1..=1.0")]
    OutOfRange(f64),
}

/// Storage seam for caller preferences. The in-memory map is the only backend
/// today; a persistent one can slot in without touching the handlers.
pub trait PreferenceStore: Send + Sync {
    /// Current record, creating a default one on first access.
    fn get(&self, caller: CallerId) -> PreferenceRecord;

    fn set_style(&self, caller: CallerId, key: &str) -> Result<(), PreferenceError>;

    fn set_language(&self, caller: CallerId, code: &str) -> Result<(), PreferenceError>;

    /// Store `value` rounded to one decimal. Returns the stored value.
    fn set_temperature(&self, caller: CallerId, value: f64) -> Result<f64, PreferenceError>;

    /// Flip the named flag and return its new value.
    fn toggle(&self, caller: CallerId, flag_name: &str) -> Result<bool, PreferenceError>;

    /// Overwrite the record with defaults and return them.
    fn reset(&self, caller: CallerId) -> PreferenceRecord;
}

/// Process-lifetime preference map. DashMap shard locks serialize writers on
/// the same caller while different callers proceed in parallel.
pub struct InMemoryPreferenceStore {
    records: DashMap<CallerId, PreferenceRecord>,
    defaults: PreferenceRecord,
}

impl InMemoryPreferenceStore {
    pub fn new(defaults: PreferenceRecord) -> Self {
        Self {
            records: DashMap::new(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &PreferenceRecord {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run `f` against the caller's record while holding its entry lock.
    fn with_record<R>(&self, caller: CallerId, f: impl FnOnce(&mut PreferenceRecord) -> R) -> R {
        let mut entry = self
            .records
            .entry(caller)
            .or_insert_with(|| self.defaults.clone());
        f(entry.value_mut())
    }
}

/// Round on the exact decimal value of `value`, ties to even. `0.15` is stored
/// as `0.1` because the double nearest 0.15 lies just below it.
fn round_to_tenth(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

impl Default for InMemoryPreferenceStore {
    fn default() -> Self {
        Self::new(PreferenceRecord::default())
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, caller: CallerId) -> PreferenceRecord {
        self.with_record(caller, |record| record.clone())
    }

    fn set_style(&self, caller: CallerId, key: &str) -> Result<(), PreferenceError> {
        let style =
            catalog::get_style(key).ok_or_else(|| PreferenceError::UnknownStyle(key.to_string()))?;
        self.with_record(caller, |record| record.style_key = style.key.to_string());
        info!(caller, style = style.key, "style_set");
        Ok(())
    }

    fn set_language(&self, caller: CallerId, code: &str) -> Result<(), PreferenceError> {
        let language = catalog::get_language(code)
            .ok_or_else(|| PreferenceError::UnknownLanguage(code.to_string()))?;
        self.with_record(caller, |record| {
            record.target_language_code = language.code.to_string()
        });
        info!(caller, language = language.code, "language_set");
        Ok(())
    }

    fn set_temperature(&self, caller: CallerId, value: f64) -> Result<f64, PreferenceError> {
        // NaN fails the range check as well.
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) {
            return Err(PreferenceError::OutOfRange(value));
        }
        let rounded = round_to_tenth(value);
        self.with_record(caller, |record| record.temperature = rounded);
        info!(caller, temperature = rounded, "temperature_set");
        Ok(rounded)
    }

    fn toggle(&self, caller: CallerId, flag_name: &str) -> Result<bool, PreferenceError> {
        let flag: PreferenceFlag = flag_name.parse()?;
        let value = self.with_record(caller, |record| {
            let slot = record.flag_mut(flag);
            *slot = !*slot;
            *slot
        });
        debug!(caller, flag = %flag, value, "flag_toggled");
        Ok(value)
    }

    fn reset(&self, caller: CallerId) -> PreferenceRecord {
        let defaults = self.defaults.clone();
        self.records.insert(caller, defaults.clone());
        info!(caller, "preferences_reset");
        defaults
    }
}
