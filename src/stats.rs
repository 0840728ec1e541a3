//! Per-caller usage counters. Entirely optional: a disabled tracker never
//! creates or touches a record.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::preferences::CallerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageAction {
    Translation,
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStatistics {
    pub translation_count: u64,
    pub command_count: u64,
    pub first_used_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl UsageStatistics {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            translation_count: 0,
            command_count: 0,
            first_used_at: now,
            last_used_at: now,
        }
    }
}

/// Totals across every tracked caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub callers: usize,
    pub translations: u64,
    pub commands: u64,
}

pub struct UsageTracker {
    enabled: bool,
    records: DashMap<CallerId, UsageStatistics>,
}

impl UsageTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            records: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&self, caller: CallerId, action: UsageAction) {
        self.record_at(caller, action, Utc::now());
    }

    pub fn record_at(&self, caller: CallerId, action: UsageAction, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }
        let mut entry = self
            .records
            .entry(caller)
            .or_insert_with(|| UsageStatistics::new(now));
        let stats = entry.value_mut();
        match action {
            UsageAction::Translation => stats.translation_count += 1,
            UsageAction::Command => stats.command_count += 1,
        }
        stats.last_used_at = now;
        debug!(caller, action = ?action, "usage_recorded");
    }

    pub fn get(&self, caller: CallerId) -> Option<UsageStatistics> {
        self.records.get(&caller).map(|r| r.value().clone())
    }

    pub fn summary(&self) -> UsageSummary {
        self.records
            .iter()
            .fold(UsageSummary::default(), |mut acc, entry| {
                acc.callers += 1;
                acc.translations += entry.translation_count;
                acc.commands += entry.command_count;
                acc
            })
    }
}
