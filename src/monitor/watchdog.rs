use std::collections::VecDeque;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::thread;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Alert, FanSample, MonitorConfig, SensorSource};
use crate::error::AdlResult;

/// Result of checking one adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Fan reading was plausible
    Healthy,
    /// Fan was stalled and resetting fan control cleared it
    Recovered,
    /// Fan is still stalled after the reset
    StillStalled,
    /// Sensors could not be read
    Failed(String),
}

/// One adapter's entry in a [`CheckReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterReport {
    /// Adapter index
    pub adapter: i32,
    /// Last sample taken, absent when sampling failed
    pub sample: Option<FanSample>,
    /// What the check concluded
    pub outcome: Outcome,
}

/// Result of one pass over all adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// When the pass started
    pub timestamp: DateTime<Utc>,
    /// Per-adapter results
    pub adapters: Vec<AdapterReport>,
}

impl CheckReport {
    /// Adapters whose fan stayed stalled
    pub fn stalled(&self) -> Vec<i32> {
        self.adapters
            .iter()
            .filter(|a| a.outcome == Outcome::StillStalled)
            .map(|a| a.adapter)
            .collect()
    }

    /// Whether any adapter needs attention
    pub fn has_stalled(&self) -> bool {
        self.adapters.iter().any(|a| a.outcome == Outcome::StillStalled)
    }
}

/// Periodic fan check with automatic recovery
///
/// Adapters are enumerated on the first successful check and reused after
/// that, so a later enumeration failure cannot end a long run.
pub struct Monitor<S: SensorSource> {
    source: S,
    config: MonitorConfig,
    adapters: Option<Vec<i32>>,
    alert: Option<Box<dyn Alert>>,
    history: VecDeque<CheckReport>,
}

impl<S: SensorSource> Monitor<S> {
    /// Create a monitor over a sensor source
    pub fn new(source: S, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            adapters: None,
            alert: None,
            history: VecDeque::new(),
        }
    }

    /// Raise `alert` for every fan still stalled after a reset
    pub fn with_alert(mut self, alert: impl Alert + 'static) -> Self {
        self.alert = Some(Box::new(alert));
        self
    }

    /// The sensor source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reports collected so far, oldest first
    pub fn history(&self) -> &VecDeque<CheckReport> {
        &self.history
    }

    /// Adapters being watched, once enumerated
    pub fn adapters(&self) -> Option<&[i32]> {
        self.adapters.as_deref()
    }

    /// Sample every adapter once, recovering stalled fans
    ///
    /// Only the first enumeration can fail; an empty result is retried on
    /// the next check.
    pub fn check_once(&mut self) -> AdlResult<CheckReport> {
        let timestamp = Utc::now();
        let indexes = match &self.adapters {
            Some(indexes) => indexes.clone(),
            None => {
                let indexes = self.source.adapters()?;
                if !indexes.is_empty() {
                    log::info!("Watching adapter(s) {:?}", indexes);
                    self.adapters = Some(indexes.clone());
                }
                indexes
            }
        };
        let adapters: Vec<AdapterReport> = indexes
            .into_iter()
            .map(|adapter| self.check_adapter(adapter))
            .collect();
        self.raise_alerts(&adapters);
        let report = CheckReport { timestamp, adapters };

        let limit = self.config.history_limit.max(1);
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(report.clone());
        Ok(report)
    }

    fn raise_alerts(&self, adapters: &[AdapterReport]) {
        let Some(alert) = &self.alert else { return };
        let stalled = adapters
            .iter()
            .filter(|a| a.outcome == Outcome::StillStalled)
            .filter_map(|a| a.sample.as_ref());
        for sample in stalled {
            if let Err(err) = alert.raise(sample) {
                log::warn!("Alert for adapter {} failed: {}", sample.adapter, err);
            }
        }
    }

    fn check_adapter(&self, adapter: i32) -> AdapterReport {
        let stall_rpm = self.config.stall_rpm;
        let sample = match self.source.sample(adapter) {
            Ok(sample) => sample,
            Err(err) => return failed(adapter, None, err.to_string()),
        };
        log::info!("Adapter {}: {}", adapter, sample);
        if !sample.is_stalled(stall_rpm) {
            return AdapterReport {
                adapter,
                sample: Some(sample),
                outcome: Outcome::Healthy,
            };
        }

        log::warn!("Adapter {} fan reads {} RPM, resetting fan control", adapter, stall_rpm);
        if let Err(err) = self.source.reset_fan(adapter) {
            log::warn!("Fan reset on adapter {} failed: {}", adapter, err);
        }

        match self.source.sample(adapter) {
            Ok(after) if after.is_stalled(stall_rpm) => {
                log::error!("Adapter {} fan still stalled after reset", adapter);
                AdapterReport {
                    adapter,
                    sample: Some(after),
                    outcome: Outcome::StillStalled,
                }
            }
            Ok(after) => {
                log::info!("Adapter {} fan recovered: {}", adapter, after);
                AdapterReport {
                    adapter,
                    sample: Some(after),
                    outcome: Outcome::Recovered,
                }
            }
            Err(err) => failed(adapter, Some(sample), err.to_string()),
        }
    }

    /// Check repeatedly until `stop` returns true or the configured number
    /// of checks is reached, sleeping `interval` in between
    pub fn run<F>(&mut self, mut stop: F) -> AdlResult<()>
    where
        F: FnMut(&CheckReport) -> bool,
    {
        let mut checks: u32 = 0;
        loop {
            let report = self.check_once()?;
            checks += 1;
            let done = self.config.samples.map_or(false, |limit| checks >= limit);
            if stop(&report) || done {
                return Ok(());
            }
            thread::sleep(self.config.interval);
        }
    }

    /// Write the collected reports as JSON
    pub fn export_json(&self, path: impl AsRef<Path>) -> AdlResult<()> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            generated_at: DateTime<Utc>,
            interval_ms: u128,
            stall_rpm: i32,
            reports: &'a VecDeque<CheckReport>,
        }

        let output = JsonOutput {
            generated_at: Utc::now(),
            interval_ms: self.config.interval.as_millis(),
            stall_rpm: self.config.stall_rpm,
            reports: &self.history,
        };
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), &output)?;
        log::info!("Exported {} reports to {}", self.history.len(), path.as_ref().display());
        Ok(())
    }
}

fn failed(adapter: i32, sample: Option<FanSample>, reason: String) -> AdapterReport {
    log::warn!("Unable to get sensors for adapter {}: {}", adapter, reason);
    AdapterReport {
        adapter,
        sample,
        outcome: Outcome::Failed(reason),
    }
}
