//! Aggregated sync reports.

use pontaj_core::{Device, OutcomeKind, SyncOutcome, SyncStep};
use serde::Serialize;

/// Outcome-kind tallies for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub success: usize,
    pub partial: usize,
    pub skipped: usize,
    pub fatal: usize,
}

impl SyncSummary {
    pub fn tally(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Success => self.success += 1,
            OutcomeKind::Partial => self.partial += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Fatal => self.fatal += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.partial + self.skipped + self.fatal
    }

    pub fn merge(&mut self, other: &SyncSummary) {
        self.success += other.success;
        self.partial += other.partial;
        self.skipped += other.skipped;
        self.fatal += other.fatal;
    }
}

/// One device's outcome inside a batch, preserving device identity for
/// diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSyncRecord {
    pub device_id: String,
    pub device_ip: String,
    #[serde(rename = "status")]
    pub kind: OutcomeKind,
    pub message: String,
    pub step: SyncStep,
}

impl DeviceSyncRecord {
    #[must_use]
    pub fn new(device: &Device, outcome: &SyncOutcome) -> Self {
        Self {
            device_id: device.id.clone(),
            device_ip: device.ip_address.clone(),
            kind: outcome.kind,
            message: outcome.message.clone(),
            step: outcome.step,
        }
    }
}

/// Result of running one employee against a device list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceBatchReport {
    pub summary: SyncSummary,
    pub per_device: Vec<DeviceSyncRecord>,
}

impl DeviceBatchReport {
    pub fn record(&mut self, device: &Device, outcome: &SyncOutcome) {
        self.summary.tally(outcome.kind);
        self.per_device.push(DeviceSyncRecord::new(device, outcome));
    }
}

/// Per-employee roll-up inside a fleet sync.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSyncRecord {
    pub angajat_id: String,
    pub name: String,
    pub success: bool,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub devices: DeviceBatchReport,
}

impl EmployeeSyncRecord {
    /// Roll a device batch up into one employee verdict: success when at
    /// least one device took the record (fully or partially) and none
    /// failed fatally; skipped when every device skipped.
    #[must_use]
    pub fn roll_up(angajat_id: String, name: String, devices: DeviceBatchReport) -> Self {
        let summary = devices.summary;
        let success = (summary.success + summary.partial) > 0 && summary.fatal == 0;
        let skipped = summary.total() > 0 && summary.skipped == summary.total();
        let error = if success || skipped {
            None
        } else {
            devices
                .per_device
                .iter()
                .find(|r| r.kind != OutcomeKind::Success)
                .map(|r| r.message.clone())
        };
        Self {
            angajat_id,
            name,
            success,
            skipped,
            error,
            devices,
        }
    }
}

/// Result of a fleet-wide (employees x devices) resync.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FleetSyncReport {
    pub summary: SyncSummary,
    pub employee_results: Vec<EmployeeSyncRecord>,
}
