//! Sync orchestration for the pontaj bridge.
//!
//! [`orchestrator`] sequences the multi-step flows for one
//! (employee, device) pair; [`driver`] fans those flows out across a device
//! fleet, pacing calls and aggregating outcomes into reports.

pub mod driver;
pub mod orchestrator;
pub mod report;

pub use driver::{BulkSyncDriver, SyncPacing};
pub use report::{
    DeviceBatchReport, DeviceSyncRecord, EmployeeSyncRecord, FleetSyncReport, SyncSummary,
};
