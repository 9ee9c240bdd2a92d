//! Bulk sync driver.
//!
//! Fans one of the orchestrator flows out across a device list, strictly
//! serially: the terminals run small embedded HTTP servers and are
//! rate-limited, so calls are paced with a fixed delay instead of being
//! issued concurrently. A Fatal outcome for one device only ends that
//! device's processing; the loop always continues and tallies it.

use pontaj_core::{Device, Employee, SyncOutcome};
use pontaj_isapi::{DeviceOps, PhotoConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::orchestrator;
use crate::report::{DeviceBatchReport, EmployeeSyncRecord, FleetSyncReport};

/// Pacing between consecutive device calls.
#[derive(Debug, Clone, Copy)]
pub struct SyncPacing {
    pub inter_call_delay: Duration,
}

impl Default for SyncPacing {
    fn default() -> Self {
        Self {
            inter_call_delay: Duration::from_secs(1),
        }
    }
}

impl SyncPacing {
    #[must_use]
    pub fn new(inter_call_delay: Duration) -> Self {
        Self { inter_call_delay }
    }
}

/// Which flow a bulk run executes per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkOp {
    FullSync,
    PhotoOnly,
    PhotoUpdate,
    Delete,
}

/// Serial bulk executor over a device fleet.
pub struct BulkSyncDriver<C: DeviceOps + ?Sized> {
    client: Arc<C>,
    pacing: SyncPacing,
    photo: PhotoConfig,
}

impl<C: DeviceOps + ?Sized> BulkSyncDriver<C> {
    pub fn new(client: Arc<C>, pacing: SyncPacing, photo: PhotoConfig) -> Self {
        Self {
            client,
            pacing,
            photo,
        }
    }

    async fn run_one(&self, op: BulkOp, employee: &Employee, device: &Device) -> SyncOutcome {
        match op {
            BulkOp::FullSync => {
                orchestrator::sync_employee_to_device(&*self.client, employee, device, &self.photo)
                    .await
            }
            BulkOp::PhotoOnly => {
                orchestrator::sync_photo_to_device(&*self.client, employee, device, &self.photo)
                    .await
            }
            BulkOp::PhotoUpdate => {
                orchestrator::update_photo_on_device(&*self.client, employee, device, &self.photo)
                    .await
            }
            BulkOp::Delete => {
                orchestrator::delete_employee_from_device(&*self.client, employee, device).await
            }
        }
    }

    async fn run_batch(
        &self,
        op: BulkOp,
        employee: &Employee,
        devices: &[Device],
    ) -> DeviceBatchReport {
        let mut report = DeviceBatchReport::default();
        for (index, device) in devices.iter().enumerate() {
            if index > 0 {
                sleep(self.pacing.inter_call_delay).await;
            }
            let outcome = self.run_one(op, employee, device).await;
            report.record(device, &outcome);
        }
        info!(
            employee = %employee.id,
            devices = devices.len(),
            success = report.summary.success,
            partial = report.summary.partial,
            skipped = report.summary.skipped,
            fatal = report.summary.fatal,
            "bulk batch finished"
        );
        report
    }

    /// Full sync of one employee to every device.
    pub async fn sync_employee(&self, employee: &Employee, devices: &[Device]) -> DeviceBatchReport {
        self.run_batch(BulkOp::FullSync, employee, devices).await
    }

    /// Photo-only sync of one employee to every device.
    pub async fn sync_photo(&self, employee: &Employee, devices: &[Device]) -> DeviceBatchReport {
        self.run_batch(BulkOp::PhotoOnly, employee, devices).await
    }

    /// Photo update (with create fallback) of one employee on every device.
    pub async fn update_photo(&self, employee: &Employee, devices: &[Device]) -> DeviceBatchReport {
        self.run_batch(BulkOp::PhotoUpdate, employee, devices).await
    }

    /// Delete one employee from every device.
    pub async fn delete_employee(
        &self,
        employee: &Employee,
        devices: &[Device],
    ) -> DeviceBatchReport {
        self.run_batch(BulkOp::Delete, employee, devices).await
    }

    /// Full resync of the employee x device cross-product, with a
    /// per-employee roll-up on top of the per-device records.
    pub async fn sync_fleet(&self, employees: &[Employee], devices: &[Device]) -> FleetSyncReport {
        let mut report = FleetSyncReport::default();
        for (index, employee) in employees.iter().enumerate() {
            if index > 0 {
                sleep(self.pacing.inter_call_delay).await;
            }
            let batch = self.run_batch(BulkOp::FullSync, employee, devices).await;
            report.summary.merge(&batch.summary);
            report.employee_results.push(EmployeeSyncRecord::roll_up(
                employee.id.clone(),
                employee.display_name(),
                batch,
            ));
        }
        report
    }
}
