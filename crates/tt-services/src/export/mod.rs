//! Monthly spreadsheet export
//!
//! An employee's month can only be exported once every one of their entries
//! has a project. The gate looks at all entries, not only the exported month.

mod monthly_sheet;

pub use monthly_sheet::{build_monthly_workbook, MonthlySheetData, SHEET_NAME};

use tracing::{info, warn};
use tt_core::dates::{month_label, month_range};
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::TimeEntryFilter;

use crate::context::{project_names, require_employee, Caller};
use crate::day_markers::month_markers;

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const UNASSIGNED_EXPORT_MESSAGE: &str = "Export is blocked because some time entries have no project. \
     Assign a project to every entry under \"Unassigned entries\" and try again.";

/// A generated file ready to be sent as a download
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ExportService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
}

impl<'a> ExportService<'a> {
    pub fn new(stores: &'a Stores, caller: &'a Caller) -> Self {
        Self { stores, caller }
    }

    /// Fail with `Conflict` while the employee has any unassigned entry
    pub async fn ensure_exportable(&self, employee_id: Id) -> TtResult<()> {
        if self.stores.time_entries.has_unassigned(employee_id).await? {
            warn!(employee_id, "Export refused, unassigned entries remain");
            return Err(TtError::conflict(UNASSIGNED_EXPORT_MESSAGE));
        }
        Ok(())
    }

    /// Build the monthly work report workbook for one employee
    pub async fn monthly_workbook(&self, employee_id: Id, year: i32, month: u32) -> TtResult<ExportFile> {
        let actor = self.caller.actor()?;
        let employee = require_employee(self.stores, employee_id).await?;
        actor.authorize_owner(employee.id)?;
        self.ensure_exportable(employee.id).await?;

        let (from, to) = month_range(year, month)?;
        let entries = self
            .stores
            .time_entries
            .list(&TimeEntryFilter::for_employee(employee.id).between(from, to))
            .await?;
        let days = month_markers(self.stores, employee.id, year, month).await?;
        let names = project_names(self.stores).await?;
        let employee_name = employee.full_name();

        let bytes = build_monthly_workbook(&MonthlySheetData {
            employee_name: &employee_name,
            year,
            month,
            days: &days,
            entries: &entries,
            project_names: &names,
        })?;

        info!(
            employee_id = employee.id,
            year,
            month,
            entries = entries.len(),
            size = bytes.len(),
            "Monthly report exported"
        );

        Ok(ExportFile {
            file_name: format!(
                "{}-{}-{}.xlsx",
                employee.first_name,
                employee.last_name,
                month_label(year, month)
            ),
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, fixture, read_report, time};
    use tt_models::NewTimeEntry;

    async fn log(fx: &crate::test_support::Fixture, project_id: Option<Id>, day: u32) -> Id {
        fx.stores
            .time_entries
            .create(&NewTimeEntry {
                employee_id: fx.employee_id(),
                project_id,
                entry_date: date(2025, 3, day),
                start_time: time(9, 0),
                end_time: time(17, 0),
                description: Some("Main view implementation".into()),
                created_by: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_export_gated_by_unassigned_entries() {
        let fx = fixture().await;
        log(&fx, Some(fx.portal.id), 3).await;
        // An unassigned entry in another month still blocks
        fx.stores
            .time_entries
            .create(&NewTimeEntry {
                employee_id: fx.employee_id(),
                project_id: None,
                entry_date: date(2025, 2, 3),
                start_time: time(9, 0),
                end_time: time(10, 0),
                description: None,
                created_by: None,
            })
            .await
            .unwrap();

        let service = ExportService::new(&fx.stores, &fx.employee);
        let err = service
            .monthly_workbook(fx.employee_id(), 2025, 3)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.user_message(), UNASSIGNED_EXPORT_MESSAGE);

        let stray = fx
            .stores
            .time_entries
            .list(&TimeEntryFilter::for_employee(fx.employee_id()).unassigned())
            .await
            .unwrap();
        for entry in stray {
            fx.stores
                .time_entries
                .set_project(entry.id, Some(fx.portal.id))
                .await
                .unwrap();
        }

        let file = service.monthly_workbook(fx.employee_id(), 2025, 3).await.unwrap();
        assert_eq!(file.file_name, "Piotr-Pracownik-March 2025.xlsx");
        assert_eq!(file.content_type, XLSX_CONTENT_TYPE);

        let sheet = read_report(file.bytes);
        assert!(sheet.contains("Main view implementation"));
        assert_eq!(
            sheet.value_at(2, 4).as_deref(),
            Some("MONTHLY WORK REPORT - March 2025")
        );
    }

    #[tokio::test]
    async fn test_employee_cannot_export_others() {
        let fx = fixture().await;
        let service = ExportService::new(&fx.stores, &fx.employee);
        let err = service
            .monthly_workbook(fx.manager_id(), 2025, 3)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let manager = ExportService::new(&fx.stores, &fx.manager);
        assert!(manager.monthly_workbook(fx.employee_id(), 2025, 3).await.is_ok());
        assert_eq!(
            manager.monthly_workbook(999, 2025, 3).await.unwrap_err().status_code(),
            404
        );
    }
}
