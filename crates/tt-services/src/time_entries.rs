//! Time entry service
//!
//! Create, update and delete go through the same pipeline: resolve the
//! actor, check ownership, check the project assignment for Employee actors,
//! run the contract, then reject overlaps with the owner's other entries on
//! that day.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use tt_contracts::time_entries::{TimeEntryContract, TimeEntryData};
use tt_contracts::{Actor, Contract};
use tt_core::error::{TtError, ValidationErrors};
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::{NewTimeEntry, TimeEntry, TimeEntryFilter};

use crate::context::{require_employee, Caller};

/// Partial edit of an entry
///
/// Omitted date and times keep their stored values. `project_id` and
/// `description` always replace the stored values, so `null` clears them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntryUpdate {
    pub entry_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub project_id: Option<Id>,
    pub description: Option<String>,
}

impl TimeEntryUpdate {
    fn touches_schedule(&self) -> bool {
        self.entry_date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

/// List parameters for the entries screen
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntryQuery {
    pub employee_id: Option<Id>,
    pub project_id: Option<Id>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub struct TimeEntryService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
    today: NaiveDate,
}

impl<'a> TimeEntryService<'a> {
    pub fn new(stores: &'a Stores, caller: &'a Caller) -> Self {
        Self {
            stores,
            caller,
            today: Utc::now().date_naive(),
        }
    }

    /// Pin "today" for the date window
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Entries visible to the caller, newest date first.
    ///
    /// Employees only ever see their own entries whatever the query says.
    pub async fn list(&self, query: TimeEntryQuery) -> TtResult<Vec<TimeEntry>> {
        let actor = self.caller.actor()?;
        let employee_id = match actor {
            Actor::Employee { employee_id } => Some(employee_id),
            _ => query.employee_id,
        };

        let filter = TimeEntryFilter {
            employee_id,
            project_id: query.project_id,
            from: query.from,
            to: query.to,
            unassigned_only: false,
        };

        let mut entries = self.stores.time_entries.list(&filter).await?;
        entries.sort_by(|a, b| {
            b.entry_date
                .cmp(&a.entry_date)
                .then(a.start_time.cmp(&b.start_time))
        });
        Ok(entries)
    }

    pub async fn get(&self, id: Id) -> TtResult<TimeEntry> {
        let actor = self.caller.actor()?;
        let entry = self.find(id).await?;
        actor.authorize_record(&entry)?;
        Ok(entry)
    }

    pub async fn create(&self, mut params: NewTimeEntry) -> TtResult<TimeEntry> {
        let actor = self.caller.actor()?;
        require_employee(self.stores, params.employee_id).await?;
        actor.authorize_owner(params.employee_id)?;

        if let Some(project_id) = params.project_id {
            check_project(self.stores, &actor, params.employee_id, project_id).await?;
        }

        self.contract().validate(&params)?;
        self.check_overlap(params.employee_id, &params, None).await?;

        params.created_by = Some(self.caller.user_id);
        let entry = self.stores.time_entries.create(&params).await?;

        info!(
            entry_id = entry.id,
            employee_id = entry.employee_id,
            hours = entry.total_hours(),
            created_by = self.caller.user_id,
            "Time entry created"
        );
        Ok(entry)
    }

    pub async fn update(&self, id: Id, changes: TimeEntryUpdate) -> TtResult<TimeEntry> {
        let actor = self.caller.actor()?;
        let stored = self.find(id).await?;
        actor.authorize_record(&stored)?;

        if let Some(project_id) = changes.project_id {
            if stored.project_id != Some(project_id) {
                check_project(self.stores, &actor, stored.employee_id, project_id).await?;
            }
        }

        let touches_schedule = changes.touches_schedule();
        let mut entry = stored;
        if let Some(date) = changes.entry_date {
            entry.entry_date = date;
        }
        if let Some(start) = changes.start_time {
            entry.start_time = start;
        }
        if let Some(end) = changes.end_time {
            entry.end_time = end;
        }
        entry.project_id = changes.project_id;
        entry.description = changes.description;

        let contract = self.contract();
        let mut errors = ValidationErrors::new();
        contract.validate_interval(entry.start_time, entry.end_time, &mut errors);
        if touches_schedule {
            contract.validate_date(entry.entry_date, &mut errors);
        }
        contract.validate_description(entry.description.as_deref(), &mut errors);
        errors.into_result()?;

        if touches_schedule {
            self.check_overlap(entry.employee_id, &entry, Some(entry.id)).await?;
        }

        let entry = self.stores.time_entries.update(&entry).await?;
        debug!(entry_id = entry.id, "Time entry updated");
        Ok(entry)
    }

    pub async fn delete(&self, id: Id) -> TtResult<()> {
        let actor = self.caller.actor()?;
        let entry = self.find(id).await?;
        actor.authorize_record(&entry)?;

        self.stores.time_entries.delete(id).await?;
        info!(entry_id = id, employee_id = entry.employee_id, "Time entry deleted");
        Ok(())
    }

    /// Hours logged by an employee on one day
    pub async fn day_total(&self, employee_id: Id, date: NaiveDate) -> TtResult<f64> {
        self.caller.actor()?.authorize_owner(employee_id)?;
        let entries = self.same_day(employee_id, date).await?;
        Ok(entries.iter().map(TimeEntry::total_hours).sum())
    }

    fn contract(&self) -> TimeEntryContract {
        TimeEntryContract::new(self.today)
    }

    async fn find(&self, id: Id) -> TtResult<TimeEntry> {
        self.stores
            .time_entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| TtError::not_found("Time entry", id))
    }

    async fn same_day(&self, employee_id: Id, date: NaiveDate) -> TtResult<Vec<TimeEntry>> {
        let filter = TimeEntryFilter::for_employee(employee_id).between(date, date);
        Ok(self.stores.time_entries.list(&filter).await?)
    }

    async fn check_overlap<T: TimeEntryData>(
        &self,
        employee_id: Id,
        candidate: &T,
        exclude_id: Option<Id>,
    ) -> TtResult<()> {
        let others = self.same_day(employee_id, candidate.entry_date()).await?;
        self.contract()
            .validate_no_overlap(candidate, &others, exclude_id)?;
        Ok(())
    }
}

/// The project must exist; an Employee actor may only use projects the
/// entry's owner is assigned to.
pub(crate) async fn check_project(stores: &Stores, actor: &Actor, owner_id: Id, project_id: Id) -> TtResult<()> {
    if stores.projects.find_by_id(project_id).await?.is_none() {
        return Err(TtError::invalid("project_id", "does not exist"));
    }
    if actor.must_check_assignment() {
        let assigned = stores.employees.is_assigned(owner_id, project_id).await?;
        actor.authorize_project(assigned)?;
    }
    Ok(())
}
