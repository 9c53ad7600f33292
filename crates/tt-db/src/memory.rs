//! In-memory store
//!
//! Implements every store trait over a single locked state so services and
//! handlers can run without PostgreSQL. Constraint behaviour (unique email,
//! restrict-delete, optimistic locking, marker upsert) matches the
//! PostgreSQL repositories.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use tt_core::traits::Id;
use tt_models::{
    Client, ClientFilter, ClientForm, DayMarker, DayMarkerUpsert, Employee, EmployeeProfile,
    NewTimeEntry, Project, ProjectFilter, ProjectForm, TimeEntry, TimeEntryFilter, UpdateEmployee,
    UpdateUser, User,
};

use crate::clients::{ClientStore, CLIENT_HAS_PROJECTS, STALE_CLIENT};
use crate::day_markers::DayMarkerStore;
use crate::employees::{CreateEmployeeDto, EmployeeStore};
use crate::projects::{ProjectStore, PROJECT_HAS_ENTRIES};
use crate::repository::{RepositoryError, RepositoryResult};
use crate::time_entries::TimeEntryStore;
use crate::users::{CreateUserDto, UserStore, DUPLICATE_EMAIL};

#[derive(Default)]
struct MemoryState {
    next_id: Id,
    users: BTreeMap<Id, User>,
    employees: BTreeMap<Id, Employee>,
    clients: BTreeMap<Id, Client>,
    projects: BTreeMap<Id, Project>,
    /// (employee_id, project_id)
    assignments: BTreeSet<(Id, Id)>,
    entries: BTreeMap<Id, TimeEntry>,
    markers: BTreeMap<(Id, NaiveDate), DayMarker>,
}

impl MemoryState {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str, except: Option<Id>) -> bool {
        let email = email.trim().to_lowercase();
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.to_lowercase() == email)
    }

    fn insert_user(&mut self, dto: CreateUserDto) -> RepositoryResult<User> {
        if self.email_taken(&dto.email, None) {
            return Err(RepositoryError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let user = User {
            id: self.next_id(),
            email: dto.email.trim().to_string(),
            password_hash: dto.password_hash,
            first_name: dto.first_name,
            last_name: dto.last_name,
            role: dto.role,
            is_active: true,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn profile(&self, employee_id: Id) -> Option<EmployeeProfile> {
        let e = self.employees.get(&employee_id)?;
        let u = self.users.get(&e.user_id)?;
        Some(EmployeeProfile {
            id: e.id,
            user_id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            role: u.role,
            position: e.position.clone(),
            department: e.department.clone(),
            hire_date: e.hire_date,
            is_active: e.is_active,
        })
    }

    fn project_from_form(&self, id: Id, form: &ProjectForm, created_at: chrono::DateTime<Utc>) -> Project {
        Project {
            id,
            name: form.name.trim().to_string(),
            description: form.description.clone(),
            status: form.status,
            start_date: form.start_date,
            end_date: form.end_date,
            is_active: form.is_active,
            hours_budget: form.hours_budget,
            manager_id: form.manager_id,
            client_id: form.client_id,
            created_at,
        }
    }

    fn check_project_refs(&self, form: &ProjectForm) -> RepositoryResult<()> {
        if !self.employees.contains_key(&form.manager_id) || !self.clients.contains_key(&form.client_id) {
            return Err(RepositoryError::Conflict("Referenced manager or client does not exist".to_string()));
        }
        if form.employee_ids.iter().any(|id| !self.employees.contains_key(id)) {
            return Err(RepositoryError::Conflict("One of the assigned employees does not exist".to_string()));
        }
        Ok(())
    }

    fn replace_assignments(&mut self, project_id: Id, employee_ids: &[Id]) {
        self.assignments.retain(|(_, p)| *p != project_id);
        for e in employee_ids {
            self.assignments.insert((*e, project_id));
        }
    }
}

/// Thread-safe in-memory implementation of every store trait
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn client_from_form(id: Id, form: &ClientForm) -> Client {
    Client {
        id,
        name: form.name.trim().to_string(),
        description: form.description.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        address: form.address.clone(),
        city: form.city.clone(),
        postal_code: form.postal_code.clone(),
        country: form.country.clone(),
        nip: form.nip.clone(),
        is_active: form.is_active,
        created_at: Utc::now(),
        updated_at: None,
        lock_version: 0,
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn create(&self, dto: CreateUserDto) -> RepositoryResult<User> {
        self.state.write().insert_user(dto)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.state.read().users.len() as i64)
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<EmployeeProfile>> {
        Ok(self.state.read().profile(id))
    }

    async fn find_by_user(&self, user_id: Id) -> RepositoryResult<Option<EmployeeProfile>> {
        let state = self.state.read();
        Ok(state
            .employees
            .values()
            .find(|e| e.user_id == user_id)
            .and_then(|e| state.profile(e.id)))
    }

    async fn list(&self, active_only: bool) -> RepositoryResult<Vec<EmployeeProfile>> {
        let state = self.state.read();
        let mut profiles: Vec<EmployeeProfile> = state
            .employees
            .values()
            .filter(|e| !active_only || e.is_active)
            .filter_map(|e| state.profile(e.id))
            .collect();
        EmployeeProfile::sort_by_name(&mut profiles);
        Ok(profiles)
    }

    async fn create_with_user(
        &self,
        user: CreateUserDto,
        employee: CreateEmployeeDto,
    ) -> RepositoryResult<EmployeeProfile> {
        let mut state = self.state.write();
        let user = state.insert_user(user)?;
        let id = state.next_id();
        state.employees.insert(
            id,
            Employee {
                id,
                user_id: user.id,
                position: employee.position,
                department: employee.department,
                hire_date: employee.hire_date,
                is_active: true,
            },
        );
        state
            .profile(id)
            .ok_or_else(|| RepositoryError::not_found("Employee", id))
    }

    async fn update(
        &self,
        id: Id,
        user: UpdateUser,
        employee: UpdateEmployee,
    ) -> RepositoryResult<EmployeeProfile> {
        let mut state = self.state.write();
        let user_id = state
            .employees
            .get(&id)
            .map(|e| e.user_id)
            .ok_or_else(|| RepositoryError::not_found("Employee", id))?;

        if let Some(email) = &user.email {
            if state.email_taken(email, Some(user_id)) {
                return Err(RepositoryError::Conflict(DUPLICATE_EMAIL.to_string()));
            }
        }

        if let Some(e) = state.employees.get_mut(&id) {
            if let Some(position) = employee.position {
                e.position = position;
            }
            if let Some(department) = employee.department {
                e.department = department;
            }
            if let Some(hire_date) = employee.hire_date {
                e.hire_date = hire_date;
            }
        }
        if let Some(u) = state.users.get_mut(&user_id) {
            if let Some(email) = user.email {
                u.email = email.trim().to_string();
            }
            if let Some(first_name) = user.first_name {
                u.first_name = first_name;
            }
            if let Some(last_name) = user.last_name {
                u.last_name = last_name;
            }
            if let Some(role) = user.role {
                u.role = role;
            }
        }

        state
            .profile(id)
            .ok_or_else(|| RepositoryError::not_found("Employee", id))
    }

    async fn deactivate(&self, id: Id) -> RepositoryResult<()> {
        let mut state = self.state.write();
        let employee = state
            .employees
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Employee", id))?;
        employee.is_active = false;
        let user_id = employee.user_id;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.is_active = false;
        }
        Ok(())
    }

    async fn assigned_projects(&self, employee_id: Id) -> RepositoryResult<Vec<Project>> {
        let state = self.state.read();
        let mut projects: Vec<Project> = state
            .assignments
            .iter()
            .filter(|(e, _)| *e == employee_id)
            .filter_map(|(_, p)| state.projects.get(p).cloned())
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn is_assigned(&self, employee_id: Id, project_id: Id) -> RepositoryResult<bool> {
        Ok(self.state.read().assignments.contains(&(employee_id, project_id)))
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Client>> {
        Ok(self.state.read().clients.get(&id).cloned())
    }

    async fn list(&self, filter: &ClientFilter) -> RepositoryResult<Vec<Client>> {
        let needle = filter.name.as_ref().map(|n| n.to_lowercase());
        let mut clients: Vec<Client> = self
            .state
            .read()
            .clients
            .values()
            .filter(|c| needle.as_ref().map_or(true, |n| c.name.to_lowercase().contains(n)))
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(clients)
    }

    async fn create(&self, form: &ClientForm) -> RepositoryResult<Client> {
        let mut state = self.state.write();
        let id = state.next_id();
        let client = client_from_form(id, form);
        state.clients.insert(id, client.clone());
        Ok(client)
    }

    async fn update(&self, id: Id, form: &ClientForm, expected_version: i32) -> RepositoryResult<Client> {
        let mut state = self.state.write();
        let current = state
            .clients
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("Client", id))?;
        if current.lock_version != expected_version {
            return Err(RepositoryError::Conflict(STALE_CLIENT.to_string()));
        }
        let updated = Client {
            created_at: current.created_at,
            updated_at: Some(Utc::now()),
            lock_version: current.lock_version + 1,
            ..client_from_form(id, form)
        };
        state.clients.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let mut state = self.state.write();
        if state.projects.values().any(|p| p.client_id == id) {
            return Err(RepositoryError::Conflict(CLIENT_HAS_PROJECTS.to_string()));
        }
        state
            .clients
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("Client", id))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>> {
        Ok(self.state.read().projects.get(&id).cloned())
    }

    async fn list(&self, filter: &ProjectFilter) -> RepositoryResult<Vec<Project>> {
        let needle = filter.name.as_ref().map(|n| n.to_lowercase());
        let mut projects: Vec<Project> = self
            .state
            .read()
            .projects
            .values()
            .filter(|p| needle.as_ref().map_or(true, |n| p.name.to_lowercase().contains(n)))
            .filter(|p| filter.manager_id.map_or(true, |m| p.manager_id == m))
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| filter.client_id.map_or(true, |c| p.client_id == c))
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn create(&self, form: &ProjectForm) -> RepositoryResult<Project> {
        let mut state = self.state.write();
        state.check_project_refs(form)?;
        let id = state.next_id();
        let project = state.project_from_form(id, form, Utc::now());
        state.projects.insert(id, project.clone());
        state.replace_assignments(id, &form.employee_ids);
        Ok(project)
    }

    async fn update(&self, id: Id, form: &ProjectForm) -> RepositoryResult<Project> {
        let mut state = self.state.write();
        let created_at = state
            .projects
            .get(&id)
            .map(|p| p.created_at)
            .ok_or_else(|| RepositoryError::not_found("Project", id))?;
        state.check_project_refs(form)?;
        let project = state.project_from_form(id, form, created_at);
        state.projects.insert(id, project.clone());
        state.replace_assignments(id, &form.employee_ids);
        Ok(project)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let mut state = self.state.write();
        if state.entries.values().any(|e| e.project_id == Some(id)) {
            return Err(RepositoryError::Conflict(PROJECT_HAS_ENTRIES.to_string()));
        }
        state
            .projects
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("Project", id))?;
        state.assignments.retain(|(_, p)| *p != id);
        Ok(())
    }

    async fn assigned_employee_ids(&self, project_id: Id) -> RepositoryResult<Vec<Id>> {
        Ok(self
            .state
            .read()
            .assignments
            .iter()
            .filter(|(_, p)| *p == project_id)
            .map(|(e, _)| *e)
            .collect())
    }

    async fn count_entries(&self, project_id: Id) -> RepositoryResult<i64> {
        Ok(self
            .state
            .read()
            .entries
            .values()
            .filter(|e| e.project_id == Some(project_id))
            .count() as i64)
    }
}

#[async_trait]
impl TimeEntryStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<TimeEntry>> {
        Ok(self.state.read().entries.get(&id).cloned())
    }

    async fn list(&self, filter: &TimeEntryFilter) -> RepositoryResult<Vec<TimeEntry>> {
        let mut entries: Vec<TimeEntry> = self
            .state
            .read()
            .entries
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            (a.entry_date, a.start_time, a.id).cmp(&(b.entry_date, b.start_time, b.id))
        });
        Ok(entries)
    }

    async fn create(&self, entry: &NewTimeEntry) -> RepositoryResult<TimeEntry> {
        let mut state = self.state.write();
        if !state.employees.contains_key(&entry.employee_id) {
            return Err(RepositoryError::Conflict("Employee does not exist".to_string()));
        }
        let id = state.next_id();
        let stored = TimeEntry {
            id,
            employee_id: entry.employee_id,
            project_id: entry.project_id,
            entry_date: entry.entry_date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            description: entry.description.clone(),
            created_at: Utc::now(),
            created_by: entry.created_by,
        };
        state.entries.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, entry: &TimeEntry) -> RepositoryResult<TimeEntry> {
        let mut state = self.state.write();
        let stored = state
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| RepositoryError::not_found("Time entry", entry.id))?;
        stored.project_id = entry.project_id;
        stored.entry_date = entry.entry_date;
        stored.start_time = entry.start_time;
        stored.end_time = entry.end_time;
        stored.description = entry.description.clone();
        Ok(stored.clone())
    }

    async fn set_project(&self, id: Id, project_id: Option<Id>) -> RepositoryResult<TimeEntry> {
        let mut state = self.state.write();
        let stored = state
            .entries
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Time entry", id))?;
        stored.project_id = project_id;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.state
            .write()
            .entries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("Time entry", id))
    }

    async fn has_unassigned(&self, employee_id: Id) -> RepositoryResult<bool> {
        Ok(self
            .state
            .read()
            .entries
            .values()
            .any(|e| e.employee_id == employee_id && e.project_id.is_none()))
    }
}

#[async_trait]
impl DayMarkerStore for MemoryStore {
    async fn list(&self, employee_id: Id, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<DayMarker>> {
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self
            .state
            .read()
            .markers
            .range((employee_id, from)..=(employee_id, to))
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn find(&self, employee_id: Id, date: NaiveDate) -> RepositoryResult<Option<DayMarker>> {
        Ok(self.state.read().markers.get(&(employee_id, date)).cloned())
    }

    async fn upsert(&self, marker: &DayMarkerUpsert) -> RepositoryResult<DayMarker> {
        let mut state = self.state.write();
        let key = (marker.employee_id, marker.date);
        if let Some(existing) = state.markers.get_mut(&key) {
            existing.marker_type = marker.marker_type;
            existing.note = marker.note.clone();
            return Ok(existing.clone());
        }
        let id = state.next_id();
        let stored = DayMarker {
            id,
            employee_id: marker.employee_id,
            date: marker.date,
            marker_type: marker.marker_type,
            note: marker.note.clone(),
            created_at: Utc::now(),
            created_by: marker.created_by,
        };
        state.markers.insert(key, stored.clone());
        Ok(stored)
    }

    async fn remove(&self, employee_id: Id, date: NaiveDate) -> RepositoryResult<bool> {
        Ok(self.state.write().markers.remove(&(employee_id, date)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_models::{DayMarkerType, Role};

    fn user_dto(email: &str, role: Role) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Jan".to_string(),
            last_name: "Kierownik".to_string(),
            role,
        }
    }

    fn employee_dto() -> CreateEmployeeDto {
        CreateEmployeeDto {
            position: "Project Manager".to_string(),
            department: "Management".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        UserStore::create(&store, user_dto("a@test.com", Role::Admin)).await.unwrap();
        let err = EmployeeStore::create_with_user(&store, user_dto("A@test.com", Role::Employee), employee_dto())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(UserStore::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_clears_both_flags() {
        let store = MemoryStore::new();
        let profile = store
            .create_with_user(user_dto("m@test.com", Role::Manager), employee_dto())
            .await
            .unwrap();
        store.deactivate(profile.id).await.unwrap();

        let user = UserStore::find_by_id(&store, profile.user_id).await.unwrap().unwrap();
        assert!(!user.is_active);
        assert!(EmployeeStore::list(&store, true).await.unwrap().is_empty());
        assert_eq!(EmployeeStore::list(&store, false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_client_lock_version() {
        let store = MemoryStore::new();
        let client = ClientStore::create(&store, &ClientForm::new("ABC Corporation")).await.unwrap();
        assert_eq!(client.lock_version, 0);

        let updated = ClientStore::update(&store, client.id, &ClientForm::new("ABC Corp"), 0)
            .await
            .unwrap();
        assert_eq!(updated.lock_version, 1);
        assert!(updated.updated_at.is_some());

        let stale = ClientStore::update(&store, client.id, &ClientForm::new("Stale"), 0).await;
        assert!(matches!(stale, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_marker_upsert_keeps_one_per_day() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let mut upsert = DayMarkerUpsert {
            employee_id: 1,
            date,
            marker_type: DayMarkerType::Vacation,
            note: None,
            created_by: Some(1),
        };
        let first = store.upsert(&upsert).await.unwrap();
        upsert.marker_type = DayMarkerType::Sick;
        let second = store.upsert(&upsert).await.unwrap();

        assert_eq!(first.id, second.id);
        let all = DayMarkerStore::list(&store, 1, date, date).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].marker_type, DayMarkerType::Sick);

        assert!(store.remove(1, date).await.unwrap());
        assert!(!store.remove(1, date).await.unwrap());
    }
}
