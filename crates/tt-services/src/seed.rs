//! Demo data for an empty database
//!
//! Runs only while the users table is empty, so restarting the server never
//! duplicates anything.

use chrono::{Duration, Months, NaiveDate, NaiveTime};
use tracing::info;
use tt_auth::hash_password;
use tt_core::result::TtResult;
use tt_db::{CreateEmployeeDto, CreateUserDto, Stores};
use tt_models::{ClientForm, NewTimeEntry, ProjectForm, ProjectStatus, Role};

struct SeedUser {
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    role: Role,
}

const ADMIN: SeedUser = SeedUser {
    email: "admin@test.com",
    password: "Admin123!",
    first_name: "Admin",
    last_name: "System",
    role: Role::Admin,
};

const MANAGER: SeedUser = SeedUser {
    email: "manager@test.com",
    password: "Manager123!",
    first_name: "Jan",
    last_name: "Kierownik",
    role: Role::Manager,
};

const EMPLOYEE: SeedUser = SeedUser {
    email: "employee@test.com",
    password: "Employee123!",
    first_name: "Piotr",
    last_name: "Pracownik",
    role: Role::Employee,
};

impl SeedUser {
    fn dto(&self) -> TtResult<CreateUserDto> {
        Ok(CreateUserDto {
            email: self.email.to_string(),
            password_hash: hash_password(self.password)?,
            first_name: self.first_name.to_string(),
            last_name: self.last_name.to_string(),
            role: self.role,
        })
    }
}

fn months_before(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(today - Duration::days(30 * months as i64))
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[allow(clippy::too_many_arguments)]
fn client(
    name: &str,
    description: &str,
    email: &str,
    phone: &str,
    address: Option<&str>,
    city: &str,
    postal_code: &str,
    nip: Option<&str>,
) -> ClientForm {
    let mut form = ClientForm::new(name).with_city(city).with_email(email);
    form.description = Some(description.to_string());
    form.phone = Some(phone.to_string());
    form.address = address.map(str::to_string);
    form.postal_code = Some(postal_code.to_string());
    form.country = Some("Polska".to_string());
    form.nip = nip.map(str::to_string);
    form
}

/// Insert the demo accounts, clients, projects and entries.
///
/// Returns `false` without touching anything when users already exist.
pub async fn seed_database(stores: &Stores, today: NaiveDate) -> TtResult<bool> {
    if stores.users.count().await? > 0 {
        info!("Database already contains users, skipping seed");
        return Ok(false);
    }

    stores.users.create(ADMIN.dto()?).await?;
    let manager = stores
        .employees
        .create_with_user(
            MANAGER.dto()?,
            CreateEmployeeDto {
                position: "Project Manager".to_string(),
                department: "Management".to_string(),
                hire_date: months_before(today, 24),
            },
        )
        .await?;
    let employee = stores
        .employees
        .create_with_user(
            EMPLOYEE.dto()?,
            CreateEmployeeDto {
                position: "Developer".to_string(),
                department: "IT".to_string(),
                hire_date: months_before(today, 12),
            },
        )
        .await?;

    let abc = stores
        .clients
        .create(&client(
            "ABC Corporation",
            "Large manufacturing company",
            "contact@abc-corp.com",
            "+48 123 456 789",
            Some("ul. Główna 1"),
            "Warszawa",
            "00-001",
            Some("1234567890"),
        ))
        .await?;
    let techstart = stores
        .clients
        .create(&client(
            "TechStart Sp. z o.o.",
            "Technology startup",
            "hello@techstart.pl",
            "+48 987 654 321",
            Some("ul. Innowacyjna 42"),
            "Kraków",
            "30-001",
            Some("0987654321"),
        ))
        .await?;
    let poznan = stores
        .clients
        .create(&client(
            "Miasto Poznań",
            "City office",
            "it@poznan.pl",
            "+48 61 878 4444",
            None,
            "Poznań",
            "61-001",
            None,
        ))
        .await?;

    let mut portal = ProjectForm::new("Portal E-commerce", manager.id, abc.id, months_before(today, 2))
        .with_status(ProjectStatus::Active)
        .with_budget(160.0)
        .with_employees(vec![employee.id]);
    portal.description = Some("Sales platform build".to_string());
    let portal = stores.projects.create(&portal).await?;

    let mut crm = ProjectForm::new("System CRM", manager.id, techstart.id, months_before(today, 3))
        .with_status(ProjectStatus::Active)
        .with_budget(240.0)
        .with_employees(vec![employee.id]);
    crm.description = Some("Customer relationship management".to_string());
    stores.projects.create(&crm).await?;

    let mut modernization = ProjectForm::new("Modernizacja IT", manager.id, poznan.id, months_before(today, 1))
        .with_status(ProjectStatus::Planning)
        .with_budget(80.0);
    modernization.description = Some("Infrastructure upgrade".to_string());
    stores.projects.create(&modernization).await?;

    stores
        .time_entries
        .create(&NewTimeEntry {
            employee_id: employee.id,
            project_id: Some(portal.id),
            entry_date: today,
            start_time: at(9, 0),
            end_time: at(17, 0),
            description: Some("Main view implementation".to_string()),
            created_by: Some(employee.user_id),
        })
        .await?;
    stores
        .time_entries
        .create(&NewTimeEntry {
            employee_id: manager.id,
            project_id: Some(portal.id),
            entry_date: today - Duration::days(1),
            start_time: at(8, 30),
            end_time: at(17, 30),
            description: Some("Team meeting".to_string()),
            created_by: Some(manager.user_id),
        })
        .await?;

    info!(users = 3, employees = 2, clients = 3, projects = 3, time_entries = 2, "Seed data created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::date;
    use tt_auth::verify_password;
    use tt_models::{ClientFilter, ProjectFilter, TimeEntryFilter};

    #[tokio::test]
    async fn test_seed_creates_demo_data_once() {
        let stores = Stores::memory();
        let today = date(2025, 3, 14);

        assert!(seed_database(&stores, today).await.unwrap());
        assert!(!seed_database(&stores, today).await.unwrap());

        assert_eq!(stores.users.count().await.unwrap(), 3);
        let admin = stores.users.find_by_email("admin@test.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("Admin123!", &admin.password_hash));
        assert!(stores.employees.find_by_user(admin.id).await.unwrap().is_none());

        let employees = stores.employees.list(true).await.unwrap();
        assert_eq!(employees.len(), 2);
        let piotr = employees.iter().find(|e| e.first_name == "Piotr").unwrap();
        assert_eq!(piotr.hire_date, date(2024, 3, 14));
        assert_eq!(stores.employees.assigned_projects(piotr.id).await.unwrap().len(), 2);

        assert_eq!(stores.clients.list(&ClientFilter::default()).await.unwrap().len(), 3);
        let projects = stores.projects.list(&ProjectFilter::default()).await.unwrap();
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Modernizacja IT", "Portal E-commerce", "System CRM"]);
        assert_eq!(projects[1].start_date, date(2025, 1, 14));

        let entries = stores.time_entries.list(&TimeEntryFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry_date, date(2025, 3, 13));
        assert_eq!(entries[0].total_hours(), 9.0);
        assert_eq!(entries[1].total_hours(), 8.0);
    }
}
