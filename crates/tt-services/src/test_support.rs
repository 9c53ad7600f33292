//! Shared fixture for service tests

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveTime};
use tt_core::traits::Id;
use tt_db::{CreateEmployeeDto, CreateUserDto, Stores};
use tt_models::{Client, ClientForm, EmployeeProfile, Project, ProjectForm, ProjectStatus, Role};

use crate::context::Caller;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Monthly report sheet read back from `.xlsx` bytes
pub(crate) struct ReportCells(Range<Data>);

pub(crate) fn read_report(bytes: Vec<u8>) -> ReportCells {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    ReportCells(workbook.worksheet_range(crate::export::SHEET_NAME).unwrap())
}

impl ReportCells {
    /// Cell text at a 1-based position, numbers as `f64` display
    pub fn value_at(&self, row: u32, col: u32) -> Option<String> {
        match self.0.get_value((row - 1, col - 1))? {
            Data::Empty => None,
            Data::String(s) => Some(s.clone()),
            Data::Float(f) => Some(f.to_string()),
            Data::Int(i) => Some(i.to_string()),
            other => Some(format!("{:?}", other)),
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.0.used_cells().any(|(_, _, cell)| matches!(cell, Data::String(s) if s == text))
    }

    pub fn last_row(&self) -> u32 {
        self.0.end().map(|(row, _)| row + 1).unwrap_or(0)
    }
}

pub(crate) struct Fixture {
    pub stores: Stores,
    /// A Friday
    pub today: NaiveDate,
    pub admin: Caller,
    pub manager: Caller,
    pub employee: Caller,
    pub client: Client,
    /// Budget 100h, employee assigned
    pub portal: Project,
    /// No budget, employee not assigned
    pub unassigned_project: Project,
}

impl Fixture {
    pub fn employee_id(&self) -> Id {
        self.employee.employee_id.unwrap()
    }

    pub fn manager_id(&self) -> Id {
        self.manager.employee_id.unwrap()
    }
}

fn user_dto(email: &str, first: &str, last: &str, role: Role) -> CreateUserDto {
    CreateUserDto {
        email: email.to_string(),
        password_hash: "!".to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
    }
}

fn caller_for(profile: &EmployeeProfile) -> Caller {
    Caller {
        user_id: profile.user_id,
        email: profile.email.clone(),
        display_name: profile.full_name(),
        role: profile.role,
        employee_id: Some(profile.id),
    }
}

pub(crate) async fn fixture() -> Fixture {
    let stores = Stores::memory();
    let today = date(2025, 3, 14);

    let admin = stores
        .users
        .create(user_dto("admin@test.com", "Admin", "System", Role::Admin))
        .await
        .unwrap();

    let manager = stores
        .employees
        .create_with_user(
            user_dto("manager@test.com", "Jan", "Kierownik", Role::Manager),
            CreateEmployeeDto {
                position: "Project Manager".into(),
                department: "Management".into(),
                hire_date: date(2023, 1, 2),
            },
        )
        .await
        .unwrap();

    let employee = stores
        .employees
        .create_with_user(
            user_dto("employee@test.com", "Piotr", "Pracownik", Role::Employee),
            CreateEmployeeDto {
                position: "Developer".into(),
                department: "IT".into(),
                hire_date: date(2024, 1, 2),
            },
        )
        .await
        .unwrap();

    let client = stores
        .clients
        .create(&ClientForm::new("ABC Corporation").with_city("Warszawa"))
        .await
        .unwrap();

    let portal = stores
        .projects
        .create(
            &ProjectForm::new("Portal E-commerce", manager.id, client.id, date(2025, 1, 1))
                .with_status(ProjectStatus::Active)
                .with_budget(100.0)
                .with_employees(vec![employee.id]),
        )
        .await
        .unwrap();

    let unassigned_project = stores
        .projects
        .create(&ProjectForm::new("Modernizacja IT", manager.id, client.id, date(2025, 2, 1)))
        .await
        .unwrap();

    Fixture {
        admin: Caller {
            user_id: admin.id,
            email: admin.email.clone(),
            display_name: admin.full_name(),
            role: Role::Admin,
            employee_id: None,
        },
        manager: caller_for(&manager),
        employee: caller_for(&employee),
        stores,
        today,
        client,
        portal,
        unassigned_project,
    }
}
