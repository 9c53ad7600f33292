//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{account, calendar, clients, employees, projects, reports, time_entries};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/account", account_router())
        .nest("/clients", clients_router())
        .nest("/projects", projects_router())
        .nest("/employees", employees_router())
        .nest("/time-entries", time_entries_router())
        .nest("/calendar", calendar_router())
        .nest("/reports", reports_router())
}

fn account_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(account::login))
        .route("/logout", post(account::logout))
        .route("/register", post(account::register))
        .route("/me", get(account::me))
}

fn clients_router() -> Router<AppState> {
    Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route(
            "/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route("/:id/report", get(clients::client_report))
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route(
            "/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/:id/report", get(projects::project_report))
}

fn employees_router() -> Router<AppState> {
    Router::new()
        .route("/", get(employees::list_employees).post(employees::create_employee))
        .route("/:id", get(employees::get_employee).put(employees::update_employee))
        .route("/:id/deactivate", post(employees::deactivate_employee))
}

fn time_entries_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(time_entries::list_time_entries).post(time_entries::create_time_entry),
        )
        .route(
            "/:id",
            get(time_entries::get_time_entry)
                .put(time_entries::update_time_entry)
                .delete(time_entries::delete_time_entry),
        )
}

fn calendar_router() -> Router<AppState> {
    Router::new()
        .route("/", get(calendar::week))
        .route("/entries/add", post(calendar::add_entry))
        .route("/entries/update", post(calendar::update_entry))
        .route("/entries/delete", post(calendar::delete_entry))
        .route("/markers/set", post(calendar::set_marker))
        .route("/markers/remove", post(calendar::remove_marker))
}

fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(reports::summary))
        .route("/monthly", get(reports::monthly))
        .route("/monthly/export", get(reports::monthly_export))
        .route("/unassigned", get(reports::my_unassigned))
        .route("/unassigned/all", get(reports::all_unassigned))
        .route("/unassigned/assign", post(reports::assign_project))
}
