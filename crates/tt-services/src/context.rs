//! The caller of a service operation

use std::collections::HashMap;

use serde::Serialize;
use tt_auth::SessionIdentity;
use tt_contracts::Actor;
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::{EmployeeProfile, Role};

/// The authenticated user a service acts for
///
/// Built fresh from the store on every request so that a deactivated account
/// or a role change takes effect immediately.
#[derive(Debug, Clone, Serialize)]
pub struct Caller {
    pub user_id: Id,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub employee_id: Option<Id>,
}

impl Caller {
    /// Load the caller behind a session
    pub async fn load(stores: &Stores, identity: &SessionIdentity) -> TtResult<Self> {
        let user = stores
            .users
            .find_by_id(identity.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| TtError::unauthorized("Your account is no longer active"))?;

        let employee = stores.employees.find_by_user(user.id).await?;

        Ok(Self {
            user_id: user.id,
            display_name: user.full_name(),
            email: user.email,
            role: user.role,
            employee_id: employee.map(|e| e.id),
        })
    }

    /// The authorization view of this caller
    pub fn actor(&self) -> TtResult<Actor> {
        Actor::resolve(self.role, self.employee_id)
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// Load an employee profile or fail with `NotFound`
pub(crate) async fn require_employee(stores: &Stores, employee_id: Id) -> TtResult<EmployeeProfile> {
    stores
        .employees
        .find_by_id(employee_id)
        .await?
        .ok_or_else(|| TtError::not_found("Employee", employee_id))
}

/// Pick whose data a screen shows.
///
/// An Employee always gets its own profile. Staff get `requested` when it is
/// in `candidates`, otherwise `fallback`, otherwise the first candidate.
pub(crate) fn select_employee(
    actor: &Actor,
    own: Option<EmployeeProfile>,
    candidates: &[EmployeeProfile],
    requested: Option<Id>,
    fallback_to_own: bool,
) -> TtResult<EmployeeProfile> {
    let selected = match (actor.is_staff(), requested) {
        (false, _) => own,
        (true, Some(id)) => candidates.iter().find(|e| e.id == id).cloned(),
        (true, None) => {
            let own = if fallback_to_own { own } else { None };
            own.or_else(|| candidates.first().cloned())
        }
    };

    selected.ok_or_else(|| TtError::NotFound {
        entity: "Employee",
        field: "id",
        value: requested.map_or_else(|| "current user".to_string(), |id| id.to_string()),
    })
}

/// Display names of users by id, `"System"` for unknown ids
pub(crate) async fn user_names(
    stores: &Stores,
    ids: impl IntoIterator<Item = Option<Id>>,
) -> TtResult<HashMap<Id, String>> {
    let ids: Vec<Id> = ids.into_iter().flatten().collect();
    let mut names = HashMap::new();
    for id in ids {
        if names.contains_key(&id) {
            continue;
        }
        if let Some(user) = stores.users.find_by_id(id).await? {
            names.insert(id, user.full_name());
        }
    }
    Ok(names)
}

pub(crate) const SYSTEM_USER_NAME: &str = "System";

pub(crate) fn creator_name(names: &HashMap<Id, String>, id: Option<Id>) -> String {
    id.and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| SYSTEM_USER_NAME.to_string())
}

/// Names of every project by id
pub(crate) async fn project_names(stores: &Stores) -> TtResult<HashMap<Id, String>> {
    let projects = stores.projects.list(&tt_models::ProjectFilter::default()).await?;
    Ok(projects.into_iter().map(|p| (p.id, p.name)).collect())
}
