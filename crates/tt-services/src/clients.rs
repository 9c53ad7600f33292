//! Client administration (staff only)

use serde::Serialize;
use tracing::info;
use tt_contracts::clients::ClientContract;
use tt_contracts::Contract;
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::{Client, ClientFilter, ClientForm, Project, ProjectFilter};

use crate::context::Caller;

#[derive(Debug, Clone, Serialize)]
pub struct ClientDetails {
    #[serde(flatten)]
    pub client: Client,
    pub projects: Vec<Project>,
}

pub struct ClientService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
}

impl<'a> ClientService<'a> {
    pub fn new(stores: &'a Stores, caller: &'a Caller) -> Self {
        Self { stores, caller }
    }

    fn authorize(&self) -> TtResult<()> {
        self.caller.actor()?.require_staff()
    }

    pub async fn list(&self, filter: ClientFilter) -> TtResult<Vec<Client>> {
        self.authorize()?;
        Ok(self.stores.clients.list(&filter).await?)
    }

    pub async fn get(&self, id: Id) -> TtResult<ClientDetails> {
        self.authorize()?;
        let client = self.find(id).await?;
        let projects = self
            .stores
            .projects
            .list(&ProjectFilter {
                client_id: Some(id),
                ..Default::default()
            })
            .await?;
        Ok(ClientDetails { client, projects })
    }

    pub async fn create(&self, form: ClientForm) -> TtResult<Client> {
        self.authorize()?;
        ClientContract.validate(&form)?;
        let client = self.stores.clients.create(&form).await?;
        info!(client_id = client.id, name = %client.name, "Client created");
        Ok(client)
    }

    /// Update with optimistic locking; the form must carry the version it was read at
    pub async fn update(&self, id: Id, form: ClientForm) -> TtResult<Client> {
        self.authorize()?;
        let expected_version = form
            .lock_version
            .ok_or_else(|| TtError::invalid("lock_version", "is required"))?;
        ClientContract.validate(&form)?;
        self.find(id).await?;

        let client = self.stores.clients.update(id, &form, expected_version).await?;
        info!(client_id = client.id, lock_version = client.lock_version, "Client updated");
        Ok(client)
    }

    /// Delete a client; refused while it still has projects
    pub async fn delete(&self, id: Id) -> TtResult<()> {
        self.authorize()?;
        self.find(id).await?;
        self.stores.clients.delete(id).await?;
        info!(client_id = id, "Client deleted");
        Ok(())
    }

    async fn find(&self, id: Id) -> TtResult<Client> {
        self.stores
            .clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| TtError::not_found("Client", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;

    #[tokio::test]
    async fn test_client_crud() {
        let fx = fixture().await;
        let service = ClientService::new(&fx.stores, &fx.manager);

        let created = service
            .create(ClientForm::new("TechStart Sp. z o.o.").with_city("Kraków"))
            .await
            .unwrap();
        assert_eq!(created.lock_version, 0);

        let mut form = ClientForm::new("TechStart");
        form.lock_version = Some(created.lock_version);
        let updated = service.update(created.id, form).await.unwrap();
        assert_eq!(updated.name, "TechStart");
        assert_eq!(updated.lock_version, 1);

        let listed = service
            .list(ClientFilter {
                name: Some("tech".into()),
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        service.delete(created.id).await.unwrap();
        assert_eq!(service.get(created.id).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_requires_current_version() {
        let fx = fixture().await;
        let service = ClientService::new(&fx.stores, &fx.admin);

        let missing = service
            .update(fx.client.id, ClientForm::new("ABC"))
            .await
            .unwrap_err();
        assert_eq!(missing.status_code(), 422);

        let mut stale = ClientForm::new("ABC");
        stale.lock_version = Some(fx.client.lock_version + 5);
        assert_eq!(
            service.update(fx.client.id, stale).await.unwrap_err().status_code(),
            409
        );
    }

    #[tokio::test]
    async fn test_client_with_projects_cannot_be_deleted() {
        let fx = fixture().await;
        let service = ClientService::new(&fx.stores, &fx.manager);
        assert_eq!(service.get(fx.client.id).await.unwrap().projects.len(), 2);
        assert_eq!(service.delete(fx.client.id).await.unwrap_err().status_code(), 409);
    }

    #[tokio::test]
    async fn test_employees_have_no_access() {
        let fx = fixture().await;
        let service = ClientService::new(&fx.stores, &fx.employee);
        assert_eq!(
            service.list(ClientFilter::default()).await.unwrap_err().status_code(),
            403
        );
        assert_eq!(
            service.create(ClientForm::new("X")).await.unwrap_err().status_code(),
            403
        );
    }
}
