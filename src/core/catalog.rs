//! Policy-guarded workflows over the cat catalogue

use crate::core::application::{ApplicationRecord, ApplicationStatus};
use crate::core::auth::{Action, AuthContext, PolicyEngine, Resource};
use crate::core::cat::{CatRecord, CatStatus, NewCat};
use crate::core::error::PawprintError;
use crate::core::store::CatStore;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Listing and adoption application workflows
///
/// Each operation authorizes through the shared [`PolicyEngine`] before
/// touching the store. Operations on one cat load it first so the policy
/// sees its owner and its pending application count.
#[derive(Clone)]
pub struct CatCatalog {
    store: Arc<dyn CatStore>,
    policy: Arc<PolicyEngine>,
}

impl CatCatalog {
    pub fn new(store: Arc<dyn CatStore>, policy: Arc<PolicyEngine>) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    /// Full record of one cat, checked against that cat's owner
    pub async fn view(&self, actor: &AuthContext, id: &Uuid) -> Result<CatRecord, PawprintError> {
        let cat = self.load(id).await?;
        self.policy
            .authorize(actor, Action::ViewCat, &self.resource_of(&cat).await?)?;
        Ok(cat)
    }

    /// Create a new `AVAILABLE` listing owned by the actor
    pub async fn create(&self, actor: &AuthContext, new: NewCat) -> Result<CatRecord, PawprintError> {
        self.policy
            .authorize(actor, Action::CreateCat, &Resource::Catalogue)?;
        new.validate()?;
        if new.name.trim().is_empty() {
            return Err(PawprintError::invalid("name", "name must not be blank"));
        }

        let record = CatRecord::from_new(new, actor.user_id());
        let created = self.store.insert(record).await?;
        tracing::info!(cat_id = %created.id, name = %created.name, "Cat listed");
        Ok(created)
    }

    /// Move a cat to another lifecycle state
    pub async fn set_status(
        &self,
        actor: &AuthContext,
        id: &Uuid,
        status: CatStatus,
    ) -> Result<CatRecord, PawprintError> {
        let mut cat = self.load(id).await?;
        self.policy
            .authorize(actor, Action::UpdateCatStatus, &self.resource_of(&cat).await?)?;

        if !self.store.set_status(id, status).await? {
            return Err(PawprintError::cat_not_found(*id));
        }
        tracing::info!(cat_id = %id, from = cat.status.as_str(), to = status.as_str(), "Cat status changed");
        cat.status = status;
        Ok(cat)
    }

    /// Remove a listing and its applications
    ///
    /// Only the owner or an admin may delete, and only while no adoption
    /// application is pending.
    pub async fn delete(&self, actor: &AuthContext, id: &Uuid) -> Result<(), PawprintError> {
        let cat = self.load(id).await?;
        self.policy
            .authorize(actor, Action::DeleteCat, &self.resource_of(&cat).await?)?;

        if !self.store.delete(id).await? {
            return Err(PawprintError::cat_not_found(*id));
        }
        tracing::info!(cat_id = %id, "Cat deleted");
        Ok(())
    }

    /// File a `PENDING` application by the actor for a cat
    ///
    /// Adopted cats take no applications, and a user holds at most one
    /// pending application per cat.
    pub async fn apply(
        &self,
        actor: &AuthContext,
        cat_id: &Uuid,
    ) -> Result<ApplicationRecord, PawprintError> {
        let cat = self.load(cat_id).await?;
        self.policy
            .authorize(actor, Action::ApplyForCat, &self.resource_of(&cat).await?)?;
        let Some(user_id) = actor.user_id() else {
            return Err(PawprintError::Unauthorized {
                message: "applications need a signed-in user".to_string(),
            });
        };
        if cat.status == CatStatus::Adopted {
            return Err(PawprintError::Conflict {
                message: format!("cat '{}' has already been adopted", cat_id),
            });
        }

        let application = ApplicationRecord::new(*cat_id, user_id);
        if !self.store.insert_application(&application).await? {
            return Err(PawprintError::Conflict {
                message: format!("a pending application for cat '{}' already exists", cat_id),
            });
        }
        tracing::info!(application_id = %application.id, cat_id = %cat_id, user_id = %user_id, "Application filed");
        Ok(application)
    }

    /// Approve or reject a pending application
    ///
    /// Decided by the cat's owner or an admin. A decision is final.
    pub async fn set_application_status(
        &self,
        actor: &AuthContext,
        id: &Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, PawprintError> {
        let application = self
            .store
            .get_application(id)
            .await?
            .ok_or_else(|| PawprintError::application_not_found(*id))?;
        let cat = self.load(&application.cat_id).await?;
        self.policy
            .authorize(actor, Action::ReviewApplication, &self.resource_of(&cat).await?)?;

        if status == ApplicationStatus::Pending {
            return Err(PawprintError::invalid(
                "status",
                "an application can only be APPROVED or REJECTED",
            ));
        }
        if !application.is_pending() {
            return Err(PawprintError::Conflict {
                message: format!(
                    "application '{}' is already {}",
                    id,
                    application.status.as_str()
                ),
            });
        }

        let updated = self
            .store
            .set_application_status(id, status)
            .await?
            .ok_or_else(|| PawprintError::application_not_found(*id))?;
        tracing::info!(application_id = %id, cat_id = %cat.id, to = status.as_str(), "Application reviewed");
        Ok(updated)
    }

    /// Applications filed by `user_id`, newest first
    pub async fn applications_for_user(
        &self,
        actor: &AuthContext,
        user_id: &Uuid,
    ) -> Result<Vec<ApplicationRecord>, PawprintError> {
        self.policy.authorize(
            actor,
            Action::ViewApplications,
            &Resource::Applications { user_id: *user_id },
        )?;
        Ok(self.store.applications_for_user(user_id).await?)
    }

    async fn load(&self, id: &Uuid) -> Result<CatRecord, PawprintError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| PawprintError::cat_not_found(*id))
    }

    async fn resource_of(&self, cat: &CatRecord) -> Result<Resource, PawprintError> {
        Ok(Resource::Cat {
            id: cat.id,
            owner_id: cat.owner_id,
            pending_applications: self.store.pending_applications(&cat.id).await?,
        })
    }
}
