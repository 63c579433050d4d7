//! Authorization for pawprint
//!
//! Every mutating operation asks one [`PolicyEngine`] whether an actor may
//! perform an action on a resource:
//! - Public reads
//! - Admin-only uploads
//! - Owner-or-admin status changes and deletes
//! - Signed-in applications, reviewed by the cat's owner or an admin

use crate::core::error::{ConfigError, PawprintError};
use anyhow::Result;
use async_trait::async_trait;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// Identity of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Signed-in user
    User { user_id: Uuid, role: Role },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    pub fn user(user_id: Uuid) -> Self {
        AuthContext::User {
            user_id,
            role: Role::User,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        AuthContext::User {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            AuthContext::User {
                role: Role::Admin,
                ..
            }
        )
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }
}

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SearchCats,
    ViewCat,
    CreateCat,
    UpdateCatStatus,
    DeleteCat,
    ApplyForCat,
    ReviewApplication,
    ViewApplications,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SearchCats => "search_cats",
            Action::ViewCat => "view_cat",
            Action::CreateCat => "create_cat",
            Action::UpdateCatStatus => "update_cat_status",
            Action::DeleteCat => "delete_cat",
            Action::ApplyForCat => "apply_for_cat",
            Action::ReviewApplication => "review_application",
            Action::ViewApplications => "view_applications",
        }
    }
}

/// What an action targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// The cat collection as a whole
    Catalogue,

    /// One existing cat
    Cat {
        id: Uuid,
        owner_id: Option<Uuid>,
        pending_applications: u32,
    },

    /// The applications filed by one user, who owns them
    Applications { user_id: Uuid },
}

impl Resource {
    fn owner_id(&self) -> Option<Uuid> {
        match self {
            Resource::Cat { owner_id, .. } => *owner_id,
            Resource::Applications { user_id } => Some(*user_id),
            Resource::Catalogue => None,
        }
    }
}

/// Authorization rule for an action
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated user
    Authenticated,

    /// Admin only
    AdminOnly,

    /// Owner of the resource only
    Owner,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Check if the actor satisfies this policy for `resource`
    pub fn check(&self, context: &AuthContext, resource: &Resource) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::Owner => match (context.user_id(), resource.owner_id()) {
                (Some(user), Some(owner)) => user == owner,
                _ => false,
            },

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context, resource)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context, resource)),
        }
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Option<Self> {
        match s {
            "public" => Some(AuthPolicy::Public),
            "authenticated" => Some(AuthPolicy::Authenticated),
            "admin_only" => Some(AuthPolicy::AdminOnly),
            "owner" => Some(AuthPolicy::Owner),
            "owner_or_admin" => Some(AuthPolicy::Or(vec![
                AuthPolicy::Owner,
                AuthPolicy::AdminOnly,
            ])),
            _ => None,
        }
    }
}

/// Central `(actor, action, resource)` authorization check
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: HashMap<Action, AuthPolicy>,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        let owner_or_admin = AuthPolicy::Or(vec![AuthPolicy::Owner, AuthPolicy::AdminOnly]);
        let rules = HashMap::from([
            (Action::SearchCats, AuthPolicy::Public),
            (Action::ViewCat, AuthPolicy::Public),
            (Action::CreateCat, AuthPolicy::AdminOnly),
            (Action::UpdateCatStatus, owner_or_admin.clone()),
            (Action::DeleteCat, owner_or_admin.clone()),
            (Action::ApplyForCat, AuthPolicy::Authenticated),
            (Action::ReviewApplication, owner_or_admin.clone()),
            (Action::ViewApplications, owner_or_admin),
        ]);
        Self { rules }
    }
}

impl PolicyEngine {
    /// Default rules with per-action overrides from configuration
    pub fn from_overrides(overrides: &BTreeMap<Action, String>) -> Result<Self, PawprintError> {
        let mut engine = Self::default();
        for (action, policy) in overrides {
            let parsed = AuthPolicy::parse_policy(policy).ok_or_else(|| {
                PawprintError::Config(ConfigError::UnknownPolicy {
                    action: action.as_str().to_string(),
                    policy: policy.clone(),
                })
            })?;
            engine.rules.insert(*action, parsed);
        }
        Ok(engine)
    }

    pub fn with_rule(mut self, action: Action, policy: AuthPolicy) -> Self {
        self.rules.insert(action, policy);
        self
    }

    /// Decide whether `actor` may perform `action` on `resource`
    ///
    /// Anonymous callers that fail a rule get `Unauthorized`, known callers
    /// get `Forbidden`. Deleting a cat with open applications is a
    /// `Conflict` regardless of who asks.
    pub fn authorize(
        &self,
        actor: &AuthContext,
        action: Action,
        resource: &Resource,
    ) -> Result<(), PawprintError> {
        // Actions without a rule are admin-only
        let allowed = match self.rules.get(&action) {
            Some(policy) => policy.check(actor, resource),
            None => actor.is_admin(),
        };

        if !allowed {
            tracing::debug!(?action, ?actor, "Authorization denied");
            return Err(match actor {
                AuthContext::Anonymous => PawprintError::Unauthorized {
                    message: format!("{} requires a signed-in user", action.as_str()),
                },
                AuthContext::User { .. } => PawprintError::Forbidden {
                    message: format!("not permitted to {}", action.as_str()),
                },
            });
        }

        if let (
            Action::DeleteCat,
            Resource::Cat {
                id,
                pending_applications,
                ..
            },
        ) = (action, resource)
        {
            if *pending_applications > 0 {
                return Err(PawprintError::Conflict {
                    message: format!(
                        "cat '{}' has {} pending application(s)",
                        id, pending_applications
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Extracts the caller's identity from an HTTP request
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn extract_context(&self, parts: &Parts) -> Result<AuthContext>;
}

/// Trusts identity headers set by an upstream session layer
///
/// `x-user-id` carries the user's UUID, `x-user-role` is `admin` or `user`
/// (default `user`). A request without `x-user-id` is anonymous.
pub struct HeaderAuthProvider;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[async_trait]
impl AuthProvider for HeaderAuthProvider {
    async fn extract_context(&self, parts: &Parts) -> Result<AuthContext> {
        let Some(raw_id) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(AuthContext::Anonymous);
        };
        let user_id = Uuid::parse_str(raw_id.to_str()?)?;
        let role = match parts.headers.get(USER_ROLE_HEADER) {
            Some(raw) => Role::parse(raw.to_str()?)
                .ok_or_else(|| anyhow::anyhow!("unknown role '{}'", raw.to_str().unwrap_or("")))?,
            None => Role::User,
        };
        Ok(AuthContext::User { user_id, role })
    }
}

/// Treats every caller as anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _parts: &Parts) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}
