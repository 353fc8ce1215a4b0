use super::address::Address;
use crate::error::{RegistryError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role([u8; 32]);

impl Role {
    /// Administers every other role, including itself.
    pub const DEFAULT_ADMIN: Role = Role([0u8; 32]);

    /// Issues certificates and runs unscoped queries.
    pub fn admin() -> Self {
        Self::named("ADMIN_ROLE")
    }

    pub fn named(name: &str) -> Self {
        Self(Sha256::digest(name.as_bytes()).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Outcome of a grant or revoke, so callers only announce real changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Changed,
    Unchanged,
}

/// Role assignments, kept apart from certificate storage.
pub struct AccessControl {
    members: Arc<RwLock<HashMap<Role, HashSet<Address>>>>,
}

impl AccessControl {
    /// The deployer starts with both the default admin and admin roles.
    pub fn new(deployer: Address) -> Self {
        let mut members: HashMap<Role, HashSet<Address>> = HashMap::new();
        members.entry(Role::DEFAULT_ADMIN).or_default().insert(deployer);
        members.entry(Role::admin()).or_default().insert(deployer);

        Self {
            members: Arc::new(RwLock::new(members)),
        }
    }

    pub async fn has_role(&self, role: Role, account: Address) -> bool {
        self.members
            .read()
            .await
            .get(&role)
            .is_some_and(|set| set.contains(&account))
    }

    pub async fn require_role(&self, caller: Address, role: Role) -> Result<()> {
        if self.has_role(role, caller).await {
            return Ok(());
        }
        warn!("access denied: {} lacks role {}", caller, role);
        Err(RegistryError::Unauthorized {
            account: caller,
            role,
        })
    }

    pub async fn require_admin(&self, caller: Address) -> Result<()> {
        self.require_role(caller, Role::admin()).await
    }

    pub async fn grant_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<RoleChange> {
        self.require_role(caller, Role::DEFAULT_ADMIN).await?;

        let inserted = self
            .members
            .write()
            .await
            .entry(role)
            .or_default()
            .insert(account);

        if inserted {
            info!("role {} granted to {} by {}", role, account, caller);
            Ok(RoleChange::Changed)
        } else {
            Ok(RoleChange::Unchanged)
        }
    }

    pub async fn revoke_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<RoleChange> {
        self.require_role(caller, Role::DEFAULT_ADMIN).await?;
        Ok(self.remove(role, account).await)
    }

    pub async fn renounce_role(&self, caller: Address, role: Role) -> RoleChange {
        self.remove(role, caller).await
    }

    async fn remove(&self, role: Role, account: Address) -> RoleChange {
        let mut members = self.members.write().await;
        let removed = members
            .get_mut(&role)
            .is_some_and(|set| set.remove(&account));

        if removed {
            info!("role {} removed from {}", role, account);
            RoleChange::Changed
        } else {
            RoleChange::Unchanged
        }
    }
}
