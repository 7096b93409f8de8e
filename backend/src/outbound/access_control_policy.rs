//! Authority policy resolving user roles through access-control groups.
//!
//! Every user has exactly one role. A role names an access-control group;
//! groups grant permissions and may inherit other groups. The authorities of
//! a user are the role id plus every permission reachable from that group.
//!
//! ```json
//! {
//!   "users": { "waiter": "Waiter", "chief": "Chief" },
//!   "groups": {
//!     "Waiter": { "permissions": ["Order.Take"] },
//!     "Chief": { "permissions": ["Offer.Import"], "inherits": ["Waiter"] }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::cap_paths::open_parent;
use crate::domain::Authority;
use crate::domain::ports::{AuthorityPolicy, AuthorityPolicyError};

/// Errors raised while loading an access-control document.
#[derive(Debug, Error)]
pub enum AccessControlLoadError {
    /// The document could not be read.
    #[error("failed to read access-control policy at {path}: {source}")]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid policy JSON.
    #[error("access-control policy parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One access-control group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessControlGroup {
    /// Permissions granted directly by this group.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// Groups whose permissions this group includes.
    #[serde(default)]
    pub inherits: Vec<String>,
}

/// [`AuthorityPolicy`] over a user→role table and a group graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessControlAuthorityPolicy {
    #[serde(default)]
    users: BTreeMap<String, String>,
    #[serde(default)]
    groups: BTreeMap<String, AccessControlGroup>,
}

impl AccessControlAuthorityPolicy {
    /// Empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a policy document.
    pub fn from_json(contents: &str) -> Result<Self, AccessControlLoadError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Read and parse the policy document at `path`.
    pub fn load(path: &Path) -> Result<Self, AccessControlLoadError> {
        let read_error = |source| AccessControlLoadError::Read {
            path: path.to_path_buf(),
            source,
        };
        let (directory, file_name) = open_parent(path).map_err(read_error)?;
        let contents = directory.read_to_string(&file_name).map_err(read_error)?;
        Self::from_json(&contents)
    }

    /// Assign `role` to `username`.
    pub fn with_user(mut self, username: impl Into<String>, role: impl Into<String>) -> Self {
        self.users.insert(username.into(), role.into());
        self
    }

    /// Define or replace group `id`.
    pub fn with_group<P, I>(mut self, id: impl Into<String>, permissions: P, inherits: I) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.groups.insert(
            id.into(),
            AccessControlGroup {
                permissions: permissions.into_iter().map(Into::into).collect(),
                inherits: inherits.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    fn resolve(&self, role: &str) -> Result<BTreeSet<Authority>, AuthorityPolicyError> {
        let mut authorities = BTreeSet::from([Authority::new(role)]);
        let mut visited = BTreeSet::new();
        let mut pending = VecDeque::from([role]);

        while let Some(group_id) = pending.pop_front() {
            if !visited.insert(group_id) {
                continue;
            }
            let group = self
                .groups
                .get(group_id)
                .ok_or_else(|| AuthorityPolicyError::unknown_group(group_id))?;
            authorities.extend(group.permissions.iter().map(Authority::new));
            pending.extend(group.inherits.iter().map(String::as_str));
        }
        Ok(authorities)
    }
}

#[async_trait]
impl AuthorityPolicy for AccessControlAuthorityPolicy {
    async fn authorities_for(
        &self,
        username: &str,
    ) -> Result<BTreeSet<Authority>, AuthorityPolicyError> {
        let role = self
            .users
            .get(username)
            .ok_or_else(|| AuthorityPolicyError::unknown_user(username))?;
        self.resolve(role)
    }
}
