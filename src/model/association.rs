use serde::{Deserialize, Serialize};

/// A user/account/cluster binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Accounting database id; zero when unknown.
    pub id: u32,
    pub account: String,
    pub user: String,
    /// Cluster the association applies to.
    pub cluster: String,
    /// Empty for an association covering every partition.
    pub partition: String,
    /// Parent in the account hierarchy.
    pub parent_account: String,
    /// QoS the association may use.
    pub qos: Vec<String>,
    /// QoS applied when a job names none.
    pub default_qos: String,
}

impl Association {
    pub fn key(&self) -> AssociationKey {
        AssociationKey {
            account: self.account.clone(),
            user: self.user.clone(),
            cluster: self.cluster.clone(),
            partition: (!self.partition.is_empty()).then(|| self.partition.clone()),
        }
    }
}

/// Identifies one association.
///
/// An empty `cluster` is filled from the configured default cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationKey {
    pub account: String,
    pub user: String,
    pub cluster: String,
    pub partition: Option<String>,
}

impl AssociationKey {
    pub fn new(account: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }
}

/// A new association. An empty `cluster` is filled from the configured
/// default cluster; an explicit cluster is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationCreate {
    pub account: String,
    pub user: String,
    pub cluster: String,
    pub partition: Option<String>,
    pub parent_account: Option<String>,
    pub qos: Vec<String>,
    pub default_qos: Option<String>,
}

impl AssociationCreate {
    pub fn key(&self) -> AssociationKey {
        AssociationKey {
            account: self.account.clone(),
            user: self.user.clone(),
            cluster: self.cluster.clone(),
            partition: self.partition.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationUpdate {
    pub parent_account: Option<String>,
    pub qos: Option<Vec<String>>,
    pub default_qos: Option<String>,
}

impl AssociationUpdate {
    pub fn is_empty(&self) -> bool {
        self.parent_account.is_none() && self.qos.is_none() && self.default_qos.is_none()
    }
}

/// Account, user, cluster and partition filters are also sent to the
/// server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationListOptions {
    pub accounts: Vec<String>,
    pub users: Vec<String>,
    pub clusters: Vec<String>,
    pub partitions: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl AssociationListOptions {
    pub(crate) fn matches(&self, association: &Association) -> bool {
        super::matches_any(&self.accounts, &association.account)
            && super::matches_any(&self.users, &association.user)
            && super::matches_any(&self.clusters, &association.cluster)
            && super::matches_any(&self.partitions, &association.partition)
    }
}
