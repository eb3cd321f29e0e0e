use serde::{Deserialize, Serialize};

/// An accounting account. Accounts nest through associations
/// (`Association::parent_account`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub description: String,
    pub organization: String,
    /// Users allowed to manage the account.
    pub coordinators: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreate {
    pub name: String,
    pub description: Option<String>,
    pub organization: Option<String>,
    pub coordinators: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub description: Option<String>,
    pub organization: Option<String>,
    pub coordinators: Option<Vec<String>>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.organization.is_none() && self.coordinators.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountListOptions {
    pub names: Vec<String>,
    pub organizations: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl AccountListOptions {
    pub(crate) fn matches(&self, account: &Account) -> bool {
        super::matches_any(&self.names, &account.name)
            && super::matches_any(&self.organizations, &account.organization)
    }
}

/// An accounting user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub default_account: String,
    pub default_wckey: String,
    /// e.g. `None`, `Operator`, `Administrator`.
    pub admin_level: String,
    /// Account access, one entry per cluster and partition.
    pub associations: Vec<UserAssociation>,
}

/// Short form of an association as listed on a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAssociation {
    pub account: String,
    pub cluster: String,
    pub partition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub default_account: Option<String>,
    pub default_wckey: Option<String>,
    pub admin_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub default_account: Option<String>,
    pub default_wckey: Option<String>,
    pub admin_level: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.default_account.is_none() && self.default_wckey.is_none() && self.admin_level.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListOptions {
    pub names: Vec<String>,
    pub default_accounts: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl UserListOptions {
    pub(crate) fn matches(&self, user: &User) -> bool {
        super::matches_any(&self.names, &user.name)
            && super::matches_any(&self.default_accounts, &user.default_account)
    }
}
