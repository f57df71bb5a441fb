//! Authorization for privileged operations.
//!
//! The engine only asks one question, "may this caller run a privileged
//! operation?", so any access-control scheme plugs in behind [`Authorizer`].

use farm_types::AccountId;
use std::collections::BTreeSet;

/// Capability check gating privileged operations.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, caller: &AccountId) -> bool;
}

/// Exactly one principal is authorized.
#[derive(Clone, Debug)]
pub struct SingleOwner(pub AccountId);

impl Authorizer for SingleOwner {
    fn is_authorized(&self, caller: &AccountId) -> bool {
        *caller == self.0
    }
}

/// Any member of the list is authorized.
#[derive(Clone, Debug, Default)]
pub struct RoleList {
    members: BTreeSet<AccountId>,
}

impl RoleList {
    pub fn new(members: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    pub fn grant(&mut self, member: AccountId) -> bool {
        self.members.insert(member)
    }

    pub fn revoke(&mut self, member: &AccountId) -> bool {
        self.members.remove(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Authorizer for RoleList {
    fn is_authorized(&self, caller: &AccountId) -> bool {
        self.members.contains(caller)
    }
}

impl<F> Authorizer for F
where
    F: Fn(&AccountId) -> bool + Send + Sync,
{
    fn is_authorized(&self, caller: &AccountId) -> bool {
        self(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_owner_only_admits_owner() {
        let auth = SingleOwner(AccountId::new("owner"));
        assert!(auth.is_authorized(&AccountId::new("owner")));
        assert!(!auth.is_authorized(&AccountId::new("mallory")));
    }

    #[test]
    fn role_list_grant_and_revoke() {
        let mut roles = RoleList::new([AccountId::new("ops-1")]);
        assert!(roles.is_authorized(&AccountId::new("ops-1")));
        assert!(!roles.is_authorized(&AccountId::new("ops-2")));
        assert!(roles.grant(AccountId::new("ops-2")));
        assert!(roles.is_authorized(&AccountId::new("ops-2")));
        assert!(roles.revoke(&AccountId::new("ops-1")));
        assert!(!roles.is_authorized(&AccountId::new("ops-1")));
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn closure_predicate_is_an_authorizer() {
        let auth = |caller: &AccountId| caller.as_str().starts_with("admin-");
        assert!(auth.is_authorized(&AccountId::new("admin-7")));
        assert!(!auth.is_authorized(&AccountId::new("user-7")));
    }
}
