use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::AccessRestrictionId;

/// Access restrictions visible to the current caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    granted: BTreeSet<AccessRestrictionId>,
    #[serde(default)]
    unrestricted: bool,
}

impl Permissions {
    /// Caller that may only see unrestricted geometry
    pub fn none() -> Self {
        Self::default()
    }

    /// Caller that may see every restriction
    pub fn unrestricted() -> Self {
        Self {
            granted: BTreeSet::new(),
            unrestricted: true,
        }
    }

    pub fn allows(&self, restriction: AccessRestrictionId) -> bool {
        self.unrestricted || self.granted.contains(&restriction)
    }

    /// Every restriction in `restrictions` is visible
    pub fn allows_all<'a>(&self, restrictions: impl IntoIterator<Item = &'a AccessRestrictionId>) -> bool {
        restrictions.into_iter().all(|&restriction| self.allows(restriction))
    }

    pub fn grant(&mut self, restriction: AccessRestrictionId) {
        self.granted.insert(restriction);
    }
}

impl FromIterator<AccessRestrictionId> for Permissions {
    fn from_iter<T: IntoIterator<Item = AccessRestrictionId>>(iter: T) -> Self {
        Self {
            granted: iter.into_iter().collect(),
            unrestricted: false,
        }
    }
}
