use crate::dialog::surface::UserId;
use std::collections::BTreeMap;

/// A community member's registered profile: free-form `field -> value`
/// pairs collected through the registration dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Owner of the profile.
    pub user: UserId,
    /// Registered fields, e.g. `rank -> Diamond`, `region -> EU`.
    pub fields: BTreeMap<String, String>,
}

/// All registered profiles, keyed by owner.
pub type Roster = BTreeMap<UserId, Profile>;
