use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Dimensions;

pub const USER_ID_KEY: &str = "userId";
pub const ANONYMOUS_ID_KEY: &str = "segmentAnonymousId";

/// The current user as known to the analytics library.
pub trait User {
    fn id(&self) -> Option<String>;
    fn anonymous_id(&self) -> Option<String>;
    fn traits(&self) -> Map<String, Value>;

    /// All three values read together, so they describe the same user.
    fn identity(&self) -> UserIdentity {
        UserIdentity {
            user_id: self.id(),
            anonymous_id: self.anonymous_id(),
            traits: self.traits(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub anonymous_id: Option<String>,
    #[serde(default)]
    pub traits: Map<String, Value>,
}

impl User for UserIdentity {
    fn id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn anonymous_id(&self) -> Option<String> {
        self.anonymous_id.clone()
    }

    fn traits(&self) -> Map<String, Value> {
        self.traits.clone()
    }

    fn identity(&self) -> UserIdentity {
        self.clone()
    }
}

/// User state shared between whoever identifies the user and the integration
/// reading it on every call.
#[derive(Debug, Default)]
pub struct CurrentUser {
    inner: RwLock<UserIdentity>,
}

impl CurrentUser {
    pub fn new(identity: UserIdentity) -> Self {
        CurrentUser {
            inner: RwLock::new(identity),
        }
    }

    /// Replaces the stored identity.
    pub fn set(&self, identity: UserIdentity) {
        match self.inner.write() {
            Ok(mut guard) => *guard = identity,
            Err(poisoned) => *poisoned.into_inner() = identity,
        }
    }

    pub fn snapshot(&self) -> UserIdentity {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl User for CurrentUser {
    fn id(&self) -> Option<String> {
        self.snapshot().user_id
    }

    fn anonymous_id(&self) -> Option<String> {
        self.snapshot().anonymous_id
    }

    fn traits(&self) -> Map<String, Value> {
        self.snapshot().traits
    }

    fn identity(&self) -> UserIdentity {
        self.snapshot()
    }
}

/// Custom dimensions picked from the user traits, overlaid with the user and
/// anonymous ids. Ids are only set when non-empty and always win over a trait
/// of the same name.
pub fn enhanced_user_info(user: &dyn User, dimensions: &Dimensions) -> Map<String, Value> {
    let UserIdentity {
        user_id,
        anonymous_id,
        mut traits,
    } = user.identity();
    let mut info: Map<String, Value> = dimensions
        .iter()
        .filter_map(|key| traits.remove(key.as_str()).map(|value| (key.to_owned(), value)))
        .collect();

    if let Some(user_id) = user_id.filter(|id| !id.is_empty()) {
        info.insert(String::from(USER_ID_KEY), Value::String(user_id));
    }
    if let Some(anonymous_id) = anonymous_id.filter(|id| !id.is_empty()) {
        info.insert(String::from(ANONYMOUS_ID_KEY), Value::String(anonymous_id));
    }

    info
}
