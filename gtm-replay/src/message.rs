use gtm::event::Event;
use gtm::identity::UserIdentity;
use serde::Deserialize;
use serde_json::Value;

/// One line of replay input: an analytics message, plus the identity it was
/// sent with when it carries one.
#[derive(Debug)]
pub struct Message {
    pub event: Event,
    pub identity: Option<UserIdentity>,
}

impl Message {
    pub fn from_line(line: &str) -> Result<Message, serde_json::Error> {
        let value: Value = serde_json::from_str(line)?;
        let event = Event::deserialize(&value)?;

        let carries_identity = ["userId", "anonymousId", "traits"]
            .iter()
            .any(|key| value.get(key).is_some_and(|v| !v.is_null()));
        let identity = if carries_identity {
            Some(UserIdentity::deserialize(&value)?)
        } else {
            None
        };

        Ok(Message { event, identity })
    }
}
