use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

/// Errors linked through `source()` beyond this depth are not reported.
pub const MAX_LINKED_ERRORS: usize = 5;

/// The user attached to every report captured after `identify`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        User {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExceptionData {
    pub r#type: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExceptionReport {
    pub event_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub environment: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Outermost error first, followed by its sources.
    pub exception: Vec<ExceptionData>,
}

/// Exception chain for `error`, capped at `MAX_LINKED_ERRORS` entries.
pub fn exception_chain<E>(error: &E) -> Vec<ExceptionData>
where
    E: std::error::Error + ?Sized + 'static,
{
    let mut chain = vec![ExceptionData {
        r#type: short_type_name(std::any::type_name::<E>()),
        value: error.to_string(),
    }];

    let mut source = error.source();
    while let Some(cause) = source {
        if chain.len() >= MAX_LINKED_ERRORS {
            break;
        }
        chain.push(ExceptionData {
            r#type: debug_type_name(cause),
            value: cause.to_string(),
        });
        source = cause.source();
    }

    chain
}

fn short_type_name(name: &str) -> String {
    let path = name.split('<').next().unwrap_or(name);
    path.rsplit("::").next().unwrap_or(path).trim().to_owned()
}

// Sources are only known as trait objects, the leading identifier of their
// Debug output is the closest thing to a type name.
fn debug_type_name(error: &(dyn std::error::Error + 'static)) -> String {
    let debug = format!("{:?}", error);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if name.is_empty() {
        String::from("Error")
    } else {
        name
    }
}
