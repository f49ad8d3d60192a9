use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::auth::claims::SessionView;
use crate::auth::repo_types::Location;

/// Request body for user registration. Everything is optional at the wire
/// level so missing fields surface as our own errors, not serde's.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Vec<String>,
    pub location: Option<Location>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

/// Anything other than an array counts as no skills; non-string entries are dropped.
fn lenient_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: SessionView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skills_of(body: Value) -> Vec<String> {
        serde_json::from_value::<RegisterRequest>(body).unwrap().skills
    }

    #[test]
    fn skills_array_keeps_strings_only() {
        assert_eq!(
            skills_of(json!({"skills": ["Cooking", 3, null, "Driving"]})),
            vec!["Cooking".to_string(), "Driving".to_string()]
        );
    }

    #[test]
    fn non_array_skills_become_empty() {
        assert!(skills_of(json!({"skills": "cooking"})).is_empty());
        assert!(skills_of(json!({"skills": {"a": 1}})).is_empty());
        assert!(skills_of(json!({"skills": null})).is_empty());
        assert!(skills_of(json!({})).is_empty());
    }
}
