use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::password::HashedPassword;

/// Length of a textual user id (hex-encoded ObjectId).
pub const USER_ID_LEN: usize = 24;

/// Stored user document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext
    pub password: HashedPassword,
}

/// A user before the store has assigned it an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: HashedPassword,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<HashedPassword>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Overwrite the fields of `user` that this change set carries.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
    }
}

/// User as returned by the API. `password` is the stored hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// 24-character hex id
    #[schema(example = "64b7f0c2a1b2c3d4e5f60718")]
    pub id: String,
    #[schema(example = "ada")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "$argon2id$v=19$m=19456,t=2,p=1$...")]
    pub password: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            password: user.password.into_string(),
        }
    }
}

/// Recognised fields of a decoded form body.
///
/// A field counts as supplied when its key is present, even with an empty
/// value. A repeated key keeps its first value; unknown keys are ignored.
#[derive(Debug, Default)]
struct FormFields {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl FromIterator<(String, String)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut fields = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut fields.name,
                "email" => &mut fields.email,
                "password" => &mut fields.password,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        fields
    }
}

/// Form body for `POST /users`.
#[derive(Debug, Clone, Default, ToSchema)]
pub struct CreateUserForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Form body for `PUT /users/{uid}`.
#[derive(Debug, Clone, Default, ToSchema)]
pub struct UpdateUserForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl FromIterator<(String, String)> for CreateUserForm {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let FormFields {
            name,
            email,
            password,
        } = pairs.into_iter().collect();
        Self {
            name,
            email,
            password,
        }
    }
}

impl FromIterator<(String, String)> for UpdateUserForm {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let FormFields {
            name,
            email,
            password,
        } = pairs.into_iter().collect();
        Self {
            name,
            email,
            password,
        }
    }
}

impl UpdateUserForm {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Parse a path id. Anything that is not exactly 24 characters of hex is
/// treated as unknown.
pub fn parse_user_id(uid: &str) -> Option<ObjectId> {
    if uid.chars().count() != USER_ID_LEN {
        return None;
    }
    ObjectId::parse_str(uid).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_form_repeated_key_keeps_first_value() {
        let form: CreateUserForm = pairs(&[
            ("name", "a"),
            ("name", "b"),
            ("email", "e"),
            ("password", "p"),
        ])
        .into_iter()
        .collect();

        assert_eq!(form.name.as_deref(), Some("a"));
        assert_eq!(form.email.as_deref(), Some("e"));
        assert_eq!(form.password.as_deref(), Some("p"));
    }

    #[test]
    fn test_form_empty_value_counts_as_present_and_unknown_keys_ignored() {
        let form: UpdateUserForm = pairs(&[("nickname", "x"), ("email", "")])
            .into_iter()
            .collect();

        assert_eq!(form.email.as_deref(), Some(""));
        assert!(form.name.is_none() && form.password.is_none());

        let form: UpdateUserForm = pairs(&[("nickname", "x")]).into_iter().collect();
        assert!(form.is_empty());
    }

    #[test]
    fn test_parse_user_id_accepts_24_hex_chars() {
        let id = ObjectId::new();
        assert_eq!(parse_user_id(&id.to_hex()), Some(id));
    }

    #[test]
    fn test_parse_user_id_rejects_wrong_length() {
        assert_eq!(parse_user_id("abc"), None);
        assert_eq!(parse_user_id(""), None);
        assert_eq!(parse_user_id(&"a".repeat(25)), None);
    }

    #[test]
    fn test_parse_user_id_rejects_non_hex() {
        assert_eq!(parse_user_id(&"z".repeat(24)), None);
    }

    #[test]
    fn test_parse_user_id_counts_characters_not_bytes() {
        // 24 chars, more than 24 bytes
        let uid = format!("{}é", "a".repeat(23));
        assert_eq!(uid.chars().count(), 24);
        assert_eq!(parse_user_id(&uid), None);
    }

    #[test]
    fn test_user_document_uses_underscore_id() {
        let user = User {
            id: ObjectId::new(),
            name: "ada".into(),
            email: "ada@example.com".into(),
            password: crate::password::cheap_hashing().hash("pw").unwrap(),
        };
        let doc = mongodb::bson::to_document(&user).unwrap();

        assert!(doc.get_object_id("_id").is_ok());
        assert!(doc.get("id").is_none());
        assert!(doc.get_str("password").unwrap().starts_with("$argon2id$"));
    }

    #[test]
    fn test_response_exposes_hex_id_and_hash() {
        let id = ObjectId::new();
        let hash = crate::password::cheap_hashing().hash("pw").unwrap();
        let response = UserResponse::from(User {
            id,
            name: "ada".into(),
            email: "ada@example.com".into(),
            password: hash.clone(),
        });

        assert_eq!(response.id, id.to_hex());
        assert_eq!(response.password, hash.as_str());
    }

    #[test]
    fn test_changes_apply_only_present_fields() {
        let mut user = User {
            id: ObjectId::new(),
            name: "ada".into(),
            email: "ada@example.com".into(),
            password: crate::password::cheap_hashing().hash("pw").unwrap(),
        };
        let before = user.password.clone();

        UserChanges {
            email: Some("new@example.com".into()),
            ..Default::default()
        }
        .apply_to(&mut user);

        assert_eq!(user.name, "ada");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.password, before);
    }
}
