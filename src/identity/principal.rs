use serde::{Deserialize, Serialize};

/// Platform role carried on the identity record.
///
/// Roles the client does not know about are kept verbatim so a stored record
/// round-trips exactly; they grant nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "student")]
    Student,
    #[serde(rename = "instructor")]
    Instructor,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Role::Student,
            "instructor" => Role::Instructor,
            _ => Role::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record returned by the authentication endpoint and persisted in the
/// `user` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), name: name.into(), email: email.into(), role }
    }

    pub fn is_instructor(&self) -> bool { self.role == Role::Instructor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_shape_with_underscore_id() {
        let u: User = serde_json::from_str(
            r#"{"_id":"65a1","name":"Ada","email":"a@x.com","role":"instructor","createdAt":"2024-01-01"}"#,
        ).unwrap();
        assert_eq!(u.id, "65a1");
        assert_eq!(u.role, Role::Instructor);
    }

    #[test]
    fn unknown_role_is_preserved() {
        let u: User = serde_json::from_str(r#"{"id":"1","name":"Root","email":"r@x.com","role":"admin"}"#).unwrap();
        assert_eq!(u.role, Role::Other("admin".into()));
        assert!(!u.is_instructor());
        let back = serde_json::to_value(&u).unwrap();
        assert_eq!(back["role"], "admin");
    }

    #[test]
    fn parse_is_case_insensitive_for_known_roles() {
        assert_eq!(Role::parse("Instructor"), Role::Instructor);
        assert_eq!(Role::parse(" student "), Role::Student);
        assert_eq!(Role::parse("admin"), Role::Other("admin".into()));
    }
}
