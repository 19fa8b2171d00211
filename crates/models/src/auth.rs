use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const MSG_SAME_PASSWORD: &str = "New password must be different from old password.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ModelError::Validation(MSG_FILL_ALL_FIELDS.into()));
        }
        if !self.email.contains('@') {
            return Err(ModelError::Validation("invalid email".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn new(email: impl Into<String>, old_password: impl Into<String>, new_password: impl Into<String>) -> Self {
        Self { email: email.into(), old_password: old_password.into(), new_password: new_password.into() }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.email.trim().is_empty() || self.old_password.is_empty() || self.new_password.is_empty() {
            return Err(ModelError::Validation(MSG_FILL_ALL_FIELDS.into()));
        }
        if self.new_password == self.old_password {
            return Err(ModelError::Validation(MSG_SAME_PASSWORD.into()));
        }
        Ok(())
    }
}

/// Reply of a mutation endpoint. The backend answers with a JSON string, a
/// plain-text body, or an object with a `message` field; an empty body carries
/// no message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage(pub Option<String>);

impl ServerMessage {
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self(None);
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) => Self(Some(s)),
            Ok(serde_json::Value::Object(map)) => Self(
                ["message", "msg", "error", "data"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(|v| v.as_str()).map(str::to_owned)),
            ),
            Ok(_) => Self(None),
            Err(_) => Self(Some(trimmed.to_owned())),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_password_requires_all_fields() {
        for (e, o, n) in [("", "a", "b"), ("x@y.se", "", "b"), ("x@y.se", "a", "")] {
            let err = ChangePasswordRequest::new(e, o, n).validate().unwrap_err();
            assert_eq!(err, ModelError::Validation(MSG_FILL_ALL_FIELDS.into()));
        }
    }

    #[test]
    fn change_password_rejects_same_password() {
        let err = ChangePasswordRequest::new("x@y.se", "hunter2", "hunter2").validate().unwrap_err();
        assert_eq!(err.to_string(), MSG_SAME_PASSWORD);
        assert!(ChangePasswordRequest::new("x@y.se", "hunter2", "hunter3").validate().is_ok());
    }

    #[test]
    fn change_password_wire_names_are_camel_case() {
        let json = serde_json::to_value(ChangePasswordRequest::new("x@y.se", "a", "b")).unwrap();
        assert_eq!(json["oldPassword"], "a");
        assert_eq!(json["newPassword"], "b");
    }

    #[test]
    fn login_validation() {
        assert!(LoginRequest::new("", "pw").validate().is_err());
        assert!(LoginRequest::new("nope", "pw").validate().is_err());
        assert!(LoginRequest::new("a@b.se", "pw").validate().is_ok());
    }

    #[test]
    fn server_message_shapes() {
        assert_eq!(ServerMessage::from_body("\"Password changed\"").text(), Some("Password changed"));
        assert_eq!(ServerMessage::from_body("Password changed").text(), Some("Password changed"));
        assert_eq!(ServerMessage::from_body(r#"{"message":"ok"}"#).text(), Some("ok"));
        assert_eq!(ServerMessage::from_body("  ").text(), None);
        assert_eq!(ServerMessage::from_body(r#"{"id":1}"#).text(), None);
    }
}
