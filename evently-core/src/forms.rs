use evently_shared::Masked;
use serde::Serialize;
use validator::Validate;

use crate::{validation_message, CoreResult};

/// Body of `POST /{role}/login`. No `Debug`: it holds a plain password.
#[derive(Clone, Serialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn checked(self) -> CoreResult<Self> {
        self.validate().map_err(|e| validation_message(&e))?;
        Ok(self)
    }
}

/// Student self-registration. Password confirmation never leaves the client.
#[derive(Clone, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    pub school_id: Option<String>,
}

/// Wire form of [`SignupForm`] after validation
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: Masked<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
}

impl SignupForm {
    pub fn request(&self) -> CoreResult<SignupRequest> {
        self.validate().map_err(|e| validation_message(&e))?;
        Ok(SignupRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: Masked::new(self.password.clone()),
            school_id: self.school_id.clone(),
        })
    }
}

/// Admin rejection of an event. The reason is mandatory.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RejectionForm {
    #[validate(length(min = 1, message = "A rejection reason is required"))]
    pub rejection_reason: String,
}

impl RejectionForm {
    pub fn new(reason: impl Into<String>) -> CoreResult<Self> {
        let form = Self {
            rejection_reason: reason.into().trim().to_string(),
        };
        form.validate().map_err(|e| validation_message(&e))?;
        Ok(form)
    }
}
