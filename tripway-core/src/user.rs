use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripway_shared::Masked;

use crate::{CoreError, CoreResult};

/// Public profile. The password hash never leaves the store layer inside this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored PHC password hash, for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: Masked<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: Masked<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: Masked<String>,
}

impl RegisterRequest {
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name must not be empty".to_string()));
        }
        validate_email(&self.email)?;
        if self.password.expose().chars().count() < Self::MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Masked<String>,
}

/// Body of `PUT /api/users/{id}`. Only present fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_none() && self.email.is_none() && self.phone.is_none() {
            return Err(CoreError::Validation(
                "at least one of name, email or phone is required".to_string(),
            ));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("name must not be empty".to_string()));
            }
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            user.email = normalize_email(email);
        }
        if let Some(phone) = &self.phone {
            // An empty phone clears the stored number.
            let phone = phone.trim();
            user.phone = (!phone.is_empty()).then(|| phone.to_string());
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Canonical form of a phone number for keying: a leading `+` if present, then
/// digits only. `"+91 98765-43210"` becomes `"+919876543210"`.
pub fn normalize_phone(phone: &str) -> String {
    let phone = phone.trim();
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match (phone.starts_with('+'), digits.is_empty()) {
        (_, true) => String::new(),
        (true, false) => format!("+{}", digits),
        (false, false) => digits,
    }
}

fn validate_email(email: &str) -> CoreResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(CoreError::Validation("email is not a valid address".to_string()));
    }
    Ok(())
}
