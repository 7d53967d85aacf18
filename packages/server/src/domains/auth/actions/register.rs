use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::send_code::deliver_code;
use crate::domains::auth::error::AuthError;
use crate::domains::auth::models::{normalize_phone, phone_fingerprint, NewUser, User};
use crate::domains::language::Dialect;
use crate::domains::regions::Governorate;
use crate::kernel::ServerDeps;

const LANGUAGES: [&str; 3] = ["ar", "ku", "en"];

pub(super) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) fn canonical_language(raw: &str) -> Result<String, AuthError> {
    let language = raw.trim().to_ascii_lowercase();
    if LANGUAGES.contains(&language.as_str()) {
        Ok(language)
    } else {
        Err(AuthError::InvalidInput(
            "Language must be one of ar, ku, en".into(),
        ))
    }
}

pub(super) fn canonical_dialect(raw: &str) -> Result<String, AuthError> {
    raw.parse::<Dialect>()
        .map(|d| d.as_str().to_string())
        .map_err(|_| AuthError::InvalidInput("Unknown dialect".into()))
}

pub(super) fn canonical_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_ascii_lowercase();
    if email.contains('@') {
        Ok(email)
    } else {
        Err(AuthError::InvalidInput("Invalid email".into()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub phone_number: String,
    pub governorate: String,
    pub language: String,
    pub email: Option<String>,
    pub party: Option<String>,
    pub dialect: Option<String>,
}

impl RegisterInput {
    /// Checks required fields and canonicalizes phone, governorate, language and dialect.
    pub fn validate(&self) -> Result<NewUser, AuthError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidInput("Name is required".into()));
        }

        let phone_number = normalize_phone(&self.phone_number)
            .ok_or_else(|| AuthError::InvalidInput("Invalid phone number".into()))?;

        let governorate = Governorate::parse(&self.governorate)
            .ok_or_else(|| AuthError::InvalidInput("Unknown governorate".into()))?;

        let language = canonical_language(&self.language)?;

        let dialect = non_blank(self.dialect.as_deref())
            .map(canonical_dialect)
            .transpose()?;

        let email = non_blank(self.email.as_deref())
            .map(canonical_email)
            .transpose()?;

        Ok(NewUser {
            phone_number,
            email,
            name: name.to_string(),
            governorate: governorate.as_str().to_string(),
            party: non_blank(self.party.as_deref()).map(String::from),
            language,
            dialect,
        })
    }
}

/// Creates a free-tier trial account and sends the first login code.
pub async fn register(input: RegisterInput, deps: &ServerDeps) -> Result<User, AuthError> {
    let new_user = input.validate()?;

    let user = User::create(&new_user, Utc::now(), &deps.db_pool)
        .await?
        .ok_or(AuthError::PhoneTaken)?;

    info!(
        user_id = %user.id,
        phone = %phone_fingerprint(&user.phone_number),
        governorate = %user.governorate,
        "User registered"
    );

    deliver_code(&user.phone_number, deps).await?;
    Ok(user)
}
