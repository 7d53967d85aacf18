use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use super::register::{canonical_dialect, canonical_email, canonical_language, non_blank};
use crate::common::UserId;
use crate::domains::auth::error::AuthError;
use crate::domains::auth::models::{ProfileChanges, User};

/// Profile fields a candidate may change. Blank values are ignored; the
/// phone number is the login identity and stays fixed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub party: Option<String>,
    pub language: Option<String>,
    pub dialect: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<ProfileChanges, AuthError> {
        let changes = ProfileChanges {
            name: non_blank(self.name.as_deref()).map(String::from),
            email: non_blank(self.email.as_deref()).map(canonical_email).transpose()?,
            party: non_blank(self.party.as_deref()).map(String::from),
            language: non_blank(self.language.as_deref())
                .map(canonical_language)
                .transpose()?,
            dialect: non_blank(self.dialect.as_deref())
                .map(canonical_dialect)
                .transpose()?,
        };

        if changes.is_empty() {
            return Err(AuthError::InvalidInput("No fields to update".into()));
        }
        Ok(changes)
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}

pub async fn update_profile(
    user_id: UserId,
    update: &ProfileUpdate,
    pool: &PgPool,
) -> Result<User, AuthError> {
    let changes = update.validate()?;

    let user = match User::update_profile(user_id, &changes, pool).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AuthError::NotRegistered),
        Err(e) if is_unique_violation(&e) => return Err(AuthError::EmailTaken),
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, "Profile updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_ignored() {
        let update = ProfileUpdate {
            name: Some("  ".into()),
            language: Some(" AR ".into()),
            dialect: Some("bahdini".into()),
            ..Default::default()
        };
        let changes = update.validate().unwrap();
        assert_eq!(changes.name, None);
        assert_eq!(changes.language.as_deref(), Some("ar"));
        assert_eq!(changes.dialect.as_deref(), Some("badini"));
    }

    #[test]
    fn rejects_empty_and_invalid_updates() {
        assert!(matches!(
            ProfileUpdate::default().validate(),
            Err(AuthError::InvalidInput(_))
        ));

        let bad_email = ProfileUpdate {
            email: Some("nobody".into()),
            ..Default::default()
        };
        assert!(matches!(bad_email.validate(), Err(AuthError::InvalidInput(_))));

        let bad_language = ProfileUpdate {
            language: Some("fr".into()),
            ..Default::default()
        };
        assert!(matches!(bad_language.validate(), Err(AuthError::InvalidInput(_))));
    }
}
