use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use url::Url;

use crate::common::UserId;
use crate::domains::auth::error::AuthError;
use crate::domains::auth::models::{NewSocialAccount, SocialAccount};
use crate::domains::mentions::Platform;

const MAX_ACCOUNT_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct SocialAccountInput {
    pub platform: String,
    pub account_name: String,
    pub account_url: Option<String>,
}

impl SocialAccountInput {
    /// Account names are handles: a leading `@` is dropped and spaces are rejected.
    pub fn validate(&self) -> Result<NewSocialAccount, AuthError> {
        let platform = self
            .platform
            .parse::<Platform>()
            .ok()
            .filter(|p| *p != Platform::News)
            .ok_or_else(|| AuthError::InvalidInput("Unknown platform".into()))?;

        let account_name = self.account_name.trim().trim_start_matches('@');
        if account_name.is_empty() {
            return Err(AuthError::InvalidInput("Account name is required".into()));
        }
        if account_name.chars().any(char::is_whitespace)
            || account_name.chars().count() > MAX_ACCOUNT_NAME_CHARS
        {
            return Err(AuthError::InvalidInput("Invalid account name".into()));
        }

        let account_url = match self.account_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => {
                let url = Url::parse(raw)
                    .ok()
                    .filter(|u| matches!(u.scheme(), "http" | "https"))
                    .ok_or_else(|| AuthError::InvalidInput("Invalid account URL".into()))?;
                Some(url.to_string())
            }
            None => None,
        };

        Ok(NewSocialAccount {
            platform,
            account_name: account_name.to_string(),
            account_url,
        })
    }
}

pub async fn add_social_account(
    user_id: UserId,
    input: &SocialAccountInput,
    pool: &PgPool,
) -> Result<SocialAccount, AuthError> {
    let new = input.validate()?;
    let account = SocialAccount::upsert(user_id, &new, pool).await?;
    info!(
        user_id = %user_id,
        platform = %account.platform,
        account = %account.account_name,
        "Social account connected"
    );
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(platform: &str, name: &str, url: Option<&str>) -> SocialAccountInput {
        SocialAccountInput {
            platform: platform.into(),
            account_name: name.into(),
            account_url: url.map(String::from),
        }
    }

    #[test]
    fn canonicalizes_handle_and_platform() {
        let account = input("FB", " @kurdistan.news ", Some("https://facebook.com/kurdistan.news"))
            .validate()
            .unwrap();
        assert_eq!(account.platform, Platform::Facebook);
        assert_eq!(account.account_name, "kurdistan.news");
        assert_eq!(
            account.account_url.as_deref(),
            Some("https://facebook.com/kurdistan.news")
        );
    }

    #[test]
    fn rejects_bad_accounts() {
        for bad in [
            input("news", "site", None),
            input("myspace", "page", None),
            input("facebook", " @ ", None),
            input("facebook", "two words", None),
            input("facebook", "page", Some("javascript:alert(1)")),
        ] {
            assert!(matches!(bad.validate(), Err(AuthError::InvalidInput(_))), "{:?}", bad);
        }
    }
}
