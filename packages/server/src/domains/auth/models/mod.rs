pub mod identifier;
pub mod social_account;
pub mod user;

pub use identifier::{is_test_identifier, normalize_phone, phone_fingerprint, TEST_CODE, TEST_PHONE_NUMBER};
pub use social_account::{NewSocialAccount, SocialAccount, TenantHandle};
pub use user::{subscription_allows, NewUser, ProfileChanges, Role, SubscriptionStatus, Tier, User, TRIAL_DAYS};
