//! Auth domain: candidate accounts, one-time code login via Twilio and JWTs.

pub mod actions;
pub mod error;
pub mod jwt;
pub mod models;

pub use actions::{
    add_social_account, register, send_code, update_profile, verify_code, ProfileUpdate,
    RegisterInput, Session, SocialAccountInput,
};
pub use error::AuthError;
pub use jwt::{Claims, JwtService, TOKEN_TTL_DAYS};
pub use models::{Role, SocialAccount, SubscriptionStatus, Tier, User};
