//! Auth actions: registration, one-time code login and profile changes.

mod register;
mod send_code;
mod social_accounts;
mod update_profile;
mod verify_code;

pub use register::{register, RegisterInput};
pub use send_code::send_code;
pub use social_accounts::{add_social_account, SocialAccountInput};
pub use update_profile::{update_profile, ProfileUpdate};
pub use verify_code::{verify_code, Session};
