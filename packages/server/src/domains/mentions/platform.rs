use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Youtube,
    Twitter,
    Tiktok,
    Telegram,
    Whatsapp,
    News,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Youtube,
        Platform::Twitter,
        Platform::Tiktok,
        Platform::Telegram,
        Platform::Whatsapp,
        Platform::News,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Twitter => "twitter",
            Self::Tiktok => "tiktok",
            Self::Telegram => "telegram",
            Self::Whatsapp => "whatsapp",
            Self::News => "news",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" | "fb" => Ok(Self::Facebook),
            "instagram" | "ig" => Ok(Self::Instagram),
            "youtube" | "yt" => Ok(Self::Youtube),
            "twitter" | "x" => Ok(Self::Twitter),
            "tiktok" => Ok(Self::Tiktok),
            "telegram" => Ok(Self::Telegram),
            "whatsapp" => Ok(Self::Whatsapp),
            "news" | "web" => Ok(Self::News),
            other => anyhow::bail!("unknown platform: {}", other),
        }
    }
}
