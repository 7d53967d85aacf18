use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::tier::PriorityTier;
use crate::domains::language::text::find_phrase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Governorate {
    Erbil,
    Sulaymaniyah,
    Duhok,
    Halabja,
    Kirkuk,
    Baghdad,
    Basra,
    Najaf,
    Karbala,
    Nineveh,
    Anbar,
    Salahuddin,
    Diyala,
    Wasit,
    Maysan,
    DhiQar,
    Muthanna,
    Qadisiyah,
    Babil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionType {
    Kurdistan,
    Central,
    South,
    Religious,
    Disputed,
    North,
    West,
}

impl RegionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kurdistan => "kurdistan",
            Self::Central => "central",
            Self::South => "south",
            Self::Religious => "religious",
            Self::Disputed => "disputed",
            Self::North => "north",
            Self::West => "west",
        }
    }
}

impl Governorate {
    pub const ALL: [Governorate; 19] = [
        Governorate::Erbil,
        Governorate::Sulaymaniyah,
        Governorate::Duhok,
        Governorate::Halabja,
        Governorate::Kirkuk,
        Governorate::Baghdad,
        Governorate::Basra,
        Governorate::Najaf,
        Governorate::Karbala,
        Governorate::Nineveh,
        Governorate::Anbar,
        Governorate::Salahuddin,
        Governorate::Diyala,
        Governorate::Wasit,
        Governorate::Maysan,
        Governorate::DhiQar,
        Governorate::Muthanna,
        Governorate::Qadisiyah,
        Governorate::Babil,
    ];

    /// Stable key stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Erbil => "erbil",
            Self::Sulaymaniyah => "sulaymaniyah",
            Self::Duhok => "duhok",
            Self::Halabja => "halabja",
            Self::Kirkuk => "kirkuk",
            Self::Baghdad => "baghdad",
            Self::Basra => "basra",
            Self::Najaf => "najaf",
            Self::Karbala => "karbala",
            Self::Nineveh => "nineveh",
            Self::Anbar => "anbar",
            Self::Salahuddin => "salahuddin",
            Self::Diyala => "diyala",
            Self::Wasit => "wasit",
            Self::Maysan => "maysan",
            Self::DhiQar => "dhi_qar",
            Self::Muthanna => "muthanna",
            Self::Qadisiyah => "qadisiyah",
            Self::Babil => "babil",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Erbil => "Erbil",
            Self::Sulaymaniyah => "Sulaymaniyah",
            Self::Duhok => "Duhok",
            Self::Halabja => "Halabja",
            Self::Kirkuk => "Kirkuk",
            Self::Baghdad => "Baghdad",
            Self::Basra => "Basra",
            Self::Najaf => "Najaf",
            Self::Karbala => "Karbala",
            Self::Nineveh => "Nineveh",
            Self::Anbar => "Anbar",
            Self::Salahuddin => "Salahuddin",
            Self::Diyala => "Diyala",
            Self::Wasit => "Wasit",
            Self::Maysan => "Maysan",
            Self::DhiQar => "Dhi Qar",
            Self::Muthanna => "Muthanna",
            Self::Qadisiyah => "Qadisiyah",
            Self::Babil => "Babil",
        }
    }

    /// Alternative spellings, capitals and local-script names, including the
    /// transcription slips speech input produces ("Mania", "Our Bill").
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Erbil => &["arbil", "hewler", "hawler", "hewlêr", "our bill", "أربيل", "اربيل", "هەولێر", "هه‌ولێر"],
            Self::Sulaymaniyah => &[
                "sulaimaniyah", "sulaimaniya", "suleimaniyah", "slemani", "silêmanî", "sulaimani", "mania",
                "السليمانية", "سلێمانی", "سلیمانی",
            ],
            Self::Duhok => &["dohuk", "dahuk", "duhog", "dihok", "zakho", "دهوك", "دهۆک", "دهۆکێ", "زاخۆ"],
            Self::Halabja => &["helebce", "helebje", "حلبجة", "هەڵەبجە"],
            Self::Kirkuk => &["kerkuk", "كركوك", "کەرکووک"],
            Self::Baghdad => &["بغداد", "بەغدا"],
            Self::Basra => &["basrah", "البصرة", "بەسرە"],
            Self::Najaf => &["النجف"],
            Self::Karbala => &["kerbala", "كربلاء"],
            Self::Nineveh => &["ninawa", "ninewa", "mosul", "نينوى", "الموصل", "موسڵ"],
            Self::Anbar => &["al anbar", "ramadi", "fallujah", "الأنبار", "الانبار", "الرمادي"],
            Self::Salahuddin => &["salah al-din", "salah ad din", "saladin", "tikrit", "صلاح الدين", "تكريت"],
            Self::Diyala => &["baqubah", "ديالى", "بعقوبة"],
            Self::Wasit => &["kut", "واسط", "الكوت"],
            Self::Maysan => &["missan", "amarah", "ميسان", "العمارة"],
            Self::DhiQar => &["dhi qar", "thi qar", "nasiriyah", "ذي قار", "الناصرية"],
            Self::Muthanna => &["samawah", "المثنى", "السماوة"],
            Self::Qadisiyah => &["qadisiyyah", "diwaniyah", "القادسية", "الديوانية"],
            Self::Babil => &["babylon", "hillah", "بابل", "الحلة"],
        }
    }

    /// Parses names, keys and aliases; case, spaces, hyphens and underscores are ignored.
    pub fn parse(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|g| {
            normalize(g.as_str()) == wanted
                || normalize(g.display_name()) == wanted
                || g.aliases().iter().any(|a| normalize(a) == wanted)
        })
    }

    pub fn tier(&self) -> PriorityTier {
        match self {
            Self::Sulaymaniyah | Self::Halabja => PriorityTier::Sulaymaniyah,
            Self::Erbil => PriorityTier::Erbil,
            Self::Baghdad => PriorityTier::Baghdad,
            Self::Basra => PriorityTier::Basra,
            Self::Duhok => PriorityTier::Duhok,
            Self::Kirkuk => PriorityTier::Kirkuk,
            _ => PriorityTier::Other,
        }
    }

    pub fn is_kurdistan(&self) -> bool {
        matches!(
            self,
            Self::Erbil | Self::Sulaymaniyah | Self::Duhok | Self::Halabja
        )
    }

    pub fn region_type(&self) -> RegionType {
        match self {
            Self::Erbil | Self::Sulaymaniyah | Self::Duhok | Self::Halabja => RegionType::Kurdistan,
            Self::Baghdad | Self::Salahuddin | Self::Diyala | Self::Babil => RegionType::Central,
            Self::Basra | Self::Wasit | Self::Maysan | Self::DhiQar | Self::Muthanna | Self::Qadisiyah => {
                RegionType::South
            }
            Self::Najaf | Self::Karbala => RegionType::Religious,
            Self::Kirkuk => RegionType::Disputed,
            Self::Nineveh => RegionType::North,
            Self::Anbar => RegionType::West,
        }
    }

    /// Priority order of the governorate's tier (1 = collected most often).
    pub fn priority_order(&self) -> i32 {
        self.tier().priority_order()
    }
}

impl fmt::Display for Governorate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Governorate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| anyhow::anyhow!("unknown governorate: {}", s))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_' | '\'' | '\u{200C}'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The governorate mentioned earliest in the text, if any.
pub fn extract_governorate(text: &str) -> Option<Governorate> {
    let lower = text.to_lowercase();

    Governorate::ALL
        .into_iter()
        .filter_map(|g| {
            std::iter::once(g.display_name())
                .chain(g.aliases().iter().copied())
                .filter_map(|name| find_phrase(&lower, name))
                .min()
                .map(|pos| (pos, g))
        })
        .min()
        .map(|(_, g)| g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!(Governorate::parse("Erbil"), Some(Governorate::Erbil));
        assert_eq!(Governorate::parse("Our Bill"), Some(Governorate::Erbil));
        assert_eq!(Governorate::parse("hewler"), Some(Governorate::Erbil));
        assert_eq!(Governorate::parse("Mania"), Some(Governorate::Sulaymaniyah));
        assert_eq!(Governorate::parse("Duhog"), Some(Governorate::Duhok));
        assert_eq!(Governorate::parse("dhi_qar"), Some(Governorate::DhiQar));
        assert_eq!(Governorate::parse("Dhi Qar"), Some(Governorate::DhiQar));
        assert_eq!(Governorate::parse("Mosul"), Some(Governorate::Nineveh));
        assert_eq!(Governorate::parse("السليمانية"), Some(Governorate::Sulaymaniyah));
        assert_eq!(Governorate::parse("هەولێر"), Some(Governorate::Erbil));
        assert_eq!(Governorate::parse("Atlantis"), None);
        assert_eq!(Governorate::parse("  "), None);
    }

    #[test]
    fn keys_roundtrip() {
        for g in Governorate::ALL {
            assert_eq!(Governorate::parse(g.as_str()), Some(g));
        }
    }

    #[test]
    fn kurdistan_membership() {
        let kurdistan: Vec<_> = Governorate::ALL.into_iter().filter(|g| g.is_kurdistan()).collect();
        assert_eq!(
            kurdistan,
            vec![
                Governorate::Erbil,
                Governorate::Sulaymaniyah,
                Governorate::Duhok,
                Governorate::Halabja
            ]
        );
        assert_eq!(Governorate::Kirkuk.region_type(), RegionType::Disputed);
        assert_eq!(Governorate::Najaf.region_type(), RegionType::Religious);
    }

    #[test]
    fn halabja_shares_sulaymaniyah_tier() {
        assert_eq!(Governorate::Halabja.tier(), PriorityTier::Sulaymaniyah);
        assert_eq!(Governorate::Najaf.tier(), PriorityTier::Other);
    }

    #[test]
    fn extracts_earliest_governorate() {
        assert_eq!(
            extract_governorate("Rally moved from Kirkuk to Erbil"),
            Some(Governorate::Kirkuk)
        );
        assert_eq!(
            extract_governorate("الانتخابات في البصرة"),
            Some(Governorate::Basra)
        );
        assert_eq!(extract_governorate("The kutaiba family"), None);
        assert_eq!(extract_governorate("no place here"), None);
    }

    #[test]
    fn embedded_alias_does_not_claim_an_earlier_position() {
        assert_eq!(
            extract_governorate("The kutaiba family met voters in Erbil, then Kut"),
            Some(Governorate::Erbil)
        );
    }
}
