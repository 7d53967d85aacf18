//! Word lists used by dialect detection, sentiment and topic extraction.

// ============================================================================
// Dialect evidence
// ============================================================================

/// Letters written in Kurdish (Sorani/Badini) but not in Arabic:
/// ە ڕ ڵ ێ ۆ.
pub const KURDISH_LETTERS: &[char] = &['\u{06D5}', '\u{0695}', '\u{06B5}', '\u{06CE}', '\u{06C6}'];

/// ڤ, common in Badini and almost absent from Sorani.
pub const BADINI_LETTER: char = '\u{06A4}';

/// Heh followed by ZWNJ, the legacy spelling of ە kept by Badini writers.
pub const LEGACY_HEH: &str = "\u{0647}\u{200C}";

/// Letters used in Arabic but not in Kurdish orthography: ة ى ث ذ ض ظ ط ص.
pub const ARABIC_ONLY_LETTERS: &[char] = &[
    '\u{0629}', '\u{0649}', '\u{062B}', '\u{0630}', '\u{0636}', '\u{0638}', '\u{0637}', '\u{0635}',
];

/// Kurmanji letters with diacritics.
pub const KURMANJI_LETTERS: &[char] = &['ê', 'î', 'û', 'ş', 'ç'];

pub const SORANI_MARKER_WORDS: &[&str] = &["لە", "بۆ", "ئەم", "ئەو", "دەکات", "کە", "لەگەڵ", "زۆر"];

pub const BADINI_MARKER_WORDS: &[&str] = &["ژ", "دگەل", "ئەڤە", "ئەڤ", "ئەز", "دێ", "ڤێ", "ل"];

pub const KURMANJI_MARKER_WORDS: &[&str] = &["ji", "û", "ev", "ew", "ez", "li", "bi", "ku", "jî", "di"];

pub const ENGLISH_MARKER_WORDS: &[&str] = &[
    "the", "and", "of", "to", "is", "in", "for", "on", "with", "that", "this", "are", "was",
];

// ============================================================================
// Election keywords per dialect
// ============================================================================

pub const SORANI_ELECTION_TERMS: &[&str] = &[
    "هەڵبژاردن",
    "کاندید",
    "کامپەین",
    "سیاسەت",
    "پەرلەمان",
    "دەنگدان",
    "دیموکراسی",
    "حزب",
    "دەنگدەر",
    "کۆمسیۆن",
];

pub const BADINI_ELECTION_TERMS: &[&str] = &[
    "هەلبژارتن",
    "کاندید",
    "کەمپەین",
    "سیاسەت",
    "پەرلەمان",
    "دەنگدان",
    "پارتی",
    "دەنگدەر",
];

pub const KURMANJI_ELECTION_TERMS: &[&str] = &[
    "hilbijartin",
    "kandîd",
    "kampanya",
    "siyaset",
    "parlamento",
    "parlement",
    "dengdan",
    "demokrasî",
    "partî",
    "dengder",
];

pub const ARABIC_ELECTION_TERMS: &[&str] = &[
    "انتخابات",
    "مرشح",
    "حملة انتخابية",
    "سياسة",
    "برلمان",
    "تصويت",
    "ديمقراطية",
    "ناخبين",
    "مفوضية الانتخابات",
    "صناديق الاقتراع",
    "قائمة انتخابية",
];

pub const ENGLISH_ELECTION_TERMS: &[&str] = &[
    "election",
    "elections",
    "candidate",
    "campaign",
    "politics",
    "parliament",
    "voting",
    "vote",
    "voters",
    "democracy",
    "ballot",
    "mp",
];

// ============================================================================
// Sentiment
// ============================================================================

pub const POSITIVE_WORDS: &[&str] = &[
    // Arabic
    "مثبت", "جيد", "رائع", "ناجح", "قوي", "ممتاز", "أفضل", "نجاح", "تقدم", "أمل", "دعم", "انجاز",
    // Sorani / Badini
    "باش", "سەرکەوتوو", "بەهێز", "پشتگیری", "هیوا", "ئومێد", "چاک", "باشترین", "دەستخۆش", "سەرکەفتن",
    // Kurmanji
    "baş", "serkeftî", "xurt", "hêvî", "piştgirî", "serkeftin",
    // English
    "good", "great", "excellent", "support", "success", "hope", "strong", "best", "win", "progress",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    // Arabic
    "سلبي", "سيء", "فشل", "ضعيف", "فساد", "فاسد", "كذب", "سرقة", "أزمة", "غضب",
    // Sorani / Badini
    "خراپ", "گەندەڵی", "شکست", "لاواز", "درۆ", "دزی", "قەیران", "تووڕە", "گەندەلی",
    // Kurmanji
    "xirab", "gendelî", "têkçûn", "qels", "derew",
    // English
    "bad", "corrupt", "corruption", "fail", "failure", "weak", "lie", "crisis", "angry", "scandal",
];

/// Words that flip the polarity of the next sentiment word.
pub const NEGATIONS: &[&str] = &["لا", "لم", "ليس", "غير", "نە", "نەخێر", "ne", "not", "no", "never"];

// ============================================================================
// Topics
// ============================================================================

pub const TOPICS: &[(&str, &[&str])] = &[
    ("election", &["انتخابات", "هەڵبژاردن", "هەلبژارتن", "hilbijartin", "election", "vote"]),
    ("government", &["حكومة", "حکومەت", "hikûmet", "government", "minister"]),
    ("economy", &["اقتصاد", "ئابوور", "aborî", "economy", "salary", "رواتب", "مووچە"]),
    ("security", &["أمن", "امن", "ئاسایش", "ewlehî", "security", "terrorism"]),
    ("education", &["تعليم", "پەروەردە", "perwerde", "education", "school", "university"]),
    ("healthcare", &["صحة", "تەندروستی", "tenduristî", "health", "hospital"]),
    ("infrastructure", &["كهرباء", "کارەبا", "elektrîk", "electricity", "water", "roads"]),
    ("corruption", &["فساد", "گەندەڵی", "gendelî", "corruption"]),
    ("development", &["تنمية", "گەشەپێدان", "pêşveçûn", "development", "investment"]),
];
