//! Keyword tables and fixed defaults shared by the crawler and the extractors.
//! Table order is significant wherever a lookup returns the first hit.

pub const DEFAULT_REGION: &str = "San Francisco";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_DESCRIPTION: &str = "Program information available on website.";

pub const DEFAULT_CATEGORY: &str = "creative";

pub const MAX_CATEGORIES: usize = 3;

// Link filtering

pub const NON_NAVIGABLE_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "data:", "#"];

pub const SKIPPED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".css", ".js", ".zip",
    ".gz", ".tar", ".rar", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".mp3", ".mp4",
    ".mov", ".avi", ".wav",
];

/// Links whose URL or anchor text contains one of these are crawled first
pub const PRIORITY_LINK_KEYWORDS: &[&str] = &[
    "register",
    "registration",
    "enroll",
    "enrollment",
    "sign-up",
    "signup",
    "classes",
    "schedule",
    "programs",
    "sessions",
    "calendar",
    "book",
    "booking",
];

/// An anchor matching one of these becomes the record's registration URL
pub const REGISTRATION_LINK_KEYWORDS: &[&str] =
    &["register", "enroll", "sign-up", "signup", "sign up"];

// Date keyword categories

pub const RE_ENROLLMENT_KEYWORDS: &[&str] = &[
    "re-enrollment",
    "reenrollment",
    "re enrollment",
    "current students",
    "returning students",
    "current families",
    "priority registration",
    "early registration",
];

pub const NEW_REGISTRATION_KEYWORDS: &[&str] = &[
    "open enrollment",
    "new enrollment",
    "new students",
    "new families",
    "general registration",
    "public registration",
    "returning students begins",
    "registration opens",
    "registration begins",
    "enrollment opens",
    "enrollment begins",
    "sign up",
    "register by",
    "enroll by",
];

/// Appended to the new-registration list when scanning the registration page itself
pub const REGISTRATION_PAGE_EXTRA_KEYWORDS: &[&str] =
    &["deadline", "opens on", "begins on", "starts on"];

pub const GENERIC_DATE_KEYWORDS: &[&str] = &[
    "registration",
    "enrollment",
    "deadline",
    "opens",
    "begins",
    "start",
];

/// Forward-only window for the keyword-category passes
pub const CATEGORY_WINDOW_AFTER: usize = 300;
/// Bidirectional window for the generic registration-page pass
pub const GENERIC_WINDOW_BEFORE: usize = 100;
pub const GENERIC_WINDOW_AFTER: usize = 200;

// Field extraction tables

pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("swimming", &["swim", "aquatic", "water", "pool"]),
    ("art", &["art", "painting", "drawing", "sculpture", "creative"]),
    ("chess", &["chess"]),
    ("soccer", &["soccer", "football"]),
    ("music", &["music", "piano", "guitar", "violin", "instrument"]),
    ("dance", &["dance", "ballet", "hip hop"]),
    (
        "martial-arts",
        &["martial arts", "karate", "taekwondo", "judo", "kung fu"],
    ),
    (
        "technology",
        &["coding", "programming", "computer", "robotics", "tech"],
    ),
    (
        "academic",
        &["tutoring", "math", "science", "reading", "academic"],
    ),
    (
        "science",
        &["science", "stem", "engineering", "physics", "chemistry"],
    ),
    ("sports", &["sports", "athletic", "fitness"]),
];

pub const NEIGHBORHOOD_KEYWORDS: &[(&str, &[&str])] = &[
    ("Marina District", &["marina", "chestnut", "lombard"]),
    ("Mission District", &["mission", "valencia", "24th", "16th"]),
    ("SOMA", &["townsend", "folsom", "howard", "2nd", "3rd"]),
    ("Richmond District", &["geary", "clement"]),
    ("Sunset District", &["judah", "noriega", "taraval"]),
    ("Noe Valley", &["24th", "castro", "noe"]),
    ("Castro", &["castro", "market", "18th"]),
    ("Pacific Heights", &["pacific", "broadway", "fillmore"]),
    ("Haight-Ashbury", &["haight", "ashbury"]),
    ("North Beach", &["columbus", "broadway", "grant"]),
];

pub const ABOUT_SECTION_KEYWORDS: &[&str] = &[
    "about",
    "description",
    "overview",
    "our program",
    "what we offer",
];

pub const ADDRESS_SELECTORS: &[&str] = &[
    ".address",
    ".location-address",
    ".contact-address",
    "[class*=\"address\"]",
    "[class*=\"location\"]",
];

pub const CONTACT_EMAIL_BLOCKLIST: &[&str] = &["noreply", "example", "test"];
