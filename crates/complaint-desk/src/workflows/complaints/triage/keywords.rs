/// Words that suggest danger to residents or property.
pub(crate) const EMERGENCY_KEYWORDS: [&str; 14] = [
    "fire",
    "flood",
    "collapse",
    "danger",
    "emergency",
    "urgent",
    "leak",
    "broken",
    "unsafe",
    "hazard",
    "injury",
    "accident",
    "immediate",
    "severe",
];

/// Words typical of routine maintenance requests.
pub(crate) const MAINTENANCE_KEYWORDS: [&str; 12] = [
    "repair",
    "fix",
    "issue",
    "problem",
    "concern",
    "attention",
    "needed",
    "required",
    "maintenance",
    "service",
    "not working",
    "damaged",
];

/// Fixed vocabulary matched against lower-cased complaint text.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn emergency() -> Self {
        Self::new(EMERGENCY_KEYWORDS)
    }

    pub fn maintenance() -> Self {
        Self::new(MAINTENANCE_KEYWORDS)
    }

    /// Number of distinct keywords present in `text`. Repeats of the same
    /// keyword count once; matches are plain substrings.
    pub fn count_present(&self, text: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .count()
    }

    pub fn present<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(move |keyword| text.contains(keyword))
    }
}
