//! Deterministic content classifier.
//!
//! # Responsibility
//! - Pick a target list for free text from the registered slugs.
//! - Derive a handful of tags from the same text.
//!
//! # Invariants
//! - Output depends only on `(content, available)`; no clock, no I/O.
//! - The rationale is never empty.
//! - Rules are evaluated URL first, then keywords, then the default.

pub mod intake;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"'`(){}\[\]|\\^]+"#).expect("valid url regex")
});
static TOKEN_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\W]+").expect("valid token regex"));

const SYSTEM_KEYWORDS: [&str; 9] = [
    "system",
    "upgrade",
    "config",
    "audit",
    "workflow",
    "prefs",
    "management",
    "enhance",
    "improve",
];
const SYSTEM_SLUG: &str = "system-upgrades";
const DEFAULT_SLUG: &str = "ideas";
const CONFIDENCE_MARKERS: [&str; 3] = ["detected", "explicit", "clear"];

/// Which rule family produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationRule {
    Url(UrlRule),
    Keyword,
    Default,
    /// Caller named the list directly.
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRule {
    LinkedInProfile,
    LinkedInCompany,
    GitHubRepository,
    YouTube,
    TwitterStatus,
    BlogArticle,
    News,
}

impl UrlRule {
    /// `(preferred, alternate)` target slugs.
    fn targets(self) -> (&'static str, &'static str) {
        match self {
            Self::LinkedInProfile | Self::LinkedInCompany => ("crm", "contacts"),
            Self::GitHubRepository => ("projects", "development"),
            Self::YouTube => ("media", "content"),
            Self::TwitterStatus => ("social", "social-media"),
            Self::BlogArticle => ("reading", "articles"),
            Self::News => ("news", "reading"),
        }
    }

    fn rationale(self) -> &'static str {
        match self {
            Self::LinkedInProfile => "LinkedIn profile URL detected",
            Self::LinkedInCompany => "LinkedIn company page detected",
            Self::GitHubRepository => "GitHub repository URL detected",
            Self::YouTube => "YouTube video URL detected",
            Self::TwitterStatus => "Twitter/X post URL detected",
            Self::BlogArticle => "Blog/article URL detected",
            Self::News => "News article URL detected",
        }
    }

    /// First rule whose host/path pattern matches `url`.
    fn matching(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        let path = url.path().to_ascii_lowercase();
        let segments = path.split('/').filter(|s| !s.is_empty()).count();
        let bare_host = host.strip_prefix("www.").unwrap_or(&host);

        if host.contains("linkedin.com") && (path.contains("/in/") || path.contains("/profile/")) {
            Some(Self::LinkedInProfile)
        } else if host.contains("linkedin.com") && path.contains("/company/") {
            Some(Self::LinkedInCompany)
        } else if host.contains("github.com") && segments >= 2 {
            Some(Self::GitHubRepository)
        } else if host.contains("youtube.com") || host.contains("youtu.be") {
            Some(Self::YouTube)
        } else if matches!(bare_host, "twitter.com" | "x.com") && path.contains("/status/") {
            Some(Self::TwitterStatus)
        } else if ["medium.com", "substack.com", "blog.", "article."]
            .iter()
            .any(|marker| host.contains(marker))
        {
            Some(Self::BlogArticle)
        } else if [
            "nytimes.com",
            "washingtonpost.com",
            "reuters.com",
            "bbc.com",
            "cnn.com",
            "npr.org",
        ]
        .iter()
        .any(|site| host.contains(site))
        {
            Some(Self::News)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub slug: String,
    pub rationale: String,
    pub rule: ClassificationRule,
}

impl Classification {
    pub fn explicit(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            rationale: "explicit list provided".to_string(),
            rule: ClassificationRule::Explicit,
        }
    }

    /// Whether the rationale reflects a detection or an explicit choice.
    pub fn is_confident(&self) -> bool {
        let lowered = self.rationale.to_lowercase();
        CONFIDENCE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
    }
}

/// Classifies `content` against the registered `available` slugs.
///
/// URLs are tried in order of appearance. For each URL the first matching
/// rule decides; when neither of its targets is registered the next URL is
/// tried. Without a URL hit the keyword rule or the default applies, with
/// fallback to `ideas`, then to the first registered slug. With no lists
/// registered the rule keeps its own slug.
pub fn classify(content: &str, available: &[String]) -> Classification {
    let has = |slug: &str| available.iter().any(|candidate| candidate == slug);

    for url in extract_urls(content) {
        let Ok(parsed) = Url::parse(url) else {
            continue;
        };
        let Some(rule) = UrlRule::matching(&parsed) else {
            continue;
        };
        let (preferred, alternate) = rule.targets();
        if has(preferred) {
            return Classification {
                slug: preferred.to_string(),
                rationale: rule.rationale().to_string(),
                rule: ClassificationRule::Url(rule),
            };
        }
        if has(alternate) {
            return Classification {
                slug: alternate.to_string(),
                rationale: format!("{} ({preferred} not available)", rule.rationale()),
                rule: ClassificationRule::Url(rule),
            };
        }
    }

    let lowered = content.to_lowercase();
    let (slug, mut rationale, rule) = if SYSTEM_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        (
            SYSTEM_SLUG,
            "Contains system/upgrade related keywords".to_string(),
            ClassificationRule::Keyword,
        )
    } else {
        (
            DEFAULT_SLUG,
            "Default fallback".to_string(),
            ClassificationRule::Default,
        )
    };

    let slug = if has(slug) {
        slug.to_string()
    } else if has(DEFAULT_SLUG) {
        rationale.push_str(&format!("; fallback to {DEFAULT_SLUG} ({slug} not available)"));
        DEFAULT_SLUG.to_string()
    } else if let Some(first) = available.first() {
        rationale.push_str(&format!("; fallback to {first} (not available)"));
        first.clone()
    } else {
        rationale.push_str("; no lists registered");
        slug.to_string()
    };

    Classification {
        slug,
        rationale,
        rule,
    }
}

/// URLs in order of appearance.
pub fn extract_urls(content: &str) -> Vec<&str> {
    URL_RE.find_iter(content).map(|m| m.as_str()).collect()
}

/// Lowercase alphabetic tokens longer than three characters, first-seen
/// order, at most `max_tags`.
pub fn extract_tags(content: &str, max_tags: usize) -> Vec<String> {
    let lowered = content.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for token in TOKEN_SPLIT_RE.split(&lowered) {
        if tags.len() >= max_tags {
            break;
        }
        if token.chars().count() > 3
            && token.chars().all(char::is_alphabetic)
            && !tags.iter().any(|tag| tag == token)
        {
            tags.push(token.to_string());
        }
    }
    tags
}
