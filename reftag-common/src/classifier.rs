//! Referrer pattern classifier
//!
//! Maps a referrer string to exactly one traffic source using an ordered
//! decision list. The first rule whose condition holds wins; later rules are
//! never consulted. A referrer matching several rules is always attributed
//! to the earliest one, so the table order is part of the contract.
//!
//! Matching is case-sensitive substring containment, plus two
//! shape regexes for Google mirrors and the anchored GMX short search host.

use crate::patterns;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

/// Label reported for internal redirects
pub const INTERNAL_LABEL: &str = "auto_tag";

/// Label reported for visits without a referrer
pub const NO_REFERRER_LABEL: &str = "no-referrer";

/// Label reported for list-based rules (`seo/other`, `email/other`, ...)
pub const OTHER_LABEL: &str = "other";

static GOOGLE_DOMAIN_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(patterns::GOOGLE_DOMAIN_SHAPE).expect("hardcoded regex"));

static GMX_SHORT_SEARCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(patterns::GMX_SHORT_SEARCH).expect("hardcoded regex"));

static STANDARD: Lazy<PatternClassifier> = Lazy::new(PatternClassifier::standard);

/// Top-level traffic-source bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Search engine advertising (paid clicks)
    Sea,
    /// Search engine organic results
    Seo,
    /// Social networks and community sites
    SocialMedia,
    /// Internal redirect platforms
    Internal,
    /// Webmail clients
    Email,
    /// No referrer at all
    Direct,
}

impl Category {
    /// Token written into the first field of the encoded tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sea => "sea",
            Category::Seo => "seo",
            Category::SocialMedia => "socialmedia",
            Category::Internal => "int",
            Category::Email => "email",
            Category::Direct => "dir",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(category, label)` pair such as `sea/google` or `socialmedia/other`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrafficSource {
    pub category: Category,
    pub label: String,
}

impl TrafficSource {
    pub fn new(category: Category, label: impl Into<String>) -> Self {
        Self {
            category,
            label: label.into(),
        }
    }

    /// `direct/no-referrer`
    pub fn no_referrer() -> Self {
        Self::new(Category::Direct, NO_REFERRER_LABEL)
    }
}

impl fmt::Display for TrafficSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.label)
    }
}

/// Result of attributing a visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Identifier supplied by the landing URL; forwarded verbatim
    Explicit(String),
    /// Source detected from the referrer
    Source(TrafficSource),
    /// Nothing applies; no event is emitted
    NoMatch,
}

/// Predicate over the raw referrer string
#[derive(Debug, Clone)]
enum Condition {
    Contains(String),
    Matches(Regex),
    Empty,
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    fn holds(&self, referrer: &str) -> bool {
        match self {
            Condition::Contains(term) => referrer.contains(term.as_str()),
            Condition::Matches(regex) => regex.is_match(referrer),
            Condition::Empty => referrer.is_empty(),
            Condition::Not(inner) => !inner.holds(referrer),
            Condition::All(conditions) => conditions.iter().all(|c| c.holds(referrer)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.holds(referrer)),
        }
    }
}

fn contains(term: &str) -> Condition {
    Condition::Contains(term.to_string())
}

fn lacks(term: &str) -> Condition {
    Condition::Not(Box::new(contains(term)))
}

fn any_of<S: AsRef<str>>(terms: &[S]) -> Condition {
    Condition::Any(terms.iter().map(|t| contains(t.as_ref())).collect())
}

/// Neither click ID is present
fn no_click_ids() -> Vec<Condition> {
    vec![
        lacks(patterns::MICROSOFT_CLICK_ID),
        lacks(patterns::GOOGLE_CLICK_ID),
    ]
}

#[derive(Debug, Clone)]
struct Rule {
    source: TrafficSource,
    condition: Condition,
}

impl Rule {
    fn new(category: Category, label: &str, condition: Condition) -> Self {
        Self {
            source: TrafficSource::new(category, label),
            condition,
        }
    }
}

/// Ordered referrer rule table
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    rules: Vec<Rule>,
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternClassifier {
    /// Built-in rule table
    pub fn standard() -> Self {
        Self::with_internal_markers::<&str>(&[])
    }

    /// Built-in rule table with extra internal redirect hosts
    ///
    /// Extra markers only widen the internal rule; the position of that rule
    /// relative to the others does not change. Blank markers are ignored
    /// since an empty substring matches every referrer.
    pub fn with_internal_markers<S: AsRef<str>>(extra: &[S]) -> Self {
        let mut internal: Vec<String> = patterns::INTERNAL_REDIRECTS
            .iter()
            .map(|m| m.to_string())
            .collect();
        for marker in extra {
            let marker = marker.as_ref().trim();
            if marker.is_empty() {
                warn!("Ignoring blank internal redirect marker");
                continue;
            }
            internal.push(marker.to_string());
        }

        let mut rules = Vec::new();

        // Paid search. Bing runs first: a referrer carrying both click IDs
        // is attributed to Bing.
        rules.push(Rule::new(
            Category::Sea,
            "bing",
            Condition::Any(vec![
                contains(patterns::MICROSOFT_CLICK_ID),
                Condition::All(vec![contains(patterns::GOOGLE_CLICK_ID), lacks("google")]),
            ]),
        ));
        rules.push(Rule::new(
            Category::Sea,
            "google",
            Condition::Any(vec![
                Condition::All(vec![
                    contains(patterns::GOOGLE_CLICK_ID),
                    lacks(patterns::MICROSOFT_CLICK_ID),
                ]),
                Condition::All(vec![contains(patterns::GOOGLE_CLICK_ID), contains("google")]),
            ]),
        ));

        // Organic search
        let mut google = no_click_ids();
        google.push(Condition::Any(vec![
            Condition::Matches(GOOGLE_DOMAIN_SHAPE.clone()),
            contains("google.com"),
        ]));
        rules.push(Rule::new(Category::Seo, "google", Condition::All(google)));

        for (label, marker) in patterns::NAMED_SEARCH_ENGINES {
            let mut conditions = no_click_ids();
            conditions.push(contains(marker));
            rules.push(Rule::new(Category::Seo, label, Condition::All(conditions)));
        }

        rules.push(Rule::new(
            Category::Seo,
            OTHER_LABEL,
            Condition::Any(vec![
                any_of(patterns::OTHER_SEARCH_ENGINES),
                Condition::Matches(GMX_SHORT_SEARCH.clone()),
            ]),
        ));

        // Social
        for (label, markers) in patterns::NAMED_SOCIAL_PLATFORMS {
            rules.push(Rule::new(Category::SocialMedia, label, any_of(*markers)));
        }
        rules.push(Rule::new(
            Category::SocialMedia,
            OTHER_LABEL,
            any_of(patterns::OTHER_SOCIAL_PLATFORMS),
        ));

        rules.push(Rule::new(Category::Internal, INTERNAL_LABEL, any_of(internal.as_slice())));
        rules.push(Rule::new(
            Category::Email,
            OTHER_LABEL,
            any_of(patterns::WEBMAIL_PROVIDERS),
        ));
        rules.push(Rule::new(Category::Direct, NO_REFERRER_LABEL, Condition::Empty));

        Self { rules }
    }

    /// Attribute `referrer` to the first matching rule
    pub fn classify(&self, referrer: &str) -> Classification {
        match self.rules.iter().find(|rule| rule.condition.holds(referrer)) {
            Some(rule) => {
                debug!("Referrer {:?} matched {}", referrer, rule.source);
                Classification::Source(rule.source.clone())
            }
            None => {
                debug!("Referrer {:?} matched no rule", referrer);
                Classification::NoMatch
            }
        }
    }

    /// Rule outcomes in evaluation order
    pub fn sources(&self) -> impl Iterator<Item = &TrafficSource> {
        self.rules.iter().map(|rule| &rule.source)
    }
}

/// Classify against the built-in rule table
pub fn classify(referrer: &str) -> Classification {
    STANDARD.classify(referrer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(category: Category, label: &str) -> Classification {
        Classification::Source(TrafficSource::new(category, label))
    }

    #[test]
    fn test_both_click_ids_resolve_to_bing() {
        for referrer in [
            "https://www.google.com/?gclid=1&msclkid=2",
            "https://example.org/?msclkid=2&gclid=1",
            "gclidmsclkid",
        ] {
            assert_eq!(classify(referrer), source(Category::Sea, "bing"), "{referrer}");
        }
    }

    #[test]
    fn test_gclid_without_google_is_bing() {
        assert_eq!(
            classify("https://www.bing.com/aclk?gclid=abc"),
            source(Category::Sea, "bing")
        );
    }

    #[test]
    fn test_gclid_with_google_is_google_ads() {
        assert_eq!(
            classify("https://www.google.de/aclk?sa=l&gclid=abc"),
            source(Category::Sea, "google")
        );
        assert_eq!(
            classify("https://googleadservices.com/pagead?gclid=x"),
            source(Category::Sea, "google")
        );
    }

    #[test]
    fn test_msclkid_is_bing_ads() {
        assert_eq!(
            classify("https://www.bing.com/search?q=x&msclkid=abc"),
            source(Category::Sea, "bing")
        );
    }

    #[test]
    fn test_google_organic() {
        assert_eq!(
            classify("https://www.google.com/search?q=x"),
            source(Category::Seo, "google")
        );
        assert_eq!(classify("https://www.google.de/"), source(Category::Seo, "google"));
        assert_eq!(
            classify("https://www.google.co.uk/"),
            source(Category::Seo, "google")
        );
        assert_eq!(
            classify("android-app://com.google.android.gm/"),
            source(Category::Seo, "google")
        );
    }

    #[test]
    fn test_google_shape_requires_prefix() {
        // No "/", "www" or "com" directly before "google" and no "google.com"
        assert_eq!(classify("https://notgoogle.de/"), Classification::NoMatch);
    }

    #[test]
    fn test_named_search_engines() {
        let cases = [
            ("https://www.bing.com/search?q=x", "bing"),
            ("https://www.ecosia.org/search?q=x", "ecosia"),
            ("https://duckduckgo.com/", "duckduckgo"),
            ("https://suche.web.de/web?q=x", "webde"),
            ("https://de.search.yahoo.com/search?p=x", "yahoo"),
        ];
        for (referrer, label) in cases {
            assert_eq!(classify(referrer), source(Category::Seo, label), "{referrer}");
        }
    }

    #[test]
    fn test_other_search_engines() {
        for referrer in [
            "https://search.brave.com/search?q=x",
            "https://www.qwant.com/?q=x",
            "https://www.startpage.com/do/search",
            "https://yandex.ru/search/?text=x",
            "https://s.gmx.com/search",
        ] {
            assert_eq!(classify(referrer), source(Category::Seo, OTHER_LABEL), "{referrer}");
        }
    }

    #[test]
    fn test_gmx_short_host_is_anchored() {
        assert_eq!(
            classify("https://example.org/?next=https://s.gmx.com"),
            Classification::NoMatch
        );
    }

    #[test]
    fn test_named_social_platforms() {
        let cases = [
            ("https://www.facebook.com/", "facebook"),
            ("https://www.instagram.com/p/abc", "instagram"),
            ("https://www.youtube.com/watch?v=1", "youtube"),
            ("https://www.linkedin.com/feed/", "linkedin"),
            ("https://www.xing.com/news", "xing"),
            ("https://twitter.com/someone", "twitter"),
            ("https://x.com/someone", "twitter"),
            ("https://t.co/abcdef", "twitter"),
        ];
        for (referrer, label) in cases {
            assert_eq!(
                classify(referrer),
                source(Category::SocialMedia, label),
                "{referrer}"
            );
        }
    }

    #[test]
    fn test_other_social_platforms() {
        for referrer in [
            "https://www.reddit.com/r/rust",
            "https://someone.wordpress.org/post",
            "https://www.pinterest.com/pin/1",
            "https://m.ok.ru/",
            "https://www.glassdoor.com/Reviews",
        ] {
            assert_eq!(
                classify(referrer),
                source(Category::SocialMedia, OTHER_LABEL),
                "{referrer}"
            );
        }
    }

    #[test]
    fn test_internal_redirect() {
        assert_eq!(
            classify("https://statics.teams.cdn.office.net/evergreen-assets/safelinks/1/atp-safelinks.html"),
            source(Category::Internal, INTERNAL_LABEL)
        );
    }

    #[test]
    fn test_webmail() {
        for referrer in [
            "https://outlook.live.com/mail/inbox",
            "https://mail.yahoo.com/d/folders/1",
            "https://deref-gmx.net/mail/client/x",
            "https://mandrillapp.com/track/click",
        ] {
            assert_eq!(classify(referrer), source(Category::Email, OTHER_LABEL), "{referrer}");
        }
    }

    #[test]
    fn test_category_wire_tokens() {
        let tokens: Vec<String> = [
            Category::Sea,
            Category::Seo,
            Category::SocialMedia,
            Category::Internal,
            Category::Email,
            Category::Direct,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        assert_eq!(tokens, ["sea", "seo", "socialmedia", "int", "email", "dir"]);
    }

    #[test]
    fn test_empty_referrer_is_direct() {
        assert_eq!(
            classify(""),
            Classification::Source(TrafficSource::no_referrer())
        );
    }

    #[test]
    fn test_unknown_referrer_is_no_match() {
        assert_eq!(
            classify("https://unknown-blog.example/post"),
            Classification::NoMatch
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(classify("https://WWW.FACEBOOK.COM/"), Classification::NoMatch);
    }

    #[test]
    fn test_earlier_rule_wins() {
        // Search list (priority 9) beats the social list
        assert_eq!(
            classify("https://www.ask.com/?from=reddit.com"),
            source(Category::Seo, OTHER_LABEL)
        );
        // Facebook beats webmail
        assert_eq!(
            classify("https://www.facebook.com/l.php?u=mail.google"),
            source(Category::SocialMedia, "facebook")
        );
    }

    #[test]
    fn test_classify_is_repeatable() {
        let referrer = "https://www.linkedin.com/feed/";
        assert_eq!(classify(referrer), classify(referrer));
    }

    #[test]
    fn test_rule_order() {
        let order: Vec<String> = PatternClassifier::standard()
            .sources()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            order,
            vec![
                "sea/bing",
                "sea/google",
                "seo/google",
                "seo/bing",
                "seo/ecosia",
                "seo/duckduckgo",
                "seo/webde",
                "seo/yahoo",
                "seo/other",
                "socialmedia/facebook",
                "socialmedia/instagram",
                "socialmedia/youtube",
                "socialmedia/linkedin",
                "socialmedia/xing",
                "socialmedia/twitter",
                "socialmedia/other",
                "int/auto_tag",
                "email/other",
                "dir/no-referrer",
            ]
        );
    }

    #[test]
    fn test_extra_internal_markers() {
        let classifier =
            PatternClassifier::with_internal_markers(&["crm.example.com", "  "][..]);
        assert_eq!(
            classifier.classify("https://crm.example.com/lead/42"),
            source(Category::Internal, INTERNAL_LABEL)
        );
        // Blank marker must not turn every referrer into an internal one
        assert_eq!(
            classifier.classify("https://unknown-blog.example/post"),
            Classification::NoMatch
        );
        // Earlier rules still take precedence over the widened internal rule
        assert_eq!(
            classifier.classify("https://www.facebook.com/?r=crm.example.com"),
            source(Category::SocialMedia, "facebook")
        );
    }
}
