//! Built-in referrer knowledge base
//!
//! Host markers matched by plain substring containment. Order inside each
//! list is irrelevant (any hit selects the list's rule); order *between*
//! lists is fixed by the rule table in [`crate::classifier`].

/// Google Click ID query parameter (Google Ads)
pub const GOOGLE_CLICK_ID: &str = "gclid";

/// Microsoft Click ID query parameter (Microsoft Advertising)
pub const MICROSOFT_CLICK_ID: &str = "msclkid";

/// Google domain shape: `google` after `/`, `www` or `com`, then one or two
/// short domain segments (covers mirrors such as `google.co.uk`).
///
/// Word characters are ASCII-only to match browser regex semantics.
pub const GOOGLE_DOMAIN_SHAPE: &str =
    r"(/|www|com)\.?google[A-Za-z0-9_]*(\.[A-Za-z0-9_]{2,3})(\.[A-Za-z0-9_]{2,3})?";

/// GMX short search host, anchored at the start of the referrer
pub const GMX_SHORT_SEARCH: &str = r"^https://s\.gmx\.com";

/// Organic search engines with their own label, checked in this order
pub const NAMED_SEARCH_ENGINES: &[(&str, &str)] = &[
    ("bing", "bing.com"),
    ("ecosia", "ecosia"),
    ("duckduckgo", "duckduckgo"),
    ("webde", "suche.web.de"),
    ("yahoo", "search.yahoo.com"),
];

/// Other known search engines, reported as `seo/other`
pub const OTHER_SEARCH_ENGINES: &[&str] = &[
    "suche.t-online.de",
    "myway.com",
    "askjeeves.net",
    "seznam.cz",
    "search.mywebsearch.com",
    "centrum.cz",
    "ask.com",
    "avg.com",
    "suche.gmx.net",
    "search.avira.com",
    "metager.de",
    "suche.1und1.de",
    "results.searchlock.com",
    "cse.yukoono.mobi",
    "cse.intercontent.de/vf.php",
    "yandex.ru",
    "qwant.com",
    "searchencrypt.com",
    "search.becovi.com",
    "startpage.com",
    "isearch.start.fyi",
    "cse.start.fyi",
    "search.brave.com",
    "kadaza.de",
    "search.gmx.com",
];

/// Social platforms with their own label, checked in this order
pub const NAMED_SOCIAL_PLATFORMS: &[(&str, &[&str])] = &[
    ("facebook", &["facebook.com"]),
    ("instagram", &["instagram.com"]),
    ("youtube", &["youtube.com"]),
    ("linkedin", &["linkedin.com"]),
    ("xing", &["xing.com"]),
    ("twitter", &["twitter.com", "https://x.com", "https://t.co"]),
];

/// Other social and community sites, reported as `socialmedia/other`
pub const OTHER_SOCIAL_PLATFORMS: &[&str] = &[
    "wordpress",
    "reddit.com",
    "vk.com",
    "pinterest.com",
    "mobile.ok.ru",
    "ok.ru",
    "blogspot.com",
    "yelp.com",
    "glassdoor.com",
];

/// Internal redirect hosts (Microsoft Teams chat link wrapper)
pub const INTERNAL_REDIRECTS: &[&str] = &["statics.teams.cdn.office.net"];

/// Webmail front-ends and their link dereferrers
pub const WEBMAIL_PROVIDERS: &[&str] = &[
    "outlook.live",
    "mail.yahoo",
    "mail.google",
    "deref-web-02.de/mail",
    "email.seznam",
    "my.mail.de",
    "webmail.unity-mail.de",
    "webmail.freenet",
    "email.t-online",
    "kabelmail.de",
    "mail.centrum",
    "webmail.osnanet",
    "deref-gmx.net",
    "mail.vodafone",
    "mandrillapp.com",
    "deref-web",
];
