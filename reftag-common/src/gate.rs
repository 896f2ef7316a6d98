//! Gating policy
//!
//! Decides whether a visit is attributed at all, and how. Attribution happens
//! once, on the first event of a session; later page views never overwrite
//! it. The gate only decides; emitting is left to the caller.

use crate::environment::VisitContext;
use tracing::debug;

/// Outcome of the gate for one visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Emit nothing
    Skip,
    /// Forward the identifier from the landing URL verbatim
    UseExplicit(String),
    /// Short-circuit to `direct/no-referrer`
    Direct,
    /// Hand the referrer to the pattern classifier
    Classify,
}

/// Apply the gating rules in order
///
/// `parameter` is the identifier query parameter name (`ecid` by default).
/// Presence is a raw substring test on the undecoded query string, so
/// `?specid=1` also counts as "marker present". In that case the decoded
/// lookup finds no value and the visit is skipped without falling back to
/// the direct check; this mirrors long-standing tagging behavior and is kept
/// as is.
pub fn decide(ctx: &VisitContext, parameter: &str) -> GateDecision {
    if !ctx.is_first_event_of_session {
        debug!("Not the first event of the session, skipping attribution");
        return GateDecision::Skip;
    }

    let marker_present = ctx.query_string.contains(parameter);

    if !ctx.query_string.is_empty() && marker_present {
        return match query_value(&ctx.query_string, parameter) {
            Some(value) if !value.is_empty() && ctx.recorded_identifier.is_none() => {
                debug!("Using identifier from query parameter {}", parameter);
                GateDecision::UseExplicit(value)
            }
            _ => {
                debug!(
                    "Identifier parameter {} empty or already recorded, skipping",
                    parameter
                );
                GateDecision::Skip
            }
        };
    }

    if !ctx.has_referrer() || marker_present {
        if !ctx.has_referrer() && !marker_present {
            return GateDecision::Direct;
        }
        return GateDecision::Skip;
    }

    GateDecision::Classify
}

/// First decoded value of `name` in a form-urlencoded query string
///
/// A leading `?` is ignored. `+` decodes to a space.
pub fn query_value(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(referrer: &str, query: &str, first: bool, recorded: Option<&str>) -> VisitContext {
        VisitContext {
            referrer: referrer.to_string(),
            query_string: query.to_string(),
            is_first_event_of_session: first,
            recorded_identifier: recorded.map(str::to_string),
        }
    }

    #[test]
    fn test_not_first_view_always_skips() {
        for (referrer, query) in [
            ("", ""),
            ("https://www.google.com/", ""),
            ("", "?ecid=XYZ"),
            ("https://www.facebook.com/", "?ecid=XYZ"),
        ] {
            assert_eq!(
                decide(&ctx(referrer, query, false, None), "ecid"),
                GateDecision::Skip
            );
        }
    }

    #[test]
    fn test_explicit_identifier() {
        assert_eq!(
            decide(&ctx("", "?ecid=XYZ", true, None), "ecid"),
            GateDecision::UseExplicit("XYZ".to_string())
        );
    }

    #[test]
    fn test_explicit_identifier_already_recorded() {
        assert_eq!(
            decide(&ctx("", "?ecid=XYZ", true, Some("OLD")), "ecid"),
            GateDecision::Skip
        );
    }

    #[test]
    fn test_explicit_identifier_is_decoded() {
        assert_eq!(
            decide(
                &ctx("https://www.google.com/", "?a=1&ecid=news%2Fspring+sale", true, None),
                "ecid"
            ),
            GateDecision::UseExplicit("news/spring sale".to_string())
        );
    }

    #[test]
    fn test_empty_identifier_skips_without_direct_fallback() {
        assert_eq!(decide(&ctx("", "?ecid=", true, None), "ecid"), GateDecision::Skip);
    }

    #[test]
    fn test_marker_substring_without_parameter_skips() {
        assert_eq!(
            decide(&ctx("", "?specid=1", true, None), "ecid"),
            GateDecision::Skip
        );
        assert_eq!(
            decide(&ctx("https://www.google.com/", "?specid=1", true, None), "ecid"),
            GateDecision::Skip
        );
    }

    #[test]
    fn test_no_referrer_is_direct() {
        assert_eq!(decide(&ctx("", "", true, None), "ecid"), GateDecision::Direct);
        assert_eq!(
            decide(&ctx("", "?utm_source=x", true, None), "ecid"),
            GateDecision::Direct
        );
    }

    #[test]
    fn test_referrer_is_classified() {
        assert_eq!(
            decide(&ctx("https://search.brave.com/search?q=x", "", true, None), "ecid"),
            GateDecision::Classify
        );
    }

    #[test]
    fn test_recorded_identifier_does_not_block_classification() {
        assert_eq!(
            decide(&ctx("https://www.bing.com/", "", true, Some("OLD")), "ecid"),
            GateDecision::Classify
        );
    }

    #[test]
    fn test_query_value_first_occurrence_wins() {
        assert_eq!(query_value("ecid=a&ecid=b", "ecid"), Some("a".to_string()));
        assert_eq!(query_value("?x=1", "ecid"), None);
        assert_eq!(query_value("", "ecid"), None);
    }
}
