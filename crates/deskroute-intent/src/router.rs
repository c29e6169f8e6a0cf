use std::collections::BTreeMap;
use tracing::{debug, warn};

use deskroute_core::config::RoutingSettings;
use deskroute_core::traits::IntentClassifier;
use deskroute_core::types::{DecisionSource, Domain, DomainMatch, Intent, IntentDecision};

use crate::keywords::{keyword_groups, KeywordGroup};

/// Keyword-counting router with an optional model classifier.
///
/// The classifier can only pick the primary domain among the domains the
/// keywords already matched; it never adds or removes a domain.
pub struct IntentRouter {
    groups: BTreeMap<Domain, KeywordGroup>,
    classifier: Option<Box<dyn IntentClassifier>>,
}

impl IntentRouter {
    /// A later group for the same domain replaces the earlier one.
    pub fn new<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = KeywordGroup>,
    {
        let groups = groups.into_iter().map(|g| (g.domain(), g)).collect();
        Self { groups, classifier: None }
    }

    pub fn from_settings(settings: &RoutingSettings) -> Self { Self::new(keyword_groups(settings)) }

    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn has_classifier(&self) -> bool { self.classifier.is_some() }

    pub fn groups(&self) -> impl Iterator<Item = &KeywordGroup> { self.groups.values() }

    /// Matched domains, most triggers first; ties keep domain declaration order.
    pub fn keyword_matches(&self, query: &str) -> Vec<DomainMatch> {
        let lowered = query.to_lowercase();
        let mut matched: Vec<DomainMatch> = self
            .groups
            .values()
            .map(|g| DomainMatch { domain: g.domain(), triggers: g.matches(&lowered) })
            .filter(|m| m.count() > 0)
            .collect();
        // stable: equal counts stay in BTreeMap (declaration) order
        matched.sort_by(|a, b| b.count().cmp(&a.count()));
        matched
    }

    pub fn classify(&self, query: &str) -> IntentDecision {
        let matched = self.keyword_matches(query);
        let Some(first) = matched.first() else {
            debug!(query, "no keyword group matched");
            return IntentDecision::unclassified();
        };

        let mut primary = first.domain;
        let mut source = DecisionSource::Keywords;
        if let Some(classifier) = &self.classifier {
            match classifier.classify(query) {
                Ok(Some(label)) if matched.iter().any(|m| m.domain == label) => {
                    primary = label;
                    source = DecisionSource::Model;
                }
                Ok(Some(label)) => debug!(label = %label, "classifier label has no keyword evidence; ignored"),
                Ok(None) => debug!("classifier returned no label"),
                Err(e) => warn!("intent classifier failed ({}); using keyword evidence", e),
            }
        }

        let is_multi_domain = matched.len() > 1;
        debug!(
            primary = %primary,
            matched = ?matched.iter().map(|m| (m.domain.label(), m.count())).collect::<Vec<_>>(),
            is_multi_domain,
            "routed query"
        );
        IntentDecision { primary: Intent::Domain(primary), matched, is_multi_domain, source }
    }
}
