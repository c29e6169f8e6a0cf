use deskroute_core::config::RoutingSettings;
use deskroute_core::types::Domain;

const HR_TRIGGERS: &[&str] = &[
    "leave", "vacation", "benefits", "onboarding", "performance", "hr", "pto", "time off", "holiday", "parental",
    "hiring", "promotion",
];

const TECH_TRIGGERS: &[&str] = &[
    "password", "reset", "system", "access", "network", "software", "vpn", "laptop", "login", "wifi",
];

const FINANCE_TRIGGERS: &[&str] = &[
    "expense", "expense report", "invoice", "budget", "payment", "reimbursement", "finance", "payroll",
    "purchase order",
];

/// Trigger terms and phrases for one domain.
///
/// Triggers are lowercased and matched as substrings of the lowercased query,
/// so `"expense report"` matches as a phrase and `"hr"` also matches inside
/// `"three"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    domain: Domain,
    triggers: Vec<String>,
}

impl KeywordGroup {
    /// Blank and repeated triggers are dropped; first occurrence order is kept.
    pub fn new<I, S>(domain: Domain, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for trigger in triggers {
            let t = trigger.as_ref().trim().to_lowercase();
            if !t.is_empty() && !cleaned.contains(&t) { cleaned.push(t); }
        }
        Self { domain, triggers: cleaned }
    }

    pub fn domain(&self) -> Domain { self.domain }

    pub fn triggers(&self) -> &[String] { &self.triggers }

    /// Distinct triggers present in `lowered_query`, in group order.
    pub fn matches(&self, lowered_query: &str) -> Vec<String> {
        self.triggers.iter().filter(|t| lowered_query.contains(t.as_str())).cloned().collect()
    }
}

/// Built-in groups in domain declaration order.
pub fn default_keyword_groups() -> Vec<KeywordGroup> {
    Domain::ALL
        .iter()
        .map(|&domain| {
            let triggers = match domain {
                Domain::Hr => HR_TRIGGERS,
                Domain::Tech => TECH_TRIGGERS,
                Domain::Finance => FINANCE_TRIGGERS,
            };
            KeywordGroup::new(domain, triggers)
        })
        .collect()
}

/// Built-in groups with any domain listed under `routing.keywords` replaced.
pub fn keyword_groups(settings: &RoutingSettings) -> Vec<KeywordGroup> {
    default_keyword_groups()
        .into_iter()
        .map(|group| match settings.keywords.get(&group.domain()) {
            Some(custom) => KeywordGroup::new(group.domain(), custom),
            None => group,
        })
        .collect()
}
