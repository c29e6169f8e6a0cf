//! deskroute-intent
//!
//! Keyword groups per domain and the router that turns a raw query into an
//! `IntentDecision`, optionally refined by a model-based classifier.
pub mod keywords;
pub mod router;

pub use keywords::{default_keyword_groups, keyword_groups, KeywordGroup};
pub use router::IntentRouter;
