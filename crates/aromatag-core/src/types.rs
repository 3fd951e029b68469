//! Classification data model: closed category enums, content items, results.

use serde::{Deserialize, Serialize};

/// Which persisted collection a content item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Review,
    BlogComment,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Review => "review",
            Source::BlogComment => "blog_comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "review" => Some(Source::Review),
            "blog_comment" => Some(Source::BlogComment),
            _ => None,
        }
    }
}

/// Lifecycle state of a content item.
///
/// `Classifying` is a transient in-run marker; a stale `Classifying` row
/// (claim older than the configured timeout) is treated as retry-eligible
/// by the next run's selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagState {
    Untagged,
    Classifying,
    Tagged,
    Failed,
}

impl TagState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagState::Untagged => "untagged",
            TagState::Classifying => "classifying",
            TagState::Tagged => "tagged",
            TagState::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "untagged" => Some(TagState::Untagged),
            "classifying" => Some(TagState::Classifying),
            "tagged" => Some(TagState::Tagged),
            "failed" => Some(TagState::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

/// Inferred purpose behind a piece of user content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Interest,
    Inquiry,
    ExperienceReport,
    PurchaseIntent,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Interest,
        Intent::Inquiry,
        Intent::ExperienceReport,
        Intent::PurchaseIntent,
    ];

    /// Tie-break precedence: interest < inquiry < experience-report <
    /// purchase-intent. The highest-precedence category wins a hit-count tie.
    pub fn precedence(&self) -> u8 {
        match self {
            Intent::Interest => 0,
            Intent::Inquiry => 1,
            Intent::ExperienceReport => 2,
            Intent::PurchaseIntent => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Interest => "interest",
            Intent::Inquiry => "inquiry",
            Intent::ExperienceReport => "experience_report",
            Intent::PurchaseIntent => "purchase_intent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interest" => Some(Intent::Interest),
            "inquiry" => Some(Intent::Inquiry),
            "experience_report" => Some(Intent::ExperienceReport),
            "purchase_intent" => Some(Intent::PurchaseIntent),
            _ => None,
        }
    }
}

impl Default for Intent {
    /// Zero lexicon hits classify as browsing interest.
    fn default() -> Self {
        Intent::Interest
    }
}

/// Customer segment: individual vs business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "B2C")]
    B2c,
    #[serde(rename = "B2B")]
    B2b,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::B2c => "B2C",
            Segment::B2b => "B2B",
            Segment::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "B2C" => Some(Segment::B2c),
            "B2B" => Some(Segment::B2b),
            "unknown" => Some(Segment::Unknown),
            _ => None,
        }
    }
}

/// Fixed symptom taxonomy the storefront's products address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomTag {
    Insomnia,
    Depression,
    Anxiety,
    Stress,
}

impl SymptomTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymptomTag::Insomnia => "insomnia",
            SymptomTag::Depression => "depression",
            SymptomTag::Anxiety => "anxiety",
            SymptomTag::Stress => "stress",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insomnia" => Some(SymptomTag::Insomnia),
            "depression" => Some(SymptomTag::Depression),
            "anxiety" => Some(SymptomTag::Anxiety),
            "stress" => Some(SymptomTag::Stress),
            _ => None,
        }
    }
}

/// Purchase blockers surfaced in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainPoint {
    PriceConcern,
    ShippingConcern,
    EffectivenessDoubt,
}

impl PainPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            PainPoint::PriceConcern => "price_concern",
            PainPoint::ShippingConcern => "shipping_concern",
            PainPoint::EffectivenessDoubt => "effectiveness_doubt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "price_concern" => Some(PainPoint::PriceConcern),
            "shipping_concern" => Some(PainPoint::ShippingConcern),
            "effectiveness_doubt" => Some(PainPoint::EffectivenessDoubt),
            _ => None,
        }
    }
}

/// Predicted follow-up for outreach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    LikelyPurchase,
    PriceSensitive,
    NeedsConsultation,
    NeedsMoreInfo,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAction::LikelyPurchase => "likely_purchase",
            NextAction::PriceSensitive => "price_sensitive",
            NextAction::NeedsConsultation => "needs_consultation",
            NextAction::NeedsMoreInfo => "needs_more_info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "likely_purchase" => Some(NextAction::LikelyPurchase),
            "price_sensitive" => Some(NextAction::PriceSensitive),
            "needs_consultation" => Some(NextAction::NeedsConsultation),
            "needs_more_info" => Some(NextAction::NeedsMoreInfo),
            _ => None,
        }
    }
}

/// A review or imported blog comment, unified for classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub source: Source,
    /// Opaque identifier, unique within its source collection.
    pub id: String,
    /// Raw body. Empty/whitespace-only text is a validation failure.
    pub text: String,
    /// Link to a known user; absent for anonymous content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_user_id: Option<i64>,
    pub tag_state: TagState,
    /// Lexicon version used to tag this item; null until tagged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruleset_version: Option<String>,
}

/// Derived labels for one content item.
///
/// An item is `Tagged` iff it carries one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub sentiment: Sentiment,
    /// Signed magnitude in [-1.0, 1.0]; 0.0 for neutral.
    pub sentiment_score: f64,
    pub intent: Intent,
    /// Deduplicated, most-significant first, capped at top 10.
    pub keywords: Vec<String>,
    pub inferred_segment: Segment,
    /// Order-preserving, deduplicated subset of the symptom taxonomy.
    pub matched_symptom_tags: Vec<SymptomTag>,
    /// Order-preserving, deduplicated purchase blockers.
    pub pain_points: Vec<PainPoint>,
}

/// Outreach prediction derived from a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadPrediction {
    pub next_action: NextAction,
    pub conversion_probability: f64,
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            TagState::Untagged,
            TagState::Classifying,
            TagState::Tagged,
            TagState::Failed,
        ] {
            assert_eq!(TagState::parse(state.as_str()), Some(state));
        }
        assert_eq!(TagState::parse("done"), None);
    }

    #[test]
    fn test_segment_db_form() {
        assert_eq!(Segment::B2b.as_str(), "B2B");
        assert_eq!(Segment::parse("B2C"), Some(Segment::B2c));
        assert_eq!(Segment::parse("b2c"), None);
    }

    #[test]
    fn test_intent_precedence_order() {
        assert!(Intent::PurchaseIntent.precedence() > Intent::ExperienceReport.precedence());
        assert!(Intent::ExperienceReport.precedence() > Intent::Inquiry.precedence());
        assert!(Intent::Inquiry.precedence() > Intent::Interest.precedence());
        assert_eq!(Intent::default(), Intent::Interest);
    }

    #[test]
    fn test_serde_wire_forms() {
        let json = serde_json::to_string(&Segment::B2c).unwrap();
        assert_eq!(json, "\"B2C\"");
        let json = serde_json::to_string(&Intent::PurchaseIntent).unwrap();
        assert_eq!(json, "\"purchase_intent\"");
        let json = serde_json::to_string(&SymptomTag::Insomnia).unwrap();
        assert_eq!(json, "\"insomnia\"");
    }
}
