//! Lead qualification — predicts the outreach follow-up for a classification.

use aromatag_core::{
    Classification, Intent, LeadPrediction, NextAction, PainPoint, Sentiment,
};

/// Derive the next outreach action and a conversion probability.
///
/// Rules are evaluated in order: a positive purchase signal beats a price
/// objection beats an open question.
pub fn qualify(classification: &Classification) -> LeadPrediction {
    let (next_action, conversion_probability) = if classification.intent == Intent::PurchaseIntent
        && classification.sentiment == Sentiment::Positive
    {
        (NextAction::LikelyPurchase, 0.8)
    } else if classification.pain_points.contains(&PainPoint::PriceConcern) {
        (NextAction::PriceSensitive, 0.5)
    } else if classification.intent == Intent::Inquiry {
        (NextAction::NeedsConsultation, 0.6)
    } else {
        (NextAction::NeedsMoreInfo, 0.3)
    };

    let symptoms = classification
        .matched_symptom_tags
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let reasoning = format!(
        "intent={}, sentiment={}, symptoms=[{}]",
        classification.intent.as_str(),
        classification.sentiment.as_str(),
        symptoms
    );

    LeadPrediction {
        next_action,
        conversion_probability,
        reasoning,
    }
}
