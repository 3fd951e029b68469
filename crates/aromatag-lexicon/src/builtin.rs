//! Builtin v1 ruleset.
//!
//! Terms come from the storefront's review/comment heuristics: sentiment
//! vocabulary, purchase/inquiry phrasing, B2B procurement language vs
//! B2C household language, the four-symptom care taxonomy, and the
//! recurring purchase blockers. Korean terms are stems — token matching
//! is prefix-based, so `좋았` also covers `좋았어요`.

use once_cell::sync::Lazy;

use crate::types::{Lexicon, LexiconBuilder};
use aromatag_core::{Intent, PainPoint, Segment, SymptomTag};

static BUILTIN: Lazy<Lexicon> = Lazy::new(|| {
    let mut b = LexiconBuilder::new("builtin-v1");

    // Sentiment, positive
    for (term, weight) in [
        ("좋아", 1),
        ("좋았", 2),
        ("감사", 1),
        ("만족", 2),
        ("행복", 1),
        ("최고", 2),
        ("훌륭", 2),
        ("멋진", 1),
        ("완벽", 2),
        ("추천", 1),
        ("good", 1),
        ("great", 2),
        ("love", 2),
        ("perfect", 2),
        ("excellent", 2),
        ("satisfied", 1),
        ("thanks", 1),
        ("amazing", 2),
    ] {
        b = b.sentiment(term, weight);
    }

    // Sentiment, negative
    for (term, weight) in [
        ("별로", -1),
        ("실망", -2),
        ("아쉽", -1),
        ("나쁘", -1),
        ("안좋", -1),
        ("불만", -2),
        ("싫어", -1),
        ("화나", -2),
        ("최악", -2),
        ("bad", -1),
        ("disappointed", -2),
        ("terrible", -2),
        ("worst", -2),
    ] {
        b = b.sentiment(term, weight);
    }

    // Intent: purchase signals
    for term in ["구매", "주문", "결제", "사고싶", "살게", "buy", "purchase", "order"] {
        b = b.intent(term, Intent::PurchaseIntent);
    }

    // Intent: inquiry signals
    for term in ["문의", "궁금", "질문", "어떻게", "얼마", "견적", "추천", "question"] {
        b = b.intent(term, Intent::Inquiry);
    }

    // Intent: experience-report signals
    for term in ["후기", "체험", "사용", "써보", "써봤", "효과", "좋았", "tried"] {
        b = b.intent(term, Intent::ExperienceReport);
    }

    // Intent: interest signals (product and scent mentions)
    for term in [
        "관심",
        "향기",
        "향수",
        "디퓨저",
        "캔들",
        "스프레이",
        "라벤더",
        "베르가못",
        "페퍼민트",
        "유칼립투스",
        "로즈마리",
        "에센셜오일",
        "scent",
        "aroma",
        "diffuser",
        "candle",
        "lavender",
    ] {
        b = b.intent(term, Intent::Interest);
    }

    // Segment: B2B procurement/workshop language
    for term in [
        "회사",
        "기업",
        "법인",
        "단체",
        "직원",
        "대량",
        "납품",
        "도매",
        "업체",
        "공급",
        "매장",
        "공방",
        "조향사",
        "협업",
        "워크샵",
        "company",
        "corporate",
        "wholesale",
        "bulk",
    ] {
        b = b.segment(term, Segment::B2b);
    }

    // Segment: B2C household/personal language
    for term in [
        "개인",
        "혼자",
        "집",
        "침실",
        "거실",
        "선물",
        "친구",
        "가족",
        "추천",
        "직장",
        "업무",
        "야근",
        "피곤",
        "스트레스",
        "personal",
        "home",
        "gift",
        "bedroom",
    ] {
        b = b.segment(term, Segment::B2c);
    }

    // Symptom taxonomy
    for (term, symptom) in [
        ("불면", SymptomTag::Insomnia),
        ("잠", SymptomTag::Insomnia),
        ("수면", SymptomTag::Insomnia),
        ("insomnia", SymptomTag::Insomnia),
        ("sleepless", SymptomTag::Insomnia),
        ("우울", SymptomTag::Depression),
        ("기분", SymptomTag::Depression),
        ("depression", SymptomTag::Depression),
        ("불안", SymptomTag::Anxiety),
        ("긴장", SymptomTag::Anxiety),
        ("anxiety", SymptomTag::Anxiety),
        ("스트레스", SymptomTag::Stress),
        ("stress", SymptomTag::Stress),
    ] {
        b = b.symptom(term, symptom);
    }

    // Purchase blockers
    for (term, pain) in [
        ("가격", PainPoint::PriceConcern),
        ("비싸", PainPoint::PriceConcern),
        ("price", PainPoint::PriceConcern),
        ("expensive", PainPoint::PriceConcern),
        ("배송", PainPoint::ShippingConcern),
        ("shipping", PainPoint::ShippingConcern),
        ("delivery", PainPoint::ShippingConcern),
        ("효과", PainPoint::EffectivenessDoubt),
    ] {
        b = b.pain_point(term, pain);
    }

    b.build().expect("builtin lexicon is valid")
});

impl Lexicon {
    /// The builtin v1 ruleset.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_builds() {
        let lex = Lexicon::builtin();
        assert!(lex.len() > 80);
        assert!(lex.version_tag().starts_with("builtin-v1+"));
    }

    #[test]
    fn test_builtin_merged_entries() {
        let lex = Lexicon::builtin();

        // 추천 carries sentiment, inquiry intent, and a B2C signal at once.
        let entry = lex.get("추천").unwrap();
        assert_eq!(entry.sentiment_weight, 1);
        assert_eq!(entry.intent, Some(Intent::Inquiry));
        assert_eq!(entry.segment, Some(Segment::B2c));

        // 스트레스 is both a symptom and a B2C signal.
        let entry = lex.get("스트레스").unwrap();
        assert_eq!(entry.symptom, Some(SymptomTag::Stress));
        assert_eq!(entry.segment, Some(Segment::B2c));
    }

    #[test]
    fn test_builtin_fingerprint_is_stable() {
        // Fingerprints must agree across repeated version_tag calls.
        let tag1 = Lexicon::builtin().version_tag();
        let tag2 = Lexicon::builtin().version_tag();
        assert_eq!(tag1, tag2);
    }
}
