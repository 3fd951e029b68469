//! Lexicon-driven classification of a token stream.

use std::collections::HashMap;

use tracing::debug;

use aromatag_core::{
    Classification, Error, Intent, PainPoint, Result, Segment, Sentiment, SymptomTag,
};
use aromatag_lexicon::Lexicon;

/// Per-hit step used to derive `sentiment_score` from the weighted sum.
const SCORE_STEP: f64 = 0.2;

/// Classify a normalized token sequence against a lexicon.
///
/// Pure function of tokens plus ruleset: repeated invocations over the
/// same inputs return identical results. Fails with `Error::Validation`
/// only for an empty token sequence; callers must treat that as a
/// content-level problem, not silently tag.
pub fn classify(tokens: &[String], lexicon: &Lexicon, keyword_cap: usize) -> Result<Classification> {
    if tokens.is_empty() {
        return Err(Error::Validation(
            "empty or whitespace-only content".into(),
        ));
    }

    let mut weight_sum: i32 = 0;
    let mut intent_hits: HashMap<Intent, usize> = HashMap::new();
    let mut b2b_hits = 0usize;
    let mut b2c_hits = 0usize;
    let mut symptoms: Vec<SymptomTag> = Vec::new();
    let mut pain_points: Vec<PainPoint> = Vec::new();

    // Keyword bookkeeping: canonical term for lexicon hits, surface token
    // for frequency-only candidates.
    let mut matched: HashMap<&str, KeywordStat> = HashMap::new();
    let mut surface: HashMap<&str, KeywordStat> = HashMap::new();

    for (idx, token) in tokens.iter().enumerate() {
        match lexicon.lookup_token(token) {
            Some((term, entry)) => {
                weight_sum += entry.sentiment_weight;
                if let Some(intent) = entry.intent {
                    *intent_hits.entry(intent).or_insert(0) += 1;
                }
                match entry.segment {
                    Some(Segment::B2b) => b2b_hits += 1,
                    Some(Segment::B2c) => b2c_hits += 1,
                    _ => {}
                }
                if let Some(symptom) = entry.symptom {
                    if !symptoms.contains(&symptom) {
                        symptoms.push(symptom);
                    }
                }
                if let Some(pain) = entry.pain_point {
                    if !pain_points.contains(&pain) {
                        pain_points.push(pain);
                    }
                }
                matched
                    .entry(term)
                    .or_insert(KeywordStat { count: 0, first: idx })
                    .count += 1;
            }
            None => {
                surface
                    .entry(token.as_str())
                    .or_insert(KeywordStat { count: 0, first: idx })
                    .count += 1;
            }
        }
    }

    let sentiment = match weight_sum {
        w if w > 0 => Sentiment::Positive,
        w if w < 0 => Sentiment::Negative,
        // Includes the all-unmatched case: zero signal is neutral, not an error.
        _ => Sentiment::Neutral,
    };
    let sentiment_score = match sentiment {
        Sentiment::Neutral => 0.0,
        _ => (f64::from(weight_sum) * SCORE_STEP).clamp(-1.0, 1.0),
    };

    let intent = resolve_intent(&intent_hits);

    let inferred_segment = if b2b_hits > b2c_hits {
        Segment::B2b
    } else if b2c_hits > b2b_hits {
        Segment::B2c
    } else {
        Segment::Unknown
    };

    let keywords = rank_keywords(&matched, &surface, keyword_cap);

    debug!(
        weight_sum,
        b2b_hits,
        b2c_hits,
        "classified {} tokens: {} lexicon terms hit",
        tokens.len(),
        matched.len()
    );

    Ok(Classification {
        sentiment,
        sentiment_score,
        intent,
        keywords,
        inferred_segment,
        matched_symptom_tags: symptoms,
        pain_points,
    })
}

struct KeywordStat {
    count: usize,
    first: usize,
}

/// Highest hit count wins; ties go to the higher-precedence category so
/// the outcome never depends on iteration order. Zero hits fall back to
/// the default intent.
fn resolve_intent(hits: &HashMap<Intent, usize>) -> Intent {
    let mut best: Option<(Intent, usize)> = None;
    for intent in Intent::ALL {
        let count = hits.get(&intent).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        best = match best {
            None => Some((intent, count)),
            Some((_, best_count)) if count > best_count => Some((intent, count)),
            Some((best_intent, best_count))
                if count == best_count && intent.precedence() > best_intent.precedence() =>
            {
                Some((intent, count))
            }
            other => other,
        };
    }
    best.map(|(intent, _)| intent).unwrap_or_default()
}

/// Lexicon-matched terms plus repeated tokens, ranked lexicon-match
/// first, then frequency descending, then first occurrence.
fn rank_keywords(
    matched: &HashMap<&str, KeywordStat>,
    surface: &HashMap<&str, KeywordStat>,
    cap: usize,
) -> Vec<String> {
    let mut candidates: Vec<(&str, bool, usize, usize)> = matched
        .iter()
        .map(|(term, stat)| (*term, true, stat.count, stat.first))
        .collect();
    for (&token, stat) in surface {
        // Frequency-only keywords need more than one occurrence, and must
        // not shadow a canonical term already in the list.
        if stat.count > 1 && !matched.contains_key(token) {
            candidates.push((token, false, stat.count, stat.first));
        }
    }

    candidates.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(b.2.cmp(&a.2))
            .then(a.3.cmp(&b.3))
    });

    candidates
        .into_iter()
        .take(cap)
        .map(|(term, _, _, _)| term.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;
    use aromatag_lexicon::LexiconBuilder;

    /// The ruleset from the worked example: 좋았 (+2, experience-report),
    /// 추천 (B2C, inquiry), 불면 (insomnia).
    fn example_lexicon() -> Lexicon {
        LexiconBuilder::new("example-1")
            .sentiment("좋았", 2)
            .intent("좋았", Intent::ExperienceReport)
            .intent("추천", Intent::Inquiry)
            .segment("추천", Segment::B2c)
            .symptom("불면", SymptomTag::Insomnia)
            .build()
            .unwrap()
    }

    #[test]
    fn test_worked_example() {
        let lex = example_lexicon();
        let tokens = normalize(
            "불면증 때문에 제품 추천 받고 싶어요, 정말 좋았어요 감사합니다",
            &lex,
        );
        let result = classify(&tokens, &lex, 10).unwrap();

        assert_eq!(result.sentiment, Sentiment::Positive);
        // experience-report and inquiry tie at one hit each; the
        // higher-precedence category wins.
        assert_eq!(result.intent, Intent::ExperienceReport);
        assert_eq!(result.matched_symptom_tags, vec![SymptomTag::Insomnia]);
        assert_eq!(result.inferred_segment, Segment::B2c);
    }

    #[test]
    fn test_empty_tokens_is_validation_error() {
        let lex = example_lexicon();
        let result = classify(&[], &lex, 10);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_all_unmatched_is_neutral_default_unknown() {
        let lex = example_lexicon();
        let tokens = normalize("the quick brown fox jumps", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();

        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.sentiment_score, 0.0);
        assert_eq!(result.intent, Intent::Interest);
        assert_eq!(result.inferred_segment, Segment::Unknown);
        assert!(result.keywords.is_empty());
        assert!(result.matched_symptom_tags.is_empty());
    }

    #[test]
    fn test_negative_sum_wins() {
        let lex = LexiconBuilder::new("t")
            .sentiment("good", 1)
            .sentiment("terrible", -2)
            .build()
            .unwrap();
        let tokens = normalize("good but terrible", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!((result.sentiment_score - (-0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_score_clamped() {
        let lex = LexiconBuilder::new("t").sentiment("love", 3).build().unwrap();
        let tokens = normalize("love love love love", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();
        assert_eq!(result.sentiment_score, 1.0);
    }

    #[test]
    fn test_keyword_ranking() {
        let lex = LexiconBuilder::new("t")
            .symptom("불면", SymptomTag::Insomnia)
            .sentiment("good", 1)
            .build()
            .unwrap();
        // "aroma" repeats (frequency candidate); 불면/good are lexicon hits;
        // "once" appears a single time and is not a keyword.
        let tokens = normalize("aroma good aroma 불면증 once", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();

        // Lexicon matches come first (good at index 1 before 불면 at 3),
        // then the repeated surface token.
        assert_eq!(result.keywords, vec!["good", "불면", "aroma"]);
    }

    #[test]
    fn test_keyword_cap_and_dedup() {
        let lex = LexiconBuilder::new("t").sentiment("good", 1).build().unwrap();
        let tokens = normalize("good good good", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();
        // Three hits on the same term collapse to one canonical keyword.
        assert_eq!(result.keywords, vec!["good"]);

        let result = classify(&tokens, &lex, 0).unwrap();
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_agglutinated_hits_share_canonical_term() {
        let lex = example_lexicon();
        let tokens = normalize("좋았어요 좋았습니다", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();
        assert_eq!(result.keywords, vec!["좋았"]);
        // Both surface forms contribute to the sum.
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert!((result.sentiment_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_segment_majority_and_tie() {
        let lex = LexiconBuilder::new("t")
            .segment("회사", Segment::B2b)
            .segment("집", Segment::B2c)
            .build()
            .unwrap();

        let tokens = normalize("회사 회사에서 집으로", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();
        assert_eq!(result.inferred_segment, Segment::B2b);

        let tokens = normalize("회사와 집", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();
        assert_eq!(result.inferred_segment, Segment::Unknown);
    }

    #[test]
    fn test_symptoms_order_preserving_dedup() {
        let lex = LexiconBuilder::new("t")
            .symptom("스트레스", SymptomTag::Stress)
            .symptom("불면", SymptomTag::Insomnia)
            .build()
            .unwrap();
        let tokens = normalize("스트레스 때문에 불면증, 스트레스가 심해요", &lex);
        let result = classify(&tokens, &lex, 10).unwrap();
        assert_eq!(
            result.matched_symptom_tags,
            vec![SymptomTag::Stress, SymptomTag::Insomnia]
        );
    }

    #[test]
    fn test_determinism() {
        let lex = Lexicon::builtin();
        let text = "불면증 때문에 디퓨저 구매하고 싶어요. 가격이 궁금합니다!";
        let tokens = normalize(text, lex);
        let first = classify(&tokens, lex, 10).unwrap();
        for _ in 0..5 {
            let tokens = normalize(text, lex);
            assert_eq!(classify(&tokens, lex, 10).unwrap(), first);
        }
    }
}
