//! Raw content → canonical token stream.

use once_cell::sync::Lazy;
use regex::Regex;

use aromatag_lexicon::Lexicon;

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Characters treated as token boundaries in addition to whitespace.
const PUNCTUATION: &str = ",.;:!?()[]{}\"'`/\\~^*&%$#@+=|<>…·ㆍ";

/// Convert raw review/comment text into an ordered token sequence.
///
/// Total over arbitrary input: strips markup and control characters,
/// case-folds, splits on whitespace and punctuation, and drops tokens
/// shorter than two characters unless the token verbatim is a lexicon
/// term (protects short meaningful terms like `잠`). Empty input yields
/// an empty sequence, not an error; emptiness is the classifier's
/// "no signal" case.
pub fn normalize(raw_text: &str, lexicon: &Lexicon) -> Vec<String> {
    let stripped = MARKUP_RE.replace_all(raw_text, " ");
    let cleaned: String = stripped
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let lowered = cleaned.to_lowercase();

    lowered
        .split(|c: char| c.is_whitespace() || PUNCTUATION.contains(c))
        .filter(|t| !t.is_empty())
        .filter(|t| t.chars().count() >= 2 || lexicon.contains_term(t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aromatag_core::SymptomTag;
    use aromatag_lexicon::LexiconBuilder;

    fn lexicon() -> Lexicon {
        LexiconBuilder::new("test-1")
            .symptom("잠", SymptomTag::Insomnia)
            .sentiment("good", 1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_sequence() {
        let lex = lexicon();
        assert!(normalize("", &lex).is_empty());
        assert!(normalize("   \t\n  ", &lex).is_empty());
        assert!(normalize("!?.,;", &lex).is_empty());
    }

    #[test]
    fn test_case_fold_and_split() {
        let lex = lexicon();
        let tokens = normalize("Really GOOD product, fast delivery!", &lex);
        assert_eq!(tokens, vec!["really", "good", "product", "fast", "delivery"]);
    }

    #[test]
    fn test_markup_and_control_stripped() {
        let lex = lexicon();
        let tokens = normalize("<p>good\u{0007} scent</p>", &lex);
        assert_eq!(tokens, vec!["good", "scent"]);
    }

    #[test]
    fn test_short_tokens_dropped_unless_in_lexicon() {
        let lex = lexicon();
        // "a" is short and unknown; "잠" is short but a lexicon term.
        let tokens = normalize("a 잠 왔어요", &lex);
        assert_eq!(tokens, vec!["잠", "왔어요"]);
    }

    #[test]
    fn test_korean_punctuation_boundaries() {
        let lex = lexicon();
        let tokens = normalize("향이 좋아요, 감사합니다!", &lex);
        assert_eq!(tokens, vec!["향이", "좋아요", "감사합니다"]);
    }

    #[test]
    fn test_restartable_and_deterministic() {
        let lex = lexicon();
        let text = "Good good GOOD 잠";
        assert_eq!(normalize(text, &lex), normalize(text, &lex));
    }
}
