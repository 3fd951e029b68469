//! Lexicon value types, builder, and JSON form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use aromatag_core::{Error, Intent, PainPoint, Result, Segment, SymptomTag};

/// Signals attached to a single lexicon term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Contribution to the sentiment sum; 0 for non-sentiment terms.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sentiment_weight: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom: Option<SymptomTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_point: Option<PainPoint>,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

impl LexiconEntry {
    /// A term with no signal at all has no reason to exist.
    pub fn is_empty(&self) -> bool {
        self.sentiment_weight == 0
            && self.intent.is_none()
            && self.segment.is_none()
            && self.symptom.is_none()
            && self.pain_point.is_none()
    }
}

/// An immutable, versioned term-to-signal mapping.
///
/// The persisted `ruleset_version` for tagged items is `version_tag()`,
/// which couples the declared version name with a content fingerprint.
#[derive(Debug, Clone)]
pub struct Lexicon {
    version: String,
    entries: BTreeMap<String, LexiconEntry>,
    fingerprint: String,
}

impl Lexicon {
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Hex SHA-256 over the sorted term/signal list.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// `"{version}+{fingerprint[..8]}"`, recorded on tagged items.
    pub fn version_tag(&self) -> String {
        format!("{}+{}", self.version, &self.fingerprint[..8])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact term lookup.
    pub fn get(&self, term: &str) -> Option<&LexiconEntry> {
        self.entries.get(term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    /// Match a normalized token against the lexicon.
    ///
    /// A token matches a term when it equals the term or starts with it
    /// (Korean particles agglutinate onto stems, so `좋았어요` must hit
    /// `좋았`). The longest matching term wins; each token yields at most
    /// one hit. Returns the canonical term and its entry.
    pub fn lookup_token<'a>(&'a self, token: &str) -> Option<(&'a str, &'a LexiconEntry)> {
        let mut ends: Vec<usize> = token.char_indices().skip(1).map(|(i, _)| i).collect();
        ends.push(token.len());
        for &end in ends.iter().rev() {
            if let Some((term, entry)) = self.entries.get_key_value(&token[..end]) {
                return Some((term.as_str(), entry));
            }
        }
        None
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Parse a lexicon from its JSON form, validating as `LexiconBuilder` does.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(json)?;
        let mut builder = LexiconBuilder::new(&file.version);
        for (term, entry) in file.terms {
            builder = builder.term(&term, entry);
        }
        builder.build()
    }

    /// Serialize to the JSON form accepted by `from_json_str`.
    pub fn to_json_string(&self) -> Result<String> {
        let file = LexiconFile {
            version: self.version.clone(),
            terms: self.entries.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

/// On-disk JSON shape for externally-managed rulesets.
#[derive(Debug, Serialize, Deserialize)]
struct LexiconFile {
    version: String,
    terms: BTreeMap<String, LexiconEntry>,
}

/// Accumulates terms for a new lexicon version. Repeated calls for the same
/// term merge signals into one entry.
#[derive(Debug, Default)]
pub struct LexiconBuilder {
    version: String,
    entries: BTreeMap<String, LexiconEntry>,
}

impl LexiconBuilder {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            entries: BTreeMap::new(),
        }
    }

    /// Start from an existing lexicon (version bumps re-use prior terms).
    pub fn from_lexicon(version: &str, base: &Lexicon) -> Self {
        Self {
            version: version.to_string(),
            entries: base.entries.clone(),
        }
    }

    /// Insert or merge a full entry. Terms are case-folded and trimmed.
    pub fn term(mut self, term: &str, entry: LexiconEntry) -> Self {
        let key = term.trim().to_lowercase();
        if key.is_empty() {
            return self;
        }
        let slot = self.entries.entry(key).or_default();
        if entry.sentiment_weight != 0 {
            slot.sentiment_weight = entry.sentiment_weight;
        }
        if entry.intent.is_some() {
            slot.intent = entry.intent;
        }
        if entry.segment.is_some() {
            slot.segment = entry.segment;
        }
        if entry.symptom.is_some() {
            slot.symptom = entry.symptom;
        }
        if entry.pain_point.is_some() {
            slot.pain_point = entry.pain_point;
        }
        self
    }

    pub fn sentiment(self, term: &str, weight: i32) -> Self {
        self.term(
            term,
            LexiconEntry {
                sentiment_weight: weight,
                ..Default::default()
            },
        )
    }

    pub fn intent(self, term: &str, intent: Intent) -> Self {
        self.term(
            term,
            LexiconEntry {
                intent: Some(intent),
                ..Default::default()
            },
        )
    }

    pub fn segment(self, term: &str, segment: Segment) -> Self {
        self.term(
            term,
            LexiconEntry {
                segment: Some(segment),
                ..Default::default()
            },
        )
    }

    pub fn symptom(self, term: &str, symptom: SymptomTag) -> Self {
        self.term(
            term,
            LexiconEntry {
                symptom: Some(symptom),
                ..Default::default()
            },
        )
    }

    pub fn pain_point(self, term: &str, pain_point: PainPoint) -> Self {
        self.term(
            term,
            LexiconEntry {
                pain_point: Some(pain_point),
                ..Default::default()
            },
        )
    }

    /// Validate and freeze into an immutable `Lexicon`.
    pub fn build(self) -> Result<Lexicon> {
        if self.version.trim().is_empty() {
            return Err(Error::Lexicon("version must be non-empty".into()));
        }
        if self.entries.is_empty() {
            return Err(Error::Lexicon(format!(
                "lexicon {} has no terms",
                self.version
            )));
        }
        for (term, entry) in &self.entries {
            if entry.is_empty() {
                return Err(Error::Lexicon(format!(
                    "term '{}' carries no signal",
                    term
                )));
            }
            if entry.segment == Some(Segment::Unknown) {
                return Err(Error::Lexicon(format!(
                    "term '{}' maps to segment 'unknown'",
                    term
                )));
            }
        }

        let fingerprint = Self::fingerprint(&self.version, &self.entries);
        Ok(Lexicon {
            version: self.version,
            entries: self.entries,
            fingerprint,
        })
    }

    fn fingerprint(version: &str, entries: &BTreeMap<String, LexiconEntry>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(version.as_bytes());
        for (term, entry) in entries {
            hasher.update(b"\n");
            hasher.update(term.as_bytes());
            hasher.update(
                format!(
                    "\t{}\t{:?}\t{:?}\t{:?}\t{:?}",
                    entry.sentiment_weight,
                    entry.intent,
                    entry.segment,
                    entry.symptom,
                    entry.pain_point
                )
                .as_bytes(),
            );
        }
        hex::encode(hasher.finalize())
    }
}
