//! Heuristic classification of raw WHOIS responses.
//!
//! Registries phrase "this domain is free" in many ways and none of them is
//! structured. The classifier scans the response for a fixed list of loose,
//! case-insensitive phrases; any hit means the domain is available, no hit
//! means it is registered. Some phrases are truncated (`Not fo`, `No entri`)
//! and match several wordings.

use crate::types::Verdict;
use regex::{Regex, RegexBuilder};

/// Phrases whose presence in a WHOIS response means the domain is available.
///
/// Order only decides which phrase is reported for diagnostics.
pub const AVAILABILITY_PATTERNS: &[&str] = &[
    "No match",
    "NOT FOUND",
    "Not fo",
    "No Data Fou",
    "has not been regi",
    "No entri",
    "Domain not found",
    "Status: free",
    "Status: AVAILABLE",
    "No Object Found",
    "Domain Status: free",
    "The domain has not been registered",
];

lazy_static::lazy_static! {
    static ref CLASSIFIER: AvailabilityClassifier = AvailabilityClassifier::new();
}

/// Compiled availability pattern set.
pub struct AvailabilityClassifier {
    patterns: Vec<(&'static str, Regex)>,
}

impl AvailabilityClassifier {
    /// Compile the canonical pattern set.
    ///
    /// # Panics
    ///
    /// Panics if a pattern fails to compile. The patterns are static, so
    /// this can only happen if the list above is edited into invalid regex.
    fn new() -> Self {
        let patterns = AVAILABILITY_PATTERNS
            .iter()
            .map(|pattern| {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .expect("availability pattern must be a valid regex");
                (*pattern, regex)
            })
            .collect();

        Self { patterns }
    }

    /// The process-wide classifier, compiled on first use.
    pub fn shared() -> &'static AvailabilityClassifier {
        &CLASSIFIER
    }

    /// Classify a raw response, reporting the first pattern that matched.
    pub fn classify_with_match(&self, raw: &str) -> (Verdict, Option<&'static str>) {
        match self
            .patterns
            .iter()
            .find(|(_, regex)| regex.is_match(raw))
        {
            Some((pattern, _)) => (Verdict::Available, Some(*pattern)),
            None => (Verdict::Unavailable, None),
        }
    }

    /// Classify a raw response. Never returns `Verdict::Unknown`.
    pub fn classify(&self, raw: &str) -> Verdict {
        self.classify_with_match(raw).0
    }
}

/// Classify a raw WHOIS response with the shared pattern set.
///
/// Total over all inputs: an empty response is `Unavailable`.
///
/// ```rust
/// use domain_checker_lib::{classify, Verdict};
///
/// assert_eq!(classify("No match for domain \"EXAMPLE.COM\"."), Verdict::Available);
/// assert_eq!(classify("Registrar: Example Corp"), Verdict::Unavailable);
/// ```
pub fn classify(raw: &str) -> Verdict {
    AvailabilityClassifier::shared().classify(raw)
}

/// Classify a raw WHOIS response and report the matching pattern.
pub fn classify_with_match(raw: &str) -> (Verdict, Option<&'static str>) {
    AvailabilityClassifier::shared().classify_with_match(raw)
}
