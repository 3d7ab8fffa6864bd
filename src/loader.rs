//! Case Loader: selects the canonical opinion of a case record and applies
//! the content floor that excludes stub/placeholder opinions.
//!
//! Selection policy:
//! - zero opinions → reject;
//! - exactly one opinion → accept it unconditionally, whatever its type tag;
//! - several opinions → keep those whose type is in the ranking table and
//!   pick the minimum rank, ties resolved by first occurrence;
//! - none recognized → reject and report the observed type tags.

use crate::record::{CaseRecord, LoadedCase, Opinion};
use tracing::warn;

/// Minimum number of line-separated segments in an accepted opinion.
const MIN_SEGMENTS: usize = 5;
/// Minimum number of characters in an accepted opinion.
const MIN_CHARS: usize = 150;

/// Ordered mapping from opinion type tag to preference rank (1 = best).
///
/// Kept as data rather than branching so the tie-break rule (minimum rank,
/// first occurrence) stays easy to verify and the tag set easy to extend.
#[derive(Clone, Debug)]
pub struct OpinionRanking {
    ranks: Vec<(String, u32)>,
}

impl OpinionRanking {
    /// Builds a ranking from `(tag, rank)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (impl Into<String>, u32)>) -> Self {
        Self {
            ranks: pairs.into_iter().map(|(t, r)| (t.into(), r)).collect(),
        }
    }

    /// The default table used for bulk caselaw ingestion.
    pub fn default_table() -> Self {
        Self::new([
            ("majority", 1),
            ("unanimous", 1),
            ("on-the-merits", 1),
            ("rehearing", 2),
            ("concurrence", 3),
            ("concurring-in-part-and-dissenting-in-part", 4),
        ])
    }

    /// Rank of a type tag, or `None` when unrecognized.
    pub fn rank(&self, kind: &str) -> Option<u32> {
        self.ranks
            .iter()
            .find(|(tag, _)| tag == kind)
            .map(|(_, r)| *r)
    }
}

/// Why a case record did not produce a [`LoadedCase`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The case carries no opinions at all. Expected and frequent; silent.
    NoOpinion,
    /// Multiple opinions, none with a recognized type tag.
    NoSelectableOpinion {
        /// Citation/date label for diagnostics.
        label: String,
        /// Observed type tags, de-duplicated, in order of first occurrence.
        observed: Vec<String>,
    },
    /// The selected opinion fails the segment/length floor.
    ContentTooShort,
}

/// Outcome of evaluating one case record.
#[derive(Debug)]
pub enum LoadOutcome {
    Accepted(LoadedCase),
    Rejected(Rejection),
}

/// Citation label used in diagnostics: the first official citation, falling
/// back to the decision date when none exists.
pub fn citation_label(case: &CaseRecord) -> String {
    case.citations
        .iter()
        .find(|c| c.kind == "official")
        .map(|c| c.cite.clone())
        .unwrap_or_else(|| case.decision_date.clone())
}

/// Evaluates one record against the ranking table and the content floor.
///
/// Pure function of its input; malformed-but-parseable records are rejected,
/// never raised on.
pub fn evaluate(case: CaseRecord, ranking: &OpinionRanking) -> LoadOutcome {
    let opinions = &case.casebody.opinions;

    if opinions.is_empty() {
        return LoadOutcome::Rejected(Rejection::NoOpinion);
    }

    let selected: &Opinion = if opinions.len() == 1 {
        // A sole opinion is canonical regardless of its type tag.
        &opinions[0]
    } else {
        match select_ranked(opinions, ranking) {
            Some(op) => op,
            None => {
                let observed = observed_kinds(opinions);
                return LoadOutcome::Rejected(Rejection::NoSelectableOpinion {
                    label: citation_label(&case),
                    observed,
                });
            }
        }
    };

    let text = selected.text.clone();
    if text.lines().count() < MIN_SEGMENTS || text.chars().count() < MIN_CHARS {
        return LoadOutcome::Rejected(Rejection::ContentTooShort);
    }

    let opinion_kind = selected.kind.clone();
    LoadOutcome::Accepted(LoadedCase {
        case,
        opinion_kind,
        text,
    })
}

/// Evaluates a record and logs the only rejection worth an operator's eye.
///
/// `NoOpinion` and `ContentTooShort` are silent by design; a multi-opinion
/// case with no recognized type gets a warning with the observed tags.
pub fn load(case: CaseRecord, ranking: &OpinionRanking) -> Option<LoadedCase> {
    match evaluate(case, ranking) {
        LoadOutcome::Accepted(loaded) => Some(loaded),
        LoadOutcome::Rejected(Rejection::NoSelectableOpinion { label, observed }) => {
            warn!("{label}: no selectable opinion among {observed:?}");
            None
        }
        LoadOutcome::Rejected(_) => None,
    }
}

/// Minimum-rank opinion among recognized types; first occurrence wins ties.
fn select_ranked<'a>(opinions: &'a [Opinion], ranking: &OpinionRanking) -> Option<&'a Opinion> {
    let mut best: Option<(u32, &'a Opinion)> = None;
    for op in opinions {
        if let Some(rank) = ranking.rank(&op.kind) {
            // Strict comparison keeps the earliest opinion on equal rank.
            if best.map(|(r, _)| rank < r).unwrap_or(true) {
                best = Some((rank, op));
            }
        }
    }
    best.map(|(_, op)| op)
}

/// Observed type tags, each reported once, order of first occurrence.
fn observed_kinds(opinions: &[Opinion]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for op in opinions {
        if !out.iter().any(|k| k == &op.kind) {
            out.push(op.kind.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CaseBody, Citation, CourtMeta, Jurisdiction};

    fn long_text() -> String {
        let line = "The judgment of the court below is affirmed in full.\n";
        line.repeat(6)
    }

    fn record(opinions: Vec<Opinion>) -> CaseRecord {
        CaseRecord {
            id: 42,
            name: "People v. Example".into(),
            name_abbreviation: "People v. Ex.".into(),
            decision_date: "1987-06-01".into(),
            court: CourtMeta {
                id: 9003,
                name: "Appellate Division".into(),
                name_abbreviation: "App. Div.".into(),
            },
            citations: vec![Citation {
                kind: "official".into(),
                cite: "8 Cal. App. 5th Supp. 1".into(),
            }],
            file_name: "0001-01".into(),
            jurisdiction: Jurisdiction {
                id: 30,
                name: "Cal.".into(),
                name_long: "California".into(),
            },
            first_page: "1".into(),
            last_page: "9".into(),
            casebody: CaseBody { opinions },
        }
    }

    fn opinion(kind: &str, text: String) -> Opinion {
        Opinion {
            text,
            kind: kind.into(),
            author: Some("Doe, J.".into()),
        }
    }

    #[test]
    fn sole_opinion_accepted_regardless_of_kind() {
        let table = OpinionRanking::default_table();
        let rec = record(vec![opinion("per-curiam", long_text())]);
        match evaluate(rec, &table) {
            LoadOutcome::Accepted(l) => assert_eq!(l.opinion_kind, "per-curiam"),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn no_opinions_rejected_silently() {
        let table = OpinionRanking::default_table();
        match evaluate(record(vec![]), &table) {
            LoadOutcome::Rejected(Rejection::NoOpinion) => {}
            other => panic!("expected NoOpinion, got {other:?}"),
        }
    }

    #[test]
    fn lowest_rank_wins() {
        let table = OpinionRanking::default_table();
        let rec = record(vec![
            opinion("concurrence", long_text()),
            opinion("rehearing", long_text()),
            opinion("majority", long_text()),
        ]);
        match evaluate(rec, &table) {
            LoadOutcome::Accepted(l) => assert_eq!(l.opinion_kind, "majority"),
            other => panic!("expected majority, got {other:?}"),
        }
    }

    #[test]
    fn ranked_beats_unranked() {
        let table = OpinionRanking::default_table();
        let rec = record(vec![
            opinion("dissent", long_text()),
            opinion("majority", long_text()),
        ]);
        match evaluate(rec, &table) {
            LoadOutcome::Accepted(l) => assert_eq!(l.opinion_kind, "majority"),
            other => panic!("expected majority, got {other:?}"),
        }
    }

    #[test]
    fn equal_rank_resolved_by_first_occurrence() {
        let table = OpinionRanking::default_table();
        let mut first = opinion("unanimous", long_text());
        first.author = Some("First, J.".into());
        let mut second = opinion("majority", long_text());
        second.author = Some("Second, J.".into());
        let rec = record(vec![first, second]);
        match evaluate(rec, &table) {
            LoadOutcome::Accepted(l) => {
                assert_eq!(l.opinion_kind, "unanimous");
                assert_eq!(l.case.casebody.opinions[0].kind, "unanimous");
            }
            other => panic!("expected unanimous, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_kinds_reported_once_in_order() {
        let table = OpinionRanking::default_table();
        let rec = record(vec![
            opinion("dissent", long_text()),
            opinion("syllabus", long_text()),
            opinion("dissent", long_text()),
        ]);
        match evaluate(rec, &table) {
            LoadOutcome::Rejected(Rejection::NoSelectableOpinion { label, observed }) => {
                assert_eq!(label, "8 Cal. App. 5th Supp. 1");
                assert_eq!(observed, vec!["dissent".to_string(), "syllabus".to_string()]);
            }
            other => panic!("expected NoSelectableOpinion, got {other:?}"),
        }
    }

    #[test]
    fn label_falls_back_to_decision_date() {
        let mut rec = record(vec![]);
        rec.citations = vec![Citation {
            kind: "parallel".into(),
            cite: "2 Dall. 4".into(),
        }];
        assert_eq!(citation_label(&rec), "1987-06-01");
    }

    #[test]
    fn content_floor_boundary() {
        let table = OpinionRanking::default_table();

        // Exactly 150 chars over exactly 5 segments: accepted.
        // 4 lines of 30 chars (29 + '\n') plus a final 30-char line.
        let line = "x".repeat(29);
        let ok = format!("{line}\n{line}\n{line}\n{line}\n{}", "y".repeat(30));
        assert_eq!(ok.chars().count(), 150);
        assert_eq!(ok.lines().count(), 5);
        match evaluate(record(vec![opinion("majority", ok.clone())]), &table) {
            LoadOutcome::Accepted(_) => {}
            other => panic!("expected acceptance at the boundary, got {other:?}"),
        }

        // 149 chars: rejected.
        let short = format!("{line}\n{line}\n{line}\n{line}\n{}", "y".repeat(29));
        assert_eq!(short.chars().count(), 149);
        match evaluate(record(vec![opinion("majority", short)]), &table) {
            LoadOutcome::Rejected(Rejection::ContentTooShort) => {}
            other => panic!("expected ContentTooShort, got {other:?}"),
        }

        // 4 segments: rejected even when long enough.
        let four = format!("{}\n{}\n{}\n{}", "z".repeat(50), "z".repeat(50), "z".repeat(50), "z".repeat(50));
        match evaluate(record(vec![opinion("majority", four)]), &table) {
            LoadOutcome::Rejected(Rejection::ContentTooShort) => {}
            other => panic!("expected ContentTooShort, got {other:?}"),
        }
    }
}
