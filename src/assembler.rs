//! Batch Assembler: per-archive de-duplication against the store.
//!
//! "Already stored" is re-derived from the store itself on every run, which
//! makes re-running after a crash safe without any local checkpoint.

use crate::errors::IngestError;
use crate::index::CaseIndex;
use crate::record::LoadedCase;
use std::collections::HashSet;
use tracing::debug;

/// Keeps only cases whose id is not already present, preserving input order.
pub fn select_new(cases: Vec<LoadedCase>, existing: &HashSet<u64>) -> Vec<LoadedCase> {
    cases
        .into_iter()
        .filter(|c| !existing.contains(&c.case.id))
        .collect()
}

/// Queries the store once for the whole archive and drops duplicates.
///
/// Returns the surviving cases and the number skipped as already stored.
pub async fn dedup_against_store(
    index: &dyn CaseIndex,
    cases: Vec<LoadedCase>,
) -> Result<(Vec<LoadedCase>, usize), IngestError> {
    if cases.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let ids: Vec<u64> = cases.iter().map(|c| c.case.id).collect();
    let existing = index.existing_ids(&ids).await?;

    let before = cases.len();
    let fresh = select_new(cases, &existing);
    let skipped = before - fresh.len();
    debug!("{skipped} of {before} cases already stored");
    Ok((fresh, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CaseBody, CaseRecord, CourtMeta, Jurisdiction, LoadedCase};

    fn loaded(id: u64) -> LoadedCase {
        LoadedCase {
            case: CaseRecord {
                id,
                name: String::new(),
                name_abbreviation: String::new(),
                decision_date: String::new(),
                court: CourtMeta {
                    id: 1,
                    name: "Court".into(),
                    name_abbreviation: String::new(),
                },
                citations: vec![],
                file_name: String::new(),
                jurisdiction: Jurisdiction {
                    id: 2,
                    name: "J".into(),
                    name_long: String::new(),
                },
                first_page: String::new(),
                last_page: String::new(),
                casebody: CaseBody::default(),
            },
            opinion_kind: "majority".into(),
            text: "text".into(),
        }
    }

    #[test]
    fn drops_stored_ids_and_keeps_order() {
        let cases = vec![loaded(1), loaded(2), loaded(3), loaded(4)];
        let existing: HashSet<u64> = [2, 4].into_iter().collect();
        let fresh = select_new(cases, &existing);
        let ids: Vec<u64> = fresh.iter().map(|c| c.case.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn all_stored_yields_empty() {
        let cases = vec![loaded(1), loaded(2)];
        let existing: HashSet<u64> = [1, 2].into_iter().collect();
        assert!(select_new(cases, &existing).is_empty());
    }

    #[test]
    fn nothing_stored_keeps_everything() {
        let cases = vec![loaded(5), loaded(6)];
        let fresh = select_new(cases, &HashSet::new());
        assert_eq!(fresh.len(), 2);
    }
}
