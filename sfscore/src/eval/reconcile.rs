//! Place-ID reconciliation between system and reference.
//!
//! The reference may record that several knowledge-base IDs are equally
//! correct for one place by joining them with `|` (`11186696|384272`). A
//! system that submits any one member must be scored as if it had
//! submitted the joined string, otherwise exact matching downstream would
//! count a valid alternative as a miss.

use std::collections::HashMap;

use sfscore_core::{ReferenceFrame, SystemFrame};

/// Rewrite each system `place_kb_id` that is a member of an aliased reference
/// ID for the same document and type.
///
/// The replacement is the first distinct aliased ID recorded for that
/// document and type. IDs with no aliased counterpart are left as they are.
/// Applying the correction twice gives the same table as applying it once.
#[must_use]
pub fn correct_kb_ids(system: &[SystemFrame], reference: &[ReferenceFrame]) -> Vec<SystemFrame> {
    // (doc, type) -> frames with distinct aliased IDs, in reference order
    let mut aliased: HashMap<(&str, &str), Vec<&ReferenceFrame>> = HashMap::new();
    for r in reference.iter().filter(|r| r.is_aliased()) {
        let frames = aliased
            .entry((r.doc_id.as_str(), r.situation_type.as_str()))
            .or_default();
        if !frames.iter().any(|f| f.kb_id == r.kb_id) {
            frames.push(r);
        }
    }

    let mut corrected = 0usize;
    let out = system
        .iter()
        .map(|s| {
            let mut s = s.clone();
            let key = (s.document_id.as_str(), s.situation_type.as_str());
            if let Some(frames) = aliased.get(&key) {
                let member = frames
                    .iter()
                    .any(|r| r.kb_aliases().any(|id| id == s.place_kb_id));
                let first = frames[0].kb_id.as_str();
                if member && s.place_kb_id != first {
                    s.place_kb_id = first.to_string();
                    corrected += 1;
                }
            }
            s
        })
        .collect();
    if corrected > 0 {
        log::info!("corrected {} aliased place IDs", corrected);
    }
    out
}

/// True for an empty place ID or a `NIL` placeholder.
#[must_use]
pub fn is_nil_id(id: &str) -> bool {
    id.is_empty() || id.starts_with("NIL")
}

/// Remove frames whose place is unlinked from both tables.
pub fn exclude_nil(reference: &mut Vec<ReferenceFrame>, system: &mut Vec<SystemFrame>) {
    let (r0, s0) = (reference.len(), system.len());
    reference.retain(|r| !is_nil_id(&r.kb_id));
    system.retain(|s| !is_nil_id(&s.place_kb_id));
    log::info!(
        "excluded NIL places: {} reference and {} system frames dropped",
        r0 - reference.len(),
        s0 - system.len()
    );
}
