use serde::Serialize;

use crate::catalog::Catalog;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub blockage_id: String,
    pub blockage_label: String,
    pub goal: String,
    pub matched_keywords: Vec<String>,
}

/// Maps what the user wrote to the blockage whose keywords it mentions most.
///
/// Keywords match as case-insensitive substrings. Ties keep dataset order.
pub fn diagnose(catalog: &Catalog, message: &str) -> Option<Diagnosis> {
    let text = message.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    let mut best: Option<(usize, Vec<String>)> = None;
    for (index, blockage) in catalog.blockages().iter().enumerate() {
        let matched: Vec<String> = blockage
            .keywords
            .iter()
            .filter(|k| !k.trim().is_empty() && text.contains(&k.to_lowercase()))
            .cloned()
            .collect();
        if matched.is_empty() {
            continue;
        }
        if best.as_ref().map_or(true, |(_, m)| matched.len() > m.len()) {
            best = Some((index, matched));
        }
    }

    let (index, matched_keywords) = best?;
    let blockage = &catalog.blockages()[index];
    tracing::debug!(blockage = %blockage.id, hits = matched_keywords.len(), "diagnosed");

    Some(Diagnosis {
        blockage_id: blockage.id.clone(),
        blockage_label: blockage.label.clone(),
        goal: blockage.goal.clone(),
        matched_keywords,
    })
}
