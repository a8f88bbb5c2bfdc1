//! Expansion of raw inputs into item identifiers

use crate::error::ExpansionError;
use crate::source::CollectionLister;
use crate::types::{ErrorSink, ItemId};
use tracing::{debug, info};

/// Split free text into raw inputs
///
/// Inputs may be separated by any whitespace (spaces, tabs, new lines) or
/// commas. Empty pieces are dropped.
pub fn parse_inputs(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `raw` names a collection rather than a single item
pub fn is_collection_reference(raw: &str, marker: &str) -> bool {
    raw.contains(marker)
}

/// Expand raw inputs into a flat, ordered list of items
///
/// Collection references are listed through `lister` and their members are
/// appended in the order returned. A reference that cannot be listed is
/// reported to `errors` and contributes nothing. Everything else is appended
/// as a single item. Duplicates are kept.
pub async fn resolve<S: AsRef<str>>(
    raw_inputs: &[S],
    lister: &dyn CollectionLister,
    errors: &dyn ErrorSink,
    marker: &str,
) -> Vec<ItemId> {
    let mut items = Vec::new();

    for raw in raw_inputs {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            continue;
        }

        if is_collection_reference(raw, marker) {
            match lister.list_members(raw).await {
                Ok(members) => {
                    debug!(reference = raw, count = members.len(), "expanded collection");
                    items.extend(members);
                }
                Err(e) => {
                    errors.report(&ExpansionError {
                        reference: raw.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        } else {
            items.push(ItemId::from(raw));
        }
    }

    info!(
        inputs = raw_inputs.len(),
        items = items.len(),
        "resolved inputs"
    );
    items
}
