//! Login-time reconciliation merge.
//!
//! The merge is collection-granular, not per-entry: whichever side wins is
//! taken verbatim. A non-empty cloud collection always wins, even when the
//! local cache is newer; a non-empty local collection wins only against an
//! empty cloud and must then be uploaded once.

use mindflow_core::{Entry, sort_newest_first};

/// Which side supplied the winning collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSource {
    Cloud,
    Local,
    Neither,
}

/// Result of reconciling the cloud and local collections at login.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The winning collection, sorted newest first.
    pub entries: Vec<Entry>,
    pub source: MergeSource,
    /// Whether the winner must be uploaded to the cloud (exactly the
    /// local-wins case).
    pub needs_upload: bool,
}

/// Reconciles the two collections per the merge law:
///
/// - `merge(C ≠ [], L) = C`
/// - `merge([], L ≠ []) = L`, with one upload of `L`
/// - `merge([], []) = []`
pub fn reconcile(cloud: Vec<Entry>, local: Vec<Entry>) -> MergeOutcome {
    let (mut entries, source, needs_upload) = if !cloud.is_empty() {
        (cloud, MergeSource::Cloud, false)
    } else if !local.is_empty() {
        (local, MergeSource::Local, true)
    } else {
        (Vec::new(), MergeSource::Neither, false)
    };
    sort_newest_first(&mut entries);
    MergeOutcome {
        entries,
        source,
        needs_upload,
    }
}
