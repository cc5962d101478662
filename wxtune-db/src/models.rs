//! Query result models.

use serde::Serialize;

/// Document count of one collection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionSummary {
    pub collection: String,
    pub documents: i64,
}
