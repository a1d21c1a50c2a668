//! Collection queries.

use crate::document::StoredDocument;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Order a query by a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one collection.
///
/// With `order_by` set, documents lacking that field are excluded from the
/// result. `limit` applies after ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    /// Query everything, in store order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the query over an in-memory set of documents.
    ///
    /// Used by the local backends; the remote backend delegates to the
    /// server.
    pub fn apply(&self, mut documents: Vec<StoredDocument>) -> Vec<StoredDocument> {
        if let Some(order) = &self.order_by {
            documents.retain(|d| d.document.get(&order.field).is_some());
            documents.sort_by(|a, b| {
                // Both present after the retain above.
                let (Some(av), Some(bv)) = (
                    a.document.get(&order.field),
                    b.document.get(&order.field),
                ) else {
                    return std::cmp::Ordering::Equal;
                };
                let ord = av.compare(bv).then_with(|| a.id.cmp(&b.id));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }

        documents
    }
}
