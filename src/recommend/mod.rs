//! Text-similarity recommendations over the catalog store
//!
//! Catalog rows are coerced into API-shaped entries once at load time and
//! indexed by TF-IDF on `name + description`. A query returns the top entries
//! by cosine similarity; ties keep catalog order.

mod fields;
mod tfidf;

pub use fields::{parse_duration, split_test_types, yes_no};
pub use tfidf::{tokenize, TfIdfIndex};

use crate::storage::{CatalogRow, CatalogStore, StorageResult};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Largest number of results a query may ask for
pub const MAX_TOP_K: usize = 10;

/// Errors raised while answering a query
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("query must be non-empty")]
    EmptyQuery,
}

/// One recommended catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub url: String,
    pub name: String,
    /// Always `"Yes"` or `"No"`
    pub adaptive_support: String,
    pub description: String,
    /// Minutes; 0 when unknown
    pub duration: i64,
    /// Always `"Yes"` or `"No"`
    pub remote_support: String,
    pub test_type: Vec<String>,
}

impl Recommendation {
    /// Coerces a stored row into its API shape
    pub fn from_row(row: &CatalogRow) -> Self {
        let description = if row.short_description.trim().is_empty() {
            row.full_text.trim().to_string()
        } else {
            row.short_description.trim().to_string()
        };

        let test_type = if row.test_type.trim().is_empty() {
            split_test_types(&row.category)
        } else {
            split_test_types(&row.test_type)
        };

        Self {
            url: row.url.trim().to_string(),
            name: row.name.trim().to_string(),
            adaptive_support: yes_no(&row.adaptive_support).to_string(),
            description,
            duration: parse_duration(&row.duration_minutes),
            remote_support: yes_no(&row.remote_support).to_string(),
            test_type,
        }
    }

    fn document(&self) -> String {
        format!("{} {}", self.name, self.description)
    }
}

/// Clamps a requested result count into `[1, MAX_TOP_K]`
pub fn clamp_top_k(requested: Option<i64>, default: usize) -> usize {
    let wanted = requested.unwrap_or(default as i64);
    wanted.clamp(1, MAX_TOP_K as i64) as usize
}

/// In-memory ranking service built from the catalog store
#[derive(Debug, Default)]
pub struct Recommender {
    items: Vec<Recommendation>,
    index: TfIdfIndex,
}

impl Recommender {
    /// Builds the recommender from rows in catalog order
    pub fn from_rows(rows: &[CatalogRow]) -> Self {
        let items: Vec<Recommendation> = rows.iter().map(Recommendation::from_row).collect();
        let documents: Vec<String> = items.iter().map(Recommendation::document).collect();
        let index = TfIdfIndex::fit(&documents);

        debug!(
            "Indexed {} catalog items ({} terms)",
            items.len(),
            index.vocabulary_len()
        );

        Self { items, index }
    }

    /// Loads every row from the store and indexes it
    pub fn load(store: &dyn CatalogStore) -> StorageResult<Self> {
        Ok(Self::from_rows(&store.load_all()?))
    }

    /// Number of indexed catalog items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns up to `top_k` items ranked by similarity to `query`
    ///
    /// `top_k` is clamped to `[1, MAX_TOP_K]`.
    pub fn recommend(&self, query: &str, top_k: usize) -> Result<Vec<Recommendation>, RecommendError> {
        if query.trim().is_empty() {
            return Err(RecommendError::EmptyQuery);
        }
        let top_k = top_k.clamp(1, MAX_TOP_K);

        let scores = self.index.scores(query);
        let mut ranked: Vec<usize> = (0..self.items.len()).collect();
        // Stable sort: equal scores keep catalog order
        ranked.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));

        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|i| self.items[i].clone())
            .collect())
    }
}
