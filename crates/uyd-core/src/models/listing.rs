use serde::{Deserialize, Serialize};

/// A list response. Endpoints answer either with a bare JSON array or with a
/// paginated object carrying `results`; both decode into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ListingRepr<T>")]
pub struct Listing<T> {
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingRepr<T> {
    Bare(Vec<T>),
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl<T> From<ListingRepr<T>> for Listing<T> {
    fn from(repr: ListingRepr<T>) -> Self {
        match repr {
            ListingRepr::Bare(results) => Listing { results, count: None },
            ListingRepr::Paginated { results, count } => Listing { results, count },
        }
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            count: None,
        }
    }
}

impl<T> Listing<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.results
    }
}
