use serde::{Deserialize, Serialize};

/// Read-only copy of rows fetched from the gateway for one calculator session.
///
/// Until the fetch completes the snapshot is empty, so every lookup simply
/// finds nothing and the dependent total stays at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot<T> {
    rows: Vec<T>,
    loaded: bool,
}

impl<T> Default for CatalogSnapshot<T> {
    fn default() -> Self {
        Self::unloaded()
    }
}

impl<T> CatalogSnapshot<T> {
    pub fn unloaded() -> Self {
        Self { rows: Vec::new(), loaded: false }
    }

    pub fn loaded(rows: Vec<T>) -> Self {
        Self { rows, loaded: true }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row in fetch order that satisfies `predicate`.
    pub fn first_match<P>(&self, predicate: P) -> Option<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows.iter().find(|row| predicate(row))
    }

    pub fn filter<P>(&self, predicate: P) -> Vec<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows.iter().filter(|row| predicate(row)).collect()
    }
}
