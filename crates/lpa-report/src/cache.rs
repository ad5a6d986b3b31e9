//! Rendered PDF cache using moka
//!
//! Entries are keyed by the Blake3 hash of the render input, so a parent
//! who asks for the same report twice gets the bytes rendered the first
//! time.

use crate::content::ContentLibrary;
use crate::error::ReportError;
use crate::layout::{ReportInput, ReportLayout};
use crate::pdf::PdfWriter;
use moka::future::Cache;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Blake3 hash of a render input
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderKey([u8; 32]);

impl RenderKey {
    /// Hash a render input
    ///
    /// # Errors
    /// Returns [`ReportError::Encode`] if the input cannot be serialized
    pub fn of(input: &ReportInput) -> Result<Self, ReportError> {
        let bytes = serde_json::to_vec(input)?;
        Ok(Self(*blake3::hash(&bytes).as_bytes()))
    }

    /// Raw hash bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderKey(")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Lay out and serialize a report without caching
#[must_use]
pub fn render_pdf(input: &ReportInput, library: &ContentLibrary) -> Vec<u8> {
    let layout = ReportLayout::build(input, library);
    PdfWriter::new()
        .with_title(format!("{}'s Learning Profile", input.display_name()))
        .write(&layout)
}

/// Cache of rendered PDFs
#[derive(Debug, Clone)]
pub struct RenderCache {
    inner: Cache<RenderKey, Arc<Vec<u8>>>,
}

impl RenderCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Rendered PDF for an input, rendering on a miss
    ///
    /// # Errors
    /// Returns [`ReportError::Encode`] if the input cannot be hashed
    pub async fn pdf(
        &self,
        input: &ReportInput,
        library: &ContentLibrary,
    ) -> Result<Arc<Vec<u8>>, ReportError> {
        let key = RenderKey::of(input)?;
        if let Some(cached) = self.inner.get(&key).await {
            tracing::debug!(key = ?key, "render cache hit");
            return Ok(cached);
        }

        let bytes = Arc::new(render_pdf(input, library));
        self.inner.insert(key, Arc::clone(&bytes)).await;
        tracing::debug!(key = ?key, bytes = bytes.len(), "rendered report");
        Ok(bytes)
    }

    /// Check if an input has been rendered
    ///
    /// # Errors
    /// Returns [`ReportError::Encode`] if the input cannot be hashed
    pub async fn contains(&self, input: &ReportInput) -> Result<bool, ReportError> {
        Ok(self.inner.get(&RenderKey::of(input)?).await.is_some())
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for RenderCache {
    /// Create cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn input(name: &str) -> ReportInput {
        ReportInput::new(name, "visual", NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
    }

    #[test]
    fn key_depends_on_input() {
        assert_eq!(RenderKey::of(&input("A")).unwrap(), RenderKey::of(&input("A")).unwrap());
        assert_ne!(RenderKey::of(&input("A")).unwrap(), RenderKey::of(&input("B")).unwrap());
    }

    #[tokio::test]
    async fn second_render_is_cached() {
        let cache = RenderCache::new(16);
        let library = ContentLibrary::builtin().unwrap();

        assert!(!cache.contains(&input("Ivy")).await.unwrap());
        let first = cache.pdf(&input("Ivy"), &library).await.unwrap();
        let second = cache.pdf(&input("Ivy"), &library).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.contains(&input("Ivy")).await.unwrap());
    }

    #[tokio::test]
    async fn different_inputs_render_separately() {
        let cache = RenderCache::default();
        let library = ContentLibrary::builtin().unwrap();
        let a = cache.pdf(&input("Ivy"), &library).await.unwrap();
        let b = cache.pdf(&input("Max"), &library).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a, b);
    }
}
