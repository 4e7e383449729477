//! Keyed store of filter matrices.
//!
//! Building a filter matrix costs an `O(nf^3)` decomposition, while a typical run filters many
//! spectra with the same channel layout, patches and flags. The cache keys every parameter that
//! affects the matrix and hands out shared, immutable matrices.
//!
//! A process-wide instance is available through [`FilterMatrixCache::global`]; callers that
//! want to scope caching (tests, bounded memory) create their own instance and inject it into
//! the pipeline.

use crate::data::flagged_indices;
use crate::error::Result;
use crate::filters::filter_matrix::{build_filter_matrix, FilterMatrix, FilterMatrixParams};
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key of a cached filter matrix.
///
/// Floats are compared by bit pattern, with `-0.0` folded into `0.0`. Flags only enter the key
/// through the sorted indices of the flagged channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    nf: usize,
    df: u64,
    filter_factor: u64,
    zero_flags: bool,
    discrete: bool,
    flagged: Vec<usize>,
    centers: Vec<u64>,
    widths: Vec<u64>,
    pinv_rcond: Option<u64>,
}

impl CacheKey {
    pub fn from_params(params: &FilterMatrixParams) -> Self {
        CacheKey {
            nf: params.nf,
            df: float_key(params.df),
            filter_factor: float_key(params.filter_factor),
            zero_flags: params.zero_flags,
            discrete: params.discrete,
            flagged: flagged_indices(&params.flags),
            centers: params.patches.iter().map(|p| float_key(p.center)).collect(),
            widths: params.patches.iter().map(|p| float_key(p.width)).collect(),
            pinv_rcond: params.pinv_rcond.map(float_key),
        }
    }
}

fn float_key(x: f64) -> u64 {
    if x == 0.0 {
        0.0f64.to_bits()
    } else {
        x.to_bits()
    }
}

/// One entry per key. The cell is initialized by exactly one caller; concurrent callers of the
/// same key wait for that build instead of repeating it.
type Slot = Arc<OnceCell<Arc<FilterMatrix>>>;

/// A thread-safe, unbounded store of filter matrices.
#[derive(Debug, Default)]
pub struct FilterMatrixCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    builds: AtomicUsize,
}

static GLOBAL_FILTER_CACHE: Lazy<Arc<FilterMatrixCache>> =
    Lazy::new(|| Arc::new(FilterMatrixCache::new()));

impl FilterMatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache shared by every pipeline that was not given its own.
    pub fn global() -> Arc<FilterMatrixCache> {
        Arc::clone(&GLOBAL_FILTER_CACHE)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the matrix for `params`, building and storing it on the first request.
    ///
    /// A failed build is not stored, the next request for the same key tries again.
    pub fn get_or_build(&self, params: &FilterMatrixParams) -> Result<Arc<FilterMatrix>> {
        let key = CacheKey::from_params(params);
        let slot = Arc::clone(self.slots().entry(key).or_default());

        if let Some(matrix) = slot.get() {
            log::debug!("filter matrix cache hit (nf = {})", params.nf);
            return Ok(Arc::clone(matrix));
        }

        let built = slot.get_or_try_init(|| {
            log::debug!("filter matrix cache miss (nf = {})", params.nf);
            self.builds.fetch_add(1, Relaxed);
            build_filter_matrix(params).map(Arc::new)
        });
        match built {
            Ok(matrix) => Ok(Arc::clone(matrix)),
            Err(err) => {
                self.discard_empty_slot(&CacheKey::from_params(params), &slot);
                Err(err)
            }
        }
    }

    /// Drops the map entry of a failed build, unless another caller has since filled the slot
    /// or replaced it.
    fn discard_empty_slot(&self, key: &CacheKey, slot: &Slot) {
        let mut slots = self.slots();
        if slots
            .get(key)
            .is_some_and(|stored| Arc::ptr_eq(stored, slot) && stored.get().is_none())
        {
            slots.remove(key);
        }
    }

    /// Returns the stored matrix for `params` without building it.
    pub fn get(&self, params: &FilterMatrixParams) -> Option<Arc<FilterMatrix>> {
        self.slots()
            .get(&CacheKey::from_params(params))
            .and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.slots()
            .get(key)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of times the builder was invoked by this cache.
    pub fn build_count(&self) -> usize {
        self.builds.load(Relaxed)
    }

    /// Number of stored matrices.
    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored matrix. Matrices still held by callers stay valid.
    pub fn clear(&self) {
        self.slots().clear();
    }
}
