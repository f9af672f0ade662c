//! `MultiPeriodGen` — one variate generator per period, with optional
//! per-period caches and a unit-conversion pipeline.
//!
//! # Draw pipeline
//!
//! ```text
//! p   = pce.current_period()
//! raw = cache[p] replay  |  gens[p].next_double()  (appended to cache[p])
//! out = raw · factor(source_unit → target_unit) · mult
//! ```
//!
//! Caches hold raw draws, so changing the units or the multiplier between
//! runs does not invalidate them.  Each period has its own cache: replaying
//! period 3 never yields a value drawn from period 5's distribution.

use std::fmt;
use std::rc::Rc;

use cc_core::TimeUnit;
use cc_period::PeriodChangeEvent;
use tracing::{debug, trace};

use crate::{Contact, ValueError, ValueGenerator, ValueResult, VariateGen};

#[derive(Clone, Debug, Default, PartialEq)]
struct PeriodCache {
    values: Vec<f64>,
    index:  usize,
}

/// Draws from the generator of the current period.
pub struct MultiPeriodGen {
    pce:         Rc<PeriodChangeEvent>,
    gens:        Vec<Box<dyn VariateGen>>,
    caches:      Option<Vec<PeriodCache>>,
    source_unit: Option<TimeUnit>,
    target_unit: Option<TimeUnit>,
    mult:        f64,
}

impl MultiPeriodGen {
    /// One generator per period of `pce`, preliminary and wrap-up included.
    pub fn new(pce: Rc<PeriodChangeEvent>, gens: Vec<Box<dyn VariateGen>>) -> ValueResult<Self> {
        if gens.len() != pce.num_periods() {
            return Err(ValueError::PeriodCountMismatch {
                expected: pce.num_periods(),
                got:      gens.len(),
            });
        }
        Ok(Self {
            pce,
            gens,
            caches: None,
            source_unit: None,
            target_unit: None,
            mult: 1.0,
        })
    }

    pub fn period_change_event(&self) -> &Rc<PeriodChangeEvent> {
        &self.pce
    }

    pub fn num_periods(&self) -> usize {
        self.gens.len()
    }

    pub fn period_gen(&self, period: usize) -> &dyn VariateGen {
        &*self.gens[period]
    }

    pub fn period_gen_mut(&mut self, period: usize) -> &mut dyn VariateGen {
        &mut *self.gens[period]
    }

    // ── Conversion pipeline ───────────────────────────────────────────────

    pub fn source_unit(&self) -> Option<TimeUnit> {
        self.source_unit
    }

    pub fn target_unit(&self) -> Option<TimeUnit> {
        self.target_unit
    }

    /// Draws are converted only when both units are set.
    pub fn set_units(&mut self, source: Option<TimeUnit>, target: Option<TimeUnit>) {
        self.source_unit = source;
        self.target_unit = target;
    }

    pub fn mult(&self) -> f64 {
        self.mult
    }

    pub fn set_mult(&mut self, mult: f64) {
        self.mult = mult;
    }

    /// Overall factor applied to raw draws.
    pub fn scale(&self) -> f64 {
        TimeUnit::factor_opt(self.source_unit, self.target_unit) * self.mult
    }

    // ── Drawing ───────────────────────────────────────────────────────────

    /// Draw for the current period of the clock.
    pub fn next_double(&mut self) -> f64 {
        let p = self.pce.current_period();
        self.draw_raw(p) * self.scale()
    }

    fn draw_raw(&mut self, period: usize) -> f64 {
        let Some(caches) = self.caches.as_mut() else {
            return self.gens[period].next_double();
        };
        let cache = &mut caches[period];
        if let Some(&v) = cache.values.get(cache.index) {
            cache.index += 1;
            return v;
        }
        let v = self.gens[period].next_double();
        cache.values.push(v);
        cache.index += 1;
        trace!(period, len = cache.values.len(), "cache extended");
        v
    }

    /// Mean of the values drawn in `period`, from the distribution moments
    /// and the conversion pipeline.
    pub fn mean(&self, period: usize) -> f64 {
        self.gens[period].mean() * self.scale()
    }

    /// Variance of the values drawn in `period`.
    pub fn variance(&self, period: usize) -> f64 {
        let f = self.scale();
        self.gens[period].variance() * f * f
    }

    // ── Streams ───────────────────────────────────────────────────────────

    /// Rewind the stream of every period to its first substream.  Caches are
    /// left alone; a cached value is replayed instead of drawn.
    pub fn reset_start_stream(&mut self) {
        self.gens.iter_mut().for_each(|g| g.reset_start_stream());
    }

    pub fn reset_start_substream(&mut self) {
        self.gens.iter_mut().for_each(|g| g.reset_start_substream());
    }

    /// Move the stream of every period to its next substream.
    pub fn reset_next_substream(&mut self) {
        self.gens.iter_mut().for_each(|g| g.reset_next_substream());
        trace!(periods = self.gens.len(), "next substream");
    }

    // ── Caches ────────────────────────────────────────────────────────────

    pub fn is_caching(&self) -> bool {
        self.caches.is_some()
    }

    /// Turning caching off discards every cache.
    pub fn set_caching(&mut self, caching: bool) {
        match (caching, self.caches.is_some()) {
            (true, false) => self.caches = Some(vec![PeriodCache::default(); self.gens.len()]),
            (false, true) => self.caches = None,
            _ => return,
        }
        debug!(caching, "multi-period generator caching changed");
    }

    /// Rewind every cache so that the next draws replay stored values.
    pub fn init_cache(&mut self) {
        for cache in self.caches.iter_mut().flatten() {
            cache.index = 0;
        }
    }

    pub fn init_cache_for(&mut self, period: usize) {
        if let Some(cache) = self.cache_mut(period) {
            cache.index = 0;
        }
    }

    /// Forget every stored value.
    pub fn clear_cache(&mut self) {
        for cache in self.caches.iter_mut().flatten() {
            *cache = PeriodCache::default();
        }
    }

    pub fn clear_cache_for(&mut self, period: usize) {
        if let Some(cache) = self.cache_mut(period) {
            *cache = PeriodCache::default();
        }
    }

    /// Raw values stored for `period`, or `None` when caching is off.
    pub fn cached_values(&self, period: usize) -> Option<&[f64]> {
        self.caches.as_ref().map(|c| c[period].values.as_slice())
    }

    /// Replace the cache of `period`.  The index moves past the new values,
    /// so they are only replayed after [`init_cache`][Self::init_cache].
    pub fn set_cached_values(&mut self, period: usize, values: Vec<f64>) -> ValueResult<()> {
        let cache = self.cache_mut(period).ok_or(ValueError::CachingDisabled)?;
        cache.index = values.len();
        cache.values = values;
        Ok(())
    }

    pub fn cache_index(&self, period: usize) -> Option<usize> {
        self.caches.as_ref().map(|c| c[period].index)
    }

    pub fn set_cache_index(&mut self, period: usize, index: usize) -> ValueResult<()> {
        let cache = self.cache_mut(period).ok_or(ValueError::CachingDisabled)?;
        if index > cache.values.len() {
            return Err(ValueError::CacheIndexOutOfRange { index, len: cache.values.len() });
        }
        cache.index = index;
        Ok(())
    }

    fn cache_mut(&mut self, period: usize) -> Option<&mut PeriodCache> {
        self.caches.as_mut().map(|c| &mut c[period])
    }
}

impl VariateGen for MultiPeriodGen {
    fn next_double(&mut self) -> f64 {
        MultiPeriodGen::next_double(self)
    }

    fn mean(&self) -> f64 {
        MultiPeriodGen::mean(self, self.pce.current_period())
    }

    fn variance(&self) -> f64 {
        MultiPeriodGen::variance(self, self.pce.current_period())
    }

    fn reset_start_stream(&mut self) {
        MultiPeriodGen::reset_start_stream(self)
    }

    fn reset_start_substream(&mut self) {
        MultiPeriodGen::reset_start_substream(self)
    }

    fn reset_next_substream(&mut self) {
        MultiPeriodGen::reset_next_substream(self)
    }
}

/// The contact is ignored; the value depends on the period only.
impl ValueGenerator for MultiPeriodGen {
    fn next_double(&mut self, _contact: &dyn Contact) -> f64 {
        MultiPeriodGen::next_double(self)
    }

    /// Rewinds the caches so a new run replays the same values.
    fn init(&mut self) {
        self.init_cache();
    }

    fn reset_start_stream(&mut self) {
        MultiPeriodGen::reset_start_stream(self)
    }

    fn reset_start_substream(&mut self) {
        MultiPeriodGen::reset_start_substream(self)
    }

    fn reset_next_substream(&mut self) {
        MultiPeriodGen::reset_next_substream(self)
    }
}

impl fmt::Debug for MultiPeriodGen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiPeriodGen")
            .field("periods", &self.gens.len())
            .field("caching", &self.is_caching())
            .field("source_unit", &self.source_unit)
            .field("target_unit", &self.target_unit)
            .field("mult", &self.mult)
            .finish()
    }
}
