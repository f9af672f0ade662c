//! Single random-variate generators.
//!
//! A [`VariateGen`] knows how to draw one `f64` and the theoretical moments
//! of what it draws.  The value generators of this crate hold one per table
//! cell (or per period) and delegate to it.

use cc_core::RandomStream;
use rand::distributions::Distribution as Sample;
use statrs::statistics::Distribution as Moments;

/// A random variate with known moments.
pub trait VariateGen {
    fn next_double(&mut self) -> f64;

    /// Mean of the underlying distribution; NaN when it is undefined.
    fn mean(&self) -> f64;

    /// Variance of the underlying distribution; NaN when it is undefined.
    fn variance(&self) -> f64;

    /// Rewind the random stream to its first substream.  No-op for
    /// deterministic variates.
    fn reset_start_stream(&mut self) {}

    /// Rewind the random stream to the start of its current substream.
    fn reset_start_substream(&mut self) {}

    /// Move the random stream to its next substream.  Calling this once per
    /// replication makes replication `r` draw from substream `r`.
    fn reset_next_substream(&mut self) {}
}

impl<G: VariateGen + ?Sized> VariateGen for Box<G> {
    fn next_double(&mut self) -> f64 {
        (**self).next_double()
    }

    fn mean(&self) -> f64 {
        (**self).mean()
    }

    fn variance(&self) -> f64 {
        (**self).variance()
    }

    fn reset_start_stream(&mut self) {
        (**self).reset_start_stream()
    }

    fn reset_start_substream(&mut self) {
        (**self).reset_start_substream()
    }

    fn reset_next_substream(&mut self) {
        (**self).reset_next_substream()
    }
}

// ── DistGen ───────────────────────────────────────────────────────────────────

/// A `statrs` distribution sampled with its own [`RandomStream`].
#[derive(Clone, Debug)]
pub struct DistGen<D> {
    dist:   D,
    stream: RandomStream,
}

impl<D> DistGen<D> {
    pub fn new(dist: D, stream: RandomStream) -> Self {
        Self { dist, stream }
    }

    pub fn dist(&self) -> &D {
        &self.dist
    }

    /// The stream, e.g. to reset it between replications.
    pub fn stream_mut(&mut self) -> &mut RandomStream {
        &mut self.stream
    }
}

impl<D> VariateGen for DistGen<D>
where
    D: Sample<f64> + Moments<f64>,
{
    #[inline]
    fn next_double(&mut self) -> f64 {
        self.dist.sample(&mut self.stream)
    }

    fn mean(&self) -> f64 {
        self.dist.mean().unwrap_or(f64::NAN)
    }

    fn variance(&self) -> f64 {
        self.dist.variance().unwrap_or(f64::NAN)
    }

    fn reset_start_stream(&mut self) {
        self.stream.reset_start_stream();
    }

    fn reset_start_substream(&mut self) {
        self.stream.reset_start_substream();
    }

    fn reset_next_substream(&mut self) {
        self.stream.reset_next_substream();
    }
}

// ── ShiftedGen ────────────────────────────────────────────────────────────────

/// Adds a constant to every draw of `inner`.
#[derive(Clone, Debug)]
pub struct ShiftedGen<G> {
    inner: G,
    shift: f64,
}

impl<G> ShiftedGen<G> {
    pub fn new(inner: G, shift: f64) -> Self {
        Self { inner, shift }
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: VariateGen> VariateGen for ShiftedGen<G> {
    fn next_double(&mut self) -> f64 {
        self.inner.next_double() + self.shift
    }

    fn mean(&self) -> f64 {
        self.inner.mean() + self.shift
    }

    fn variance(&self) -> f64 {
        self.inner.variance()
    }

    fn reset_start_stream(&mut self) {
        self.inner.reset_start_stream();
    }

    fn reset_start_substream(&mut self) {
        self.inner.reset_start_substream();
    }

    fn reset_next_substream(&mut self) {
        self.inner.reset_next_substream();
    }
}

// ── ConstantGen ───────────────────────────────────────────────────────────────

/// Always returns the same value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantGen(pub f64);

impl VariateGen for ConstantGen {
    #[inline]
    fn next_double(&mut self) -> f64 {
        self.0
    }

    fn mean(&self) -> f64 {
        self.0
    }

    fn variance(&self) -> f64 {
        0.0
    }
}
