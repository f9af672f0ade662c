//! `RandomValueGenerator` — a `[period][type]` table of variate generators.

use std::fmt;
use std::rc::Rc;

use cc_period::PeriodChangeEvent;

use crate::generator::{check_table, current_period, expected_rows};
use crate::{Contact, ValueGenerator, ValueResult, VariateGen};

/// Draws from `gens[current period][contact type]`.
pub struct RandomValueGenerator {
    pce:       Option<Rc<PeriodChangeEvent>>,
    gens:      Vec<Vec<Box<dyn VariateGen>>>,
    num_types: usize,
}

impl RandomValueGenerator {
    /// Full `[period][type]` table, one row per period of `pce` (or a single
    /// row without a clock).
    pub fn new(
        pce:  Option<Rc<PeriodChangeEvent>>,
        gens: Vec<Vec<Box<dyn VariateGen>>>,
    ) -> ValueResult<Self> {
        let num_types = check_table(&gens, expected_rows(pce.as_ref()))?;
        Ok(Self { pce, gens, num_types })
    }

    /// Build every cell with `make(period, contact_type)`.
    pub fn from_fn<F>(
        pce:       Option<Rc<PeriodChangeEvent>>,
        num_types: usize,
        mut make:  F,
    ) -> ValueResult<Self>
    where
        F: FnMut(usize, usize) -> ValueResult<Box<dyn VariateGen>>,
    {
        let rows = expected_rows(pce.as_ref());
        let gens = (0..rows)
            .map(|p| (0..num_types).map(|k| make(p, k)).collect::<ValueResult<Vec<_>>>())
            .collect::<ValueResult<Vec<_>>>()?;
        Self::new(pce, gens)
    }

    pub fn period_change_event(&self) -> Option<&Rc<PeriodChangeEvent>> {
        self.pce.as_ref()
    }

    pub fn num_periods(&self) -> usize {
        self.gens.len()
    }

    pub fn num_types(&self) -> usize {
        self.num_types
    }

    pub fn generator(&self, period: usize, contact_type: usize) -> &dyn VariateGen {
        &*self.gens[period][contact_type]
    }

    pub fn generator_mut(&mut self, period: usize, contact_type: usize) -> &mut dyn VariateGen {
        &mut *self.gens[period][contact_type]
    }

    /// # Panics
    /// Panics if `period` or `contact_type` is out of range.
    pub fn set_generator(&mut self, period: usize, contact_type: usize, generator: Box<dyn VariateGen>) {
        self.gens[period][contact_type] = generator;
    }

    fn cells_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn VariateGen>> {
        self.gens.iter_mut().flatten()
    }
}

impl ValueGenerator for RandomValueGenerator {
    #[inline]
    fn next_double(&mut self, contact: &dyn Contact) -> f64 {
        let p = current_period(self.pce.as_ref());
        self.gens[p][contact.contact_type().index()].next_double()
    }

    fn init(&mut self) {}

    fn reset_start_stream(&mut self) {
        self.cells_mut().for_each(|g| g.reset_start_stream());
    }

    fn reset_start_substream(&mut self) {
        self.cells_mut().for_each(|g| g.reset_start_substream());
    }

    fn reset_next_substream(&mut self) {
        self.cells_mut().for_each(|g| g.reset_next_substream());
    }
}

impl fmt::Debug for RandomValueGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomValueGenerator")
            .field("periods", &self.gens.len())
            .field("types", &self.num_types)
            .finish()
    }
}
