//! Poisson-like arrival process switched on during the main periods.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use cc_core::{ContactTypeId, RandomStream};
use cc_kernel::{EventHandle, Priority, Simulator, ToggleElement};
use cc_measure::{NonStationaryMeasureMatrix, SumMatrix};
use cc_value::{ConstantValueGenerator, MultiPeriodGen, RandomValueGenerator, ValueGenerator};
use tracing::{trace, warn};

/// Rows of the per-period measure matrix.
pub const MEASURES: [&str; 4] = ["arrived", "served", "abandoned", "service_time"];

const ARRIVED:      usize = 0;
const SERVED:       usize = 1;
const ABANDONED:    usize = 2;
const SERVICE_TIME: usize = 3;

/// Generates contacts while started and records what happens to them.
///
/// Each contact draws a service time and compares it with the patience of
/// its type in the current period: it is served when service finishes
/// first.
pub struct ArrivalProcess {
    interarrival: RefCell<MultiPeriodGen>,
    service:      RefCell<RandomValueGenerator>,
    patience:     RefCell<ConstantValueGenerator>,
    type_stream:  RefCell<RandomStream>,
    num_types:    usize,
    counts:       Rc<NonStationaryMeasureMatrix<SumMatrix>>,
    started:      Cell<bool>,
    /// The scheduled next arrival, cancelled on stop.
    pending:      Cell<Option<EventHandle>>,
    this:         Weak<ArrivalProcess>,
}

impl ArrivalProcess {
    pub fn new(
        interarrival: MultiPeriodGen,
        service:      RandomValueGenerator,
        patience:     ConstantValueGenerator,
        type_stream:  RandomStream,
        counts:       Rc<NonStationaryMeasureMatrix<SumMatrix>>,
    ) -> Rc<Self> {
        let num_types = service.num_types();
        Rc::new_cyclic(|this| Self {
            interarrival: RefCell::new(interarrival),
            service: RefCell::new(service),
            patience: RefCell::new(patience),
            type_stream: RefCell::new(type_stream),
            num_types,
            counts,
            started: Cell::new(false),
            pending: Cell::new(None),
            this: this.clone(),
        })
    }

    /// Reset generators before a replication.  Call after the simulator
    /// was initialised: any pending arrival is forgotten.
    pub fn init(&self) {
        self.started.set(false);
        self.pending.set(None);
        self.interarrival.borrow_mut().init();
        self.service.borrow_mut().init();
        self.patience.borrow_mut().init();
    }

    /// Move every random stream to its next substream, so that replication
    /// `r` draws from substream `r`.
    pub fn next_substream(&self) {
        self.interarrival.borrow_mut().reset_next_substream();
        self.service.borrow_mut().reset_next_substream();
        self.patience.borrow_mut().reset_next_substream();
        self.type_stream.borrow_mut().reset_next_substream();
    }

    fn schedule_next(&self, sim: &mut Simulator) {
        let delay = self.interarrival.borrow_mut().next_double();
        let this = self.this.clone();
        let res = sim.schedule(delay, Priority::DEFAULT, move |sim| {
            if let Some(p) = this.upgrade() {
                p.arrive(sim);
            }
        });
        match res {
            Ok(handle) => self.pending.set(Some(handle)),
            Err(e) => warn!(error = %e, delay, "arrival not scheduled"),
        }
    }

    fn arrive(&self, sim: &mut Simulator) {
        self.pending.set(None);
        if !self.started.get() {
            return;
        }
        let k = (self.type_stream.borrow_mut().next_uniform() * self.num_types as f64) as usize;
        let contact = ContactTypeId(k.min(self.num_types - 1) as u32);
        let service = self.service.borrow_mut().next_double(&contact);
        let patience = self.patience.borrow_mut().next_double(&contact);
        trace!(time = sim.now(), %contact, service, patience, "arrival");

        let mut counts = self.counts.inner_mut();
        counts.add(ARRIVED, 0, 1.0);
        if service <= patience {
            counts.add(SERVED, 0, 1.0);
            counts.add(SERVICE_TIME, 0, service);
        } else {
            counts.add(ABANDONED, 0, 1.0);
        }
        drop(counts);

        self.schedule_next(sim);
    }
}

impl ToggleElement for ArrivalProcess {
    fn start(&self, sim: &mut Simulator) {
        if self.started.replace(true) {
            return;
        }
        self.schedule_next(sim);
    }

    fn stop(&self, sim: &mut Simulator) {
        self.started.set(false);
        if let Some(handle) = self.pending.take() {
            sim.cancel(handle);
        }
    }

    fn is_started(&self) -> bool {
        self.started.get()
    }
}
