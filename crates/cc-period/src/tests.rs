//! Unit tests for cc-period.

use std::cell::RefCell;
use std::rc::Rc;

use cc_kernel::{Priority, Simulator};

use crate::{PeriodChangeEvent, PeriodChangeListener};

// ── Helpers ───────────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<(&'static str, usize, bool)>>>;

/// Appends `(name, period, locked)` on every change and `(name, MAX, _)` on stop.
struct Recorder {
    name: &'static str,
    log:  Log,
}

impl Recorder {
    fn new(name: &'static str, log: &Log) -> Rc<Self> {
        Rc::new(Self { name, log: Rc::clone(log) })
    }
}

impl PeriodChangeListener for Recorder {
    fn change_period(&self, pce: &PeriodChangeEvent) {
        self.log.borrow_mut().push((self.name, pce.current_period(), pce.is_locked()));
    }

    fn stop(&self, pce: &PeriodChangeEvent) {
        self.log.borrow_mut().push((self.name, usize::MAX, pce.is_locked()));
    }
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Preliminary [0, 5), two 10-unit main periods, wrap-up from 25.
fn two_main_periods() -> Rc<PeriodChangeEvent> {
    PeriodChangeEvent::with_fixed_duration(10.0, 4, 5.0).unwrap()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use super::*;
    use crate::PeriodError;

    #[test]
    fn fixed_duration_boundaries() {
        let pce = PeriodChangeEvent::with_fixed_duration(10.0, 5, 0.0).unwrap();
        assert_eq!(pce.num_periods(), 5);
        assert_eq!(pce.num_main_periods(), 3);
        assert_eq!(pce.ending_times(), &[0.0, 10.0, 20.0, 30.0]);
        let ends: Vec<f64> = (0..4).map(|p| pce.period_ending_time(p)).collect();
        assert_eq!(ends, vec![0.0, 10.0, 20.0, 30.0]);
        let starts: Vec<f64> = (1..5).map(|p| pce.period_starting_time(p)).collect();
        assert_eq!(starts, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(pce.fixed_duration(), Some(10.0));
    }

    #[test]
    fn explicit_boundaries() {
        let pce = PeriodChangeEvent::with_ending_times(vec![10.0, 20.0]).unwrap();
        assert_eq!(pce.num_periods(), 3);
        assert_eq!(pce.num_main_periods(), 1);
        assert_eq!(pce.wrap_up_period(), 2);
        assert_eq!(pce.fixed_duration(), None);
    }

    #[test]
    fn too_few_periods_rejected() {
        assert!(matches!(
            PeriodChangeEvent::with_fixed_duration(10.0, 1, 0.0),
            Err(PeriodError::InvalidPeriodCount(1))
        ));
        assert!(matches!(
            PeriodChangeEvent::with_ending_times(vec![]),
            Err(PeriodError::InvalidPeriodCount(_))
        ));
    }

    #[test]
    fn two_periods_is_the_minimum() {
        let pce = PeriodChangeEvent::with_fixed_duration(10.0, 2, 3.0).unwrap();
        assert_eq!(pce.num_main_periods(), 0);
        assert_eq!(pce.period(1.0), 0);
        assert_eq!(pce.period(3.0), 1);
        assert_eq!(pce.main_period(1), 0);
    }

    #[test]
    fn bad_durations_rejected() {
        for d in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    PeriodChangeEvent::with_fixed_duration(d, 4, 0.0),
                    Err(PeriodError::InvalidDuration(_))
                ),
                "duration {d} accepted"
            );
        }
    }

    #[test]
    fn negative_start_rejected() {
        assert!(matches!(
            PeriodChangeEvent::with_fixed_duration(10.0, 4, -1.0),
            Err(PeriodError::InvalidStartingTime(_))
        ));
        assert!(matches!(
            PeriodChangeEvent::with_ending_times(vec![-5.0, 10.0]),
            Err(PeriodError::InvalidStartingTime(_))
        ));
    }

    #[test]
    fn decreasing_boundaries_rejected() {
        let err = PeriodChangeEvent::with_ending_times(vec![0.0, 20.0, 10.0]).unwrap_err();
        match err {
            PeriodError::NonMonotonicBoundaries { index, previous, next } => {
                assert_eq!(index, 2);
                assert_eq!(previous, 20.0);
                assert_eq!(next, 10.0);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn repeated_boundaries_allowed() {
        assert!(PeriodChangeEvent::with_ending_times(vec![0.0, 10.0, 10.0, 20.0]).is_ok());
    }
}

// ── Time ↔ period mapping ─────────────────────────────────────────────────────

#[cfg(test)]
mod mapping {
    use super::*;

    #[test]
    fn end_to_end_layout() {
        let pce = two_main_periods();
        assert_eq!(pce.num_periods(), 4);
        assert_eq!(pce.period(0.0), 0);
        assert_eq!(pce.period(5.0), 1);
        assert_eq!(pce.period(15.0), 2);
        assert_eq!(pce.period(25.0), 3);
        assert_eq!(pce.period_duration(1), 10.0);
        assert_eq!(pce.period_duration(0), 5.0);
    }

    #[test]
    fn boundary_belongs_to_starting_period() {
        let pce = PeriodChangeEvent::with_ending_times(vec![10.0, 20.0]).unwrap();
        assert_eq!(pce.period(10.0), 1);
        assert_eq!(pce.period(20.0), 2);
        assert_eq!(pce.period(9.999), 0);
        assert_eq!(pce.period(19.999), 1);
    }

    #[test]
    fn non_positive_and_nan_times_are_preliminary() {
        let pce = PeriodChangeEvent::with_fixed_duration(10.0, 5, 0.0).unwrap();
        assert_eq!(pce.period(-3.0), 0);
        assert_eq!(pce.period(0.0), 0);
        assert_eq!(pce.period(f64::NAN), 0);
        assert_eq!(pce.period(1e-9), 1);
    }

    #[test]
    fn far_future_is_wrap_up() {
        let pce = two_main_periods();
        assert_eq!(pce.period(1e12), 3);
        assert_eq!(pce.period(f64::INFINITY), 3);
    }

    #[test]
    fn starting_time_maps_back_to_period() {
        let pce = PeriodChangeEvent::with_fixed_duration(7.5, 8, 2.5).unwrap();
        for p in 1..pce.num_periods() {
            let start = pce.period_starting_time(p);
            assert_eq!(pce.period(start), p, "start of period {p}");
        }
        let var = PeriodChangeEvent::with_ending_times(vec![1.0, 4.0, 4.5, 9.0]).unwrap();
        for p in 1..var.num_periods() {
            assert_eq!(var.period(var.period_starting_time(p)), p);
        }
    }

    #[test]
    fn zero_length_period_is_skipped() {
        let pce = PeriodChangeEvent::with_ending_times(vec![0.5, 10.0, 10.0, 20.0]).unwrap();
        assert_eq!(pce.period(10.0), 3);
        assert_eq!(pce.period_duration(2), 0.0);
    }

    #[test]
    fn main_period_mapping() {
        let pce = two_main_periods();
        assert_eq!(pce.main_period(0), 0);
        assert_eq!(pce.main_period(1), 0);
        assert_eq!(pce.main_period(2), 1);
        assert_eq!(pce.main_period(3), 1);
    }

    #[test]
    fn main_period_is_stable_through_its_range() {
        let pce = PeriodChangeEvent::with_fixed_duration(10.0, 6, 0.0).unwrap();
        for p in 0..pce.num_periods() {
            let mp = pce.main_period(p);
            assert!(mp < pce.num_main_periods());
            assert_eq!(pce.main_period(mp + 1), mp, "period {p}");
        }
    }

    #[test]
    fn period_starting_time_membership() {
        let pce = PeriodChangeEvent::with_ending_times(vec![3.0, 8.0, 13.0]).unwrap();
        assert!(pce.is_period_starting_time(3.0));
        assert!(pce.is_period_starting_time(13.0));
        assert!(!pce.is_period_starting_time(5.0));
        assert!(!pce.is_period_starting_time(0.0));
    }

    #[test]
    fn main_period_helpers() {
        let pce = two_main_periods();
        assert_eq!(pce.main_period_starting_time(0), 5.0);
        assert_eq!(pce.main_period_ending_time(1), 25.0);
        assert_eq!(pce.main_period_duration(1), 10.0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_period_panics() {
        two_main_periods().period_starting_time(4);
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use crate::PeriodChangeEvent;

    proptest! {
        #[test]
        fn fixed_and_binary_search_paths_agree(
            duration in 0.1f64..100.0,
            num_periods in 2usize..30,
            start in 0.0f64..50.0,
            time in -10.0f64..5_000.0,
        ) {
            let fixed = PeriodChangeEvent::with_fixed_duration(duration, num_periods, start).unwrap();
            let explicit = PeriodChangeEvent::with_ending_times(fixed.ending_times().to_vec()).unwrap();
            prop_assert_eq!(fixed.period(time), explicit.period(time));
            for &t in fixed.ending_times() {
                prop_assert_eq!(fixed.period(t), explicit.period(t));
            }
        }

        #[test]
        fn interior_times_map_to_their_period(
            duration in 0.5f64..50.0,
            num_periods in 3usize..20,
            start in 0.5f64..20.0,
            frac in 0.0f64..1.0,
        ) {
            let pce = PeriodChangeEvent::with_fixed_duration(duration, num_periods, start).unwrap();
            for p in 1..=pce.num_main_periods() {
                let s = pce.period_starting_time(p);
                let e = pce.period_ending_time(p);
                let t = s + frac * (e - s);
                prop_assume!(t < e);
                prop_assert_eq!(pce.period(s), p);
                prop_assert_eq!(pce.period(t), p);
            }
        }
    }
}

// ── Scheduled transitions ─────────────────────────────────────────────────────

#[cfg(test)]
mod transitions {
    use super::*;

    #[test]
    fn listeners_notified_in_registration_order() {
        let log = new_log();
        let pce = PeriodChangeEvent::with_ending_times(vec![10.0, 20.0]).unwrap();
        pce.add_listener(Recorder::new("A", &log));
        pce.add_listener(Recorder::new("B", &log));
        pce.add_listener(Recorder::new("C", &log));

        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        sim.run_until(15.0);

        assert_eq!(
            *log.borrow(),
            vec![("A", 1, false), ("B", 1, false), ("C", 1, false)]
        );
    }

    #[test]
    fn full_run_visits_every_period() {
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("L", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        assert_eq!(pce.current_period(), 0);
        pce.start(&mut sim).unwrap();
        assert!(pce.is_started());
        sim.run();
        assert_eq!(pce.current_period(), 3);
        assert!(pce.is_wrap_up_period());
        let periods: Vec<usize> = log.borrow().iter().map(|e| e.1).collect();
        assert_eq!(periods, vec![1, 2, 3]);
        assert_eq!(sim.now(), 25.0);
    }

    #[test]
    fn transition_runs_before_same_time_model_event() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);

        // Scheduled before the clock: insertion order alone would run it first.
        let seen = Rc::new(RefCell::new(None));
        let (s, p) = (Rc::clone(&seen), Rc::clone(&pce));
        sim.schedule(15.0, Priority::DEFAULT, move |_| *s.borrow_mut() = Some(p.current_period()))
            .unwrap();

        pce.start(&mut sim).unwrap();
        sim.run();
        assert_eq!(*seen.borrow(), Some(2));
    }

    #[test]
    fn transitions_use_reserved_priority() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        assert_eq!(sim.pending(), 3);
        // Model event at the first boundary, lowest user priority available.
        let seen = Rc::new(RefCell::new(None));
        let (s, p) = (Rc::clone(&seen), Rc::clone(&pce));
        sim.schedule(5.0, Priority::new(0), move |_| *s.borrow_mut() = Some(p.current_period()))
            .unwrap();
        sim.run_until(5.0);
        assert_eq!(*seen.borrow(), Some(1));
    }

    #[test]
    fn boundary_at_time_zero_fires_immediately() {
        let log = new_log();
        let pce = PeriodChangeEvent::with_fixed_duration(10.0, 4, 0.0).unwrap();
        pce.add_listener(Recorder::new("L", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        assert_eq!(pce.current_period(), 0);
        pce.start(&mut sim).unwrap();
        sim.run_until(0.0);
        assert_eq!(pce.current_period(), 1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn init_mid_run_only_schedules_remaining_boundaries() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        sim.run_until(12.0);
        pce.init(&mut sim);
        assert_eq!(pce.current_period(), 1);
        pce.start(&mut sim).unwrap();
        assert_eq!(sim.pending(), 2);
        sim.run();
        assert_eq!(pce.current_period(), 3);
    }

    #[test]
    fn reinit_cancels_pending_transitions() {
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("L", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        let before = pce.mod_count();
        pce.init(&mut sim);
        assert!(pce.mod_count() > before);
        assert_eq!(sim.pending(), 0);
        sim.run();
        assert!(log.borrow().is_empty());
        assert_eq!(pce.current_period(), 0);
    }

    #[test]
    fn stale_transitions_never_fire() {
        // Transitions queued on `a` cannot be removed through `b`; only the
        // generation counter keeps them from firing.
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("L", &log));
        let mut a = Simulator::new();
        let mut b = Simulator::new();
        pce.init(&mut a);
        pce.start(&mut a).unwrap();
        pce.init(&mut b);
        assert_eq!(a.pending(), 3);
        a.run();
        assert_eq!(a.dispatched(), 3);
        assert!(log.borrow().is_empty());
        assert_eq!(pce.current_period(), 0);
    }

    #[test]
    fn stop_notifies_and_records_time() {
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("A", &log));
        pce.add_listener(Recorder::new("B", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        sim.run_until(30.0);
        assert!(pce.period_duration(3).is_nan());
        assert!(pce.period_ending_time(3).is_nan());
        pce.stop(&mut sim);
        assert_eq!(pce.stop_time(), Some(30.0));
        assert!(!pce.is_started());
        assert_eq!(pce.period_ending_time(3), 30.0);
        assert_eq!(pce.period_duration(3), 5.0);
        let tail: Vec<_> = log.borrow().iter().rev().take(2).cloned().collect();
        assert_eq!(tail, vec![("B", usize::MAX, false), ("A", usize::MAX, false)]);
    }

    #[test]
    fn second_stop_is_ignored() {
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("L", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        sim.run_until(10.0);
        pce.stop(&mut sim);
        sim.run_until(40.0);
        pce.stop(&mut sim);
        assert_eq!(pce.stop_time(), Some(10.0));
        let stops = log.borrow().iter().filter(|e| e.1 == usize::MAX).count();
        assert_eq!(stops, 1);

        pce.init(&mut sim);
        pce.stop(&mut sim);
        assert_eq!(pce.stop_time(), Some(40.0));
    }

    #[test]
    fn early_stop_cancels_remaining_transitions() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        sim.run_until(10.0);
        pce.stop(&mut sim);
        assert_eq!(sim.pending(), 0);
        assert_eq!(pce.current_period(), 1);
        assert_eq!(pce.period_duration(3), 0.0);
    }
}

// ── State machine ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod state {
    use super::*;
    use crate::PeriodError;

    #[test]
    fn start_twice_fails() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        assert!(matches!(pce.start(&mut sim), Err(PeriodError::IllegalState(_))));
    }

    #[test]
    fn start_after_stop_requires_init() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        pce.stop(&mut sim);
        assert!(matches!(pce.start(&mut sim), Err(PeriodError::IllegalState(_))));
        pce.init(&mut sim);
        assert!(pce.stop_time().is_none());
        assert!(pce.start(&mut sim).is_ok());
    }

    #[test]
    fn start_while_locked_fails() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.set_current_period(&mut sim, 2).unwrap();
        assert!(pce.is_locked());
        assert!(matches!(pce.start(&mut sim), Err(PeriodError::IllegalState(_))));
        pce.init(&mut sim);
        assert!(!pce.is_locked());
        assert!(pce.start(&mut sim).is_ok());
    }

    #[test]
    fn forced_period_notifies_locked() {
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("L", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.start(&mut sim).unwrap();
        pce.set_current_period(&mut sim, 2).unwrap();
        assert_eq!(*log.borrow(), vec![("L", 2, true)]);
        assert_eq!(pce.current_period(), 2);
        assert!(pce.is_started());

        // Scheduled transitions were cancelled; nothing else fires.
        sim.run();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(pce.current_period(), 2);
    }

    #[test]
    fn forcing_same_period_is_silent() {
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("L", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.set_current_period(&mut sim, 0).unwrap();
        assert!(log.borrow().is_empty());
        assert!(!pce.is_locked());
    }

    #[test]
    fn forcing_repeatedly_notifies_each_change() {
        let log = new_log();
        let pce = two_main_periods();
        pce.add_listener(Recorder::new("L", &log));
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.set_current_period(&mut sim, 1).unwrap();
        pce.set_current_period(&mut sim, 3).unwrap();
        pce.set_current_period(&mut sim, 3).unwrap();
        pce.set_current_period(&mut sim, 0).unwrap();
        let periods: Vec<usize> = log.borrow().iter().map(|e| e.1).collect();
        assert_eq!(periods, vec![1, 3, 0]);
    }

    #[test]
    fn forcing_out_of_range_fails() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        assert!(matches!(
            pce.set_current_period(&mut sim, 4),
            Err(PeriodError::InvalidPeriod { period: 4, num_periods: 4 })
        ));
        assert_eq!(pce.current_period(), 0);
    }

    #[test]
    fn actions_are_ignored_while_locked() {
        let pce = two_main_periods();
        let mut sim = Simulator::new();
        pce.init(&mut sim);
        pce.set_current_period(&mut sim, 1).unwrap();
        pce.actions();
        assert_eq!(pce.current_period(), 1);
    }

    #[test]
    fn actions_saturate_at_wrap_up() {
        let pce = two_main_periods();
        for _ in 0..10 {
            pce.actions();
        }
        assert_eq!(pce.current_period(), pce.wrap_up_period());
    }
}

// ── Listener list ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod listeners {
    use super::*;

    #[test]
    fn duplicates_are_ignored() {
        let log = new_log();
        let pce = two_main_periods();
        let a = Recorder::new("A", &log);
        assert!(pce.add_listener(a.clone()));
        assert!(!pce.add_listener(a.clone()));
        assert_eq!(pce.num_listeners(), 1);
        assert!(pce.has_listener(&a));
    }

    #[test]
    fn remove_and_clear() {
        let log = new_log();
        let pce = two_main_periods();
        let a = Recorder::new("A", &log);
        let b = Recorder::new("B", &log);
        pce.add_listener(a.clone());
        pce.add_listener(b.clone());
        assert!(pce.remove_listener(&a));
        assert!(!pce.remove_listener(&a));
        assert_eq!(pce.num_listeners(), 1);

        pce.actions();
        assert_eq!(*log.borrow(), vec![("B", 1, false)]);

        pce.clear_listeners();
        assert_eq!(pce.num_listeners(), 0);
    }

    #[test]
    fn snapshot_preserves_order() {
        let log = new_log();
        let pce = two_main_periods();
        let names = ["x", "y", "z"];
        let rs: Vec<_> = names.iter().map(|&n| Recorder::new(n, &log)).collect();
        for r in &rs {
            pce.add_listener(r.clone());
        }
        let snap = pce.listeners();
        assert_eq!(snap.len(), 3);
        for (s, r) in snap.iter().zip(&rs) {
            assert!(std::ptr::addr_eq(Rc::as_ptr(s), Rc::as_ptr(r)));
        }
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use crate::{PeriodConfig, PeriodError};

    #[test]
    fn fixed_config_builds() {
        let cfg = PeriodConfig::Fixed { period_duration: 10.0, num_periods: 4, starting_time: 5.0 };
        assert_eq!(cfg.num_periods(), 4);
        let pce = cfg.build().unwrap();
        assert_eq!(pce.ending_times(), &[5.0, 15.0, 25.0]);
    }

    #[test]
    fn durations_config_accumulates() {
        let cfg = PeriodConfig::Durations { starting_time: 2.0, main_durations: vec![3.0, 5.0, 1.0] };
        assert_eq!(cfg.num_periods(), 5);
        let pce = cfg.build().unwrap();
        assert_eq!(pce.ending_times(), &[2.0, 5.0, 10.0, 11.0]);
        assert_eq!(pce.period(7.0), 2);
    }

    #[test]
    fn durations_config_rejects_negative() {
        let cfg = PeriodConfig::Durations { starting_time: 0.0, main_durations: vec![3.0, -1.0] };
        assert!(matches!(cfg.build(), Err(PeriodError::InvalidDuration(_))));
    }

    #[test]
    fn parse_from_json() {
        let cfg: PeriodConfig = serde_json::from_str(
            r#"{ "kind": "fixed", "period_duration": 3600.0, "num_periods": 10 }"#,
        )
        .unwrap();
        assert_eq!(
            cfg,
            PeriodConfig::Fixed { period_duration: 3600.0, num_periods: 10, starting_time: 0.0 }
        );

        let cfg: PeriodConfig =
            serde_json::from_str(r#"{ "kind": "explicit", "ending_times": [1.0, 2.0] }"#).unwrap();
        assert_eq!(cfg.num_periods(), 3);
    }
}
