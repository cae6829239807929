use std::time::{Duration, Instant};

/// How long the "invalid submission" wiggle stays on.
pub const SHAKE_DURATION: Duration = Duration::from_millis(500);

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One-shot signal that switches itself off [`SHAKE_DURATION`] after it was fired. Firing again
/// while active restarts the window.
#[derive(Debug)]
pub struct ShakeSignal<C: Clock> {
    clock: C,
    fired_at: Option<Instant>,
}

impl<C: Clock> ShakeSignal<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            fired_at: None,
        }
    }

    pub fn fire(&mut self) {
        self.fired_at = Some(self.clock.now());
    }

    /// Time left before the signal clears, `None` once it has.
    pub fn remaining(&mut self) -> Option<Duration> {
        let fired_at = self.fired_at?;
        let elapsed = self.clock.now().saturating_duration_since(fired_at);
        if elapsed >= SHAKE_DURATION {
            self.fired_at = None;
            None
        } else {
            Some(SHAKE_DURATION - elapsed)
        }
    }

    /// Progress through the wiggle in `0.0..1.0`, for animating.
    pub fn phase(&mut self) -> Option<f32> {
        self.remaining()
            .map(|left| 1.0 - left.as_secs_f32() / SHAKE_DURATION.as_secs_f32())
    }

    pub fn clear(&mut self) {
        self.fired_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use test_log::test;

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<Instant>>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    fn signal() -> (ShakeSignal<ManualClock>, ManualClock) {
        let clock = ManualClock(Rc::new(Cell::new(Instant::now())));
        (ShakeSignal::new(clock.clone()), clock)
    }

    #[test]
    fn idle_until_fired() {
        let (mut shake, _) = signal();
        assert_eq!(shake.remaining(), None);
        assert_eq!(shake.phase(), None);
    }

    #[test]
    fn clears_after_duration() {
        let (mut shake, clock) = signal();
        shake.fire();
        assert!(shake.remaining().is_some());
        clock.advance(Duration::from_millis(499));
        assert_eq!(shake.remaining(), Some(Duration::from_millis(1)));
        clock.advance(Duration::from_millis(1));
        assert_eq!(shake.remaining(), None);
        clock.advance(Duration::from_secs(5));
        assert_eq!(shake.remaining(), None);
    }

    #[test]
    fn refiring_restarts_window() {
        let (mut shake, clock) = signal();
        shake.fire();
        clock.advance(Duration::from_millis(400));
        shake.fire();
        clock.advance(Duration::from_millis(400));
        assert!(shake.remaining().is_some());
        clock.advance(Duration::from_millis(100));
        assert_eq!(shake.remaining(), None);
    }

    #[test]
    fn clear_is_immediate() {
        let (mut shake, _) = signal();
        shake.fire();
        shake.clear();
        assert_eq!(shake.remaining(), None);
    }
}
