//! The in-game clock.
//!
//! Unlike a wall-clock stopwatch, the clock doesn't measure anything by itself: it's advanced by an external tick
//! source, one tick per second, and only counts the ticks it receives while running.

use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    /// Whether the ticks are currently being counted.
    running: bool,
    /// The time accumulated from the counted ticks.
    elapsed: Duration,
}

impl GameClock {
    /// How much time a single tick adds.
    pub const TICK: Duration = Duration::from_secs(1);

    /// Starts counting the ticks.
    ///
    /// Returns `false` if the clock had already been running, in which case nothing changes.
    pub fn start(&mut self) -> bool {
        let was_stopped = !self.running;
        self.running = true;
        was_stopped
    }

    /// Stops counting the ticks.
    ///
    /// Returns `false` if the clock had already been stopped, in which case nothing changes.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Stops the clock and sets the elapsed time back to zero.
    pub fn reset(&mut self) {
        *self = GameClock::default();
    }

    /// Adds a tick worth of time if the clock is running. Returns whether it did.
    pub fn tick(&mut self) -> bool {
        if self.running {
            self.elapsed += Self::TICK;
        }

        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the time counted since the last reset.
    pub fn get_elapsed_time(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod test {
    use super::GameClock;
    use std::time::Duration;

    #[test]
    fn a_clock_that_has_never_been_started_has_zero_as_the_elapsed_time_value() {
        let clock = GameClock::default();

        assert!(!clock.is_running());
        assert_eq!(clock.get_elapsed_time(), Duration::ZERO);
    }

    #[test]
    fn ticks_are_ignored_while_the_clock_is_stopped() {
        let mut clock = GameClock::default();

        assert!(!clock.tick());
        assert_eq!(clock.get_elapsed_time(), Duration::ZERO);
    }

    #[test]
    fn every_tick_adds_a_second_while_running() {
        let mut clock = GameClock::default();
        clock.start();

        for _ in 0..3 {
            assert!(clock.tick());
        }

        assert_eq!(clock.get_elapsed_time(), Duration::from_secs(3));
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut clock = GameClock::default();

        assert!(clock.start());
        assert!(!clock.start());
        clock.tick();

        assert!(clock.stop());
        assert!(!clock.stop());
        clock.tick();

        assert_eq!(clock.get_elapsed_time(), Duration::from_secs(1));
    }

    #[test]
    fn the_time_keeps_adding_after_the_clock_gets_resumed() {
        let mut clock = GameClock::default();
        clock.start();
        clock.tick();
        clock.stop();
        clock.tick();
        clock.start();
        clock.tick();

        assert_eq!(clock.get_elapsed_time(), Duration::from_secs(2));
    }

    #[test]
    fn reset_stops_the_clock_and_clears_the_time() {
        let mut clock = GameClock::default();
        clock.start();
        clock.tick();
        clock.reset();

        assert!(!clock.is_running());
        assert_eq!(clock.get_elapsed_time(), Duration::ZERO);
    }
}
