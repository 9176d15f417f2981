use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::warn;

/// Unique identifier for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Deadlines are `None` when they lie beyond the range of `Instant`; such a
/// timer stays scheduled but never fires.
#[derive(Debug, Clone)]
enum TimerKind {
    /// Fires once and is removed
    OneShot { fire_at: Option<Instant> },
    /// Fires every `interval` until cancelled
    Recurring {
        interval: Duration,
        next_fire: Option<Instant>,
    },
}

fn deadline(now: Instant, delay: Duration, name: &str) -> Option<Instant> {
    let deadline = now.checked_add(delay);
    if deadline.is_none() {
        warn!(target: "host", "Timer {} delay {:?} is out of range, it will never fire", name, delay);
    }
    deadline
}

fn is_due(deadline: Option<Instant>, now: Instant) -> bool {
    deadline.is_some_and(|deadline| now >= deadline)
}

#[derive(Debug, Clone)]
struct Timer {
    name: String,
    kind: TimerKind,
}

/// Timers shared by all plugins of a host
///
/// Time only advances through [`TimerManager::tick`], which the host calls
/// with the frame time; scheduling takes the same clock so a replayed
/// session fires timers exactly as a live one would.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: HashMap<TimerId, Timer>,
    next_id: u64,
    fired_timers: Vec<TimerId>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { name, kind });
        id
    }

    /// Schedule a one-shot timer firing `delay` after `now`
    pub fn schedule_timer(&mut self, now: Instant, delay: Duration, name: String) -> TimerId {
        let fire_at = deadline(now, delay, &name);
        self.insert(name, TimerKind::OneShot { fire_at })
    }

    /// Schedule a timer firing every `interval`, first at `now + interval`
    pub fn schedule_recurring(
        &mut self,
        now: Instant,
        interval: Duration,
        name: String,
    ) -> TimerId {
        let next_fire = deadline(now, interval, &name);
        self.insert(
            name,
            TimerKind::Recurring {
                interval,
                next_fire,
            },
        )
    }

    /// Cancel a timer, dropping any unconsumed fire
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.fired_timers.retain(|fired| *fired != id);
        self.timers.remove(&id).is_some()
    }

    /// Check if a timer has fired (consumes the fired state)
    pub fn check_timer(&mut self, id: TimerId) -> bool {
        if let Some(pos) = self.fired_timers.iter().position(|&tid| tid == id) {
            self.fired_timers.remove(pos);
            true
        } else {
            false
        }
    }

    /// Advance to `now`, returning the timers that fired
    pub fn tick(&mut self, now: Instant) -> Vec<(TimerId, String)> {
        let mut fired = Vec::new();
        let mut to_remove = Vec::new();

        for (id, timer) in self.timers.iter_mut() {
            match &mut timer.kind {
                TimerKind::OneShot { fire_at } => {
                    if is_due(*fire_at, now) {
                        fired.push((*id, timer.name.clone()));
                        to_remove.push(*id);
                    }
                }
                TimerKind::Recurring {
                    interval,
                    next_fire,
                } => {
                    if is_due(*next_fire, now) {
                        fired.push((*id, timer.name.clone()));
                        *next_fire = deadline(now, *interval, &timer.name);
                    }
                }
            }
        }

        for id in to_remove {
            self.timers.remove(&id);
        }

        self.fired_timers.extend(fired.iter().map(|(id, _)| *id));

        fired
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_one_shot_timer() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let id = manager.schedule_timer(start, ms(50), "idle".to_string());

        assert!(manager.tick(start + ms(10)).is_empty());

        let fired = manager.tick(start + ms(60));
        assert_eq!(fired, vec![(id, "idle".to_string())]);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_recurring_timer() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let id = manager.schedule_recurring(start, ms(50), "poll".to_string());

        assert!(manager.tick(start).is_empty());
        assert_eq!(manager.tick(start + ms(50)).len(), 1);
        assert_eq!(manager.active_count(), 1);

        assert!(manager.tick(start + ms(70)).is_empty());
        let fired = manager.tick(start + ms(100));
        assert_eq!(fired[0].0, id);
    }

    #[test]
    fn test_cancel_timer() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let id = manager.schedule_timer(start, Duration::from_secs(10), "idle".to_string());

        assert!(manager.cancel_timer(id));
        assert_eq!(manager.active_count(), 0);
        assert!(!manager.cancel_timer(id));
    }

    #[test]
    fn test_check_timer_consumes_fire() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let id = manager.schedule_timer(start, ms(50), "idle".to_string());

        assert!(!manager.check_timer(id));
        manager.tick(start + ms(50));

        assert!(manager.check_timer(id));
        assert!(!manager.check_timer(id));
    }

    #[test]
    fn test_cancel_drops_pending_fire() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let id = manager.schedule_timer(start, ms(5), "idle".to_string());
        manager.tick(start + ms(5));

        manager.cancel_timer(id);
        assert!(!manager.check_timer(id));
    }

    #[test]
    fn test_out_of_range_delay_never_fires() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let once = manager.schedule_timer(start, Duration::MAX, "idle".to_string());
        let every = manager.schedule_recurring(start, Duration::MAX, "poll".to_string());

        assert!(manager.tick(start + Duration::from_secs(86_400)).is_empty());
        assert_eq!(manager.active_count(), 2);
        assert!(manager.cancel_timer(once));
        assert!(manager.cancel_timer(every));
    }
}
