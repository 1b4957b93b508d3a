use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use mimic_pipeline::{Direction, LABEL_LEN};

/// How long a key counts as held after its last press or repeat, on terminals
/// that do not report key releases.
///
/// Longer than the usual auto-repeat delay, so a key held down keeps being
/// refreshed by repeats before it expires.
pub const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

#[must_use]
pub fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        _ => None,
    }
}

/// Tracks when each direction key was last pressed.
#[derive(Debug, Clone)]
pub struct HeldKeys {
    timeout: Option<Duration>,
    pressed_at: [Option<Instant>; LABEL_LEN],
}

impl HeldKeys {
    /// With `timeout` set, keys are released automatically by
    /// [`expire`](Self::expire); without it, only by [`release`](Self::release).
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            pressed_at: [None; LABEL_LEN],
        }
    }

    pub fn press(&mut self, direction: Direction, now: Instant) {
        self.pressed_at[direction.index()] = Some(now);
    }

    pub fn release(&mut self, direction: Direction) {
        self.pressed_at[direction.index()] = None;
    }

    pub fn release_all(&mut self) {
        self.pressed_at = [None; LABEL_LEN];
    }

    #[must_use]
    pub fn is_held(&self, direction: Direction) -> bool {
        self.pressed_at[direction.index()].is_some()
    }

    /// Releases keys not refreshed within the timeout and returns them.
    pub fn expire(&mut self, now: Instant) -> Vec<Direction> {
        let Some(timeout) = self.timeout else {
            return vec![];
        };
        let mut expired = vec![];
        for direction in Direction::ALL {
            let slot = &mut self.pressed_at[direction.index()];
            if slot.is_some_and(|at| now.duration_since(at) >= timeout) {
                *slot = None;
                expired.push(direction);
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_arrow_keys_map_to_directions() {
        assert_eq!(key_direction(KeyCode::Left), Some(Direction::Left));
        assert_eq!(key_direction(KeyCode::Char('t')), None);
    }

    #[test]
    fn test_expire_after_timeout() {
        let start = Instant::now();
        let mut keys = HeldKeys::new(Some(HOLD_TIMEOUT));
        keys.press(Direction::Up, start);
        keys.press(Direction::Left, start + 300 * MS);

        assert!(keys.expire(start + 500 * MS).is_empty());
        assert_eq!(keys.expire(start + 600 * MS), [Direction::Up]);
        assert!(!keys.is_held(Direction::Up));
        assert!(keys.is_held(Direction::Left));
    }

    #[test]
    fn test_repeat_refreshes_hold() {
        let start = Instant::now();
        let mut keys = HeldKeys::new(Some(HOLD_TIMEOUT));
        keys.press(Direction::Right, start);
        keys.press(Direction::Right, start + 500 * MS);
        assert!(keys.expire(start + 900 * MS).is_empty());
        assert!(keys.is_held(Direction::Right));
    }

    #[test]
    fn test_without_timeout_keys_stay_until_released() {
        let start = Instant::now();
        let mut keys = HeldKeys::new(None);
        keys.press(Direction::Down, start);
        assert!(keys.expire(start + 60 * 1000 * MS).is_empty());
        keys.release(Direction::Down);
        assert!(!keys.is_held(Direction::Down));
    }
}
