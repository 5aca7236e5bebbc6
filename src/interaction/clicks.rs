use crate::types::caption_data::Point;

/// Holds a single press back for the double-click window, so a double-click
/// starts the sentence flow without a word request in front of it.
#[derive(Debug, Clone)]
pub struct ClickGate {
    window: f64,
    pending: Option<(Point, f64)>,
}

impl ClickGate {
    /// `window` is in seconds, on the same clock passed to `press` and `poll`.
    pub fn new(window: f64) -> Self {
        Self { window, pending: None }
    }

    /// A later press replaces an earlier one that has not fired yet.
    pub fn press(&mut self, point: Point, now: f64) {
        self.pending = Some((point, now));
    }

    /// Drops the held press. Returns whether one was held.
    pub fn double_click(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// The held press once its window has passed.
    pub fn poll(&mut self, now: f64) -> Option<Point> {
        match self.pending {
            Some((point, at)) if now - at >= self.window => {
                self.pending = None;
                Some(point)
            }
            _ => None,
        }
    }

    /// Seconds until the held press fires.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pending.map(|(_, at)| (at + self.window - now).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_press_fires_after_the_window() {
        let mut gate = ClickGate::new(0.3);
        gate.press(Point::new(4.0, 2.0), 10.0);
        assert_eq!(gate.poll(10.1), None);
        assert_eq!(gate.remaining(10.1).map(|r| (r * 10.0).round()), Some(2.0));
        assert_eq!(gate.poll(10.4), Some(Point::new(4.0, 2.0)));
        assert_eq!(gate.poll(11.0), None);
        assert_eq!(gate.remaining(11.0), None);
    }

    #[test]
    fn double_click_swallows_both_presses() {
        let mut gate = ClickGate::new(0.3);
        gate.press(Point::new(1.0, 1.0), 0.0);
        gate.press(Point::new(1.0, 1.0), 0.15);
        assert!(gate.double_click());
        assert_eq!(gate.poll(5.0), None);
        assert!(!gate.double_click());
    }
}
