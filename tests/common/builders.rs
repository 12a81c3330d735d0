//! Test data builders for creating test objects

use eventplay_rs::{Event, MouseButton, Timeline};

/// Builder for timelines with events at explicit timestamps
pub struct TimelineBuilder {
    name: String,
    events: Vec<Event>,
}

impl TimelineBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: Vec::new(),
        }
    }

    pub fn move_to(mut self, at: f64, x: i32, y: i32) -> Self {
        self.events.push(Event::mouse_move(at, x, y));
        self
    }

    pub fn click(mut self, at: f64, button: MouseButton, pressed: bool) -> Self {
        let (x, y) = self.last_position();
        self.events.push(Event::mouse_click(at, x, y, button, pressed));
        self
    }

    pub fn scroll(mut self, at: f64, dx: i32, dy: i32) -> Self {
        let (x, y) = self.last_position();
        self.events.push(Event::mouse_scroll(at, x, y, dx, dy));
        self
    }

    pub fn key(mut self, at: f64, name: &str, pressed: bool) -> Self {
        self.events.push(if pressed {
            Event::key_press(at, name)
        } else {
            Event::key_release(at, name)
        });
        self
    }

    /// Press then release `name`, `hold` seconds apart
    pub fn tap(self, at: f64, name: &str, hold: f64) -> Self {
        self.key(at, name, true).key(at + hold, name, false)
    }

    pub fn build(self) -> Timeline {
        Timeline::from_events(self.events).with_name(self.name)
    }

    fn last_position(&self) -> (i32, i32) {
        self.events
            .iter()
            .rev()
            .find_map(|e| match e.kind {
                eventplay_rs::EventKind::MouseMove {
                    x: Some(x),
                    y: Some(y),
                } => Some((x, y)),
                _ => None,
            })
            .unwrap_or((0, 0))
    }
}

/// The five-action session used by the end-to-end tests
pub fn click_and_type_timeline() -> Timeline {
    TimelineBuilder::new("click and type")
        .move_to(0.0, 10, 10)
        .click(0.05, MouseButton::Left, true)
        .click(0.06, MouseButton::Left, false)
        .tap(0.10, "a", 0.01)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_builder() {
        let timeline = TimelineBuilder::new("t")
            .move_to(0.0, 3, 4)
            .click(0.1, MouseButton::Right, true)
            .build();

        assert_eq!(timeline.name, "t");
        assert_eq!(timeline.len(), 2);
        assert_eq!(
            timeline.events[1],
            Event::mouse_click(0.1, 3, 4, MouseButton::Right, true)
        );
    }
}
