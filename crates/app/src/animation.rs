//! Time-driven UI effects: the typing placeholder and the header fade-in.

use std::time::{Duration, Instant};

pub const PLACEHOLDER_PROMPTS: [&str; 3] = [
    "Paste patent text here...",
    "Describe your invention in detail...",
    "e.g., A method for neural network pruning...",
];

const TYPING_STEP: Duration = Duration::from_millis(100);
const DELETING_STEP: Duration = Duration::from_millis(50);
const PAUSE: Duration = Duration::from_millis(2000);

/// Cycles through [`PLACEHOLDER_PROMPTS`], typing each one a character at a
/// time, pausing, then deleting it.
#[derive(Debug, Clone)]
pub struct TypingPlaceholder {
    prompt: usize,
    chars: usize,
    deleting: bool,
    next_step_at: Instant,
}

impl TypingPlaceholder {
    pub fn new(now: Instant) -> Self {
        Self {
            prompt: 0,
            chars: 0,
            deleting: false,
            next_step_at: now + TYPING_STEP,
        }
    }

    fn current_len(&self) -> usize {
        PLACEHOLDER_PROMPTS[self.prompt].chars().count()
    }

    /// Advance one character and return the delay before the next step.
    fn step(&mut self) -> Duration {
        let len = self.current_len();
        if !self.deleting {
            if self.chars < len {
                self.chars += 1;
            } else {
                self.deleting = true;
            }
        } else if self.chars > 0 {
            self.chars -= 1;
        } else {
            self.deleting = false;
            self.prompt = (self.prompt + 1) % PLACEHOLDER_PROMPTS.len();
        }

        if self.deleting {
            DELETING_STEP
        } else if self.chars == self.current_len() {
            PAUSE
        } else {
            TYPING_STEP
        }
    }

    /// Catch up with the clock. Returns true if the visible text changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        // After a long stall (window hidden) resume from where we were.
        if now.saturating_duration_since(self.next_step_at) > PAUSE {
            self.next_step_at = now;
        }
        let mut changed = false;
        while now >= self.next_step_at {
            let delay = self.step();
            self.next_step_at += delay;
            changed = true;
        }
        changed
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_step_at.saturating_duration_since(now)
    }

    /// Visible prefix followed by a caret.
    pub fn text(&self) -> String {
        let mut text: String = PLACEHOLDER_PROMPTS[self.prompt]
            .chars()
            .take(self.chars)
            .collect();
        text.push('|');
        text
    }
}

/// Opacity in `0.0..=1.0` for an element that fades in after `delay`.
pub fn fade_in(elapsed: Duration, delay: Duration, duration: Duration) -> f32 {
    let Some(progress) = elapsed.checked_sub(delay) else {
        return 0.0;
    };
    if duration.is_zero() {
        return 1.0;
    }
    let t = (progress.as_secs_f32() / duration.as_secs_f32()).min(1.0);
    // ease-out
    1.0 - (1.0 - t) * (1.0 - t)
}
