//! Typewriter: a character-by-character reveal/retract of a rotating word list.
//!
//! The machine cycles `Typing -> Holding -> Erasing -> Gap -> Typing` and is
//! driven by a single pending deadline on a host-supplied clock. Each due
//! deadline fires exactly one transition at its scheduled time, so the output
//! depends only on the word list and the start time, never on how often
//! [`Typewriter::advance_to`] is polled.

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, SubscriberFault};
use crate::ids::{IdAllocator, ListenerId};

/// Transition delays in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterTimings {
    pub type_ms: f64,
    pub hold_ms: f64,
    pub erase_ms: f64,
    pub gap_ms: f64,
    /// Full on/off period of the cursor glyph.
    pub cursor_blink_ms: f64,
}

impl Default for TypewriterTimings {
    fn default() -> Self {
        Self {
            type_ms: 150.0,
            hold_ms: 2000.0,
            erase_ms: 75.0,
            gap_ms: 500.0,
            cursor_blink_ms: 600.0,
        }
    }
}

impl TypewriterTimings {
    pub fn validate(&self) -> Result<(), MotionError> {
        let fields = [
            ("type_ms", self.type_ms),
            ("hold_ms", self.hold_ms),
            ("erase_ms", self.erase_ms),
            ("gap_ms", self.gap_ms),
            ("cursor_blink_ms", self.cursor_blink_ms),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(MotionError::InvalidTiming { field });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Typing,
    Holding,
    Erasing,
    Gap,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypewriterState {
    pub word_index: usize,
    /// Visible prefix length in characters.
    pub visible_len: usize,
    pub phase: Phase,
    /// Number of transitions fired since the last reset.
    pub tick: u64,
}

impl TypewriterState {
    fn initial() -> Self {
        Self {
            word_index: 0,
            visible_len: 0,
            phase: Phase::Typing,
            tick: 0,
        }
    }
}

/// Receives the rendered text whenever it changes.
pub trait TextListener {
    fn on_text(&mut self, text: &str) -> Result<(), SubscriberFault>;
}

impl<F> TextListener for F
where
    F: FnMut(&str) -> Result<(), SubscriberFault>,
{
    fn on_text(&mut self, text: &str) -> Result<(), SubscriberFault> {
        self(text)
    }
}

struct ListenerEntry {
    id: ListenerId,
    listener: Box<dyn TextListener>,
    faulted: bool,
}

/// Rendered output for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypewriterFrame {
    pub text: String,
    pub cursor_visible: bool,
}

pub struct Typewriter {
    words: Vec<String>,
    lengths: Vec<usize>,
    timings: TypewriterTimings,
    state: TypewriterState,
    started_at: Option<f64>,
    deadline: Option<f64>,
    stopped: bool,
    ids: IdAllocator,
    listeners: Vec<ListenerEntry>,
}

impl std::fmt::Debug for Typewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typewriter")
            .field("words", &self.words)
            .field("state", &self.state)
            .field("deadline", &self.deadline)
            .field("stopped", &self.stopped)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Typewriter {
    /// Build a typewriter. An empty list is accepted and idles forever on "".
    pub fn new<I, S>(words: I, timings: TypewriterTimings) -> Result<Self, MotionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        timings.validate()?;
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        Ok(Self {
            lengths: words.iter().map(|w| w.chars().count()).collect(),
            words,
            timings,
            state: TypewriterState::initial(),
            started_at: None,
            deadline: None,
            stopped: false,
            ids: IdAllocator::new(),
            listeners: Vec::new(),
        })
    }

    /// Like [`Typewriter::new`] but refuses an empty word list.
    pub fn non_empty<I, S>(words: I, timings: TypewriterTimings) -> Result<Self, MotionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tw = Self::new(words, timings)?;
        if tw.words.is_empty() {
            return Err(MotionError::EmptyWordList);
        }
        Ok(tw)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn timings(&self) -> &TypewriterTimings {
        &self.timings
    }

    pub fn state(&self) -> &TypewriterState {
        &self.state
    }

    /// Time of the single pending transition, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        self.deadline
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Begin cycling at `now_ms`. Calling again restarts from the first word.
    pub fn start(&mut self, now_ms: f64) {
        self.stopped = false;
        self.state = TypewriterState::initial();
        self.started_at = Some(now_ms);
        self.deadline = None;
        if self.words.is_empty() {
            log::debug!("typewriter has no words; idling");
            return;
        }
        let delay = self.enter_typing();
        self.schedule(now_ms + delay);
    }

    /// Replace the word list and restart at `now_ms`.
    pub fn set_words<I, S>(&mut self, words: I, now_ms: f64)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = words.into_iter().map(Into::into).collect();
        self.lengths = self.words.iter().map(|w| w.chars().count()).collect();
        self.start(now_ms);
        self.emit();
    }

    /// Freeze the machine. Idempotent.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.deadline = None;
        log::debug!("typewriter stopped at tick {}", self.state.tick);
    }

    /// Fire every transition due at or before `now_ms`. Returns how many fired.
    pub fn advance_to(&mut self, now_ms: f64) -> usize {
        let mut fired = 0;
        while let Some(due) = self.deadline {
            if self.stopped || due > now_ms {
                break;
            }
            self.fire(due);
            fired += 1;
        }
        fired
    }

    /// Currently visible prefix of the active word.
    pub fn text(&self) -> &str {
        let Some(word) = self.words.get(self.state.word_index) else {
            return "";
        };
        let end = word
            .char_indices()
            .nth(self.state.visible_len)
            .map(|(i, _)| i)
            .unwrap_or(word.len());
        &word[..end]
    }

    /// Blink runs on its own period, independent of the phase.
    pub fn cursor_visible(&self, now_ms: f64) -> bool {
        let Some(start) = self.started_at else {
            return true;
        };
        let period = self.timings.cursor_blink_ms;
        let elapsed = (now_ms - start).max(0.0);
        (elapsed % period) < period / 2.0
    }

    pub fn render(&self, now_ms: f64) -> TypewriterFrame {
        TypewriterFrame {
            text: self.text().to_string(),
            cursor_visible: self.cursor_visible(now_ms),
        }
    }

    pub fn subscribe(&mut self, listener: impl TextListener + 'static) -> ListenerId {
        let id = self.ids.alloc_listener();
        self.listeners.push(ListenerEntry {
            id,
            listener: Box::new(listener),
            faulted: false,
        });
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    fn current_len(&self) -> usize {
        self.lengths
            .get(self.state.word_index)
            .copied()
            .unwrap_or(0)
    }

    /// Enter Typing for the current word, falling straight through to Holding
    /// when the word is empty. Returns the delay until the next transition.
    fn enter_typing(&mut self) -> f64 {
        if self.current_len() == 0 {
            self.state.phase = Phase::Holding;
            self.timings.hold_ms
        } else {
            self.state.phase = Phase::Typing;
            self.timings.type_ms
        }
    }

    fn schedule(&mut self, at: f64) {
        // A single pending timer: scheduling always replaces the previous one.
        self.deadline = Some(at);
    }

    fn fire(&mut self, at: f64) {
        self.deadline = None;
        self.state.tick += 1;
        let len = self.current_len();
        let delay = match self.state.phase {
            Phase::Typing => {
                self.state.visible_len = (self.state.visible_len + 1).min(len);
                self.emit();
                if self.state.visible_len >= len {
                    self.state.phase = Phase::Holding;
                    self.timings.hold_ms
                } else {
                    self.timings.type_ms
                }
            }
            Phase::Holding => {
                if self.state.visible_len == 0 {
                    self.state.phase = Phase::Gap;
                    self.timings.gap_ms
                } else {
                    self.state.phase = Phase::Erasing;
                    self.timings.erase_ms
                }
            }
            Phase::Erasing => {
                self.state.visible_len = self.state.visible_len.saturating_sub(1);
                self.emit();
                if self.state.visible_len == 0 {
                    self.state.phase = Phase::Gap;
                    self.timings.gap_ms
                } else {
                    self.timings.erase_ms
                }
            }
            Phase::Gap => {
                self.state.word_index = (self.state.word_index + 1) % self.words.len();
                self.enter_typing()
            }
        };
        self.schedule(at + delay);
    }

    fn emit(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let text = self.text().to_string();
        for entry in self.listeners.iter_mut() {
            if let Err(fault) = entry.listener.on_text(&text) {
                if !entry.faulted {
                    entry.faulted = true;
                    log::warn!("typewriter listener {:?} failed: {fault}", entry.id);
                }
            }
        }
    }
}
