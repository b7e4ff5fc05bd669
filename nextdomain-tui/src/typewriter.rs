use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One change to the output pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Start a new output line.
    NewLine,
    /// Append to the current line.
    Char(char),
    /// Drop everything shown so far.
    Clear,
}

impl From<char> for Step {
    fn from(c: char) -> Self {
        if c == '\n' { Step::NewLine } else { Step::Char(c) }
    }
}

#[derive(Debug)]
enum Segment {
    Text {
        chars: VecDeque<char>,
        delay: Duration,
        started: bool,
    },
    Clear,
}

/// Reveals queued text one character per `delay`, in submission order.
///
/// Every pushed block starts on a fresh line. Clears are queued too, so a
/// clear issued after some text never wipes text queued after it.
#[derive(Debug)]
pub struct Typewriter {
    queue: VecDeque<Segment>,
    clock: Instant,
}

impl Typewriter {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            clock: Instant::now(),
        }
    }

    /// Queues `text`. A zero delay shows it all on the next advance.
    pub fn push(&mut self, text: &str, delay: Duration) {
        self.queue.push_back(Segment::Text {
            chars: text.chars().collect(),
            delay,
            started: false,
        });
    }

    pub fn clear(&mut self) {
        self.queue.push_back(Segment::Clear);
    }

    pub fn is_busy(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Steps that are due at `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<Step> {
        let mut steps = Vec::new();
        while let Some(segment) = self.queue.front_mut() {
            match segment {
                Segment::Clear => steps.push(Step::Clear),
                Segment::Text {
                    chars,
                    delay,
                    started,
                } => {
                    if !*started {
                        *started = true;
                        self.clock = now;
                        steps.push(Step::NewLine);
                    }

                    if delay.is_zero() {
                        steps.extend(chars.drain(..).map(Step::from));
                    } else {
                        let elapsed = now.saturating_duration_since(self.clock);
                        let due = (elapsed.as_nanos() / delay.as_nanos()) as usize;
                        let take = due.min(chars.len());
                        steps.extend(chars.drain(..take).map(Step::from));
                        self.clock += *delay * take as u32;
                        if !chars.is_empty() {
                            break;
                        }
                    }
                }
            }
            self.queue.pop_front();
        }
        steps
    }

    /// Everything still queued, ignoring delays.
    pub fn flush(&mut self) -> Vec<Step> {
        let mut steps = Vec::new();
        for segment in self.queue.drain(..) {
            match segment {
                Segment::Clear => steps.push(Step::Clear),
                Segment::Text { chars, started, .. } => {
                    if !started {
                        steps.push(Step::NewLine);
                    }
                    steps.extend(chars.into_iter().map(Step::from));
                }
            }
        }
        steps
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_MS: Duration = Duration::from_millis(10);

    fn text(steps: &[Step]) -> String {
        steps
            .iter()
            .map(|step| match step {
                Step::NewLine => '|',
                Step::Char(c) => *c,
                Step::Clear => '#',
            })
            .collect()
    }

    #[test]
    fn test_zero_delay_shows_everything() {
        let mut typewriter = Typewriter::new();
        typewriter.push("abc", Duration::ZERO);
        typewriter.push("de", Duration::ZERO);

        assert_eq!(text(&typewriter.advance(Instant::now())), "|abc|de");
        assert!(!typewriter.is_busy());
    }

    #[test]
    fn test_characters_follow_elapsed_time() {
        let start = Instant::now();
        let mut typewriter = Typewriter::new();
        typewriter.push("hello", TEN_MS);

        assert_eq!(text(&typewriter.advance(start)), "|");
        assert_eq!(text(&typewriter.advance(start + Duration::from_millis(25))), "he");
        assert_eq!(text(&typewriter.advance(start + Duration::from_millis(29))), "");
        assert_eq!(text(&typewriter.advance(start + Duration::from_millis(50))), "llo");
        assert!(!typewriter.is_busy());
    }

    #[test]
    fn test_embedded_newlines_start_lines() {
        let mut typewriter = Typewriter::new();
        typewriter.push("a\nb", Duration::ZERO);

        assert_eq!(
            typewriter.advance(Instant::now()),
            vec![Step::NewLine, Step::Char('a'), Step::NewLine, Step::Char('b')]
        );
    }

    #[test]
    fn test_clear_keeps_queue_order() {
        let mut typewriter = Typewriter::new();
        typewriter.push("old", Duration::ZERO);
        typewriter.clear();
        typewriter.push("new", Duration::ZERO);

        assert_eq!(text(&typewriter.advance(Instant::now())), "|old#|new");
    }

    #[test]
    fn test_slow_segment_holds_later_ones() {
        let start = Instant::now();
        let mut typewriter = Typewriter::new();
        typewriter.push("ab", TEN_MS);
        typewriter.push("instant", Duration::ZERO);

        assert_eq!(text(&typewriter.advance(start + Duration::from_millis(5))), "|");
        assert!(typewriter.is_busy());
    }

    #[test]
    fn test_flush_skips_remaining_delay() {
        let start = Instant::now();
        let mut typewriter = Typewriter::new();
        typewriter.push("abcdef", TEN_MS);
        typewriter.push("next", TEN_MS);

        assert_eq!(text(&typewriter.advance(start + Duration::from_millis(20))), "|ab");
        assert_eq!(text(&typewriter.flush()), "cdef|next");
        assert!(!typewriter.is_busy());
    }
}
