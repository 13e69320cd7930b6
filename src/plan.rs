use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range of frames a character spends scrambling.
///
/// Construction clamps instead of rejecting: `min_frames` is raised to 1 and
/// `max_frames` is raised to `min_frames`. `(20, 8)` therefore becomes
/// `(20, 20)` and `(0, 0)` becomes `(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct SpeedRange {
    min_frames: u32,
    max_frames: u32,
}

impl SpeedRange {
    pub const DEFAULT_MIN_FRAMES: u32 = 8;
    pub const DEFAULT_MAX_FRAMES: u32 = 20;

    pub fn new(min_frames: u32, max_frames: u32) -> Self {
        let min_frames = min_frames.max(1);
        Self {
            min_frames,
            max_frames: max_frames.max(min_frames),
        }
    }

    /// Whether `new(min_frames, max_frames)` would alter either bound.
    pub fn was_clamped(min_frames: u32, max_frames: u32) -> bool {
        let clamped = Self::new(min_frames, max_frames);
        clamped.min_frames != min_frames || clamped.max_frames != max_frames
    }

    pub fn min_frames(&self) -> u32 {
        self.min_frames
    }

    pub fn max_frames(&self) -> u32 {
        self.max_frames
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min_frames..=self.max_frames)
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_FRAMES, Self::DEFAULT_MAX_FRAMES)
    }
}

impl From<(u32, u32)> for SpeedRange {
    fn from((min_frames, max_frames): (u32, u32)) -> Self {
        Self::new(min_frames, max_frames)
    }
}

impl From<SpeedRange> for (u32, u32) {
    fn from(range: SpeedRange) -> Self {
        (range.min_frames, range.max_frames)
    }
}

/// Knobs for [`TransitionPlan::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    pub speed: SpeedRange,
    /// Width of the start window `[0, stagger_frames)`. Values below 1 are
    /// treated as 1, which starts every position on frame 0.
    pub stagger_frames: u32,
}

impl PlanOptions {
    pub const DEFAULT_STAGGER_FRAMES: u32 = 10;

    pub fn new(speed: SpeedRange) -> Self {
        Self {
            speed,
            stagger_frames: Self::DEFAULT_STAGGER_FRAMES,
        }
    }

    pub fn with_stagger(mut self, stagger_frames: u32) -> Self {
        self.stagger_frames = stagger_frames;
        self
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::new(SpeedRange::default())
    }
}

/// Scramble window for a single character position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    /// Character shown before `start_frame`; `None` if the old text was shorter.
    pub from_char: Option<char>,
    /// Character shown from `end_frame` on; `None` if the new text is shorter.
    pub to_char: Option<char>,
    pub start_frame: u32,
    /// Always greater than `start_frame`.
    pub end_frame: u32,
    /// Glyph displayed while in flight. Only meaningful in `[start_frame, end_frame)`.
    pub current_glyph: Option<char>,
}

impl TransitionRecord {
    pub fn is_settled_at(&self, frame: u32) -> bool {
        frame >= self.end_frame
    }

    pub fn is_in_flight_at(&self, frame: u32) -> bool {
        frame >= self.start_frame && frame < self.end_frame
    }
}

/// One [`TransitionRecord`] per character position, in text order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPlan {
    records: Vec<TransitionRecord>,
}

impl TransitionPlan {
    /// Build a fresh plan morphing `from` into `to`.
    ///
    /// The plan always covers `max(len(from), len(to))` positions, counted
    /// in chars.
    pub fn build<R: Rng + ?Sized>(
        from: &str,
        to: &str,
        options: &PlanOptions,
        rng: &mut R,
    ) -> Self {
        let from: Vec<char> = from.chars().collect();
        let to: Vec<char> = to.chars().collect();
        let stagger = options.stagger_frames.max(1);

        let records = (0..from.len().max(to.len()))
            .map(|i| {
                let start_frame = rng.gen_range(0..stagger);
                let end_frame = start_frame.saturating_add(options.speed.sample(rng));
                TransitionRecord {
                    from_char: from.get(i).copied(),
                    to_char: to.get(i).copied(),
                    start_frame,
                    end_frame,
                    current_glyph: None,
                }
            })
            .collect();

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [TransitionRecord] {
        &mut self.records
    }

    /// Earliest frame at which any position starts scrambling.
    pub fn first_start_frame(&self) -> Option<u32> {
        self.records.iter().map(|r| r.start_frame).min()
    }

    /// Frame from which every position is settled.
    pub fn last_end_frame(&self) -> u32 {
        self.records.iter().map(|r| r.end_frame).max().unwrap_or(0)
    }

    pub fn is_settled_at(&self, frame: u32) -> bool {
        self.records.iter().all(|r| r.is_settled_at(frame))
    }

    pub fn from_text(&self) -> String {
        self.records.iter().filter_map(|r| r.from_char).collect()
    }

    pub fn to_text(&self) -> String {
        self.records.iter().filter_map(|r| r.to_char).collect()
    }
}
