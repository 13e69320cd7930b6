use rand::Rng;

use crate::glyph::random_glyph;
use crate::plan::TransitionPlan;

/// Per-tick probability that an in-flight position swaps its glyph.
pub const DEFAULT_GLYPH_CHANCE: f64 = 0.28;

/// Class attached to in-flight glyphs in [`RenderedFrame::markup`].
pub const IN_FLIGHT_CLASS: &str = "dud";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// A character outside its scramble window (original or settled).
    Plain(char),
    /// A substitute glyph for a position still scrambling.
    InFlight(char),
}

impl Segment {
    pub fn as_char(&self) -> char {
        match *self {
            Segment::Plain(c) | Segment::InFlight(c) => c,
        }
    }
}

/// Output of a single [`render`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub frame: u32,
    pub segments: Vec<Segment>,
    /// Every position had reached its end frame.
    pub settled: bool,
}

impl RenderedFrame {
    /// The characters as displayed, in-flight glyphs included.
    pub fn text(&self) -> String {
        self.segments.iter().map(Segment::as_char).collect()
    }

    pub fn in_flight_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::InFlight(_)))
            .count()
    }

    /// Markup fragment: escaped plain text with each in-flight glyph wrapped
    /// in `<span class="dud">`.
    pub fn markup(&self) -> String {
        let mut out = String::with_capacity(self.segments.len() * 2);
        for segment in &self.segments {
            match *segment {
                Segment::Plain(c) => push_escaped(&mut out, c),
                Segment::InFlight(c) => {
                    out.push_str("<span class=\"");
                    out.push_str(IN_FLIGHT_CLASS);
                    out.push_str("\">");
                    push_escaped(&mut out, c);
                    out.push_str("</span>");
                }
            }
        }
        out
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

/// Clamp `chance` into `[0, 1]`. NaN falls back to [`DEFAULT_GLYPH_CHANCE`].
pub fn glyph_chance_or_default(chance: f64) -> f64 {
    if chance.is_nan() {
        DEFAULT_GLYPH_CHANCE
    } else {
        chance.clamp(0.0, 1.0)
    }
}

/// Render `plan` as it looks on `frame`.
///
/// In-flight positions re-roll their glyph with probability `glyph_chance`
/// (see [`glyph_chance_or_default`]); a position entering its window with no
/// glyph yet always rolls. That re-roll is the only mutation performed on
/// the plan.
pub fn render<R: Rng + ?Sized>(
    frame: u32,
    plan: &mut TransitionPlan,
    rng: &mut R,
    glyph_chance: f64,
) -> RenderedFrame {
    let glyph_chance = glyph_chance_or_default(glyph_chance);
    let mut segments = Vec::with_capacity(plan.len());
    let mut settled = true;

    for record in plan.records_mut() {
        if record.is_settled_at(frame) {
            if let Some(c) = record.to_char {
                segments.push(Segment::Plain(c));
            }
            continue;
        }

        settled = false;
        if record.is_in_flight_at(frame) {
            let glyph = match record.current_glyph {
                Some(glyph) if !rng.gen_bool(glyph_chance) => glyph,
                _ => random_glyph(rng),
            };
            record.current_glyph = Some(glyph);
            segments.push(Segment::InFlight(glyph));
        } else if let Some(c) = record.from_char {
            segments.push(Segment::Plain(c));
        }
    }

    RenderedFrame {
        frame,
        segments,
        settled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GLYPHS;
    use crate::plan::{PlanOptions, SpeedRange};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plan(from: &str, to: &str, min: u32, max: u32, rng: &mut StdRng) -> TransitionPlan {
        let options = PlanOptions::new(SpeedRange::new(min, max));
        TransitionPlan::build(from, to, &options, rng)
    }

    #[test]
    fn shows_original_before_any_start() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut plan = plan("before", "after!", 5, 9, &mut rng);
        // Force every start past frame 0.
        for record in plan.records_mut() {
            record.start_frame += 1;
            record.end_frame += 1;
        }
        let frame = render(0, &mut plan, &mut rng, DEFAULT_GLYPH_CHANCE);
        assert_eq!(frame.text(), "before");
        assert_eq!(frame.in_flight_count(), 0);
        assert!(!frame.settled);
    }

    #[test]
    fn shows_target_once_settled() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut plan = plan("hello", "hi", 2, 4, &mut rng);
        let end = plan.last_end_frame();
        let frame = render(end, &mut plan, &mut rng, DEFAULT_GLYPH_CHANCE);
        assert_eq!(frame.text(), "hi");
        assert!(frame.settled);
        assert_eq!(frame.markup(), "hi");
    }

    #[test]
    fn in_flight_positions_show_glyphs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut plan = plan("aaaa", "bbbb", 5, 5, &mut rng);
        for record in plan.records_mut() {
            record.start_frame = 0;
            record.end_frame = 5;
        }
        let frame = render(2, &mut plan, &mut rng, DEFAULT_GLYPH_CHANCE);
        assert_eq!(frame.in_flight_count(), 4);
        for segment in &frame.segments {
            assert!(GLYPHS.contains(&segment.as_char()));
        }
        assert!(plan.records().iter().all(|r| r.current_glyph.is_some()));
    }

    #[test]
    fn zero_chance_keeps_first_glyph() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut plan = plan("abcdef", "uvwxyz", 30, 30, &mut rng);
        let start = plan.records().iter().map(|r| r.start_frame).max().unwrap();
        render(start, &mut plan, &mut rng, 0.0);
        let rolled: Vec<_> = plan.records().iter().map(|r| r.current_glyph).collect();
        for frame in start + 1..start + 20 {
            render(frame, &mut plan, &mut rng, 0.0);
        }
        let later: Vec<_> = plan.records().iter().map(|r| r.current_glyph).collect();
        assert_eq!(rolled, later);
    }

    fn long_flight(rng: &mut StdRng) -> TransitionPlan {
        let mut plan = plan("abcdefgh", "stuvwxyz", 1, 1, rng);
        for record in plan.records_mut() {
            record.start_frame = 0;
            record.end_frame = 200;
        }
        plan
    }

    #[test]
    fn full_chance_rerolls_glyphs() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut plan = long_flight(&mut rng);
        render(0, &mut plan, &mut rng, 1.0);

        let mut changes = 0;
        for frame in 1..100 {
            let before: Vec<_> = plan.records().iter().map(|r| r.current_glyph).collect();
            render(frame, &mut plan, &mut rng, 1.0);
            let after: Vec<_> = plan.records().iter().map(|r| r.current_glyph).collect();
            changes += before.iter().zip(&after).filter(|(b, a)| b != a).count();
        }
        assert!(changes > 0);
    }

    #[test]
    fn default_chance_rerolls_some_ticks_but_not_all() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut plan = long_flight(&mut rng);
        render(0, &mut plan, &mut rng, DEFAULT_GLYPH_CHANCE);

        let mut changes = 0;
        let mut ticks = 0;
        for frame in 1..150 {
            let before: Vec<_> = plan.records().iter().map(|r| r.current_glyph).collect();
            render(frame, &mut plan, &mut rng, DEFAULT_GLYPH_CHANCE);
            for (b, a) in before.iter().zip(plan.records().iter().map(|r| r.current_glyph)) {
                ticks += 1;
                if *b != a {
                    changes += 1;
                }
            }
        }
        // A re-roll can land on the same glyph, so changes undercount re-rolls.
        assert!(changes > ticks / 10, "{changes} of {ticks}");
        assert!(changes < ticks / 2, "{changes} of {ticks}");
    }

    #[test]
    fn nan_chance_uses_default() {
        assert_eq!(glyph_chance_or_default(f64::NAN), DEFAULT_GLYPH_CHANCE);
        assert_eq!(glyph_chance_or_default(-1.0), 0.0);
        assert_eq!(glyph_chance_or_default(7.0), 1.0);

        let mut rng = StdRng::seed_from_u64(8);
        let mut plan = long_flight(&mut rng);
        for frame in 0..20 {
            let rendered = render(frame, &mut plan, &mut rng, f64::NAN);
            assert_eq!(rendered.in_flight_count(), 8);
        }
    }

    #[test]
    fn markup_wraps_and_escapes_in_flight_glyphs() {
        let frame = RenderedFrame {
            frame: 0,
            segments: vec![
                Segment::Plain('a'),
                Segment::InFlight('<'),
                Segment::Plain('&'),
            ],
            settled: false,
        };
        assert_eq!(frame.markup(), "a<span class=\"dud\">&lt;</span>&amp;");
        assert_eq!(frame.text(), "a<&");
    }

    #[test]
    fn shrinking_positions_render_empty() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut plan = plan("hello", "", 1, 1, &mut rng);
        let frame = render(plan.last_end_frame(), &mut plan, &mut rng, 1.0);
        assert!(frame.segments.is_empty());
        assert!(frame.settled);
    }
}
