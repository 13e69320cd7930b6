use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::plan::{PlanOptions, SpeedRange, TransitionPlan};
use crate::render::{RenderedFrame, DEFAULT_GLYPH_CHANCE};
use crate::scheduler::{FrameHost, FrameRequest, FrameScheduler};

/// What the host asks an animated text to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextProps {
    pub text: String,
    /// Falls back to [`SpeedRange::default`] when unset.
    pub speed: Option<SpeedRange>,
}

impl TextProps {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speed: None,
        }
    }

    pub fn with_speed(mut self, speed: SpeedRange) -> Self {
        self.speed = Some(speed);
        self
    }

    fn effective_speed(&self) -> SpeedRange {
        self.speed.unwrap_or_default()
    }
}

/// Per-instance tuning that does not change between targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrambleSettings {
    pub stagger_frames: u32,
    pub glyph_chance: f64,
    /// Fixed seed for reproducible runs; entropy otherwise.
    pub seed: Option<u64>,
}

impl Default for ScrambleSettings {
    fn default() -> Self {
        Self {
            stagger_frames: PlanOptions::DEFAULT_STAGGER_FRAMES,
            glyph_chance: DEFAULT_GLYPH_CHANCE,
            seed: None,
        }
    }
}

/// Lifecycle owner of one animated text.
///
/// Holds at most one live [`FrameScheduler`]. Any retarget cancels the
/// running scheduler before a new plan is built, and the new plan always
/// starts from whatever is on screen right now, half-scrambled or not.
#[derive(Debug)]
pub struct ScrambleText {
    settings: ScrambleSettings,
    rng: StdRng,
    props: Option<TextProps>,
    scheduler: Option<FrameScheduler>,
    displayed: String,
    last_frame: Option<RenderedFrame>,
    mounted: bool,
}

impl ScrambleText {
    pub fn new(settings: ScrambleSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            settings,
            rng,
            props: None,
            scheduler: None,
            displayed: String::new(),
            last_frame: None,
            mounted: false,
        }
    }

    /// Start from text the host already shows instead of nothing.
    pub fn with_displayed(mut self, text: impl Into<String>) -> Self {
        self.displayed = text.into();
        self
    }

    /// First observation of a target. Always starts an animation.
    pub fn mount<H: FrameHost + ?Sized>(&mut self, props: TextProps, host: &mut H) {
        self.mounted = true;
        self.restart(props, host);
    }

    /// New props from the host. Restarts only if the text or speed changed.
    pub fn update<H: FrameHost + ?Sized>(&mut self, props: TextProps, host: &mut H) {
        if !self.mounted {
            self.mount(props, host);
            return;
        }
        let unchanged = self.props.as_ref().is_some_and(|current| {
            current.text == props.text && current.effective_speed() == props.effective_speed()
        });
        if unchanged {
            return;
        }
        self.restart(props, host);
    }

    /// Forward a fired frame callback. Stale requests return `None`.
    pub fn on_frame<H: FrameHost + ?Sized>(
        &mut self,
        request: &FrameRequest,
        host: &mut H,
    ) -> Option<&RenderedFrame> {
        let scheduler = self.scheduler.as_mut()?;
        let rendered = scheduler.tick(request, &mut self.rng, host)?;
        self.displayed = rendered.text();
        self.last_frame = Some(rendered);
        self.last_frame.as_ref()
    }

    /// Host removed the element. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.cancel();
        }
        self.scheduler = None;
        self.mounted = false;
    }

    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    /// Markup for what is on screen now.
    pub fn markup(&self) -> String {
        match &self.last_frame {
            Some(frame) => frame.markup(),
            None => RenderedFrame {
                frame: 0,
                segments: self
                    .displayed
                    .chars()
                    .map(crate::render::Segment::Plain)
                    .collect(),
                settled: true,
            }
            .markup(),
        }
    }

    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.last_frame.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(FrameScheduler::is_running)
    }

    /// Frame counter of the active scheduler.
    pub fn frame(&self) -> Option<u32> {
        self.scheduler.as_ref().map(FrameScheduler::frame)
    }

    pub fn scheduler(&self) -> Option<&FrameScheduler> {
        self.scheduler.as_ref()
    }

    fn restart<H: FrameHost + ?Sized>(&mut self, props: TextProps, host: &mut H) {
        if let Some(mut previous) = self.scheduler.take() {
            previous.cancel();
        }

        let options = PlanOptions::new(props.effective_speed())
            .with_stagger(self.settings.stagger_frames);
        let plan = TransitionPlan::build(&self.displayed, &props.text, &options, &mut self.rng);
        tracing::debug!(
            from = %self.displayed,
            to = %props.text,
            positions = plan.len(),
            "retargeting scramble"
        );

        let mut scheduler = FrameScheduler::new(self.settings.glyph_chance);
        if let Err(err) = scheduler.start(plan, host) {
            // A fresh scheduler is always startable.
            tracing::error!("failed to start scramble: {err:#}");
        }
        self.scheduler = Some(scheduler);
        self.props = Some(props);
    }
}

impl Drop for ScrambleText {
    fn drop(&mut self) {
        self.unmount();
    }
}
