//! Scroll-synchronized table-of-contents tracking.
//!
//! The tracker is a plain state machine: all viewport geometry comes in
//! through [`ViewportProbe`], so the selection and clipping rules are
//! testable with synthetic geometry and no rendering surface. Event bursts
//! are coalesced latest-wins behind a pending-frame flag; at most one
//! recomputation runs per frame.

use std::collections::HashSet;

use crate::models::Heading;

/// Padding added below the fixed banner and navigation bar.
pub const SCROLL_OFFSET_PAD: f32 = 24.0;
pub const DEFAULT_BANNER_HEIGHT: f32 = 40.0;
pub const DEFAULT_NAVBAR_HEIGHT: f32 = 64.0;
/// Active window around the scroll offset, in viewport units.
const ACTIVE_WINDOW_ABOVE: f32 = 150.0;
const ACTIVE_WINDOW_BELOW: f32 = 50.0;
/// Fallback slack past the scroll threshold when nothing intersects.
const FALLBACK_SLACK: f32 = 100.0;
/// Sticky top position of the TOC panel.
pub const PANEL_STICKY_TOP: f32 = 96.0;
/// Gap kept between the panel bottom and the footer top.
const PANEL_FOOTER_GAP: f32 = 24.0;
pub const MIN_PANEL_HEIGHT: f32 = 150.0;
/// Subtracted from the viewport height for the default panel height.
const DEFAULT_PANEL_INSET: f32 = 128.0;

/// Viewport-relative bounding box of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    pub top: f32,
    pub height: f32,
}

/// The capability surface the tracker runs against. Heights are `None`
/// when the corresponding fixed element is absent; the tracker applies the
/// default geometry. `observe`/`unobserve` register interest in
/// intersection notifications for one heading id.
pub trait ViewportProbe {
    fn scroll_y(&self) -> f32;
    fn viewport_height(&self) -> f32;
    fn banner_height(&self) -> Option<f32>;
    fn navbar_height(&self) -> Option<f32>;
    fn heading_box(&self, id: &str) -> Option<ElementBox>;
    fn footer_box(&self) -> Option<ElementBox>;
    fn observe(&mut self, id: &str);
    fn unobserve(&mut self, id: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum TocEvent {
    Scroll,
    Resize,
    Intersection { id: String, entering: bool },
}

/// Side effects the host must perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TocCommand {
    SmoothScrollTo(f32),
    PushHistory(String),
}

#[derive(Debug)]
pub struct TocTracker {
    headings: Vec<Heading>,
    intersecting: HashSet<String>,
    active_id: Option<String>,
    panel_max_height: f32,
    frame_pending: bool,
}

impl TocTracker {
    /// Builds the tracker for one mounted article view. With no headings it
    /// stays idle: nothing is observed and nothing renders. Otherwise every
    /// heading is observed and an initial frame runs immediately.
    pub fn mount<P: ViewportProbe>(probe: &mut P, headings: Vec<Heading>) -> Self {
        let mut tracker = Self {
            headings,
            intersecting: HashSet::new(),
            active_id: None,
            panel_max_height: default_panel_height(probe.viewport_height()),
            frame_pending: false,
        };
        if tracker.headings.is_empty() {
            return tracker;
        }
        for heading in &tracker.headings {
            probe.observe(&heading.id);
        }
        tracker.frame_pending = true;
        tracker.run_frame(&*probe);
        tracker
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.headings.is_empty()
    }

    #[must_use]
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    #[must_use]
    pub fn panel_max_height(&self) -> f32 {
        self.panel_max_height
    }

    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.frame_pending
    }

    /// Event intake. Only flags work for the next frame (latest-wins) and
    /// folds intersection deltas into the candidate set; no geometry is
    /// read here.
    pub fn handle(&mut self, event: TocEvent) {
        if self.is_idle() {
            return;
        }
        match event {
            TocEvent::Scroll | TocEvent::Resize => {}
            TocEvent::Intersection { id, entering } => {
                if entering {
                    self.intersecting.insert(id);
                } else {
                    self.intersecting.remove(&id);
                }
            }
        }
        self.frame_pending = true;
    }

    /// One animation-frame tick: recomputes the active heading and the
    /// panel height, then clears the pending flag. Returns whether any
    /// work ran; dropped bursts between frames coalesce into one run.
    pub fn run_frame<P: ViewportProbe + ?Sized>(&mut self, probe: &P) -> bool {
        if self.is_idle() || !self.frame_pending {
            return false;
        }
        self.frame_pending = false;
        self.recompute_active(probe);
        self.recompute_panel_height(probe);
        true
    }

    /// TOC link activation: smooth-scroll the viewport so the heading lands
    /// below the fixed chrome, then push the fragment onto the history.
    /// The command order is part of the contract.
    #[must_use]
    pub fn activate<P: ViewportProbe + ?Sized>(&self, probe: &P, id: &str) -> Vec<TocCommand> {
        if self.is_idle() {
            return Vec::new();
        }
        let Some(target) = probe.heading_box(id) else {
            return Vec::new();
        };
        let offset = scroll_offset(probe);
        let absolute_top = probe.scroll_y() + target.top;
        vec![
            TocCommand::SmoothScrollTo((absolute_top - offset).max(0.0)),
            TocCommand::PushHistory(id.to_string()),
        ]
    }

    /// Teardown: unobserves every heading and drops all pending work. After
    /// this, no event can produce a frame against the dead view.
    pub fn unmount<P: ViewportProbe>(&mut self, probe: &mut P) {
        for heading in &self.headings {
            probe.unobserve(&heading.id);
        }
        self.headings.clear();
        self.intersecting.clear();
        self.active_id = None;
        self.frame_pending = false;
    }

    fn recompute_active<P: ViewportProbe + ?Sized>(&mut self, probe: &P) {
        let offset = scroll_offset(probe);
        let scroll_y = probe.scroll_y();
        let threshold = scroll_y + offset;

        let mut best: Option<(usize, f32)> = None;
        // Phase one: intersecting headings inside the active window,
        // closest to the threshold.
        for (index, heading) in self.headings.iter().enumerate() {
            if !self.intersecting.contains(&heading.id) {
                continue;
            }
            let Some(element) = probe.heading_box(&heading.id) else {
                continue;
            };
            if element.top > offset + ACTIVE_WINDOW_BELOW
                || element.top < offset - ACTIVE_WINDOW_ABOVE
            {
                continue;
            }
            let distance = (scroll_y + element.top - threshold).abs();
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }

        // Phase two: anything already scrolled past (within slack), so an
        // active heading exists between exact intersection events.
        if best.is_none() {
            for (index, heading) in self.headings.iter().enumerate() {
                let Some(element) = probe.heading_box(&heading.id) else {
                    continue;
                };
                let absolute_top = scroll_y + element.top;
                if absolute_top > threshold + FALLBACK_SLACK {
                    continue;
                }
                let distance = (absolute_top - threshold).abs();
                if best.is_none_or(|(_, closest)| distance < closest) {
                    best = Some((index, distance));
                }
            }
        }

        // No candidate: keep the previous active heading.
        if let Some((index, _)) = best {
            self.active_id = Some(self.headings[index].id.clone());
        }
    }

    fn recompute_panel_height<P: ViewportProbe + ?Sized>(&mut self, probe: &P) {
        let viewport_height = probe.viewport_height();
        let Some(footer) = probe.footer_box() else {
            self.panel_max_height = default_panel_height(viewport_height);
            return;
        };
        if footer.top < viewport_height && footer.top > PANEL_STICKY_TOP {
            let available = footer.top - PANEL_STICKY_TOP - PANEL_FOOTER_GAP;
            self.panel_max_height = available.max(MIN_PANEL_HEIGHT);
        } else if footer.top <= PANEL_STICKY_TOP {
            self.panel_max_height = MIN_PANEL_HEIGHT;
        } else {
            self.panel_max_height = default_panel_height(viewport_height);
        }
    }
}

fn scroll_offset<P: ViewportProbe + ?Sized>(probe: &P) -> f32 {
    let banner = probe.banner_height().unwrap_or(DEFAULT_BANNER_HEIGHT);
    let navbar = probe.navbar_height().unwrap_or(DEFAULT_NAVBAR_HEIGHT);
    banner + navbar + SCROLL_OFFSET_PAD
}

fn default_panel_height(viewport_height: f32) -> f32 {
    viewport_height - DEFAULT_PANEL_INSET
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct SyntheticViewport {
        scroll_y: f32,
        viewport_height: f32,
        boxes: HashMap<String, f32>,
        footer_top: Option<f32>,
        observed: HashSet<String>,
    }

    impl SyntheticViewport {
        fn new() -> Self {
            Self {
                scroll_y: 0.0,
                viewport_height: 800.0,
                boxes: HashMap::new(),
                footer_top: None,
                observed: HashSet::new(),
            }
        }

        /// Places a heading at an absolute document position.
        fn place(&mut self, id: &str, absolute_top: f32) {
            self.boxes.insert(id.to_string(), absolute_top);
        }
    }

    impl ViewportProbe for SyntheticViewport {
        fn scroll_y(&self) -> f32 {
            self.scroll_y
        }

        fn viewport_height(&self) -> f32 {
            self.viewport_height
        }

        fn banner_height(&self) -> Option<f32> {
            None
        }

        fn navbar_height(&self) -> Option<f32> {
            None
        }

        fn heading_box(&self, id: &str) -> Option<ElementBox> {
            self.boxes.get(id).map(|absolute_top| ElementBox {
                top: absolute_top - self.scroll_y,
                height: 32.0,
            })
        }

        fn footer_box(&self) -> Option<ElementBox> {
            self.footer_top.map(|absolute_top| ElementBox {
                top: absolute_top - self.scroll_y,
                height: 200.0,
            })
        }

        fn observe(&mut self, id: &str) {
            self.observed.insert(id.to_string());
        }

        fn unobserve(&mut self, id: &str) {
            self.observed.remove(id);
        }
    }

    fn heading(id: &str) -> Heading {
        Heading {
            id: id.to_string(),
            text: id.to_string(),
            level: 2,
        }
    }

    // Default offset: banner 40 + navbar 64 + pad 24.
    const OFFSET: f32 = 128.0;

    #[test]
    fn empty_heading_set_stays_idle_and_observes_nothing() {
        let mut viewport = SyntheticViewport::new();
        let mut tracker = TocTracker::mount(&mut viewport, Vec::new());
        assert!(tracker.is_idle());
        assert!(viewport.observed.is_empty());

        tracker.handle(TocEvent::Scroll);
        assert!(!tracker.has_pending_frame());
        assert!(!tracker.run_frame(&viewport));
        assert!(tracker.activate(&viewport, "anything").is_empty());
    }

    #[test]
    fn mount_observes_every_heading_and_runs_an_initial_frame() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("cause", 100.0);
        viewport.place("fix", 900.0);

        let tracker = TocTracker::mount(&mut viewport, vec![heading("cause"), heading("fix")]);
        assert_eq!(viewport.observed.len(), 2);
        assert!(!tracker.has_pending_frame());
        // "cause" at absolute 100 is within threshold + slack (128 + 100).
        assert_eq!(tracker.active_id(), Some("cause"));
    }

    #[test]
    fn intersecting_heading_near_offset_wins_phase_one() {
        let mut viewport = SyntheticViewport::new();
        viewport.scroll_y = 1000.0;
        // Viewport-relative tops: a at 120 (inside window), b at 400 (out).
        viewport.place("a", 1120.0);
        viewport.place("b", 1400.0);

        let mut tracker = TocTracker::mount(&mut viewport, vec![heading("a"), heading("b")]);
        tracker.handle(TocEvent::Intersection {
            id: "a".to_string(),
            entering: true,
        });
        tracker.handle(TocEvent::Intersection {
            id: "b".to_string(),
            entering: true,
        });
        assert!(tracker.run_frame(&viewport));
        assert_eq!(tracker.active_id(), Some("a"));
    }

    #[test]
    fn fallback_selects_last_heading_scrolled_past() {
        let mut viewport = SyntheticViewport::new();
        viewport.scroll_y = 2000.0;
        // All headings far above the viewport; none intersecting.
        viewport.place("intro", 100.0);
        viewport.place("details", 900.0);
        viewport.place("far-below", 5000.0);

        let mut tracker = TocTracker::mount(
            &mut viewport,
            vec![heading("intro"), heading("details"), heading("far-below")],
        );
        tracker.handle(TocEvent::Scroll);
        assert!(tracker.run_frame(&viewport));
        // Threshold is 2128; "details" (900) is the closest one at or below
        // threshold + 100; "far-below" (5000) is past it.
        assert_eq!(tracker.active_id(), Some("details"));
    }

    #[test]
    fn no_candidate_keeps_previous_active_heading() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("only", 60.0);
        let mut tracker = TocTracker::mount(&mut viewport, vec![heading("only")]);
        assert_eq!(tracker.active_id(), Some("only"));

        // Scroll far above every heading: phase two finds nothing.
        viewport.scroll_y = 0.0;
        viewport.place("only", 5000.0);
        tracker.handle(TocEvent::Scroll);
        tracker.run_frame(&viewport);
        assert_eq!(tracker.active_id(), Some("only"));
    }

    #[test]
    fn event_bursts_coalesce_into_one_frame() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("a", 100.0);
        let mut tracker = TocTracker::mount(&mut viewport, vec![heading("a")]);

        for _ in 0..10 {
            tracker.handle(TocEvent::Scroll);
            tracker.handle(TocEvent::Resize);
        }
        assert!(tracker.has_pending_frame());
        assert!(tracker.run_frame(&viewport));
        // The burst was folded into the single run above.
        assert!(!tracker.run_frame(&viewport));
    }

    #[test]
    fn footer_in_view_clips_the_panel_height() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("a", 100.0);
        viewport.footer_top = Some(600.0);

        let mut tracker = TocTracker::mount(&mut viewport, vec![heading("a")]);
        tracker.handle(TocEvent::Scroll);
        tracker.run_frame(&viewport);
        // 600 - 96 - 24 = 480.
        assert_eq!(tracker.panel_max_height(), 480.0);
    }

    #[test]
    fn panel_height_never_drops_below_the_minimum() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("a", 100.0);
        viewport.footer_top = Some(150.0);

        let mut tracker = TocTracker::mount(&mut viewport, vec![heading("a")]);
        tracker.handle(TocEvent::Scroll);
        tracker.run_frame(&viewport);
        // 150 - 96 - 24 = 30, floored at the minimum.
        assert_eq!(tracker.panel_max_height(), MIN_PANEL_HEIGHT);

        // Footer past the sticky offset holds the minimum.
        viewport.footer_top = Some(50.0);
        tracker.handle(TocEvent::Scroll);
        tracker.run_frame(&viewport);
        assert_eq!(tracker.panel_max_height(), MIN_PANEL_HEIGHT);
    }

    #[test]
    fn missing_footer_uses_the_viewport_default_height() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("a", 100.0);
        let mut tracker = TocTracker::mount(&mut viewport, vec![heading("a")]);
        tracker.handle(TocEvent::Resize);
        tracker.run_frame(&viewport);
        assert_eq!(tracker.panel_max_height(), 800.0 - 128.0);

        // Footer below the viewport bottom also keeps the default.
        viewport.footer_top = Some(2000.0);
        tracker.handle(TocEvent::Scroll);
        tracker.run_frame(&viewport);
        assert_eq!(tracker.panel_max_height(), 800.0 - 128.0);
    }

    #[test]
    fn activation_scrolls_then_pushes_history() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("fix", 500.0);
        let tracker = TocTracker::mount(&mut viewport, vec![heading("fix")]);

        let commands = tracker.activate(&viewport, "fix");
        assert_eq!(
            commands,
            vec![
                TocCommand::SmoothScrollTo(500.0 - OFFSET),
                TocCommand::PushHistory("fix".to_string()),
            ]
        );
    }

    #[test]
    fn activation_near_document_top_floors_at_zero() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("intro", 40.0);
        let tracker = TocTracker::mount(&mut viewport, vec![heading("intro")]);

        let commands = tracker.activate(&viewport, "intro");
        assert_eq!(commands[0], TocCommand::SmoothScrollTo(0.0));
    }

    #[test]
    fn activation_of_unknown_heading_does_nothing() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("fix", 500.0);
        let tracker = TocTracker::mount(&mut viewport, vec![heading("fix")]);
        assert!(tracker.activate(&viewport, "ghost").is_empty());
    }

    #[test]
    fn unmount_detaches_every_observer_and_drops_pending_work() {
        let mut viewport = SyntheticViewport::new();
        viewport.place("a", 100.0);
        viewport.place("b", 400.0);
        let mut tracker = TocTracker::mount(&mut viewport, vec![heading("a"), heading("b")]);

        tracker.handle(TocEvent::Scroll);
        tracker.unmount(&mut viewport);
        assert!(viewport.observed.is_empty());
        assert!(tracker.is_idle());
        assert!(!tracker.has_pending_frame());

        // Events against the torn-down view never produce a frame.
        tracker.handle(TocEvent::Scroll);
        assert!(!tracker.run_frame(&viewport));
    }
}
