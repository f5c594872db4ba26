use std::collections::BTreeMap;

use crate::animation::reveal::{Reveal, RevealPose, RevealSpec};
use crate::foundation::core::{ElementId, Millis, Viewport};
use crate::foundation::error::{FolioError, FolioResult};
use crate::foundation::math::unit_progress;
use crate::timeline::phase::PhaseVisuals;
use crate::timeline::trigger::{CARD_START, CONTENT_START, ITEM_ENTRY, ITEM_EXIT, TriggerSpec};
use crate::visibility::observer::ObserverHub;

/// Registration of one timeline entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineItem {
    /// Element whose position drives the scrubbed phases.
    pub id: ElementId,
    /// Text block revealed once; defaults to `id`.
    #[serde(default)]
    pub content: Option<ElementId>,
    /// Card slid in once; defaults to `id`.
    #[serde(default)]
    pub card: Option<ElementId>,
    #[serde(default = "default_entry")]
    /// Scroll trigger at which progress is 0.
    pub entry: TriggerSpec,
    #[serde(default = "default_exit")]
    /// Scroll trigger at which progress is 1.
    pub exit: TriggerSpec,
}

fn default_entry() -> TriggerSpec {
    ITEM_ENTRY
}

fn default_exit() -> TriggerSpec {
    ITEM_EXIT
}

impl TimelineItem {
    /// Item with the stock triggers; text and card default to `id`.
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            content: None,
            card: None,
            entry: ITEM_ENTRY,
            exit: ITEM_EXIT,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
/// Entry and exit triggers resolved to absolute scroll offsets.
pub struct ScrollExtent {
    /// Scroll offset where progress starts.
    pub entry_y: f64,
    /// Scroll offset where progress reaches 1.
    pub exit_y: f64,
}

#[derive(Debug)]
struct OneShot {
    start_y: Option<f64>,
    reveal: Reveal,
}

impl OneShot {
    fn new(spec: RevealSpec) -> Self {
        Self {
            start_y: None,
            reveal: Reveal::new(spec),
        }
    }

    fn check(&mut self, scroll_y: f64, now: Millis) {
        if let Some(start_y) = self.start_y
            && scroll_y >= start_y
        {
            self.reveal.trigger(now);
        }
    }
}

#[derive(Debug)]
struct ItemState {
    item: TimelineItem,
    extent: Option<ScrollExtent>,
    progress: f64,
    content: OneShot,
    card: OneShot,
}

/// Per-item timeline state as seen by a renderer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineSample {
    /// Timeline element.
    pub id: ElementId,
    /// Resolved triggers, `None` until the element has layout.
    pub extent: Option<ScrollExtent>,
    /// Local progress in `[0, 1]`.
    pub progress: f64,
    /// Scrubbed phase visuals.
    pub visuals: PhaseVisuals,
    /// Text reveal pose.
    pub content: RevealPose,
    /// Card reveal pose.
    pub card: RevealPose,
}

/// Scroll-scrubbed timelines for a set of items.
///
/// Item progress is a pure function of the latest scroll offset and the
/// triggers resolved at the latest layout; it is recomputed from scratch on
/// every sample. The text and card reveals are the exception: they latch once
/// their start offset is crossed and then play on wall-clock time.
#[derive(Debug)]
pub struct ScrollTimeline {
    hub: ObserverHub,
    viewport: Option<Viewport>,
    items: BTreeMap<ElementId, ItemState>,
}

impl ScrollTimeline {
    /// `hub` provides the live element layout.
    pub fn new(hub: ObserverHub) -> Self {
        Self {
            hub,
            viewport: None,
            items: BTreeMap::new(),
        }
    }

    /// Add an item. Fails if `item.id` is already registered.
    pub fn register(&mut self, item: TimelineItem, now: Millis) -> FolioResult<()> {
        if self.items.contains_key(&item.id) {
            return Err(FolioError::validation(format!(
                "timeline item {:?} registered twice",
                item.id
            )));
        }
        let mut state = ItemState {
            item,
            extent: None,
            progress: 0.0,
            content: OneShot::new(RevealSpec::rise_text()),
            card: OneShot::new(RevealSpec::slide_card()),
        };
        if let Some(viewport) = self.viewport {
            resolve(&self.hub, &mut state, viewport);
            sample(&mut state, viewport, now);
        }
        self.items.insert(state.item.id, state);
        Ok(())
    }

    /// Remove an item. Returns whether it was registered.
    pub fn unregister(&mut self, id: ElementId) -> bool {
        self.items.remove(&id).is_some()
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item is registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// New scroll offset with unchanged layout.
    pub fn on_scroll(&mut self, viewport: Viewport, now: Millis) {
        if self.viewport.is_none() {
            self.on_resize(viewport, now);
            return;
        }
        self.viewport = Some(viewport);
        for state in self.items.values_mut() {
            sample(state, viewport, now);
        }
    }

    /// Layout or viewport size changed: re-resolve every trigger, then sample.
    #[tracing::instrument(skip(self), fields(items = self.items.len()))]
    pub fn on_resize(&mut self, viewport: Viewport, now: Millis) {
        self.viewport = Some(viewport);
        for state in self.items.values_mut() {
            resolve(&self.hub, state, viewport);
            sample(state, viewport, now);
        }
    }

    /// Local progress of `id`.
    pub fn progress(&self, id: ElementId) -> Option<f64> {
        self.items.get(&id).map(|s| s.progress)
    }

    /// Resolved triggers of `id`.
    pub fn extent(&self, id: ElementId) -> Option<ScrollExtent> {
        self.items.get(&id).and_then(|s| s.extent)
    }

    /// Scrubbed visuals of `id`.
    pub fn visuals(&self, id: ElementId) -> Option<PhaseVisuals> {
        self.items.get(&id).map(|s| PhaseVisuals::at(s.progress))
    }

    /// Whether the text reveal of `id` has latched.
    pub fn content_revealed(&self, id: ElementId) -> bool {
        self.items
            .get(&id)
            .is_some_and(|s| s.content.reveal.is_triggered())
    }

    /// Whether the card reveal of `id` has latched.
    pub fn card_revealed(&self, id: ElementId) -> bool {
        self.items
            .get(&id)
            .is_some_and(|s| s.card.reveal.is_triggered())
    }

    /// Full state of `id` at `now`.
    pub fn sample_item(&self, id: ElementId, now: Millis) -> Option<TimelineSample> {
        self.items.get(&id).map(|s| TimelineSample {
            id,
            extent: s.extent,
            progress: s.progress,
            visuals: PhaseVisuals::at(s.progress),
            content: s.content.reveal.sample(now),
            card: s.card.reveal.sample(now),
        })
    }

    /// Full state of every item, in registration order.
    pub fn samples(&self, now: Millis) -> Vec<TimelineSample> {
        self.items
            .keys()
            .filter_map(|&id| self.sample_item(id, now))
            .collect()
    }
}

fn resolve(hub: &ObserverHub, state: &mut ItemState, viewport: Viewport) {
    let item = &state.item;
    state.extent = hub.layout_of(item.id).map(|rect| ScrollExtent {
        entry_y: item.entry.resolve(rect, viewport),
        exit_y: item.exit.resolve(rect, viewport),
    });
    state.content.start_y = hub
        .layout_of(item.content.unwrap_or(item.id))
        .map(|rect| CONTENT_START.resolve(rect, viewport));
    state.card.start_y = hub
        .layout_of(item.card.unwrap_or(item.id))
        .map(|rect| CARD_START.resolve(rect, viewport));
    if state.extent.is_none() {
        tracing::debug!(item = ?item.id, "timeline item has no layout yet");
    }
}

fn sample(state: &mut ItemState, viewport: Viewport, now: Millis) {
    let scroll_y = viewport.scroll_y;
    state.progress = match state.extent {
        Some(ext) => unit_progress(scroll_y, ext.entry_y, ext.exit_y - ext.entry_y),
        None => 0.0,
    };
    state.content.check(scroll_y, now);
    state.card.check(scroll_y, now);
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scroll.rs"]
mod tests;
