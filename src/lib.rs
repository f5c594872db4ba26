//! Folio is the progressive-visibility and scroll-animation engine behind a
//! portfolio site.
//!
//! It decides *when* expensive decorative subtrees are activated, keeps their
//! failures contained, and drives time- and scroll-based state deterministically
//! under repeated, out-of-order host signals.
//!
//! # Components
//!
//! - [`VisibilityGate`]: one-way proximity latch over an [`ObserverHub`]
//! - [`DeferredSlot`] / [`ModuleRegistry`]: load-on-first-visibility with fetch
//!   deduplication
//! - [`ResilientViewport`]: GPU scene host with a [`FaultBoundary`] and
//!   context-loss handling
//! - [`ScrollTimeline`]: scroll-scrubbed multi-phase timeline items
//! - [`ThresholdCounter`] / [`CounterGroup`]: visibility-triggered count-up
//! - [`PageReadySignal`]: startup overlay dismissal
//!
//! Browser surfaces (frames, timers, intersection observation, canvases) are
//! explicit host objects driven by a virtual clock ([`Scheduler`]). A
//! [`PageSession`] wires everything together and consumes [`PageEvent`]s.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod config;
mod contact;
mod counter;
mod effects;
mod foundation;
mod hero;
mod loader;
mod page;
mod ready;
mod sched;
mod timeline;
mod viewport;
mod visibility;

pub use crate::foundation::core::{ElementId, Millis, Point, Rect, Rgb, Vec2, Viewport};
pub use crate::foundation::error::{FolioError, FolioResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::reveal::{Reveal, RevealPose, RevealSpec};
pub use crate::config::EngineConfig;
pub use crate::contact::form::{
    ContactController, ContactForm, GENERIC_FAILURE, MessageTransport, SENT_NOTICE_MS,
    SubmitStatus,
};
pub use crate::contact::relay::{
    MailRelay, OutgoingMail, RelayCredentials, RelayRequest, RelayResponse, RelaySettings,
    handle as handle_relay,
};
pub use crate::counter::{
    COUNT_DURATION_MS, CounterGroup, CounterPhase, CounterSnapshot, CounterTarget, STAGGER_MS,
    ThresholdCounter, TracePoint, default_targets, eased_count, trace as counter_trace,
};
pub use crate::effects::glow::{GLOW_LEAD_DEG, GlowChannel, glow_angle};
pub use crate::hero::roles::{ROLE_PERIOD_MS, RoleFrame, RoleTicker, default_roles};
pub use crate::loader::registry::{Completer, LoadOutcome, LoadPhase, ModuleId, ModuleRegistry};
pub use crate::loader::slot::{DeferredSlot, ModuleSource, SlotView};
pub use crate::page::scenario::{
    ComponentSpec, CounterTile, ElementLayout, PageScenario, ViewportSize,
};
pub use crate::page::session::{
    CounterGroupSnapshot, LayoutBox, LazySceneSnapshot, PageEvent, PageSession, PageSnapshot,
    SceneModule, SceneSpec, ViewportSnapshot,
};
pub use crate::ready::hook::OverlayHookRegistry;
pub use crate::ready::signal::{OverlayPhase, PageReadySignal, PageReadyState};
pub use crate::sched::host::{LoopControl, LoopHandle, Scheduler, TaskHandle};
pub use crate::sched::liveness::Liveness;
pub use crate::timeline::phase::{PhaseKind, PhaseSpec, PhaseVisuals, RING_CIRCUMFERENCE};
pub use crate::timeline::scroll::{ScrollExtent, ScrollTimeline, TimelineItem, TimelineSample};
pub use crate::timeline::trigger::TriggerSpec;
pub use crate::viewport::boundary::{Fallback, FaultBoundary, FaultChannel, RenderResult};
pub use crate::viewport::resilient::{
    PENDING_GLYPH, ResilientViewport, ViewportState, ViewportView,
};
pub use crate::viewport::scene::{
    MeshFrame, PhotoFrameScene, Scene, SceneFrame, TechLogoScene, logo_url_for,
};
pub use crate::viewport::surface::{ContextLostEvent, ListenerId, Surface};
pub use crate::visibility::gate::{VisibilityGate, VisibilityRecord};
pub use crate::visibility::observer::{
    IntersectionEntry, ObservationHandle, ObserveOptions, ObserverAction, ObserverHub, intersect,
};
