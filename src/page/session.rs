use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::animation::reveal::RevealPose;
use crate::config::EngineConfig;
use crate::contact::form::{ContactController, ContactForm, MessageTransport, SubmitStatus};
use crate::counter::{CounterGroup, CounterSnapshot, CounterTarget};
use crate::effects::glow::GlowChannel;
use crate::foundation::core::{ElementId, Millis, Point, Rect, Viewport};
use crate::foundation::error::{FolioError, FolioResult};
use crate::hero::roles::{RoleFrame, RoleTicker};
use crate::loader::registry::{Completer, LoadPhase, ModuleId, ModuleRegistry};
use crate::loader::slot::{DeferredSlot, ModuleSource, SlotView};
use crate::ready::hook::OverlayHookRegistry;
use crate::ready::signal::{OverlayPhase, PageReadySignal, PageReadyState};
use crate::sched::host::Scheduler;
use crate::timeline::scroll::{ScrollTimeline, TimelineItem, TimelineSample};
use crate::viewport::boundary::Fallback;
use crate::viewport::resilient::{PENDING_GLYPH, ResilientViewport, ViewportState, ViewportView};
use crate::viewport::scene::{PHOTO_FRONT_URL, PhotoFrameScene, Scene, TechLogoScene};
use crate::visibility::gate::VisibilityGate;
use crate::visibility::observer::ObserverHub;

/// Which decorative scene a viewport hosts.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum SceneSpec {
    /// Two-sided portrait frame.
    PhotoFrame,
    /// Floating technology logo.
    TechLogo {
        /// Technology name; picks the logo.
        tech: String,
    },
}

impl SceneSpec {
    /// Construct a fresh scene instance.
    pub fn build(&self) -> Box<dyn Scene> {
        match self {
            Self::PhotoFrame => Box::new(PhotoFrameScene::new()),
            Self::TechLogo { tech } => Box::new(TechLogoScene::new(tech.clone())),
        }
    }

    fn fallback(&self) -> Fallback {
        match self {
            Self::PhotoFrame => Fallback::image(PHOTO_FRONT_URL, "Profile photo"),
            Self::TechLogo { .. } => Fallback::icon(PENDING_GLYPH),
        }
    }
}

/// A code-split scene bundle once it has resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneModule {
    /// Bundle identity.
    pub id: ModuleId,
}

/// Element box in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, >= 0.
    pub width: f64,
    /// Height, >= 0.
    pub height: f64,
}

impl LayoutBox {
    /// As a rectangle; negative sizes are rejected.
    pub fn rect(self) -> FolioResult<Rect> {
        if !(self.width >= 0.0 && self.height >= 0.0) {
            return Err(FolioError::validation("layout box size must be >= 0"));
        }
        Ok(Rect::new(
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height,
        ))
    }
}

/// Host signal fed to a [`PageSession`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// The document scrolled. Needs a prior [`PageEvent::Resize`].
    Scroll {
        /// New scroll offset.
        y: f64,
    },
    /// The viewport changed size; timeline triggers are recomputed.
    Resize {
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
    /// An element was laid out or moved.
    Layout {
        /// The element.
        element: ElementId,
        /// Its new box.
        rect: LayoutBox,
    },
    /// Move the clock forward, running due frames and timers.
    Advance {
        /// Milliseconds to advance.
        ms: u64,
    },
    /// The document finished loading.
    DomComplete,
    /// The environment is the interactive client.
    ConfirmClient,
    /// Settle a parked module fetch; `error` rejects it.
    ResolveModule {
        /// Module to settle.
        module: ModuleId,
        /// Rejection reason.
        #[serde(default)]
        error: Option<String>,
    },
    /// Settle texture fetches of the viewport on `element`. Without `url`
    /// every pending texture is settled.
    ResolveTexture {
        /// Element of the hosting viewport.
        element: ElementId,
        /// Texture to settle.
        #[serde(default)]
        url: Option<String>,
        /// Fetch failure reason.
        #[serde(default)]
        error: Option<String>,
    },
    /// The rendering context of the viewport on `element` was lost.
    LoseContext {
        /// Element of the hosting viewport.
        element: ElementId,
    },
    /// Pointer moved over a card; writes the glow angle.
    Pointer {
        /// Card element.
        element: ElementId,
        /// Pointer x in document coordinates.
        x: f64,
        /// Pointer y in document coordinates.
        y: f64,
    },
    /// The role ticker's slide transition ended.
    RoleTransitionEnd,
    /// The page became visible after being hidden.
    PageVisible,
    /// Submit `form`; `status` is the endpoint's answer, `None` a network
    /// failure.
    SubmitContact {
        /// Form contents to send.
        form: ContactForm,
        /// Endpoint response status.
        #[serde(default)]
        status: Option<u16>,
    },
    /// Tear the page down.
    Unmount,
}

/// State of one hosted viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ViewportSnapshot {
    /// Host element.
    pub element: ElementId,
    /// Lifecycle state.
    pub state: ViewportState,
    /// What it presents.
    pub view: ViewportView,
}

/// State of one lazily loaded scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LazySceneSnapshot {
    /// Bundle the scene lives in.
    pub module: ModuleId,
    /// Whether the gate has fired and the module was requested.
    pub requested: bool,
    /// Registry load status.
    pub load: LoadPhase,
    /// The hosting viewport.
    pub viewport: ViewportSnapshot,
}

/// State of one counter strip.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CounterGroupSnapshot {
    /// Strip element.
    pub container: ElementId,
    /// Whether the entrance reveal has latched.
    pub entered: bool,
    /// Per-tile counter state.
    pub tiles: Vec<CounterSnapshot>,
    /// Per-tile entrance pose.
    pub poses: Vec<RevealPose>,
}

/// Everything observable about a page at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageSnapshot {
    /// Page clock.
    pub now: Millis,
    /// Last known viewport.
    pub viewport: Option<Viewport>,
    /// Startup overlay phase.
    pub overlay: OverlayPhase,
    /// Readiness facts behind the overlay.
    pub ready: PageReadyState,
    /// Whether the overlay completion hook ran.
    pub overlay_hook_invoked: bool,
    /// Hero viewports, in registration order.
    pub hero: Vec<ViewportSnapshot>,
    /// Lazy scenes, in registration order.
    pub lazy: Vec<LazySceneSnapshot>,
    /// Counter strips, in registration order.
    pub counters: Vec<CounterGroupSnapshot>,
    /// Timeline items, in registration order.
    pub timeline: Vec<TimelineSample>,
    /// Last written glow angle, degrees.
    pub glow_angle: Option<f64>,
    /// Role ticker state, if started.
    pub role: Option<RoleFrame>,
    /// Contact submission state.
    pub contact: SubmitStatus,
    /// Live intersection subscriptions.
    pub active_observers: usize,
    /// Outstanding frames and timers.
    pub pending_tasks: usize,
}

struct HeroViewport {
    element: ElementId,
    viewport: ResilientViewport,
}

struct LazyScene {
    element: ElementId,
    slot: DeferredSlot<SceneModule>,
    viewport: ResilientViewport,
}

type ParkedFetches = Rc<RefCell<BTreeMap<ModuleId, Completer<SceneModule>>>>;

/// Fixed-answer transport for scripted submissions.
struct ScriptedResponse(Option<u16>);

impl MessageTransport for ScriptedResponse {
    fn post_json(&self, _url: &str, _body: &str) -> anyhow::Result<u16> {
        self.0.ok_or_else(|| anyhow::anyhow!("network unreachable"))
    }
}

/// One page lifetime: every engine component wired to a shared scheduler and
/// observer hub, driven by [`PageEvent`]s.
///
/// Module fetches are parked until a [`PageEvent::ResolveModule`] settles them,
/// so load ordering is entirely in the caller's hands.
pub struct PageSession {
    config: EngineConfig,
    sched: Scheduler,
    hub: ObserverHub,
    hooks: OverlayHookRegistry,
    ready: PageReadySignal,
    modules: ModuleRegistry<SceneModule>,
    source: Rc<dyn ModuleSource<SceneModule>>,
    parked: ParkedFetches,
    timeline: ScrollTimeline,
    counters: Vec<CounterGroup>,
    hero: Vec<HeroViewport>,
    lazy: Vec<LazyScene>,
    glow: GlowChannel,
    roles: Option<RoleTicker>,
    contact: ContactController,
    viewport: Option<Viewport>,
    client_confirmed: bool,
    unmounted: bool,
}

impl PageSession {
    /// Validate `config` and start the page clock and the ready signal.
    pub fn new(config: EngineConfig) -> FolioResult<Self> {
        config.validate()?;
        let sched = Scheduler::new(config.frame_interval_ms);
        let hub = ObserverHub::new();
        let hooks = OverlayHookRegistry::new();
        let ready = PageReadySignal::start(
            sched.clone(),
            hooks.clone(),
            config.overlay_min_dwell_ms,
            config.overlay_fade_ms,
        );
        let parked: ParkedFetches = Rc::new(RefCell::new(BTreeMap::new()));
        let source: Rc<dyn ModuleSource<SceneModule>> = {
            let parked = Rc::clone(&parked);
            Rc::new(move |id: &ModuleId, completer: Completer<SceneModule>| {
                tracing::debug!(module = %id, "module fetch parked");
                parked.borrow_mut().insert(id.clone(), completer);
            })
        };
        let contact = ContactController::new(config.contact_endpoint.clone(), sched.clone());
        Ok(Self {
            timeline: ScrollTimeline::new(hub.clone()),
            config,
            sched,
            hub,
            hooks,
            ready,
            modules: ModuleRegistry::new(),
            source,
            parked,
            counters: Vec::new(),
            hero: Vec::new(),
            lazy: Vec::new(),
            glow: GlowChannel::new(),
            roles: None,
            contact,
            viewport: None,
            client_confirmed: false,
            unmounted: false,
        })
    }

    /// Config the page runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The page clock.
    pub fn scheduler(&self) -> &Scheduler {
        &self.sched
    }

    /// The intersection hub.
    pub fn hub(&self) -> &ObserverHub {
        &self.hub
    }

    /// Registry the startup overlay uses for its completion hook.
    pub fn hooks(&self) -> &OverlayHookRegistry {
        &self.hooks
    }

    /// Registry deduplicating scene bundle loads.
    pub fn modules(&self) -> &ModuleRegistry<SceneModule> {
        &self.modules
    }

    /// Whether [`PageSession::unmount`] has run.
    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Module fetches started but not yet settled.
    pub fn parked_modules(&self) -> Vec<ModuleId> {
        self.parked.borrow().keys().cloned().collect()
    }

    /// Record an element box and recompute timeline triggers.
    pub fn set_layout(&mut self, element: ElementId, rect: Rect) {
        self.hub.set_layout(element, rect);
        if let Some(viewport) = self.viewport {
            self.timeline.on_resize(viewport, self.sched.now());
        }
        self.refresh();
    }

    /// Above-the-fold scene: mounted at once, built on client confirmation.
    pub fn add_hero_viewport(&mut self, element: ElementId) {
        let spec = SceneSpec::PhotoFrame;
        let viewport = ResilientViewport::new(
            format!("hero-{}", element.0),
            self.sched.clone(),
            Some(spec.fallback()),
            move || Ok(spec.build()),
        );
        viewport.mount();
        if self.client_confirmed {
            viewport.confirm_client();
        }
        self.hero.push(HeroViewport { element, viewport });
    }

    /// Below-the-fold scene whose module loads on first proximity.
    pub fn add_lazy_scene(
        &mut self,
        element: ElementId,
        module: ModuleId,
        spec: SceneSpec,
    ) -> FolioResult<()> {
        let options = self.config.lazy_options()?;
        let fallback = spec.fallback();
        let viewport = ResilientViewport::new(
            format!("{module}-{}", element.0),
            self.sched.clone(),
            Some(fallback),
            move || Ok(spec.build()),
        );
        let gate = VisibilityGate::new(self.hub.clone(), options);
        let slot = DeferredSlot::new(
            module,
            self.modules.clone(),
            gate,
            Rc::clone(&self.source),
            viewport.fault_channel(),
        );
        slot.mount(Some(element));
        self.lazy.push(LazyScene {
            element,
            slot,
            viewport,
        });
        self.refresh();
        Ok(())
    }

    /// Counter strip under `container`. Tiles without a target take the stock
    /// one at the same position.
    pub fn add_counter_group(
        &mut self,
        container: ElementId,
        tiles: Vec<(ElementId, Option<CounterTarget>)>,
    ) -> FolioResult<()> {
        let defaults = crate::counter::default_targets();
        let tiles = tiles
            .into_iter()
            .enumerate()
            .map(|(i, (element, target))| {
                let target = target.or_else(|| defaults.get(i).cloned()).ok_or_else(|| {
                    FolioError::validation(format!("counter tile {i} has no target"))
                })?;
                Ok((element, target))
            })
            .collect::<FolioResult<Vec<_>>>()?;
        let group = CounterGroup::new(
            container,
            tiles,
            &self.sched,
            &self.hub,
            self.config.counter_options()?,
        );
        self.counters.push(group);
        self.refresh();
        Ok(())
    }

    /// Register a scroll-scrubbed timeline entry.
    pub fn add_timeline_item(&mut self, item: TimelineItem) -> FolioResult<()> {
        self.timeline.register(item, self.sched.now())?;
        self.refresh();
        Ok(())
    }

    /// Start the role headline, replacing any earlier ticker.
    pub fn start_role_ticker(&mut self, roles: Vec<String>) -> FolioResult<()> {
        if let Some(old) = self.roles.take() {
            old.stop();
        }
        self.roles = Some(RoleTicker::start(roles, self.sched.clone())?);
        Ok(())
    }

    /// Feed one host signal. Events after [`PageEvent::Unmount`] are ignored.
    #[tracing::instrument(skip(self))]
    pub fn apply(&mut self, event: PageEvent) -> FolioResult<()> {
        if self.unmounted {
            tracing::debug!("event after unmount ignored");
            return Ok(());
        }
        match event {
            PageEvent::Scroll { y } => {
                let Some(viewport) = self.viewport else {
                    return Err(FolioError::validation(
                        "scroll before the viewport size is known",
                    ));
                };
                let viewport = viewport.with_scroll(y);
                self.viewport = Some(viewport);
                self.hub.set_viewport(viewport);
                self.timeline.on_scroll(viewport, self.sched.now());
            }
            PageEvent::Resize { width, height } => {
                let scroll_y = self.viewport.map_or(0.0, |v| v.scroll_y);
                let viewport = Viewport::new(width, height)?.with_scroll(scroll_y);
                self.viewport = Some(viewport);
                self.hub.set_viewport(viewport);
                self.timeline.on_resize(viewport, self.sched.now());
            }
            PageEvent::Layout { element, rect } => {
                self.set_layout(element, rect.rect()?);
                return Ok(());
            }
            PageEvent::Advance { ms } => {
                self.sched.advance(ms);
            }
            PageEvent::DomComplete => self.ready.dom_complete(),
            PageEvent::ConfirmClient => self.confirm_client(),
            PageEvent::ResolveModule { module, error } => self.resolve_module(&module, error),
            PageEvent::ResolveTexture {
                element,
                url,
                error,
            } => self.resolve_texture(element, url, error),
            PageEvent::LoseContext { element } => {
                let surface = self.viewport_on(element).and_then(ResilientViewport::surface);
                match surface {
                    Some(surface) => {
                        surface.lose_context();
                    }
                    None => tracing::debug!(?element, "no live surface to lose"),
                }
            }
            PageEvent::Pointer { element, x, y } => match self.hub.layout_of(element) {
                Some(card) => {
                    self.glow.track(Point::new(x, y), card);
                }
                None => tracing::debug!(?element, "pointer over element without layout"),
            },
            PageEvent::RoleTransitionEnd => {
                if let Some(roles) = &self.roles {
                    roles.transition_end();
                }
            }
            PageEvent::PageVisible => {
                if let Some(roles) = &self.roles {
                    roles.page_visible();
                }
            }
            PageEvent::SubmitContact { form, status } => {
                self.contact.fill(form);
                self.contact.submit(&ScriptedResponse(status));
            }
            PageEvent::Unmount => {
                self.unmount();
                return Ok(());
            }
        }
        self.refresh();
        Ok(())
    }

    fn confirm_client(&mut self) {
        if self.client_confirmed {
            return;
        }
        self.client_confirmed = true;
        for hero in &self.hero {
            hero.viewport.confirm_client();
        }
    }

    fn resolve_module(&mut self, module: &ModuleId, error: Option<String>) {
        let completer = self.parked.borrow_mut().remove(module);
        let Some(completer) = completer else {
            tracing::warn!(%module, "no fetch in flight for module");
            return;
        };
        match error {
            Some(reason) => completer.reject(reason),
            None => completer.resolve(SceneModule { id: module.clone() }),
        }
    }

    fn resolve_texture(&self, element: ElementId, url: Option<String>, error: Option<String>) {
        let Some(viewport) = self.viewport_on(element) else {
            tracing::debug!(?element, "texture for unknown viewport");
            return;
        };
        let urls = match url {
            Some(url) => vec![url],
            None => viewport.pending_textures(),
        };
        for url in urls {
            let result = match &error {
                Some(reason) => Err(reason.clone()),
                None => Ok(()),
            };
            viewport.texture_loaded(&url, result);
        }
    }

    fn viewport_on(&self, element: ElementId) -> Option<&ResilientViewport> {
        self.hero
            .iter()
            .find(|h| h.element == element)
            .map(|h| &h.viewport)
            .or_else(|| {
                self.lazy
                    .iter()
                    .find(|l| l.element == element)
                    .map(|l| &l.viewport)
            })
    }

    /// Deliver intersections, then bring lazy scenes and scroll-driven state up
    /// to date.
    fn refresh(&mut self) {
        if self.unmounted {
            return;
        }
        self.hub.notify();
        for lazy in &self.lazy {
            if let SlotView::Ready(_) = lazy.slot.view() {
                lazy.viewport.mount();
                if self.client_confirmed {
                    lazy.viewport.confirm_client();
                }
            }
        }
        if let Some(viewport) = self.viewport {
            let now = self.sched.now();
            self.timeline.on_scroll(viewport, now);
            for group in &mut self.counters {
                group.on_scroll(viewport, now);
            }
        }
    }

    /// Tear everything down. Afterwards no callback of this page runs again.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.ready.dispose();
        for group in &self.counters {
            group.dispose();
        }
        for lazy in &self.lazy {
            lazy.slot.dispose();
            lazy.viewport.unmount();
        }
        for hero in &self.hero {
            hero.viewport.unmount();
        }
        if let Some(roles) = &self.roles {
            roles.stop();
        }
        self.contact.dispose();
        let parked = std::mem::take(&mut *self.parked.borrow_mut());
        for completer in parked.into_values() {
            completer.cancel();
        }
        tracing::debug!(pending = self.sched.pending(), "page unmounted");
    }

    /// Capture the observable page state.
    pub fn snapshot(&self) -> PageSnapshot {
        let now = self.sched.now();
        let viewport_snapshot = |element: ElementId, viewport: &ResilientViewport| {
            ViewportSnapshot {
                element,
                state: viewport.state(),
                view: viewport.render(),
            }
        };
        PageSnapshot {
            now,
            viewport: self.viewport,
            overlay: self.ready.phase(),
            ready: self.ready.ready_state(),
            overlay_hook_invoked: self.hooks.is_consumed(),
            hero: self
                .hero
                .iter()
                .map(|h| viewport_snapshot(h.element, &h.viewport))
                .collect(),
            lazy: self
                .lazy
                .iter()
                .map(|l| LazySceneSnapshot {
                    module: l.slot.id().clone(),
                    requested: l.slot.requested(),
                    load: l.slot.phase(),
                    viewport: viewport_snapshot(l.element, &l.viewport),
                })
                .collect(),
            counters: self
                .counters
                .iter()
                .map(|g| CounterGroupSnapshot {
                    container: g.container(),
                    entered: g.entered(),
                    tiles: g.snapshots(),
                    poses: g.poses(now),
                })
                .collect(),
            timeline: self.timeline.samples(now),
            glow_angle: self.glow.read(),
            role: self.roles.as_ref().map(RoleTicker::frame),
            contact: self.contact.status(),
            active_observers: self.hub.active_subscriptions(),
            pending_tasks: self.sched.pending(),
        }
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession")
            .field("now", &self.sched.now())
            .field("viewport", &self.viewport)
            .field("lazy", &self.lazy.len())
            .field("counters", &self.counters.len())
            .field("timeline", &self.timeline.len())
            .field("unmounted", &self.unmounted)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/session.rs"]
mod tests;
