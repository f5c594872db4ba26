use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::foundation::core::Millis;
use crate::foundation::error::{FolioError, FolioResult};
use crate::sched::host::{LoopControl, LoopHandle, Scheduler};
use crate::sched::liveness::Liveness;
use crate::viewport::boundary::{Fallback, FaultBoundary, FaultChannel, RenderResult};
use crate::viewport::scene::{Scene, SceneFrame};
use crate::viewport::surface::{ContextLostEvent, ListenerId, Surface};

/// Glyph shown while the surface waits for client confirmation.
pub const PENDING_GLYPH: &str = "⚡";

/// Lifecycle stage of a [`ResilientViewport`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportState {
    /// Not mounted.
    Unmounted,
    /// Mounted, waiting for the client effect.
    ClientPending,
    /// Surface and scene are live.
    Ready,
    /// Terminal: the fallback is shown.
    Failed,
}

/// What a [`ResilientViewport`] presents right now.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportView {
    /// Placeholder before the surface exists.
    Pending {
        /// Glyph to display.
        glyph: &'static str,
        /// Whether the glyph pulses.
        pulsing: bool,
    },
    /// The live scene.
    Scene {
        /// Latest rendered frame.
        frame: SceneFrame,
    },
    /// The boundary's fallback.
    Fallback {
        /// Content shown in place of the scene.
        fallback: Fallback,
    },
}

/// Builds the scene once the surface exists.
pub type SceneFactory = Box<dyn Fn() -> FolioResult<Box<dyn Scene>>>;

struct Live {
    surface: Surface,
    listener: ListenerId,
    scene: Box<dyn Scene>,
    frames: Option<LoopHandle>,
}

struct ViewportInner {
    state: ViewportState,
    alive: Option<Liveness>,
    confirmed: bool,
    live: Option<Live>,
}

impl ViewportInner {
    /// Drop the surface, its listener and the frame loop.
    fn release(&mut self) {
        if let Some(alive) = self.alive.take() {
            alive.kill();
        }
        if let Some(live) = self.live.take() {
            if let Some(frames) = &live.frames {
                frames.cancel();
            }
            live.surface.remove_context_lost_listener(live.listener);
        }
    }
}

/// Host for a decorative GPU scene with contained failure.
///
/// Lifecycle: `Unmounted -> ClientPending -> Ready | Failed`. The surface is
/// only built by [`ResilientViewport::confirm_client`], once per mount.
/// Construction faults, scene faults and context loss all end in `Failed`,
/// which is terminal for the instance.
pub struct ResilientViewport {
    label: String,
    sched: Scheduler,
    boundary: FaultBoundary,
    factory: SceneFactory,
    inner: Rc<RefCell<ViewportInner>>,
}

impl ResilientViewport {
    /// Viewport whose scene is built by `factory` on the client.
    pub fn new(
        label: impl Into<String>,
        sched: Scheduler,
        fallback: Option<Fallback>,
        factory: impl Fn() -> FolioResult<Box<dyn Scene>> + 'static,
    ) -> Self {
        let label = label.into();
        Self {
            boundary: FaultBoundary::new(label.clone(), fallback),
            label,
            sched,
            factory: Box::new(factory),
            inner: Rc::new(RefCell::new(ViewportInner {
                state: ViewportState::Unmounted,
                alive: None,
                confirmed: false,
                live: None,
            })),
        }
    }

    /// Name used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Boundary containing this viewport's faults.
    pub fn boundary(&self) -> &FaultBoundary {
        &self.boundary
    }

    /// Channel for faults raised outside the viewport's own calls, e.g. a
    /// deferred module that fails to load.
    pub fn fault_channel(&self) -> FaultChannel {
        self.boundary.channel()
    }

    /// Current lifecycle stage.
    pub fn state(&self) -> ViewportState {
        self.sync_boundary();
        self.inner.borrow().state
    }

    /// Enter `ClientPending`. No-op unless unmounted.
    pub fn mount(&self) {
        self.sync_boundary();
        let mut inner = self.inner.borrow_mut();
        if inner.state != ViewportState::Unmounted {
            return;
        }
        inner.state = ViewportState::ClientPending;
        inner.alive = Some(Liveness::new());
        inner.confirmed = false;
    }

    /// One-time client effect: build the surface and scene.
    #[tracing::instrument(skip(self), fields(viewport = %self.label))]
    pub fn confirm_client(&self) {
        self.sync_boundary();
        let alive = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != ViewportState::ClientPending || inner.confirmed {
                return;
            }
            inner.confirmed = true;
            match &inner.alive {
                Some(alive) => alive.clone(),
                None => return,
            }
        };

        let scene = match self.boundary.render(|| (self.factory)()) {
            RenderResult::Rendering(scene) => scene,
            RenderResult::Failed(_) => {
                self.fail();
                return;
            }
        };

        let surface = Surface::new(self.label.clone());
        let listener = surface.add_context_lost_listener(context_lost_listener(
            Rc::downgrade(&self.inner),
            self.boundary.channel(),
            alive.clone(),
        ));
        {
            let mut inner = self.inner.borrow_mut();
            inner.live = Some(Live {
                surface,
                listener,
                scene,
                frames: None,
            });
            inner.state = ViewportState::Ready;
        }

        let weak = Rc::downgrade(&self.inner);
        let frames = self.sched.frame_loop(alive, move |now| tick(&weak, now));
        if let Some(live) = self.inner.borrow_mut().live.as_mut() {
            live.frames = Some(frames);
        }
        tracing::debug!("surface ready");
    }

    /// Deliver a texture fetch result to the scene. Faults returned by the
    /// scene fail the viewport.
    pub fn texture_loaded(&self, url: &str, result: Result<(), String>) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            match inner.live.as_mut() {
                Some(live) => live.scene.texture_loaded(url, result),
                None => return,
            }
        };
        if let Err(err) = outcome {
            self.boundary.capture(err);
            self.fail();
        }
    }

    /// Texture URLs the live scene is waiting on.
    pub fn pending_textures(&self) -> Vec<String> {
        self.inner
            .borrow()
            .live
            .as_ref()
            .map(|live| live.scene.pending_textures())
            .unwrap_or_default()
    }

    /// The live surface, if one has been built.
    pub fn surface(&self) -> Option<Surface> {
        self.inner.borrow().live.as_ref().map(|l| l.surface.clone())
    }

    /// Present the current state, ticking the scene when ready.
    pub fn render(&self) -> ViewportView {
        self.sync_boundary();
        let inner = self.inner.borrow();
        match inner.state {
            ViewportState::Unmounted | ViewportState::ClientPending => ViewportView::Pending {
                glyph: PENDING_GLYPH,
                pulsing: true,
            },
            ViewportState::Ready => match &inner.live {
                Some(live) => ViewportView::Scene {
                    frame: live.scene.frame(),
                },
                None => ViewportView::Fallback {
                    fallback: self.boundary.fallback(),
                },
            },
            ViewportState::Failed => ViewportView::Fallback {
                fallback: self.boundary.fallback(),
            },
        }
    }

    /// Tear down the surface, listener and frame loop. A failed viewport stays
    /// failed.
    pub fn unmount(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.release();
        if inner.state != ViewportState::Failed {
            inner.state = ViewportState::Unmounted;
        }
    }

    fn fail(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.state = ViewportState::Failed;
        inner.release();
    }

    fn sync_boundary(&self) {
        let failed_elsewhere =
            self.boundary.has_failed() && self.inner.borrow().state != ViewportState::Failed;
        if failed_elsewhere {
            self.fail();
        }
    }
}

impl Drop for ResilientViewport {
    fn drop(&mut self) {
        self.inner.borrow_mut().release();
    }
}

impl std::fmt::Debug for ResilientViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ResilientViewport")
            .field("label", &self.label)
            .field("state", &inner.state)
            .field("surface", &inner.live.as_ref().map(|l| &l.surface))
            .finish()
    }
}

fn tick(inner: &Weak<RefCell<ViewportInner>>, now: Millis) -> LoopControl {
    let Some(inner) = inner.upgrade() else {
        return LoopControl::Stop;
    };
    let mut inner = inner.borrow_mut();
    if inner.state != ViewportState::Ready {
        return LoopControl::Stop;
    }
    match inner.live.as_mut() {
        Some(live) => {
            live.scene.tick(now);
            LoopControl::Continue
        }
        None => LoopControl::Stop,
    }
}

fn context_lost_listener(
    inner: Weak<RefCell<ViewportInner>>,
    faults: FaultChannel,
    alive: Liveness,
) -> impl Fn(&ContextLostEvent) + 'static {
    move |event: &ContextLostEvent| {
        event.prevent_default();
        if !alive.is_alive() {
            return;
        }
        if let Some(inner) = inner.upgrade() {
            let mut inner = inner.borrow_mut();
            inner.state = ViewportState::Failed;
            inner.release();
        }
        faults.report(FolioError::ContextLost);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/resilient.rs"]
mod tests;
