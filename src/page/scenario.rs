use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::EngineConfig;
use crate::counter::CounterTarget;
use crate::foundation::core::ElementId;
use crate::foundation::error::{FolioError, FolioResult};
use crate::loader::registry::ModuleId;
use crate::page::session::{LayoutBox, PageEvent, PageSession, PageSnapshot, SceneSpec};
use crate::timeline::scroll::TimelineItem;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Viewport dimensions in CSS pixels.
pub struct ViewportSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Initial layout of one element.
pub struct ElementLayout {
    /// The element.
    pub id: ElementId,
    /// Its box in document coordinates.
    pub rect: LayoutBox,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One counter of a [`ComponentSpec::CounterGroup`].
pub struct CounterTile {
    /// Tile element.
    pub element: ElementId,
    #[serde(default)]
    /// Explicit target; the stock target at the same index when absent.
    pub target: Option<CounterTarget>,
}

/// A component registered before the event list plays.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentSpec {
    /// Hero photo viewport, mounted at once.
    Hero {
        /// Host element.
        element: ElementId,
    },
    /// Tech logo when `tech` is given, otherwise the photo frame.
    LazyScene {
        /// Host element; its visibility triggers the load.
        element: ElementId,
        /// Code-split bundle holding the scene.
        module: ModuleId,
        /// Technology whose logo is shown.
        #[serde(default)]
        tech: Option<String>,
    },
    /// Counter strip.
    CounterGroup {
        /// Strip element, used for the entrance reveal.
        container: ElementId,
        /// One entry per counter.
        tiles: Vec<CounterTile>,
    },
    /// Scroll-scrubbed timeline entry.
    TimelineItem(TimelineItem),
    /// Rotating role headline.
    RoleTicker {
        /// Roles to rotate; empty means [`crate::default_roles`].
        #[serde(default)]
        roles: Vec<String>,
    },
}

/// Scripted page run: initial viewport and layout, components, then events.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageScenario {
    /// Engine config; the default when absent.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// Initial viewport size.
    pub viewport: ViewportSize,
    /// Initial element layout.
    #[serde(default)]
    pub elements: Vec<ElementLayout>,
    /// Components registered in order.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    /// Register a startup-overlay completion hook.
    #[serde(default)]
    pub overlay_hook: bool,
    /// Events applied in order.
    #[serde(default)]
    pub events: Vec<PageEvent>,
}

impl PageScenario {
    /// Parse a JSON scenario. Unknown top-level keys are rejected.
    pub fn from_reader<R: std::io::Read>(r: R) -> FolioResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FolioError::validation(format!("parse page scenario JSON: {e}")))
    }

    /// Parse a JSON scenario from a string.
    pub fn from_json_str(s: &str) -> FolioResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Load a JSON scenario file.
    pub fn from_path(path: impl AsRef<Path>) -> FolioResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FolioError::validation(format!("open page scenario '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Build the session described by the header, before any event runs.
    pub fn session(&self, config: Option<EngineConfig>) -> FolioResult<PageSession> {
        let config = config.or_else(|| self.config.clone()).unwrap_or_default();
        let mut session = PageSession::new(config)?;
        if self.overlay_hook {
            session
                .hooks()
                .register(|| tracing::debug!("startup overlay jumped to 100%"))?;
        }
        session.apply(PageEvent::Resize {
            width: self.viewport.width,
            height: self.viewport.height,
        })?;
        for el in &self.elements {
            session.set_layout(el.id, el.rect.rect()?);
        }
        for component in &self.components {
            add_component(&mut session, component.clone())?;
        }
        Ok(session)
    }

    /// Play the scenario. Returns one snapshot per event when `trace` is set,
    /// otherwise only the final snapshot.
    #[tracing::instrument(skip(self, config), fields(events = self.events.len()))]
    pub fn run(
        &self,
        config: Option<EngineConfig>,
        trace: bool,
    ) -> FolioResult<Vec<PageSnapshot>> {
        let mut session = self.session(config)?;
        let mut out = Vec::new();
        for (i, event) in self.events.iter().enumerate() {
            session
                .apply(event.clone())
                .map_err(|e| FolioError::validation(format!("event {i}: {e}")))?;
            if trace {
                out.push(session.snapshot());
            }
        }
        if !trace || out.is_empty() {
            out.push(session.snapshot());
        }
        Ok(out)
    }
}

fn add_component(session: &mut PageSession, component: ComponentSpec) -> FolioResult<()> {
    match component {
        ComponentSpec::Hero { element } => session.add_hero_viewport(element),
        ComponentSpec::LazyScene {
            element,
            module,
            tech,
        } => {
            let scene = match tech {
                Some(tech) => SceneSpec::TechLogo { tech },
                None => SceneSpec::PhotoFrame,
            };
            session.add_lazy_scene(element, module, scene)?;
        }
        ComponentSpec::CounterGroup { container, tiles } => session.add_counter_group(
            container,
            tiles.into_iter().map(|t| (t.element, t.target)).collect(),
        )?,
        ComponentSpec::TimelineItem(item) => session.add_timeline_item(item)?,
        ComponentSpec::RoleTicker { roles } => {
            let roles = if roles.is_empty() {
                crate::hero::roles::default_roles()
            } else {
                roles
            };
            session.start_role_ticker(roles)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/page/scenario.rs"]
mod tests;
