//! Decorative scenes hosted inside a [`super::resilient::ResilientViewport`].
//!
//! Scenes are advanced one animation frame at a time and describe what they
//! would draw as a [`SceneFrame`]; rasterisation is the host's job.

use std::f64::consts::{PI, TAU};

use crate::foundation::core::{Millis, Rgb};
use crate::foundation::error::{FolioError, FolioResult};

/// Front portrait texture.
pub const PHOTO_FRONT_URL: &str = "/images/profile-professional.jpg";
/// Back portrait texture.
pub const PHOTO_BACK_URL: &str = "/images/profile-dev.png";

const FRAME_YAW_STEP: f64 = 0.005;
const FRAME_COLOR_LERP: f64 = 0.05;
const LOADING_BOX_YAW_STEP: f64 = 0.01;
const FRONT_BORDER: Rgb = Rgb::from_u8(0x25, 0x63, 0xeb);
const BACK_BORDER: Rgb = Rgb::from_u8(0x10, 0xb9, 0x81);
const LOADING_BOX: Rgb = Rgb::from_u8(0x1f, 0x1f, 0x1f);
const LOGO_PLACEHOLDER: Rgb = Rgb::from_u8(0x10, 0xb9, 0x81);

const DEVICON_BASE: &str = "https://cdn.jsdelivr.net/gh/devicons/devicon/icons";

/// One drawable in a [`SceneFrame`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MeshFrame {
    /// Mesh identifier.
    pub name: &'static str,
    /// Rotation around the vertical axis, radians.
    pub yaw: f64,
    /// Solid `#rrggbb` color, if untextured.
    pub color: Option<String>,
    /// Texture URL, if textured.
    pub texture: Option<String>,
}

impl MeshFrame {
    fn solid(name: &'static str, color: Rgb) -> Self {
        Self {
            name,
            yaw: 0.0,
            color: Some(color.to_hex()),
            texture: None,
        }
    }

    fn textured(name: &'static str, url: &str) -> Self {
        Self {
            name,
            yaw: 0.0,
            color: None,
            texture: Some(url.to_owned()),
        }
    }
}

/// Everything a scene draws for one frame.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SceneFrame {
    /// Meshes in draw order.
    pub meshes: Vec<MeshFrame>,
}

/// A frame-driven decorative scene.
pub trait Scene {
    /// Scene name used in logs.
    fn name(&self) -> &str;

    /// Texture URLs the scene is still waiting for.
    fn pending_textures(&self) -> Vec<String>;

    /// Deliver the result of fetching `url`. An `Err` return is a construction
    /// fault for the hosting viewport.
    fn texture_loaded(&mut self, url: &str, result: Result<(), String>) -> FolioResult<()>;

    /// Advance one animation frame.
    fn tick(&mut self, now: Millis);

    /// Describe what the scene currently draws.
    fn frame(&self) -> SceneFrame;
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TextureSlot {
    Loading,
    Ready,
}

/// Two-sided portrait frame that turns slowly and tints its border by side.
#[derive(Debug)]
pub struct PhotoFrameScene {
    front: TextureSlot,
    back: TextureSlot,
    yaw: f64,
    border: Rgb,
    loading_yaw: f64,
}

impl PhotoFrameScene {
    /// Frame with both portraits still loading.
    pub fn new() -> Self {
        Self {
            front: TextureSlot::Loading,
            back: TextureSlot::Loading,
            yaw: 0.0,
            border: FRONT_BORDER,
            loading_yaw: 0.0,
        }
    }

    fn is_loaded(&self) -> bool {
        self.front == TextureSlot::Ready && self.back == TextureSlot::Ready
    }

    /// Current rotation, radians.
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Current border tint.
    pub fn border(&self) -> Rgb {
        self.border
    }
}

impl Default for PhotoFrameScene {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a frame turned by `yaw` shows its front face to the viewer.
pub fn is_front_facing(yaw: f64) -> bool {
    let r = yaw.rem_euclid(TAU);
    r < PI / 2.0 || r > 3.0 * PI / 2.0
}

impl Scene for PhotoFrameScene {
    fn name(&self) -> &str {
        "photo-frame"
    }

    fn pending_textures(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.front == TextureSlot::Loading {
            out.push(PHOTO_FRONT_URL.to_owned());
        }
        if self.back == TextureSlot::Loading {
            out.push(PHOTO_BACK_URL.to_owned());
        }
        out
    }

    fn texture_loaded(&mut self, url: &str, result: Result<(), String>) -> FolioResult<()> {
        let slot = match url {
            PHOTO_FRONT_URL => &mut self.front,
            PHOTO_BACK_URL => &mut self.back,
            _ => return Ok(()),
        };
        match result {
            Ok(()) => {
                *slot = TextureSlot::Ready;
                Ok(())
            }
            Err(reason) => Err(FolioError::construction(format!(
                "portrait texture '{url}' could not be loaded: {reason}"
            ))),
        }
    }

    fn tick(&mut self, _now: Millis) {
        if !self.is_loaded() {
            self.loading_yaw += LOADING_BOX_YAW_STEP;
            return;
        }
        self.yaw += FRAME_YAW_STEP;
        let target = if is_front_facing(self.yaw) {
            FRONT_BORDER
        } else {
            BACK_BORDER
        };
        self.border = self.border.lerp(target, FRAME_COLOR_LERP);
    }

    fn frame(&self) -> SceneFrame {
        if !self.is_loaded() {
            let mut placeholder = MeshFrame::solid("loading-box", LOADING_BOX);
            placeholder.yaw = self.loading_yaw;
            return SceneFrame {
                meshes: vec![placeholder],
            };
        }
        let mut border = MeshFrame::solid("border", self.border);
        let mut front = MeshFrame::textured("front", PHOTO_FRONT_URL);
        let mut back = MeshFrame::textured("back", PHOTO_BACK_URL);
        border.yaw = self.yaw;
        front.yaw = self.yaw;
        back.yaw = self.yaw + PI;
        SceneFrame {
            meshes: vec![border, front, back],
        }
    }
}

/// Pick the logo for a technology by keyword. Unknown names get the React
/// logo.
pub fn logo_url_for(tech: &str) -> String {
    let name = tech.to_lowercase();
    let has = |k: &str| name.contains(k);
    let icon = if has("react") {
        "react/react-original.svg"
    } else if has("typescript") {
        "typescript/typescript-original.svg"
    } else if has("node") || has("backend") {
        "nodejs/nodejs-original.svg"
    } else if has("three") || has("interactive") {
        "threejs/threejs-original.svg"
    } else if has("git") || has("version") {
        "git/git-original.svg"
    } else if has("java") && !has("javascript") {
        "java/java-original.svg"
    } else if has("javascript") {
        "javascript/javascript-original.svg"
    } else if has("next") {
        "nextjs/nextjs-original.svg"
    } else if has("python") {
        "python/python-original.svg"
    } else {
        "react/react-original.svg"
    };
    format!("{DEVICON_BASE}/{icon}")
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum LogoTexture {
    Loading,
    Ready,
    Missing,
}

/// Floating technology logo.
#[derive(Debug)]
pub struct TechLogoScene {
    tech: String,
    url: String,
    started: Option<Millis>,
    elapsed_s: f64,
    texture: LogoTexture,
}

impl TechLogoScene {
    /// Spinning logo for the named technology.
    pub fn new(tech: impl Into<String>) -> Self {
        let tech = tech.into();
        let url = logo_url_for(&tech);
        Self {
            tech,
            url,
            started: None,
            elapsed_s: 0.0,
            texture: LogoTexture::Loading,
        }
    }

    /// Icon URL for this technology.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Technology name.
    pub fn tech(&self) -> &str {
        &self.tech
    }

    /// Current sway angle, radians.
    pub fn yaw(&self) -> f64 {
        (self.elapsed_s * 0.5).sin() * 0.3
    }
}

impl Scene for TechLogoScene {
    fn name(&self) -> &str {
        "tech-logo"
    }

    fn pending_textures(&self) -> Vec<String> {
        match self.texture {
            LogoTexture::Loading => vec![self.url.clone()],
            _ => Vec::new(),
        }
    }

    fn texture_loaded(&mut self, url: &str, result: Result<(), String>) -> FolioResult<()> {
        if url != self.url || self.texture != LogoTexture::Loading {
            return Ok(());
        }
        match result {
            Ok(()) => self.texture = LogoTexture::Ready,
            Err(reason) => {
                let err = FolioError::resource_load(url, reason);
                tracing::warn!(tech = %self.tech, error = %err, "logo texture unavailable, using placeholder");
                self.texture = LogoTexture::Missing;
            }
        }
        Ok(())
    }

    fn tick(&mut self, now: Millis) {
        let start = *self.started.get_or_insert(now);
        self.elapsed_s = Millis(now.since(start)).as_secs_f64();
    }

    fn frame(&self) -> SceneFrame {
        // A logo that is still loading sways as the same box a missing one does.
        let mut mesh = match self.texture {
            LogoTexture::Ready => MeshFrame::textured("logo", &self.url),
            LogoTexture::Loading | LogoTexture::Missing => {
                MeshFrame::solid("placeholder-box", LOGO_PLACEHOLDER)
            }
        };
        mesh.yaw = self.yaw();
        SceneFrame { meshes: vec![mesh] }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/scene.rs"]
mod tests;
