use cgmath::Vector3;
use serde::{Deserialize, Serialize};

/// Gap between a cube face and the label floating in front of it.
const LABEL_GAP: f32 = 0.1;
/// Font size the label texture is rasterised at.
const LABEL_FONT_PX: f32 = 40.0;
const LABEL_PADDING_PX: f32 = 20.0;
const LABEL_LINE_PX: f32 = LABEL_FONT_PX + 10.0;
/// Rough advance of a glyph relative to the font size.
const GLYPH_ADVANCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vector3<f32>,
    pub aspect: f32,
}

impl Camera {
    /// Tracks the viewport size. Degenerate sizes keep the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient { color: u32, intensity: f32 },
    Directional { color: u32, intensity: f32, position: Vector3<f32> },
}

/// Surface parameters shared by every element cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: u32,
    pub roughness: f32,
    pub metalness: f32,
}

/// Static scene setup the rendering backend builds once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub background: u32,
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub element_material: Material,
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        Self {
            background: 0xf0f0f0,
            camera: Camera {
                fov_degrees: 75.0,
                near: 0.1,
                far: 1000.0,
                position: Vector3::new(0.0, 0.0, 15.0),
                aspect: 16.0 / 9.0,
            },
            lights: vec![
                Light::Ambient {
                    color: 0xffffff,
                    intensity: 0.5,
                },
                Light::Directional {
                    color: 0xffffff,
                    intensity: 1.0,
                    position: Vector3::new(5.0, 10.0, 7.5),
                },
            ],
            element_material: Material {
                color: 0x40e0d0,
                roughness: 0.5,
                metalness: 0.1,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Front,
    Back,
}

/// Text sprite attached to one of an element's z faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLabel {
    pub text: String,
    pub face: Face,
    /// Offset from the element centre.
    pub offset: Vector3<f32>,
    /// Back labels are drawn upside down on their texture so they read
    /// correctly when the camera orbits behind the element.
    pub rotated: bool,
    /// Sprite width and height in scene units.
    pub scale: (f32, f32),
}

impl FaceLabel {
    pub fn new(text: &str, face: Face, element_size: f32) -> Self {
        let depth = element_size / 2.0 + LABEL_GAP;
        let (z, rotated) = match face {
            Face::Front => (depth, false),
            Face::Back => (-depth, true),
        };

        let width_px = text.chars().count() as f32 * LABEL_FONT_PX * GLYPH_ADVANCE + LABEL_PADDING_PX;
        let factor = element_size * 0.75;

        Self {
            text: text.to_string(),
            face,
            offset: Vector3::new(0.0, 0.0, z),
            rotated,
            scale: (
                width_px / LABEL_FONT_PX * factor,
                LABEL_LINE_PX / LABEL_FONT_PX * factor,
            ),
        }
    }

    /// Front and back labels for a value.
    pub fn pair(value: i64, element_size: f32) -> [FaceLabel; 2] {
        let text = value.to_string();
        [
            FaceLabel::new(&text, Face::Front, element_size),
            FaceLabel::new(&text, Face::Back, element_size),
        ]
    }
}
