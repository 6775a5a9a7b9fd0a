//! Core library for the DataVis data structure visualiser.
//!
//! The crate maps a linear data structure (queue, stack, array or ring) to
//! positions in a 3D scene and keeps the scene in step with insertions and
//! removals. Rendering and audio output sit behind the [`SceneSink`] and
//! [`TonePlayer`] traits; [`VisContext`] owns one of each together with the
//! [`StructureController`] for the lifetime of a session.

pub mod audio;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod layout;
pub mod mapping;
pub mod render;
pub mod scene;
pub mod structure;
pub mod timeline;

pub use audio::{PlayedTone, SineSynth, ToneHistory, TonePlayer};
pub use config::{AppConfig, AutoPlayConfig, StructureConfig};
pub use context::VisContext;
pub use controller::{ControllerEvent, StructureController};
pub use error::{DataVisError, Result};
pub use layout::{compute_positions, LayoutParams};
pub use mapping::{Tone, ToneMapping};
pub use render::{ElementMesh, MeshId, SceneGraph, SceneSink, SceneStats};
pub use scene::{Camera, Face, FaceLabel, Light, Material, SceneDescriptor};
pub use structure::{parse_value, Element, RemovalEnd, Structure, StructureKind};
pub use timeline::{AutoPlay, PlaybackClock, PlaybackState, StepKind, StepTicket};
