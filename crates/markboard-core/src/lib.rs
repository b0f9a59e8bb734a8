//! Markboard Core Library
//!
//! Platform-agnostic data structures and logic for the Markboard sketching
//! and photo-annotation engine.

pub mod config;
pub mod document;
pub mod elements;
pub mod entitlements;
pub mod mapper;
pub mod page;
pub mod session;
pub mod stroke;
pub mod style;
pub mod surface;
pub mod view;

pub use config::{ConfigError, EngineConfig};
pub use document::{Document, DocumentError};
pub use elements::{Element, ElementId, ElementKind, ElementPatch, ElementRef, ImageElement, ImageFormat};
pub use entitlements::{CapacityError, Entitlements, Limit};
pub use mapper::{MapError, map_client_point, map_pointer};
pub use page::{ElementCounts, Page};
pub use session::{EditorSession, SessionError, SessionState, Tool};
pub use stroke::{Stroke, StrokeError, StrokeRecorder, replay};
pub use style::{InkMode, InkStyle, SerializableColor};
pub use surface::Surface;
pub use view::ViewTransform;
