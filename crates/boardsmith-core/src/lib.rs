//! Boardsmith Core Library
//!
//! Scene graph, transactional undo log and drag-and-drop engine for the Boardsmith
//! board editor.

pub mod behavior;
pub mod canvas;
mod container;
pub mod copy_paste;
pub mod drag;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod groups;
pub mod input;
pub mod memento;
mod observable;
pub mod scene;
pub mod selection;
pub mod settings;

pub use behavior::ElementBehavior;
pub use canvas::{Canvas, Layer, Viewport};
pub use copy_paste::DuplicateMap;
pub use drag::{DragFactory, DragGesture, DragOperation, DragStart, factory};
pub use editor::Editor;
pub use element::{DragSession, Element, ElementId, Selectability};
pub use error::{SceneError, SceneResult};
pub use event::{Event, EventKind};
pub use groups::{GroupId, GroupMember, GroupTable, Groups};
pub use input::{Modifiers, MouseButton, PointerEvent, PointerInput};
pub use memento::{ElementMemento, EntityKey, Memento, MAX_UNDO_HISTORY};
pub use scene::Scene;
pub use selection::{Selection, SelectionModel};
pub use settings::{EditorSettings, Rgba, SettingsError};
