//! Interactive editing on top of `dg-core`.
//!
//! [`DiagramEngine`] owns the diagram state and rebuilds the resolved table
//! after every batch of changes; tools turn pointer input into those
//! changes.

pub mod changes;
pub mod engine;
pub mod input;
pub mod tools;

pub use changes::{Change, EdgeChange, NodeChange};
pub use engine::{DiagramEngine, NodeMeasurement, PointerPosition};
pub use input::{InputEvent, Modifiers};
pub use tools::{ConnectTool, PendingConnection, SelectTool, Tool, ToolKind};
