use crate::id::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures the engine reports to its caller.
///
/// Transient states such as unmeasured nodes or missing ports are not
/// errors; queries and routing return `None` or skip the element instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parent node {parent} not found (referenced by node {node})")]
    MissingParent { node: NodeId, parent: NodeId },

    #[error("cyclic parent chain through node {node}")]
    ParentCycle { node: NodeId },

    #[error("invalid diagram config: {message}")]
    InvalidConfig { message: String },

    #[error("diagram config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The node at fault, for errors that identify one.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Error::MissingParent { node, .. } | Error::ParentCycle { node } => Some(*node),
            Error::InvalidConfig { .. } | Error::Json(_) => None,
        }
    }
}
