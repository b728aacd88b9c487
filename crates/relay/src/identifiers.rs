//! Newtype domain identifiers.
//!
//! Every AWS resource name the relay handles is a distinct newtype wrapping a
//! `String`. This prevents accidentally passing a [`ClusterName`] where a
//! [`ServiceName`] is expected when building console links, even though both
//! are plain strings in the inbound event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single dispatch (one inbound event travelling through the relay).
///
/// Generated fresh for every event and recorded on the dispatch span so all log
/// lines for one event can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchId(Uuid);

impl DispatchId {
    /// Generates a new random dispatch identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DispatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (AWS resource names)
// ---------------------------------------------------------------------------

string_id! {
    /// An AWS region code (e.g. `"ap-northeast-1"`).
    Region
}

string_id! {
    /// A CodePipeline pipeline name.
    PipelineName
}

string_id! {
    /// A CodePipeline execution identifier.
    ExecutionId
}

string_id! {
    /// A CodeBuild project name.
    ProjectName
}

string_id! {
    /// The final colon-delimited segment of a CodeBuild build ID (`"project:42"` yields `"42"`).
    BuildNumber
}

string_id! {
    /// An ECS cluster name (last segment of the cluster ARN).
    ClusterName
}

string_id! {
    /// An ECS service name (last segment of the task `group`, e.g. `"service:web"`).
    ServiceName
}

string_id! {
    /// An ECS task definition identifier in `family:revision` form.
    TaskDefinitionId
}

string_id! {
    /// A source-control branch name configured on a pipeline's source action.
    BranchName
}

string_id! {
    /// A source revision identifier (usually a full commit SHA).
    RevisionId
}

impl RevisionId {
    /// Returns the first eight characters, the conventional short commit form.
    ///
    /// Shorter identifiers are returned whole.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}
