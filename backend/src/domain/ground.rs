//! Ground (workspace) read model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Workspace a user can join; owns issues and sprints out of scope here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ground {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "dddev")]
    pub name: String,
}

/// A user's membership in one ground.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroundMembership {
    /// Whether the user owns the ground rather than merely belonging to it.
    pub is_owner: bool,
    pub ground: Ground,
}
