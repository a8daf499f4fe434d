//! Typed commands and responses.
//!
//! Every editor mutation maps to exactly one `CommandBody` variant. Element
//! and object names are identifiers the live process resolves in its own
//! type space (e.g. `MyGame.Screens.GameScreen`), never file paths. Editor
//! model objects (named objects, states, entities) travel as opaque JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::LiveError;

/// All commands the live process understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CommandBody {
    // object lifecycle
    AddObjects(AddObjects),
    RemoveObjects(RemoveObjects),
    ReorderObject(ReorderObject),
    MoveObjectsToContainer(MoveObjectsToContainer),
    CreateEntity(CreateEntity),

    // variables and states
    SetVariables(SetVariables),
    AddVariable(AddVariable),
    CreateState(CreateState),
    ApplyState(ApplyState),
    UpdateStateCategory(UpdateStateCategory),

    // selection
    SelectObject(Selection),
    SelectSubIndex(SelectSubIndex),

    // content lifecycle
    ForceReloadFile(ForceReloadFile),
    ReloadGlobalContent(ReloadGlobalContent),
    RestartScreen(RestartScreen),

    // session
    SetEditMode(SetEditMode),
    GetCurrentScreen,
    GetCameraPosition,
    GetProfilingData,
}

// ============================================================================
// object lifecycle
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddObjects {
    pub objects: Vec<AddObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddObject {
    pub element_name_game: Option<String>,
    /// List object the new object lives in, if any.
    #[serde(default)]
    pub container_name: Option<String>,
    pub named_object: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveObjects {
    pub element_names: Vec<String>,
    pub object_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveObjectsResponse {
    /// The live process is showing the element the objects were removed from.
    pub did_screen_match: bool,
    pub was_object_removed: bool,
}

impl RemoveObjectsResponse {
    /// The game shows the element but kept the objects: it is out of sync.
    pub fn is_out_of_sync(self) -> bool {
        self.did_screen_match && !self.was_object_removed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderObject {
    pub element_name: String,
    pub object_name: String,
    pub old_index: usize,
    pub new_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveObjectsToContainer {
    pub changes: Vec<MoveObjectToContainer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveObjectToContainer {
    pub element_name: String,
    pub object_name: String,
    /// `None` moves the object out of any list.
    pub container_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveObjectsResponse {
    pub number_successfully_moved: usize,
    pub number_failed_to_move: usize,
}

impl From<MoveObjectsResponse> for BatchOutcome {
    fn from(response: MoveObjectsResponse) -> Self {
        Self {
            succeeded: response.number_successfully_moved,
            failed: response.number_failed_to_move,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntity {
    pub entity: Value,
}

// ============================================================================
// variables and states
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVariables {
    pub assignments: Vec<VariableAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableAssignment {
    pub element_name_game: String,
    /// `None` assigns a variable on the element itself.
    #[serde(default)]
    pub object_name: Option<String>,
    pub variable_name: String,
    #[serde(default)]
    pub variable_type: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVariable {
    pub element_name_game: String,
    pub variable: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateState {
    pub element_name_game: String,
    pub category_name: String,
    pub state: Value,
}

/// Re-apply a state after one of its variables changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyState {
    pub element_name_game: String,
    #[serde(default)]
    pub category_name: Option<String>,
    pub state: Value,
    #[serde(default)]
    pub changed_variable: Option<String>,
}

/// Which variables a state category excludes changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStateCategory {
    pub element_name_game: String,
    pub category: Value,
}

// ============================================================================
// selection
// ============================================================================

/// What the game's in-process inspector should highlight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub element_name_glue: String,
    /// Concrete element shown in place of an abstract one.
    #[serde(default)]
    pub backup_element_name_glue: Option<String>,
    /// Element definition, only sent when the selected element changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Value>,
    #[serde(default)]
    pub named_object_names: Vec<String>,
    #[serde(default)]
    pub state_name: Option<String>,
    #[serde(default)]
    pub state_category_name: Option<String>,
    #[serde(default)]
    pub bring_into_focus: bool,
}

impl Selection {
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            element_name_glue: name.into(),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, category: impl Into<String>, state: impl Into<String>) -> Self {
        self.state_category_name = Some(category.into());
        self.state_name = Some(state.into());
        self
    }

    pub fn has_state(&self) -> bool {
        self.state_name.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSubIndex {
    pub index: Option<i64>,
}

// ============================================================================
// content lifecycle
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceReloadFile {
    pub elements_containing_file: Vec<String>,
    pub load_in_global_content: bool,
    pub is_localization_database: bool,
    pub file_relative_to_project: String,
    pub stripped_file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadGlobalContent {
    pub stripped_global_content_file_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartScreen {
    pub reload_global_content: bool,
}

// ============================================================================
// session
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEditMode {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

// ============================================================================
// batch results
// ============================================================================

/// Per-item result of a batch command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub succeeded: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to `AddObjects` and `SetVariables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub results: Vec<ItemResult>,
}

impl From<&BatchResponse> for BatchOutcome {
    fn from(response: &BatchResponse) -> Self {
        let succeeded = response.results.iter().filter(|r| r.succeeded).count();
        Self {
            succeeded,
            failed: response.results.len() - succeeded,
        }
    }
}

/// How many items of a batch the live process applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    /// Any failed item makes the whole batch suspect.
    pub fn into_result(self) -> Result<Self, LiveError> {
        if self.failed == 0 {
            Ok(self)
        } else {
            Err(LiveError::PartialFailure {
                succeeded: self.succeeded,
                failed: self.failed,
            })
        }
    }
}
