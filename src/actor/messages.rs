//! Actor Message Definitions
//!
//! ```text
//! FsActor ──Files──┐
//!                  ├──▶ SyncActor ──▶ dispatch / restart queue
//! EditorInput ─Editor┘
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use super::fs::FileChange;
use crate::live::SelectionRequest;
use crate::live::dto::{
    AddObject, CreateState, MoveObjectToContainer, ReorderObject, VariableAssignment,
};

// =============================================================================
// SyncActor Messages
// =============================================================================

#[derive(Debug)]
pub enum SyncMsg {
    /// A debounced batch, deletes first.
    Files(Vec<FileChange>),
    Editor(EditorEvent),
    Shutdown,
}

// =============================================================================
// Editor events
// =============================================================================

/// Whether a state category now excludes or includes a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ExclusionChange {
    Excluded,
    Included,
}

/// Notifications from the editor's object model, one JSON object per line:
///
/// ```text
/// {"event":"ObjectsRemoved","elementNames":["Screens\\GameScreen"],"objectNames":["Enemy1"]}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum EditorEvent {
    // object structure
    ObjectsAdded {
        objects: Vec<AddObject>,
    },
    ObjectsRemoved {
        element_names: Vec<String>,
        object_names: Vec<String>,
    },
    ObjectReordered(ReorderObject),
    ObjectsMovedToContainer {
        changes: Vec<MoveObjectToContainer>,
    },
    EntityCreated {
        entity: Value,
        /// Generated custom code file the editor is about to write.
        #[serde(default)]
        custom_code_file: Option<PathBuf>,
    },
    ScreenCreated {
        name: String,
    },

    // variables and states
    ObjectVariableChanged(VariableAssignment),
    ElementVariableChanged(VariableAssignment),
    VariableAdded {
        element_name_game: String,
        variable: Value,
        /// Exposes a variable of a contained object, which the game already has.
        #[serde(default)]
        is_tunneled: bool,
    },
    StateCreated(CreateState),
    StateVariableChanged {
        element_name_game: String,
        #[serde(default)]
        category_name: Option<String>,
        state_name: String,
        state: Value,
        #[serde(default)]
        variable_name: Option<String>,
    },
    CategoryExcludedVariablesChanged {
        element_name_game: String,
        category: Value,
        change: ExclusionChange,
    },

    // selection
    Selected(SelectionRequest),
    SubIndexSelected {
        #[serde(default)]
        index: Option<i64>,
    },
    IgnoreNextSelect,

    // self-change suppression
    IgnoreChange {
        path: PathBuf,
        #[serde(default = "one")]
        times: u32,
    },
    IgnoreChangeUntil {
        path: PathBuf,
        seconds: f64,
    },

    // session
    SetEditMode {
        enabled: bool,
    },
    SetAutoRestart {
        enabled: bool,
    },
    ProjectClosed,
}

fn one() -> u32 {
    1
}

impl EditorEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ObjectsAdded { .. } => "ObjectsAdded",
            Self::ObjectsRemoved { .. } => "ObjectsRemoved",
            Self::ObjectReordered(_) => "ObjectReordered",
            Self::ObjectsMovedToContainer { .. } => "ObjectsMovedToContainer",
            Self::EntityCreated { .. } => "EntityCreated",
            Self::ScreenCreated { .. } => "ScreenCreated",
            Self::ObjectVariableChanged(_) => "ObjectVariableChanged",
            Self::ElementVariableChanged(_) => "ElementVariableChanged",
            Self::VariableAdded { .. } => "VariableAdded",
            Self::StateCreated(_) => "StateCreated",
            Self::StateVariableChanged { .. } => "StateVariableChanged",
            Self::CategoryExcludedVariablesChanged { .. } => "CategoryExcludedVariablesChanged",
            Self::Selected(_) => "Selected",
            Self::SubIndexSelected { .. } => "SubIndexSelected",
            Self::IgnoreNextSelect => "IgnoreNextSelect",
            Self::IgnoreChange { .. } => "IgnoreChange",
            Self::IgnoreChangeUntil { .. } => "IgnoreChangeUntil",
            Self::SetEditMode { .. } => "SetEditMode",
            Self::SetAutoRestart { .. } => "SetAutoRestart",
            Self::ProjectClosed => "ProjectClosed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> EditorEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_struct_event_fields_are_camel_case() {
        let event = parse(json!({
            "event": "ObjectsRemoved",
            "elementNames": ["Screens\\GameScreen"],
            "objectNames": ["Enemy1"]
        }));
        assert_eq!(
            event,
            EditorEvent::ObjectsRemoved {
                element_names: vec!["Screens\\GameScreen".into()],
                object_names: vec!["Enemy1".into()],
            }
        );
    }

    #[test]
    fn test_newtype_event_reuses_dto() {
        let event = parse(json!({
            "event": "ObjectVariableChanged",
            "elementNameGame": "MyGame.Screens.GameScreen",
            "objectName": "Player",
            "variableName": "X",
            "value": 32.0
        }));
        let EditorEvent::ObjectVariableChanged(assignment) = event else {
            panic!("wrong variant");
        };
        assert_eq!(assignment.object_name.as_deref(), Some("Player"));
        assert_eq!(assignment.value, json!(32.0));
    }

    #[test]
    fn test_defaults() {
        let event = parse(json!({"event": "IgnoreChange", "path": "Screens/GameScreen.glsj"}));
        assert_eq!(
            event,
            EditorEvent::IgnoreChange {
                path: "Screens/GameScreen.glsj".into(),
                times: 1
            }
        );

        let event = parse(json!({"event": "Selected", "elementName": "Screens\\GameScreen"}));
        let EditorEvent::Selected(request) = event else {
            panic!("wrong variant");
        };
        assert!(request.state_name.is_none());
        assert!(!request.is_abstract);

        assert_eq!(parse(json!({"event": "ProjectClosed"})).name(), "ProjectClosed");
    }

    #[test]
    fn test_unknown_event_rejected() {
        let result = serde_json::from_value::<EditorEvent>(json!({"event": "Teleport"}));
        assert!(result.is_err());
    }
}
