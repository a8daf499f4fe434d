//! Typed command dispatch.
//!
//! One method per command. Each picks its timeout from `[live]`: polling
//! queries use `poll_timeout_ms`, everything that changes the game uses
//! `edit_timeout_ms`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::dto::*;
use super::error::LiveError;
use super::message::{Command, Response};
use super::transport::{CommandTransport, Importance};
use crate::config::ConfigHandle;

pub struct CommandDispatcher {
    transport: Arc<CommandTransport>,
    config: Arc<ConfigHandle>,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<CommandTransport>, config: Arc<ConfigHandle>) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &Arc<CommandTransport> {
        &self.transport
    }

    // ------------------------------------------------------------------------
    // object lifecycle
    // ------------------------------------------------------------------------

    /// Add objects; any failed item is a `PartialFailure`.
    ///
    /// An answer without a readable batch result is `Rejected`: nothing
    /// says which objects made it in.
    pub async fn add_objects(&self, objects: Vec<AddObject>) -> Result<BatchOutcome, LiveError> {
        let response = self
            .edit(CommandBody::AddObjects(AddObjects { objects }))
            .await?;
        let batch = response
            .data_as::<BatchResponse>()
            .map_err(|e| LiveError::Rejected(format!("AddObjects returned no batch result ({e})")))?;
        BatchOutcome::from(&batch).into_result()
    }

    /// Remove objects.
    ///
    /// `Ok(None)` when the live process answered without a readable body,
    /// e.g. while it sits on a breakpoint.
    pub async fn remove_objects(
        &self,
        element_names: Vec<String>,
        object_names: Vec<String>,
    ) -> Result<Option<RemoveObjectsResponse>, LiveError> {
        let response = self
            .edit(CommandBody::RemoveObjects(RemoveObjects {
                element_names,
                object_names,
            }))
            .await?;
        if response.data.is_null() {
            return Ok(None);
        }
        Ok(response.data_as().ok())
    }

    pub async fn reorder(&self, reorder: ReorderObject) -> Result<(), LiveError> {
        self.edit(CommandBody::ReorderObject(reorder)).await?;
        Ok(())
    }

    pub async fn move_objects(
        &self,
        changes: Vec<MoveObjectToContainer>,
    ) -> Result<BatchOutcome, LiveError> {
        let response = self
            .edit(CommandBody::MoveObjectsToContainer(MoveObjectsToContainer {
                changes,
            }))
            .await?;
        BatchOutcome::from(response.data_as::<MoveObjectsResponse>()?).into_result()
    }

    pub async fn create_entity(&self, entity: Value) -> Result<(), LiveError> {
        self.edit(CommandBody::CreateEntity(CreateEntity { entity }))
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // variables and states
    // ------------------------------------------------------------------------

    /// Assign variables. Per-item results, when reported, are checked like
    /// `add_objects`.
    pub async fn set_variables(
        &self,
        assignments: Vec<VariableAssignment>,
    ) -> Result<BatchOutcome, LiveError> {
        let count = assignments.len();
        let response = self
            .edit(CommandBody::SetVariables(SetVariables { assignments }))
            .await?;
        match response.data_as::<BatchResponse>() {
            Ok(batch) => BatchOutcome::from(&batch).into_result(),
            Err(_) => Ok(BatchOutcome {
                succeeded: count,
                failed: 0,
            }),
        }
    }

    pub async fn add_variable(&self, element_name_game: String, variable: Value) -> Result<(), LiveError> {
        self.edit(CommandBody::AddVariable(AddVariable {
            element_name_game,
            variable,
        }))
        .await?;
        Ok(())
    }

    pub async fn create_state(&self, create: CreateState) -> Result<(), LiveError> {
        self.edit(CommandBody::CreateState(create)).await?;
        Ok(())
    }

    pub async fn apply_state(&self, apply: ApplyState) -> Result<(), LiveError> {
        self.edit(CommandBody::ApplyState(apply)).await?;
        Ok(())
    }

    pub async fn update_state_category(&self, update: UpdateStateCategory) -> Result<(), LiveError> {
        self.edit(CommandBody::UpdateStateCategory(update)).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // selection
    // ------------------------------------------------------------------------

    pub async fn select(&self, selection: Selection) -> Result<(), LiveError> {
        self.edit(CommandBody::SelectObject(selection)).await?;
        Ok(())
    }

    pub async fn select_sub_index(&self, index: Option<i64>) -> Result<(), LiveError> {
        self.edit(CommandBody::SelectSubIndex(SelectSubIndex { index }))
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // content lifecycle
    // ------------------------------------------------------------------------

    pub async fn force_reload_file(&self, reload: ForceReloadFile) -> Result<(), LiveError> {
        self.edit(CommandBody::ForceReloadFile(reload)).await?;
        Ok(())
    }

    pub async fn reload_global_content(&self, stripped_name: String) -> Result<(), LiveError> {
        self.edit(CommandBody::ReloadGlobalContent(ReloadGlobalContent {
            stripped_global_content_file_name: stripped_name,
        }))
        .await?;
        Ok(())
    }

    pub async fn restart_screen(&self, reload_global_content: bool) -> Result<(), LiveError> {
        self.edit(CommandBody::RestartScreen(RestartScreen {
            reload_global_content,
        }))
        .await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // session
    // ------------------------------------------------------------------------

    pub async fn set_edit_mode(&self, enabled: bool) -> Result<(), LiveError> {
        self.edit(CommandBody::SetEditMode(SetEditMode { enabled }))
            .await?;
        Ok(())
    }

    /// Name of the screen the live process is showing.
    pub async fn current_screen(&self) -> Result<String, LiveError> {
        let response = self.poll(CommandBody::GetCurrentScreen, Importance::Normal).await?;
        match response.data {
            Value::String(screen) if !screen.is_empty() => Ok(screen),
            Value::String(_) | Value::Null => Err(LiveError::Malformed("no screen name".into())),
            other => Err(LiveError::Malformed(format!("screen name is not a string: {other}"))),
        }
    }

    pub async fn camera_position(&self) -> Result<CameraPosition, LiveError> {
        self.poll(CommandBody::GetCameraPosition, Importance::Normal)
            .await?
            .data_as()
    }

    /// Profiling snapshot; `Busy` while the previous one is outstanding.
    pub async fn profiling_data(&self) -> Result<Value, LiveError> {
        Ok(self
            .poll(CommandBody::GetProfilingData, Importance::IfNotBusy)
            .await?
            .data)
    }

    /// Send an untyped command (used by `relive send`).
    pub async fn raw(&self, command: &Command) -> Result<Response, LiveError> {
        self.transport
            .send(command, self.edit_timeout(), Importance::Normal)
            .await
    }

    // ------------------------------------------------------------------------
    // helpers
    // ------------------------------------------------------------------------

    fn edit_timeout(&self) -> Duration {
        self.config.get().live.edit_timeout()
    }

    async fn edit(&self, body: CommandBody) -> Result<Response, LiveError> {
        let command = Command::from_body(&body)?;
        self.transport
            .send(&command, self.edit_timeout(), Importance::Normal)
            .await?
            .into_success()
    }

    async fn poll(&self, body: CommandBody, importance: Importance) -> Result<Response, LiveError> {
        let command = Command::from_body(&body)?;
        let timeout = self.config.get().live.poll_timeout();
        self.transport
            .send(&command, timeout, importance)
            .await?
            .into_success()
    }
}
