use products_hr::{Employee, EmployeeId, EmployeePatch, NewEmployee};
use tracing::{debug, warn};

use crate::{
    error::{ClientError, ClientResult},
    transport::EmployeeApi,
};

/// Visibility and target of the create/edit form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Closed,
    OpenForCreate,
    OpenForEdit(Employee),
}

impl DialogState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }
}

/// How the cached list catches up after a successful mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Discard the cache and fetch the full list again.
    #[default]
    Refetch,
    /// Apply the mutation response to the cache without a round trip.
    LocalPatch,
}

/// Form values as the user edits them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub name: String,
    pub email: String,
}

impl EmployeeDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl From<&Employee> for EmployeeDraft {
    fn from(value: &Employee) -> Self {
        Self::new(value.name.clone(), value.email.clone())
    }
}

enum Change {
    Upserted(Employee),
    Removed(EmployeeId),
}

/// Keeps the displayed employee list in step with the directory API and
/// drives the create/edit dialog.
///
/// Every operation awaits its request before returning, so mutations issued
/// through one controller never interleave.
pub struct DirectoryController<A> {
    api: A,
    policy: SyncPolicy,
    employees: Vec<Employee>,
    dialog: DialogState,
    last_error: Option<ClientError>,
}

impl<A: EmployeeApi> DirectoryController<A> {
    pub fn new(api: A) -> Self {
        Self::with_policy(api, SyncPolicy::default())
    }

    pub fn with_policy(api: A, policy: SyncPolicy) -> Self {
        Self {
            api,
            policy,
            employees: Vec::new(),
            dialog: DialogState::Closed,
            last_error: None,
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Initial load when the view appears.
    pub async fn mount(&mut self) -> ClientResult<()> {
        self.refresh().await
    }

    /// Replace the cached list with the server's, clearing any recorded error.
    /// On failure the stale list stays.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        match self.api.list().await {
            Ok(employees) => {
                debug!(count = employees.len(), "employee list refreshed");
                self.employees = employees;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "employee list refresh failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Open the form, for editing when a record is given and for creating otherwise.
    /// An already-open dialog is retargeted.
    pub fn open(&mut self, target: Option<Employee>) {
        self.dialog = match target {
            Some(employee) => DialogState::OpenForEdit(employee),
            None => DialogState::OpenForCreate,
        };
        self.last_error = None;
    }

    pub fn open_create(&mut self) {
        self.open(None);
    }

    pub fn open_edit(&mut self, employee: Employee) {
        self.open(Some(employee));
    }

    pub fn cancel(&mut self) {
        self.dialog = DialogState::Closed;
        self.last_error = None;
    }

    /// Initial form values, or `None` while the dialog is closed.
    pub fn draft(&self) -> Option<EmployeeDraft> {
        match &self.dialog {
            DialogState::Closed => None,
            DialogState::OpenForCreate => Some(EmployeeDraft::default()),
            DialogState::OpenForEdit(employee) => Some(EmployeeDraft::from(employee)),
        }
    }

    /// Send the form. Success closes the dialog and syncs the list; failure
    /// leaves the dialog open with the error recorded.
    ///
    /// A failed refresh after a successful mutation does not fail the submit;
    /// it is left in [`DirectoryController::last_error`].
    pub async fn submit(&mut self, draft: EmployeeDraft) -> ClientResult<Employee> {
        let result = match &self.dialog {
            DialogState::Closed => Err(ClientError::NoOpenDialog),
            DialogState::OpenForCreate => {
                self.api
                    .create(&NewEmployee::new(draft.name, draft.email))
                    .await
            }
            DialogState::OpenForEdit(target) => {
                let patch = EmployeePatch::from(NewEmployee::new(draft.name, draft.email));
                self.api.update(target.id, &patch).await
            }
        };

        match result {
            Ok(employee) => {
                self.dialog = DialogState::Closed;
                self.last_error = None;
                self.sync(Change::Upserted(employee.clone())).await;
                Ok(employee)
            }
            Err(err) => {
                warn!(error = %err, "employee submit failed; dialog kept open");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Delete a record and sync the list. `Ok(false)` means the server had no
    /// such record; that is also recorded as a not-found error.
    pub async fn delete(&mut self, id: EmployeeId) -> ClientResult<bool> {
        match self.api.delete(id).await {
            Ok(success) => {
                if success {
                    self.last_error = None;
                }
                self.sync(Change::Removed(id)).await;
                if !success {
                    self.last_error = Some(ClientError::NotFound(format!("employee {id}")));
                }
                Ok(success)
            }
            Err(err) => {
                warn!(error = %err, id, "employee delete failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    async fn sync(&mut self, change: Change) {
        match self.policy {
            SyncPolicy::Refetch => {
                if let Err(err) = self.refresh().await {
                    debug!(error = %err, "refresh after mutation failed");
                }
            }
            SyncPolicy::LocalPatch => self.apply_locally(change),
        }
    }

    fn apply_locally(&mut self, change: Change) {
        match change {
            Change::Upserted(employee) => {
                match self.employees.iter().position(|e| e.id == employee.id) {
                    Some(index) => self.employees[index] = employee,
                    None => self.employees.push(employee),
                }
            }
            Change::Removed(id) => self.employees.retain(|e| e.id != id),
        }
    }
}

#[cfg(test)]
mod tests {
    use directory_server::{AppConfig, AppState, build_router};

    use super::*;
    use crate::transport::{ApiClient, RouterTransport};

    type Controller = DirectoryController<ApiClient<RouterTransport>>;

    fn controller_with(policy: SyncPolicy) -> (AppState, Controller) {
        let state = AppState::new(&AppConfig::default()).unwrap();
        let api = ApiClient::new(RouterTransport::new(build_router(state.clone())));
        (state, DirectoryController::with_policy(api, policy))
    }

    async fn mounted() -> (AppState, Controller) {
        let (state, mut controller) = controller_with(SyncPolicy::Refetch);
        controller.mount().await.unwrap();
        (state, controller)
    }

    #[tokio::test]
    async fn mount_loads_the_full_list() {
        let (_state, controller) = mounted().await;
        assert_eq!(controller.employees().len(), 3);
        assert_eq!(controller.dialog(), &DialogState::Closed);
    }

    #[tokio::test]
    async fn open_with_record_targets_edit_and_prefills_draft() {
        let (_state, mut controller) = mounted().await;
        let john = controller.employees()[0].clone();
        controller.open(Some(john.clone()));
        assert_eq!(controller.dialog(), &DialogState::OpenForEdit(john));
        assert_eq!(
            controller.draft(),
            Some(EmployeeDraft::new("John Doe", "john@example.com"))
        );
    }

    #[tokio::test]
    async fn cancel_closes_without_touching_the_store() {
        let (state, mut controller) = mounted().await;
        let before = state.store.lock().await.list();

        controller.open_create();
        assert_eq!(controller.draft(), Some(EmployeeDraft::default()));
        controller.cancel();
        assert_eq!(controller.dialog(), &DialogState::Closed);

        let john = controller.employees()[0].clone();
        controller.open_edit(john);
        controller.cancel();
        assert_eq!(controller.dialog(), &DialogState::Closed);
        assert_eq!(controller.draft(), None);
        assert_eq!(state.store.lock().await.list(), before);
    }

    #[tokio::test]
    async fn create_submit_closes_dialog_and_refetches() {
        let (_state, mut controller) = mounted().await;
        controller.open_create();
        let created = controller
            .submit(EmployeeDraft::new("Ann", "ann@x.com"))
            .await
            .unwrap();
        assert_eq!(controller.dialog(), &DialogState::Closed);
        assert!(controller.last_error().is_none());
        assert_eq!(controller.employees().len(), 4);
        assert_eq!(controller.employees().last(), Some(&created));
    }

    #[tokio::test]
    async fn edit_submit_updates_the_target_record() {
        let (state, mut controller) = mounted().await;
        let jane = controller.employees()[1].clone();
        controller.open_edit(jane.clone());
        controller
            .submit(EmployeeDraft::new("Janet Smith", "jane@example.com"))
            .await
            .unwrap();
        assert_eq!(controller.employees()[1].name, "Janet Smith");
        assert_eq!(
            state.store.lock().await.get(jane.id).map(|e| e.name.clone()),
            Some("Janet Smith".to_string())
        );
    }

    #[tokio::test]
    async fn failed_submit_keeps_dialog_open_with_error() {
        let (state, mut controller) = mounted().await;
        controller.open_create();
        state.network.fail_next(1);
        let err = controller
            .submit(EmployeeDraft::new("Ann", "ann@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(controller.dialog(), &DialogState::OpenForCreate);
        assert_eq!(controller.last_error(), Some(&err));
        assert_eq!(state.store.lock().await.len(), 3);

        controller
            .submit(EmployeeDraft::new("Ann", "ann@x.com"))
            .await
            .unwrap();
        assert_eq!(controller.dialog(), &DialogState::Closed);
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn editing_a_deleted_record_reports_not_found() {
        let (state, mut controller) = mounted().await;
        let jane = controller.employees()[1].clone();
        controller.open_edit(jane.clone());
        state.store.lock().await.remove(jane.id);

        let err = controller
            .submit(EmployeeDraft::new("Ghost", "ghost@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert!(controller.dialog().is_open());
    }

    #[tokio::test]
    async fn submit_without_open_dialog_is_rejected() {
        let (_state, mut controller) = mounted().await;
        let err = controller
            .submit(EmployeeDraft::new("Ann", "ann@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::NoOpenDialog);
        assert_eq!(controller.employees().len(), 3);
    }

    #[tokio::test]
    async fn delete_refetches_and_flags_missing_records() {
        let (_state, mut controller) = mounted().await;
        assert!(controller.delete(2).await.unwrap());
        let ids: Vec<_> = controller.employees().iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 3]);
        assert!(controller.last_error().is_none());

        assert!(!controller.delete(2).await.unwrap());
        assert!(matches!(
            controller.last_error(),
            Some(ClientError::NotFound(_))
        ));
        assert_eq!(controller.employees().len(), 2);
    }

    #[tokio::test]
    async fn successful_refresh_clears_earlier_failure() {
        let (state, mut controller) = controller_with(SyncPolicy::Refetch);
        state.network.fail_next(1);
        assert!(controller.mount().await.is_err());
        assert!(matches!(
            controller.last_error(),
            Some(ClientError::Transport(_))
        ));

        controller.refresh().await.unwrap();
        assert_eq!(controller.employees().len(), 3);
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn successful_delete_clears_earlier_failure() {
        let (state, mut controller) = controller_with(SyncPolicy::LocalPatch);
        controller.mount().await.unwrap();
        state.network.fail_next(1);
        assert!(controller.delete(2).await.is_err());
        assert!(controller.last_error().is_some());

        assert!(controller.delete(2).await.unwrap());
        assert!(controller.last_error().is_none());
        let ids: Vec<_> = controller.employees().iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[tokio::test]
    async fn refetch_picks_up_changes_made_elsewhere() {
        let (state, mut controller) = mounted().await;
        state
            .store
            .lock()
            .await
            .insert(NewEmployee::new("Side", "side@example.com"))
            .unwrap();
        controller.delete(1).await.unwrap();
        let names: Vec<_> = controller.employees().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Jane Smith", "Jane sds", "Side"]);
    }

    #[tokio::test]
    async fn local_patch_applies_responses_without_refetch() {
        let (state, mut controller) = controller_with(SyncPolicy::LocalPatch);
        controller.mount().await.unwrap();
        state
            .store
            .lock()
            .await
            .insert(NewEmployee::new("Unseen", "unseen@example.com"))
            .unwrap();

        controller.open_create();
        let created = controller
            .submit(EmployeeDraft::new("Ann", "ann@x.com"))
            .await
            .unwrap();
        controller.delete(1).await.unwrap();

        let names: Vec<_> = controller.employees().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Jane Smith", "Jane sds", "Ann"]);
        assert_eq!(controller.employees().last(), Some(&created));
    }
}
