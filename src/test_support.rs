//! Usage: Test doubles (in-memory `CompanionApi` with call accounting and per-task gates, fixed
//! weather) and an `AppState` builder over them.

use crate::api_client::CompanionApi;
use crate::app_state::{AppState, ShellHooks};
use crate::auth::Credential;
use crate::credential_store::{CredentialStore, MemoryCredentialStore};
use crate::emergency::Responsible;
use crate::notice::RecordingNoticeSink;
use crate::settings::AppSettings;
use crate::shared::error::{AppError, AppResult};
use crate::shared::mutex_ext::MutexExt;
use crate::shortcuts::RecordingOpener;
use crate::tasks::ApiTask;
use crate::weather::{Coordinates, Weather, WeatherSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<String>>,
    tasks: Mutex<Vec<ApiTask>>,
    list_error: Mutex<Option<AppError>>,
    login_error: Mutex<Option<AppError>>,
    complete_errors: Mutex<HashMap<String, AppError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    responsible: Mutex<Option<AppResult<Responsible>>>,
}

pub(crate) fn api_task(id: &str, description: &str, date: &str) -> ApiTask {
    ApiTask {
        id: id.to_string(),
        description: description.to_string(),
        date: date.to_string(),
    }
}

impl FakeApi {
    pub(crate) fn with_tasks(tasks: Vec<ApiTask>) -> Self {
        let api = Self::default();
        api.set_tasks(tasks);
        api
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock_or_recover().len()
    }

    pub(crate) fn call_log(&self) -> Vec<String> {
        self.calls.lock_or_recover().clone()
    }

    pub(crate) fn set_tasks(&self, tasks: Vec<ApiTask>) {
        *self.tasks.lock_or_recover() = tasks;
    }

    pub(crate) fn fail_list(&self, err: AppError) {
        *self.list_error.lock_or_recover() = Some(err);
    }

    pub(crate) fn fail_login(&self, err: AppError) {
        *self.login_error.lock_or_recover() = Some(err);
    }

    pub(crate) fn fail_complete(&self, task_id: &str, err: AppError) {
        self.complete_errors
            .lock_or_recover()
            .insert(task_id.to_string(), err);
    }

    pub(crate) fn set_responsible(&self, result: AppResult<Responsible>) {
        *self.responsible.lock_or_recover() = Some(result);
    }

    /// Holds `PUT /elderly/tasks/{task_id}` until [`FakeApi::release`] is called.
    pub(crate) fn gate(&self, task_id: &str) {
        self.gates
            .lock_or_recover()
            .insert(task_id.to_string(), Arc::new(Notify::new()));
    }

    pub(crate) fn release(&self, task_id: &str) {
        if let Some(gate) = self.gates.lock_or_recover().get(task_id) {
            gate.notify_one();
        }
    }

    fn record(&self, call: String) {
        self.calls.lock_or_recover().push(call);
    }
}

#[async_trait::async_trait]
impl CompanionApi for FakeApi {
    async fn probe_login(&self, _credential: &Credential) -> AppResult<()> {
        self.record("GET /users".to_string());
        match self.login_error.lock_or_recover().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_today_tasks(&self, _credential: &Credential) -> AppResult<Vec<ApiTask>> {
        self.record("GET /elderly/tasks/today".to_string());
        if let Some(err) = self.list_error.lock_or_recover().clone() {
            return Err(err);
        }
        Ok(self.tasks.lock_or_recover().clone())
    }

    async fn complete_task(&self, _credential: &Credential, task_id: &str) -> AppResult<()> {
        self.record(format!("PUT /elderly/tasks/{task_id}"));
        let gate = self.gates.lock_or_recover().get(task_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.complete_errors.lock_or_recover().get(task_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn get_responsible(&self, _credential: &Credential) -> AppResult<Responsible> {
        self.record("GET /responsibles".to_string());
        self.responsible
            .lock_or_recover()
            .clone()
            .unwrap_or_else(|| {
                Err(AppError::Server {
                    status: 404,
                    message: "Not Found".to_string(),
                })
            })
    }
}

pub(crate) struct FixedWeather(pub(crate) AppResult<Weather>);

#[async_trait::async_trait]
impl WeatherSource for FixedWeather {
    async fn current(&self, _at: Coordinates) -> AppResult<Weather> {
        self.0.clone()
    }
}

pub(crate) struct TestApp {
    pub(crate) state: AppState,
    pub(crate) api: Arc<FakeApi>,
    pub(crate) notices: Arc<RecordingNoticeSink>,
    pub(crate) opener: Arc<RecordingOpener>,
}

impl TestApp {
    pub(crate) fn notice_bodies(&self) -> Vec<String> {
        self.notices.notices().into_iter().map(|n| n.body).collect()
    }
}

/// App state over in-memory doubles; `credential` seeds the store.
pub(crate) fn test_app(
    api: FakeApi,
    credential: Option<Credential>,
    weather: AppResult<Weather>,
    opener: RecordingOpener,
) -> TestApp {
    let api = Arc::new(api);
    let notices = Arc::new(RecordingNoticeSink::default());
    let opener = Arc::new(opener);
    let store: Arc<dyn CredentialStore> = Arc::new(match credential {
        Some(credential) => MemoryCredentialStore::with_credential(credential),
        None => MemoryCredentialStore::default(),
    });
    let state = AppState::assemble(
        std::env::temp_dir(),
        AppSettings::default(),
        store,
        api.clone(),
        Arc::new(FixedWeather(weather)),
        ShellHooks {
            notices: notices.clone(),
            opener: opener.clone(),
        },
    );
    TestApp {
        state,
        api,
        notices,
        opener,
    }
}
