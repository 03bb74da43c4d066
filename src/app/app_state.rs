//! Usage: Process-wide state shared by `commands/*` (session, API clients, screen state, shell hooks).

use crate::api_client::{CompanionApi, HttpCompanionApi};
use crate::checkin::CheckInGate;
use crate::credential_store::{CredentialStore, FileCredentialStore};
use crate::emergency::EmergencyScreen;
use crate::notice::NoticeSink;
use crate::session::Session;
use crate::settings::{self, AppSettings};
use crate::shared::error::{AppError, AppResult};
use crate::shortcuts::UrlOpener;
use crate::tasks::TaskSync;
use crate::weather::{OpenMeteoClient, WeatherSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Platform hooks supplied by the shell hosting the core.
pub struct ShellHooks {
    pub notices: Arc<dyn NoticeSink>,
    pub opener: Arc<dyn UrlOpener>,
}

pub struct AppState {
    pub(crate) data_dir: PathBuf,
    pub(crate) settings: AppSettings,
    pub(crate) session: Arc<Session>,
    pub(crate) api: Arc<dyn CompanionApi>,
    pub(crate) weather: Arc<dyn WeatherSource>,
    pub(crate) tasks: TaskSync,
    pub(crate) emergency: EmergencyScreen,
    pub(crate) checkin: CheckInGate,
    pub(crate) notices: Arc<dyn NoticeSink>,
    pub(crate) opener: Arc<dyn UrlOpener>,
}

impl AppState {
    /// Reads (or creates) `settings.json` under `data_dir` and builds the HTTP-backed state.
    pub fn load(data_dir: PathBuf, hooks: ShellHooks) -> AppResult<Self> {
        let settings = settings::read(&data_dir).map_err(AppError::Storage)?;
        let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(&data_dir));
        let api: Arc<dyn CompanionApi> = Arc::new(HttpCompanionApi::from_settings(&settings)?);
        let weather: Arc<dyn WeatherSource> = Arc::new(OpenMeteoClient::from_settings(&settings)?);

        tracing::info!(
            base_url = %settings.base_url,
            use_endpoint = settings.use_endpoint,
            "app state ready"
        );
        Ok(Self::assemble(data_dir, settings, store, api, weather, hooks))
    }

    pub(crate) fn assemble(
        data_dir: PathBuf,
        settings: AppSettings,
        store: Arc<dyn CredentialStore>,
        api: Arc<dyn CompanionApi>,
        weather: Arc<dyn WeatherSource>,
        hooks: ShellHooks,
    ) -> Self {
        let session = Arc::new(Session::new(store));
        session.bootstrap();

        Self {
            tasks: TaskSync::new(Arc::clone(&session), Arc::clone(&api)),
            emergency: EmergencyScreen::new(Arc::clone(&session), Arc::clone(&api)),
            checkin: CheckInGate::default(),
            data_dir,
            settings,
            session,
            api,
            weather,
            notices: hooks.notices,
            opener: hooks.opener,
        }
    }

    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tasks(&self) -> &TaskSync {
        &self.tasks
    }

    pub fn emergency(&self) -> &EmergencyScreen {
        &self.emergency
    }

    pub fn checkin(&self) -> &CheckInGate {
        &self.checkin
    }
}
