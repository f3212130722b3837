use std::{
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};

use epoch123::app_dirs;

static OVERRIDE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Points the app directory at a temp folder for the guard's lifetime.
pub struct ConfigHomeGuard {
    _lock: MutexGuard<'static, ()>,
}

impl ConfigHomeGuard {
    pub fn set(path: PathBuf) -> Self {
        let lock = OVERRIDE_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        app_dirs::set_config_base_override(Some(path));
        Self { _lock: lock }
    }
}

impl Drop for ConfigHomeGuard {
    fn drop(&mut self) {
        app_dirs::set_config_base_override(None);
    }
}
