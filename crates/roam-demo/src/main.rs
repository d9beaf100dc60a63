//! # Roam Demo
//!
//! Two windows bound to the same roamed "users image" property.
//!
//! ## Sequence
//!
//! 1. Configure logging from `ROAM_*` variables
//! 2. Build an in-memory store and spawn change propagation
//! 3. Open two windows, each on its own UI dispatcher
//! 4. Write locally, then apply a simulated sync from another device
//! 5. Drain both dispatchers and show the refreshed values

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use roam_store::{InMemorySettingsStore, Scope, SettingsContainer};
use roam_sync::{Dispatcher, PropertyFilter, PropertyOwner, RoamingService};
use roam_telemetry::{init_telemetry, TelemetryConfig};
use serde_json::json;
use tracing::info;

const USERS_IMAGE: &str = "Profile.Appearance.UsersImage";

/// View model for the profile page.
struct ProfileViewModel {
    owner: PropertyOwner,
    selected: String,
}

impl ProfileViewModel {
    fn new(service: &RoamingService) -> Self {
        Self {
            owner: service.owner(),
            selected: String::new(),
        }
    }

    fn users_image(&self) -> Result<String> {
        self.owner
            .get_roamed_property(USERS_IMAGE)
            .context("reading users image")
    }

    fn set_users_image(&self, image: &str) -> Result<()> {
        self.owner
            .set_roamed_property(USERS_IMAGE, image)
            .context("writing users image")
    }

    /// Selection in the picker. Not persisted.
    fn select(&mut self, image: &str) -> bool {
        self.owner
            .set_field(&mut self.selected, image.to_string(), "SelectedValue")
    }
}

/// Names seen by the demo's subscriber.
#[derive(Clone, Default)]
struct Changes(Arc<Mutex<Vec<String>>>);

impl Changes {
    fn push(&self, name: &str) {
        self.0.lock().push(name.to_string());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let store = Arc::new(InMemorySettingsStore::new());
    let service = RoamingService::new(store.clone());
    let propagation = service.spawn_propagation();

    // Two windows, each with its own UI dispatcher
    let mut profile_ui = Dispatcher::new("profile-window");
    let mut settings_ui = Dispatcher::new("settings-window");

    let mut profile = {
        let _entered = profile_ui.enter();
        let view_model = ProfileViewModel::new(&service);
        info!(image = %view_model.users_image()?, "Profile window opened");
        view_model
    };
    let settings = {
        let _entered = settings_ui.enter();
        let view_model = ProfileViewModel::new(&service);
        info!(image = %view_model.users_image()?, "Settings window opened");
        view_model
    };

    let profile_changes = Changes::default();
    let sink = profile_changes.clone();
    profile
        .owner
        .subscribe(PropertyFilter::All, move |event| sink.push(&event.property));

    let settings_changes = Changes::default();
    let sink = settings_changes.clone();
    settings
        .owner
        .subscribe(PropertyFilter::named("UsersImage"), move |event| {
            sink.push(&event.property)
        });

    profile.select("mountains.png");
    profile.set_users_image("mountains.png")?;
    info!(
        profile = ?profile_changes.take(),
        settings = ?settings_changes.take(),
        "Local write notifies only the writer"
    );

    // Another device picks a different image
    store
        .apply_remote(Scope::Roaming, |root| {
            root.create_child("Profile")?
                .create_child("Appearance")?
                .set_value("UsersImage", json!("ocean.png"))
        })
        .context("applying remote sync")?;

    let wait = Duration::from_secs(1);
    tokio::time::timeout(wait, profile_ui.run_next())
        .await
        .context("no notification reached the profile window")?;
    tokio::time::timeout(wait, settings_ui.run_next())
        .await
        .context("no notification reached the settings window")?;

    info!(
        changes = ?profile_changes.take(),
        image = %profile.users_image()?,
        selected = %profile.selected,
        "Profile window refreshed"
    );
    info!(
        changes = ?settings_changes.take(),
        image = %settings.users_image()?,
        "Settings window refreshed"
    );

    drop(settings);
    let report = service.on_external_store_changed();
    info!(?report, "Propagation after closing the settings window");
    profile_ui.run_pending();

    propagation.abort();
    Ok(())
}
