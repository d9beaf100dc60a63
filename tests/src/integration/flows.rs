//! # Integration Test Flows
//!
//! Drives `roam-store` and `roam-sync` together through their public APIs.
//!
//! ## Flows Tested:
//!
//! 1. **Resolution**: create-then-open lands on the same slot
//! 2. **Owner accessors**: read-after-write, default on miss, leaf-key names
//! 3. **Registration**: once per owner, never extends its lifetime
//! 4. **Remote sync**: `apply_remote` -> change signal -> propagation loop ->
//!    each owner's own dispatcher, in first-access order
//! 5. **Local scope**: never registered, never signalled

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::timeout;

    use roam_store::{
        InMemorySettingsStore, ResolveMode, Scope, ScopedContainerResolver, SettingsContainer,
        SettingsStore,
    };
    use roam_sync::{Dispatcher, PropertyFilter, PropertyOwner, RoamingService};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn setup() -> (Arc<InMemorySettingsStore>, RoamingService) {
        let store = Arc::new(InMemorySettingsStore::new());
        let service = RoamingService::new(store.clone());
        (store, service)
    }

    /// Subscribe to every notification on `owner`, recording names in order.
    fn record(owner: &PropertyOwner) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        owner.subscribe(PropertyFilter::All, move |event| {
            sink.lock().push(event.property.clone())
        });
        seen
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct WindowPlacement {
        x: i32,
        y: i32,
        maximized: bool,
    }

    // =============================================================================
    // RESOLUTION AND ACCESSORS
    // =============================================================================

    #[test]
    fn test_create_then_open_resolves_same_slot() {
        let (store, _) = setup();
        let resolver = ScopedContainerResolver::new(store);

        for raw in ["Key", "Group.Key", "Group.Sub.UsersImage"] {
            let created = resolver
                .resolve_str(raw, Scope::Roaming, ResolveMode::CreateIfMissing)
                .unwrap()
                .unwrap();
            let opened = resolver
                .resolve_str(raw, Scope::Roaming, ResolveMode::Open)
                .unwrap()
                .expect("created containers must be found");

            assert_eq!(created, opened, "path {raw}");
        }
    }

    #[test]
    fn test_read_after_write_same_owner() {
        let (_, service) = setup();
        let owner = service.owner();
        let placement = WindowPlacement {
            x: 40,
            y: 80,
            maximized: true,
        };

        owner
            .set_roamed_property("Windows.Main.Placement", &placement)
            .unwrap();
        let read: WindowPlacement = owner.get_roamed_property("Windows.Main.Placement").unwrap();

        assert_eq!(read, placement);
    }

    #[test]
    fn test_never_set_path_reads_default() {
        let (_, service) = setup();
        let owner = service.owner();

        let value: i32 = owner.get_roamed_property("Never.Set.Path").unwrap();
        let text: String = owner.get_roamed_property("Never.Set.Text").unwrap();
        let placement: WindowPlacement = owner.get_roamed_property("Never.Set.Window").unwrap();

        assert_eq!(value, 0);
        assert_eq!(text, "");
        assert_eq!(placement, WindowPlacement::default());
    }

    #[test]
    fn test_owners_see_each_others_writes() {
        let (_, service) = setup();
        let writer = service.owner();
        let reader = service.owner();
        let seen = record(&reader);

        writer.set_roamed_property("Prefs.Theme", "dark").unwrap();
        let theme: String = reader.get_roamed_property("Prefs.Theme").unwrap();

        assert_eq!(theme, "dark");
        // Same-device writes notify only the writer
        assert!(seen.lock().is_empty());
    }

    // =============================================================================
    // REGISTRATION
    // =============================================================================

    #[test]
    fn test_two_reads_register_once() {
        let (_, service) = setup();
        let owner = service.owner();

        let _: i32 = owner.get_roamed_property("A.X").unwrap();
        let _: i32 = owner.get_roamed_property("A.X").unwrap();

        assert!(owner.is_tracked());
        assert_eq!(service.registry().len(), 1);
    }

    #[test]
    fn test_dropped_owner_excluded_and_never_returns() {
        let (_, service) = setup();
        let kept = service.owner();
        let dropped = service.owner();
        let _: i32 = kept.get_roamed_property("X").unwrap();
        let _: i32 = dropped.get_roamed_property("X").unwrap();

        drop(dropped);

        let first = service.on_external_store_changed();
        assert_eq!(first.live, 1);
        assert_eq!(first.collected, 1);

        for _ in 0..3 {
            let again = service.on_external_store_changed();
            assert_eq!(again.live, 1);
            assert_eq!(again.collected, 0);
        }
        assert_eq!(service.registry().len(), 1);
    }

    // =============================================================================
    // REMOTE SYNC: STORE -> PROPAGATOR -> DISPATCHERS
    // =============================================================================

    /// A reads X and Y, B reads Z. One remote sync delivers X then Y on A's
    /// dispatcher and Z on B's, with no cross-delivery.
    #[tokio::test]
    async fn test_remote_sync_delivers_per_context_in_order() {
        let (store, service) = setup();
        let mut ui_a = Dispatcher::new("a");
        let mut ui_b = Dispatcher::new("b");

        let a = service.owner();
        let b = service.owner();
        {
            let _entered = ui_a.enter();
            let _: i32 = a.get_roamed_property("Group.X").unwrap();
            let _: i32 = a.get_roamed_property("Group.Y").unwrap();
        }
        {
            let _entered = ui_b.enter();
            let _: i32 = b.get_roamed_property("Other.Z").unwrap();
        }
        let seen_a = record(&a);
        let seen_b = record(&b);

        let propagation = service.spawn_propagation();
        store
            .apply_remote(Scope::Roaming, |root| {
                root.create_child("Group")?.set_value("X", json!(1))?;
                root.create_child("Group")?.set_value("Y", json!(2))?;
                root.create_child("Other")?.set_value("Z", json!(3))
            })
            .unwrap();

        timeout(Duration::from_millis(500), ui_a.run_next())
            .await
            .expect("timeout waiting for A");
        timeout(Duration::from_millis(500), ui_b.run_next())
            .await
            .expect("timeout waiting for B");

        assert_eq!(*seen_a.lock(), vec!["X", "Y"]);
        assert_eq!(*seen_b.lock(), vec!["Z"]);

        // Owners read the synced values afterwards
        assert_eq!(a.get_roamed_property::<i32>("Group.Y").unwrap(), 2);
        assert_eq!(b.get_roamed_property::<i32>("Other.Z").unwrap(), 3);

        propagation.abort();
    }

    #[test]
    fn test_closed_window_does_not_block_others() {
        let (store, service) = setup();
        let closed = Dispatcher::new("closed");
        let mut open = Dispatcher::new("open");

        let orphan = service.owner();
        let healthy = service.owner();
        {
            let _entered = closed.enter();
            let _: bool = orphan.get_roamed_property("Flag").unwrap();
        }
        {
            let _entered = open.enter();
            let _: bool = healthy.get_roamed_property("Flag").unwrap();
        }
        let seen = record(&healthy);
        drop(closed);

        store
            .apply_remote(Scope::Roaming, |root| root.set_value("Flag", json!(true)))
            .unwrap();
        let report = service.on_external_store_changed();

        assert_eq!(report.live, 2);
        assert_eq!(report.contexts_gone, 1);
        assert_eq!(open.run_pending(), 1);
        assert_eq!(*seen.lock(), vec!["Flag"]);
    }

    #[test]
    fn test_failed_remote_apply_does_not_signal() {
        let (store, _) = setup();
        let mut changes = store.subscribe_changes();

        let result = store.apply_remote(Scope::Roaming, |root| {
            root.set_value("Huge", json!("x".repeat(16 * 1024)))
        });

        assert!(result.is_err());
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
    }

    // =============================================================================
    // LOCAL SCOPE
    // =============================================================================

    #[test]
    fn test_local_writes_never_register_or_signal() {
        let (store, service) = setup();
        let mut changes = store.subscribe_changes();
        let owner = service.owner();

        owner.set_local_property("Window.Width", 1280).unwrap();
        let width: u32 = owner.get_local_property("Window.Width").unwrap();

        assert_eq!(width, 1280);
        assert!(!owner.is_tracked());
        assert!(service.registry().is_empty());
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));

        let report = service.on_external_store_changed();
        assert_eq!(report.live, 0);
        assert_eq!(report.notifications, 0);
    }
}
