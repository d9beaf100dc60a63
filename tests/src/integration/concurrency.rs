//! # Concurrency Flows
//!
//! Owners registering from many threads while sweeps run, and owners whose
//! captured context is a tokio runtime rather than a dispatcher.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use roam_store::{InMemorySettingsStore, Scope, SettingsContainer};
    use roam_sync::{PropertyFilter, RoamingService};

    #[test]
    fn test_registration_races_sweeps() {
        let service = RoamingService::new(Arc::new(InMemorySettingsStore::new()));

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let service = service.clone();
                thread::spawn(move || {
                    let owners: Vec<_> = (0..16).map(|_| service.owner()).collect();
                    for owner in &owners {
                        let path = format!("Worker{worker}.Value");
                        let _: i32 = owner.get_roamed_property(&path).unwrap();
                        let _: i32 = owner.get_roamed_property(&path).unwrap();
                    }
                    owners
                })
            })
            .collect();

        let sweeper = {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..32 {
                    service.on_external_store_changed();
                }
            })
        };

        let owners: Vec<_> = workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap())
            .collect();
        sweeper.join().unwrap();

        // Every owner tracked exactly once, none lost to a concurrent sweep
        assert!(owners.iter().all(|owner| owner.is_tracked()));
        let report = service.on_external_store_changed();
        assert_eq!(report.live, 128);
        assert_eq!(service.registry().len(), 128);

        drop(owners);
        let report = service.on_external_store_changed();
        assert_eq!(report.live, 0);
        assert_eq!(report.collected, 128);
        assert!(service.registry().is_empty());
    }

    /// Without an entered dispatcher the owner captures the runtime, and the
    /// notification is spawned there.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runtime_context_receives_notifications() {
        let store = Arc::new(InMemorySettingsStore::new());
        let service = RoamingService::new(store.clone());
        let propagation = service.spawn_propagation();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let owner = tokio::spawn({
            let service = service.clone();
            async move {
                let owner = service.owner();
                let _: String = owner.get_roamed_property("Sync.Status").unwrap();
                owner
            }
        })
        .await
        .unwrap();
        owner.subscribe(PropertyFilter::named("Status"), move |event| {
            let _ = tx.send(event.property.clone());
        });

        store
            .apply_remote(Scope::Roaming, |root| {
                root.create_child("Sync")?.set_value("Status", json!("done"))
            })
            .unwrap();

        let name = timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timeout waiting for notification")
            .expect("channel closed");
        assert_eq!(name, "Status");
        assert_eq!(
            owner.get_roamed_property::<String>("Sync.Status").unwrap(),
            "done"
        );

        propagation.abort();
    }

    #[tokio::test]
    async fn test_burst_of_signals_coalesces() {
        let store = Arc::new(InMemorySettingsStore::new());
        let service = RoamingService::new(store.clone());
        let propagation = service.spawn_propagation();

        let owner = service.owner();
        let _: u32 = owner.get_roamed_property("Counter").unwrap();

        // More signals than the change channel holds
        let capacity = store.limits().change_channel_capacity;
        for n in 0..(capacity as u64 * 2) {
            store
                .apply_remote(Scope::Roaming, |root| root.set_value("Counter", json!(n)))
                .unwrap();
        }

        timeout(Duration::from_millis(500), async {
            while service.propagator().sweeps() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("propagation never ran");

        // One sweep for the lagged batch, then one per retained signal
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(service.propagator().sweeps() <= capacity as u64 + 1);
        assert_eq!(
            owner.get_roamed_property::<u64>("Counter").unwrap(),
            capacity as u64 * 2 - 1
        );

        propagation.abort();
    }
}
