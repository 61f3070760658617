use crate::{prelude::*, status::StatusMap};
use std::collections::HashMap;

/// Last known status of every polled device.
#[derive(Debug, Clone, Default, Deref)]
pub struct DeviceStates(SharedRwLock<HashMap<String, DeviceState>>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    pub status:     Option<Arc<StatusMap>>,
    pub available:  bool,
    pub last_error: Option<String>,
}

impl DeviceStates {
    pub async fn update_status(&self, device: &str, status: StatusMap) {
        let mut lck = self.write().await;
        let state = lck.entry(device.into()).or_default();
        state.status = Some(Arc::new(status));
        state.available = true;
        state.last_error = None;
    }

    /// Keeps the previous status around, stale.
    pub async fn mark_unavailable(&self, device: &str, error: String) {
        let mut lck = self.write().await;
        let state = lck.entry(device.into()).or_default();
        state.available = false;
        state.last_error = Some(error);
    }

    pub async fn get(&self, device: &str) -> Option<DeviceState> {
        let lck = self.read().await;
        lck.get(device).cloned()
    }

    pub async fn get_devices(&self) -> Vec<String> {
        let lck = self.read().await;
        lck.keys().map(|k| k.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(t: f64) -> StatusMap {
        let mut s = StatusMap::new();
        s.insert("t1".into(), json!(t));
        s
    }

    #[tokio::test]
    async fn failed_poll_keeps_stale_status() {
        let states = DeviceStates::default();
        assert_eq!(states.get("dev").await, None);

        states.update_status("dev", status(21.5)).await;
        let s = states.get("dev").await.unwrap();
        assert!(s.available);
        assert_eq!(s.status.as_deref(), Some(&status(21.5)));

        states.mark_unavailable("dev", "transport error".into()).await;
        let s = states.get("dev").await.unwrap();
        assert!(!s.available);
        assert_eq!(s.last_error.as_deref(), Some("transport error"));
        assert_eq!(s.status.as_deref(), Some(&status(21.5)));

        states.update_status("dev", status(22.0)).await;
        let s = states.get("dev").await.unwrap();
        assert!(s.available);
        assert_eq!(s.last_error, None);
        assert_eq!(states.get_devices().await, vec!["dev".to_string()]);
    }

    #[tokio::test]
    async fn first_poll_failure_has_no_status() {
        let states = DeviceStates::default();
        states.mark_unavailable("dev", "missing".into()).await;
        let s = states.get("dev").await.unwrap();
        assert!(!s.available);
        assert!(s.status.is_none());
    }
}
