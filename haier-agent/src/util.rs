use crate::prelude::*;
use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Runs `f` every `dur` until the runtime shuts down.
///
/// Runs are sequential, so a slow run delays the next tick instead of
/// overlapping with it. Failures are logged and the loop carries on.
pub fn start_service<T, F>(dur: Duration, name: String, immediate: bool, f: T) -> JoinHandle<()>
where
    T: Fn() -> F + Send + 'static,
    F: std::future::Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(dur);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !immediate {
            interval.tick().await;
        }
        info!("Starting service {} every {:?}", name, dur);
        loop {
            interval.tick().await;
            let tsk = f();
            trace!("Running {}", name);
            if let Err(e) = tsk.await {
                error!("Task {} failure! {:?}", name, e);
            }
        }
    })
}
