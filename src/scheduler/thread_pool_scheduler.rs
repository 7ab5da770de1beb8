use std::{sync::Arc, time::Duration};

use futures::{
  executor::ThreadPool,
  future::{AbortHandle, Abortable},
};
use once_cell::sync::Lazy;

use super::{invoke_action, wall_clock, Action, PeriodicAction, Scheduler};
use crate::disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable};

static DEFAULT_RUNTIME: Lazy<ThreadPool> = Lazy::new(|| {
  ThreadPool::builder()
    .name_prefix("rxflow-pool-")
    .create()
    .expect("failed to create the default thread pool")
});

/// Runs work on a shared futures thread pool; delays are async timers.
#[derive(Clone, Default)]
pub struct ThreadPoolScheduler {
  pool: Option<ThreadPool>,
}

impl ThreadPoolScheduler {
  /// Uses `pool` instead of the process-wide default pool.
  pub fn with_pool(pool: ThreadPool) -> Self { Self { pool: Some(pool) } }

  fn spawn(&self, fut: impl std::future::Future<Output = ()> + Send + 'static) -> AbortHandle {
    let (handle, registration) = AbortHandle::new_pair();
    let task = async move {
      let _ = Abortable::new(fut, registration).await;
    };
    self.pool.as_ref().unwrap_or(&*DEFAULT_RUNTIME).spawn_ok(task);
    handle
  }
}

struct PoolTask {
  handle: AbortHandle,
  slot: Arc<SingleAssignmentDisposable>,
}

impl Disposable for PoolTask {
  fn dispose(&self) {
    self.handle.abort();
    self.slot.dispose();
  }

  fn is_disposed(&self) -> bool { self.slot.is_disposed() }
}

impl Scheduler for ThreadPoolScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable {
    let slot = Arc::new(SingleAssignmentDisposable::new());
    let c_slot = slot.clone();
    let scheduler = self.clone();
    let handle = self.spawn(async move {
      if !delay.is_zero() {
        futures_time::task::sleep(delay.into()).await;
      }
      invoke_action(action, &scheduler, &c_slot);
    });
    BoxedDisposable::new(PoolTask { handle, slot })
  }

  fn schedule_periodic(&self, period: Duration, mut action: PeriodicAction) -> BoxedDisposable {
    let handle = self.spawn(async move {
      loop {
        futures_time::task::sleep(period.into()).await;
        action();
      }
    });
    BoxedDisposable::new(PoolTask { handle, slot: Arc::default() })
  }
}
