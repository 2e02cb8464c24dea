use crate::ProvisionError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::{
  collections::HashMap,
  future::Future,
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
  },
};
use tracing::{debug, error};

type Pending<T> = Shared<BoxFuture<'static, Result<T, ProvisionError>>>;
type PendingMap<T> = Arc<Mutex<HashMap<String, (u64, Pending<T>)>>>;

fn lock<T>(map: &Mutex<HashMap<String, (u64, Pending<T>)>>) -> MutexGuard<'_, HashMap<String, (u64, Pending<T>)>> {
  map.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collapses concurrent operations on the same key into one.
///
/// The first caller for a key starts the operation on its own task,
/// callers arriving while it runs await the same result. The task frees
/// the key when the operation settles, even if every caller has gone
/// away in the meantime.
pub(crate) struct InFlight<T: Clone> {
  next_id: AtomicU64,
  pending: PendingMap<T>,
}

impl<T> InFlight<T>
where
  T: Clone + Send + Sync + 'static,
{
  pub(crate) fn new() -> Self {
    InFlight {
      next_id: AtomicU64::new(0),
      pending: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// Runs `start()` unless an operation for `key` is already running,
  /// in which case its result is awaited instead.
  pub(crate) async fn run<F, Fut>(&self, key: &str, start: F) -> Result<T, ProvisionError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ProvisionError>> + Send + 'static,
  {
    let pending = {
      let mut map = lock(&self.pending);
      match map.get(key) {
        Some((_, pending)) => {
          debug!(key, "joining operation already in flight");
          pending.clone()
        }
        None => {
          let id = self.next_id.fetch_add(1, Ordering::Relaxed);
          let operation = start();
          let registry = self.pending.clone();
          let owned_key = key.to_owned();

          // The entry is inserted before the lock is released, so the
          // task cannot try to remove it first.
          let task = tokio::spawn(async move {
            let result = operation.await;
            let mut map = lock(&registry);
            if matches!(map.get(&owned_key), Some((current, _)) if *current == id) {
              map.remove(&owned_key);
            }
            result
          });

          let interrupted_key = key.to_owned();
          let pending = async move {
            task.await.unwrap_or_else(|e| {
              error!(key = %interrupted_key, error = %e, "operation task failed");
              Err(ProvisionError::Aborted(format!(
                "operation on {} was interrupted",
                interrupted_key
              )))
            })
          }
          .boxed()
          .shared();

          map.insert(key.to_owned(), (id, pending.clone()));
          pending
        }
      }
    };

    pending.await
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    lock(&self.pending).len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  #[tokio::test]
  async fn overlapping_calls_share_one_run() {
    let in_flight = InFlight::<u32>::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let start = |value: u32| {
      let runs = runs.clone();
      move || async move {
        runs.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(value)
      }
    };

    let (a, b) = futures::join!(
      in_flight.run("pvc-1", start(1)),
      in_flight.run("pvc-1", start(2)),
    );

    assert_eq!(a, Ok(1));
    assert_eq!(b, Ok(1));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(in_flight.len(), 0);
  }

  #[tokio::test]
  async fn sequential_calls_run_again() {
    let in_flight = InFlight::<u32>::new();

    assert_eq!(in_flight.run("pvc-1", || async { Ok(1) }).await, Ok(1));
    assert_eq!(
      in_flight
        .run("pvc-1", || async {
          Err(ProvisionError::Unavailable("down".into()))
        })
        .await,
      Err(ProvisionError::Unavailable("down".into()))
    );
    assert_eq!(in_flight.run("pvc-1", || async { Ok(3) }).await, Ok(3));
  }

  #[tokio::test]
  async fn abandoned_operation_still_frees_its_key() {
    let in_flight = InFlight::<u32>::new();
    let (release, released) = futures::channel::oneshot::channel::<()>();
    let finished = Arc::new(AtomicUsize::new(0));

    let done = finished.clone();
    let call = in_flight.run("pvc-1", move || async move {
      let _ = released.await;
      done.fetch_add(1, Ordering::SeqCst);
      Ok(1)
    });
    assert!(call.now_or_never().is_none());
    assert_eq!(in_flight.len(), 1);

    release.send(()).unwrap();
    for _ in 0..100 {
      if in_flight.len() == 0 {
        break;
      }
      tokio::task::yield_now().await;
    }

    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert_eq!(in_flight.len(), 0);
    assert_eq!(in_flight.run("pvc-1", || async { Ok(2) }).await, Ok(2));
  }

  #[tokio::test]
  async fn different_keys_do_not_interfere() {
    let in_flight = InFlight::<&'static str>::new();

    let (a, b) = futures::join!(
      in_flight.run("pvc-1", || async {
        tokio::task::yield_now().await;
        Ok("one")
      }),
      in_flight.run("pvc-2", || async { Ok("two") }),
    );

    assert_eq!(a, Ok("one"));
    assert_eq!(b, Ok("two"));
  }
}
