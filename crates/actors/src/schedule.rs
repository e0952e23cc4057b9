use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    actor_ref::WeakActorRef,
    handler::{Handler, Message},
};

/// A repeating timer feeding messages into an actor's mailbox.
///
/// Dropping the handle cancels the timer. A message the timer already
/// queued is still delivered, so actors that restart timers should tag the
/// messages and ignore stale ones.
#[must_use = "the timer is cancelled when the handle is dropped"]
pub struct Timer {
    task: JoinHandle<()>,
}

impl Timer {
    pub fn cancel(self) {}
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Sends `message()` to `target` every `period`, the first time one full
/// period from now. Stops on its own when the actor stops.
pub fn repeat<A, M, F>(target: WeakActorRef<A>, period: Duration, mut message: F) -> Timer
where
    A: Handler<M>,
    M: Message,
    F: FnMut() -> M + Send + 'static,
{
    let first = Instant::now() + period;
    let task = tokio::spawn(async move {
        let mut interval = time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = target.stopping() => break,
                _ = interval.tick() => {}
            }
            let Some(actor) = target.upgrade() else {
                break;
            };
            if actor.tell(message()).await.is_err() {
                break;
            }
        }
    });
    Timer { task }
}
