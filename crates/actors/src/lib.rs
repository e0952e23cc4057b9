use std::panic::AssertUnwindSafe;

use actor::{Actor, SupervisionStrategy};
use actor_ref::ActorRef;
use futures::FutureExt;
use mailbox::bounded_mailbox;
use tokio_util::sync::CancellationToken;

pub mod actor;
pub mod actor_ref;
pub mod handler;
pub mod mailbox;
pub mod schedule;

const MAILBOX_CAPACITY: usize = 32;

/// Runs `actor` on its own task. Messages are handled one at a time in the
/// order they were sent. If a handler panics, the actor is resumed or
/// stopped according to `Actor::on_fail()`.
///
/// The actor stops when `ActorRef::stop` is called or every strong
/// `ActorRef` is dropped.
pub fn run<A: Actor>(mut actor: A) -> ActorRef<A> {
    let (tx, mut rx) = bounded_mailbox(MAILBOX_CAPACITY);
    let stop = CancellationToken::new();
    let actor_ref = ActorRef::new(tx, stop.clone());
    actor.started(actor_ref.downgrade());

    // run actor
    tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                message = rx.recv() => message,
            };
            let Some(message) = message else {
                break;
            };
            // handle message
            let result = AssertUnwindSafe(message.deliver(&mut actor))
                .catch_unwind()
                .await;
            // handler paniced?
            if let Err(why) = result {
                log::error!("actor paniced: {:?}", why);
                match actor.on_fail(why) {
                    SupervisionStrategy::Resume => {}
                    SupervisionStrategy::Stop => break,
                }
            }
        }
        stop.cancel();
        actor.stopped();
        // closing the mailbox releases everyone waiting in `ActorRef::stop`
        drop(rx);
    });

    actor_ref
}
