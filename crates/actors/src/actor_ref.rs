use tokio_util::sync::CancellationToken;

use crate::{
    actor::{Actor, ActorError},
    handler::{Handler, Letter, Message},
    mailbox::{BoundedMailbox, WeakMailbox},
};

pub struct ActorRef<A: Actor> {
    sender: BoundedMailbox<A>,
    stop: CancellationToken,
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            stop: self.stop.clone(),
        }
    }
}

impl<A: Actor> ActorRef<A> {
    pub(crate) fn new(sender: BoundedMailbox<A>, stop: CancellationToken) -> Self {
        Self { sender, stop }
    }

    /// Queues `message` without waiting for it to be handled.
    pub async fn tell<M>(&self, message: M) -> Result<(), ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        if self.stop.is_cancelled() {
            return Err(ActorError::Stopped);
        }
        self.sender.send(Letter::<M, A>::tell(message)).await
    }

    /// Queues `message` and waits for the handler's response.
    pub async fn ask<M>(&self, message: M) -> Result<M::Response, ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        if self.stop.is_cancelled() {
            return Err(ActorError::Stopped);
        }
        let (letter, response) = Letter::<M, A>::ask(message);
        self.sender.send(letter).await?;
        Ok(response.await?)
    }

    /// Stops the actor and waits until `Actor::stopped` has run. Messages
    /// still queued are dropped unhandled.
    ///
    /// Must not be awaited from inside one of the actor's own handlers.
    pub async fn stop(&self) {
        self.stop.cancel();
        self.sender.closed().await;
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled() || self.sender.is_closed()
    }

    pub fn downgrade(&self) -> WeakActorRef<A> {
        WeakActorRef {
            sender: self.sender.downgrade(),
            stop: self.stop.clone(),
        }
    }
}

/// Reference that does not keep the actor's mailbox open.
pub struct WeakActorRef<A: Actor> {
    sender: WeakMailbox<A>,
    stop: CancellationToken,
}

impl<A: Actor> Clone for WeakActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            stop: self.stop.clone(),
        }
    }
}

impl<A: Actor> WeakActorRef<A> {
    /// `None` once the actor stopped or every strong reference is gone.
    pub fn upgrade(&self) -> Option<ActorRef<A>> {
        if self.stop.is_cancelled() {
            return None;
        }
        self.sender
            .upgrade()
            .map(|sender| ActorRef::new(sender, self.stop.clone()))
    }

    /// Resolves when the actor is asked to stop.
    pub async fn stopping(&self) {
        self.stop.cancelled().await
    }
}
