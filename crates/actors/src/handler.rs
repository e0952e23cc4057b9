use std::marker::PhantomData;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::Actor;

#[async_trait]
pub trait Handler<M>: Actor
where
    M: Message,
{
    async fn handle(&mut self, message: M) -> M::Response;
}

/// Messages are moved into the actor, so they need neither `Clone` nor
/// `Sync`.
pub trait Message: Send + 'static {
    type Response: Send + 'static;
}

/// Type-erased message as it sits in a mailbox.
#[async_trait]
pub trait Deliver<A: Actor>: Send {
    async fn deliver(self: Box<Self>, actor: &mut A);
}

enum Reply<R> {
    None,
    To(oneshot::Sender<R>),
}

pub(crate) struct Letter<M, A>
where
    M: Message,
{
    message: M,
    reply: Reply<M::Response>,
    recipient: PhantomData<fn(&mut A)>,
}

impl<M, A> Letter<M, A>
where
    M: Message,
    A: Handler<M>,
{
    pub(crate) fn tell(message: M) -> Self {
        Self {
            message,
            reply: Reply::None,
            recipient: PhantomData,
        }
    }

    pub(crate) fn ask(message: M) -> (Self, oneshot::Receiver<M::Response>) {
        let (tx, rx) = oneshot::channel();
        let letter = Self {
            message,
            reply: Reply::To(tx),
            recipient: PhantomData,
        };
        (letter, rx)
    }
}

#[async_trait]
impl<M, A> Deliver<A> for Letter<M, A>
where
    M: Message,
    A: Handler<M>,
{
    async fn deliver(self: Box<Self>, actor: &mut A) {
        let Letter { message, reply, .. } = *self;
        let response = actor.handle(message).await;
        if let Reply::To(tx) = reply {
            if tx.send(response).is_err() {
                log::debug!("asker went away before the answer");
            }
        }
    }
}
