use tokio::sync::mpsc;

use crate::{actor::ActorError, handler::Deliver, Actor};

pub type Envelope<A> = Box<dyn Deliver<A>>;

pub struct BoundedMailbox<A: Actor>(mpsc::Sender<Envelope<A>>);

impl<A: Actor> Clone for BoundedMailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> BoundedMailbox<A> {
    pub async fn send<M>(&self, message: M) -> Result<(), ActorError>
    where
        M: Deliver<A> + 'static,
    {
        self.0
            .send(Box::new(message))
            .await
            .map_err(|_| ActorError::Stopped)
    }

    /// Resolves once the receiving side has been dropped.
    pub async fn closed(&self) {
        self.0.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    pub fn downgrade(&self) -> WeakMailbox<A> {
        WeakMailbox(self.0.downgrade())
    }
}

/// Mailbox handle that does not keep the actor alive.
pub struct WeakMailbox<A: Actor>(mpsc::WeakSender<Envelope<A>>);

impl<A: Actor> Clone for WeakMailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> WeakMailbox<A> {
    pub fn upgrade(&self) -> Option<BoundedMailbox<A>> {
        self.0.upgrade().map(BoundedMailbox)
    }
}

pub struct BoundedMailboxReceiver<A: Actor>(mpsc::Receiver<Envelope<A>>);

impl<A: Actor> BoundedMailboxReceiver<A> {
    pub async fn recv(&mut self) -> Option<Envelope<A>> {
        self.0.recv().await
    }
}

pub fn bounded_mailbox<A>(buffer: usize) -> (BoundedMailbox<A>, BoundedMailboxReceiver<A>)
where
    A: Actor,
{
    let (tx, rx) = mpsc::channel(buffer);
    (BoundedMailbox(tx), BoundedMailboxReceiver(rx))
}
