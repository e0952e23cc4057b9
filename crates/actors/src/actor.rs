use core::fmt;
use std::{any::Any, error};

use tokio::sync::oneshot;

use crate::actor_ref::WeakActorRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStrategy {
    /// Drop the failed message and keep handling the mailbox.
    Resume,
    /// Stop the actor as if `ActorRef::stop` was called.
    Stop,
}

pub trait Actor: Send + Sync + Sized + 'static {
    /// Called on the spawning task right before the actor starts handling
    /// messages. The weak reference lets the actor message itself (timers,
    /// completions of spawned work) without keeping itself alive.
    #[allow(unused_variables)]
    fn started(&mut self, myself: WeakActorRef<Self>) {}

    /// Called once after the last message was handled. Nothing is delivered
    /// to the actor afterwards.
    fn stopped(&mut self) {}

    /// Called when a handler on the actor panics. The return value represents the
    /// supervision strategy used to handle the panic.
    /// NOTE: If this method panics, the actor can not recover from the panic.
    #[allow(unused_variables)]
    fn on_fail(&mut self, error: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Stop
    }
}

#[derive(Debug)]
pub enum ActorError {
    /// The mailbox is closed, the actor has stopped.
    Stopped,
    /// The actor stopped (or panicked) before answering.
    ReceiveAnswerError(oneshot::error::RecvError),
}

impl error::Error for ActorError {}

impl fmt::Display for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "actor has stopped"),
            Self::ReceiveAnswerError(why) => write!(f, "no answer from actor: {}", why),
        }
    }
}

impl From<oneshot::error::RecvError> for ActorError {
    fn from(why: oneshot::error::RecvError) -> Self {
        Self::ReceiveAnswerError(why)
    }
}
