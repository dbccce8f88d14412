use std::sync::Arc;

use crate::{domain::ChatId, messaging::port::MessagingPort};

/// Outcome of a single delivery attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Any transport failure: blocked bot, deleted account, bad id, flood limit, network.
    Unreachable,
}

/// Sends one message to one recipient and classifies the result.
#[derive(Clone)]
pub struct Dispatcher {
    messenger: Arc<dyn MessagingPort>,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn MessagingPort>) -> Self {
        Self { messenger }
    }

    pub fn messenger(&self) -> &Arc<dyn MessagingPort> {
        &self.messenger
    }

    /// Single attempt, no retry. Never returns an error to the caller.
    pub async fn notify(&self, recipient: ChatId, text: &str) -> Delivery {
        match self.messenger.send_text(recipient, text).await {
            Ok(_) => Delivery::Delivered,
            Err(e) => {
                tracing::error!(recipient = recipient.0, error = %e, "failed to send");
                Delivery::Unreachable
            }
        }
    }
}
