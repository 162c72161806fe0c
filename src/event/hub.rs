use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::{Mutex, RwLock, mpsc};
use uuid::Uuid;

use super::model::Signal;
use crate::{chat, message};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Listener {
    id: ListenerId,
    tx: mpsc::Sender<Signal>,
}

/// Listeners of one chat. Once `retired`, the entry is on its way out of the
/// registry and must not take new listeners.
#[derive(Default)]
struct Listeners {
    retired: bool,
    conns: Vec<Listener>,
}

type Slot = Arc<Mutex<Listeners>>;

/// Process-local registry of live chat listeners.
///
/// The registry lock is only held to look up, insert or evict a chat entry.
/// Each chat is guarded by its own mutex, so fan-out to one chat never waits
/// on another. The registry lock is never acquired while a chat mutex is held.
#[derive(Clone)]
pub struct Hub {
    chats: Arc<RwLock<HashMap<chat::Id, Slot>>>,
    send_timeout: Duration,
}

impl Hub {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            chats: Arc::new(RwLock::new(HashMap::new())),
            send_timeout,
        }
    }

    pub async fn subscribe(&self, chat_id: &chat::Id, tx: mpsc::Sender<Signal>) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());

        loop {
            let slot = {
                let mut chats = self.chats.write().await;
                chats.entry(chat_id.clone()).or_default().clone()
            };

            let mut listeners = slot.lock().await;
            if listeners.retired {
                drop(listeners);
                self.evict(chat_id, &slot).await;
                continue;
            }

            listeners.conns.push(Listener { id, tx });
            debug!(
                "Listener {id} subscribed to chat {chat_id} ({} total)",
                listeners.conns.len()
            );
            return id;
        }
    }

    pub async fn unsubscribe(&self, chat_id: &chat::Id, id: &ListenerId) {
        let Some(slot) = self.slot(chat_id).await else {
            return;
        };

        let mut listeners = slot.lock().await;
        listeners.conns.retain(|l| l.id.ne(id));
        debug!("Listener {id} unsubscribed from chat {chat_id}");

        let retire = listeners.conns.is_empty();
        if retire {
            listeners.retired = true;
        }
        drop(listeners);

        if retire {
            self.evict(chat_id, &slot).await;
        }
    }

    pub async fn publish_new_message(&self, chat_id: &chat::Id) -> usize {
        self.publish(chat_id, Signal::NewMessage).await
    }

    pub async fn publish_message_deleted(
        &self,
        chat_id: &chat::Id,
        message_id: &message::Id,
    ) -> usize {
        let signal = Signal::Deleted {
            message_id: message_id.clone(),
        };
        self.publish(chat_id, signal).await
    }

    /// Drops every listener of the chat, which ends their connections.
    pub async fn close(&self, chat_id: &chat::Id) {
        let slot = self.chats.write().await.remove(chat_id);

        if let Some(slot) = slot {
            let mut listeners = slot.lock().await;
            listeners.retired = true;
            debug!(
                "Closing {} listener(s) of chat {chat_id}",
                listeners.conns.len()
            );
            listeners.conns.clear();
        }
    }

    pub async fn close_all(&self) {
        let slots = self.chats.write().await.drain().collect::<Vec<_>>();

        for (_, slot) in slots {
            let mut listeners = slot.lock().await;
            listeners.retired = true;
            listeners.conns.clear();
        }
    }

    /// Delivers the signal to every listener of the chat at once. A listener
    /// that cannot take it within the send timeout is dropped. Returns how many
    /// listeners got the signal.
    async fn publish(&self, chat_id: &chat::Id, signal: Signal) -> usize {
        let Some(slot) = self.slot(chat_id).await else {
            debug!("No listeners for chat {chat_id}, skipping {signal:?}");
            return 0;
        };

        let mut listeners = slot.lock().await;
        let conns = std::mem::take(&mut listeners.conns);
        let attempts = conns.into_iter().map(|l| {
            let signal = signal.clone();
            async move {
                let res = l.tx.send_timeout(signal, self.send_timeout).await;
                (l, res)
            }
        });

        let mut delivered = 0;
        for (l, res) in join_all(attempts).await {
            match res {
                Ok(()) => {
                    delivered += 1;
                    listeners.conns.push(l);
                }
                Err(e) => warn!("Dropping listener {} of chat {chat_id}: {e}", l.id),
            }
        }
        debug!("Delivered {signal:?} to {delivered} listener(s) of chat {chat_id}");

        let retire = listeners.conns.is_empty();
        if retire {
            listeners.retired = true;
        }
        drop(listeners);

        if retire {
            self.evict(chat_id, &slot).await;
        }

        delivered
    }

    async fn slot(&self, chat_id: &chat::Id) -> Option<Slot> {
        self.chats.read().await.get(chat_id).cloned()
    }

    async fn evict(&self, chat_id: &chat::Id, slot: &Slot) {
        let mut chats = self.chats.write().await;
        if chats.get(chat_id).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            chats.remove(chat_id);
        }
    }
}

#[cfg(test)]
impl Hub {
    pub async fn listeners(&self, chat_id: &chat::Id) -> usize {
        match self.slot(chat_id).await {
            Some(slot) => slot.lock().await.conns.len(),
            None => 0,
        }
    }

    pub async fn is_tracked(&self, chat_id: &chat::Id) -> bool {
        self.chats.read().await.contains_key(chat_id)
    }
}

#[cfg(test)]
mod test {
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;

    fn hub() -> Hub {
        Hub::new(Duration::from_millis(50))
    }

    async fn listen(hub: &Hub, chat_id: &chat::Id) -> (ListenerId, mpsc::Receiver<Signal>) {
        let (tx, rx) = mpsc::channel(8);
        (hub.subscribe(chat_id, tx).await, rx)
    }

    #[tokio::test]
    async fn should_fan_out_only_to_listeners_of_the_chat() {
        let hub = hub();
        let (c, d) = (chat::Id::random(), chat::Id::random());

        let mut on_c = Vec::new();
        for _ in 0..3 {
            on_c.push(listen(&hub, &c).await.1);
        }
        let mut on_d = Vec::new();
        for _ in 0..2 {
            on_d.push(listen(&hub, &d).await.1);
        }

        let delivered = hub.publish_new_message(&c).await;

        assert_eq!(delivered, 3);
        for rx in &mut on_c {
            assert_eq!(rx.try_recv(), Ok(Signal::NewMessage));
        }
        for rx in &mut on_d {
            assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        }
    }

    #[tokio::test]
    async fn should_drop_listener_that_fails_delivery() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let (_, mut alive) = listen(&hub, &chat_id).await;
        let (_, dead) = listen(&hub, &chat_id).await;
        drop(dead);

        assert_eq!(hub.publish_new_message(&chat_id).await, 1);
        assert_eq!(hub.listeners(&chat_id).await, 1);
        assert_eq!(alive.try_recv(), Ok(Signal::NewMessage));

        assert_eq!(hub.publish_new_message(&chat_id).await, 1);
        assert_eq!(alive.try_recv(), Ok(Signal::NewMessage));
    }

    #[tokio::test]
    async fn should_drop_slow_listener_without_starving_others() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let (slow_tx, _slow_rx) = mpsc::channel(1);
        hub.subscribe(&chat_id, slow_tx).await;
        let (_, mut fast) = listen(&hub, &chat_id).await;

        assert_eq!(hub.publish_new_message(&chat_id).await, 2);
        // the slow listener never drains, its buffer is full now
        assert_eq!(hub.publish_new_message(&chat_id).await, 1);

        assert_eq!(hub.listeners(&chat_id).await, 1);
        assert_eq!(fast.try_recv(), Ok(Signal::NewMessage));
        assert_eq!(fast.try_recv(), Ok(Signal::NewMessage));
    }

    #[tokio::test]
    async fn should_remove_chat_entry_when_last_listener_leaves() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let (first, _rx1) = listen(&hub, &chat_id).await;
        let (second, _rx2) = listen(&hub, &chat_id).await;

        hub.unsubscribe(&chat_id, &first).await;
        assert!(hub.is_tracked(&chat_id).await);

        hub.unsubscribe(&chat_id, &second).await;
        assert!(!hub.is_tracked(&chat_id).await);
    }

    #[tokio::test]
    async fn should_remove_chat_entry_when_every_delivery_fails() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let (_, rx) = listen(&hub, &chat_id).await;
        drop(rx);

        assert_eq!(hub.publish_new_message(&chat_id).await, 0);
        assert!(!hub.is_tracked(&chat_id).await);
    }

    #[tokio::test]
    async fn should_ignore_publish_without_listeners() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let delivered = hub
            .publish_message_deleted(&chat_id, &message::Id::random())
            .await;

        assert_eq!(delivered, 0);
        assert!(!hub.is_tracked(&chat_id).await);
    }

    #[tokio::test]
    async fn should_carry_deleted_message_id() {
        let hub = hub();
        let chat_id = chat::Id::random();
        let message_id = message::Id::random();

        let (_, mut rx) = listen(&hub, &chat_id).await;
        hub.publish_message_deleted(&chat_id, &message_id).await;

        assert_eq!(rx.try_recv(), Ok(Signal::Deleted { message_id }));
    }

    #[tokio::test]
    async fn should_end_listeners_on_close() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let (_, mut rx) = listen(&hub, &chat_id).await;
        hub.close(&chat_id).await;

        assert_eq!(rx.recv().await, None);
        assert!(!hub.is_tracked(&chat_id).await);
    }

    #[tokio::test]
    async fn should_resubscribe_after_entry_was_retired() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let (first, _rx) = listen(&hub, &chat_id).await;
        hub.unsubscribe(&chat_id, &first).await;
        let (_, mut rx) = listen(&hub, &chat_id).await;

        assert_eq!(hub.publish_new_message(&chat_id).await, 1);
        assert_eq!(rx.try_recv(), Ok(Signal::NewMessage));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_not_leak_entries_under_concurrent_churn() {
        let hub = hub();
        let chat_id = chat::Id::random();

        let tasks = (0..64)
            .map(|_| {
                let hub = hub.clone();
                let chat_id = chat_id.clone();
                tokio::spawn(async move {
                    let (tx, _rx) = mpsc::channel(8);
                    let id = hub.subscribe(&chat_id, tx).await;
                    hub.publish_new_message(&chat_id).await;
                    hub.unsubscribe(&chat_id, &id).await;
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            task.await.unwrap();
        }

        assert!(!hub.is_tracked(&chat_id).await);
        assert_eq!(hub.listeners(&chat_id).await, 0);
    }
}
