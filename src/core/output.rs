//! ### 诊断输出通道
//!
//! 每个 `Svn` 实例持有一个通道，记录执行的命令行和 stderr。
//! 订阅者通过 `subscribe` 注册，`Subscription` 被 drop 时自动取消。

use std::sync::{
    Arc, Mutex, Weak,
    atomic::{AtomicU64, Ordering},
};

type Listener = Box<dyn FnMut(&str) + Send>;

#[derive(Default)]
pub struct OutputChannel {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl OutputChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: FnMut(&str) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Box::new(listener)));
        }

        Subscription {
            channel: Arc::downgrade(self),
            id,
        }
    }

    pub fn emit(&self, line: &str) {
        if let Ok(mut listeners) = self.listeners.lock() {
            for (_, listener) in listeners.iter_mut() {
                listener(line);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn unsubscribe(&self, id: u64) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }
}

/// Keeps a listener registered for as long as it lives.
pub struct Subscription {
    channel: Weak<OutputChannel>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.unsubscribe(self.id);
        }
    }
}
