use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    idle_timeout: Option<Duration>,
    send_timeout: Duration,
    buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_timeout: None,
            send_timeout: Duration::from_millis(1000),
            buffer: 32,
        }
    }
}

impl Config {
    pub fn new(idle_timeout: Option<Duration>, send_timeout: Duration, buffer: usize) -> Self {
        Self {
            idle_timeout,
            send_timeout,
            buffer: buffer.max(1),
        }
    }

    pub fn env() -> Self {
        let defaults = Self::default();

        let idle_timeout = env::var("WS_IDLE_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);
        let send_timeout = env::var("WS_SEND_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.send_timeout);
        let buffer = env::var("WS_BUFFER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.buffer);

        Self::new(idle_timeout, send_timeout, buffer)
    }

    pub const fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub const fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    pub const fn buffer(&self) -> usize {
        self.buffer
    }
}
