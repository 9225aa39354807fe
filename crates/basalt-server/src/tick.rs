use basalt_common::constants::TICKS_PER_SECOND;
use log::debug;
use std::sync::Arc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

use crate::server::Server;

/// Ticks between two TPS log lines.
pub const TPS_LOG_INTERVAL: u64 = 1000;

/// What a tick knows about time. Built once per tick and shared by every
/// [`Tickable`] it visits.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub tick: u64,
    pub now: Instant,
    pub keep_alive_interval: Duration,
    pub keep_alive_timeout: Duration,
}

pub trait Tickable {
    fn tick(&mut self, ctx: &TickContext);
}

/// Drives the server at a fixed rate until the task is dropped. Late ticks
/// are skipped, not bunched up.
pub async fn run(server: Arc<Server>) {
    let mut ticker = interval(Duration::from_millis(1000 / TICKS_PER_SECOND));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut tick = 0u64;
    let mut window_start = Instant::now();
    loop {
        let now = ticker.tick().await;
        tick += 1;

        let ctx = TickContext {
            tick,
            now,
            keep_alive_interval: server.config().keep_alive_interval(),
            keep_alive_timeout: server.config().keep_alive_timeout(),
        };
        server.sessions().write().await.tick(&ctx);

        if tick % TPS_LOG_INTERVAL == 0 {
            let elapsed = window_start.elapsed().as_secs_f64();
            debug!(
                "Tick {}: {:.2} TPS",
                tick,
                measured_tps(TPS_LOG_INTERVAL, elapsed)
            );
            window_start = Instant::now();
        }
    }
}

pub fn measured_tps(ticks: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    ticks as f64 / elapsed_secs
}
