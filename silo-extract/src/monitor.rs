use std::time::Instant;

/// Identifies one extraction step for monitoring purposes.
#[derive(Clone, Debug)]
pub struct MonitorContext {
    pub relation_identifier: String,
    pub step: &'static str,
    pub source_name: String,
    pub destination_bucket: String,
    pub destination_key: String,
    pub index_current: usize,
    pub index_total: usize,
}

/// Context-scoped event emitter. A `Monitor` doesn't know about success/failure until told —
/// callers open a scope with [`Monitor::start`] and must report exactly one of
/// [`Monitor::finish_ok`] / [`Monitor::finish_err`].
pub trait Monitor: Send + Sync {
    fn start(&self, ctx: &MonitorContext);
    fn finish_ok(&self, ctx: &MonitorContext, elapsed: std::time::Duration);
    fn finish_err(&self, ctx: &MonitorContext, elapsed: std::time::Duration, error: &str);
}

/// Production monitor: emits `tracing` spans/events plus narrative `log` lines, matching the
/// dual facade used throughout this codebase.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingMonitor;

impl Monitor for TracingMonitor {
    fn start(&self, ctx: &MonitorContext) {
        tracing::info!(
            relation = %ctx.relation_identifier,
            step = ctx.step,
            source = %ctx.source_name,
            index = format!("{}/{}", ctx.index_current, ctx.index_total),
            "starting"
        );
    }

    fn finish_ok(&self, ctx: &MonitorContext, elapsed: std::time::Duration) {
        tracing::info!(
            relation = %ctx.relation_identifier,
            step = ctx.step,
            elapsed_ms = elapsed.as_millis() as u64,
            "finished"
        );
    }

    fn finish_err(&self, ctx: &MonitorContext, elapsed: std::time::Duration, error: &str) {
        tracing::warn!(
            relation = %ctx.relation_identifier,
            step = ctx.step,
            elapsed_ms = elapsed.as_millis() as u64,
            error,
            "failed"
        );
    }
}

/// Runs `f`, reporting start/finish around it. `f` decides success/failure by its `Result`.
pub async fn monitored<T, E, F, Fut>(monitor: &dyn Monitor, ctx: MonitorContext, f: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    monitor.start(&ctx);
    let started = Instant::now();
    match f().await {
        Ok(value) => {
            monitor.finish_ok(&ctx, started.elapsed());
            Ok(value)
        }
        Err(err) => {
            monitor.finish_err(&ctx, started.elapsed(), &err.to_string());
            Err(err)
        }
    }
}
