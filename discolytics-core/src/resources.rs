// File: discolytics-core/src/resources.rs

use parking_lot::Mutex;
use sysinfo::{Pid, System};

use crate::api::{CollectorApi, Outcome};
use crate::discord::DiscordRest;
use crate::logger::Logger;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// Percent of one core, as reported by the OS sampler.
    pub cpu_percent: f64,
    /// Resident set size in bytes.
    pub memory_bytes: u64,
}

pub trait ResourceSampler: Send + Sync {
    fn sample(&self) -> Option<ResourceSample>;
}

/// Samples the current process. CPU usage is measured between two calls,
/// so the first sample after construction reads as zero.
pub struct SysinfoSampler {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::error!("Unable to resolve current pid: {}", e);
                None
            }
        };
        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for SysinfoSampler {
    fn sample(&self) -> Option<ResourceSample> {
        let pid = self.pid?;
        let mut system = self.system.lock();
        if !system.refresh_process(pid) {
            return None;
        }
        let process = system.process(pid)?;
        Some(ResourceSample {
            cpu_percent: f64::from(process.cpu_usage()),
            memory_bytes: process.memory(),
        })
    }
}

/// One sampling tick: CPU and memory go out as two separate reports.
pub async fn report_resource_usage(
    sampler: &dyn ResourceSampler,
    api: &CollectorApi,
    logger: &Logger,
) -> Outcome {
    let Some(sample) = sampler.sample() else {
        logger.error("Failed to sample process resource usage");
        return Outcome::FAILED;
    };

    let (cpu, mem) = tokio::join!(
        api.post_cpu_usage(sample.cpu_percent),
        api.post_mem_usage(sample.memory_bytes as f64),
    );

    if let Err(e) = &cpu {
        logger.error(format!("Failed to post CPU usage: {}", e));
    }
    if let Err(e) = &mem {
        logger.error(format!("Failed to post memory usage: {}", e));
    }
    Outcome {
        success: cpu.is_ok() && mem.is_ok(),
    }
}

pub async fn send_heartbeat(api: &CollectorApi, logger: &Logger) -> Outcome {
    let res = api.post_heartbeat().await;
    match &res {
        Ok(()) => logger.debug("Heartbeat sent"),
        Err(e) => logger.error(format!("Failed to send heartbeat: {}", e)),
    }
    Outcome::from(&res)
}

pub async fn report_guild_count(
    discord: &DiscordRest,
    api: &CollectorApi,
    logger: &Logger,
) -> Outcome {
    let application = match discord.current_application().await {
        Ok(app) => app,
        Err(e) => {
            logger.error(format!("Failed to fetch Discord application: {}", e));
            return Outcome::FAILED;
        }
    };

    let Some(count) = application.approximate_guild_count else {
        logger.error("Discord application has no approximate_guild_count");
        return Outcome::FAILED;
    };

    let res = api.post_guild_count(count).await;
    match &res {
        Ok(()) => logger.debug(format!("Posted guild count {}", count)),
        Err(e) => logger.error(format!("Failed to post guild count: {}", e)),
    }
    Outcome::from(&res)
}
