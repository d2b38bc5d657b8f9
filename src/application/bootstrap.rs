//! Startup configuration push
//!
//! Background task that pushes metering configuration to a fixed set of
//! stations shortly after the server comes up: which measurands to sample
//! and how often. Stations that are still offline are retried until one
//! full pass over the list succeeds, then the task ends.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::commands::{change_configuration, SharedCommandSender};
use crate::support::ShutdownSignal;

pub struct StartupConfigurator {
    commands: SharedCommandSender,
    shutdown: ShutdownSignal,
    station_ids: Vec<String>,
    /// Time given to chargers to connect before the first pass.
    grace: Duration,
    retry: Duration,
    sampled_measurands: String,
    sample_interval_secs: u32,
}

impl StartupConfigurator {
    pub fn new(
        commands: SharedCommandSender,
        shutdown: ShutdownSignal,
        station_ids: Vec<String>,
        grace: Duration,
        retry: Duration,
        sampled_measurands: String,
        sample_interval_secs: u32,
    ) -> Self {
        Self {
            commands,
            shutdown,
            station_ids,
            grace,
            retry,
            sampled_measurands,
            sample_interval_secs,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        if self.station_ids.is_empty() {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.grace) => {}
            _ = self.shutdown.wait() => return,
        }

        loop {
            if self.configure_all().await {
                info!("Startup configuration completed for all stations");
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.retry) => {}
                _ = self.shutdown.wait() => return,
            }
        }
    }

    /// One pass over the station list. True only when every station took
    /// the full configuration.
    async fn configure_all(&self) -> bool {
        let mut clean = true;
        for station_id in &self.station_ids {
            if self.shutdown.is_triggered() {
                return false;
            }
            if !self.configure_station(station_id).await {
                clean = false;
            }
        }
        clean
    }

    async fn configure_station(&self, station_id: &str) -> bool {
        info!(station_id, "Pushing metering configuration");
        let interval = self.sample_interval_secs.to_string();
        let pairs = [
            ("MeterValuesSampledData", self.sampled_measurands.as_str()),
            ("MeterValueSampleInterval", interval.as_str()),
        ];

        for (key, value) in pairs {
            match change_configuration(&self.commands, station_id, key, value).await {
                Ok(Some(_)) => {}
                // Offline; try again next pass.
                Ok(None) => return false,
                Err(e) => {
                    warn!(station_id, key, error = %e, "Configuration push failed");
                    return false;
                }
            }
        }
        true
    }
}
