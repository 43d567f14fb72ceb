//! # Sensor Capability
//!
//! A sensor reads one screen region of one worker's game. Recognition
//! backends plug in through [`SensorFactory`], which the cache calls once per
//! (worker, region) at construction; the cache then owns every instance.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::constants::RegionKind;
use crate::error::{Result, RoundwatchError};

use super::parse::parse_decimal;

/// Reads a single screen region
#[async_trait]
pub trait SensorCapability: Send {
    /// Raw recognized text, or `None` when nothing legible is on screen
    async fn read_text(&mut self) -> anyhow::Result<Option<String>>;

    /// Recognized score. Parses [`read_text`](Self::read_text) unless the
    /// backend produces numbers natively.
    async fn read_score(&mut self) -> anyhow::Result<Option<f64>> {
        Ok(self.read_text().await?.as_deref().and_then(parse_decimal))
    }
}

/// Builds sensor instances for a recognition backend
pub trait SensorFactory: Send + Sync {
    fn create(&self, worker: &str, region: RegionKind) -> anyhow::Result<Box<dyn SensorCapability>>;
}

impl<F> SensorFactory for F
where
    F: Fn(&str, RegionKind) -> anyhow::Result<Box<dyn SensorCapability>> + Send + Sync,
{
    fn create(&self, worker: &str, region: RegionKind) -> anyhow::Result<Box<dyn SensorCapability>> {
        self(worker, region)
    }
}

/// Every region sensor belonging to one worker
pub struct WorkerSensors {
    worker: String,
    sensors: HashMap<RegionKind, Box<dyn SensorCapability>>,
}

impl std::fmt::Debug for WorkerSensors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut regions: Vec<&str> = self.sensors.keys().map(|r| r.as_str()).collect();
        regions.sort_unstable();
        f.debug_struct("WorkerSensors")
            .field("worker", &self.worker)
            .field("regions", &regions)
            .finish()
    }
}

impl WorkerSensors {
    pub fn build(worker: &str, factory: &dyn SensorFactory) -> Result<Self> {
        let mut sensors = HashMap::with_capacity(RegionKind::ALL.len());
        for region in RegionKind::ALL {
            let sensor = factory
                .create(worker, region)
                .map_err(|e| RoundwatchError::sensor(worker, region, &e))?;
            sensors.insert(region, sensor);
        }
        Ok(Self {
            worker: worker.to_string(),
            sensors,
        })
    }

    pub fn worker(&self) -> &str {
        &self.worker
    }

    pub async fn read_score(&mut self, region: RegionKind) -> anyhow::Result<Option<f64>> {
        self.sensor(region)?.read_score().await
    }

    pub async fn read_text(&mut self, region: RegionKind) -> anyhow::Result<Option<String>> {
        self.sensor(region)?.read_text().await
    }

    fn sensor(&mut self, region: RegionKind) -> anyhow::Result<&mut Box<dyn SensorCapability>> {
        self.sensors
            .get_mut(&region)
            .ok_or_else(|| anyhow::anyhow!("no sensor for region {region}"))
    }
}

/// One scripted reading
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Text(String),
    Nothing,
    Failure(String),
}

/// Shared queue of scripted readings feeding a [`ReplaySensor`]
#[derive(Debug, Clone, Default)]
pub struct ReplayFeed {
    readings: Arc<Mutex<VecDeque<Reading>>>,
    reads: Arc<AtomicU64>,
}

impl ReplayFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reading: Reading) -> &Self {
        self.readings.lock().push_back(reading);
        self
    }

    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.push(Reading::Text(text.into()))
    }

    pub fn push_nothing(&self) -> &Self {
        self.push(Reading::Nothing)
    }

    pub fn push_failure(&self, reason: impl Into<String>) -> &Self {
        self.push(Reading::Failure(reason.into()))
    }

    /// Number of reads served so far, including reads of an empty feed
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn pending(&self) -> usize {
        self.readings.lock().len()
    }

    fn next(&self) -> Reading {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.readings.lock().pop_front().unwrap_or(Reading::Nothing)
    }
}

/// Backend that plays back recorded readings; an exhausted feed shows nothing
#[derive(Debug, Clone)]
pub struct ReplaySensor {
    feed: ReplayFeed,
}

impl ReplaySensor {
    pub fn new(feed: ReplayFeed) -> Self {
        Self { feed }
    }

    pub fn boxed(feed: ReplayFeed) -> Box<dyn SensorCapability> {
        Box::new(Self::new(feed))
    }
}

#[async_trait]
impl SensorCapability for ReplaySensor {
    async fn read_text(&mut self) -> anyhow::Result<Option<String>> {
        match self.feed.next() {
            Reading::Text(text) => Ok(Some(text)),
            Reading::Nothing => Ok(None),
            Reading::Failure(reason) => Err(anyhow::anyhow!(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_sensor_plays_back_in_order() {
        let feed = ReplayFeed::new();
        feed.push_text("1.52x").push_nothing().push_failure("glare");
        let mut sensor = ReplaySensor::new(feed.clone());

        assert_eq!(sensor.read_score().await.unwrap(), Some(1.52));
        assert_eq!(sensor.read_score().await.unwrap(), None);
        assert!(sensor.read_score().await.is_err());
        // Exhausted feed reads as an empty screen
        assert_eq!(sensor.read_text().await.unwrap(), None);
        assert_eq!(feed.reads(), 4);
        assert_eq!(feed.pending(), 0);
    }

    #[tokio::test]
    async fn test_worker_sensors_built_from_closure_factory() {
        let money = ReplayFeed::new();
        money.push_text("12,345.60");
        let money_for_factory = money.clone();

        let factory = move |_worker: &str, region: RegionKind| -> anyhow::Result<Box<dyn SensorCapability>> {
            Ok(match region {
                RegionKind::Money => ReplaySensor::boxed(money_for_factory.clone()),
                _ => ReplaySensor::boxed(ReplayFeed::new()),
            })
        };

        let mut sensors = WorkerSensors::build("table-1", &factory).unwrap();
        assert_eq!(sensors.worker(), "table-1");
        assert_eq!(
            sensors.read_text(RegionKind::Money).await.unwrap(),
            Some("12,345.60".to_string())
        );
        assert_eq!(sensors.read_score(RegionKind::ScoreSmall).await.unwrap(), None);
    }

    #[test]
    fn test_factory_failure_maps_to_sensor_error() {
        let factory = |_worker: &str, region: RegionKind| -> anyhow::Result<Box<dyn SensorCapability>> {
            if region == RegionKind::Count {
                anyhow::bail!("calibration missing");
            }
            Ok(ReplaySensor::boxed(ReplayFeed::new()))
        };

        let err = WorkerSensors::build("table-2", &factory).unwrap_err();
        assert!(matches!(
            err,
            RoundwatchError::SensorError { region: RegionKind::Count, .. }
        ));
    }
}
