use crate::traits::{AngleSource, ReadChunk, StatePublisher};
use crate::{JointState, Lifecycle, LineAssembler, Result, SourceError, StreamConfig};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

/// Phase of the publish loop. Transitions are logged at debug severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Setup,
    Running,
    Draining,
    Stopped,
}

/// Fixed-rate sampling loop: read one chunk off the blocking pool, surface
/// at most one decoded angle, publish it, pace.
///
/// Per-tick read, decode and publish failures are logged and the tick is
/// skipped; only a setup failure or a failed worker task tears the loop
/// down. The source is closed on every exit path.
pub struct PublishLoop<S, P> {
    config: StreamConfig,
    source: Option<S>,
    assembler: LineAssembler,
    publisher: P,
    lifecycle: Lifecycle,
    state: LoopState,
}

impl<S, P> PublishLoop<S, P>
where
    S: AngleSource + 'static,
    P: StatePublisher,
{
    pub fn new(config: StreamConfig, source: S, publisher: P, lifecycle: Lifecycle) -> Self {
        Self {
            config,
            source: Some(source),
            assembler: LineAssembler::new(),
            publisher,
            lifecycle,
            state: LoopState::Setup,
        }
    }

    /// Drive the loop until the lifecycle flag clears or a fatal error
    /// occurs.
    pub async fn run(mut self) -> Result<()> {
        if let Err(e) = self.setup() {
            error!("Failed to setup device, exiting: {}", e);
            if let Some(source) = self.source.as_mut() {
                source.close();
            }
            self.transition(LoopState::Stopped);
            return Err(e);
        }

        let mut result = Ok(());
        if self.lifecycle.is_running() {
            self.transition(LoopState::Running);
            let mut ticker = interval(self.config.tick_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; consume it so
            // in-loop pacing always waits a full period.
            ticker.tick().await;

            loop {
                if !self.lifecycle.is_running() {
                    break;
                }
                if let Err(e) = self.tick().await {
                    error!("Error in publish loop: {}", e);
                    result = Err(e);
                    break;
                }
                ticker.tick().await;
            }
        }

        self.drain();
        self.transition(LoopState::Stopped);
        result
    }

    fn setup(&mut self) -> Result<()> {
        match self.source.as_mut() {
            Some(source) => source.open(),
            None => Err(SourceError::NotOpen),
        }
    }

    /// One iteration: read, assemble, sample, publish.
    async fn tick(&mut self) -> Result<()> {
        let angle = match self.sample().await? {
            Some(angle) => angle,
            None => return Ok(()),
        };

        let state = JointState::from_degrees(angle);
        match self.publisher.publish(&self.config.topic, &state).await {
            Ok(()) => debug!("Published servo angle: {}", angle),
            Err(e) => error!("Failed to publish joint state: {}", e),
        }
        Ok(())
    }

    /// Read one chunk off the blocking pool and feed the assembler.
    ///
    /// Would-block and hard read errors both yield an empty tick; only a
    /// failed worker task (or a lost source slot) escapes as `Err`.
    async fn sample(&mut self) -> Result<Option<f64>> {
        let mut source = self.source.take().ok_or(SourceError::NotOpen)?;
        let (source, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = source.read_chunk();
            (source, outcome)
        })
        .await
        .map_err(|e| SourceError::Task(e.to_string()))?;
        self.source = Some(source);

        match outcome {
            Ok(ReadChunk::Data(bytes)) => Ok(self.assembler.feed(&bytes)),
            Ok(ReadChunk::WouldBlock) => Ok(None),
            Err(e) => {
                error!("Error reading servo angle: {}", e);
                Ok(None)
            }
        }
    }

    fn drain(&mut self) {
        self.transition(LoopState::Draining);
        if let Some(source) = self.source.as_mut() {
            source.close();
        }
    }

    fn transition(&mut self, next: LoopState) {
        debug!("publish loop: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::{MockAngleSource, MockPublisher};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn fast_config() -> StreamConfig {
        StreamConfig {
            rate_hz: 1000.0,
            ..StreamConfig::default()
        }
    }

    async fn run_until_idle<F>(
        script: Vec<Result<ReadChunk>>,
        configure: F,
    ) -> (Result<()>, Vec<(String, JointState)>, usize)
    where
        F: FnOnce(&mut MockAngleSource),
    {
        let mut source = MockAngleSource::new(script);
        configure(&mut source);
        let closes = source.close_counter();
        let publisher = MockPublisher::new();
        let records = publisher.records();
        let lifecycle = Lifecycle::new();

        let publish_loop = PublishLoop::new(fast_config(), source, publisher, lifecycle.clone());
        let task = tokio::spawn(publish_loop.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        lifecycle.stop();
        let result = task.await.unwrap_or(Err(SourceError::Task("join".into())));

        let published = records.lock().unwrap().clone();
        (result, published, closes.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_batched_records_publish_in_order_one_per_tick() {
        let script = vec![
            Ok(ReadChunk::Data(b"45.0\n30.2\n".to_vec())),
            Ok(ReadChunk::Data(Vec::new())),
        ];
        let (result, published, closes) = run_until_idle(script, |_| {}).await;

        assert!(result.is_ok());
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0, "arm_state");
        assert!((published[0].1.joint1_angle - 45.0_f64.to_radians()).abs() < 1e-12);
        assert!((published[1].1.joint1_angle - 30.2_f64.to_radians()).abs() < 1e-12);
        assert_eq!(closes, 1);
    }

    #[tokio::test]
    async fn test_partial_record_completes_across_ticks() {
        let script = vec![
            Ok(ReadChunk::Data(b"12.".to_vec())),
            Ok(ReadChunk::WouldBlock),
            Ok(ReadChunk::Data(b"5\n".to_vec())),
        ];
        let (result, published, _) = run_until_idle(script, |_| {}).await;

        assert!(result.is_ok());
        assert_eq!(published.len(), 1);
        assert!((published[0].1.joint1_angle - 12.5_f64.to_radians()).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_malformed_record_does_not_stop_the_loop() {
        let script = vec![Ok(ReadChunk::Data(b"abc\n10\n".to_vec()))];
        let (result, published, _) = run_until_idle(script, |_| {}).await;

        assert!(result.is_ok());
        assert_eq!(published.len(), 1);
        assert!((published[0].1.joint1_angle - 10.0_f64.to_radians()).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_read_error_skips_tick_and_continues() {
        let script = vec![
            Err(SourceError::Io("transient fault".into())),
            Ok(ReadChunk::Data(b"90\n".to_vec())),
        ];
        let (result, published, closes) = run_until_idle(script, |_| {}).await;

        assert!(result.is_ok());
        assert_eq!(published.len(), 1);
        assert!((published[0].1.joint1_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(closes, 1);
    }

    #[tokio::test]
    async fn test_setup_failure_publishes_nothing() {
        let source = MockAngleSource::failing();
        let closes = source.close_counter();
        let publisher = MockPublisher::new();
        let records = publisher.records();

        let publish_loop =
            PublishLoop::new(fast_config(), source, publisher, Lifecycle::new());
        let result = publish_loop.run().await;

        assert!(matches!(result, Err(SourceError::Open { .. })));
        assert!(records.lock().unwrap().is_empty());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_before_setup_skips_running() {
        let source = MockAngleSource::new(vec![Ok(ReadChunk::Data(b"45\n".to_vec()))]);
        let reads = source.read_counter();
        let closes = source.close_counter();
        let publisher = MockPublisher::new();
        let records = publisher.records();
        let lifecycle = Lifecycle::new();
        lifecycle.stop();

        let publish_loop = PublishLoop::new(fast_config(), source, publisher, lifecycle);
        let result = publish_loop.run().await;

        assert!(result.is_ok());
        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert!(records.lock().unwrap().is_empty());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_stop_the_loop() {
        let source = MockAngleSource::new(vec![
            Ok(ReadChunk::Data(b"1\n".to_vec())),
            Ok(ReadChunk::Data(b"2\n".to_vec())),
        ]);
        let reads = source.read_counter();
        let closes = source.close_counter();
        let lifecycle = Lifecycle::new();

        let publish_loop = PublishLoop::new(
            fast_config(),
            source,
            MockPublisher::failing(),
            lifecycle.clone(),
        );
        let task = tokio::spawn(publish_loop.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        lifecycle.stop();
        let result = task.await.unwrap_or(Err(SourceError::Task("join".into())));

        assert!(result.is_ok());
        // Both scripted chunks were consumed despite every publish failing.
        assert!(reads.load(Ordering::SeqCst) >= 2);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
