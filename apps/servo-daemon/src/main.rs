use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use servo_stream::{
    DeviceChannel, JointState, Lifecycle, PublishLoop, SourceError, StatePublisher, StreamConfig,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "servo-daemon")]
#[command(about = "Samples a servo angle device and republishes joint states")]
struct Args {
    /// Character device emitting newline-separated angles in degrees
    #[arg(long, default_value = "/dev/servo")]
    device: PathBuf,

    /// Topic name for outbound joint states
    #[arg(long, default_value = "arm_state")]
    topic: String,

    /// Target publish rate in Hz
    #[arg(long, default_value = "60")]
    rate_hz: f64,
}

/// Stands in for the host transport: one JSON object per line on stdout.
struct NdjsonPublisher;

#[async_trait]
impl StatePublisher for NdjsonPublisher {
    async fn publish(&mut self, topic: &str, state: &JointState) -> servo_stream::Result<()> {
        let line = serde_json::json!({
            "topic": topic,
            "joint1_angle": state.joint1_angle,
            "joint2_angle": state.joint2_angle,
        });
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line).map_err(|e| SourceError::Publish(e.to_string()))?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    anyhow::ensure!(args.rate_hz > 0.0, "rate must be positive");

    info!("servo-daemon starting");
    info!("Device: {}", args.device.display());
    info!("Publishing '{}' at {}Hz", args.topic, args.rate_hz);

    let config = StreamConfig {
        device_path: args.device,
        topic: args.topic,
        rate_hz: args.rate_hz,
        ..StreamConfig::default()
    };

    let lifecycle = Lifecycle::new();
    let source = DeviceChannel::new(&config.device_path, config.chunk_bytes);
    let publish_loop = PublishLoop::new(config, source, NdjsonPublisher, lifecycle.clone());

    let mut task = tokio::spawn(publish_loop.run());

    tokio::select! {
        res = &mut task => {
            res??;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, stopping");
            lifecycle.stop();
            task.await??;
        }
    }

    info!("servo-daemon shutting down");
    Ok(())
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
