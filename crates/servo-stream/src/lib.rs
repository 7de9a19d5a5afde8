//! servo-stream: non-blocking servo angle sampling republished as joint states
//!
//! This crate samples an angle value from a character device that emits ASCII
//! records (one angle in degrees per line) and republishes it as a structured
//! joint-state payload at a fixed cadence, without blocking the host's
//! scheduler while waiting on device I/O. The pub/sub transport itself is the
//! host's business; the loop only needs a [`StatePublisher`] capability. The
//! default build enables a `mock` backend so flows are testable without
//! hardware.

mod types;
pub use types::{JointState, StreamConfig};

mod error;
pub use error::{Result, SourceError};

mod traits;
pub use traits::{AngleSource, ReadChunk, StatePublisher};

mod sampler;
pub use sampler::{degrees_to_radians, parse_angle};

mod assembler;
pub use assembler::LineAssembler;

mod lifecycle;
pub use lifecycle::Lifecycle;

mod publish_loop;
pub use publish_loop::{LoopState, PublishLoop};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockAngleSource, MockPublisher};

#[cfg(feature = "device")]
mod device;

#[cfg(feature = "device")]
pub use device::DeviceChannel;
