use crate::aim::{Aim, DEFAULT_REACH};
use clap::Parser;
use na::Point3;
use raylink_api_types::{RoundTripPolicy, DEFAULT_PORT};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[arg(long, default_value = "localhost")]
    pub address: String,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Expect an acknowledgement byte from the server right after connecting.
    #[arg(long, default_value_t = false)]
    pub need_ack: bool,
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        default_values_t = [0.0, 0.0, 0.0]
    )]
    pub position: Vec<f32>,
    /// Degrees around +Y. Zero looks down -Z.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub yaw: f32,
    /// Degrees around +X.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pitch: f32,
    #[arg(long, default_value_t = DEFAULT_REACH)]
    pub reach: f32,
    /// Give up on a round trip after this long. Waits forever if unset.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,
    /// Cast a ray periodically instead of on every line read from stdin.
    #[arg(long)]
    pub fire_every_ms: Option<u64>,
    #[arg(long)]
    pub max_frames: Option<u64>,
    #[arg(long, default_value_t = 2)]
    pub expiry_secs: u64,
    /// Suspend the frame loop during each round trip.
    #[arg(long, default_value_t = false)]
    pub blocking: bool,
}

impl CliArgs {
    pub fn aim(&self) -> Aim {
        let position = match self.position[..] {
            [x, y, z] => Point3::new(x, y, z),
            _ => Point3::origin(),
        };
        Aim::from_yaw_pitch(position, self.yaw, self.pitch, self.reach)
    }

    pub fn round_trip_policy(&self) -> RoundTripPolicy {
        RoundTripPolicy {
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }
}
