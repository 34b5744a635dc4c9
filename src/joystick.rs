//! Joystick application
//!
//! Turns the magnetometer into a two-axis joystick. Every dispatcher
//! cycle the app samples the field vector, folds mirrored mounting
//! orientations into one sign convention, derives the two deflection
//! angles, applies the persisted calibration, and streams one report
//! line upstream. Sampling is rate-limited against the millisecond
//! clock.
//!
//! Report line format:
//! `#<app-id>:<hex-address>:<timestamp>:<x>,<y>,<z>,<t>,<alpha>,<beta>`

use crate::bus::BusInterface;
use crate::calibration::{self, Calibration};
use crate::device::Probe;
use crate::fmt;
use crate::magnet;
use crate::platform::{Clock, ResponseSink, Storage};
use crate::{APP_NONE, JOYSTICK_APP_ID};

/// Minimum interval between report lines in milliseconds.
const SAMPLE_INTERVAL_MS: u32 = 20;

/// Raw value reported when the sample read failed.
const SENTINEL: i16 = 0x7fff;

/// Joystick application state.
///
/// Lives inside the probe context; the dispatcher-facing entry points
/// are on [`Probe`].
#[derive(Debug, Clone, Copy)]
pub struct JoystickApp {
    address: u8,
    calibration: Calibration,
    last_alpha: f32,
    last_beta: f32,
    last_emit_ms: u32,
}

impl JoystickApp {
    /// Create the app with no magnetometer address configured.
    pub fn new() -> Self {
        Self {
            address: 0,
            calibration: Calibration::default(),
            last_alpha: 0.0,
            last_beta: 0.0,
            last_emit_ms: 0,
        }
    }

    /// Target magnetometer bus address (0 = unknown).
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Set the target magnetometer bus address.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Currently loaded calibration offsets.
    #[must_use]
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Most recent pre-correction angles (the next capture-zero source).
    #[must_use]
    pub fn last_angles(&self) -> (f32, f32) {
        (self.last_alpha, self.last_beta)
    }
}

impl Default for JoystickApp {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BusInterface, S: Storage, C: Clock> Probe<B, S, C> {
    /// Start the joystick application on `channel`.
    ///
    /// Configures the magnetometer, loads the persisted calibration, and
    /// reports `:<app-id>:OK`. Returns the app id, or [`APP_NONE`] with
    /// a failure report when no magnetometer address is configured or
    /// the device cannot be set up.
    pub fn joystick_begin(&mut self, channel: u8, sink: &mut impl ResponseSink) -> u8 {
        let id = fmt::dec_i32(i32::from(JOYSTICK_APP_ID));
        let address = self.joystick.address();

        if address == 0 {
            sink.send_chunk(channel, ":", false);
            sink.send_chunk(channel, id.as_str(), false);
            sink.send_chunk(
                channel,
                ":FAILED (no magnetometer found, try scan, app not started)",
                true,
            );
            return APP_NONE;
        }

        if magnet::configure(&mut self.bus, address).is_err() {
            sink.send_chunk(channel, ":", false);
            sink.send_chunk(channel, id.as_str(), false);
            sink.send_chunk(
                channel,
                ":FAILED (communication error, app not started)",
                true,
            );
            return APP_NONE;
        }

        self.joystick.calibration = Calibration::load(&mut self.storage);
        self.joystick.last_emit_ms = self.clock.now_ms();

        sink.send_chunk(channel, ":", false);
        sink.send_chunk(channel, id.as_str(), false);
        sink.send_chunk(channel, ":OK", true);
        JOYSTICK_APP_ID
    }

    /// Periodic joystick tick; called every dispatcher cycle.
    ///
    /// Does nothing until the sampling interval has elapsed, then emits
    /// one report line. A failed sample reports the sentinel raw values
    /// rather than skipping the line.
    pub fn joystick_tick(&mut self, channel: u8, sink: &mut impl ResponseSink) {
        let now = self.clock.now_ms();
        if now.wrapping_sub(self.joystick.last_emit_ms) <= SAMPLE_INTERVAL_MS {
            return;
        }

        let mut x = SENTINEL;
        let mut y = SENTINEL;
        let mut z = SENTINEL;
        let mut t = SENTINEL;
        if let Ok(sample) = magnet::read_sample(&mut self.bus, self.joystick.address()) {
            x = sample.x;
            y = sample.y;
            z = sample.z;
            t = sample.t;
        }

        let [x, y, z] = calibration::normalize_orientation([x, y, z]);
        let (alpha, beta) = calibration::angles_deg([x, y, z]);
        self.joystick.last_alpha = alpha;
        self.joystick.last_beta = beta;
        let (alpha, beta) = self.joystick.calibration.correct(alpha, beta);

        sink.send_chunk(channel, "#", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(JOYSTICK_APP_ID)).as_str(), false);

        sink.send_chunk(channel, ":", false);
        sink.send_chunk(channel, fmt::hex_u8(self.joystick.address()).as_str(), false);

        sink.send_chunk(channel, ":", false);
        sink.send_chunk(channel, fmt::dec_u32_padded8(now).as_str(), false);

        sink.send_chunk(channel, ":", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(x)).as_str(), false);
        sink.send_chunk(channel, ",", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(y)).as_str(), false);
        sink.send_chunk(channel, ",", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(z)).as_str(), false);
        sink.send_chunk(channel, ",", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(t)).as_str(), false);
        sink.send_chunk(channel, ",", false);
        sink.send_chunk(channel, fmt::float3(alpha).as_str(), false);
        sink.send_chunk(channel, ",", false);
        sink.send_chunk(channel, fmt::float3(beta).as_str(), true);

        self.joystick.last_emit_ms = now;
    }

    /// Stop the joystick application; reports `:ENDING:<app-id>`.
    ///
    /// Always returns [`APP_NONE`].
    pub fn joystick_end(&mut self, channel: u8, sink: &mut impl ResponseSink) -> u8 {
        sink.send_chunk(channel, ":ENDING:", false);
        sink.send_chunk(
            channel,
            fmt::dec_i32(i32::from(JOYSTICK_APP_ID)).as_str(),
            true,
        );
        APP_NONE
    }

    /// Report the joystick calibration state on `channel`.
    pub fn joystick_calibration_read(&mut self, channel: u8, sink: &mut impl ResponseSink) {
        let id = fmt::dec_i32(i32::from(JOYSTICK_APP_ID));
        let calibration = self.joystick.calibration();

        sink.send_chunk(channel, "ca:", false);
        sink.send_chunk(channel, id.as_str(), false);
        sink.send_chunk(channel, ":SA=", false);
        sink.send_chunk(channel, fmt::hex_u8(self.joystick.address()).as_str(), true);

        sink.send_chunk(channel, "ca:", false);
        sink.send_chunk(channel, id.as_str(), false);
        sink.send_chunk(channel, ":CAL_X=", false);
        sink.send_chunk(
            channel,
            fmt::dec_i32(i32::from(calibration.alpha_offset)).as_str(),
            true,
        );

        sink.send_chunk(channel, "ca:", false);
        sink.send_chunk(channel, id.as_str(), false);
        sink.send_chunk(channel, ":CAL_Y=", false);
        sink.send_chunk(
            channel,
            fmt::dec_i32(i32::from(calibration.beta_offset)).as_str(),
            true,
        );
    }

    /// Apply a `<key>=<value>` joystick calibration write.
    ///
    /// `SA=<hex>` retargets the magnetometer (valid addresses 3..=126);
    /// `CMD=NULL` captures the current position as the new zero and
    /// persists it immediately.
    pub fn joystick_calibration_write(
        &mut self,
        channel: u8,
        input: &str,
        sink: &mut impl ResponseSink,
    ) {
        sink.send_chunk(channel, "+ca:", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(JOYSTICK_APP_ID)).as_str(), false);

        if let Some(rest) = input.strip_prefix("SA=") {
            match u8::from_str_radix(rest.trim(), 16) {
                Ok(address) if (3..=126).contains(&address) => {
                    self.joystick.set_address(address);
                    sink.send_chunk(channel, ":SA=OK", true);
                }
                _ => sink.send_chunk(channel, ":SA=FAIL; outbound", true),
            }
            return;
        }

        if let Some(rest) = input.strip_prefix("CMD=") {
            if rest.trim().eq_ignore_ascii_case("NULL") {
                let (last_alpha, last_beta) = self.joystick.last_angles();
                self.joystick.calibration.capture_zero(last_alpha, last_beta);
                self.joystick.calibration.store(&mut self.storage);
                sink.send_chunk(channel, ":CMD:NULL=OK", true);
                return;
            }
        }

        sink.send_chunk(channel, ":FAIL; unknown variable", true);
    }
}
