//! Link watchdog, LED pulses and the waiting animation.
//!
//! The host declares its send cadence via `META interval=...`; the
//! watchdog timeout tracks that cadence (ten intervals, clamped to
//! [5 s, 60 s]). A link quieter than twice the cadence is *stale* and
//! blinks the red LED; a link quieter than the hard timeout is *lost* and
//! drops the UI back to the waiting screen, where the red LED breathes
//! with the spinner.
//!
//! All timestamps are a monotonic millisecond clock; comparisons are in
//! `now - prev` form so 32-bit wrap is harmless.

/// Default host cadence until a META frame arrives.
pub const DEFAULT_HEARTBEAT_MS: u32 = 3000;

/// Lower bound on the accepted cadence.
pub const HEARTBEAT_FLOOR_MS: u32 = 250;

/// Hard frame timeout default and clamp range.
pub const DEFAULT_FRAME_TIMEOUT_MS: u32 = 10_000;
pub const FRAME_TIMEOUT_MIN_MS: u32 = 5_000;
pub const FRAME_TIMEOUT_MAX_MS: u32 = 60_000;

/// Green pulse on a telemetry commit.
pub const GREEN_DATA_PULSE_MS: u32 = 120;

/// Red pulse acknowledging a SELECT.
pub const RED_ACK_PULSE_MS: u32 = 150;

/// Red blink while the link is stale.
pub const RED_STALE_PULSE_MS: u32 = 50;
pub const STALE_BLINK_PERIOD_MS: u32 = 1000;
pub const STALE_FLOOR_MS: u32 = 500;

/// Waiting-screen animation cadence (spinner and red breathing).
pub const WAIT_ANIM_PERIOD_MS: u32 = 250;

/// A one-shot LED pulse: lit from `fire` until the duration elapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedPulse {
    since: u32,
    duration_ms: u32,
}

impl LedPulse {
    pub const fn new() -> Self {
        Self {
            since: 0,
            duration_ms: 0,
        }
    }

    pub fn fire(&mut self, now: u32, duration_ms: u32) {
        self.since = now;
        self.duration_ms = duration_ms;
    }

    pub fn extinguish(&mut self) {
        self.duration_ms = 0;
    }

    pub fn is_lit(&self, now: u32) -> bool {
        now.wrapping_sub(self.since) < self.duration_ms
    }
}

/// What a tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// The hard timeout fired; the caller must reset the UI.
    Lost,
    /// The waiting animation advanced a phase; repaint.
    AnimAdvanced,
}

/// Link liveness and heartbeat state, ticked every loop iteration.
#[derive(Debug)]
pub struct LinkSupervisor {
    have_data: bool,
    last_frame_ms: u32,
    heartbeat_interval_ms: u32,
    frame_timeout_ms: u32,
    /// Timeout advertised on the waiting screen; 0 until a META arrives.
    display_timeout_ms: u32,
    green: LedPulse,
    red: LedPulse,
    /// Red-breathing phase while waiting for data.
    breath_on: bool,
    last_stale_blink_ms: u32,
    wait_anim: u8,
    last_anim_ms: u32,
}

impl LinkSupervisor {
    pub const fn new() -> Self {
        Self {
            have_data: false,
            last_frame_ms: 0,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_MS,
            frame_timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
            display_timeout_ms: 0,
            green: LedPulse::new(),
            red: LedPulse::new(),
            breath_on: false,
            last_stale_blink_ms: 0,
            wait_anim: 0,
            last_anim_ms: 0,
        }
    }

    pub fn have_data(&self) -> bool {
        self.have_data
    }

    pub fn heartbeat_interval_ms(&self) -> u32 {
        self.heartbeat_interval_ms
    }

    pub fn frame_timeout_ms(&self) -> u32 {
        self.frame_timeout_ms
    }

    pub fn display_timeout_ms(&self) -> u32 {
        self.display_timeout_ms
    }

    /// Current waiting-animation phase, 0..4.
    pub fn wait_anim(&self) -> u8 {
        self.wait_anim
    }

    /// Record a committed frame. `pulse_green` is set for telemetry
    /// commits; META keepalives and COMMANDS frames refresh liveness only.
    pub fn frame_received(&mut self, now: u32, pulse_green: bool) {
        self.have_data = true;
        self.last_frame_ms = now;
        self.last_stale_blink_ms = now;
        if pulse_green {
            self.green.fire(now, GREEN_DATA_PULSE_MS);
        }
        // Restart the waiting animation from phase zero for the next
        // outage.
        self.wait_anim = 0;
        self.last_anim_ms = now;
        self.breath_on = false;
    }

    /// Apply a validated `interval=` value (seconds, positive).
    ///
    /// The heartbeat interval is floored at 250 ms; the frame timeout is
    /// ten intervals clamped to [5 s, 60 s] and is also what the waiting
    /// screen advertises.
    pub fn apply_meta(&mut self, interval_s: f32) {
        let interval_ms = (interval_s * 1000.0) as u64;
        self.heartbeat_interval_ms = interval_ms.max(HEARTBEAT_FLOOR_MS as u64) as u32;
        self.frame_timeout_ms = (interval_ms * 10)
            .clamp(FRAME_TIMEOUT_MIN_MS as u64, FRAME_TIMEOUT_MAX_MS as u64)
            as u32;
        self.display_timeout_ms = self.frame_timeout_ms;
    }

    /// Pulse the red LED to acknowledge a SELECT.
    pub fn red_ack(&mut self, now: u32) {
        self.red.fire(now, RED_ACK_PULSE_MS);
    }

    /// Advance timers: watchdog, stale blink, waiting animation.
    pub fn tick(&mut self, now: u32) -> Option<LinkEvent> {
        if self.have_data {
            if now.wrapping_sub(self.last_frame_ms) > self.frame_timeout_ms {
                self.have_data = false;
                self.green.extinguish();
                self.red.extinguish();
                self.breath_on = false;
                self.wait_anim = 0;
                self.last_anim_ms = now;
                return Some(LinkEvent::Lost);
            }

            let stale_threshold = self
                .heartbeat_interval_ms
                .saturating_mul(2)
                .clamp(STALE_FLOOR_MS, self.frame_timeout_ms);
            if now.wrapping_sub(self.last_frame_ms) >= stale_threshold
                && now.wrapping_sub(self.last_stale_blink_ms) >= STALE_BLINK_PERIOD_MS
            {
                self.red.fire(now, RED_STALE_PULSE_MS);
                self.last_stale_blink_ms = now;
            }
            None
        } else if now.wrapping_sub(self.last_anim_ms) >= WAIT_ANIM_PERIOD_MS {
            self.wait_anim = (self.wait_anim + 1) & 3;
            self.breath_on = !self.breath_on;
            self.last_anim_ms = now;
            Some(LinkEvent::AnimAdvanced)
        } else {
            None
        }
    }

    pub fn green_lit(&self, now: u32) -> bool {
        self.green.is_lit(now)
    }

    pub fn red_lit(&self, now: u32) -> bool {
        self.red.is_lit(now) || (!self.have_data && self.breath_on)
    }
}

impl Default for LinkSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
