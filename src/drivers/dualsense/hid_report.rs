//! Output report layout for driving the adaptive triggers over USB.
//!
//! The report is a fixed 64-byte buffer of which only the first 48 bytes are
//! ever written to the device. Bytes 11-21 carry the right trigger effect and
//! bytes 22-32 carry the left trigger effect; the meaning of the individual
//! effect fields is the encoder's concern.

pub const OUTPUT_REPORT_USB: u8 = 0x02;
pub const OUTPUT_REPORT_FLAGS: u8 = 0xFF;
pub const OUTPUT_REPORT_TRIGGER_ENABLE: u8 = 0x08;
pub const OUTPUT_REPORT_SIZE: usize = 64;
pub const OUTPUT_REPORT_USB_SHORT_SIZE: usize = 48;

pub const RIGHT_TRIGGER_OFFSET: usize = 11;
pub const LEFT_TRIGGER_OFFSET: usize = 22;
pub const TRIGGER_EFFECT_SIZE: usize = 11;

/// A single trigger effect output report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EffectReport([u8; OUTPUT_REPORT_SIZE]);

impl Default for EffectReport {
    fn default() -> Self {
        Self([0; OUTPUT_REPORT_SIZE])
    }
}

impl EffectReport {
    /// Returns a new zeroed report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the report id, feature flags and trigger-enable bitmask. This is
    /// done unconditionally at the start of every report build.
    pub fn stamp_header(&mut self) {
        self.0[0] = OUTPUT_REPORT_USB;
        self.0[1] = OUTPUT_REPORT_FLAGS;
        self.0[10] = OUTPUT_REPORT_TRIGGER_ENABLE;
    }

    pub fn buffer(&self) -> &[u8; OUTPUT_REPORT_SIZE] {
        &self.0
    }

    pub fn buffer_mut(&mut self) -> &mut [u8; OUTPUT_REPORT_SIZE] {
        &mut self.0
    }

    /// The portion of the report that is actually sent to the device. The
    /// remaining bytes are reserved and never transmitted.
    pub fn transmit_bytes(&self) -> &[u8] {
        &self.0[..OUTPUT_REPORT_USB_SHORT_SIZE]
    }
}
