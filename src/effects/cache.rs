use crate::drivers::dualsense::hid_report::EffectReport;

/// The last effect report that was successfully sent to a device.
///
/// The cache starts out zeroed and is only ever replaced wholesale after a
/// transmission succeeds, so it always reflects the last report the hardware
/// actually accepted. Partial updates are not possible.
#[derive(Debug, Default)]
pub struct EffectCache {
    last: EffectReport,
}

impl EffectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached report. Callers get their own working
    /// buffer and never alias the cached one.
    pub fn snapshot(&self) -> EffectReport {
        self.last
    }

    /// Replace the cached report with the one that was just transmitted.
    pub fn commit(&mut self, report: EffectReport) {
        self.last = report;
    }
}
