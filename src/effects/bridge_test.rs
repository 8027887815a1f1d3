use std::cell::{Cell, RefCell};
use std::error::Error;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use super::bridge::{Bridge, BridgeError};
use super::registry::DeviceDescriptor;
use crate::config::Config;
use crate::drivers::dualsense::driver::TransmitChannel;
use crate::drivers::dualsense::effect::TriggerEffect;
use crate::drivers::dualsense::generator::{
    EffectEncoder, TriggerEffectGenerator, EFFECT_OFF,
};
use crate::drivers::dualsense::hid_report::{
    LEFT_TRIGGER_OFFSET, OUTPUT_REPORT_SIZE, OUTPUT_REPORT_USB_SHORT_SIZE, RIGHT_TRIGGER_OFFSET,
    TRIGGER_EFFECT_SIZE,
};

/// Encoder stub that records the offsets it was invoked with and fills the
/// effect window with a counter value so every encode is distinguishable.
struct StubEncoder {
    calls: Rc<RefCell<Vec<usize>>>,
    counter: Cell<u8>,
    reject_offset: Option<usize>,
}

impl StubEncoder {
    fn new() -> (Self, Rc<RefCell<Vec<usize>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let encoder = Self {
            calls: calls.clone(),
            counter: Cell::new(0),
            reject_offset: None,
        };
        (encoder, calls)
    }

    fn rejecting(offset: usize) -> (Self, Rc<RefCell<Vec<usize>>>) {
        let (mut encoder, calls) = Self::new();
        encoder.reject_offset = Some(offset);
        (encoder, calls)
    }
}

impl EffectEncoder for StubEncoder {
    fn encode(
        &self,
        buf: &mut [u8; OUTPUT_REPORT_SIZE],
        offset: usize,
        _effect: &TriggerEffect,
    ) -> bool {
        self.calls.borrow_mut().push(offset);
        if self.reject_offset == Some(offset) {
            return false;
        }
        self.counter.set(self.counter.get() + 1);
        buf[offset..offset + TRIGGER_EFFECT_SIZE].fill(self.counter.get());
        true
    }
}

#[derive(Default)]
struct FakeChannel {
    fail: bool,
    sent: Vec<Vec<u8>>,
}

impl TransmitChannel for FakeChannel {
    fn writable(&self) -> bool {
        true
    }

    fn transmit(&mut self, data: &[u8]) -> Result<usize, Box<dyn Error + Send + Sync>> {
        if self.fail {
            return Err("write failed".into());
        }
        self.sent.push(data.to_vec());
        Ok(data.len())
    }
}

/// Channel fake whose traffic stays observable after the bridge has dropped
/// it, for sweeping over several devices at once.
#[derive(Default)]
struct ChannelState {
    transmit_attempts: usize,
    fail_transmit: bool,
    sent: Vec<Vec<u8>>,
}

struct SharedChannel {
    state: Arc<Mutex<ChannelState>>,
    writable: bool,
}

impl TransmitChannel for SharedChannel {
    fn writable(&self) -> bool {
        self.writable
    }

    fn transmit(&mut self, data: &[u8]) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let mut state = self.state.lock().unwrap();
        state.transmit_attempts += 1;
        if state.fail_transmit {
            return Err("write failed".into());
        }
        state.sent.push(data.to_vec());
        Ok(data.len())
    }
}

fn stub_bridge() -> (Bridge, Rc<RefCell<Vec<usize>>>) {
    let (encoder, calls) = StubEncoder::new();
    let bridge = Bridge::with_encoder(Config::default(), Box::new(encoder));
    (bridge, calls)
}

fn assert_header(buf: &[u8]) {
    assert_eq!(buf[0], 0x02);
    assert_eq!(buf[1], 0xFF);
    assert_eq!(buf[10], 0x08);
}

#[test]
fn test_right_side_encodes_at_offset_11_only() {
    let (mut bridge, calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    let result = bridge
        .apply_to_channel(&mut channel, "right", &TriggerEffect::Off)
        .unwrap();

    assert!(result);
    assert_eq!(*calls.borrow(), vec![RIGHT_TRIGGER_OFFSET]);

    let sent = &channel.sent[0];
    assert_eq!(sent.len(), OUTPUT_REPORT_USB_SHORT_SIZE);
    assert_header(sent);
    assert!(sent[RIGHT_TRIGGER_OFFSET..RIGHT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE]
        .iter()
        .all(|b| *b == 1));
    assert!(sent[LEFT_TRIGGER_OFFSET..LEFT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE]
        .iter()
        .all(|b| *b == 0));
}

#[test]
fn test_left_side_encodes_at_offset_22_only() {
    let (mut bridge, calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    let result = bridge
        .apply_to_channel(&mut channel, "l", &TriggerEffect::Off)
        .unwrap();

    assert!(result);
    assert_eq!(*calls.borrow(), vec![LEFT_TRIGGER_OFFSET]);

    let sent = &channel.sent[0];
    assert_header(sent);
    assert!(sent[LEFT_TRIGGER_OFFSET..LEFT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE]
        .iter()
        .all(|b| *b == 1));
    assert!(sent[RIGHT_TRIGGER_OFFSET..RIGHT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE]
        .iter()
        .all(|b| *b == 0));
}

#[test]
fn test_both_encodes_left_before_right() {
    let (mut bridge, calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    let result = bridge
        .apply_to_channel(&mut channel, "both", &TriggerEffect::Off)
        .unwrap();

    assert!(result);
    assert_eq!(*calls.borrow(), vec![LEFT_TRIGGER_OFFSET, RIGHT_TRIGGER_OFFSET]);
}

#[test]
fn test_both_still_encodes_right_when_left_fails() {
    let (encoder, calls) = StubEncoder::rejecting(LEFT_TRIGGER_OFFSET);
    let mut bridge = Bridge::with_encoder(Config::default(), Box::new(encoder));
    let mut channel = FakeChannel::default();

    let result = bridge
        .apply_to_channel(&mut channel, "both", &TriggerEffect::Off)
        .unwrap();

    // The combined result is the AND of both encodes, and the right encode
    // ran even though the left one was rejected.
    assert!(!result);
    assert_eq!(*calls.borrow(), vec![LEFT_TRIGGER_OFFSET, RIGHT_TRIGGER_OFFSET]);
    // The report still went out.
    assert_eq!(channel.sent.len(), 1);
}

#[test]
fn test_invalid_side_token_does_not_encode_or_transmit() {
    let (mut bridge, calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    let result = bridge.apply_to_channel(&mut channel, "diagonal", &TriggerEffect::Off);

    assert!(matches!(result, Err(BridgeError::InvalidSide(s)) if s == "diagonal"));
    assert!(calls.borrow().is_empty());
    assert!(channel.sent.is_empty());
}

#[test]
fn test_successful_apply_commits_the_transmitted_report() {
    let (mut bridge, _calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    bridge
        .apply_to_channel(&mut channel, "right", &TriggerEffect::Off)
        .unwrap();

    let cached = bridge.last_sent();
    assert_eq!(channel.sent[0], cached.transmit_bytes());
}

#[test]
fn test_transmit_failure_leaves_the_cache_untouched() {
    let (mut bridge, _calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    bridge
        .apply_to_channel(&mut channel, "right", &TriggerEffect::Off)
        .unwrap();
    let before = bridge.last_sent();

    let mut failing = FakeChannel {
        fail: true,
        ..Default::default()
    };
    let result = bridge.apply_to_channel(&mut failing, "right", &TriggerEffect::Off);

    assert!(matches!(result, Err(BridgeError::Transmit(_))));
    assert_eq!(bridge.last_sent(), before);
}

#[test]
fn test_working_report_starts_from_the_cached_state() {
    let (mut bridge, _calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    // First apply fills the right window with 1, second fills the left
    // window with 2. The second report must still carry the right window
    // from the committed state.
    bridge
        .apply_to_channel(&mut channel, "right", &TriggerEffect::Off)
        .unwrap();
    bridge
        .apply_to_channel(&mut channel, "left", &TriggerEffect::Off)
        .unwrap();

    let sent = &channel.sent[1];
    assert!(sent[RIGHT_TRIGGER_OFFSET..RIGHT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE]
        .iter()
        .all(|b| *b == 1));
    assert!(sent[LEFT_TRIGGER_OFFSET..LEFT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE]
        .iter()
        .all(|b| *b == 2));
}

#[test]
fn test_invalid_index_fails_without_encoding() {
    let (mut bridge, calls) = stub_bridge();

    // No devices are registered, so index 0 and -1 are both out of range.
    assert!(!bridge.apply("right", &TriggerEffect::Off, 0));
    assert!(!bridge.apply("right", &TriggerEffect::Off, -1));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_off_is_idempotent() {
    let mut bridge = Bridge::with_encoder(Config::default(), Box::new(TriggerEffectGenerator));
    let mut channel = FakeChannel::default();

    bridge
        .apply_to_channel(&mut channel, "both", &TriggerEffect::Off)
        .unwrap();
    bridge
        .apply_to_channel(&mut channel, "both", &TriggerEffect::Off)
        .unwrap();

    assert_eq!(channel.sent[0], channel.sent[1]);
}

#[test]
fn test_both_off_replaces_prior_effect_state() {
    let mut bridge = Bridge::with_encoder(Config::default(), Box::new(TriggerEffectGenerator));
    let mut channel = FakeChannel::default();

    let effect = TriggerEffect::Feedback {
        position: 5,
        strength: 8,
    };
    assert!(bridge
        .apply_to_channel(&mut channel, "right", &effect)
        .unwrap());

    assert!(bridge
        .apply_to_channel(&mut channel, "both", &TriggerEffect::Off)
        .unwrap());

    let sent = &channel.sent[1];
    assert_eq!(sent[RIGHT_TRIGGER_OFFSET], EFFECT_OFF);
    assert_eq!(sent[LEFT_TRIGGER_OFFSET], EFFECT_OFF);
    for i in 1..TRIGGER_EFFECT_SIZE {
        assert_eq!(sent[RIGHT_TRIGGER_OFFSET + i], 0);
        assert_eq!(sent[LEFT_TRIGGER_OFFSET + i], 0);
    }
    assert_eq!(channel.sent[1], bridge.last_sent().transmit_bytes());
}

#[test]
fn test_reset_report_is_independent_of_the_cache() {
    let mut bridge = Bridge::with_encoder(Config::default(), Box::new(TriggerEffectGenerator));
    let mut channel = FakeChannel::default();

    // Put a non-off effect into the cache first.
    let effect = TriggerEffect::Feedback {
        position: 2,
        strength: 4,
    };
    assert!(bridge
        .apply_to_channel(&mut channel, "both", &effect)
        .unwrap());

    let mut reset_channel = FakeChannel::default();
    Bridge::reset_channel(&TriggerEffectGenerator, &mut reset_channel).unwrap();

    let sent = &reset_channel.sent[0];
    assert_eq!(sent.len(), OUTPUT_REPORT_USB_SHORT_SIZE);
    assert_header(sent);
    assert_eq!(sent[RIGHT_TRIGGER_OFFSET], EFFECT_OFF);
    assert_eq!(sent[LEFT_TRIGGER_OFFSET], EFFECT_OFF);
    for (i, b) in sent.iter().enumerate() {
        let in_header = i == 0 || i == 1 || i == 10;
        let in_window = i == RIGHT_TRIGGER_OFFSET || i == LEFT_TRIGGER_OFFSET;
        if !in_header && !in_window {
            assert_eq!(*b, 0, "byte {i} of a fresh reset report was set");
        }
    }
}

#[test]
fn test_reset_all_attempts_every_device_despite_failures() {
    let mut bridge = Bridge::with_encoder(Config::default(), Box::new(TriggerEffectGenerator));
    bridge.set_devices((0..5).map(|i| DeviceDescriptor::fake(&i.to_string())).collect());

    // Device 1 fails to open, device 2 is not writable and device 3 fails
    // the write itself. Devices 0 and 4 behave.
    let states: Vec<Arc<Mutex<ChannelState>>> = (0..5)
        .map(|_| Arc::new(Mutex::new(ChannelState::default())))
        .collect();
    states[3].lock().unwrap().fail_transmit = true;

    let opens = Arc::new(Mutex::new(Vec::new()));
    let opener_opens = opens.clone();
    let opener_states = states.clone();
    bridge.set_opener(Box::new(move |descriptor: &DeviceDescriptor| {
        let index: usize = descriptor.product_name().parse().unwrap();
        opener_opens.lock().unwrap().push(index);
        if index == 1 {
            return Err("open failed".into());
        }
        Ok(Box::new(SharedChannel {
            state: opener_states[index].clone(),
            writable: index != 2,
        }) as Box<dyn TransmitChannel>)
    }));

    bridge.reset_all();

    // Every device got its own open attempt, in order.
    assert_eq!(*opens.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    // The unwritable device was never written to, the failing write was
    // still attempted and the healthy devices each got one reset report.
    assert_eq!(states[0].lock().unwrap().sent.len(), 1);
    assert_eq!(states[2].lock().unwrap().transmit_attempts, 0);
    assert_eq!(states[3].lock().unwrap().transmit_attempts, 1);
    assert_eq!(states[4].lock().unwrap().sent.len(), 1);

    let state = states[0].lock().unwrap();
    let sent = &state.sent[0];
    assert_header(sent);
    assert_eq!(sent[RIGHT_TRIGGER_OFFSET], EFFECT_OFF);
    assert_eq!(sent[LEFT_TRIGGER_OFFSET], EFFECT_OFF);
}

#[test]
fn test_apply_fails_when_the_channel_is_not_writable() {
    let (mut bridge, calls) = stub_bridge();
    bridge.set_devices(vec![DeviceDescriptor::fake("0")]);

    let state = Arc::new(Mutex::new(ChannelState::default()));
    let opener_state = state.clone();
    bridge.set_opener(Box::new(move |_: &DeviceDescriptor| {
        Ok(Box::new(SharedChannel {
            state: opener_state.clone(),
            writable: false,
        }) as Box<dyn TransmitChannel>)
    }));

    assert!(!bridge.apply("right", &TriggerEffect::Off, 0));
    assert!(calls.borrow().is_empty());
    assert_eq!(state.lock().unwrap().transmit_attempts, 0);
}

#[test]
fn test_apply_transmits_through_the_opened_channel() {
    let (mut bridge, _calls) = stub_bridge();
    bridge.set_devices(vec![DeviceDescriptor::fake("0")]);

    let state = Arc::new(Mutex::new(ChannelState::default()));
    let opener_state = state.clone();
    bridge.set_opener(Box::new(move |_: &DeviceDescriptor| {
        Ok(Box::new(SharedChannel {
            state: opener_state.clone(),
            writable: true,
        }) as Box<dyn TransmitChannel>)
    }));

    assert!(bridge.apply("right", &TriggerEffect::Off, 0));
    let state = state.lock().unwrap();
    assert_eq!(state.sent.len(), 1);
    assert_header(&state.sent[0]);
}

#[test]
fn test_scenario_feedback_right_with_stubbed_encoder() {
    let (mut bridge, _calls) = stub_bridge();
    let mut channel = FakeChannel::default();

    let effect = TriggerEffect::Feedback {
        position: 5,
        strength: 10,
    };
    let result = bridge
        .apply_to_channel(&mut channel, "right", &effect)
        .unwrap();

    assert!(result);
    let sent = &channel.sent[0];
    assert_header(sent);
    assert_eq!(channel.sent[0], bridge.last_sent().transmit_bytes());
}
