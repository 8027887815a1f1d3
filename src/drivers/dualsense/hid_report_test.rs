use super::hid_report::{
    EffectReport, LEFT_TRIGGER_OFFSET, OUTPUT_REPORT_SIZE, OUTPUT_REPORT_USB_SHORT_SIZE,
    RIGHT_TRIGGER_OFFSET, TRIGGER_EFFECT_SIZE,
};

#[test]
fn test_new_report_is_zeroed() {
    let report = EffectReport::new();
    assert!(report.buffer().iter().all(|b| *b == 0));
}

#[test]
fn test_stamp_header_sets_exactly_three_bytes() {
    let mut report = EffectReport::new();
    report.stamp_header();

    let buf = report.buffer();
    assert_eq!(buf[0], 0x02);
    assert_eq!(buf[1], 0xFF);
    assert_eq!(buf[10], 0x08);
    for (i, b) in buf.iter().enumerate() {
        if i != 0 && i != 1 && i != 10 {
            assert_eq!(*b, 0, "byte {i} was modified");
        }
    }
}

#[test]
fn test_stamp_header_overwrites_stale_values() {
    let mut report = EffectReport::new();
    report.buffer_mut()[0] = 0xAA;
    report.buffer_mut()[1] = 0xBB;
    report.buffer_mut()[10] = 0xCC;
    report.stamp_header();

    assert_eq!(report.buffer()[0], 0x02);
    assert_eq!(report.buffer()[1], 0xFF);
    assert_eq!(report.buffer()[10], 0x08);
}

#[test]
fn test_transmit_bytes_covers_first_48_bytes_only() {
    let mut report = EffectReport::new();
    for (i, b) in report.buffer_mut().iter_mut().enumerate() {
        *b = i as u8;
    }

    let sent = report.transmit_bytes();
    assert_eq!(sent.len(), OUTPUT_REPORT_USB_SHORT_SIZE);
    assert_eq!(sent, &report.buffer()[..OUTPUT_REPORT_USB_SHORT_SIZE]);
}

#[test]
fn test_trigger_windows_fit_in_transmitted_range() {
    assert_eq!(LEFT_TRIGGER_OFFSET, RIGHT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE);
    assert!(LEFT_TRIGGER_OFFSET + TRIGGER_EFFECT_SIZE <= OUTPUT_REPORT_USB_SHORT_SIZE);
    assert!(OUTPUT_REPORT_USB_SHORT_SIZE <= OUTPUT_REPORT_SIZE);
}
