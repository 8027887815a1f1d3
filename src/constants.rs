pub const BUS_NAME: &str = "org.triggerbridge.TriggerBridge";
pub const BUS_PREFIX: &str = "/org/triggerbridge/TriggerBridge";
