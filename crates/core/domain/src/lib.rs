pub mod data;

pub use data::{DeliveryIdentity, Frame, NodeAddress, RawDelivery, Readout, canonical_identity};

/// 当前 Unix 时间（毫秒）。
pub fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}
