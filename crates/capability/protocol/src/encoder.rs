//! 帧编码
//!
//! 与解码器互逆，保留字节一律写 0。主要用于回放工具与测试。

use crate::error::ProtocolError;
use crate::frame::{DecodeMode, FrameLayout, MAX_READOUTS, ReadoutGap};
use domain::Frame;

/// 将单帧按布局追加写入 `out`
pub fn encode_frame(
    frame: &Frame,
    layout: FrameLayout,
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    let count = frame.readouts.len();
    if count > MAX_READOUTS {
        return Err(ProtocolError::TooManyReadouts(count));
    }
    out.reserve(layout.frame_len(count));

    if layout.mode == DecodeMode::WithAddress {
        let node = frame.node.ok_or(ProtocolError::MissingNodeAddress)?;
        out.extend_from_slice(&node.octets());
    }
    out.extend_from_slice(&frame.source_ts.to_le_bytes());
    out.push(count as u8);
    if layout.gap == ReadoutGap::AfterCount {
        out.push(0);
    }
    for readout in &frame.readouts {
        out.push(readout.sensor_type);
        if layout.gap == ReadoutGap::AfterSensorType {
            out.push(0);
        }
        out.extend_from_slice(&readout.value.to_le_bytes());
    }
    Ok(())
}

/// 将多帧首尾相接编码
pub fn encode_frames(frames: &[Frame], layout: FrameLayout) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::new();
    for frame in frames {
        encode_frame(frame, layout, &mut out)?;
    }
    Ok(out)
}
