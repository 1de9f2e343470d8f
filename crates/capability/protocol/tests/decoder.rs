use domain::{Frame, NodeAddress, Readout};
use mms_protocol::{
    FrameLayout, ReadoutGap, StreamEnd, decode, encode_frame, encode_frames,
};

fn node() -> NodeAddress {
    NodeAddress::new([0xf4, 0xcf, 0xa2, 0xbd, 0x1f, 0xb8])
}

fn sample_frames(with_node: bool) -> Vec<Frame> {
    let node = if with_node { Some(node()) } else { None };
    vec![
        Frame {
            node,
            source_ts: 1_672_758_620,
            readouts: vec![Readout::new(12, 21.5), Readout::new(13, 64.25)],
        },
        Frame {
            node,
            source_ts: 1_672_758_920,
            readouts: Vec::new(),
        },
        Frame {
            node,
            source_ts: 1_672_759_220,
            readouts: vec![
                Readout::new(4, -3.75),
                Readout::new(22, 1234.5),
                Readout::new(200, 0.001),
            ],
        },
    ]
}

fn all_layouts() -> Vec<(FrameLayout, bool)> {
    vec![
        (FrameLayout::file_log(), true),
        (FrameLayout::mqtt(ReadoutGap::None), false),
        (FrameLayout::mqtt(ReadoutGap::AfterCount), false),
        (FrameLayout::mqtt(ReadoutGap::AfterSensorType), false),
    ]
}

#[test]
fn decode_then_encode_reproduces_bytes() {
    for (layout, with_node) in all_layouts() {
        let frames = sample_frames(with_node);
        let bytes = encode_frames(&frames, layout).expect("encode");

        let decoded = decode(&bytes, layout).finish();
        assert_eq!(decoded.end, StreamEnd::Clean);
        assert_eq!(decoded.frames, frames);

        let reencoded = encode_frames(&decoded.frames, layout).expect("re-encode");
        assert_eq!(reencoded, bytes);
    }
}

#[test]
fn truncation_at_any_offset_keeps_complete_frames() {
    for (layout, with_node) in all_layouts() {
        let frames = sample_frames(with_node);
        let mut boundaries = vec![0usize];
        let mut bytes = Vec::new();
        for frame in &frames {
            encode_frame(frame, layout, &mut bytes).expect("encode");
            boundaries.push(bytes.len());
        }

        for cut in 0..bytes.len() {
            let complete = boundaries.iter().filter(|b| **b <= cut).count() - 1;
            let decoded = decode(&bytes[..cut], layout).finish();
            assert_eq!(decoded.frames.len(), complete, "layout {layout:?} cut {cut}");
            assert_eq!(decoded.frames.as_slice(), &frames[..complete]);
            if boundaries.contains(&cut) {
                assert_eq!(decoded.end, StreamEnd::Clean);
            } else {
                let offset = boundaries[complete];
                assert_eq!(
                    decoded.end,
                    StreamEnd::Truncated {
                        offset,
                        remaining: cut - offset
                    }
                );
            }
        }
    }
}

#[test]
fn record_followed_by_stray_bytes_yields_one_frame() {
    let mut bytes = vec![0xf4, 0xcf, 0xa2, 0xbd, 0x1f, 0xb8, 0x5c, 0x5a, 0xb4, 0x63, 0x00];
    assert_eq!(bytes.len(), 11);
    bytes.extend_from_slice(&[0x0c, 0x00, 0x00]);

    let mut decoder = decode(&bytes, FrameLayout::file_log());
    let first = decoder.next().expect("one frame");
    assert_eq!(first.node, Some(node()));
    assert_eq!(first.source_ts, 0x63b4_5a5c);
    assert!(first.readouts.is_empty());
    assert!(decoder.next().is_none());
    assert_eq!(decoder.consumed(), 11);
    assert_eq!(
        decoder.end(),
        Some(StreamEnd::Truncated {
            offset: 11,
            remaining: 3
        })
    );
}

#[test]
fn decoder_is_lazy_and_fused() {
    let frames = sample_frames(false);
    let layout = FrameLayout::mqtt(ReadoutGap::AfterCount);
    let bytes = encode_frames(&frames, layout).expect("encode");

    let mut decoder = decode(&bytes, layout);
    assert_eq!(decoder.end(), None);
    assert_eq!(decoder.next().as_ref(), Some(&frames[0]));
    assert_eq!(decoder.end(), None);
    assert_eq!(decoder.by_ref().count(), 2);
    assert_eq!(decoder.end(), Some(StreamEnd::Clean));
    assert!(decoder.next().is_none());
}

#[test]
fn mqtt_payload_with_gap_after_count() {
    let payload = [0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x0c, 0x00, 0x00, 0x20, 0x41];
    let decoded = decode(&payload, FrameLayout::mqtt(ReadoutGap::AfterCount)).finish();
    assert_eq!(decoded.end, StreamEnd::Clean);
    assert_eq!(decoded.frames.len(), 1);
    let frame = &decoded.frames[0];
    assert_eq!(frame.node, None);
    assert_eq!(frame.source_ts, 4);
    assert_eq!(frame.readouts, vec![Readout::new(0x0c, 10.0)]);
}

#[test]
fn mqtt_payload_with_gap_after_sensor_type() {
    let payload = [0x04, 0x00, 0x00, 0x00, 0x01, 0x0c, 0xff, 0x00, 0x00, 0x20, 0x41];
    let decoded = decode(&payload, FrameLayout::mqtt(ReadoutGap::AfterSensorType)).finish();
    assert_eq!(decoded.end, StreamEnd::Clean);
    assert_eq!(decoded.frames[0].readouts, vec![Readout::new(0x0c, 10.0)]);
}

#[test]
fn unpadded_mqtt_payload_depends_on_configured_gap() {
    let payload = [0x04, 0x00, 0x00, 0x00, 0x01, 0x0c, 0x00, 0x00, 0x20, 0x41];

    let plain = decode(&payload, FrameLayout::mqtt(ReadoutGap::None)).finish();
    assert_eq!(plain.end, StreamEnd::Clean);
    assert_eq!(plain.frames.len(), 1);
    assert_eq!(plain.frames[0].source_ts, 4);
    assert_eq!(plain.frames[0].readouts, vec![Readout::new(0x0c, 10.0)]);

    for gap in [ReadoutGap::AfterCount, ReadoutGap::AfterSensorType] {
        let padded = decode(&payload, FrameLayout::mqtt(gap)).finish();
        assert!(padded.frames.is_empty(), "{gap:?}");
        assert_eq!(
            padded.end,
            StreamEnd::Truncated {
                offset: 0,
                remaining: 10
            }
        );
    }
}

#[test]
fn values_keep_exact_binary32_bits() {
    let bits = [0x7fc0_0001u32, 0x0000_0001, 0x8000_0000, 0x7f7f_ffff];
    let mut payload = vec![0x01, 0x00, 0x00, 0x00, bits.len() as u8];
    for (index, bit) in bits.iter().enumerate() {
        payload.push(index as u8);
        payload.extend_from_slice(&bit.to_le_bytes());
    }
    let decoded = decode(&payload, FrameLayout::mqtt(ReadoutGap::None)).finish();
    let decoded_bits: Vec<u32> = decoded.frames[0]
        .readouts
        .iter()
        .map(|r| r.value.to_bits())
        .collect();
    assert_eq!(decoded_bits, bits);
}

#[test]
fn empty_buffer_is_a_clean_end() {
    let decoded = decode(&[], FrameLayout::file_log()).finish();
    assert!(decoded.frames.is_empty());
    assert_eq!(decoded.end, StreamEnd::Clean);
}

#[test]
fn encoder_rejects_frames_it_cannot_represent() {
    let without_node = Frame {
        node: None,
        source_ts: 1,
        readouts: Vec::new(),
    };
    let mut out = Vec::new();
    assert!(encode_frame(&without_node, FrameLayout::file_log(), &mut out).is_err());

    let oversized = Frame {
        node: None,
        source_ts: 1,
        readouts: vec![Readout::new(1, 1.0); 256],
    };
    assert!(encode_frame(&oversized, FrameLayout::mqtt(ReadoutGap::None), &mut out).is_err());
}
