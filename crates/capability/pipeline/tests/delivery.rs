use domain::{DeliveryIdentity, Frame, NodeAddress, RawDelivery, Readout};
use mms_pipeline::{DeliveryProcessor, IngestEngine};
use mms_protocol::{FrameLayout, ReadoutGap, StreamEnd, classify, encode_frames};
use mms_storage::StorageHandle;
use std::sync::Arc;

const NODE: [u8; 6] = [0xA0, 0xB7, 0x65, 0x4C, 0x2E, 0x10];

fn processor(gap: ReadoutGap) -> DeliveryProcessor {
    let engine = Arc::new(IngestEngine::new(StorageHandle::in_memory()));
    DeliveryProcessor::new(engine, gap)
}

fn topic_delivery(payload: Vec<u8>) -> RawDelivery {
    RawDelivery {
        delivery_id: "d-1".to_string(),
        origin: "fornalab/f4cfa2bd1fb8/a0b7654c2e10".to_string(),
        identity: DeliveryIdentity::Topic {
            gateway: "f4cfa2bd1fb8".to_string(),
            module: "a0b7654c2e10".to_string(),
        },
        payload,
        received_at_ms: 0,
    }
}

fn log_delivery(payload: Vec<u8>) -> RawDelivery {
    RawDelivery {
        delivery_id: "d-2".to_string(),
        origin: "capture.log".to_string(),
        identity: DeliveryIdentity::Embedded,
        payload,
        received_at_ms: 0,
    }
}

#[tokio::test]
async fn mqtt_redelivery_stores_one_measurement() {
    let processor = processor(ReadoutGap::AfterCount);
    let payload = vec![
        0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x0C, 0x00, 0x00, 0x20, 0x41,
    ];

    let first = processor.process(&topic_delivery(payload.clone())).await;
    let second = processor.process(&topic_delivery(payload)).await;

    assert_eq!(first.frames, 1);
    assert_eq!(first.inserted, 1);
    assert_eq!(first.end, StreamEnd::Clean);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, 1);

    let storage = processor.engine().storage();
    let module = storage
        .modules
        .find_module("A0:B7:65:4C:2E:10")
        .await
        .expect("find")
        .expect("module provisioned under canonical address");
    assert!(!module.is_claimed());
    let gateway = storage
        .gateways
        .find_gateway("F4:CF:A2:BD:1F:B8")
        .await
        .expect("find")
        .expect("gateway provisioned");
    let rows = storage
        .measurements
        .list_measurements(module.id, 10)
        .await
        .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, 10.0);
    assert_eq!(rows[0].ts_ms, 4_000);
    assert_eq!(rows[0].gateway_id, gateway.id);
    assert_eq!(classify(rows[0].sensor_type), "air-temperature");
}

#[tokio::test]
async fn mqtt_gap_after_sensor_type_follows_configuration() {
    let processor = processor(ReadoutGap::AfterSensorType);
    let payload = vec![
        0x04, 0x00, 0x00, 0x00, 0x01, 0x0C, 0x00, 0x00, 0x00, 0x20, 0x41,
    ];
    let report = processor.process(&topic_delivery(payload)).await;
    assert_eq!(report.inserted, 1);
    assert_eq!(report.end, StreamEnd::Clean);
}

#[tokio::test]
async fn nan_readout_does_not_block_siblings() {
    let processor = processor(ReadoutGap::AfterCount);
    let frame = Frame {
        node: Some(NodeAddress::new(NODE)),
        source_ts: 1_700_000_000,
        readouts: vec![
            Readout::new(12, f32::NAN),
            Readout::new(13, 55.0),
            Readout::new(201, 7.5),
        ],
    };
    let payload = encode_frames(&[frame], FrameLayout::file_log()).expect("encode");

    let report = processor.process(&log_delivery(payload)).await;

    assert_eq!(report.frames, 1);
    assert_eq!(report.invalid, 1);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.readouts(), 3);

    let storage = processor.engine().storage();
    let module = storage
        .modules
        .find_module("A0:B7:65:4C:2E:10")
        .await
        .expect("find")
        .expect("module");
    let rows = storage
        .measurements
        .list_measurements(module.id, 10)
        .await
        .expect("list");
    let mut types: Vec<u8> = rows.iter().map(|row| row.sensor_type).collect();
    types.sort_unstable();
    assert_eq!(types, vec![13, 201]);
    // 文件日志没有独立网关跳：网关与模块是同一个地址
    let gateways = storage.gateways.list_gateways().await.expect("list");
    assert_eq!(gateways.len(), 1);
    assert_eq!(gateways[0].uuid, "A0:B7:65:4C:2E:10");
}

#[tokio::test]
async fn truncated_tail_keeps_complete_frames() {
    let processor = processor(ReadoutGap::AfterCount);
    let frame = Frame {
        node: Some(NodeAddress::new(NODE)),
        source_ts: 9,
        readouts: Vec::new(),
    };
    let mut payload = encode_frames(&[frame], FrameLayout::file_log()).expect("encode");
    assert_eq!(payload.len(), 11);
    payload.extend_from_slice(&[0xDE, 0xAD, 0xBE]);

    let report = processor.process(&log_delivery(payload)).await;

    assert_eq!(report.frames, 1);
    assert_eq!(report.readouts(), 0);
    assert_eq!(
        report.end,
        StreamEnd::Truncated {
            offset: 11,
            remaining: 3
        }
    );
}

// 无保留字节的 10 字节帧：ts=4, count=1, type=0x0C, value=10.0
const UNPADDED_AIR_TEMPERATURE: [u8; 10] = [0x04, 0x00, 0x00, 0x00, 0x01, 0x0C, 0x00, 0x00, 0x20, 0x41];

#[tokio::test]
async fn mqtt_unpadded_frame_with_gap_none_dedups_redelivery() {
    let processor = processor(ReadoutGap::None);

    let first = processor
        .process(&topic_delivery(UNPADDED_AIR_TEMPERATURE.to_vec()))
        .await;
    let second = processor
        .process(&topic_delivery(UNPADDED_AIR_TEMPERATURE.to_vec()))
        .await;

    assert_eq!(first.frames, 1);
    assert_eq!(first.inserted, 1);
    assert_eq!(first.end, StreamEnd::Clean);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, 1);

    let storage = processor.engine().storage();
    let module = storage
        .modules
        .find_module("A0:B7:65:4C:2E:10")
        .await
        .expect("find")
        .expect("module");
    let rows = storage
        .measurements
        .list_measurements(module.id, 10)
        .await
        .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, 10.0);
    assert_eq!(classify(rows[0].sensor_type), "air-temperature");
}

#[tokio::test]
async fn mqtt_unpadded_frame_with_gap_after_count_stores_nothing() {
    let processor = processor(ReadoutGap::AfterCount);

    let report = processor
        .process(&topic_delivery(UNPADDED_AIR_TEMPERATURE.to_vec()))
        .await;

    assert_eq!(report.frames, 0);
    assert_eq!(report.readouts(), 0);
    assert_eq!(
        report.end,
        StreamEnd::Truncated {
            offset: 0,
            remaining: 10
        }
    );
    let storage = processor.engine().storage();
    assert!(storage.modules.list_modules().await.expect("list").is_empty());
}

#[tokio::test]
async fn mqtt_zero_timestamp_redelivery_is_skipped() {
    let processor = processor(ReadoutGap::AfterCount);
    let payload = vec![
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x0C, 0x00, 0x00, 0x20, 0x41,
    ];

    let first = processor.process(&topic_delivery(payload.clone())).await;
    let second = processor.process(&topic_delivery(payload)).await;

    assert_eq!((first.inserted, first.duplicates), (1, 0));
    assert_eq!((second.inserted, second.duplicates), (0, 1));
}
