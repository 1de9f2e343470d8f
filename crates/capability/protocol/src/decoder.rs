//! 流式帧解码
//!
//! 从左到右逐帧消费字节缓冲区，每次前进恰好一帧的长度，从不回溯。
//! 剩余字节不足以完成下一帧时立即停止：已解出的帧全部保留，
//! 残尾丢弃，并以 [`StreamEnd::Truncated`] 告知调用方。

use crate::frame::{DecodeMode, FrameLayout, ReadoutGap, GAP_LEN, VALUE_LEN};
use domain::{Frame, NodeAddress, Readout};
use std::iter::FusedIterator;

/// 解码结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// 缓冲区恰好在帧边界结束
    Clean,
    /// 从 `offset` 开始的 `remaining` 字节不足一帧，已丢弃
    Truncated { offset: usize, remaining: usize },
}

impl StreamEnd {
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// 惰性帧解码器
///
/// 每个缓冲区只解码一次；迭代结束后通过 [`FrameDecoder::end`] 取得结束方式。
pub struct FrameDecoder<'a> {
    input: &'a [u8],
    cursor: usize,
    layout: FrameLayout,
    end: Option<StreamEnd>,
}

/// 物化后的解码结果
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStream {
    pub frames: Vec<Frame>,
    pub end: StreamEnd,
}

/// 以给定布局解码字节缓冲区
pub fn decode(input: &[u8], layout: FrameLayout) -> FrameDecoder<'_> {
    FrameDecoder::new(input, layout)
}

impl<'a> FrameDecoder<'a> {
    pub fn new(input: &'a [u8], layout: FrameLayout) -> Self {
        Self {
            input,
            cursor: 0,
            layout,
            end: None,
        }
    }

    /// 已消费的字节数（等于已解出帧的总长度）
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// 迭代结束后的结束方式；尚未结束时为 None
    pub fn end(&self) -> Option<StreamEnd> {
        self.end
    }

    /// 消费剩余所有帧
    pub fn finish(mut self) -> DecodedStream {
        let frames: Vec<Frame> = self.by_ref().collect();
        DecodedStream {
            frames,
            end: self.end.unwrap_or(StreamEnd::Clean),
        }
    }

    fn truncated(&self) -> StreamEnd {
        StreamEnd::Truncated {
            offset: self.cursor,
            remaining: self.input.len() - self.cursor,
        }
    }

    fn decode_next(&mut self) -> Result<Option<Frame>, StreamEnd> {
        let rest = &self.input[self.cursor..];
        if rest.is_empty() {
            return Ok(None);
        }
        if rest.len() < self.layout.header_len() {
            return Err(self.truncated());
        }

        let mut pos = 0;
        let node = match self.layout.mode {
            DecodeMode::WithAddress => {
                let mut octets = [0u8; NodeAddress::LEN];
                octets.copy_from_slice(&rest[..NodeAddress::LEN]);
                pos += NodeAddress::LEN;
                Some(NodeAddress::new(octets))
            }
            DecodeMode::AddressFromContext => None,
        };
        let source_ts = u32::from_le_bytes(read_word(&rest[pos..]));
        pos += 4;
        let count = rest[pos] as usize;
        pos += 1;
        if self.layout.gap == ReadoutGap::AfterCount {
            pos += GAP_LEN;
        }

        let frame_len = self.layout.frame_len(count);
        if rest.len() < frame_len {
            return Err(self.truncated());
        }

        let mut readouts = Vec::with_capacity(count);
        for _ in 0..count {
            let sensor_type = rest[pos];
            pos += 1;
            if self.layout.gap == ReadoutGap::AfterSensorType {
                pos += GAP_LEN;
            }
            let value = f32::from_le_bytes(read_word(&rest[pos..]));
            pos += VALUE_LEN;
            readouts.push(Readout { sensor_type, value });
        }
        debug_assert_eq!(pos, frame_len);

        self.cursor += frame_len;
        Ok(Some(Frame {
            node,
            source_ts,
            readouts,
        }))
    }
}

impl Iterator for FrameDecoder<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.end.is_some() {
            return None;
        }
        match self.decode_next() {
            Ok(Some(frame)) => Some(frame),
            Ok(None) => {
                self.end = Some(StreamEnd::Clean);
                None
            }
            Err(end) => {
                self.end = Some(end);
                None
            }
        }
    }
}

impl FusedIterator for FrameDecoder<'_> {}

// 调用前已校验剩余长度
fn read_word(bytes: &[u8]) -> [u8; 4] {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    word
}
