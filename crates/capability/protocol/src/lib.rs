//! # 遥测帧协议模块
//!
//! 传感器节点经网关上报的紧凑二进制帧的语法、解码与编码。
//!
//! - [`frame`]：线上布局与两种身份来源/保留字节配置
//! - [`decoder`]：惰性、不可重启的流式解码，截断作为一等返回值
//! - [`encoder`]：与解码器互逆的编码
//! - [`classifier`]：传感器类型编号到语义名称的映射
//!
//! 解码是纯函数，不涉及任何共享状态。
//!
//! ```rust,ignore
//! use mms_protocol::{decode, FrameLayout, ReadoutGap};
//!
//! let mut frames = decode(&payload, FrameLayout::mqtt(ReadoutGap::AfterCount));
//! for frame in frames.by_ref() {
//!     // ...
//! }
//! if let Some(end) = frames.end() {
//!     // Clean 或 Truncated
//! }
//! ```

pub mod classifier;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;

pub use classifier::{SensorKind, classify};
pub use decoder::{DecodedStream, FrameDecoder, StreamEnd, decode};
pub use encoder::{encode_frame, encode_frames};
pub use error::ProtocolError;
pub use frame::{DecodeMode, FrameLayout, ReadoutGap};
