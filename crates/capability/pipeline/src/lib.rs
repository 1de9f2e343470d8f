//! 入库链路：单条读数的入库引擎与整次投递的处理器。
//!
//! - [`IngestEngine`]：实体解析/自动登记、去重、条件写入，每次存储调用限时
//! - [`DeliveryProcessor`]：按投递身份选择帧布局，逐帧逐读数交给引擎并汇总计数

mod delivery;
mod engine;

pub use delivery::{DeliveryProcessor, DeliveryReport};
pub use engine::{EngineConfig, EngineError, IngestEngine, IngestOutcome};
