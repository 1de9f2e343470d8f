use std::fmt;

/// 节点硬件地址（6 字节 MAC）。
///
/// 规范字符串形式为大写十六进制、冒号分隔（`AA:BB:CC:DD:EE:FF`），
/// 与网关固件拼接 MQTT 主题时使用的格式一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeAddress([u8; 6]);

impl NodeAddress {
    /// 线上字节长度。
    pub const LEN: usize = 6;

    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// 解析常见的 MAC 写法：`aa:bb:cc:dd:ee:ff`、`AA-BB-CC-DD-EE-FF`、`aabbccddeeff`。
    pub fn parse(text: &str) -> Option<Self> {
        let digits: String = text
            .trim()
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .collect();
        if digits.len() != Self::LEN * 2 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let mut octets = [0u8; 6];
        for (index, octet) in octets.iter_mut().enumerate() {
            let pair = &digits[index * 2..index * 2 + 2];
            *octet = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(Self(octets))
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// 将外部给出的身份标识规整为规范形式。
///
/// 可解析为 MAC 的标识统一输出 `AA:BB:CC:DD:EE:FF`；其余标识去除首尾空白后原样使用。
pub fn canonical_identity(raw: &str) -> String {
    match NodeAddress::parse(raw) {
        Some(address) => address.to_string(),
        None => raw.trim().to_string(),
    }
}

/// 帧内单个传感器读数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    pub sensor_type: u8,
    pub value: f32,
}

impl Readout {
    pub fn new(sensor_type: u8, value: f32) -> Self {
        Self { sensor_type, value }
    }

    /// NaN 与无穷值不允许入库。
    pub fn is_persistable(&self) -> bool {
        self.value.is_finite()
    }
}

/// 解码后的遥测帧（时间戳 + 读数序列），只在解码与入库之间短暂存在。
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 日志抓包格式携带的节点地址；MQTT 格式中为 None。
    pub node: Option<NodeAddress>,
    /// 节点时钟的 Unix 秒。
    pub source_ts: u32,
    pub readouts: Vec<Readout>,
}

impl Frame {
    pub fn readout_count(&self) -> usize {
        self.readouts.len()
    }
}

/// 投递的身份来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryIdentity {
    /// MQTT 主题层级给出的网关与模块身份。
    Topic { gateway: String, module: String },
    /// 身份嵌在每帧的节点地址中（日志抓包，无独立网关跳）。
    Embedded,
}

/// 采集源交付给入库链路的一次原始投递。
#[derive(Debug, Clone)]
pub struct RawDelivery {
    pub delivery_id: String,
    /// 来源描述（MQTT 主题或日志文件路径），仅用于日志。
    pub origin: String,
    pub identity: DeliveryIdentity,
    pub payload: Vec<u8>,
    pub received_at_ms: i64,
}
