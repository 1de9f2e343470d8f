//! 存储层错误类型
//!
//! 定义统一的存储错误类型，用于封装底层错误：
//! - 唯一约束冲突（并发登记同一身份、重复写入同一测量值）
//! - 等待超时
//! - SQL 执行与连接错误

/// 存储错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// 唯一约束冲突：另一个调用方已写入同一行
    Conflict,
    /// 存储调用超过限定等待时间
    Timeout,
    /// 其余持久化层错误
    Backend,
}

#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::Backend,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::Conflict,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == StorageErrorKind::Conflict
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::conflict(err.to_string())
            }
            sqlx::Error::PoolTimedOut => Self::timeout(err.to_string()),
            _ => Self::new(err.to_string()),
        }
    }
}
