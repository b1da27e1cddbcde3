//! 存储层错误类型
//!
//! 统一封装底层错误：
//! - 数据库执行 / 连接错误
//! - 关系图完整性错误（主键重复、外键缺失）
//! - 内存实现的锁错误

/// 错误类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    Database,
    Integrity,
    Lock,
}

#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    message: String,
}

impl StorageError {
    /// 完整性错误（校验失败时最常见）
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::Integrity,
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::Database,
            message: message.into(),
        }
    }

    pub fn lock() -> Self {
        Self {
            kind: StorageErrorKind::Lock,
            message: "lock failed".to_string(),
        }
    }

    pub fn kind(&self) -> StorageErrorKind {
        self.kind
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
        Self::database(err.to_string())
    }
}
