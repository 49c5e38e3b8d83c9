//! Default keyword tables.
//!
//! The application under test ships both English and Chinese UI strings, so
//! both tables are bilingual. Entries are lower-case; matching lower-cases
//! the recognized text before searching.

/// Text that signals a broken page
pub const DEFAULT_ERROR_KEYWORDS: &[&str] = &[
    "error",
    "failed",
    "exception",
    "warning",
    "404",
    "500",
    "not found",
    "internal server error",
    "错误",
    "失败",
    "异常",
    "警告",
    "出错",
    "无法访问",
];

/// Text that signals a completed operation
pub const DEFAULT_SUCCESS_KEYWORDS: &[&str] = &[
    "success",
    "saved",
    "created",
    "updated",
    "deleted",
    "completed",
    "成功",
    "已保存",
    "已创建",
    "已更新",
    "已删除",
    "完成",
];
