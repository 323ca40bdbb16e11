//! 表单字段模型

/// 文件字段未指明类型时的默认 Content-Type
pub const OCTET_STREAM: &str = "application/octet-stream";

/// 多部件表单的一个字段
///
/// 字段序列的顺序即线上格式的一部分，从定义到编码必须原样保留。
/// 文件字段的内容可以为空、文件名也可以为空：
/// 空文件名表示用户未提供该附件，但该部件仍然必须编码输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// 文本字段
    Text { name: String, value: String },
    /// 文件字段
    File {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl FormField {
    /// 创建文本字段
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// 创建文件字段
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        FormField::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// 创建占位文件字段：无文件名、无内容
    pub fn empty_file(name: impl Into<String>) -> Self {
        FormField::File {
            name: name.into(),
            filename: String::new(),
            content_type: OCTET_STREAM.to_string(),
            bytes: Vec::new(),
        }
    }

    /// 字段名
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}
