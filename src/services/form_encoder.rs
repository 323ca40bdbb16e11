//! 多部件表单编码器 - 业务能力层
//!
//! 门户的表单解析器对封装格式极其敏感：CRLF 行结束、字段顺序、
//! 空文件部件都必须逐字节匹配浏览器的输出。所有提交统一走这里编码，
//! 不允许在别处手拼表单文本。

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::models::form::FormField;

/// 生成浏览器风格的随机分隔符
pub fn generate_boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("----WebKitFormBoundary{}", token)
}

/// 请求的 Content-Type 头
pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

/// 将字段序列编码为 multipart/form-data 请求体
///
/// 每个字段编码为一个 `--boundary` 部件，按输入顺序输出，
/// 末尾以 `--boundary--` 收尾。文件字段即使文件名和内容都为空，
/// 也照常输出头部和空内容段，省略部件是协议违例。
pub fn encode(fields: &[FormField], boundary: &str) -> Vec<u8> {
    let mut body = Vec::new();

    for field in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match field {
            FormField::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
                body.extend_from_slice(b"\r\n");
            }
            FormField::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
