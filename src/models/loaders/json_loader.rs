//! 证件资料 JSON 描述文件加载器
//!
//! 每条证件资料是一个目录：info.json 描述文件 + 同目录下的图片文件

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::models::document::{Attachment, DocumentRecord};

/// info.json 的结构
#[derive(Debug, Deserialize)]
struct DocumentDescriptor {
    original_data: OriginalData,
    #[serde(default)]
    downloaded_images: DownloadedImages,
}

#[derive(Debug, Deserialize)]
struct OriginalData {
    #[serde(rename = "Passport Number")]
    passport_number: String,
    #[serde(rename = "Nationality")]
    nationality: String,
    #[serde(rename = "Maid Name")]
    person_name: String,
    #[serde(rename = "Email")]
    email: Option<String>,
    #[serde(rename = "Contact No")]
    contact_no: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DownloadedImages {
    face_photo: Option<ImageRef>,
    passport: Option<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    filename: String,
}

/// 从单个 info.json 加载证件记录
///
/// 描述文件里列出的图片必须存在；未列出的图片按缺失附件处理
pub async fn load_document_record(json_path: &Path) -> Result<DocumentRecord> {
    let content = fs::read_to_string(json_path)
        .await
        .with_context(|| format!("无法读取描述文件: {}", json_path.display()))?;

    let descriptor: DocumentDescriptor = serde_json::from_str(&content)
        .with_context(|| format!("无法解析描述文件: {}", json_path.display()))?;

    let base_dir = json_path.parent().unwrap_or_else(|| Path::new("."));
    let face_photo = load_image(base_dir, descriptor.downloaded_images.face_photo.as_ref()).await?;
    let passport_photo =
        load_image(base_dir, descriptor.downloaded_images.passport.as_ref()).await?;

    Ok(DocumentRecord {
        passport_number: descriptor.original_data.passport_number,
        nationality: descriptor.original_data.nationality,
        person_name: descriptor.original_data.person_name.trim().to_string(),
        email: descriptor.original_data.email,
        contact_no: descriptor.original_data.contact_no,
        face_photo,
        passport_photo,
    })
}

async fn load_image(base_dir: &Path, image: Option<&ImageRef>) -> Result<Option<Attachment>> {
    let Some(image) = image else {
        return Ok(None);
    };
    let path = base_dir.join(&image.filename);
    let bytes = fs::read(&path)
        .await
        .with_context(|| format!("无法读取图片文件: {}", path.display()))?;
    Ok(Some(Attachment {
        filename: image.filename.clone(),
        bytes,
    }))
}

/// 递归扫描目录，加载所有 info.json 描述的证件记录
///
/// 单条记录加载失败只告警跳过，不中断扫描
pub async fn load_all_documents(folder_path: &str) -> Result<Vec<DocumentRecord>> {
    let root = PathBuf::from(folder_path);
    if !root.exists() {
        anyhow::bail!("资料目录不存在: {}", folder_path);
    }

    let mut records = Vec::new();
    let mut pending = vec![root];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("无法读取目录: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.file_name().and_then(|n| n.to_str()) == Some("info.json") {
                match load_document_record(&path).await {
                    Ok(record) => {
                        tracing::info!(
                            "正在加载: {} ({})",
                            record.person_name,
                            record.passport_number
                        );
                        records.push(record);
                    }
                    Err(e) => {
                        tracing::warn!("加载记录失败 {}: {:#}", path.display(), e);
                    }
                }
            }
        }
    }

    Ok(records)
}
