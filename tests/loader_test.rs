//! 资料加载器测试：info.json 描述文件的递归扫描与解析

use std::fs;
use std::path::PathBuf;

use document_submit::models::loaders::{load_all_documents, load_document_record};

/// 每个测试用独立的临时目录，结束时清理
fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "document_submit_{}_{}",
        tag,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("创建临时目录失败");
    dir
}

const DESCRIPTOR: &str = r#"{
  "maid_id": "M-001",
  "original_data": {
    "Passport Number": "P7654321",
    "Nationality": "Philippines",
    "Maid Name": " MARIA SANTOS "
  },
  "downloaded_images": {
    "face_photo": { "filename": "face.jpg" },
    "passport": { "filename": "passport.jpg" }
  }
}"#;

#[tokio::test]
async fn test_load_single_record_with_images() {
    let dir = temp_dir("single");
    fs::write(dir.join("info.json"), DESCRIPTOR).expect("写入描述文件失败");
    fs::write(dir.join("face.jpg"), [0xFF, 0xD8, 0xFF, 0xE0]).expect("写入图片失败");
    fs::write(dir.join("passport.jpg"), [0xFF, 0xD8]).expect("写入图片失败");

    let record = load_document_record(&dir.join("info.json"))
        .await
        .expect("加载记录失败");

    assert_eq!(record.passport_number, "P7654321");
    assert_eq!(record.nationality, "Philippines");
    assert_eq!(record.person_name, "MARIA SANTOS", "姓名应去除首尾空白");
    let face = record.face_photo.expect("应有人像照");
    assert_eq!(face.filename, "face.jpg");
    assert_eq!(face.bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_load_record_without_images() {
    let dir = temp_dir("noimg");
    let descriptor = r#"{
  "original_data": {
    "Passport Number": "P0000001",
    "Nationality": "Nepal",
    "Maid Name": "JANE"
  }
}"#;
    fs::write(dir.join("info.json"), descriptor).expect("写入描述文件失败");

    let record = load_document_record(&dir.join("info.json"))
        .await
        .expect("加载记录失败");

    // 缺失附件是合法状态
    assert!(record.face_photo.is_none());
    assert!(record.passport_photo.is_none());

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_load_record_missing_listed_image_fails() {
    let dir = temp_dir("missing");
    fs::write(dir.join("info.json"), DESCRIPTOR).expect("写入描述文件失败");
    // 描述文件列出的图片不存在

    let err = load_document_record(&dir.join("info.json")).await;
    assert!(err.is_err(), "描述文件列出的图片缺失应报错");

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_scan_skips_bad_records_and_recurses() {
    let root = temp_dir("scan");
    // 合法记录在嵌套目录
    let good = root.join("batch1").join("rec1");
    fs::create_dir_all(&good).expect("创建目录失败");
    fs::write(good.join("info.json"), DESCRIPTOR).expect("写入描述文件失败");
    fs::write(good.join("face.jpg"), [0xFF]).expect("写入图片失败");
    fs::write(good.join("passport.jpg"), [0xFF]).expect("写入图片失败");
    // 坏记录：JSON 损坏
    let bad = root.join("rec2");
    fs::create_dir_all(&bad).expect("创建目录失败");
    fs::write(bad.join("info.json"), "{not json").expect("写入描述文件失败");

    let records = load_all_documents(root.to_str().expect("路径应为 UTF-8"))
        .await
        .expect("扫描失败");

    // 坏记录跳过，不中断扫描
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].passport_number, "P7654321");

    let _ = fs::remove_dir_all(&root);
}

#[tokio::test]
async fn test_scan_missing_folder_fails() {
    let result = load_all_documents("/definitely/not/a/real/folder").await;
    assert!(result.is_err(), "资料目录不存在应报错");
}
