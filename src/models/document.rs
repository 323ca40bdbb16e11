//! 证件记录模型

use crate::error::ConfigurationError;
use crate::models::form::FormField;
use crate::models::nationality::NationalityEntry;

/// 证件附件（文件名 + 原始字节）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// 一条待提交的证件记录
///
/// 附件最多两张（人像照、护照首页），缺失是合法状态：
/// 缺失的附件以空文件字段提交，而不是省略字段。
#[derive(Debug, Clone, Default)]
pub struct DocumentRecord {
    pub passport_number: String,
    pub nationality: String,
    pub person_name: String,
    pub email: Option<String>,
    pub contact_no: Option<String>,
    pub face_photo: Option<Attachment>,
    pub passport_photo: Option<Attachment>,
}

impl DocumentRecord {
    /// 校验必填字段
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.passport_number.trim().is_empty() {
            return Err(ConfigurationError::MissingField {
                field: "passport_number",
            });
        }
        if self.nationality.trim().is_empty() {
            return Err(ConfigurationError::MissingField {
                field: "nationality",
            });
        }
        Ok(())
    }
}

/// 按门户要求的精确顺序构建提交字段序列
///
/// 字段顺序、空 Key 字段、占位文件字段都是线上格式的一部分，不可增删调序。
pub fn build_submission_fields(
    record: &DocumentRecord,
    nationality: &NationalityEntry,
    verification_token: &str,
    default_email: &str,
    default_contact_no: &str,
) -> Vec<FormField> {
    let email = record.email.as_deref().unwrap_or(default_email);
    let contact_no = record.contact_no.as_deref().unwrap_or(default_contact_no);

    vec![
        FormField::text("__RequestVerificationToken", verification_token),
        FormField::text("Key", ""),
        FormField::text("PassportNumber", record.passport_number.as_str()),
        FormField::text("Email", email),
        FormField::text("ContactNo", contact_no),
        FormField::text("Nationality.Value", nationality.value.as_str()),
        FormField::text("Nationality.Description", nationality.description.as_str()),
        photo_field(record, "PersonPhotoDocument", &record.face_photo, "photo"),
        photo_field(
            record,
            "PassportDocumentFirstPage",
            &record.passport_photo,
            "passport",
        ),
        FormField::empty_file("PassportDocumentSecondPage"),
        FormField::empty_file("NationalIdentityDocumentFirstPage"),
        FormField::empty_file("NationalIdentityDocumentSecondPage"),
        FormField::text("EducationCertificateAvailable", "false"),
        FormField::empty_file("EducationCertificateFirstPage"),
        FormField::empty_file("EducationCertificateSecondPage"),
    ]
}

/// 照片字段：有附件时按"<姓名> - <类别>.jpg"命名，无附件时提交占位字段
fn photo_field(
    record: &DocumentRecord,
    field_name: &str,
    attachment: &Option<Attachment>,
    kind: &str,
) -> FormField {
    match attachment {
        Some(attachment) => {
            let filename = if record.person_name.trim().is_empty() {
                attachment.filename.clone()
            } else {
                format!("{} - {}.jpg", record.person_name.trim(), kind)
            };
            FormField::file(field_name, filename, "image/jpeg", attachment.bytes.clone())
        }
        None => FormField::empty_file(field_name),
    }
}
