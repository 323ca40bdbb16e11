//! 国籍映射表
//!
//! 门户的国籍下拉框要求同时提交代码（Value）和站点名称（Description），
//! 站点名称拼写与英文惯用名并不一致（例如 NIPAL、ATHYUOBYA），
//! 因此必须查表，查不到就报配置错误，绝不静默回退。

use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::ConfigurationError;

/// 门户下拉框的国籍取值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalityEntry {
    /// 站点代码
    pub value: String,
    /// 站点名称
    pub description: String,
}

/// 内置映射（取自门户表单的实际取值）
static BUILTIN: phf::Map<&'static str, (&'static str, &'static str)> = phf::phf_map! {
    "philippines" => ("237", "PHILIPPINES"),
    "nepal" => ("235", "NIPAL"),
    "india" => ("356", "INDIA"),
    "pakistan" => ("586", "PAKISTAN"),
    "bangladesh" => ("050", "BANGLADESH"),
    "sri lanka" => ("144", "SRI LANKA"),
    "indonesia" => ("360", "INDONESIA"),
    "ethiopia" => ("317", "ATHYUOBYA"),
};

/// 国籍映射表：内置条目 + 可选 CSV 覆盖
#[derive(Debug, Clone)]
pub struct NationalityTable {
    /// 小写国籍名 → 条目
    entries: HashMap<String, NationalityEntry>,
}

impl NationalityTable {
    /// 仅内置条目
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for (name, (value, description)) in BUILTIN.entries() {
            entries.insert(
                name.to_string(),
                NationalityEntry {
                    value: value.to_string(),
                    description: description.to_string(),
                },
            );
        }
        Self { entries }
    }

    /// 加载映射表：CSV 文件存在则在内置条目上叠加，否则仅用内置条目
    ///
    /// CSV 列：english_name, site_name, code；英文名和站点名都登记为键。
    /// 坏行跳过并告警，不中断加载。
    pub fn load(csv_path: &str) -> Self {
        let mut table = Self::builtin();
        let text = match std::fs::read_to_string(csv_path) {
            Ok(text) => text,
            Err(_) => {
                warn!("⚠️ 未找到国籍映射文件 {}，仅使用内置映射", csv_path);
                return table;
            }
        };

        let mut lines = text.lines();
        let header: Vec<&str> = match lines.next() {
            Some(line) => line.split(',').map(str::trim).collect(),
            None => {
                warn!("⚠️ 国籍映射文件 {} 为空，仅使用内置映射", csv_path);
                return table;
            }
        };
        let col = |name: &str| header.iter().position(|h| *h == name);
        let (english_col, site_col, code_col) =
            match (col("english_name"), col("site_name"), col("code")) {
                (Some(e), Some(s), Some(c)) => (e, s, c),
                _ => {
                    warn!("⚠️ 国籍映射文件 {} 表头缺列，仅使用内置映射", csv_path);
                    return table;
                }
            };

        let mut loaded = 0usize;
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let (english, site, code) = match (
                fields.get(english_col),
                fields.get(site_col),
                fields.get(code_col),
            ) {
                (Some(e), Some(s), Some(c)) if !e.is_empty() && !s.is_empty() && !c.is_empty() => {
                    (*e, *s, *c)
                }
                _ => {
                    warn!("⚠️ 国籍映射第 {} 行格式错误，已跳过", line_no + 2);
                    continue;
                }
            };
            let entry = NationalityEntry {
                value: code.to_string(),
                description: site.to_string(),
            };
            table.entries.insert(english.to_lowercase(), entry.clone());
            if site.to_lowercase() != english.to_lowercase() {
                table.entries.insert(site.to_lowercase(), entry);
            }
            loaded += 1;
        }
        info!("✓ 从 {} 加载了 {} 条国籍映射", csv_path, loaded);
        table
    }

    /// 按名称查找（大小写不敏感）
    ///
    /// 查不到时在错误里附上近似候选，方便人工纠正拼写
    pub fn lookup(&self, name: &str) -> Result<&NationalityEntry, ConfigurationError> {
        let key = name.to_lowercase();
        if let Some(entry) = self.entries.get(&key) {
            return Ok(entry);
        }

        let mut close: Vec<&str> = self
            .entries
            .keys()
            .filter(|known| known.contains(&key) || key.contains(known.as_str()))
            .map(String::as_str)
            .collect();
        close.sort_unstable();
        close.truncate(3);
        let suggestion = if close.is_empty() {
            String::new()
        } else {
            format!("，是否想填: {}?", close.join(", "))
        };
        Err(ConfigurationError::UnknownNationality {
            name: name.to_string(),
            suggestion,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
