//! 国籍映射表测试：内置条目、CSV 覆盖、查找失败

use std::fs;

use document_submit::{ConfigurationError, NationalityTable};

#[test]
fn test_builtin_lookup_case_insensitive() {
    let table = NationalityTable::builtin();

    let entry = table.lookup("Philippines").expect("内置条目应可查到");
    assert_eq!(entry.value, "237");
    assert_eq!(entry.description, "PHILIPPINES");

    // 站点拼写与英文惯用名不一致的条目
    let entry = table.lookup("NEPAL").expect("内置条目应可查到");
    assert_eq!(entry.value, "235");
    assert_eq!(entry.description, "NIPAL");

    let entry = table.lookup("bangladesh").expect("内置条目应可查到");
    assert_eq!(entry.value, "050", "代码的前导零必须保留");
}

#[test]
fn test_unknown_nationality_is_error_with_suggestion() {
    let table = NationalityTable::builtin();

    let err = table.lookup("Philipines").expect_err("拼错的国籍不得静默回退");
    match err {
        ConfigurationError::UnknownNationality { name, .. } => {
            assert_eq!(name, "Philipines");
        }
        other => panic!("应为未知国籍错误: {:?}", other),
    }

    // 部分匹配时附上候选
    let err = table.lookup("sri").expect_err("不完整名称不得静默回退");
    let text = err.to_string();
    assert!(text.contains("sri lanka"), "错误信息应包含近似候选: {}", text);
}

#[test]
fn test_csv_overrides_and_extends_builtin() {
    let path = std::env::temp_dir().join(format!(
        "document_submit_nat_{}.csv",
        std::process::id()
    ));
    fs::write(
        &path,
        "english_name,site_name,code\nEthiopia,ATHYUOBYA,317\nKenya,KENYA,404\nbadline\n",
    )
    .expect("写入 CSV 失败");

    let table = NationalityTable::load(path.to_str().expect("路径应为 UTF-8"));

    // CSV 条目与站点名都可查
    let entry = table.lookup("kenya").expect("CSV 条目应可查到");
    assert_eq!(entry.value, "404");
    let entry = table.lookup("athyuobya").expect("站点名也应登记为键");
    assert_eq!(entry.description, "ATHYUOBYA");

    // 内置条目仍然可查，坏行被跳过
    assert!(table.lookup("india").is_ok());

    let _ = fs::remove_file(&path);
}

#[test]
fn test_missing_csv_falls_back_to_builtin() {
    let table = NationalityTable::load("/no/such/mapping.csv");
    assert!(table.lookup("india").is_ok());
    assert!(!table.is_empty());
}
