// ==========================================
// 人力资源管理后台 - 数据清洗器
// ==========================================
// 职责: TRIM / 大小写规范 / NULL 标准化 / 日期与布尔解析 / 税号格式
// ==========================================

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// 接受的日期格式（第一个为规范格式）
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// NIF/NIE 校验字母表
const NIF_LETTERS: &[u8] = b"TRWAGMYFPDXBNJZSQVHLCKE";

static NIF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[XYZ]?\d{7,8}[A-Z]$").expect("valid NIF regex"));

static CIF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ABCDEFGHJNPQRSUVW]\d{7}[0-9A-J]$").expect("valid CIF regex")
});

static POSTAL_CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{5})\s*(.*)$").expect("valid postal code regex"));

static POSTAL_ANYWHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})\b").expect("valid postal code regex"));

// ==========================================
// ParsedAddress - 自由文本地址拆分结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub direccion_completa: String,
    pub calle: String,
    pub codigo_postal: Option<String>,
    pub ciudad: Option<String>,
}

pub struct DataCleaner;

impl DataCleaner {
    /// TRIM（可选 UPPER）
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// 空白串视为 NULL
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 邮箱: TRIM + 小写
    pub fn clean_email(&self, value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// 税号: 去除空白与分隔符 + 大写
    pub fn clean_tax_id(&self, value: &str) -> String {
        value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
            .collect::<String>()
            .to_uppercase()
    }

    /// 解析日期（ISO 优先，其次 DD/MM/YYYY、DD-MM-YYYY）
    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    }

    /// 解析布尔（Sí/Si/Yes/True/1 → true，No/False/0 → false）
    pub fn parse_boolean(&self, value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "sí" | "si" | "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// 解析整数
    pub fn parse_integer(&self, value: &str) -> Option<i64> {
        value.trim().parse::<i64>().ok()
    }

    /// 是否具备 NIF/NIE 形态（不校验控制字母）
    pub fn looks_like_nif(&self, value: &str) -> bool {
        NIF_RE.is_match(&self.clean_tax_id(value))
    }

    /// 是否具备 CIF 形态
    pub fn looks_like_cif(&self, value: &str) -> bool {
        CIF_RE.is_match(&self.clean_tax_id(value))
    }

    /// NIF/NIE 完整校验（含控制字母）
    pub fn is_valid_nif(&self, value: &str) -> bool {
        let cleaned = self.clean_tax_id(value);
        if !NIF_RE.is_match(&cleaned) {
            return false;
        }

        let (body, letter) = cleaned.split_at(cleaned.len() - 1);
        let digits: String = body
            .chars()
            .map(|c| match c {
                'X' => '0',
                'Y' => '1',
                'Z' => '2',
                other => other,
            })
            .collect();

        let number: u64 = match digits.parse() {
            Ok(n) => n,
            Err(_) => return false,
        };
        let expected = NIF_LETTERS[(number % 23) as usize] as char;
        letter.starts_with(expected)
    }

    /// 拆分自由文本地址: "Calle Mayor 1, 28001 Madrid"
    pub fn parse_address(&self, value: &str) -> ParsedAddress {
        let full = value.split_whitespace().collect::<Vec<_>>().join(" ");

        let (calle, codigo_postal, ciudad) = match full.rsplit_once(',') {
            Some((street, tail)) => {
                let tail = tail.trim();
                match POSTAL_CITY_RE.captures(tail) {
                    Some(caps) => {
                        let city = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
                        (
                            street.trim().to_string(),
                            Some(caps[1].to_string()),
                            (!city.is_empty()).then(|| city.to_string()),
                        )
                    }
                    None => (
                        street.trim().to_string(),
                        None,
                        (!tail.is_empty()).then(|| tail.to_string()),
                    ),
                }
            }
            None => {
                let postal = POSTAL_ANYWHERE_RE
                    .captures(&full)
                    .map(|caps| caps[1].to_string());
                (full.clone(), postal, None)
            }
        };

        ParsedAddress {
            direccion_completa: full,
            calle,
            codigo_postal,
            ciudad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  abc  ", false), "abc");
        assert_eq!(cleaner.clean_text("  abc  ", true), "ABC");
        assert_eq!(cleaner.clean_email("  Jane.Doe@Example.com "), "jane.doe@example.com");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ")), None);
        assert_eq!(cleaner.normalize_null(Some(" x ")), Some("x".to_string()));
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let cleaner = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(cleaner.parse_date("2024-03-15"), expected);
        assert_eq!(cleaner.parse_date("15/03/2024"), expected);
        assert_eq!(cleaner.parse_date("15-03-2024"), expected);
        assert_eq!(cleaner.parse_date("2024-02-30"), None);
        assert_eq!(cleaner.parse_date("mañana"), None);
    }

    #[test]
    fn test_parse_boolean() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_boolean("Sí"), Some(true));
        assert_eq!(cleaner.parse_boolean("YES"), Some(true));
        assert_eq!(cleaner.parse_boolean("0"), Some(false));
        assert_eq!(cleaner.parse_boolean("quizá"), None);
    }

    #[test]
    fn test_tax_ids() {
        let cleaner = DataCleaner;
        assert!(cleaner.is_valid_nif("12345678Z"));
        assert!(cleaner.is_valid_nif("12345678-z"));
        assert!(!cleaner.is_valid_nif("12345678A"));
        assert!(cleaner.is_valid_nif("X1234567L"));
        assert!(cleaner.looks_like_nif("12345678A"));
        assert!(cleaner.looks_like_cif("B12345678"));
        assert!(!cleaner.looks_like_cif("Acme"));
        assert!(!cleaner.looks_like_nif("Juan Pérez"));
    }

    #[test]
    fn test_parse_address() {
        let cleaner = DataCleaner;
        let addr = cleaner.parse_address("Calle Mayor 1,  28001 Madrid");
        assert_eq!(addr.calle, "Calle Mayor 1");
        assert_eq!(addr.codigo_postal.as_deref(), Some("28001"));
        assert_eq!(addr.ciudad.as_deref(), Some("Madrid"));
        assert_eq!(addr.direccion_completa, "Calle Mayor 1, 28001 Madrid");

        let addr = cleaner.parse_address("Avenida Sol 3, Sevilla");
        assert_eq!(addr.codigo_postal, None);
        assert_eq!(addr.ciudad.as_deref(), Some("Sevilla"));

        let addr = cleaner.parse_address("Plaza Nueva 08001");
        assert_eq!(addr.calle, "Plaza Nueva 08001");
        assert_eq!(addr.codigo_postal.as_deref(), Some("08001"));
    }
}
