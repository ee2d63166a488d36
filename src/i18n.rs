// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持西班牙语（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 导入管道不读写全局 locale，语言通过 Messages 显式传入
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "es";

/// 支持的语言列表
pub const SUPPORTED_LOCALES: &[&str] = &["es", "en"];

/// 翻译消息（指定语言，带参数）
///
/// 占位符格式: `%{name}`
pub fn translate(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key, locale = locale).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 是否为受支持的语言
pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

// ==========================================
// Messages - 用户可见消息
// ==========================================

/// 绑定到某一语言的消息源
///
/// 由导入引擎按配置创建，并传入校验/查重/解析/错误翻译各环节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    locale: String,
}

impl Messages {
    /// 创建消息源；不支持的语言回退到默认语言
    pub fn new(locale: &str) -> Self {
        let locale = if is_supported(locale) {
            locale.to_string()
        } else {
            DEFAULT_LOCALE.to_string()
        };
        Self { locale }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// 翻译消息（无参数）
    pub fn text(&self, key: &str) -> String {
        translate(&self.locale, key, &[])
    }

    /// 翻译消息（带参数）
    ///
    /// # 示例
    /// ```no_run
    /// use hr_import::i18n::Messages;
    /// let msg = Messages::default().text_with("validation.required", &[("label", "Nombre")]);
    /// ```
    pub fn text_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        translate(&self.locale, key, args)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}
