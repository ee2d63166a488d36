// ==========================================
// 人力资源管理后台 - 命令行入口
// ==========================================
// 用法:
//   hr-import schema <entity>
//   hr-import template <entity>
//   hr-import import <entity> <rows.json> [actor]
//   hr-import batches [limit]
// ==========================================

use anyhow::{bail, Context, Result};
use hr_import::app::{get_default_db_path, AppState};
use hr_import::RawRow;

const USAGE: &str = "用法:
  hr-import schema <entity>
  hr-import template <entity>
  hr-import import <entity> <rows.json> [actor]
  hr-import batches [limit]";

/// 默认导入人
const DEFAULT_ACTOR: &str = "cli";

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    if std::env::var("HR_IMPORT_LOG_FORMAT").as_deref() == Ok("json") {
        hr_import::logging::init_json();
    } else {
        hr_import::logging::init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(c) => c.as_str(),
        None => bail!("{}", USAGE),
    };

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("{} v{}，使用数据库: {}", hr_import::APP_NAME, hr_import::VERSION, db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let api = state.import_api.clone();

    match (command, &args[1..]) {
        ("schema", [entity]) => {
            let schema = api.get_schema(entity).await?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        ("template", [entity]) => {
            let template = api.get_template_data(entity).await?;
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        ("import", [entity, path, rest @ ..]) if rest.len() <= 1 => {
            let actor = rest.first().map(String::as_str).unwrap_or(DEFAULT_ACTOR);
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("无法读取文件: {}", path))?;
            let rows: Vec<RawRow> = serde_json::from_str(&content)
                .with_context(|| format!("文件不是行对象的 JSON 数组: {}", path))?;

            let result = api.import(entity, rows, actor).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(2);
            }
        }
        ("batches", rest) if rest.len() <= 1 => {
            let limit = match rest.first() {
                Some(v) => v.parse::<usize>().with_context(|| format!("无效的 limit: {}", v))?,
                None => 20,
            };
            let batches = api.list_recent_batches(limit).await?;
            println!("{}", serde_json::to_string_pretty(&batches)?);
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}
