//! CLI 通用输出格式化模块
//!
//! 提供 table/json/yaml 三种输出格式的通用实现

use anyhow::{bail, Result};
use serde::Serialize;

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => bail!("不支持的输出格式: {} (可选 table/json/yaml)", other),
        }
    }
}

/// 渲染表格，空列表时输出占位行
pub fn render_table<T: TableRow>(items: &[T], empty_message: &str) -> String {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();

    // 列宽取表头与数据的最大值
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_line = format_line(headers.iter().map(|h| h.to_string()).collect());
    let mut out = String::new();
    out.push_str(&header_line);
    out.push('\n');
    out.push_str(&"-".repeat(header_line.chars().count()));
    out.push('\n');

    if rows.is_empty() {
        out.push_str(empty_message);
        out.push('\n');
    }
    for row in rows {
        out.push_str(&format_line(row));
        out.push('\n');
    }
    out
}

/// JSON 格式输出
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// YAML 格式输出
pub fn render_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// 根据格式参数选择输出方式
pub fn output_formatted<T: TableRow + Serialize>(
    items: &[T],
    format: OutputFormat,
    empty_message: &str,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => render_json(items)?,
        OutputFormat::Yaml => render_yaml(items)?,
        OutputFormat::Table => render_table(items, empty_message),
    };
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
