// ==========================================
// 服务中心库存导入 - 文件解析器实现
// ==========================================
// 职责: 表格文件 → Vec<RawImportRow>（列名 → 值，保持列顺序）
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv，自动识别 ',' / ';' 分隔)
// ==========================================

use crate::domain::inventory::RawImportRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::inventory_importer_trait::FileParser;
use calamine::{Data, Ods, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// 表头所在物理行号
const HEADER_ROW_NUMBER: usize = 1;

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 依据首行判断分隔符（西语区导出的 CSV 常用 ';'）
    fn detect_delimiter(bytes: &[u8]) -> u8 {
        let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
        let semicolons = first_line.iter().filter(|b| **b == b';').count();
        let commas = first_line.iter().filter(|b| **b == b',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }

    /// 从内存字节解析
    pub fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawImportRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .delimiter(Self::detect_delimiter(bytes))
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row = RawImportRow::new(HEADER_ROW_NUMBER + idx + 1);

            for (col_idx, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let value = record.get(col_idx).unwrap_or("").trim();
                row.push(header.clone(), value);
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawImportRow>> {
        ensure_exists(file_path)?;

        let ext = file_extension(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(&bytes)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// 从内存字节解析（按扩展名选择格式）
    pub fn parse_bytes(&self, bytes: Vec<u8>, extension: &str) -> ImportResult<Vec<RawImportRow>> {
        let cursor = Cursor::new(bytes);
        match extension.to_lowercase().as_str() {
            "xlsx" | "xlsm" => Self::read_first_sheet(Xlsx::new(cursor)),
            "xls" => Self::read_first_sheet(Xls::new(cursor)),
            "ods" => Self::read_first_sheet(Ods::new(cursor)),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }

    /// 读取第一个工作表
    fn read_first_sheet<RS, R>(workbook: Result<R, R::Error>) -> ImportResult<Vec<RawImportRow>>
    where
        RS: Read + Seek,
        R: Reader<RS>,
        R::Error: std::fmt::Display,
    {
        let mut workbook =
            workbook.map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        Ok(Self::range_to_rows(&range))
    }

    fn range_to_rows(range: &Range<Data>) -> Vec<RawImportRow> {
        // 工作表可能不从 A1 开始
        let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        let mut iter = range.rows();
        let headers: Vec<String> = match iter.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| clean_header(&cell.to_string()))
                .collect(),
            None => return Vec::new(),
        };

        let mut rows = Vec::new();
        for (idx, data_row) in iter.enumerate() {
            // 物理行号: 工作表起始行(0基) + 表头行 + 数据偏移
            let mut row = RawImportRow::new(start_row + HEADER_ROW_NUMBER + idx + 1);

            for (col_idx, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let value = data_row
                    .get(col_idx)
                    .map(|cell| cell.to_string().trim().to_string())
                    .unwrap_or_default();
                row.push(header.clone(), value);
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        rows
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawImportRow>> {
        ensure_exists(file_path)?;

        let ext = file_extension(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xlsm" | "xls" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(bytes, &ext)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 从内存字节解析（上传场景）
    pub fn parse_bytes(&self, bytes: Vec<u8>, extension: &str) -> ImportResult<Vec<RawImportRow>> {
        match extension.to_lowercase().as_str() {
            "csv" => CsvParser.parse_bytes(&bytes),
            "xlsx" | "xlsm" | "xls" | "ods" => ExcelParser.parse_bytes(bytes, extension),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawImportRow>> {
        match file_extension(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_rows(file_path),
            "xlsx" | "xlsm" | "xls" | "ods" => ExcelParser.parse_to_raw_rows(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
