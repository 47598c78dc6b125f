use crate::utils::error::{CleanerError, Result};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// 二維標記表格。儲存格一律保留載入時的原始字串，型別只是推斷出的
/// 中繼資料，因此未清理的資料匯出時不會被改寫。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn is_null(cell: &str) -> bool {
    cell.trim().is_empty()
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(CleanerError::InputError {
                message: "dataset has no columns".to_string(),
            });
        }
        let width = headers.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(CleanerError::InputError {
                    message: format!(
                        "row {} has {} fields, expected {}",
                        i + 1,
                        row.len(),
                        width
                    ),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        Self::from_reader(&mut reader)
    }

    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data);
        Self::from_reader(&mut reader)
    }

    fn from_reader<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Self> {
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn null_count(&self, column: usize) -> usize {
        self.rows
            .iter()
            .filter(|row| is_null(&row[column]))
            .count()
    }

    /// 由非空儲存格推斷欄位型別：整數 → 浮點 → 布林 → 文字
    pub fn column_type(&self, column: usize) -> ColumnType {
        let mut saw_value = false;
        let mut all_int = true;
        let mut all_float = true;
        let mut all_bool = true;

        for row in &self.rows {
            let cell = row[column].trim();
            if is_null(cell) {
                continue;
            }
            saw_value = true;
            if cell.parse::<i64>().is_err() {
                all_int = false;
            }
            if cell.parse::<f64>().is_err() {
                all_float = false;
            }
            if !cell.eq_ignore_ascii_case("true") && !cell.eq_ignore_ascii_case("false") {
                all_bool = false;
            }
        }

        if !saw_value {
            ColumnType::Text
        } else if all_int {
            ColumnType::Integer
        } else if all_float {
            ColumnType::Float
        } else if all_bool {
            ColumnType::Boolean
        } else {
            ColumnType::Text
        }
    }

    pub fn type_map(&self) -> Vec<(String, ColumnType)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), self.column_type(i)))
            .collect()
    }

    /// 稽核提示用的欄位摘要：名稱、推斷型別、空值數
    pub fn schema_summary(&self) -> String {
        let mut out = String::new();
        for (i, name) in self.headers.iter().enumerate() {
            out.push_str(&format!(
                "- {} ({}, {} nulls)\n",
                name,
                self.column_type(i),
                self.null_count(i)
            ));
        }
        out
    }

    /// 前 n 列的純文字表格
    pub fn head_text(&self, n: usize) -> String {
        let mut out = String::new();
        out.push_str(&self.headers.join(" | "));
        out.push('\n');
        for row in self.rows.iter().take(n) {
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
        out
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| CleanerError::InputError {
                message: format!("CSV writer flush failed: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_csv_bytes(
            b"id,price,in_stock,label\n1,12.5,true,widget\n2,7,false,gadget\n3,,true,\n",
        )
        .unwrap()
    }

    #[test]
    fn test_shape_and_headers() {
        let ds = sample();
        assert_eq!(ds.shape(), (3, 4));
        assert_eq!(ds.headers(), &["id", "price", "in_stock", "label"]);
    }

    #[test]
    fn test_type_inference() {
        let ds = sample();
        assert_eq!(ds.column_type(0), ColumnType::Integer);
        assert_eq!(ds.column_type(1), ColumnType::Float);
        assert_eq!(ds.column_type(2), ColumnType::Boolean);
        assert_eq!(ds.column_type(3), ColumnType::Text);
    }

    #[test]
    fn test_null_counts() {
        let ds = sample();
        assert_eq!(ds.null_count(0), 0);
        assert_eq!(ds.null_count(1), 1);
        assert_eq!(ds.null_count(3), 1);
    }

    #[test]
    fn test_currency_column_is_text() {
        let ds =
            Dataset::from_csv_bytes(b"price\n$12.50\n$3.99\n").unwrap();
        assert_eq!(ds.column_type(0), ColumnType::Text);
    }

    #[test]
    fn test_csv_round_trip_is_byte_identical() {
        let input = b"id,name,price\n1,alpha,12.5\n2,beta,\n3,gamma,7\n";
        let ds = Dataset::from_csv_bytes(input).unwrap();
        let output = ds.to_csv_bytes().unwrap();
        assert_eq!(output, input.to_vec());
    }

    #[test]
    fn test_ragged_row_is_input_error() {
        let result = Dataset::from_csv_bytes(b"a,b\n1,2\n3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_head_text_limits_rows() {
        let ds = sample();
        let head = ds.head_text(2);
        assert!(head.contains("id | price | in_stock | label"));
        assert!(head.contains("1 | 12.5 | true | widget"));
        assert!(!head.contains("3 |  | true"));
    }
}
