use crate::core::Dataset;
use crate::utils::error::{CleanerError, Result};
use mlua::{Lua, Table, Value as LuaValue};

/// 腳本裡資料表的固定名稱，執行後以同名全域讀回結果
const WORKING_NAME: &str = "df";

// Lua 端的表格操作輔助函式。df 綁定後、腳本執行前載入。
const DF_PRELUDE: &str = r#"
function df.map(column, fn)
    for _, row in ipairs(df.rows) do
        row[column] = fn(row[column])
    end
end

function df.filter(predicate)
    local kept = {}
    for _, row in ipairs(df.rows) do
        if predicate(row) then
            kept[#kept + 1] = row
        end
    end
    df.rows = kept
end

function df.drop_duplicates()
    local seen = {}
    local kept = {}
    for _, row in ipairs(df.rows) do
        local parts = {}
        for _, column in ipairs(df.columns) do
            parts[#parts + 1] = tostring(row[column] or "")
        end
        local key = table.concat(parts, "\0")
        if not seen[key] then
            seen[key] = true
            kept[#kept + 1] = row
        end
    end
    df.rows = kept
end
"#;

fn script_error(e: mlua::Error) -> CleanerError {
    CleanerError::ScriptError {
        message: e.to_string(),
    }
}

/// Runs the cleaning script against a full copy of the dataset. The scope
/// exposes only `df`, `math` and `re` on top of the base language; dangerous
/// globals are removed. No execution boundary beyond that: no instruction
/// budget, no timeout, no process isolation.
pub fn execute(script: &str, dataset: &Dataset) -> Result<Dataset> {
    let lua = Lua::new();

    strip_globals(&lua).map_err(script_error)?;
    install_regex_module(&lua).map_err(script_error)?;
    bind_dataset(&lua, dataset).map_err(script_error)?;

    lua.load(DF_PRELUDE)
        .set_name("prelude")
        .exec()
        .map_err(script_error)?;

    lua.load(script)
        .set_name("cleaning")
        .exec()
        .map_err(script_error)?;

    read_back(&lua)
}

// 與 Python exec 等價的弱邊界：拿掉檔案系統、程序與載入器入口，
// 留下 basic/string/table/math
fn strip_globals(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();
    for name in ["os", "io", "debug", "package", "require", "loadfile", "dofile", "load"] {
        globals.set(name, LuaValue::Nil)?;
    }
    Ok(())
}

/// `re` 模組：以 regex crate 支撐的三個函式
fn install_regex_module(lua: &Lua) -> mlua::Result<()> {
    let re = lua.create_table()?;

    re.set(
        "is_match",
        lua.create_function(|_, (text, pattern): (String, String)| {
            let regex = regex::Regex::new(&pattern).map_err(mlua::Error::external)?;
            Ok(regex.is_match(&text))
        })?,
    )?;

    re.set(
        "match",
        lua.create_function(|_, (text, pattern): (String, String)| {
            let regex = regex::Regex::new(&pattern).map_err(mlua::Error::external)?;
            Ok(regex.find(&text).map(|m| m.as_str().to_string()))
        })?,
    )?;

    re.set(
        "gsub",
        lua.create_function(
            |_, (text, pattern, replacement): (String, String, String)| {
                let regex = regex::Regex::new(&pattern).map_err(mlua::Error::external)?;
                Ok(regex.replace_all(&text, replacement.as_str()).into_owned())
            },
        )?,
    )?;

    lua.globals().set("re", re)
}

fn bind_dataset(lua: &Lua, dataset: &Dataset) -> mlua::Result<()> {
    let df = lua.create_table()?;

    let columns = lua.create_table()?;
    for (i, header) in dataset.headers().iter().enumerate() {
        columns.set(i + 1, header.as_str())?;
    }
    df.set("columns", columns)?;

    let rows = lua.create_table()?;
    for (i, row) in dataset.rows().iter().enumerate() {
        let record = lua.create_table()?;
        for (header, cell) in dataset.headers().iter().zip(row) {
            record.set(header.as_str(), cell.as_str())?;
        }
        rows.set(i + 1, record)?;
    }
    df.set("rows", rows)?;

    lua.globals().set(WORKING_NAME, df)
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn lua_value_to_cell(value: &LuaValue) -> Result<String> {
    match value {
        LuaValue::Nil => Ok(String::new()),
        LuaValue::Boolean(b) => Ok(b.to_string()),
        LuaValue::Integer(i) => Ok(i.to_string()),
        LuaValue::Number(n) => Ok(format_number(*n)),
        LuaValue::String(s) => Ok(s.to_string_lossy().to_string()),
        other => Err(CleanerError::ScriptError {
            message: format!("unsupported cell type '{}' in result table", other.type_name()),
        }),
    }
}

fn read_back(lua: &Lua) -> Result<Dataset> {
    let df: Table = lua
        .globals()
        .get(WORKING_NAME)
        .map_err(|_| CleanerError::ScriptError {
            message: format!("script did not leave a table named '{}'", WORKING_NAME),
        })?;

    let columns: Table = df.get("columns").map_err(|_| CleanerError::ScriptError {
        message: format!("'{}.columns' is missing or not a table", WORKING_NAME),
    })?;
    let headers = columns
        .sequence_values::<String>()
        .collect::<mlua::Result<Vec<_>>>()
        .map_err(script_error)?;

    let rows_table: Table = df.get("rows").map_err(|_| CleanerError::ScriptError {
        message: format!("'{}.rows' is missing or not a table", WORKING_NAME),
    })?;

    let mut rows = Vec::new();
    for record in rows_table.sequence_values::<Table>() {
        let record = record.map_err(script_error)?;
        let mut row = Vec::with_capacity(headers.len());
        for header in &headers {
            let value: LuaValue = record.get(header.as_str()).map_err(script_error)?;
            row.push(lua_value_to_cell(&value)?);
        }
        rows.push(row);
    }

    Dataset::new(headers, rows).map_err(|e| CleanerError::ScriptError {
        message: format!("result table is not a valid dataset: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_csv_bytes(
            b"id,price,quantity\n1,$12.50,3\n2,$8.00,-1\n3,$8.00,-1\n",
        )
        .unwrap()
    }

    #[test]
    fn test_noop_script_returns_equal_copy() {
        let original = sample();
        let cleaned = execute("-- no cleaning actions selected\n", &original).unwrap();
        assert_eq!(cleaned, original);
    }

    #[test]
    fn test_execute_never_mutates_input() {
        let original = sample();
        let snapshot = original.clone();

        let _ = execute(
            "df.map('price', function(v) return re.gsub(v, '[$]', '') end)\ndf.filter(function(row) return tonumber(row.quantity) > 0 end)",
            &original,
        )
        .unwrap();

        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_currency_cleanup_leaves_numeric_column() {
        let cleaned = execute(
            "df.map('price', function(v) return re.gsub(v, '[^0-9.]', '') end)",
            &sample(),
        )
        .unwrap();

        let price_index = 1;
        for row in cleaned.rows() {
            assert!(row[price_index].parse::<f64>().is_ok());
            assert!(!row[price_index].contains('$'));
        }
        assert_eq!(
            cleaned.column_type(price_index),
            crate::core::ColumnType::Float
        );
    }

    #[test]
    fn test_filter_drops_rows() {
        let cleaned = execute(
            "df.filter(function(row) return tonumber(row.quantity) > 0 end)",
            &sample(),
        )
        .unwrap();
        assert_eq!(cleaned.shape(), (1, 3));
        assert_eq!(cleaned.rows()[0][0], "1");
    }

    #[test]
    fn test_drop_duplicates() {
        let cleaned = execute("df.drop_duplicates()", &sample()).unwrap();
        assert_eq!(cleaned.shape(), (2, 3));
    }

    #[test]
    fn test_numeric_results_are_stringified() {
        let cleaned = execute(
            "df.map('quantity', function(v) return math.abs(tonumber(v)) end)",
            &sample(),
        )
        .unwrap();
        assert_eq!(cleaned.rows()[1][2], "1");
    }

    #[test]
    fn test_syntax_error_is_script_error() {
        let result = execute("this is not lua", &sample());
        assert!(matches!(result, Err(CleanerError::ScriptError { .. })));
    }

    #[test]
    fn test_runtime_error_is_script_error() {
        let result = execute("error('boom')", &sample());
        match result {
            Err(CleanerError::ScriptError { message }) => assert!(message.contains("boom")),
            other => panic!("expected ScriptError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_removing_working_table_is_script_error() {
        let result = execute("df = nil", &sample());
        match result {
            Err(CleanerError::ScriptError { message }) => {
                assert!(message.contains("df"));
            }
            other => panic!("expected ScriptError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_dangerous_globals_are_stripped() {
        let script = "\
            assert(os == nil, 'os leaked')\n\
            assert(io == nil, 'io leaked')\n\
            assert(require == nil, 'require leaked')\n\
            assert(load == nil, 'load leaked')\n";
        assert!(execute(script, &sample()).is_ok());
    }

    #[test]
    fn test_invalid_regex_pattern_is_script_error() {
        let result = execute(
            "df.map('price', function(v) return re.gsub(v, '[', '') end)",
            &sample(),
        );
        assert!(matches!(result, Err(CleanerError::ScriptError { .. })));
    }

    #[test]
    fn test_re_match_and_is_match() {
        let script = "\
            assert(re.is_match('$12.50', '^\\\\$'))\n\
            assert(re.match('$12.50', '[0-9]+\\\\.[0-9]+') == '12.50')\n\
            assert(re.match('abc', '[0-9]+') == nil)\n";
        assert!(execute(script, &sample()).is_ok());
    }

    #[test]
    fn test_added_column_reads_back() {
        let script = "\
            df.columns[#df.columns + 1] = 'total'\n\
            for _, row in ipairs(df.rows) do\n\
                row.total = 'n/a'\n\
            end\n";
        let cleaned = execute(script, &sample()).unwrap();
        assert_eq!(cleaned.headers().last().map(String::as_str), Some("total"));
        assert_eq!(cleaned.rows()[0][3], "n/a");
    }
}
