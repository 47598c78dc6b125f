use crate::core::{CleaningScript, ColumnType, Issue, ModelClient};
use serde_json::json;

/// 程式碼生成回應的 schema：單一欄位，裸 Lua 原始碼
pub fn script_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "lua_script": {
                "type": "STRING",
                "description": "Complete executable Lua cleaning script, no markdown fences"
            }
        },
        "required": ["lua_script"]
    })
}

fn build_codegen_prompt(type_map: &[(String, ColumnType)], selected: &[Issue]) -> String {
    let issues_json = serde_json::to_string_pretty(selected).unwrap_or_else(|_| "[]".to_string());

    let mut body = String::new();
    body.push_str(
        "You are a senior developer writing a Lua data-cleaning script.\n\
         Generate a script that cleans a table held in the global variable 'df', applying ONLY these validated actions:\n",
    );
    body.push_str(&issues_json);
    body.push_str("\n\nCOLUMN TYPES:\n");
    for (name, column_type) in type_map {
        body.push_str(&format!("- {}: {}\n", name, column_type));
    }
    body.push_str(
        "\nENVIRONMENT:\n\
         - df.columns is an array of column names; df.rows is an array of records keyed by column name; every cell value is a string (empty string means missing).\n\
         - df.map(column, fn) rewrites one column, df.filter(predicate) keeps matching rows, df.drop_duplicates() removes exact duplicate rows.\n\
         - math is the numeric library; re.gsub(s, pattern, replacement), re.match(s, pattern) and re.is_match(s, pattern) expose regular expressions.\n\n\
         STRICT CONSTRAINTS:\n\
         1. The script must act directly on 'df'.\n\
         2. Use robust methods (tonumber with nil checks, regex cleanup for strings).\n\
         3. Do not perform destructive operations that the selected actions do not imply.\n\
         4. Return ONLY valid Lua source, no markdown.\n\
         5. AVAILABLE LIBRARIES: df, math, re. Use NOTHING else.\n",
    );
    body
}

/// 空選擇必須短路回傳 no-op，完全不碰模型；模型失敗時回傳註解
/// 佔位腳本，讓失敗原因顯示在產出的程式碼裡
pub async fn generate<M: ModelClient>(
    type_map: &[(String, ColumnType)],
    selected: &[Issue],
    client: &M,
    model: &str,
) -> CleaningScript {
    if selected.is_empty() {
        tracing::info!("✨ No actions selected, emitting no-op script");
        return CleaningScript::noop();
    }

    let prompt = build_codegen_prompt(type_map, selected);

    match client.invoke(model, &prompt, &script_schema()).await {
        Ok(value) => match value.get("lua_script").and_then(|v| v.as_str()) {
            Some(source) => CleaningScript::generated(source.to_string()),
            None => {
                tracing::error!("❌ Codegen response was missing the lua_script field");
                CleaningScript::failure_placeholder("response was missing the lua_script field")
            }
        },
        Err(e) => {
            tracing::error!("❌ Codegen model call failed: {}", e);
            CleaningScript::failure_placeholder(&e.to_string())
        }
    }
}
