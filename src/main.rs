use clap::Parser;
use std::io::{BufRead, Write};
use tidy_agent::domain::ports::{ConfigProvider, ModelClient};
use tidy_agent::utils::error::ErrorSeverity;
use tidy_agent::utils::{logger, validation::Validate};
use tidy_agent::{
    CleanerError, CleaningEngine, CliConfig, Dataset, GeminiClient, LocalStorage, API_KEY_ENV,
};

// 錯誤嚴重度對應退出碼
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    // .env 支援：金鑰只從環境讀取
    let env_loaded = dotenvy::dotenv().ok();

    tracing::info!("Starting tidy-agent");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(e.severity()));
    }

    // 金鑰缺失是致命前置條件，直接終止
    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            let e = CleanerError::MissingConfigError {
                field: API_KEY_ENV.to_string(),
            };
            tracing::error!("❌ {}", e);
            match env_loaded {
                Some(path) => tracing::debug!("🔍 .env probed at: {}", path.display()),
                None => tracing::debug!("🔍 No .env file found near the working directory"),
            }
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    };

    // 載入資料集
    let dataset = match Dataset::from_path(&config.input) {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!("❌ Failed to load {}: {}", config.input, e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    };

    let (rows, columns) = dataset.shape();
    println!("📂 Loaded {} ({} rows, {} columns)", config.input, rows, columns);
    println!("{}", dataset.head_text(5));

    let client = GeminiClient::new(config.api_endpoint(), api_key);
    let storage = LocalStorage::new(config.output_path.clone());
    let mut engine = CleaningEngine::new_with_monitoring(client, config.clone(), config.monitor);
    engine.load_dataset(dataset);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        println!("  [1] Run AI audit");
        println!("  [2] Review issues and deselect");
        println!("  [3] Generate script and clean");
        println!("  [4] Show result");
        println!("  [5] Export clean CSV");
        println!("  [q] Quit");
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        match line?.trim() {
            "1" => match engine.run_audit().await {
                Ok(0) => println!("✅ No issues to review."),
                Ok(count) => {
                    println!("🔍 The AI detected {} issues:", count);
                    print_issues(&engine);
                }
                Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
            },
            "2" => {
                if engine.session().issues().is_empty() {
                    println!("Run the audit first.");
                    continue;
                }
                print_issues(&engine);
                print!("Issue numbers to exclude (comma separated, empty keeps all): ");
                std::io::stdout().flush()?;
                let Some(answer) = lines.next() else { break };
                let included = parse_exclusions(&answer?, engine.session().issues().len());
                match engine.apply_selection(&included) {
                    Ok(count) => println!(
                        "☑️ {} actions selected of {}.",
                        count,
                        engine.session().issues().len()
                    ),
                    Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
                }
            }
            "3" => {
                match engine.run_generate().await {
                    Ok(script) => {
                        println!("--- generated script ---");
                        println!("{}", script.source);
                        println!("------------------------");
                    }
                    Err(e) => {
                        eprintln!("❌ {}", e.user_friendly_message());
                        continue;
                    }
                }
                match engine.run_execute() {
                    Ok(shape) => {
                        println!("✅ Cleaning done, final shape: {:?}", shape);
                        print_comparison(&engine);
                    }
                    Err(e) => {
                        eprintln!("❌ {}", e.user_friendly_message());
                        eprintln!("💡 {}", e.recovery_suggestion());
                    }
                }
            }
            "4" => print_comparison(&engine),
            "5" => match engine.export(&storage).await {
                Ok(path) => println!("📥 Saved to {}", path),
                Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
            },
            "q" | "Q" => break,
            "" => continue,
            other => println!("Unknown choice: {}", other),
        }
    }

    Ok(())
}

fn print_issues<M: ModelClient, C: ConfigProvider>(engine: &CleaningEngine<M, C>) {
    for (i, issue) in engine.session().issues().iter().enumerate() {
        let mark = if engine.session().selected().contains(issue) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("  {} {}. {}", mark, i + 1, issue.display_line());
    }
}

fn print_comparison<M: ModelClient, C: ConfigProvider>(engine: &CleaningEngine<M, C>) {
    let Some(original) = engine.session().dataset() else {
        println!("Nothing loaded.");
        return;
    };
    let Some(cleaned) = engine.session().cleaned() else {
        println!("No cleaned result yet.");
        return;
    };

    println!("--- before ---");
    println!("{}", original.head_text(5));
    println!("--- after ---");
    println!("{}", cleaned.head_text(5));
    println!("Final shape: {:?}", cleaned.shape());
}

/// "2,4" 之類的輸入轉成 inclusion mask，編號從 1 開始
fn parse_exclusions(input: &str, issue_count: usize) -> Vec<bool> {
    let mut included = vec![true; issue_count];
    for token in input.split(',') {
        if let Ok(number) = token.trim().parse::<usize>() {
            if number >= 1 && number <= issue_count {
                included[number - 1] = false;
            }
        }
    }
    included
}
