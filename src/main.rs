//! Bee Tutor 命令行入口
//!
//! 用法：
//!   bee-tutor tutor <材料文件...>   基于材料答疑（PDF / txt / md）
//!   bee-tutor solver               求解优化问题
//!
//! 进入交互后逐行输入问题；exit / quit / q 退出。配置文件路径可用 BEE_CONFIG 指定。

use std::path::PathBuf;

use anyhow::{bail, Context};
use bee_tutor::core::create_agent_builder;
use bee_tutor::{observability, run_solver, run_tutor, AgentMode};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

fn usage() -> &'static str {
    "usage: bee-tutor tutor <materials...> | bee-tutor solver"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let mut args = std::env::args().skip(1);
    let mode: AgentMode = args
        .next()
        .context(usage())?
        .parse()
        .unwrap_or(AgentMode::Unknown);
    let materials: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if mode == AgentMode::Unknown {
        bail!(usage());
    }

    let config_path = std::env::var("BEE_CONFIG").ok().map(PathBuf::from);
    let orchestrator = create_agent_builder(config_path).build();

    if mode == AgentMode::Tutor {
        let store = orchestrator.store();
        let mut store = store.lock().await;
        for path in &materials {
            match store.load(path, false).await {
                Ok(s) => println!(
                    "已加载 {}：{} 页，{} 个文本块，{} 字符",
                    s.file_name, s.total_pages, s.total_chunks, s.total_characters
                ),
                Err(e) => eprintln!("加载失败 {}: {}", path.display(), e),
            }
        }
    }

    let prompt = match mode {
        AgentMode::Tutor => "问题> ",
        _ => "问题描述> ",
    };
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit" | "q") {
            break;
        }

        match mode {
            AgentMode::Tutor => {
                let answer = run_tutor(&orchestrator, input, materials.clone()).await;
                println!("\n{}\n", answer);
            }
            _ => {
                let outcome = run_solver(&orchestrator, input).await;
                println!("\n{}\n", outcome.solution);
                if outcome.reflections > 0 {
                    println!("(代码经过 {} 次修复)\n", outcome.reflections);
                }
            }
        }
    }

    if mode == AgentMode::Tutor {
        let store = orchestrator.store();
        let store = store.lock().await;
        let loaded = store.loaded_materials();
        if !loaded.is_empty() {
            println!("已缓存的材料：");
            for path in loaded {
                println!("- {}", path.display());
            }
        }
    }

    let (prompt_tokens, completion_tokens, total) = orchestrator.token_usage();
    tracing::info!(prompt_tokens, completion_tokens, total, "session finished");
    Ok(())
}
