//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `BEE__*` 覆盖（双下划线表示嵌套，如 `BEE__SOLVER__EXEC_TIMEOUT_SECS=60`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub agents: AgentsSection,
    pub materials: MaterialsSection,
    pub tutor: TutorSection,
    pub solver: SolverSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock；优先级由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次模型调用超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    120
}

/// [agents.*] 段：三个角色各自的模型覆盖、温度与提示词
#[derive(Debug, Clone, Deserialize)]
pub struct AgentsSection {
    #[serde(default = "AgentProfile::tutor")]
    pub tutor: AgentProfile,
    #[serde(default = "AgentProfile::solver")]
    pub solver: AgentProfile,
    #[serde(default = "AgentProfile::code_executor")]
    pub code_executor: AgentProfile,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            tutor: AgentProfile::tutor(),
            solver: AgentProfile::solver(),
            code_executor: AgentProfile::code_executor(),
        }
    }
}

/// 单个角色：model 为空时使用 [llm].model，prompt 为空时使用内置提示词
#[derive(Debug, Clone, Deserialize)]
pub struct AgentProfile {
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub prompt: String,
}

fn default_temperature() -> f32 {
    0.7
}

impl AgentProfile {
    fn with_temperature(temperature: f32) -> Self {
        Self {
            model: None,
            temperature,
            prompt: String::new(),
        }
    }

    pub fn tutor() -> Self {
        Self::with_temperature(0.7)
    }

    pub fn solver() -> Self {
        Self::with_temperature(0.2)
    }

    pub fn code_executor() -> Self {
        Self::with_temperature(0.0)
    }

    /// 配置的提示词为空时使用内置默认值
    pub fn prompt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.prompt.trim().is_empty() {
            fallback
        } else {
            &self.prompt
        }
    }
}

/// [materials] 段：分块与嵌入
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialsSection {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    pub embedding_base_url: Option<String>,
}

impl Default for MaterialsSection {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding_model: default_embedding_model(),
            embedding_base_url: None,
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// [tutor] 段：工具调用循环的上限
#[derive(Debug, Clone, Deserialize)]
pub struct TutorSection {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// 工具调用达到此数后不再因「中间思考」而继续
    #[serde(default = "default_max_exploratory_tool_calls")]
    pub max_exploratory_tool_calls: usize,
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

impl Default for TutorSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_exploratory_tool_calls: default_max_exploratory_tool_calls(),
            default_top_k: default_top_k(),
        }
    }
}

fn default_max_iterations() -> usize {
    10
}

fn default_max_exploratory_tool_calls() -> usize {
    8
}

fn default_top_k() -> usize {
    3
}

/// [solver] 段：代码执行与反思
#[derive(Debug, Clone, Deserialize)]
pub struct SolverSection {
    #[serde(default = "default_max_reflections")]
    pub max_reflections: u32,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
    #[serde(default = "default_exec_timeout_secs")]
    pub exec_timeout_secs: u64,
    /// 超时/进程异常是否也进入反思重试（默认否：直接作为终止结果）
    #[serde(default)]
    pub reflect_on_timeout: bool,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            max_reflections: default_max_reflections(),
            interpreter: default_interpreter(),
            file_suffix: default_file_suffix(),
            exec_timeout_secs: default_exec_timeout_secs(),
            reflect_on_timeout: false,
        }
    }
}

fn default_max_reflections() -> u32 {
    3
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_file_suffix() -> String {
    ".py".to_string()
}

fn default_exec_timeout_secs() -> u64 {
    30
}

/// 从 config 目录加载配置，环境变量 BEE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 BEE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BEE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
