pub mod claude_llm;
pub mod db;
pub mod gemini_llm;
pub mod gpt_llm;
pub mod storage;

pub use claude_llm::ClaudeAdapter;
pub use db::DbAdapter;
pub use gemini_llm::GeminiAdapter;
pub use gpt_llm::OpenAiGptAdapter;
pub use storage::LocalStorageAdapter;
