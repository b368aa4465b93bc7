use std::sync::Arc;

use assistant_core::AssistantService;

/// 全ハンドラで共有する状態（起動後は読み取り専用）
pub type AppState = Arc<AssistantService>;
