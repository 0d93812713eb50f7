//! 引擎注册表
//!
//! 注册只在构造阶段进行（需要 `&mut self`），之后注册表被放进 `Arc`
//! 冻结，只供并发读取。同一引擎重复注册时后注册的覆盖先注册的，测试替身
//! 可以借此替换正式实现。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::translation::core::engine::{EngineName, Translator};

#[derive(Default)]
pub struct EngineRegistry {
    engines: BTreeMap<EngineName, Arc<dyn Translator>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册翻译器，以其声明的引擎标识为键
    pub fn register(&mut self, translator: Arc<dyn Translator>) {
        let engine = translator.engine();
        if self.engines.insert(engine, translator).is_some() {
            tracing::debug!("引擎 {} 的翻译器已被替换", engine);
        } else {
            tracing::debug!("注册翻译引擎: {}", engine);
        }
    }

    pub fn resolve(&self, engine: EngineName) -> Option<Arc<dyn Translator>> {
        self.engines.get(&engine).cloned()
    }

    pub fn contains(&self, engine: EngineName) -> bool {
        self.engines.contains_key(&engine)
    }

    /// 已注册的引擎，按固定顺序
    pub fn engines(&self) -> Vec<EngineName> {
        self.engines.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
