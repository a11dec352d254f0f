//! Type graph and its collaborators for Weft.
//! Weft 的类型图及其协作组件。
//!
//! This crate holds everything the resolution engine consumes but does not
//! define itself:
//! 本 crate 包含解析引擎所使用但并不由其定义的所有组件：
//!
//! - `TypeGraph`: the mutable registry of types and edges / 类型与边的可变注册表
//! - `InferenceCollector`: the ordered set of inference rules / 有序的推断规则集合
//! - `TypeInitializer`: multi-phase type construction / 多阶段类型构建
//! - `Printer`: human-readable rendering / 可读的渲染输出
//! - Comparison strategies for assignability and equality / 可赋值性与相等性的比较策略

mod comparison;
mod graph;
mod inference;
mod initializer;
mod printer;
mod ty;

pub use comparison::{
    ComparisonStrategy, EdgeAssignability, GraphComparisons, IdentityEquality, StrategyFactory,
    TypeMismatch, TypeRelation,
};
pub use graph::{GraphError, TypeGraph, TypeGraphListener};
pub use inference::{
    FnRule, InferenceCollector, InferenceListener, InferenceProblem, InferenceRule, RuleId,
    RuleOutcome,
};
pub use initializer::TypeInitializer;
pub use printer::{DebugPrinter, Printer};
pub use ty::{EdgeKind, Type, TypeEdge};
