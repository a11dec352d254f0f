//! Lazy type resolution and relation validation for Weft.
//! Weft 的惰性类型解析与类型关系验证。
//!
//! This crate implements the two event-driven halves of the engine:
//! 本 crate 实现了引擎中两个由事件驱动的部分：
//!
//! - Type references that resolve a selector as soon as the type graph or the
//!   inference rules allow it, and resolve again when their type goes away
//!   / 类型引用：一旦类型图或推断规则允许即解析选择器，类型被移除时重新解析
//! - Relation checks (assignable, equal, not equal) that turn comparison
//!   failures into severity-tagged validation problems
//!   / 类型关系检查：将比较失败转换为带严重级别的验证问题
//!
//! ## Example 示例
//!
//! ```
//! use weft_graph::Type;
//! use weft_typeck::TypeSystem;
//!
//! let system: TypeSystem<&str> = TypeSystem::with_defaults();
//! let field_type = system.reference("Person");
//! assert!(!field_type.is_resolved());
//!
//! let person = Type::new("Person");
//! system.graph().add_type(person.clone()).unwrap();
//! assert_eq!(field_type.get_type(), Some(person));
//! ```

mod collector;
mod config;
mod constraints;
mod errors;
mod problem;
mod reference;
mod selector;
mod system;

pub use collector::{ValidationCollector, ValidationRule};
pub use config::EngineConfig;
pub use constraints::{AnnotatedType, MessageProvider, Operand, ProblemDetails, ValidationConstraints};
pub use errors::SelectError;
pub use problem::{ProblemRecord, ValidationProblem};
pub use reference::{ReferenceView, TypeReference, TypeReferenceListener};
pub use selector::{TypeResolver, TypeSelector};
pub use system::TypeSystem;
