//! 计算标签公式校验。
//!
//! 两套互相独立的语法并存：
//! - [`lenient`]：部署时使用的 token 剥离白名单，允许完整函数库；
//! - [`submit`]：提交时使用的严格字符集，只允许 A..H 上的四则运算与括号。
//!
//! 两者结论可能不一致（例如 `sin(A)` 宽松通过、严格拒绝），
//! 部署以宽松语法为准，严格语法供提交前预检。

pub mod lenient;
pub mod submit;

pub use lenient::{FUNCTIONS, OPERATORS, is_valid_formula};
pub use submit::{SubmitFormulaError, check_submit_formula, is_valid_submit_formula};
