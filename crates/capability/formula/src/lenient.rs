//! 宽松公式校验（token 剥离）
//!
//! 从原始字符串开始反复剥离：
//! 1. 白名单函数名（长名优先，`roundn` 先于 `round`）
//! 2. 白名单运算符（多字符运算符优先）
//! 3. 数字、小数点、空白、逗号
//! 4. 变量字母 A..H（大小写不敏感）
//!
//! 直到字符串为空（合法）或一轮下来没有任何变化（非法）。
//! 这是词法白名单，不检查括号配对、参数个数或 `?:` 结构。

use std::cmp::Reverse;
use std::sync::OnceLock;

/// 允许的函数名（区分大小写，小写）。
pub const FUNCTIONS: [&str; 41] = [
    "min", "max", "avg", "sum", "abs", "ceil", "floor", "round", "roundn", "exp", "log", "log10",
    "logn", "root", "sqrt", "clamp", "inrange", "sin", "cos", "tan", "acos", "asin", "atan",
    "atan2", "cosh", "cot", "csc", "sec", "sinh", "tanh", "mand", "mor", "nand", "nor", "not",
    "or", "xor", "xnor", "pi", "epsilon", "inf",
];

/// 允许的运算符，多字符在前。
pub const OPERATORS: [&str; 17] = [
    "<=", ">=", "==", "!=", "+", "-", "*", "/", "%", "^", "(", ")", "?", ":", "<", ">", ",",
];

fn functions_longest_first() -> &'static [&'static str] {
    static SORTED: OnceLock<Vec<&'static str>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut names = FUNCTIONS.to_vec();
        names.sort_by_key(|name| Reverse(name.len()));
        names
    })
}

/// 宽松校验：剥离全部白名单 token 后无剩余字符即合法。
///
/// 空串没有剩余字符，因此合法；拒绝空公式由提交语法负责。
pub fn is_valid_formula(expr: &str) -> bool {
    let mut rest = expr.to_string();
    loop {
        let before = rest.len();
        for name in functions_longest_first() {
            if rest.contains(name) {
                rest = rest.replace(name, "");
            }
        }
        for op in OPERATORS {
            if rest.contains(op) {
                rest = rest.replace(op, "");
            }
        }
        rest.retain(|ch| !(ch.is_ascii_digit() || ch == '.' || ch == ',' || ch.is_whitespace()));
        rest.retain(|ch| !matches!(ch.to_ascii_lowercase(), 'a'..='h'));
        if rest.is_empty() {
            return true;
        }
        if rest.len() == before {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_names_strip_first() {
        // `round` 先剥离会留下 `n`
        assert!(is_valid_formula("roundn(A, 2)"));
        assert!(is_valid_formula("log10(B)"));
        assert!(is_valid_formula("xnor(A, B)"));
        assert!(is_valid_formula("inrange(0, A, 10)"));
    }

    #[test]
    fn sorted_names_put_longest_first() {
        let names = functions_longest_first();
        assert_eq!(names.len(), 41);
        assert_eq!(names[0].len(), 7);
    }
}
