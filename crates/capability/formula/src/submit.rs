//! 提交时严格公式校验
//!
//! 只允许 `[A-Ha-h0-9+\-*/().]`，不允许空白与任何函数名，
//! 另外检查括号配对（任何前缀中右括号都不能多于左括号，结尾必须闭合）。

/// 严格校验失败原因。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitFormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unsupported character '{ch}' at position {position}")]
    UnsupportedCharacter { ch: char, position: usize },
    #[error("unmatched ')' at position {0}")]
    UnmatchedClose(usize),
    #[error("{0} unclosed '('")]
    Unclosed(usize),
}

fn is_allowed(ch: char) -> bool {
    matches!(ch, 'A'..='H' | 'a'..='h' | '0'..='9' | '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

/// 严格校验，返回第一处问题。
pub fn check_submit_formula(expr: &str) -> Result<(), SubmitFormulaError> {
    if expr.is_empty() {
        return Err(SubmitFormulaError::Empty);
    }
    let mut depth = 0usize;
    for (position, ch) in expr.chars().enumerate() {
        if !is_allowed(ch) {
            return Err(SubmitFormulaError::UnsupportedCharacter { ch, position });
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(SubmitFormulaError::UnmatchedClose(position))?;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err(SubmitFormulaError::Unclosed(depth));
    }
    Ok(())
}

pub fn is_valid_submit_formula(expr: &str) -> bool {
    check_submit_formula(expr).is_ok()
}
