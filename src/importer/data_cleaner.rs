// ==========================================
// 服务中心库存导入 - 数据清洗器
// ==========================================
// 职责: 宽松数值解析（数量 / 单位成本）
// 规则: 无法解析或发生截断时标记为“默认值替换”，供汇总审计
// ==========================================

use rust_decimal::Decimal;
use std::str::FromStr;

/// 解析结果：值 + 是否发生默认值替换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleaned<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> Cleaned<T> {
    fn parsed(value: T) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    fn defaulted(value: T) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }
}

pub struct DataCleaner;

impl DataCleaner {
    /// 解析数量（整数，>= 0）
    ///
    /// - 去除千分位（','）与空白
    /// - 取前导整数部分（"12.7" → 12，"15 und" → 15），丢弃了非零尾部时计替换
    /// - "1.234" 不视为千分位，按截断处理（→ 1，计替换）
    /// - 空值 → 0（不计替换）；无法解析或负数 → 0（计替换）
    pub fn parse_quantity(&self, raw: &str) -> Cleaned<i64> {
        let cleaned: String = raw
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Cleaned::parsed(0);
        }

        let (negative, digits_part) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
        };
        let digits: String = digits_part.chars().take_while(|c| c.is_ascii_digit()).collect();
        let truncated = !is_zero_fraction(&digits_part[digits.len()..]);

        match digits.parse::<i64>() {
            Ok(0) if !truncated => Cleaned::parsed(0),
            Ok(_) if negative => Cleaned::defaulted(0),
            Ok(v) if truncated => Cleaned::defaulted(v),
            Ok(v) => Cleaned::parsed(v),
            Err(_) => Cleaned::defaulted(0),
        }
    }

    /// 解析单位成本（十进制）
    ///
    /// - 去除千分位（','）、货币符号与空白
    /// - 空值 → 0（不计替换）；无法解析 → 0（计替换）
    pub fn parse_unit_cost(&self, raw: &str) -> Cleaned<Decimal> {
        let cleaned: String = raw
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace() && !is_currency_symbol(*c))
            .collect();
        if cleaned.is_empty() {
            return Cleaned::parsed(Decimal::ZERO);
        }

        match Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned)) {
            Ok(v) => Cleaned::parsed(v),
            Err(_) => Cleaned::defaulted(Decimal::ZERO),
        }
    }

    /// 可选文本：去空白，空串 → None
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }
}

/// 整数后的剩余部分是否等价于无小数（"" / ".0" / ".00"）
fn is_zero_fraction(rest: &str) -> bool {
    match rest.strip_prefix('.') {
        Some(fraction) => fraction.chars().all(|c| c == '0'),
        None => rest.is_empty(),
    }
}

fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '€' | '£' | '¥' | '₡' | '₲' | '₱' | '₽' | '₹' | '¢')
}
