// ==========================================
// 服务中心库存导入 - 文本标准化
// ==========================================
// 职责: 表头 / 仓库标识的大小写、重音、空白不敏感比较
// 规则: 去重音 → '_' 视为空格 → 连续空白折叠 → 大写 → 去首尾空白
// 性质: 纯函数，幂等
// ==========================================

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 标准化文本
///
/// # 示例
/// - "  código_repuesto " → "CODIGO REPUESTO"
/// - "Centro  de\tServicio" → "CENTRO DE SERVICIO"
pub fn normalize_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;

    // NFD 分解后重音为独立的组合符号
    for ch in value.nfd() {
        if is_combining_mark(ch) {
            continue;
        }

        if ch == '_' || ch.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;

        push_upper_base(&mut out, ch);
    }

    out
}

/// 大写后再次分解并去除组合符号（如 'ǰ' 大写为 'J' + U+030C）
fn push_upper_base(out: &mut String, ch: char) {
    for upper in ch.to_uppercase() {
        for base in std::iter::once(upper).nfd() {
            if is_combining_mark(base) {
                continue;
            }
            out.push(fold_stroke(base));
        }
    }
}

/// NFD 不分解的带笔画字母 → 基础字母
fn fold_stroke(ch: char) -> char {
    match ch {
        'Ł' => 'L',
        'Ø' => 'O',
        'Đ' | 'Ð' => 'D',
        'Ħ' => 'H',
        'Ŧ' => 'T',
        'Ƶ' => 'Z',
        'Ɨ' => 'I',
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_accents_and_uppercase() {
        assert_eq!(normalize_text("código"), "CODIGO");
        assert_eq!(normalize_text("Ubicación"), "UBICACION");
        assert_eq!(normalize_text("año"), "ANO");
    }

    #[test]
    fn test_decomposed_accents() {
        // "e" + U+0301
        assert_eq!(normalize_text("descripcio\u{0301}n"), "DESCRIPCION");
    }

    #[test]
    fn test_underscore_and_whitespace() {
        assert_eq!(normalize_text("  codigo_repuesto  "), "CODIGO REPUESTO");
        assert_eq!(normalize_text("CENTRO   DE\tSERVICIO"), "CENTRO DE SERVICIO");
        assert_eq!(normalize_text("bodega__cs"), "BODEGA CS");
        assert_eq!(normalize_text("a\u{00A0}b"), "A B");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("  _ "), "");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "Código_Repuesto",
            "  centro de  servicio",
            "Bodega CS-08",
            "ñandú",
            "ǰ",
            "Şişli",
            "Łódź",
            "øre",
            "București",
            "ţară",
            "đakovo",
        ] {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once, "input {:?}", input);
            assert!(!once.chars().any(is_combining_mark), "input {:?}", input);
        }
    }

    #[test]
    fn test_combining_mark_from_uppercase_is_dropped() {
        assert_eq!(normalize_text("ǰ"), "J");
    }

    #[test]
    fn test_cedilla_comma_and_stroke_letters() {
        assert_eq!(normalize_text("Şişli"), "SISLI");
        assert_eq!(normalize_text("Łódź"), "LODZ");
        assert_eq!(normalize_text("øre"), "ORE");
        assert_eq!(normalize_text("București"), "BUCURESTI");
        assert_eq!(normalize_text("ţară"), "TARA");
        assert_eq!(normalize_text("đakovo"), "DAKOVO");
    }
}
