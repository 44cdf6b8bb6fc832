//! Hiragana/katakana script handling
//!
//! Attendee kana names are recorded in katakana, but operators type
//! whichever script is fastest. Queries are therefore folded from the
//! hiragana block into the katakana block before matching.

/// First and last code points of the hiragana letters that have a direct
/// katakana counterpart at a fixed +0x60 offset (ぁ..ゖ).
const HIRAGANA_FIRST: char = '\u{3041}';
const HIRAGANA_LAST: char = '\u{3096}';
const KANA_OFFSET: u32 = 0x60;

/// Map every hiragana letter to its katakana counterpart; everything else
/// passes through unchanged. Folding an already-katakana string is a
/// no-op.
///
/// # Examples
/// ```
/// # use frontdesk_core::matcher::kana::hiragana_to_katakana;
/// assert_eq!(hiragana_to_katakana("たなか"), "タナカ");
/// assert_eq!(hiragana_to_katakana("タナカ"), "タナカ");
/// assert_eq!(hiragana_to_katakana("smith"), "smith");
/// ```
pub fn hiragana_to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if (HIRAGANA_FIRST..=HIRAGANA_LAST).contains(&c) {
                // Offset shift within the BMP cannot produce an invalid
                // scalar value.
                char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Rough script classification of operator input, used to decide which
/// name field a no-match query should prefill on a new registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Katakana,
    Hiragana,
    Other,
}

/// Katakana wins over hiragana when both are present, matching the
/// prefill behavior the desk expects for mixed input.
pub fn classify(s: &str) -> Script {
    let has_katakana = s
        .chars()
        .any(|c| ('\u{30A1}'..='\u{30F6}').contains(&c) || c == 'ー');
    if has_katakana {
        return Script::Katakana;
    }
    let has_hiragana = s.chars().any(|c| ('\u{3041}'..='\u{3093}').contains(&c));
    if has_hiragana {
        Script::Hiragana
    } else {
        Script::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fold_basic() {
        assert_eq!(hiragana_to_katakana("たなかたろう"), "タナカタロウ");
        assert_eq!(hiragana_to_katakana("ぁゖ"), "ァヶ");
    }

    #[test]
    fn test_fold_idempotent_on_katakana() {
        let katakana = "タナカタロウ";
        assert_eq!(hiragana_to_katakana(katakana), katakana);
        assert_eq!(
            hiragana_to_katakana(&hiragana_to_katakana("たなか")),
            "タナカ"
        );
    }

    #[test]
    fn test_fold_passes_through_other_scripts() {
        assert_eq!(hiragana_to_katakana("田中 Taro 123"), "田中 Taro 123");
        // Prolonged sound mark and punctuation are outside the block.
        assert_eq!(hiragana_to_katakana("ー・"), "ー・");
    }

    #[test]
    fn test_fold_mixed_input() {
        assert_eq!(hiragana_to_katakana("田中たろう"), "田中タロウ");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("タナカ"), Script::Katakana);
        assert_eq!(classify("たなか"), Script::Hiragana);
        assert_eq!(classify("田中"), Script::Other);
        assert_eq!(classify("smith"), Script::Other);
        // Prolonged sound mark alone counts as katakana.
        assert_eq!(classify("ー"), Script::Katakana);
        // Katakana takes precedence over hiragana in mixed input.
        assert_eq!(classify("たなかタロウ"), Script::Katakana);
    }
}
