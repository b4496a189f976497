//! Repair of double-encoded name fields
//!
//! Some upstream exporters wrote UTF-8 bytes that were later read back as
//! ISO-8859-1, so `José` arrives as `JosÃ©`. The repair maps every character
//! back to its single Latin-1 byte and decodes the result as UTF-8.

/// Undo one round of UTF-8-read-as-Latin-1 corruption.
///
/// Applied to every name. The input is returned unchanged whenever the
/// round trip is impossible: a character above U+00FF cannot be a Latin-1
/// byte, and a byte sequence that is not UTF-8 was never double-encoded.
pub fn repair_mojibake(value: &str) -> String {
    latin1_bytes(value)
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| value.to_string())
}

fn latin1_bytes(value: &str) -> Option<Vec<u8>> {
    value.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repairs_double_encoded_text() {
        assert_eq!(repair_mojibake("JosÃ©"), "José");
        assert_eq!(repair_mojibake("MÃ¼ller"), "Müller");
    }

    #[test]
    fn test_ascii_is_untouched() {
        assert_eq!(repair_mojibake("John Doe"), "John Doe");
        assert_eq!(repair_mojibake(""), "");
    }

    #[test]
    fn test_correct_latin_text_is_kept() {
        // 0xE9 alone is not valid UTF-8
        assert_eq!(repair_mojibake("José"), "José");
    }

    #[test]
    fn test_characters_outside_latin1_are_kept() {
        assert_eq!(repair_mojibake("李小龙"), "李小龙");
        assert_eq!(repair_mojibake("Zoë 😀"), "Zoë 😀");
    }

    #[test]
    fn test_repair_is_idempotent_once_fixed() {
        let once = repair_mojibake("JosÃ©");
        assert_eq!(repair_mojibake(&once), once);
    }
}
