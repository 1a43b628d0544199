/// Cleans one line of user input before it enters the transcript.
///
/// Newlines and double quotes are stripped first, then surrounding whitespace
/// is trimmed. Nothing else is touched and an empty result is returned as is.
pub fn sanitize(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '\n' | '"')).collect();
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::sanitize;

    #[test]
    fn strips_newlines_quotes_and_surrounding_whitespace() {
        assert_eq!(sanitize("  hello\nworld\"!  "), "helloworld!");
    }

    #[test]
    fn keeps_inner_whitespace_and_other_punctuation() {
        assert_eq!(sanitize("what's 2 + 2?\n"), "what's 2 + 2?");
        assert_eq!(sanitize("tab\there"), "tab\there");
    }

    #[test]
    fn empty_and_blank_input_become_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("  \n \"\" \n"), "");
    }

    #[test]
    fn sanitizing_twice_matches_sanitizing_once() {
        let samples = [
            "",
            "plain",
            "  padded  ",
            "\" quoted edge\"",
            "\"\n  \"",
            "a \n\"",
            "line one\r\nline two\r\n",
            "\u{a0}unicode space\u{a0}",
            "  hello\nworld\"!  ",
        ];

        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn quotes_next_to_whitespace_do_not_leave_padding() {
        assert_eq!(sanitize("\" a\""), "a");
    }
}
