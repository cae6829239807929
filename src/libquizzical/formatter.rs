use html_escape::decode_html_entities;

/// Turns the entity-escaped text the trivia API sends (`&quot;`, `&#039;`, `&eacute;`, ...) into
/// display text. Anything that isn't a recognised character reference is left as-is.
pub fn decode(text: &str) -> String {
    decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn decodes_quotes_and_apostrophes() {
        assert_eq!(
            decode("Who said &quot;I&#039;ll be back&quot;?"),
            "Who said \"I'll be back\"?"
        );
    }

    #[test]
    fn decodes_named_accents() {
        assert_eq!(decode("Pok&eacute;mon"), "Pokémon");
        assert_eq!(decode("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(decode("AT&T"), "AT&T");
        assert_eq!(decode("2 < 3"), "2 < 3");
        assert_eq!(decode(""), "");
    }
}
