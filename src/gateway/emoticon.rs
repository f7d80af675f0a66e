//! Emoticon glyphs for the LCD.
//!
//! Tags outside the table are still displayed: they map to [`UNKNOWN_EMOTICON`].

/// Glyph shown for an unrecognised tag.
pub const UNKNOWN_EMOTICON: &str = "Unknown emoticon type";

/// Tag to glyph. Trailing spaces are significant; the LCD pads by position.
pub const EMOTICONS: &[(&str, &str)] = &[
    (
        "happy",
        "   /^v^v^v^\\    \n  |  ^   ^  |   \n  \\___v___/     ",
    ),
    (
        "wink",
        "   /^v^v^v^\\   \n  |  -   o  |  \n   \\___^___/   ",
    ),
    (
        "surprised",
        "   /^v^v^v^\\   \n  |  O   O  |  \n   \\___o___/   ",
    ),
    (
        "angry",
        "   /^v^v^v^\\   \n  |  >   <  |  \n   \\___-___/   ",
    ),
    (
        "sleepy",
        "   /^v^v^v^\\   \n  |  -   -  |  \n   \\___~___/   ",
    ),
    (
        "crying",
        "   /^v^v^v^\\   \n  |  Q   Q  |  \n   \\__TT___/   ",
    ),
    (
        "playful",
        "   /^v^v^v^\\   \n  |  ^   -  |  \n   \\___P___/   ",
    ),
    (
        "cute",
        "   /^v^v^v^\\   \n  |  *   *  |  \n   \\___w___/   ",
    ),
    (
        "thinking",
        "   /^v^v^v^\\   \n  |  ?   ?  |  \n   \\___o___/   ",
    ),
    (
        "love",
        "   /^v^v^v^\\   \n  |  <   >  |  \n   \\__{3}__/   ",
    ),
];

/// Glyph for a known tag.
pub fn lookup(tag: &str) -> Option<&'static str> {
    EMOTICONS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, glyph)| *glyph)
}

/// Glyph for any tag, falling back to [`UNKNOWN_EMOTICON`].
pub fn glyph_for(tag: &str) -> &'static str {
    lookup(tag).unwrap_or(UNKNOWN_EMOTICON)
}

/// All known tags, in table order.
pub fn tags() -> impl Iterator<Item = &'static str> {
    EMOTICONS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_ten_unique_tags() {
        let mut all: Vec<_> = tags().collect();
        assert_eq!(all.len(), 10);
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_every_glyph_is_three_lines() {
        for (tag, glyph) in EMOTICONS {
            assert_eq!(glyph.lines().count(), 3, "{tag}");
            assert!(glyph.starts_with("   /^v^v^v^\\"), "{tag}");
        }
    }

    #[test]
    fn test_happy_glyph_literal() {
        assert_eq!(
            glyph_for("happy"),
            "   /^v^v^v^\\    \n  |  ^   ^  |   \n  \\___v___/     "
        );
    }

    #[test]
    fn test_love_glyph_literal() {
        assert_eq!(
            glyph_for("love"),
            "   /^v^v^v^\\   \n  |  <   >  |  \n   \\__{3}__/   "
        );
    }

    #[test]
    fn test_unknown_tag_falls_back() {
        assert!(lookup("sad").is_none());
        assert_eq!(glyph_for("sad"), UNKNOWN_EMOTICON);
        assert_eq!(glyph_for(""), UNKNOWN_EMOTICON);
        assert_eq!(glyph_for("HAPPY"), UNKNOWN_EMOTICON);
    }
}
