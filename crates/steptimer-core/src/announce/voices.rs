//! Voice discovery for the supported TTS programs.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voice {
    /// Identifier passed to the program's voice flag.
    pub id: String,
    /// Language tag, e.g. `ja_JP` or `ja`.
    pub language: String,
}

/// Parse `say -v ?` output:
///
/// ```text
/// Kyoko               ja_JP    # こんにちは、私の名前はKyokoです。
/// Bad News            en_US    # The light you see at the end of the tunnel...
/// ```
pub fn parse_say_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let entry = line.split('#').next()?.trim();
            let (name, language) = entry.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() || language.is_empty() {
                return None;
            }
            Some(Voice {
                id: name.to_string(),
                language: language.to_string(),
            })
        })
        .collect()
}

/// Parse `espeak-ng --voices` output. The header row is skipped; the
/// language column doubles as the voice id.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  ja              --/M      Japanese           jpx/ja
/// ```
pub fn parse_espeak_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _priority = cols.next()?;
            let language = cols.next()?;
            Some(Voice {
                id: language.to_string(),
                language: language.to_string(),
            })
        })
        .collect()
}

/// First voice whose language tag starts with `language`, case-insensitively.
pub fn pick_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    let wanted = language.to_lowercase();
    voices
        .iter()
        .find(|v| v.language.to_lowercase().starts_with(&wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAY: &str = "\
Alex                en_US    # Most people recognize me by my voice.
Bad News            en_US    # The light you see at the end of the tunnel is the headlamp of a fast approaching train.
Kyoko               ja_JP    # こんにちは、私の名前はKyokoです。
";

    const ESPEAK: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
 5  ja              --/M      Japanese           jpx/ja
";

    #[test]
    fn parses_say_output_with_spaces_in_names() {
        let voices = parse_say_voices(SAY);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].id, "Bad News");
        assert_eq!(voices[2].language, "ja_JP");
    }

    #[test]
    fn parses_espeak_output() {
        let voices = parse_espeak_voices(ESPEAK);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].id, "ja");
    }

    #[test]
    fn picks_matching_language_or_none() {
        let voices = parse_say_voices(SAY);
        assert_eq!(pick_voice(&voices, "ja").unwrap().id, "Kyoko");
        assert_eq!(pick_voice(&voices, "EN").unwrap().id, "Alex");
        assert!(pick_voice(&voices, "fr").is_none());
        assert!(pick_voice(&[], "ja").is_none());
    }
}
