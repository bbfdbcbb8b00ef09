//! TalkBank MOR XML reader.
//!
//! A narrow reader for the Manchester-style transcript shape: `<u who=".."
//! uID="..">` blocks containing `<w>` word elements and `<t type=".."/>`
//! terminators. Word text is taken up to the first child element, so
//! embedded `<mor>` annotation is ignored. Terminators surface as
//! punctuation word-tokens (`type="p"` → `.`, `type="q"` → `?`) to match
//! what the downstream sanitizer expects; other terminator types carry no
//! token. No entity decoding: Manchester word tokens are plain text.

use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;

use crate::core::error::PipelineError;
use crate::core::utterance::{TranscriptParser, Utterance, WordToken};

static UTTERANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<u\b([^>]*)>(.*?)</u>").expect("utterance pattern compiles"));

static WHO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"who="([^"]+)""#).expect("who pattern compiles"));

static UID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"uID="([^"]+)""#).expect("uID pattern compiles"));

/// Word elements and terminators, in document order.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<w(?:\s[^>]*)?>([^<]*)|<t\s+type="([^"]+)""#).expect("token pattern compiles")
});

/// The shipped `TranscriptParser`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MorParser;

impl MorParser
{
    pub fn new() -> Self
    {
        Self
    }
}

impl TranscriptParser for MorParser
{
    /// All-or-nothing per file: unreadable files and utterances missing
    /// their identifying attributes fail the whole parse.
    fn parse(
        &self,
        path: &Utf8Path,
    ) -> Result<Vec<Utterance>, PipelineError>
    {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::Transcript {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

        let malformed = |reason: &str| PipelineError::Transcript {
            path: path.to_owned(),
            reason: reason.to_owned(),
        };

        let mut utterances = Vec::new();

        for caps in UTTERANCE.captures_iter(&text)
        {
            let attrs = &caps[1];
            let body = &caps[2];

            let speaker = WHO
                .captures(attrs)
                .map(|c| c[1].to_owned())
                .ok_or_else(|| malformed("utterance without who attribute"))?;

            let uid = UID
                .captures(attrs)
                .map(|c| c[1].to_owned())
                .ok_or_else(|| malformed("utterance without uID attribute"))?;

            let mut tokens = Vec::new();

            for token in TOKEN.captures_iter(body)
            {
                if let Some(word) = token.get(1)
                {
                    let word = word
                        .as_str()
                        .trim();

                    if !word.is_empty()
                    {
                        tokens.push(WordToken::new(word));
                    }
                }
                else if let Some(kind) = token.get(2)
                {
                    match kind.as_str()
                    {
                        "p" => tokens.push(WordToken::new(".")),
                        "q" => tokens.push(WordToken::new("?")),
                        _ =>
                        {}
                    }
                }
            }

            utterances.push(Utterance { uid, speaker, tokens });
        }

        Ok(utterances)
    }
}

#[cfg(test)]
mod tests
{
    use std::io::Write;

    use camino::Utf8PathBuf;

    use super::*;

    fn parse_str(xml: &str) -> Result<Vec<Utterance>, PipelineError>
    {
        let mut file = tempfile::Builder::new()
            .suffix(".xml")
            .tempfile()
            .unwrap();
        file.write_all(xml.as_bytes())
            .unwrap();
        file.flush()
            .unwrap();

        let path = Utf8PathBuf::from_path_buf(
            file.path()
                .to_path_buf(),
        )
        .unwrap();

        MorParser::new().parse(&path)
    }

    #[test]
    fn parses_words_and_terminators_in_order()
    {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<CHAT>
  <u who="MOT" uID="u0"><w>you</w><w>want</w><w>juice</w><t type="q"/></u>
  <u who="CHI" uID="u1"><w>juice</w><t type="p"/></u>
</CHAT>"#;

        let utts = parse_str(xml).unwrap();

        assert_eq!(utts.len(), 2);
        assert_eq!(utts[0].speaker, "MOT");
        assert_eq!(utts[0].uid, "u0");
        assert_eq!(utts[0].words(), ["you", "want", "juice", "?"]);
        assert_eq!(utts[1].words(), ["juice", "."]);
    }

    #[test]
    fn word_text_stops_at_embedded_annotation()
    {
        let xml = r#"<CHAT><u who="CHI" uID="u0"><w>ball<mor type="mw"><mw><pos><c>n</c></pos>ball</mw></mor></w></u></CHAT>"#;

        let utts = parse_str(xml).unwrap();

        assert_eq!(utts[0].words(), ["ball"]);
    }

    #[test]
    fn unknown_terminator_types_carry_no_token()
    {
        let xml = r#"<CHAT><u who="CHI" uID="u0"><w>no</w><t type="e"/></u></CHAT>"#;

        let utts = parse_str(xml).unwrap();

        assert_eq!(utts[0].words(), ["no"]);
    }

    #[test]
    fn attributes_are_order_insensitive()
    {
        let xml = r#"<CHAT><u uID="u9" who="INV"><w>hello</w></u></CHAT>"#;

        let utts = parse_str(xml).unwrap();

        assert_eq!(utts[0].uid, "u9");
        assert_eq!(utts[0].speaker, "INV");
    }

    #[test]
    fn missing_attributes_fail_the_file()
    {
        let xml = r#"<CHAT><u uID="u0"><w>hi</w></u></CHAT>"#;

        let err = parse_str(xml).unwrap_err();
        assert!(matches!(err, PipelineError::Transcript { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unreadable_file_names_the_path()
    {
        let path = Utf8Path::new("definitely/not/here/01a.xml");
        let err = MorParser::new()
            .parse(path)
            .unwrap_err();

        match err
        {
            PipelineError::Transcript { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_without_utterances_parses_empty()
    {
        let utts = parse_str(r#"<CHAT></CHAT>"#).unwrap();
        assert!(utts.is_empty());
    }
}
