//! Shared fixtures: tiny TalkBank-shaped transcripts on disk.

use std::fs;
use std::io;
use std::path::Path;

/// Write a transcript at `root/rel`. Each utterance is (speaker, text);
/// "." and "?" in the text become terminator elements, everything else a
/// `<w>` word element.
pub fn write_transcript(
    root: &Path,
    rel: &str,
    utterances: &[(&str, &str)],
) -> io::Result<()>
{
    let mut body = String::new();

    for (i, (speaker, text)) in utterances
        .iter()
        .enumerate()
    {
        body.push_str(&format!("  <u who=\"{speaker}\" uID=\"u{i}\">"));

        for word in text.split_whitespace()
        {
            match word
            {
                "." => body.push_str("<t type=\"p\"/>"),
                "?" => body.push_str("<t type=\"q\"/>"),
                _ => body.push_str(&format!("<w>{word}</w>")),
            }
        }

        body.push_str("</u>\n");
    }

    let xml =
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<CHAT>\n{body}</CHAT>\n");

    let path = root.join(rel);

    if let Some(parent) = path.parent()
    {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, xml)
}
