use std::{
    fmt,
    io::{self, BufRead},
};

use crate::platform::VideoPlatform;

/// Step by step instructions shown when no automatic source produced a
/// transcript and a person has to paste one in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualInstructions {
    pub video_url: String,
    pub platform: VideoPlatform,
}

impl ManualInstructions {
    pub fn new(video_url: impl Into<String>, platform: VideoPlatform) -> Self {
        ManualInstructions {
            video_url: video_url.into(),
            platform,
        }
    }
}

impl fmt::Display for ManualInstructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.video_url.trim();
        writeln!(f, "MANUAL TRANSCRIPTION REQUIRED")?;
        writeln!(f)?;

        if url.is_empty() {
            writeln!(f, "No video recording was found for this meeting.")?;
            return writeln!(
                f,
                "If you have a transcript from another source, paste it below and finish with a line containing only {END_OF_TRANSCRIPT}."
            );
        }

        writeln!(f, "No transcript could be retrieved automatically for:")?;
        writeln!(f, "  {url}")?;
        writeln!(f)?;

        match self.platform {
            VideoPlatform::YouTube => {
                writeln!(f, "Option 1: YouTube captions (if available)")?;
                writeln!(f, "  1. Open {url}")?;
                writeln!(f, "  2. Click the \"...more\" link under the video description")?;
                writeln!(f, "  3. Click \"Show transcript\"")?;
                writeln!(f, "  4. Copy the transcript text")?;
                writeln!(f)?;
                writeln!(f, "Option 2: YouTubeToTranscript.com")?;
                writeln!(f, "  1. Go to https://youtubetotranscript.com/")?;
                writeln!(f, "  2. Paste this url: {url}")?;
                writeln!(f, "  3. Click \"Get Transcript\" and copy the result")?;
            }
            _ => {
                writeln!(f, "  1. Open the recording at {url}")?;
                writeln!(
                    f,
                    "  2. Use the player's captions or transcript feature, or a transcription service of your choice"
                )?;
                writeln!(f, "  3. Copy the transcript text")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Some videos have no transcript at all.")?;
        writeln!(
            f,
            "Paste the transcript below and finish with a line containing only {END_OF_TRANSCRIPT}."
        )
    }
}

/// Line that ends a pasted transcript.
pub const END_OF_TRANSCRIPT: &str = "END";

/// Reads pasted lines until a line holding only [`END_OF_TRANSCRIPT`] or the
/// end of input. Anything after the marker is left in `reader`.
pub fn read_pasted_transcript<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut lines = vec![];
    let mut line = String::new();

    while reader.read_line(&mut line)? > 0 {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim() == END_OF_TRANSCRIPT {
            break;
        }
        lines.push(content.to_string());
        line.clear();
    }

    Ok(lines.join("\n").trim_end().to_string())
}
