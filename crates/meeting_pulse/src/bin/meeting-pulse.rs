use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use meeting_datastore::{InMemorySessionStore, Meeting};
use meeting_pulse::{
    config::{DEFAULT_MEETINGS_BASE_URL, DEFAULT_OPENAI_BASE_URL, DEFAULT_TRANSCRIPT_API_BASE_URL},
    openai::OpenAIClient,
    tracing::init_tracing_subscriber,
    transcript::{read_pasted_transcript, TranscriptApiClient, YouTubeCaptionClient},
    AcquisitionState, Config, Error, MeetingPipeline, MeetingPipelineBuilder, MunicodeSource,
    Transcript, TranscriptSource, VideoPlatform,
};

type Pipeline = MeetingPipeline<
    MunicodeSource,
    YouTubeCaptionClient,
    TranscriptApiClient,
    OpenAIClient,
    InMemorySessionStore,
>;

#[derive(Parser)]
#[command(
    name = "meeting-pulse",
    about = "Municipal meeting transcripts, summaries and chat"
)]
struct Cli {
    /// Municipal meetings site to scrape
    #[arg(long, env = "MEETINGS_BASE_URL", default_value = DEFAULT_MEETINGS_BASE_URL)]
    meetings_base_url: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    /// Transcription API key
    #[arg(long, env = "TRANSCRIPTAPI_KEY", hide_env_values = true)]
    transcript_api_key: Option<String>,

    #[arg(long, env = "TRANSCRIPTAPI_BASE_URL", default_value = DEFAULT_TRANSCRIPT_API_BASE_URL)]
    transcript_api_base_url: String,

    /// Seconds between transcription job status checks
    #[arg(long, env = "TRANSCRIPT_POLL_INTERVAL_SECS", default_value = "30")]
    poll_interval: u64,

    /// Give up on a transcription job after this many seconds
    #[arg(long, env = "TRANSCRIPT_MAX_WAIT_SECS", default_value = "3600")]
    max_wait: u64,

    /// Documents listed in the summary context
    #[arg(long, env = "MAX_CONTEXT_DOCUMENTS", default_value = "5")]
    max_documents: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List meetings published on the site
    List,
    /// Show a meeting's details, video and documents
    Show { url: String },
    /// Get a transcript for a video
    Transcript {
        video_url: String,
        /// Write the transcript here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List caption languages published for a YouTube video
    Languages { video_url: String },
    /// Summarize a meeting
    Summarize {
        url: String,
        /// Use this transcript instead of fetching one
        #[arg(long)]
        transcript_file: Option<PathBuf>,
        /// Defaults to meeting_summary_<date>.txt
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Summarize a meeting, then answer questions about it
    Chat {
        url: String,
        #[arg(long)]
        transcript_file: Option<PathBuf>,
    },
    /// Extract action items from a transcript
    ActionItems {
        #[arg(long)]
        transcript_file: PathBuf,
    },
    /// Download a meeting document
    Download {
        url: String,
        #[arg(long)]
        out: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            meetings_base_url: self.meetings_base_url.clone(),
            openai_api_key: self.openai_key.clone(),
            openai_base_url: self.openai_base_url.clone(),
            transcript_api_key: self.transcript_api_key.clone(),
            transcript_api_base_url: self.transcript_api_base_url.clone(),
            max_documents: self.max_documents,
            ..Default::default()
        }
        .with_poll_seconds(self.poll_interval, self.max_wait)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT").ok().map(Into::into),
            ..Default::default()
        },
    ));

    init_tracing_subscriber()?;

    let cli = Cli::parse();
    let config = cli.config();

    let keys = match config.validate() {
        Ok(keys) => keys,
        Err(Error::MissingConfig(missing)) => {
            eprintln!("Missing required API keys: {}", missing.join(", "));
            eprintln!("Set them in your environment or in a .env file, see .env.example.");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    let pipeline = MeetingPipelineBuilder::new()
        .source(MunicodeSource::new(&config.meetings_base_url))
        .captions(YouTubeCaptionClient::default())
        .transcription(
            TranscriptApiClient::new(keys.transcript_api)
                .with_base_url(&config.transcript_api_base_url),
        )
        .llm(OpenAIClient::new(keys.openai).with_base_url(&config.openai_base_url))
        .store(InMemorySessionStore::new())
        .poll(config.poll)
        .max_documents(config.max_documents)
        .build();

    match cli.command {
        Command::List => list(&pipeline).await,
        Command::Show { url } => show(&pipeline, &url).await,
        Command::Transcript { video_url, out } => {
            let transcript = obtain_transcript(&pipeline, &video_url).await?;
            tracing::info!(source = %transcript.source, "Transcript ready");
            match out {
                Some(path) => write_file(&path, transcript.text.as_bytes()),
                None => {
                    println!("{}", transcript.text);
                    Ok(())
                }
            }
        }
        Command::Languages { video_url } => {
            let languages = pipeline.caption_languages(&video_url).await;
            if languages.is_empty() {
                println!("No caption tracks found.");
            }
            for language in languages {
                println!("{language}");
            }
            Ok(())
        }
        Command::Summarize {
            url,
            transcript_file,
            out,
        } => summarize(&pipeline, &url, transcript_file.as_deref(), out).await,
        Command::Chat {
            url,
            transcript_file,
        } => chat(&pipeline, &url, transcript_file.as_deref()).await,
        Command::ActionItems { transcript_file } => {
            let transcript = read_transcript_file(&transcript_file)?;
            let items = pipeline
                .extract_action_items(&transcript)
                .await
                .context("Failed to extract action items")?;
            if items.is_empty() {
                println!("No action items found.");
            }
            for item in items {
                println!("- {item}");
            }
            Ok(())
        }
        Command::Download { url, out } => {
            let bytes = pipeline
                .download_document(&url)
                .await
                .with_context(|| format!("Failed to download {url}"))?;
            write_file(&out, &bytes)
        }
    }
}

async fn list(pipeline: &Pipeline) -> anyhow::Result<()> {
    let meetings = pipeline.list_meetings().await;
    if meetings.is_empty() {
        println!("No meetings found.");
    }

    for meeting in meetings {
        let date = if meeting.date.is_empty() { "-" } else { meeting.date.as_str() };
        println!("{date}\t{}", meeting.title);
        println!("\t{}", meeting.url);
    }
    Ok(())
}

async fn load_meeting(pipeline: &Pipeline, url: &str) -> anyhow::Result<Meeting> {
    let mut meeting = Meeting::new("", url);
    if !pipeline.load_meeting(&mut meeting).await {
        bail!("Could not load meeting page {url}");
    }
    Ok(meeting)
}

async fn show(pipeline: &Pipeline, url: &str) -> anyhow::Result<()> {
    let meeting = load_meeting(pipeline, url).await?;

    println!("{}", meeting.title);
    if !meeting.date.is_empty() {
        println!("Date: {}", meeting.date);
    }
    if meeting.has_video() {
        let platform = VideoPlatform::classify(&meeting.video_url);
        println!("Video ({platform}): {}", meeting.video_url);
    } else {
        println!("Video: none found");
    }
    if !meeting.documents.is_empty() {
        println!("Documents:");
        for doc in &meeting.documents {
            println!("  - {}: {}", doc.title, doc.url);
        }
    }
    Ok(())
}

/// Runs the automatic sources, then falls back to a transcript pasted on stdin.
async fn obtain_transcript(pipeline: &Pipeline, video_url: &str) -> anyhow::Result<Transcript> {
    let mut acquisition = pipeline.acquire_transcript(video_url).await;

    if let AcquisitionState::AwaitingManualInput(instructions) = acquisition.state() {
        eprintln!("{instructions}");
        eprintln!("(an empty transcript skips this step)");

        let pasted = read_pasted_transcript(&mut io::stdin().lock())
            .context("Failed to read transcript from stdin")?;

        if pasted.trim().is_empty() {
            acquisition.decline_manual()?;
        } else {
            acquisition.submit_manual(pasted)?;
        }
    }

    if let AcquisitionState::Failed(reason) = acquisition.state() {
        bail!("No transcript: {reason}");
    }
    acquisition
        .into_transcript()
        .context("Transcript acquisition did not finish")
}

fn read_transcript_file(path: &Path) -> anyhow::Result<Transcript> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    Ok(Transcript::new(text, TranscriptSource::Manual))
}

/// Transcript for a meeting: the given file, else whatever the video yields.
/// Meetings without video are summarized from their documents alone.
async fn meeting_transcript(
    pipeline: &Pipeline,
    meeting: &Meeting,
    transcript_file: Option<&Path>,
) -> anyhow::Result<Option<Transcript>> {
    if let Some(path) = transcript_file {
        return read_transcript_file(path).map(Some);
    }
    if !meeting.has_video() {
        tracing::info!("Meeting has no video, summarizing from documents");
        return Ok(None);
    }

    match obtain_transcript(pipeline, &meeting.video_url).await {
        Ok(transcript) => Ok(Some(transcript)),
        Err(e) => {
            tracing::warn!(error = %e, "Continuing without a transcript");
            Ok(None)
        }
    }
}

async fn summarize(
    pipeline: &Pipeline,
    url: &str,
    transcript_file: Option<&Path>,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let meeting = load_meeting(pipeline, url).await?;
    let transcript = meeting_transcript(pipeline, &meeting, transcript_file).await?;

    let summary = pipeline
        .summarize(&meeting, transcript.as_ref())
        .await
        .context("Failed to generate summary")?;

    println!("{}", summary.summary);

    let out = out.unwrap_or_else(|| default_summary_path(&meeting));
    write_file(&out, summary.summary.as_bytes())?;
    eprintln!("Summary saved to {}", out.display());
    Ok(())
}

fn default_summary_path(meeting: &Meeting) -> PathBuf {
    let date = meeting
        .parsed_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".into());
    PathBuf::from(format!("meeting_summary_{date}.txt"))
}

async fn chat(pipeline: &Pipeline, url: &str, transcript_file: Option<&Path>) -> anyhow::Result<()> {
    let meeting = load_meeting(pipeline, url).await?;
    let transcript = meeting_transcript(pipeline, &meeting, transcript_file).await?;

    let summary = pipeline
        .summarize(&meeting, transcript.as_ref())
        .await
        .context("Failed to generate summary")?;
    println!("{}\n", summary.summary);

    let greeting = pipeline
        .start_chat(&meeting, &summary, transcript.as_ref())
        .await
        .context("Failed to start chat session")?;
    println!("{greeting}");

    let id = meeting.id();
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        match pipeline.ask(&id, question).await {
            Some(answer) => println!("{answer}\n"),
            None => println!("Sorry, I couldn't answer that. Please try again.\n"),
        }
    }

    pipeline.end_chat(&id).await;
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
