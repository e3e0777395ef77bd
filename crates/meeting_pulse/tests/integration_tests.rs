mod mocks;

use std::time::Duration;

use meeting_datastore::{InMemorySessionStore, Meeting, Role, SessionStore};
use meeting_pulse::{
    transcript::{JobStatus, PollConfig},
    AcquisitionState, MeetingPipeline, MeetingPipelineBuilder, Transcript, TranscriptSource,
    VideoPlatform,
};
use mocks::{
    caption_provider::MockCaptionProvider,
    llm::MockLlm,
    meeting_source::{MockMeetingSource, BASE_URL},
    session_store::MockSessionStore,
    transcription_service::MockTranscriptionService,
};

type TestPipeline<D = InMemorySessionStore> = MeetingPipeline<
    MockMeetingSource,
    MockCaptionProvider,
    MockTranscriptionService,
    MockLlm,
    D,
>;

fn build_pipeline<D: SessionStore>(
    source: MockMeetingSource,
    captions: MockCaptionProvider,
    transcription: MockTranscriptionService,
    llm: MockLlm,
    store: D,
) -> TestPipeline<D> {
    MeetingPipelineBuilder::new()
        .source(source)
        .captions(captions)
        .transcription(transcription)
        .llm(llm)
        .store(store)
        .poll(PollConfig {
            interval: Duration::from_secs(30),
            max_wait: Duration::from_secs(120),
        })
        .max_documents(3)
        .build()
}

fn council_meeting() -> Meeting {
    Meeting::new(
        "City Council Regular Meeting",
        format!("{BASE_URL}/bc-citycouncil/page/city-council-regular-meeting-78"),
    )
}

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_happy_path_from_listing_to_chat() {
    let source = MockMeetingSource::from_fixture();
    let captions = MockCaptionProvider::new("Good evening and welcome to the council meeting");
    let transcription = MockTranscriptionService::completing("unused");
    let llm = MockLlm::new("## Summary\nBudget approved 5-2.")
        .with_answers(&["It passed 5-2.", "Councilmember Ortiz moved it."]);

    let caption_calls = captions.calls.clone();
    let submitted = transcription.submitted.clone();
    let summary_requests = llm.summary_requests.clone();
    let chat_calls = llm.chat_calls.clone();

    let pipeline = build_pipeline(
        source,
        captions,
        transcription,
        llm,
        InMemorySessionStore::new(),
    );

    let meetings = pipeline.list_meetings().await;
    assert_eq!(meetings.len(), 4, "Fixture lists four meetings");

    let mut meeting = meetings.into_iter().next().unwrap();
    assert!(pipeline.load_meeting(&mut meeting).await);
    assert_eq!(meeting.title, "City Council Regular Meeting");
    assert_eq!(meeting.date, "01/22/2024");
    assert_eq!(
        VideoPlatform::classify(&meeting.video_url),
        VideoPlatform::YouTube
    );
    assert_eq!(
        meeting.documents.len(),
        4,
        "Detail page adds one document the listing did not have"
    );

    let acquisition = pipeline.acquire_transcript(&meeting.video_url).await;
    let transcript = acquisition.into_transcript().expect("captions should resolve");
    assert_eq!(transcript.source, TranscriptSource::YouTubeCaptions);
    assert_eq!(
        transcript.text,
        "Good evening and welcome to the council meeting"
    );
    assert_eq!(*caption_calls.lock().unwrap(), vec!["5fujbzcLG5M"]);
    assert!(
        submitted.lock().unwrap().is_empty(),
        "Transcription API must not be used when captions exist"
    );

    let summary = pipeline
        .summarize(&meeting, Some(&transcript))
        .await
        .expect("summary");
    assert_eq!(summary.summary, "## Summary\nBudget approved 5-2.");

    {
        let requests = summary_requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.meeting_title, "City Council Regular Meeting");
        assert_eq!(request.meeting_date, "01/22/2024");
        assert_eq!(request.transcript.as_deref(), Some(transcript.text.as_str()));
        assert_eq!(request.documents.len(), 4);
        // capped at three, HTML ahead of PDF
        let context_lines = request
            .document_context
            .lines()
            .filter(|l| l.starts_with("- "))
            .collect::<Vec<_>>();
        assert_eq!(
            context_lines,
            vec![
                format!("- Minutes (HTML): {BASE_URL}/minutes/0122.html"),
                format!("- Agenda: {BASE_URL}/sites/default/files/agenda_0122.pdf"),
                format!("- Agenda Packet: {BASE_URL}/sites/default/files/packet_0122.pdf"),
            ]
        );
    }

    let greeting = pipeline
        .start_chat(&meeting, &summary, Some(&transcript))
        .await
        .expect("chat session");
    assert!(greeting.contains("City Council Regular Meeting"));

    let id = meeting.id();
    assert_eq!(
        pipeline.ask(&id, "Did the budget pass?").await.as_deref(),
        Some("It passed 5-2.")
    );
    assert_eq!(
        pipeline.ask(&id, "Who moved it?").await.as_deref(),
        Some("Councilmember Ortiz moved it.")
    );

    let history = pipeline.chat_history(&id).await;
    let roles = history.iter().map(|m| m.role).collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant
        ]
    );
    assert!(history[0].content.contains("MEETING SUMMARY:\n## Summary"));
    assert!(history[0].content.contains("FULL MEETING TRANSCRIPT:"));

    // every question is sent with the whole conversation so far
    let chat_calls = chat_calls.lock().unwrap();
    assert_eq!(chat_calls[0].len(), 3);
    assert_eq!(chat_calls[1].len(), 5);
    assert_eq!(chat_calls[1][4].content, "Who moved it?");
}

// ─── Transcript acquisition ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_youtube_without_captions_falls_back_to_transcription_api() {
    let transcription = MockTranscriptionService::new(vec![
        JobStatus::processing(),
        JobStatus::completed("Transcript from the API"),
    ]);
    let submitted = transcription.submitted.clone();

    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::without_tracks(),
        transcription,
        MockLlm::new("summary"),
        InMemorySessionStore::new(),
    );

    let video_url = "https://www.youtube.com/watch?v=5fujbzcLG5M";
    let started = tokio::time::Instant::now();
    let acquisition = pipeline.acquire_transcript(video_url).await;

    // one poll interval on the paused clock
    assert_eq!(started.elapsed(), Duration::from_secs(30));

    assert_eq!(
        acquisition.failures()[0].0,
        TranscriptSource::YouTubeCaptions
    );
    assert_eq!(
        acquisition.transcript(),
        Some(&Transcript::new(
            "Transcript from the API",
            TranscriptSource::TranscriptionApi
        ))
    );
    assert_eq!(*submitted.lock().unwrap(), vec![video_url]);
}

#[tokio::test]
async fn test_caption_languages() {
    let captions = MockCaptionProvider::new("Good evening");
    let caption_calls = captions.calls.clone();

    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        captions,
        MockTranscriptionService::completing("unused"),
        MockLlm::new("summary"),
        InMemorySessionStore::new(),
    );

    assert_eq!(
        pipeline
            .caption_languages("https://www.youtube.com/embed/5fujbzcLG5M")
            .await,
        vec!["English (auto-generated)"]
    );
    assert!(pipeline
        .caption_languages("https://vimeo.com/901234567")
        .await
        .is_empty());
    assert_eq!(*caption_calls.lock().unwrap(), vec!["5fujbzcLG5M"]);

    let failing = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::failing("watch page unavailable"),
        MockTranscriptionService::completing("unused"),
        MockLlm::new("summary"),
        InMemorySessionStore::new(),
    );
    assert!(failing
        .caption_languages("https://youtu.be/5fujbzcLG5M")
        .await
        .is_empty());
}

#[tokio::test]
async fn test_non_youtube_video_skips_captions() {
    let captions = MockCaptionProvider::new("should never be read");
    let caption_calls = captions.calls.clone();

    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        captions,
        MockTranscriptionService::completing("Vimeo transcript"),
        MockLlm::new("summary"),
        InMemorySessionStore::new(),
    );

    let acquisition = pipeline.acquire_transcript("https://vimeo.com/901234567").await;

    assert_eq!(acquisition.plan(), [TranscriptSource::TranscriptionApi]);
    assert_eq!(
        acquisition.transcript().map(|t| t.text.as_str()),
        Some("Vimeo transcript")
    );
    assert!(caption_calls.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_all_sources_failing_waits_for_manual_input() {
    let transcription = MockTranscriptionService::never_completing();
    let polls = transcription.polls.clone();

    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::failing("watch page unavailable"),
        transcription,
        MockLlm::new("summary"),
        InMemorySessionStore::new(),
    );

    let mut acquisition = pipeline
        .acquire_transcript("https://youtu.be/5fujbzcLG5M")
        .await;

    match acquisition.state() {
        AcquisitionState::AwaitingManualInput(instructions) => {
            assert_eq!(instructions.platform, VideoPlatform::YouTube);
            assert!(instructions.to_string().contains("Show transcript"));
        }
        other => panic!("expected manual input, got {other:?}"),
    }
    // 120s ceiling polled every 30s
    assert_eq!(*polls.lock().unwrap(), 4);
    assert_eq!(acquisition.failures().len(), 2);

    acquisition.submit_manual("Pasted by a resident").unwrap();
    assert_eq!(
        acquisition.into_transcript(),
        Some(Transcript::new(
            "Pasted by a resident",
            TranscriptSource::Manual
        ))
    );
}

#[tokio::test]
async fn test_submission_failure_then_decline_fails_acquisition() {
    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::failing("quota exceeded"),
        MockLlm::new("summary"),
        InMemorySessionStore::new(),
    );

    let mut acquisition = pipeline
        .acquire_transcript("https://example.com/media/council.mp4")
        .await;
    assert_eq!(acquisition.platform(), VideoPlatform::DirectVideoFile);
    assert!(matches!(
        acquisition.state(),
        AcquisitionState::AwaitingManualInput(_)
    ));

    let state = acquisition.decline_manual().unwrap();
    assert!(matches!(state, AcquisitionState::Failed(reason) if reason.contains("quota exceeded")));
}

// ─── Failure reduction ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_source_failures_reduce_to_empty_results() {
    let source = MockMeetingSource::failing("connection reset");
    let calls = source.calls.clone();

    let pipeline = build_pipeline(
        source,
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        MockLlm::new("summary"),
        InMemorySessionStore::new(),
    );

    assert!(pipeline.list_meetings().await.is_empty());

    let mut meeting = council_meeting();
    let before = meeting.clone();
    assert!(!pipeline.load_meeting(&mut meeting).await);
    assert_eq!(meeting, before, "A failed detail fetch leaves the meeting as is");

    assert!(pipeline
        .download_document(&format!("{BASE_URL}/sites/default/files/agenda_0122.pdf"))
        .await
        .is_none());

    assert_eq!(calls.lock().unwrap().len(), 3, "One attempt each, no retries");
}

#[tokio::test]
async fn test_llm_failures_reduce_to_none() {
    let llm = MockLlm::failing("503 from provider");
    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        llm,
        InMemorySessionStore::new(),
    );

    let meeting = council_meeting();
    let transcript = Transcript::new("Call to order", TranscriptSource::Manual);
    assert!(pipeline.summarize(&meeting, Some(&transcript)).await.is_none());
    assert!(pipeline.extract_action_items(&transcript).await.is_none());
}

#[tokio::test]
async fn test_failed_question_is_not_recorded() {
    let llm = MockLlm::new("summary");
    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        llm,
        InMemorySessionStore::new(),
    );

    let meeting = council_meeting();
    let summary = pipeline.summarize(&meeting, None).await.unwrap();
    pipeline.start_chat(&meeting, &summary, None).await.unwrap();

    // the mock has no scripted answers, so the reply fails
    assert!(pipeline.ask(&meeting.id(), "Anything?").await.is_none());
    assert_eq!(pipeline.chat_history(&meeting.id()).await.len(), 2);
}

#[tokio::test]
async fn test_store_failures_reduce_to_none() {
    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        MockLlm::new("summary").with_answers(&["answer"]),
        MockSessionStore::failing_writes("disk full"),
    );

    let meeting = council_meeting();
    let summary = pipeline.summarize(&meeting, None).await.unwrap();
    assert!(pipeline.start_chat(&meeting, &summary, None).await.is_none());
    assert!(pipeline.ask(&meeting.id(), "Anything?").await.is_none());
}

// ─── Chat sessions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sessions_are_keyed_by_meeting_not_title() {
    let llm = MockLlm::new("summary").with_answers(&["first answer", "second answer"]);
    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        llm,
        InMemorySessionStore::new(),
    );

    let january = council_meeting();
    let february = Meeting::new(
        "City Council Regular Meeting",
        format!("{BASE_URL}/bc-citycouncil/page/city-council-regular-meeting-79"),
    );

    for meeting in [&january, &february] {
        let summary = pipeline.summarize(meeting, None).await.unwrap();
        pipeline.start_chat(meeting, &summary, None).await.unwrap();
    }

    pipeline.ask(&january.id(), "Question one").await.unwrap();
    pipeline.ask(&february.id(), "Question two").await.unwrap();

    let january_history = pipeline.chat_history(&january.id()).await;
    let february_history = pipeline.chat_history(&february.id()).await;
    assert_eq!(january_history.len(), 4);
    assert_eq!(february_history.len(), 4);
    assert_eq!(january_history[2].content, "Question one");
    assert_eq!(february_history[2].content, "Question two");

    assert!(pipeline.end_chat(&january.id()).await);
    assert!(pipeline.chat_history(&january.id()).await.is_empty());
    assert_eq!(pipeline.chat_history(&february.id()).await.len(), 4);
}

#[tokio::test]
async fn test_ask_without_session_returns_none() {
    let llm = MockLlm::new("summary").with_answers(&["unused"]);
    let chat_calls = llm.chat_calls.clone();
    let pipeline = build_pipeline(
        MockMeetingSource::default(),
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        llm,
        InMemorySessionStore::new(),
    );

    assert!(pipeline
        .ask(&council_meeting().id(), "Hello?")
        .await
        .is_none());
    assert!(chat_calls.lock().unwrap().is_empty());
}

// ─── Documents and action items ──────────────────────────────────────────────

#[tokio::test]
async fn test_download_document_and_action_items() {
    let agenda_url = format!("{BASE_URL}/sites/default/files/agenda_0122.pdf");
    let source = MockMeetingSource::default().with_document(&agenda_url, b"%PDF-1.7");
    let llm = MockLlm::new("summary")
        .with_action_items(&["1. Review budget proposal", "2. Schedule public hearing"]);

    let pipeline = build_pipeline(
        source,
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        llm,
        InMemorySessionStore::new(),
    );

    assert_eq!(
        pipeline.download_document(&agenda_url).await.as_deref(),
        Some(&b"%PDF-1.7"[..])
    );
    assert!(pipeline
        .download_document(&format!("{BASE_URL}/missing.pdf"))
        .await
        .is_none());

    let transcript = Transcript::new("We will review the budget", TranscriptSource::Manual);
    assert_eq!(
        pipeline.extract_action_items(&transcript).await,
        Some(vec![
            "1. Review budget proposal".to_string(),
            "2. Schedule public hearing".to_string()
        ])
    );
}

#[tokio::test]
async fn test_meeting_without_video_summarizes_from_documents() {
    let source = MockMeetingSource::from_fixture();
    let llm = MockLlm::new("Planned agenda summary");
    let summary_requests = llm.summary_requests.clone();

    let pipeline = build_pipeline(
        source,
        MockCaptionProvider::without_tracks(),
        MockTranscriptionService::completing("unused"),
        llm,
        InMemorySessionStore::new(),
    );

    let meetings = pipeline.list_meetings().await;
    let work_session = &meetings[3];
    assert!(!work_session.has_video());

    let summary = pipeline.summarize(work_session, None).await.unwrap();
    assert_eq!(summary.sources_used, "Meeting documents");

    let requests = summary_requests.lock().unwrap();
    assert!(requests[0].transcript.is_none());
    assert_eq!(requests[0].document_context, "");
}
