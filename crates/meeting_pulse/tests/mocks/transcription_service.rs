use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use meeting_pulse::{
    transcript::{JobState, JobStatus, TranscriptionJob},
    TranscriptionService,
};

/// Replays `statuses` one poll at a time, repeating the last one.
#[derive(Clone)]
pub struct MockTranscriptionService {
    pub statuses: Arc<Mutex<VecDeque<JobStatus>>>,
    pub submitted: Arc<Mutex<Vec<String>>>,
    pub polls: Arc<Mutex<usize>>,
    pub fail_with: Option<String>,
}

impl MockTranscriptionService {
    pub fn new(statuses: Vec<JobStatus>) -> Self {
        Self {
            statuses: Arc::new(Mutex::new(statuses.into())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            polls: Arc::new(Mutex::new(0)),
            fail_with: None,
        }
    }

    pub fn completing(transcript: &str) -> Self {
        Self::new(vec![JobStatus::completed(transcript)])
    }

    pub fn never_completing() -> Self {
        Self::new(vec![JobStatus::processing()])
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new(vec![JobStatus::processing()])
        }
    }
}

impl TranscriptionService for MockTranscriptionService {
    type Error = anyhow::Error;

    async fn submit(&self, video_url: &str, _language: &str) -> anyhow::Result<TranscriptionJob> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.submitted.lock().unwrap().push(video_url.to_string());
        Ok(TranscriptionJob {
            job_id: Some("job-42".into()),
            status: Some(JobState::Queued),
        })
    }

    async fn status(&self, _job_id: &str) -> anyhow::Result<JobStatus> {
        *self.polls.lock().unwrap() += 1;
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        status.ok_or_else(|| anyhow::anyhow!("no scripted status"))
    }
}
