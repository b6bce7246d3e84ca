use std::sync::{Arc, Mutex};

use ytsum::SummaryError;
use ytsum::summarize::{Summarizer, build_user_message};

#[derive(Clone)]
pub struct MockSummarizer {
    pub summary: String,
    /// The human-role message each call would have sent
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<u16>,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            summary: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(status),
        }
    }
}

impl Summarizer for MockSummarizer {
    async fn summarize(&self, transcript: &str, instruction: &str) -> Result<String, SummaryError> {
        self.calls
            .lock()
            .unwrap()
            .push(build_user_message(instruction, transcript));
        if let Some(status) = self.fail_with {
            return Err(SummaryError::Api {
                provider: "mock".to_string(),
                status,
                body: "model unavailable".to_string(),
            });
        }
        Ok(self.summary.clone())
    }
}
