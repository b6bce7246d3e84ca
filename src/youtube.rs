use std::future::Future;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::{Segment, Transcript, TranscriptError};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Anything that can produce a transcript for a video ID
pub trait TranscriptFetcher {
    /// Fetch the transcript in the first of `languages` the video offers.
    fn fetch_transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> impl Future<Output = Result<Transcript, TranscriptError>> + Send;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// "asr" for auto-generated tracks
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Caption fetcher backed by YouTube's InnerTube API
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    client: reqwest::Client,
    base_url: String,
}

impl YoutubeClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch captions and collapse them into a single space-joined string
    pub async fn fetch_transcript_text(&self, video_id: &str, languages: &[String]) -> Result<String, TranscriptError> {
        Ok(self.fetch_captions(video_id, languages).await?.text())
    }

    async fn fetch_captions(&self, video_id: &str, languages: &[String]) -> Result<Transcript, TranscriptError> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("{}/youtubei/v1/player?key={api_key}&prettyPrint=false", self.base_url);
        let hl = languages.first().map(String::as_str).unwrap_or("en");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": hl,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tracks = resp
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(TranscriptError::NoCaptions {
                video_id: video_id.to_string(),
            });
        }

        let track = select_track(&tracks, languages).ok_or_else(|| TranscriptError::LanguageUnavailable {
            video_id: video_id.to_string(),
            requested: languages.to_vec(),
            available: tracks.iter().map(|t| t.language_code.clone()).collect(),
        })?;

        debug!(
            "Using caption track: lang={} generated={}",
            track.language_code,
            track.is_generated()
        );

        // Step 3: Fetch the caption XML
        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_caption_xml(&caption_xml)?;
        if segments.is_empty() {
            return Err(TranscriptError::EmptyTranscript {
                video_id: video_id.to_string(),
            });
        }

        Ok(Transcript {
            video_id: video_id.to_string(),
            language: track.language_code.clone(),
            segments,
        })
    }
}

impl TranscriptFetcher for YoutubeClient {
    fn fetch_transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> impl Future<Output = Result<Transcript, TranscriptError>> + Send {
        self.fetch_captions(video_id, languages)
    }
}

/// Walk the preferred languages in order; within a language, manual tracks beat generated ones
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut matching = tracks.iter().filter(|t| &t.language_code == lang);
        let first = matching.clone().next()?;
        Some(matching.find(|t| !t.is_generated()).unwrap_or(first))
    })
}

fn extract_api_key(html: &str) -> Result<String, TranscriptError> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).map_err(|e| TranscriptError::Parse(e.to_string()))?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: try the newer pattern
    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).map_err(|e| TranscriptError::Parse(e.to_string()))?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    Err(TranscriptError::MissingApiKey)
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>, TranscriptError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = dur;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(start) = current_start.take() {
                    let duration = current_dur.take().unwrap_or(0.0);
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).replace('\n', " ");
                    if !text.trim().is_empty() {
                        segments.push(Segment { text, start, duration });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TranscriptError::Parse(e.to_string())),
            _ => {}
        }
    }

    Ok(segments)
}
