/// yt-dlp track resolver
use async_trait::async_trait;
use chorus_core::{EffectMode, ResolveError, ResolvedTrack, StreamHandle, TrackRef, TrackResolver};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// ffmpeg input options for remote streams
pub const RECONNECT_ARGS: [&str; 6] = [
    "-reconnect",
    "1",
    "-reconnect_streamed",
    "1",
    "-reconnect_delay_max",
    "5",
];

/// Resolves references by running `yt-dlp`
///
/// Locators are passed through; anything else becomes a `ytsearch1:` query.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    program: PathBuf,
}

/// Subset of `yt-dlp -j` output
#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    duration: Option<f64>,
    url: Option<String>,
    webpage_url: Option<String>,
    #[serde(default)]
    is_live: Option<bool>,
    #[serde(default)]
    http_headers: BTreeMap<String, String>,
}

impl YtDlpResolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Argument identifying what yt-dlp should fetch
    pub fn query_arg(reference: &TrackRef) -> String {
        if reference.is_locator() {
            reference.as_str().to_string()
        } else {
            format!("ytsearch1:{}", reference.as_str())
        }
    }

    fn command(&self, query: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "-j",
            "--no-playlist",
            "--no-warnings",
            "-f",
            "bestaudio/best",
            "--",
        ])
        .arg(query)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl TrackResolver for YtDlpResolver {
    async fn resolve(
        &self,
        reference: &TrackRef,
        effect: EffectMode,
    ) -> Result<ResolvedTrack, ResolveError> {
        let query = Self::query_arg(reference);
        tracing::debug!("Resolving {} with {}", query, self.program.display());

        let output = self.command(&query).output().await.map_err(|e| {
            ResolveError::failed(format!("could not run {}: {}", self.program.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("yt-dlp exited with an error")
                .trim_start_matches("ERROR: ")
                .to_string();
            return Err(ResolveError::failed(message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| ResolveError::NotFound(reference.to_string()))?;

        parse_info(line, reference, effect)
    }
}

/// Build a resolved track from one line of `yt-dlp -j` output
pub fn parse_info(
    json: &str,
    reference: &TrackRef,
    effect: EffectMode,
) -> Result<ResolvedTrack, ResolveError> {
    let info: VideoInfo = serde_json::from_str(json)
        .map_err(|e| ResolveError::failed(format!("unreadable yt-dlp output: {}", e)))?;

    let url = info
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ResolveError::failed("yt-dlp returned no stream url"))?;

    let duration = match info.is_live {
        Some(true) => None,
        _ => info
            .duration
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64),
    };

    let canonical_reference = info
        .webpage_url
        .filter(|page| !page.is_empty())
        .map(TrackRef::new)
        .unwrap_or_else(|| reference.clone());

    Ok(ResolvedTrack {
        title: info
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| reference.to_string()),
        duration,
        stream: StreamHandle {
            url,
            http_headers: info.http_headers.into_iter().collect(),
            input_args: RECONNECT_ARGS.iter().map(|arg| arg.to_string()).collect(),
            filter: effect.ffmpeg_filter().map(str::to_string),
        },
        canonical_reference,
    })
}
