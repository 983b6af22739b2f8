//! Building the single ffmpeg invocation that renders the final video.

use std::fmt::Write as _;
use std::path::Path;

use super::error::{MediaError, MediaResult};
use super::sync::{ClipFill, SynchronizedClip};
use crate::config::MediaSettings;

/// Output format shared by every clip in the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub sample_rate: u32,
    pub video_codec: String,
    pub audio_codec: String,
}

impl From<&MediaSettings> for RenderOptions {
    fn from(settings: &MediaSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
            sample_rate: settings.sample_rate,
            video_codec: settings.video_codec.clone(),
            audio_codec: settings.audio_codec.clone(),
        }
    }
}

/// Build the `-filter_complex` graph.
///
/// Clip `i` reads video from input `2i` and narration from input `2i + 1`.
/// Every clip is brought to the same canvas, frame rate and audio layout
/// before the `concat` filter joins them in order.
pub fn build_filter_graph(clips: &[SynchronizedClip], opts: &RenderOptions) -> String {
    let mut graph = String::new();
    let (w, h) = (opts.width, opts.height);

    for (i, clip) in clips.iter().enumerate() {
        let video_input = 2 * i;
        let audio_input = 2 * i + 1;
        let duration = clip.duration;

        let _ = write!(graph, "[{}:v]", video_input);
        if let ClipFill::Freeze { extra_secs } = clip.fill {
            let _ = write!(graph, "tpad=stop_mode=clone:stop_duration={:.3},", extra_secs);
        }
        let _ = write!(
            graph,
            "trim=duration={d:.3},setpts=PTS-STARTPTS,\
             scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps},format=yuv420p[v{i}];",
            d = duration,
            w = w,
            h = h,
            fps = opts.fps,
            i = i,
        );

        let _ = write!(
            graph,
            "[{a}:a]aformat=sample_rates={sr}:channel_layouts=stereo,\
             apad,atrim=duration={d:.3},asetpts=PTS-STARTPTS[a{i}];",
            a = audio_input,
            sr = opts.sample_rate,
            d = duration,
            i = i,
        );
    }

    for i in 0..clips.len() {
        let _ = write!(graph, "[v{i}][a{i}]");
    }
    let _ = write!(graph, "concat=n={}:v=1:a=1[outv][outa]", clips.len());

    graph
}

/// Full ffmpeg argument list for rendering `clips` into `output`.
pub fn build_ffmpeg_args(
    clips: &[SynchronizedClip],
    output: &Path,
    opts: &RenderOptions,
) -> MediaResult<Vec<String>> {
    if clips.is_empty() {
        return Err(MediaError::EmptySequence);
    }

    let mut args: Vec<String> = vec!["-hide_banner".into(), "-nostats".into(), "-y".into()];

    for clip in clips {
        if clip.fill == ClipFill::Loop {
            args.push("-stream_loop".into());
            args.push("-1".into());
        }
        args.push("-i".into());
        args.push(clip.video_path.to_string_lossy().into_owned());
        args.push("-i".into());
        args.push(clip.audio_path.to_string_lossy().into_owned());
    }

    args.push("-filter_complex".into());
    args.push(build_filter_graph(clips, opts));
    args.extend(
        [
            "-map",
            "[outv]",
            "-map",
            "[outa]",
            "-c:v",
            opts.video_codec.as_str(),
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            opts.audio_codec.as_str(),
            "-ar",
        ]
        .into_iter()
        .map(String::from),
    );
    args.push(opts.sample_rate.to_string());
    args.push("-movflags".into());
    args.push("+faststart".into());
    args.push(output.to_string_lossy().into_owned());

    Ok(args)
}
