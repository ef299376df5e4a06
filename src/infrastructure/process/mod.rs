mod ffmpeg_transcoder;
mod tokio_spawner;
mod ytdlp_extractor;

pub use ffmpeg_transcoder::FfmpegTranscoder;
pub use tokio_spawner::TokioProcessSpawner;
pub use ytdlp_extractor::{YtDlpExtractor, parse_track_info};
