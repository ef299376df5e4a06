mod cache_store;
mod media_extractor;
mod process;
mod transcoder;

pub use cache_store::{ByteStream, CacheStore, CacheStoreError, CacheWriter};
pub use media_extractor::{ExtractorError, ExtractorOutput, MediaExtractor};
pub use process::{
    BoxedReader, BoxedWriter, ProcessError, ProcessExit, ProcessHandle, ProcessMonitor,
    ProcessSpawner,
};
pub use transcoder::{Transcoder, TranscoderError};
