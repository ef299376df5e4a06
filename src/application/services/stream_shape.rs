use crate::application::ports::{BoxedReader, ExtractorOutput, ProcessMonitor};

use super::PipelineError;

/// Extractor audio normalized to a single reader.
///
/// When the audio comes from a process, its monitor and diagnostic pipe travel
/// with the reader so teardown can stop it and its stderr can be drained.
pub struct ResolvedAudio {
    pub reader: BoxedReader,
    pub process: Option<ProcessMonitor>,
    pub diagnostics: Option<BoxedReader>,
    pub shape: &'static str,
}

impl ResolvedAudio {
    fn detached(reader: BoxedReader, shape: &'static str) -> Self {
        Self {
            reader,
            process: None,
            diagnostics: None,
            shape,
        }
    }
}

type ShapeStrategy = fn(&mut ExtractorOutput) -> Option<ResolvedAudio>;

/// Probed in order; the first match wins.
const STRATEGIES: [ShapeStrategy; 5] = [
    direct_reader,
    stream_field,
    process_stdout,
    first_of_sequence,
    readable_field,
];

pub fn resolve_readable(mut output: ExtractorOutput) -> Result<ResolvedAudio, PipelineError> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&mut output))
        .ok_or(PipelineError::UnsupportedStreamShape)
}

fn direct_reader(output: &mut ExtractorOutput) -> Option<ResolvedAudio> {
    match std::mem::replace(output, ExtractorOutput::Empty) {
        ExtractorOutput::Reader(reader) => Some(ResolvedAudio::detached(reader, "reader")),
        other => {
            *output = other;
            None
        }
    }
}

fn stream_field(output: &mut ExtractorOutput) -> Option<ResolvedAudio> {
    match output {
        ExtractorOutput::Stream { stream } => stream
            .take()
            .map(|reader| ResolvedAudio::detached(reader, "stream")),
        _ => None,
    }
}

fn process_stdout(output: &mut ExtractorOutput) -> Option<ResolvedAudio> {
    match output {
        ExtractorOutput::Process(handle) => {
            let reader = handle.stdout.take()?;
            Some(ResolvedAudio {
                reader,
                process: Some(handle.monitor.clone()),
                diagnostics: handle.stderr.take(),
                shape: "stdout",
            })
        }
        _ => None,
    }
}

fn first_of_sequence(output: &mut ExtractorOutput) -> Option<ResolvedAudio> {
    match output {
        ExtractorOutput::Sequence(readers) if !readers.is_empty() => {
            Some(ResolvedAudio::detached(readers.remove(0), "sequence"))
        }
        _ => None,
    }
}

fn readable_field(output: &mut ExtractorOutput) -> Option<ResolvedAudio> {
    match output {
        ExtractorOutput::Readable { readable } => readable
            .take()
            .map(|reader| ResolvedAudio::detached(reader, "readable")),
        _ => None,
    }
}
