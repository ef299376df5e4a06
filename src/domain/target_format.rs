/// The single output format produced for every track.
pub struct TargetFormat;

impl TargetFormat {
    pub const CODEC: &'static str = "dfpwm";
    pub const EXTENSION: &'static str = "dfpwm";
    pub const CONTENT_TYPE: &'static str = "audio/dfpwm";
    pub const SAMPLE_RATE: u32 = 48_000;
    pub const CHANNELS: u8 = 1;
}
