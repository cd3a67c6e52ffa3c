// InfoExtractor module - video metadata extraction backends
//
// The extraction backend is an external collaborator: it resolves a video id
// into raw metadata plus an ordered list of raw format descriptors. The
// shipped implementation shells out to the yt-dlp binary.

mod cli;
mod traits;

pub use cli::CliInfoExtractor;
pub use traits::{ExtractorConfig, InfoExtractor};
