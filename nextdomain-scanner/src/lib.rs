pub mod error;
pub mod html;
pub mod probe;
pub mod process;
pub mod result;

pub use error::{ActionError, ErrorKind};
pub use html::is_valid_url;
pub use probe::{Probe, ProbeOptions, SWEEP_METHODS};
pub use result::{HeaderDump, HeaderSource, ScanResult, VerbOutcome};
