//! Subprocess execution used to drive the external provisioning engine

pub mod error;
pub mod mock;
pub mod runner;

pub use error::ProcessError;
pub use mock::{MockProcessRunner, ScriptedRun};
pub use runner::{
    ExitStatus, LineSender, OutputLine, ProcessCommand, ProcessOutput, ProcessRunner,
    StreamSource, TokioProcessRunner,
};
