//! QR flows: the student's rotating check-in code, the camera decode loop,
//! and the scan sessions built on it (volunteer check-in/out and the stall
//! feedback gate).

pub mod display;
pub mod feedback;
pub mod result;
pub mod rotation;
pub mod scanner;
pub mod session;

pub use display::{CredentialSource, DisplayFrame, QrDisplay};
pub use rotation::{Effect, FetchFailure, RotationError, RotationMachine, RotationState};
pub use scanner::{CameraDevice, CameraError, DecodeResult, DecodeStream, FrameSource, QrScanner};
pub use session::{CheckInVerifier, ScanError, ScanSession, ScanStatus, ScanVerifier, StallGateVerifier};
