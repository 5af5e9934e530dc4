pub mod directory;
pub mod events;
pub mod registration;
pub mod scan;

pub use directory::{FeedbackRecord, NewSchool, NewStall, NewVolunteer, School, Stall, Volunteer};
pub use events::{EventDetail, EventStatus, EventSummary, NewEvent};
pub use registration::{
    EventRegistration, PaymentCallback, PaymentOrder, PaymentStatus, RegistrationRecord,
    RegistrationStatus,
};
pub use scan::{RotatingQrCredential, RotationInfo, ScanEvent, ScanType, StallIdentity};
