pub mod domain;
pub mod features;
pub mod normalize;
pub mod ports;
pub mod prompts;

pub use domain::{
    Activity, ActivityEntry, AuthSession, Document, DocumentSummary, NewActivity, NewDocument,
    NewUser, User, UserCredentials,
};
pub use features::{Feature, FeatureType};
pub use normalize::NormalizeError;
pub use ports::{CompletionService, DatabaseService, PortError, PortResult};
